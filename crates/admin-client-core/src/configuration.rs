use admin_shared::{const_config::client::CLIENT_DEFAULT_REQUEST_TIMEOUT, time::Seconds};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::{
    convert::{TryFrom, TryInto},
    path::{Path, PathBuf},
};

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ClientConfiguration {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    /// Set from `APP_ENVIRONMENT` not from the files
    #[serde(skip)]
    pub environment: Environment,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApiSettings {
    /// As given in the configuration, see [`ApiSettings::resolved_base_url`]
    /// for what is actually used
    pub base_url: String,
    #[serde(
        default = "default_timeout_secs",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    CLIENT_DEFAULT_REQUEST_TIMEOUT.as_secs()
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct StorageSettings {
    /// Folder the credential store writes to
    pub directory: PathBuf,
}

impl ApiSettings {
    /// Trailing slashes are removed. In production the configured URL is
    /// expected to point at the API root so a trailing `/api` is also
    /// removed, request paths already start with `/api`
    pub fn resolved_base_url(&self, environment: Environment) -> String {
        let trimmed = self.base_url.trim_end_matches('/');
        match environment {
            Environment::Local => trimmed.to_string(),
            Environment::Production => trimmed
                .strip_suffix("/api")
                .unwrap_or(trimmed)
                .trim_end_matches('/')
                .to_string(),
        }
    }

    pub fn timeout(&self) -> Seconds {
        self.timeout_secs.into()
    }
}

impl ClientConfiguration {
    pub fn base_url(&self) -> String {
        self.api.resolved_base_url(self.environment)
    }
}

/// Loads `base.toml` then the file for the environment then any overrides
/// from environment variables (with a prefix of APP and '__' as separator)
/// E.g. `APP_API__TIMEOUT_SECS=5` would set `ClientConfiguration.api.timeout_secs`
pub fn get_configuration(
    configuration_directory: &Path,
) -> Result<ClientConfiguration, config::ConfigError> {
    // Detect the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(|e: String| config::ConfigError::Message(e))?;
    let environment_filename = format!("{}.toml", environment.as_str());
    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.toml"),
        ))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename))
                .required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut result = settings.try_deserialize::<ClientConfiguration>()?;
    result.environment = environment;
    Ok(result)
}

/// The possible runtime environment for our application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not a supported environment. Use either `local` or `production`."
            )),
        }
    }
}
