use anyhow::Context;
use std::{
    fs::{create_dir_all, File},
    path::{Path, PathBuf},
};
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

/// Folder trace files are written to, relative to the working directory
pub const TRACE_FOLDER: &str = "traces";

/// Where the JSON traces of a dashboard process end up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceTarget {
    /// A new timestamped file in [`TRACE_FOLDER`]
    File,
    Stdout,
    /// Traces are formatted then dropped, used by tests unless `TEST_LOG` is set
    Discard,
}

/// Bunyan formatted JSON, filtered by `RUST_LOG` if set and
/// `default_env_filter_directive` otherwise.
///
/// For details acceptable Filter Directives see <https://docs.rs/tracing-subscriber/0.3.19/tracing_subscriber/filter/struct.EnvFilter.html#directives>
pub fn get_subscriber<Sink, S>(
    name: String,
    default_env_filter_directive: S,
    sink: Sink,
) -> impl Subscriber + Sync + Send
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    S: AsRef<str>,
{
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_env_filter_directive));
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(name, sink))
}

/// Register a subscriber as global default to process span data.
///
/// It should only be called once!
pub fn init_subscriber(subscriber: impl Subscriber + Sync + Send) -> anyhow::Result<()> {
    LogTracer::init().context("Failed to set logger")?;
    set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}

/// Sets up the global subscriber for `app_name`. Returns the path of the trace
/// file when the target is [`TraceTarget::File`]
pub fn init_tracing(
    app_name: &str,
    default_env_filter_directive: &str,
    target: TraceTarget,
) -> anyhow::Result<Option<PathBuf>> {
    let name = app_name.to_string();
    match target {
        TraceTarget::File => {
            let (file, path) = create_trace_file(app_name)?;
            init_subscriber(get_subscriber(name, default_env_filter_directive, file))?;
            Ok(Some(path))
        }
        TraceTarget::Stdout => {
            init_subscriber(get_subscriber(
                name,
                default_env_filter_directive,
                std::io::stdout,
            ))?;
            Ok(None)
        }
        TraceTarget::Discard => {
            init_subscriber(get_subscriber(
                name,
                default_env_filter_directive,
                std::io::sink,
            ))?;
            Ok(None)
        }
    }
}

fn trace_filename(app_name: &str) -> String {
    format!(
        "{}_{app_name}.log",
        chrono::Local::now().format("%Y-%m-%dT%H-%M-%S")
    )
}

/// Returns a handle to the file created and the file path
pub fn create_trace_file(app_name: &str) -> anyhow::Result<(File, PathBuf)> {
    create_trace_file_in(Path::new(TRACE_FOLDER), app_name)
}

pub fn create_trace_file_in(folder: &Path, app_name: &str) -> anyhow::Result<(File, PathBuf)> {
    create_dir_all(folder)
        .with_context(|| format!("Failed to create trace folder: {folder:?}"))?;
    let file_path = folder.join(trace_filename(app_name));
    let file = File::create(&file_path)
        .with_context(|| format!("Failed to create trace file: {file_path:?}"))?;
    Ok((file, file_path))
}
