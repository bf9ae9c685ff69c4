use admin_shared::{
    const_config::path::{PathSpec, PATH_API_AUTH_LOGIN, PATH_API_AUTH_ME},
    errors::NotLoggedInError,
    log_err_as_error,
    nav::MenuView,
    req_args::LoginReqArgs,
    responses::{ApiResponse, ErrorBody, LoginData},
    time::Seconds,
    uac::{Identity, LoginError, Role},
};
use anyhow::{anyhow, bail, Context};
use closure_traits::{ChannelCallBack, ChannelCallBackOutput};
use futures::channel::oneshot;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret as _, SecretString};
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::{
    configuration::ClientConfiguration,
    storage::{CredentialStore, FileStore, LoadedSession, SessionStorage, StoredSession},
};

pub mod api;

/// Handle to the session shared by everything in a client.
///
/// Cloning is cheap and all clones see the same session.
#[derive(Debug, Clone)]
pub struct Client {
    api_client: reqwest::Client,
    storage: SessionStorage,
    inner: Arc<Mutex<ClientInner>>,
}

#[derive(Debug)]
struct ClientInner {
    server_address: String,
    token: Option<SecretString>,
    session: Session,
    /// Advanced whenever the session is replaced or ended (bootstrap restore,
    /// successful login, logout). Responses that were issued under an older
    /// value are not applied
    generation: u64,
    bootstrap_started: bool,
}

/// Snapshot of the authentication state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Option<Arc<Identity>>,
    is_loading: bool,
}

impl Session {
    fn new_loading() -> Self {
        Self {
            identity: None,
            is_loading: true,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// `true` until the bootstrap has finished
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|x| x.role)
    }
}

#[must_use]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BootstrapOutcome {
    /// Nothing was stored, no request was made
    NoStoredSession,
    /// Stored data could not be used and was removed, no request was made
    DiscardedMalformed,
    /// The backend accepted the stored session and its version of the
    /// identity is now in use
    Confirmed,
    /// The backend did not accept the stored session (or could not be
    /// reached) and the user is now signed out
    Invalidated,
    /// A login or logout happened before the backend answered, the answer
    /// was ignored
    Superseded,
    /// Bootstrap only runs once per client
    AlreadyRan,
}

impl ClientInner {
    #[tracing::instrument]
    fn new(server_address: String) -> Self {
        Self {
            server_address,
            token: None,
            session: Session::new_loading(),
            generation: 0,
            bootstrap_started: false,
        }
    }

    fn advance_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

impl Client {
    #[tracing::instrument(name = "NEW CLIENT-CORE", skip(store))]
    pub fn new(
        server_address: String,
        timeout: Seconds,
        store: Arc<dyn CredentialStore>,
    ) -> anyhow::Result<Self> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(timeout.into());
        #[cfg(target_arch = "wasm32")]
        let _ = timeout; // Browser fetch does not support a client wide timeout
        let api_client = builder.build().context("unable to create reqwest client")?;
        Ok(Self {
            api_client,
            storage: SessionStorage::new(store),
            inner: Arc::new(Mutex::new(ClientInner::new(server_address))),
        })
    }

    /// Uses a [`FileStore`] in the configured folder
    pub fn from_configuration(configuration: &ClientConfiguration) -> anyhow::Result<Self> {
        let store = FileStore::new(&configuration.storage.directory);
        Self::new(
            configuration.base_url(),
            configuration.api.timeout(),
            Arc::new(store),
        )
    }

    /// Restores the stored session (if any) and confirms it with the backend.
    ///
    /// The stored identity is used straight away, before the backend answers.
    /// Only the first call does anything.
    #[tracing::instrument(skip(ui_notify))]
    pub fn bootstrap<F: UiCallBack>(&self, ui_notify: F) -> oneshot::Receiver<BootstrapOutcome> {
        {
            let mut inner = self.lock();
            if inner.bootstrap_started {
                warn!("bootstrap requested more than once");
                return resolved(BootstrapOutcome::AlreadyRan, ui_notify);
            }
            inner.bootstrap_started = true;
        }

        let stored = match self.storage.load() {
            Ok(LoadedSession::Present(stored)) => stored,
            Ok(LoadedSession::Absent) => {
                self.lock().session.is_loading = false;
                return resolved(BootstrapOutcome::NoStoredSession, ui_notify);
            }
            Ok(LoadedSession::Malformed(reason)) => {
                warn!(%reason, "discarding stored session");
                return resolved(self.discard_stored_session(), ui_notify);
            }
            Err(err) => {
                warn!(?err, "failed to read stored session");
                return resolved(self.discard_stored_session(), ui_notify);
            }
        };

        let generation = {
            let mut inner = self.lock();
            inner.token = Some(stored.token.clone());
            inner.session.identity = Some(Arc::new(stored.identity));
            inner.advance_generation()
        };
        info!("restored stored session, confirming with backend");

        let token = stored.token;
        let (tx, rx) = oneshot::channel();
        let request = self.request_builder(&PATH_API_AUTH_ME, None, Some(&token));
        let client = self.clone();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let outcome = process_revalidation(resp, client, generation, token).await;
            send_outcome(tx, outcome);
            ui_notify();
        };
        self.initiate_request(request, on_done);
        rx
    }

    fn discard_stored_session(&self) -> BootstrapOutcome {
        let mut inner = self.lock();
        log_err_as_error!(self.storage.clear());
        inner.session.is_loading = false;
        BootstrapOutcome::DiscardedMalformed
    }

    /// On failure nothing stored is changed and a pending bootstrap is not
    /// affected. Only a successful login replaces the session
    #[tracing::instrument(skip(ui_notify))]
    pub fn login<F: UiCallBack>(
        &self,
        args: LoginReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<Result<(), LoginError>> {
        let (tx, rx) = oneshot::channel();
        let generation = self.lock().generation;
        let request = self
            .request_builder(&PATH_API_AUTH_LOGIN, None, None)
            .json(&args.to_request_body());
        let client = self.clone();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_login(resp, client, generation).await;
            send_outcome(tx, msg);
            ui_notify();
        };
        self.initiate_request(request, on_done);
        rx
    }

    #[tracing::instrument(skip(request, on_done))]
    fn initiate_request<F, O>(&self, request: reqwest::RequestBuilder, on_done: F)
    where
        F: ChannelCallBack<O>,
        O: ChannelCallBackOutput,
    {
        reqwest_cross::fetch(request, on_done)
    }

    /// WARNING: The token is only ever sent as a header, never logged
    fn request_builder(
        &self,
        path_spec: &PathSpec,
        id: Option<&str>,
        token: Option<&SecretString>,
    ) -> reqwest::RequestBuilder {
        debug_assert_eq!(
            id.is_some(),
            path_spec.has_id_placeholder(),
            "an id must be given exactly when the path expects one: {}",
            path_spec.path
        );
        let path = match id {
            Some(id) => path_spec.with_id(id),
            None => path_spec.path.to_string(),
        };
        let request = self
            .api_client
            .request(path_spec.method.clone(), self.path_to_url(&path));
        match token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Builds a request carrying the current token, fails if there is none
    fn authenticated_request<T>(
        &self,
        path_spec: &PathSpec,
        id: Option<&str>,
        args: Option<&T>,
    ) -> Result<reqwest::RequestBuilder, NotLoggedInError>
    where
        T: serde::Serialize + Debug,
    {
        let token = self.lock().token.clone().ok_or(NotLoggedInError)?;
        let request = self.request_builder(path_spec, id, Some(&token));
        Ok(match args {
            Some(args) if path_spec.method == Method::GET => request.query(args),
            Some(args) => request.json(args),
            None => request,
        })
    }

    fn send_request_expect_json<F, T, U>(
        &self,
        path_spec: &PathSpec,
        id: Option<&str>,
        args: Option<&T>,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<U>>
    where
        T: serde::Serialize + Debug,
        F: UiCallBack,
        U: Send + Debug + serde::de::DeserializeOwned + 'static,
    {
        let request = match self.authenticated_request(path_spec, id, args) {
            Ok(request) => request,
            Err(e) => return resolved(Err(e.into()), ui_notify),
        };
        let (tx, rx) = oneshot::channel();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_json_envelope(resp).await;
            send_outcome(tx, msg);
            ui_notify();
        };
        self.initiate_request(request, on_done);
        rx
    }

    fn send_request_expect_ack<F, T>(
        &self,
        path_spec: &PathSpec,
        id: Option<&str>,
        args: Option<&T>,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<()>>
    where
        T: serde::Serialize + Debug,
        F: UiCallBack,
    {
        let request = match self.authenticated_request(path_spec, id, args) {
            Ok(request) => request,
            Err(e) => return resolved(Err(e.into()), ui_notify),
        };
        let (tx, rx) = oneshot::channel();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_ack(resp).await;
            send_outcome(tx, msg);
            ui_notify();
        };
        self.initiate_request(request, on_done);
        rx
    }

    #[tracing::instrument(ret)]
    fn path_to_url(&self, path: &str) -> String {
        format!("{}{path}", &self.lock().server_address)
    }

    fn lock(&self) -> MutexGuard<'_, ClientInner> {
        self.inner.lock().expect("mutex poisoned")
    }

    pub fn session(&self) -> Session {
        self.lock().session.clone()
    }

    pub fn user_info(&self) -> Option<Arc<Identity>> {
        self.lock().session.identity.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.lock().session.is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().session.is_loading
    }

    /// Navigation visible to the current user. Only a display hint, the
    /// backend is responsible for enforcing what a role may do
    pub fn menu(&self) -> MenuView {
        MenuView::for_role(self.lock().session.role())
    }
}

fn resolved<T, F: UiCallBack>(value: T, ui_notify: F) -> oneshot::Receiver<T> {
    let (tx, rx) = oneshot::channel();
    send_outcome(tx, value);
    ui_notify();
    rx
}

/// The caller is allowed to drop the receiver if they are not interested
fn send_outcome<T>(tx: oneshot::Sender<T>, value: T) {
    if tx.send(value).is_err() {
        debug!("receiver dropped before outcome was sent");
    }
}

#[tracing::instrument(skip(client, token))]
async fn process_revalidation(
    response: reqwest::Result<reqwest::Response>,
    client: Client,
    generation: u64,
    token: SecretString,
) -> BootstrapOutcome {
    let result = process_json_envelope::<Identity>(response).await;
    let mut inner = client.lock();
    inner.session.is_loading = false;
    if inner.generation != generation {
        info!("session changed while confirming, ignoring response");
        return BootstrapOutcome::Superseded;
    }
    match result {
        Ok(identity) => {
            log_err_as_error!(client
                .storage
                .save(&StoredSession::new(token.clone(), identity.clone())));
            inner.token = Some(token);
            inner.session.identity = Some(Arc::new(identity));
            BootstrapOutcome::Confirmed
        }
        Err(err) => {
            warn!(?err, "stored session not accepted, signing out locally");
            log_err_as_error!(client.storage.clear());
            inner.token = None;
            inner.session.identity = None;
            BootstrapOutcome::Invalidated
        }
    }
}

#[tracing::instrument(ret, skip(client))]
async fn process_login(
    response: reqwest::Result<reqwest::Response>,
    client: Client,
    generation: u64,
) -> Result<(), LoginError> {
    let response = match response {
        Ok(response) => response,
        Err(err) => {
            info!(?err, "login request did not complete");
            return Err(LoginError::from_transport_msg(err.to_string()));
        }
    };
    let status = response.status();
    if !status.is_success() {
        return Err(login_rejection(response).await);
    }
    let envelope: ApiResponse<serde_json::Value> = match response.json().await {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(?err, "login response was not an envelope");
            return Err(LoginError::Failed);
        }
    };
    if !envelope.success {
        // Server reason deliberately not shown
        debug!(reason = envelope.reason(), "login not successful");
        return Err(LoginError::InvalidCredentials);
    }
    let LoginData { token, admin } = match envelope.data.map(serde_json::from_value::<LoginData>) {
        Some(Ok(data)) => data,
        Some(Err(err)) => {
            warn!(?err, "login data unreadable");
            return Err(LoginError::Failed);
        }
        None => {
            warn!("login reported success without data");
            return Err(LoginError::Failed);
        }
    };
    let token: SecretString = token.into();

    let mut inner = client.lock();
    if inner.generation != generation {
        info!("session changed while logging in, ignoring response");
        return Err(LoginError::Superseded);
    }
    inner.advance_generation();
    log_err_as_error!(client
        .storage
        .save(&StoredSession::new(token.clone(), admin.clone())));
    inner.token = Some(token);
    inner.session.identity = Some(Arc::new(admin));
    Ok(())
}

/// Uses the reason from the body if the backend gave one
async fn login_rejection(response: reqwest::Response) -> LoginError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let reason = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|x| x.reason().map(str::to_string));
    match reason {
        Some(reason) => LoginError::Rejected(reason),
        None => LoginError::from_transport_msg(format!(
            "Request failed with status code {}",
            status.as_u16()
        )),
    }
}

#[tracing::instrument(ret, err(Debug))]
async fn process_empty(response: reqwest::Result<reqwest::Response>) -> anyhow::Result<()> {
    let (response, status) = extract_response(response)?;
    if status.is_success() {
        Ok(())
    } else {
        Err(handle_error(response).await)
    }
}

/// A success status with an empty body or an envelope reporting success
#[tracing::instrument(ret, err(Debug))]
async fn process_ack(response: reqwest::Result<reqwest::Response>) -> anyhow::Result<()> {
    let (response, status) = extract_response(response)?;
    if !status.is_success() {
        return Err(handle_error(response).await);
    }
    let body = response.text().await.context("failed to get response body")?;
    if body.trim().is_empty() {
        return Ok(());
    }
    let envelope: ApiResponse<serde_json::Value> =
        serde_json::from_str(&body).context("failed to parse result as json")?;
    if !envelope.success {
        bail!(
            "backend reported failure: {}",
            envelope.reason().unwrap_or("no reason given")
        );
    }
    Ok(())
}

#[tracing::instrument(ret, err(Debug))]
async fn process_json_envelope<T>(response: reqwest::Result<reqwest::Response>) -> anyhow::Result<T>
where
    T: Debug + serde::de::DeserializeOwned,
{
    let (response, status) = extract_response(response)?;
    if !status.is_success() {
        return Err(handle_error(response).await);
    }
    let envelope: ApiResponse<T> = response
        .json()
        .await
        .context("failed to parse result as json")?;
    envelope.into_data()
}

#[tracing::instrument(ret)]
async fn handle_error(response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    debug_assert!(
        !status.is_success(),
        "this is supposed to be an error, right? Status code is: {status}"
    );
    let Ok(body) = response.text().await else {
        return anyhow!("failed to get response body");
    };
    if let Some(reason) = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .as_ref()
        .and_then(ErrorBody::reason)
    {
        return anyhow!("{reason}");
    }
    if body.is_empty() {
        anyhow!("request failed with status code: {status} and no body")
    } else {
        anyhow!("{body}")
    }
}

/// Provides a way to standardize the error message
#[tracing::instrument(ret, err(Debug))]
fn extract_response(
    response: reqwest::Result<reqwest::Response>,
) -> anyhow::Result<(reqwest::Response, StatusCode)> {
    if response.is_err() {
        info!("Response is err: {:#?}", response);
    }
    let response = response.context("failed to send request")?;
    let status = response.status();
    Ok((response, status))
}

pub trait UiCallBack: 'static + Send + FnOnce() {}
impl<T> UiCallBack for T where T: 'static + Send + FnOnce() {}

#[cfg(not(target_arch = "wasm32"))]
pub mod closure_traits {
    pub trait ChannelCallBack<O>:
        'static + Send + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    impl<T, O> ChannelCallBack<O> for T where
        T: 'static + Send + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    pub trait ChannelCallBackOutput: futures::Future<Output = ()> + Send {}
    impl<T> ChannelCallBackOutput for T where T: futures::Future<Output = ()> + Send {}
}

#[cfg(target_arch = "wasm32")]
pub mod closure_traits {
    pub trait ChannelCallBack<O>:
        'static + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    impl<T, O> ChannelCallBack<O> for T where
        T: 'static + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    pub trait ChannelCallBackOutput: futures::Future<Output = ()> {}
    impl<T> ChannelCallBackOutput for T where T: futures::Future<Output = ()> {}
}
