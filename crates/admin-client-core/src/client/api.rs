use admin_shared::{
    const_config::path::PATH_API_AUTH_LOGOUT, log_err_as_error, log_err_as_warn,
};
use futures::channel::oneshot;
use secrecy::SecretString;

use super::{process_empty, send_outcome};
use crate::{client::UiCallBack, Client};

mod notifications;

impl Client {
    /// Always ends the local session, even if the backend cannot be told
    #[tracing::instrument(skip(ui_notify))]
    pub fn logout<F: UiCallBack>(&self, ui_notify: F) -> oneshot::Receiver<()> {
        let token = self.end_session();
        let (tx, rx) = oneshot::channel();
        let request = self.request_builder(&PATH_API_AUTH_LOGOUT, None, token.as_ref());
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            log_err_as_warn!(process_empty(resp).await);
            send_outcome(tx, ());
            ui_notify();
        };
        self.initiate_request(request, on_done);
        rx
    }

    #[tracing::instrument]
    pub fn logout_no_wait(&self) {
        drop(self.logout(|| {}));
    }

    /// Clears the session and the stored credentials, returning the token so
    /// the backend can still be told
    fn end_session(&self) -> Option<SecretString> {
        let mut inner = self.lock();
        inner.advance_generation();
        inner.session.identity = None;
        log_err_as_error!(self.storage.clear());
        inner.token.take()
    }
}
