use admin_shared::{
    const_config::path::{
        PATH_API_NOTIFICATIONS, PATH_API_NOTIFICATIONS_READ_ALL, PATH_API_NOTIFICATION_DELETE,
        PATH_API_NOTIFICATION_READ,
    },
    notification::{NotificationId, NotificationPage},
    req_args::NotificationListReqArgs,
};
use futures::channel::oneshot;

use crate::{client::UiCallBack, Client};

/// Placeholder type for requests without arguments
const NO_ARGS: Option<&()> = None;

impl Client {
    #[tracing::instrument(skip(ui_notify))]
    pub fn notifications<F: UiCallBack>(
        &self,
        args: &NotificationListReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<NotificationPage>> {
        self.send_request_expect_json(&PATH_API_NOTIFICATIONS, None, Some(args), ui_notify)
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn mark_notification_read<F: UiCallBack>(
        &self,
        id: &NotificationId,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<()>> {
        self.send_request_expect_ack(
            &PATH_API_NOTIFICATION_READ,
            Some(id.as_ref()),
            NO_ARGS,
            ui_notify,
        )
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn mark_all_notifications_read<F: UiCallBack>(
        &self,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<()>> {
        self.send_request_expect_ack(&PATH_API_NOTIFICATIONS_READ_ALL, None, NO_ARGS, ui_notify)
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn delete_notification<F: UiCallBack>(
        &self,
        id: &NotificationId,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<()>> {
        self.send_request_expect_ack(
            &PATH_API_NOTIFICATION_DELETE,
            Some(id.as_ref()),
            NO_ARGS,
            ui_notify,
        )
    }
}
