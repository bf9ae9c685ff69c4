use crate::helpers::{no_cb, spawn_app};
use admin_shared::{
    errors::NotLoggedInError,
    notification::NotificationId,
    req_args::NotificationListReqArgs,
};

#[tokio::test]
async fn listing_requires_login() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let outcome = app
        .core_client
        .notifications(&NotificationListReqArgs::default(), no_cb)
        .await
        .unwrap();

    // Assert
    let error = outcome.unwrap_err();
    assert!(error.downcast_ref::<NotLoggedInError>().is_some(), "{error:?}");
    assert_eq!(app.backend.total_calls(), 0);
}

#[tokio::test]
async fn listing_is_paged_with_total_unread() {
    // Arrange
    let app = spawn_app().await;
    for i in 0..12 {
        app.backend.add_notification(&format!("Order {i}"), i % 3 == 0);
    }
    app.login().await.unwrap();

    // Act
    let first = app
        .core_client
        .notifications(&NotificationListReqArgs::new(1, 10), no_cb)
        .await
        .unwrap()
        .unwrap();
    let second = app
        .core_client
        .notifications(&NotificationListReqArgs::new(2, 10), no_cb)
        .await
        .unwrap()
        .unwrap();

    // Assert
    assert_eq!(first.notifications.len(), 10);
    assert_eq!(second.notifications.len(), 2);
    assert_eq!(first.unread_count, 8);
    assert_eq!(second.unread_count, 8);
    assert_eq!(first.badge().as_deref(), Some("8"));
    assert_eq!(second.notifications[0].title, "Order 10");
}

#[tokio::test]
async fn mark_one_read() {
    // Arrange
    let app = spawn_app().await;
    let id = app.backend.add_notification("New order", false);
    app.backend.add_notification("Low stock", false);
    app.login().await.unwrap();

    // Act
    app.core_client
        .mark_notification_read(&id, no_cb)
        .await
        .unwrap()
        .unwrap();

    // Assert
    let page = app
        .core_client
        .notifications(&NotificationListReqArgs::default(), no_cb)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.unread_count, 1);
    assert!(page.notifications.iter().any(|x| x.id == id && x.is_read));
}

#[tokio::test]
async fn mark_all_read() {
    // Arrange
    let app = spawn_app().await;
    app.backend.add_notification("New order", false);
    app.backend.add_notification("Low stock", false);
    app.login().await.unwrap();

    // Act
    app.core_client
        .mark_all_notifications_read(no_cb)
        .await
        .unwrap()
        .unwrap();

    // Assert
    assert!(app.backend.notifications().iter().all(|x| x.is_read));
}

#[tokio::test]
async fn delete_removes_notification() {
    // Arrange
    let app = spawn_app().await;
    let id = app.backend.add_notification("New order", false);
    app.login().await.unwrap();

    // Act
    app.core_client
        .delete_notification(&id, no_cb)
        .await
        .unwrap()
        .unwrap();

    // Assert
    assert!(app.backend.notifications().is_empty());
}

#[tokio::test]
async fn delete_unknown_reports_backend_reason() {
    // Arrange
    let app = spawn_app().await;
    app.login().await.unwrap();

    // Act
    let outcome = app
        .core_client
        .delete_notification(&NotificationId::new("404"), no_cb)
        .await
        .unwrap();

    // Assert
    assert_eq!(outcome.unwrap_err().to_string(), "Notification not found");
}

#[tokio::test]
async fn requests_stop_after_logout() {
    // Arrange
    let app = spawn_app().await;
    app.login().await.unwrap();
    app.core_client.logout(no_cb).await.unwrap();
    let calls_before = app.backend.total_calls();

    // Act
    let outcome = app
        .core_client
        .mark_all_notifications_read(no_cb)
        .await
        .unwrap();

    // Assert
    assert!(outcome.is_err());
    assert_eq!(app.backend.total_calls(), calls_before);
}
