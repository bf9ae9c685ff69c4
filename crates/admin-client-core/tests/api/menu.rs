use crate::helpers::{no_cb, spawn_app, spawn_app_with_role};
use admin_shared::{
    nav::{MenuView, NAV_SELLERS},
    uac::Role,
};

#[tokio::test]
async fn seller_menu_after_login() {
    // Arrange
    let app = spawn_app_with_role(Role::Seller).await;

    // Act
    app.login().await.unwrap();

    // Assert
    let menu = app.core_client.menu();
    assert_eq!(menu.primary.len(), 3);
    assert!(menu.secondary.is_empty());
    assert!(!menu.show_tertiary);
}

#[tokio::test]
async fn admin_menu_after_login() {
    // Arrange
    let app = spawn_app().await;

    // Act
    app.login().await.unwrap();

    // Assert
    assert_eq!(app.core_client.menu().secondary.first(), Some(&NAV_SELLERS));
}

#[tokio::test]
async fn menu_resets_after_logout() {
    // Arrange
    let app = spawn_app_with_role(Role::Manager).await;
    app.login().await.unwrap();

    // Act
    app.core_client.logout(no_cb).await.unwrap();

    // Assert
    assert_eq!(app.core_client.menu(), MenuView::default());
}
