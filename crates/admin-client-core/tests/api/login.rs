use crate::helpers::{no_cb, spawn_app, storage_for, unreachable_client, LoginBehaviour};
use admin_client_core::{CredentialStore as _, MemoryStore, StoredSession};
use admin_shared::{
    const_config::{
        path::PATH_API_AUTH_LOGIN,
        storage::{STORAGE_LEGACY_TOKEN_KEY, STORAGE_LEGACY_USER_KEY, STORAGE_SESSION_KEY},
    },
    uac::LoginError,
};
use rstest::rstest;
use secrecy::ExposeSecret as _;
use std::{sync::Arc, time::Duration};

#[tokio::test]
async fn login_success_stores_session() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let outcome = app.login().await;

    // Assert
    outcome.unwrap();
    assert!(app.core_client.is_logged_in());
    assert_eq!(
        app.core_client.user_info().as_deref(),
        Some(&app.test_user.identity)
    );
    let stored = app.stored_session().expect("session should be stored");
    assert_eq!(stored.identity, app.test_user.identity);
    assert!(app.backend.is_token_valid(stored.token.expose_secret()));
}

#[tokio::test]
async fn login_failure_wrong_password() {
    // Arrange
    let app = spawn_app().await;
    let login_args = app
        .login_args()
        .password("random-password".to_string().into());

    // Act
    let outcome = app.core_client.login(login_args, no_cb).await.unwrap();

    // Assert - The reason the backend gave is not passed on
    let error = outcome.unwrap_err();
    assert_eq!(error, LoginError::InvalidCredentials);
    assert_eq!(error.to_string(), "Invalid credentials");
    assert!(!app.core_client.is_logged_in());
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn login_failure_rejected_with_reason() {
    // Arrange
    let app = spawn_app().await;
    app.backend
        .set_login_behaviour(LoginBehaviour::RejectWithStatus {
            status: 401,
            message: Some("Account locked".to_string()),
        });

    // Act
    let outcome = app.login().await;

    // Assert
    assert_eq!(
        outcome.unwrap_err(),
        LoginError::Rejected("Account locked".to_string())
    );
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn login_failure_rejected_without_reason() {
    // Arrange
    let app = spawn_app().await;
    app.backend
        .set_login_behaviour(LoginBehaviour::RejectWithStatus {
            status: 500,
            message: None,
        });

    // Act
    let outcome = app.login().await;

    // Assert
    assert_eq!(
        outcome.unwrap_err().to_string(),
        "Request failed with status code 500"
    );
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn login_failure_unreachable_backend() {
    // Arrange
    let app = spawn_app().await;
    let store = Arc::new(MemoryStore::default());
    let client = unreachable_client(store.clone());

    // Act
    let outcome = client.login(app.login_args(), no_cb).await.unwrap();

    // Assert
    let error = outcome.unwrap_err();
    assert!(matches!(error, LoginError::Transport(_)), "{error:?}");
    assert!(!error.to_string().is_empty());
    assert!(!client.is_logged_in());
    assert!(store.is_empty());
}

#[tokio::test]
async fn login_failure_unknown_role() {
    // Arrange
    let app = spawn_app().await;
    app.backend
        .set_login_behaviour(LoginBehaviour::SuccessWithUnknownRole);

    // Act
    let outcome = app.login().await;

    // Assert
    assert_eq!(outcome.unwrap_err(), LoginError::Failed);
    assert!(!app.core_client.is_logged_in());
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn logout_during_login_wins() {
    // Arrange
    let app = spawn_app().await;
    app.backend.set_login_delay(Duration::from_millis(500));
    let rx = app.core_client.login(app.login_args(), no_cb);

    // Act
    app.core_client.logout(no_cb).await.unwrap();
    let outcome = rx.await.unwrap();

    // Assert
    assert_eq!(outcome.unwrap_err(), LoginError::Superseded);
    assert!(!app.core_client.is_logged_in());
    assert!(app.store.is_empty());
    assert_eq!(app.backend.calls_to(&PATH_API_AUTH_LOGIN), 1);
}

#[tokio::test]
async fn login_does_not_end_loading() {
    // Arrange
    let app = spawn_app().await;

    // Act
    app.login().await.unwrap();

    // Assert - Only bootstrap finishes loading
    assert!(app.core_client.is_loading());
}

#[rstest]
#[case::wrong_password(LoginBehaviour::CheckCredentials, LoginError::InvalidCredentials)]
#[case::rejected(
    LoginBehaviour::RejectWithStatus { status: 403, message: Some("Account locked".to_string()) },
    LoginError::Rejected("Account locked".to_string())
)]
#[case::unknown_role(LoginBehaviour::SuccessWithUnknownRole, LoginError::Failed)]
#[tokio::test]
async fn failed_login_keeps_stored_session(
    #[case] behaviour: LoginBehaviour,
    #[case] expected: LoginError,
) {
    // Arrange
    let app = spawn_app().await;
    let token = app.seed_valid_session();
    let before = app.stored_raw();
    app.backend.set_login_behaviour(behaviour);
    let login_args = app
        .login_args()
        .password("random-password".to_string().into());

    // Act
    let outcome = app.core_client.login(login_args, no_cb).await.unwrap();

    // Assert
    assert_eq!(outcome.unwrap_err(), expected);
    assert_eq!(app.stored_raw(), before);
    assert_eq!(app.stored_session().unwrap().token.expose_secret(), token);
}

#[tokio::test]
async fn failed_login_keeps_legacy_pair() {
    // Arrange
    let app = spawn_app().await;
    app.store.set(STORAGE_LEGACY_TOKEN_KEY, "legacy-token").unwrap();
    app.store
        .set(
            STORAGE_LEGACY_USER_KEY,
            &serde_json::to_string(&app.test_user.identity).unwrap(),
        )
        .unwrap();
    let before = app.stored_raw();
    let login_args = app
        .login_args()
        .password("random-password".to_string().into());

    // Act
    let outcome = app.core_client.login(login_args, no_cb).await.unwrap();

    // Assert
    assert_eq!(outcome.unwrap_err(), LoginError::InvalidCredentials);
    assert_eq!(app.stored_raw(), before);
    assert!(!app.store.contains_key(STORAGE_SESSION_KEY));
}

#[tokio::test]
async fn unreachable_backend_keeps_stored_session() {
    // Arrange
    let app = spawn_app().await;
    let store = Arc::new(MemoryStore::default());
    storage_for(&store)
        .save(&StoredSession::new(
            "tok".to_string().into(),
            app.test_user.identity.clone(),
        ))
        .unwrap();
    let before = store.get(STORAGE_SESSION_KEY).unwrap();
    let client = unreachable_client(store.clone());

    // Act
    let outcome = client.login(app.login_args(), no_cb).await.unwrap();

    // Assert
    assert!(matches!(outcome, Err(LoginError::Transport(_))));
    assert!(before.is_some());
    assert_eq!(store.get(STORAGE_SESSION_KEY).unwrap(), before);
}
