use crate::helpers::{no_cb, spawn_app, storage_for, unreachable_client, MeBehaviour};
use admin_client_core::{BootstrapOutcome, CredentialStore as _, MemoryStore, StoredSession};
use admin_shared::{
    const_config::{
        path::PATH_API_AUTH_ME,
        storage::{STORAGE_LEGACY_TOKEN_KEY, STORAGE_LEGACY_USER_KEY, STORAGE_SESSION_KEY},
    },
    uac::LoginError,
};
use rstest::rstest;
use secrecy::ExposeSecret as _;
use std::{sync::Arc, time::Duration};

#[tokio::test]
async fn nothing_stored_makes_no_request() {
    // Arrange
    let app = spawn_app().await;
    assert!(app.core_client.is_loading());

    // Act
    let outcome = app.bootstrap().await;

    // Assert
    assert_eq!(outcome, BootstrapOutcome::NoStoredSession);
    assert!(!app.core_client.is_logged_in());
    assert!(!app.core_client.is_loading());
    assert_eq!(app.backend.total_calls(), 0);
}

#[tokio::test]
async fn confirmed_session_uses_backend_identity() {
    // Arrange
    let app = spawn_app().await;
    let stale_identity = app.test_user.identity.clone();
    let mut server_identity = stale_identity.clone();
    server_identity.name = "Renamed On Server".to_string();
    server_identity.avatar = Some("avatar.png".to_string());
    let token = app.backend.issue_token(&server_identity);
    app.seed_session(token, stale_identity);

    // Act
    let outcome = app.bootstrap().await;

    // Assert
    assert_eq!(outcome, BootstrapOutcome::Confirmed);
    assert_eq!(
        app.core_client.user_info().as_deref(),
        Some(&server_identity)
    );
    assert!(!app.core_client.is_loading());
    assert_eq!(app.stored_session().unwrap().identity, server_identity);
    assert_eq!(app.backend.calls_to(&PATH_API_AUTH_ME), 1);
}

#[tokio::test]
async fn stored_identity_is_used_before_backend_answers() {
    // Arrange
    let app = spawn_app().await;
    app.seed_valid_session();
    app.backend.set_me_delay(Duration::from_millis(300));

    // Act
    let rx = app.core_client.bootstrap(|| {});

    // Assert - Optimistically restored
    let session = app.core_client.session();
    assert!(session.is_authenticated());
    assert!(session.is_loading());
    assert_eq!(session.identity(), Some(&app.test_user.identity));

    // Assert - Confirmed once answered
    assert_eq!(rx.await.unwrap(), BootstrapOutcome::Confirmed);
    assert!(!app.core_client.is_loading());
    assert!(app.core_client.is_logged_in());
}

#[rstest]
#[case::rejected(MeBehaviour::Reject)]
#[case::reported_failure(MeBehaviour::ReportFailure)]
#[case::unknown_role(MeBehaviour::UnknownRole)]
#[tokio::test]
async fn backend_refusal_clears_session(#[case] behaviour: MeBehaviour) {
    // Arrange
    let app = spawn_app().await;
    app.seed_valid_session();
    app.backend.set_me_behaviour(behaviour);

    // Act
    let outcome = app.bootstrap().await;

    // Assert
    assert_eq!(outcome, BootstrapOutcome::Invalidated);
    assert!(!app.core_client.is_logged_in());
    assert!(!app.core_client.is_loading());
    assert!(app.stored_session().is_none());
    assert!(app.store.is_empty());
    assert_eq!(app.backend.calls_to(&PATH_API_AUTH_ME), 1);
}

#[tokio::test]
async fn unknown_token_clears_session() {
    // Arrange
    let app = spawn_app().await;
    app.seed_session("not-issued".to_string(), app.test_user.identity.clone());

    // Act
    let outcome = app.bootstrap().await;

    // Assert
    assert_eq!(outcome, BootstrapOutcome::Invalidated);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn unreachable_backend_clears_session() {
    // Arrange
    let app = spawn_app().await;
    let store = Arc::new(MemoryStore::default());
    storage_for(&store)
        .save(&StoredSession::new(
            "tok".to_string().into(),
            app.test_user.identity.clone(),
        ))
        .unwrap();
    let client = unreachable_client(store.clone());

    // Act
    let outcome = client.bootstrap(|| {}).await.unwrap();

    // Assert
    assert_eq!(outcome, BootstrapOutcome::Invalidated);
    assert!(!client.is_logged_in());
    assert!(!client.is_loading());
    assert!(store.is_empty());
}

#[rstest]
#[case::not_json("{garbage")]
#[case::unknown_role(r#"{"token": "t", "identity": {"id": "1", "email": "e@x.io", "name": "N", "role": "owner"}}"#)]
#[tokio::test]
async fn malformed_record_is_discarded_without_request(#[case] raw: &str) {
    // Arrange
    let app = spawn_app().await;
    app.store.set(STORAGE_SESSION_KEY, raw).unwrap();

    // Act
    let outcome = app.bootstrap().await;

    // Assert
    assert_eq!(outcome, BootstrapOutcome::DiscardedMalformed);
    assert!(!app.core_client.is_logged_in());
    assert!(!app.core_client.is_loading());
    assert!(app.store.is_empty());
    assert_eq!(app.backend.total_calls(), 0);
}

#[tokio::test]
async fn half_of_legacy_pair_is_discarded_without_request() {
    // Arrange
    let app = spawn_app().await;
    app.store.set(STORAGE_LEGACY_TOKEN_KEY, "tok").unwrap();

    // Act
    let outcome = app.bootstrap().await;

    // Assert
    assert_eq!(outcome, BootstrapOutcome::DiscardedMalformed);
    assert!(app.store.is_empty());
    assert_eq!(app.backend.total_calls(), 0);
}

#[tokio::test]
async fn legacy_pair_is_migrated_and_confirmed() {
    // Arrange
    let app = spawn_app().await;
    let token = app.backend.issue_token(&app.test_user.identity);
    app.store.set(STORAGE_LEGACY_TOKEN_KEY, &token).unwrap();
    app.store
        .set(
            STORAGE_LEGACY_USER_KEY,
            &serde_json::to_string(&app.test_user.identity).unwrap(),
        )
        .unwrap();

    // Act
    let outcome = app.bootstrap().await;

    // Assert
    assert_eq!(outcome, BootstrapOutcome::Confirmed);
    assert!(app.core_client.is_logged_in());
    assert!(app.store.contains_key(STORAGE_SESSION_KEY));
    assert!(!app.store.contains_key(STORAGE_LEGACY_TOKEN_KEY));
    assert!(!app.store.contains_key(STORAGE_LEGACY_USER_KEY));
}

#[tokio::test]
async fn only_runs_once() {
    // Arrange
    let app = spawn_app().await;
    app.seed_valid_session();
    assert_eq!(app.bootstrap().await, BootstrapOutcome::Confirmed);

    // Act
    let outcome = app.bootstrap().await;

    // Assert
    assert_eq!(outcome, BootstrapOutcome::AlreadyRan);
    assert_eq!(app.backend.calls_to(&PATH_API_AUTH_ME), 1);
}

#[tokio::test]
async fn logout_while_confirming_wins() {
    // Arrange
    let app = spawn_app().await;
    app.seed_valid_session();
    app.backend.set_me_delay(Duration::from_millis(500));
    let rx = app.core_client.bootstrap(|| {});

    // Act
    app.core_client.logout(|| {}).await.unwrap();
    let outcome = rx.await.unwrap();

    // Assert - The late confirmation must not restore the session
    assert_eq!(outcome, BootstrapOutcome::Superseded);
    assert!(!app.core_client.is_logged_in());
    assert!(!app.core_client.is_loading());
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn failed_login_does_not_hide_rejection() {
    // Arrange
    let app = spawn_app().await;
    app.seed_valid_session();
    app.backend.set_me_behaviour(MeBehaviour::Reject);
    app.backend.set_me_delay(Duration::from_millis(500));
    let rx = app.core_client.bootstrap(no_cb);
    let login_args = app
        .login_args()
        .password("random-password".to_string().into());

    // Act
    let login_outcome = app.core_client.login(login_args, no_cb).await.unwrap();
    let outcome = rx.await.unwrap();

    // Assert - The expired session is still cleared
    assert_eq!(login_outcome.unwrap_err(), LoginError::InvalidCredentials);
    assert_eq!(outcome, BootstrapOutcome::Invalidated);
    assert!(!app.core_client.is_logged_in());
    assert!(!app.core_client.is_loading());
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn successful_login_while_confirming_wins() {
    // Arrange
    let app = spawn_app().await;
    app.seed_session("expired".to_string(), app.test_user.identity.clone());
    app.backend.set_me_delay(Duration::from_millis(500));
    let rx = app.core_client.bootstrap(no_cb);

    // Act
    app.login().await.unwrap();
    let outcome = rx.await.unwrap();

    // Assert - The late rejection of the old token must not sign out the new session
    assert_eq!(outcome, BootstrapOutcome::Superseded);
    assert!(app.core_client.is_logged_in());
    let stored = app.stored_session().expect("new session should be stored");
    assert_ne!(stored.token.expose_secret(), "expired");
}

#[tokio::test]
async fn client_debug_output_hides_token() {
    // Arrange
    let app = spawn_app().await;
    let token = app.seed_valid_session();

    // Act
    assert_eq!(app.bootstrap().await, BootstrapOutcome::Confirmed);
    let actual = format!("{:?}", app.core_client);

    // Assert
    assert!(!actual.contains(&token), "{actual}");
}
