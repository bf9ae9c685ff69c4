//! A stand in for the dashboard backend. It speaks the same envelope format,
//! records every call it receives and can be told how to answer so the client
//! side can be tested without a real server.

#![warn(unused_crate_dependencies)]

use actix_web::{
    http::{Method, StatusCode},
    web, App, HttpRequest, HttpResponse, HttpServer,
};
use admin_shared::{
    const_config::path::{
        PathSpec, PATH_API_AUTH_LOGIN, PATH_API_AUTH_LOGOUT, PATH_API_AUTH_ME,
        PATH_API_NOTIFICATIONS, PATH_API_NOTIFICATIONS_READ_ALL, PATH_API_NOTIFICATION_DELETE,
        PATH_API_NOTIFICATION_READ,
    },
    notification::{Notification, NotificationId, NotificationPage},
    req_args::NotificationListReqArgs,
    responses::{ApiResponse, LoginData},
    telemetry::{init_tracing, TraceTarget},
    uac::{Identity, Role},
};
use std::{
    collections::HashMap,
    fmt::Debug,
    net::TcpListener,
    ops::Deref,
    sync::{LazyLock, Mutex, MutexGuard},
    time::Duration,
};
use uuid::Uuid;

// Ensure that the `tracing` stack is only initialised once
pub static TRACING: LazyLock<String> = LazyLock::new(|| {
    let (app_name, target) = if std::env::var("TEST_LOG").is_ok() {
        (format!("client_tests{}", Uuid::new_v4()), TraceTarget::File)
    } else {
        ("test".to_string(), TraceTarget::Discard)
    };
    match init_tracing(&app_name, "info", target).unwrap() {
        Some(path) => format!("Traces for tests being written to: {path:?}"),
        None => "Traces set to std::io::sink".to_string(),
    }
});

/// How `/api/auth/me` answers
#[derive(Debug, Clone, Default)]
pub enum MeBehaviour {
    /// Success with the identity the bearer token was issued for, 401 if the
    /// token is not known
    #[default]
    TokenLookup,
    /// 401 with a reason in the body
    Reject,
    /// 200 but the envelope reports failure
    ReportFailure,
    /// Success with an identity whose role is not one of the known roles
    UnknownRole,
}

/// How `/api/auth/login` answers
#[derive(Debug, Clone, Default)]
pub enum LoginBehaviour {
    /// Success if the credentials match the test user, otherwise 200 with an
    /// envelope reporting failure
    #[default]
    CheckCredentials,
    /// Respond with this status and, if provided, an envelope with the message
    RejectWithStatus {
        status: u16,
        message: Option<String>,
    },
    /// Success but the identity has a role that is not one of the known roles
    SuccessWithUnknownRole,
}

#[derive(Debug, Default)]
struct BackendState {
    calls: Vec<String>,
    test_user: Option<TestUser>,
    issued_tokens: HashMap<String, Identity>,
    me_behaviour: MeBehaviour,
    me_delay: Option<Duration>,
    login_behaviour: LoginBehaviour,
    login_delay: Option<Duration>,
    logout_fails: bool,
    notifications: Vec<Notification>,
}

#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<BackendState>,
}

impl MockBackend {
    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("mutex poisoned")
    }

    fn record(&self, path_spec: &PathSpec) {
        self.lock().calls.push(call_name(path_spec));
    }

    /// Number of calls received for the endpoint (matched on the route
    /// pattern not the actual path)
    pub fn calls_to(&self, path_spec: &PathSpec) -> usize {
        let name = call_name(path_spec);
        self.lock().calls.iter().filter(|x| **x == name).count()
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.len()
    }

    /// Returns a token the backend will accept for `identity`
    pub fn issue_token(&self, identity: &Identity) -> String {
        let token = format!("token-{}", Uuid::new_v4());
        self.lock()
            .issued_tokens
            .insert(token.clone(), identity.clone());
        token
    }

    pub fn is_token_valid(&self, token: &str) -> bool {
        self.lock().issued_tokens.contains_key(token)
    }

    pub fn set_me_behaviour(&self, behaviour: MeBehaviour) {
        self.lock().me_behaviour = behaviour;
    }

    pub fn set_me_delay(&self, delay: Duration) {
        self.lock().me_delay = Some(delay);
    }

    pub fn set_login_behaviour(&self, behaviour: LoginBehaviour) {
        self.lock().login_behaviour = behaviour;
    }

    pub fn set_login_delay(&self, delay: Duration) {
        self.lock().login_delay = Some(delay);
    }

    pub fn set_logout_fails(&self, value: bool) {
        self.lock().logout_fails = value;
    }

    pub fn add_notification(&self, title: &str, is_read: bool) -> NotificationId {
        let mut state = self.lock();
        let id = NotificationId::new((state.notifications.len() + 1).to_string());
        state.notifications.push(Notification {
            id: id.clone(),
            title: title.to_string(),
            message: format!("{title} details"),
            kind: "order".to_string(),
            is_read,
            created_at: chrono::Utc::now(),
            link: None,
        });
        id
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    fn bearer_identity(&self, req: &HttpRequest) -> Option<Identity> {
        let token = req
            .headers()
            .get("Authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        self.lock().issued_tokens.get(token).cloned()
    }
}

fn call_name(path_spec: &PathSpec) -> String {
    format!("{} {}", path_spec.method, path_spec.path)
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub email: String,
    pub password: String,
    pub identity: Identity,
}

impl TestUser {
    pub fn generate(role: Role) -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            email: format!("{role}-{id}@example.com"),
            password: Uuid::new_v4().to_string(),
            identity: Identity {
                email: format!("{role}-{id}@example.com"),
                name: format!("Test {}", role.display_name()),
                role,
                company: None,
                avatar: None,
                id,
            },
        }
    }
}

pub struct TestApp<C> {
    pub address: String,
    pub backend: web::Data<MockBackend>,
    pub test_user: TestUser,
    pub core_client: C,
}

impl<C> Debug for TestApp<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestApp")
            .field("address", &self.address)
            .field("test_user", &self.test_user)
            .finish()
    }
}

/// Empty function for use when a call back isn't needed
pub fn no_cb() {}

/// Starts the backend on a random port and builds a client pointed at it
pub async fn spawn_app<C, F>(role: Role, build_client: F) -> TestApp<C>
where
    F: FnOnce(String) -> C,
{
    start_tracing();
    let test_user = TestUser::generate(role);
    let backend = web::Data::new(MockBackend::default());
    backend.lock().test_user = Some(test_user.clone());
    let port = start_backend_in_background(backend.clone());
    let address = port_to_test_address(port);
    let core_client = build_client(address.clone());
    TestApp {
        address,
        backend,
        test_user,
        core_client,
    }
}

pub fn port_to_test_address(application_port: u16) -> String {
    // Using the IPv4 address directly as localhost may resolve to IPv6 first
    format!("http://127.0.0.1:{application_port}")
}

fn start_tracing() {
    // Accessing TRACING also forces the LazyLock to initialize
    let logging_msg = TRACING.deref();
    println!("{logging_msg}");
}

fn start_backend_in_background(backend: web::Data<MockBackend>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
    let port = listener
        .local_addr()
        .expect("failed to get local address")
        .port();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(backend.clone())
            .route(PATH_API_AUTH_LOGIN.path, route_for(&PATH_API_AUTH_LOGIN).to(login))
            .route(PATH_API_AUTH_ME.path, route_for(&PATH_API_AUTH_ME).to(me))
            .route(PATH_API_AUTH_LOGOUT.path, route_for(&PATH_API_AUTH_LOGOUT).to(logout))
            .route(
                PATH_API_NOTIFICATIONS_READ_ALL.path,
                route_for(&PATH_API_NOTIFICATIONS_READ_ALL).to(mark_all_read),
            )
            .route(
                PATH_API_NOTIFICATIONS.path,
                route_for(&PATH_API_NOTIFICATIONS).to(list_notifications),
            )
            .route(
                PATH_API_NOTIFICATION_READ.path,
                route_for(&PATH_API_NOTIFICATION_READ).to(mark_read),
            )
            .route(
                PATH_API_NOTIFICATION_DELETE.path,
                route_for(&PATH_API_NOTIFICATION_DELETE).to(delete_notification),
            )
    })
    .workers(1)
    .listen(listener)
    .expect("failed to listen on random port")
    .run();
    // Detached, the server lives until the test runtime is dropped
    drop(tokio::spawn(server));
    port
}

fn route_for(path_spec: &PathSpec) -> actix_web::Route {
    let method = Method::from_bytes(path_spec.method.as_str().as_bytes())
        .expect("path specs only use standard methods");
    web::method(method)
}

fn failed(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::<()>::failed(message))
}

fn identity_with_unknown_role(identity: &Identity) -> serde_json::Value {
    let mut value = serde_json::to_value(identity).expect("identity is serializable");
    value["role"] = "owner".into();
    value
}

#[derive(serde::Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(backend: web::Data<MockBackend>, body: web::Json<LoginBody>) -> HttpResponse {
    backend.record(&PATH_API_AUTH_LOGIN);
    let delay = backend.lock().login_delay;
    if let Some(delay) = delay {
        actix_web::rt::time::sleep(delay).await;
    }
    let (behaviour, test_user) = {
        let state = backend.lock();
        (
            state.login_behaviour.clone(),
            state.test_user.clone().expect("test user is set on spawn"),
        )
    };
    match behaviour {
        LoginBehaviour::RejectWithStatus { status, message } => {
            let status = StatusCode::from_u16(status).expect("test uses a valid status code");
            match message {
                Some(message) => failed(status, &message),
                None => HttpResponse::build(status).finish(),
            }
        }
        LoginBehaviour::SuccessWithUnknownRole => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": {
                "token": backend.issue_token(&test_user.identity),
                "admin": identity_with_unknown_role(&test_user.identity),
            }
        })),
        LoginBehaviour::CheckCredentials => {
            if body.email == test_user.email && body.password == test_user.password {
                let token = backend.issue_token(&test_user.identity);
                HttpResponse::Ok().json(ApiResponse::ok(LoginData {
                    token,
                    admin: test_user.identity,
                }))
            } else {
                failed(StatusCode::OK, "Wrong password")
            }
        }
    }
}

async fn me(backend: web::Data<MockBackend>, req: HttpRequest) -> HttpResponse {
    backend.record(&PATH_API_AUTH_ME);
    let delay = backend.lock().me_delay;
    if let Some(delay) = delay {
        actix_web::rt::time::sleep(delay).await;
    }
    let behaviour = backend.lock().me_behaviour.clone();
    match behaviour {
        MeBehaviour::TokenLookup => match backend.bearer_identity(&req) {
            Some(identity) => HttpResponse::Ok().json(ApiResponse::ok(identity)),
            None => failed(StatusCode::UNAUTHORIZED, "Not authorized"),
        },
        MeBehaviour::Reject => failed(StatusCode::UNAUTHORIZED, "Token expired"),
        MeBehaviour::ReportFailure => failed(StatusCode::OK, "Session not found"),
        MeBehaviour::UnknownRole => match backend.bearer_identity(&req) {
            Some(identity) => HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "data": identity_with_unknown_role(&identity),
            })),
            None => failed(StatusCode::UNAUTHORIZED, "Not authorized"),
        },
    }
}

async fn logout(backend: web::Data<MockBackend>, req: HttpRequest) -> HttpResponse {
    backend.record(&PATH_API_AUTH_LOGOUT);
    if backend.lock().logout_fails {
        return HttpResponse::InternalServerError().body("logout unavailable");
    }
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|x| x.to_str().ok())
        .and_then(|x| x.strip_prefix("Bearer "))
        .map(str::to_string);
    if let Some(token) = token {
        backend.lock().issued_tokens.remove(&token);
    }
    HttpResponse::Ok().json(ApiResponse::ok(()))
}

async fn list_notifications(
    backend: web::Data<MockBackend>,
    req: HttpRequest,
    args: web::Query<NotificationListReqArgs>,
) -> HttpResponse {
    backend.record(&PATH_API_NOTIFICATIONS);
    if backend.bearer_identity(&req).is_none() {
        return failed(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    let state = backend.lock();
    let start = (args.page.saturating_sub(1) * args.limit) as usize;
    let page = NotificationPage {
        notifications: state
            .notifications
            .iter()
            .skip(start)
            .take(args.limit as usize)
            .cloned()
            .collect(),
        unread_count: state.notifications.iter().filter(|x| !x.is_read).count() as u64,
    };
    HttpResponse::Ok().json(ApiResponse::ok(page))
}

async fn mark_read(
    backend: web::Data<MockBackend>,
    req: HttpRequest,
    id: web::Path<String>,
) -> HttpResponse {
    backend.record(&PATH_API_NOTIFICATION_READ);
    if backend.bearer_identity(&req).is_none() {
        return failed(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    let mut state = backend.lock();
    match state
        .notifications
        .iter_mut()
        .find(|x| x.id.as_ref() == id.as_str())
    {
        Some(notification) => {
            notification.is_read = true;
            HttpResponse::Ok().json(ApiResponse::ok(()))
        }
        None => failed(StatusCode::NOT_FOUND, "Notification not found"),
    }
}

async fn mark_all_read(backend: web::Data<MockBackend>, req: HttpRequest) -> HttpResponse {
    backend.record(&PATH_API_NOTIFICATIONS_READ_ALL);
    if backend.bearer_identity(&req).is_none() {
        return failed(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    for notification in backend.lock().notifications.iter_mut() {
        notification.is_read = true;
    }
    HttpResponse::Ok().json(ApiResponse::ok(()))
}

async fn delete_notification(
    backend: web::Data<MockBackend>,
    req: HttpRequest,
    id: web::Path<String>,
) -> HttpResponse {
    backend.record(&PATH_API_NOTIFICATION_DELETE);
    if backend.bearer_identity(&req).is_none() {
        return failed(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    let mut state = backend.lock();
    let before = state.notifications.len();
    state.notifications.retain(|x| x.id.as_ref() != id.as_str());
    if state.notifications.len() == before {
        failed(StatusCode::NOT_FOUND, "Notification not found")
    } else {
        HttpResponse::Ok().json(ApiResponse::ok(()))
    }
}
