#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use concepter_application::ConcepterContext;
use concepter_application::session::{ACCESS_TOKEN_KEY, CURRENT_USER_KEY, REFRESH_TOKEN_KEY};
use concepter_core::http::{HttpError, HttpRequest, HttpResponse, HttpTransport, StatusCode};
use concepter_core::navigation::Navigator;
use concepter_core::storage::StorageMedium;
use concepter_infrastructure::storage::{MemoryMedium, PersistentStore};
use serde_json::{Value, json};

pub const BASE_URL: &str = "http://api.test";

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync;

/// Scripted transport: records every request and answers through a closure.
pub struct FakeTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responder: Box<Responder>,
    hang_on: Option<&'static str>,
}

impl FakeTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
    {
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            hang_on: None,
        }
    }

    /// Never answers requests whose URL contains `fragment`.
    pub fn hanging_on(mut self, fragment: &'static str) -> Self {
        self.hang_on = Some(fragment);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, fragment: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.contains(fragment))
            .collect()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(request.clone());
        // Let concurrently dispatched requests interleave
        tokio::task::yield_now().await;

        if self.hang_on.is_some_and(|fragment| request.url.contains(fragment)) {
            std::future::pending::<()>().await;
        }
        (self.responder)(&request)
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub medium: Arc<MemoryMedium>,
    pub storage: PersistentStore,
    pub navigator: Arc<RecordingNavigator>,
    pub context: ConcepterContext,
}

impl Harness {
    pub fn new(transport: FakeTransport) -> Self {
        Self::with_medium(transport, Arc::new(MemoryMedium::new()))
    }

    /// Builds the context over a pre-seeded medium (startup reconciliation
    /// runs against it).
    pub fn with_medium(transport: FakeTransport, medium: Arc<MemoryMedium>) -> Self {
        let transport = Arc::new(transport);
        let storage = PersistentStore::new(medium.clone());
        let navigator = Arc::new(RecordingNavigator::default());
        let context = ConcepterContext::new(
            BASE_URL,
            transport.clone(),
            storage.clone(),
            navigator.clone(),
            Duration::from_secs(5),
        );
        Self {
            transport,
            medium,
            storage,
            navigator,
            context,
        }
    }

    pub fn stored_token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY)
    }

    pub fn stored_refresh_token(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY)
    }

    pub fn stored_user(&self) -> Option<Value> {
        self.storage.get(CURRENT_USER_KEY)
    }

    pub fn has_no_session_keys(&self) -> bool {
        self.stored_token().is_none()
            && self.stored_refresh_token().is_none()
            && self.stored_user().is_none()
    }
}

/// Writes session keys the way `PersistentStore` would.
pub fn seed_session(
    medium: &MemoryMedium,
    access_token: Option<&str>,
    refresh_token: Option<&str>,
    email: Option<&str>,
) {
    if let Some(token) = access_token {
        medium
            .set_item(ACCESS_TOKEN_KEY, &serde_json::to_string(token).unwrap())
            .unwrap();
    }
    if let Some(token) = refresh_token {
        medium
            .set_item(REFRESH_TOKEN_KEY, &serde_json::to_string(token).unwrap())
            .unwrap();
    }
    if let Some(email) = email {
        medium
            .set_item(CURRENT_USER_KEY, &user_json(email).to_string())
            .unwrap();
    }
}

/// Mints an unsigned JWT expiring `offset_secs` from now.
pub fn jwt(offset_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + offset_secs;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "u-1", "exp": exp }).to_string());
    format!("{}.{}.signature", header, payload)
}

pub fn user_json(email: &str) -> Value {
    json!({
        "id": "u-1",
        "email": email,
        "firstName": "Demo",
        "lastName": "User",
        "preferences": {
            "preferredEventFormat": "HYBRID",
            "industry": "Tech",
            "language": "en",
            "timezone": "UTC"
        },
        "isActive": true
    })
}

pub fn credential_json(access_token: &str, refresh_token: &str, email: &str) -> Value {
    json!({
        "accessToken": access_token,
        "refreshToken": refresh_token,
        "tokenType": "Bearer",
        "expiresIn": 3600,
        "user": user_json(email)
    })
}

pub fn ok(body: Value) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::json_ok(&body))
}

pub fn fail(request: &HttpRequest, code: u16) -> Result<HttpResponse, HttpError> {
    Err(HttpError::Status {
        status: StatusCode::from_u16(code).unwrap(),
        method: request.method.clone(),
        url: request.url.clone(),
        body: String::new(),
    })
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
