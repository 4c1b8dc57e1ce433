//! Integration tests for the Ajaxtreon ERP client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ajaxtreon-integration-tests
//! ```
//!
//! The tests need no external services: [`MockBackend`] serves a small slice
//! of the ERP REST API from an in-process axum router bound to
//! `127.0.0.1:0`, and records every request it sees so tests can assert on
//! headers and call counts.
//!
//! # Test Categories
//!
//! - `session_flow` - Session resolution, login, logout and invalidation
//! - `resources` - Resource wrappers, headers and error normalization
//! - `route_guard` - Role-based navigation decisions end to end

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use ajaxtreon_client::identity::NoIdentityProvider;
use ajaxtreon_client::store::{MemoryTokenStore, TokenStore};
use ajaxtreon_client::{ApiClient, ClientConfig, SessionContext, SessionResolver};

/// Password every mock account accepts.
pub const PASSWORD: &str = "rahasia123";

pub const SELLER_EMAIL: &str = "rina@toko.id";
pub const SELLER_TOKEN: &str = "token-seller";

pub const ADMIN_EMAIL: &str = "admin@ajaxtreon.id";
pub const ADMIN_TOKEN: &str = "token-admin";

/// One request as the mock backend received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Default)]
struct BackendState {
    requests: Mutex<Vec<RecordedRequest>>,
    bodies: Mutex<Vec<(String, Value)>>,
    leads: Mutex<Vec<Value>>,
    next_lead: AtomicUsize,
    revoked: AtomicBool,
}

impl BackendState {
    fn record_body(&self, path: String, body: Value) {
        self.bodies.lock().expect("bodies lock").push((path, body));
    }
}

/// In-process stand-in for the ERP backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
}

impl MockBackend {
    /// Bind to an ephemeral port and serve until the test runtime ends.
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        state
            .leads
            .lock()
            .expect("leads lock")
            .push(lead_json("lead-1", "PT Sumber Makmur"));
        state.next_lead.store(2, Ordering::SeqCst);

        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/me", get(me))
            .route("/auth/logout", post(|| async { StatusCode::NO_CONTENT }))
            .route("/auth/register", post(register))
            .route("/auth/register-seller", post(register))
            .route("/leads", get(list_leads).post(create_lead))
            .route("/leads/{id}", get(get_lead).delete(delete_lead))
            .route("/inventory/product", get(list_products).post(create_product))
            .route("/inventory/stock/add-stock/{id}", post(adjust_stock))
            .route("/inventory/stock/subtract-stock/{id}", post(adjust_stock))
            .route("/inventory/stock/stock-history/{id}", get(stock_history))
            .route("/report/{kind}", get(report))
            .route("/notifications/user/me", get(|| async { Json(Value::Null) }))
            .route("/notifications/{id}/read", patch(|| async { StatusCode::NO_CONTENT }))
            .layer(middleware::from_fn_with_state(Arc::clone(&state), authenticate))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });

        Self { addr, state }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    /// Number of requests received for `path`.
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }

    /// JSON bodies posted to `path`.
    #[must_use]
    pub fn bodies(&self, path: &str) -> Vec<Value> {
        self.state
            .bodies
            .lock()
            .expect("bodies lock")
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// From now on every token is rejected with 401.
    pub fn revoke_tokens(&self) {
        self.state.revoked.store(true, Ordering::SeqCst);
    }
}

/// Client stack wired to a mock backend.
pub struct TestClient {
    pub resolver: SessionResolver,
    pub store: Arc<MemoryTokenStore>,
}

impl TestClient {
    /// Fresh client with an empty token store.
    #[must_use]
    pub fn new(backend: &MockBackend) -> Self {
        Self::with_store(backend, MemoryTokenStore::new())
    }

    /// Client whose durable store already holds `token`, as after a restart.
    #[must_use]
    pub fn with_stored_token(backend: &MockBackend, token: &str) -> Self {
        Self::with_store(backend, MemoryTokenStore::with_token(token))
    }

    fn with_store(backend: &MockBackend, store: MemoryTokenStore) -> Self {
        let config = ClientConfig::new(&backend.base_url(), "unused-session.json")
            .expect("mock backend URL");
        let api = ApiClient::new(&config, SessionContext::new()).expect("HTTP client");
        let store = Arc::new(store);
        let resolver = SessionResolver::new(
            api,
            Arc::clone(&store) as Arc<dyn TokenStore>,
            Arc::new(NoIdentityProvider),
        );
        Self { resolver, store }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        self.resolver.api()
    }

    /// Token currently persisted in the durable store.
    pub async fn stored_token(&self) -> Option<String> {
        self.store
            .get(ajaxtreon_client::store::TOKEN_KEY)
            .await
            .expect("memory store")
    }
}

// =============================================================================
// Handlers
// =============================================================================

const PUBLIC_PATHS: [&str; 3] = ["/auth/login", "/auth/register", "/auth/register-seller"];

fn user_json(token: &str) -> Option<Value> {
    match token {
        SELLER_TOKEN => Some(json!({
            "id": "u-seller",
            "email": SELLER_EMAIL,
            "name": "Rina",
            "role": "seller"
        })),
        ADMIN_TOKEN => Some(json!({
            "id": "u-admin",
            "email": ADMIN_EMAIL,
            "name": "Budi",
            "role": "admin"
        })),
        _ => None,
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn authenticate(
    State(state): State<Arc<BackendState>>,
    request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        authorization: header("authorization"),
        request_id: header("x-request-id"),
    };
    let path = recorded.path.clone();
    let known_token = bearer(headers).and_then(user_json).is_some();
    state.requests.lock().expect("requests lock").push(recorded);

    let public = PUBLIC_PATHS.contains(&path.as_str());
    if !public && (!known_token || state.revoked.load(Ordering::SeqCst)) {
        return message(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }
    next.run(request).await
}

async fn login(Json(body): Json<Value>) -> Response {
    let token = match body["email"].as_str() {
        Some(SELLER_EMAIL) => SELLER_TOKEN,
        Some(ADMIN_EMAIL) => ADMIN_TOKEN,
        _ => return message(StatusCode::BAD_REQUEST, "Invalid credentials"),
    };
    if body["password"].as_str() != Some(PASSWORD) {
        return message(StatusCode::BAD_REQUEST, "Invalid credentials");
    }
    Json(json!({ "token": token, "user": user_json(token) })).into_response()
}

async fn me(headers: HeaderMap) -> Response {
    match bearer(&headers).and_then(user_json) {
        Some(user) => Json(json!({ "user": user })).into_response(),
        None => message(StatusCode::UNAUTHORIZED, "Invalid or expired token"),
    }
}

async fn register(
    State(state): State<Arc<BackendState>>,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    if body["email"].as_str() == Some(SELLER_EMAIL) {
        return message(StatusCode::CONFLICT, "Email already registered");
    }
    state.record_body(uri.path().to_string(), body);
    (StatusCode::CREATED, Json(json!({ "message": "Registered" }))).into_response()
}

fn lead_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": null,
        "phone": null,
        "company": name,
        "status": "new",
        "assignedTo": null,
        "source": "referral",
        "notes": null,
        "createdAt": "2024-05-01T08:00:00Z",
        "updatedAt": "2024-05-01T08:00:00Z",
        "lastContactedAt": null,
        "expectedValue": 2_500_000.0,
        "tags": ["b2b"]
    })
}

async fn list_leads(State(state): State<Arc<BackendState>>) -> Json<Value> {
    Json(Value::Array(state.leads.lock().expect("leads lock").clone()))
}

async fn create_lead(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    let Some(name) = body["name"].as_str().filter(|n| !n.is_empty()) else {
        return message(StatusCode::UNPROCESSABLE_ENTITY, "name is required");
    };
    let id = format!("lead-{}", state.next_lead.fetch_add(1, Ordering::SeqCst));
    let lead = lead_json(&id, name);
    state.leads.lock().expect("leads lock").push(lead.clone());
    (StatusCode::CREATED, Json(lead)).into_response()
}

async fn get_lead(State(state): State<Arc<BackendState>>, Path(id): Path<String>) -> Response {
    let leads = state.leads.lock().expect("leads lock");
    leads
        .iter()
        .find(|lead| lead["id"] == id.as_str())
        .map_or_else(
            || message(StatusCode::NOT_FOUND, "Lead not found"),
            |lead| Json(lead.clone()).into_response(),
        )
}

async fn delete_lead(State(state): State<Arc<BackendState>>, Path(id): Path<String>) -> Response {
    if id == "lead-locked" {
        return message(
            StatusCode::INTERNAL_SERVER_ERROR,
            "update or delete on table \"leads\" violates foreign key constraint",
        );
    }
    state
        .leads
        .lock()
        .expect("leads lock")
        .retain(|lead| lead["id"] != id.as_str());
    StatusCode::NO_CONTENT.into_response()
}

async fn list_products() -> Json<Value> {
    Json(json!([
        {"id": "prod-1", "name": "Kopi Gayo 250g", "price": 85000.0, "stock": 40, "categoryId": "1"},
        {"id": "prod-2", "name": "Teh Tarik Sachet", "price": 12500.5, "stock": 0, "categoryId": "2"}
    ]))
}

async fn create_product(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> Response {
    state.record_body("/inventory/product".to_string(), body);
    (StatusCode::CREATED, Json(json!({ "id": "prod-3" }))).into_response()
}

async fn adjust_stock(
    State(state): State<Arc<BackendState>>,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    if body["quantity"].as_u64() == Some(0) {
        return message(StatusCode::BAD_REQUEST, "Quantity must be positive");
    }
    state.record_body(uri.path().to_string(), body);
    Json(json!({ "message": "Stock updated" })).into_response()
}

async fn stock_history(Path(id): Path<String>) -> Json<Value> {
    Json(json!([
        {"productId": id, "changeType": "add", "quantity": 10, "timestamp": "2024-05-02T03:00:00Z", "note": "Restock"},
        {"productId": id, "changeType": "subtract", "quantity": 2, "timestamp": "2024-05-03T03:00:00Z"}
    ]))
}

async fn report(
    Path(kind): Path<String>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Response {
    if !params.contains_key("startDate") || !params.contains_key("endDate") {
        return message(StatusCode::BAD_REQUEST, "startDate and endDate are required");
    }
    match kind.as_str() {
        "sales" => Json(json!([{
            "orderId": "ord-1",
            "customerId": "cust-1",
            "orderDate": params["startDate"],
            "totalQuantity": 3,
            "totalItems": 2,
            "totalAmount": 255000.0,
            "paymentMethod": "transfer"
        }]))
        .into_response(),
        "revenue" => message(StatusCode::INTERNAL_SERVER_ERROR, "division by zero"),
        other => Json(json!([{
            "kind": other,
            "startDate": params["startDate"],
            "endDate": params["endDate"]
        }]))
        .into_response(),
    }
}
