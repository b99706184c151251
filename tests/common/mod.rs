//! In-process stand-in for the ledger backend
//!
//! Serves the same routes under `/api` on an ephemeral port, keeps data in
//! memory and records every request it sees.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "stub-token";

/// One request as seen by the stub
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Default)]
pub struct StubState {
    next_id: i64,
    users: Vec<(String, String)>,
    accounts: Vec<Value>,
    categories: Vec<Value>,
    transactions: Vec<Value>,
    pub requests: Vec<Recorded>,
}

impl StubState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Shared = Arc<Mutex<StubState>>;

pub struct StubBackend {
    pub base_url: String,
    pub state: Shared,
}

impl StubBackend {
    /// Bind to 127.0.0.1 on a free port and serve in the background
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState::default()));
        let router = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    /// Register a user directly
    pub fn add_user(&self, username: &str, password: &str) {
        self.state
            .lock()
            .unwrap()
            .users
            .push((username.to_string(), password.to_string()));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().unwrap()
    }
}

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/token", post(token))
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/:id", axum::routing::delete(delete_account))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", axum::routing::delete(delete_category))
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/summary", get(summary))
        .route(
            "/transactions/:id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        );

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    // The header closure borrows the request; it must be gone before the await.
    let recorded = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Recorded {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            authorization: header("authorization"),
            request_id: header("x-request-id"),
        }
    };
    state.lock().unwrap().requests.push(recorded);
    next.run(request).await
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn check_auth(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {}", TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials")),
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    if state.users.iter().any(|(u, _)| *u == username) {
        return detail(StatusCode::BAD_REQUEST, "Username already registered");
    }
    state.users.push((username.clone(), password));
    let id = state.next_id();
    Json(json!({ "id": id, "email": body["email"], "username": username })).into_response()
}

async fn token(State(state): State<Shared>, Form(form): Form<HashMap<String, String>>) -> Response {
    let state = state.lock().unwrap();
    let username = form.get("username").cloned().unwrap_or_default();
    let password = form.get("password").cloned().unwrap_or_default();

    if state.users.iter().any(|(u, p)| *u == username && *p == password) {
        Json(json!({ "access_token": TOKEN, "token_type": "bearer" })).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Incorrect username or password")
    }
}

#[derive(Deserialize)]
struct NewAccountQuery {
    name: String,
    account_type: String,
}

async fn list_accounts(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = check_auth(&headers) {
        return r;
    }
    Json(state.lock().unwrap().accounts.clone()).into_response()
}

async fn create_account(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<NewAccountQuery>,
) -> Response {
    if let Err(r) = check_auth(&headers) {
        return r;
    }
    let mut state = state.lock().unwrap();
    let account = json!({
        "id": state.next_id(),
        "user_id": 1,
        "name": query.name,
        "type": query.account_type,
    });
    state.accounts.push(account.clone());
    Json(account).into_response()
}

async fn delete_account(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(r) = check_auth(&headers) {
        return r;
    }
    let mut state = state.lock().unwrap();
    let before = state.accounts.len();
    state.accounts.retain(|a| a["id"] != id);
    if state.accounts.len() == before {
        return detail(StatusCode::NOT_FOUND, "Account not found");
    }
    state.transactions.retain(|t| t["account_id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
struct NewCategoryQuery {
    name: String,
}

async fn list_categories(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(r) = check_auth(&headers) {
        return r;
    }
    Json(state.lock().unwrap().categories.clone()).into_response()
}

async fn create_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<NewCategoryQuery>,
) -> Response {
    if let Err(r) = check_auth(&headers) {
        return r;
    }
    let mut state = state.lock().unwrap();
    let category = json!({ "id": state.next_id(), "name": query.name });
    state.categories.push(category.clone());
    Json(category).into_response()
}

async fn delete_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(r) = check_auth(&headers) {
        return r;
    }
    let mut state = state.lock().unwrap();
    let before = state.categories.len();
    state.categories.retain(|c| c["id"] != id);
    if state.categories.len() == before {
        return detail(StatusCode::NOT_FOUND, "Category not found");
    }
    Json(json!({ "message": "Category deleted" })).into_response()
}

#[derive(Deserialize)]
struct TransactionQuery {
    account_id: i64,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl TransactionQuery {
    /// ISO dates compare correctly as strings
    fn matches(&self, t: &Value) -> bool {
        let date = t["date"].as_str().unwrap_or_default();
        t["account_id"] == self.account_id
            && self.start_date.as_deref().map(|s| date >= s).unwrap_or(true)
            && self.end_date.as_deref().map(|e| date <= e).unwrap_or(true)
    }
}

async fn list_transactions(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<TransactionQuery>,
) -> Response {
    if let Err(r) = check_auth(&headers) {
        return r;
    }
    let state = state.lock().unwrap();
    let list: Vec<Value> = state
        .transactions
        .iter()
        .filter(|t| query.matches(t))
        .cloned()
        .collect();
    Json(list).into_response()
}

async fn summary(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<TransactionQuery>,
) -> Response {
    if let Err(r) = check_auth(&headers) {
        return r;
    }
    let state = state.lock().unwrap();
    let (mut income, mut expense, mut count) = (0.0_f64, 0.0_f64, 0usize);
    for t in state.transactions.iter().filter(|t| query.matches(t)) {
        let amount = t["amount"].as_f64().unwrap_or_default();
        if t["type"] == "income" {
            income += amount;
        } else {
            expense += amount;
        }
        count += 1;
    }
    Json(json!({
        "income": income,
        "expense": expense,
        "net": income - expense,
        "count": count,
    }))
    .into_response()
}

#[derive(Deserialize)]
struct AccountQuery {
    account_id: i64,
}

async fn create_transaction(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<AccountQuery>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = check_auth(&headers) {
        return r;
    }
    let mut state = state.lock().unwrap();
    if !state.accounts.iter().any(|a| a["id"] == query.account_id) {
        return detail(StatusCode::NOT_FOUND, "Account not found");
    }
    let transaction = json!({
        "id": state.next_id(),
        "account_id": query.account_id,
        "type": body["type"],
        "amount": body["amount"],
        "category": body["category"],
        "date": body["date"],
        "description": body["description"],
    });
    state.transactions.push(transaction.clone());
    Json(transaction).into_response()
}

async fn get_transaction(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(r) = check_auth(&headers) {
        return r;
    }
    let state = state.lock().unwrap();
    match state.transactions.iter().find(|t| t["id"] == id) {
        Some(t) => Json(t.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Transaction not found"),
    }
}

async fn update_transaction(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = check_auth(&headers) {
        return r;
    }
    let mut state = state.lock().unwrap();
    match state.transactions.iter_mut().find(|t| t["id"] == id) {
        Some(t) => {
            for field in ["type", "amount", "category", "description"] {
                t[field] = body[field].clone();
            }
            Json(t.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Transaction not found"),
    }
}

async fn delete_transaction(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(r) = check_auth(&headers) {
        return r;
    }
    let mut state = state.lock().unwrap();
    let before = state.transactions.len();
    state.transactions.retain(|t| t["id"] != id);
    if state.transactions.len() == before {
        return detail(StatusCode::NOT_FOUND, "Transaction not found");
    }
    Json(json!({ "message": "Transaction deleted" })).into_response()
}
