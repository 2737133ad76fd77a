//! In-process mock of the mercado API for integration tests
//!
//! Implements the `/mercado` and nested `/frutas` routes over an in-memory
//! store, with switches to inject the failures the runner must handle.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

/// Failure switches for the mock
#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    /// Answer market creation with 201 but leave the id out of the body
    pub omit_created_id: bool,
    /// Delay before `/slow` answers
    pub slow: Duration,
    /// Answer `GET /mercado/{id}` with fields other than the stored ones
    pub corrupt_reads: bool,
    /// Add a read counter to every `GET /mercado/{id}` body
    pub count_reads: bool,
}

#[derive(Debug, Default)]
struct Store {
    next_id: u64,
    reads: u64,
    markets: BTreeMap<u64, Market>,
    requests: Vec<String>,
}

#[derive(Debug, Clone)]
struct Market {
    nome: String,
    endereco: String,
    cnpj: String,
    fruits: BTreeMap<u64, Value>,
}

impl Store {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Market {
    fn to_json(&self, id: u64) -> Value {
        json!({
            "id": id,
            "nome": self.nome,
            "endereco": self.endereco,
            "cnpj": self.cnpj,
        })
    }
}

#[derive(Clone)]
struct App {
    store: Arc<Mutex<Store>>,
    options: Arc<MockOptions>,
}

type Reply = (StatusCode, Json<Value>);

fn not_found(what: &str) -> Reply {
    (StatusCode::NOT_FOUND, Json(json!({ "message": format!("{} não encontrado", what) })))
}

fn bad_request(message: &str) -> Reply {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": message })))
}

fn text_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Validate a market body the way the remote API does
fn market_from_body(body: &Value) -> Result<Market, Reply> {
    let cnpj = text_field(body, "cnpj").unwrap_or_default();
    if cnpj.len() != 14 || !cnpj.chars().all(|c| c.is_ascii_digit()) {
        return Err(bad_request("CNPJ inválido"));
    }
    let nome = text_field(body, "nome").unwrap_or_default();
    if nome.trim().is_empty() {
        return Err(bad_request("Nome é obrigatório"));
    }
    Ok(Market {
        nome,
        endereco: text_field(body, "endereco").unwrap_or_default(),
        cnpj,
        fruits: BTreeMap::new(),
    })
}

async fn record(State(app): State<App>, req: Request, next: Next) -> Response {
    app.store
        .lock()
        .unwrap()
        .requests
        .push(format!("{} {}", req.method(), req.uri().path()));
    next.run(req).await
}

async fn list_markets(State(app): State<App>) -> Reply {
    let store = app.store.lock().unwrap();
    let items: Vec<Value> = store.markets.iter().map(|(id, m)| m.to_json(*id)).collect();
    (StatusCode::OK, Json(Value::Array(items)))
}

async fn create_market(State(app): State<App>, Json(body): Json<Value>) -> Reply {
    let market = match market_from_body(&body) {
        Ok(m) => m,
        Err(reply) => return reply,
    };
    let mut store = app.store.lock().unwrap();
    let id = store.allocate();
    let mut created = market.to_json(id);
    if app.options.omit_created_id {
        if let Some(obj) = created.as_object_mut() {
            obj.remove("id");
        }
    }
    let message = format!("Mercado '{}' criado com sucesso!", market.nome);
    store.markets.insert(id, market);
    (StatusCode::CREATED, Json(json!({ "message": message, "novoMercado": created })))
}

async fn get_market(State(app): State<App>, Path(id): Path<u64>) -> Reply {
    let mut store = app.store.lock().unwrap();
    store.reads += 1;
    let reads = store.reads;
    let Some(market) = store.markets.get(&id) else {
        return not_found("Mercado");
    };
    let mut body = market.to_json(id);
    if app.options.corrupt_reads {
        body["nome"] = json!("Outro Mercado");
        body["cnpj"] = json!("00000000000000");
    }
    if app.options.count_reads {
        body["leituras"] = json!(reads);
    }
    (StatusCode::OK, Json(body))
}

async fn update_market(State(app): State<App>, Path(id): Path<u64>, Json(body): Json<Value>) -> Reply {
    let mut store = app.store.lock().unwrap();
    let Some(existing) = store.markets.get_mut(&id) else {
        return not_found("Mercado");
    };
    let mut replacement = match market_from_body(&body) {
        Ok(m) => m,
        Err(reply) => return reply,
    };
    replacement.fruits = std::mem::take(&mut existing.fruits);
    *existing = replacement;
    (StatusCode::OK, Json(json!({ "message": format!("Mercado {} atualizado", id) })))
}

async fn delete_market(State(app): State<App>, Path(id): Path<u64>) -> Reply {
    let mut store = app.store.lock().unwrap();
    match store.markets.remove(&id) {
        Some(_) => (StatusCode::OK, Json(json!({ "message": format!("Mercado {} removido", id) }))),
        None => not_found("Mercado"),
    }
}

async fn list_fruits(State(app): State<App>, Path(mid): Path<u64>) -> Reply {
    let store = app.store.lock().unwrap();
    match store.markets.get(&mid) {
        Some(m) => (StatusCode::OK, Json(Value::Array(m.fruits.values().cloned().collect()))),
        None => not_found("Mercado"),
    }
}

async fn create_fruit(State(app): State<App>, Path(mid): Path<u64>, Json(body): Json<Value>) -> Reply {
    let mut store = app.store.lock().unwrap();
    if !store.markets.contains_key(&mid) {
        return not_found("Mercado");
    }
    let nome = text_field(&body, "nome").unwrap_or_default();
    if nome.is_empty() {
        return bad_request("Nome é obrigatório");
    }
    let id = store.allocate();
    let fruit = json!({
        "id": id,
        "nome": nome,
        "preco": body.get("preco").cloned().unwrap_or(Value::Null),
        "quantidade": body.get("quantidade").cloned().unwrap_or(Value::Null),
    });
    if let Some(market) = store.markets.get_mut(&mid) {
        market.fruits.insert(id, fruit.clone());
    }
    (StatusCode::CREATED, Json(json!({ "message": "Fruta adicionada", "fruta": fruit })))
}

async fn get_fruit(State(app): State<App>, Path((mid, fid)): Path<(u64, u64)>) -> Reply {
    let store = app.store.lock().unwrap();
    match store.markets.get(&mid).and_then(|m| m.fruits.get(&fid)) {
        Some(fruit) => (StatusCode::OK, Json(fruit.clone())),
        None => not_found("Fruta"),
    }
}

async fn update_fruit(
    State(app): State<App>,
    Path((mid, fid)): Path<(u64, u64)>,
    Json(body): Json<Value>,
) -> Reply {
    let mut store = app.store.lock().unwrap();
    match store.markets.get_mut(&mid).and_then(|m| m.fruits.get_mut(&fid)) {
        Some(fruit) => {
            let mut updated = body;
            if let Some(obj) = updated.as_object_mut() {
                obj.insert("id".to_string(), json!(fid));
            }
            *fruit = updated;
            (StatusCode::OK, Json(json!({ "message": "Fruta atualizada" })))
        }
        None => not_found("Fruta"),
    }
}

async fn delete_fruit(State(app): State<App>, Path((mid, fid)): Path<(u64, u64)>) -> Reply {
    let mut store = app.store.lock().unwrap();
    match store.markets.get_mut(&mid).and_then(|m| m.fruits.remove(&fid)) {
        Some(_) => (StatusCode::OK, Json(json!({ "message": "Fruta removida" }))),
        None => not_found("Fruta"),
    }
}

async fn slow(State(app): State<App>) -> Reply {
    tokio::time::sleep(app.options.slow).await;
    (StatusCode::OK, Json(json!({ "ok": true })))
}

/// A running mock server; stopped on drop
pub struct MockApi {
    pub base_url: String,
    store: Arc<Mutex<Store>>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockApi {
    pub async fn start() -> Self {
        Self::start_with(MockOptions::default()).await
    }

    pub async fn start_with(options: MockOptions) -> Self {
        let app = App {
            store: Arc::new(Mutex::new(Store::default())),
            options: Arc::new(options),
        };

        let frutas = "/mercado/{mid}/produtos/hortifruit/frutas";
        let router = Router::new()
            .route("/mercado", get(list_markets).post(create_market))
            .route("/mercado/{id}", get(get_market).put(update_market).delete(delete_market))
            .route(frutas, get(list_fruits).post(create_fruit))
            .route(
                &format!("{}/{{fid}}", frutas),
                get(get_fruit).put(update_fruit).delete(delete_fruit),
            )
            .route("/slow", get(slow))
            .layer(middleware::from_fn_with_state(app.clone(), record))
            .with_state(app.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("Mock API has no address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            store: app.store,
            handle,
        }
    }

    /// Insert a market directly, bypassing the API
    pub fn seed_market(&self, nome: &str) -> u64 {
        let mut store = self.store.lock().unwrap();
        let id = store.allocate();
        store.markets.insert(
            id,
            Market {
                nome: nome.to_string(),
                endereco: "Rua Semente, 1".to_string(),
                cnpj: "11222333000181".to_string(),
                fruits: BTreeMap::new(),
            },
        );
        id
    }

    /// Stored market as the API would return it
    pub fn market(&self, id: u64) -> Option<Value> {
        self.store.lock().unwrap().markets.get(&id).map(|m| m.to_json(id))
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u64 {
        self.store.lock().unwrap().next_id
    }

    pub fn market_count(&self) -> usize {
        self.store.lock().unwrap().markets.len()
    }

    pub fn fruit_count(&self, market: u64) -> Option<usize> {
        self.store.lock().unwrap().markets.get(&market).map(|m| m.fruits.len())
    }

    /// `"METHOD /path"` for every request received, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.store.lock().unwrap().requests.clone()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
