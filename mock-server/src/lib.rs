//! In-memory stand-in for the Pobo REST API.
//!
//! Serves the login, logout, category grid, product listing and bulk import
//! endpoints with seeded data. Failures are reported the way the real API
//! does: an `error` field in a JSON body.

use std::{collections::HashSet, sync::Arc};

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const USERNAME: &str = "demo@pobo.cz";
pub const PASSWORD: &str = "demo-password";
pub const PAGE_SIZE: usize = 2;

const IMPORTED_AT: &str = "2024-06-01 00:00:00";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub url: String,
    /// Object keyed by locale, or `[]` when empty.
    pub translations: Value,
    pub is_visible: bool,
    pub is_delete: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub guid: String,
    pub short_description: Option<String>,
    pub image_preview: Option<String>,
    pub is_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favourite: Option<bool>,
    pub created_at: String,
    #[serde(skip)]
    pub categories: Vec<i64>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct Store {
    pub tokens: HashSet<String>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

impl Store {
    pub fn seeded() -> Self {
        let categories = vec![
            Category {
                id: 1,
                url: "/boty".to_string(),
                translations: json!({"default": {"name": "Boty"}, "hu": {"name": "Cipők"}}),
                is_visible: true,
                is_delete: false,
            },
            Category {
                id: 2,
                url: "/cepice".to_string(),
                translations: json!({"default": {"name": "Čepice"}}),
                is_visible: true,
                is_delete: false,
            },
            Category {
                id: 3,
                url: "/archiv".to_string(),
                translations: json!([]),
                is_visible: false,
                is_delete: true,
            },
        ];
        let products = vec![
            Product {
                id: 101,
                name: "Trailové boty".to_string(),
                guid: "302b8ad6-07d5-11ec-b98c-0cc47a6c9370".to_string(),
                short_description: Some("Lehké a pevné".to_string()),
                image_preview: Some("https://cdn.pobo.cz/p/101.jpg".to_string()),
                is_visible: true,
                is_favourite: Some(true),
                created_at: "2024-02-10 09:15:00".to_string(),
                categories: vec![1],
            },
            Product {
                id: 102,
                name: "Zimní čepice".to_string(),
                guid: "4f1c2e90-07d5-11ec-b98c-0cc47a6c9370".to_string(),
                short_description: None,
                image_preview: None,
                is_visible: true,
                is_favourite: None,
                created_at: "2024-01-05T08:00:00+01:00".to_string(),
                categories: vec![2],
            },
            Product {
                id: 103,
                name: "Sandály".to_string(),
                guid: "5a7d3b12-07d5-11ec-b98c-0cc47a6c9370".to_string(),
                short_description: None,
                image_preview: None,
                is_visible: false,
                is_favourite: Some(false),
                created_at: "2023-07-01".to_string(),
                categories: vec![1],
            },
        ];
        Self {
            tokens: HashSet::new(),
            categories,
            products,
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/v2/user/token/", post(login))
        .route("/api/v2/user/logout/", get(logout))
        .route("/api/v2/category/grid/", post(category_grid))
        .route("/api/v2/product/list-all/", get(list_products))
        .route("/api/v2/public/product", post(bulk_import))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type Reply = (StatusCode, Json<Value>);

fn error(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "error": message })))
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Check the bearer token, returning it on success.
async fn authorize(db: &Db, headers: &HeaderMap) -> Result<String, Reply> {
    let token = bearer(headers).ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
    if db.read().await.tokens.contains(token) {
        Ok(token.to_string())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

async fn login(State(db): State<Db>, Json(input): Json<LoginRequest>) -> Reply {
    if input.username != USERNAME || input.password != PASSWORD {
        info!(username = %input.username, "rejected login");
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    let token = Uuid::new_v4().to_string();
    db.write().await.tokens.insert(token.clone());
    info!("issued token");
    (StatusCode::OK, Json(json!({ "token": token })))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let token = match authorize(&db, &headers).await {
        Ok(token) => token,
        Err(reply) => return reply,
    };
    db.write().await.tokens.remove(&token);
    (StatusCode::OK, Json(json!({ "result": "ok" })))
}

async fn category_grid(State(db): State<Db>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authorize(&db, &headers).await {
        return reply;
    }
    let categories = db.read().await.categories.clone();
    (StatusCode::OK, Json(json!({ "result": { "category": categories } })))
}

/// Reads `page` and `categories[n]` pairs.
fn parse_listing_query(query: Option<&str>) -> Result<(usize, Vec<i64>), Reply> {
    let mut page = 1;
    let mut categories = Vec::new();
    for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        if key == "page" {
            page = value
                .parse()
                .map_err(|_| error(StatusCode::BAD_REQUEST, "Invalid page"))?;
        } else if key.starts_with("categories[") {
            categories.push(
                value
                    .parse()
                    .map_err(|_| error(StatusCode::BAD_REQUEST, "Invalid category id"))?,
            );
        }
    }
    if page == 0 {
        return Err(error(StatusCode::BAD_REQUEST, "Invalid page"));
    }
    Ok((page, categories))
}

async fn list_products(
    State(db): State<Db>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Reply {
    if let Err(reply) = authorize(&db, &headers).await {
        return reply;
    }
    let (page, categories) = match parse_listing_query(query.as_deref()) {
        Ok(parsed) => parsed,
        Err(reply) => return reply,
    };
    debug!(page, ?categories, "listing products");

    let store = db.read().await;
    let products: Vec<&Product> = store
        .products
        .iter()
        .filter(|p| categories.is_empty() || p.categories.iter().any(|c| categories.contains(c)))
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();
    (StatusCode::OK, Json(json!({ "result": { "products": products } })))
}

async fn bulk_import(State(db): State<Db>, headers: HeaderMap, body: Bytes) -> Reply {
    if let Err(reply) = authorize(&db, &headers).await {
        return reply;
    }
    let items: Vec<Value> = if body.is_empty() {
        Vec::new()
    } else {
        match serde_json::from_slice(&body) {
            Ok(items) => items,
            Err(_) => return error(StatusCode::BAD_REQUEST, "Invalid JSON payload"),
        }
    };

    let mut store = db.write().await;
    let mut success = 0;
    let mut skipped = 0;
    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let (Some(guid), Some(name)) = (
            item.get("guid").and_then(Value::as_str),
            item.get("name").and_then(Value::as_str),
        ) else {
            errors.push(json!({"code": 422, "message": format!("Item {index}: guid and name are required")}));
            continue;
        };
        if store.products.iter().any(|p| p.guid == guid) {
            skipped += 1;
            continue;
        }
        let id = store.products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        store.products.push(Product {
            id,
            name: name.to_string(),
            guid: guid.to_string(),
            short_description: item
                .get("short_description")
                .and_then(Value::as_str)
                .map(str::to_string),
            image_preview: item
                .pointer("/images/0/src")
                .and_then(Value::as_str)
                .map(str::to_string),
            is_visible: item.get("is_visible").and_then(Value::as_bool).unwrap_or(false),
            is_favourite: None,
            created_at: IMPORTED_AT.to_string(),
            categories: item
                .get("categories")
                .and_then(Value::as_array)
                .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
                .unwrap_or_default(),
        });
        success += 1;
    }
    info!(success, skipped, failed = errors.len(), "bulk import");
    (
        StatusCode::OK,
        Json(json!({ "success": success, "skipped": skipped, "errors": errors })),
    )
}
