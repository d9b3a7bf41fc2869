use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use mealprint_core::catalog::Catalog;
use mealprint_core::engine;
use mealprint_core::models::{
    AggregateTotals, FoodRecord, MacroShares, Selection, TargetProgress,
};

const BODY_LIMIT: usize = 1024 * 1024; // 1 MB

#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
    api_key: Option<String>,
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

#[derive(Deserialize)]
struct AggregateItem {
    food: String,
    quantity_oz: f64,
}

#[derive(Deserialize)]
struct AggregateRequest {
    items: Vec<AggregateItem>,
    target_calories: Option<i64>,
}

#[derive(Serialize)]
struct AggregateResponse {
    totals: AggregateTotals,
    calories: f64,
    total_emissions: f64,
    calorie_shares: MacroShares,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<TargetProgress>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

// --- Middleware ---

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(ref expected_key) = state.api_key {
        let authorized = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected_key);

        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid or missing API key".to_string(),
                }),
            )
                .into_response();
        }
    }
    next.run(request).await
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Handlers ---

async fn list_foods(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<FoodRecord>> {
    let mut foods: Vec<FoodRecord> = match params.q.as_deref() {
        Some(q) => state.catalog.search(q).into_iter().cloned().collect(),
        None => state.catalog.foods().to_vec(),
    };
    foods.sort_by(|a, b| a.name.cmp(&b.name));
    Json(foods)
}

async fn get_food(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FoodRecord>, ApiError> {
    let food = state
        .catalog
        .get(&name)
        .map_err(|e| ApiError::NotFound(e.to_string()))?;
    Ok(Json(food.clone()))
}

/// One full recomputation per request: build the selection, aggregate,
/// and optionally compare against a calorie target. An unknown food
/// aborts the whole request with no partial totals.
async fn aggregate_totals(
    State(state): State<AppState>,
    Json(req): Json<AggregateRequest>,
) -> Result<Json<AggregateResponse>, ApiError> {
    let mut selection = Selection::new();
    for item in &req.items {
        if !item.quantity_oz.is_finite() || item.quantity_oz <= 0.0 {
            let food = &item.food;
            return Err(ApiError::BadRequest(format!(
                "quantity_oz must be greater than 0 for '{food}'"
            )));
        }
        selection.add(&item.food, item.quantity_oz);
    }

    let totals = engine::aggregate(&state.catalog, &selection)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let progress = match req.target_calories {
        Some(target) => Some(
            engine::target_progress(totals.calories(), target)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        ),
        None => None,
    };

    Ok(Json(AggregateResponse {
        calories: totals.calories(),
        total_emissions: totals.total_emissions(),
        calorie_shares: totals.calorie_shares(),
        progress,
        totals,
    }))
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/foods", get(list_foods))
        .route("/api/foods/{name}", get(get_food))
        .route("/api/aggregate", post(aggregate_totals))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(
    catalog: Catalog,
    port: u16,
    bind: &str,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let count = catalog.len();
    let state = AppState {
        catalog: Arc::new(catalog),
        api_key: api_key.clone(),
    };

    let app = build_router(state);

    if let Some(ref key) = api_key {
        eprintln!(
            "API key: {}...{} (see api_key file in data directory)",
            &key[..4],
            &key[key.len() - 4..],
        );
    } else {
        eprintln!("Warning: Authentication disabled (--no-auth). API is open to anyone.");
    }

    if bind != "127.0.0.1" && bind != "localhost" && api_key.is_none() {
        eprintln!(
            "Warning: Listening on {bind} with no authentication. Any device on your network can access this API."
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    eprintln!("Serving {count} foods on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
