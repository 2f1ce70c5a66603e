use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use board_optimizer::inventory::{BoardGroup, DEFAULT_COST_PER_UNIT, Inventory};
use board_optimizer::solver::Optimizer;
use board_optimizer::types::{
    BoardPlan, CutRequirement, Objective, OptimizationConfig, OptimizationResult, to_milli,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

struct AppState {
    inventory: Inventory,
    cost_per_unit: Mutex<f64>,
}

type SharedState = Arc<AppState>;

#[derive(Deserialize)]
struct BoardDims {
    length: f64,
    width: f64,
    depth: f64,
}

#[derive(Deserialize)]
struct SupplyRequest {
    supply: Vec<BoardDims>,
}

#[derive(Serialize)]
struct SupplyResponse {
    added: usize,
}

#[derive(Deserialize, Serialize)]
struct CutDims {
    length: f64,
    width: f64,
}

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    cuts: Vec<CutDims>,
    #[serde(default)]
    optimize_for: Objective,
    #[serde(default = "default_true")]
    allow_rotation: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Serialize)]
struct CostConfig {
    cost_per_unit: f64,
}

#[derive(Serialize)]
struct AcceptResponse {
    accepted_boards: usize,
    record: String,
}

/// Validates a caller-supplied dimension: finite, positive, 3-decimal
/// precision. Returns milliunits.
fn require_dim(name: &str, value: f64) -> Result<u32, String> {
    let raw = to_milli(value).map_err(|e| format!("{name}: {e}"))?;
    if raw == 0 {
        return Err(format!("{name} must be greater than zero, got {value}"));
    }
    Ok(raw)
}

async fn upload_boards(
    State(state): State<SharedState>,
    Json(req): Json<SupplyRequest>,
) -> Result<Json<SupplyResponse>, (StatusCode, String)> {
    let mut dims = Vec::with_capacity(req.supply.len());
    for board in &req.supply {
        let length = require_dim("length", board.length).map_err(bad_request)?;
        let width = require_dim("width", board.width).map_err(bad_request)?;
        let depth = require_dim("depth", board.depth).map_err(bad_request)?;
        dims.push((length, width, depth));
    }

    for (length, width, depth) in &dims {
        state.inventory.add(*length, *width, *depth);
    }
    tracing::info!(added = dims.len(), "boards added to inventory");
    Ok(Json(SupplyResponse { added: dims.len() }))
}

async fn board_inventory(State(state): State<SharedState>) -> Json<Vec<BoardGroup>> {
    let rate = *state.cost_per_unit.lock().unwrap();
    Json(state.inventory.grouped(rate))
}

async fn get_cost_config(State(state): State<SharedState>) -> Json<CostConfig> {
    Json(CostConfig {
        cost_per_unit: *state.cost_per_unit.lock().unwrap(),
    })
}

async fn set_cost_config(
    State(state): State<SharedState>,
    Json(config): Json<CostConfig>,
) -> Result<Json<CostConfig>, (StatusCode, String)> {
    if !config.cost_per_unit.is_finite() || config.cost_per_unit < 0.0 {
        return Err(bad_request(format!(
            "cost_per_unit must be a non-negative number, got {}",
            config.cost_per_unit
        )));
    }
    *state.cost_per_unit.lock().unwrap() = config.cost_per_unit;
    tracing::info!(cost_per_unit = config.cost_per_unit, "cost config updated");
    Ok(Json(config))
}

async fn optimize(
    State(state): State<SharedState>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizationResult>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    let mut cuts = Vec::with_capacity(req.cuts.len());
    for (id, cut) in req.cuts.iter().enumerate() {
        let length = require_dim("length", cut.length).map_err(bad_request)?;
        let width = require_dim("width", cut.width).map_err(bad_request)?;
        cuts.push(CutRequirement::new(id, length, width));
    }

    let rate = *state.cost_per_unit.lock().unwrap();
    let boards = state.inventory.snapshot(rate);
    let config = OptimizationConfig {
        optimize_for: req.optimize_for,
        allow_rotation: req.allow_rotation,
    };

    let result = Optimizer::new(boards, cuts, config).run();
    Ok(Json(result))
}

async fn accept(
    State(state): State<SharedState>,
    Json(board_plans): Json<Vec<BoardPlan>>,
) -> Result<Json<AcceptResponse>, (StatusCode, String)> {
    let ids: Vec<_> = board_plans.iter().map(|plan| plan.board_id).collect();
    tracing::info!(boards = ?ids, "POST /accept");

    state
        .inventory
        .accept(&ids)
        .map_err(|e| (StatusCode::CONFLICT, e.to_string()))?;

    // Immutable audit record of what was accepted, one file per acceptance.
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let record = format!("accepted_cuts_{stamp}.json");
    let body = serde_json::json!({ "board_plans": board_plans });
    std::fs::write(&record, serde_json::to_string_pretty(&body).unwrap_or_default()).map_err(
        |e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to write acceptance record: {e}"),
            )
        },
    )?;

    Ok(Json(AcceptResponse {
        accepted_boards: ids.len(),
        record,
    }))
}

fn bad_request(message: String) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, message)
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/boards", post(upload_boards))
        .route("/inventory", get(board_inventory))
        .route("/cost-config", get(get_cost_config).post(set_cost_config))
        .route("/optimize", post(optimize))
        .route("/accept", post(accept))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(Arc::new(log_file))
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let state = Arc::new(AppState {
        inventory: Inventory::new(),
        cost_per_unit: Mutex::new(DEFAULT_COST_PER_UNIT),
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, router(state)).await.unwrap();
}
