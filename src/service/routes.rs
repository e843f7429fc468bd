//! Axum routes for the referral network service.

use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analytics::{flow_centrality, reach_count, reach_set, top_by_reach, unique_reach_greedy};
use crate::network::NetworkError;
use crate::store::{NetworkSource, SqliteNetwork};
use crate::types::{Referral, UserId, UserProfile};

use super::state::ServiceState;

/// Type alias for the service state with SqliteNetwork.
pub type AppState = ServiceState<SqliteNetwork>;

/// Default `k` for the top-reach metric.
const DEFAULT_TOP_K: usize = 10;

/// Bounds applied to the simulation endpoint's query parameters.
const MAX_SIMULATED_HORIZON: i64 = 3650;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Directory statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Total number of users.
    pub total: usize,
    /// Users whose gender matches "male" case-insensitively.
    pub males: usize,
    /// Users whose gender matches "female" case-insensitively.
    pub females: usize,
    /// Users with a gender that is neither male nor female.
    pub other: usize,
    /// Users currently selected in the dashboard.
    pub selected: usize,
}

/// One user row with their downstream reach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithReach {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub selected: bool,
    /// Number of users reachable through referral chains.
    pub reach: usize,
}

/// Detail payload for a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailResponse {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub selected: bool,
    /// Immediate referrals, in the order the edges were created.
    pub direct_referrals: Vec<DirectReferral>,
    pub reach_count: usize,
    /// Full downstream set, ascending by id.
    pub reach_set: Vec<i64>,
}

/// One direct referral in a user detail payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectReferral {
    pub id: i64,
    pub name: String,
}

/// Request to create a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: Option<String>,
    pub gender: Option<String>,
}

/// Response carrying a freshly assigned user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedUserResponse {
    pub id: i64,
}

/// Request to set or toggle a user's selected flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectUserRequest {
    /// Explicit value; omit to toggle.
    pub selected: Option<bool>,
}

/// Response after a select/toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectUserResponse {
    pub id: i64,
    pub selected: bool,
}

/// Request to record a referral edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReferralRequest {
    pub referrer_id: i64,
    pub candidate_id: i64,
}

/// Acknowledgement for a recorded referral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReferralResponse {
    pub ok: bool,
}

/// Graph payload for the force-directed dashboard view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphResponse {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// One node, wrapped the way the dashboard's graph library expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub data: GraphNodeData,
}

/// Node attributes; ids are stringified for the graph library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNodeData {
    pub id: String,
    pub label: String,
    pub gender: Option<String>,
    pub reach: usize,
}

/// One edge, wrapped like [`GraphNode`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphLink {
    pub data: GraphLinkData,
}

/// Edge endpoints, stringified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphLinkData {
    pub source: String,
    pub target: String,
}

/// Query parameters for the metrics endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsQuery {
    /// Top-k cutoff for the reach metric (default 10).
    pub k: Option<usize>,
}

/// One row of the top-reach metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedReach {
    pub id: i64,
    pub name: String,
    pub reach: usize,
}

/// One pick of the unique-reach greedy metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedGain {
    pub id: i64,
    pub name: String,
    pub gain: usize,
}

/// One row of the flow centrality metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedScore {
    pub id: i64,
    pub name: String,
    pub score: u64,
}

/// Query parameters for the simulation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulateQuery {
    pub p: Option<f64>,
    pub days: Option<i64>,
}

/// Simulated cumulative-referral series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateResponse {
    pub p: f64,
    pub days: u32,
    pub cumulative: Vec<f64>,
}

/// Request for the minimum-bonus solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinBonusRequest {
    /// Day budget (default 30).
    pub days: Option<u32>,
    /// Hiring target (default 1000).
    pub target: Option<f64>,
    /// Comparison tolerance (default 1e-3).
    pub eps: Option<f64>,
}

/// Solver answer; `null` when no bonus up to the cap works.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinBonusResponse {
    pub min_bonus: Option<u64>,
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Database connectivity status.
    pub database: DatabaseHealth,
}

/// Database health information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub pool_size: u32,
    pub pool_idle: usize,
    pub pool_max: u32,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Readiness response with dependency status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: bool,
}

/// Structured error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        tracing::warn!(code = %self.code, error = %self.error, "Request error");
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

/// Map an engine failure onto a response tuple. Rejections surface as 400
/// with the violation message; source failures as 500.
fn network_error(e: NetworkError) -> (StatusCode, Json<ErrorResponse>) {
    match e {
        NetworkError::Rejected(violation) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("REFERRAL_REJECTED", violation.to_string())),
        ),
        NetworkError::Source(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("SOURCE_ERROR", message)),
        ),
    }
}

/// Map a store failure onto a 500 response tuple.
fn store_error<E: std::error::Error>(e: E) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("SOURCE_ERROR", e.to_string())),
    )
}

fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("USER_NOT_FOUND", "not found")),
    )
}

// ============================================================================
// Helpers
// ============================================================================

/// Fold directory statistics out of a profile listing.
///
/// Gender matching is case-insensitive; a present-but-unrecognized gender
/// counts as `other`, an absent one only toward the total.
fn count_genders(profiles: &[UserProfile]) -> StatsResponse {
    let mut stats = StatsResponse {
        total: profiles.len(),
        males: 0,
        females: 0,
        other: 0,
        selected: 0,
    };
    for profile in profiles {
        if profile.selected {
            stats.selected += 1;
        }
        match profile.gender.as_deref().map(str::to_ascii_lowercase) {
            Some(g) if g == "male" => stats.males += 1,
            Some(g) if g == "female" => stats.females += 1,
            Some(_) => stats.other += 1,
            None => {}
        }
    }
    stats
}

/// Quote a CSV field per RFC 4180: only when it contains a comma, quote,
/// or line break, doubling any embedded quotes.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Name lookup table, falling back to the stringified id.
fn name_of(names: &BTreeMap<UserId, String>, id: UserId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

async fn load_names(state: &AppState) -> Result<BTreeMap<UserId, String>, (StatusCode, Json<ErrorResponse>)> {
    let profiles = state
        .network
        .source()
        .list_profiles()
        .await
        .map_err(store_error)?;
    Ok(profiles.into_iter().map(|p| (p.id, p.name)).collect())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Directory statistics for the dashboard header.
async fn stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let profiles = state
        .network
        .source()
        .list_profiles()
        .await
        .map_err(store_error)?;
    Ok(Json(count_genders(&profiles)))
}

/// All users with their reach counts.
async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserWithReach>>, (StatusCode, Json<ErrorResponse>)> {
    let profiles = state
        .network
        .source()
        .list_profiles()
        .await
        .map_err(store_error)?;
    let view = state.network.view().await.map_err(network_error)?;

    let users = profiles
        .into_iter()
        .map(|p| UserWithReach {
            reach: reach_count(&view, p.id),
            id: p.id.as_i64(),
            name: p.name,
            email: p.email,
            gender: p.gender,
            selected: p.selected,
        })
        .collect();

    Ok(Json(users))
}

/// One user with direct referrals and full reach set.
async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<UserDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    let id = UserId::new(id);
    let profile = match state.network.source().get_profile(id).await.map_err(store_error)? {
        Some(profile) => profile,
        None => return Err(not_found()),
    };

    let names = load_names(&state).await?;
    let view = state.network.view().await.map_err(network_error)?;

    let direct_referrals = view
        .successors(id)
        .iter()
        .map(|&child| DirectReferral {
            id: child.as_i64(),
            name: name_of(&names, child),
        })
        .collect();

    let reach: Vec<i64> = reach_set(&view, id).iter().map(|u| u.as_i64()).collect();

    Ok(Json(UserDetailResponse {
        id: profile.id.as_i64(),
        name: profile.name,
        email: profile.email,
        gender: profile.gender,
        selected: profile.selected,
        direct_referrals,
        reach_count: reach.len(),
        reach_set: reach,
    }))
}

/// Create a user and invalidate the adjacency cache.
async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), (StatusCode, Json<ErrorResponse>)> {
    if request.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("NAME_REQUIRED", "name required")),
        ));
    }

    let id = state
        .network
        .source()
        .insert_user(&request.name, request.email.as_deref(), request.gender.as_deref())
        .await
        .map_err(store_error)?;
    state.network.invalidate();

    Ok((StatusCode::CREATED, Json(CreatedUserResponse { id: id.as_i64() })))
}

/// Set or toggle the selected flag. Selection is not structural, so the
/// adjacency cache stays as-is.
async fn select_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<SelectUserRequest>,
) -> Result<Json<SelectUserResponse>, (StatusCode, Json<ErrorResponse>)> {
    use crate::store::sqlite::SqliteError;

    let id = UserId::new(id);
    match state.network.source().set_selected(id, request.selected).await {
        Ok(selected) => Ok(Json(SelectUserResponse {
            id: id.as_i64(),
            selected,
        })),
        Err(SqliteError::UserNotFound(_)) => Err(not_found()),
        Err(e) => Err(store_error(e)),
    }
}

/// Validate and record a referral edge.
async fn create_referral_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateReferralRequest>,
) -> Result<(StatusCode, Json<CreateReferralResponse>), (StatusCode, Json<ErrorResponse>)> {
    let referral = Referral::new(
        UserId::new(request.referrer_id),
        UserId::new(request.candidate_id),
    );

    state
        .network
        .check_referral(referral)
        .await
        .map_err(network_error)?;
    state
        .network
        .source()
        .insert_referral(referral.referrer, referral.candidate)
        .await
        .map_err(store_error)?;
    state.network.invalidate();

    Ok((StatusCode::CREATED, Json(CreateReferralResponse { ok: true })))
}

/// Nodes and links for the force-directed graph view.
async fn graph_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GraphResponse>, (StatusCode, Json<ErrorResponse>)> {
    let profiles = state
        .network
        .source()
        .list_profiles()
        .await
        .map_err(store_error)?;
    let edges = state
        .network
        .source()
        .list_referrals()
        .await
        .map_err(store_error)?;
    let view = state.network.view().await.map_err(network_error)?;

    let nodes = profiles
        .into_iter()
        .map(|p| GraphNode {
            data: GraphNodeData {
                id: p.id.to_string(),
                reach: reach_count(&view, p.id),
                label: p.name,
                gender: p.gender,
            },
        })
        .collect();

    let links = edges
        .into_iter()
        .map(|e| GraphLink {
            data: GraphLinkData {
                source: e.referrer.to_string(),
                target: e.candidate.to_string(),
            },
        })
        .collect();

    Ok(Json(GraphResponse { nodes, links }))
}

/// Influence metrics, mapped to user names for display.
async fn metrics_handler(
    State(state): State<Arc<AppState>>,
    Path(metric): Path<String>,
    Query(query): Query<MetricsQuery>,
) -> Result<axum::response::Response, (StatusCode, Json<ErrorResponse>)> {
    let names = load_names(&state).await?;
    let view = state.network.view().await.map_err(network_error)?;

    match metric.as_str() {
        "reach" => {
            let k = query.k.unwrap_or(DEFAULT_TOP_K);
            let rows: Vec<NamedReach> = top_by_reach(&view, k)
                .into_iter()
                .map(|entry| NamedReach {
                    id: entry.user_id.as_i64(),
                    name: name_of(&names, entry.user_id),
                    reach: entry.reach,
                })
                .collect();
            Ok(Json(rows).into_response())
        }
        "unique_reach" => {
            let rows: Vec<NamedGain> = unique_reach_greedy(&view)
                .into_iter()
                .map(|pick| NamedGain {
                    id: pick.user_id.as_i64(),
                    name: name_of(&names, pick.user_id),
                    gain: pick.gain,
                })
                .collect();
            Ok(Json(rows).into_response())
        }
        "flow" => {
            let rows: Vec<NamedScore> = flow_centrality(&view)
                .into_iter()
                .map(|entry| NamedScore {
                    id: entry.user_id.as_i64(),
                    name: name_of(&names, entry.user_id),
                    score: entry.score,
                })
                .collect();
            Ok(Json(rows).into_response())
        }
        _ => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("UNKNOWN_METRIC", "unknown metric")),
        )),
    }
}

/// Run the growth simulation over a bounded horizon.
async fn simulate_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SimulateQuery>,
) -> Json<SimulateResponse> {
    let p = match query.p {
        Some(p) if p.is_finite() => p.clamp(0.0, 1.0),
        _ => 0.1,
    };
    let days = query.days.unwrap_or(30).clamp(0, MAX_SIMULATED_HORIZON) as u32;

    let cumulative = state.model.simulate(p, days);
    Json(SimulateResponse { p, days, cumulative })
}

/// Default adoption curve: bonus dollars to daily referral probability.
fn default_adoption(bonus: u64) -> f64 {
    (1.0 - (-(bonus as f64) / 250.0).exp()).clamp(0.01, 0.95)
}

/// Solve for the minimum bonus meeting the hiring target.
async fn min_bonus_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MinBonusRequest>,
) -> Json<MinBonusResponse> {
    let days = request.days.unwrap_or(30);
    let target = request.target.unwrap_or(1000.0);
    let eps = request.eps.unwrap_or(1e-3);

    let min_bonus = state
        .model
        .min_bonus_for_target(days, target, default_adoption, eps);
    Json(MinBonusResponse { min_bonus })
}

/// Users as a CSV attachment.
async fn export_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let profiles = state
        .network
        .source()
        .list_profiles()
        .await
        .map_err(store_error)?;
    let view = state.network.view().await.map_err(network_error)?;

    let mut csv = String::from("id,name,email,gender,selected,reach\n");
    for p in &profiles {
        let row = [
            p.id.to_string(),
            csv_escape(&p.name),
            csv_escape(p.email.as_deref().unwrap_or("")),
            csv_escape(p.gender.as_deref().unwrap_or("")),
            if p.selected { "1" } else { "0" }.to_string(),
            reach_count(&view, p.id).to_string(),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"users.csv\"",
            ),
        ],
        csv,
    ))
}

/// Health check endpoint (detailed).
async fn health_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store = state.network.source();
    let db_healthy = store.is_healthy().await;
    let pool_stats = store.pool_stats();

    let response = HealthResponse {
        status: if db_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected: db_healthy,
            pool_size: pool_stats.size,
            pool_idle: pool_stats.idle,
            pool_max: pool_stats.max,
        },
    };

    if db_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Liveness probe endpoint.
///
/// Simple check that the service is running. Does NOT check dependencies.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 if the database is connected, 503 otherwise.
async fn readiness_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let db_healthy = state.network.source().is_healthy().await;

    if db_healthy {
        Ok(Json(ReadinessResponse {
            ready: true,
            database: true,
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                database: false,
            }),
        ))
    }
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the referral network service.
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        // Directory
        .route("/api/stats", get(stats_handler))
        .route("/api/users", get(list_users_handler))
        .route("/api/users", post(create_user_handler))
        .route("/api/users/:id", get(get_user_handler))
        .route("/api/users/:id/select", post(select_user_handler))
        // Graph
        .route("/api/referrals", post(create_referral_handler))
        .route("/api/graph", get(graph_handler))
        .route("/api/metrics/:metric", get(metrics_handler))
        // Simulation
        .route("/api/simulate", get(simulate_handler))
        .route("/api/min-bonus", post(min_bonus_handler))
        // Export
        .route("/api/export/users.csv", get(export_users_handler))
        // Health checks
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .with_state(state)
}
