use axum::{
    Router,
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::core::{
    CalculationTrace, CommitteePolicy, CommitteeType, DisabilityEntry, EntryDraft, EntryError,
    EntryId, RegulationAddition, WeightedStep, calculate_with_trace, committee_policies,
    parse_entry, validate_entry,
};
use crate::error::AppError;
use crate::store::EntryStore;

mod cli;

pub use cli::run_cli;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn EntryStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EntryPayload {
    percentage: Option<Value>,
    #[serde(deserialize_with = "deserialize_lenient_number")]
    prior_condition: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    entries: Vec<EntryPayload>,
    committee_type: Option<CommitteeType>,
    regulation_addition: Option<RegulationAddition>,
    include_steps: bool,
}

/// Query form of [`CalculatePayload`]; entries are `pct[:prior]` separated by commas.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculateQuery {
    entries: Option<String>,
    committee_type: Option<CommitteeType>,
    regulation_addition: Option<RegulationAddition>,
    include_steps: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ResultQuery {
    committee_type: Option<CommitteeType>,
    regulation_addition: Option<RegulationAddition>,
    include_steps: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalculateResponse {
    committee_type: CommitteeType,
    committee_label: &'static str,
    regulation_addition: RegulationAddition,
    intermediate: f64,
    #[serde(rename = "final")]
    final_disability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<Vec<WeightedStep>>,
}

#[derive(Debug, Serialize)]
struct EntriesResponse {
    entries: Vec<DisabilityEntry>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/committee-types", get(committee_types_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route(
            "/api/entries",
            get(list_entries_handler)
                .post(add_entry_handler)
                .delete(reset_entries_handler),
        )
        .route("/api/entries/result", get(entries_result_handler))
        .route("/api/entries/:id", delete(remove_entry_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(addr: SocketAddr, state: AppState) -> Result<(), AppError> {
    let app = router(state);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "disability calculator API listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, json!({ "status": "ok" }))
}

async fn committee_types_handler() -> Response {
    let policies: &[CommitteePolicy] = committee_policies();
    json_response(StatusCode::OK, policies)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(
    query: Result<Query<CalculateQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let drafts = match query.entries.as_deref() {
        Some(raw) => parse_entry_list(raw)?,
        None => Vec::new(),
    };
    let committee_type = require_committee(query.committee_type)?;
    let entries = number_drafts(drafts);
    Ok(calculation_response(
        &entries,
        committee_type,
        query.regulation_addition.unwrap_or_default(),
        query.include_steps,
    ))
}

async fn calculate_post_handler(
    payload: Result<Json<CalculatePayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let drafts = payload
        .entries
        .into_iter()
        .map(draft_from_payload)
        .collect::<Result<Vec<_>, _>>()?;
    let committee_type = require_committee(payload.committee_type)?;
    let entries = number_drafts(drafts);
    Ok(calculation_response(
        &entries,
        committee_type,
        payload.regulation_addition.unwrap_or_default(),
        payload.include_steps,
    ))
}

async fn list_entries_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let entries = state.store.list()?;
    Ok(json_response(StatusCode::OK, EntriesResponse { entries }))
}

async fn add_entry_handler(
    State(state): State<AppState>,
    payload: Result<Json<EntryPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let draft = draft_from_payload(payload)?;
    let entry = state.store.add(draft)?;
    Ok(json_response(StatusCode::CREATED, entry))
}

async fn remove_entry_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = id?;
    let removed = state.store.remove(EntryId(id))?;
    Ok(json_response(StatusCode::OK, removed))
}

async fn reset_entries_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    state.store.clear()?;
    Ok(with_cache_control(StatusCode::NO_CONTENT))
}

async fn entries_result_handler(
    State(state): State<AppState>,
    query: Result<Query<ResultQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let committee_type = require_committee(query.committee_type)?;
    let entries = state.store.list()?;
    Ok(calculation_response(
        &entries,
        committee_type,
        query.regulation_addition.unwrap_or_default(),
        query.include_steps,
    ))
}

fn require_committee(committee_type: Option<CommitteeType>) -> Result<CommitteeType, AppError> {
    committee_type.ok_or_else(|| AppError::BadRequest("committeeType is required".to_string()))
}

fn calculation_response(
    entries: &[DisabilityEntry],
    committee_type: CommitteeType,
    regulation_addition: RegulationAddition,
    include_steps: bool,
) -> Response {
    let trace = calculate_with_trace(entries, committee_type, regulation_addition);
    json_response(StatusCode::OK, build_calculate_response(trace, include_steps))
}

pub(crate) fn build_calculate_response(
    trace: CalculationTrace,
    include_steps: bool,
) -> CalculateResponse {
    CalculateResponse {
        committee_type: trace.committee_type,
        committee_label: trace.committee_type.policy().label,
        regulation_addition: trace.applied_addition,
        intermediate: trace.result.intermediate,
        final_disability: trace.result.final_disability,
        steps: include_steps.then_some(trace.steps),
    }
}

/// Gives request-scoped entries ids in input order, starting at 1.
fn number_drafts(drafts: Vec<EntryDraft>) -> Vec<DisabilityEntry> {
    drafts
        .into_iter()
        .zip(1u64..)
        .map(|(draft, id)| DisabilityEntry::new(EntryId(id), draft.percentage, draft.prior_condition))
        .collect()
}

fn draft_from_payload(payload: EntryPayload) -> Result<EntryDraft, EntryError> {
    match payload.percentage {
        None | Some(Value::Null) => Err(EntryError::MissingPercentage),
        Some(Value::Number(n)) => validate_entry(n.as_f64(), payload.prior_condition),
        Some(Value::String(raw)) => {
            let parsed = parse_entry(&raw, None)?;
            validate_entry(Some(parsed.percentage), payload.prior_condition)
        }
        Some(other) => Err(EntryError::NotANumber(other.to_string())),
    }
}

pub(crate) fn parse_entry_token(raw: &str) -> Result<EntryDraft, EntryError> {
    match raw.split_once(':') {
        Some((percentage, prior)) => parse_entry(percentage, Some(prior)),
        None => parse_entry(raw, None),
    }
}

fn parse_entry_list(raw: &str) -> Result<Vec<EntryDraft>, EntryError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_entry_token)
        .collect()
}

/// Numbers and numeric strings become values; anything else counts as absent.
fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

pub(crate) fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
