use std::{net::SocketAddr, sync::Arc, thread};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::persistence::PushEvent;
use crate::session::{self, Intent, NavigateDirection, Outcome, Session};
use crate::status::AttendanceStatus;
use crate::store::{AttendanceStore, StoreError, ValidationError};

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<AttendanceStore>>,
    session: Arc<RwLock<Session>>,
    today_source: TodaySource,
}

#[derive(Clone, Copy)]
enum TodaySource {
    System,
    Fixed(NaiveDate),
}

impl AppState {
    pub fn new(store: AttendanceStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            session: Arc::new(RwLock::new(Session::new())),
            today_source: TodaySource::System,
        }
    }

    /// Pins the request clock to a fixed date. Handlers stay deterministic,
    /// which the router tests rely on.
    pub fn with_fixed_today(store: AttendanceStore, today: NaiveDate) -> Self {
        Self {
            today_source: TodaySource::Fixed(today),
            ..Self::new(store)
        }
    }

    /// Forwards snapshot pushes from the backend into the shared store on a
    /// dedicated thread. No-op for backends without a push channel.
    pub fn spawn_push_listener(&self) {
        let Some(receiver) = self.store.read().subscribe() else {
            return;
        };
        let store = self.store.clone();
        thread::spawn(move || {
            for event in receiver {
                match event {
                    PushEvent::Replace(map) => {
                        if let Err(err) = store.write().apply_snapshot(map) {
                            eprintln!("rejected pushed snapshot: {err}");
                        }
                    }
                    PushEvent::Failed(message) => {
                        eprintln!("attendance sync failed: {message}");
                    }
                }
            }
        });
    }

    // One clock read per request; every decision in the handler sees the
    // same date.
    fn today(&self) -> NaiveDate {
        match self.today_source {
            TodaySource::System => chrono::Local::now().date_naive(),
            TodaySource::Fixed(date) => date,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(ValidationError::UnknownMember(name)) => {
                ApiError::NotFound(format!("unknown member '{name}'"))
            }
            StoreError::Validation(err) => ApiError::Invalid(err.to_string()),
            StoreError::Persistence(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                let body = Json(ErrorBody {
                    error: "not_found",
                    message,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal(message) => {
                let body = Json(ErrorBody {
                    error: "internal_error",
                    message,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/roster", get(get_roster))
        .route("/calendar/:member", get(get_calendar))
        .route("/calendar/:member/navigate", post(navigate))
        .route("/attendance/:member", post(mark_attendance))
        .route("/bulk/:member", get(bulk_prompt).post(apply_bulk))
        .route("/overview", get(team_overview))
        .route("/history/:member", get(member_history))
        .route("/stats/:member", get(member_stats))
        .route("/report", get(team_report))
        .route("/report/:member", get(member_report))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, store: AttendanceStore) -> std::io::Result<()> {
    let state = AppState::new(store);
    state.spawn_push_listener();
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

fn run_intent(state: &AppState, intent: Intent) -> Result<Outcome, StoreError> {
    let today = state.today();
    let mut store = state.store.write();
    let mut session = state.session.write();
    session::dispatch(&mut store, &mut session, intent, today)
}

fn parse_status(input: &str) -> Result<AttendanceStatus, ApiError> {
    AttendanceStatus::from_str(input.trim())
        .ok_or_else(|| ApiError::Invalid(format!("unknown status '{input}'")))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_roster(State(state): State<AppState>) -> Json<serde_json::Value> {
    let members = state.store.read().roster().members().to_vec();
    Json(json!({ "members": members }))
}

async fn get_calendar(
    State(state): State<AppState>,
    Path(member): Path<String>,
) -> Result<Json<Outcome>, ApiError> {
    let outcome = run_intent(&state, Intent::ShowCalendar { member })?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
struct NavigatePayload {
    direction: String,
}

async fn navigate(
    State(state): State<AppState>,
    Path(member): Path<String>,
    Json(payload): Json<NavigatePayload>,
) -> Result<Json<Outcome>, ApiError> {
    let direction = match payload.direction.trim() {
        "back" => NavigateDirection::Back,
        "forward" => NavigateDirection::Forward,
        other => return Err(ApiError::Invalid(format!("unknown direction '{other}'"))),
    };
    let outcome = run_intent(&state, Intent::Navigate { member, direction })?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
struct MarkPayload {
    date: NaiveDate,
    status: String,
}

async fn mark_attendance(
    State(state): State<AppState>,
    Path(member): Path<String>,
    Json(payload): Json<MarkPayload>,
) -> Result<Json<Outcome>, ApiError> {
    let status = parse_status(&payload.status)?;
    let today = state.today();
    let mut store = state.store.write();
    let mut session = state.session.write();
    session::dispatch(
        &mut store,
        &mut session,
        Intent::SelectDay {
            member,
            date: payload.date,
        },
        today,
    )?;
    let outcome =
        session::dispatch(&mut store, &mut session, Intent::ChooseStatus { status }, today)?;
    Ok(Json(outcome))
}

async fn bulk_prompt(
    State(state): State<AppState>,
    Path(member): Path<String>,
) -> Result<Json<Outcome>, ApiError> {
    let outcome = run_intent(&state, Intent::OpenBulk { member })?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
struct BulkPayload {
    dates: Vec<NaiveDate>,
    status: String,
}

async fn apply_bulk(
    State(state): State<AppState>,
    Path(member): Path<String>,
    Json(payload): Json<BulkPayload>,
) -> Result<Json<Outcome>, ApiError> {
    let status = parse_status(&payload.status)?;
    let outcome = run_intent(
        &state,
        Intent::ApplyBulk {
            member,
            dates: payload.dates,
            status,
        },
    )?;
    Ok(Json(outcome))
}

async fn team_overview(State(state): State<AppState>) -> Result<Json<Outcome>, ApiError> {
    let outcome = run_intent(&state, Intent::TeamToday)?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    month: Option<u32>,
}

async fn member_history(
    State(state): State<AppState>,
    Path(member): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Outcome>, ApiError> {
    let outcome = run_intent(
        &state,
        Intent::ShowHistory {
            member,
            month: params.month,
        },
    )?;
    Ok(Json(outcome))
}

async fn member_stats(
    State(state): State<AppState>,
    Path(member): Path<String>,
) -> Result<Json<Outcome>, ApiError> {
    let outcome = run_intent(&state, Intent::ShowStats { member })?;
    Ok(Json(outcome))
}

async fn team_report(State(state): State<AppState>) -> Result<Response, ApiError> {
    csv_response(run_intent(&state, Intent::DownloadReport)?)
}

async fn member_report(
    State(state): State<AppState>,
    Path(member): Path<String>,
) -> Result<Response, ApiError> {
    csv_response(run_intent(&state, Intent::DownloadMemberReport { member })?)
}

fn csv_response(outcome: Outcome) -> Result<Response, ApiError> {
    match outcome {
        Outcome::Report { filename, csv } => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            csv,
        )
            .into_response()),
        Outcome::NoReportData => Err(ApiError::NotFound(
            "no attendance data to download".to_string(),
        )),
        _ => Err(ApiError::Internal(
            "unexpected outcome for report download".to_string(),
        )),
    }
}
