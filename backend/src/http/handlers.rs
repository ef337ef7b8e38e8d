//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    AchievementRequest, CompleteOneOnOneRequest, CompleteSmcRequest, HealthResponse,
    InactiveStartupsQuery, InactivityQuery, InactivityResponse, MessageResponse,
    OneOnOneResponse, RegisterRequest, RejectRequest, RevenueRequest, ScheduleOneOnOneRequest,
    ScheduleSmcRequest, SessionListQuery, SettingUpdate, SmcCompletionResponse, SmcListQuery,
    StartupListQuery,
};
use super::error::AppError;
use super::extract::ApiJson;
use super::state::AppState;
use crate::db::repository::StartupRepository;
use crate::db::services::{self as db_services, InactiveStartup, StatsOverview};
use crate::models::{
    OneOnOneSession, SessionId, Setting, SmcSchedule, SmcScheduleId, Startup, StartupId,
    StartupProfile,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers that create a record.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

fn created<T>(value: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(value)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
        storage: state.repository.storage_kind().to_string(),
    }))
}

// =============================================================================
// Startups
// =============================================================================

/// GET /api/startups
pub async fn list_startups(
    State(state): State<AppState>,
    Query(query): Query<StartupListQuery>,
) -> HandlerResult<Vec<Startup>> {
    let filter = query.into_filter()?;
    let startups = db_services::list_startups(state.repository.as_ref(), &filter).await?;
    Ok(Json(startups))
}

/// POST /api/startups
pub async fn register_startup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> CreatedResult<Startup> {
    let startup = db_services::register_startup(
        state.repository.as_ref(),
        request.profile,
        request.registered_date,
        state.now(),
    )
    .await?;
    created(startup)
}

/// GET /api/startups/{id}
pub async fn get_startup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<Startup> {
    let startup = db_services::get_startup(state.repository.as_ref(), StartupId::new(id)).await?;
    Ok(Json(startup))
}

/// PUT /api/startups/{id}
///
/// Replaces the profile fields only; lifecycle fields in the body are ignored.
pub async fn update_startup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(profile): ApiJson<StartupProfile>,
) -> HandlerResult<Startup> {
    let startup =
        db_services::update_profile(state.repository.as_ref(), StartupId::new(id), profile)
            .await?;
    Ok(Json(startup))
}

/// DELETE /api/startups/{id}
pub async fn delete_startup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<MessageResponse> {
    db_services::delete_startup(state.repository.as_ref(), StartupId::new(id)).await?;
    Ok(Json(MessageResponse::new("Startup deleted successfully")))
}

/// POST /api/startups/{id}/onboard
pub async fn onboard_startup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<Startup> {
    let startup =
        db_services::onboard_startup(state.repository.as_ref(), StartupId::new(id), state.now())
            .await?;
    Ok(Json(startup))
}

/// POST /api/startups/{id}/reject
pub async fn reject_startup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<RejectRequest>,
) -> HandlerResult<Startup> {
    let startup = db_services::reject_startup(
        state.repository.as_ref(),
        StartupId::new(id),
        &request.remark,
        state.now(),
    )
    .await?;
    Ok(Json(startup))
}

/// POST /api/startups/{id}/graduate
pub async fn graduate_startup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<Startup> {
    let startup =
        db_services::graduate_startup(state.repository.as_ref(), StartupId::new(id), state.now())
            .await?;
    Ok(Json(startup))
}

/// GET /api/startups/{id}/inactivity
pub async fn startup_inactivity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<InactivityQuery>,
) -> HandlerResult<InactivityResponse> {
    let as_of = query.as_of(state.now())?;
    let startup_id = StartupId::new(id);
    let report =
        db_services::startup_inactivity(state.repository.as_ref(), startup_id, as_of).await?;
    Ok(Json(InactivityResponse {
        startup_id,
        applicable: report.is_some(),
        report,
    }))
}

/// GET /api/inactive-startups
pub async fn inactive_startups(
    State(state): State<AppState>,
    Query(query): Query<InactiveStartupsQuery>,
) -> HandlerResult<Vec<InactiveStartup>> {
    let stage = query.stage()?;
    let report =
        db_services::inactive_startups(state.repository.as_ref(), stage, state.now()).await?;
    Ok(Json(report))
}

/// GET /api/stats/overview
pub async fn stats_overview(State(state): State<AppState>) -> HandlerResult<StatsOverview> {
    let stats = db_services::stats_overview(state.repository.as_ref()).await?;
    Ok(Json(stats))
}

// =============================================================================
// Achievements & Revenue
// =============================================================================

/// POST /api/achievements/{startup_id}
pub async fn add_achievement(
    State(state): State<AppState>,
    Path(startup_id): Path<i64>,
    ApiJson(request): ApiJson<AchievementRequest>,
) -> CreatedResult<Startup> {
    let startup = db_services::add_achievement(
        state.repository.as_ref(),
        StartupId::new(startup_id),
        request.into(),
    )
    .await?;
    created(startup)
}

/// DELETE /api/achievements/{startup_id}/{achievement_id}
pub async fn remove_achievement(
    State(state): State<AppState>,
    Path((startup_id, achievement_id)): Path<(i64, String)>,
) -> HandlerResult<Startup> {
    let startup = db_services::remove_achievement(
        state.repository.as_ref(),
        StartupId::new(startup_id),
        &achievement_id,
    )
    .await?;
    Ok(Json(startup))
}

/// POST /api/revenue/{startup_id}
pub async fn add_revenue(
    State(state): State<AppState>,
    Path(startup_id): Path<i64>,
    ApiJson(request): ApiJson<RevenueRequest>,
) -> CreatedResult<Startup> {
    let startup = db_services::add_revenue(
        state.repository.as_ref(),
        StartupId::new(startup_id),
        request.into(),
    )
    .await?;
    created(startup)
}

// =============================================================================
// SMC Scheduling
// =============================================================================

/// GET /api/smc
pub async fn list_smc(
    State(state): State<AppState>,
    Query(query): Query<SmcListQuery>,
) -> HandlerResult<Vec<SmcSchedule>> {
    let filter = query.into_filter()?;
    let schedules = db_services::list_smc(state.repository.as_ref(), &filter).await?;
    Ok(Json(schedules))
}

/// POST /api/smc
pub async fn schedule_smc(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ScheduleSmcRequest>,
) -> CreatedResult<SmcSchedule> {
    let (startup_id, date, time_slot) = request.parse()?;
    let schedule = db_services::schedule_smc(
        state.repository.as_ref(),
        startup_id,
        date,
        time_slot,
        state.now(),
    )
    .await?;
    created(schedule)
}

/// PUT /api/smc/{id}/complete
pub async fn complete_smc(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<CompleteSmcRequest>,
) -> HandlerResult<SmcCompletionResponse> {
    let (schedule, startup) = db_services::complete_smc(
        state.repository.as_ref(),
        SmcScheduleId::new(id),
        &request.panelist_name,
        &request.feedback,
        state.now(),
    )
    .await?;
    Ok(Json(SmcCompletionResponse { schedule, startup }))
}

/// PUT /api/smc/{id}/cancel
pub async fn cancel_smc(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<SmcSchedule> {
    let schedule =
        db_services::cancel_smc(state.repository.as_ref(), SmcScheduleId::new(id)).await?;
    Ok(Json(schedule))
}

/// DELETE /api/smc/{id}
pub async fn delete_smc(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<MessageResponse> {
    db_services::delete_smc(state.repository.as_ref(), SmcScheduleId::new(id)).await?;
    Ok(Json(MessageResponse::new("SMC schedule deleted successfully")))
}

// =============================================================================
// One-on-One Sessions
// =============================================================================

/// GET /api/one-on-one
pub async fn list_one_on_one(
    State(state): State<AppState>,
    Query(query): Query<SessionListQuery>,
) -> HandlerResult<Vec<OneOnOneSession>> {
    let filter = query.into_filter()?;
    let sessions = db_services::list_one_on_one(state.repository.as_ref(), &filter).await?;
    Ok(Json(sessions))
}

/// POST /api/one-on-one
pub async fn schedule_one_on_one(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ScheduleOneOnOneRequest>,
) -> CreatedResult<OneOnOneResponse> {
    let (startup_id, date) = request.parse()?;
    let (session, startup) = db_services::schedule_one_on_one(
        state.repository.as_ref(),
        startup_id,
        date,
        &request.time,
        &request.mentor_name,
        state.now(),
    )
    .await?;
    created(OneOnOneResponse { session, startup })
}

/// PUT /api/one-on-one/{id}/complete
pub async fn complete_one_on_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<CompleteOneOnOneRequest>,
) -> HandlerResult<OneOnOneResponse> {
    let (session, startup) = db_services::complete_one_on_one(
        state.repository.as_ref(),
        SessionId::new(id),
        &request.mentor_name,
        &request.feedback,
        &request.progress,
        state.now(),
    )
    .await?;
    Ok(Json(OneOnOneResponse { session, startup }))
}

/// DELETE /api/one-on-one/{id}
pub async fn delete_one_on_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<MessageResponse> {
    db_services::delete_one_on_one(state.repository.as_ref(), SessionId::new(id)).await?;
    Ok(Json(MessageResponse::new("One-on-One session deleted successfully")))
}

// =============================================================================
// Settings
// =============================================================================

/// GET /api/settings
pub async fn list_settings(State(state): State<AppState>) -> HandlerResult<Vec<Setting>> {
    let settings = db_services::list_settings(state.repository.as_ref()).await?;
    Ok(Json(settings))
}

/// GET /api/settings/{key}
pub async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> HandlerResult<Setting> {
    let setting = db_services::get_setting(state.repository.as_ref(), &key).await?;
    Ok(Json(setting))
}

/// PUT /api/settings/{key}
pub async fn put_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    ApiJson(update): ApiJson<SettingUpdate>,
) -> HandlerResult<Setting> {
    let setting =
        db_services::put_setting(state.repository.as_ref(), &key, update.value, update.description)
            .await?;
    Ok(Json(setting))
}
