use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::dates;
use crate::renewals::classifier;
use crate::renewals::dispatch::MessageDispatcher;
use crate::renewals::domain::{LicensePlate, NewPolicy, NewRenewal, RenewalRecord};
use crate::renewals::notify::{EngineError, NotificationEngine};
use crate::renewals::store::{RenewalStore, StoreError};

/// Router builder exposing the renewal, installment, and notification
/// endpoints against a shared engine.
pub fn renewal_router<S, D>(engine: Arc<NotificationEngine<S, D>>) -> Router
where
    S: RenewalStore + 'static,
    D: MessageDispatcher + 'static,
{
    Router::new()
        .route("/api/v1/renewals", post(register_handler::<S, D>))
        .route("/api/v1/renewals/report", post(overview_handler::<S, D>))
        .route("/api/v1/renewals/:plate", get(status_handler::<S, D>))
        .route(
            "/api/v1/renewals/:plate/renewal",
            post(renewal_handler::<S, D>),
        )
        .route("/api/v1/policies", post(policy_handler::<S, D>))
        .route(
            "/api/v1/policies/:plate/payments",
            post(payment_handler::<S, D>),
        )
        .route("/api/v1/notifications/run", post(run_handler::<S, D>))
        .with_state(engine)
}

/// Requests that carry their own "today" (mostly tests and backfills); an
/// absent or empty date means the wall clock.
#[derive(Debug, Default, Deserialize)]
pub struct AsOfRequest {
    #[serde(default)]
    pub date: Option<String>,
}

/// Renewal action payload: the day the customer renewed.
#[derive(Debug, Default, Deserialize)]
pub struct RenewalActionRequest {
    #[serde(default)]
    pub renewed_on: Option<String>,
}

/// Installment payment payload.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub installment: u32,
    #[serde(default)]
    pub paid_on: Option<String>,
}

/// Status view for a single record, classification included when the stored
/// register date is readable.
#[derive(Debug, Serialize)]
pub struct RenewalStatusView {
    pub plate: LicensePlate,
    pub customer_name: String,
    pub phone: String,
    pub contactable: bool,
    pub register_date: String,
    pub status_label: &'static str,
    pub notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
}

fn status_view(
    record: &RenewalRecord,
    today: NaiveDate,
    window: &classifier::NotifyWindow,
) -> RenewalStatusView {
    let classified = classifier::classify(record, today, window);
    RenewalStatusView {
        plate: record.plate.clone(),
        customer_name: record.customer_name.clone(),
        phone: record.phone.clone(),
        contactable: record.contact_phone().is_some(),
        register_date: record.register_date.clone(),
        status_label: record.status.label(),
        notified: record.notify_status.is_notified(),
        expiry_display: classified.map(|c| dates::format_display(c.expiry_date)),
        days_remaining: classified.map(|c| c.days_remaining),
    }
}

fn resolve_date(raw: Option<&str>) -> Result<NaiveDate, Response> {
    match raw {
        None => Ok(Local::now().date_naive()),
        Some(text) if text.trim().is_empty() => Ok(Local::now().date_naive()),
        Some(text) => dates::parse_date(text).ok_or_else(|| {
            let payload = json!({ "error": format!("unrecognised date '{text}'") });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }),
    }
}

fn error_response(error: EngineError) -> Response {
    let status = match &error {
        EngineError::Domain(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        EngineError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        EngineError::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn register_handler<S, D>(
    State(engine): State<Arc<NotificationEngine<S, D>>>,
    axum::Json(intake): axum::Json<NewRenewal>,
) -> Response
where
    S: RenewalStore + 'static,
    D: MessageDispatcher + 'static,
{
    let today = Local::now().date_naive();
    match engine.register_customer(intake, today) {
        Ok(record) => {
            let view = status_view(&record, today, engine.window());
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<S, D>(
    State(engine): State<Arc<NotificationEngine<S, D>>>,
    Path(plate): Path<String>,
) -> Response
where
    S: RenewalStore + 'static,
    D: MessageDispatcher + 'static,
{
    let plate = match LicensePlate::parse(&plate) {
        Ok(plate) => plate,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };
    match engine.lookup(&plate) {
        Ok(Some(record)) => {
            let today = Local::now().date_naive();
            let view = status_view(&record, today, engine.window());
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Ok(None) => {
            let payload = json!({ "error": format!("no renewal record for plate {plate}") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn renewal_handler<S, D>(
    State(engine): State<Arc<NotificationEngine<S, D>>>,
    Path(plate): Path<String>,
    axum::Json(request): axum::Json<RenewalActionRequest>,
) -> Response
where
    S: RenewalStore + 'static,
    D: MessageDispatcher + 'static,
{
    let plate = match LicensePlate::parse(&plate) {
        Ok(plate) => plate,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };
    let renewed_on = match resolve_date(request.renewed_on.as_deref()) {
        Ok(date) => date,
        Err(response) => return response,
    };
    match engine.record_renewal(&plate, renewed_on) {
        Ok(record) => {
            let view = status_view(&record, renewed_on, engine.window());
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn policy_handler<S, D>(
    State(engine): State<Arc<NotificationEngine<S, D>>>,
    axum::Json(intake): axum::Json<NewPolicy>,
) -> Response
where
    S: RenewalStore + 'static,
    D: MessageDispatcher + 'static,
{
    match engine.register_policy(intake) {
        Ok(policy) => (StatusCode::CREATED, axum::Json(policy)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn payment_handler<S, D>(
    State(engine): State<Arc<NotificationEngine<S, D>>>,
    Path(plate): Path<String>,
    axum::Json(request): axum::Json<PaymentRequest>,
) -> Response
where
    S: RenewalStore + 'static,
    D: MessageDispatcher + 'static,
{
    let plate = match LicensePlate::parse(&plate) {
        Ok(plate) => plate,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };
    let paid_on = match resolve_date(request.paid_on.as_deref()) {
        Ok(date) => date,
        Err(response) => return response,
    };
    match engine.record_installment_payment(&plate, request.installment, paid_on) {
        Ok(policy) => (StatusCode::OK, axum::Json(policy)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn run_handler<S, D>(
    State(engine): State<Arc<NotificationEngine<S, D>>>,
    axum::Json(request): axum::Json<AsOfRequest>,
) -> Response
where
    S: RenewalStore + 'static,
    D: MessageDispatcher + 'static,
{
    let today = match resolve_date(request.date.as_deref()) {
        Ok(date) => date,
        Err(response) => return response,
    };
    match engine.run(today) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn overview_handler<S, D>(
    State(engine): State<Arc<NotificationEngine<S, D>>>,
    axum::Json(request): axum::Json<AsOfRequest>,
) -> Response
where
    S: RenewalStore + 'static,
    D: MessageDispatcher + 'static,
{
    let today = match resolve_date(request.date.as_deref()) {
        Ok(date) => date,
        Err(response) => return response,
    };
    match engine.overview(today) {
        Ok(overview) => (StatusCode::OK, axum::Json(overview)).into_response(),
        Err(error) => error_response(error),
    }
}
