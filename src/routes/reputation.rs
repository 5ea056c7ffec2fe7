use crate::error::{Error, Result};
use crate::models::email::ReportRequest;
use crate::models::{EmailReputation, PageRequest};
use crate::state::AppState;
use actix_web::{HttpResponse, Responder, get, post, web};

/// # Report Address or Domain
///
/// Records one community report. Targets containing `@` are tracked as full
/// addresses, anything else as a bare domain.
///
/// ## Example Request
/// ```json
/// { "target": "spammer@example.com", "reportType": "spam", "metadata": "bounce" }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/reputation/report",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Updated reputation row", body = EmailReputation),
        (status = 400, description = "Invalid target or report type")
    ),
    tag = "Reputation"
)]
#[post("/reputation/report")]
pub async fn report(
    body: web::Json<ReportRequest>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    let body = body.into_inner();
    let row = state
        .ledger
        .report(&body.target, body.report_type, body.metadata)
        .await?;
    Ok(HttpResponse::Ok().json(row))
}

/// Most reported targets first.
#[utoipa::path(
    get,
    path = "/api/v1/reputation",
    params(PageRequest),
    responses(
        (status = 200, description = "Page of reputation rows")
    ),
    tag = "Reputation"
)]
#[get("/reputation")]
pub async fn most_reported(
    query: web::Query<PageRequest>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    let page = state.ledger.most_reported(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/reputation/{target}",
    params(("target" = String, Path, description = "Full address or bare domain")),
    responses(
        (status = 200, description = "Reputation row", body = EmailReputation),
        (status = 404, description = "No reports for target")
    ),
    tag = "Reputation"
)]
#[get("/reputation/{target}")]
pub async fn get_reputation(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    let row = state
        .ledger
        .get(&path)
        .await?
        .ok_or_else(|| Error::NotFound(format!("no reports for '{}'", path.as_str())))?;
    Ok(HttpResponse::Ok().json(row))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(report)
        .service(most_reported)
        .service(get_reputation);
}
