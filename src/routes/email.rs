use crate::error::{Error, Result};
use crate::handlers::scoring::ensure_quota;
use crate::models::email::{BulkEmailRequest, BulkEmailResponse, EmailRequest};
use crate::models::{PageRequest, VerificationResult};
use crate::state::AppState;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

/// Header carrying the caller's user id, recorded in the audit log.
pub const USER_ID_HEADER: &str = "X-User-Id";
/// Header carrying the caller's remaining call quota.
pub const REMAINING_CALLS_HEADER: &str = "X-Remaining-Calls";

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerifyQuery {
    /// Fold community reports into the result
    #[serde(default)]
    pub community: bool,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerificationsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Only rows recorded for this user
    pub user_id: Option<String>,
}

fn user_id(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Rejects the request when the caller's declared quota cannot cover it.
fn check_quota(req: &HttpRequest, emails: usize) -> Result<()> {
    let Some(raw) = req.headers().get(REMAINING_CALLS_HEADER) else {
        return Ok(());
    };
    let remaining = raw
        .to_str()
        .ok()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .ok_or_else(|| {
            Error::InvalidInput(format!("{REMAINING_CALLS_HEADER} must be a non-negative integer"))
        })?;
    ensure_quota(remaining, emails)?;
    Ok(())
}

/// # Email Verification Endpoint
///
/// Scores an email address:
/// 1. Known temporary domain and email pattern checks
/// 2. Username entropy heuristic
/// 3. Domain MX record check (with timeout)
/// 4. Domain age estimate
/// 5. Known provider allowlist and crowd-sourced reputation
///
/// ## Request
/// - Method: POST
/// - Body: JSON object with `email` field
/// - Query Parameters:
///   - `community` (optional): Set to `true` to fold community reports into the result
/// - Headers:
///   - `X-User-Id` (optional): recorded with the audit row
///   - `X-Remaining-Calls` (optional): rejected with 429 if below the call cost
///
/// ## Responses
/// - **200 OK**: Verification result
/// - **400 Bad Request**: Malformed address
/// - **429 Too Many Requests**: Quota exhausted
///
/// ## Example Request
/// ```json
/// { "email": "user@example.com" }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/verify",
    request_body = EmailRequest,
    params(VerifyQuery),
    responses(
        (status = 200, description = "Verification result", body = VerificationResult),
        (status = 400, description = "Invalid email"),
        (status = 429, description = "Quota exceeded")
    ),
    tag = "Email Verification"
)]
#[post("/verify")]
pub async fn verify_email(
    req: HttpRequest,
    body: web::Json<EmailRequest>,
    query: web::Query<VerifyQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    check_quota(&req, 1)?;

    let result = if query.community {
        state.engine.verify_with_community(&body.email).await?
    } else {
        state.engine.verify(&body.email).await?
    };
    state.record_verification(&result, user_id(&req)).await;

    Ok(HttpResponse::Ok().json(result))
}

/// # Bulk Email Verification Endpoint
///
/// Scores many addresses concurrently. Every input gets an entry in
/// `results`, in input order; malformed addresses carry an `error` instead
/// of a `result`.
#[utoipa::path(
    post,
    path = "/api/v1/verify/bulk",
    request_body = BulkEmailRequest,
    responses(
        (status = 200, description = "Bulk verification results", body = BulkEmailResponse),
        (status = 429, description = "Quota exceeded")
    ),
    tag = "Email Verification"
)]
#[post("/verify/bulk")]
pub async fn verify_emails_bulk(
    req: HttpRequest,
    body: web::Json<BulkEmailRequest>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    check_quota(&req, body.emails.len())?;

    let items = state.engine.verify_many(&body.emails).await;
    let user = user_id(&req);
    for result in items.iter().filter_map(|item| item.result.as_ref()) {
        state.record_verification(result, user.clone()).await;
    }

    let response = BulkEmailResponse::from_items(items);
    info!(
        "Bulk verification of {} addresses: {} temporary, {} failed",
        response.results.len(),
        response.temp_count,
        response.failed_count
    );
    Ok(HttpResponse::Ok().json(response))
}

/// Audit log of past verifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/verifications",
    params(VerificationsQuery),
    responses(
        (status = 200, description = "Page of verification rows")
    ),
    tag = "Email Verification"
)]
#[get("/verifications")]
pub async fn list_verifications(
    query: web::Query<VerificationsQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    let query = query.into_inner();
    let page = PageRequest {
        page: query.page,
        limit: query.limit,
    };
    let rows = state.verifications(query.user_id, &page).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Configures email verification routes under /api/v1
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(verify_emails_bulk)
        .service(verify_email)
        .service(list_verifications);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::memory_state;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_verify_legitimate_address() {
        let state = memory_state().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(json!({"email": "someone@gmail.com"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: VerificationResult = test::read_body_json(resp).await;
        assert_eq!(body.trust_score, 100);
        assert!(!body.is_temp_email);
    }

    #[actix_web::test]
    async fn test_invalid_syntax() {
        let state = memory_state().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(json!({"email": "invalid-email"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "INVALID_INPUT");
    }

    #[actix_web::test]
    async fn test_quota_header() {
        let state = memory_state().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/verify/bulk")
            .insert_header((REMAINING_CALLS_HEADER, "1"))
            .set_json(json!({"emails": ["a@gmail.com", "b@gmail.com"]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 429);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "QUOTA_EXCEEDED");
    }
}
