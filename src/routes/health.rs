use crate::models::HealthResponse;
use crate::state::AppState;
use actix_web::{HttpResponse, Responder, get, web};

/// # Health Check Endpoint
///
/// Returns the service status, a timestamp and the storage backend selected
/// at startup.
///
/// ## Example Response
///
/// ```json
/// {
///   "status": "UP",
///   "timestamp": "2023-10-05T12:34:56.789Z",
///   "version": "0.3.0",
///   "storage": "memory"
/// }
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::up(state.store.backend_name()))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::memory_state;
    use actix_web::{App, test};
    use serde_json::from_str;

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(memory_state().await))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let body_str = std::str::from_utf8(&body).unwrap();
        let health_response: HealthResponse = from_str(body_str).unwrap();

        assert_eq!(health_response.status, "UP");
        assert_eq!(health_response.storage, "memory");
        assert!(!health_response.timestamp.is_empty());
    }
}
