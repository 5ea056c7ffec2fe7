#[cfg(test)]
mod email_route_tests {
    use crate::graphql::schema::create_schema;
    use crate::models::email::BulkEmailResponse;
    use crate::models::{Page, Verification, VerificationResult};
    use crate::routes::configure;
    use crate::routes::email::USER_ID_HEADER;
    use crate::state::test_support::memory_state;
    use actix_web::{App, test, web};
    use serde_json::json;

    // Full application with REST and GraphQL mounted under /api/v1
    async fn create_test_app() -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        let state = memory_state().await;
        let schema = create_schema(state.clone());
        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(schema))
                .configure(configure),
        )
        .await
    }

    #[actix_web::test]
    async fn test_verify_records_audit_row() {
        let app = create_test_app().await;

        let req = test::TestRequest::post()
            .uri("/api/v1/verify")
            .insert_header((USER_ID_HEADER, "user-42"))
            .set_json(json!({"email": " john.smith@example.com "}))
            .to_request();
        let result: VerificationResult = test::call_and_read_body_json(&app, req).await;
        assert_eq!(result.email, "john.smith@example.com");
        assert_eq!(result.trust_score, 100);

        let req = test::TestRequest::get()
            .uri("/api/v1/verifications?user_id=user-42")
            .to_request();
        let page: Page<Verification> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].user_id.as_deref(), Some("user-42"));

        let req = test::TestRequest::get()
            .uri("/api/v1/verifications?user_id=someone-else")
            .to_request();
        let page: Page<Verification> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page.total, 0);
    }

    #[actix_web::test]
    async fn test_bulk_keeps_input_order() {
        let app = create_test_app().await;

        let req = test::TestRequest::post()
            .uri("/api/v1/verify/bulk")
            .set_json(json!({"emails": [
                "user@mailinator.com",
                "missing-at-sign",
                "someone@gmail.com"
            ]}))
            .to_request();
        let response: BulkEmailResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(response.results.len(), 3);
        assert_eq!(response.temp_count, 1);
        assert_eq!(response.failed_count, 1);
        assert_eq!(response.results[1].email, "missing-at-sign");
        assert!(response.results[1].result.is_none());
        assert_eq!(response.results[2].result.as_ref().unwrap().trust_score, 100);

        let req = test::TestRequest::get()
            .uri("/api/v1/verifications")
            .to_request();
        let page: Page<Verification> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page.total, 2);
    }

    #[actix_web::test]
    async fn test_community_query_flag() {
        let app = create_test_app().await;

        for _ in 0..4 {
            let req = test::TestRequest::post()
                .uri("/api/v1/reputation/report")
                .set_json(json!({"target": "bad@example.com", "reportType": "phishing"}))
                .to_request();
            assert!(test::call_service(&app, req).await.status().is_success());
        }

        let req = test::TestRequest::post()
            .uri("/api/v1/verify?community=true")
            .set_json(json!({"email": "bad@example.com"}))
            .to_request();
        let result: VerificationResult = test::call_and_read_body_json(&app, req).await;
        assert!(result.is_temp_email);
        assert_eq!(result.trust_score, 80);
        assert_eq!(
            result.pattern_match,
            "Flagged as phishing by community reports"
        );
    }

    #[actix_web::test]
    async fn test_graphql_mounted_under_api() {
        let app = create_test_app().await;

        let req = test::TestRequest::post()
            .uri("/api/v1/graphql")
            .set_json(json!({"query": "{ health { status storage } }"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["health"]["storage"], "memory");
    }
}
