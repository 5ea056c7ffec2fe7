use actix_web::{App, HttpServer, web::Data};
use email_trust::config::AppConfig;
use email_trust::graphql::schema::create_schema;
use email_trust::openapi::ApiDoc;
use email_trust::state::AppState;
use email_trust::telemetry;
use std::io;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Email Trust Service Entry Point
///
/// # Endpoints
/// - REST: `/api/v1/...` (configured in routes)
/// - GraphQL: `/api/v1/graphql`
/// - Swagger UI: `/swagger-ui/`
/// - OpenAPI document: `/api-docs/openapi.json`
///
/// # Configuration
/// Environment variables, optionally loaded from a `.env` file. See
/// [`AppConfig::from_env`].
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().map_err(io::Error::other)?;
    telemetry::init(&config.logging);

    let state = AppState::from_config(&config)
        .await
        .map_err(io::Error::other)?;
    let schema = create_schema(state.clone());

    info!(
        "Starting email-trust on {}:{} (storage: {})",
        config.server.host,
        config.server.port,
        state.store.backend_name()
    );

    HttpServer::new(move || {
        let openapi = ApiDoc::openapi();

        App::new()
            .app_data(Data::new(state.clone()))
            .app_data(Data::new(schema.clone()))
            .configure(email_trust::routes::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
