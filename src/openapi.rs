use crate::models::{EmailReputation, Page, TempDomain, Verification};
use utoipa::OpenApi;

/// OpenAPI Specification Documentation
///
/// Generated at compile time from the `#[utoipa::path]` annotations on the
/// REST handlers.
///
/// # Tags
/// 1. **Health**: Service monitoring
/// 2. **Email Verification**: Trust scoring and the audit log
/// 3. **Temporary Domains**: Registry management
/// 4. **Reputation**: Community reports
/// 5. **GraphQL**: Unified query interface at `/api/v1/graphql`
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::email::verify_email,
        crate::routes::email::verify_emails_bulk,
        crate::routes::email::list_verifications,
        crate::routes::domains::list_domains,
        crate::routes::domains::add_domain,
        crate::routes::domains::update_domain,
        crate::routes::domains::delete_domain,
        crate::routes::domains::check_domain,
        crate::routes::reputation::report,
        crate::routes::reputation::most_reported,
        crate::routes::reputation::get_reputation,
    ),
    components(
        schemas(
            crate::models::HealthResponse,
            crate::models::VerificationResult,
            crate::models::Verification,
            crate::models::BulkItem,
            crate::models::ItemError,
            crate::models::TempDomain,
            crate::models::DomainSource,
            crate::models::EmailReputation,
            crate::models::ReportType,
            crate::models::email::EmailRequest,
            crate::models::email::BulkEmailRequest,
            crate::models::email::BulkEmailResponse,
            crate::models::email::DomainRequest,
            crate::models::email::DomainCheckResponse,
            crate::models::email::ReportRequest,
            Page<TempDomain>,
            Page<Verification>,
            Page<EmailReputation>,
        )
    ),
    tags(
        (name = "Health", description = "Service health monitoring endpoints"),
        (name = "Email Verification", description = "Trust scoring of email addresses"),
        (name = "Temporary Domains", description = "Known temporary email domains"),
        (name = "Reputation", description = "Crowd-sourced reports on addresses and domains"),
        (name = "GraphQL", description = "GraphQL API for interacting with all service features")
    ),
    info(
        description = "Scores how likely an email address is disposable, with REST and GraphQL interfaces",
        title = "Email Trust API",
        version = "0.3.0",
    )
)]
pub struct ApiDoc;
