use actix_web::web;

/// # Health Check Endpoint
///
/// `GET /health` returns the service status, a timestamp and the storage
/// backend in use.
pub mod health;

/// # Email Verification Endpoints
///
/// Single and bulk scoring plus the verification audit log.
///
/// ## Example Request
/// ```json
/// { "email": "user@example.com" }
/// ```
pub mod email;

/// Temporary-domain registry management.
pub mod domains;

/// Community reports and reputation lookups.
pub mod reputation;

pub mod graphql;

/// # API Route Configuration
///
/// Sets up versioned API endpoints under the `/api/v1` base path.
///
/// ## Mounted Services
/// - Health check (see [`health::configure_routes`])
/// - Email verification (see [`email::configure_routes`])
/// - Temporary domains (see [`domains::configure_routes`])
/// - Reputation (see [`reputation::configure_routes`])
/// - GraphQL (see [`graphql::configure_routes`])
///
/// ## Example Endpoints
///
/// ```text
/// GET  /api/v1/health
/// POST /api/v1/verify
/// POST /api/v1/verify/bulk
/// GET  /api/v1/domains/check/{domain}
/// POST /api/v1/reputation/report
/// POST /api/v1/graphql
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure_routes)
            .configure(email::configure_routes)
            .configure(domains::configure_routes)
            .configure(reputation::configure_routes)
            .configure(graphql::configure_routes),
    );
}

#[cfg(test)]
mod email_test;
