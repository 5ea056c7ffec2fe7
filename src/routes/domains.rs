use crate::error::Result;
use crate::models::email::{DomainCheckResponse, DomainRequest};
use crate::models::{DomainSource, PageRequest, TempDomain};
use crate::state::AppState;
use actix_web::{HttpResponse, Responder, delete, get, post, put, web};

/// # List Temporary Domains
///
/// Lists registered temporary domains, newest first.
///
/// # Arguments
/// * `query` - `page` (from 1) and `limit` (1 to 100); both optional
/// * `state` - Shared application state holding the registry
///
/// # Returns
/// A `Page<TempDomain>` with `items`, `total`, `page` and `limit`.
///
/// # Errors
/// A storage failure is reported as 500.
#[utoipa::path(
    get,
    path = "/api/v1/domains",
    params(PageRequest),
    responses(
        (status = 200, description = "Page of temporary domains")
    ),
    tag = "Temporary Domains"
)]
#[get("/domains")]
pub async fn list_domains(
    query: web::Query<PageRequest>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    let page = state.registry.list(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// # Register Temporary Domain
///
/// Adds a user entry to the registry.
///
/// ## Responses
/// - **201 Created**: Entry stored
/// - **400 Bad Request**: Malformed domain
/// - **409 Conflict**: Domain already registered
#[utoipa::path(
    post,
    path = "/api/v1/domains",
    request_body = DomainRequest,
    responses(
        (status = 201, description = "Domain registered", body = TempDomain),
        (status = 400, description = "Invalid domain"),
        (status = 409, description = "Domain already registered")
    ),
    tag = "Temporary Domains"
)]
#[post("/domains")]
pub async fn add_domain(
    body: web::Json<DomainRequest>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    let entry = state.registry.add(&body.domain, DomainSource::User).await?;
    Ok(HttpResponse::Created().json(entry))
}

/// Renames a user entry. Builtin entries are read-only.
#[utoipa::path(
    put,
    path = "/api/v1/domains/{id}",
    request_body = DomainRequest,
    params(("id" = String, Path, description = "Registry entry id")),
    responses(
        (status = 200, description = "Domain updated", body = TempDomain),
        (status = 403, description = "Builtin entry"),
        (status = 404, description = "Unknown id"),
        (status = 409, description = "Domain already registered")
    ),
    tag = "Temporary Domains"
)]
#[put("/domains/{id}")]
pub async fn update_domain(
    path: web::Path<String>,
    body: web::Json<DomainRequest>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    let entry = state.registry.update(&path, &body.domain).await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/v1/domains/{id}",
    params(("id" = String, Path, description = "Registry entry id")),
    responses(
        (status = 204, description = "Domain removed"),
        (status = 403, description = "Builtin entry"),
        (status = 404, description = "Unknown id")
    ),
    tag = "Temporary Domains"
)]
#[delete("/domains/{id}")]
pub async fn delete_domain(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    state.registry.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Whether a domain is listed or matches a temporary-domain pattern.
#[utoipa::path(
    get,
    path = "/api/v1/domains/check/{domain}",
    params(("domain" = String, Path, description = "Domain to check")),
    responses(
        (status = 200, description = "Check result", body = DomainCheckResponse)
    ),
    tag = "Temporary Domains"
)]
#[get("/domains/check/{domain}")]
pub async fn check_domain(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    let domain = path.trim().to_lowercase();
    let is_temp = state.registry.is_temp_domain(&domain).await?;
    Ok(HttpResponse::Ok().json(DomainCheckResponse { domain, is_temp }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(check_domain)
        .service(list_domains)
        .service(add_domain)
        .service(update_domain)
        .service(delete_domain);
}
