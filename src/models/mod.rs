/// Request and response bodies of the REST surface.
pub mod email;

/// # Health Status Response
///
/// Represents the operational status of the service with a timestamp and
/// the storage backend in use.
///
/// ## Example JSON
/// ```json
/// {
///   "status": "UP",
///   "timestamp": "2024-03-10T15:30:45.123456789Z",
///   "version": "0.3.0",
///   "storage": "memory"
/// }
/// ```
pub mod health;

pub mod domain;
pub mod pagination;
pub mod reputation;
pub mod verification;

pub use domain::{DomainSource, TempDomain};
pub use health::HealthResponse;
pub use pagination::{Page, PageRequest};
pub use reputation::{EmailReputation, ReportType};
pub use verification::{BulkItem, ItemError, Verification, VerificationResult};
