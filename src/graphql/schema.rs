use super::email::{TrustMutation, TrustQuery};
use super::health::HealthQuery;
use crate::state::AppState;
use async_graphql::{EmptySubscription, MergedObject, Schema};

/// Root query combining health and trust operations.
#[derive(MergedObject, Default)]
pub struct QueryRoot(HealthQuery, TrustQuery);

/// Main GraphQL Schema Definition
///
/// # Type Parameters
/// - `QueryRoot`: health, verification, domain and reputation queries
/// - `TrustMutation`: community reports
/// - `EmptySubscription`: Placeholder for subscription operations (currently unused)
pub type AppSchema = Schema<QueryRoot, TrustMutation, EmptySubscription>;

/// Creates the GraphQL schema with the shared [`AppState`] attached as
/// context data.
///
/// # Example
///
/// ```rust,no_run
/// use email_trust::config::AppConfig;
/// use email_trust::graphql::schema::create_schema;
/// use email_trust::state::AppState;
///
/// # async fn run() -> email_trust::error::Result<()> {
/// let state = AppState::from_config(&AppConfig::default()).await?;
/// let schema = create_schema(state);
/// # Ok(())
/// # }
/// ```
pub fn create_schema(state: AppState) -> AppSchema {
    Schema::build(
        QueryRoot::default(),
        TrustMutation::default(),
        EmptySubscription,
    )
    .data(state)
    .finish()
}
