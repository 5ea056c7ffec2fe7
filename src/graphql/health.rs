use crate::models::health::HealthResponse;
use crate::state::AppState;
use async_graphql::{Context, Object, Result};

/// GraphQL representation of service health status
///
/// Mirrors the REST health response.
#[derive(Debug)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub storage: String,
}

impl From<HealthResponse> for Health {
    fn from(response: HealthResponse) -> Self {
        Self {
            status: response.status,
            timestamp: response.timestamp,
            version: response.version,
            storage: response.storage,
        }
    }
}

#[Object]
impl Health {
    /// Current service status indicator, "UP" when operational
    async fn status(&self) -> &str {
        &self.status
    }

    /// ISO-8601 timestamp of the check
    async fn timestamp(&self) -> &str {
        &self.timestamp
    }

    async fn version(&self) -> &str {
        &self.version
    }

    /// Storage backend selected at startup
    async fn storage(&self) -> &str {
        &self.storage
    }
}

/// Root query type for health-related GraphQL operations
#[derive(Default)]
pub struct HealthQuery;

#[Object]
impl HealthQuery {
    /// Checks service health status
    ///
    /// # Errors
    /// Fails only when the schema was built without [`AppState`] data.
    async fn health(&self, ctx: &Context<'_>) -> Result<Health> {
        let state = ctx.data::<AppState>()?;
        Ok(Health::from(HealthResponse::up(state.store.backend_name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::schema::create_schema;
    use crate::state::test_support::memory_state;
    use chrono::DateTime;

    #[test]
    fn test_health_from_health_response() {
        let response = HealthResponse::up("mongodb");
        let timestamp = response.timestamp.clone();

        let health = Health::from(response);
        assert_eq!(health.status, "UP");
        assert_eq!(health.timestamp, timestamp);
        assert_eq!(health.storage, "mongodb");
    }

    #[tokio::test]
    async fn test_health_query_resolver() {
        let schema = create_schema(memory_state().await);

        let query = r#"
            query {
                health {
                    status
                    timestamp
                    storage
                }
            }
        "#;
        let result = schema.execute(query).await;
        assert!(result.errors.is_empty());

        let data = result.data.into_json().unwrap();
        assert_eq!(data["health"]["status"], "UP");
        assert_eq!(data["health"]["storage"], "memory");

        let timestamp = data["health"]["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_health_without_state_errors() {
        use async_graphql::{EmptyMutation, EmptySubscription, Schema};

        let schema = Schema::build(HealthQuery, EmptyMutation, EmptySubscription).finish();
        let result = schema.execute("{ health { status } }").await;
        assert_eq!(result.errors.len(), 1);
    }
}
