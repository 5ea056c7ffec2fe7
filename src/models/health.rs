use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Debug, PartialEq, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    /// Storage variant selected at startup ("memory" or "mongodb")
    pub storage: String,
}

impl HealthResponse {
    pub fn up(storage: &str) -> Self {
        Self {
            status: "UP".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            storage: storage.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_health_response_up() {
        let response = HealthResponse::up("memory");

        assert_eq!(response.status, "UP");
        assert_eq!(response.storage, "memory");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));

        // Verify timestamp is valid ISO 8601 format
        let parsed_time = DateTime::parse_from_rfc3339(&response.timestamp);
        assert!(
            parsed_time.is_ok(),
            "Timestamp should be valid RFC3339 format"
        );
    }
}
