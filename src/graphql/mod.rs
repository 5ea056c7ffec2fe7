pub mod email;
pub mod handlers;
pub mod health;
pub mod schema;

use crate::error::Error;
use async_graphql::ErrorExtensions;

/// Surfaces the crate error code as the `code` extension of a GraphQL error.
impl ErrorExtensions for Error {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| ext.set("code", self.code()))
    }
}
