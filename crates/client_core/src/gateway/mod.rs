//! Remote data access, keyed by entity (table) name.

use async_trait::async_trait;
use serde_json::Value;
use shared::{domain::EntityId, error::GatewayError, protocol::RecordPage};

mod memory;
mod rest;

pub use memory::MemoryGateway;
pub use rest::{parse_content_range_total, RestGateway};

pub const INVALID_ENTITY_CODE: &str = "invalid_entity";

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetches one 1-based page of `entity`.
    async fn list(&self, entity: &str, page: u32) -> Result<RecordPage, GatewayError>;
    async fn create(&self, entity: &str, payload: Value) -> Result<Value, GatewayError>;
    async fn update(
        &self,
        entity: &str,
        id: &EntityId,
        payload: Value,
    ) -> Result<Value, GatewayError>;
    async fn delete(&self, entity: &str, id: &EntityId) -> Result<(), GatewayError>;
}

/// Table names end up in URLs, so only lowercase ascii, digits and `_` pass.
pub fn check_entity_name(entity: &str) -> Result<(), GatewayError> {
    let valid = !entity.is_empty()
        && entity
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(GatewayError::new(format!("invalid entity name '{entity}'"))
            .with_code(INVALID_ENTITY_CODE))
    }
}
