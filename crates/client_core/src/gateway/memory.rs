use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use shared::{
    domain::EntityId,
    error::GatewayError,
    protocol::{page_window, total_pages_for, RecordPage},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{check_entity_name, Gateway};

/// In-process stand-in for the hosted backend.
///
/// Rows are kept newest first, matching the REST gateway's
/// `created_at.desc` ordering, and receive a UUID id plus `created_at`
/// on insert.
pub struct MemoryGateway {
    page_size: u32,
    tables: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryGateway {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Inserts rows as-is, in the given display order, ahead of existing rows.
    pub async fn seed(&self, entity: &str, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.tables.lock().await;
        let table = tables.entry(entity.to_string()).or_default();
        let mut rows: Vec<Value> = rows.into_iter().collect();
        rows.append(table);
        *table = rows;
    }

    pub async fn len(&self, entity: &str) -> usize {
        self.tables.lock().await.get(entity).map_or(0, Vec::len)
    }

    pub async fn is_empty(&self, entity: &str) -> bool {
        self.len(entity).await == 0
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new(10)
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn payload_object(payload: Value) -> Result<Map<String, Value>, GatewayError> {
    match payload {
        Value::Object(map) => Ok(map),
        other => Err(GatewayError::new(format!(
            "payload must be a JSON object, got {other}"
        ))
        .with_code("invalid_payload")),
    }
}

fn missing_row(entity: &str, id: &EntityId) -> GatewayError {
    GatewayError::not_found(format!("no {entity} row with id {id}"))
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn list(&self, entity: &str, page: u32) -> Result<RecordPage, GatewayError> {
        check_entity_name(entity)?;
        let tables = self.tables.lock().await;
        let rows = tables.get(entity).map(Vec::as_slice).unwrap_or_default();
        let (offset, limit) = page_window(page, self.page_size);
        let items = rows
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(RecordPage {
            items,
            total_pages: total_pages_for(rows.len() as u64, self.page_size),
        })
    }

    async fn create(&self, entity: &str, payload: Value) -> Result<Value, GatewayError> {
        check_entity_name(entity)?;
        let mut row = payload_object(payload)?;
        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        row.insert(
            "created_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        let row = Value::Object(row);
        self.tables
            .lock()
            .await
            .entry(entity.to_string())
            .or_default()
            .insert(0, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        entity: &str,
        id: &EntityId,
        payload: Value,
    ) -> Result<Value, GatewayError> {
        check_entity_name(entity)?;
        let changes = payload_object(payload)?;
        let mut tables = self.tables.lock().await;
        let row = tables
            .get_mut(entity)
            .and_then(|rows| rows.iter_mut().find(|row| row_id(row) == Some(id.as_str())))
            .ok_or_else(|| missing_row(entity, id))?;
        if let Value::Object(fields) = row {
            for (key, value) in changes {
                if key != "id" && key != "created_at" {
                    fields.insert(key, value);
                }
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, entity: &str, id: &EntityId) -> Result<(), GatewayError> {
        check_entity_name(entity)?;
        let mut tables = self.tables.lock().await;
        let rows = tables
            .get_mut(entity)
            .ok_or_else(|| missing_row(entity, id))?;
        let before = rows.len();
        rows.retain(|row| row_id(row) != Some(id.as_str()));
        if rows.len() == before {
            return Err(missing_row(entity, id));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/memory_gateway_tests.rs"]
mod tests;
