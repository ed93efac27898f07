//! Form submission: validate locally, then hand the payload to the controller.

use shared::{
    domain::{EntityData, EntityId, Record},
    error::GatewayError,
    validation::ValidationErrors,
};
use thiserror::Error;
use tracing::debug;

use crate::collection::BoundCollection;

#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error("rejected by backend: {0}")]
    Rejected(#[from] GatewayError),
}

impl FormError {
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Rejected(_) => None,
        }
    }
}

fn validated<D: EntityData>(data: &D) -> Result<(), FormError> {
    data.validate().map_err(|errors| {
        debug!(entity = D::TABLE, "form: {errors}");
        FormError::Invalid(errors)
    })
}

pub async fn submit_create<D: EntityData>(
    collection: &BoundCollection<Record<D>>,
    data: &D,
) -> Result<Record<D>, FormError> {
    validated(data)?;
    Ok(collection.create_item(data).await?)
}

pub async fn submit_update<D: EntityData>(
    collection: &BoundCollection<Record<D>>,
    id: &EntityId,
    data: &D,
) -> Result<Record<D>, FormError> {
    validated(data)?;
    Ok(collection.update_item(id, data).await?)
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
