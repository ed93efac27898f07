//! Bound collection controller: one paginated, mutable view of a remote
//! entity table.
//!
//! Every entity screen composes a [`BoundCollection`] instead of re-deriving
//! list/create/update/delete handling. State transitions follow a single
//! contract:
//!
//! * `loading` stays true while any operation of this instance is in flight;
//! * `error` is cleared when an operation starts and set only when one fails;
//! * `items` only ever changes to a fully fetched page or a completed
//!   mutation, never to a partial result;
//! * among concurrent loads, the one started last decides the final state.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use serde::Serialize;
use shared::{
    domain::{Entity, EntityData, EntityId, Record},
    error::GatewayError,
    protocol::Page,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::gateway::Gateway;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<GatewayError>,
    /// 1-based.
    pub current_page: u32,
    pub total_pages: u32,
    in_flight: usize,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            current_page: 1,
            total_pages: 0,
            in_flight: 0,
        }
    }
}

impl<T> CollectionState<T> {
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|err| err.message.as_str())
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }
}

pub struct BoundCollection<T> {
    gateway: Arc<dyn Gateway>,
    entity: String,
    state: watch::Sender<CollectionState<T>>,
    latest_load: AtomicU64,
}

impl<D: EntityData> BoundCollection<Record<D>> {
    /// Controller for the table the payload type is bound to.
    pub fn for_table(gateway: Arc<dyn Gateway>) -> Self {
        Self::new(gateway, D::TABLE)
    }
}

impl<T: Entity> BoundCollection<T> {
    pub fn new(gateway: Arc<dyn Gateway>, entity: impl Into<String>) -> Self {
        Self {
            gateway,
            entity: entity.into(),
            state: watch::Sender::new(CollectionState::default()),
            latest_load: AtomicU64::new(0),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn state(&self) -> CollectionState<T> {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state transition, for re-rendering.
    pub fn subscribe(&self) -> watch::Receiver<CollectionState<T>> {
        self.state.subscribe()
    }

    pub fn items(&self) -> Vec<T> {
        self.state.borrow().items.clone()
    }

    pub fn current_page(&self) -> u32 {
        self.state.borrow().current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.state.borrow().total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<GatewayError> {
        self.state.borrow().error.clone()
    }

    fn begin(&self) {
        self.state.send_modify(|state| {
            state.in_flight += 1;
            state.loading = true;
            state.error = None;
        });
    }

    fn finish(&self, apply: impl FnOnce(&mut CollectionState<T>)) {
        self.state.send_modify(|state| {
            apply(state);
            state.in_flight = state.in_flight.saturating_sub(1);
            state.loading = state.in_flight > 0;
        });
    }

    fn fail(&self, err: GatewayError) {
        self.finish(|state| state.error = Some(err));
    }

    /// Invalidates every load already in flight so a completed mutation is
    /// not overwritten by a page fetched before it.
    fn supersede_loads(&self) {
        self.latest_load.fetch_add(1, Ordering::SeqCst);
    }

    fn is_latest(&self, token: u64) -> bool {
        self.latest_load.load(Ordering::SeqCst) == token
    }

    async fn fetch_page(&self, page: u32) -> Result<Page<T>, GatewayError> {
        let raw = self.gateway.list(&self.entity, page).await?;
        let items = raw
            .items
            .into_iter()
            .map(|row| decode_row(&self.entity, row))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(Page {
            items,
            total_pages: raw.total_pages,
        })
    }

    /// Loads `page` (1-based; 0 is treated as 1).
    ///
    /// Failures land in `error` and keep the previous items. A load that
    /// completes after a newer one was started is discarded.
    pub async fn load(&self, page: u32) {
        let token = self.latest_load.fetch_add(1, Ordering::SeqCst) + 1;
        self.begin();

        let mut page = page.max(1);
        loop {
            let result = self.fetch_page(page).await;
            if !self.is_latest(token) {
                debug!(
                    entity = %self.entity,
                    page,
                    token,
                    "collection: discarding superseded load"
                );
                self.finish(|_| {});
                return;
            }

            match result {
                Ok(fetched) => {
                    let last_page = fetched.total_pages.max(1);
                    if page > last_page {
                        debug!(
                            entity = %self.entity,
                            page,
                            last_page,
                            "collection: requested page no longer exists"
                        );
                        page = last_page;
                        continue;
                    }
                    self.finish(|state| {
                        state.items = fetched.items;
                        state.total_pages = fetched.total_pages;
                        state.current_page = page;
                    });
                }
                Err(err) => {
                    warn!(entity = %self.entity, page, "collection: load failed: {err}");
                    self.fail(err);
                }
            }
            return;
        }
    }

    pub async fn reload(&self) {
        self.load(self.current_page()).await;
    }

    /// Moves to `page` unless it is out of range, or is already shown and
    /// nothing is loading. Returns whether a load was issued.
    pub async fn go_to_page(&self, page: u32) -> bool {
        let (current, total, loading) = {
            let state = self.state.borrow();
            (state.current_page, state.total_pages, state.loading)
        };
        if page == 0 || page > total.max(1) || (page == current && !loading) {
            return false;
        }
        self.load(page).await;
        true
    }

    pub async fn next_page(&self) -> bool {
        let current = self.current_page();
        self.go_to_page(current.saturating_add(1)).await
    }

    pub async fn previous_page(&self) -> bool {
        let current = self.current_page();
        self.go_to_page(current.saturating_sub(1)).await
    }

    /// Creates a record and reloads the current page so the list matches
    /// what the backend now holds.
    ///
    /// Returns `Ok` once the backend accepted the record, even if the
    /// follow-up reload fails; in that case `error` holds the reload failure
    /// and `items` still shows the page as it was before the create.
    pub async fn create_item<P>(&self, payload: &P) -> Result<T, GatewayError>
    where
        P: Serialize + Sync + ?Sized,
    {
        self.begin();
        let created = match self.create_remote(payload).await {
            Ok(created) => created,
            Err(err) => {
                warn!(entity = %self.entity, "collection: create failed: {err}");
                self.fail(err.clone());
                return Err(err);
            }
        };
        info!(entity = %self.entity, id = %created.id(), "collection: created");
        self.reload().await;
        self.finish(|_| {});
        Ok(created)
    }

    async fn create_remote<P>(&self, payload: &P) -> Result<T, GatewayError>
    where
        P: Serialize + Sync + ?Sized,
    {
        let body = encode_payload(payload)?;
        let row = self.gateway.create(&self.entity, body).await?;
        decode_row(&self.entity, row)
    }

    /// Updates a record and swaps it into place in `items`. Loads started
    /// before the update completed are discarded.
    pub async fn update_item<P>(&self, id: &EntityId, payload: &P) -> Result<T, GatewayError>
    where
        P: Serialize + Sync + ?Sized,
    {
        self.begin();
        match self.update_remote(id, payload).await {
            Ok(updated) => {
                info!(entity = %self.entity, id = %id, "collection: updated");
                self.supersede_loads();
                let replacement = updated.clone();
                self.finish(|state| {
                    if let Some(slot) = state.items.iter_mut().find(|item| item.id() == id) {
                        *slot = replacement;
                    }
                });
                Ok(updated)
            }
            Err(err) => {
                warn!(entity = %self.entity, id = %id, "collection: update failed: {err}");
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    async fn update_remote<P>(&self, id: &EntityId, payload: &P) -> Result<T, GatewayError>
    where
        P: Serialize + Sync + ?Sized,
    {
        let body = encode_payload(payload)?;
        let row = self.gateway.update(&self.entity, id, body).await?;
        decode_row(&self.entity, row)
    }

    /// Deletes a record and removes it from `items`.
    ///
    /// Emptying a page moves to the previous page (or page 1); removing from a
    /// page that has successors reloads it so it backfills. Loads started
    /// before the delete completed are discarded.
    pub async fn delete_item(&self, id: &EntityId) -> Result<(), GatewayError> {
        self.begin();
        if let Err(err) = self.gateway.delete(&self.entity, id).await {
            warn!(entity = %self.entity, id = %id, "collection: delete failed: {err}");
            self.fail(err.clone());
            return Err(err);
        }
        info!(entity = %self.entity, id = %id, "collection: deleted");
        self.supersede_loads();

        let mut follow_up = None;
        self.state.send_modify(|state| {
            let before = state.items.len();
            state.items.retain(|item| item.id() != id);
            let removed = state.items.len() != before;
            follow_up = if state.items.is_empty() {
                Some(state.current_page.saturating_sub(1).max(1))
            } else if !removed || state.current_page < state.total_pages {
                Some(state.current_page)
            } else {
                None
            };
        });

        if let Some(page) = follow_up {
            self.load(page).await;
        }
        self.finish(|_| {});
        Ok(())
    }
}

fn encode_payload<P: Serialize + ?Sized>(payload: &P) -> Result<serde_json::Value, GatewayError> {
    serde_json::to_value(payload).map_err(|err| {
        GatewayError::new(format!("payload could not be encoded: {err}")).with_code("encode")
    })
}

fn decode_row<T: Entity>(entity: &str, row: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(row)
        .map_err(|err| GatewayError::decode(format!("invalid {entity} row: {err}")))
}

#[cfg(test)]
#[path = "tests/collection_tests.rs"]
mod tests;
