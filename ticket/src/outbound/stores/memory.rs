use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ticket::errors::TicketError;
use crate::domain::ticket::models::Ticket;
use crate::domain::ticket::models::TicketId;
use crate::domain::ticket::ports::TicketStore;

/// In-process implementation of TicketStore.
///
/// Single-node rendition of the shared ticket cache: cooperating service
/// nodes would swap this for an adapter over their replicated cache. Also
/// the backing store for integration tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTicketStore {
    tickets: Arc<RwLock<HashMap<TicketId, Ticket>>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn get(&self, key: &TicketId) -> Result<Option<Ticket>, TicketError> {
        let ticket = self.tickets.read().await.get(key).cloned();
        tracing::trace!(id = %key, found = ticket.is_some(), "Ticket cache get");
        Ok(ticket)
    }

    async fn put(&self, ticket: Ticket) -> Result<(), TicketError> {
        tracing::trace!(id = %ticket.id, owner = %ticket.owner, "Ticket cache put");
        self.tickets
            .write()
            .await
            .insert(ticket.id.clone(), ticket);
        Ok(())
    }

    async fn remove(&self, key: &TicketId) -> Result<(), TicketError> {
        let removed = self.tickets.write().await.remove(key);
        if removed.is_some() {
            tracing::debug!(id = %key, "Ticket cache remove");
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<TicketId>, TicketError> {
        let keys: Vec<TicketId> = self.tickets.read().await.keys().cloned().collect();
        tracing::trace!(count = keys.len(), "Ticket cache key scan");
        Ok(keys)
    }

    async fn clear(&self) -> Result<(), TicketError> {
        let mut tickets = self.tickets.write().await;
        tracing::warn!(count = tickets.len(), "Clearing ticket cache");
        tickets.clear();
        Ok(())
    }
}
