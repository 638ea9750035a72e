use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::context::CurrentTicket;
use super::errors::TicketError;
use super::expiry::renew;
use super::expiry::RenewOutcome;
use super::id::TicketIdGenerator;
use super::models::ExpiryMode;
use super::models::Ticket;
use super::models::TicketId;
use super::models::Username;
use super::ports::TicketServicePort;
use super::ports::TicketStore;
use crate::config::TicketConfig;

/// Prefix carried by every externally visible ticket string.
pub const TICKET_PREFIX: &str = "TICKET_";

/// Concrete implementation of TicketServicePort.
///
/// Composes the id generator, the expiry engine, and the store port, and
/// owns the single-ticket-per-user policy. Generic over the store for
/// testability.
///
/// The at-most-one-ticket-per-user invariant is best effort: the scan-then-
/// put sequence in `issue` is not atomic over a shared cache, so two
/// concurrent issuances for the same user can both write a ticket. The
/// duplicate is benign and gets collected by later invalidation sweeps.
pub struct TicketService<S>
where
    S: TicketStore,
{
    store: Arc<S>,
    generator: TicketIdGenerator,
    config: TicketConfig,
}

impl<S> TicketService<S>
where
    S: TicketStore,
{
    pub fn new(store: Arc<S>, config: TicketConfig) -> Self {
        Self {
            store,
            generator: TicketIdGenerator::new(),
            config,
        }
    }

    /// Extract the store key from a ticket string.
    ///
    /// # Arguments
    /// * `ticket_string` - Externally visible ticket string
    ///
    /// # Returns
    /// Ticket id key
    ///
    /// # Errors
    /// * `InvalidFormat` - String is shorter than the prefix or does not
    ///   carry it
    fn ticket_key(ticket_string: &str) -> Result<TicketId, TicketError> {
        ticket_string
            .strip_prefix(TICKET_PREFIX)
            .map(|key| TicketId::new(key.to_string()))
            .ok_or_else(|| TicketError::InvalidFormat(ticket_string.to_string()))
    }

    fn ticket_string(id: &TicketId) -> String {
        format!("{TICKET_PREFIX}{id}")
    }

    /// Scan the store for a live ticket owned by `owner`, renewing it in
    /// place when it is due.
    async fn find_live_user_ticket(
        &self,
        owner: &Username,
    ) -> Result<Option<Ticket>, TicketError> {
        for key in self.store.keys().await? {
            // Entries can vanish between the key scan and the fetch.
            let Some(ticket) = self.store.get(&key).await? else {
                continue;
            };
            if ticket.owner != *owner {
                continue;
            }
            match renew(&ticket, Utc::now()) {
                RenewOutcome::Dead => continue,
                RenewOutcome::Renewed(renewed) => {
                    self.store.put(renewed.clone()).await?;
                    tracing::debug!(owner = %owner, id = %renewed.id, "Found and renewed live ticket for user");
                    return Ok(Some(renewed));
                }
                RenewOutcome::Unchanged(ticket) => {
                    tracing::debug!(owner = %owner, id = %ticket.id, "Found live ticket for user");
                    return Ok(Some(ticket));
                }
            }
        }
        tracing::debug!(owner = %owner, "No live ticket for user");
        Ok(None)
    }
}

#[async_trait]
impl<S> TicketServicePort for TicketService<S>
where
    S: TicketStore + 'static,
{
    async fn issue(&self, owner: &Username) -> Result<String, TicketError> {
        tracing::debug!(
            owner = %owner,
            single_ticket_per_user = self.config.single_ticket_per_user,
            tickets_expire = self.config.tickets_expire,
            "Requested new ticket"
        );

        if self.config.single_ticket_per_user {
            if let Some(existing) = self.find_live_user_ticket(owner).await? {
                return Ok(Self::ticket_string(&existing.id));
            }
        }

        let (expiry, deadline) = if self.config.tickets_expire {
            (
                self.config.expiry_mode,
                Some(Utc::now() + self.config.valid_duration()),
            )
        } else {
            (ExpiryMode::DoNotExpire, None)
        };

        let id = self.generator.generate(expiry, deadline, owner);
        let ticket = Ticket::new(
            id,
            owner.clone(),
            expiry,
            deadline,
            self.config.valid_duration(),
        );
        tracing::debug!(id = %ticket.id, owner = %owner, "Storing new ticket");
        self.store.put(ticket.clone()).await?;

        Ok(Self::ticket_string(&ticket.id))
    }

    async fn validate(&self, ticket_string: &str) -> Result<Username, TicketError> {
        let key = Self::ticket_key(ticket_string)?;

        let ticket = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| TicketError::NotFound(ticket_string.to_string()))?;

        match renew(&ticket, Utc::now()) {
            RenewOutcome::Dead => {
                tracing::debug!(id = %key, "Ticket expired");
                Err(TicketError::Expired(ticket_string.to_string()))
            }
            RenewOutcome::Renewed(renewed) => {
                // Persist the pushed-out deadline before answering.
                self.store.put(renewed.clone()).await?;
                tracing::debug!(id = %renewed.id, owner = %renewed.owner, "Validated and renewed ticket");
                Ok(renewed.owner)
            }
            RenewOutcome::Unchanged(ticket) => {
                tracing::debug!(id = %ticket.id, owner = %ticket.owner, "Validated ticket");
                Ok(ticket.owner)
            }
        }
    }

    async fn owner_of(&self, ticket_string: &str) -> Result<Option<Username>, TicketError> {
        let key = Self::ticket_key(ticket_string)?;
        Ok(self.store.get(&key).await?.map(|ticket| ticket.owner))
    }

    async fn invalidate_by_id(&self, ticket_string: &str) -> Result<(), TicketError> {
        let key = Self::ticket_key(ticket_string)?;
        tracing::warn!(id = %key, "Removing ticket");
        self.store.remove(&key).await
    }

    async fn invalidate_by_user(&self, owner: &Username) -> Result<(), TicketError> {
        let mut to_remove = Vec::new();
        for key in self.store.keys().await? {
            let Some(ticket) = self.store.get(&key).await? else {
                continue;
            };
            if ticket.owner == *owner {
                to_remove.push(ticket.id);
            }
        }

        tracing::warn!(owner = %owner, count = to_remove.len(), "Removing all tickets for user");
        for id in to_remove {
            self.store.remove(&id).await?;
        }
        Ok(())
    }

    async fn invalidate_all(&self, expired_only: bool) -> Result<usize, TicketError> {
        if !expired_only {
            let count = self.store.keys().await?.len();
            tracing::error!(count, "Clearing the entire ticket store");
            self.store.clear().await?;
            return Ok(count);
        }

        let now = Utc::now();
        let mut to_remove = Vec::new();
        for key in self.store.keys().await? {
            match self.store.get(&key).await? {
                // Keys for entries that already vanished still count as swept.
                None => to_remove.push(key),
                Some(ticket) if ticket.has_expired(now) => to_remove.push(key),
                Some(_) => {}
            }
        }

        let count = to_remove.len();
        tracing::debug!(count, "Sweeping expired tickets");
        for key in to_remove {
            self.store.remove(&key).await?;
        }
        Ok(count)
    }

    async fn users_with_tickets(
        &self,
        non_expired_only: bool,
    ) -> Result<HashSet<Username>, TicketError> {
        let now = Utc::now();
        let mut users = HashSet::new();
        for key in self.store.keys().await? {
            let Some(ticket) = self.store.get(&key).await? else {
                continue;
            };
            if !non_expired_only || !ticket.has_expired(now) {
                users.insert(ticket.owner);
            }
        }
        Ok(users)
    }

    async fn count_tickets(&self, non_expired_only: bool) -> Result<usize, TicketError> {
        let keys = self.store.keys().await?;
        if !non_expired_only {
            return Ok(keys.len());
        }

        let now = Utc::now();
        let mut count = 0;
        for key in keys {
            match self.store.get(&key).await? {
                Some(ticket) if !ticket.has_expired(now) => count += 1,
                _ => {}
            }
        }
        Ok(count)
    }

    async fn current_ticket(
        &self,
        context: &mut CurrentTicket,
        owner: &Username,
        auto_create: bool,
    ) -> Result<Option<String>, TicketError> {
        if let Some(ticket_string) = context.get().map(str::to_string) {
            match self.owner_of(&ticket_string).await? {
                Some(ticket_owner) if ticket_owner == *owner => {
                    return Ok(Some(ticket_string));
                }
                other => {
                    tracing::debug!(
                        owner = %owner,
                        ticket_owner = ?other,
                        "Contextual ticket does not belong to requested owner"
                    );
                }
            }
        }

        if !auto_create {
            return Ok(None);
        }

        let ticket_string = self.issue(owner).await?;
        context.set(ticket_string.clone());
        Ok(Some(ticket_string))
    }
}
