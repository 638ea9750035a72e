use std::collections::HashSet;

use async_trait::async_trait;

use super::context::CurrentTicket;
use super::errors::TicketError;
use super::models::Ticket;
use super::models::TicketId;
use super::models::Username;

/// Port over the externally owned ticket cache.
///
/// The backing cache may be shared and replicated across cooperating nodes
/// and offers no atomicity beyond single get/put/remove calls: there is no
/// compare-and-swap. Consequences callers must accept:
///
/// - Keys observed by `keys` may already be gone by the time they are
///   fetched or removed; a `None` result mid-scan is benign and skipped.
/// - Check-then-act sequences (scan for an owner's ticket, then put when
///   absent) are not atomic. Two concurrent issuances for the same user can
///   both write a ticket. This is best-effort deduplication, eventually
///   corrected by invalidation sweeps, and must not be "fixed" with a lock
///   the cache cannot support across a cluster.
/// - There is no secondary index by owner; by-user lookups are a full key
///   scan, O(live tickets). A user index would need its own replication
///   protocol, which this design avoids by keeping the keyed cache the
///   sole source of truth.
#[async_trait]
pub trait TicketStore: Send + Sync + 'static {
    /// Fetch a ticket by key.
    ///
    /// # Arguments
    /// * `key` - Ticket id to look up
    ///
    /// # Returns
    /// The ticket, or None when absent (never issued, removed, or evicted)
    ///
    /// # Errors
    /// * `Store` - Backing cache operation failed
    async fn get(&self, key: &TicketId) -> Result<Option<Ticket>, TicketError>;

    /// Store a ticket under its own id, replacing any previous value.
    ///
    /// # Arguments
    /// * `ticket` - Ticket to persist
    ///
    /// # Errors
    /// * `Store` - Backing cache operation failed
    async fn put(&self, ticket: Ticket) -> Result<(), TicketError>;

    /// Remove a ticket by key. Removing an absent key is a no-op.
    ///
    /// # Arguments
    /// * `key` - Ticket id to remove
    ///
    /// # Errors
    /// * `Store` - Backing cache operation failed
    async fn remove(&self, key: &TicketId) -> Result<(), TicketError>;

    /// Enumerate all ticket keys, possibly cluster-wide.
    ///
    /// # Returns
    /// Snapshot of keys at some point during the call
    ///
    /// # Errors
    /// * `Store` - Backing cache operation failed
    async fn keys(&self) -> Result<Vec<TicketId>, TicketError>;

    /// Drop every ticket in the cache.
    ///
    /// # Errors
    /// * `Store` - Backing cache operation failed
    async fn clear(&self) -> Result<(), TicketError>;
}

/// Port for the ticket lifecycle facade.
#[async_trait]
pub trait TicketServicePort: Send + Sync + 'static {
    /// Issue a ticket for an owner.
    ///
    /// Under single-ticket-per-user mode an existing live ticket for the
    /// owner is reused (renewing it in place when due); otherwise a fresh
    /// ticket is minted and stored.
    ///
    /// # Arguments
    /// * `owner` - Validated owner username
    ///
    /// # Returns
    /// Externally visible ticket string (`TICKET_` prefix plus id)
    ///
    /// # Errors
    /// * `Store` - Backing cache operation failed
    async fn issue(&self, owner: &Username) -> Result<String, TicketError>;

    /// Validate a ticket string, renewing sliding tickets as a side effect.
    ///
    /// # Arguments
    /// * `ticket_string` - Ticket string as handed to the caller by `issue`
    ///
    /// # Returns
    /// The validated owner
    ///
    /// # Errors
    /// * `InvalidFormat` - String does not carry the ticket prefix
    /// * `NotFound` - No ticket stored under the parsed key
    /// * `Expired` - Ticket found but past its deadline
    /// * `Store` - Backing cache operation failed
    async fn validate(&self, ticket_string: &str) -> Result<Username, TicketError>;

    /// Look up the owner of a ticket without renewal side effects.
    ///
    /// # Arguments
    /// * `ticket_string` - Ticket string to inspect
    ///
    /// # Returns
    /// The owner, or None when no such ticket is stored
    ///
    /// # Errors
    /// * `InvalidFormat` - String does not carry the ticket prefix
    /// * `Store` - Backing cache operation failed
    async fn owner_of(&self, ticket_string: &str) -> Result<Option<Username>, TicketError>;

    /// Remove the ticket behind a ticket string unconditionally.
    ///
    /// # Arguments
    /// * `ticket_string` - Ticket string to invalidate
    ///
    /// # Errors
    /// * `InvalidFormat` - String does not carry the ticket prefix
    /// * `Store` - Backing cache operation failed
    async fn invalidate_by_id(&self, ticket_string: &str) -> Result<(), TicketError>;

    /// Remove every ticket owned by a user.
    ///
    /// Entries that vanish between scan and removal are skipped, not an
    /// error.
    ///
    /// # Arguments
    /// * `owner` - Owner whose tickets are revoked
    ///
    /// # Errors
    /// * `Store` - Backing cache operation failed
    async fn invalidate_by_user(&self, owner: &Username) -> Result<(), TicketError>;

    /// Remove all tickets, or only the expired ones.
    ///
    /// # Arguments
    /// * `expired_only` - When false, clear the whole store; when true,
    ///   sweep out entries that are absent or past their deadline
    ///
    /// # Returns
    /// Number of tickets removed
    ///
    /// # Errors
    /// * `Store` - Backing cache operation failed
    async fn invalidate_all(&self, expired_only: bool) -> Result<usize, TicketError>;

    /// Collect the owners of stored tickets.
    ///
    /// Uses the wall-clock expiry check, not the renewal state machine: a
    /// ticket inside its renewal window but past its deadline is excluded.
    ///
    /// # Arguments
    /// * `non_expired_only` - When true, skip currently expired tickets
    ///
    /// # Returns
    /// Set of owners
    ///
    /// # Errors
    /// * `Store` - Backing cache operation failed
    async fn users_with_tickets(
        &self,
        non_expired_only: bool,
    ) -> Result<HashSet<Username>, TicketError>;

    /// Count stored tickets, with the same filter as `users_with_tickets`.
    ///
    /// # Arguments
    /// * `non_expired_only` - When true, skip currently expired tickets
    ///
    /// # Returns
    /// Ticket count
    ///
    /// # Errors
    /// * `Store` - Backing cache operation failed
    async fn count_tickets(&self, non_expired_only: bool) -> Result<usize, TicketError>;

    /// Resolve the ticket associated with the caller's unit of execution.
    ///
    /// Returns the contextual ticket when its stored owner matches;
    /// otherwise issues a fresh ticket and records it in the context when
    /// `auto_create` is set.
    ///
    /// # Arguments
    /// * `context` - Per-execution-unit ticket context
    /// * `owner` - Owner the caller claims to act as
    /// * `auto_create` - Issue a ticket when none is associated
    ///
    /// # Returns
    /// Ticket string for the owner, or None
    ///
    /// # Errors
    /// * `Store` - Backing cache operation failed
    async fn current_ticket(
        &self,
        context: &mut CurrentTicket,
        owner: &Username,
        auto_create: bool,
    ) -> Result<Option<String>, TicketError>;
}
