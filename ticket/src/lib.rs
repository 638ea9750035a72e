//! Ticket lifecycle engine
//!
//! Issues, validates, renews, and revokes the opaque authentication
//! tickets that stand in for a verified identity across requests,
//! potentially across cooperating service nodes sharing ticket state
//! through a replicated keyed cache:
//! - Collision-resistant ticket identity derivation with a degrading
//!   digest fallback chain (SHA-1, MD5, CRC32)
//! - Expiry-policy state machine (sliding window, fixed deadline,
//!   non-expiring) with eager sliding renewal
//! - Best-effort single-ticket-per-user deduplication over a cache with
//!   no transactional guarantees
//!
//! The identity-authentication step that proves a username/password pair,
//! the cache replication itself, and the transport carrying ticket strings
//! are external collaborators: the cache is consumed through the
//! [`TicketStore`] port and callers supply already-verified usernames.
//!
//! # Examples
//!
//! ## Issue and validate
//! ```
//! use std::sync::Arc;
//! use ticket::{InMemoryTicketStore, TicketConfig, TicketService, TicketServicePort, Username};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(InMemoryTicketStore::new());
//! let service = TicketService::new(store, TicketConfig::default());
//!
//! let alice = Username::new("alice".to_string()).unwrap();
//! let ticket_string = service.issue(&alice).await.unwrap();
//! assert_eq!(service.validate(&ticket_string).await.unwrap(), alice);
//! # });
//! ```
//!
//! ## Per-request ticket context
//! ```
//! use std::sync::Arc;
//! use ticket::{CurrentTicket, InMemoryTicketStore, TicketConfig, TicketService, TicketServicePort, Username};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let service = TicketService::new(Arc::new(InMemoryTicketStore::new()), TicketConfig::default());
//! let alice = Username::new("alice".to_string()).unwrap();
//!
//! // One context per unit of work, cleared when the unit finishes.
//! let mut context = CurrentTicket::new();
//! let issued = service.current_ticket(&mut context, &alice, true).await.unwrap();
//! assert_eq!(issued.as_deref(), context.get());
//! context.clear();
//! # });
//! ```

pub mod config;
pub mod domain;
pub mod outbound;

// Re-export commonly used items
pub use config::Config;
pub use config::TicketConfig;
pub use domain::ticket::context::CurrentTicket;
pub use domain::ticket::errors::TicketError;
pub use domain::ticket::errors::UsernameError;
pub use domain::ticket::expiry::renew;
pub use domain::ticket::expiry::RenewOutcome;
pub use domain::ticket::id::TicketIdGenerator;
pub use domain::ticket::models::ExpiryMode;
pub use domain::ticket::models::Ticket;
pub use domain::ticket::models::TicketId;
pub use domain::ticket::models::Username;
pub use domain::ticket::ports::TicketServicePort;
pub use domain::ticket::ports::TicketStore;
pub use domain::ticket::service::TicketService;
pub use domain::ticket::service::TICKET_PREFIX;
pub use outbound::stores::memory::InMemoryTicketStore;
