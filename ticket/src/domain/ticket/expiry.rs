use chrono::DateTime;
use chrono::Utc;

use crate::domain::ticket::models::ExpiryMode;
use crate::domain::ticket::models::Ticket;

/// Outcome of running a ticket through the expiry state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewOutcome {
    /// The ticket's deadline has passed. Callers must reject it; this is
    /// distinct from the ticket not being found at all.
    Dead,
    /// The ticket is live and its deadline was not touched.
    Unchanged(Ticket),
    /// The ticket is live and was eagerly extended. Carries the replacement
    /// value (same id and owner, deadline pushed out); callers must persist
    /// it back to the store.
    Renewed(Ticket),
}

/// Run one expiry-policy transition for a ticket at the given instant.
///
/// This is the only place deadlines are recomputed:
/// - `DoNotExpire` tickets are always `Unchanged`.
/// - `AfterFixedTime` tickets are `Dead` once past their deadline and
///   `Unchanged` otherwise; the deadline is never pushed out.
/// - `AfterInactivity` tickets are `Dead` once past their deadline;
///   otherwise, when the remaining time drops below the renewal threshold,
///   the result is `Renewed` with `deadline = now + valid_duration`.
///
/// # Arguments
/// * `ticket` - Ticket to transition
/// * `now` - Current time
///
/// # Returns
/// RenewOutcome for the ticket at `now`
pub fn renew(ticket: &Ticket, now: DateTime<Utc>) -> RenewOutcome {
    match ticket.expiry {
        ExpiryMode::DoNotExpire => RenewOutcome::Unchanged(ticket.clone()),

        ExpiryMode::AfterFixedTime => {
            if ticket.has_expired(now) {
                RenewOutcome::Dead
            } else {
                RenewOutcome::Unchanged(ticket.clone())
            }
        }

        ExpiryMode::AfterInactivity => {
            if ticket.has_expired(now) {
                return RenewOutcome::Dead;
            }
            // Invariant: a live AfterInactivity ticket always has a deadline.
            let Some(deadline) = ticket.deadline else {
                return RenewOutcome::Unchanged(ticket.clone());
            };

            let remaining = deadline - now;
            if remaining < ticket.renewal_threshold {
                let renewed = Ticket {
                    deadline: Some(now + ticket.valid_duration),
                    ..ticket.clone()
                };
                RenewOutcome::Renewed(renewed)
            } else {
                RenewOutcome::Unchanged(ticket.clone())
            }
        }
    }
}
