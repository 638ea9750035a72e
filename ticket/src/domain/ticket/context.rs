/// Ticket association for one unit of concurrent execution.
///
/// Replaces the classic process-wide thread-local slot: each logical
/// request or task owns its own `CurrentTicket` and threads it through
/// call signatures. Sharing one value across concurrently running units
/// is a correctness bug (cross-request identity leakage), and a context
/// must be cleared at the end of its unit of work so a pooled worker does
/// not leak the association into the next request.
#[derive(Debug, Clone, Default)]
pub struct CurrentTicket {
    ticket: Option<String>,
}

impl CurrentTicket {
    /// Create an empty context.
    ///
    /// # Returns
    /// Context with no associated ticket
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the associated ticket string, if any.
    ///
    /// # Returns
    /// Ticket string slice, or None
    pub fn get(&self) -> Option<&str> {
        self.ticket.as_deref()
    }

    /// Associate a ticket string with this unit of execution.
    ///
    /// # Arguments
    /// * `ticket_string` - Ticket string to associate
    pub fn set(&mut self, ticket_string: String) {
        self.ticket = Some(ticket_string);
    }

    /// Drop the association. Call at the end of the unit of work.
    pub fn clear(&mut self) {
        self.ticket = None;
    }
}
