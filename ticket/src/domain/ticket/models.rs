use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::ticket::errors::UsernameError;

/// Ticket unique identifier value object.
///
/// Lowercase hexadecimal digest string derived once per ticket lineage;
/// renewals keep the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(String);

impl TicketId {
    /// Wrap an already-derived hex digest string.
    ///
    /// # Arguments
    /// * `id` - Lowercase hex digest produced by the id generator
    ///
    /// # Returns
    /// TicketId value object
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Get id as string slice.
    ///
    /// # Returns
    /// Id string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ticket owners come from an upstream authenticator, so validation is
/// deliberately loose: non-empty and within a 255 character bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    const MAX_LENGTH: usize = 255;

    /// Create a new valid username.
    ///
    /// # Arguments
    /// * `username` - Raw username string
    ///
    /// # Returns
    /// Validated Username value object
    ///
    /// # Errors
    /// * `Empty` - Username is empty string
    /// * `TooLong` - Username longer than 255 characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let length = username.len();
        if length == 0 {
            Err(UsernameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(username))
        }
    }

    /// Get username as string slice.
    ///
    /// # Returns
    /// Username string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Expiry policy discriminator.
///
/// Closed set of policies, exhaustively matched by the expiry engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryMode {
    /// Deadline slides forward on validation once the remaining time drops
    /// below the renewal threshold.
    AfterInactivity,
    /// Deadline is fixed at issuance and never pushed out.
    AfterFixedTime,
    /// No deadline; the ticket never expires.
    DoNotExpire,
}

impl fmt::Display for ExpiryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ExpiryMode::AfterInactivity => "AFTER_INACTIVITY",
            ExpiryMode::AfterFixedTime => "AFTER_FIXED_TIME",
            ExpiryMode::DoNotExpire => "DO_NOT_EXPIRE",
        };
        f.write_str(tag)
    }
}

/// Ticket aggregate value.
///
/// Immutable once constructed: sliding renewal replaces the stored value
/// with a new `Ticket` carrying the same id and owner but a later deadline.
/// The store holds the only durable copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub owner: Username,
    pub expiry: ExpiryMode,
    /// Absent exactly when `expiry` is `DoNotExpire`.
    pub deadline: Option<DateTime<Utc>>,
    #[serde(with = "duration_millis")]
    pub valid_duration: Duration,
    /// Remaining-time bound below which an `AfterInactivity` ticket is
    /// eagerly renewed. Always half of `valid_duration`.
    #[serde(with = "duration_millis")]
    pub renewal_threshold: Duration,
}

impl Ticket {
    /// Construct a ticket with the renewal threshold derived from the
    /// valid duration.
    ///
    /// # Arguments
    /// * `id` - Ticket identity, derived once per lineage
    /// * `owner` - Validated owner username
    /// * `expiry` - Expiry policy
    /// * `deadline` - Expiry deadline; must be None iff policy is DoNotExpire
    /// * `valid_duration` - Span used to push out the deadline on renewal
    ///
    /// # Returns
    /// Ticket value with `renewal_threshold = valid_duration / 2`
    pub fn new(
        id: TicketId,
        owner: Username,
        expiry: ExpiryMode,
        deadline: Option<DateTime<Utc>>,
        valid_duration: Duration,
    ) -> Self {
        Self {
            id,
            owner,
            expiry,
            deadline,
            valid_duration,
            renewal_threshold: valid_duration / 2,
        }
    }

    /// Wall-clock expiry check.
    ///
    /// # Arguments
    /// * `now` - Current time
    ///
    /// # Returns
    /// True iff a deadline is present and strictly before `now`
    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| deadline < now)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<< ticket for: {:?} with expire policy: {} expires: {:?} and id {} >>",
            self.owner.as_str(),
            self.expiry,
            self.deadline,
            self.id
        )
    }
}

/// Serde representation for `chrono::Duration` as integer milliseconds.
///
/// A replicated cache needs a stable wire form and chrono does not ship
/// serde support for `Duration`.
mod duration_millis {
    use chrono::Duration;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        Ok(Duration::milliseconds(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rejects_empty() {
        let result = Username::new("".to_string());
        assert_eq!(result.unwrap_err(), UsernameError::Empty);
    }

    #[test]
    fn test_username_rejects_over_length() {
        let result = Username::new("a".repeat(256));
        assert!(matches!(
            result.unwrap_err(),
            UsernameError::TooLong { max: 255, actual: 256 }
        ));
    }

    #[test]
    fn test_username_accepts_unusual_characters() {
        // Upstream authenticators may hand over principals with dots,
        // backslashes or spaces; the ticket layer must not reject them.
        let username = Username::new("DOMAIN\\First Last".to_string()).unwrap();
        assert_eq!(username.as_str(), "DOMAIN\\First Last");
    }

    #[test]
    fn test_has_expired_strictly_before_now() {
        let now = Utc::now();
        let ticket = Ticket::new(
            TicketId::new("abc123".to_string()),
            Username::new("alice".to_string()).unwrap(),
            ExpiryMode::AfterFixedTime,
            Some(now),
            Duration::seconds(100),
        );

        assert!(!ticket.has_expired(now)); // Exactly at the deadline
        assert!(ticket.has_expired(now + Duration::milliseconds(1)));
    }

    #[test]
    fn test_no_deadline_never_expires() {
        let ticket = Ticket::new(
            TicketId::new("abc123".to_string()),
            Username::new("alice".to_string()).unwrap(),
            ExpiryMode::DoNotExpire,
            None,
            Duration::seconds(100),
        );

        assert!(!ticket.has_expired(Utc::now() + Duration::days(3650)));
    }

    #[test]
    fn test_renewal_threshold_is_half_valid_duration() {
        let ticket = Ticket::new(
            TicketId::new("abc123".to_string()),
            Username::new("alice".to_string()).unwrap(),
            ExpiryMode::AfterInactivity,
            Some(Utc::now()),
            Duration::seconds(100),
        );

        assert_eq!(ticket.renewal_threshold, Duration::seconds(50));
    }

    #[test]
    fn test_ticket_serde_round_trip() {
        let ticket = Ticket::new(
            TicketId::new("deadbeef".to_string()),
            Username::new("alice".to_string()).unwrap(),
            ExpiryMode::AfterInactivity,
            Some(Utc::now()),
            Duration::seconds(3600),
        );

        let json = serde_json::to_string(&ticket).unwrap();
        let decoded: Ticket = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, ticket);
    }
}
