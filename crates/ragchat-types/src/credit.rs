//! Auth and credit metering types for realtime session issuance.

use serde::{Deserialize, Serialize};

/// The only auth-provider role allowed to request sessions.
pub const AUTHENTICATED_ROLE: &str = "authenticated";

/// A user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Auth-provider role, `"authenticated"` for signed-in users.
    #[serde(default)]
    pub role: String,
}

impl AuthenticatedUser {
    pub fn is_authenticated(&self) -> bool {
        self.role == AUTHENTICATED_ROLE
    }
}

/// A row of the external `roles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditRecord {
    pub user_id: String,
    /// Application role (`"user"`, `"admin"`, …), not the auth-provider role.
    pub role: String,
    pub chats_left: i64,
}

impl CreditRecord {
    pub fn has_credits(&self) -> bool {
        self.chats_left > 0
    }
}

/// Result of checking a bearer token against the identity provider and the
/// credit ledger.
///
/// Returned by value to the session handler; nothing about the caller is
/// kept between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// No token, a rejected token, or a lookup failure.
    Unauthenticated,
    /// Signed in, but `chats_left <= 0`.
    NoCredits { user: AuthenticatedUser, credit: CreditRecord },
    /// Signed in with credits left, or with no credit record yet.
    Eligible { user: AuthenticatedUser, credit: Option<CreditRecord> },
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthOutcome::Unauthenticated)
    }

    /// Remaining credits, when a record exists.
    pub fn chats_left(&self) -> Option<i64> {
        match self {
            AuthOutcome::NoCredits { credit, .. } => Some(credit.chats_left),
            AuthOutcome::Eligible { credit, .. } => credit.as_ref().map(|c| c.chats_left),
            AuthOutcome::Unauthenticated => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            id: "u1".into(),
            email: Some("u1@example.com".into()),
            role: AUTHENTICATED_ROLE.into(),
        }
    }

    #[test]
    fn user_deserializes_without_optional_fields() {
        let u: AuthenticatedUser = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert_eq!(u.id, "abc");
        assert!(u.email.is_none());
        assert!(!u.is_authenticated());
    }

    #[test]
    fn zero_or_negative_credits_are_exhausted() {
        let mut record = CreditRecord { user_id: "u1".into(), role: "user".into(), chats_left: 0 };
        assert!(!record.has_credits());
        record.chats_left = -3;
        assert!(!record.has_credits());
        record.chats_left = 1;
        assert!(record.has_credits());
    }

    #[test]
    fn outcome_accessors() {
        assert!(!AuthOutcome::Unauthenticated.is_authenticated());
        assert_eq!(AuthOutcome::Unauthenticated.chats_left(), None);

        let eligible = AuthOutcome::Eligible { user: user(), credit: None };
        assert!(eligible.is_authenticated());
        assert_eq!(eligible.chats_left(), None);

        let exhausted = AuthOutcome::NoCredits {
            user: user(),
            credit: CreditRecord { user_id: "u1".into(), role: "user".into(), chats_left: 0 },
        };
        assert_eq!(exhausted.chats_left(), Some(0));
    }
}
