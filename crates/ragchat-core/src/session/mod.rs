//! Realtime voice-session issuance.
//!
//! A bearer token is resolved to a user, the user's credit record is read,
//! and if the user is eligible an ephemeral realtime session is requested.
//! One credit is charged after the session exists. The auth result is
//! passed along as an [`AuthOutcome`] value rather than stored anywhere.
//!
//! The charge is a read-then-write: it writes `observed - 1` where
//! `observed` is the value read during [`SessionIssuer::authenticate`].
//! Two concurrent requests for the same user can both observe the same
//! value. This matches the upstream data model, which offers no
//! compare-and-set on `chats_left`.

pub mod instructions;

use std::sync::Arc;

use ragchat_types::{AuthOutcome, InterviewProfile};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::error::ProviderError;
use crate::providers::{ClientSecret, CreditLedger, IdentityProvider, RealtimeSessionProvider};

/// What the caller receives on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionGrant {
    pub client_secret: ClientSecret,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unauthorized")]
    Unauthenticated,

    #[error("No credits")]
    NoCredits,

    #[error("realtime session request failed: {0}")]
    Realtime(#[source] ProviderError),

    #[error("Error in generating client secret")]
    MissingSecret,

    #[error("Error in inserting user: {0}")]
    CreateUser(#[source] ProviderError),
}

pub struct SessionIssuer {
    identity: Arc<dyn IdentityProvider>,
    ledger: Arc<dyn CreditLedger>,
    realtime: Arc<dyn RealtimeSessionProvider>,
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer").finish_non_exhaustive()
    }
}

impl SessionIssuer {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        ledger: Arc<dyn CreditLedger>,
        realtime: Arc<dyn RealtimeSessionProvider>,
    ) -> Self {
        Self { identity, ledger, realtime }
    }

    /// Resolve `token` to an [`AuthOutcome`]. Lookup failures are logged and
    /// reported as [`AuthOutcome::Unauthenticated`].
    pub async fn authenticate(&self, token: Option<&str>) -> AuthOutcome {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return AuthOutcome::Unauthenticated;
        };

        let user = match self.identity.get_user(token).await {
            Ok(Some(user)) if user.is_authenticated() => user,
            Ok(Some(user)) => {
                warn!(user_id = %user.id, role = %user.role, "token does not belong to an authenticated user");
                return AuthOutcome::Unauthenticated;
            }
            Ok(None) => {
                warn!("bearer token rejected by identity provider");
                return AuthOutcome::Unauthenticated;
            }
            Err(e) => {
                warn!(error = %e, "identity lookup failed");
                return AuthOutcome::Unauthenticated;
            }
        };

        match self.ledger.find(&user.id).await {
            Ok(Some(credit)) if !credit.has_credits() => AuthOutcome::NoCredits { user, credit },
            Ok(credit) => AuthOutcome::Eligible { user, credit },
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "credit lookup failed");
                AuthOutcome::Unauthenticated
            }
        }
    }

    /// Authenticate, then create a realtime session and charge one credit.
    pub async fn issue(
        &self,
        token: Option<&str>,
        profile: Option<&InterviewProfile>,
    ) -> Result<SessionGrant, SessionError> {
        let (user, credit) = match self.authenticate(token).await {
            AuthOutcome::Unauthenticated => return Err(SessionError::Unauthenticated),
            AuthOutcome::NoCredits { user, .. } => {
                info!(user_id = %user.id, "session refused: no credits left");
                return Err(SessionError::NoCredits);
            }
            AuthOutcome::Eligible { user, credit } => (user, credit),
        };

        let instructions = instructions::for_profile(profile);
        let client_secret = self
            .realtime
            .create_session(&instructions)
            .await
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "realtime session request failed");
                SessionError::Realtime(e)
            })?
            .ok_or(SessionError::MissingSecret)?;

        match credit {
            Some(record) => {
                let remaining = record.chats_left - 1;
                // The session already exists upstream; a failed charge is only logged.
                if let Err(e) = self.ledger.set_chats_left(&user.id, remaining).await {
                    error!(user_id = %user.id, error = %e, "failed to decrement credits");
                }
                info!(user_id = %user.id, remaining, "realtime session issued");
            }
            None => {
                self.ledger.create_user(&user).await.map_err(|e| {
                    error!(user_id = %user.id, error = %e, "failed to create credit record");
                    SessionError::CreateUser(e)
                })?;
                info!(user_id = %user.id, "realtime session issued; credit record created");
            }
        }

        Ok(SessionGrant { client_secret })
    }
}
