use std::fmt;

use crate::error::CoreError;

/// The states of a Verifiable Credential lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CredentialState {
    /// Issued with a revocation slot, but the issuer has deferred signing.
    PendingVerification,
    /// Credential has been signed by the issuer and is in force.
    Issued,
    /// The issuer declined to sign a pending credential. Final state.
    Rejected,
    /// The issuer's revocation bit for this credential is set.
    Revoked,
}

impl CredentialState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Rejected)
    }

    /// Whether the credential carries an issuer proof in this state.
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Issued | Self::Revoked)
    }
}

impl fmt::Display for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PendingVerification => write!(f, "PendingVerification"),
            Self::Issued => write!(f, "Issued"),
            Self::Rejected => write!(f, "Rejected"),
            Self::Revoked => write!(f, "Revoked"),
        }
    }
}

/// Events that trigger credential state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEvent {
    /// Issuer signs a pending credential.
    Approve,
    /// Issuer declines a pending credential.
    Reject,
    /// Issuer sets the revocation bit.
    Revoke,
    /// Issuer clears the revocation bit.
    Unrevoke,
}

impl fmt::Display for CredentialEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Manages credential state transitions.
///
/// Valid transitions:
/// - PendingVerification → Issued (Approve)
/// - PendingVerification → Rejected (Reject)
/// - Issued → Revoked (Revoke)
/// - Revoked → Issued (Unrevoke)
///
/// `Revoked` on `Revoke` is accepted and leaves the state unchanged.
pub struct CredentialStateMachine;

impl CredentialStateMachine {
    /// Attempt a state transition based on an event.
    /// Returns the new state on success, or an error for invalid transitions.
    pub fn transition(
        current: CredentialState,
        event: CredentialEvent,
    ) -> Result<CredentialState, CoreError> {
        let new_state = match (current, event) {
            (CredentialState::PendingVerification, CredentialEvent::Approve) => {
                CredentialState::Issued
            }
            (CredentialState::PendingVerification, CredentialEvent::Reject) => {
                CredentialState::Rejected
            }
            (CredentialState::Issued, CredentialEvent::Revoke) => CredentialState::Revoked,
            // Idempotent revoke.
            (CredentialState::Revoked, CredentialEvent::Revoke) => CredentialState::Revoked,
            (CredentialState::Revoked, CredentialEvent::Unrevoke) => CredentialState::Issued,

            _ => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    event: event.to_string(),
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "credential state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: CredentialState, event: CredentialEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
