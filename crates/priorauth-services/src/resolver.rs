//! Authorization resolution
//!
//! Derives the status and expected turnaround of a submission from the
//! payer's rules. Resolution is pure and cannot fail.

use priorauth_core::models::{AuthStatus, AuthorizationOutcome, Payer};
use tracing::debug;

use crate::validation::ValidatedSubmission;

/// Computes status/ETA at submission time
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationResolver;

impl AuthorizationResolver {
    pub fn new() -> Self {
        Self
    }

    /// Payers requiring PA yield a pending status with their turnaround;
    /// everyone else is `Not Required` with a zero ETA.
    ///
    /// Urgency is recorded on the submission but does not change the outcome.
    pub fn resolve(&self, submission: &ValidatedSubmission, payer: &Payer) -> AuthorizationOutcome {
        let outcome = if payer.auth_required {
            AuthorizationOutcome {
                status: AuthStatus::PaRequired,
                eta_days: payer.turnaround_days,
            }
        } else {
            AuthorizationOutcome {
                status: AuthStatus::NotRequired,
                eta_days: 0,
            }
        };

        debug!(
            payer_id = %payer.id,
            urgency = %submission.urgency,
            status = %outcome.status,
            eta_days = outcome.eta_days,
            "Authorization resolved"
        );
        outcome
    }
}
