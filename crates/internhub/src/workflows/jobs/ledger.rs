use std::collections::BTreeSet;

use serde::Serialize;

use super::domain::JobId;
use crate::workflows::plans::PlanInfo;

/// Per-job application state from the intern's point of view.
///
/// `NotApplied -> InFlight -> Applied` on success, `InFlight -> NotApplied` on failure.
/// `Applied` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationState {
    NotApplied,
    InFlight,
    Applied,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("job {0} has already been applied to")]
    AlreadyApplied(JobId),
    #[error("an application for job {0} is already being submitted")]
    RequestInFlight(JobId),
}

/// Client-side mirror of the intern's remaining credits and applied jobs.
///
/// The backend owns the real counter; values here are optimistic and are overwritten by
/// [`CreditLedger::reconcile`] whenever fresh server state arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreditLedger {
    credits_remaining: i32,
    applied: BTreeSet<JobId>,
    in_flight: BTreeSet<JobId>,
    confirmations: u64,
}

impl CreditLedger {
    pub fn new(credits_remaining: i32, applied: impl IntoIterator<Item = JobId>) -> Self {
        Self {
            credits_remaining,
            applied: applied.into_iter().collect(),
            in_flight: BTreeSet::new(),
            confirmations: 0,
        }
    }

    pub fn credits_remaining(&self) -> i32 {
        self.credits_remaining
    }

    pub fn applied(&self) -> &BTreeSet<JobId> {
        &self.applied
    }

    /// Number of applications confirmed locally. Server snapshots fetched before the count
    /// last moved do not include those applications.
    pub fn confirmations(&self) -> u64 {
        self.confirmations
    }

    pub fn state(&self, job_id: &JobId) -> ApplicationState {
        if self.applied.contains(job_id) {
            ApplicationState::Applied
        } else if self.in_flight.contains(job_id) {
            ApplicationState::InFlight
        } else {
            ApplicationState::NotApplied
        }
    }

    /// Claim the submission slot for `job_id`.
    pub fn begin(&mut self, job_id: &JobId) -> Result<(), LedgerError> {
        match self.state(job_id) {
            ApplicationState::Applied => Err(LedgerError::AlreadyApplied(job_id.clone())),
            ApplicationState::InFlight => Err(LedgerError::RequestInFlight(job_id.clone())),
            ApplicationState::NotApplied => {
                self.in_flight.insert(job_id.clone());
                Ok(())
            }
        }
    }

    /// Apply the consequence of an accepted application: one credit spent, job applied.
    pub fn record_success(&mut self, job_id: &JobId) {
        self.in_flight.remove(job_id);
        if self.applied.insert(job_id.clone()) {
            self.credits_remaining = (self.credits_remaining - 1).max(0);
            self.confirmations += 1;
        }
    }

    /// Lower the local count to what the backend reported with an accepted application.
    /// A higher report never raises the count.
    pub fn confirm_credits(&mut self, credits_remaining: i32) {
        self.credits_remaining = self.credits_remaining.min(credits_remaining).max(0);
    }

    /// Release the submission slot without touching credits or the applied set.
    pub fn abort(&mut self, job_id: &JobId) {
        self.in_flight.remove(job_id);
    }

    /// Overwrite the optimistic counters with server state. In-flight claims survive.
    pub fn reconcile(&mut self, plan: &PlanInfo, applied: impl IntoIterator<Item = JobId>) {
        self.credits_remaining = plan.credits_remaining;
        self.applied = applied.into_iter().collect();
        let applied = &self.applied;
        self.in_flight.retain(|job_id| !applied.contains(job_id));
    }
}
