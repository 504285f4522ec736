use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{JobId, JobPosting};
use super::eligibility::{Eligibility, EligibilityEvaluator, IneligibilityReason};
use super::form::{ApplicationForm, FormAnswers, ValidationErrors};
use super::ledger::{ApplicationState, CreditLedger, LedgerError};
use crate::backend::{ApplyResponse, BackendError, PlacementBackend};
use crate::workflows::plans::{PlanInfo, PlanState, Purchase};

/// Snapshot the service reasons over between refreshes.
#[derive(Debug, Clone, Default)]
struct Session {
    purchases: Vec<Purchase>,
    plan: PlanState,
    ledger: CreditLedger,
}

/// Service composing the backend, eligibility rules, and the optimistic credit ledger.
pub struct JobApplicationService<B> {
    backend: Arc<B>,
    evaluator: EligibilityEvaluator,
    session: Mutex<Session>,
}

/// A posting paired with the current verdict for it.
#[derive(Debug, Clone, Serialize)]
pub struct JobListing {
    pub job: JobPosting,
    pub eligibility: Eligibility,
    pub state: ApplicationState,
}

/// Outcome of an accepted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReceipt {
    pub job_id: JobId,
    pub message: String,
    pub credits_remaining: i32,
}

impl<B> JobApplicationService<B>
where
    B: PlacementBackend + 'static,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            evaluator: EligibilityEvaluator::new(),
            session: Mutex::new(Session::default()),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        // Every update replaces whole fields, so a poisoned snapshot is still consistent.
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Pull purchase history and applied jobs from the backend and rebuild the snapshot.
    ///
    /// A snapshot fetched while an application was being confirmed is discarded, since it
    /// predates that application.
    pub async fn refresh(&self) -> Result<PlanState, BackendError> {
        let confirmations = self.session().ledger.confirmations();
        let current = self.backend.current_plan().await?;
        let applied = self.backend.applied_jobs().await?;

        let plan = PlanState::derive(&current.purchases);
        let info = plan.plan_info();
        if let Some(server_credits) = current.job_credits {
            if server_credits != info.credits_remaining {
                warn!(
                    server_credits,
                    derived_credits = info.credits_remaining,
                    "server credit count differs from active package"
                );
            }
        }

        let mut session = self.session();
        if session.ledger.confirmations() != confirmations {
            debug!("discarding plan snapshot fetched before a confirmed application");
            return Ok(session.plan.clone());
        }
        session.ledger.reconcile(&info, applied);
        session.plan = plan.clone();
        session.purchases = current.purchases;
        info!(
            has_job_package = info.has_job_package,
            credits_remaining = info.credits_remaining,
            applied = session.ledger.applied().len(),
            "plan state refreshed"
        );
        Ok(plan)
    }

    pub fn plan(&self) -> PlanState {
        self.session().plan.clone()
    }

    pub fn purchases(&self) -> Vec<Purchase> {
        self.session().purchases.clone()
    }

    /// Package terms with the ledger's credit count, which may be ahead of the last refresh.
    pub fn plan_info(&self) -> PlanInfo {
        let session = self.session();
        PlanInfo {
            credits_remaining: session.ledger.credits_remaining(),
            ..session.plan.plan_info()
        }
    }

    pub fn applied(&self) -> BTreeSet<JobId> {
        self.session().ledger.applied().clone()
    }

    pub fn application_state(&self, job_id: &JobId) -> ApplicationState {
        self.session().ledger.state(job_id)
    }

    pub fn eligibility(&self, job: &JobPosting) -> Eligibility {
        let session = self.session();
        let info = PlanInfo {
            credits_remaining: session.ledger.credits_remaining(),
            ..session.plan.plan_info()
        };
        self.evaluator.evaluate(job, &info, session.ledger.applied())
    }

    pub fn can_apply(&self, job: &JobPosting) -> bool {
        self.eligibility(job).is_eligible()
    }

    /// Open postings with their eligibility under the current snapshot.
    pub async fn listings(&self) -> Result<Vec<JobListing>, BackendError> {
        let jobs = self.backend.open_jobs().await?;
        Ok(jobs
            .into_iter()
            .map(|job| JobListing {
                eligibility: self.eligibility(&job),
                state: self.application_state(&job.id),
                job,
            })
            .collect())
    }

    pub async fn application_form(&self, job_id: &JobId) -> Result<ApplicationForm, BackendError> {
        self.backend.application_form(job_id).await
    }

    /// Submit an application, spending one credit on success.
    ///
    /// Nothing reaches the backend unless the job is eligible, no other submission for it is
    /// in flight, and the answers satisfy the job's form.
    pub async fn apply(
        &self,
        job: &JobPosting,
        answers: &FormAnswers,
    ) -> Result<ApplyReceipt, ApplyError> {
        {
            let mut session = self.session();
            let info = PlanInfo {
                credits_remaining: session.ledger.credits_remaining(),
                ..session.plan.plan_info()
            };
            let verdict = self.evaluator.evaluate(job, &info, session.ledger.applied());
            if let Eligibility::Ineligible(reason) = verdict {
                info!(job_id = %job.id, reason = ?reason, "application blocked");
                return Err(ApplyError::Ineligible(reason));
            }
            session.ledger.begin(&job.id)?;
        }

        let result = self.submit(job, answers).await;

        let outcome = {
            let mut session = self.session();
            match result {
                Ok(response) => {
                    session.ledger.record_success(&job.id);
                    if let Some(server_credits) = response.credits_remaining {
                        session.ledger.confirm_credits(server_credits);
                    }
                    Ok(ApplyReceipt {
                        job_id: job.id.clone(),
                        message: response
                            .message
                            .unwrap_or_else(|| "Application submitted".to_string()),
                        credits_remaining: session.ledger.credits_remaining(),
                    })
                }
                Err(err) => {
                    session.ledger.abort(&job.id);
                    warn!(job_id = %job.id, error = %err, "application failed");
                    Err(err)
                }
            }
        };

        match outcome {
            Ok(receipt) => {
                info!(
                    job_id = %receipt.job_id,
                    credits_remaining = receipt.credits_remaining,
                    "application submitted"
                );
                self.refresh_after_apply().await;
                Ok(ApplyReceipt {
                    credits_remaining: self.session().ledger.credits_remaining(),
                    ..receipt
                })
            }
            Err(err @ ApplyError::Backend(_)) => {
                // A rejection can reflect server state this snapshot has not seen.
                self.refresh_after_apply().await;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    async fn refresh_after_apply(&self) {
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "refresh after apply failed; keeping local snapshot");
        }
    }

    async fn submit(
        &self,
        job: &JobPosting,
        answers: &FormAnswers,
    ) -> Result<ApplyResponse, ApplyError> {
        let form = self.backend.application_form(&job.id).await?;
        form.validate(answers)?;
        Ok(self.backend.apply(&job.id, answers).await?)
    }
}

/// Error raised by the job-application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("cannot apply: {}", .0.summary())]
    Ineligible(IneligibilityReason),
    #[error(transparent)]
    Duplicate(#[from] LedgerError),
    #[error("application form incomplete: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ApplyError {
    /// Message suitable for showing to the intern.
    pub fn user_message(&self) -> String {
        match self {
            ApplyError::Ineligible(reason) => reason.summary(),
            ApplyError::Duplicate(LedgerError::AlreadyApplied(_)) => {
                IneligibilityReason::AlreadyApplied.summary()
            }
            ApplyError::Duplicate(LedgerError::RequestInFlight(_)) => {
                "your application is already being submitted".to_string()
            }
            ApplyError::Validation(errors) => errors.to_string(),
            ApplyError::Backend(err) => err.user_message(),
        }
    }
}
