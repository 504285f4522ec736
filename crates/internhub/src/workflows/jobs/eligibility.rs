use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{JobId, JobPosting};
use crate::workflows::plans::PlanInfo;

/// Currency units in one lakh; package ceilings are quoted in lakhs per annum.
pub const LPA_UNIT: f64 = 100_000.0;

/// Why an intern may not apply to a posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IneligibilityReason {
    AlreadyApplied,
    JobClosed,
    NoJobPackage,
    NoCreditsRemaining,
    SalaryExceedsLimit { salary_max: u64, limit: f64 },
}

impl IneligibilityReason {
    pub fn summary(&self) -> String {
        match self {
            IneligibilityReason::AlreadyApplied => {
                "you have already applied to this job".to_string()
            }
            IneligibilityReason::JobClosed => {
                "this job is no longer accepting applications".to_string()
            }
            IneligibilityReason::NoJobPackage => {
                "purchase a job package to apply for jobs".to_string()
            }
            IneligibilityReason::NoCreditsRemaining => {
                "no application credits remaining; upgrade your package to apply".to_string()
            }
            IneligibilityReason::SalaryExceedsLimit { salary_max, limit } => format!(
                "job salary {} exceeds your package limit of {:.0} ({} LPA)",
                salary_max,
                limit,
                format_lpa(limit / LPA_UNIT)
            ),
        }
    }
}

fn format_lpa(lpa: f64) -> String {
    if lpa.fract() == 0.0 {
        format!("{lpa:.0}")
    } else {
        format!("{lpa:.2}")
    }
}

/// Verdict for a single posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    Ineligible(IneligibilityReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }

    pub fn reason(&self) -> Option<&IneligibilityReason> {
        match self {
            Eligibility::Eligible => None,
            Eligibility::Ineligible(reason) => Some(reason),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Eligibility::Eligible => "eligible".to_string(),
            Eligibility::Ineligible(reason) => reason.summary(),
        }
    }
}

/// Stateless rules deciding whether an apply action is permitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityEvaluator;

impl EligibilityEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        job: &JobPosting,
        plan: &PlanInfo,
        applied: &BTreeSet<JobId>,
    ) -> Eligibility {
        if applied.contains(&job.id) {
            return Eligibility::Ineligible(IneligibilityReason::AlreadyApplied);
        }

        if !job.accepting_applications() {
            return Eligibility::Ineligible(IneligibilityReason::JobClosed);
        }

        if !plan.has_job_package {
            return Eligibility::Ineligible(IneligibilityReason::NoJobPackage);
        }

        if plan.credits_remaining <= 0 {
            return Eligibility::Ineligible(IneligibilityReason::NoCreditsRemaining);
        }

        if let (Some(lpa), Some(salary_max)) = (plan.max_package_lpa, job.salary.max) {
            let limit = lpa * LPA_UNIT;
            if salary_max as f64 > limit {
                return Eligibility::Ineligible(IneligibilityReason::SalaryExceedsLimit {
                    salary_max,
                    limit,
                });
            }
        }

        Eligibility::Eligible
    }

    pub fn can_apply(&self, job: &JobPosting, plan: &PlanInfo, applied: &BTreeSet<JobId>) -> bool {
        self.evaluate(job, plan, applied).is_eligible()
    }
}
