use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::backend::{ApplyResponse, BackendError, CurrentPlanResponse, PlacementBackend};
use crate::workflows::jobs::{
    ApplicationForm, FieldKind, FormAnswers, FormField, JobApplicationService, JobId, JobPosting,
    JobStatus, SalaryRange,
};
use crate::workflows::plans::{
    JobPackageDetails, PaymentStatus, PlanInfo, Purchase, PurchaseCategory,
};

pub(super) fn job(id: &str, salary_max: Option<u64>) -> JobPosting {
    JobPosting {
        id: JobId::from(id),
        title: "Backend Intern".to_string(),
        company_name: "Acme Labs".to_string(),
        salary: SalaryRange {
            min: Some(200_000),
            max: salary_max,
        },
        status: JobStatus::Open,
        is_active: true,
        required_skills: vec!["rust".to_string(), "sql".to_string()],
        location: Some("Bengaluru".to_string()),
        job_type: Some("Internship".to_string()),
        description: None,
    }
}

pub(super) fn plan(max_package_lpa: Option<f64>, credits_remaining: i32) -> PlanInfo {
    PlanInfo {
        has_job_package: true,
        max_package_lpa,
        credits_remaining,
    }
}

pub(super) fn no_applications() -> BTreeSet<JobId> {
    BTreeSet::new()
}

pub(super) fn package_purchase(
    id: &str,
    day: u32,
    max_package_lpa: Option<f64>,
    credits: i32,
) -> Purchase {
    Purchase {
        id: Some(id.to_string()),
        purchase_category: PurchaseCategory::JobPackage,
        payment_status: PaymentStatus::Success,
        purchased_at: Utc.with_ymd_and_hms(2025, 6, day, 9, 30, 0).single(),
        created_at: None,
        amount: Some(2999.0),
        job_package_details: Some(JobPackageDetails {
            package_type: "growth".to_string(),
            max_package_lpa,
            credits_given: credits,
            credits_remaining: credits,
        }),
        course_details: None,
    }
}

pub(super) fn contact_form() -> ApplicationForm {
    ApplicationForm {
        fields: vec![
            FormField {
                name: "email".to_string(),
                label: "Email".to_string(),
                kind: FieldKind::Email,
                required: true,
                options: Vec::new(),
            },
            FormField {
                name: "phone".to_string(),
                label: "Phone".to_string(),
                kind: FieldKind::Phone,
                required: true,
                options: Vec::new(),
            },
            FormField {
                name: "portfolio".to_string(),
                label: "Portfolio".to_string(),
                kind: FieldKind::Url,
                required: false,
                options: Vec::new(),
            },
        ],
    }
}

pub(super) fn answers(pairs: &[(&str, &str)]) -> FormAnswers {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

pub(super) fn valid_answers() -> FormAnswers {
    answers(&[("email", "intern@example.com"), ("phone", "+91 98765 43210")])
}

#[derive(Default)]
pub(super) struct BackendState {
    pub(super) purchases: Vec<Purchase>,
    pub(super) jobs: Vec<JobPosting>,
    pub(super) forms: HashMap<JobId, ApplicationForm>,
    pub(super) applied: Vec<JobId>,
    pub(super) job_credits: Option<i32>,
    pub(super) apply_calls: usize,
    pub(super) apply_failure: Option<BackendError>,
    pub(super) plan_failure: Option<BackendError>,
}

/// Backend double that spends credits on the newest package like the real service.
#[derive(Default, Clone)]
pub(super) struct MemoryBackend {
    pub(super) state: Arc<Mutex<BackendState>>,
}

impl MemoryBackend {
    pub(super) fn with_package(max_package_lpa: Option<f64>, credits: i32) -> Self {
        let backend = Self::default();
        backend.update(|state| {
            state
                .purchases
                .push(package_purchase("pkg-1", 1, max_package_lpa, credits));
        });
        backend
    }

    pub(super) fn update(&self, f: impl FnOnce(&mut BackendState)) {
        let mut guard = self.state.lock().expect("backend mutex poisoned");
        f(&mut guard);
    }

    pub(super) fn apply_calls(&self) -> usize {
        self.state.lock().expect("backend mutex poisoned").apply_calls
    }
}

#[async_trait]
impl PlacementBackend for MemoryBackend {
    async fn current_plan(&self) -> Result<CurrentPlanResponse, BackendError> {
        let guard = self.state.lock().expect("backend mutex poisoned");
        if let Some(err) = &guard.plan_failure {
            return Err(err.clone());
        }
        Ok(CurrentPlanResponse {
            purchases: guard.purchases.clone(),
            job_credits: guard.job_credits,
            purchased_courses: Vec::new(),
        })
    }

    async fn open_jobs(&self) -> Result<Vec<JobPosting>, BackendError> {
        let guard = self.state.lock().expect("backend mutex poisoned");
        Ok(guard.jobs.clone())
    }

    async fn application_form(&self, job_id: &JobId) -> Result<ApplicationForm, BackendError> {
        let guard = self.state.lock().expect("backend mutex poisoned");
        Ok(guard.forms.get(job_id).cloned().unwrap_or_default())
    }

    async fn apply(
        &self,
        job_id: &JobId,
        _answers: &FormAnswers,
    ) -> Result<ApplyResponse, BackendError> {
        let mut guard = self.state.lock().expect("backend mutex poisoned");
        guard.apply_calls += 1;
        if let Some(err) = &guard.apply_failure {
            return Err(err.clone());
        }

        let newest = guard
            .purchases
            .iter_mut()
            .filter(|purchase| {
                purchase.purchase_category == PurchaseCategory::JobPackage && purchase.is_settled()
            })
            .max_by_key(|purchase| purchase.timestamp())
            .and_then(|purchase| purchase.job_package_details.as_mut());
        let remaining = match newest {
            Some(details) if details.credits_remaining > 0 => {
                details.credits_remaining -= 1;
                details.credits_remaining
            }
            _ => {
                return Err(BackendError::Rejected {
                    status: 403,
                    message: Some("No credits left on your package".to_string()),
                })
            }
        };
        guard.applied.push(job_id.clone());

        Ok(ApplyResponse {
            message: Some("Applied successfully".to_string()),
            credits_remaining: Some(remaining),
        })
    }

    async fn applied_jobs(&self) -> Result<Vec<JobId>, BackendError> {
        let guard = self.state.lock().expect("backend mutex poisoned");
        Ok(guard.applied.clone())
    }
}

pub(super) async fn refreshed_service(
    backend: &MemoryBackend,
) -> JobApplicationService<MemoryBackend> {
    let service = JobApplicationService::new(Arc::new(backend.clone()));
    service.refresh().await.expect("refresh succeeds");
    service
}
