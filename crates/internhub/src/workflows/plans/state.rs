use serde::Serialize;

use super::domain::{CourseDetails, JobPackageDetails, Purchase, PurchaseCategory};

/// Select the active purchase for a category: the most recent settled record.
///
/// Records are ordered by [`Purchase::timestamp`]; ties resolve to the record that appears
/// later in `purchases`, and a record without any timestamp ranks below every dated one.
pub fn active_purchase(purchases: &[Purchase], category: PurchaseCategory) -> Option<&Purchase> {
    purchases
        .iter()
        .filter(|purchase| purchase.purchase_category == category && purchase.is_settled())
        // `max_by_key` keeps the last of several equal maxima.
        .max_by_key(|purchase| purchase.timestamp())
}

/// The intern's active plans, derived from a purchase-history snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanState {
    pub job_package: Option<Purchase>,
    pub course: Option<Purchase>,
}

impl PlanState {
    pub fn derive(purchases: &[Purchase]) -> Self {
        Self {
            job_package: active_purchase(purchases, PurchaseCategory::JobPackage).cloned(),
            course: active_purchase(purchases, PurchaseCategory::Course).cloned(),
        }
    }

    pub fn job_package_details(&self) -> Option<&JobPackageDetails> {
        self.job_package
            .as_ref()
            .and_then(|purchase| purchase.job_package_details.as_ref())
    }

    pub fn course_details(&self) -> Option<&CourseDetails> {
        self.course
            .as_ref()
            .and_then(|purchase| purchase.course_details.as_ref())
    }

    /// Eligibility view of the active job package.
    pub fn plan_info(&self) -> PlanInfo {
        match self.job_package_details() {
            Some(details) => PlanInfo {
                has_job_package: true,
                max_package_lpa: details.max_package_lpa,
                credits_remaining: details.credits_remaining,
            },
            None => PlanInfo::default(),
        }
    }

    /// Settled purchases in `category` that were superseded by the active one, newest first.
    pub fn inactive_history<'a>(
        &self,
        purchases: &'a [Purchase],
        category: PurchaseCategory,
    ) -> Vec<&'a Purchase> {
        let active = match category {
            PurchaseCategory::JobPackage => self.job_package.as_ref(),
            PurchaseCategory::Course => self.course.as_ref(),
        };

        let mut skipped_active = false;
        let mut history: Vec<&Purchase> = purchases
            .iter()
            .filter(|purchase| purchase.purchase_category == category && purchase.is_settled())
            .collect();
        // Stable sort keeps list order among equal timestamps, matching `active_purchase`.
        history.sort_by_key(|purchase| purchase.timestamp());
        history.reverse();
        history.retain(|purchase| {
            if !skipped_active && Some(*purchase) == active {
                skipped_active = true;
                return false;
            }
            true
        });
        history
    }
}

/// Package terms consulted when deciding whether an application is allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlanInfo {
    pub has_job_package: bool,
    pub max_package_lpa: Option<f64>,
    pub credits_remaining: i32,
}
