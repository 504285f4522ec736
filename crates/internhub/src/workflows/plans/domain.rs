use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which product line a purchase belongs to. Each category has at most one active plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseCategory {
    JobPackage,
    Course,
}

impl PurchaseCategory {
    pub const fn label(self) -> &'static str {
        match self {
            PurchaseCategory::JobPackage => "job package",
            PurchaseCategory::Course => "course",
        }
    }
}

/// Settlement state reported by the payment backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Success,
    Pending,
    Failed,
}

/// Terms of a purchased job-application package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPackageDetails {
    pub package_type: String,
    /// Salary ceiling in lakhs per annum; `None` means the package is unlimited.
    #[serde(default, rename = "maxPackageLPA")]
    pub max_package_lpa: Option<f64>,
    #[serde(default)]
    pub credits_given: i32,
    #[serde(default)]
    pub credits_remaining: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetails {
    pub course_type: String,
    #[serde(default)]
    pub total_sessions: u32,
    #[serde(default)]
    pub live_sessions: u32,
}

/// A purchase record created by the payment backend once a payment is verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(default, rename = "_id", alias = "id")]
    pub id: Option<String>,
    pub purchase_category: PurchaseCategory,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub purchased_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub job_package_details: Option<JobPackageDetails>,
    #[serde(default)]
    pub course_details: Option<CourseDetails>,
}

impl Purchase {
    /// Ordering timestamp: the purchase time, falling back to the record creation time.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.purchased_at.or(self.created_at)
    }

    pub fn is_settled(&self) -> bool {
        self.payment_status == PaymentStatus::Success
    }
}
