//! Purchase history and the active-plan view derived from it.

pub mod domain;
pub mod state;

pub use domain::{CourseDetails, JobPackageDetails, PaymentStatus, Purchase, PurchaseCategory};
pub use state::{active_purchase, PlanInfo, PlanState};
