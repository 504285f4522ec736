//! Job postings, eligibility to apply, and the credit ledger behind applications.

pub mod domain;
pub mod eligibility;
pub mod form;
pub mod ledger;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{JobId, JobPosting, JobStatus, SalaryRange};
pub use eligibility::{Eligibility, EligibilityEvaluator, IneligibilityReason, LPA_UNIT};
pub use form::{
    ApplicationForm, FieldError, FieldKind, FieldProblem, FormAnswers, FormField,
    ValidationErrors,
};
pub use ledger::{ApplicationState, CreditLedger, LedgerError};
pub use service::{ApplyError, ApplyReceipt, JobApplicationService, JobListing};
