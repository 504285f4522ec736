use internhub::workflows::jobs::{ApplicationForm, ApplyReceipt, JobListing, JobPosting};
use internhub::workflows::plans::{PlanInfo, PlanState, Purchase, PurchaseCategory};
use serde::Serialize;
use std::io::{self, Write};

pub(crate) fn plan<W: Write>(
    out: &mut W,
    plan: &PlanState,
    info: &PlanInfo,
    purchases: &[Purchase],
) -> io::Result<()> {
    match plan.job_package_details() {
        Some(details) => {
            let ceiling = match details.max_package_lpa {
                Some(lpa) => format!("up to {lpa} LPA"),
                None => "unlimited".to_string(),
            };
            writeln!(
                out,
                "Job package: {} ({ceiling}), {} of {} credits remaining",
                details.package_type, info.credits_remaining, details.credits_given
            )?;
        }
        None => writeln!(out, "Job package: none")?,
    }

    match plan.course_details() {
        Some(course) => writeln!(
            out,
            "Course: {} ({} sessions, {} live)",
            course.course_type, course.total_sessions, course.live_sessions
        )?,
        None => writeln!(out, "Course: none")?,
    }

    for category in [PurchaseCategory::JobPackage, PurchaseCategory::Course] {
        let history = plan.inactive_history(purchases, category);
        if history.is_empty() {
            continue;
        }
        writeln!(out, "Earlier {} purchases:", category.label())?;
        for purchase in history {
            let when = purchase
                .timestamp()
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "undated".to_string());
            writeln!(
                out,
                "  {} {}",
                when,
                purchase.id.as_deref().unwrap_or("-")
            )?;
        }
    }
    Ok(())
}

fn salary_label(job: &JobPosting) -> String {
    match (job.salary.min, job.salary.max) {
        (Some(min), Some(max)) => format!("{min}-{max}"),
        (None, Some(max)) => format!("up to {max}"),
        (Some(min), None) => format!("from {min}"),
        (None, None) => "undisclosed".to_string(),
    }
}

pub(crate) fn listings_table<W: Write>(out: &mut W, listings: &[JobListing]) -> io::Result<()> {
    if listings.is_empty() {
        return writeln!(out, "no open jobs");
    }
    for listing in listings {
        let verdict = if listing.eligibility.is_eligible() {
            "can apply".to_string()
        } else {
            listing.eligibility.summary()
        };
        writeln!(
            out,
            "{}  {} @ {}  [{}]  {}",
            listing.job.id,
            listing.job.title,
            listing.job.company_name,
            salary_label(&listing.job),
            verdict
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ListingRow<'a> {
    id: &'a str,
    title: &'a str,
    company: &'a str,
    salary_min: Option<u64>,
    salary_max: Option<u64>,
    eligible: bool,
    reason: String,
}

pub(crate) fn listings_csv<W: Write>(out: &mut W, listings: &[JobListing]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for listing in listings {
        writer.serialize(ListingRow {
            id: listing.job.id.as_str(),
            title: &listing.job.title,
            company: &listing.job.company_name,
            salary_min: listing.job.salary.min,
            salary_max: listing.job.salary.max,
            eligible: listing.eligibility.is_eligible(),
            reason: listing
                .eligibility
                .reason()
                .map(|reason| reason.summary())
                .unwrap_or_default(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn form<W: Write>(out: &mut W, form: &ApplicationForm) -> io::Result<()> {
    if form.fields.is_empty() {
        return writeln!(out, "This job has no custom application questions.");
    }
    writeln!(out, "Application form:")?;
    for field in &form.fields {
        let marker = if field.required { "*" } else { " " };
        let label = if field.label.is_empty() {
            field.name.as_str()
        } else {
            field.label.as_str()
        };
        write!(out, " {marker} --answer {}=<{:?}>  {label}", field.name, field.kind)?;
        if !field.options.is_empty() {
            write!(out, " (one of: {})", field.options.join(", "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub(crate) fn receipt<W: Write>(out: &mut W, receipt: &ApplyReceipt) -> io::Result<()> {
    writeln!(
        out,
        "{} (job {}). Credits remaining: {}",
        receipt.message, receipt.job_id, receipt.credits_remaining
    )
}
