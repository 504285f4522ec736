use crate::cli::{ApplyArgs, ConnectionArgs, FormArgs, JobsArgs, OutputFormat};
use crate::infra::connect;
use crate::render;
use internhub::error::AppError;
use internhub::workflows::jobs::{ApplyError, FormAnswers, JobId};
use std::io::{self, Write};
use tracing::info;

pub(crate) async fn run_plan(connection: ConnectionArgs) -> Result<(), AppError> {
    let service = connect(connection).await?;
    let plan = service.plan();
    let purchases = service.purchases();

    let mut out = io::stdout().lock();
    render::plan(&mut out, &plan, &service.plan_info(), &purchases)?;
    out.flush()?;
    Ok(())
}

pub(crate) async fn run_jobs(connection: ConnectionArgs, args: JobsArgs) -> Result<(), AppError> {
    let service = connect(connection).await?;
    let mut listings = service.listings().await?;
    if args.eligible_only {
        listings.retain(|listing| listing.eligibility.is_eligible());
    }
    info!(count = listings.len(), "open jobs loaded");

    let mut out = io::stdout().lock();
    match args.format {
        OutputFormat::Table => render::listings_table(&mut out, &listings)?,
        OutputFormat::Csv => render::listings_csv(&mut out, &listings)?,
    }
    out.flush()?;
    Ok(())
}

pub(crate) async fn run_form(connection: ConnectionArgs, args: FormArgs) -> Result<(), AppError> {
    let service = connect(connection).await?;
    let form = service.application_form(&JobId(args.job_id)).await?;

    let mut out = io::stdout().lock();
    render::form(&mut out, &form)?;
    out.flush()?;
    Ok(())
}

pub(crate) async fn run_apply(connection: ConnectionArgs, args: ApplyArgs) -> Result<(), AppError> {
    let service = connect(connection).await?;
    let job_id = JobId(args.job_id);
    let answers: FormAnswers = args.answers.into_iter().collect();

    let listings = service.listings().await?;
    let listing = listings
        .into_iter()
        .find(|listing| listing.job.id == job_id)
        .ok_or_else(|| AppError::Usage(format!("job {job_id} is not open for applications")))?;

    match service.apply(&listing.job, &answers).await {
        Ok(receipt) => {
            let mut out = io::stdout().lock();
            render::receipt(&mut out, &receipt)?;
            out.flush()?;
            Ok(())
        }
        Err(err @ ApplyError::Validation(_)) => {
            // Show the form so the missing answers can be supplied on the next attempt.
            if let Ok(form) = service.application_form(&job_id).await {
                let mut out = io::stdout().lock();
                render::form(&mut out, &form)?;
                out.flush()?;
            }
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn run_applied(connection: ConnectionArgs) -> Result<(), AppError> {
    let service = connect(connection).await?;
    let applied = service.applied();

    let mut out = io::stdout().lock();
    if applied.is_empty() {
        writeln!(out, "no applications yet")?;
    }
    for job_id in applied {
        writeln!(out, "{job_id}")?;
    }
    out.flush()?;
    Ok(())
}
