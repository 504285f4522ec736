use crate::cli::ConnectionArgs;
use internhub::backend::HttpBackend;
use internhub::config::AppConfig;
use internhub::error::AppError;
use internhub::telemetry;
use internhub::workflows::jobs::JobApplicationService;
use std::sync::Arc;
use tracing::debug;

/// Load configuration, install logging, and return a service primed with fresh plan state.
pub(crate) async fn connect(
    mut args: ConnectionArgs,
) -> Result<JobApplicationService<HttpBackend>, AppError> {
    let mut config = AppConfig::load()?;

    if let Some(api_url) = args.api_url.take() {
        config.api.set_base_url(&api_url)?;
    }
    if let Some(token) = args.token.take() {
        config.api.auth_token = Some(token);
    }

    telemetry::init(&config.telemetry)?;
    debug!(?config.environment, api = ?config.api, "placement client configured");

    let backend = HttpBackend::new(&config.api)?;
    let service = JobApplicationService::new(Arc::new(backend));
    service.refresh().await?;
    Ok(service)
}

pub(crate) fn parse_answer(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("answer '{raw}' is missing a field name"));
    }
    Ok((name.to_string(), value.to_string()))
}
