mod cli;
mod commands;
mod infra;
mod render;

use internhub::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
