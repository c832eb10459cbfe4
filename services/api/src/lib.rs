mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use hiring_pipeline::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
