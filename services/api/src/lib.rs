mod cli;
mod evaluate;
mod infra;
mod routes;
mod server;

use aptocom_ai::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
