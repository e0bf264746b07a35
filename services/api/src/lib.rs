mod cli;
mod infra;
mod quote;
mod routes;
mod server;

use conveyancing_costs::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
