use crate::quote::{run_quote, QuoteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use conveyancing_costs::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Conveyancing Cost Calculator",
    about = "Serve and query transfer and bond cost quotes from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Quote costs from local CSV cost tables without starting the server
    Quote(QuoteArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Quote(args) => run_quote(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn quote_command_parses_amounts_with_separators() {
        let cli = Cli::try_parse_from([
            "conveyancing-costs-api",
            "quote",
            "--transfer-csv",
            "transfer.csv",
            "--purchase-price",
            "1,250,000",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Quote(args)) => {
                assert_eq!(args.purchase_price, Decimal::from(1_250_000));
                assert!(args.bond_amount.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn bond_amount_requires_a_bond_table() {
        let result = Cli::try_parse_from([
            "conveyancing-costs-api",
            "quote",
            "--transfer-csv",
            "transfer.csv",
            "--purchase-price",
            "600000",
            "--bond-amount",
            "450000",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["conveyancing-costs-api"]).expect("parses");
        assert!(cli.command.is_none());
    }
}
