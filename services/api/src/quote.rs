use clap::Args;
use conveyancing_costs::calculator::{quote_combined, CombinedQuote, CostBreakdown, LineItem};
use conveyancing_costs::documents::format_rand;
use conveyancing_costs::error::AppError;
use conveyancing_costs::tables::{import_csv, BondCostRow, CostRow, CostTable};
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Transfer cost table (CSV with purchase_price, attorney_fee, vat, transfer_duty, deeds_office_fee, total_cost)
    #[arg(long)]
    pub(crate) transfer_csv: PathBuf,
    /// Purchase price to quote, e.g. 1,250,000
    #[arg(long, value_parser = crate::infra::parse_amount)]
    pub(crate) purchase_price: Decimal,
    /// Bond cost table (CSV with bond_amount, attorney_fee, vat, deeds_office_fee, total_cost)
    #[arg(long)]
    pub(crate) bond_csv: Option<PathBuf>,
    /// Bond amount to quote alongside the transfer
    #[arg(long, requires = "bond_csv", value_parser = crate::infra::parse_amount)]
    pub(crate) bond_amount: Option<Decimal>,
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let QuoteArgs {
        transfer_csv,
        purchase_price,
        bond_csv,
        bond_amount,
    } = args;

    let transfer_table = load_table(&transfer_csv)?;
    let bond_table = match bond_csv {
        Some(path) => load_table::<BondCostRow>(&path)?,
        None => CostTable::empty(),
    };

    let quote = quote_combined(&transfer_table, &bond_table, purchase_price, bond_amount)?;
    print!("{}", render_quote(&quote));
    Ok(())
}

fn load_table<R: CostRow>(path: &Path) -> Result<CostTable<R>, AppError> {
    let file = File::open(path)?;
    Ok(import_csv(BufReader::new(file))?)
}

pub(crate) fn render_quote(quote: &CombinedQuote) -> String {
    let mut out = String::new();
    let transfer = &quote.transfer;
    let _ = writeln!(
        out,
        "Transfer costs on {} (tier {})",
        format_rand(transfer.amount),
        format_rand(transfer.cost_data.purchase_price)
    );
    render_breakdown(&mut out, &transfer.breakdown);
    let _ = writeln!(out, "Transfer total: {}", format_rand(transfer.total));

    if let Some(bond) = &quote.bond {
        let _ = writeln!(
            out,
            "\nBond costs on {} (tier {})",
            format_rand(bond.amount),
            format_rand(bond.cost_data.bond_amount)
        );
        render_breakdown(&mut out, &bond.breakdown);
        let _ = writeln!(out, "Bond total: {}", format_rand(bond.total));
    }

    let _ = writeln!(out, "\nGrand total: {}", format_rand(quote.grand_total));
    out
}

fn render_breakdown(out: &mut String, breakdown: &CostBreakdown) {
    let _ = writeln!(out, "Government costs:");
    render_items(out, &breakdown.government_costs);
    let _ = writeln!(out, "Attorney costs:");
    render_items(out, &breakdown.attorney_costs);
    render_items(out, std::slice::from_ref(&breakdown.vat));
}

fn render_items(out: &mut String, items: &[LineItem]) {
    for item in items {
        let _ = writeln!(out, "  - {:<42} {:>14}", item.label, format_rand(item.amount));
    }
}
