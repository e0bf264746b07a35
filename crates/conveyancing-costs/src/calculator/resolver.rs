use rust_decimal::Decimal;
use serde::Serialize;

use super::breakdown::CostBreakdown;
use crate::tables::{BondCostRow, CostRow, CostTable, TableKind, TransferCostRow};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("{kind} amount must be greater than zero")]
    InvalidAmount { kind: TableKind },
    #[error("no {kind} cost tier covers an amount of {amount}")]
    NotFound { kind: TableKind, amount: Decimal },
}

/// Returns the tier with the largest threshold not exceeding `amount`.
pub fn resolve<R: CostRow>(table: &CostTable<R>, amount: Decimal) -> Result<&R, ResolveError> {
    if amount <= Decimal::ZERO {
        return Err(ResolveError::InvalidAmount { kind: R::KIND });
    }

    let rows = table.rows();
    let covered = rows.partition_point(|row| row.threshold() <= amount);
    covered
        .checked_sub(1)
        .map(|index| &rows[index])
        .ok_or(ResolveError::NotFound {
            kind: R::KIND,
            amount,
        })
}

/// A resolved tier together with the breakdown presented to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote<R> {
    pub amount: Decimal,
    pub cost_data: R,
    pub breakdown: CostBreakdown,
    pub total: Decimal,
}

pub type TransferQuote = Quote<TransferCostRow>;
pub type BondQuote = Quote<BondCostRow>;

pub fn quote_transfer(
    table: &CostTable<TransferCostRow>,
    purchase_price: Decimal,
) -> Result<TransferQuote, ResolveError> {
    let row = resolve(table, purchase_price)?;
    Ok(Quote {
        amount: purchase_price,
        cost_data: row.clone(),
        breakdown: CostBreakdown::for_transfer(row),
        total: row.total_cost,
    })
}

pub fn quote_bond(
    table: &CostTable<BondCostRow>,
    bond_amount: Decimal,
) -> Result<BondQuote, ResolveError> {
    let row = resolve(table, bond_amount)?;
    Ok(Quote {
        amount: bond_amount,
        cost_data: row.clone(),
        breakdown: CostBreakdown::for_bond(row),
        total: row.total_cost,
    })
}

/// Transfer quote plus an optional bond quote when a bond is being registered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedQuote {
    pub transfer: TransferQuote,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bond: Option<BondQuote>,
    pub grand_total: Decimal,
}

/// Resolves both tables independently. A missing or zero bond amount means cash purchase.
pub fn quote_combined(
    transfer_table: &CostTable<TransferCostRow>,
    bond_table: &CostTable<BondCostRow>,
    purchase_price: Decimal,
    bond_amount: Option<Decimal>,
) -> Result<CombinedQuote, ResolveError> {
    let transfer = quote_transfer(transfer_table, purchase_price)?;

    let bond = match bond_amount {
        Some(amount) if amount > Decimal::ZERO => Some(quote_bond(bond_table, amount)?),
        Some(amount) if amount < Decimal::ZERO => {
            return Err(ResolveError::InvalidAmount {
                kind: TableKind::Bond,
            })
        }
        _ => None,
    };

    let grand_total = transfer.total + bond.as_ref().map_or(Decimal::ZERO, |quote| quote.total);

    Ok(CombinedQuote {
        transfer,
        bond,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn transfer_row(threshold: Decimal, total: Decimal) -> TransferCostRow {
        TransferCostRow {
            purchase_price: threshold,
            attorney_fee: dec!(1000),
            vat: dec!(150),
            transfer_duty: dec!(0),
            deeds_office_fee: dec!(100),
            total_cost: total,
        }
    }

    fn bond_row(threshold: Decimal, total: Decimal) -> BondCostRow {
        BondCostRow {
            bond_amount: threshold,
            attorney_fee: dec!(2000),
            vat: dec!(300),
            deeds_office_fee: dec!(500),
            total_cost: total,
        }
    }

    fn tiered_transfer_table() -> CostTable<TransferCostRow> {
        CostTable::from_rows(vec![
            transfer_row(dec!(100000), dec!(5000)),
            transfer_row(dec!(500000), dec!(17300)),
            transfer_row(dec!(1000000), dec!(42000)),
        ])
    }

    #[test]
    fn resolves_nearest_tier_below_the_amount() {
        let table = tiered_transfer_table();
        let row = resolve(&table, dec!(750000)).expect("tier found");
        assert_eq!(row.purchase_price, dec!(500000));
    }

    #[test]
    fn exact_threshold_and_amounts_above_the_top_tier() {
        let table = tiered_transfer_table();
        assert_eq!(
            resolve(&table, dec!(500000)).expect("exact").purchase_price,
            dec!(500000)
        );
        assert_eq!(
            resolve(&table, dec!(25000000)).expect("top tier").purchase_price,
            dec!(1000000)
        );
    }

    #[test]
    fn amount_below_lowest_tier_is_not_found() {
        let table = tiered_transfer_table();
        assert_eq!(
            resolve(&table, dec!(99999.99)),
            Err(ResolveError::NotFound {
                kind: TableKind::Transfer,
                amount: dec!(99999.99),
            })
        );
        assert!(matches!(
            resolve(&CostTable::<BondCostRow>::empty(), dec!(1)),
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn non_positive_amounts_are_invalid_even_for_empty_tables() {
        let empty = CostTable::<TransferCostRow>::empty();
        for amount in [dec!(0), dec!(-1)] {
            assert_eq!(
                resolve(&empty, amount),
                Err(ResolveError::InvalidAmount {
                    kind: TableKind::Transfer
                })
            );
        }
    }

    #[test]
    fn transfer_quote_total_comes_from_the_row() {
        let quote = quote_transfer(&tiered_transfer_table(), dec!(600000)).expect("quote");
        assert_eq!(quote.amount, dec!(600000));
        assert_eq!(quote.total, dec!(17300));
        assert_eq!(quote.cost_data.purchase_price, dec!(500000));
    }

    #[test]
    fn combined_quote_sums_transfer_and_bond_totals() {
        let bonds = CostTable::from_rows(vec![bond_row(dec!(100000), dec!(9000))]);
        let quote = quote_combined(
            &tiered_transfer_table(),
            &bonds,
            dec!(600000),
            Some(dec!(450000)),
        )
        .expect("combined");

        let bond = quote.bond.as_ref().expect("bond quote");
        assert_eq!(bond.total, dec!(9000));
        assert_eq!(quote.grand_total, quote.transfer.total + bond.total);
        assert_eq!(quote.grand_total, dec!(26300));
    }

    #[test]
    fn combined_quote_without_bond_equals_transfer_total() {
        let bonds = CostTable::<BondCostRow>::empty();
        for bond_amount in [None, Some(dec!(0))] {
            let quote = quote_combined(&tiered_transfer_table(), &bonds, dec!(600000), bond_amount)
                .expect("cash purchase");
            assert!(quote.bond.is_none());
            assert_eq!(quote.grand_total, quote.transfer.total);
        }

        let negative = quote_combined(
            &tiered_transfer_table(),
            &bonds,
            dec!(600000),
            Some(dec!(-10)),
        );
        assert_eq!(
            negative,
            Err(ResolveError::InvalidAmount {
                kind: TableKind::Bond
            })
        );
    }

    proptest! {
        #[test]
        fn resolve_returns_the_highest_threshold_not_above_the_amount(
            thresholds in proptest::collection::btree_set(1u64..5_000_000, 1..40),
            amount in 1u64..6_000_000,
        ) {
            let table = CostTable::from_rows(
                thresholds
                    .iter()
                    .map(|threshold| transfer_row(Decimal::from(*threshold), dec!(1)))
                    .collect(),
            );
            let amount = Decimal::from(amount);
            let expected = thresholds
                .iter()
                .copied()
                .filter(|threshold| Decimal::from(*threshold) <= amount)
                .max();

            match (resolve(&table, amount), expected) {
                (Ok(row), Some(threshold)) => {
                    prop_assert_eq!(row.purchase_price, Decimal::from(threshold))
                }
                (Err(ResolveError::NotFound { .. }), None) => {}
                (other, expected) => {
                    prop_assert!(false, "resolved {:?}, expected threshold {:?}", other, expected)
                }
            }
        }
    }
}
