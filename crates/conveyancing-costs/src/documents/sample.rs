use rust_decimal_macros::dec;

use super::renderer::{Scenario, SectionView};
use crate::calculator::CostBreakdown;
use crate::tables::{BondCostRow, TransferCostRow};

/// Fixed figures used to preview the stored template: a R300,000 transfer with a R4,000,000 bond.
pub fn sample_scenario() -> Scenario {
    let transfer = CostBreakdown::for_transfer(&TransferCostRow {
        purchase_price: dec!(300000),
        attorney_fee: dec!(10880),
        vat: dec!(2233.30),
        transfer_duty: dec!(0),
        deeds_office_fee: dec!(721),
        total_cost: dec!(17776.30),
    });
    let bond = CostBreakdown::for_bond(&BondCostRow {
        bond_amount: dec!(4000000),
        attorney_fee: dec!(56120),
        vat: dec!(9018),
        deeds_office_fee: dec!(2281),
        total_cost: dec!(71419),
    });

    Scenario::Combined {
        transfer: SectionView {
            amount: dec!(300000),
            total: transfer.subtotal(),
            breakdown: transfer,
        },
        bond: SectionView {
            amount: dec!(4000000),
            total: bond.subtotal(),
            breakdown: bond,
        },
    }
}
