use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A business-approved attorney charge that is not part of the uploaded cost tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFee {
    pub key: &'static str,
    pub label: &'static str,
    pub amount: Decimal,
}

/// Fixed attorney charges added to every transfer quote, in listing order.
pub const TRANSFER_FIXED_FEES: &[FixedFee] = &[
    FixedFee {
        key: "additional_fees",
        label: "To Transaction Fee",
        amount: dec!(200.00),
    },
    FixedFee {
        key: "doc_generation",
        label: "Electronic Doc Generation Fee",
        amount: dec!(200.00),
    },
    FixedFee {
        key: "rates_clearance",
        label: "To Rates Clearance Certificate fee",
        amount: dec!(350.00),
    },
    FixedFee {
        key: "electronic_rates",
        label: "To Electronic Rates fee",
        amount: dec!(442.00),
    },
    FixedFee {
        key: "deeds_search",
        label: "Deeds Office Search Fee",
        amount: dec!(250.00),
    },
    FixedFee {
        key: "fica_verification",
        label: "Fica Verification Fee",
        amount: dec!(500.00),
    },
    FixedFee {
        key: "post_petties",
        label: "Post & Petties",
        amount: dec!(2000.00),
    },
];

/// Fixed attorney charges added to every bond registration quote, in listing order.
pub const BOND_FIXED_FEES: &[FixedFee] = &[
    FixedFee {
        key: "deeds_search",
        label: "Deeds Office Search Fee",
        amount: dec!(250.00),
    },
    FixedFee {
        key: "electronic_instruction",
        label: "Electronic Instruction & Generation fee",
        amount: dec!(1750.00),
    },
    FixedFee {
        key: "post_petties",
        label: "Post & Petties",
        amount: dec!(2000.00),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_fee_total(fees: &[FixedFee]) -> Decimal {
        fees.iter().map(|fee| fee.amount).sum()
    }

    #[test]
    fn fixed_fee_totals_match_the_approved_schedule() {
        assert_eq!(fixed_fee_total(TRANSFER_FIXED_FEES), dec!(3942.00));
        assert_eq!(fixed_fee_total(BOND_FIXED_FEES), dec!(4000.00));
    }

    #[test]
    fn fee_keys_are_unique_within_each_schedule() {
        for fees in [TRANSFER_FIXED_FEES, BOND_FIXED_FEES] {
            let mut keys: Vec<&str> = fees.iter().map(|fee| fee.key).collect();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), fees.len());
        }
    }
}
