//! Tiered cost resolution and the fee breakdowns built from a resolved tier.

pub mod breakdown;
pub mod resolver;
pub mod rules;

pub use breakdown::{CostBreakdown, LineItem};
pub use resolver::{
    quote_bond, quote_combined, quote_transfer, resolve, BondQuote, CombinedQuote, Quote,
    ResolveError, TransferQuote,
};
pub use rules::{FixedFee, BOND_FIXED_FEES, TRANSFER_FIXED_FEES};
