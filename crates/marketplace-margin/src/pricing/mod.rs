//! Pure fee resolution and profitability arithmetic.
//!
//! Nothing in here fails: unparsable numbers read as zero and unusable rule data falls
//! back to marketplace defaults, so a [`Quote`] can always be produced.

mod calculator;
mod input;
mod resolver;

pub use calculator::{calculate, quote, CalculationResult, Quote};
pub use input::{parse_amount, parse_number, CalculationInput, FeeOverrides, ParsedInput};
pub use resolver::{resolve_fee, FeeContext, FeeSource, ResolvedFee};
