use serde::Serialize;

use super::input::{CalculationInput, FeeOverrides, ParsedInput};
use super::resolver::{resolve_fee, ResolvedFee};
use crate::rules::MarketplaceRules;

/// Per-unit profitability figures. Currency in input units, margins in percentage points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub gross_revenue: f64,
    pub marketplace_fee: f64,
    pub total_expenses: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub gross_margin: f64,
    pub net_margin: f64,
    pub simulated_profit: f64,
}

/// Result plus the fees the marketplace schedule would charge without overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub result: CalculationResult,
    pub default_fees: ResolvedFee,
}

pub fn calculate(
    input: &ParsedInput,
    resolved: &ResolvedFee,
    overrides: &FeeOverrides,
) -> CalculationResult {
    let commission_rate = overrides
        .commission_rate
        .map(|percent| percent / 100.0)
        .unwrap_or(resolved.commission_rate);
    let fixed_fee = overrides.fixed_fee.unwrap_or(resolved.fixed_fee);

    let gross_revenue = input.selling_price;
    let marketplace_fee = gross_revenue * commission_rate + fixed_fee;
    let other_costs =
        input.additional_cost_fixed + gross_revenue * (input.additional_cost_percent / 100.0);

    let total_expenses = input.purchase_price + marketplace_fee + input.shipping_cost + other_costs;
    let gross_profit = gross_revenue - input.purchase_price - input.shipping_cost;
    let net_profit = gross_revenue - total_expenses;

    CalculationResult {
        gross_revenue,
        marketplace_fee,
        total_expenses,
        gross_profit,
        net_profit,
        gross_margin: margin(gross_profit, gross_revenue),
        net_margin: margin(net_profit, gross_revenue),
        simulated_profit: net_profit * input.quantity,
    }
}

fn margin(profit: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        profit / revenue * 100.0
    } else {
        0.0
    }
}

/// Parses `input`, resolves its marketplace fees against `rules` and applies `overrides`.
pub fn quote(
    input: &CalculationInput,
    overrides: &FeeOverrides,
    rules: &MarketplaceRules,
) -> Quote {
    let parsed = input.parse();
    let context = input.fee_context(parsed.selling_price);
    let default_fees = resolve_fee(input.marketplace, &context, rules);

    Quote {
        result: calculate(&parsed, &default_fees, overrides),
        default_fees,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::FeeSource;

    fn resolved(commission_rate: f64, fixed_fee: f64) -> ResolvedFee {
        ResolvedFee {
            commission_rate,
            fixed_fee,
            source: FeeSource::Schedule,
        }
    }

    fn parsed() -> ParsedInput {
        ParsedInput {
            selling_price: 100.0,
            purchase_price: 40.0,
            quantity: 10.0,
            additional_cost_fixed: 2.0,
            additional_cost_percent: 5.0,
            shipping_cost: 8.0,
        }
    }

    #[test]
    fn derives_every_figure_from_the_same_fee() {
        let result = calculate(&parsed(), &resolved(0.12, 6.25), &FeeOverrides::none());

        assert_eq!(result.gross_revenue, 100.0);
        assert!((result.marketplace_fee - 18.25).abs() < 1e-9);
        assert!((result.total_expenses - (40.0 + 18.25 + 8.0 + 7.0)).abs() < 1e-9);
        assert_eq!(result.gross_profit, 52.0);
        assert_eq!(result.net_profit, result.gross_revenue - result.total_expenses);
        assert!((result.gross_margin - 52.0).abs() < 1e-9);
        assert!((result.net_margin - result.net_profit).abs() < 1e-9);
        assert_eq!(result.simulated_profit, result.net_profit * 10.0);
    }

    #[test]
    fn overrides_replace_resolved_fees() {
        let overrides = FeeOverrides {
            commission_rate: Some(10.0),
            fixed_fee: Some(0.0),
        };
        let result = calculate(&parsed(), &resolved(0.12, 6.25), &overrides);
        assert!((result.marketplace_fee - 10.0).abs() < 1e-9);

        let rate_only = FeeOverrides {
            commission_rate: Some(20.0),
            fixed_fee: None,
        };
        let result = calculate(&parsed(), &resolved(0.12, 6.25), &rate_only);
        assert!((result.marketplace_fee - 26.25).abs() < 1e-9);
    }

    #[test]
    fn zero_revenue_has_zero_margins() {
        let input = ParsedInput {
            selling_price: 0.0,
            ..parsed()
        };
        let result = calculate(&input, &resolved(0.12, 6.25), &FeeOverrides::none());

        assert_eq!(result.gross_margin, 0.0);
        assert_eq!(result.net_margin, 0.0);
        assert!(result.net_profit < 0.0);
    }

    #[test]
    fn quote_keeps_default_fees_when_overridden() {
        let input = CalculationInput {
            selling_price: "29".to_string(),
            ..CalculationInput::default()
        };
        let overrides = FeeOverrides {
            commission_rate: Some(5.0),
            fixed_fee: Some(1.0),
        };

        let quote = quote(&input, &overrides, &MarketplaceRules::default());

        assert_eq!(quote.default_fees.commission_rate, 0.12);
        assert_eq!(quote.default_fees.fixed_fee, 6.25);
        assert!((quote.result.marketplace_fee - (29.0 * 0.05 + 1.0)).abs() < 1e-9);
    }
}
