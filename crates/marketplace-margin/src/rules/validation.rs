use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::categories::{AmazonRate, B2wRate, CategoryEntry, CategoryTable};
use super::MarketplaceRules;
use crate::marketplace::Marketplace;

/// Single problem found in a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleIssue {
    pub marketplace: Marketplace,
    pub message: String,
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.marketplace, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid marketplace rules: {}", summarize(.issues))]
pub struct RuleValidationError {
    pub issues: Vec<RuleIssue>,
}

fn summarize(issues: &[RuleIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

struct IssueCollector {
    issues: Vec<RuleIssue>,
}

impl IssueCollector {
    fn push(&mut self, marketplace: Marketplace, message: String) {
        self.issues.push(RuleIssue {
            marketplace,
            message,
        });
    }

    fn rate(&mut self, marketplace: Marketplace, field: &str, value: f64) {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            self.push(
                marketplace,
                format!("{field} must be a fraction between 0 and 1, got {value}"),
            );
        }
    }

    fn amount(&mut self, marketplace: Marketplace, field: &str, value: f64) {
        if !value.is_finite() || value < 0.0 {
            self.push(
                marketplace,
                format!("{field} must be a non-negative amount, got {value}"),
            );
        }
    }
}

impl MarketplaceRules {
    /// Checks every schedule and reports all problems at once.
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        let mut collector = IssueCollector { issues: Vec::new() };

        let ml = Marketplace::MercadoLivre;
        collector.rate(ml, "classicRate", self.mercado_livre.classic_rate);
        collector.rate(ml, "premiumRate", self.mercado_livre.premium_rate);
        let tiers = &self.mercado_livre.fixed_fee_tiers;
        if tiers.is_empty() {
            collector.push(ml, "at least one fixed fee tier is required".to_string());
        }
        for (index, tier) in tiers.iter().enumerate() {
            if let Some(limit) = tier.up_to_price {
                collector.amount(ml, &format!("fixedFeeTiers[{index}].upToPrice"), limit);
            }
            collector.amount(ml, &format!("fixedFeeTiers[{index}].fee"), tier.fee);
        }
        match tiers.iter().filter(|tier| tier.up_to_price.is_none()).count() {
            0 if !tiers.is_empty() => collector.push(
                ml,
                "no unbounded tier; prices above the last bracket get no fixed fee".to_string(),
            ),
            0 | 1 => {}
            count => collector.push(ml, format!("{count} unbounded tiers, expected one")),
        }

        let shopee = Marketplace::Shopee;
        collector.rate(shopee, "commissionRate", self.shopee.commission_rate);
        collector.rate(shopee, "transactionFee", self.shopee.transaction_fee);
        collector.rate(shopee, "shippingProgramFee", self.shopee.shipping_program_fee);
        collector.amount(shopee, "fixedFee", self.shopee.fixed_fee);
        collector.amount(shopee, "lowPriceThreshold", self.shopee.low_price_threshold);
        collector.amount(
            shopee,
            "lowPriceFixedFeeMultiplier",
            self.shopee.low_price_fixed_fee_multiplier,
        );

        collector.rate(
            Marketplace::Magalu,
            "commissionRate",
            self.magalu.commission_rate,
        );

        if let Some(entries) = table_entries::<B2wRate>(&mut collector, Marketplace::B2w, &self.b2w)
        {
            check_rows(&mut collector, Marketplace::B2w, &entries);
        }

        let amazon = Marketplace::Amazon;
        if let Some(entries) = table_entries::<AmazonRate>(&mut collector, amazon, &self.amazon) {
            check_rows(&mut collector, amazon, &entries);
            for entry in &entries {
                let name = &entry.category;
                collector.amount(amazon, &format!("{name}.minFee"), entry.min_fee);
                if let Some(tier) = &entry.tiered {
                    collector.amount(amazon, &format!("{name}.tiered.threshold"), tier.threshold);
                    collector.rate(amazon, &format!("{name}.tiered.aboveRate"), tier.above_rate);
                }
            }
        }

        if collector.issues.is_empty() {
            Ok(())
        } else {
            Err(RuleValidationError {
                issues: collector.issues,
            })
        }
    }
}

fn table_entries<E: CategoryEntry>(
    collector: &mut IssueCollector,
    marketplace: Marketplace,
    table: &CategoryTable,
) -> Option<Vec<E>> {
    match table.entries::<E>() {
        Ok(entries) => Some(entries),
        Err(error) => {
            collector.push(marketplace, format!("category rules are not valid: {error}"));
            None
        }
    }
}

fn check_rows<E: CategoryEntry>(
    collector: &mut IssueCollector,
    marketplace: Marketplace,
    entries: &[E],
) {
    let mut seen = BTreeSet::new();
    for entry in entries {
        let name = entry.category().trim();
        if name.is_empty() {
            collector.push(marketplace, "category names must not be empty".to_string());
            continue;
        }
        if !seen.insert(name.to_string()) {
            collector.push(marketplace, format!("duplicate category '{name}'"));
        }
        collector.rate(marketplace, &format!("{name}.rate"), entry.rate());
    }
}
