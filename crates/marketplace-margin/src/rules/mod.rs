//! Editable per-marketplace fee schedules.

mod categories;
mod defaults;
mod merge;
mod schedule;
mod validation;

pub use categories::{AmazonRate, AmazonTieredRate, B2wRate, CategoryEntry, CategoryTable};
pub use defaults::{
    AMAZON_FALLBACK_FIXED_FEE, AMAZON_FALLBACK_RATE, B2W_FALLBACK_RATE, DEFAULT_AMAZON_CATEGORY,
    DEFAULT_B2W_CATEGORY,
};
pub use merge::{merge_with_defaults, PartialMarketplaceRules};
pub use schedule::{FeeTier, MagaluRules, MercadoLivreRules, ShopeeRules};
pub use validation::{RuleIssue, RuleValidationError};

use crate::marketplace::Marketplace;
use serde::{Deserialize, Serialize};

/// Complete rule set, one schedule per marketplace.
///
/// Keys in the serialized form are the marketplace display labels, which keeps
/// documents written by earlier releases loadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceRules {
    #[serde(rename = "Mercado Livre")]
    pub mercado_livre: MercadoLivreRules,
    #[serde(rename = "Shopee")]
    pub shopee: ShopeeRules,
    #[serde(rename = "Magalu")]
    pub magalu: MagaluRules,
    #[serde(rename = "B2W")]
    pub b2w: CategoryTable,
    #[serde(rename = "Amazon")]
    pub amazon: CategoryTable,
}

/// Borrowed view of the schedule that applies to one marketplace.
#[derive(Debug, Clone, Copy)]
pub enum FeeSchedule<'a> {
    MercadoLivre(&'a MercadoLivreRules),
    Shopee(&'a ShopeeRules),
    Magalu(&'a MagaluRules),
    B2w(&'a CategoryTable),
    Amazon(&'a CategoryTable),
}

impl MarketplaceRules {
    pub fn schedule(&self, marketplace: Marketplace) -> FeeSchedule<'_> {
        match marketplace {
            Marketplace::MercadoLivre => FeeSchedule::MercadoLivre(&self.mercado_livre),
            Marketplace::Shopee => FeeSchedule::Shopee(&self.shopee),
            Marketplace::Magalu => FeeSchedule::Magalu(&self.magalu),
            Marketplace::B2w => FeeSchedule::B2w(&self.b2w),
            Marketplace::Amazon => FeeSchedule::Amazon(&self.amazon),
        }
    }

    /// Category names configured for `marketplace`; empty for marketplaces without
    /// category tables and for tables that fail to parse.
    pub fn categories(&self, marketplace: Marketplace) -> Vec<String> {
        match self.schedule(marketplace) {
            FeeSchedule::B2w(table) => table.categories::<B2wRate>(),
            FeeSchedule::Amazon(table) => table.categories::<AmazonRate>(),
            _ => Vec::new(),
        }
    }
}

/// Keeps `current` when it names a configured category, else falls back to the first
/// configured one. With no categories configured `current` is returned untouched.
pub fn reconcile_category(current: &str, categories: &[String]) -> String {
    if categories.is_empty() || categories.iter().any(|category| category == current) {
        current.to_string()
    } else {
        categories[0].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_matches_marketplace() {
        let rules = MarketplaceRules::default();
        assert!(matches!(
            rules.schedule(Marketplace::Shopee),
            FeeSchedule::Shopee(shopee) if shopee.fixed_fee == 4.0
        ));
        assert!(matches!(
            rules.schedule(Marketplace::Amazon),
            FeeSchedule::Amazon(_)
        ));
    }

    #[test]
    fn categories_only_exist_for_category_marketplaces() {
        let rules = MarketplaceRules::default();
        assert!(rules.categories(Marketplace::Magalu).is_empty());
        assert!(rules
            .categories(Marketplace::B2w)
            .contains(&DEFAULT_B2W_CATEGORY.to_string()));
        assert!(rules
            .categories(Marketplace::Amazon)
            .contains(&DEFAULT_AMAZON_CATEGORY.to_string()));
    }

    #[test]
    fn reconcile_falls_back_to_first_category() {
        let categories = vec!["Livros".to_string(), "Moda".to_string()];
        assert_eq!(reconcile_category("Moda", &categories), "Moda");
        assert_eq!(reconcile_category("Removida", &categories), "Livros");
        assert_eq!(reconcile_category("Removida", &[]), "Removida");
    }

    #[test]
    fn document_uses_marketplace_labels_as_keys() {
        let value = serde_json::to_value(MarketplaceRules::default()).expect("serializes");
        for marketplace in Marketplace::ALL {
            assert!(value.get(marketplace.label()).is_some(), "{marketplace}");
        }
        assert!(value["B2W"].is_string());
    }
}
