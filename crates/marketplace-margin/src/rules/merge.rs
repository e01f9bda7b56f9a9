use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::categories::CategoryTable;
use super::schedule::{MagaluRules, MercadoLivreRules, ShopeeRules};
use super::MarketplaceRules;
use crate::marketplace::Marketplace;

/// Rule document as persisted by an older or partial writer: any marketplace may be
/// missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialMarketplaceRules {
    pub mercado_livre: Option<MercadoLivreRules>,
    pub shopee: Option<ShopeeRules>,
    pub magalu: Option<MagaluRules>,
    pub b2w: Option<CategoryTable>,
    pub amazon: Option<CategoryTable>,
}

impl PartialMarketplaceRules {
    /// Reads a persisted JSON object key by key.
    ///
    /// A key whose value does not fit its marketplace schedule is dropped with a warning,
    /// so the default for that marketplace survives the merge. Only the exact marketplace
    /// labels are read; any other key, aliases included, is ignored.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut partial = Self::default();

        for (key, value) in object {
            let Some(marketplace) = Marketplace::ALL
                .into_iter()
                .find(|marketplace| marketplace.label() == key)
            else {
                debug!(key = %key, "ignoring unknown key in persisted rules");
                continue;
            };

            match marketplace {
                Marketplace::MercadoLivre => partial.mercado_livre = typed(marketplace, value),
                Marketplace::Shopee => partial.shopee = typed(marketplace, value),
                Marketplace::Magalu => partial.magalu = typed(marketplace, value),
                Marketplace::B2w => partial.b2w = typed(marketplace, value),
                Marketplace::Amazon => partial.amazon = typed(marketplace, value),
            }
        }

        partial
    }

    /// Parses a persisted document; the top level must be a JSON object.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let object: Map<String, Value> = serde_json::from_str(raw)?;
        Ok(Self::from_json_object(&object))
    }
}

impl From<MarketplaceRules> for PartialMarketplaceRules {
    fn from(rules: MarketplaceRules) -> Self {
        Self {
            mercado_livre: Some(rules.mercado_livre),
            shopee: Some(rules.shopee),
            magalu: Some(rules.magalu),
            b2w: Some(rules.b2w),
            amazon: Some(rules.amazon),
        }
    }
}

fn typed<T: DeserializeOwned>(marketplace: Marketplace, value: &Value) -> Option<T> {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            warn!(%marketplace, %error, "persisted rules do not match schedule; using defaults");
            None
        }
    }
}

/// Shallow merge over the default table: every marketplace present in `loaded`
/// replaces the default schedule wholesale, absent ones keep the default.
pub fn merge_with_defaults(loaded: PartialMarketplaceRules) -> MarketplaceRules {
    let defaults = MarketplaceRules::default();

    MarketplaceRules {
        mercado_livre: loaded.mercado_livre.unwrap_or(defaults.mercado_livre),
        shopee: loaded.shopee.unwrap_or(defaults.shopee),
        magalu: loaded.magalu.unwrap_or(defaults.magalu),
        b2w: loaded.b2w.unwrap_or(defaults.b2w),
        amazon: loaded.amazon.unwrap_or(defaults.amazon),
    }
}
