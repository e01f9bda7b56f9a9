use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Category-keyed rate list, kept as the JSON text users edit.
///
/// The text is only interpreted on read. Saving validates it, but a document written
/// outside the store (by hand or by an earlier release) may still hold unparsable text;
/// that degrades to marketplace fallbacks instead of failing the whole rule document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable(String);

impl CategoryTable {
    pub fn from_json(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Serializes typed entries into the pretty-printed form used by the defaults.
    pub fn from_entries<E: CategoryEntry>(entries: &[E]) -> Self {
        let value = serde_json::to_value(entries).unwrap_or_default();
        Self(format!("{value:#}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn entries<E: CategoryEntry>(&self) -> Result<Vec<E>, serde_json::Error> {
        serde_json::from_str(&self.0)
    }

    /// Looks up the first entry named `category`; `Ok(None)` when it is absent.
    pub fn find<E: CategoryEntry>(&self, category: &str) -> Result<Option<E>, serde_json::Error> {
        Ok(self
            .entries::<E>()?
            .into_iter()
            .find(|entry| entry.category() == category))
    }

    /// Category names for selectors; empty when the text does not parse.
    pub fn categories<E: CategoryEntry>(&self) -> Vec<String> {
        match self.entries::<E>() {
            Ok(entries) => entries
                .iter()
                .map(|entry| entry.category().to_string())
                .collect(),
            Err(error) => {
                warn!(%error, "category rules are not valid JSON; no categories available");
                Vec::new()
            }
        }
    }
}

/// Row of a category table.
pub trait CategoryEntry: Serialize + DeserializeOwned {
    fn category(&self) -> &str;
    fn rate(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct B2wRate {
    pub category: String,
    pub rate: f64,
}

impl B2wRate {
    pub fn new(category: &str, rate: f64) -> Self {
        Self {
            category: category.to_string(),
            rate,
        }
    }
}

impl CategoryEntry for B2wRate {
    fn category(&self) -> &str {
        &self.category
    }

    fn rate(&self) -> f64 {
        self.rate
    }
}

/// Second bracket of an Amazon referral fee: `above_rate` applies to the part of the
/// price beyond `threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmazonTieredRate {
    pub threshold: f64,
    pub above_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmazonRate {
    pub category: String,
    pub rate: f64,
    pub min_fee: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiered: Option<AmazonTieredRate>,
}

impl AmazonRate {
    pub fn new(category: &str, rate: f64, min_fee: f64) -> Self {
        Self {
            category: category.to_string(),
            rate,
            min_fee,
            tiered: None,
        }
    }

    pub fn with_tier(mut self, threshold: f64, above_rate: f64) -> Self {
        self.tiered = Some(AmazonTieredRate {
            threshold,
            above_rate,
        });
        self
    }

    /// Referral commission in currency before the minimum-fee top-up.
    pub fn commission_for(&self, selling_price: f64) -> f64 {
        match &self.tiered {
            Some(tier) if selling_price > tier.threshold => {
                tier.threshold * self.rate + (selling_price - tier.threshold) * tier.above_rate
            }
            _ => selling_price * self.rate,
        }
    }
}

impl CategoryEntry for AmazonRate {
    fn category(&self) -> &str {
        &self.category
    }

    fn rate(&self) -> f64 {
        self.rate
    }
}
