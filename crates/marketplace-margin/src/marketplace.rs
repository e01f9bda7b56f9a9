use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sales channels with their own commission and fee schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Marketplace {
    #[serde(rename = "Mercado Livre", alias = "mercado_livre")]
    MercadoLivre,
    #[serde(alias = "shopee")]
    Shopee,
    #[serde(alias = "magalu")]
    Magalu,
    #[serde(rename = "B2W", alias = "b2w")]
    B2w,
    #[serde(alias = "amazon")]
    Amazon,
}

impl Marketplace {
    pub const ALL: [Marketplace; 5] = [
        Marketplace::MercadoLivre,
        Marketplace::Shopee,
        Marketplace::Magalu,
        Marketplace::B2w,
        Marketplace::Amazon,
    ];

    /// Display label, also used as the key in persisted rule documents.
    pub fn label(&self) -> &'static str {
        match self {
            Marketplace::MercadoLivre => "Mercado Livre",
            Marketplace::Shopee => "Shopee",
            Marketplace::Magalu => "Magalu",
            Marketplace::B2w => "B2W",
            Marketplace::Amazon => "Amazon",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Marketplace::MercadoLivre => "mercado-livre",
            Marketplace::Shopee => "shopee",
            Marketplace::Magalu => "magalu",
            Marketplace::B2w => "b2w",
            Marketplace::Amazon => "amazon",
        }
    }

    /// Marketplaces whose commission depends on a free-text category.
    pub fn uses_categories(&self) -> bool {
        matches!(self, Marketplace::B2w | Marketplace::Amazon)
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown marketplace '{0}'")]
pub struct UnknownMarketplace(pub String);

impl FromStr for Marketplace {
    type Err = UnknownMarketplace;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "mercadolivre" | "ml" => Ok(Marketplace::MercadoLivre),
            "shopee" => Ok(Marketplace::Shopee),
            "magalu" | "magazineluiza" => Ok(Marketplace::Magalu),
            "b2w" | "americanas" => Ok(Marketplace::B2w),
            "amazon" => Ok(Marketplace::Amazon),
            _ => Err(UnknownMarketplace(value.to_string())),
        }
    }
}

/// Listing type on Mercado Livre; selects the commission rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MercadoLivreAdType {
    #[default]
    #[serde(rename = "Clássico", alias = "Classic", alias = "classic")]
    Classic,
    #[serde(alias = "premium")]
    Premium,
}

impl MercadoLivreAdType {
    pub fn label(&self) -> &'static str {
        match self {
            MercadoLivreAdType::Classic => "Clássico",
            MercadoLivreAdType::Premium => "Premium",
        }
    }
}

impl FromStr for MercadoLivreAdType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "classic" | "clássico" | "classico" => Ok(MercadoLivreAdType::Classic),
            "premium" => Ok(MercadoLivreAdType::Premium),
            other => Err(format!("unknown ad type '{other}' (expected classic or premium)")),
        }
    }
}
