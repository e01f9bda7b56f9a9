use serde::Serialize;
use tracing::{debug, warn};

use crate::marketplace::{Marketplace, MercadoLivreAdType};
use crate::rules::{
    AmazonRate, B2wRate, CategoryTable, FeeSchedule, MagaluRules, MarketplaceRules,
    MercadoLivreRules, ShopeeRules, AMAZON_FALLBACK_FIXED_FEE, AMAZON_FALLBACK_RATE,
    B2W_FALLBACK_RATE,
};

/// The parts of an input that fee schedules depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeContext<'a> {
    pub selling_price: f64,
    pub ad_type: MercadoLivreAdType,
    pub b2w_category: &'a str,
    pub amazon_category: &'a str,
}

/// Where a resolved fee came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeSource {
    /// Read from the marketplace schedule.
    Schedule,
    /// Category not present in the table; marketplace fallback applied.
    UnknownCategory,
    /// Category table text did not parse; marketplace fallback applied.
    MalformedCategoryRules,
    /// No Mercado Livre bracket covers the price; fixed fee is zero.
    NoMatchingTier,
}

/// Commission (fraction of revenue) and fixed fee (currency) before overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFee {
    pub commission_rate: f64,
    pub fixed_fee: f64,
    pub source: FeeSource,
}

impl ResolvedFee {
    fn from_schedule(commission_rate: f64, fixed_fee: f64) -> Self {
        Self {
            commission_rate,
            fixed_fee,
            source: FeeSource::Schedule,
        }
    }
}

pub fn resolve_fee(
    marketplace: Marketplace,
    context: &FeeContext<'_>,
    rules: &MarketplaceRules,
) -> ResolvedFee {
    match rules.schedule(marketplace) {
        FeeSchedule::MercadoLivre(schedule) => mercado_livre(schedule, context),
        FeeSchedule::Shopee(schedule) => shopee(schedule, context),
        FeeSchedule::Magalu(schedule) => magalu(schedule),
        FeeSchedule::B2w(table) => b2w(table, context),
        FeeSchedule::Amazon(table) => amazon(table, context),
    }
}

fn mercado_livre(schedule: &MercadoLivreRules, context: &FeeContext<'_>) -> ResolvedFee {
    let commission_rate = match context.ad_type {
        MercadoLivreAdType::Classic => schedule.classic_rate,
        MercadoLivreAdType::Premium => schedule.premium_rate,
    };

    match schedule.tier_for(context.selling_price) {
        Some(tier) => {
            ResolvedFee::from_schedule(commission_rate, tier.fee_for(context.selling_price))
        }
        None => {
            warn!(
                selling_price = context.selling_price,
                "no Mercado Livre fee tier covers price; applying zero fixed fee"
            );
            ResolvedFee {
                commission_rate,
                fixed_fee: 0.0,
                source: FeeSource::NoMatchingTier,
            }
        }
    }
}

fn shopee(schedule: &ShopeeRules, context: &FeeContext<'_>) -> ResolvedFee {
    ResolvedFee::from_schedule(
        schedule.combined_rate(),
        schedule.fixed_fee_for(context.selling_price),
    )
}

fn magalu(schedule: &MagaluRules) -> ResolvedFee {
    ResolvedFee::from_schedule(schedule.commission_rate, 0.0)
}

fn b2w(table: &CategoryTable, context: &FeeContext<'_>) -> ResolvedFee {
    let fallback = |source| ResolvedFee {
        commission_rate: B2W_FALLBACK_RATE,
        fixed_fee: 0.0,
        source,
    };

    match table.find::<B2wRate>(context.b2w_category) {
        Ok(Some(entry)) => ResolvedFee::from_schedule(entry.rate, 0.0),
        Ok(None) => {
            debug!(category = context.b2w_category, "unknown B2W category");
            fallback(FeeSource::UnknownCategory)
        }
        Err(error) => {
            warn!(%error, "invalid B2W category rules; using fallback rate");
            fallback(FeeSource::MalformedCategoryRules)
        }
    }
}

fn amazon(table: &CategoryTable, context: &FeeContext<'_>) -> ResolvedFee {
    let fallback = |source| ResolvedFee {
        commission_rate: AMAZON_FALLBACK_RATE,
        fixed_fee: AMAZON_FALLBACK_FIXED_FEE,
        source,
    };

    let entry = match table.find::<AmazonRate>(context.amazon_category) {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            debug!(category = context.amazon_category, "unknown Amazon category");
            return fallback(FeeSource::UnknownCategory);
        }
        Err(error) => {
            warn!(%error, "invalid Amazon category rules; using fallback fees");
            return fallback(FeeSource::MalformedCategoryRules);
        }
    };

    let price = context.selling_price;
    let commission = entry.commission_for(price);

    // Above the tier threshold the reported rate is the blend of both brackets.
    let commission_rate = match &entry.tiered {
        Some(tier) if price > tier.threshold => {
            if price > 0.0 {
                commission / price
            } else {
                0.0
            }
        }
        _ => entry.rate,
    };

    // Fixed fee tops the commission up to the category minimum.
    let fixed_fee = (entry.min_fee - commission).max(0.0);

    ResolvedFee::from_schedule(commission_rate, fixed_fee)
}
