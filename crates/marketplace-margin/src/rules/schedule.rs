use serde::{Deserialize, Serialize};

/// Price bracket of the Mercado Livre fixed-fee schedule.
///
/// `up_to_price` of `None` marks the unbounded bracket; it is persisted as `null` so the
/// sentinel survives a JSON round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTier {
    #[serde(default)]
    pub up_to_price: Option<f64>,
    pub fee: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_multiplier: bool,
}

impl FeeTier {
    pub fn flat(up_to_price: f64, fee: f64) -> Self {
        Self {
            up_to_price: Some(up_to_price),
            fee,
            is_multiplier: false,
        }
    }

    pub fn multiplier(up_to_price: f64, fee: f64) -> Self {
        Self {
            up_to_price: Some(up_to_price),
            fee,
            is_multiplier: true,
        }
    }

    pub fn unbounded(fee: f64) -> Self {
        Self {
            up_to_price: None,
            fee,
            is_multiplier: false,
        }
    }

    pub fn covers(&self, selling_price: f64) -> bool {
        self.up_to_price
            .map(|limit| selling_price <= limit)
            .unwrap_or(true)
    }

    pub fn fee_for(&self, selling_price: f64) -> f64 {
        if self.is_multiplier {
            selling_price * self.fee
        } else {
            self.fee
        }
    }

    fn upper_bound(&self) -> f64 {
        self.up_to_price.unwrap_or(f64::INFINITY)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MercadoLivreRules {
    pub classic_rate: f64,
    pub premium_rate: f64,
    pub fixed_fee_tiers: Vec<FeeTier>,
}

impl MercadoLivreRules {
    /// Tiers ordered by ascending upper bound; equal bounds keep their declared order.
    pub fn sorted_tiers(&self) -> Vec<&FeeTier> {
        let mut tiers: Vec<&FeeTier> = self.fixed_fee_tiers.iter().collect();
        tiers.sort_by(|a, b| a.upper_bound().total_cmp(&b.upper_bound()));
        tiers
    }

    /// The tightest bracket containing `selling_price`.
    pub fn tier_for(&self, selling_price: f64) -> Option<&FeeTier> {
        self.sorted_tiers()
            .into_iter()
            .find(|tier| tier.covers(selling_price))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopeeRules {
    pub commission_rate: f64,
    pub transaction_fee: f64,
    pub shipping_program_fee: f64,
    pub fixed_fee: f64,
    pub low_price_threshold: f64,
    pub low_price_fixed_fee_multiplier: f64,
}

impl ShopeeRules {
    /// Commission, transaction and free-shipping program rates stack additively.
    pub fn combined_rate(&self) -> f64 {
        self.commission_rate + self.transaction_fee + self.shipping_program_fee
    }

    pub fn fixed_fee_for(&self, selling_price: f64) -> f64 {
        if selling_price < self.low_price_threshold {
            selling_price * self.low_price_fixed_fee_multiplier
        } else {
            self.fixed_fee
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagaluRules {
    pub commission_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(tiers: Vec<FeeTier>) -> MercadoLivreRules {
        MercadoLivreRules {
            classic_rate: 0.12,
            premium_rate: 0.17,
            fixed_fee_tiers: tiers,
        }
    }

    #[test]
    fn tier_lookup_sorts_out_of_order_brackets() {
        let ml = rules(vec![
            FeeTier::unbounded(9.0),
            FeeTier::flat(50.0, 6.5),
            FeeTier::flat(29.0, 6.25),
        ]);

        assert_eq!(ml.tier_for(29.0).map(|t| t.fee), Some(6.25));
        assert_eq!(ml.tier_for(29.01).map(|t| t.fee), Some(6.5));
        assert_eq!(ml.tier_for(1_000.0).map(|t| t.fee), Some(9.0));
    }

    #[test]
    fn equal_bounds_keep_declared_order() {
        let ml = rules(vec![FeeTier::flat(79.0, 6.75), FeeTier::flat(79.0, 7.0)]);
        assert_eq!(ml.tier_for(60.0).map(|t| t.fee), Some(6.75));
    }

    #[test]
    fn missing_sentinel_leaves_expensive_items_unmatched() {
        let ml = rules(vec![FeeTier::flat(29.0, 6.25)]);
        assert!(ml.tier_for(30.0).is_none());
    }

    #[test]
    fn unbounded_tier_round_trips_as_null() {
        let json = serde_json::to_value(FeeTier::unbounded(6.75)).expect("serializes");
        assert_eq!(json["upToPrice"], serde_json::Value::Null);
        assert!(json.get("isMultiplier").is_none());

        let tier: FeeTier =
            serde_json::from_str(r#"{"upToPrice":null,"fee":6.75}"#).expect("deserializes");
        assert_eq!(tier, FeeTier::unbounded(6.75));
    }

    #[test]
    fn shopee_low_price_fee_scales_with_price() {
        let shopee = ShopeeRules {
            commission_rate: 0.14,
            transaction_fee: 0.02,
            shipping_program_fee: 0.06,
            fixed_fee: 4.0,
            low_price_threshold: 8.0,
            low_price_fixed_fee_multiplier: 0.5,
        };
        assert_eq!(shopee.fixed_fee_for(5.0), 2.5);
        assert_eq!(shopee.fixed_fee_for(8.0), 4.0);
    }
}
