use serde::{Deserialize, Serialize};

use super::resolver::FeeContext;
use crate::marketplace::{Marketplace, MercadoLivreAdType};
use crate::rules::{DEFAULT_AMAZON_CATEGORY, DEFAULT_B2W_CATEGORY};

/// Form state as typed by the seller. Numeric fields stay text so half-typed values
/// such as `"12."` or `""` are representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculationInput {
    pub product_name: String,
    pub selling_price: String,
    pub purchase_price: String,
    pub quantity: String,
    pub additional_cost_fixed: String,
    pub additional_cost_percent: String,
    pub shipping_cost: String,
    pub marketplace: Marketplace,
    pub mercado_livre_ad_type: MercadoLivreAdType,
    pub b2w_category: String,
    pub amazon_category: String,
}

impl Default for CalculationInput {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            selling_price: String::new(),
            purchase_price: String::new(),
            quantity: String::new(),
            additional_cost_fixed: String::new(),
            additional_cost_percent: String::new(),
            shipping_cost: String::new(),
            marketplace: Marketplace::MercadoLivre,
            mercado_livre_ad_type: MercadoLivreAdType::Classic,
            b2w_category: DEFAULT_B2W_CATEGORY.to_string(),
            amazon_category: DEFAULT_AMAZON_CATEGORY.to_string(),
        }
    }
}

/// Numeric view of [`CalculationInput`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInput {
    pub selling_price: f64,
    pub purchase_price: f64,
    pub quantity: f64,
    pub additional_cost_fixed: f64,
    pub additional_cost_percent: f64,
    pub shipping_cost: f64,
}

impl CalculationInput {
    pub fn parse(&self) -> ParsedInput {
        ParsedInput {
            selling_price: parse_amount(&self.selling_price),
            purchase_price: parse_amount(&self.purchase_price),
            quantity: parse_amount(&self.quantity),
            additional_cost_fixed: parse_amount(&self.additional_cost_fixed),
            additional_cost_percent: parse_amount(&self.additional_cost_percent),
            shipping_cost: parse_amount(&self.shipping_cost),
        }
    }

    pub fn fee_context(&self, selling_price: f64) -> FeeContext<'_> {
        FeeContext {
            selling_price,
            ad_type: self.mercado_livre_ad_type,
            b2w_category: &self.b2w_category,
            amazon_category: &self.amazon_category,
        }
    }
}

/// Manual replacements for the resolved fees. The commission is entered in percent,
/// the fixed fee in currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeOverrides {
    pub commission_rate: Option<f64>,
    pub fixed_fee: Option<f64>,
}

impl FeeOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds overrides from raw field text; blank or unparsable text means "no override".
    pub fn from_text(commission_rate: &str, fixed_fee: &str) -> Self {
        Self {
            commission_rate: parse_number(commission_rate),
            fixed_fee: parse_number(fixed_fee),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commission_rate.is_none() && self.fixed_fee.is_none()
    }
}

/// Reads a leading decimal number the way browser number fields do: `"12.5kg"` is
/// `12.5`, `"29,90"` is `29`. Returns `None` when no finite number is present.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        return Some(value).filter(|v| v.is_finite());
    }

    let bytes = trimmed.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes[0], b'+' | b'-'));
    let integer_digits = digits_from(end);
    end += integer_digits;
    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = digits_from(end + 1);
        if fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }
    if integer_digits + fraction_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = digits_from(exponent_end);
        if exponent_digits > 0 {
            end = exponent_end + exponent_digits;
        }
    }

    trimmed[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// [`parse_number`] with zero for anything unreadable.
pub fn parse_amount(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}
