use marketplace_margin::rules::{B2wRate, CategoryTable, FeeTier};
use marketplace_margin::{
    quote, CalculationInput, FeeOverrides, FeeSource, Marketplace, MarketplaceRules,
    MercadoLivreAdType,
};

const EPSILON: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64, label: &str) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "{label}: expected {expected}, got {actual}"
    );
}

fn input(marketplace: Marketplace, selling_price: &str) -> CalculationInput {
    CalculationInput {
        product_name: "Fone Bluetooth".to_string(),
        selling_price: selling_price.to_string(),
        purchase_price: "10".to_string(),
        quantity: "3".to_string(),
        marketplace,
        ..CalculationInput::default()
    }
}

#[test]
fn mercado_livre_classic_listing_at_tier_boundary() {
    let rules = MarketplaceRules::default();
    let quote = quote(
        &input(Marketplace::MercadoLivre, "29"),
        &FeeOverrides::none(),
        &rules,
    );

    assert_close(quote.default_fees.commission_rate, 0.12, "rate");
    assert_close(quote.default_fees.fixed_fee, 6.25, "fixed fee");
    assert_close(quote.result.marketplace_fee, 9.73, "marketplace fee");
    assert_close(quote.result.net_profit, 9.27, "net profit");
    assert_close(quote.result.simulated_profit, 27.81, "simulated profit");
    assert_close(
        quote.result.net_profit,
        quote.result.gross_revenue - quote.result.total_expenses,
        "net profit identity",
    );
}

#[test]
fn mercado_livre_premium_uses_multiplier_tier_for_cheap_items() {
    let rules = MarketplaceRules::default();
    let mut request = input(Marketplace::MercadoLivre, "10");
    request.mercado_livre_ad_type = MercadoLivreAdType::Premium;

    let quote = quote(&request, &FeeOverrides::none(), &rules);

    assert_close(quote.default_fees.commission_rate, 0.17, "premium rate");
    assert_close(quote.default_fees.fixed_fee, 5.0, "multiplier fee");
    assert_eq!(quote.default_fees.source, FeeSource::Schedule);
}

#[test]
fn shopee_low_price_items_pay_reduced_fixed_fee() {
    let rules = MarketplaceRules::default();
    let quote = quote(&input(Marketplace::Shopee, "5"), &FeeOverrides::none(), &rules);

    assert_close(quote.default_fees.commission_rate, 0.22, "combined rate");
    assert_close(quote.default_fees.fixed_fee, 2.5, "low price fee");
    assert_close(quote.result.marketplace_fee, 3.6, "marketplace fee");
}

#[test]
fn amazon_tiered_category_blends_rate_above_threshold() {
    let rules = MarketplaceRules::default();
    let mut request = input(Marketplace::Amazon, "150");
    request.amazon_category = "Acessórios para Eletrônicos".to_string();

    let quote = quote(&request, &FeeOverrides::none(), &rules);

    assert_close(quote.default_fees.commission_rate, 20.0 / 150.0, "blended rate");
    assert_close(quote.default_fees.fixed_fee, 0.0, "min fee covered");
    assert_close(quote.result.marketplace_fee, 20.0, "marketplace fee");
}

#[test]
fn amazon_unknown_category_uses_fallback() {
    let rules = MarketplaceRules::default();
    let mut request = input(Marketplace::Amazon, "50");
    request.amazon_category = "Categoria Inexistente".to_string();

    let quote = quote(&request, &FeeOverrides::none(), &rules);

    assert_close(quote.default_fees.commission_rate, 0.15, "fallback rate");
    assert_close(quote.default_fees.fixed_fee, 2.0, "fallback fee");
    assert_eq!(quote.default_fees.source, FeeSource::UnknownCategory);
}

#[test]
fn malformed_b2w_rules_degrade_to_fallback_rate() {
    let rules = MarketplaceRules {
        b2w: CategoryTable::from_json("[{\"category\": "),
        ..MarketplaceRules::default()
    };

    let quote = quote(&input(Marketplace::B2w, "100"), &FeeOverrides::none(), &rules);

    assert_close(quote.default_fees.commission_rate, 0.16, "fallback rate");
    assert_eq!(quote.default_fees.source, FeeSource::MalformedCategoryRules);
}

#[test]
fn b2w_category_with_zero_rate_is_honoured() {
    let rules = MarketplaceRules {
        b2w: CategoryTable::from_entries(&[B2wRate::new("Promoção", 0.0)]),
        ..MarketplaceRules::default()
    };
    let mut request = input(Marketplace::B2w, "100");
    request.b2w_category = "Promoção".to_string();

    let quote = quote(&request, &FeeOverrides::none(), &rules);

    assert_close(quote.default_fees.commission_rate, 0.0, "zero rate");
    assert_eq!(quote.default_fees.source, FeeSource::Schedule);
}

#[test]
fn overrides_replace_fees_but_default_fees_stay_resolved() {
    let rules = MarketplaceRules::default();
    let overrides = FeeOverrides::from_text("10", "1");

    let quote = quote(&input(Marketplace::MercadoLivre, "29"), &overrides, &rules);

    assert_close(quote.result.marketplace_fee, 3.9, "overridden fee");
    assert_close(quote.default_fees.commission_rate, 0.12, "default rate");
    assert_close(quote.default_fees.fixed_fee, 6.25, "default fee");
}

#[test]
fn zero_price_yields_zero_margins() {
    let rules = MarketplaceRules::default();
    for marketplace in Marketplace::ALL {
        let quote = quote(&input(marketplace, ""), &FeeOverrides::none(), &rules);
        assert_eq!(quote.result.gross_margin, 0.0, "{marketplace}");
        assert_eq!(quote.result.net_margin, 0.0, "{marketplace}");
        assert!(quote.default_fees.commission_rate.is_finite(), "{marketplace}");
    }
}

#[test]
fn missing_unbounded_tier_leaves_expensive_items_without_fixed_fee() {
    let mut rules = MarketplaceRules::default();
    rules.mercado_livre.fixed_fee_tiers = vec![FeeTier::flat(29.0, 6.25)];

    let quote = quote(
        &input(Marketplace::MercadoLivre, "100"),
        &FeeOverrides::none(),
        &rules,
    );

    assert_close(quote.default_fees.fixed_fee, 0.0, "no tier");
    assert_eq!(quote.default_fees.source, FeeSource::NoMatchingTier);
    assert!(rules.validate().is_err());
}

#[test]
fn quoting_is_idempotent() {
    let rules = MarketplaceRules::default();
    let request = input(Marketplace::Magalu, "87.5");
    let overrides = FeeOverrides::from_text("", "3");

    assert_eq!(
        quote(&request, &overrides, &rules),
        quote(&request, &overrides, &rules)
    );
}
