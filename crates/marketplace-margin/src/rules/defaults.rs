use super::categories::{AmazonRate, B2wRate, CategoryTable};
use super::schedule::{FeeTier, MagaluRules, MercadoLivreRules, ShopeeRules};
use super::MarketplaceRules;

/// Commission applied to B2W sales whose category cannot be resolved.
pub const B2W_FALLBACK_RATE: f64 = 0.16;
/// Commission applied to Amazon sales whose category cannot be resolved.
pub const AMAZON_FALLBACK_RATE: f64 = 0.15;
/// Fixed fee paired with [`AMAZON_FALLBACK_RATE`].
pub const AMAZON_FALLBACK_FIXED_FEE: f64 = 2.0;

pub const DEFAULT_B2W_CATEGORY: &str = "Telefonia Fixa / Celular";
pub const DEFAULT_AMAZON_CATEGORY: &str = "Comidas e Bebidas";

impl Default for MarketplaceRules {
    fn default() -> Self {
        Self {
            mercado_livre: MercadoLivreRules {
                classic_rate: 0.12,
                premium_rate: 0.17,
                fixed_fee_tiers: vec![
                    FeeTier::multiplier(12.50, 0.5),
                    FeeTier::flat(29.0, 6.25),
                    FeeTier::flat(50.0, 6.50),
                    FeeTier::flat(79.0, 6.75),
                    FeeTier::unbounded(6.75),
                ],
            },
            shopee: ShopeeRules {
                commission_rate: 0.14,
                transaction_fee: 0.02,
                shipping_program_fee: 0.06,
                fixed_fee: 4.0,
                low_price_threshold: 8.0,
                low_price_fixed_fee_multiplier: 0.5,
            },
            magalu: MagaluRules {
                commission_rate: 0.16,
            },
            b2w: CategoryTable::from_entries(&b2w_seed()),
            amazon: CategoryTable::from_entries(&amazon_seed()),
        }
    }
}

fn b2w_seed() -> Vec<B2wRate> {
    vec![
        B2wRate::new(DEFAULT_B2W_CATEGORY, 0.12),
        B2wRate::new("Informática", 0.12),
        B2wRate::new("Eletrônicos", 0.12),
        B2wRate::new("Eletrodomésticos", 0.12),
        B2wRate::new("Eletroportáteis", 0.16),
        B2wRate::new("Games", 0.14),
        B2wRate::new("Moda", 0.16),
        B2wRate::new("Beleza e Perfumaria", 0.16),
        B2wRate::new("Casa e Decoração", 0.16),
        B2wRate::new("Brinquedos", 0.16),
        B2wRate::new("Esporte e Lazer", 0.16),
        B2wRate::new("Livros", 0.16),
        B2wRate::new("Alimentos e Bebidas", 0.16),
    ]
}

fn amazon_seed() -> Vec<AmazonRate> {
    vec![
        AmazonRate::new(DEFAULT_AMAZON_CATEGORY, 0.10, 1.0),
        AmazonRate::new("Eletrônicos", 0.13, 1.0),
        AmazonRate::new("Computadores", 0.12, 1.0),
        AmazonRate::new("Acessórios para Eletrônicos", 0.15, 1.0).with_tier(100.0, 0.10),
        AmazonRate::new("Livros", 0.15, 1.0),
        AmazonRate::new("Beleza", 0.13, 1.0),
        AmazonRate::new("Roupas e Acessórios", 0.14, 1.0),
        AmazonRate::new("Casa e Cozinha", 0.12, 1.0),
        AmazonRate::new("Brinquedos e Jogos", 0.12, 1.0),
        AmazonRate::new("Esportes e Aventura", 0.12, 1.0),
        AmazonRate::new("Móveis", 0.15, 1.0).with_tier(200.0, 0.10),
        AmazonRate::new("Ferramentas e Construção", 0.11, 1.0),
    ]
}
