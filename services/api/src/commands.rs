use crate::infra::{file_backed_service, format_currency, format_percent, FilePricingService};
use clap::Args;
use marketplace_margin::config::AppConfig;
use marketplace_margin::error::AppError;
use marketplace_margin::rules::{merge_with_defaults, reconcile_category, PartialMarketplaceRules};
use marketplace_margin::service::MarketplaceQuote;
use marketplace_margin::store::{CalculationId, StoreError};
use marketplace_margin::{
    CalculationInput, FeeOverrides, FeeSource, Marketplace, MarketplaceRules,
    MercadoLivreAdType, Quote,
};
use std::path::{Path, PathBuf};

/// Product and marketplace fields, accepted as free text like the calculator form.
#[derive(Args, Debug, Clone)]
pub(crate) struct InputArgs {
    /// Marketplace to price for (mercado-livre, shopee, magalu, b2w, amazon)
    #[arg(long, short = 'm', default_value = "mercado-livre")]
    pub(crate) marketplace: Marketplace,
    /// Product name shown in reports
    #[arg(long, default_value = "")]
    pub(crate) product: String,
    /// Selling price per unit
    #[arg(long, default_value = "")]
    pub(crate) price: String,
    /// Purchase cost per unit
    #[arg(long, default_value = "")]
    pub(crate) cost: String,
    /// Units to simulate
    #[arg(long, default_value = "1")]
    pub(crate) quantity: String,
    /// Additional fixed cost per unit
    #[arg(long, default_value = "")]
    pub(crate) extra_cost: String,
    /// Additional cost as a percentage of the selling price
    #[arg(long, default_value = "")]
    pub(crate) extra_percent: String,
    /// Shipping cost paid by the seller
    #[arg(long, default_value = "")]
    pub(crate) shipping: String,
    /// Mercado Livre listing type (classic or premium)
    #[arg(long, default_value = "classic")]
    pub(crate) ad_type: MercadoLivreAdType,
    /// B2W category name
    #[arg(long)]
    pub(crate) b2w_category: Option<String>,
    /// Amazon category name
    #[arg(long)]
    pub(crate) amazon_category: Option<String>,
}

impl InputArgs {
    pub(crate) fn into_input(self) -> CalculationInput {
        let defaults = CalculationInput::default();
        CalculationInput {
            product_name: self.product,
            selling_price: self.price,
            purchase_price: self.cost,
            quantity: self.quantity,
            additional_cost_fixed: self.extra_cost,
            additional_cost_percent: self.extra_percent,
            shipping_cost: self.shipping,
            marketplace: self.marketplace,
            mercado_livre_ad_type: self.ad_type,
            b2w_category: self.b2w_category.unwrap_or(defaults.b2w_category),
            amazon_category: self.amazon_category.unwrap_or(defaults.amazon_category),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub(crate) struct QuoteArgs {
    #[command(flatten)]
    pub(crate) input: InputArgs,
    /// Commission override in percent (e.g. 11.5)
    #[arg(long)]
    pub(crate) commission: Option<String>,
    /// Fixed fee override in currency units
    #[arg(long)]
    pub(crate) fixed_fee: Option<String>,
    /// Quote every marketplace side by side; overrides are ignored
    #[arg(long)]
    pub(crate) compare: bool,
    /// Print JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct RulesFileArgs {
    /// JSON document with marketplace keys; missing keys keep their defaults
    pub(crate) file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct SaveArgs {
    /// Name for the saved calculation
    #[arg(long)]
    pub(crate) name: String,
    #[command(flatten)]
    pub(crate) input: InputArgs,
}

fn service() -> Result<FilePricingService, AppError> {
    let config = AppConfig::load()?;
    Ok(file_backed_service(&config.storage))
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let service = service()?;
    let mut input = args.input.into_input();
    repair_category(&service, &mut input)?;

    if args.compare {
        let quotes = service.compare(&input)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&quotes)?);
        } else {
            render_comparison(&input, &quotes);
        }
        return Ok(());
    }

    let overrides = FeeOverrides::from_text(
        args.commission.as_deref().unwrap_or_default(),
        args.fixed_fee.as_deref().unwrap_or_default(),
    );
    let quote = service.quote(&input, &overrides)?;
    if args.json {
        let payload = MarketplaceQuote {
            marketplace: input.marketplace,
            quote,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        render_quote(&input, &overrides, &quote);
    }
    Ok(())
}

/// Swaps a category the current rules no longer list for the first available one.
fn repair_category(
    service: &FilePricingService,
    input: &mut CalculationInput,
) -> Result<(), AppError> {
    let current = match input.marketplace {
        Marketplace::B2w => &mut input.b2w_category,
        Marketplace::Amazon => &mut input.amazon_category,
        _ => return Ok(()),
    };

    let categories = service.categories(input.marketplace)?;
    let repaired = reconcile_category(current, &categories);
    if repaired != *current {
        eprintln!(
            "category '{}' is not listed for {}; using '{}'",
            current, input.marketplace, repaired
        );
        *current = repaired;
    }
    Ok(())
}

pub(crate) fn render_quote(input: &CalculationInput, overrides: &FeeOverrides, quote: &Quote) {
    let result = &quote.result;
    let fees = &quote.default_fees;

    if input.product_name.trim().is_empty() {
        println!("Quote for {}", input.marketplace);
    } else {
        println!("Quote for {} on {}", input.product_name.trim(), input.marketplace);
    }
    if input.marketplace == Marketplace::MercadoLivre {
        println!("- Listing type: {}", input.mercado_livre_ad_type.label());
    }
    println!(
        "- Marketplace fees: {} commission + {} fixed ({})",
        format_percent(fees.commission_rate * 100.0),
        format_currency(fees.fixed_fee),
        source_label(fees.source)
    );
    if !overrides.is_empty() {
        println!("- Overrides applied to the figures below");
    }
    println!("- Gross revenue: {}", format_currency(result.gross_revenue));
    println!("- Marketplace fee: {}", format_currency(result.marketplace_fee));
    println!("- Total expenses: {}", format_currency(result.total_expenses));
    println!(
        "- Gross profit: {} ({} margin)",
        format_currency(result.gross_profit),
        format_percent(result.gross_margin)
    );
    println!(
        "- Net profit: {} ({} margin)",
        format_currency(result.net_profit),
        format_percent(result.net_margin)
    );
    println!(
        "- Simulated profit for {} unit(s): {}",
        input.quantity.trim(),
        format_currency(result.simulated_profit)
    );
}

fn render_comparison(input: &CalculationInput, quotes: &[MarketplaceQuote]) {
    println!("Marketplace comparison at {}", input.selling_price.trim());
    for entry in quotes {
        let result = &entry.quote.result;
        println!(
            "  - {:<14} fee {:>12} | net {:>12} | margin {:>8}",
            entry.marketplace.label(),
            format_currency(result.marketplace_fee),
            format_currency(result.net_profit),
            format_percent(result.net_margin)
        );
    }

    if let Some(best) = quotes.iter().max_by(|left, right| {
        left.quote
            .result
            .net_profit
            .total_cmp(&right.quote.result.net_profit)
    }) {
        println!("Best net profit: {}", best.marketplace);
    }
}

pub(crate) fn source_label(source: FeeSource) -> &'static str {
    match source {
        FeeSource::Schedule => "schedule",
        FeeSource::UnknownCategory => "unknown category, fallback rate",
        FeeSource::MalformedCategoryRules => "unreadable category rules, fallback rate",
        FeeSource::NoMatchingTier => "no matching price tier",
    }
}

pub(crate) fn run_rules_show() -> Result<(), AppError> {
    let rules = service()?.rules()?;
    println!("{}", serde_json::to_string_pretty(&rules)?);
    Ok(())
}

pub(crate) fn run_rules_reset() -> Result<(), AppError> {
    service()?.reset_rules()?;
    println!("Marketplace rules restored to defaults");
    Ok(())
}

pub(crate) fn run_rules_validate(file: Option<PathBuf>) -> Result<(), AppError> {
    let rules = match file {
        Some(path) => read_rules_file(&path)?,
        None => service()?.rules()?,
    };

    match rules.validate() {
        Ok(()) => {
            println!("Marketplace rules are valid");
            Ok(())
        }
        Err(err) => {
            for issue in &err.issues {
                println!("  - {issue}");
            }
            Err(StoreError::InvalidRules(err).into())
        }
    }
}

pub(crate) fn run_rules_import(args: RulesFileArgs) -> Result<(), AppError> {
    let rules = read_rules_file(&args.file)?;
    service()?.save_rules(&rules)?;
    println!("Imported marketplace rules from {}", args.file.display());
    Ok(())
}

pub(crate) fn read_rules_file(path: &Path) -> Result<MarketplaceRules, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let partial = PartialMarketplaceRules::from_json_str(&raw)?;
    Ok(merge_with_defaults(partial))
}

pub(crate) fn run_saved_list() -> Result<(), AppError> {
    let records = service()?.calculations()?;
    if records.is_empty() {
        println!("No saved calculations");
        return Ok(());
    }

    println!("Saved calculations");
    for record in &records {
        println!(
            "  - {} | {} | {} at {}",
            record.id,
            record.name,
            record.input.marketplace,
            record.input.selling_price.trim()
        );
    }
    Ok(())
}

pub(crate) fn run_saved_save(args: SaveArgs) -> Result<(), AppError> {
    let record = service()?.save_calculation(&args.name, args.input.into_input())?;
    println!("Saved '{}' as {}", record.name, record.id);
    Ok(())
}

pub(crate) fn run_saved_delete(id: String) -> Result<(), AppError> {
    let id = CalculationId(id);
    service()?.delete_calculation(&id)?;
    println!("Deleted {id}");
    Ok(())
}
