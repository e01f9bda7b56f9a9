use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::marketplace::Marketplace;
use crate::pricing::{quote, CalculationInput, FeeOverrides, Quote};
use crate::rules::MarketplaceRules;
use crate::store::{
    CalculationId, CalculationRepository, RuleStore, SavedCalculation, StoreError,
};

/// Quote for one marketplace within a side-by-side comparison.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceQuote {
    pub marketplace: Marketplace,
    #[serde(flatten)]
    pub quote: Quote,
}

/// Composes the rule store, the saved-calculation repository and the fee engine.
///
/// Every quote reads the current rules, so edits are visible on the next call.
pub struct PricingService<R, C> {
    rules: Arc<R>,
    calculations: Arc<C>,
}

impl<R, C> PricingService<R, C>
where
    R: RuleStore + 'static,
    C: CalculationRepository + 'static,
{
    pub fn new(rules: Arc<R>, calculations: Arc<C>) -> Self {
        Self {
            rules,
            calculations,
        }
    }

    pub fn quote(
        &self,
        input: &CalculationInput,
        overrides: &FeeOverrides,
    ) -> Result<Quote, PricingServiceError> {
        let rules = self.rules.load()?;
        Ok(quote(input, overrides, &rules))
    }

    /// Quote plus the category list of the quoted marketplace, both read from the same
    /// rule snapshot. The list is empty for marketplaces without category tables.
    pub fn quote_with_categories(
        &self,
        input: &CalculationInput,
        overrides: &FeeOverrides,
    ) -> Result<(Quote, Vec<String>), PricingServiceError> {
        let rules = self.rules.load()?;
        let categories = rules.categories(input.marketplace);
        Ok((quote(input, overrides, &rules), categories))
    }

    /// Quotes the same product on every marketplace. Overrides are ignored: they are
    /// tied to the marketplace they were typed for.
    pub fn compare(
        &self,
        input: &CalculationInput,
    ) -> Result<Vec<MarketplaceQuote>, PricingServiceError> {
        let rules = self.rules.load()?;
        let overrides = FeeOverrides::none();

        Ok(Marketplace::ALL
            .into_iter()
            .map(|marketplace| {
                let candidate = CalculationInput {
                    marketplace,
                    ..input.clone()
                };
                MarketplaceQuote {
                    marketplace,
                    quote: quote(&candidate, &overrides, &rules),
                }
            })
            .collect())
    }

    pub fn rules(&self) -> Result<MarketplaceRules, PricingServiceError> {
        Ok(self.rules.load()?)
    }

    pub fn save_rules(&self, rules: &MarketplaceRules) -> Result<(), PricingServiceError> {
        self.rules.save(rules)?;
        info!("marketplace rules replaced");
        Ok(())
    }

    pub fn reset_rules(&self) -> Result<MarketplaceRules, PricingServiceError> {
        let defaults = self.rules.reset()?;
        info!("marketplace rules reset");
        Ok(defaults)
    }

    pub fn categories(&self, marketplace: Marketplace) -> Result<Vec<String>, PricingServiceError> {
        Ok(self.rules.load()?.categories(marketplace))
    }

    pub fn calculations(&self) -> Result<Vec<SavedCalculation>, PricingServiceError> {
        Ok(self.calculations.list()?)
    }

    pub fn calculation(&self, id: &CalculationId) -> Result<SavedCalculation, PricingServiceError> {
        self.calculations
            .list()?
            .into_iter()
            .find(|record| &record.id == id)
            .ok_or_else(|| PricingServiceError::CalculationNotFound(id.clone()))
    }

    pub fn save_calculation(
        &self,
        name: &str,
        input: CalculationInput,
    ) -> Result<SavedCalculation, PricingServiceError> {
        Ok(self.calculations.save(name, input)?)
    }

    pub fn delete_calculation(&self, id: &CalculationId) -> Result<(), PricingServiceError> {
        if self.calculations.delete(id)? {
            Ok(())
        } else {
            Err(PricingServiceError::CalculationNotFound(id.clone()))
        }
    }
}

/// Error raised by the pricing service.
#[derive(Debug, thiserror::Error)]
pub enum PricingServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("calculation '{0}' not found")]
    CalculationNotFound(CalculationId),
}
