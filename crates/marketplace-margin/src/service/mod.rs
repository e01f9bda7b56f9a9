//! Service facade and HTTP routes over the engine and stores.

pub mod pricing;
pub mod router;

pub use pricing::{MarketplaceQuote, PricingService, PricingServiceError};
pub use router::pricing_router;
