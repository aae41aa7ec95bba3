pub mod executor;
pub mod page_client;

pub use executor::{enrich_rows, EnrichmentStats};
pub use page_client::{HttpProductPageSource, PageFetchError, ProductPageSource, ScrapedProduct};
