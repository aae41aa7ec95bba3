pub mod aggregate;
pub mod summary;

pub use aggregate::{Gender, ProductRecord, DEFAULT_PRIORITY, IMAGES_PUBLIC_PREFIX, PLACEHOLDER_IMAGE};
pub use summary::{CatalogState, CatalogStatus, FallbackReason, RejectionKind, ReloadSummary};
