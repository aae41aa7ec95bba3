pub mod default_catalog;
pub mod excel_import;
pub mod gender;
pub mod images;
pub mod mapper;
pub mod price;
pub mod repository;
pub mod service;
pub mod sizes;

pub use repository::CatalogStore;
pub use service::{CatalogPaths, CatalogService};
