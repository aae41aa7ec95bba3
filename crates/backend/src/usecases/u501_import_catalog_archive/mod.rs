pub mod executor;

pub use executor::import_archive;
