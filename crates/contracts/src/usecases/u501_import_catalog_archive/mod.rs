pub mod response;

pub use response::ArchiveImportResponse;
