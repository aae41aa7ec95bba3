pub mod u501_import_catalog_archive;
pub mod u502_enrich_from_product_pages;
