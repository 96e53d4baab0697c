pub mod analysis_parser;
pub mod ai_service;
pub mod stock_catalog;
pub mod watchlist;
