pub mod stock;
pub mod ai;
pub mod settings;
pub mod watchlist;
