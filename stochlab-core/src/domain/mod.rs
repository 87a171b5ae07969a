//! Domain types for StochLab

pub mod bar;
pub mod trade;

pub use bar::Bar;
pub use trade::{Trade, TradeKind};

/// Symbol type alias
pub type Symbol = String;
