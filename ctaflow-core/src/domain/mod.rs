//! Domain types for ctaflow

pub mod bar;
pub mod instruction;

pub use bar::Bar;
pub use instruction::{Side, TradingInstruction};
