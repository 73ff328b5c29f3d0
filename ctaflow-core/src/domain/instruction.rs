//! Trading instructions handed to the execution collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Determine side from a signed position size. Flat has no side.
    pub fn from_position(pos: i64) -> Option<Self> {
        match pos {
            p if p > 0 => Some(Side::Long),
            p if p < 0 => Some(Side::Short),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

/// One instruction for the order/execution collaborator.
///
/// The absence of an instruction is expressed as `None` / an empty list, so
/// there is no explicit "do nothing" variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TradingInstruction {
    /// Open or add to a long position.
    Buy { price: f64, volume: u32 },
    /// Close (part of) a long position.
    Sell { price: f64, volume: u32 },
    /// Open or add to a short position.
    Short { price: f64, volume: u32 },
    /// Close (part of) a short position.
    Cover { price: f64, volume: u32 },
    /// Clear all working orders before new ones are issued.
    CancelAll,
}

impl TradingInstruction {
    /// Order that opens a position on `side`.
    pub fn open(side: Side, price: f64, volume: u32) -> Self {
        match side {
            Side::Long => TradingInstruction::Buy { price, volume },
            Side::Short => TradingInstruction::Short { price, volume },
        }
    }

    /// Order that closes a position currently held on `side`.
    pub fn close(side: Side, price: f64, volume: u32) -> Self {
        match side {
            Side::Long => TradingInstruction::Sell { price, volume },
            Side::Short => TradingInstruction::Cover { price, volume },
        }
    }

    pub fn price(&self) -> Option<f64> {
        match *self {
            TradingInstruction::Buy { price, .. }
            | TradingInstruction::Sell { price, .. }
            | TradingInstruction::Short { price, .. }
            | TradingInstruction::Cover { price, .. } => Some(price),
            TradingInstruction::CancelAll => None,
        }
    }

    pub fn volume(&self) -> Option<u32> {
        match *self {
            TradingInstruction::Buy { volume, .. }
            | TradingInstruction::Sell { volume, .. }
            | TradingInstruction::Short { volume, .. }
            | TradingInstruction::Cover { volume, .. } => Some(volume),
            TradingInstruction::CancelAll => None,
        }
    }

    /// Change in signed position if this instruction is filled in full.
    pub fn position_delta(&self) -> i64 {
        match *self {
            TradingInstruction::Buy { volume, .. } | TradingInstruction::Cover { volume, .. } => {
                i64::from(volume)
            }
            TradingInstruction::Sell { volume, .. } | TradingInstruction::Short { volume, .. } => {
                -i64::from(volume)
            }
            TradingInstruction::CancelAll => 0,
        }
    }

    pub fn is_order(&self) -> bool {
        !matches!(self, TradingInstruction::CancelAll)
    }
}

impl fmt::Display for TradingInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, price, volume) = match *self {
            TradingInstruction::Buy { price, volume } => ("BUY", price, volume),
            TradingInstruction::Sell { price, volume } => ("SELL", price, volume),
            TradingInstruction::Short { price, volume } => ("SHORT", price, volume),
            TradingInstruction::Cover { price, volume } => ("COVER", price, volume),
            TradingInstruction::CancelAll => return f.write_str("CANCEL_ALL"),
        };
        write!(f, "{label} {volume} @ {price:.4}")
    }
}
