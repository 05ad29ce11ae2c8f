//! Core scalar types shared across the book, the message variants, and the processor.

use std::fmt;

/// Exchange-assigned order reference number.
///
/// Both ITCH 4.1 and ITCH 5.0 use a 64-bit reference number to tie order
/// lifecycle messages back to a resting order, so the core represents it as
/// a single newtype rather than the format-polymorphic `order_id` the
/// distilled spec describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exchange-assigned trade reference ("match") number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TradeRef(pub u64);

impl fmt::Display for TradeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw integer price in the feed's native tick units.
///
/// The core never scales or divides this value internally; `decimals_adj`
/// on the book is a presentation-only concern (see [`crate::lob::LimitOrderBook::adjust_price`]).
pub type Price = i64;

/// Resting order volume, in shares (or contracts, lots, …).
pub type Volume = u64;

/// Side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    /// Buy side. Levels ordered best-first by descending price.
    Bid,
    /// Sell side. Levels ordered best-first by ascending price.
    Ask,
}

impl Side {
    /// The opposite side.
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "BID"),
            Side::Ask => write!(f, "ASK"),
        }
    }
}

/// Right-space-padded ASCII ticker symbol (ITCH fields are fixed-width, 8
/// bytes in 5.0). Stored trimmed; re-encoded by right-padding with spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// Build a `Symbol` from a fixed-width, space-padded ASCII field.
    pub fn from_fixed_width(raw: &[u8]) -> Symbol {
        let trimmed = raw
            .iter()
            .rposition(|&b| b != b' ')
            .map(|last| &raw[..=last])
            .unwrap_or(&[]);
        Symbol(String::from_utf8_lossy(trimmed).into_owned())
    }

    /// Re-encode as a fixed-width, space-padded ASCII field of `width` bytes.
    ///
    /// Truncates silently if the symbol is longer than `width` (cannot occur
    /// for values produced by [`Symbol::from_fixed_width`] with the same width).
    pub fn to_fixed_width(&self, width: usize) -> Vec<u8> {
        let mut buf = vec![b' '; width];
        let bytes = self.0.as_bytes();
        let n = bytes.len().min(width);
        buf[..n].copy_from_slice(&bytes[..n]);
        buf
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Market participant identifier, a fixed 4-byte ASCII code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Mpid(pub [u8; 4]);

impl fmt::Display for Mpid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
