//! Trading status: a tagged variant driven by system and per-symbol status messages.
//!
//! Grounded on `original_source/src/meatpy/trading_status.py`, which defines
//! a base `TradingStatus` plus seven concrete subclasses each carrying an
//! optional free-text detail. That collapses directly onto a Rust enum.

use std::fmt;

/// Current trading status for the instrument a [`crate::processor::MarketProcessor`] tracks.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TradingStatus {
    /// Before the regular trading session; quotes may be entered but not matched.
    PreTrade(Option<String>),
    /// Regular continuous trading.
    Trade(Option<String>),
    /// After the regular trading session.
    PostTrade(Option<String>),
    /// Trading halted for this instrument.
    Halted(Option<String>),
    /// Quote-only: quotes accepted, no executions.
    QuoteOnly(Option<String>),
    /// Closing auction in progress.
    ClosingAuction(Option<String>),
    /// Market closed for this instrument.
    Closed(Option<String>),
}

impl TradingStatus {
    /// The optional free-text detail carried by whichever variant this is.
    pub fn detail(&self) -> Option<&str> {
        match self {
            TradingStatus::PreTrade(d)
            | TradingStatus::Trade(d)
            | TradingStatus::PostTrade(d)
            | TradingStatus::Halted(d)
            | TradingStatus::QuoteOnly(d)
            | TradingStatus::ClosingAuction(d)
            | TradingStatus::Closed(d) => d.as_deref(),
        }
    }
}

impl fmt::Display for TradingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TradingStatus::PreTrade(_) => "PreTrade",
            TradingStatus::Trade(_) => "Trade",
            TradingStatus::PostTrade(_) => "PostTrade",
            TradingStatus::Halted(_) => "Halted",
            TradingStatus::QuoteOnly(_) => "QuoteOnly",
            TradingStatus::ClosingAuction(_) => "ClosingAuction",
            TradingStatus::Closed(_) => "Closed",
        };
        match self.detail() {
            Some(d) => write!(f, "{tag}({d})"),
            None => write!(f, "{tag}"),
        }
    }
}
