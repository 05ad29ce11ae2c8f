//! Two ordered sequences of price levels with order lookup, invariants, and
//! the execution-priority error buffer.
//!
//! Grounded on `original_source/src/meatpy/lob.py`'s `LimitOrderBook` class:
//! side-aware wrappers over `Level`, the tier-interleaved `find_order` scan,
//! the derived measures (`bid_ask_spread`, `mid_quote`, `quote_slope`, …),
//! and — the trickiest piece — the `execute_trade` error-buffer
//! reconciliation algorithm, transcribed faithfully below.

use tracing::trace;

use crate::error::{LevelError, LobError};
use crate::level::{PriceLevel, RestingOrder};
use crate::timestamp::Timestamp;
use crate::types::{OrderId, Price, Side, Volume};

/// A priority violation buffered by [`LimitOrderBook::execute_trade`],
/// pending reconciliation against a later strict execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferedViolation {
    /// Timestamp (nanoseconds since book_date midnight) of the offending execution.
    pub ts: i64,
    /// Order the caller tried to execute against.
    pub order_id: OrderId,
    /// The order actually at the head of the queue at the time.
    pub actual_head_order_id: OrderId,
}

/// One row of [`LimitOrderBook::to_records`]: a flattened, ranked view of a
/// single resting order on one side of the book.
///
/// Supplemented from `original_source/src/meatpy/lob.py`'s `to_records` — a
/// plain data-shaping method, not a concrete recorder; downstream CSV/Parquet
/// subscribers build on top of this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    /// Which side of the book this row belongs to.
    pub side: Side,
    /// Zero-based rank within the side, 0 = best.
    pub level_rank: usize,
    /// Price of the level this order rests at.
    pub price: Price,
    /// The resting order itself.
    pub order: RestingOrder,
}

/// The reconstructed limit order book for one instrument at one instant.
///
/// `bids` is ordered best-first (descending price); `asks` is ordered
/// best-first (ascending price). Owned exclusively by one
/// [`crate::processor::MarketProcessor`]; never shared across threads.
#[derive(Debug, Clone)]
pub struct LimitOrderBook {
    /// Timestamp of the most recent mutation.
    pub timestamp: Timestamp,
    /// Disambiguates multiple snapshots sharing the same `timestamp`.
    pub timestamp_inc: u32,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
    /// Optional rational divisor applied only when reporting human-readable
    /// prices via [`LimitOrderBook::adjust_price`]; comparisons always use
    /// the raw integer ticks.
    pub decimals_adj: Option<f64>,
    error_buffer: Vec<BufferedViolation>,
}

impl LimitOrderBook {
    /// Create an empty book anchored at `timestamp`.
    pub fn new(timestamp: Timestamp) -> LimitOrderBook {
        LimitOrderBook {
            timestamp,
            timestamp_inc: 0,
            bids: Vec::new(),
            asks: Vec::new(),
            decimals_adj: None,
            error_buffer: Vec::new(),
        }
    }

    /// Bid-side levels, best (highest price) first.
    pub fn bid_levels(&self) -> &[PriceLevel] {
        &self.bids
    }

    /// Ask-side levels, best (lowest price) first.
    pub fn ask_levels(&self) -> &[PriceLevel] {
        &self.asks
    }

    fn levels(&self, side: Side) -> &[PriceLevel] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn levels_mut(&mut self, side: Side) -> &mut Vec<PriceLevel> {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    /// Insertion index for `price` on `side`, and whether a level already
    /// exists there. Bids walk while `price < levels[i].price` (descending
    /// order); asks walk while `price > levels[i].price` (ascending order).
    fn locate_insertion(&self, side: Side, price: Price) -> (usize, bool) {
        let levels = self.levels(side);
        let mut i = 0;
        while i < levels.len() {
            let lvl_price = levels[i].price();
            let keep_walking = match side {
                Side::Bid => price < lvl_price,
                Side::Ask => price > lvl_price,
            };
            if !keep_walking {
                break;
            }
            i += 1;
        }
        let exists = i < levels.len() && levels[i].price() == price;
        (i, exists)
    }

    /// Append-style entry (normal, in-order case): locate or create the
    /// level for `price`, then delegate to [`PriceLevel::enter_quote`].
    pub fn enter_quote(
        &mut self,
        ts: i64,
        price: Price,
        volume: Volume,
        order_id: OrderId,
        side: Side,
    ) -> Result<(), LobError> {
        trace!(ts, price, volume, %order_id, %side, "entering quote");
        let (idx, exists) = self.locate_insertion(side, price);
        if exists {
            self.levels_mut(side)[idx]
                .enter_quote(ts, volume, order_id)
                .map_err(Into::into)?;
        } else {
            let level = PriceLevel::new(
                price,
                RestingOrder {
                    order_id,
                    entry_ts: ts,
                    remaining_volume: volume,
                },
            );
            self.levels_mut(side).insert(idx, level);
        }
        Ok(())
    }

    /// As [`LimitOrderBook::enter_quote`], but preserving time-priority when
    /// the input stream is not strictly monotone at this level.
    pub fn enter_quote_out_of_order(
        &mut self,
        ts: i64,
        price: Price,
        volume: Volume,
        order_id: OrderId,
        side: Side,
    ) -> Result<(), LobError> {
        let (idx, exists) = self.locate_insertion(side, price);
        if exists {
            self.levels_mut(side)[idx]
                .enter_quote_out_of_order(ts, volume, order_id)
                .map_err(Into::into)?;
        } else {
            let level = PriceLevel::new(
                price,
                RestingOrder {
                    order_id,
                    entry_ts: ts,
                    remaining_volume: volume,
                },
            );
            self.levels_mut(side).insert(idx, level);
        }
        Ok(())
    }

    /// As [`LimitOrderBook::enter_quote`], at a caller-chosen in-level index.
    pub fn enter_quote_at_position(
        &mut self,
        ts: i64,
        price: Price,
        volume: Volume,
        order_id: OrderId,
        side: Side,
        expected_position: usize,
        check_priority: bool,
    ) -> Result<(), LobError> {
        let (idx, exists) = self.locate_insertion(side, price);
        if exists {
            self.levels_mut(side)[idx]
                .enter_quote_at_position(ts, volume, order_id, expected_position, check_priority)
                .map_err(Into::into)?;
        } else {
            let level = PriceLevel::new(
                price,
                RestingOrder {
                    order_id,
                    entry_ts: ts,
                    remaining_volume: volume,
                },
            );
            self.levels_mut(side).insert(idx, level);
        }
        Ok(())
    }

    /// Whether `order_id` is resting anywhere on `side` (or either side, if
    /// `side` is `None`).
    pub fn order_on_book(&self, order_id: OrderId, side: Option<Side>) -> bool {
        self.find_order(order_id, side).is_some()
    }

    /// Convenience: whether `order_id` rests on the ask side.
    pub fn ask_order_on_book(&self, order_id: OrderId) -> bool {
        self.order_on_book(order_id, Some(Side::Ask))
    }

    /// Convenience: whether `order_id` rests on the bid side.
    pub fn bid_order_on_book(&self, order_id: OrderId) -> bool {
        self.order_on_book(order_id, Some(Side::Bid))
    }

    /// The side `order_id` rests on, if it is on the book at all.
    pub fn find_order_type(&self, order_id: OrderId) -> Result<Side, LobError> {
        self.find_order(order_id, None)
            .map(|(side, _, _)| side)
            .ok_or(LobError::OrderNotFound(order_id))
    }

    /// Locate `order_id`, returning `(side, level_index, queue_index)`.
    ///
    /// With a side hint, scans only that side's levels in order. Without a
    /// hint, scans both sides tier-interleaved (`ask[0], bid[0], ask[1],
    /// bid[1], …`) to bias toward top-of-book hits.
    pub fn find_order(&self, order_id: OrderId, side: Option<Side>) -> Option<(Side, usize, usize)> {
        match side {
            Some(s) => self.find_on_side(s, order_id),
            None => {
                let max_len = self.asks.len().max(self.bids.len());
                for i in 0..max_len {
                    if i < self.asks.len() {
                        if let Some(q) = self.asks[i].orders().position(|o| o.order_id == order_id) {
                            return Some((Side::Ask, i, q));
                        }
                    }
                    if i < self.bids.len() {
                        if let Some(q) = self.bids[i].orders().position(|o| o.order_id == order_id) {
                            return Some((Side::Bid, i, q));
                        }
                    }
                }
                None
            }
        }
    }

    fn find_on_side(&self, side: Side, order_id: OrderId) -> Option<(Side, usize, usize)> {
        for (i, level) in self.levels(side).iter().enumerate() {
            if let Some(q) = level.orders().position(|o| o.order_id == order_id) {
                return Some((side, i, q));
            }
        }
        None
    }

    fn remove_level_if_empty(&mut self, side: Side, level_index: usize) {
        if self.levels(side)[level_index].is_empty() {
            self.levels_mut(side).remove(level_index);
        }
    }

    /// Reduce or remove a resting order by `volume`. Side is auto-discovered
    /// if not given.
    pub fn cancel_quote(
        &mut self,
        order_id: OrderId,
        volume: Volume,
        side: Option<Side>,
    ) -> Result<(), LobError> {
        let (side, level_index, _) = self
            .find_order(order_id, side)
            .ok_or(LobError::OrderNotFound(order_id))?;
        trace!(volume, %order_id, %side, "cancelling quote");
        let result = self.levels_mut(side)[level_index].cancel_quote(order_id, volume);
        self.remove_level_if_empty(side, level_index);
        result.map_err(Into::into).map(|_| ())
    }

    /// Remove a resting order unconditionally. Side is auto-discovered if
    /// not given.
    pub fn delete_quote(&mut self, order_id: OrderId, side: Option<Side>) -> Result<(), LobError> {
        let (side, level_index, _) = self
            .find_order(order_id, side)
            .ok_or(LobError::OrderNotFound(order_id))?;
        trace!(%order_id, %side, "deleting quote");
        let result = self.levels_mut(side)[level_index].delete_quote(order_id);
        self.remove_level_if_empty(side, level_index);
        result.map_err(Into::into).map(|_| ())
    }

    /// Strict, head-of-level execution with an error-buffer fallback: on an
    /// `ExecutionPriority` violation, record it, retry via the relaxed path,
    /// and continue. On a subsequent successful strict execution, reconcile:
    /// same-timestamp buffered violations whose `actual_head_order_id`
    /// matches the new head are discarded as false positives;
    /// earlier-timestamped violations are flushed as a reportable list.
    pub fn execute_trade(
        &mut self,
        ts: i64,
        order_id: OrderId,
        volume: Volume,
        side: Option<Side>,
    ) -> Result<Vec<BufferedViolation>, LobError> {
        let (side, level_index, _) = self
            .find_order(order_id, side)
            .ok_or(LobError::OrderNotFound(order_id))?;
        match self.levels_mut(side)[level_index].execute_trade(order_id, volume, ts) {
            Ok(_outcome) => {
                trace!(ts, %order_id, volume, %side, "strict execution");
                self.remove_level_if_empty(side, level_index);
                let flushed = self.reconcile_error_buffer(ts, order_id);
                Ok(flushed)
            }
            Err(LevelError::ExecutionPriority {
                ts,
                order_id,
                actual_head_order_id,
            }) => {
                trace!(ts, %order_id, %actual_head_order_id, "execution priority violation buffered");
                self.error_buffer.push(BufferedViolation {
                    ts,
                    order_id,
                    actual_head_order_id,
                });
                self.levels_mut(side)[level_index]
                    .execute_trade_by_id(order_id, volume)
                    .map_err(Into::into)?;
                self.remove_level_if_empty(side, level_index);
                Ok(Vec::new())
            }
            Err(other) => {
                self.remove_level_if_empty(side, level_index);
                Err(other.into())
            }
        }
    }

    /// Called after a successful strict execution at `ts` against the order
    /// that is now (or was) the head, `head_order_id`: discard same-timestamp
    /// false positives, flush earlier violations.
    fn reconcile_error_buffer(&mut self, ts: i64, head_order_id: OrderId) -> Vec<BufferedViolation> {
        if self.error_buffer.is_empty() {
            return Vec::new();
        }
        let mut flushed = Vec::new();
        self.error_buffer.retain(|v| {
            if v.ts == ts && v.actual_head_order_id == head_order_id {
                false // false positive, discard
            } else if v.ts < ts {
                flushed.push(*v);
                false // flush
            } else {
                true // keep buffered
            }
        });
        flushed
    }

    /// Relaxed execution: matches `order_id` regardless of its queue
    /// position. Used by order-executed-at-price.
    pub fn execute_trade_by_id(
        &mut self,
        order_id: OrderId,
        volume: Volume,
        side: Option<Side>,
    ) -> Result<(), LobError> {
        let (side, level_index, _) = self
            .find_order(order_id, side)
            .ok_or(LobError::OrderNotFound(order_id))?;
        let result = self.levels_mut(side)[level_index].execute_trade_by_id(order_id, volume);
        self.remove_level_if_empty(side, level_index);
        result.map_err(Into::into).map(|_| ())
    }

    /// Drains any residual buffered priority violations (called by
    /// [`crate::processor::MarketProcessor::processing_done`] at end-of-day).
    pub fn end_of_day(&mut self) -> Vec<BufferedViolation> {
        std::mem::take(&mut self.error_buffer)
    }

    /// Best (highest) bid price and total volume at that level.
    pub fn best_bid(&self) -> Option<(Price, Volume)> {
        self.bids.first().map(|l| (l.price(), l.total_volume()))
    }

    /// Best (lowest) ask price and total volume at that level.
    pub fn best_ask(&self) -> Option<(Price, Volume)> {
        self.asks.first().map(|l| (l.price(), l.total_volume()))
    }

    /// `best_ask - best_bid`. `ValueMissing` if either side is empty.
    pub fn bid_ask_spread(&self) -> Result<Price, LobError> {
        let (bid, _) = self.best_bid().ok_or(LobError::ValueMissing("bid"))?;
        let (ask, _) = self.best_ask().ok_or(LobError::ValueMissing("ask"))?;
        Ok(ask - bid)
    }

    /// Average of best bid and best ask.
    pub fn mid_quote(&self) -> Result<f64, LobError> {
        let (bid, _) = self.best_bid().ok_or(LobError::ValueMissing("bid"))?;
        let (ask, _) = self.best_ask().ok_or(LobError::ValueMissing("ask"))?;
        Ok((bid as f64 + ask as f64) / 2.0)
    }

    /// `spread / (ln(ask_vol) + ln(bid_vol))`.
    pub fn quote_slope(&self) -> Result<f64, LobError> {
        let (bid, bid_vol) = self.best_bid().ok_or(LobError::ValueMissing("bid"))?;
        let (ask, ask_vol) = self.best_ask().ok_or(LobError::ValueMissing("ask"))?;
        let spread = (ask - bid) as f64;
        Ok(spread / ((ask_vol as f64).ln() + (bid_vol as f64).ln()))
    }

    /// `log(quote_slope)`.
    pub fn log_quote_slope(&self) -> Result<f64, LobError> {
        self.quote_slope().map(|s| s.ln())
    }

    /// Cumulative execution price for a marketable buy of `volume` shares:
    /// walks the ask side accumulating `(price * taken, taken)`, truncating
    /// at book depletion.
    pub fn buy_execution_price(&self, volume: Volume) -> Result<f64, LobError> {
        self.walk_execution_price(Side::Ask, volume)
    }

    /// As [`LimitOrderBook::buy_execution_price`], walking the bid side for
    /// a marketable sell.
    pub fn sell_execution_price(&self, volume: Volume) -> Result<f64, LobError> {
        self.walk_execution_price(Side::Bid, volume)
    }

    fn walk_execution_price(&self, side: Side, volume: Volume) -> Result<f64, LobError> {
        let levels = self.levels(side);
        if levels.is_empty() {
            return Err(LobError::ValueMissing(match side {
                Side::Ask => "ask",
                Side::Bid => "bid",
            }));
        }
        let mut remaining = volume;
        let mut notional: f64 = 0.0;
        for level in levels {
            if remaining == 0 {
                break;
            }
            let taken = level.total_volume().min(remaining);
            notional += level.price() as f64 * taken as f64;
            remaining -= taken;
        }
        Ok(notional)
    }

    /// Apply `decimals_adj` to a raw integer price, for presentation only.
    pub fn adjust_price(&self, raw_price: Price) -> f64 {
        match self.decimals_adj {
            Some(d) => raw_price as f64 / d,
            None => raw_price as f64,
        }
    }

    /// Deep copy, optionally truncated to `max_depth` levels per side. Used
    /// by snapshot subscribers that need a persistent, independently-owned
    /// view.
    pub fn copy(&self, max_depth: Option<usize>) -> LimitOrderBook {
        let take = |levels: &[PriceLevel]| -> Vec<PriceLevel> {
            match max_depth {
                Some(n) => levels.iter().take(n).cloned().collect(),
                None => levels.to_vec(),
            }
        };
        LimitOrderBook {
            timestamp: self.timestamp,
            timestamp_inc: self.timestamp_inc,
            bids: take(&self.bids),
            asks: take(&self.asks),
            decimals_adj: self.decimals_adj,
            error_buffer: self.error_buffer.clone(),
        }
    }

    /// Flatten both sides into a ranked, ordered sequence of records.
    /// Supplemented from the source's `to_records`.
    pub fn to_records(&self) -> Vec<BookRecord> {
        let mut out = Vec::new();
        for (rank, level) in self.bids.iter().enumerate() {
            for order in level.orders() {
                out.push(BookRecord {
                    side: Side::Bid,
                    level_rank: rank,
                    price: level.price(),
                    order: *order,
                });
            }
        }
        for (rank, level) in self.asks.iter().enumerate() {
            for order in level.orders() {
                out.push(BookRecord {
                    side: Side::Ask,
                    level_rank: rank,
                    price: level.price(),
                    order: *order,
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(n: i64) -> Timestamp {
        Timestamp::from_date_and_nanos(0, n)
    }

    #[test]
    fn scenario_basic_add_execute_delete() {
        let mut lob = LimitOrderBook::new(ts(0));
        lob.enter_quote(0, 10_000, 100, OrderId(1), Side::Bid).unwrap();
        assert_eq!(lob.best_bid(), Some((10_000, 100)));

        lob.execute_trade(1, OrderId(1), 40, None).unwrap();
        assert_eq!(lob.best_bid(), Some((10_000, 60)));

        lob.delete_quote(OrderId(1), None).unwrap();
        assert!(lob.best_bid().is_none());
        assert!(!lob.order_on_book(OrderId(1), None));
    }

    #[test]
    fn scenario_cross_the_spread_is_diagnostic_only() {
        let mut lob = LimitOrderBook::new(ts(0));
        lob.enter_quote(0, 10_000, 100, OrderId(1), Side::Bid).unwrap();
        lob.enter_quote(1, 10_001, 100, OrderId(2), Side::Ask).unwrap();
        lob.enter_quote(2, 10_002, 50, OrderId(3), Side::Bid).unwrap();

        assert_eq!(lob.best_bid(), Some((10_002, 50)));
        assert_eq!(lob.best_ask(), Some((10_001, 100)));
        assert_eq!(lob.bid_ask_spread().unwrap(), -1);
    }

    #[test]
    fn scenario_execution_priority_buffering() {
        let mut lob = LimitOrderBook::new(ts(0));
        lob.enter_quote(0, 10_000, 100, OrderId(1), Side::Bid).unwrap();
        lob.enter_quote(1, 10_000, 100, OrderId(2), Side::Bid).unwrap();

        // message 3: execute id=2 while id=1 is head -> priority violation, buffered
        let flushed = lob.execute_trade(2, OrderId(2), 50, None).unwrap();
        assert!(flushed.is_empty());

        // message 4: strict execute against id=1 (the actual head) at the same ts
        let flushed = lob.execute_trade(2, OrderId(1), 50, None).unwrap();
        assert!(flushed.is_empty(), "false positive must be discarded, not flushed");

        let level = &lob.bid_levels()[0];
        assert_eq!(level.price(), 10_000);
        let ids: Vec<_> = level.orders().map(|o| (o.order_id, o.remaining_volume)).collect();
        assert_eq!(ids, vec![(OrderId(1), 50), (OrderId(2), 50)]);

        assert!(lob.end_of_day().is_empty());
    }

    #[test]
    fn scenario_order_replace() {
        let mut lob = LimitOrderBook::new(ts(0));
        lob.enter_quote(0, 10_000, 100, OrderId(1), Side::Bid).unwrap();
        lob.delete_quote(OrderId(1), Some(Side::Bid)).unwrap();
        lob.enter_quote(1, 10_001, 80, OrderId(2), Side::Bid).unwrap();

        assert_eq!(lob.bid_levels().len(), 1);
        assert_eq!(lob.bid_levels()[0].price(), 10_001);
        assert_eq!(lob.bid_levels()[0].head().unwrap().order_id, OrderId(2));
    }

    #[test]
    fn tier_interleaved_find_order() {
        let mut lob = LimitOrderBook::new(ts(0));
        lob.enter_quote(0, 10_000, 100, OrderId(1), Side::Bid).unwrap();
        lob.enter_quote(0, 9_999, 100, OrderId(2), Side::Bid).unwrap();
        lob.enter_quote(0, 10_001, 100, OrderId(3), Side::Ask).unwrap();

        assert_eq!(lob.find_order(OrderId(3), None), Some((Side::Ask, 0, 0)));
        assert_eq!(lob.find_order(OrderId(1), None), Some((Side::Bid, 0, 0)));
        assert_eq!(lob.find_order(OrderId(2), None), Some((Side::Bid, 1, 0)));
    }
}
