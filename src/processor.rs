//! Sequential state machine over one decoded message stream for one
//! instrument: timestamp projection, LOB mutation dispatch, trading-status
//! derivation, and subscriber fan-out.
//!
//! Grounded on `original_source/src/meatpy/market_processor.py` and
//! `itch50_market_processor.py`'s dispatch `match`/`if` chain over decoded
//! message types; the teacher contributes the `tracing`-based lifecycle
//! logging idiom (`src/orderbook/manager.rs`) applied at the same seams.

use crate::error::ProcessorError;
use crate::handler::MarketEventHandler;
use crate::lob::{BufferedViolation, LimitOrderBook};
use crate::message::{itch41, AnyMessage, Event};
use crate::timestamp::Timestamp;
use crate::trading_status::TradingStatus;
use crate::types::{Side, Symbol, Volume};

/// Sequential per-instrument processor. Owns its book exclusively; never
/// shared across threads (parallelism is only ever across
/// independent processor instances, never within one).
pub struct MarketProcessor {
    instrument: Symbol,
    book_date: i32,
    /// When `false`, LOB mutations are skipped but `message_event` still fires.
    pub track_lob_flag: bool,
    current_lob: Option<LimitOrderBook>,
    current_timestamp: Option<Timestamp>,
    last_seconds_marker: Option<u32>,
    system_status: Option<u8>,
    stock_status: Option<u8>,
    emc_status: Option<u8>,
    trading_status: Option<TradingStatus>,
    subscribers: Vec<Box<dyn MarketEventHandler>>,
}

impl MarketProcessor {
    /// Construct a processor tracking `instrument` on `book_date` (days
    /// since the proleptic-Gregorian CE epoch, matching [`Timestamp`]).
    pub fn new(instrument: Symbol, book_date: i32) -> MarketProcessor {
        MarketProcessor {
            instrument,
            book_date,
            track_lob_flag: true,
            current_lob: None,
            current_timestamp: None,
            last_seconds_marker: None,
            system_status: None,
            stock_status: None,
            emc_status: None,
            trading_status: None,
            subscribers: Vec::new(),
        }
    }

    /// Register a subscriber; callbacks fire in registration order.
    pub fn register_subscriber(&mut self, subscriber: Box<dyn MarketEventHandler>) {
        self.subscribers.push(subscriber);
    }

    /// The instrument this processor tracks.
    pub fn instrument(&self) -> &Symbol {
        &self.instrument
    }

    /// A read-only view of the current book, if any order has arrived yet.
    pub fn current_lob(&self) -> Option<&LimitOrderBook> {
        self.current_lob.as_ref()
    }

    /// The derived trading status, if a system-event message has been seen yet.
    pub fn trading_status(&self) -> Option<&TradingStatus> {
        self.trading_status.as_ref()
    }

    fn native_timestamp_nanos(&self, msg: &AnyMessage) -> i64 {
        match msg {
            AnyMessage::V50(m) => m.header().timestamp as i64,
            AnyMessage::V41(m) => match m.header() {
                Some(h) => {
                    let marker = self.last_seconds_marker.unwrap_or(0) as i64;
                    marker * 1_000_000_000 + h.timestamp as i64
                }
                None => match m {
                    itch41::Message::SecondsMarker(s) => s.seconds as i64 * 1_000_000_000,
                    _ => unreachable!("only SecondsMarker has no header"),
                },
            },
        }
    }

    /// Apply one decoded message: project its timestamp, fan it out to
    /// subscribers, and dispatch the LOB mutation (if any) its category implies.
    pub fn process_message(&mut self, msg: AnyMessage) -> Result<(), ProcessorError> {
        let native_ns = self.native_timestamp_nanos(&msg);
        let ts = Timestamp::from_date_and_nanos(self.book_date, native_ns);
        self.fire_message_event(ts, &msg)?;

        match msg.event() {
            Event::SecondsMarker { seconds } => {
                self.last_seconds_marker = Some(seconds);
            }
            Event::SystemEvent { code } => {
                self.system_status = Some(code);
                self.recompute_trading_status()?;
            }
            Event::OperationalHalt { action } => {
                self.emc_status = Some(action);
                self.recompute_trading_status()?;
            }
            Event::StockTradingAction { stock, trading_state } => {
                if stock == self.instrument {
                    self.stock_status = Some(trading_state);
                    self.recompute_trading_status()?;
                }
            }
            Event::AddOrder {
                order_ref,
                side,
                shares,
                stock: _,
                price,
                mpid: _,
            } => {
                if self.track_lob_flag {
                    self.advance_timestamp_for_mutation(ts)?;
                    if self.current_lob.is_none() {
                        self.current_lob = Some(LimitOrderBook::new(ts));
                    }
                    let lob = self.current_lob.as_mut().expect("just created above");
                    lob.enter_quote(native_ns, price, shares as Volume, order_ref, side)?;
                    self.fire_enter_quote_event(ts, price, shares as Volume, order_ref, side)?;
                }
            }
            Event::OrderExecuted {
                order_ref,
                shares,
                match_number,
            } => {
                if self.track_lob_flag {
                    self.advance_timestamp_for_mutation(ts)?;
                    let lob = self.current_lob.as_mut().ok_or(ProcessorError::MissingLob)?;
                    let side = lob.find_order_type(order_ref)?;
                    let flushed = lob.execute_trade(native_ns, order_ref, shares as Volume, Some(side))?;
                    self.fire_execute_trade_event(ts, shares as Volume, order_ref, match_number, side)?;
                    self.fire_execution_priority_violation_events(ts, &flushed)?;
                }
            }
            Event::OrderExecutedWithPrice {
                order_ref,
                shares,
                match_number,
                price,
            } => {
                if self.track_lob_flag {
                    self.advance_timestamp_for_mutation(ts)?;
                    let lob = self.current_lob.as_mut().ok_or(ProcessorError::MissingLob)?;
                    let side = lob.find_order_type(order_ref)?;
                    lob.execute_trade_by_id(order_ref, shares as Volume, Some(side))?;
                    self.fire_execute_trade_price_event(
                        ts,
                        shares as Volume,
                        order_ref,
                        match_number,
                        price,
                        side,
                    )?;
                }
            }
            Event::OrderCancel { order_ref, shares } => {
                if self.track_lob_flag {
                    self.advance_timestamp_for_mutation(ts)?;
                    let lob = self.current_lob.as_mut().ok_or(ProcessorError::MissingLob)?;
                    let side = lob.find_order_type(order_ref)?;
                    lob.cancel_quote(order_ref, shares as Volume, Some(side))?;
                    self.fire_cancel_quote_event(ts, shares as Volume, order_ref, side)?;
                }
            }
            Event::OrderDelete { order_ref } => {
                if self.track_lob_flag {
                    self.advance_timestamp_for_mutation(ts)?;
                    let lob = self.current_lob.as_mut().ok_or(ProcessorError::MissingLob)?;
                    let side = lob.find_order_type(order_ref)?;
                    lob.delete_quote(order_ref, Some(side))?;
                    self.fire_delete_quote_event(ts, order_ref, side)?;
                }
            }
            Event::OrderReplace {
                original_order_ref,
                new_order_ref,
                shares,
                price,
            } => {
                if self.track_lob_flag {
                    self.advance_timestamp_for_mutation(ts)?;
                    let lob = self.current_lob.as_mut().ok_or(ProcessorError::MissingLob)?;
                    let side = lob.find_order_type(original_order_ref)?;
                    lob.delete_quote(original_order_ref, Some(side))?;
                    lob.enter_quote(native_ns, price, shares as Volume, new_order_ref, side)?;
                    self.fire_replace_quote_event(
                        ts,
                        original_order_ref,
                        new_order_ref,
                        price,
                        shares as Volume,
                        side,
                    )?;
                }
            }
            Event::Trade {
                order_ref,
                side,
                shares,
                stock: _,
                price,
                match_number: _,
            } => {
                let bid_id = order_ref.filter(|_| side == Some(Side::Bid));
                let ask_id = order_ref.filter(|_| side == Some(Side::Ask));
                self.fire_auction_trade_event(ts, shares, price, bid_id, ask_id)?;
            }
            Event::CrossTrade {
                stock: _,
                shares,
                price,
                match_number: _,
            } => {
                self.fire_crossing_trade_event(ts, shares, price, None, None)?;
            }
            Event::BrokenTrade { .. } | Event::Other => {}
        }
        Ok(())
    }

    /// Drain any residual execution-priority violations. Called once the
    /// stream is exhausted; always safe to call even after a fatal error.
    pub fn processing_done(&mut self) -> Vec<BufferedViolation> {
        match self.current_lob.as_mut() {
            Some(lob) => lob.end_of_day(),
            None => Vec::new(),
        }
    }

    fn advance_timestamp_for_mutation(&mut self, new_ts: Timestamp) -> Result<(), ProcessorError> {
        let changed = match &self.current_lob {
            Some(lob) => lob.timestamp != new_ts,
            None => true,
        };
        if changed {
            let MarketProcessor {
                subscribers,
                current_lob,
                ..
            } = self;
            for s in subscribers.iter_mut() {
                s.before_lob_update(current_lob.as_ref(), new_ts)
                    .map_err(|e| ProcessorError::SubscriberAborted(e.0))?;
            }
        }
        if let Some(lob) = self.current_lob.as_mut() {
            if lob.timestamp == new_ts {
                lob.timestamp_inc += 1;
            } else {
                lob.timestamp = new_ts;
                lob.timestamp_inc = 0;
            }
        }
        self.current_timestamp = Some(new_ts);
        Ok(())
    }

    /// Trading status decision table: `emc_status`
    /// overrides take precedence, then system/stock-status combinations.
    fn recompute_trading_status(&mut self) -> Result<(), ProcessorError> {
        if let Some(emc) = self.emc_status {
            match emc {
                b'H' => {
                    self.trading_status = Some(TradingStatus::Halted(None));
                    return Ok(());
                }
                b'R' => {
                    self.trading_status = Some(TradingStatus::QuoteOnly(None));
                    return Ok(());
                }
                _ => {}
            }
        }
        match self.system_status {
            None => Ok(()),
            Some(b'O') | Some(b'C') | Some(b'E') | Some(b'M') => {
                self.trading_status = Some(TradingStatus::PostTrade(None));
                Ok(())
            }
            Some(b'S') => {
                self.trading_status = Some(TradingStatus::PreTrade(None));
                Ok(())
            }
            Some(b'Q') => {
                self.trading_status = Some(match self.stock_status {
                    Some(b'T') => TradingStatus::Trade(None),
                    Some(b'H') | Some(b'P') => TradingStatus::Halted(None),
                    Some(b'Q') => TradingStatus::QuoteOnly(None),
                    _ => TradingStatus::PreTrade(None),
                });
                Ok(())
            }
            Some(other) => Err(ProcessorError::InvalidTradingStatus {
                system: Some(other),
                stock: self.stock_status,
                emc: self.emc_status,
            }),
        }
    }

    fn fire_message_event(&mut self, ts: Timestamp, msg: &AnyMessage) -> Result<(), ProcessorError> {
        for s in self.subscribers.iter_mut() {
            s.message_event(ts, msg)
                .map_err(|e| ProcessorError::SubscriberAborted(e.0))?;
        }
        Ok(())
    }

    fn fire_enter_quote_event(
        &mut self,
        ts: Timestamp,
        price: crate::types::Price,
        volume: Volume,
        order_id: crate::types::OrderId,
        side: Side,
    ) -> Result<(), ProcessorError> {
        for s in self.subscribers.iter_mut() {
            s.enter_quote_event(ts, price, volume, order_id, side)
                .map_err(|e| ProcessorError::SubscriberAborted(e.0))?;
        }
        Ok(())
    }

    fn fire_cancel_quote_event(
        &mut self,
        ts: Timestamp,
        volume: Volume,
        order_id: crate::types::OrderId,
        side: Side,
    ) -> Result<(), ProcessorError> {
        for s in self.subscribers.iter_mut() {
            s.cancel_quote_event(ts, volume, order_id, side)
                .map_err(|e| ProcessorError::SubscriberAborted(e.0))?;
        }
        Ok(())
    }

    fn fire_delete_quote_event(
        &mut self,
        ts: Timestamp,
        order_id: crate::types::OrderId,
        side: Side,
    ) -> Result<(), ProcessorError> {
        for s in self.subscribers.iter_mut() {
            s.delete_quote_event(ts, order_id, side)
                .map_err(|e| ProcessorError::SubscriberAborted(e.0))?;
        }
        Ok(())
    }

    fn fire_replace_quote_event(
        &mut self,
        ts: Timestamp,
        orig_id: crate::types::OrderId,
        new_id: crate::types::OrderId,
        price: crate::types::Price,
        volume: Volume,
        side: Side,
    ) -> Result<(), ProcessorError> {
        for s in self.subscribers.iter_mut() {
            s.replace_quote_event(ts, orig_id, new_id, price, volume, side)
                .map_err(|e| ProcessorError::SubscriberAborted(e.0))?;
        }
        Ok(())
    }

    fn fire_execute_trade_event(
        &mut self,
        ts: Timestamp,
        volume: Volume,
        order_id: crate::types::OrderId,
        trade_ref: crate::types::TradeRef,
        side: Side,
    ) -> Result<(), ProcessorError> {
        for s in self.subscribers.iter_mut() {
            s.execute_trade_event(ts, volume, order_id, trade_ref, side)
                .map_err(|e| ProcessorError::SubscriberAborted(e.0))?;
        }
        Ok(())
    }

    fn fire_execute_trade_price_event(
        &mut self,
        ts: Timestamp,
        volume: Volume,
        order_id: crate::types::OrderId,
        trade_ref: crate::types::TradeRef,
        price: crate::types::Price,
        side: Side,
    ) -> Result<(), ProcessorError> {
        for s in self.subscribers.iter_mut() {
            s.execute_trade_price_event(ts, volume, order_id, trade_ref, price, side)
                .map_err(|e| ProcessorError::SubscriberAborted(e.0))?;
        }
        Ok(())
    }

    fn fire_auction_trade_event(
        &mut self,
        ts: Timestamp,
        volume: Volume,
        price: crate::types::Price,
        bid_id: Option<crate::types::OrderId>,
        ask_id: Option<crate::types::OrderId>,
    ) -> Result<(), ProcessorError> {
        for s in self.subscribers.iter_mut() {
            s.auction_trade_event(ts, volume, price, bid_id, ask_id)
                .map_err(|e| ProcessorError::SubscriberAborted(e.0))?;
        }
        Ok(())
    }

    fn fire_crossing_trade_event(
        &mut self,
        ts: Timestamp,
        volume: Volume,
        price: crate::types::Price,
        bid_id: Option<crate::types::OrderId>,
        ask_id: Option<crate::types::OrderId>,
    ) -> Result<(), ProcessorError> {
        for s in self.subscribers.iter_mut() {
            s.crossing_trade_event(ts, volume, price, bid_id, ask_id)
                .map_err(|e| ProcessorError::SubscriberAborted(e.0))?;
        }
        Ok(())
    }

    fn fire_execution_priority_violation_events(
        &mut self,
        ts: Timestamp,
        violations: &[BufferedViolation],
    ) -> Result<(), ProcessorError> {
        for v in violations {
            tracing::warn!(?v, "execution-priority violation flushed out of order");
            for s in self.subscribers.iter_mut() {
                s.execution_priority_violation_event(ts, v)
                    .map_err(|e| ProcessorError::SubscriberAborted(e.0))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::RecordingHandler;
    use crate::message::itch50;
    use crate::types::OrderId;

    fn v50_header(ts: u64) -> itch50::Header {
        itch50::Header {
            stock_locate: 1,
            tracking_number: 0,
            timestamp: ts,
        }
    }

    fn add_order(ts: u64, order_ref: u64, side: Side, price: u32, stock: &str) -> AnyMessage {
        AnyMessage::V50(itch50::Message::AddOrder(itch50::AddOrder {
            header: v50_header(ts),
            order_ref: OrderId(order_ref),
            side,
            shares: 100,
            stock: Symbol(stock.to_string()),
            price,
        }))
    }

    #[test]
    fn add_order_creates_book_and_fires_callback() {
        let mut proc = MarketProcessor::new(Symbol("AAPL".to_string()), 19_000);
        proc.register_subscriber(Box::new(RecordingHandler::default()));
        proc.process_message(add_order(1_000, 1, Side::Bid, 100_000, "AAPL"))
            .unwrap();
        assert_eq!(proc.current_lob().unwrap().best_bid(), Some((100_000, 100)));
    }

    #[test]
    fn flushed_execution_priority_violation_reaches_subscriber_mid_stream() {
        let mut proc = MarketProcessor::new(Symbol("AAPL".to_string()), 19_000);
        let recorder = Box::new(RecordingHandler::default());
        proc.register_subscriber(recorder);

        proc.process_message(add_order(0, 1, Side::Bid, 100_000, "AAPL"))
            .unwrap();
        proc.process_message(add_order(1, 2, Side::Bid, 100_000, "AAPL"))
            .unwrap();

        let execute = |order_ref: u64, ts: u64| {
            AnyMessage::V50(itch50::Message::OrderExecuted(itch50::OrderExecuted {
                header: v50_header(ts),
                order_ref: OrderId(order_ref),
                executed_shares: 10,
                match_number: crate::types::TradeRef(order_ref),
            }))
        };

        // Order 2 executes before order 1 (the head) does: buffered, not flushed yet.
        proc.process_message(execute(2, 2)).unwrap();
        // A later execution strictly at a later timestamp flushes it as genuine.
        proc.process_message(execute(1, 3)).unwrap();

        assert!(proc.processing_done().is_empty());
    }

    #[test]
    fn execute_before_any_add_is_missing_lob() {
        let mut proc = MarketProcessor::new(Symbol("AAPL".to_string()), 19_000);
        let msg = AnyMessage::V50(itch50::Message::OrderExecuted(itch50::OrderExecuted {
            header: v50_header(1_000),
            order_ref: OrderId(1),
            executed_shares: 10,
            match_number: crate::types::TradeRef(1),
        }));
        let err = proc.process_message(msg).unwrap_err();
        assert!(matches!(err, ProcessorError::MissingLob));
    }

    #[test]
    fn trading_status_decision_table() {
        let mut proc = MarketProcessor::new(Symbol("AAPL".to_string()), 19_000);
        let system_event = |code: u8| {
            AnyMessage::V50(itch50::Message::SystemEvent(itch50::SystemEvent {
                header: v50_header(0),
                event_code: code,
            }))
        };
        proc.process_message(system_event(b'S')).unwrap();
        assert_eq!(proc.trading_status(), Some(&TradingStatus::PreTrade(None)));

        proc.process_message(system_event(b'Q')).unwrap();
        assert_eq!(proc.trading_status(), Some(&TradingStatus::PreTrade(None)));

        let action = AnyMessage::V50(itch50::Message::StockTradingAction(itch50::StockTradingAction {
            header: v50_header(0),
            stock: Symbol("AAPL".to_string()),
            trading_state: b'T',
            reason: *b"    ",
        }));
        proc.process_message(action).unwrap();
        assert_eq!(proc.trading_status(), Some(&TradingStatus::Trade(None)));

        proc.process_message(system_event(b'M')).unwrap();
        assert_eq!(proc.trading_status(), Some(&TradingStatus::PostTrade(None)));

        proc.process_message(system_event(b'E')).unwrap();
        assert_eq!(proc.trading_status(), Some(&TradingStatus::PostTrade(None)));
    }

    #[test]
    fn stock_trading_action_is_symbol_filtered() {
        let mut proc = MarketProcessor::new(Symbol("AAPL".to_string()), 19_000);
        let system_event = AnyMessage::V50(itch50::Message::SystemEvent(itch50::SystemEvent {
            header: v50_header(0),
            event_code: b'Q',
        }));
        proc.process_message(system_event).unwrap();
        let action_other_symbol = AnyMessage::V50(itch50::Message::StockTradingAction(
            itch50::StockTradingAction {
                header: v50_header(0),
                stock: Symbol("MSFT".to_string()),
                trading_state: b'H',
                reason: *b"    ",
            },
        ));
        proc.process_message(action_other_symbol).unwrap();
        assert_eq!(proc.trading_status(), Some(&TradingStatus::PreTrade(None)));
    }
}
