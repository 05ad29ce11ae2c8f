//! Subscriber capability trait: implement any subset of callbacks, the rest
//! default to no-ops.

use crate::lob::{BufferedViolation, LimitOrderBook};
use crate::message::AnyMessage;
use crate::timestamp::Timestamp;
use crate::types::{OrderId, Price, Side, TradeRef, Volume};

/// Error a subscriber callback may return. The first `Err` a subscriber
/// returns aborts the run.
#[derive(Debug, thiserror::Error)]
#[error("subscriber callback failed: {0}")]
pub struct SubscriberError(pub String);

impl SubscriberError {
    /// Build a subscriber error from any displayable cause.
    pub fn new(msg: impl Into<String>) -> SubscriberError {
        SubscriberError(msg.into())
    }
}

/// Registered against a [`crate::processor::MarketProcessor`] to observe
/// every message and LOB mutation in strict message order. All methods
/// default to no-ops; implement only what you need.
pub trait MarketEventHandler {
    /// Fires before a mutation changes `current_lob`'s timestamp, with the
    /// book's state immediately prior to the change (`None` if no book exists yet).
    fn before_lob_update(
        &mut self,
        _lob: Option<&LimitOrderBook>,
        _new_ts: Timestamp,
    ) -> Result<(), SubscriberError> {
        Ok(())
    }

    /// Fires for every decoded message, regardless of whether it mutates the book.
    fn message_event(&mut self, _ts: Timestamp, _message: &AnyMessage) -> Result<(), SubscriberError> {
        Ok(())
    }

    /// Fires after a successful `enter_quote`.
    fn enter_quote_event(
        &mut self,
        _ts: Timestamp,
        _price: Price,
        _volume: Volume,
        _order_id: OrderId,
        _side: Side,
    ) -> Result<(), SubscriberError> {
        Ok(())
    }

    /// Fires after a successful `cancel_quote`.
    fn cancel_quote_event(
        &mut self,
        _ts: Timestamp,
        _volume: Volume,
        _order_id: OrderId,
        _side: Side,
    ) -> Result<(), SubscriberError> {
        Ok(())
    }

    /// Fires after a successful `delete_quote`.
    fn delete_quote_event(
        &mut self,
        _ts: Timestamp,
        _order_id: OrderId,
        _side: Side,
    ) -> Result<(), SubscriberError> {
        Ok(())
    }

    /// Fires after a successful order replace.
    fn replace_quote_event(
        &mut self,
        _ts: Timestamp,
        _orig_id: OrderId,
        _new_id: OrderId,
        _price: Price,
        _volume: Volume,
        _side: Side,
    ) -> Result<(), SubscriberError> {
        Ok(())
    }

    /// Fires after a strict (head-of-queue) execution.
    fn execute_trade_event(
        &mut self,
        _ts: Timestamp,
        _volume: Volume,
        _order_id: OrderId,
        _trade_ref: TradeRef,
        _side: Side,
    ) -> Result<(), SubscriberError> {
        Ok(())
    }

    /// Fires after a relaxed, price-bearing execution.
    fn execute_trade_price_event(
        &mut self,
        _ts: Timestamp,
        _volume: Volume,
        _order_id: OrderId,
        _trade_ref: TradeRef,
        _price: Price,
        _side: Side,
    ) -> Result<(), SubscriberError> {
        Ok(())
    }

    /// Fires for a closing/opening auction print.
    fn auction_trade_event(
        &mut self,
        _ts: Timestamp,
        _volume: Volume,
        _price: Price,
        _bid_id: Option<OrderId>,
        _ask_id: Option<OrderId>,
    ) -> Result<(), SubscriberError> {
        Ok(())
    }

    /// Fires for a crossing-session trade print.
    fn crossing_trade_event(
        &mut self,
        _ts: Timestamp,
        _volume: Volume,
        _price: Price,
        _bid_id: Option<OrderId>,
        _ask_id: Option<OrderId>,
    ) -> Result<(), SubscriberError> {
        Ok(())
    }

    /// Fires for an execution-priority violation flushed off the book's
    /// error buffer, either reconciled against a later strict execution or
    /// flushed outright at end of day (see
    /// [`crate::processor::MarketProcessor::processing_done`]).
    fn execution_priority_violation_event(
        &mut self,
        _ts: Timestamp,
        _violation: &BufferedViolation,
    ) -> Result<(), SubscriberError> {
        Ok(())
    }
}

/// A handler that records every callback it receives, in order. Grounded on
/// the teacher's manager-level `tracing::trace!` logging idiom
/// (`src/orderbook/manager.rs`) — here repurposed as an in-memory sink for
/// tests rather than a log line.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    /// One entry per callback invocation, most recent last.
    pub calls: Vec<String>,
}

impl MarketEventHandler for RecordingHandler {
    fn enter_quote_event(
        &mut self,
        ts: Timestamp,
        price: Price,
        volume: Volume,
        order_id: OrderId,
        side: Side,
    ) -> Result<(), SubscriberError> {
        self.calls.push(format!(
            "enter_quote({ts}, {price}, {volume}, {order_id}, {side})"
        ));
        Ok(())
    }

    fn cancel_quote_event(
        &mut self,
        ts: Timestamp,
        volume: Volume,
        order_id: OrderId,
        side: Side,
    ) -> Result<(), SubscriberError> {
        self.calls
            .push(format!("cancel_quote({ts}, {volume}, {order_id}, {side})"));
        Ok(())
    }

    fn delete_quote_event(
        &mut self,
        ts: Timestamp,
        order_id: OrderId,
        side: Side,
    ) -> Result<(), SubscriberError> {
        self.calls.push(format!("delete_quote({ts}, {order_id}, {side})"));
        Ok(())
    }

    fn execute_trade_event(
        &mut self,
        ts: Timestamp,
        volume: Volume,
        order_id: OrderId,
        trade_ref: TradeRef,
        side: Side,
    ) -> Result<(), SubscriberError> {
        self.calls.push(format!(
            "execute_trade({ts}, {volume}, {order_id}, {trade_ref}, {side})"
        ));
        Ok(())
    }

    fn execution_priority_violation_event(
        &mut self,
        ts: Timestamp,
        violation: &BufferedViolation,
    ) -> Result<(), SubscriberError> {
        self.calls.push(format!(
            "execution_priority_violation({ts}, order={}, actual_head={})",
            violation.order_id, violation.actual_head_order_id
        ));
        Ok(())
    }
}
