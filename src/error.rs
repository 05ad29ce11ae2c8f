//! Error hierarchy: one `thiserror` enum per component, composed into a
//! top-level [`Error`].
//!
//! Grounded on the shape of the teacher's `orderbook::OrderBookError`
//! (`src/orderbook/error.rs`, see `TEACHER.txt`) — a flat `#[non_exhaustive]`
//! enum with a `From` impl bridging the layer below — generalized to one
//! enum per subsystem (level/book/decode/processor/writer) since this
//! crate's error surface spans more components than the teacher's single
//! `OrderBook`.

use crate::types::{OrderId, Price, Volume};

/// Errors raised by a single [`crate::level::PriceLevel`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LevelError {
    /// `order_id` does not exist in this level's queue.
    #[error("order {0} not found on level")]
    OrderNotFound(OrderId),

    /// `cancel_quote`/`execute_trade` requested more volume than the order has remaining.
    #[error("volume inconsistency for order {order_id}: requested {requested}, remaining {remaining}")]
    VolumeInconsistency {
        /// Order the operation targeted.
        order_id: OrderId,
        /// Volume the caller requested to remove.
        requested: Volume,
        /// Volume actually remaining on the order before the operation.
        remaining: Volume,
    },

    /// `execute_trade` was not directed at the queue head.
    #[error("execution priority violation: order {order_id} at ts {ts} is not the head (head is {actual_head_order_id})")]
    ExecutionPriority {
        /// Timestamp of the offending execution, in nanoseconds since book_date midnight.
        ts: i64,
        /// Order the caller tried to execute against.
        order_id: OrderId,
        /// The order actually at the head of the queue.
        actual_head_order_id: OrderId,
    },

    /// `enter_quote_at_position` with `check_priority` set disagreed with
    /// the index implied by timestamp ordering. The insertion still
    /// happens; this is carried as a diagnostic, not aborted.
    #[error("priority violation inserting order {order_id} at ts {ts}: expected position {expected_position}, computed {computed_position}")]
    PriorityViolation {
        /// Timestamp of the entry.
        ts: i64,
        /// Order being entered.
        order_id: OrderId,
        /// Position the caller requested.
        expected_position: usize,
        /// Position implied by timestamp ordering.
        computed_position: usize,
    },

    /// An `enter_quote` with `volume == 0` was rejected (strict policy; see
    /// see `recompute_trading_status` for the decision this enforces).
    #[error("order {0} rejected: zero volume")]
    ZeroVolume(OrderId),
}

/// Errors raised by a [`crate::lob::LimitOrderBook`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LobError {
    /// Propagated from the level containing the targeted order.
    #[error(transparent)]
    Level(#[from] LevelError),

    /// `order_id` is not resting anywhere in the book.
    #[error("order {0} not found in book")]
    OrderNotFound(OrderId),

    /// A derived measure (spread, mid-quote, execution price, …) required a
    /// side that is currently empty.
    #[error("value missing: {0} side is empty")]
    ValueMissing(&'static str),

    /// An `enter_quote` targeted a price already resting with a different
    /// side-sign than implied — defensive guard, not reachable through the
    /// normal side-aware insertion path.
    #[error("invalid price level: {0}")]
    InvalidPriceLevel(Price),
}

/// Errors raised while decoding or validating a wire message.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// A framing byte other than `0x00` was encountered.
    #[error("invalid frame: expected 0x00 marker, found {0:#04x}")]
    InvalidFrame(u8),

    /// The opcode byte did not match any known variant for the active format.
    #[error("unknown opcode: {0:#04x} ({1:?})")]
    UnknownOpcode(u8, char),

    /// The payload was shorter than the opcode's fixed wire size.
    #[error("short payload for opcode {opcode:?}: expected at least {expected} bytes, got {actual}")]
    ShortPayload {
        /// The opcode whose fixed-size layout didn't fit.
        opcode: char,
        /// Bytes the layout requires.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// A buy/sell indicator byte was neither `B` nor `S`.
    #[error("invalid side indicator: {0:#04x}")]
    InvalidSide(u8),

    /// An enumerated code field held a byte outside its declared set.
    #[error("invalid enumerated code for {field}: {byte:#04x}")]
    InvalidCode {
        /// Name of the field that failed validation.
        field: &'static str,
        /// The offending byte.
        byte: u8,
    },
}

/// Errors raised by a [`crate::processor::MarketProcessor`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProcessorError {
    /// Propagated from the book a mutation was applied to.
    #[error(transparent)]
    Lob(#[from] LobError),

    /// Propagated from message decoding.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A mutation message (execute/cancel/delete/replace) arrived before any
    /// add-order created a book.
    #[error("no limit order book: cannot apply mutation before the first add-order")]
    MissingLob,

    /// `system_status` / `stock_status` / `emc_status` combined into a
    /// combination the decision table does not map.
    #[error("could not determine trading status: system={system:?} stock={stock:?} emc={emc:?}")]
    InvalidTradingStatus {
        /// Current system-event code, if any.
        system: Option<u8>,
        /// Current stock-trading-action code, if any.
        stock: Option<u8>,
        /// Current EMC status code, if any (ITCH 5.0 only).
        emc: Option<u8>,
    },

    /// A registered subscriber returned an error from a callback; per
    /// this is fatal to the run.
    #[error("subscriber callback failed: {0}")]
    SubscriberAborted(String),
}

/// Errors raised by the stream-filter [`crate::writer::ItchWriter`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WriterError {
    /// Propagated from message decoding while scanning the input stream.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Underlying I/O failure reading the input or writing the output stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Umbrella error type for callers of the library (the CLI binary,
/// integration tests) that don't care which subsystem failed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A book-level failure.
    #[error(transparent)]
    Lob(#[from] LobError),
    /// A decode failure.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A processor-level failure.
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    /// A writer-level failure.
    #[error(transparent)]
    Writer(#[from] WriterError),
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
