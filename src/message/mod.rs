//! Wire message variants for both supported formats, plus a normalized view
//! ([`Event`]) the market processor dispatches on without caring which
//! format produced it.

pub mod codes;
pub mod itch41;
pub mod itch50;

use crate::types::{Mpid, OrderId, Side, Symbol, TradeRef};

/// A decoded message tagged by which wire format produced it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AnyMessage {
    /// ITCH 4.1 message; timestamp is relative to the last [`itch41::SecondsMarker`].
    V41(itch41::Message),
    /// ITCH 5.0 message; timestamp is nanoseconds since the trading day's midnight.
    V50(itch50::Message),
}

impl AnyMessage {
    /// The wire opcode byte, regardless of format.
    pub fn opcode(&self) -> u8 {
        match self {
            AnyMessage::V41(m) => m.opcode(),
            AnyMessage::V50(m) => m.opcode(),
        }
    }

    /// Validate enumerated code fields for whichever format this is.
    pub fn validate(&self) -> Result<(), crate::error::DecodeError> {
        match self {
            AnyMessage::V41(m) => m.validate(),
            AnyMessage::V50(m) => m.validate(),
        }
    }

    /// Project onto the category the market processor dispatches on,
    /// flattening the two formats' near-identical order-lifecycle payloads
    /// into one shape.
    pub fn event(&self) -> Event {
        match self {
            AnyMessage::V41(m) => event_from_41(m),
            AnyMessage::V50(m) => event_from_50(m),
        }
    }
}

fn event_from_41(m: &itch41::Message) -> Event {
    use itch41::Message as M;
    match m {
        M::SecondsMarker(s) => Event::SecondsMarker { seconds: s.seconds },
        M::SystemEvent(e) => Event::SystemEvent { code: e.event_code },
        M::StockTradingAction(a) => Event::StockTradingAction {
            stock: a.stock.clone(),
            trading_state: a.trading_state,
        },
        M::AddOrder(a) => Event::AddOrder {
            order_ref: a.order_ref,
            side: a.side,
            shares: a.shares,
            stock: a.stock.clone(),
            price: a.price as i64,
            mpid: None,
        },
        M::AddOrderMpid(a) => Event::AddOrder {
            order_ref: a.order_ref,
            side: a.side,
            shares: a.shares,
            stock: a.stock.clone(),
            price: a.price as i64,
            mpid: Some(a.mpid),
        },
        M::OrderExecuted(e) => Event::OrderExecuted {
            order_ref: e.order_ref,
            shares: e.executed_shares,
            match_number: e.match_number,
        },
        M::OrderExecutedWithPrice(e) => Event::OrderExecutedWithPrice {
            order_ref: e.order_ref,
            shares: e.executed_shares,
            match_number: e.match_number,
            price: e.execution_price as i64,
        },
        M::OrderCancel(c) => Event::OrderCancel {
            order_ref: c.order_ref,
            shares: c.cancelled_shares,
        },
        M::OrderDelete(d) => Event::OrderDelete { order_ref: d.order_ref },
        M::OrderReplace(r) => Event::OrderReplace {
            original_order_ref: r.original_order_ref,
            new_order_ref: r.new_order_ref,
            shares: r.shares,
            price: r.price as i64,
        },
        M::TradeNonCross(t) => Event::Trade {
            order_ref: Some(t.order_ref),
            side: Some(t.side),
            shares: t.shares as u64,
            stock: t.stock.clone(),
            price: t.price as i64,
            match_number: t.match_number,
        },
        M::CrossTrade(x) => Event::CrossTrade {
            stock: x.stock.clone(),
            shares: x.shares,
            price: x.cross_price as i64,
            match_number: x.match_number,
        },
        M::BrokenTrade(b) => Event::BrokenTrade { match_number: b.match_number },
        M::StockDirectory(_) | M::RegSho(_) | M::MarketParticipantPosition(_) | M::Noii(_) => {
            Event::Other
        }
    }
}

fn event_from_50(m: &itch50::Message) -> Event {
    use itch50::Message as M;
    match m {
        M::SystemEvent(e) => Event::SystemEvent { code: e.event_code },
        M::StockTradingAction(a) => Event::StockTradingAction {
            stock: a.stock.clone(),
            trading_state: a.trading_state,
        },
        M::AddOrder(a) => Event::AddOrder {
            order_ref: a.order_ref,
            side: a.side,
            shares: a.shares,
            stock: a.stock.clone(),
            price: a.price as i64,
            mpid: None,
        },
        M::AddOrderMpid(a) => Event::AddOrder {
            order_ref: a.order_ref,
            side: a.side,
            shares: a.shares,
            stock: a.stock.clone(),
            price: a.price as i64,
            mpid: Some(a.mpid),
        },
        M::OrderExecuted(e) => Event::OrderExecuted {
            order_ref: e.order_ref,
            shares: e.executed_shares,
            match_number: e.match_number,
        },
        M::OrderExecutedWithPrice(e) => Event::OrderExecutedWithPrice {
            order_ref: e.order_ref,
            shares: e.executed_shares,
            match_number: e.match_number,
            price: e.execution_price as i64,
        },
        M::OrderCancel(c) => Event::OrderCancel {
            order_ref: c.order_ref,
            shares: c.cancelled_shares,
        },
        M::OrderDelete(d) => Event::OrderDelete { order_ref: d.order_ref },
        M::OrderReplace(r) => Event::OrderReplace {
            original_order_ref: r.original_order_ref,
            new_order_ref: r.new_order_ref,
            shares: r.shares,
            price: r.price as i64,
        },
        M::TradeNonCross(t) => Event::Trade {
            order_ref: Some(t.order_ref),
            side: Some(t.side),
            shares: t.shares as u64,
            stock: t.stock.clone(),
            price: t.price as i64,
            match_number: t.match_number,
        },
        M::CrossTrade(x) => Event::CrossTrade {
            stock: x.stock.clone(),
            shares: x.shares,
            price: x.cross_price as i64,
            match_number: x.match_number,
        },
        M::BrokenTrade(b) => Event::BrokenTrade { match_number: b.match_number },
        M::OperationalHalt(h) => Event::OperationalHalt {
            action: h.operational_halt_action,
        },
        M::StockDirectory(_)
        | M::RegSho(_)
        | M::MarketParticipantPosition(_)
        | M::MwcbDeclineLevel(_)
        | M::MwcbStatus(_)
        | M::IpoQuotingPeriod(_)
        | M::LuldAuctionCollar(_)
        | M::Noii(_)
        | M::RetailPriceImprovement(_)
        | M::DirectListingCapitalRaise(_) => Event::Other,
    }
}

/// Format-agnostic dispatch category. Produced by [`AnyMessage::event`];
/// consumed by [`crate::processor::MarketProcessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// ITCH 4.1 seconds marker; establishes the epoch for subsequent timestamps.
    SecondsMarker { seconds: u32 },
    /// System-wide trading event code.
    SystemEvent { code: u8 },
    /// Per-symbol trading action; processor applies only when `stock` matches its instrument.
    StockTradingAction { stock: Symbol, trading_state: u8 },
    /// A new resting order.
    AddOrder {
        order_ref: OrderId,
        side: Side,
        shares: u32,
        stock: Symbol,
        price: i64,
        mpid: Option<Mpid>,
    },
    /// Strict (head-of-queue) execution.
    OrderExecuted {
        order_ref: OrderId,
        shares: u32,
        match_number: TradeRef,
    },
    /// Relaxed (match-by-id) execution at a price other than the order's display price.
    OrderExecutedWithPrice {
        order_ref: OrderId,
        shares: u32,
        match_number: TradeRef,
        price: i64,
    },
    /// Partial cancellation.
    OrderCancel { order_ref: OrderId, shares: u32 },
    /// Full removal.
    OrderDelete { order_ref: OrderId },
    /// Atomic delete-then-add under new identity.
    OrderReplace {
        original_order_ref: OrderId,
        new_order_ref: OrderId,
        shares: u32,
        price: i64,
    },
    /// Non-displayable / hidden-liquidity trade print; no LOB mutation.
    Trade {
        order_ref: Option<OrderId>,
        side: Option<Side>,
        shares: u64,
        stock: Symbol,
        price: i64,
        match_number: TradeRef,
    },
    /// Cross/auction trade print; no LOB mutation.
    CrossTrade {
        stock: Symbol,
        shares: u64,
        price: i64,
        match_number: TradeRef,
    },
    /// A previously reported trade has been broken/busted.
    BrokenTrade { match_number: TradeRef },
    /// ITCH 5.0 operational halt action; feeds the `emc_status` override in
    /// the trading-status decision table.
    OperationalHalt { action: u8 },
    /// A variant the processor only forwards via `message_event` (directory,
    /// RegSHO, participant position, NOII, and ITCH-5.0-only auction/halt messages).
    Other,
}
