//! ITCH 5.0 message variants: one `{ opcode, stock_locate, tracking_number,
//! timestamp:u48 }` header shared by every opcode, followed by a per-opcode
//! fixed-size payload.

use crate::error::DecodeError;
use crate::message::codes;
use crate::types::{Mpid, OrderId, Side, Symbol, TradeRef};
use crate::wire::{put_u16, put_u32, put_u48, put_u64, put_side, Cursor};

/// Fields common to every ITCH 5.0 message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Header {
    /// Exchange-internal locate code for the instrument; not used for
    /// routing in this crate (we track exactly one symbol per processor).
    pub stock_locate: u16,
    /// Exchange-internal sequencing aid; opaque to this crate.
    pub tracking_number: u16,
    /// Nanoseconds since the trading day's midnight.
    pub timestamp: u64,
}

impl Header {
    fn decode(c: &mut Cursor) -> Result<Header, DecodeError> {
        Ok(Header {
            stock_locate: c.u16()?,
            tracking_number: c.u16()?,
            timestamp: c.u48()?,
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        put_u16(out, self.stock_locate);
        put_u16(out, self.tracking_number);
        put_u48(out, self.timestamp);
    }
}

macro_rules! symbol_field {
    ($c:expr) => {
        Symbol::from_fixed_width(&$c.fixed::<8>()?)
    };
}

/// System event code (`S`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SystemEvent {
    pub header: Header,
    pub event_code: u8,
}

/// Stock directory (`R`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StockDirectory {
    pub header: Header,
    pub stock: Symbol,
    pub market_category: u8,
    pub financial_status: u8,
    pub round_lot_size: u32,
    pub round_lots_only: u8,
    pub issue_classification: u8,
    pub issue_sub_type: [u8; 2],
    pub authenticity: u8,
    pub short_sale_threshold: u8,
    pub ipo_flag: u8,
    pub luld_ref_price_tier: u8,
    pub etp_flag: u8,
    pub etp_leverage_factor: u32,
    pub inverse_indicator: u8,
}

/// Stock trading action (`H`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StockTradingAction {
    pub header: Header,
    pub stock: Symbol,
    pub trading_state: u8,
    pub reason: [u8; 4],
}

/// Reg SHO short sale price test restriction (`Y`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegSho {
    pub header: Header,
    pub stock: Symbol,
    pub regsho_action: u8,
}

/// Market participant position (`L`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MarketParticipantPosition {
    pub header: Header,
    pub mpid: Mpid,
    pub stock: Symbol,
    pub primary_market_maker: u8,
    pub market_maker_mode: u8,
    pub market_participant_state: u8,
}

/// MWCB decline level (`V`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MwcbDeclineLevel {
    pub header: Header,
    pub level1: u64,
    pub level2: u64,
    pub level3: u64,
}

/// MWCB breach (`W`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MwcbStatus {
    pub header: Header,
    pub breached_level: u8,
}

/// IPO quoting period update (`K`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IpoQuotingPeriod {
    pub header: Header,
    pub stock: Symbol,
    pub ipo_release_time: u32,
    pub ipo_release_qualifier: u8,
    pub ipo_price: u32,
}

/// LULD auction collar (`J`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LuldAuctionCollar {
    pub header: Header,
    pub stock: Symbol,
    pub auction_collar_ref_price: u32,
    pub upper_auction_collar_price: u32,
    pub lower_auction_collar_price: u32,
    pub auction_collar_extension: u32,
}

/// Operational halt (`h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OperationalHalt {
    pub header: Header,
    pub stock: Symbol,
    pub market_code: u8,
    pub operational_halt_action: u8,
}

/// Add order, no MPID attribution (`A`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AddOrder {
    pub header: Header,
    pub order_ref: OrderId,
    pub side: Side,
    pub shares: u32,
    pub stock: Symbol,
    pub price: u32,
}

/// Add order with MPID attribution (`F`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AddOrderMpid {
    pub header: Header,
    pub order_ref: OrderId,
    pub side: Side,
    pub shares: u32,
    pub stock: Symbol,
    pub price: u32,
    pub mpid: Mpid,
}

/// Order executed (`E`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderExecuted {
    pub header: Header,
    pub order_ref: OrderId,
    pub executed_shares: u32,
    pub match_number: TradeRef,
}

/// Order executed at a price different from the order's display price (`C`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderExecutedWithPrice {
    pub header: Header,
    pub order_ref: OrderId,
    pub executed_shares: u32,
    pub match_number: TradeRef,
    pub printable: u8,
    pub execution_price: u32,
}

/// Order cancel, partial (`X`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderCancel {
    pub header: Header,
    pub order_ref: OrderId,
    pub cancelled_shares: u32,
}

/// Order delete, full (`D`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderDelete {
    pub header: Header,
    pub order_ref: OrderId,
}

/// Order replace (`U`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderReplace {
    pub header: Header,
    pub original_order_ref: OrderId,
    pub new_order_ref: OrderId,
    pub shares: u32,
    pub price: u32,
}

/// Trade message for non-displayable / hidden liquidity orders (`P`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TradeNonCross {
    pub header: Header,
    pub order_ref: OrderId,
    pub side: Side,
    pub shares: u32,
    pub stock: Symbol,
    pub price: u32,
    pub match_number: TradeRef,
}

/// Cross trade (`Q`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CrossTrade {
    pub header: Header,
    pub shares: u64,
    pub stock: Symbol,
    pub cross_price: u32,
    pub match_number: TradeRef,
    pub cross_type: u8,
}

/// Broken trade / order execution (`B`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BrokenTrade {
    pub header: Header,
    pub match_number: TradeRef,
}

/// Net order imbalance indicator (`I`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Noii {
    pub header: Header,
    pub paired_shares: u64,
    pub imbalance_shares: u64,
    pub imbalance_direction: u8,
    pub stock: Symbol,
    pub far_price: u32,
    pub near_price: u32,
    pub current_ref_price: u32,
    pub cross_type: u8,
    pub price_variation_indicator: u8,
}

/// Retail price improvement indicator (`N`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RetailPriceImprovement {
    pub header: Header,
    pub stock: Symbol,
    pub interest_flag: u8,
}

/// Direct listing with capital raise price discovery (`O`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DirectListingCapitalRaise {
    pub header: Header,
    pub stock: Symbol,
    pub open_eligibility_status: u8,
    pub min_allowable_price: u32,
    pub max_allowable_price: u32,
    pub near_exec_price: u32,
    pub near_exec_time: u64,
    pub lower_price_range_collar: u32,
    pub upper_price_range_collar: u32,
}

/// Every ITCH 5.0 message variant, tagged by its wire opcode byte.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Message {
    SystemEvent(SystemEvent),
    StockDirectory(StockDirectory),
    StockTradingAction(StockTradingAction),
    RegSho(RegSho),
    MarketParticipantPosition(MarketParticipantPosition),
    MwcbDeclineLevel(MwcbDeclineLevel),
    MwcbStatus(MwcbStatus),
    IpoQuotingPeriod(IpoQuotingPeriod),
    LuldAuctionCollar(LuldAuctionCollar),
    OperationalHalt(OperationalHalt),
    AddOrder(AddOrder),
    AddOrderMpid(AddOrderMpid),
    OrderExecuted(OrderExecuted),
    OrderExecutedWithPrice(OrderExecutedWithPrice),
    OrderCancel(OrderCancel),
    OrderDelete(OrderDelete),
    OrderReplace(OrderReplace),
    TradeNonCross(TradeNonCross),
    CrossTrade(CrossTrade),
    BrokenTrade(BrokenTrade),
    Noii(Noii),
    RetailPriceImprovement(RetailPriceImprovement),
    DirectListingCapitalRaise(DirectListingCapitalRaise),
}

impl Message {
    /// The header common to all variants.
    pub fn header(&self) -> Header {
        match self {
            Message::SystemEvent(m) => m.header,
            Message::StockDirectory(m) => m.header,
            Message::StockTradingAction(m) => m.header,
            Message::RegSho(m) => m.header,
            Message::MarketParticipantPosition(m) => m.header,
            Message::MwcbDeclineLevel(m) => m.header,
            Message::MwcbStatus(m) => m.header,
            Message::IpoQuotingPeriod(m) => m.header,
            Message::LuldAuctionCollar(m) => m.header,
            Message::OperationalHalt(m) => m.header,
            Message::AddOrder(m) => m.header,
            Message::AddOrderMpid(m) => m.header,
            Message::OrderExecuted(m) => m.header,
            Message::OrderExecutedWithPrice(m) => m.header,
            Message::OrderCancel(m) => m.header,
            Message::OrderDelete(m) => m.header,
            Message::OrderReplace(m) => m.header,
            Message::TradeNonCross(m) => m.header,
            Message::CrossTrade(m) => m.header,
            Message::BrokenTrade(m) => m.header,
            Message::Noii(m) => m.header,
            Message::RetailPriceImprovement(m) => m.header,
            Message::DirectListingCapitalRaise(m) => m.header,
        }
    }

    /// The wire opcode byte for this variant.
    pub fn opcode(&self) -> u8 {
        match self {
            Message::SystemEvent(_) => b'S',
            Message::StockDirectory(_) => b'R',
            Message::StockTradingAction(_) => b'H',
            Message::RegSho(_) => b'Y',
            Message::MarketParticipantPosition(_) => b'L',
            Message::MwcbDeclineLevel(_) => b'V',
            Message::MwcbStatus(_) => b'W',
            Message::IpoQuotingPeriod(_) => b'K',
            Message::LuldAuctionCollar(_) => b'J',
            Message::OperationalHalt(_) => b'h',
            Message::AddOrder(_) => b'A',
            Message::AddOrderMpid(_) => b'F',
            Message::OrderExecuted(_) => b'E',
            Message::OrderExecutedWithPrice(_) => b'C',
            Message::OrderCancel(_) => b'X',
            Message::OrderDelete(_) => b'D',
            Message::OrderReplace(_) => b'U',
            Message::TradeNonCross(_) => b'P',
            Message::CrossTrade(_) => b'Q',
            Message::BrokenTrade(_) => b'B',
            Message::Noii(_) => b'I',
            Message::RetailPriceImprovement(_) => b'N',
            Message::DirectListingCapitalRaise(_) => b'O',
        }
    }

    /// Decode a full payload (opcode byte + fixed layout) into a tagged variant.
    pub fn decode(payload: &[u8]) -> Result<Message, DecodeError> {
        if payload.is_empty() {
            return Err(DecodeError::ShortPayload {
                opcode: '\0',
                expected: 1,
                actual: 0,
            });
        }
        let opcode = payload[0] as char;
        let mut c = Cursor::new(&payload[1..], opcode);
        let msg = match payload[0] {
            b'S' => Message::SystemEvent(SystemEvent {
                header: Header::decode(&mut c)?,
                event_code: c.u8()?,
            }),
            b'R' => Message::StockDirectory(StockDirectory {
                header: Header::decode(&mut c)?,
                stock: symbol_field!(c),
                market_category: c.u8()?,
                financial_status: c.u8()?,
                round_lot_size: c.u32()?,
                round_lots_only: c.u8()?,
                issue_classification: c.u8()?,
                issue_sub_type: c.fixed::<2>()?,
                authenticity: c.u8()?,
                short_sale_threshold: c.u8()?,
                ipo_flag: c.u8()?,
                luld_ref_price_tier: c.u8()?,
                etp_flag: c.u8()?,
                etp_leverage_factor: c.u32()?,
                inverse_indicator: c.u8()?,
            }),
            b'H' => Message::StockTradingAction(StockTradingAction {
                header: Header::decode(&mut c)?,
                stock: symbol_field!(c),
                trading_state: c.u8()?,
                reason: {
                    let _reserved = c.u8()?;
                    c.fixed::<4>()?
                },
            }),
            b'Y' => Message::RegSho(RegSho {
                header: Header::decode(&mut c)?,
                stock: symbol_field!(c),
                regsho_action: c.u8()?,
            }),
            b'L' => Message::MarketParticipantPosition(MarketParticipantPosition {
                header: Header::decode(&mut c)?,
                mpid: Mpid(c.fixed::<4>()?),
                stock: symbol_field!(c),
                primary_market_maker: c.u8()?,
                market_maker_mode: c.u8()?,
                market_participant_state: c.u8()?,
            }),
            b'V' => Message::MwcbDeclineLevel(MwcbDeclineLevel {
                header: Header::decode(&mut c)?,
                level1: c.u64()?,
                level2: c.u64()?,
                level3: c.u64()?,
            }),
            b'W' => Message::MwcbStatus(MwcbStatus {
                header: Header::decode(&mut c)?,
                breached_level: c.u8()?,
            }),
            b'K' => Message::IpoQuotingPeriod(IpoQuotingPeriod {
                header: Header::decode(&mut c)?,
                stock: symbol_field!(c),
                ipo_release_time: c.u32()?,
                ipo_release_qualifier: c.u8()?,
                ipo_price: c.u32()?,
            }),
            b'J' => Message::LuldAuctionCollar(LuldAuctionCollar {
                header: Header::decode(&mut c)?,
                stock: symbol_field!(c),
                auction_collar_ref_price: c.u32()?,
                upper_auction_collar_price: c.u32()?,
                lower_auction_collar_price: c.u32()?,
                auction_collar_extension: c.u32()?,
            }),
            b'h' => Message::OperationalHalt(OperationalHalt {
                header: Header::decode(&mut c)?,
                stock: symbol_field!(c),
                market_code: c.u8()?,
                operational_halt_action: c.u8()?,
            }),
            b'A' => Message::AddOrder(AddOrder {
                header: Header::decode(&mut c)?,
                order_ref: OrderId(c.u64()?),
                side: c.side()?,
                shares: c.u32()?,
                stock: symbol_field!(c),
                price: c.u32()?,
            }),
            b'F' => Message::AddOrderMpid(AddOrderMpid {
                header: Header::decode(&mut c)?,
                order_ref: OrderId(c.u64()?),
                side: c.side()?,
                shares: c.u32()?,
                stock: symbol_field!(c),
                price: c.u32()?,
                mpid: Mpid(c.fixed::<4>()?),
            }),
            b'E' => Message::OrderExecuted(OrderExecuted {
                header: Header::decode(&mut c)?,
                order_ref: OrderId(c.u64()?),
                executed_shares: c.u32()?,
                match_number: TradeRef(c.u64()?),
            }),
            b'C' => Message::OrderExecutedWithPrice(OrderExecutedWithPrice {
                header: Header::decode(&mut c)?,
                order_ref: OrderId(c.u64()?),
                executed_shares: c.u32()?,
                match_number: TradeRef(c.u64()?),
                printable: c.u8()?,
                execution_price: c.u32()?,
            }),
            b'X' => Message::OrderCancel(OrderCancel {
                header: Header::decode(&mut c)?,
                order_ref: OrderId(c.u64()?),
                cancelled_shares: c.u32()?,
            }),
            b'D' => Message::OrderDelete(OrderDelete {
                header: Header::decode(&mut c)?,
                order_ref: OrderId(c.u64()?),
            }),
            b'U' => Message::OrderReplace(OrderReplace {
                header: Header::decode(&mut c)?,
                original_order_ref: OrderId(c.u64()?),
                new_order_ref: OrderId(c.u64()?),
                shares: c.u32()?,
                price: c.u32()?,
            }),
            b'P' => Message::TradeNonCross(TradeNonCross {
                header: Header::decode(&mut c)?,
                order_ref: OrderId(c.u64()?),
                side: c.side()?,
                shares: c.u32()?,
                stock: symbol_field!(c),
                price: c.u32()?,
                match_number: TradeRef(c.u64()?),
            }),
            b'Q' => Message::CrossTrade(CrossTrade {
                header: Header::decode(&mut c)?,
                shares: c.u64()?,
                stock: symbol_field!(c),
                cross_price: c.u32()?,
                match_number: TradeRef(c.u64()?),
                cross_type: c.u8()?,
            }),
            b'B' => Message::BrokenTrade(BrokenTrade {
                header: Header::decode(&mut c)?,
                match_number: TradeRef(c.u64()?),
            }),
            b'I' => Message::Noii(Noii {
                header: Header::decode(&mut c)?,
                paired_shares: c.u64()?,
                imbalance_shares: c.u64()?,
                imbalance_direction: c.u8()?,
                stock: symbol_field!(c),
                far_price: c.u32()?,
                near_price: c.u32()?,
                current_ref_price: c.u32()?,
                cross_type: c.u8()?,
                price_variation_indicator: c.u8()?,
            }),
            b'N' => Message::RetailPriceImprovement(RetailPriceImprovement {
                header: Header::decode(&mut c)?,
                stock: symbol_field!(c),
                interest_flag: c.u8()?,
            }),
            b'O' => Message::DirectListingCapitalRaise(DirectListingCapitalRaise {
                header: Header::decode(&mut c)?,
                stock: symbol_field!(c),
                open_eligibility_status: c.u8()?,
                min_allowable_price: c.u32()?,
                max_allowable_price: c.u32()?,
                near_exec_price: c.u32()?,
                near_exec_time: c.u64()?,
                lower_price_range_collar: c.u32()?,
                upper_price_range_collar: c.u32()?,
            }),
            other => return Err(DecodeError::UnknownOpcode(other, opcode)),
        };
        Ok(msg)
    }

    /// Re-encode into `out` (opcode byte followed by the fixed layout),
    /// the inverse of [`Message::decode`].
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode());
        match self {
            Message::SystemEvent(m) => {
                m.header.encode(out);
                out.push(m.event_code);
            }
            Message::StockDirectory(m) => {
                m.header.encode(out);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                out.push(m.market_category);
                out.push(m.financial_status);
                put_u32(out, m.round_lot_size);
                out.push(m.round_lots_only);
                out.push(m.issue_classification);
                out.extend_from_slice(&m.issue_sub_type);
                out.push(m.authenticity);
                out.push(m.short_sale_threshold);
                out.push(m.ipo_flag);
                out.push(m.luld_ref_price_tier);
                out.push(m.etp_flag);
                put_u32(out, m.etp_leverage_factor);
                out.push(m.inverse_indicator);
            }
            Message::StockTradingAction(m) => {
                m.header.encode(out);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                out.push(m.trading_state);
                out.push(b' ');
                out.extend_from_slice(&m.reason);
            }
            Message::RegSho(m) => {
                m.header.encode(out);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                out.push(m.regsho_action);
            }
            Message::MarketParticipantPosition(m) => {
                m.header.encode(out);
                out.extend_from_slice(&m.mpid.0);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                out.push(m.primary_market_maker);
                out.push(m.market_maker_mode);
                out.push(m.market_participant_state);
            }
            Message::MwcbDeclineLevel(m) => {
                m.header.encode(out);
                put_u64(out, m.level1);
                put_u64(out, m.level2);
                put_u64(out, m.level3);
            }
            Message::MwcbStatus(m) => {
                m.header.encode(out);
                out.push(m.breached_level);
            }
            Message::IpoQuotingPeriod(m) => {
                m.header.encode(out);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                put_u32(out, m.ipo_release_time);
                out.push(m.ipo_release_qualifier);
                put_u32(out, m.ipo_price);
            }
            Message::LuldAuctionCollar(m) => {
                m.header.encode(out);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                put_u32(out, m.auction_collar_ref_price);
                put_u32(out, m.upper_auction_collar_price);
                put_u32(out, m.lower_auction_collar_price);
                put_u32(out, m.auction_collar_extension);
            }
            Message::OperationalHalt(m) => {
                m.header.encode(out);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                out.push(m.market_code);
                out.push(m.operational_halt_action);
            }
            Message::AddOrder(m) => {
                m.header.encode(out);
                put_u64(out, m.order_ref.0);
                put_side(out, m.side);
                put_u32(out, m.shares);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                put_u32(out, m.price);
            }
            Message::AddOrderMpid(m) => {
                m.header.encode(out);
                put_u64(out, m.order_ref.0);
                put_side(out, m.side);
                put_u32(out, m.shares);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                put_u32(out, m.price);
                out.extend_from_slice(&m.mpid.0);
            }
            Message::OrderExecuted(m) => {
                m.header.encode(out);
                put_u64(out, m.order_ref.0);
                put_u32(out, m.executed_shares);
                put_u64(out, m.match_number.0);
            }
            Message::OrderExecutedWithPrice(m) => {
                m.header.encode(out);
                put_u64(out, m.order_ref.0);
                put_u32(out, m.executed_shares);
                put_u64(out, m.match_number.0);
                out.push(m.printable);
                put_u32(out, m.execution_price);
            }
            Message::OrderCancel(m) => {
                m.header.encode(out);
                put_u64(out, m.order_ref.0);
                put_u32(out, m.cancelled_shares);
            }
            Message::OrderDelete(m) => {
                m.header.encode(out);
                put_u64(out, m.order_ref.0);
            }
            Message::OrderReplace(m) => {
                m.header.encode(out);
                put_u64(out, m.original_order_ref.0);
                put_u64(out, m.new_order_ref.0);
                put_u32(out, m.shares);
                put_u32(out, m.price);
            }
            Message::TradeNonCross(m) => {
                m.header.encode(out);
                put_u64(out, m.order_ref.0);
                put_side(out, m.side);
                put_u32(out, m.shares);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                put_u32(out, m.price);
                put_u64(out, m.match_number.0);
            }
            Message::CrossTrade(m) => {
                m.header.encode(out);
                put_u64(out, m.shares);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                put_u32(out, m.cross_price);
                put_u64(out, m.match_number.0);
                out.push(m.cross_type);
            }
            Message::BrokenTrade(m) => {
                m.header.encode(out);
                put_u64(out, m.match_number.0);
            }
            Message::Noii(m) => {
                m.header.encode(out);
                put_u64(out, m.paired_shares);
                put_u64(out, m.imbalance_shares);
                out.push(m.imbalance_direction);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                put_u32(out, m.far_price);
                put_u32(out, m.near_price);
                put_u32(out, m.current_ref_price);
                out.push(m.cross_type);
                out.push(m.price_variation_indicator);
            }
            Message::RetailPriceImprovement(m) => {
                m.header.encode(out);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                out.push(m.interest_flag);
            }
            Message::DirectListingCapitalRaise(m) => {
                m.header.encode(out);
                out.extend_from_slice(&m.stock.to_fixed_width(8));
                out.push(m.open_eligibility_status);
                put_u32(out, m.min_allowable_price);
                put_u32(out, m.max_allowable_price);
                put_u32(out, m.near_exec_price);
                put_u64(out, m.near_exec_time);
                put_u32(out, m.lower_price_range_collar);
                put_u32(out, m.upper_price_range_collar);
            }
        }
    }

    /// Validate enumerated code fields against this variant's allowed set.
    /// Orthogonal to decoding: a well-formed frame may still fail validation.
    pub fn validate(&self) -> Result<(), DecodeError> {
        match self {
            Message::SystemEvent(m) => {
                codes::validate_system_event(m.event_code)?;
            }
            Message::StockDirectory(m) => {
                codes::validate_market_category(m.market_category)?;
                codes::validate_financial_status(m.financial_status)?;
                codes::validate_round_lots_only(m.round_lots_only)?;
            }
            Message::StockTradingAction(m) => {
                codes::validate_trading_state(m.trading_state)?;
            }
            Message::MarketParticipantPosition(m) => {
                codes::validate_primary_market_maker(m.primary_market_maker)?;
                codes::validate_market_maker_mode(m.market_maker_mode)?;
                codes::validate_market_participant_state(m.market_participant_state)?;
            }
            Message::CrossTrade(m) => {
                codes::validate_cross_type(m.cross_type)?;
            }
            Message::Noii(m) => {
                codes::validate_cross_type(m.cross_type)?;
            }
            Message::RetailPriceImprovement(m) => {
                codes::validate_interest(m.interest_flag)?;
            }
            _ => {}
        }
        Ok(())
    }
}
