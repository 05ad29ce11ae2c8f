//! Stream-filter writer: re-emits the subset of a framed stream sufficient
//! to reconstruct the book of a target symbol set.
//!
//! Grounded on the teacher's scoped-acquisition-on-drop idiom generalized to
//! a buffered `Write` sink; the order_ref/match_ref tracking-map algorithm
//! has no teacher precedent (a matching engine never re-serializes its
//! input) and is written directly from the per-category rules below.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use crate::error::WriterError;
use crate::message::{itch41, itch50, AnyMessage};
use crate::reader::Format;
use crate::types::{OrderId, Symbol, TradeRef};

/// Whether a decoded message should be retained by the writer, and what
/// order_ref/match_ref bookkeeping its retention implies.
enum Decision {
    /// System-scope: always retained (system event, seconds marker, MWCB, …).
    Always,
    /// Retained only if `Symbol` is in the target set.
    IfTargeted(Symbol),
    /// An add-order: retained (and its `order_ref` tracked) iff `Symbol` is targeted.
    TrackAdd(OrderId, Symbol),
    /// An order-lifecycle message: retained iff `order_ref` is currently tracked.
    IfTracked(OrderId),
    /// An order-delete: retained (and untracked) iff `order_ref` is currently tracked.
    UntrackDelete(OrderId),
    /// An order-replace: retained (re-tracked under the new ref) iff the
    /// original `order_ref` is currently tracked.
    Replace(OrderId, OrderId),
    /// A cross trade: retained (and `match_number` tracked) iff `Symbol` is targeted.
    TrackCross(TradeRef, Symbol),
    /// A broken-trade report: retained iff `match_number` is currently tracked.
    IfMatchTracked(TradeRef),
}

fn classify_41(m: &itch41::Message) -> Decision {
    use itch41::Message as M;
    match m {
        M::SecondsMarker(_) | M::SystemEvent(_) => Decision::Always,
        M::StockDirectory(d) => Decision::IfTargeted(d.stock.clone()),
        M::StockTradingAction(a) => Decision::IfTargeted(a.stock.clone()),
        M::RegSho(r) => Decision::IfTargeted(r.stock.clone()),
        M::MarketParticipantPosition(p) => Decision::IfTargeted(p.stock.clone()),
        M::AddOrder(a) => Decision::TrackAdd(a.order_ref, a.stock.clone()),
        M::AddOrderMpid(a) => Decision::TrackAdd(a.order_ref, a.stock.clone()),
        M::OrderExecuted(e) => Decision::IfTracked(e.order_ref),
        M::OrderExecutedWithPrice(e) => Decision::IfTracked(e.order_ref),
        M::OrderCancel(c) => Decision::IfTracked(c.order_ref),
        M::OrderDelete(d) => Decision::UntrackDelete(d.order_ref),
        M::OrderReplace(r) => Decision::Replace(r.original_order_ref, r.new_order_ref),
        M::TradeNonCross(t) => Decision::IfTargeted(t.stock.clone()),
        M::CrossTrade(x) => Decision::TrackCross(x.match_number, x.stock.clone()),
        M::BrokenTrade(b) => Decision::IfMatchTracked(b.match_number),
        M::Noii(n) => Decision::IfTargeted(n.stock.clone()),
    }
}

fn classify_50(m: &itch50::Message) -> Decision {
    use itch50::Message as M;
    match m {
        M::SystemEvent(_) | M::MwcbDeclineLevel(_) | M::MwcbStatus(_) => Decision::Always,
        M::StockDirectory(d) => Decision::IfTargeted(d.stock.clone()),
        M::StockTradingAction(a) => Decision::IfTargeted(a.stock.clone()),
        M::RegSho(r) => Decision::IfTargeted(r.stock.clone()),
        M::MarketParticipantPosition(p) => Decision::IfTargeted(p.stock.clone()),
        M::IpoQuotingPeriod(k) => Decision::IfTargeted(k.stock.clone()),
        M::LuldAuctionCollar(j) => Decision::IfTargeted(j.stock.clone()),
        M::OperationalHalt(h) => Decision::IfTargeted(h.stock.clone()),
        M::RetailPriceImprovement(n) => Decision::IfTargeted(n.stock.clone()),
        M::DirectListingCapitalRaise(o) => Decision::IfTargeted(o.stock.clone()),
        M::AddOrder(a) => Decision::TrackAdd(a.order_ref, a.stock.clone()),
        M::AddOrderMpid(a) => Decision::TrackAdd(a.order_ref, a.stock.clone()),
        M::OrderExecuted(e) => Decision::IfTracked(e.order_ref),
        M::OrderExecutedWithPrice(e) => Decision::IfTracked(e.order_ref),
        M::OrderCancel(c) => Decision::IfTracked(c.order_ref),
        M::OrderDelete(d) => Decision::UntrackDelete(d.order_ref),
        M::OrderReplace(r) => Decision::Replace(r.original_order_ref, r.new_order_ref),
        M::TradeNonCross(t) => Decision::IfTargeted(t.stock.clone()),
        M::CrossTrade(x) => Decision::TrackCross(x.match_number, x.stock.clone()),
        M::BrokenTrade(b) => Decision::IfMatchTracked(b.match_number),
        M::Noii(n) => Decision::IfTargeted(n.stock.clone()),
    }
}

/// Selects and re-emits the subset of a framed stream needed to reconstruct
/// the book of a target symbol set, buffering output and flushing in
/// batches of at least `batch_size` retained messages.
pub struct ItchWriter<W: Write> {
    out: W,
    format: Format,
    targets: HashSet<Symbol>,
    order_symbol: HashMap<OrderId, Symbol>,
    match_symbol: HashMap<TradeRef, Symbol>,
    batch: Vec<u8>,
    batched: usize,
    batch_size: usize,
}

impl<W: Write> ItchWriter<W> {
    /// Create a writer that retains only messages relevant to `targets`,
    /// flushing every `batch_size` retained messages.
    pub fn new(out: W, format: Format, targets: HashSet<Symbol>, batch_size: usize) -> ItchWriter<W> {
        ItchWriter {
            out,
            format,
            targets,
            order_symbol: HashMap::new(),
            match_symbol: HashMap::new(),
            batch: Vec::new(),
            batched: 0,
            batch_size: batch_size.max(1),
        }
    }

    /// Evaluate one decoded message and, if retained, buffer it for output.
    pub fn process(&mut self, msg: &AnyMessage) -> Result<(), WriterError> {
        let decision = match msg {
            AnyMessage::V41(m) => classify_41(m),
            AnyMessage::V50(m) => classify_50(m),
        };
        let keep = match decision {
            Decision::Always => true,
            Decision::IfTargeted(stock) => self.targets.contains(&stock),
            Decision::TrackAdd(order_ref, stock) => {
                let keep = self.targets.contains(&stock);
                if keep {
                    self.order_symbol.insert(order_ref, stock);
                }
                keep
            }
            Decision::IfTracked(order_ref) => self.order_symbol.contains_key(&order_ref),
            Decision::UntrackDelete(order_ref) => self.order_symbol.remove(&order_ref).is_some(),
            Decision::Replace(original, new_ref) => match self.order_symbol.remove(&original) {
                Some(stock) => {
                    self.order_symbol.insert(new_ref, stock);
                    true
                }
                None => false,
            },
            Decision::TrackCross(match_number, stock) => {
                let keep = self.targets.contains(&stock);
                if keep {
                    self.match_symbol.insert(match_number, stock);
                }
                keep
            }
            Decision::IfMatchTracked(match_number) => self.match_symbol.contains_key(&match_number),
        };
        if keep {
            self.buffer_frame(msg);
            self.batched += 1;
            if self.batched >= self.batch_size {
                self.flush()?;
            }
        }
        Ok(())
    }

    fn buffer_frame(&mut self, msg: &AnyMessage) {
        let mut payload = Vec::new();
        match msg {
            AnyMessage::V41(m) => m.encode(&mut payload),
            AnyMessage::V50(m) => m.encode(&mut payload),
        }
        debug_assert!(payload.len() <= u8::MAX as usize, "every known opcode fits in one byte of length");
        self.batch.push(0x00);
        self.batch.push(payload.len() as u8);
        self.batch.extend_from_slice(&payload);
    }

    /// Write any buffered frames out now, regardless of batch size.
    pub fn flush(&mut self) -> Result<(), WriterError> {
        if !self.batch.is_empty() {
            self.out.write_all(&self.batch)?;
            self.batch.clear();
            self.batched = 0;
        }
        Ok(())
    }

    /// Which wire format this writer re-encodes retained messages as.
    pub fn format(&self) -> Format {
        self.format
    }
}

impl<W: Write> Drop for ItchWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    fn add_order(order_ref: u64, stock: &str) -> AnyMessage {
        AnyMessage::V50(itch50::Message::AddOrder(itch50::AddOrder {
            header: itch50::Header {
                stock_locate: 1,
                tracking_number: 0,
                timestamp: 0,
            },
            order_ref: OrderId(order_ref),
            side: Side::Bid,
            shares: 10,
            stock: Symbol(stock.to_string()),
            price: 100,
        }))
    }

    fn delete(order_ref: u64) -> AnyMessage {
        AnyMessage::V50(itch50::Message::OrderDelete(itch50::OrderDelete {
            header: itch50::Header {
                stock_locate: 1,
                tracking_number: 0,
                timestamp: 0,
            },
            order_ref: OrderId(order_ref),
        }))
    }

    #[test]
    fn retains_only_targeted_symbol_and_its_order_lifecycle() {
        let mut targets = HashSet::new();
        targets.insert(Symbol("AAPL".to_string()));
        let mut out = Vec::new();
        let mut writer = ItchWriter::new(&mut out, Format::Itch50, targets, 1);

        writer.process(&add_order(1, "AAPL")).unwrap();
        writer.process(&add_order(2, "MSFT")).unwrap();
        writer.process(&delete(1)).unwrap();
        writer.process(&delete(2)).unwrap();
        writer.flush().unwrap();

        // Two frames retained: add(1, AAPL) and delete(1); MSFT's pair is dropped.
        let mut reader =
            crate::reader::FramedReader::new(Box::new(std::io::Cursor::new(out)), Format::Itch50).unwrap();
        let first = reader.next_message().unwrap().unwrap();
        assert_eq!(first.opcode(), b'A');
        let second = reader.next_message().unwrap().unwrap();
        assert_eq!(second.opcode(), b'D');
        assert!(reader.next_message().unwrap().is_none());
    }
}
