//! Single-price FIFO queue of resting orders.
//!
//! Grounded on `original_source/src/meatpy/level.py`'s `Level` class: the
//! six mutation primitives (`enter_quote`, `enter_quote_out_of_order`,
//! `enter_quote_at_position`, `cancel_quote`, `delete_quote`,
//! `execute_trade` split strict/relaxed) translate directly; the teacher's
//! `PriceLevel` (via the external `pricelevel` crate) solves a different
//! problem (concurrent order matching) and isn't reused here — see
//! `DESIGN.md`.

use crate::error::LevelError;
use crate::types::{OrderId, Price, Volume};
use std::collections::VecDeque;

/// A single resting order, as held inside a [`PriceLevel`]'s queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RestingOrder {
    /// Exchange-assigned order reference.
    pub order_id: OrderId,
    /// Nanoseconds since book_date midnight at which this order entered the queue.
    pub entry_ts: i64,
    /// Shares still unexecuted and uncancelled.
    pub remaining_volume: Volume,
}

/// Outcome of a successful `cancel_quote` / `execute_trade*` call: whether
/// the level the order lived in is now empty and must be removed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOutcome {
    /// `true` once the queue this order lived in has become empty.
    pub level_emptied: bool,
}

/// A FIFO queue of [`RestingOrder`]s at a single, immutable price.
///
/// Invariants (enforced by construction/every mutating method): the queue is
/// non-empty while the level exists; entries are in non-decreasing
/// `entry_ts` order; `total_volume()` equals the sum of remaining volumes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PriceLevel {
    price: Price,
    queue: VecDeque<RestingOrder>,
}

impl PriceLevel {
    /// Create a new level at `price`, seeded with a single resting order.
    /// A level is never constructed empty (invariant: "queue is
    /// non-empty while the level exists").
    pub fn new(price: Price, first: RestingOrder) -> PriceLevel {
        let mut queue = VecDeque::with_capacity(4);
        queue.push_back(first);
        PriceLevel { price, queue }
    }

    /// The level's immutable price.
    pub fn price(&self) -> Price {
        self.price
    }

    /// Number of resting orders at this level.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// `true` if this level has no resting orders (should never be observed
    /// by a caller outside the moment of removal — see [`MutationOutcome`]).
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Sum of remaining volumes of all resting orders at this level.
    pub fn total_volume(&self) -> Volume {
        self.queue.iter().map(|o| o.remaining_volume).sum()
    }

    /// Iterate the queue in time-priority order (head first).
    pub fn orders(&self) -> impl Iterator<Item = &RestingOrder> {
        self.queue.iter()
    }

    /// The order at the head of the queue (best time priority), if any.
    pub fn head(&self) -> Option<&RestingOrder> {
        self.queue.front()
    }

    fn position_of(&self, order_id: OrderId) -> Option<usize> {
        self.queue.iter().position(|o| o.order_id == order_id)
    }

    /// Append to the queue tail. Caller guarantees `ts >= tail.ts`; this is
    /// the normal, in-order case.
    pub fn enter_quote(
        &mut self,
        ts: i64,
        volume: Volume,
        order_id: OrderId,
    ) -> Result<(), LevelError> {
        if volume == 0 {
            return Err(LevelError::ZeroVolume(order_id));
        }
        self.queue.push_back(RestingOrder {
            order_id,
            entry_ts: ts,
            remaining_volume: volume,
        });
        Ok(())
    }

    /// Insert at the first position `j` where `queue[j].ts >= ts`, preserving
    /// time-priority ordering even when the input stream isn't strictly
    /// monotone.
    pub fn enter_quote_out_of_order(
        &mut self,
        ts: i64,
        volume: Volume,
        order_id: OrderId,
    ) -> Result<(), LevelError> {
        if volume == 0 {
            return Err(LevelError::ZeroVolume(order_id));
        }
        let pos = self.queue.iter().position(|o| o.entry_ts >= ts).unwrap_or(self.queue.len());
        self.queue.insert(
            pos,
            RestingOrder {
                order_id,
                entry_ts: ts,
                remaining_volume: volume,
            },
        );
        Ok(())
    }

    /// Insert at a caller-chosen zero-based index. If `check_priority` is
    /// set and `expected_position` disagrees with the index implied by
    /// timestamp ordering, the insertion still happens but
    /// `Err(LevelError::PriorityViolation)` is returned as a diagnostic
    /// (the entry IS applied).
    pub fn enter_quote_at_position(
        &mut self,
        ts: i64,
        volume: Volume,
        order_id: OrderId,
        expected_position: usize,
        check_priority: bool,
    ) -> Result<(), LevelError> {
        if volume == 0 {
            return Err(LevelError::ZeroVolume(order_id));
        }
        let computed_position = self.queue.iter().position(|o| o.entry_ts >= ts).unwrap_or(self.queue.len());
        let insert_at = expected_position.min(self.queue.len());
        self.queue.insert(
            insert_at,
            RestingOrder {
                order_id,
                entry_ts: ts,
                remaining_volume: volume,
            },
        );
        if check_priority && expected_position != computed_position {
            return Err(LevelError::PriorityViolation {
                ts,
                order_id,
                expected_position,
                computed_position,
            });
        }
        Ok(())
    }

    /// Reduce or remove an order by `volume`. `volume < remaining` subtracts;
    /// `volume == remaining` removes; `volume > remaining` removes the order
    /// AND returns `VolumeInconsistency` (the removal still happens).
    pub fn cancel_quote(
        &mut self,
        order_id: OrderId,
        volume: Volume,
    ) -> Result<MutationOutcome, LevelError> {
        let pos = self
            .position_of(order_id)
            .ok_or(LevelError::OrderNotFound(order_id))?;
        let remaining = self.queue[pos].remaining_volume;
        if volume < remaining {
            self.queue[pos].remaining_volume -= volume;
            return Ok(MutationOutcome { level_emptied: false });
        }
        self.queue.remove(pos);
        let level_emptied = self.queue.is_empty();
        if volume > remaining {
            return Err(LevelError::VolumeInconsistency {
                order_id,
                requested: volume,
                remaining,
            });
        }
        Ok(MutationOutcome { level_emptied })
    }

    /// Remove an order unconditionally, regardless of remaining volume.
    pub fn delete_quote(&mut self, order_id: OrderId) -> Result<MutationOutcome, LevelError> {
        let pos = self
            .position_of(order_id)
            .ok_or(LevelError::OrderNotFound(order_id))?;
        self.queue.remove(pos);
        Ok(MutationOutcome {
            level_emptied: self.queue.is_empty(),
        })
    }

    /// Strict execution: `order_id` must be the current queue head. On
    /// mismatch, returns `ExecutionPriority` WITHOUT mutating state.
    pub fn execute_trade(
        &mut self,
        order_id: OrderId,
        volume: Volume,
        ts: i64,
    ) -> Result<MutationOutcome, LevelError> {
        let head = self.queue.front().ok_or(LevelError::OrderNotFound(order_id))?;
        if head.order_id != order_id {
            return Err(LevelError::ExecutionPriority {
                ts,
                order_id,
                actual_head_order_id: head.order_id,
            });
        }
        self.execute_at(0, order_id, volume)
    }

    /// Relaxed execution: matches against `order_id` at whatever position it
    /// currently holds.
    pub fn execute_trade_by_id(
        &mut self,
        order_id: OrderId,
        volume: Volume,
    ) -> Result<MutationOutcome, LevelError> {
        let pos = self
            .position_of(order_id)
            .ok_or(LevelError::OrderNotFound(order_id))?;
        self.execute_at(pos, order_id, volume)
    }

    fn execute_at(
        &mut self,
        pos: usize,
        order_id: OrderId,
        volume: Volume,
    ) -> Result<MutationOutcome, LevelError> {
        let remaining = self.queue[pos].remaining_volume;
        if volume < remaining {
            self.queue[pos].remaining_volume -= volume;
            return Ok(MutationOutcome { level_emptied: false });
        }
        self.queue.remove(pos);
        let level_emptied = self.queue.is_empty();
        if volume > remaining {
            return Err(LevelError::VolumeInconsistency {
                order_id,
                requested: volume,
                remaining,
            });
        }
        Ok(MutationOutcome { level_emptied })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: u64, ts: i64, vol: u64) -> RestingOrder {
        RestingOrder {
            order_id: OrderId(id),
            entry_ts: ts,
            remaining_volume: vol,
        }
    }

    #[test]
    fn enter_and_execute_head() {
        let mut level = PriceLevel::new(10_000, order(1, 0, 100));
        level.enter_quote(1, 50, OrderId(2)).unwrap();
        let outcome = level.execute_trade(OrderId(1), 40, 1).unwrap();
        assert!(!outcome.level_emptied);
        assert_eq!(level.head().unwrap().remaining_volume, 60);
    }

    #[test]
    fn execute_non_head_is_priority_violation() {
        let mut level = PriceLevel::new(10_000, order(1, 0, 100));
        level.enter_quote(1, 50, OrderId(2)).unwrap();
        let err = level.execute_trade(OrderId(2), 10, 2).unwrap_err();
        match err {
            LevelError::ExecutionPriority { order_id, actual_head_order_id, .. } => {
                assert_eq!(order_id, OrderId(2));
                assert_eq!(actual_head_order_id, OrderId(1));
            }
            other => panic!("unexpected {other:?}"),
        }
        // state must be unmutated
        assert_eq!(level.head().unwrap().remaining_volume, 100);
    }

    #[test]
    fn cancel_exact_removes_order_and_empties_level() {
        let mut level = PriceLevel::new(10_000, order(1, 0, 100));
        let outcome = level.cancel_quote(OrderId(1), 100).unwrap();
        assert!(outcome.level_emptied);
        assert!(level.is_empty());
    }

    #[test]
    fn cancel_excess_removes_and_errors() {
        let mut level = PriceLevel::new(10_000, order(1, 0, 100));
        let err = level.cancel_quote(OrderId(1), 150).unwrap_err();
        assert!(matches!(err, LevelError::VolumeInconsistency { .. }));
        assert!(level.is_empty());
    }

    #[test]
    fn out_of_order_entry_preserves_time_priority() {
        let mut level = PriceLevel::new(10_000, order(1, 10, 100));
        level.enter_quote_out_of_order(5, 30, OrderId(2)).unwrap();
        let ids: Vec<_> = level.orders().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![OrderId(2), OrderId(1)]);
    }

    #[test]
    fn zero_volume_rejected() {
        let mut level = PriceLevel::new(10_000, order(1, 0, 100));
        let err = level.enter_quote(1, 0, OrderId(2)).unwrap_err();
        assert!(matches!(err, LevelError::ZeroVolume(OrderId(2))));
    }
}
