//! Market order queue with FIFO ordering
//!
//! Market orders carry no price, so arrival order alone decides priority.
//! The queue is bounded; a full queue refuses new orders outright rather
//! than evicting.

use std::collections::VecDeque;
use types::ids::Uid;

use super::{Head, Order};

/// Bounded FIFO of market orders for one side
#[derive(Debug, Clone)]
pub struct MarketQueue {
    /// Orders in arrival order
    orders: VecDeque<Order>,
    capacity: usize,
}

impl MarketQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            orders: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn is_full(&self) -> bool {
        self.orders.len() >= self.capacity
    }

    /// Append at the back of the queue
    ///
    /// Returns false, leaving the queue untouched, when at capacity.
    pub fn push_back(&mut self, order: Order) -> bool {
        if self.is_full() {
            return false;
        }
        self.orders.push_back(order);
        true
    }

    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    pub(crate) fn front_head(&mut self) -> Option<Head<'_>> {
        self.orders.front_mut().map(|order| Head { price: None, order })
    }

    pub fn pop_front(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    /// Remove an order by uid
    pub fn remove(&mut self, uid: Uid) -> Option<Order> {
        let position = self.orders.iter().position(|order| order.uid == uid)?;
        self.orders.remove(position)
    }

    /// Summed quantity of every queued order
    pub fn total_quantity(&self) -> u64 {
        self.orders.iter().map(|order| u64::from(order.quantity)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }
}
