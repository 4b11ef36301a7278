//! # Bounded Ring Buffer
//!
//! Fixed-capacity FIFO shared by the position trail and the waveform series.
//! Once full, every push evicts exactly one element from the head.

use std::collections::VecDeque;

/// Position trail capacity (points)
pub const TRAIL_CAPACITY: usize = 150;

/// Waveform series capacity (samples)
pub const WAVEFORM_CAPACITY: usize = 300;

/// Fixed-capacity FIFO with oldest-first eviction.
///
/// # Examples
///
/// ```
/// use groundlink::ring_buffer::RingBuffer;
///
/// let mut buf = RingBuffer::new(2);
/// buf.push(1);
/// buf.push(2);
/// buf.push(3);
/// assert_eq!(buf.to_ordered_vec(), vec![2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    capacity: usize,
    buf: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    /// Creates an empty buffer holding at most `capacity` items.
    ///
    /// A capacity of zero is bumped to one; an always-empty buffer has no use
    /// for either sink.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            buf: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends `item` to the tail, evicting the head if capacity is exceeded.
    ///
    /// Returns the evicted item, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.buf.push_back(item);
        if self.buf.len() > self.capacity {
            self.buf.pop_front()
        } else {
            None
        }
    }

    /// Most recently pushed item.
    pub fn latest(&self) -> Option<&T> {
        self.buf.back()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> RingBuffer<T> {
    /// All retained items, oldest to newest, as handed to a renderer.
    pub fn to_ordered_vec(&self) -> Vec<T> {
        self.buf.iter().cloned().collect()
    }
}
