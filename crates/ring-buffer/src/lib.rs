//! Fixed-Capacity Ring Buffer
//!
//! Provides a bounded sliding window that evicts its oldest sample in O(1)
//! when a new one is pushed past capacity. Used to smooth noisy per-frame
//! signals (e.g. iris centers) over the last few frames.

mod buffer;

pub use buffer::{RingBuffer, DEFAULT_CAPACITY};
