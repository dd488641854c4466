//! FrameSlot - single-slot, latest-wins frame handoff

use std::sync::Arc;

use contracts::Frame;
use parking_lot::Mutex;

#[derive(Debug)]
struct Published {
    generation: u64,
    frame: Arc<Frame>,
}

/// Holds the most recently completed frame.
///
/// `publish` swaps an `Arc` under the lock, `latest` clones one, so the
/// critical section is O(1) on both sides regardless of frame size.
#[derive(Debug, Clone)]
pub struct FrameSlot {
    inner: Arc<Mutex<Published>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Published {
                generation: 0,
                frame: Arc::new(Frame::empty()),
            })),
        }
    }

    /// Replace the current frame unconditionally
    pub fn publish(&self, frame: Frame) {
        let frame = Arc::new(frame);
        let previous = {
            let mut slot = self.inner.lock();
            slot.generation += 1;
            std::mem::replace(&mut slot.frame, frame)
        };
        // Dropped outside the lock.
        drop(previous);
    }

    /// Current frame, or an empty frame before the first publish
    pub fn latest(&self) -> Arc<Frame> {
        self.inner.lock().frame.clone()
    }

    /// Number of frames published so far
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Generation and frame read under one lock
    pub fn snapshot(&self) -> (u64, Arc<Frame>) {
        let slot = self.inner.lock();
        (slot.generation, slot.frame.clone())
    }
}

impl Default for FrameSlot {
    fn default() -> Self {
        Self::new()
    }
}
