//! State shared between the worker threads and the supervisor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::color_pipeline::PwmColor;

/// A color together with its publish sequence number.
///
/// Sequence 0 is the initial value; every publish increments it by one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Published {
    pub seq: u64,
    pub color: PwmColor,
}

/// Creates the single-slot handoff between the sampling and actuation loops.
///
/// The slot holds one value and a new publish replaces it whole, so a reader
/// sees the latest complete color and may skip superseded ones.
pub fn current_color(initial: PwmColor) -> (ColorPublisher, CurrentColor) {
    let slot = Arc::new(Mutex::new(Published {
        seq: 0,
        color: initial,
    }));
    (
        ColorPublisher {
            slot: Arc::clone(&slot),
        },
        CurrentColor { slot },
    )
}

/// Write side of the current color. There is exactly one per slot.
#[derive(Debug)]
pub struct ColorPublisher {
    slot: Arc<Mutex<Published>>,
}

impl ColorPublisher {
    /// Replaces the current color and returns its sequence number.
    pub fn publish(&self, color: PwmColor) -> u64 {
        let mut slot = self.slot.lock();
        slot.seq += 1;
        slot.color = color;
        slot.seq
    }
}

/// Read side of the current color.
#[derive(Debug, Clone)]
pub struct CurrentColor {
    slot: Arc<Mutex<Published>>,
}

impl CurrentColor {
    pub fn latest(&self) -> Published {
        *self.slot.lock()
    }

    pub fn color(&self) -> PwmColor {
        self.slot.lock().color
    }
}

#[derive(Debug, Default)]
struct SignalInner {
    triggered: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

/// One-way stop request observed by every worker.
///
/// Once triggered it stays triggered. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<SignalInner>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Returns `true` only for the call that set the signal.
    pub fn trigger(&self) -> bool {
        if self.inner.triggered.swap(true, Ordering::SeqCst) {
            return false;
        }
        let _guard = self.inner.lock.lock();
        self.inner.wake.notify_all();
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Sleeps for up to `timeout`, waking early when the signal is triggered.
    ///
    /// Returns whether the signal is set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut guard = self.inner.lock.lock();
        if self.is_triggered() {
            return true;
        }
        self.inner.wake.wait_for(&mut guard, timeout);
        self.is_triggered()
    }
}

/// Counts running workers down to zero so the supervisor can wait on their exit.
#[derive(Debug)]
pub(crate) struct ExitLatch {
    remaining: Mutex<usize>,
    done: Condvar,
}

impl ExitLatch {
    pub(crate) fn new(workers: usize) -> Arc<Self> {
        Arc::new(Self {
            remaining: Mutex::new(workers),
            done: Condvar::new(),
        })
    }

    fn count_down(&self) {
        let mut remaining = self.remaining.lock();
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.done.notify_all();
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        *self.remaining.lock()
    }

    /// Waits up to `timeout` for every worker to exit. Returns `true` once they have.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut remaining = self.remaining.lock();
        if *remaining > 0 {
            self.done.wait_for(&mut remaining, timeout);
        }
        *remaining == 0
    }
}

/// Counts its worker out of the latch when dropped, including during a panic.
pub(crate) struct ExitGuard(pub(crate) Arc<ExitLatch>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.0.count_down();
    }
}
