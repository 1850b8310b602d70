//! Flush policies and the background workers behind them.
//!
//! Both workers are plain threads fed by an mpsc channel. Dropping the
//! sending side is the cancellation signal; dropping the worker joins its
//! thread so nothing leaks.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Quiet period used by [`FlushPolicy::default`].
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Controls when the store gets written to disk.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Write once no mutation has arrived for the given quiet period. A burst
    /// of mutations costs one write.
    Debounce(Duration),
    /// Only write on an explicit `flush()` and on shutdown.
    Manual,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        FlushPolicy::Debounce(DEFAULT_DEBOUNCE)
    }
}

/// Runs `flush_fn` once the channel has been quiet for `delay` after at least
/// one poke. Every poke restarts the wait.
pub struct DebounceWorker {
    join_handle: Option<thread::JoinHandle<()>>,
}

impl DebounceWorker {
    /// Spawn the worker. The caller keeps the sender and pokes it with `()`
    /// on every mutation; dropping the sender cancels any pending flush and
    /// stops the thread.
    pub fn start<F>(delay: Duration, flush_fn: F, rx: mpsc::Receiver<()>) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let join_handle = thread::spawn(move || {
            // idle until the first mutation
            while rx.recv().is_ok() {
                // armed: keep waiting while pokes keep coming
                loop {
                    match rx.recv_timeout(delay) {
                        Ok(()) => continue,
                        Err(mpsc::RecvTimeoutError::Timeout) => {
                            flush_fn();
                            break;
                        }
                        Err(mpsc::RecvTimeoutError::Disconnected) => return,
                    }
                }
            }
        });

        Self {
            join_handle: Some(join_handle),
        }
    }
}

impl Drop for DebounceWorker {
    fn drop(&mut self) {
        if let Some(h) = self.join_handle.take() {
            let _ = h.join();
        }
    }
}

/// Calls `tick_fn` every `interval` until dropped.
pub struct IntervalWorker {
    tx: Option<mpsc::SyncSender<()>>,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl IntervalWorker {
    /// Spawn a worker that owns both ends of its stop channel.
    pub fn start<F>(interval: Duration, tick_fn: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel::<()>(0);

        // nothing is ever sent; dropping `tx` is the stop signal
        let join_handle = thread::spawn(move || {
            while let Err(mpsc::RecvTimeoutError::Timeout) = rx.recv_timeout(interval) {
                tick_fn();
            }
        });

        Self {
            tx: Some(tx),
            join_handle: Some(join_handle),
        }
    }
}

impl Drop for IntervalWorker {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(h) = self.join_handle.take() {
            let _ = h.join();
        }
    }
}
