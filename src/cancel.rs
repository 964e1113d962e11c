//! Cancellation of long-running checks.
//!
//! A [`CancelToken`] is a shared flag. The evaluator polls it while walking a
//! formula, so cancelling the token stops a check between two stack steps and
//! the check reports a timeout. A [`Watchdog`] owns a timer thread that cancels
//! a token once its deadline passes, unless the watchdog is dropped (disarmed)
//! first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{bounded, RecvTimeoutError, Sender};
use log::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Cancels a token when the deadline expires. Dropping the watchdog disarms it.
#[derive(Debug)]
pub struct Watchdog {
    disarm: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Watchdog {
    pub fn arm(deadline: Duration, token: CancelToken) -> Self {
        debug!("watchdog armed for {:?}", deadline);
        let (tx, rx) = bounded::<()>(1);
        let handle = thread::spawn(move || match rx.recv_timeout(deadline) {
            Err(RecvTimeoutError::Timeout) => {
                warn!("watchdog: deadline of {:?} expired, cancelling", deadline);
                token.cancel();
            }
            // Disarmed: explicit signal or sender dropped.
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
        });
        Self {
            disarm: Some(tx),
            handle: Some(handle),
        }
    }

    /// Stops the timer without cancelling the token.
    pub fn disarm(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(tx) = self.disarm.take() {
            let _ = tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}
