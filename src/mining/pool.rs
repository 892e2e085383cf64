use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};

use super::{Miner, Shutdown};
use crate::blockchain::Blockchain;
use crate::error::CryptoError;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The ledger reached its target length.
    Completed,
    /// The wall-clock budget ran out and the workers were cancelled.
    TimedOut,
    /// Cancelled through the shutdown handle before completion.
    Cancelled,
}

/// A fixed number of worker threads taking miners off a shared queue.
///
/// Each worker runs one miner until the chain is complete, then picks up the
/// next queued miner, so with fewer threads than miners the late ones start
/// only when a thread frees up.
#[derive(Debug)]
pub struct MiningPool {
    ledger: Arc<Blockchain>,
    pool_size: usize,
    shutdown: Shutdown,
}

impl MiningPool {
    pub fn new(ledger: Arc<Blockchain>, pool_size: usize) -> Self {
        Self {
            ledger,
            pool_size: pool_size.max(1),
            shutdown: Shutdown::new(),
        }
    }

    /// Handle that stops the run from outside.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Run `miners` until the ledger is complete or `timeout` elapses.
    ///
    /// The first signing-primitive failure cancels every worker and is
    /// returned once they have all stopped.
    pub fn run(&self, miners: &[Miner], timeout: Duration) -> Result<RunOutcome, CryptoError> {
        let queue: Mutex<VecDeque<&Miner>> = Mutex::new(miners.iter().collect());
        let workers = self.pool_size.min(miners.len());
        let deadline = Instant::now() + timeout;
        info!(
            "POOL - {} miners on {} threads, target {} blocks",
            miners.len(),
            workers,
            self.ledger.chain_size()
        );

        let (done_tx, done_rx) = mpsc::channel::<Result<(), CryptoError>>();
        let mut timed_out = false;
        let mut failure = None;

        thread::scope(|scope| {
            for _ in 0..workers {
                let done_tx = done_tx.clone();
                let queue = &queue;
                scope.spawn(move || {
                    let _ = done_tx.send(self.work(queue));
                });
            }
            drop(done_tx);

            for _ in 0..workers {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match done_rx.recv_timeout(remaining) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        self.shutdown.cancel();
                        failure.get_or_insert(e);
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        warn!("POOL - time budget of {timeout:?} exhausted, cancelling");
                        self.shutdown.cancel();
                        timed_out = true;
                        break;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        // workers that finished after the loop stopped listening
        if let Some(e) = first_failure(failure, &done_rx) {
            return Err(e);
        }
        Ok(if self.ledger.is_complete() {
            RunOutcome::Completed
        } else if timed_out {
            RunOutcome::TimedOut
        } else {
            RunOutcome::Cancelled
        })
    }

    fn work(&self, queue: &Mutex<VecDeque<&Miner>>) -> Result<(), CryptoError> {
        loop {
            let next = queue.lock().expect("mutex poisoned").pop_front();
            let Some(miner) = next else {
                return Ok(());
            };
            if let Err(e) = miner.run(&self.ledger, &self.shutdown) {
                error!("POOL - {} aborted the run: {e}", miner.id());
                self.shutdown.cancel();
                return Err(e);
            }
        }
    }
}

/// The failure seen while waiting, else the first one still queued.
fn first_failure(
    seen: Option<CryptoError>,
    done_rx: &Receiver<Result<(), CryptoError>>,
) -> Option<CryptoError> {
    seen.or_else(|| done_rx.try_iter().find_map(Result::err))
}
