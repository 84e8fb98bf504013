//! Fixed-interval sampling loop on a background thread.
//!
//! The sampler owns the metric source for the duration of a run: `start`
//! moves the source into a worker thread that reads every tracked metric
//! once per interval and publishes into the shared store. `stop` flips an
//! atomic flag and joins the worker, so no publish can land after it
//! returns. Cancellation is cooperative at tick boundaries; a read is
//! never interrupted midway.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::error::SampleError;
use crate::metric::Metric;
use crate::snapshot::SnapshotStore;
use crate::source::MetricSource;

/// Slice length for the inter-tick sleep, so a stop request is honored
/// within this bound instead of a full interval later.
const SLEEP_SLICE: Duration = Duration::from_millis(10);

struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Start/stop-controlled periodic sampling driver.
///
/// `Idle → Running → Idle` only; starting while running or stopping while
/// idle is rejected instead of silently stacking loops.
#[derive(Default)]
pub struct Sampler {
    worker: Mutex<Option<Worker>>,
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin the sampling loop, taking ownership of `source`.
    ///
    /// Returns `AlreadyRunning` when a loop is active; the running loop is
    /// unaffected and `source` is dropped.
    pub fn start(
        &self,
        source: Box<dyn MetricSource>,
        store: Arc<SnapshotStore>,
        interval: Duration,
    ) -> Result<(), SampleError> {
        let mut worker = self.worker.lock().unwrap();
        if worker.is_some() {
            return Err(SampleError::AlreadyRunning);
        }

        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || run_loop(source, store, interval, flag));

        *worker = Some(Worker { stop, handle });
        Ok(())
    }

    /// Terminate the loop and join the worker thread.
    ///
    /// An in-flight tick finishes its reads; once this returns, no further
    /// publish occurs. Returns `NotRunning` when idle.
    pub fn stop(&self) -> Result<(), SampleError> {
        let worker = self.worker.lock().unwrap().take();
        let Some(worker) = worker else {
            return Err(SampleError::NotRunning);
        };

        worker.stop.store(true, Ordering::SeqCst);
        if worker.handle.join().is_err() {
            error!("sampler worker panicked");
        }
        Ok(())
    }

    /// Whether a sampling loop is active.
    pub fn is_running(&self) -> bool {
        self.worker.lock().unwrap().is_some()
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        if let Ok(worker) = self.worker.get_mut()
            && let Some(worker) = worker.take()
        {
            worker.stop.store(true, Ordering::SeqCst);
            let _ = worker.handle.join();
        }
    }
}

fn run_loop(
    source: Box<dyn MetricSource>,
    store: Arc<SnapshotStore>,
    interval: Duration,
    stop: Arc<AtomicBool>,
) {
    debug!("sampler loop started: {} every {interval:?}", source.name());

    while !stop.load(Ordering::SeqCst) {
        let tick_started = Instant::now();

        for metric in Metric::ALL {
            match source.read(metric) {
                Ok(reading) => store.publish(metric, reading),
                Err(err) => {
                    // One failed channel never halts the session.
                    warn!("{metric} sample failed: {err}");
                    store.mark_invalid(metric);
                }
            }
        }

        let deadline = tick_started + interval;
        while Instant::now() < deadline && !stop.load(Ordering::SeqCst) {
            thread::sleep(SLEEP_SLICE);
        }
    }

    debug!("sampler loop stopped: {}", source.name());
}
