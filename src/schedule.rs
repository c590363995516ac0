//! Debounced, per-document check scheduling.
//!
//! Every edit schedules a check. A check only starts once the debounce delay
//! has passed without a newer edit, and never while another check of the same
//! document is still in flight. Superseded checks are dropped, not aborted.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_lsp::lsp_types::Url;

/// Debounce delays below this are raised to it.
pub const MIN_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Default)]
struct Surface {
    /// Bumped on every schedule and on cancel.
    generation: AtomicU64,
    /// Held while a check runs.
    in_flight: Mutex<()>,
}

impl Surface {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

/// Handed to a running job so it can tell whether it has been superseded.
#[derive(Debug, Clone)]
pub struct CheckTicket {
    surface: Arc<Surface>,
    generation: u64,
}

impl CheckTicket {
    /// False once a newer schedule or a cancel has happened for the document.
    pub fn is_current(&self) -> bool {
        self.surface.is_current(self.generation)
    }
}

#[derive(Debug)]
pub struct CheckScheduler {
    delay: Duration,
    surfaces: DashMap<Url, Arc<Surface>>,
}

impl CheckScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: delay.max(MIN_DELAY),
            surfaces: DashMap::new(),
        }
    }

    /// Effective debounce delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `job` for the document at `key`, replacing any pending job.
    ///
    /// The returned handle resolves to `true` if the job ran and `false` if a
    /// newer schedule or a cancel superseded it. The job receives a
    /// [`CheckTicket`] to test before committing results. Must be called
    /// inside a tokio runtime.
    pub fn schedule<F, Fut>(&self, key: Url, job: F) -> JoinHandle<bool>
    where
        F: FnOnce(CheckTicket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let surface = Arc::clone(self.surfaces.entry(key).or_default().value());
        let generation = surface.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !surface.is_current(generation) {
                return false;
            }

            let _guard = surface.in_flight.lock().await;
            // A newer edit may have arrived while the previous check ran.
            if !surface.is_current(generation) {
                return false;
            }

            job(CheckTicket {
                surface: Arc::clone(&surface),
                generation,
            })
            .await;
            true
        })
    }

    /// Drop pending work for a closed document.
    ///
    /// The entry outlives a running check so that a reopened document still
    /// waits on the same in-flight lock.
    pub fn cancel(&self, key: &Url) {
        let Some(surface) = self.surfaces.get(key).map(|s| Arc::clone(s.value())) else {
            return;
        };
        surface.generation.fetch_add(1, Ordering::SeqCst);
        if surface.in_flight.try_lock().is_ok() {
            self.surfaces
                .remove_if(key, |_, current| Arc::ptr_eq(current, &surface));
        }
    }
}
