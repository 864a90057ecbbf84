//! Public tracking lookups with a paced loading sequence. A newer lookup
//! supersedes any still in flight, and a shown result can follow changes
//! other contexts make to the mirror.

use crate::application::ports::{LoadingProgress, ProgressSink};
use crate::application::services::{LookupResolver, LookupResult, MirrorSubscription};
use crate::shared::error::AppError;
use rand::Rng;
use sl_core::TrackingNumber;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub const LOADING_MESSAGES: [&str; 6] = [
    "Initializing request...",
    "Contacting regional hub...",
    "Securing routing path...",
    "Fetching live status...",
    "Compiling timeline...",
    "Finalizing report...",
];

const DEFAULT_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingPacing {
    pub min: Duration,
    pub max: Duration,
    pub tick: Duration,
}

impl LoadingPacing {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            tick: DEFAULT_TICK,
        }
    }

    pub fn fixed(total: Duration) -> Self {
        Self::new(total, total)
    }

    pub fn immediate() -> Self {
        Self::fixed(Duration::ZERO)
    }

    fn pick_total(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

impl Default for LoadingPacing {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_secs(10))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupAttempt {
    Completed(LookupResult),
    /// A later lookup started before this one finished; its result was
    /// dropped.
    Superseded,
}

pub struct LookupSession {
    resolver: Arc<LookupResolver>,
    pacing: LoadingPacing,
    generation: AtomicU64,
}

impl LookupSession {
    pub fn new(resolver: Arc<LookupResolver>, pacing: LoadingPacing) -> Self {
        Self {
            resolver,
            pacing,
            generation: AtomicU64::new(0),
        }
    }

    pub async fn track(
        &self,
        raw_number: &str,
        sink: &dyn ProgressSink,
    ) -> Result<LookupAttempt, AppError> {
        let number = TrackingNumber::parse(raw_number)
            .map_err(|_| AppError::validation("Please enter a tracking number."))?;
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let total = self.pacing.pick_total();

        let (finished, result) = tokio::join!(
            self.run_progress(token, total, sink),
            self.resolver.resolve(&number)
        );

        if !finished || !self.is_current(token) {
            tracing::debug!(number = %number, "lookup superseded");
            return Ok(LookupAttempt::Superseded);
        }
        Ok(LookupAttempt::Completed(result))
    }

    /// Re-runs the lookup for `raw_number` each time another context changes
    /// the mirror and hands every completed result to `on_result`. Returns
    /// when the subscription closes or a lookup for something else starts.
    pub async fn follow<F>(
        &self,
        mut subscription: MirrorSubscription,
        raw_number: &str,
        sink: &dyn ProgressSink,
        mut on_result: F,
    ) -> Result<(), AppError>
    where
        F: FnMut(LookupResult),
    {
        let number = TrackingNumber::parse(raw_number)
            .map_err(|_| AppError::validation("Please enter a tracking number."))?;
        let mut seen = self.generation.load(Ordering::SeqCst);

        while let Some(event) = subscription.next_foreign().await {
            if !self.is_current(seen) {
                tracing::debug!(number = %number, "follow ended by a newer lookup");
                return Ok(());
            }
            tracing::debug!(number = %number, origin = %event.origin, "mirror changed elsewhere, re-running lookup");

            match self.track(number.as_str(), sink).await? {
                LookupAttempt::Completed(result) => on_result(result),
                LookupAttempt::Superseded => return Ok(()),
            }
            seen = self.generation.load(Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    /// Emits progress until `total` has elapsed. Returns `false` as soon as
    /// a newer lookup takes over.
    async fn run_progress(&self, token: u64, total: Duration, sink: &dyn ProgressSink) -> bool {
        let start = Instant::now();
        loop {
            if !self.is_current(token) {
                return false;
            }

            let elapsed = start.elapsed();
            let fraction = if total.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f64() / total.as_secs_f64()).min(1.0)
            };
            let stage = ((fraction * LOADING_MESSAGES.len() as f64) as usize)
                .min(LOADING_MESSAGES.len() - 1);
            sink.progress(&LoadingProgress {
                percent: (fraction * 100.0).round() as u8,
                stage,
                message: LOADING_MESSAGES[stage],
            });

            if fraction >= 1.0 {
                return true;
            }
            let remaining = total.saturating_sub(elapsed);
            tokio::time::sleep(self.pacing.tick.min(remaining)).await;
        }
    }
}
