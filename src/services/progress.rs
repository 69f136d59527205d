//! Progress reporting for story uploads.
//!
//! The upload service reports one step per content type. The CLI shows an
//! `indicatif` bar; tests and dry runs use `NoopProgressReporter`.

use std::sync::Arc;

use async_trait::async_trait;

#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// `current` runs from 0.0 to `total`. Must never fail the caller.
    async fn report(&self, current: f64, total: f64, message: Option<String>);

    async fn step(&self, step: usize, total_steps: usize, message: &str) {
        let current = if total_steps == 0 {
            1.0
        } else {
            step as f64 / total_steps as f64
        };
        self.report(current, 1.0, Some(message.to_string())).await;
    }

    /// Called once the operation is over, whatever its result.
    async fn finish(&self) {}
}

pub struct NoopProgressReporter;

#[async_trait]
impl ProgressReporter for NoopProgressReporter {
    async fn report(&self, _current: f64, _total: f64, _message: Option<String>) {}
}

pub fn noop_progress() -> Arc<dyn ProgressReporter> {
    Arc::new(NoopProgressReporter)
}
