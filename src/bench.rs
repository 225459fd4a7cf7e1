//! Timed forward passes.
//!
//! A single forward pass is too noisy to report (cold caches, lazy
//! allocation inside the runtime, scheduler jitter), so the pass is
//! repeated and the mean reported.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ClassifyError, Result};
use crate::preprocess::Blob;
use crate::traits::InferenceBackend;

/// Default number of timed forward passes.
pub const DEFAULT_ITERATIONS: u32 = 10;

/// Accumulated forward-pass time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timing {
    /// Number of timed passes.
    pub iterations: u32,
    /// Total time spent inside the timed passes.
    pub total: Duration,
}

impl Timing {
    /// Add one measured pass.
    pub fn record(&mut self, elapsed: Duration) {
        self.iterations += 1;
        self.total += elapsed;
    }

    /// Mean pass duration.
    pub fn mean(&self) -> Duration {
        if self.iterations == 0 {
            Duration::ZERO
        } else {
            self.total / self.iterations
        }
    }

    /// Mean pass duration in milliseconds.
    pub fn mean_ms(&self) -> f64 {
        self.mean().as_nanos() as f64 / 1e6
    }
}

impl Serialize for Timing {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("Timing", 3)?;
        s.serialize_field("iterations", &self.iterations)?;
        s.serialize_field("total_ms", &(self.total.as_nanos() as f64 / 1e6))?;
        s.serialize_field("mean_ms", &self.mean_ms())?;
        s.end()
    }
}

/// Run `warmup` untimed passes, then `iterations` timed passes.
///
/// Only the forward call itself is timed. Returns the output of the last
/// pass together with the accumulated timing.
pub fn run_timed<B: InferenceBackend + ?Sized>(
    backend: &mut B,
    input: &Blob,
    iterations: u32,
    warmup: u32,
) -> Result<(Vec<f32>, Timing)> {
    if iterations == 0 {
        return Err(ClassifyError::Configuration(
            "iterations must be at least 1".to_string(),
        ));
    }

    for _ in 0..warmup {
        backend.forward(input)?;
    }

    let mut timing = Timing::default();
    let mut output = Vec::new();
    for i in 0..iterations {
        let start = Instant::now();
        output = backend.forward(input)?;
        let elapsed = start.elapsed();
        timing.record(elapsed);
        trace!(iteration = i, elapsed_us = elapsed.as_micros() as u64, "forward pass");
    }

    debug!(
        backend = backend.name(),
        iterations,
        warmup,
        mean_ms = timing.mean_ms(),
        "timed forward passes"
    );
    Ok((output, timing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    struct Counting {
        calls: u32,
        fail_at: Option<u32>,
    }

    impl InferenceBackend for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn forward(&mut self, _input: &Blob) -> Result<Vec<f32>> {
            self.calls += 1;
            if Some(self.calls) == self.fail_at {
                return Err(ClassifyError::Inference("boom".to_string()));
            }
            std::thread::sleep(Duration::from_millis(1));
            Ok(vec![self.calls as f32])
        }
    }

    fn blob() -> Blob {
        Blob::from(Array4::zeros((1, 3, 2, 2)))
    }

    #[test]
    fn returns_last_output_and_counts_timed_passes() {
        let mut backend = Counting {
            calls: 0,
            fail_at: None,
        };
        let (out, timing) = run_timed(&mut backend, &blob(), 10, 0).unwrap();
        assert_eq!(out, vec![10.0]);
        assert_eq!(timing.iterations, 10);
        assert!(timing.mean_ms() > 0.0);
    }

    #[test]
    fn warmup_is_not_timed() {
        let mut backend = Counting {
            calls: 0,
            fail_at: None,
        };
        let (out, timing) = run_timed(&mut backend, &blob(), 3, 2).unwrap();
        assert_eq!(backend.calls, 5);
        assert_eq!(out, vec![5.0]);
        assert_eq!(timing.iterations, 3);
    }

    #[test]
    fn zero_iterations_rejected() {
        let mut backend = Counting {
            calls: 0,
            fail_at: None,
        };
        let err = run_timed(&mut backend, &blob(), 0, 0).unwrap_err();
        assert!(matches!(err, ClassifyError::Configuration(_)));
        assert_eq!(backend.calls, 0);
    }

    #[test]
    fn failure_stops_the_loop() {
        let mut backend = Counting {
            calls: 0,
            fail_at: Some(3),
        };
        assert!(run_timed(&mut backend, &blob(), 10, 0).is_err());
        assert_eq!(backend.calls, 3);
    }

    #[test]
    fn mean_of_empty_timing_is_zero() {
        assert_eq!(Timing::default().mean(), Duration::ZERO);
    }

    #[test]
    fn mean_divides_total() {
        let mut timing = Timing::default();
        timing.record(Duration::from_millis(2));
        timing.record(Duration::from_millis(4));
        assert_eq!(timing.mean(), Duration::from_millis(3));
        assert!((timing.mean_ms() - 3.0).abs() < 1e-9);
    }
}
