//! Metric names and instruments for job processing

use std::time::Instant;

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};

// Job metric names
pub const JOB_COUNT: &str = "tts.job.count";
pub const JOB_DURATION: &str = "tts.job.duration";

// Model metric names
pub const MODEL_LOAD_DURATION: &str = "tts.model.load.duration";

// Transcoder metric names
pub const TRANSCODE_DURATION: &str = "tts.transcode.duration";

/// Instruments recorded by the job handler
///
/// Backed by the global meter provider, so recording is a no-op until
/// telemetry export is configured.
#[derive(Clone)]
pub struct JobMetrics {
    pub jobs: Counter<u64>,
    pub job_duration: Histogram<f64>,
    pub model_load_duration: Histogram<f64>,
    pub transcode_duration: Histogram<f64>,
}

impl JobMetrics {
    pub fn new() -> Self {
        let meter = global::meter("murmur");

        Self {
            jobs: meter
                .u64_counter(JOB_COUNT)
                .with_description("Jobs handled, by outcome")
                .build(),
            job_duration: meter
                .f64_histogram(JOB_DURATION)
                .with_unit("s")
                .with_description("End-to-end job handling time")
                .build(),
            model_load_duration: meter
                .f64_histogram(MODEL_LOAD_DURATION)
                .with_unit("s")
                .build(),
            transcode_duration: meter
                .f64_histogram(TRANSCODE_DURATION)
                .with_unit("s")
                .build(),
        }
    }
}

impl Default for JobMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Record a duration measurement on a histogram
pub fn record_duration(histogram: &Histogram<f64>, start: Instant, attributes: &[KeyValue]) {
    histogram.record(start.elapsed().as_secs_f64(), attributes);
}
