//! Run-scoped latency sample collection.
//!
//! One `MetricsRegistry` is created per pipeline run and shared (via `Arc`)
//! with every instrumented collaborator. Call sites take an `Instant` before
//! the monitored operation and record the elapsed time on success only; a
//! failed HTTP call contributes no sample. Samples accumulate for the whole
//! run and are flushed to the metrics tables by the Loader.

use chrono::{NaiveDateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;

pub mod api_name {
    pub const SEARCH: &str = "search";
    pub const ITEM_ATTRIBUTES: &str = "item_attributes";
    pub const CURRENCY_CONVERTER: &str = "currency_converter";
}

pub mod table_name {
    pub const ITEMS: &str = "items";
    pub const ITEM_SHIPPING: &str = "item_shipping";
    pub const SELLERS: &str = "sellers";
}

pub mod stage {
    pub const EXTRACT: &str = "extract";
    pub const TRANSFORM: &str = "transform";
    pub const LOAD: &str = "load";
}

/// One (duration, timestamp) sample for a named monitored operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingSample {
    pub name: String,
    pub seconds: f64,
    pub recorded_at: NaiveDateTime,
}

impl TimingSample {
    fn now(name: &str, elapsed: Duration) -> Self {
        Self {
            name: name.to_string(),
            seconds: elapsed.as_secs_f64(),
            recorded_at: Utc::now().naive_utc(),
        }
    }
}

#[derive(Debug, Default)]
struct Samples {
    requests: Vec<TimingSample>,
    inserts: Vec<TimingSample>,
    processes: Vec<TimingSample>,
}

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    samples: Mutex<Samples>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, api: &str, elapsed: Duration) {
        self.lock().requests.push(TimingSample::now(api, elapsed));
    }

    pub fn record_insert(&self, table: &str, elapsed: Duration) {
        self.lock().inserts.push(TimingSample::now(table, elapsed));
    }

    pub fn record_process(&self, stage: &str, elapsed: Duration) {
        self.lock()
            .processes
            .push(TimingSample::now(stage, elapsed));
    }

    pub fn request_samples(&self) -> Vec<TimingSample> {
        self.lock().requests.clone()
    }

    pub fn insert_samples(&self) -> Vec<TimingSample> {
        self.lock().inserts.clone()
    }

    pub fn process_samples(&self) -> Vec<TimingSample> {
        self.lock().processes.clone()
    }

    pub fn reset(&self) {
        let mut samples = self.lock();
        samples.requests.clear();
        samples.inserts.clear();
        samples.processes.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Samples> {
        self.samples.lock().expect("metrics registry lock poisoned")
    }
}
