//! Labelled counters and histograms.
//!
//! Metric families are registered once at startup and shared (`Arc`) with the
//! code that records into them. `MetricsRegistry::render` produces the
//! Prometheus text exposition format served on the debug listener.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard};

/// Default latency buckets, in seconds.
pub const DEFAULT_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

type LabelSet = Vec<(String, String)>;

fn label_set(labels: &[(&str, &str)]) -> LabelSet {
    labels
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// Recording must keep working after a panic elsewhere poisoned the lock.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn render_labels(labels: &LabelSet, extra: Option<(&str, String)>) -> String {
    let mut parts: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{k}=\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    if let Some((k, v)) = extra {
        parts.push(format!("{k}=\"{v}\""));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", parts.join(","))
    }
}

/// Monotonic counter family.
#[derive(Debug)]
pub struct CounterVec {
    name: String,
    help: String,
    values: Mutex<BTreeMap<LabelSet, f64>>,
}

impl CounterVec {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            values: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add(&self, labels: &[(&str, &str)], delta: f64) {
        *lock(&self.values).entry(label_set(labels)).or_insert(0.0) += delta;
    }

    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1.0);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> f64 {
        lock(&self.values)
            .get(&label_set(labels))
            .copied()
            .unwrap_or(0.0)
    }

    /// Sum across every label combination.
    pub fn total(&self) -> f64 {
        lock(&self.values).values().sum()
    }

    fn render(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self.name, self.help);
        let _ = writeln!(out, "# TYPE {} counter", self.name);
        for (labels, value) in lock(&self.values).iter() {
            let _ = writeln!(out, "{}{} {}", self.name, render_labels(labels, None), value);
        }
    }
}

#[derive(Debug, Clone)]
struct HistogramState {
    bucket_counts: Vec<u64>,
    count: u64,
    sum: f64,
}

/// Cumulative histogram family.
#[derive(Debug)]
pub struct HistogramVec {
    name: String,
    help: String,
    buckets: Vec<f64>,
    values: Mutex<BTreeMap<LabelSet, HistogramState>>,
}

impl HistogramVec {
    pub fn new(name: impl Into<String>, help: impl Into<String>, buckets: &[f64]) -> Self {
        let mut buckets = buckets.to_vec();
        buckets.sort_by(|a, b| a.total_cmp(b));
        Self {
            name: name.into(),
            help: help.into(),
            buckets,
            values: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn observe(&self, labels: &[(&str, &str)], value: f64) {
        let mut values = lock(&self.values);
        let state = values
            .entry(label_set(labels))
            .or_insert_with(|| HistogramState {
                bucket_counts: vec![0; self.buckets.len()],
                count: 0,
                sum: 0.0,
            });
        for (idx, bound) in self.buckets.iter().enumerate() {
            if value <= *bound {
                state.bucket_counts[idx] += 1;
            }
        }
        state.count += 1;
        state.sum += value;
    }

    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        lock(&self.values)
            .get(&label_set(labels))
            .map(|s| s.count)
            .unwrap_or(0)
    }

    pub fn sum(&self, labels: &[(&str, &str)]) -> f64 {
        lock(&self.values)
            .get(&label_set(labels))
            .map(|s| s.sum)
            .unwrap_or(0.0)
    }

    /// Observations across every label combination.
    pub fn total_count(&self) -> u64 {
        lock(&self.values).values().map(|s| s.count).sum()
    }

    fn render(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self.name, self.help);
        let _ = writeln!(out, "# TYPE {} histogram", self.name);
        for (labels, state) in lock(&self.values).iter() {
            for (bound, count) in self.buckets.iter().zip(&state.bucket_counts) {
                let _ = writeln!(
                    out,
                    "{}_bucket{} {}",
                    self.name,
                    render_labels(labels, Some(("le", bound.to_string()))),
                    count
                );
            }
            let _ = writeln!(
                out,
                "{}_bucket{} {}",
                self.name,
                render_labels(labels, Some(("le", "+Inf".to_string()))),
                state.count
            );
            let _ = writeln!(out, "{}_sum{} {}", self.name, render_labels(labels, None), state.sum);
            let _ = writeln!(out, "{}_count{} {}", self.name, render_labels(labels, None), state.count);
        }
    }
}

/// Process-wide registry of metric families under one namespace.
#[derive(Debug)]
pub struct MetricsRegistry {
    namespace: String,
    counters: Mutex<Vec<Arc<CounterVec>>>,
    histograms: Mutex<Vec<Arc<HistogramVec>>>,
}

impl MetricsRegistry {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            counters: Mutex::new(Vec::new()),
            histograms: Mutex::new(Vec::new()),
        }
    }

    fn full_name(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}_{}", self.namespace, name)
        }
    }

    /// Register (or fetch the already registered) counter family `name`.
    pub fn counter(&self, name: &str, help: &str) -> Arc<CounterVec> {
        let full = self.full_name(name);
        let mut counters = lock(&self.counters);
        if let Some(existing) = counters.iter().find(|c| c.name == full) {
            return existing.clone();
        }
        let counter = Arc::new(CounterVec::new(full, help));
        counters.push(counter.clone());
        counter
    }

    /// Register (or fetch the already registered) histogram family `name`.
    pub fn histogram(&self, name: &str, help: &str, buckets: &[f64]) -> Arc<HistogramVec> {
        let full = self.full_name(name);
        let mut histograms = lock(&self.histograms);
        if let Some(existing) = histograms.iter().find(|h| h.name == full) {
            return existing.clone();
        }
        let histogram = Arc::new(HistogramVec::new(full, help, buckets));
        histograms.push(histogram.clone());
        histogram
    }

    /// Prometheus text exposition of every registered family.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for counter in lock(&self.counters).iter() {
            counter.render(&mut out);
        }
        for histogram in lock(&self.histograms).iter() {
            histogram.render(&mut out);
        }
        out
    }
}
