//! Observability boundary.
//!
//! Core graph logic MUST NOT depend on [`metrics`] directly. All
//! instrumentation flows through [`sink::MetricsEvent`] and [`sink::MetricsSink`],
//! following the teacher crate's `obs::sink` / `obs::metrics` split
//! (`icydb-core/src/obs/sink.rs`).

pub mod metrics;
pub mod sink;
