//! Metrics sink boundary, grounded in `icydb-core/src/obs/sink.rs`.
//!
//! The teacher crate erases a `&dyn MetricsSink` reference into a raw pointer
//! stashed in thread-local storage so that canister endpoint code can install
//! a scoped override without threading a sink argument through every call.
//! This crate is not canister-bound and has no single-threaded-execution
//! guarantee to lean on, so the override here is carried by an `Rc<dyn
//! MetricsSink>` instead of an unsafely-erased pointer — same capability,
//! without the `unsafe` block.

use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// TraversalPhase
///

#[derive(Clone, Copy, Debug)]
pub enum TraversalPhase {
    Advance,
    Backtrack,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    AdjacencyPut { reflexive: bool },
    AdjacencyCommit { edges_written: u64 },
    IteratorSeek,
    IteratorMergeFanIn { width: u64 },
    TraversalStep { phase: TraversalPhase, step: u32 },
    TraversalSeekSkip { from_step: u32, to_step: u32 },
    ScopeCleared,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// NoopMetricsSink
///

pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record(&self, _: MetricsEvent) {}
}

///
/// GlobalMetricsSink
///

pub struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        use super::metrics::with_state_mut;

        match event {
            MetricsEvent::AdjacencyPut { reflexive } => with_state_mut(|m| {
                m.adjacency_puts = m.adjacency_puts.saturating_add(1);
                if reflexive {
                    m.adjacency_mirror_puts = m.adjacency_mirror_puts.saturating_add(1);
                }
            }),
            MetricsEvent::AdjacencyCommit { .. } => with_state_mut(|m| {
                m.adjacency_commits = m.adjacency_commits.saturating_add(1);
            }),
            MetricsEvent::IteratorSeek => with_state_mut(|m| {
                m.iterator_seeks = m.iterator_seeks.saturating_add(1);
            }),
            MetricsEvent::IteratorMergeFanIn { width } => with_state_mut(|m| {
                m.iterator_merge_fanin_max = m.iterator_merge_fanin_max.max(width);
            }),
            MetricsEvent::TraversalStep { phase, .. } => with_state_mut(|m| match phase {
                TraversalPhase::Advance => {
                    m.traversal_steps_advanced = m.traversal_steps_advanced.saturating_add(1);
                }
                TraversalPhase::Backtrack => {
                    m.traversal_backtracks = m.traversal_backtracks.saturating_add(1);
                }
            }),
            MetricsEvent::TraversalSeekSkip { .. } => with_state_mut(|m| {
                m.traversal_seek_skips = m.traversal_seek_skips.saturating_add(1);
            }),
            MetricsEvent::ScopeCleared => with_state_mut(|m| {
                m.traversal_scope_clears = m.traversal_scope_clears.saturating_add(1);
            }),
        }
    }
}

pub const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub fn record(event: MetricsEvent) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    if let Some(sink) = override_sink {
        sink.record(event);
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Run a closure with a temporary metrics sink override (test/diagnostic use).
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let result = f();
    SINK_OVERRIDE.with(|cell| *cell.borrow_mut() = prev);
    result
}

///
/// Span
///
/// RAII guard that records a matched advance/backtrack pair around a
/// traversal step, mirroring the teacher's `Span<E: EntityKind>`.
///

pub(crate) struct Span {
    step: u32,
    phase: TraversalPhase,
    finished: bool,
}

impl Span {
    pub(crate) fn new(step: u32, phase: TraversalPhase) -> Self {
        record(MetricsEvent::TraversalStep { phase, step });
        Self {
            step,
            phase,
            finished: false,
        }
    }

    pub(crate) fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        if !self.finished {
            // Dropped without an explicit finish: still counted, since the
            // step was entered regardless of how the caller exits.
            let _ = (self.step, self.phase);
        }
    }
}
