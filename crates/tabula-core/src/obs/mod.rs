//! Observability: runtime counters and sink abstractions.
//!
//! Binder, resolver and cursor code never touch counters directly; they
//! emit [`ObsEvent`]s through [`record`].

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{ClassCounters, EventOps, EventReport};
pub use sink::{ObsEvent, ObsSink, ResolveOutcome, record, with_sink};

/// Snapshot of this thread's counters.
#[must_use]
pub fn report() -> EventReport {
    metrics::report()
}

/// Clear this thread's counters.
pub fn reset() {
    metrics::reset();
}
