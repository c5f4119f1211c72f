use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters. One instance per thread.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct EventState {
    pub(crate) ops: EventOps,
    pub(crate) classes: BTreeMap<String, ClassCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Binder
    pub binds: u64,
    pub table_rebinds: u64,

    // Resolver outcomes
    pub pk_hits: u64,
    pub pk_misses: u64,
    pub object_wraps: u64,
    pub hook_rows: u64,
    pub empty_resolutions: u64,

    // Writes and transient rows
    pub inserts: u64,
    pub potentials: u64,

    // Cursor
    pub cursor_rows: u64,

    // Failures
    pub binding_faults: u64,
    pub parameter_errors: u64,
}

///
/// ClassCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClassCounters {
    pub binds: u64,
    pub accessors: u64,
    pub resolved: u64,
    pub inserts: u64,
    pub potentials: u64,
    pub cursor_rows: u64,
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub classes: BTreeMap<String, ClassCounters>,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

pub(crate) fn report() -> EventReport {
    with_state(|m| EventReport {
        ops: m.ops.clone(),
        classes: m.classes.clone(),
    })
}

pub(crate) fn reset() {
    with_state_mut(|m| *m = EventState::default());
}

pub(crate) fn bump(counter: &mut u64) {
    *counter = counter.saturating_add(1);
}
