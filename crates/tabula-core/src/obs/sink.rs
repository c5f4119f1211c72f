//! Metrics sink boundary.
//!
//! This module is the only bridge between runtime logic and the counter
//! state in `obs::metrics`.
use crate::{
    error::ErrorOrigin,
    obs::metrics::{self, bump},
};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn ObsSink>>> = RefCell::new(None);
}

///
/// ResolveOutcome
/// Which construction strategy decided a `new` call.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolveOutcome {
    PrimaryKeyHit,
    PrimaryKeyMiss,
    Object,
    Hook,
    Empty,
}

///
/// ObsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ObsEvent {
    Bind {
        class: &'static str,
        accessors: usize,
        replaced: bool,
    },
    Resolve {
        class: &'static str,
        outcome: ResolveOutcome,
    },
    Insert {
        class: &'static str,
    },
    Potential {
        class: &'static str,
    },
    CursorRow {
        class: &'static str,
    },
    BindingFault {
        origin: ErrorOrigin,
    },
    ParameterRejected {
        origin: ErrorOrigin,
    },
}

///
/// ObsSink
///

pub trait ObsSink {
    fn record(&self, event: ObsEvent);
}

///
/// GlobalObsSink
/// Default sink that writes into the thread's counter state.
///

pub(crate) struct GlobalObsSink;

impl ObsSink for GlobalObsSink {
    fn record(&self, event: ObsEvent) {
        metrics::with_state_mut(|m| match event {
            ObsEvent::Bind {
                class,
                accessors,
                replaced,
            } => {
                bump(&mut m.ops.binds);
                if replaced {
                    bump(&mut m.ops.table_rebinds);
                }
                let entry = m.classes.entry(class.to_string()).or_default();
                bump(&mut entry.binds);
                entry.accessors = accessors as u64;
            }

            ObsEvent::Resolve { class, outcome } => {
                match outcome {
                    ResolveOutcome::PrimaryKeyHit => bump(&mut m.ops.pk_hits),
                    ResolveOutcome::PrimaryKeyMiss => bump(&mut m.ops.pk_misses),
                    ResolveOutcome::Object => bump(&mut m.ops.object_wraps),
                    ResolveOutcome::Hook => bump(&mut m.ops.hook_rows),
                    ResolveOutcome::Empty => bump(&mut m.ops.empty_resolutions),
                }
                if matches!(
                    outcome,
                    ResolveOutcome::PrimaryKeyHit | ResolveOutcome::Object | ResolveOutcome::Hook
                ) {
                    bump(&mut m.classes.entry(class.to_string()).or_default().resolved);
                }
            }

            ObsEvent::Insert { class } => {
                bump(&mut m.ops.inserts);
                bump(&mut m.classes.entry(class.to_string()).or_default().inserts);
            }

            ObsEvent::Potential { class } => {
                bump(&mut m.ops.potentials);
                bump(&mut m.classes.entry(class.to_string()).or_default().potentials);
            }

            ObsEvent::CursorRow { class } => {
                bump(&mut m.ops.cursor_rows);
                bump(&mut m.classes.entry(class.to_string()).or_default().cursor_rows);
            }

            ObsEvent::BindingFault { .. } => bump(&mut m.ops.binding_faults),

            ObsEvent::ParameterRejected { .. } => bump(&mut m.ops.parameter_errors),
        });
    }
}

/// Route one event to the scoped override, or to the thread's counters.
pub fn record(event: ObsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GlobalObsSink.record(event),
    }
}

/// Run a closure with a temporary sink override on this thread.
pub fn with_sink<T>(sink: Rc<dyn ObsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn ObsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| *cell.borrow_mut() = prev);
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
