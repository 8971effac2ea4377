//! Instrumentation for the lexing and parsing hot paths.
//!
//! With the `profiler` feature enabled every lexer/parser routine records a
//! `measureme` interval event; the produced trace can be inspected with the
//! `summarize` and `crox` tools. Without the feature this module compiles
//! down to no-ops.

#![allow(missing_copy_implementations, missing_debug_implementations)]

#[cfg(feature = "profiler")]
use measureme::{EventId, Profiler, TimingGuard};
#[cfg(feature = "profiler")]
use once_cell::sync::OnceCell;
use std::fmt::{self, Debug};
#[cfg(feature = "profiler")]
use std::{
    path::Path,
    thread::{current, ThreadId},
};

#[cfg(feature = "profiler")]
pub struct QuollProfiler {
    profiler: Profiler,
}

/// This static instance should never be public, and its only access should be
/// done through the `global()` and `drop()` methods.
#[cfg(feature = "profiler")]
static INSTANCE: OnceCell<QuollProfiler> = OnceCell::new();

#[cfg(feature = "profiler")]
impl QuollProfiler {
    pub fn start_event(&self, label: &str, category: &str) -> TimingGuard<'_> {
        let kind = self.profiler.alloc_string(category);
        let id = EventId::from_label(self.profiler.alloc_string(label));
        let thread_id = Self::thread_id_to_u32(current().id());
        self.profiler
            .start_recording_interval_event(kind, id, thread_id)
    }

    fn default() -> Self {
        let profiler =
            Profiler::new(Path::new("./quoll_trace")).expect("must be able to create trace file");
        Self { profiler }
    }

    pub fn global() -> &'static Self {
        INSTANCE.get_or_init(Self::default)
    }

    fn thread_id_to_u32(tid: ThreadId) -> u32 {
        // currently the only stable way to get a numeric thread id
        unsafe { std::mem::transmute::<ThreadId, u64>(tid) as u32 }
    }
}

impl Debug for QuollProfiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt("no debug implemented", f)
    }
}

#[cfg(not(feature = "profiler"))]
pub struct QuollProfiler;

#[allow(clippy::unused_unit, clippy::unused_self)]
#[cfg(not(feature = "profiler"))]
impl QuollProfiler {
    pub fn start_event(&self, _label: &str, _category: &str) -> () {}

    pub fn global() -> Self {
        Self
    }
}
