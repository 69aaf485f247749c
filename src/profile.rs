//! Scope timing that can be dumped as a Chrome trace (`chrome://tracing`,
//! Perfetto).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::sync::{Mutex, MutexGuard};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResult {
    pub name: String,
    pub start_us: u64,
    pub end_us: u64,
    pub thread_id: u32,
}

/// Collects timed scopes. Shareable across threads by reference.
#[derive(Debug)]
pub struct Profiler {
    epoch: Instant,
    results: Mutex<Vec<ProfileResult>>,
}

impl Default for Profiler {
    fn default() -> Self {
        Profiler::new()
    }
}

fn current_thread_id() -> u32 {
    let mut hasher = DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish() as u32
}

impl Profiler {
    pub fn new() -> Self {
        Profiler {
            epoch: Instant::now(),
            results: Mutex::new(vec![]),
        }
    }

    fn micros_since_epoch(&self, at: Instant) -> u64 {
        at.duration_since(self.epoch).as_micros() as u64
    }

    // A panic while holding the lock cannot leave the vector half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<ProfileResult>> {
        self.results.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn scope(&self, name: impl Into<String>) -> ScopeTimer<'_> {
        ScopeTimer {
            profiler: self,
            name: name.into(),
            start: Instant::now(),
            stopped: false,
        }
    }

    /// Times `f` as a single scope named `name`.
    pub fn time<T>(&self, name: &str, f: impl FnOnce() -> T) -> T {
        let _timer = self.scope(name);
        f()
    }

    pub fn add_result(&self, result: ProfileResult) {
        self.lock().push(result);
    }

    pub fn results(&self) -> Vec<ProfileResult> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Writes every collected scope as trace events and clears the results.
    pub fn write_trace(&self, session: &str, w: impl Write) -> serde_json::Result<()> {
        let results = std::mem::take(&mut *self.lock());
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let trace = Trace {
            other_data: OtherData {
                session_name: session,
                timestamp: timestamp.to_string(),
                version: "1.0",
            },
            trace_events: results.iter().map(TraceEvent::from).collect(),
        };
        serde_json::to_writer(w, &trace)
    }
}

/// Records its lifetime into the owning [`Profiler`] when stopped or dropped.
#[derive(Debug)]
pub struct ScopeTimer<'p> {
    profiler: &'p Profiler,
    name: String,
    start: Instant,
    stopped: bool,
}

impl ScopeTimer<'_> {
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        let end = Instant::now();
        let result = ProfileResult {
            name: std::mem::take(&mut self.name),
            start_us: self.profiler.micros_since_epoch(self.start),
            end_us: self.profiler.micros_since_epoch(end),
            thread_id: current_thread_id(),
        };
        tracing::trace!(scope = %result.name, us = result.end_us - result.start_us, "scope finished");
        self.profiler.add_result(result);
    }
}

impl Drop for ScopeTimer<'_> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OtherData<'a> {
    session_name: &'a str,
    timestamp: String,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Trace<'a> {
    other_data: OtherData<'a>,
    trace_events: Vec<TraceEvent<'a>>,
}

#[derive(Serialize)]
struct TraceEvent<'a> {
    cat: &'static str,
    dur: u64,
    name: &'a str,
    ph: &'static str,
    pid: u32,
    tid: u32,
    ts: u64,
}

impl<'a> From<&'a ProfileResult> for TraceEvent<'a> {
    fn from(result: &'a ProfileResult) -> Self {
        TraceEvent {
            cat: "function",
            dur: result.end_us - result.start_us,
            name: &result.name,
            ph: "X",
            pid: 0,
            tid: result.thread_id,
            ts: result.start_us,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_records_on_drop() {
        let profiler = Profiler::new();
        {
            let _t = profiler.scope("outer");
        }
        let results = profiler.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "outer");
        assert!(results[0].end_us >= results[0].start_us);
    }

    #[test]
    fn stop_records_once() {
        let profiler = Profiler::new();
        let mut timer = profiler.scope("once");
        timer.stop();
        timer.stop();
        drop(timer);
        assert_eq!(profiler.results().len(), 1);
    }

    #[test]
    fn time_returns_closure_value() {
        let profiler = Profiler::new();
        assert_eq!(profiler.time("add", || 2 + 2), 4);
        assert_eq!(profiler.results()[0].name, "add");
    }

    #[test]
    fn trace_is_chrome_format_and_clears() {
        let profiler = Profiler::new();
        profiler.time("parse", || ());
        profiler.time("sum", || ());

        let mut out = vec![];
        profiler.write_trace("test session", &mut out).unwrap();
        assert!(profiler.results().is_empty());

        let trace: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(trace["otherData"]["sessionName"], "test session");
        assert_eq!(trace["otherData"]["version"], "1.0");
        let events = trace["traceEvents"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["name"], "parse");
        assert_eq!(events[0]["ph"], "X");
        assert_eq!(events[0]["cat"], "function");
        assert_eq!(events[1]["name"], "sum");
    }

    #[test]
    fn shared_across_threads() {
        let profiler = Profiler::new();
        std::thread::scope(|s| {
            for i in 0..4 {
                let profiler = &profiler;
                s.spawn(move || profiler.time(&format!("worker {}", i), || ()));
            }
        });
        assert_eq!(profiler.results().len(), 4);
    }
}
