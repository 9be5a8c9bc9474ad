//! Optional timing and memory instrumentation around a whole request.
//!
//! This sits outside the top-K interface: the caller wraps any closure and
//! gets a [`ProfileReport`] next to the closure's own result.

use std::time::{Duration, Instant};

use sysinfo::System;

/// Resident memory of the current process, in kilobytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryUsage {
    pub current_kb: u64,
    /// High-water mark, where the platform exposes one
    pub peak_kb: Option<u64>,
}

/// Current RSS via `sysinfo`, plus the peak where the OS reports it
pub fn memory_usage() -> Option<MemoryUsage> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut sys = System::new();
    if !sys.refresh_process(pid) {
        return None;
    }
    let current_kb = sys.process(pid)?.memory() / 1024;

    Some(MemoryUsage {
        current_kb,
        peak_kb: peak_rss_kb().map(|peak| peak.max(current_kb)),
    })
}

#[cfg(target_os = "linux")]
fn peak_rss_kb() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_peak_kb(&status)
}

#[cfg(not(target_os = "linux"))]
fn peak_rss_kb() -> Option<u64> {
    None
}

/// Pull `VmHWM` out of a `/proc/<pid>/status` listing
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_peak_kb(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmHWM:"))?;
    line["VmHWM:".len()..]
        .trim()
        .trim_end_matches("kB")
        .trim()
        .parse()
        .ok()
}

#[derive(Debug, Clone)]
pub struct ProfileReport {
    pub elapsed: Duration,
    pub memory: Option<MemoryUsage>,
    /// Largest line buffer held by the parser, when the caller reports it
    pub peak_buffer_bytes: Option<usize>,
}

impl ProfileReport {
    pub fn format(&self) -> String {
        let mut output = format!("Elapsed: {}ms", self.elapsed.as_millis());

        if let Some(memory) = self.memory {
            output.push_str(&format!(
                "; Memory usage: current={:.2} MB",
                memory.current_kb as f64 / 1024.0
            ));
            if let Some(peak_kb) = memory.peak_kb {
                output.push_str(&format!(", peak={:.2} MB", peak_kb as f64 / 1024.0));
            }
        }

        if let Some(peak) = self.peak_buffer_bytes {
            output.push_str(&format!("; peak line buffer={} bytes", peak));
        }

        output
    }
}

/// Run `f`, measuring wall time and process memory when `enabled`
pub fn profiled<T>(enabled: bool, f: impl FnOnce() -> T) -> (T, Option<ProfileReport>) {
    if !enabled {
        return (f(), None);
    }

    let started = Instant::now();
    let result = f();
    let report = ProfileReport {
        elapsed: started.elapsed(),
        memory: memory_usage(),
        peak_buffer_bytes: None,
    };
    (result, Some(report))
}
