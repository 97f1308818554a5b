//! Process resource logging around the serving lifecycle.
//!
//! With `--monitor`, one line is logged once the engine is built (model kind,
//! schema width, resident memory) and one at shutdown (peak memory, uptime).

use crate::core::engine::InferenceEngine;

#[cfg(feature = "cli")]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Resource figures for this process at one point in time.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceUsage {
    pub rss_mb: u64,
    pub peak_rss_mb: u64,
    pub cpu_percent: f32,
    pub uptime: Duration,
}

#[cfg(feature = "cli")]
pub struct SystemMonitor {
    // only this process is ever refreshed
    system: Mutex<System>,
    pid: Option<Pid>,
    started: Instant,
    peak_rss_mb: AtomicU64,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            match sysinfo::get_current_pid() {
                Ok(pid) => Some(pid),
                Err(e) => {
                    tracing::warn!("Resource monitor disabled, no PID: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            system: Mutex::new(System::new()),
            pid,
            started: Instant::now(),
            peak_rss_mb: AtomicU64::new(0),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `None` when disabled or when the process cannot be read.
    pub fn sample(&self) -> Option<ResourceUsage> {
        if !self.enabled {
            return None;
        }
        let pid = self.pid?;

        let mut system = self.system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            false,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        let process = system.process(pid)?;

        let rss_mb = process.memory() / 1024 / 1024;
        let peak = self.peak_rss_mb.fetch_max(rss_mb, Ordering::Relaxed).max(rss_mb);

        Some(ResourceUsage {
            rss_mb,
            peak_rss_mb: peak,
            cpu_percent: process.cpu_usage(),
            uptime: self.started.elapsed(),
        })
    }

    /// Log what is about to be served next to what loading it cost.
    pub fn log_loaded(&self, engine: &InferenceEngine) {
        if let Some(usage) = self.sample() {
            tracing::info!(
                "📊 {}",
                loaded_summary(engine.model().kind(), engine.schema().len(), &usage)
            );
        }
    }

    pub fn log_shutdown(&self) {
        if let Some(usage) = self.sample() {
            tracing::info!(
                "📊 Served for {:?}, peak memory {}MB",
                usage.uptime,
                usage.peak_rss_mb
            );
        }
    }
}

#[cfg(feature = "cli")]
fn loaded_summary(model_kind: &str, n_features: usize, usage: &ResourceUsage) -> String {
    format!(
        "Loaded {} model over {} features - memory {}MB, CPU {:.1}%, after {:?}",
        model_kind, n_features, usage.rss_mb, usage.cpu_percent, usage.uptime
    )
}

// no-op when built without the cli feature
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn log_loaded(&self, _engine: &InferenceEngine) {}

    pub fn log_shutdown(&self) {}
}
