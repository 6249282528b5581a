//! Optional per-phase resource logging (`--monitor`).

#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

/// 單一階段結束時的快照
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub cpu_percent: f32,
    pub rss_mb: u64,
    pub peak_rss_mb: u64,
    /// 與上一個階段之間的時間
    pub phase_time: Duration,
    pub total_time: Duration,
}

#[cfg(feature = "cli")]
struct Tracker {
    system: System,
    peak_rss_mb: u64,
    last_mark: Instant,
}

/// 每個 pipeline 階段結束時記錄行程資源用量
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    pid: Option<Pid>,
    started: Instant,
    tracker: Option<Mutex<Tracker>>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let started = Instant::now();
        let pid = sysinfo::get_current_pid().ok();
        let tracker = enabled.then(|| {
            let mut system = System::new();
            if let Some(pid) = pid {
                // 第一次刷新作為 CPU 使用率的基準
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            }
            Mutex::new(Tracker {
                system,
                peak_rss_mb: 0,
                last_mark: started,
            })
        });

        Self { pid, started, tracker }
    }

    /// 取得並重設階段計時
    pub fn sample(&self) -> Option<PhaseStats> {
        let pid = self.pid?;
        let mut tracker = self.tracker.as_ref()?.lock().ok()?;
        tracker.system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let (cpu_percent, rss_mb) = {
            let process = tracker.system.process(pid)?;
            (process.cpu_usage(), process.memory() / 1024 / 1024)
        };
        tracker.peak_rss_mb = tracker.peak_rss_mb.max(rss_mb);

        let now = Instant::now();
        let phase_time = now.duration_since(tracker.last_mark);
        tracker.last_mark = now;

        Some(PhaseStats {
            cpu_percent,
            rss_mb,
            peak_rss_mb: tracker.peak_rss_mb,
            phase_time,
            total_time: now.duration_since(self.started),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Phase: {:?}",
                phase,
                stats.cpu_percent,
                stats.rss_mb,
                stats.peak_rss_mb,
                stats.phase_time
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                stats.total_time,
                stats.peak_rss_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tracker.is_some()
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 建置時的空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
