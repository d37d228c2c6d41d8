//! The polling task.
//!
//! A [`Monitor`] owns the snapshot source and the reconciler. Each cycle it
//! takes a snapshot, reconciles it, collects the listening sockets, and
//! publishes the result as an immutable [`MonitorView`] on a `watch`
//! channel. Consumers only ever see complete views.
//!
//! A failed snapshot skips the cycle: nothing is published and the
//! previous view stays current.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use conmon_common::config::MonitorConfig;
use conmon_common::error::Result;
use conmon_common::types::{ListeningSocket, SocketEntry};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::listening;
use crate::reconcile::{Reconciler, RenderView};
use crate::source::SnapshotSource;

/// Everything the presentation layer needs from one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonitorView {
    /// Number of completed cycles; `0` before the first snapshot.
    pub cycle: u64,
    /// When the cycle completed.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Alive and dying connections in render order.
    pub connections: RenderView,
    /// Listening sockets of the latest snapshot.
    pub listening: Vec<ListeningSocket>,
}

/// Receiving end handed to the presentation layer.
pub type ViewReceiver = watch::Receiver<Arc<MonitorView>>;

/// Drives snapshot → reconcile → publish on a fixed interval.
#[derive(Debug)]
pub struct Monitor<S> {
    source: S,
    state: CycleState,
}

/// Everything a cycle touches besides the snapshot source.
#[derive(Debug)]
struct CycleState {
    reconciler: Reconciler,
    interval: Duration,
    cycle: u64,
    publisher: watch::Sender<Arc<MonitorView>>,
}

impl CycleState {
    fn apply(&mut self, snapshot: &[SocketEntry]) -> Arc<MonitorView> {
        let connections = self.reconciler.reconcile(snapshot);
        let listening = listening::collect(snapshot);
        self.cycle += 1;

        let view = Arc::new(MonitorView {
            cycle: self.cycle,
            refreshed_at: Some(Utc::now()),
            connections,
            listening,
        });
        let _ = self.publisher.send_replace(Arc::clone(&view));
        view
    }
}

impl<S: SnapshotSource> Monitor<S> {
    /// Creates a monitor and the receiver its views are published on.
    ///
    /// The receiver initially holds an empty view with `cycle == 0`.
    pub fn new(source: S, config: &MonitorConfig) -> (Self, ViewReceiver) {
        let (publisher, receiver) = watch::channel(Arc::new(MonitorView::default()));
        let monitor = Self {
            source,
            state: CycleState {
                reconciler: Reconciler::from_config(config),
                interval: config.poll_interval(),
                cycle: 0,
                publisher,
            },
        };
        (monitor, receiver)
    }

    /// Runs a single cycle on the calling thread and publishes its view.
    ///
    /// # Errors
    ///
    /// Returns the snapshot source's error; the reconciler state and the
    /// published view are left untouched in that case.
    pub fn tick(&mut self) -> Result<Arc<MonitorView>> {
        let snapshot = self.source.snapshot()?;
        Ok(self.state.apply(&snapshot))
    }

    /// Polls until every receiver has been dropped.
    ///
    /// Snapshots are taken on the blocking pool so a slow `/proc` scan
    /// never occupies a runtime worker.
    pub async fn run(self)
    where
        S: 'static,
    {
        let Self { mut source, mut state } = self;
        let mut interval = tokio::time::interval(state.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(
            interval = ?state.interval,
            grace_ticks = state.reconciler.grace_ticks(),
            "monitor started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                () = state.publisher.closed() => break,
            }
            let taken = tokio::task::spawn_blocking(move || {
                let snapshot = source.snapshot();
                (source, snapshot)
            })
            .await;
            let (returned, snapshot) = match taken {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::error!(cycle = state.cycle, error = %e, "snapshot task failed");
                    break;
                }
            };
            source = returned;
            match snapshot {
                Ok(snapshot) => {
                    let _ = state.apply(&snapshot);
                }
                Err(e) => tracing::warn!(cycle = state.cycle, error = %e, "skipping cycle"),
            }
        }
        tracing::info!(cycles = state.cycle, "monitor stopped");
    }

    /// Spawns [`Monitor::run`] on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<()>
    where
        S: 'static,
    {
        tokio::spawn(self.run())
    }

    /// Read access to the reconciler.
    pub const fn reconciler(&self) -> &Reconciler {
        &self.state.reconciler
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::net::{IpAddr, Ipv4Addr};

    use conmon_common::error::ConmonError;
    use conmon_common::types::ProcessId;

    use super::*;

    const ADDR: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    struct ScriptedSource {
        script: VecDeque<Result<Vec<SocketEntry>>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Vec<SocketEntry>>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl SnapshotSource for ScriptedSource {
        fn snapshot(&mut self) -> Result<Vec<SocketEntry>> {
            self.script.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn unavailable() -> Result<Vec<SocketEntry>> {
        Err(ConmonError::SnapshotUnavailable {
            reason: "table busy".into(),
        })
    }

    fn config(grace: u32) -> MonitorConfig {
        MonitorConfig {
            grace_ticks: grace,
            poll_interval_ms: 5,
        }
    }

    #[test]
    fn tick_publishes_connections_and_listening() {
        let source = ScriptedSource::new(vec![Ok(vec![
            SocketEntry::established(ADDR, 22, ADDR, 41_000, ProcessId::new(100)),
            SocketEntry::listening(ADDR, 22, ProcessId::new(1)),
        ])]);
        let (mut monitor, rx) = Monitor::new(source, &config(3));

        let _ = monitor.tick().expect("tick");
        let view = rx.borrow().clone();
        assert_eq!(view.cycle, 1);
        assert!(view.refreshed_at.is_some());
        assert_eq!(view.connections.len(), 1);
        assert_eq!(view.listening.len(), 1);
    }

    #[test]
    fn failed_snapshot_keeps_previous_view() {
        let source = ScriptedSource::new(vec![
            Ok(vec![SocketEntry::established(ADDR, 22, ADDR, 41_000, ProcessId::new(100))]),
            unavailable(),
        ]);
        let (mut monitor, rx) = Monitor::new(source, &config(3));

        let _ = monitor.tick().expect("first tick");
        let err = monitor.tick().unwrap_err();
        assert!(matches!(err, ConmonError::SnapshotUnavailable { .. }));

        let view = rx.borrow().clone();
        assert_eq!(view.cycle, 1);
        assert_eq!(view.connections.len(), 1);
        assert!(!view.connections.rows()[0].dying);
        assert_eq!(monitor.reconciler().len(), 1);
    }

    #[test]
    fn failed_snapshot_does_not_consume_grace() {
        let source = ScriptedSource::new(vec![
            Ok(vec![SocketEntry::established(ADDR, 22, ADDR, 41_000, ProcessId::new(100))]),
            unavailable(),
            unavailable(),
            Ok(Vec::new()),
        ]);
        let (mut monitor, _rx) = Monitor::new(source, &config(2));

        let _ = monitor.tick().expect("first tick");
        assert!(monitor.tick().is_err());
        assert!(monitor.tick().is_err());
        let view = monitor.tick().expect("recovered tick");
        assert_eq!(view.connections.rows()[0].grace_remaining, 1);
    }

    #[tokio::test]
    async fn run_publishes_and_stops_when_receivers_drop() {
        let source = ScriptedSource::new(vec![Ok(vec![SocketEntry::established(
            ADDR,
            443,
            ADDR,
            50_000,
            ProcessId::new(7),
        )])]);
        let (monitor, mut rx) = Monitor::new(source, &config(3));
        let handle = monitor.spawn();

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("view published in time")
            .expect("sender alive");
        assert!(rx.borrow().cycle >= 1);

        drop(rx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("monitor stopped in time")
            .expect("monitor task did not panic");
    }

    struct ThreadRecordingSource {
        seen_on: Arc<std::sync::Mutex<Vec<std::thread::ThreadId>>>,
    }

    impl SnapshotSource for ThreadRecordingSource {
        fn snapshot(&mut self) -> Result<Vec<SocketEntry>> {
            self.seen_on.lock().unwrap().push(std::thread::current().id());
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn run_takes_snapshots_off_the_runtime_thread() {
        let seen_on = Arc::new(std::sync::Mutex::new(Vec::new()));
        let source = ThreadRecordingSource {
            seen_on: Arc::clone(&seen_on),
        };
        let (monitor, mut rx) = Monitor::new(source, &config(3));
        let handle = monitor.spawn();

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("view published in time")
            .expect("sender alive");
        drop(rx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("monitor stopped in time")
            .expect("monitor task did not panic");

        let runtime_thread = std::thread::current().id();
        let seen_on = seen_on.lock().unwrap();
        assert!(!seen_on.is_empty());
        assert!(seen_on.iter().all(|id| *id != runtime_thread));
    }
}
