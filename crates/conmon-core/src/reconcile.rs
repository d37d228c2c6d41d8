//! Connection state reconciliation.
//!
//! A [`Reconciler`] consumes one socket-table snapshot per cycle and keeps
//! an index of connection records keyed by `(local port, owning pid)`.
//! Records confirmed by the snapshot stay alive with a stable
//! [`ConnectionId`]; records missing from it turn dying and count down a
//! grace period before they are deleted. Every pass ends with a render view
//! sorted by port, then pid.
//!
//! The remote endpoint is deliberately not part of the key: a process that
//! reconnects to another peer from the same local port keeps its record.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::net::IpAddr;

use conmon_common::config::MonitorConfig;
use conmon_common::types::{ProcessId, SocketEntry, SocketState};
use serde::Serialize;

use crate::services;

/// Identity assigned to a connection record when it is created.
///
/// Ids increase monotonically and are never reused by the same reconciler,
/// so a reappearing connection is distinguishable from the one it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Liveness of a record held in the index.
///
/// There is no `Removed` variant: removal is deletion from the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Liveness {
    /// Present in the latest snapshot.
    Alive,
    /// Missing from the latest snapshot, still inside its grace period.
    Dying,
}

/// A tracked established connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    /// Identity of this record instance.
    pub id: ConnectionId,
    /// Local address.
    pub local_addr: IpAddr,
    /// Local port.
    pub local_port: u16,
    /// Remote address observed when the record was created.
    pub remote_addr: IpAddr,
    /// Remote port observed when the record was created.
    pub remote_port: u16,
    /// Owning process.
    pub pid: ProcessId,
    /// Service hint derived from the local port.
    pub annotation: String,
    /// Current liveness.
    pub liveness: Liveness,
    /// Cycles left before a dying record is deleted.
    pub grace_remaining: u32,
}

impl ConnectionRecord {
    fn from_entry(id: ConnectionId, entry: &SocketEntry, grace_ticks: u32) -> Self {
        Self {
            id,
            local_addr: entry.local_addr,
            local_port: entry.local_port,
            remote_addr: entry.remote_addr,
            remote_port: entry.remote_port,
            pid: entry.pid,
            annotation: services::annotate(entry.local_port).to_owned(),
            liveness: Liveness::Alive,
            grace_remaining: grace_ticks,
        }
    }
}

/// Local port → owning pid → record. No inner map is ever left empty.
pub type ConnectionIndex = BTreeMap<u16, BTreeMap<ProcessId, ConnectionRecord>>;

/// One line of the connection table handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderRow {
    /// Position of the row in the view.
    pub index: usize,
    /// Identity of the underlying record.
    pub id: ConnectionId,
    /// Local address.
    pub local_addr: IpAddr,
    /// Local port.
    pub local_port: u16,
    /// Remote address.
    pub remote_addr: IpAddr,
    /// Remote port.
    pub remote_port: u16,
    /// Owning process.
    pub pid: ProcessId,
    /// Service hint.
    pub annotation: String,
    /// Whether the connection vanished and is inside its grace period.
    pub dying: bool,
    /// Cycles left before removal.
    pub grace_remaining: u32,
}

/// Sorted output of one reconcile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderView {
    rows: Vec<RenderRow>,
}

impl RenderView {
    /// Rows in `(local port, pid)` order.
    #[must_use]
    pub fn rows(&self) -> &[RenderRow] {
        &self.rows
    }

    /// Row at the given position.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&RenderRow> {
        self.rows.get(index)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the view has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows flagged as dying.
    #[must_use]
    pub fn dying_count(&self) -> usize {
        self.rows.iter().filter(|r| r.dying).count()
    }
}

/// Owns the connection index and advances it one snapshot at a time.
#[derive(Debug)]
pub struct Reconciler {
    index: ConnectionIndex,
    grace_ticks: u32,
    next_id: u64,
}

impl Reconciler {
    /// Creates an empty reconciler with the given grace period.
    #[must_use]
    pub const fn new(grace_ticks: u32) -> Self {
        Self {
            index: BTreeMap::new(),
            grace_ticks,
            next_id: 1,
        }
    }

    /// Creates an empty reconciler from a validated configuration.
    #[must_use]
    pub const fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.grace_ticks)
    }

    /// Folds one snapshot into the index and returns the resulting view.
    ///
    /// Entries that are not established are skipped, as are established
    /// entries whose owner the kernel has not resolved yet.
    pub fn reconcile(&mut self, snapshot: &[SocketEntry]) -> RenderView {
        let mut confirmed: HashSet<(u16, ProcessId)> = HashSet::new();
        let mut unresolved = 0_usize;

        for entry in snapshot.iter().filter(|e| e.state == SocketState::Established) {
            if entry.pid.is_unresolved() {
                unresolved += 1;
                continue;
            }
            let bucket = self.index.entry(entry.local_port).or_default();
            match bucket.get_mut(&entry.pid) {
                Some(record) if record.liveness == Liveness::Alive => {
                    record.annotation = services::annotate(entry.local_port).to_owned();
                }
                existing => {
                    let id = ConnectionId(self.next_id);
                    self.next_id += 1;
                    let record = ConnectionRecord::from_entry(id, entry, self.grace_ticks);
                    match existing {
                        Some(stale) => {
                            tracing::debug!(
                                port = entry.local_port,
                                pid = %entry.pid,
                                old = %stale.id,
                                new = %id,
                                "connection reappeared during grace period"
                            );
                            *stale = record;
                        }
                        None => {
                            tracing::debug!(
                                port = entry.local_port,
                                pid = %entry.pid,
                                id = %id,
                                "new connection"
                            );
                            let _ = bucket.insert(entry.pid, record);
                        }
                    }
                }
            }
            let _ = confirmed.insert((entry.local_port, entry.pid));
        }

        let mut expired = 0_usize;
        self.index.retain(|&port, bucket| {
            bucket.retain(|&pid, record| {
                if confirmed.contains(&(port, pid)) {
                    return true;
                }
                record.liveness = Liveness::Dying;
                record.grace_remaining = record.grace_remaining.saturating_sub(1);
                if record.grace_remaining == 0 {
                    tracing::debug!(port, pid = %pid, id = %record.id, "connection removed");
                    expired += 1;
                    false
                } else {
                    true
                }
            });
            !bucket.is_empty()
        });

        let view = self.render();
        tracing::trace!(
            rows = view.len(),
            dying = view.dying_count(),
            expired,
            unresolved,
            "reconcile pass complete"
        );
        view
    }

    /// Builds the render view of the current index without advancing it.
    #[must_use]
    pub fn render(&self) -> RenderView {
        let rows = self
            .index
            .values()
            .flat_map(BTreeMap::values)
            .enumerate()
            .map(|(index, record)| RenderRow {
                index,
                id: record.id,
                local_addr: record.local_addr,
                local_port: record.local_port,
                remote_addr: record.remote_addr,
                remote_port: record.remote_port,
                pid: record.pid,
                annotation: record.annotation.clone(),
                dying: record.liveness == Liveness::Dying,
                grace_remaining: record.grace_remaining,
            })
            .collect();
        RenderView { rows }
    }

    /// Read access to the connection index.
    #[must_use]
    pub const fn index(&self) -> &ConnectionIndex {
        &self.index
    }

    /// Looks up the record for a `(local port, pid)` pair.
    #[must_use]
    pub fn get(&self, local_port: u16, pid: ProcessId) -> Option<&ConnectionRecord> {
        self.index.get(&local_port)?.get(&pid)
    }

    /// Number of records currently tracked, alive or dying.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.values().map(BTreeMap::len).sum()
    }

    /// Whether no records are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Configured grace period.
    #[must_use]
    pub const fn grace_ticks(&self) -> u32 {
        self.grace_ticks
    }
}
