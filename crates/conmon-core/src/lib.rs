//! # conmon-core
//!
//! The connection state reconciliation engine.
//!
//! - **Reconciler**: turns successive socket-table snapshots into an
//!   identity-preserving, sorted render view with a grace period for
//!   connections that disappear.
//! - **Listening collector**: the stateless listening-socket filter.
//! - **Terminator**: signals a process and its direct children.
//! - **Monitor**: the periodic task that drives one cycle per tick and
//!   publishes immutable views to the presentation layer.
//!
//! OS access goes through the [`source::SnapshotSource`] and
//! [`source::ProcessTree`] traits so every component can be exercised
//! against in-memory fakes.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod listening;
pub mod monitor;
pub mod reconcile;
pub mod services;
pub mod source;
pub mod terminate;
