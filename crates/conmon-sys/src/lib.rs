//! # conmon-sys
//!
//! Host adapters behind the `conmon-core` traits.
//!
//! - **`procnet`**: reads `/proc/net/tcp` and `/proc/net/tcp6` and
//!   attributes each socket to its owning process through `/proc/<pid>/fd`.
//! - **`process`**: walks `/proc` for direct children and delivers
//!   `SIGTERM` through `nix`.
//! - **`privilege`**: the startup superuser check.
//!
//! Every reader takes a configurable proc root so it can be pointed at a
//! fixture directory.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod privilege;
pub mod process;
pub mod procnet;
