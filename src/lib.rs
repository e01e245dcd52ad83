// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Capsicum-style capability subsystem core: descriptor wrapping,
//! capability-mode syscall interception, and the anti-TOCTOU slate that
//! correlates syscall entry with descriptor dereference.
//! OWNERS: capability subsystem
//! PUBLIC API: see the individual modules; [`Interceptor`], [`Capability`],
//!   [`Rights`] and [`ops::cap_new`]/[`ops::cap_getrights`] are the
//!   entry points a host integration drives from its syscall path.
//! DEPENDS_ON: the [`host`] boundary traits, which a host kernel integration
//!   (out of scope for this crate) binds to its real fd table, credential
//!   container, and file objects.
//!
//! This crate is `no_std` + `alloc`: it assumes a global allocator is
//! available (as it is inside any kernel that would link it) but makes no
//! other assumption about the host. It has no executable entry point of its
//! own — `_start`, panic handling, and console output belong to the host
//! kernel this module is linked into, not to the capability core.
#![cfg_attr(not(test), no_std)]
#![forbid(clippy::unwrap_used)]

extern crate alloc;

pub mod capability;
pub mod error;
pub mod fatal;
pub mod fault;
pub mod hooks;
pub mod host;
pub mod interceptor;
pub mod log;
pub mod ops;
pub mod rights;
pub mod slate;
pub mod syscall_table;

#[cfg(test)]
pub mod testutil;

pub use capability::Capability;
pub use error::{Error, Result};
pub use interceptor::Interceptor;
pub use ops::{cap_getrights, cap_new};
pub use rights::Rights;
