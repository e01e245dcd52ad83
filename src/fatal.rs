// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: The halt path for invariant violations.
//! OWNERS: capability subsystem
//! PUBLIC API: `halt`
//! INVARIANTS: never returns; reserved for bugs, not for any reachable
//!   userland input.
//!
//! A capability wrapper that receives a data operation, or a lookup-hook
//! fd match that finds no corresponding slate entry, means some code path
//! bypassed this subsystem's checks. Both are unreachable from userland
//! for any syscall this crate knows how to check; reaching them means the
//! kernel has a bug serious enough that continuing would be worse than
//! stopping. Propagating an error instead would let a caller treat "the
//! security boundary has a hole in it" like an ordinary failure.

/// Logs `reason` and aborts. The host's own panic handling decides what
/// "aborts" means on a given platform; this crate does not install one.
pub fn halt(reason: &str) -> ! {
    crate::log_error!(target: "capmode::fatal", "{}", reason);
    panic!("capmode: invariant violated: {reason}");
}
