// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Deterministic allocation-failure injection for tests.
//! OWNERS: capability subsystem
//! PUBLIC API: `check_alloc`, `failpoints::deny_next_alloc`
//! DEPENDS_ON: core::sync::atomic
//! INVARIANTS: only active when built with the `failpoints` feature;
//!   a denied allocation leaves no partial state behind anywhere it is
//!   checked.
//!
//! Mirrors the single-shot deny-next-operation flag this codebase already
//! uses for IPC fault injection, applied here to the two places this
//! subsystem allocates: a capability wrapper and a slate growth.

#[cfg(feature = "failpoints")]
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "failpoints")]
static DENY_NEXT_ALLOC: AtomicBool = AtomicBool::new(false);

/// Returns `Err(NoMem)` exactly once after [`failpoints::deny_next_alloc`]
/// has been called, and `Ok(())` otherwise. Call immediately before any
/// allocation this subsystem performs on a path the caller must be able to
/// report `NOMEM` from.
pub fn check_alloc() -> crate::error::Result<()> {
    #[cfg(feature = "failpoints")]
    {
        if DENY_NEXT_ALLOC.swap(false, Ordering::SeqCst) {
            return Err(crate::error::Error::NoMem);
        }
    }
    Ok(())
}

#[cfg(feature = "failpoints")]
pub mod failpoints {
    use super::{AtomicBool, Ordering, DENY_NEXT_ALLOC};

    /// Forces the next [`super::check_alloc`] call to fail with `NoMem`.
    pub fn deny_next_alloc() {
        DENY_NEXT_ALLOC.store(true, Ordering::SeqCst);
    }

    /// True if a pending denial has not yet been consumed.
    pub fn pending() -> bool {
        DENY_NEXT_ALLOC.load(Ordering::SeqCst)
    }
}

#[cfg(all(test, feature = "failpoints"))]
mod tests {
    use super::*;

    #[test]
    fn denial_is_single_shot() {
        failpoints::deny_next_alloc();
        assert!(check_alloc().is_err());
        assert!(check_alloc().is_ok());
    }

    #[test]
    fn no_denial_is_ok() {
        assert!(check_alloc().is_ok());
    }
}
