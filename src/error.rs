// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Error kinds surfaced at the syscall boundary.
//! OWNERS: capability subsystem
//! PUBLIC API: `Error`
//! DEPENDS_ON: core::fmt
//! INVARIANTS: no variant here represents a partial effect; every
//!   fallible operation in this crate either completes or leaves all
//!   state exactly as it found it.

use core::fmt;

/// Errors this subsystem can return at the syscall boundary.
///
/// `Fatal` is distinct from the rest: it is never returned to a caller.
/// Code paths that would produce it call [`crate::fatal::halt`] instead,
/// which never returns. It is kept here only so `Display`/`Debug` have one
/// place to describe what a halt was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Named fd does not exist, or was reclaimed between check and use.
    BadFd,
    /// fd exists but lacks the rights the syscall requires.
    NotCapable,
    /// Operation itself is disallowed while the thread is in capability mode.
    CapMode,
    /// `cap_getrights` called on a descriptor that is not a capability.
    Inval,
    /// Allocation failure building a slate entry or a capability wrapper.
    NoMem,
    /// The subsystem is compiled out or disabled for this thread.
    NoSys,
    /// A user-space output pointer could not be written.
    Fault,
    /// An invariant was violated; see [`crate::fatal::halt`].
    Fatal,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::BadFd => "bad file descriptor",
            Error::NotCapable => "capability rights do not permit this operation",
            Error::CapMode => "operation forbidden in capability mode",
            Error::Inval => "descriptor is not a capability",
            Error::NoMem => "allocation failure",
            Error::NoSys => "capability subsystem disabled",
            Error::Fault => "bad user-space pointer",
            Error::Fatal => "capability invariant violated",
        };
        f.write_str(msg)
    }
}

pub type Result<T> = core::result::Result<T, Error>;
