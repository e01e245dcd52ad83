// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: The three security hooks the host calls into: descriptor
//! lookup, descriptor install, and path-component lookup.
//! OWNERS: capability subsystem
//! PUBLIC API: `on_fd_lookup`, `on_fd_install`, `check_path`
//! DEPENDS_ON: crate::capability, crate::slate
//! INVARIANTS: `on_fd_lookup` either returns the true underlying file or
//!   fails `BadFd`; it never returns a still-wrapped capability to its
//!   caller. A capability fd reaching the lookup hook with no matching
//!   slate entry at all (not even a mismatched one) means the syscall
//!   table failed to declare that argument, and is fatal rather than a
//!   plain error.

use alloc::sync::Arc;

use crate::capability::{is_capability, unwrap};
use crate::error::{Error, Result};
use crate::host::{CredentialTable, Fd, HostFile, ThreadId};
use crate::slate::SlateRegistry;

/// Fires on every descriptor-to-file resolution. Unwraps a capability to
/// its underlying file, cross-checking against the slate when the thread
/// is in capability mode and has one.
pub fn on_fd_lookup(
    file: &Arc<dyn HostFile>,
    fd: Fd,
    cap_mode: bool,
    thread: ThreadId,
    slates: &SlateRegistry,
    creds: &dyn CredentialTable,
) -> Result<Arc<dyn HostFile>> {
    if !is_capability(file) {
        return Ok(Arc::clone(file));
    }

    let (underlying, _rights) = unwrap(file).expect("is_capability implies unwrap succeeds");

    if cap_mode {
        if let Some(slate) = slates.current_slate(creds, thread) {
            if !slate.any_observation_for(fd) {
                crate::fatal::halt(
                    "capability fd reached lookup hook with no slate entry: \
                     syscall table is missing this argument",
                );
            }
            if !slate.matches_any(fd, file) {
                crate::log_error!(
                    target: "capmode::hooks",
                    "TOCTOU mismatch: fd {} no longer resolves to the file checked at syscall entry",
                    fd
                );
                return Err(Error::BadFd);
            }
        }
    }

    Ok(underlying)
}

/// Fires when a syscall is about to deposit `file` at a new fd. Wraps it
/// using the slate's pre-allocated wrapper if one was requested during
/// interception; otherwise installs `file` unchanged.
pub fn on_fd_install(
    file: Arc<dyn HostFile>,
    thread: ThreadId,
    slates: &SlateRegistry,
    creds: &dyn CredentialTable,
) -> Arc<dyn HostFile> {
    if is_capability(&file) {
        return file;
    }

    let slate = match slates.current_slate(creds, thread) {
        Some(slate) => slate,
        None => return file,
    };

    match slate.take_pending_wrap() {
        Some((cap, rights)) => {
            cap.bind(file, rights);
            cap
        }
        None => file,
    }
}

/// Fires per pathname lookup. In capability mode, rejects an absolute path
/// and any `..` component; otherwise permits everything.
pub fn check_path(path: &str, cap_mode: bool) -> Result<()> {
    if !cap_mode {
        return Ok(());
    }
    if path.starts_with('/') {
        return Err(Error::CapMode);
    }
    if path.split('/').any(|component| component == "..") {
        return Err(Error::CapMode);
    }
    Ok(())
}
