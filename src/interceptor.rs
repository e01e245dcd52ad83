// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Entry point invoked before every syscall while a thread is in
//! capability mode.
//! OWNERS: capability subsystem
//! PUBLIC API: `Interceptor`
//! DEPENDS_ON: crate::syscall_table, crate::slate, crate::host
//! INVARIANTS: a syscall either passes every fd-argument rights check
//!   before it runs, or it does not run at all; there is no partial
//!   execution.
//!
//! Decode -> check -> (the kernel) executes, the same shape this
//! codebase's own syscall layer uses, specialized here to rights checking
//! rather than dispatch: this module never runs the syscall body itself.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::capability::{is_capability, rights_of};
use crate::error::{Error, Result};
use crate::host::{CredentialTable, DescriptorTable, ThreadId};
use crate::slate::SlateRegistry;
use crate::syscall_table::{RawArgs, SyscallTable, AT_FDCWD};

/// Screens syscalls in capability mode against a [`SyscallTable`],
/// recording every fd it resolves into the thread's [`crate::slate::Slate`]
/// so the descriptor-lookup hook can later catch a TOCTOU swap.
pub struct Interceptor {
    table: SyscallTable,
    slates: SlateRegistry,
    enabled: AtomicBool,
}

impl Interceptor {
    pub fn new(table: SyscallTable) -> Self {
        Interceptor {
            table,
            slates: SlateRegistry::new(),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn slates(&self) -> &SlateRegistry {
        &self.slates
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Runs the rights check for syscall `nr` with raw argument vector
    /// `args`, on behalf of `thread`. Returns `Ok(())` to allow the
    /// syscall to proceed, or the first failure encountered.
    pub fn intercept(
        &self,
        nr: usize,
        args: &RawArgs,
        thread: ThreadId,
        fds: &dyn DescriptorTable,
        creds: &dyn CredentialTable,
    ) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let slate = self.slates.ensure_slate(creds, thread)?;
        slate.reset_for_syscall_entry();

        let entry = match self.table.lookup(nr) {
            Some(entry) => entry,
            None => {
                crate::log_debug!(target: "capmode::interceptor", "syscall {} not in capability table", nr);
                return Err(Error::CapMode);
            }
        };

        let requirements = (entry.extractor)(args);
        let mut directory_capability_rights = None;

        for req in requirements {
            let fd = args.get_fd(req.fd_arg_index);
            if fd == AT_FDCWD {
                crate::log_debug!(target: "capmode::interceptor", "{}: AT_FDCWD rejected in capability mode", entry.name);
                return Err(Error::CapMode);
            }

            let file = fds.lookup(fd).ok_or_else(|| {
                crate::log_debug!(target: "capmode::interceptor", "{}: fd {} does not exist", entry.name, fd);
                Error::BadFd
            })?;
            slate.record(fd, Arc::clone(&file))?;

            let actual = rights_of(&file);
            if !actual.covers(req.required) {
                crate::log_debug!(
                    target: "capmode::interceptor",
                    "{}: fd {} rights {:?} do not cover required {:?}",
                    entry.name, fd, actual, req.required
                );
                return Err(Error::NotCapable);
            }

            if req.fd_arg_index == 0 && is_capability(&file) && directory_capability_rights.is_none() {
                directory_capability_rights = Some(actual);
            }
        }

        if entry.produces_fd {
            if let Some(rights) = directory_capability_rights {
                slate.request_wrap(rights)?;
            }
        }

        Ok(())
    }
}
