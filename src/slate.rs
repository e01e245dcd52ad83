// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Per-thread anti-TOCTOU record of fd observations made while
//! checking a syscall's rights.
//! OWNERS: capability subsystem
//! PUBLIC API: `Slate`, `SlateRegistry`
//! DEPENDS_ON: spin::Mutex, alloc::collections::BTreeMap, crate::capability
//! INVARIANTS: a slate is touched by its owning thread from two different
//!   call sites (syscall entry and, later, arbitrarily deep inside the
//!   lookup hook) but never concurrently by two threads that believe they
//!   own it; `observations` always reflects exactly the current syscall's
//!   checked fd arguments once entry has run.
//!
//! Sized for six inline observations before needing to grow, matching the
//! common case of a syscall naming at most a handful of descriptors.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::Mutex;

use crate::capability::Capability;
use crate::error::Result;
use crate::fault;
use crate::host::{CredentialTable, Fd, HostFile, ThreadId};
use crate::rights::Rights;

/// Observations made so far, sized inline for the common case of a
/// syscall naming six or fewer descriptors.
pub const INLINE_CAPACITY: usize = 6;

struct SlateInner {
    observations: Vec<(Fd, Arc<dyn HostFile>)>,
    new_cap_rights: Option<Rights>,
    next_new_cap: Option<Arc<Capability>>,
}

/// A single thread's in-progress rights-check record.
pub struct Slate {
    inner: Mutex<SlateInner>,
    owner: AtomicU64,
}

impl Slate {
    fn new(owner: ThreadId) -> Self {
        Slate {
            inner: Mutex::new(SlateInner {
                observations: Vec::with_capacity(INLINE_CAPACITY),
                new_cap_rights: None,
                next_new_cap: None,
            }),
            owner: AtomicU64::new(owner.0),
        }
    }

    pub fn owner(&self) -> ThreadId {
        ThreadId(self.owner.load(Ordering::Acquire))
    }

    /// Called at syscall entry: clears observations and the "wrap the next
    /// install" request. Does *not* clear a lingering pre-allocated
    /// wrapper — that survives across syscalls until consumed, so a
    /// retried `openat` does not pay for a second allocation.
    pub fn reset_for_syscall_entry(&self) {
        let mut inner = self.inner.lock();
        inner.observations.clear();
        inner.new_cap_rights = None;
    }

    /// Records that `fd` resolved to `file` during this syscall's rights
    /// check. Fails `NoMem` if growing the observation list fails; the
    /// caller must then fail the whole check rather than silently drop
    /// the observation.
    pub fn record(&self, fd: Fd, file: Arc<dyn HostFile>) -> Result<()> {
        fault::check_alloc()?;
        self.inner.lock().observations.push((fd, file));
        Ok(())
    }

    /// True if some observation this syscall recorded names `fd`, and the
    /// file recorded for it is pointer-identical to `file`. Used by the
    /// descriptor-lookup hook's anti-TOCTOU check: it must find a match
    /// among *all* entries for `fd`, not just the first.
    pub fn matches_any(&self, fd: Fd, file: &Arc<dyn HostFile>) -> bool {
        self.inner
            .lock()
            .observations
            .iter()
            .filter(|(ofd, _)| *ofd == fd)
            .any(|(_, ofile)| Arc::ptr_eq(ofile, file))
    }

    /// True if any observation at all names `fd`, regardless of file
    /// identity. If this is false for a capability fd reaching the lookup
    /// hook, the syscall table failed to declare that argument — a bug,
    /// not an attack.
    pub fn any_observation_for(&self, fd: Fd) -> bool {
        self.inner.lock().observations.iter().any(|(ofd, _)| *ofd == fd)
    }

    /// Requests that the next descriptor this syscall installs be wrapped
    /// with `rights`, allocating the pre-allocated wrapper now if none is
    /// already held from an earlier attempt. Fails `NoMem` only on the
    /// first allocation for a given wrapper; a reused wrapper never fails.
    pub fn request_wrap(&self, rights: Rights) -> Result<Arc<Capability>> {
        let mut inner = self.inner.lock();
        if inner.next_new_cap.is_none() {
            inner.next_new_cap = Some(Capability::new_uninit()?);
        }
        inner.new_cap_rights = Some(rights);
        Ok(inner.next_new_cap.clone().expect("just populated"))
    }

    /// Consumes the pending wrapper request, if any. Called by the
    /// descriptor-install hook exactly once per syscall that asked for one.
    pub fn take_pending_wrap(&self) -> Option<(Arc<Capability>, Rights)> {
        let mut inner = self.inner.lock();
        let rights = inner.new_cap_rights.take()?;
        let cap = inner.next_new_cap.take()?;
        Some((cap, rights))
    }
}

/// Registry mapping credential identities to their attached slate.
///
/// This crate owns slate storage itself (see the module header of
/// [`crate::host`]): the host's credential container only needs to hand
/// out and unshare opaque identities.
pub struct SlateRegistry {
    table: Mutex<BTreeMap<u64, Arc<Slate>>>,
}

impl SlateRegistry {
    pub fn new() -> Self {
        SlateRegistry {
            table: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the current thread's slate, allocating one under a freshly
    /// unshared credential if none is attached yet, or if the attached
    /// slate belongs to a different thread (the credential was shared).
    pub fn ensure_slate(
        &self,
        creds: &dyn CredentialTable,
        thread: ThreadId,
    ) -> Result<Arc<Slate>> {
        let cred = creds.current(thread);
        if let Some(slate) = self.table.lock().get(&cred.0) {
            if slate.owner() == thread {
                return Ok(slate.clone());
            }
        }
        fault::check_alloc()?;
        let fresh_cred = creds.unshare(thread)?;
        let slate = Arc::new(Slate::new(thread));
        self.table.lock().insert(fresh_cred.0, slate.clone());
        Ok(slate)
    }

    /// Returns the current thread's slate only if one is already attached
    /// and owned by this thread; never allocates.
    pub fn current_slate(&self, creds: &dyn CredentialTable, thread: ThreadId) -> Option<Arc<Slate>> {
        let cred = creds.current(thread);
        let table = self.table.lock();
        table
            .get(&cred.0)
            .filter(|slate| slate.owner() == thread)
            .cloned()
    }
}

impl Default for SlateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
