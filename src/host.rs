// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Boundary traits the host kernel implements.
//! OWNERS: capability subsystem
//! PUBLIC API: `HostFile`, `DescriptorTable`, `CredentialTable`
//! DEPENDS_ON: alloc::sync::Arc
//! INVARIANTS: none of these traits is implemented by this crate for
//!   production use; they exist so the core algorithms can be built and
//!   tested without any specific host kernel.
//!
//! A real integration binds `DescriptorTable` to the host's per-process fd
//! table, `CredentialTable` to its credential container, and `HostFile` to
//! whatever reference-counted file object the host already has. None of
//! that binding lives in this crate.

use alloc::sync::Arc;
use core::fmt::Debug;

use crate::error::Result;

/// A non-capability file object, or the capability wrapper itself (see
/// [`crate::capability::Capability`]'s impl, whose data methods are the
/// fatal path).
///
/// `fstat`/`ioctl`/etc. are deliberately coarse-grained placeholders for
/// whatever real operation set the host's file objects expose; this crate
/// only needs to know that they exist and that a capability must never
/// perform them directly.
pub trait HostFile: Debug + Send + Sync {
    fn read(&self) -> Result<()>;
    fn write(&self) -> Result<()>;
    fn seek(&self) -> Result<()>;
    fn mmap_read(&self) -> Result<()>;
    fn mmap_write(&self) -> Result<()>;
    fn fstat(&self) -> Result<()>;
    fn fchmod(&self) -> Result<()>;
    fn ioctl(&self) -> Result<()>;
    fn poll(&self) -> Result<()>;
    fn flock(&self) -> Result<()>;
    fn fsync(&self) -> Result<()>;

    /// True for the capability wrapper itself; false for every ordinary
    /// file object. Lets generic code distinguish the two without downcasting.
    fn is_capability(&self) -> bool {
        false
    }

    /// `Some(self)` only for [`crate::capability::Capability`]. The default
    /// `None` is correct for every ordinary host file.
    fn as_capability(&self) -> Option<&crate::capability::Capability> {
        None
    }
}

/// An fd number as the host's table indexes it.
pub type Fd = i32;

/// The host's per-process descriptor table.
///
/// Models `fcheck()`/`fget()` (`lookup`), `get_unused_fd()` + `fd_install()`
/// (`install_at_new_fd`), `sys_close()` (`close`), and whatever the host's
/// `dup2`-family path does to retarget a slot already in use (`replace`,
/// also used by tests to simulate a racing thread).
pub trait DescriptorTable {
    fn lookup(&self, fd: Fd) -> Option<Arc<dyn HostFile>>;
    fn install_at_new_fd(&self, file: Arc<dyn HostFile>) -> Result<Fd>;
    fn close(&self, fd: Fd);
    fn replace(&self, fd: Fd, file: Arc<dyn HostFile>);
}

/// Opaque handle to a credential identity, as returned by `CredentialTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CredId(pub u64);

/// An opaque thread identity, used only to tell threads apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(pub u64);

/// The host's credential container.
///
/// `current` models reading `current->cred`. `unshare` models
/// `prepare_creds()` + `commit_creds()`, producing a fresh credential
/// identity not aliased by any other thread. This crate's own slate
/// registry (see [`crate::slate`]) attaches a blank slate to that identity
/// the first time it is needed; the host's credential container does not
/// need to know slates exist.
pub trait CredentialTable {
    fn current(&self, thread: ThreadId) -> CredId;
    fn unshare(&self, thread: ThreadId) -> Result<CredId>;
}
