// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: The capability object: a rights-masked wrapper around a host file.
//! OWNERS: capability subsystem
//! PUBLIC API: `Capability`, `wrap`, `unwrap`, `is_capability`, `rights_of`
//! DEPENDS_ON: alloc::sync::Arc, spin::Once
//! INVARIANTS: a capability's underlying file is never itself a capability;
//!   its rights are fixed at bind time and never widened afterward; every
//!   generic data operation on a still-wrapped capability is fatal.
//! ADR: storage is a `spin::Once<CapBody>` rather than a plain struct field
//!   so a wrapper can be allocated empty at syscall entry (where `NoMem` is
//!   a legitimate, reportable outcome) and bound with a single infallible
//!   write at descriptor-install time (where the host guarantees
//!   installation itself cannot fail for allocation reasons). See the
//!   pre-allocation note in [`crate::slate`].

use alloc::sync::Arc;
use core::fmt;
use spin::Once;

use crate::error::Result;
use crate::fault;
use crate::host::HostFile;
use crate::rights::Rights;

// A capability is always shared through `Arc<dyn HostFile>`, never by
// value: a `Clone` impl here would let a caller duplicate a wrapper's
// binding state outside the `Once`, defeating the bind-once invariant.
static_assertions::assert_not_impl_any!(Capability: Clone);

struct CapBody {
    underlying: Arc<dyn HostFile>,
    rights: Rights,
}

/// A rights-masked wrapper around a non-capability host file.
///
/// `Capability` itself implements [`HostFile`] so it can sit in a host fd
/// table slot like any other file; every data operation on that impl is
/// the fatal path described in the module invariants. The only legitimate
/// operations on a wrapper as a wrapper are construction, [`unwrap`], and
/// the per-fd debug dump ([`Capability::fdinfo_rights`]).
pub struct Capability {
    inner: Once<CapBody>,
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.get() {
            Some(body) => f
                .debug_struct("Capability")
                .field("rights", &body.rights)
                .finish(),
            None => f.debug_struct("Capability").field("bound", &false).finish(),
        }
    }
}

impl Capability {
    /// Allocates an unbound wrapper. Legitimately fails with `NoMem`; this
    /// is the allocation a caller performs at syscall entry, ahead of a
    /// descriptor install that must not itself be allowed to fail.
    pub fn new_uninit() -> Result<Arc<Capability>> {
        fault::check_alloc()?;
        Ok(Arc::new(Capability { inner: Once::new() }))
    }

    /// Binds a previously uninitialized wrapper to `underlying` and
    /// `rights`. Flattens automatically: if `underlying` is itself a
    /// capability, the true underlying file and the intersection of rights
    /// are used instead, so wrappers never nest.
    ///
    /// A plain, infallible write. Binding an already-bound wrapper is a
    /// bug in the caller, not a recoverable condition.
    pub fn bind(&self, underlying: Arc<dyn HostFile>, rights: Rights) {
        let (underlying, rights) = match unwrap(&underlying) {
            Some((inner, inner_rights)) => (inner, inner_rights.narrow(rights)),
            None => (underlying, rights),
        };
        if self.inner.is_completed() {
            crate::fatal::halt("capability wrapper bound twice");
        }
        self.inner.call_once(|| CapBody { underlying, rights });
    }

    /// Allocates and binds a wrapper in one step. Used by [`crate::ops::cap_new`]
    /// and anywhere else a capability is created outside the
    /// allocate-then-install split the interceptor uses.
    pub fn new(underlying: Arc<dyn HostFile>, rights: Rights) -> Result<Arc<Capability>> {
        let cap = Capability::new_uninit()?;
        cap.bind(underlying, rights);
        Ok(cap)
    }

    fn body(&self) -> &CapBody {
        self.inner
            .get()
            .unwrap_or_else(|| crate::fatal::halt("capability accessed before bind"))
    }

    /// The sixteen-hex-digit rights line reported for this capability in a
    /// per-fd debug dump.
    pub fn fdinfo_rights(&self) -> alloc::string::String {
        self.body().rights.to_fdinfo_hex()
    }
}

/// Projects `file` to its underlying file and rights if it is a capability,
/// or `None` if it is an ordinary file. A no-op on non-capabilities, never
/// itself wraps anything.
pub fn unwrap(file: &Arc<dyn HostFile>) -> Option<(Arc<dyn HostFile>, Rights)> {
    file.as_capability()
        .map(|cap| (cap.body().underlying.clone(), cap.body().rights))
}

/// True if `file` is a capability wrapper.
pub fn is_capability(file: &Arc<dyn HostFile>) -> bool {
    file.is_capability()
}

/// The rights a file grants: its own mask if it is a capability, or
/// `Rights::all()` (unrestricted) for an ordinary file.
pub fn rights_of(file: &Arc<dyn HostFile>) -> Rights {
    unwrap(file).map(|(_, r)| r).unwrap_or(Rights::all())
}

impl HostFile for Capability {
    fn read(&self) -> Result<()> {
        crate::fatal::halt("read() invoked directly on a wrapped capability")
    }
    fn write(&self) -> Result<()> {
        crate::fatal::halt("write() invoked directly on a wrapped capability")
    }
    fn seek(&self) -> Result<()> {
        crate::fatal::halt("seek() invoked directly on a wrapped capability")
    }
    fn mmap_read(&self) -> Result<()> {
        crate::fatal::halt("mmap_read() invoked directly on a wrapped capability")
    }
    fn mmap_write(&self) -> Result<()> {
        crate::fatal::halt("mmap_write() invoked directly on a wrapped capability")
    }
    fn fstat(&self) -> Result<()> {
        crate::fatal::halt("fstat() invoked directly on a wrapped capability")
    }
    fn fchmod(&self) -> Result<()> {
        crate::fatal::halt("fchmod() invoked directly on a wrapped capability")
    }
    fn ioctl(&self) -> Result<()> {
        crate::fatal::halt("ioctl() invoked directly on a wrapped capability")
    }
    fn poll(&self) -> Result<()> {
        crate::fatal::halt("poll() invoked directly on a wrapped capability")
    }
    fn flock(&self) -> Result<()> {
        crate::fatal::halt("flock() invoked directly on a wrapped capability")
    }
    fn fsync(&self) -> Result<()> {
        crate::fatal::halt("fsync() invoked directly on a wrapped capability")
    }

    fn is_capability(&self) -> bool {
        true
    }

    fn as_capability(&self) -> Option<&Capability> {
        Some(self)
    }
}


#[cfg(test)]
mod tests_prop {
    use super::*;
    use crate::testutil::file;
    use proptest::prelude::*;

    fn arb_rights() -> impl Strategy<Value = Rights> {
        any::<u64>().prop_map(Rights::from_bits_truncate)
    }

    proptest! {
        #[test]
        fn derived_rights_never_exceed_requested_or_base(
            base in arb_rights(),
            requested in arb_rights(),
        ) {
            let f = file("plain");
            let outer: Arc<dyn HostFile> = Capability::new(f, base).unwrap();
            let inner: Arc<dyn HostFile> = Capability::new(outer, requested).unwrap();
            let (_, rights) = unwrap(&inner).unwrap();
            prop_assert!(base.covers(rights));
            prop_assert!(requested.covers(rights));
        }

        #[test]
        fn unwrap_is_idempotent_on_flattened_chain(base in arb_rights()) {
            let f = file("plain");
            let cap: Arc<dyn HostFile> = Capability::new(f, base).unwrap();
            let (underlying_once, rights_once) = unwrap(&cap).unwrap();
            // Re-wrapping the already-flat underlying and unwrapping again
            // must reach the same non-capability file.
            let cap2: Arc<dyn HostFile> = Capability::new(underlying_once.clone(), rights_once).unwrap();
            let (underlying_twice, _) = unwrap(&cap2).unwrap();
            prop_assert!(Arc::ptr_eq(&underlying_once, &underlying_twice));
        }
    }
}
