// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: The two user-visible entry points that construct and inspect
//! capabilities directly.
//! OWNERS: capability subsystem
//! PUBLIC API: `cap_new`, `cap_getrights`
//! DEPENDS_ON: crate::capability, crate::host::DescriptorTable, crate::interceptor::Interceptor
//! INVARIANTS: `cap_new` only ever narrows rights relative to an existing
//!   capability; it can never be used to widen them. `cap_new` fails
//!   `NoSys` before touching any fd if the subsystem is disabled, mirroring
//!   the `capsicum_enabled` check the reference implementation makes at
//!   the top of its `cap_new` syscall.

use crate::capability::{unwrap, Capability};
use crate::error::{Error, Result};
use crate::host::{DescriptorTable, Fd};
use crate::interceptor::Interceptor;
use crate::rights::Rights;

/// Wraps `orig_fd` in a new capability fd with `new_rights`. If `orig_fd`
/// already names a capability, `new_rights` is intersected with its
/// existing mask rather than replacing it, so rights can only narrow.
/// Fails `NoSys` if `interceptor` reports the subsystem disabled.
pub fn cap_new(
    interceptor: &Interceptor,
    fds: &dyn DescriptorTable,
    orig_fd: Fd,
    new_rights: Rights,
) -> Result<Fd> {
    if !interceptor.is_enabled() {
        crate::log_debug!(target: "capmode::ops", "cap_new: subsystem disabled");
        return Err(Error::NoSys);
    }
    let orig = fds.lookup(orig_fd).ok_or_else(|| {
        crate::log_debug!(target: "capmode::ops", "cap_new: fd {} does not exist", orig_fd);
        Error::BadFd
    })?;
    let (underlying, rights) = match unwrap(&orig) {
        Some((underlying, existing)) => (underlying, existing.narrow(new_rights)),
        None => (orig, new_rights),
    };
    let cap = Capability::new(underlying, rights)?;
    fds.install_at_new_fd(cap)
}

/// Returns the rights mask of `fd`. Fails `Inval` if `fd` is not a
/// capability at all.
pub fn cap_getrights(fds: &dyn DescriptorTable, fd: Fd) -> Result<Rights> {
    let file = fds.lookup(fd).ok_or_else(|| {
        crate::log_debug!(target: "capmode::ops", "cap_getrights: fd {} does not exist", fd);
        Error::BadFd
    })?;
    unwrap(&file).map(|(_, rights)| rights).ok_or_else(|| {
        crate::log_debug!(target: "capmode::ops", "cap_getrights: fd {} is not a capability", fd);
        Error::Inval
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syscall_table::default_table;
    use crate::testutil::{file, MockFdTable};

    #[test]
    fn scenario_construct_narrow_read_only() {
        let interceptor = Interceptor::new(default_table());
        let fds = MockFdTable::new();
        fds.seed(3, file("/etc/passwd"));

        let fd4 = cap_new(&interceptor, &fds, 3, Rights::READ).unwrap();
        assert_eq!(cap_getrights(&fds, fd4).unwrap(), Rights::READ);
        assert_eq!(cap_getrights(&fds, 3), Err(Error::Inval));
    }

    #[test]
    fn scenario_narrowing_a_capability_intersects() {
        let interceptor = Interceptor::new(default_table());
        let fds = MockFdTable::new();
        fds.seed(3, file("/etc/passwd"));
        let fd4 = cap_new(&interceptor, &fds, 3, Rights::READ).unwrap();

        let fd5 = cap_new(&interceptor, &fds, fd4, Rights::READ | Rights::WRITE).unwrap();
        assert_eq!(cap_getrights(&fds, fd5).unwrap(), Rights::READ);
    }

    #[test]
    fn cap_new_on_missing_fd_is_badfd() {
        let interceptor = Interceptor::new(default_table());
        let fds = MockFdTable::new();
        assert_eq!(
            cap_new(&interceptor, &fds, 99, Rights::READ),
            Err(Error::BadFd)
        );
    }

    #[test]
    fn cap_getrights_on_missing_fd_is_badfd() {
        let fds = MockFdTable::new();
        assert_eq!(cap_getrights(&fds, 99), Err(Error::BadFd));
    }

    #[test]
    fn cap_new_on_disabled_subsystem_is_nosys() {
        let interceptor = Interceptor::new(default_table());
        interceptor.set_enabled(false);
        let fds = MockFdTable::new();
        fds.seed(3, file("/etc/passwd"));
        assert_eq!(
            cap_new(&interceptor, &fds, 3, Rights::READ),
            Err(Error::NoSys)
        );
        // Disabled means disabled: the fd is never even looked up.
        assert!(fds.lookup(4).is_none());
    }
}
