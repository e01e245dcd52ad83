// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Stable bit-for-bit ABI for the capability rights mask.
//! OWNERS: capability subsystem
//! PUBLIC API: `Rights`
//! DEPENDS_ON: bitflags
//! INVARIANTS: bit positions, once shipped, never move or get reassigned.
//! ADR: the reference implementation this subsystem is modeled on ships its
//!   canonical bit layout in a header that was not available to us, so this
//!   module defines and freezes its own numbering rather than guessing at
//!   an upstream one. New rights are appended at the next free bit, never
//!   inserted between existing ones.

use bitflags::bitflags;

// The rights mask is a stable ABI over a 64-bit word; a host integration
// memcpy's it to/from user space in `cap_getrights`; widening the backing
// type would silently break that layout.
static_assertions::assert_eq_size!(Rights, u64);

bitflags! {
    /// A 64-bit mask of operations permitted on a capability's underlying file.
    ///
    /// `Rights::all()` is used as the sentinel "unrestricted" value reported
    /// for ordinary, non-capability files when their rights are queried.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Rights: u64 {
        const READ            = 1 << 0;
        const WRITE           = 1 << 1;
        const SEEK            = 1 << 2;
        const MMAP_READ       = 1 << 3;
        const MMAP_WRITE      = 1 << 4;
        const FSTAT           = 1 << 5;
        const FCHMOD          = 1 << 6;
        const LOOKUP          = 1 << 7;
        const BIND            = 1 << 8;
        const CONNECT         = 1 << 9;
        const ACCEPT          = 1 << 10;
        const IOCTL           = 1 << 11;
        const FCNTL           = 1 << 12;
        const FSYNC           = 1 << 13;
        const FTRUNCATE       = 1 << 14;
        const FLOCK           = 1 << 15;
        const EVENT           = 1 << 16;
        const PDWAIT          = 1 << 17;
        const PDKILL          = 1 << 18;
        const PDGETPID        = 1 << 19;
        const MKDIRAT         = 1 << 20;
        const UNLINKAT        = 1 << 21;
        const RENAMEAT        = 1 << 22;
        const SYMLINKAT       = 1 << 23;
    }
}

impl Rights {
    /// Rights a freshly derived capability gets when no explicit mask is
    /// given: none. Callers must always narrow explicitly.
    pub const NONE: Rights = Rights::empty();

    /// Intersects `self` with `other`, the only legal way to derive a new
    /// rights mask from an existing one (narrowing, never widening).
    pub fn narrow(self, requested: Rights) -> Rights {
        self & requested
    }

    /// True if `self` grants every right in `required`.
    pub fn covers(self, required: Rights) -> bool {
        self.contains(required)
    }

    /// Renders the mask the way a per-fd debug dump reports it: sixteen
    /// lowercase hex digits, matching the field width of the backing `u64`.
    pub fn to_fdinfo_hex(self) -> alloc::string::String {
        alloc::format!("{:016x}", self.bits())
    }
}


#[cfg(test)]
mod tests_prop {
    use super::*;
    use proptest::prelude::*;

    fn arb_rights() -> impl Strategy<Value = Rights> {
        any::<u64>().prop_map(|bits| Rights::from_bits_truncate(bits))
    }

    proptest! {
        #[test]
        fn narrow_never_widens(base in arb_rights(), requested in arb_rights()) {
            let derived = base.narrow(requested);
            prop_assert!(base.covers(derived));
            prop_assert!(requested.covers(derived));
        }

        #[test]
        fn narrow_with_subset_is_identity(base in arb_rights()) {
            prop_assert_eq!(base.narrow(base), base);
        }

        #[test]
        fn narrow_is_idempotent(base in arb_rights(), requested in arb_rights()) {
            let once = base.narrow(requested);
            let twice = once.narrow(requested);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn every_mask_formats_without_panicking(bits in arb_rights()) {
            let debug = alloc::format!("{:?}", bits);
            let hex = bits.to_fdinfo_hex();
            prop_assert!(!debug.is_empty());
            prop_assert_eq!(hex.len(), 16);
        }
    }

    #[test]
    fn all_bits_set_sentinel_formats_without_panicking() {
        let all = Rights::all();
        assert!(!alloc::format!("{:?}", all).is_empty());
        assert_eq!(all.to_fdinfo_hex().len(), 16);
    }
}
