// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Static mapping from syscall number to the fd arguments and
//! rights it requires.
//! OWNERS: capability subsystem
//! PUBLIC API: `RawArgs`, `SyscallEntry`, `SyscallTable`, `default_table`
//! DEPENDS_ON: crate::rights, crate::host::Fd
//! INVARIANTS: a syscall absent from the table is denied in capability
//!   mode, never silently allowed; `AT_FDCWD` is always rejected in
//!   capability mode regardless of what any extractor says.
//!
//! Mirrors this codebase's register-number-indexed dispatch table, widened
//! from "one handler per slot" to "one rights extractor per slot" since
//! this subsystem does not itself execute syscalls, only screens them.

use alloc::vec::Vec;

use crate::host::Fd;
use crate::rights::Rights;

/// The magic fd value meaning "relative to the current working directory",
/// unconditionally rejected while the thread is in capability mode.
pub const AT_FDCWD: Fd = -100;

/// Raw syscall argument registers, register-file order.
#[derive(Clone, Copy)]
pub struct RawArgs {
    regs: [usize; 6],
}

impl RawArgs {
    pub const fn new(regs: [usize; 6]) -> Self {
        RawArgs { regs }
    }

    pub fn get(&self, index: usize) -> usize {
        self.regs[index]
    }

    pub fn get_fd(&self, index: usize) -> Fd {
        self.regs[index] as Fd
    }
}

/// One fd argument position and the rights it demands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RightsRequirement {
    pub fd_arg_index: usize,
    pub required: Rights,
}

/// Enumerates the fd arguments a syscall takes and the rights each demands,
/// given its raw argument vector. Returning an empty `Vec` means the
/// syscall is permitted in capability mode but names no descriptors.
pub type Extractor = fn(&RawArgs) -> Vec<RightsRequirement>;

/// One syscall table entry.
#[derive(Clone, Copy)]
pub struct SyscallEntry {
    pub name: &'static str,
    pub extractor: Extractor,
    /// True for syscalls that install a new fd (e.g. `openat`), triggering
    /// the interceptor's pre-allocation step when the syscall operates on
    /// a directory capability.
    pub produces_fd: bool,
}

/// Symbolic syscall numbers used by this crate's own table. These are not
/// bound to any particular host ABI; a host integration maps its real
/// syscall numbers onto these slots (or vice versa) when registering.
pub const SYS_READ: usize = 0;
pub const SYS_WRITE: usize = 1;
pub const SYS_CLOSE: usize = 2;
pub const SYS_OPENAT: usize = 3;
pub const SYS_FSTAT: usize = 4;
pub const SYS_IOCTL: usize = 5;
pub const SYS_CAP_NEW: usize = 6;
pub const SYS_CAP_GETRIGHTS: usize = 7;
pub const SYS_MMAP: usize = 8;
pub const SYS_MAX_BUILTIN: usize = 9;

pub const MAX_SYSCALL: usize = 512;

fn extract_read(_args: &RawArgs) -> Vec<RightsRequirement> {
    alloc::vec![RightsRequirement {
        fd_arg_index: 0,
        required: Rights::READ,
    }]
}

fn extract_write(_args: &RawArgs) -> Vec<RightsRequirement> {
    alloc::vec![RightsRequirement {
        fd_arg_index: 0,
        required: Rights::WRITE,
    }]
}

fn extract_close(_args: &RawArgs) -> Vec<RightsRequirement> {
    Vec::new()
}

fn extract_openat(_args: &RawArgs) -> Vec<RightsRequirement> {
    alloc::vec![RightsRequirement {
        fd_arg_index: 0,
        required: Rights::LOOKUP,
    }]
}

fn extract_fstat(_args: &RawArgs) -> Vec<RightsRequirement> {
    alloc::vec![RightsRequirement {
        fd_arg_index: 0,
        required: Rights::FSTAT,
    }]
}

fn extract_ioctl(_args: &RawArgs) -> Vec<RightsRequirement> {
    alloc::vec![RightsRequirement {
        fd_arg_index: 0,
        required: Rights::IOCTL,
    }]
}

fn extract_mmap(_args: &RawArgs) -> Vec<RightsRequirement> {
    alloc::vec![RightsRequirement {
        fd_arg_index: 0,
        required: Rights::MMAP_READ,
    }]
}

/// `cap_new`/`cap_getrights` take their own fd as the first argument but,
/// per their contract, require no rights on it beyond existence — so the
/// requirement carries `Rights::NONE`. This still gives the fd a tracked
/// argument position, so the interceptor's `AT_FDCWD` rejection and slate
/// recording run for it exactly as for any other covered syscall.
fn extract_existence_only(_args: &RawArgs) -> Vec<RightsRequirement> {
    alloc::vec![RightsRequirement {
        fd_arg_index: 0,
        required: Rights::NONE,
    }]
}

/// Fixed-size, register-indexed dispatch table: one entry per syscall
/// number, `None` for anything not covered.
pub struct SyscallTable {
    entries: [Option<SyscallEntry>; MAX_SYSCALL],
}

impl SyscallTable {
    pub const fn new() -> Self {
        SyscallTable {
            entries: [None; MAX_SYSCALL],
        }
    }

    pub fn register(&mut self, nr: usize, entry: SyscallEntry) {
        self.entries[nr] = Some(entry);
    }

    pub fn lookup(&self, nr: usize) -> Option<&SyscallEntry> {
        self.entries.get(nr).and_then(|e| e.as_ref())
    }
}

impl Default for SyscallTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The table this crate ships covering its own symbolic syscall numbers.
/// A host integration extends this (or builds its own) to cover every
/// descriptor-taking syscall its ABI actually exposes; leaving one out
/// defaults it to denial, never silent passage.
pub fn default_table() -> SyscallTable {
    let mut table = SyscallTable::new();
    table.register(
        SYS_READ,
        SyscallEntry {
            name: "read",
            extractor: extract_read,
            produces_fd: false,
        },
    );
    table.register(
        SYS_WRITE,
        SyscallEntry {
            name: "write",
            extractor: extract_write,
            produces_fd: false,
        },
    );
    table.register(
        SYS_CLOSE,
        SyscallEntry {
            name: "close",
            extractor: extract_close,
            produces_fd: false,
        },
    );
    table.register(
        SYS_OPENAT,
        SyscallEntry {
            name: "openat",
            extractor: extract_openat,
            produces_fd: true,
        },
    );
    table.register(
        SYS_FSTAT,
        SyscallEntry {
            name: "fstat",
            extractor: extract_fstat,
            produces_fd: false,
        },
    );
    table.register(
        SYS_IOCTL,
        SyscallEntry {
            name: "ioctl",
            extractor: extract_ioctl,
            produces_fd: false,
        },
    );
    table.register(
        SYS_CAP_NEW,
        SyscallEntry {
            name: "cap_new",
            extractor: extract_existence_only,
            produces_fd: true,
        },
    );
    table.register(
        SYS_CAP_GETRIGHTS,
        SyscallEntry {
            name: "cap_getrights",
            extractor: extract_existence_only,
            produces_fd: false,
        },
    );
    table.register(
        SYS_MMAP,
        SyscallEntry {
            name: "mmap",
            extractor: extract_mmap,
            produces_fd: false,
        },
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_syscall_is_absent() {
        let table = default_table();
        assert!(table.lookup(SYS_MAX_BUILTIN).is_none());
        assert!(table.lookup(MAX_SYSCALL - 1).is_none());
    }

    #[test]
    fn openat_is_marked_fd_producing() {
        let table = default_table();
        let entry = table.lookup(SYS_OPENAT).unwrap();
        assert!(entry.produces_fd);
        assert_eq!(entry.name, "openat");
    }

    #[test]
    fn read_requires_read_rights_on_its_one_fd_argument() {
        let table = default_table();
        let entry = table.lookup(SYS_READ).unwrap();
        let reqs = (entry.extractor)(&RawArgs::new([3, 0, 0, 0, 0, 0]));
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].fd_arg_index, 0);
        assert_eq!(reqs[0].required, Rights::READ);
    }

    #[test]
    fn close_names_no_rights_requirement() {
        let table = default_table();
        let entry = table.lookup(SYS_CLOSE).unwrap();
        assert!((entry.extractor)(&RawArgs::new([3, 0, 0, 0, 0, 0])).is_empty());
    }

    #[test]
    fn cap_new_and_cap_getrights_track_their_own_fd_with_no_rights() {
        let table = default_table();
        for nr in [SYS_CAP_NEW, SYS_CAP_GETRIGHTS] {
            let entry = table.lookup(nr).unwrap();
            let reqs = (entry.extractor)(&RawArgs::new([3, 0, 0, 0, 0, 0]));
            assert_eq!(reqs.len(), 1);
            assert_eq!(reqs[0].fd_arg_index, 0);
            assert_eq!(reqs[0].required, Rights::NONE);
        }
    }

    #[test]
    fn register_overwrites_existing_entry() {
        let mut table = SyscallTable::new();
        table.register(
            SYS_READ,
            SyscallEntry {
                name: "read-v1",
                extractor: extract_read,
                produces_fd: false,
            },
        );
        table.register(
            SYS_READ,
            SyscallEntry {
                name: "read-v2",
                extractor: extract_read,
                produces_fd: false,
            },
        );
        assert_eq!(table.lookup(SYS_READ).unwrap().name, "read-v2");
    }
}
