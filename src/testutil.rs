// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Mock host implementations shared by unit and property tests across
//! this crate. Not part of the public API; compiled only under `#[cfg(test)]`.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use spin::Mutex;

use crate::error::{Error, Result};
use crate::host::{CredId, CredentialTable, DescriptorTable, Fd, HostFile, ThreadId};

/// A plain, inert file object: every operation succeeds and does nothing.
#[derive(Debug)]
pub struct PlainFile {
    pub label: &'static str,
}

impl HostFile for PlainFile {
    fn read(&self) -> Result<()> {
        Ok(())
    }
    fn write(&self) -> Result<()> {
        Ok(())
    }
    fn seek(&self) -> Result<()> {
        Ok(())
    }
    fn mmap_read(&self) -> Result<()> {
        Ok(())
    }
    fn mmap_write(&self) -> Result<()> {
        Ok(())
    }
    fn fstat(&self) -> Result<()> {
        Ok(())
    }
    fn fchmod(&self) -> Result<()> {
        Ok(())
    }
    fn ioctl(&self) -> Result<()> {
        Ok(())
    }
    fn poll(&self) -> Result<()> {
        Ok(())
    }
    fn flock(&self) -> Result<()> {
        Ok(())
    }
    fn fsync(&self) -> Result<()> {
        Ok(())
    }
}

/// An in-memory descriptor table standing in for the host's fd table.
pub struct MockFdTable {
    slots: Mutex<BTreeMap<Fd, Arc<dyn HostFile>>>,
    next_fd: AtomicI32,
    /// When `Some`, the next call to `install_at_new_fd` fails with `NoMem`
    /// instead of succeeding, simulating resource exhaustion.
    pub fail_next_install: core::sync::atomic::AtomicBool,
}

impl MockFdTable {
    pub fn new() -> Self {
        MockFdTable {
            slots: Mutex::new(BTreeMap::new()),
            next_fd: AtomicI32::new(3),
            fail_next_install: core::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn seed(&self, fd: Fd, file: Arc<dyn HostFile>) {
        self.slots.lock().insert(fd, file);
    }
}

impl DescriptorTable for MockFdTable {
    fn lookup(&self, fd: Fd) -> Option<Arc<dyn HostFile>> {
        self.slots.lock().get(&fd).cloned()
    }

    fn install_at_new_fd(&self, file: Arc<dyn HostFile>) -> Result<Fd> {
        if self.fail_next_install.swap(false, Ordering::SeqCst) {
            return Err(Error::NoMem);
        }
        let fd = self.next_fd.fetch_add(1, Ordering::SeqCst);
        self.slots.lock().insert(fd, file);
        Ok(fd)
    }

    fn close(&self, fd: Fd) {
        self.slots.lock().remove(&fd);
    }

    fn replace(&self, fd: Fd, file: Arc<dyn HostFile>) {
        self.slots.lock().insert(fd, file);
    }
}

/// An in-memory credential container standing in for the host's.
pub struct MockCredTable {
    current: Mutex<BTreeMap<u64, u64>>,
    next_cred: AtomicU64,
}

impl MockCredTable {
    pub fn new() -> Self {
        MockCredTable {
            current: Mutex::new(BTreeMap::new()),
            next_cred: AtomicU64::new(1),
        }
    }

    pub fn assign(&self, thread: ThreadId, cred: CredId) {
        self.current.lock().insert(thread.0, cred.0);
    }
}

impl CredentialTable for MockCredTable {
    fn current(&self, thread: ThreadId) -> CredId {
        let mut map = self.current.lock();
        let id = *map
            .entry(thread.0)
            .or_insert_with(|| self.next_cred.fetch_add(1, Ordering::SeqCst));
        CredId(id)
    }

    fn unshare(&self, thread: ThreadId) -> Result<CredId> {
        let id = self.next_cred.fetch_add(1, Ordering::SeqCst);
        self.current.lock().insert(thread.0, id);
        Ok(CredId(id))
    }
}

pub fn file(label: &'static str) -> Arc<dyn HostFile> {
    Arc::new(PlainFile { label })
}

pub fn collect_fds(table: &MockFdTable, fds: &[Fd]) -> Vec<Option<Arc<dyn HostFile>>> {
    fds.iter().map(|&fd| table.lookup(fd)).collect()
}
