use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};

const ID_SPACE: u32 = u16::MAX as u32 + 1;

/// Pool of transaction ids currently awaiting a response.
///
/// Owned by a single client; clones share the same pool.
#[derive(Debug, Clone)]
pub struct TransactionIds {
    outstanding: Arc<Mutex<BTreeSet<u16>>>,
    limit: u32,
}

impl Default for TransactionIds {
    fn default() -> Self {
        Self::with_limit(ID_SPACE)
    }
}

impl TransactionIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_limit(limit: u32) -> Self {
        Self {
            outstanding: Arc::new(Mutex::new(BTreeSet::new())),
            limit: limit.min(ID_SPACE),
        }
    }

    /// Reserve the lowest id that is not outstanding.
    pub fn acquire(&self) -> Result<TransactionId> {
        let mut outstanding = lock(&self.outstanding);
        let id = (0..self.limit)
            .map(|id| id as u16)
            .find(|id| !outstanding.contains(id))
            .ok_or(Error::TransactionIdsExhausted)?;
        outstanding.insert(id);

        Ok(TransactionId {
            id,
            pool: Arc::clone(&self.outstanding),
        })
    }

    /// Number of ids currently held.
    pub fn outstanding(&self) -> usize {
        lock(&self.outstanding).len()
    }
}

fn lock(pool: &Mutex<BTreeSet<u16>>) -> MutexGuard<'_, BTreeSet<u16>> {
    pool.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A reserved transaction id. Returned to its pool when dropped.
#[derive(Debug)]
pub struct TransactionId {
    id: u16,
    pool: Arc<Mutex<BTreeSet<u16>>>,
}

impl TransactionId {
    pub fn get(&self) -> u16 {
        self.id
    }

    /// Drop the guard, returning the id to its pool.
    pub fn release(self) {}
}

impl Drop for TransactionId {
    fn drop(&mut self) {
        lock(&self.pool).remove(&self.id);
    }
}
