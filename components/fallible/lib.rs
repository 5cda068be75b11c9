/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Collection growth that reports allocation failure instead of aborting.

use smallvec::{Array, SmallVec};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::error::Error;
use std::fmt;
use std::hash::{BuildHasher, Hash};

/// The error type for fallible allocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FailedAllocationError {
    reason: &'static str,
}

impl FailedAllocationError {
    /// Creates a new `FailedAllocationError`.
    pub fn new(reason: &'static str) -> Self {
        Self { reason }
    }

    /// A short description of what failed to grow.
    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

impl fmt::Display for FailedAllocationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.reason.fmt(f)
    }
}

impl Error for FailedAllocationError {}

pub trait FallibleVec<T> {
    /// Append |val| to the end of |vec|.  Returns Ok(()) on success,
    /// Err(reason) if it fails, with |reason| describing the failure.
    fn try_push(&mut self, value: T) -> Result<(), FailedAllocationError>;
}

impl<T> FallibleVec<T> for Vec<T> {
    #[inline(always)]
    fn try_push(&mut self, val: T) -> Result<(), FailedAllocationError> {
        if self.len() == self.capacity() {
            self.try_reserve(1)
                .map_err(|_| FailedAllocationError::new("capacity overflow for Vec"))?;
        }
        self.push(val);
        Ok(())
    }
}

impl<A: Array> FallibleVec<A::Item> for SmallVec<A> {
    #[inline(always)]
    fn try_push(&mut self, val: A::Item) -> Result<(), FailedAllocationError> {
        if self.len() == self.capacity() {
            self.try_reserve(1)
                .map_err(|_| FailedAllocationError::new("capacity overflow for SmallVec"))?;
        }
        self.push(val);
        Ok(())
    }
}

pub trait FallibleHashMap<K, V> {
    /// Like `HashMap::entry`, but makes sure there is room for one more
    /// entry first.
    fn try_entry(&mut self, key: K) -> Result<Entry<'_, K, V>, FailedAllocationError>;
}

impl<K, V, S> FallibleHashMap<K, V> for HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn try_entry(&mut self, key: K) -> Result<Entry<'_, K, V>, FailedAllocationError> {
        if !self.contains_key(&key) {
            self.try_reserve(1)
                .map_err(|_| FailedAllocationError::new("capacity overflow for HashMap"))?;
        }
        Ok(self.entry(key))
    }
}
