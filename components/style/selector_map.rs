/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A data structure to efficiently index structs containing selectors by local
//! name, ids and hash.

use crate::Atom;
use crate::hash::{FxHashMap, HashMap};
use crate::hash::map as hash_map;
use cascade_selectors::parser::{LocalName, NamespaceConstraint};
use cascade_selectors::{NamespaceId, QuirksMode, Selector};
use fallible::{FailedAllocationError, FallibleHashMap, FallibleVec};
use precomputed_hash::PrecomputedHash;
use smallvec::SmallVec;
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::ptr;

/// A hasher implementation that doesn't hash anything, because it expects its
/// input to be a suitable u32 hash.
#[derive(Default)]
pub struct PrecomputedHasher {
    hash: Option<u32>,
}

/// A simple alias for a hashmap using PrecomputedHasher.
pub type PrecomputedHashMap<K, V> = HashMap<K, V, BuildHasherDefault<PrecomputedHasher>>;

impl Hasher for PrecomputedHasher {
    #[inline]
    fn write(&mut self, _: &[u8]) {
        unreachable!("Called into PrecomputedHasher with something that isn't a u32")
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        debug_assert!(self.hash.is_none());
        self.hash = Some(i);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash.unwrap_or_default() as u64
    }
}

/// A trait to abstract over a given selector map entry.
pub trait SelectorMapEntry: Sized + Clone {
    /// Gets the selector whose rightmost compound we index by.
    fn selector(&self) -> &Selector;

    /// The position of the entry in the cascade. Entries are inserted in
    /// increasing order.
    fn source_order(&self) -> u32;
}

/// Map element data to selector-providing objects for which the last simple
/// selector starts with them.
///
/// e.g.,
/// "p > img" would go into the set of selectors corresponding to the
/// element "img"
/// "a .foo .bar.baz" would go into the set of selectors corresponding to
/// the class "bar"
///
/// Because we match selectors right-to-left (i.e., moving up the tree
/// from an element), we need to compare the last simple selector in the
/// selector with the element.
///
/// Each entry goes into exactly one bucket, picked from its rightmost
/// compound: the first id if any, else the first class, else the tag, else
/// a specific namespace, else the universal list. An element can only match
/// an entry if the entry is in the bucket for the element's id, one of its
/// classes, its tag or its namespace, or in the universal list.
///
/// We use a 1-entry SmallVec to avoid a separate heap allocation in the case
/// where we only have one entry, which is quite common.
#[derive(Debug)]
pub struct SelectorMap<T: 'static> {
    /// A hash from an ID to rules which contain that ID selector.
    pub id_hash: MaybeCaseInsensitiveHashMap<Atom, SmallVec<[T; 1]>>,
    /// A hash from a class name to rules which contain that class selector.
    pub class_hash: MaybeCaseInsensitiveHashMap<Atom, SmallVec<[T; 1]>>,
    /// A hash from local name to rules which contain that local name selector.
    pub local_name_hash: PrecomputedHashMap<Atom, SmallVec<[T; 1]>>,
    /// Rules whose only constraint on the rightmost compound is a namespace.
    pub namespace_hash: FxHashMap<NamespaceId, SmallVec<[T; 1]>>,
    /// Rules that don't have ID, class, element or namespace selectors.
    pub other: SmallVec<[T; 1]>,
    /// The number of entries in this map.
    pub count: usize,
}

impl<T: 'static> Default for SelectorMap<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> SelectorMap<T> {
    /// Trivially constructs an empty `SelectorMap`.
    pub fn new() -> Self {
        SelectorMap {
            id_hash: MaybeCaseInsensitiveHashMap::new(),
            class_hash: MaybeCaseInsensitiveHashMap::new(),
            local_name_hash: HashMap::default(),
            namespace_hash: FxHashMap::default(),
            other: SmallVec::new(),
            count: 0,
        }
    }

    /// Returns whether there are any entries in the map.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.count
    }
}

impl<T: SelectorMapEntry> SelectorMap<T> {
    /// Inserts into the correct hash, trying id, class, local name and
    /// namespace.
    ///
    /// Entries must come in increasing source order, so that every bucket
    /// stays sorted.
    pub fn insert(&mut self, entry: T, quirks_mode: QuirksMode) -> Result<(), FailedAllocationError> {
        self.count += 1;

        let vector = match find_bucket(entry.selector()) {
            Bucket::ID(id) => self
                .id_hash
                .try_entry(id.clone(), quirks_mode)?
                .or_insert_with(SmallVec::new),
            Bucket::Class(class) => self
                .class_hash
                .try_entry(class.clone(), quirks_mode)?
                .or_insert_with(SmallVec::new),
            Bucket::LocalName(local_name) => {
                // If the local name in the selector isn't lowercase, insert it
                // into the rule hash twice. This means that, during lookup, we
                // can always find the rules based on the local name of the
                // element, regardless of whether it's an html element in an
                // html document (in which case we match against lower_name) or
                // not (in which case we match against name).
                //
                // An element has a single local name, so at most one of the
                // two copies is ever looked at for it.
                if local_name.name != local_name.lower_name {
                    self.local_name_hash
                        .try_entry(local_name.lower_name.clone())?
                        .or_insert_with(SmallVec::new)
                        .try_push(entry.clone())?;
                }
                self.local_name_hash
                    .try_entry(local_name.name.clone())?
                    .or_insert_with(SmallVec::new)
            },
            Bucket::Namespace(namespace) => self
                .namespace_hash
                .try_entry(namespace)?
                .or_insert_with(SmallVec::new),
            Bucket::Universal => &mut self.other,
        };

        vector.try_push(entry)
    }

    /// Calls `f` on every entry that could match an element with the given
    /// namespace, local name, id and classes, in increasing source order.
    ///
    /// The buckets for the element are already sorted; they are merged by
    /// repeatedly taking the lowest head among them.
    pub fn enumerate_all_rules<F>(
        &self,
        namespace: NamespaceId,
        local_name: &Atom,
        id: Option<&Atom>,
        classes: &[Atom],
        quirks_mode: QuirksMode,
        mut f: F,
    ) where
        F: FnMut(&T),
    {
        if self.is_empty() {
            return;
        }

        let mut streams: SmallVec<[&[T]; 8]> = SmallVec::new();
        push_stream(&mut streams, &self.other);
        if let Some(rules) = self.namespace_hash.get(&namespace) {
            push_stream(&mut streams, rules);
        }
        if let Some(rules) = self.local_name_hash.get(local_name) {
            push_stream(&mut streams, rules);
        }
        if let Some(rules) = id.and_then(|id| self.id_hash.get(id, quirks_mode)) {
            push_stream(&mut streams, rules);
        }
        for class in classes {
            if let Some(rules) = self.class_hash.get(class, quirks_mode) {
                push_stream(&mut streams, rules);
            }
        }

        while streams.len() > 1 {
            let mut lowest = 0;
            for (i, stream) in streams.iter().enumerate().skip(1) {
                if stream[0].source_order() < streams[lowest][0].source_order() {
                    lowest = i;
                }
            }
            let current = streams[lowest];
            f(&current[0]);
            if current.len() == 1 {
                streams.swap_remove(lowest);
            } else {
                streams[lowest] = &current[1..];
            }
        }

        if let Some(last) = streams.pop() {
            for entry in last {
                f(entry);
            }
        }
    }
}

/// Adds a non-empty bucket to the streams being merged, unless it is
/// already there (an element may list the same class twice, or two classes
/// that fold to the same bucket in quirks mode).
#[inline]
fn push_stream<'a, T>(streams: &mut SmallVec<[&'a [T]; 8]>, entries: &'a [T]) {
    if entries.is_empty() || streams.iter().any(|s| ptr::eq(s.as_ptr(), entries.as_ptr())) {
        return;
    }
    streams.push(entries);
}

enum Bucket<'a> {
    ID(&'a Atom),
    Class(&'a Atom),
    LocalName(&'a LocalName),
    Namespace(NamespaceId),
    Universal,
}

/// Picks the bucket for the rightmost compound of `selector`.
#[inline(always)]
fn find_bucket(selector: &Selector) -> Bucket<'_> {
    if let Some(id) = selector.ids.first() {
        return Bucket::ID(id);
    }
    if let Some(class) = selector.classes.first() {
        return Bucket::Class(class);
    }
    if let Some(ref local_name) = selector.local_name {
        return Bucket::LocalName(local_name);
    }
    match selector.namespace {
        NamespaceConstraint::Specific(namespace) => Bucket::Namespace(namespace),
        NamespaceConstraint::Any => Bucket::Universal,
    }
}

/// Wrapper for PrecomputedHashMap that does ASCII-case-insensitive lookup in quirks mode.
#[derive(Debug)]
pub struct MaybeCaseInsensitiveHashMap<K: PrecomputedHash + Hash + Eq, V: 'static>(PrecomputedHashMap<K, V>);

impl<V: 'static> Default for MaybeCaseInsensitiveHashMap<Atom, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: 'static> MaybeCaseInsensitiveHashMap<Atom, V> {
    /// Empty map
    pub fn new() -> Self {
        MaybeCaseInsensitiveHashMap(PrecomputedHashMap::default())
    }

    /// HashMap::try_entry
    pub fn try_entry(
        &mut self,
        mut key: Atom,
        quirks_mode: QuirksMode,
    ) -> Result<hash_map::Entry<'_, Atom, V>, FailedAllocationError> {
        if quirks_mode == QuirksMode::Quirks {
            key = key.to_ascii_lowercase()
        }
        self.0.try_entry(key)
    }

    /// HashMap::iter
    pub fn iter(&self) -> hash_map::Iter<'_, Atom, V> {
        self.0.iter()
    }

    /// HashMap::len
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// HashMap::is_empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// HashMap::get
    pub fn get(&self, key: &Atom, quirks_mode: QuirksMode) -> Option<&V> {
        if quirks_mode == QuirksMode::Quirks {
            self.0.get(&key.to_ascii_lowercase())
        } else {
            self.0.get(key)
        }
    }
}
