/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Hash map aliases used across the cascade.

pub use std::collections::HashMap;
pub use std::collections::hash_map as map;

/// Hash map that uses the Fx hasher
pub type FxHashMap<K, V> = HashMap<K, V, rustc_hash::FxBuildHasher>;
