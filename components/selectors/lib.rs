/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Compound selector chains, the read-only DOM interface they are tested
//! against, and the matching algorithm.

pub mod attr;
pub mod context;
pub mod element_state;
pub mod matching;
pub mod parser;
mod tree;

/// Interned names: tags, ids, classes and attributes.
pub type Atom = string_cache::DefaultAtom;

pub use crate::context::{DocumentContext, MatchingContext, NodeMatchingContext, QuirksMode};
pub use crate::context::VisitedHandlingMode;
pub use crate::parser::{Combinator, ComplexSelector, PseudoClass, PseudoElement, Selector, SelectorList};
pub use crate::tree::{Element, NamespaceId};
