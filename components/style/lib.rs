/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The rule cascade: an index of the style rules that apply to a medium,
//! built from a set of stylesheets, and the queries run against it.
//!
//! [`stylist::Stylist`] owns the stylesheets and hands out a
//! [`stylist::CascadeData`] per evaluated medium. The cascade data answers
//! "which rules match this element, in cascade order" and "could this
//! state or attribute change alter the style of this element".

#![warn(missing_docs)]

pub mod applicable_declarations;
pub mod context;
pub mod hash;
pub mod media_queries;
pub mod restyle_hints;
pub mod selector_map;
pub mod sink;
pub mod stylesheets;
pub mod stylist;

pub use cascade_selectors::Atom;
