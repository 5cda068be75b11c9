/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The [`@font-face`][ff] at-rule.
//!
//! [ff]: https://drafts.csswg.org/css-fonts/#at-font-face-rule

use cssparser::SourceLocation;

/// A source for a font-face rule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// A `url()` source, with its format hints.
    Url {
        /// The font URL.
        url: Box<str>,
        /// The `format()` hints, if any.
        format_hints: Vec<Box<str>>,
    },
    /// A `local()` source.
    Local(Box<str>),
}

/// An `@font-face` rule. The cascade only collects these; their
/// descriptors are for the font loader.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FontFaceRule {
    /// The `font-family` descriptor.
    pub family: Box<str>,
    /// The `src` descriptor, in preference order.
    pub sources: Vec<Source>,
    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}

impl FontFaceRule {
    /// Returns the sources worth downloading: those without format hints,
    /// or listing at least one format we support.
    pub fn effective_sources(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter().filter(|source| match **source {
            Source::Url {
                ref format_hints, ..
            } => {
                format_hints.is_empty() ||
                    format_hints
                        .iter()
                        .any(|hint| matches!(&**hint, "truetype" | "opentype" | "woff"))
            },
            Source::Local(..) => true,
        })
    }
}
