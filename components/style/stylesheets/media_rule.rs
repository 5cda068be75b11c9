/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! An [`@media`][media] rule.
//!
//! [media]: https://drafts.csswg.org/css-conditional/#at-ruledef-media

use crate::media_queries::MediaList;
use crate::stylesheets::CssRule;
use cssparser::SourceLocation;

/// An [`@media`][media] rule.
///
/// [media]: https://drafts.csswg.org/css-conditional/#at-ruledef-media
#[derive(Debug)]
pub struct MediaRule {
    /// The list of media queries used by this media rule.
    pub media_queries: MediaList,
    /// The nested rules to this media rule.
    pub rules: Vec<CssRule>,
    /// The source position where this media rule was found.
    pub source_location: SourceLocation,
}
