/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The [`@import`][import] at-rule.
//!
//! [import]: https://drafts.csswg.org/css-cascade-3/#at-import

use crate::stylesheets::Stylesheet;
use cssparser::SourceLocation;
use servo_arc::Arc;

/// The [`@import`][import] at-rule.
///
/// The imported sheet is already loaded; the media list of the import
/// is the imported sheet's own.
///
/// [import]: https://drafts.csswg.org/css-cascade-3/#at-import
#[derive(Debug)]
pub struct ImportRule {
    /// The URL the sheet was loaded from.
    pub url: Box<str>,
    /// The stylesheet is always present.
    pub stylesheet: Arc<Stylesheet>,
    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}
