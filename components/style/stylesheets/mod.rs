/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Style sheets and their CSS rules.

mod document_rule;
mod font_face_rule;
mod import_rule;
mod media_rule;
pub mod origin;
mod style_rule;

use crate::media_queries::{CacheKey, Device, MediaList};
use log::debug;
use servo_arc::Arc;

pub use self::document_rule::{DocumentRule, UrlMatchingFunction};
pub use self::font_face_rule::{FontFaceRule, Source};
pub use self::import_rule::ImportRule;
pub use self::media_rule::MediaRule;
pub use self::origin::Origin;
pub use self::style_rule::{DeclarationBlock, Importance, PropertyDeclaration, StyleRule};

/// A CSS rule.
#[derive(Clone, Debug)]
pub enum CssRule {
    /// An `@import` rule, whose sheet is walked before the rules of the
    /// importing sheet.
    Import(Arc<ImportRule>),
    /// A style rule.
    Style(Arc<StyleRule>),
    /// An `@media` rule.
    Media(Arc<MediaRule>),
    /// An `@-moz-document` rule.
    Document(Arc<DocumentRule>),
    /// An `@font-face` rule.
    FontFace(Arc<FontFaceRule>),
}

/// A stylesheet: its rules in source order, the media it applies to, and
/// where it comes from.
#[derive(Debug)]
pub struct Stylesheet {
    /// The origin of this stylesheet.
    pub origin: Origin,
    /// The media this sheet applies to. Empty means all.
    pub media: MediaList,
    /// Disabled sheets contribute nothing to the cascade.
    pub disabled: bool,
    /// The top-level rules, in source order.
    pub rules: Vec<CssRule>,
}

impl Stylesheet {
    /// An enabled sheet for all media.
    pub fn new(origin: Origin, rules: Vec<CssRule>) -> Self {
        Stylesheet {
            origin,
            media: MediaList::empty(),
            disabled: false,
            rules,
        }
    }

    /// Restricts this sheet to `media`.
    pub fn with_media(mut self, media: MediaList) -> Self {
        self.media = media;
        self
    }

    /// Returns whether the stylesheet has been explicitly disabled through
    /// the CSSOM.
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    /// Returns whether the style-sheet applies for the current device,
    /// noting the media evaluation in `key`.
    pub fn is_effective_for_device(&self, device: &Device, key: &mut CacheKey) -> bool {
        !self.disabled && self.media.evaluate(device, key)
    }

    /// Runs `f` on every style and `@font-face` rule of this sheet that
    /// applies to `device`, in cascade order: imported sheets first, then
    /// this sheet's rules, descending into the `@media` and
    /// `@-moz-document` rules that apply.
    ///
    /// The sheet's own media list is not looked at; see
    /// [`Stylesheet::is_effective_for_device`].
    pub fn effective_rules<F>(&self, device: &Device, key: &mut CacheKey, f: &mut F)
    where
        F: FnMut(&CssRule),
    {
        for rule in &self.rules {
            if let CssRule::Import(ref import) = *rule {
                let sheet = &import.stylesheet;
                if sheet.is_effective_for_device(device, key) {
                    sheet.effective_rules(device, key, f);
                } else {
                    debug!("Skipping import of {}", import.url);
                }
            }
        }
        effective_rules_in(&self.rules, device, key, f);
    }
}

fn effective_rules_in<F>(rules: &[CssRule], device: &Device, key: &mut CacheKey, f: &mut F)
where
    F: FnMut(&CssRule),
{
    for rule in rules {
        match *rule {
            // Already walked.
            CssRule::Import(..) => {},
            CssRule::Style(..) | CssRule::FontFace(..) => f(rule),
            CssRule::Media(ref media) => {
                if media.media_queries.evaluate(device, key) {
                    effective_rules_in(&media.rules, device, key, f);
                }
            },
            CssRule::Document(ref document) => {
                if document.evaluate(device, key) {
                    effective_rules_in(&document.rules, device, key, f);
                }
            },
        }
    }
}
