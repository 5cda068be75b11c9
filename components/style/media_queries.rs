/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! [Media queries][mq], the device they are evaluated against, and the
//! record of evaluations a cached cascade depends on.
//!
//! [mq]: https://drafts.csswg.org/mediaqueries/

use crate::Atom;
use crate::stylesheets::UrlMatchingFunction;
use cascade_selectors::QuirksMode;
use cssparser::{ToCss, serialize_identifier};
use log::trace;
use std::fmt;
use url::Url;

/// A media type, like `screen` or `print`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MediaType(pub Atom);

impl MediaType {
    /// The `screen` media type.
    pub fn screen() -> Self {
        MediaType(Atom::from("screen"))
    }

    /// The `print` media type.
    pub fn print() -> Self {
        MediaType(Atom::from("print"))
    }
}

/// The characteristics of the output a document is styled for.
#[derive(Clone, Debug)]
pub struct Device {
    /// The current media type.
    pub media_type: MediaType,
    /// Viewport width, in CSS pixels.
    pub viewport_width: i32,
    /// Viewport height, in CSS pixels.
    pub viewport_height: i32,
    /// The document URL, tested by `@-moz-document`.
    pub document_url: Option<Url>,
}

impl Device {
    /// A device with no document URL.
    pub fn new(media_type: MediaType, viewport_width: i32, viewport_height: i32) -> Self {
        Device {
            media_type,
            viewport_width,
            viewport_height,
            document_url: None,
        }
    }

    /// Sets the URL `@-moz-document` rules are tested against.
    pub fn with_document_url(mut self, url: Url) -> Self {
        self.document_url = Some(url);
        self
    }
}

/// A type that encapsulates a media query list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaList {
    /// The list of media queries.
    pub media_queries: Vec<MediaQuery>,
}

impl MediaList {
    /// Create an empty MediaList, which matches every device.
    pub fn empty() -> Self {
        MediaList {
            media_queries: vec![],
        }
    }

    /// Evaluate a whole `MediaList` against `device`, noting every query
    /// outcome the result depends on in `key`.
    pub fn evaluate(&self, device: &Device, key: &mut CacheKey) -> bool {
        // Check if it is an empty media query list or any queries match.
        // https://drafts.csswg.org/mediaqueries-4/#mq-list
        self.media_queries.is_empty() ||
            self.media_queries
                .iter()
                .any(|query| query.evaluate(device, key))
    }

    /// Whether this `MediaList` contains no media queries.
    pub fn is_empty(&self) -> bool {
        self.media_queries.is_empty()
    }
}

impl ToCss for MediaList {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let mut first = true;
        for query in &self.media_queries {
            if !first {
                dest.write_str(", ")?;
            }
            first = false;
            query.to_css(dest)?;
        }
        Ok(())
    }
}

/// <https://drafts.csswg.org/mediaqueries/#mq-prefix>
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Qualifier {
    /// Hide a media query from legacy UAs:
    /// <https://drafts.csswg.org/mediaqueries/#mq-only>
    Only,
    /// Negate a media query:
    /// <https://drafts.csswg.org/mediaqueries/#mq-not>
    Not,
}

impl ToCss for Qualifier {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(match *self {
            Qualifier::Only => "only",
            Qualifier::Not => "not",
        })
    }
}

/// <http://dev.w3.org/csswg/mediaqueries-3/#media0>
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MediaQueryType {
    /// A media type that matches every device.
    All,
    /// A specific media type.
    Concrete(MediaType),
}

impl MediaQueryType {
    fn matches(&self, other: &MediaType) -> bool {
        match *self {
            MediaQueryType::All => true,
            MediaQueryType::Concrete(ref known_type) => known_type == other,
        }
    }
}

/// A [media query][mq].
///
/// [mq]: https://drafts.csswg.org/mediaqueries/
#[derive(Clone, Debug, PartialEq)]
pub struct MediaQuery {
    /// The qualifier for this query.
    pub qualifier: Option<Qualifier>,
    /// The media type for this query, that can be known, unknown, or "all".
    pub media_type: MediaQueryType,
    /// The set of expressions that this media query contains.
    pub expressions: Vec<Expression>,
}

impl MediaQuery {
    /// A query for a media type, without expressions.
    pub fn new(qualifier: Option<Qualifier>, media_type: MediaQueryType) -> Self {
        MediaQuery {
            qualifier,
            media_type,
            expressions: vec![],
        }
    }

    /// Adds `and (expression)`.
    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expressions.push(expression);
        self
    }

    /// Evaluates the query, recording each expression it evaluates, and
    /// the result, in `key`. Expressions stop being evaluated at the first
    /// that fails.
    pub fn evaluate(&self, device: &Device, key: &mut CacheKey) -> bool {
        let mut matches = self.media_type.matches(&device.media_type);
        for expression in &self.expressions {
            if !matches {
                break;
            }
            matches = expression.matches(device);
            key.add_expression(expression, matches);
        }
        trace!("Media query {:?} evaluated to {}", self, matches);
        matches != (self.qualifier == Some(Qualifier::Not))
    }
}

impl ToCss for MediaQuery {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        if let Some(qualifier) = self.qualifier {
            qualifier.to_css(dest)?;
            dest.write_char(' ')?;
        }

        match self.media_type {
            MediaQueryType::All => {
                // We need to print "all" if there's a qualifier, or there's
                // just an empty list of expressions.
                //
                // Otherwise, we'd serialize media queries like "(min-width:
                // 40px)" in "all (min-width: 40px)", which is unexpected.
                if self.qualifier.is_some() || self.expressions.is_empty() {
                    dest.write_str("all")?;
                }
            },
            MediaQueryType::Concrete(MediaType(ref desc)) => serialize_identifier(desc, dest)?,
        }

        if self.expressions.is_empty() {
            return Ok(());
        }

        if self.media_type != MediaQueryType::All || self.qualifier.is_some() {
            dest.write_str(" and ")?;
        }

        let mut first = true;
        for expression in &self.expressions {
            if !first {
                dest.write_str(" and ")?;
            }
            first = false;
            expression.to_css(dest)?;
        }
        Ok(())
    }
}

/// The viewport dimension a media expression tests.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MediaFeature {
    /// <https://drafts.csswg.org/mediaqueries/#width>
    Width,
    /// <https://drafts.csswg.org/mediaqueries/#height>
    Height,
}

/// How an expression compares the feature to its value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Range {
    /// `min-` prefix: at least the value.
    Min,
    /// `max-` prefix: at most the value.
    Max,
    /// No prefix: exactly the value.
    Eq,
}

/// A media expression, like `(min-width: 500px)`. Lengths are in CSS
/// pixels.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Expression {
    /// The feature tested.
    pub feature: MediaFeature,
    /// The comparison.
    pub range: Range,
    /// The value compared against, in CSS pixels.
    pub value: i32,
}

impl Expression {
    /// `(min-width: <value>px)` and friends.
    pub fn new(feature: MediaFeature, range: Range, value: i32) -> Self {
        Expression {
            feature,
            range,
            value,
        }
    }

    /// Evaluate this expression against `device`.
    pub fn matches(&self, device: &Device) -> bool {
        let actual = match self.feature {
            MediaFeature::Width => device.viewport_width,
            MediaFeature::Height => device.viewport_height,
        };
        match self.range {
            Range::Min => actual >= self.value,
            Range::Max => actual <= self.value,
            Range::Eq => actual == self.value,
        }
    }
}

impl ToCss for Expression {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_char('(')?;
        dest.write_str(match self.range {
            Range::Min => "min-",
            Range::Max => "max-",
            Range::Eq => "",
        })?;
        dest.write_str(match self.feature {
            MediaFeature::Width => "width",
            MediaFeature::Height => "height",
        })?;
        write!(dest, ": {}px)", self.value)
    }
}

/// Everything a cascade's contents were decided by: the medium and quirks
/// mode it was built for, and the outcome of each media expression and
/// `@-moz-document` condition evaluated while building it.
///
/// A cascade stays valid for a device as long as every recorded outcome
/// still holds for it.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheKey {
    medium: MediaType,
    quirks_mode: QuirksMode,
    expressions: Vec<(Expression, bool)>,
    document_conditions: Vec<(UrlMatchingFunction, bool)>,
}

impl CacheKey {
    /// A key with nothing evaluated yet.
    pub fn new(device: &Device, quirks_mode: QuirksMode) -> Self {
        CacheKey {
            medium: device.media_type.clone(),
            quirks_mode,
            expressions: vec![],
            document_conditions: vec![],
        }
    }

    /// Returns the medium this key was created for.
    pub fn medium(&self) -> &MediaType {
        &self.medium
    }

    /// Notes that `expression` evaluated to `result`.
    pub fn add_expression(&mut self, expression: &Expression, result: bool) {
        self.expressions.push((*expression, result));
    }

    /// Notes that `condition` evaluated to `result`.
    pub fn add_document_condition(&mut self, condition: &UrlMatchingFunction, result: bool) {
        self.document_conditions.push((condition.clone(), result));
    }

    /// Whether everything recorded in this key evaluates the same way for
    /// `device` and `quirks_mode`.
    pub fn matches(&self, device: &Device, quirks_mode: QuirksMode) -> bool {
        self.medium == device.media_type &&
            self.quirks_mode == quirks_mode &&
            self.expressions
                .iter()
                .all(|(expression, result)| expression.matches(device) == *result) &&
            self.document_conditions
                .iter()
                .all(|(condition, result)| condition.evaluate(device) == *result)
    }
}
