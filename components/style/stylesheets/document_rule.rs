/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! [@document rules](https://www.w3.org/TR/2012/WD-css3-conditional-20120911/#at-document)
//! initially in CSS Conditional Rules Module Level 3, @document has been postponed to the level 4.
//! We implement the prefixed `@-moz-document`.

use crate::media_queries::{CacheKey, Device};
use crate::stylesheets::CssRule;
use cssparser::{SourceLocation, ToCss, serialize_string};
use std::fmt;

/// An [`@-moz-document`][document] rule.
///
/// [document]: https://www.w3.org/TR/2012/WD-css3-conditional-20120911/#at-document
#[derive(Debug)]
pub struct DocumentRule {
    /// The parsed condition
    pub conditions: Vec<UrlMatchingFunction>,
    /// Child rules
    pub rules: Vec<CssRule>,
    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}

impl DocumentRule {
    /// Whether any condition holds for `device`. Every condition looked at
    /// is recorded in `key`.
    pub fn evaluate(&self, device: &Device, key: &mut CacheKey) -> bool {
        self.conditions.iter().any(|condition| {
            let result = condition.evaluate(device);
            key.add_document_condition(condition, result);
            result
        })
    }
}

/// A URL matching function for a `@document` rule's condition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UrlMatchingFunction {
    /// Exact URL matching function. It evaluates to true whenever the
    /// URL of the document being styled is exactly the URL given.
    Url(Box<str>),
    /// URL prefix matching function. It evaluates to true whenever the
    /// URL of the document being styled has the argument to the
    /// function as an initial substring (which is true when the two
    /// strings are equal). When the argument is the empty string,
    /// it evaluates to true for all documents.
    UrlPrefix(Box<str>),
    /// Domain matching function. It evaluates to true whenever the URL
    /// of the document being styled has a host subcomponent and that
    /// host subcomponent is exactly the argument to the ‘domain()’
    /// function or a final substring of the host component is a
    /// period (U+002E) immediately followed by the argument to the
    /// ‘domain()’ function.
    Domain(Box<str>),
}

impl UrlMatchingFunction {
    /// Evaluate a URL matching function. A device without a document URL
    /// matches nothing.
    pub fn evaluate(&self, device: &Device) -> bool {
        let Some(ref url) = device.document_url else {
            return false;
        };
        match *self {
            UrlMatchingFunction::Url(ref expected) => url.as_str() == &**expected,
            UrlMatchingFunction::UrlPrefix(ref prefix) => url.as_str().starts_with(&**prefix),
            UrlMatchingFunction::Domain(ref domain) => url.host_str().is_some_and(|host| {
                host == &**domain ||
                    host.strip_suffix(&**domain)
                        .is_some_and(|rest| rest.ends_with('.'))
            }),
        }
    }
}

impl ToCss for UrlMatchingFunction {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let (name, argument) = match *self {
            UrlMatchingFunction::Url(ref url) => ("url", url),
            UrlMatchingFunction::UrlPrefix(ref prefix) => ("url-prefix", prefix),
            UrlMatchingFunction::Domain(ref domain) => ("domain", domain),
        };
        dest.write_str(name)?;
        dest.write_char('(')?;
        serialize_string(argument, dest)?;
        dest.write_char(')')
    }
}
