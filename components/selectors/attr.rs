/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::Atom;
use crate::parser::NamespaceConstraint;
use crate::tree::NamespaceId;
use cssparser::{ToCss, serialize_identifier, serialize_string};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CaseSensitivity {
    CaseSensitive,
    AsciiCaseInsensitive,
}

impl CaseSensitivity {
    pub fn eq(self, a: &str, b: &str) -> bool {
        match self {
            CaseSensitivity::CaseSensitive => a == b,
            CaseSensitivity::AsciiCaseInsensitive => a.eq_ignore_ascii_case(b),
        }
    }

    pub fn eq_atom(self, a: &Atom, b: &Atom) -> bool {
        match self {
            CaseSensitivity::CaseSensitive => a == b,
            CaseSensitivity::AsciiCaseInsensitive => a.eq_ignore_ascii_case(b),
        }
    }

    fn starts_with(self, haystack: &str, prefix: &str) -> bool {
        haystack
            .as_bytes()
            .get(..prefix.len())
            .is_some_and(|start| match self {
                CaseSensitivity::CaseSensitive => start == prefix.as_bytes(),
                CaseSensitivity::AsciiCaseInsensitive => {
                    start.eq_ignore_ascii_case(prefix.as_bytes())
                },
            })
    }

    fn ends_with(self, haystack: &str, suffix: &str) -> bool {
        haystack
            .len()
            .checked_sub(suffix.len())
            .is_some_and(|start| {
                let end = &haystack.as_bytes()[start..];
                match self {
                    CaseSensitivity::CaseSensitive => end == suffix.as_bytes(),
                    CaseSensitivity::AsciiCaseInsensitive => {
                        end.eq_ignore_ascii_case(suffix.as_bytes())
                    },
                }
            })
    }

    fn contains(self, haystack: &str, needle: &str) -> bool {
        match self {
            CaseSensitivity::CaseSensitive => haystack.contains(needle),
            CaseSensitivity::AsciiCaseInsensitive => {
                let needle = needle.as_bytes();
                haystack
                    .as_bytes()
                    .windows(needle.len())
                    .any(|window| window.eq_ignore_ascii_case(needle))
            },
        }
    }
}

/// <https://html.spec.whatwg.org/multipage/#space-character>
pub static HTML_SPACE_CHARACTERS: &[char] = &[' ', '\t', '\n', '\r', '\x0C'];

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttrSelectorOperator {
    Exists,    // [attr]
    Equal,     // [attr=value]
    Includes,  // [attr~=value]
    DashMatch, // [attr|=value]
    Prefix,    // [attr^=value]
    Substring, // [attr*=value]
    Suffix,    // [attr$=value]
}

impl AttrSelectorOperator {
    pub fn eval_str(
        self,
        element_attr_value: &str,
        attr_selector_value: &str,
        case_sensitivity: CaseSensitivity,
    ) -> bool {
        let e = element_attr_value;
        let s = attr_selector_value;
        match self {
            AttrSelectorOperator::Exists => true,
            AttrSelectorOperator::Equal => case_sensitivity.eq(e, s),
            // An empty value can never be a token, a prefix, a suffix or a
            // substring for these purposes.
            AttrSelectorOperator::Includes => {
                !s.is_empty() &&
                    e.split(HTML_SPACE_CHARACTERS)
                        .any(|part| case_sensitivity.eq(part, s))
            },
            AttrSelectorOperator::DashMatch => {
                case_sensitivity.starts_with(e, s) &&
                    (e.len() == s.len() || e.as_bytes()[s.len()] == b'-')
            },
            AttrSelectorOperator::Prefix => !s.is_empty() && case_sensitivity.starts_with(e, s),
            AttrSelectorOperator::Suffix => !s.is_empty() && case_sensitivity.ends_with(e, s),
            AttrSelectorOperator::Substring => !s.is_empty() && case_sensitivity.contains(e, s),
        }
    }
}

impl ToCss for AttrSelectorOperator {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(match *self {
            AttrSelectorOperator::Exists => "",
            AttrSelectorOperator::Equal => "=",
            AttrSelectorOperator::Includes => "~=",
            AttrSelectorOperator::DashMatch => "|=",
            AttrSelectorOperator::Prefix => "^=",
            AttrSelectorOperator::Substring => "*=",
            AttrSelectorOperator::Suffix => "$=",
        })
    }
}

/// An attribute predicate of a compound selector.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttrSelector {
    pub namespace: NamespaceConstraint,
    pub name: Atom,
    pub lower_name: Atom,
    pub operator: AttrSelectorOperator,
    pub value: Box<str>,
    /// Whether the value comparison stays case-sensitive on HTML elements.
    /// Values always compare case-sensitively elsewhere.
    pub case_sensitive: bool,
}

impl AttrSelector {
    /// `[name]`, in the null namespace.
    pub fn exists(name: &str) -> Self {
        Self::new(name, AttrSelectorOperator::Exists, "")
    }

    /// `[name <op> "value"]`, in the null namespace.
    pub fn new(name: &str, operator: AttrSelectorOperator, value: &str) -> Self {
        AttrSelector {
            namespace: NamespaceConstraint::Specific(NamespaceId::NONE),
            name: Atom::from(name),
            lower_name: Atom::from(name.to_ascii_lowercase()),
            operator,
            value: value.into(),
            case_sensitive: true,
        }
    }

    pub fn with_namespace(mut self, namespace: NamespaceConstraint) -> Self {
        self.namespace = namespace;
        self
    }

    /// Makes the value comparison ASCII-case-insensitive on HTML elements,
    /// as HTML does for attributes like `type` or `lang`.
    pub fn case_insensitive_for_html(mut self) -> Self {
        self.case_sensitive = false;
        self
    }
}

impl ToCss for AttrSelector {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_char('[')?;
        if self.namespace == NamespaceConstraint::Any {
            dest.write_str("*|")?;
        }
        serialize_identifier(&self.name, dest)?;
        if self.operator != AttrSelectorOperator::Exists {
            self.operator.to_css(dest)?;
            serialize_string(&self.value, dest)?;
        }
        dest.write_char(']')
    }
}
