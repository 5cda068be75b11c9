/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A style rule, and the declaration block it carries.

use crate::Atom;
use cascade_selectors::SelectorList;
use cssparser::{SourceLocation, ToCss, serialize_identifier};
use servo_arc::Arc;
use std::fmt;

/// Whether a declaration was marked `!important`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Importance {
    /// Indicates a declaration without `!important`.
    Normal,
    /// Indicates a declaration with `!important`.
    Important,
}

/// A single property declaration, kept as the text it was written with.
/// Nothing in the cascade looks inside it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyDeclaration {
    /// The property name.
    pub name: Atom,
    /// The specified value, unparsed.
    pub value: Box<str>,
    /// Whether the declaration is `!important`.
    pub importance: Importance,
}

/// The declarations of a rule, in source order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeclarationBlock {
    declarations: Vec<PropertyDeclaration>,
}

impl DeclarationBlock {
    /// An empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `name: value`.
    pub fn with_declaration(mut self, name: &str, value: &str, importance: Importance) -> Self {
        self.declarations.push(PropertyDeclaration {
            name: Atom::from(name),
            value: value.into(),
            importance,
        });
        self
    }

    /// The declarations, in source order.
    pub fn declarations(&self) -> &[PropertyDeclaration] {
        &self.declarations
    }

    /// Number of declarations in this block.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether the block is empty.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Returns whether any declaration is `!important`.
    pub fn any_important(&self) -> bool {
        self.declarations
            .iter()
            .any(|d| d.importance == Importance::Important)
    }
}

impl ToCss for DeclarationBlock {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let mut first = true;
        for declaration in &self.declarations {
            if !first {
                dest.write_char(' ')?;
            }
            first = false;
            serialize_identifier(&declaration.name, dest)?;
            dest.write_str(": ")?;
            dest.write_str(&declaration.value)?;
            if declaration.importance == Importance::Important {
                dest.write_str(" !important")?;
            }
            dest.write_char(';')?;
        }
        Ok(())
    }
}

/// A style rule, with selectors and declarations.
///
/// Immutable once shared: changing the declarations goes through
/// [`StyleRule::with_block`], which leaves every existing reference to the
/// old rule untouched.
#[derive(Debug)]
pub struct StyleRule {
    /// The list of selectors in this rule.
    pub selectors: SelectorList,
    /// The declaration block with the properties it contains.
    pub block: Arc<DeclarationBlock>,
    /// The location in the sheet where it was found.
    pub source_location: SourceLocation,
}

impl StyleRule {
    /// Creates a rule found at `source_location`.
    pub fn new(selectors: SelectorList, block: DeclarationBlock, source_location: SourceLocation) -> Self {
        StyleRule {
            selectors,
            block: Arc::new(block),
            source_location,
        }
    }

    /// A new rule with the same selectors and location as this one, and
    /// `block` as its declarations.
    pub fn with_block(&self, block: DeclarationBlock) -> Arc<StyleRule> {
        Arc::new(StyleRule {
            selectors: self.selectors.clone(),
            block: Arc::new(block),
            source_location: self.source_location,
        })
    }
}

impl ToCss for StyleRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        self.selectors.to_css(dest)?;
        dest.write_str(" { ")?;
        self.block.to_css(dest)?;
        if !self.block.is_empty() {
            dest.write_char(' ')?;
        }
        dest.write_char('}')
    }
}
