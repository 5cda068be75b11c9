/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The selector model: compound selectors chained right to left by
//! combinators, and the lists of alternatives rules are keyed by.
//!
//! Selectors reach this crate already built; the builder methods on
//! [`Selector`] are what a parser (or a test) uses to assemble them.

use crate::Atom;
use crate::attr::AttrSelector;
use crate::element_state::{DocumentState, ElementState};
use crate::tree::NamespaceId;
use cssparser::{ToCss, serialize_identifier};
use servo_arc::Arc;
use smallvec::SmallVec;
use std::cmp;
use std::fmt;
use std::ops::Add;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Combinator {
    Child,        //  >
    Descendant,   // space
    NextSibling,  // +
    LaterSibling, // ~
}

impl Combinator {
    /// Returns true if this combinator is a child or descendant combinator.
    #[inline]
    pub fn is_ancestor(&self) -> bool {
        matches!(*self, Combinator::Child | Combinator::Descendant)
    }

    /// Returns true if this combinator is a next- or later-sibling combinator.
    #[inline]
    pub fn is_sibling(&self) -> bool {
        matches!(*self, Combinator::NextSibling | Combinator::LaterSibling)
    }

    /// Returns true if a failed match may be retried further up the tree
    /// (or further back among the siblings).
    #[inline]
    pub fn is_greedy(&self) -> bool {
        matches!(*self, Combinator::Descendant | Combinator::LaterSibling)
    }
}

impl ToCss for Combinator {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(match *self {
            Combinator::Child => " > ",
            Combinator::Descendant => " ",
            Combinator::NextSibling => " + ",
            Combinator::LaterSibling => " ~ ",
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NamespaceConstraint {
    Any,
    Specific(NamespaceId),
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct LocalName {
    pub name: Atom,
    pub lower_name: Atom,
}

impl LocalName {
    pub fn new(name: &str) -> Self {
        LocalName {
            name: Atom::from(name),
            lower_name: Atom::from(name.to_ascii_lowercase()),
        }
    }
}

/// The `an+b` argument of the `:nth-*` pseudo-classes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NthSelectorData {
    pub a: i32,
    pub b: i32,
}

impl NthSelectorData {
    pub const fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// The `an+b` of `:first-child` and friends.
    pub const fn first() -> Self {
        Self::new(0, 1)
    }

    /// Returns whether the 1-based `index` equals `a*n + b` for some n >= 0.
    pub fn matches_index(&self, index: i32) -> bool {
        if index <= 0 {
            return false;
        }
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        let index = i64::from(index);
        if a == 0 {
            return b == index;
        }
        let n = (index - b) / a;
        n >= 0 && a * n == index - b
    }
}

impl ToCss for NthSelectorData {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match (self.a, self.b) {
            (0, b) => write!(dest, "{}", b),
            (a, b) => {
                match a {
                    1 => dest.write_char('n')?,
                    -1 => dest.write_str("-n")?,
                    a => write!(dest, "{}n", a)?,
                }
                match b {
                    0 => Ok(()),
                    b if b > 0 => write!(dest, "+{}", b),
                    b => write!(dest, "{}", b),
                }
            },
        }
    }
}

/// A pseudo-class and its argument, if any.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PseudoClass {
    Empty,
    MozOnlyWhitespace,
    Root,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthSelectorData),
    NthLastChild(NthSelectorData),
    NthOfType(NthSelectorData),
    NthLastOfType(NthSelectorData),
    Lang(Box<str>),
    /// `:-moz-any()`, over compound selectors only.
    MozAny(SelectorList),
    MozIsHTML,
    MozSystemMetric(Atom),
    MozLocaleDir(Box<str>),
    MozLWTheme,
    MozLWThemeBrightText,
    MozLWThemeDarkText,
    MozWindowInactive,
    MozFirstNode,
    MozLastNode,
    MozEmptyExceptChildrenWithLocalname(Atom),
    MozHasHandlerRef,

    Link,
    Visited,
    AnyLink,
    Hover,
    Active,
    Focus,
    Enabled,
    Disabled,
    Checked,
    Indeterminate,
    Target,
    Required,
    Optional,
    Valid,
    Invalid,
    InRange,
    OutOfRange,
    ReadOnly,
    ReadWrite,
    Default,
    MozPlaceholder,
    MozFocusRing,
}

impl PseudoClass {
    /// The element state bits this pseudo-class tests, empty when it
    /// doesn't depend on element state.
    pub fn state_flag(&self) -> ElementState {
        match *self {
            PseudoClass::Link => ElementState::UNVISITED,
            PseudoClass::Visited => ElementState::VISITED,
            PseudoClass::AnyLink => ElementState::LINK_STATES,
            PseudoClass::Hover => ElementState::HOVER,
            PseudoClass::Active => ElementState::ACTIVE,
            PseudoClass::Focus => ElementState::FOCUS,
            PseudoClass::Enabled => ElementState::ENABLED,
            PseudoClass::Disabled => ElementState::DISABLED,
            PseudoClass::Checked => ElementState::CHECKED,
            PseudoClass::Indeterminate => ElementState::INDETERMINATE,
            PseudoClass::Target => ElementState::TARGET,
            PseudoClass::Required => ElementState::REQUIRED,
            PseudoClass::Optional => ElementState::OPTIONAL,
            PseudoClass::Valid => ElementState::VALID,
            PseudoClass::Invalid => ElementState::INVALID,
            PseudoClass::InRange => ElementState::INRANGE,
            PseudoClass::OutOfRange => ElementState::OUTOFRANGE,
            PseudoClass::ReadOnly => ElementState::READONLY,
            PseudoClass::ReadWrite => ElementState::READWRITE,
            PseudoClass::Default => ElementState::DEFAULT,
            PseudoClass::MozPlaceholder => ElementState::PLACEHOLDER_SHOWN,
            PseudoClass::MozFocusRing => ElementState::FOCUSRING,
            _ => ElementState::empty(),
        }
    }

    /// `:-moz-any()` over `selectors`. Only the rightmost compound of each
    /// selector takes part, as for `:not()`.
    pub fn any<I>(selectors: I) -> Self
    where
        I: IntoIterator<Item = Selector>,
    {
        PseudoClass::MozAny(SelectorList::new(selectors.into_iter().map(|mut selector| {
            selector.next = None;
            selector
        })))
    }

    /// The document state bits this pseudo-class tests.
    pub fn document_state_flag(&self) -> DocumentState {
        match *self {
            PseudoClass::MozLocaleDir(..) => DocumentState::RTL_LOCALE,
            PseudoClass::MozWindowInactive => DocumentState::WINDOW_INACTIVE,
            _ => DocumentState::empty(),
        }
    }

    fn name(&self) -> &'static str {
        match *self {
            PseudoClass::Empty => "empty",
            PseudoClass::MozOnlyWhitespace => "-moz-only-whitespace",
            PseudoClass::Root => "root",
            PseudoClass::FirstChild => "first-child",
            PseudoClass::LastChild => "last-child",
            PseudoClass::OnlyChild => "only-child",
            PseudoClass::FirstOfType => "first-of-type",
            PseudoClass::LastOfType => "last-of-type",
            PseudoClass::OnlyOfType => "only-of-type",
            PseudoClass::NthChild(..) => "nth-child",
            PseudoClass::NthLastChild(..) => "nth-last-child",
            PseudoClass::NthOfType(..) => "nth-of-type",
            PseudoClass::NthLastOfType(..) => "nth-last-of-type",
            PseudoClass::Lang(..) => "lang",
            PseudoClass::MozAny(..) => "-moz-any",
            PseudoClass::MozIsHTML => "-moz-is-html",
            PseudoClass::MozSystemMetric(..) => "-moz-system-metric",
            PseudoClass::MozLocaleDir(..) => "-moz-locale-dir",
            PseudoClass::MozLWTheme => "-moz-lwtheme",
            PseudoClass::MozLWThemeBrightText => "-moz-lwtheme-brighttext",
            PseudoClass::MozLWThemeDarkText => "-moz-lwtheme-darktext",
            PseudoClass::MozWindowInactive => "-moz-window-inactive",
            PseudoClass::MozFirstNode => "-moz-first-node",
            PseudoClass::MozLastNode => "-moz-last-node",
            PseudoClass::MozEmptyExceptChildrenWithLocalname(..) => {
                "-moz-empty-except-children-with-localname"
            },
            PseudoClass::MozHasHandlerRef => "-moz-has-handlerref",
            PseudoClass::Link => "link",
            PseudoClass::Visited => "visited",
            PseudoClass::AnyLink => "-moz-any-link",
            PseudoClass::Hover => "hover",
            PseudoClass::Active => "active",
            PseudoClass::Focus => "focus",
            PseudoClass::Enabled => "enabled",
            PseudoClass::Disabled => "disabled",
            PseudoClass::Checked => "checked",
            PseudoClass::Indeterminate => "indeterminate",
            PseudoClass::Target => "target",
            PseudoClass::Required => "required",
            PseudoClass::Optional => "optional",
            PseudoClass::Valid => "valid",
            PseudoClass::Invalid => "invalid",
            PseudoClass::InRange => "in-range",
            PseudoClass::OutOfRange => "out-of-range",
            PseudoClass::ReadOnly => "read-only",
            PseudoClass::ReadWrite => "read-write",
            PseudoClass::Default => "default",
            PseudoClass::MozPlaceholder => "-moz-placeholder",
            PseudoClass::MozFocusRing => "-moz-focusring",
        }
    }
}

impl ToCss for PseudoClass {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_char(':')?;
        dest.write_str(self.name())?;
        match *self {
            PseudoClass::NthChild(ref nth) |
            PseudoClass::NthLastChild(ref nth) |
            PseudoClass::NthOfType(ref nth) |
            PseudoClass::NthLastOfType(ref nth) => {
                dest.write_char('(')?;
                nth.to_css(dest)?;
                dest.write_char(')')
            },
            PseudoClass::Lang(ref s) | PseudoClass::MozLocaleDir(ref s) => {
                dest.write_char('(')?;
                serialize_identifier(s, dest)?;
                dest.write_char(')')
            },
            PseudoClass::MozSystemMetric(ref ident) |
            PseudoClass::MozEmptyExceptChildrenWithLocalname(ref ident) => {
                dest.write_char('(')?;
                serialize_identifier(ident, dest)?;
                dest.write_char(')')
            },
            PseudoClass::MozAny(ref list) => {
                dest.write_char('(')?;
                list.to_css(dest)?;
                dest.write_char(')')
            },
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PseudoElement {
    Before,
    After,
    FirstLetter,
    FirstLine,
    MozSelection,
    MozListBullet,
    /// An anonymous box, which has no originating element.
    AnonBox(Atom),
}

impl PseudoElement {
    #[inline]
    pub fn is_anon_box(&self) -> bool {
        matches!(*self, PseudoElement::AnonBox(..))
    }
}

impl ToCss for PseudoElement {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str("::")?;
        match *self {
            PseudoElement::Before => dest.write_str("before"),
            PseudoElement::After => dest.write_str("after"),
            PseudoElement::FirstLetter => dest.write_str("first-letter"),
            PseudoElement::FirstLine => dest.write_str("first-line"),
            PseudoElement::MozSelection => dest.write_str("-moz-selection"),
            PseudoElement::MozListBullet => dest.write_str("-moz-list-bullet"),
            PseudoElement::AnonBox(ref tag) => serialize_identifier(tag, dest),
        }
    }
}

/// A compound selector, plus the link to the compound on its left.
///
/// The head of a chain is the subject: in `ul > li`, the `li` compound
/// holds `Some((Combinator::Child, ul))` in `next`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selector {
    pub namespace: NamespaceConstraint,
    pub local_name: Option<LocalName>,
    pub ids: SmallVec<[Atom; 1]>,
    pub classes: SmallVec<[Atom; 2]>,
    pub pseudo_classes: Vec<PseudoClass>,
    pub attrs: Vec<AttrSelector>,
    /// Compound selectors this one must not match. They never have a
    /// `next` link of their own.
    pub negations: Vec<Selector>,
    pub pseudo_element: Option<PseudoElement>,
    pub next: Option<(Combinator, Arc<Selector>)>,
}

impl Default for Selector {
    fn default() -> Self {
        Self::universal()
    }
}

impl Selector {
    /// `*`, in any namespace.
    pub fn universal() -> Self {
        Selector {
            namespace: NamespaceConstraint::Any,
            local_name: None,
            ids: SmallVec::new(),
            classes: SmallVec::new(),
            pseudo_classes: Vec::new(),
            attrs: Vec::new(),
            negations: Vec::new(),
            pseudo_element: None,
            next: None,
        }
    }

    /// A compound that only tests the element name.
    pub fn tag(name: &str) -> Self {
        Self::universal().with_tag(name)
    }

    pub fn with_namespace(mut self, namespace: NamespaceId) -> Self {
        self.namespace = NamespaceConstraint::Specific(namespace);
        self
    }

    pub fn with_tag(mut self, name: &str) -> Self {
        self.local_name = Some(LocalName::new(name));
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.ids.push(Atom::from(id));
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(Atom::from(class));
        self
    }

    pub fn with_pseudo_class(mut self, pseudo_class: PseudoClass) -> Self {
        self.pseudo_classes.push(pseudo_class);
        self
    }

    pub fn with_attr(mut self, attr: AttrSelector) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Adds `:not(negated)`. Only the compound part of `negated` is kept.
    pub fn with_negation(mut self, mut negated: Selector) -> Self {
        negated.next = None;
        self.negations.push(negated);
        self
    }

    pub fn with_pseudo_element(mut self, pseudo_element: PseudoElement) -> Self {
        self.pseudo_element = Some(pseudo_element);
        self
    }

    /// Links `left` to this compound with `combinator`, so that
    /// `Selector::tag("li").with_next(Combinator::Child, Selector::tag("ul"))`
    /// is `ul > li`. `left` may carry its own chain.
    pub fn with_next(mut self, combinator: Combinator, left: Selector) -> Self {
        self.next = Some((combinator, Arc::new(left)));
        self
    }

    #[inline]
    pub fn has_tag_selector(&self) -> bool {
        self.local_name.is_some()
    }

    /// The combinator and compound on the left of this one, if any.
    #[inline]
    pub fn next_link(&self) -> Option<(Combinator, &Selector)> {
        self.next
            .as_ref()
            .map(|(combinator, next)| (*combinator, &**next))
    }

    /// Iterates the compounds of the chain, from the subject leftwards.
    #[inline]
    pub fn iter(&self) -> SelectorIter<'_> {
        SelectorIter {
            next: Some((None, self)),
        }
    }

    /// The specificity of the whole chain.
    pub fn specificity(&self) -> u32 {
        self.iter()
            .fold(Specificity::default(), |acc, (_, compound)| {
                acc + compound_specificity(compound)
            })
            .into()
    }

    fn compound_to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let mut wrote_anything = false;
        if let Some(ref local_name) = self.local_name {
            serialize_identifier(&local_name.name, dest)?;
            wrote_anything = true;
        }
        for id in &self.ids {
            dest.write_char('#')?;
            serialize_identifier(id, dest)?;
            wrote_anything = true;
        }
        for class in &self.classes {
            dest.write_char('.')?;
            serialize_identifier(class, dest)?;
            wrote_anything = true;
        }
        for attr in &self.attrs {
            attr.to_css(dest)?;
            wrote_anything = true;
        }
        for pseudo_class in &self.pseudo_classes {
            pseudo_class.to_css(dest)?;
            wrote_anything = true;
        }
        for negation in &self.negations {
            dest.write_str(":not(")?;
            negation.compound_to_css(dest)?;
            dest.write_char(')')?;
            wrote_anything = true;
        }
        if let Some(ref pseudo_element) = self.pseudo_element {
            pseudo_element.to_css(dest)?;
            wrote_anything = true;
        }
        if !wrote_anything {
            dest.write_char('*')?;
        }
        Ok(())
    }
}

impl ToCss for Selector {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        if let Some((combinator, ref next)) = self.next {
            next.to_css(dest)?;
            combinator.to_css(dest)?;
        }
        self.compound_to_css(dest)
    }
}

/// Iterator over the compounds of a selector chain, yielding each together
/// with the combinator that links it to the compound on its right (`None`
/// for the subject).
pub struct SelectorIter<'a> {
    next: Option<(Option<Combinator>, &'a Selector)>,
}

impl<'a> Iterator for SelectorIter<'a> {
    type Item = (Option<Combinator>, &'a Selector);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current
            .1
            .next
            .as_ref()
            .map(|(combinator, next)| (Some(*combinator), &**next));
        Some(current)
    }
}

const MAX_8BIT: u32 = (1u32 << 8) - 1;

#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct Specificity {
    id_selectors: u32,
    class_like_selectors: u32,
    element_selectors: u32,
}

impl Add for Specificity {
    type Output = Specificity;

    fn add(self, rhs: Specificity) -> Specificity {
        Specificity {
            id_selectors: self.id_selectors + rhs.id_selectors,
            class_like_selectors: self.class_like_selectors + rhs.class_like_selectors,
            element_selectors: self.element_selectors + rhs.element_selectors,
        }
    }
}

impl From<u32> for Specificity {
    fn from(value: u32) -> Specificity {
        assert!(value <= MAX_8BIT << 16 | MAX_8BIT << 8 | MAX_8BIT);
        Specificity {
            id_selectors: value >> 16,
            class_like_selectors: (value >> 8) & MAX_8BIT,
            element_selectors: value & MAX_8BIT,
        }
    }
}

impl From<Specificity> for u32 {
    fn from(specificity: Specificity) -> u32 {
        cmp::min(specificity.id_selectors, MAX_8BIT) << 16 |
            cmp::min(specificity.class_like_selectors, MAX_8BIT) << 8 |
            cmp::min(specificity.element_selectors, MAX_8BIT)
    }
}

fn compound_specificity(selector: &Selector) -> Specificity {
    let mut specificity = Specificity::default();
    if selector.local_name.is_some() || selector.pseudo_element.is_some() {
        specificity.element_selectors += 1;
    }
    specificity.id_selectors += selector.ids.len() as u32;
    // `:-moz-any()` counts as a single pseudo-class, whatever its argument.
    specificity.class_like_selectors += (selector.classes.len() +
        selector.pseudo_classes.len() +
        selector.attrs.len()) as u32;
    selector
        .negations
        .iter()
        .fold(specificity, |acc, negation| acc + compound_specificity(negation))
}

/// One alternative of a selector list, with its precomputed specificity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComplexSelector {
    pub selector: Arc<Selector>,
    pub specificity: u32,
}

impl ComplexSelector {
    pub fn new(selector: Selector) -> Self {
        let specificity = selector.specificity();
        ComplexSelector {
            selector: Arc::new(selector),
            specificity,
        }
    }
}

/// A comma-separated list of alternatives, in source order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectorList(pub SmallVec<[ComplexSelector; 1]>);

impl SelectorList {
    pub fn new<I>(selectors: I) -> Self
    where
        I: IntoIterator<Item = Selector>,
    {
        SelectorList(selectors.into_iter().map(ComplexSelector::new).collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComplexSelector> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Selector> for SelectorList {
    fn from(selector: Selector) -> Self {
        SelectorList::new(Some(selector))
    }
}

impl ToCss for SelectorList {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let mut first = true;
        for complex in self.iter() {
            if !first {
                dest.write_str(", ")?;
            }
            first = false;
            complex.selector.to_css(dest)?;
        }
        Ok(())
    }
}
