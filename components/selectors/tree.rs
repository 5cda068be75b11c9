/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Traits that nodes must implement. Breaks the otherwise-cyclic dependency
//! between layout and style.

use crate::Atom;
use crate::attr::CaseSensitivity;
use crate::element_state::ElementState;
use std::fmt::Debug;

/// A namespace as the document registered it. Only the identity matters to
/// matching; mapping prefixes and URLs to ids happens before selectors are
/// built.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NamespaceId(pub i32);

impl NamespaceId {
    /// No namespace, the default for attributes.
    pub const NONE: NamespaceId = NamespaceId(0);
    pub const XMLNS: NamespaceId = NamespaceId(1);
    pub const XML: NamespaceId = NamespaceId(2);
    pub const XHTML: NamespaceId = NamespaceId(3);
    pub const XLINK: NamespaceId = NamespaceId(4);
    pub const MATHML: NamespaceId = NamespaceId(7);
    pub const XUL: NamespaceId = NamespaceId(9);
    pub const SVG: NamespaceId = NamespaceId(10);
}

/// The read-only view of a DOM element the matcher needs.
///
/// Implementations are expected to be cheap handles (a reference or an
/// index into an arena), since the matcher clones them freely while walking
/// ancestors and siblings.
pub trait Element: Sized + Clone + Debug {
    fn parent_element(&self) -> Option<Self>;

    /// The previous sibling that is an element, skipping text and comments.
    fn prev_sibling_element(&self) -> Option<Self>;

    /// The next sibling that is an element, skipping text and comments.
    fn next_sibling_element(&self) -> Option<Self>;

    /// The first child that is an element, skipping text and comments.
    fn first_child_element(&self) -> Option<Self>;

    /// Whether a text node with something other than whitespace comes
    /// before this element among its siblings.
    fn has_significant_text_before(&self) -> bool;

    /// Whether a text node with something other than whitespace comes after
    /// this element among its siblings.
    fn has_significant_text_after(&self) -> bool;

    /// Whether any child text node has something other than whitespace.
    fn has_significant_text_child(&self) -> bool;

    /// Whether this is an HTML element in an HTML document, in which case
    /// tag and attribute names compare ASCII-case-insensitively.
    fn is_html_element_in_html_document(&self) -> bool;

    fn namespace(&self) -> NamespaceId;

    fn local_name(&self) -> &Atom;

    fn id(&self) -> Option<&Atom>;

    fn has_class(&self, name: &Atom, case_sensitivity: CaseSensitivity) -> bool;

    /// Calls `callback` for each class of the element, in attribute order.
    fn each_class<F>(&self, callback: F)
    where
        F: FnMut(&Atom);

    /// The value of the attribute `local_name` in `namespace`, if present.
    fn attr_value(&self, namespace: NamespaceId, local_name: &Atom) -> Option<&str>;

    /// Calls `f` on the value of every attribute named `local_name`,
    /// whatever its namespace, until `f` returns true. Returns whether it
    /// ever did.
    fn any_attr_value<F>(&self, local_name: &Atom, f: F) -> bool
    where
        F: FnMut(&str) -> bool;

    /// The current event state of the element, before any visited-link
    /// policy is applied.
    fn state(&self) -> ElementState;

    /// Whether this element is the root element of its document.
    fn is_root(&self) -> bool;

    /// Returns whether this element has no element children and no text
    /// content at all (`:empty`).
    fn is_empty(&self) -> bool;

    /// Returns whether this element has no element children and only
    /// whitespace text (`:-moz-only-whitespace`).
    fn is_empty_ignoring_whitespace(&self) -> bool;

    /// Whether this element is a hyperlink.
    fn is_link(&self) -> bool {
        self.state().intersects(ElementState::LINK_STATES)
    }

    fn is_html_content(&self) -> bool {
        self.namespace() == NamespaceId::XHTML
    }
}
