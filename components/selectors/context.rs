/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::Atom;
use crate::attr::CaseSensitivity;
use crate::element_state::{DocumentState, ElementState};

/// What kind of selector matching mode we should use.
///
/// There are two modes of selector matching. The difference is only
/// noticeable in presence of visited links.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VisitedHandlingMode {
    /// All links are matched as if they are unvisited.
    AllLinksUnvisited,
    /// The relevant link is matched as visited, every other link as
    /// unvisited.
    RelevantLinkVisited,
    /// The relevant link matches both `:link` and `:visited`. Used for
    /// dependency queries, which have to assume either.
    AllLinksVisitedAndUnvisited,
}

/// Which quirks mode is this document in.
///
/// See: <https://quirks.spec.whatwg.org/>
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum QuirksMode {
    /// Quirks mode.
    Quirks,
    /// Limited quirks mode.
    LimitedQuirks,
    /// No quirks mode.
    NoQuirks,
}

impl QuirksMode {
    #[inline]
    pub fn classes_and_ids_case_sensitivity(self) -> CaseSensitivity {
        match self {
            QuirksMode::NoQuirks | QuirksMode::LimitedQuirks => CaseSensitivity::CaseSensitive,
            QuirksMode::Quirks => CaseSensitivity::AsciiCaseInsensitive,
        }
    }
}

/// The lightweight theme applied to a document's window.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub enum DocumentTheme {
    #[default]
    None,
    Neutral,
    Dark,
    Bright,
}

/// Facts about the document being styled that some pseudo-classes test.
///
/// Built by the caller for each document; nothing here is global.
#[derive(Clone, Debug)]
pub struct DocumentContext {
    pub state: DocumentState,
    pub theme: DocumentTheme,
    /// The `Content-Language` of the document, possibly a comma-separated
    /// list, used by `:lang()` when no element in the chain declares one.
    pub content_language: Option<Box<str>>,
    /// System metrics currently present (`:-moz-system-metric()`).
    pub system_metrics: Vec<Atom>,
    /// Whether `:visited` may ever match.
    pub visited_links_enabled: bool,
    /// Private browsing treats every link as unvisited.
    pub private_browsing: bool,
}

impl Default for DocumentContext {
    fn default() -> Self {
        DocumentContext {
            state: DocumentState::empty(),
            theme: DocumentTheme::None,
            content_language: None,
            system_metrics: Vec::new(),
            visited_links_enabled: true,
            private_browsing: false,
        }
    }
}

impl DocumentContext {
    /// Applies the visited-link policy to an element state: when visited
    /// links are disabled, or in private browsing, a visited link reports
    /// itself as unvisited, so nothing downstream can tell.
    pub fn adjust_element_state(&self, mut state: ElementState) -> ElementState {
        if (!self.visited_links_enabled || self.private_browsing) &&
            state.contains(ElementState::VISITED)
        {
            state.remove(ElementState::VISITED);
            state.insert(ElementState::UNVISITED);
        }
        state
    }
}

/// Data associated with the matching process for a whole selector chain.
pub struct MatchingContext<'a> {
    pub document: &'a DocumentContext,
    pub quirks_mode: QuirksMode,
    pub visited_handling: VisitedHandlingMode,
    /// Set by the matcher when some element it tested turned out to be the
    /// relevant link.
    pub relevant_link_found: bool,
}

impl<'a> MatchingContext<'a> {
    pub fn new(
        document: &'a DocumentContext,
        quirks_mode: QuirksMode,
        visited_handling: VisitedHandlingMode,
    ) -> Self {
        Self {
            document,
            quirks_mode,
            visited_handling,
            relevant_link_found: false,
        }
    }

    #[inline]
    pub fn classes_and_ids_case_sensitivity(&self) -> CaseSensitivity {
        self.quirks_mode.classes_and_ids_case_sensitivity()
    }
}

/// Data specific to the element a single compound selector is tested
/// against.
#[derive(Clone, Copy, Debug, Default)]
pub struct NodeMatchingContext {
    /// State bits whose value should be ignored. A state pseudo-class
    /// testing one of them is assumed to match, and the result is flagged
    /// as state-dependent.
    pub state_mask: ElementState,
    /// Whether this element is the relevant link of the match.
    pub is_relevant_link: bool,
}

impl NodeMatchingContext {
    pub fn new(state_mask: ElementState, is_relevant_link: bool) -> Self {
        Self {
            state_mask,
            is_relevant_link,
        }
    }
}
