/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The context within which style is calculated.

use crate::applicable_declarations::ApplicableDeclarationList;
use crate::stylist::CascadeData;
use cascade_config::Preferences;
use cascade_selectors::element_state::{DocumentState, ElementState};
use cascade_selectors::matching::ElementSelectorFlags;
use cascade_selectors::{DocumentContext, Element, MatchingContext, PseudoElement, VisitedHandlingMode};
use log::debug;
use servo_arc::Arc;

/// Builds the document facts matching looks at, taking the visited-link
/// policy from `prefs`.
pub fn document_context(prefs: &Preferences, state: DocumentState, private_browsing: bool) -> DocumentContext {
    DocumentContext {
        state,
        visited_links_enabled: prefs.visited_links_enabled(),
        private_browsing,
        ..DocumentContext::default()
    }
}

/// The rules matched for an element.
#[derive(Debug, Default)]
pub struct MatchResults {
    /// The rules for the style with every link unvisited.
    pub rules: ApplicableDeclarationList,
    /// The rules for the style with the relevant link visited, when there
    /// is a relevant link.
    pub visited_rules: Option<ApplicableDeclarationList>,
    /// Whether the relevant link is visited, as far as the document lets
    /// matching know.
    pub relevant_link_visited: bool,
}

impl MatchResults {
    /// The rules the element is styled with.
    pub fn rules_for_style(&self) -> &ApplicableDeclarationList {
        match self.visited_rules {
            Some(ref visited_rules) if self.relevant_link_visited => visited_rules,
            _ => &self.rules,
        }
    }
}

/// Whether the nearest link among `element` and its ancestors is visited.
fn relevant_link_visited<E: Element>(element: &E, document: &DocumentContext) -> bool {
    let mut current = Some(element.clone());
    while let Some(candidate) = current {
        if candidate.is_link() {
            return document
                .adjust_element_state(candidate.state())
                .contains(ElementState::VISITED);
        }
        current = candidate.parent_element();
    }
    false
}

/// What the style of a document is computed with: the cascade for its
/// current medium and the document facts selectors test.
#[derive(Clone)]
pub struct SharedStyleContext<'a> {
    /// The cascade to match against.
    pub cascade: Arc<CascadeData>,
    /// The document the elements belong to.
    pub document: &'a DocumentContext,
}

impl<'a> SharedStyleContext<'a> {
    /// Creates a context.
    pub fn new(cascade: Arc<CascadeData>, document: &'a DocumentContext) -> Self {
        SharedStyleContext { cascade, document }
    }

    /// Matches `element` (or its `pseudo_element`) against the cascade.
    ///
    /// The first pass treats every link as unvisited. If it met a relevant
    /// link, a second pass treats that link alone as visited. Which of the
    /// two rule lists styles the element depends only on whether the
    /// nearest link is visited, so no other link can ever show through.
    pub fn match_element<E, F>(
        &self,
        element: &E,
        pseudo_element: Option<&PseudoElement>,
        flags_setter: &mut F,
    ) -> MatchResults
    where
        E: Element,
        F: FnMut(&E, ElementSelectorFlags),
    {
        let quirks_mode = self.cascade.quirks_mode();
        let mut results = MatchResults::default();

        let mut context = MatchingContext::new(
            self.document,
            quirks_mode,
            VisitedHandlingMode::AllLinksUnvisited,
        );
        self.cascade.push_applicable_declarations(
            element,
            pseudo_element,
            &mut context,
            &mut results.rules,
            flags_setter,
        );

        if context.relevant_link_found {
            let mut visited_context = MatchingContext::new(
                self.document,
                quirks_mode,
                VisitedHandlingMode::RelevantLinkVisited,
            );
            let mut visited_rules = ApplicableDeclarationList::new();
            self.cascade.push_applicable_declarations(
                element,
                pseudo_element,
                &mut visited_context,
                &mut visited_rules,
                flags_setter,
            );
            debug!(
                "{:?}: {} rules, {} with the relevant link visited",
                element,
                results.rules.len(),
                visited_rules.len()
            );
            results.visited_rules = Some(visited_rules);
            results.relevant_link_visited = relevant_link_visited(element, self.document);
        }

        results
    }
}
