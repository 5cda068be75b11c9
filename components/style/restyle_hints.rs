/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Restyle hints: an optimization to avoid unnecessarily matching selectors.
//!
//! When an element's state or one of its attributes changes, the selectors
//! that could notice are found through a [`DependencySet`] built alongside
//! the rule maps, and only those are re-tested, with the changed state bits
//! assumed to match either way.

use crate::Atom;
use crate::selector_map::{MaybeCaseInsensitiveHashMap, PrecomputedHashMap};
use bitflags::bitflags;
use cascade_selectors::element_state::{DocumentState, ElementState};
use cascade_selectors::matching::{ignore_selector_flags, matches_compound_selector, matches_selector_chain};
use cascade_selectors::{Combinator, DocumentContext, Element, MatchingContext, NamespaceId};
use cascade_selectors::{NodeMatchingContext, PseudoClass, QuirksMode, Selector, VisitedHandlingMode};
use fallible::{FailedAllocationError, FallibleHashMap, FallibleVec};
use servo_arc::Arc;
use smallvec::SmallVec;

bitflags! {
    /// The restyle hint tells the caller how much of the tree around a
    /// changed element has to be matched again. Empty means nothing.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct RestyleHint: u8 {
        /// Rerun selector matching on the element.
        const SELF = 1 << 0;
        /// Rerun selector matching on the element and all of its
        /// descendants.
        const SUBTREE = 1 << 1;
        /// Rerun selector matching on all later siblings of the element
        /// and all of their descendants.
        const LATER_SIBLINGS = 1 << 2;
    }
}

impl RestyleHint {
    /// The elements a compound selector can affect, given the combinator
    /// on its right (`None` for the subject of the chain).
    #[inline]
    pub fn for_combinator(combinator: Option<Combinator>) -> Self {
        match combinator {
            None => RestyleHint::SELF,
            Some(Combinator::Child) | Some(Combinator::Descendant) => RestyleHint::SUBTREE,
            Some(Combinator::NextSibling) | Some(Combinator::LaterSibling) => RestyleHint::LATER_SIBLINGS,
        }
    }
}

/// A compound selector of some rule, with the part of the chain on its
/// left, that tests something an element change can flip.
#[derive(Clone, Debug)]
pub struct Dependency {
    /// The compound, whose `next` link is the rest of the chain.
    pub selector: Arc<Selector>,
    /// The combinator on the right of the compound.
    pub combinator: Option<Combinator>,
    /// Every state bit the compound tests, negations and `:-moz-any()`
    /// included.
    state: ElementState,
}

impl Dependency {
    /// What needs restyling when this dependency may have changed.
    #[inline]
    pub fn hint(&self) -> RestyleHint {
        RestyleHint::for_combinator(self.combinator)
    }

    fn matches<E>(&self, element: &E, context: &mut MatchingContext, node_context: &NodeMatchingContext) -> bool
    where
        E: Element,
    {
        matches_compound_selector(
            &self.selector,
            element,
            context,
            node_context,
            &mut ignore_selector_flags::<E>,
        ) && matches_selector_chain(
            self.selector.next_link(),
            element,
            context,
            !node_context.is_relevant_link,
            &mut ignore_selector_flags::<E>,
        )
    }
}

/// The selectors of a cascade that depend on element state, ids, classes,
/// attributes and document state.
///
/// Every compound of every indexed chain is looked at, not just the
/// subject, since a change on an ancestor or earlier sibling can affect
/// the elements on the right of it.
#[derive(Debug, Default)]
pub struct DependencySet {
    state_dependencies: Vec<Dependency>,
    id_dependencies: Vec<Dependency>,
    class_dependencies: MaybeCaseInsensitiveHashMap<Atom, SmallVec<[Dependency; 1]>>,
    /// Compounds testing a class inside `:not()` or `:-moz-any()`. A
    /// negated class doesn't require the element to carry it, so these
    /// can't be looked up by the element's classes.
    possibly_negated_class_dependencies: Vec<Dependency>,
    attribute_dependencies: PrecomputedHashMap<Atom, SmallVec<[Dependency; 1]>>,
    document_state: DocumentState,
    has_lang_rules: bool,
    len: usize,
}

impl DependencySet {
    /// An empty dependency set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of dependencies noted, counting a compound once per
    /// list it landed in.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no selector noted so far can be affected by any change.
    pub fn is_empty(&self) -> bool {
        self.len == 0 && self.document_state.is_empty() && !self.has_lang_rules
    }

    /// The document state bits some selector tests.
    pub fn document_state(&self) -> DocumentState {
        self.document_state
    }

    /// Notes the dependencies of every compound of `selector`.
    ///
    /// Pseudo-element compounds test nothing on an element and are
    /// skipped.
    pub fn note_selector(
        &mut self,
        selector: &Arc<Selector>,
        quirks_mode: QuirksMode,
    ) -> Result<(), FailedAllocationError> {
        let mut combinator = None;
        let mut compound = selector;
        loop {
            if compound.pseudo_element.is_none() {
                let dependency = Dependency {
                    selector: compound.clone(),
                    combinator,
                    state: compound_state(compound),
                };
                self.add_compound(compound, &dependency, /* is_top_level = */ true, quirks_mode)?;
            }
            match compound.next {
                Some((next_combinator, ref next)) => {
                    combinator = Some(next_combinator);
                    compound = next;
                },
                None => return Ok(()),
            }
        }
    }

    fn add_compound(
        &mut self,
        compound: &Selector,
        dependency: &Dependency,
        is_top_level: bool,
        quirks_mode: QuirksMode,
    ) -> Result<(), FailedAllocationError> {
        self.add_selector_part(compound, dependency, is_top_level, quirks_mode)?;
        for negation in &compound.negations {
            self.add_compound(negation, dependency, false, quirks_mode)?;
        }
        Ok(())
    }

    fn add_selector_part(
        &mut self,
        part: &Selector,
        dependency: &Dependency,
        is_top_level: bool,
        quirks_mode: QuirksMode,
    ) -> Result<(), FailedAllocationError> {
        for pseudo_class in &part.pseudo_classes {
            self.document_state |= pseudo_class.document_state_flag();
            if let PseudoClass::Lang(..) = *pseudo_class {
                self.has_lang_rules = true;
            }
        }

        if part
            .pseudo_classes
            .iter()
            .any(|pseudo_class| !pseudo_class.state_flag().is_empty())
        {
            self.state_dependencies.try_push(dependency.clone())?;
            self.len += 1;
        }

        if !part.ids.is_empty() {
            self.id_dependencies.try_push(dependency.clone())?;
            self.len += 1;
        }

        if is_top_level {
            for class in &part.classes {
                self.class_dependencies
                    .try_entry(class.clone(), quirks_mode)?
                    .or_insert_with(SmallVec::new)
                    .try_push(dependency.clone())?;
                self.len += 1;
            }
        } else if !part.classes.is_empty() {
            self.possibly_negated_class_dependencies
                .try_push(dependency.clone())?;
            self.len += 1;
        }

        for attr in &part.attrs {
            self.attribute_dependencies
                .try_entry(attr.name.clone())?
                .or_insert_with(SmallVec::new)
                .try_push(dependency.clone())?;
            self.len += 1;
            if attr.lower_name != attr.name {
                self.attribute_dependencies
                    .try_entry(attr.lower_name.clone())?
                    .or_insert_with(SmallVec::new)
                    .try_push(dependency.clone())?;
                self.len += 1;
            }
        }

        for pseudo_class in &part.pseudo_classes {
            if let PseudoClass::MozAny(ref list) = *pseudo_class {
                for complex in list.iter() {
                    self.add_compound(&complex.selector, dependency, false, quirks_mode)?;
                }
            }
        }

        Ok(())
    }

    /// What needs restyling if the state bits in `changed` flip on
    /// `element`.
    ///
    /// Each dependency is tested with the changed bits assumed to match,
    /// and with links assumed both visited and unvisited, so the answer
    /// may be wider than needed but never narrower.
    pub fn compute_state_hint<E>(
        &self,
        element: &E,
        document: &DocumentContext,
        quirks_mode: QuirksMode,
        changed: ElementState,
    ) -> RestyleHint
    where
        E: Element,
    {
        let mut hint = RestyleHint::empty();
        if changed.is_empty() {
            return hint;
        }

        let mut context = MatchingContext::new(
            document,
            quirks_mode,
            VisitedHandlingMode::AllLinksVisitedAndUnvisited,
        );
        let node_context = NodeMatchingContext::new(changed, element.is_link());
        for dependency in &self.state_dependencies {
            let possible = dependency.hint();
            if hint.contains(possible) || !dependency.state.intersects(changed) {
                continue;
            }
            if dependency.matches(element, &mut context, &node_context) {
                hint |= possible;
            }
        }
        hint
    }

    /// What needs restyling if the attribute `attr` of `element` changes.
    ///
    /// The element is tested as it is now, so callers ask both before and
    /// after the change; `attr_has_changed` is set on the second call.
    pub fn compute_attribute_hint<E>(
        &self,
        element: &E,
        document: &DocumentContext,
        quirks_mode: QuirksMode,
        attr: &Atom,
        attr_has_changed: bool,
    ) -> RestyleHint
    where
        E: Element,
    {
        let mut hint = RestyleHint::empty();

        // The lightweight theme attributes of the root XUL element restyle
        // the whole window.
        if attr_has_changed &&
            matches!(&**attr, "lwtheme" | "lwthemetextcolor") &&
            element.namespace() == NamespaceId::XUL &&
            element.is_root()
        {
            hint |= RestyleHint::SUBTREE;
        }

        // `:lang()` looks at the attribute on every ancestor.
        if self.has_lang_rules && &**attr == "lang" {
            hint |= RestyleHint::SUBTREE;
        }

        let mut context = MatchingContext::new(
            document,
            quirks_mode,
            VisitedHandlingMode::AllLinksVisitedAndUnvisited,
        );
        let node_context = NodeMatchingContext::new(ElementState::empty(), element.is_link());

        match &**attr {
            "id" => accumulate(&self.id_dependencies, element, &mut context, &node_context, &mut hint),
            "class" => {
                let mut classes = SmallVec::<[Atom; 8]>::new();
                element.each_class(|class| classes.push(class.clone()));
                for class in &classes {
                    if let Some(dependencies) = self.class_dependencies.get(class, quirks_mode) {
                        accumulate(dependencies, element, &mut context, &node_context, &mut hint);
                    }
                }
                accumulate(
                    &self.possibly_negated_class_dependencies,
                    element,
                    &mut context,
                    &node_context,
                    &mut hint,
                );
            },
            _ => {},
        }

        if let Some(dependencies) = self.attribute_dependencies.get(attr) {
            accumulate(dependencies, element, &mut context, &node_context, &mut hint);
        }

        hint
    }

    /// Whether some selector tests a document state bit in `changed`.
    #[inline]
    pub fn has_document_state_dependency(&self, changed: DocumentState) -> bool {
        self.document_state.intersects(changed)
    }
}

fn accumulate<E>(
    dependencies: &[Dependency],
    element: &E,
    context: &mut MatchingContext,
    node_context: &NodeMatchingContext,
    hint: &mut RestyleHint,
) where
    E: Element,
{
    for dependency in dependencies {
        let possible = dependency.hint();
        if hint.contains(possible) {
            continue;
        }
        if dependency.matches(element, context, node_context) {
            *hint |= possible;
        }
    }
}

fn compound_state(compound: &Selector) -> ElementState {
    let mut state = ElementState::empty();
    for pseudo_class in &compound.pseudo_classes {
        state |= pseudo_class.state_flag();
        if let PseudoClass::MozAny(ref list) = *pseudo_class {
            for complex in list.iter() {
                state |= compound_state(&complex.selector);
            }
        }
    }
    for negation in &compound.negations {
        state |= compound_state(negation);
    }
    state
}
