/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Selector matching: the predicates of a compound selector, and the walk
//! along ancestors and siblings that checks the rest of a chain.

use crate::Atom;
use crate::attr::{AttrSelector, CaseSensitivity};
use crate::context::{DocumentContext, MatchingContext, NodeMatchingContext, VisitedHandlingMode};
use crate::context::{DocumentTheme, QuirksMode};
use crate::element_state::{DocumentState, ElementState};
use crate::parser::{Combinator, NamespaceConstraint, NthSelectorData, PseudoClass, Selector};
use crate::parser::SelectorList;
use crate::tree::{Element, NamespaceId};
use bitflags::bitflags;
use log::trace;

bitflags! {
    /// Set of flags that are set on either the element or its parent (depending
    /// on the flag) if the element could potentially match a selector.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ElementSelectorFlags: u8 {
        /// When a child is added or removed from the parent, all the children
        /// must be restyled, because they may match :nth-last-child,
        /// :last-of-type, :nth-last-of-type, or :only-of-type.
        const HAS_SLOW_SELECTOR = 1 << 0;

        /// When a child is added or removed from the parent, any later
        /// children must be restyled, because they may match :nth-child,
        /// :first-of-type, :nth-of-type, or a sibling combinator.
        const HAS_SLOW_SELECTOR_LATER_SIBLINGS = 1 << 1;

        /// When a child is added or removed from the parent, the first and
        /// last children must be restyled, because they may match :first-child,
        /// :last-child, or :only-child.
        const HAS_EDGE_CHILD_SELECTOR = 1 << 2;

        /// The element has an empty selector, so when a child is appended we
        /// might need to restyle the parent completely.
        const HAS_EMPTY_SELECTOR = 1 << 3;
    }
}

/// A flags setter for callers that aren't styling and so have nowhere to
/// record selector flags.
pub fn ignore_selector_flags<E: Element>(_: &E, _: ElementSelectorFlags) {}

/// Elements that stay sensitive to `:hover` and `:active` in quirks mode
/// even when the selector names no tag, id or attribute.
fn is_quirk_event_sensitive(local_name: &Atom) -> bool {
    matches!(
        &**local_name,
        "button" | "img" | "input" | "label" | "select" | "textarea"
    )
}

/// The element state as matching sees it: visited-link policy applied, and
/// link bits rewritten according to the visited handling mode, so that only
/// the relevant link can ever look visited.
pub fn element_state_for_visited_handling<E: Element>(
    element: &E,
    document: &DocumentContext,
    visited_handling: VisitedHandlingMode,
    is_relevant_link: bool,
) -> ElementState {
    let mut state = document.adjust_element_state(element.state());
    if state.intersects(ElementState::LINK_STATES) {
        state.remove(ElementState::LINK_STATES);
        if is_relevant_link {
            state.insert(match visited_handling {
                VisitedHandlingMode::AllLinksUnvisited => ElementState::UNVISITED,
                VisitedHandlingMode::RelevantLinkVisited => ElementState::VISITED,
                VisitedHandlingMode::AllLinksVisitedAndUnvisited => ElementState::LINK_STATES,
            });
        } else {
            state.insert(ElementState::UNVISITED);
        }
    }
    state
}

/// Matches a selector chain against `element`: the subject compound first,
/// then the rest of the chain against ancestors and siblings.
///
/// When `node_context.is_relevant_link` is set, `element` itself is the
/// relevant link and no ancestor is looked at for one.
pub fn matches_selector<E, F>(
    selector: &Selector,
    element: &E,
    context: &mut MatchingContext,
    node_context: &NodeMatchingContext,
    flags_setter: &mut F,
) -> bool
where
    E: Element,
    F: FnMut(&E, ElementSelectorFlags),
{
    if node_context.is_relevant_link {
        context.relevant_link_found = true;
    }
    matches_compound_selector(selector, element, context, node_context, flags_setter) &&
        matches_selector_chain(
            selector.next_link(),
            element,
            context,
            !node_context.is_relevant_link,
            flags_setter,
        )
}

/// Returns whether `element` matches any alternative of `list`, with no
/// state masked and no link treated as visited.
pub fn selector_list_matches<E>(list: &SelectorList, element: &E, context: &mut MatchingContext) -> bool
where
    E: Element,
{
    let node_context = NodeMatchingContext::default();
    list.iter().any(|complex| {
        let selector = &*complex.selector;
        matches_compound_selector(
            selector,
            element,
            context,
            &node_context,
            &mut ignore_selector_flags::<E>,
        ) && matches_selector_chain(
            selector.next_link(),
            element,
            context,
            false,
            &mut ignore_selector_flags::<E>,
        )
    })
}

/// Tests a single compound selector (and its negations) against `element`,
/// without walking the chain.
///
/// State pseudo-classes testing a bit in `node_context.state_mask` are
/// assumed to match.
#[inline]
pub fn matches_compound_selector<E, F>(
    selector: &Selector,
    element: &E,
    context: &mut MatchingContext,
    node_context: &NodeMatchingContext,
    flags_setter: &mut F,
) -> bool
where
    E: Element,
    F: FnMut(&E, ElementSelectorFlags),
{
    let mut dependence = false;
    matches_compound_internal(
        selector,
        element,
        context,
        node_context,
        flags_setter,
        &mut dependence,
        /* is_negated = */ false,
    )
}

fn matches_compound_internal<E, F>(
    selector: &Selector,
    element: &E,
    context: &mut MatchingContext,
    node_context: &NodeMatchingContext,
    flags_setter: &mut F,
    dependence: &mut bool,
    is_negated: bool,
) -> bool
where
    E: Element,
    F: FnMut(&E, ElementSelectorFlags),
{
    // Pseudo-element compounds are stripped before matching; one showing up
    // here is malformed.
    if selector.pseudo_element.is_some() {
        return false;
    }

    if let NamespaceConstraint::Specific(namespace) = selector.namespace {
        if element.namespace() != namespace {
            return false;
        }
    }

    if let Some(ref local_name) = selector.local_name {
        let name = if element.is_html_element_in_html_document() {
            &local_name.lower_name
        } else {
            &local_name.name
        };
        if element.local_name() != name {
            return false;
        }
    }

    let case_sensitivity = context.classes_and_ids_case_sensitivity();
    if !selector.ids.is_empty() {
        let Some(id) = element.id() else {
            return false;
        };
        if !selector.ids.iter().all(|wanted| case_sensitivity.eq_atom(wanted, id)) {
            return false;
        }
    }

    if !selector
        .classes
        .iter()
        .all(|class| element.has_class(class, case_sensitivity))
    {
        return false;
    }

    for pseudo_class in &selector.pseudo_classes {
        let state = pseudo_class.state_flag();
        let matches = if let PseudoClass::MozAny(ref list) = *pseudo_class {
            // Masked state inside the list has to count for the compound
            // holding it, or a `:not()` around it would hide the dependency.
            // List members match as positive selectors, even inside a `:not()`.
            list.iter().any(|complex| {
                debug_assert!(
                    complex.selector.next.is_none(),
                    ":-moz-any() only takes simple selector sequences"
                );
                matches_compound_internal(
                    &complex.selector,
                    element,
                    context,
                    node_context,
                    flags_setter,
                    dependence,
                    /* is_negated = */ false,
                )
            })
        } else if state.is_empty() {
            matches_non_state_pseudo_class(pseudo_class, element, context, flags_setter)
        } else {
            matches_state_pseudo_class(
                selector,
                state,
                element,
                context,
                node_context,
                dependence,
                is_negated,
            )
        };
        if !matches {
            return false;
        }
    }

    if !selector
        .attrs
        .iter()
        .all(|attr| matches_attr_selector(attr, element))
    {
        return false;
    }

    if !is_negated {
        for negation in &selector.negations {
            let mut negation_dependence = false;
            let negation_matches = matches_compound_internal(
                negation,
                element,
                context,
                node_context,
                flags_setter,
                &mut negation_dependence,
                /* is_negated = */ true,
            );
            // A negated selector that only matched thanks to masked state
            // might as well not have matched, so keep going.
            if negation_matches && !negation_dependence {
                return false;
            }
        }
    }

    true
}

fn matches_state_pseudo_class<E>(
    selector: &Selector,
    state: ElementState,
    element: &E,
    context: &MatchingContext,
    node_context: &NodeMatchingContext,
    dependence: &mut bool,
    is_negated: bool,
) -> bool
where
    E: Element,
{
    // In quirks mode, `:hover` and `:active` only apply to a few kinds of
    // elements unless the selector has a tag, id or attribute test (classes
    // don't count). The check doesn't apply inside `:not()`, which makes
    // negation asymmetric there.
    if state.intersects(ElementState::HOVER | ElementState::ACTIVE) &&
        context.quirks_mode == QuirksMode::Quirks &&
        !selector.has_tag_selector() &&
        selector.ids.is_empty() &&
        selector.attrs.is_empty() &&
        !is_negated &&
        element.is_html_content() &&
        !element.is_link() &&
        !is_quirk_event_sensitive(element.local_name())
    {
        return false;
    }

    if node_context.state_mask.intersects(state) {
        *dependence = true;
        return true;
    }

    element_state_for_visited_handling(
        element,
        context.document,
        context.visited_handling,
        node_context.is_relevant_link,
    )
    .intersects(state)
}

fn matches_non_state_pseudo_class<E, F>(
    pseudo_class: &PseudoClass,
    element: &E,
    context: &mut MatchingContext,
    flags_setter: &mut F,
) -> bool
where
    E: Element,
    F: FnMut(&E, ElementSelectorFlags),
{
    match *pseudo_class {
        PseudoClass::Empty => {
            flags_setter(element, ElementSelectorFlags::HAS_EMPTY_SELECTOR);
            element.is_empty()
        },
        PseudoClass::MozOnlyWhitespace => {
            flags_setter(element, ElementSelectorFlags::HAS_EMPTY_SELECTOR);
            element.is_empty_ignoring_whitespace()
        },
        PseudoClass::Root => element.parent_element().is_none() && element.is_root(),
        PseudoClass::FirstChild => matches_edge_child(element, flags_setter, true, false),
        PseudoClass::LastChild => matches_edge_child(element, flags_setter, false, true),
        PseudoClass::OnlyChild => matches_edge_child(element, flags_setter, true, true),
        PseudoClass::FirstOfType => matches_edge_of_type(element, flags_setter, true, false),
        PseudoClass::LastOfType => matches_edge_of_type(element, flags_setter, false, true),
        PseudoClass::OnlyOfType => matches_edge_of_type(element, flags_setter, true, true),
        PseudoClass::NthChild(nth) => matches_generic_nth_child(element, flags_setter, nth, false, false),
        PseudoClass::NthLastChild(nth) => matches_generic_nth_child(element, flags_setter, nth, false, true),
        PseudoClass::NthOfType(nth) => matches_generic_nth_child(element, flags_setter, nth, true, false),
        PseudoClass::NthLastOfType(nth) => matches_generic_nth_child(element, flags_setter, nth, true, true),
        PseudoClass::Lang(ref lang) => matches_lang(element, context.document, lang),
        PseudoClass::MozIsHTML => element.is_html_element_in_html_document(),
        PseudoClass::MozSystemMetric(ref metric) => context.document.system_metrics.contains(metric),
        PseudoClass::MozLocaleDir(ref dir) => {
            let is_rtl = context.document.state.contains(DocumentState::RTL_LOCALE);
            match &**dir {
                "rtl" => is_rtl,
                "ltr" => !is_rtl,
                _ => false,
            }
        },
        PseudoClass::MozLWTheme => context.document.theme > DocumentTheme::None,
        PseudoClass::MozLWThemeBrightText => context.document.theme == DocumentTheme::Bright,
        PseudoClass::MozLWThemeDarkText => context.document.theme == DocumentTheme::Dark,
        PseudoClass::MozWindowInactive => context
            .document
            .state
            .contains(DocumentState::WINDOW_INACTIVE),
        PseudoClass::MozFirstNode => matches_edge_node(element, flags_setter, true),
        PseudoClass::MozLastNode => matches_edge_node(element, flags_setter, false),
        PseudoClass::MozEmptyExceptChildrenWithLocalname(ref local_name) => {
            flags_setter(element, ElementSelectorFlags::HAS_SLOW_SELECTOR);
            !element.has_significant_text_child() &&
                children(element).all(|child| {
                    child.namespace() == element.namespace() && child.local_name() == local_name
                })
        },
        PseudoClass::MozHasHandlerRef => {
            let param = Atom::from("param");
            let name = Atom::from("name");
            children(element).any(|child| {
                child.is_html_content() &&
                    *child.local_name() == param &&
                    child
                        .attr_value(NamespaceId::NONE, &name)
                        .is_some_and(|value| value.eq_ignore_ascii_case("pluginurl"))
            })
        },
        // Handled by the caller.
        PseudoClass::MozAny(..) => false,
        ref state_pseudo_class => {
            debug_assert!(!state_pseudo_class.state_flag().is_empty());
            false
        },
    }
}

fn matches_attr_selector<E: Element>(attr: &AttrSelector, element: &E) -> bool {
    let is_html = element.is_html_element_in_html_document();
    let name = if is_html { &attr.lower_name } else { &attr.name };
    let case_sensitivity = if is_html && !attr.case_sensitive {
        CaseSensitivity::AsciiCaseInsensitive
    } else {
        CaseSensitivity::CaseSensitive
    };
    let matches_value = |value: &str| attr.operator.eval_str(value, &attr.value, case_sensitivity);
    match attr.namespace {
        // No single key to look up: test every attribute with that name.
        NamespaceConstraint::Any => element.any_attr_value(name, matches_value),
        NamespaceConstraint::Specific(namespace) => element
            .attr_value(namespace, name)
            .is_some_and(matches_value),
    }
}

/// The language of `element`: `xml:lang` on it or the closest ancestor
/// having one, with `lang` also counting on HTML elements.
fn element_lang<E: Element>(element: &E) -> Option<String> {
    let xml_lang = Atom::from("lang");
    let mut current = Some(element.clone());
    while let Some(element) = current {
        let value = element.attr_value(NamespaceId::XML, &xml_lang).or_else(|| {
            if element.is_html_content() {
                element.attr_value(NamespaceId::NONE, &xml_lang)
            } else {
                None
            }
        });
        if let Some(value) = value {
            return Some(value.to_owned());
        }
        current = element.parent_element();
    }
    None
}

fn dash_matches_ignoring_case(value: &str, lang: &str) -> bool {
    crate::attr::AttrSelectorOperator::DashMatch.eval_str(
        value,
        lang,
        CaseSensitivity::AsciiCaseInsensitive,
    )
}

fn matches_lang<E: Element>(element: &E, document: &DocumentContext, lang: &str) -> bool {
    if lang.is_empty() {
        return false;
    }
    if let Some(element_lang) = element_lang(element) {
        if !element_lang.is_empty() {
            return dash_matches_ignoring_case(&element_lang, lang);
        }
    }
    // Fall back to the document language, which may list several.
    document.content_language.as_deref().is_some_and(|languages| {
        let languages: String = languages.chars().filter(|c| !c.is_whitespace()).collect();
        languages
            .split(',')
            .filter(|candidate| !candidate.is_empty())
            .any(|candidate| dash_matches_ignoring_case(candidate, lang))
    })
}

fn matches_edge_child<E, F>(element: &E, flags_setter: &mut F, check_first: bool, check_last: bool) -> bool
where
    E: Element,
    F: FnMut(&E, ElementSelectorFlags),
{
    let Some(parent) = element.parent_element() else {
        return false;
    };
    flags_setter(&parent, ElementSelectorFlags::HAS_EDGE_CHILD_SELECTOR);
    (!check_first || element.prev_sibling_element().is_none()) &&
        (!check_last || element.next_sibling_element().is_none())
}

/// The element children of `element`, in tree order.
fn children<E: Element>(element: &E) -> impl Iterator<Item = E> {
    std::iter::successors(element.first_child_element(), E::next_sibling_element)
}

/// `:-moz-first-node` and `:-moz-last-node`: like `:first-child` and
/// `:last-child`, but text that isn't all whitespace counts as a node.
fn matches_edge_node<E, F>(element: &E, flags_setter: &mut F, first: bool) -> bool
where
    E: Element,
    F: FnMut(&E, ElementSelectorFlags),
{
    let Some(parent) = element.parent_element() else {
        return false;
    };
    flags_setter(&parent, ElementSelectorFlags::HAS_EDGE_CHILD_SELECTOR);
    if first {
        element.prev_sibling_element().is_none() && !element.has_significant_text_before()
    } else {
        element.next_sibling_element().is_none() && !element.has_significant_text_after()
    }
}

fn matches_edge_of_type<E, F>(element: &E, flags_setter: &mut F, check_first: bool, check_last: bool) -> bool
where
    E: Element,
    F: FnMut(&E, ElementSelectorFlags),
{
    let Some(parent) = element.parent_element() else {
        return false;
    };
    flags_setter(
        &parent,
        if check_last {
            ElementSelectorFlags::HAS_SLOW_SELECTOR
        } else {
            ElementSelectorFlags::HAS_SLOW_SELECTOR_LATER_SIBLINGS
        },
    );
    (!check_first || nth_index(element, true, false) == 1) &&
        (!check_last || nth_index(element, true, true) == 1)
}

fn matches_generic_nth_child<E, F>(
    element: &E,
    flags_setter: &mut F,
    nth: NthSelectorData,
    is_of_type: bool,
    is_from_end: bool,
) -> bool
where
    E: Element,
    F: FnMut(&E, ElementSelectorFlags),
{
    let Some(parent) = element.parent_element() else {
        return false;
    };
    flags_setter(
        &parent,
        if is_from_end {
            ElementSelectorFlags::HAS_SLOW_SELECTOR
        } else {
            ElementSelectorFlags::HAS_SLOW_SELECTOR_LATER_SIBLINGS
        },
    );
    nth.matches_index(nth_index(element, is_of_type, is_from_end))
}

/// The 1-based position of `element` among its element siblings, counting
/// only siblings of the same type when `is_of_type`, and from the last one
/// when `is_from_end`.
#[inline]
fn nth_index<E: Element>(element: &E, is_of_type: bool, is_from_end: bool) -> i32 {
    let next = |e: &E| {
        if is_from_end {
            e.next_sibling_element()
        } else {
            e.prev_sibling_element()
        }
    };
    let mut index = 1;
    let mut current = next(element);
    while let Some(sibling) = current {
        if !is_of_type ||
            (sibling.local_name() == element.local_name() &&
                sibling.namespace() == element.namespace())
        {
            index += 1;
        }
        current = next(&sibling);
    }
    index
}

/// Walks the rest of a selector chain from `element`, whose own compound
/// already matched. `link` is the combinator and compound on the left of
/// that compound.
///
/// Child and next-sibling combinators must match the immediate parent or
/// previous sibling. Descendant and later-sibling combinators may skip
/// elements; when such a combinator is followed by a different one, each
/// candidate is retried from the top of the remaining chain so a match at
/// the wrong level doesn't consume it. A later-sibling followed by an
/// ancestor combinator needs no retry: all those siblings share a parent.
///
/// While `look_for_relevant_link` is set, the first link among the
/// ancestors becomes the relevant link.
pub fn matches_selector_chain<E, F>(
    mut link: Option<(Combinator, &Selector)>,
    element: &E,
    context: &mut MatchingContext,
    mut look_for_relevant_link: bool,
    flags_setter: &mut F,
) -> bool
where
    E: Element,
    F: FnMut(&E, ElementSelectorFlags),
{
    let mut previous = element.clone();
    while let Some((combinator, selector)) = link {
        let candidate = if combinator.is_sibling() {
            // The relevant link must be an ancestor of the subject.
            look_for_relevant_link = false;
            if let Some(parent) = previous.parent_element() {
                flags_setter(&parent, ElementSelectorFlags::HAS_SLOW_SELECTOR_LATER_SIBLINGS);
            }
            previous.prev_sibling_element()
        } else {
            previous.parent_element()
        };
        let Some(candidate) = candidate else {
            return false;
        };

        let is_relevant_link = look_for_relevant_link && candidate.is_link();
        if is_relevant_link {
            look_for_relevant_link = false;
            context.relevant_link_found = true;
        }
        let node_context = NodeMatchingContext::new(ElementState::empty(), is_relevant_link);
        if matches_compound_selector(selector, &candidate, context, &node_context, flags_setter) {
            if let Some((next_combinator, _)) = selector.next_link() {
                if combinator.is_greedy() &&
                    next_combinator != combinator &&
                    !(combinator == Combinator::LaterSibling && next_combinator.is_ancestor())
                {
                    trace!("Retrying {:?} from a farther candidate", combinator);
                    if matches_selector_chain(
                        Some((combinator, selector)),
                        &candidate,
                        context,
                        look_for_relevant_link,
                        flags_setter,
                    ) {
                        return true;
                    }
                }
            }
            link = selector.next_link();
        } else if !combinator.is_greedy() {
            return false;
        }
        previous = candidate;
    }
    true
}
