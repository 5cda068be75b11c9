/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The restyle hints are checked against what a full rematch of the whole
//! document finds after the change.

use crate::dom::{Document, TestElement, author_sheet, init_logging, rule_name, style_rule};
use cascade_selectors::attr::{AttrSelector, AttrSelectorOperator};
use cascade_selectors::context::DocumentTheme;
use cascade_selectors::element_state::{DocumentState, ElementState};
use cascade_selectors::matching::ignore_selector_flags;
use cascade_selectors::{Atom, Combinator, DocumentContext, Element, MatchingContext, NamespaceId, PseudoClass};
use cascade_selectors::{QuirksMode, Selector, SelectorList, VisitedHandlingMode};
use cascade_style::applicable_declarations::ApplicableDeclarationList;
use cascade_style::media_queries::{Device, MediaType};
use cascade_style::restyle_hints::RestyleHint;
use cascade_style::stylist::CascadeData;

fn cascade(selectors: Vec<Selector>) -> CascadeData {
    let rules = selectors
        .into_iter()
        .enumerate()
        .map(|(i, selector)| style_rule(&format!("r{}", i), vec![selector]))
        .collect();
    CascadeData::new(
        &[author_sheet(rules)],
        &Device::new(MediaType::screen(), 800, 600),
        QuirksMode::NoQuirks,
    )
}

fn matched(cascade: &CascadeData, document: &DocumentContext, element: TestElement) -> Vec<String> {
    let mut context = MatchingContext::new(document, QuirksMode::NoQuirks, VisitedHandlingMode::AllLinksUnvisited);
    let mut declarations = ApplicableDeclarationList::new();
    cascade.push_applicable_declarations(
        &element,
        None,
        &mut context,
        &mut declarations,
        &mut ignore_selector_flags::<TestElement>,
    );
    declarations.iter().map(|block| rule_name(&block.rule)).collect()
}

/// The rules matched by every element, by node index.
fn all_matches(cascade: &CascadeData, document: &DocumentContext, doc: &Document) -> Vec<Vec<String>> {
    let mut result = vec![vec![]; doc.len()];
    for element in doc.elements() {
        result[element.index()] = matched(cascade, document, element);
    }
    result
}

fn assert_covered(
    doc: &Document,
    changed: usize,
    hint: RestyleHint,
    before: &[Vec<String>],
    after: &[Vec<String>],
    what: &str,
) {
    for node in 0..doc.len() {
        if before[node] == after[node] {
            continue;
        }
        let covered = if node == changed {
            hint.intersects(RestyleHint::SELF | RestyleHint::SUBTREE)
        } else if doc.is_inclusive_descendant(node, changed) {
            hint.contains(RestyleHint::SUBTREE)
        } else if doc.is_in_later_sibling_subtree(node, changed) {
            hint.contains(RestyleHint::LATER_SIBLINGS)
        } else {
            false
        };
        assert!(
            covered,
            "{} on node {}: node {} went from {:?} to {:?} under {:?}",
            what, changed, node, before[node], after[node], hint
        );
    }
}

/// html > body > [div.a > p > span, ul#list > li * 3 > span, div#x[title]]
fn tree() -> Document {
    let mut doc = Document::html("html");
    let body = doc.append(Document::ROOT, "body");
    let div = doc.append(body, "div");
    doc.add_class(div, "a");
    let p = doc.append(div, "p");
    doc.append(p, "span");
    let ul = doc.append(body, "ul");
    doc.set_id(ul, "list");
    for i in 0..3 {
        let li = doc.append(ul, "li");
        if i == 1 {
            doc.add_class(li, "b");
            doc.set_state(li, ElementState::HOVER);
        }
        doc.append(li, "span");
    }
    let x = doc.append(body, "div");
    doc.set_id(x, "x");
    doc.set_attr(x, "title", "t");
    doc
}

fn state_rules() -> Vec<Selector> {
    vec![
        Selector::universal().with_pseudo_class(PseudoClass::Hover),
        Selector::universal()
            .with_class("b")
            .with_next(
                Combinator::Descendant,
                Selector::universal().with_class("a").with_pseudo_class(PseudoClass::Hover),
            ),
        Selector::tag("span").with_next(
            Combinator::Descendant,
            Selector::universal().with_class("a").with_pseudo_class(PseudoClass::Hover),
        ),
        Selector::tag("li").with_next(
            Combinator::NextSibling,
            Selector::tag("li").with_pseudo_class(PseudoClass::Hover),
        ),
        Selector::tag("span").with_next(
            Combinator::Descendant,
            Selector::tag("li").with_next(
                Combinator::LaterSibling,
                Selector::tag("li").with_pseudo_class(PseudoClass::Focus),
            ),
        ),
        Selector::tag("p").with_next(
            Combinator::Child,
            Selector::tag("div").with_negation(Selector::universal().with_pseudo_class(PseudoClass::Active)),
        ),
        Selector::universal().with_pseudo_class(PseudoClass::Checked),
        Selector::tag("li").with_next(
            Combinator::Descendant,
            Selector::tag("ul").with_pseudo_class(PseudoClass::MozAny(SelectorList::new(vec![
                Selector::universal().with_class("a").with_pseudo_class(PseudoClass::Hover),
                Selector::universal().with_id("list").with_pseudo_class(PseudoClass::Focus),
            ]))),
        ),
        Selector::universal()
            .with_attr(AttrSelector::exists("title"))
            .with_pseudo_class(PseudoClass::Focus),
        Selector::tag("span").with_next(
            Combinator::Child,
            Selector::universal().with_negation(Selector::universal().with_pseudo_class(PseudoClass::MozAny(
                SelectorList::new(vec![Selector::universal().with_pseudo_class(PseudoClass::Checked)]),
            ))),
        ),
    ]
}

#[test]
fn state_hints_cover_every_restyle() {
    init_logging();
    let cascade = cascade(state_rules());
    let document = DocumentContext::default();
    let doc = tree();
    let before = all_matches(&cascade, &document, &doc);

    for node in 0..doc.len() {
        for bit in [
            ElementState::HOVER,
            ElementState::ACTIVE,
            ElementState::FOCUS,
            ElementState::CHECKED,
        ] {
            let hint = cascade.has_state_dependent_style(&doc.element(node), &document, bit);
            let mut changed = doc.clone();
            changed.toggle_state(node, bit);
            let after = all_matches(&cascade, &document, &changed);
            assert_covered(&doc, node, hint, &before, &after, &format!("{:?}", bit));

            // The query is symmetric: asking after the flip is as good.
            let hint_after = cascade.has_state_dependent_style(&changed.element(node), &document, bit);
            assert_eq!(hint, hint_after, "{:?} on node {}", bit, node);
        }
    }
}

#[test]
fn state_hints_are_not_everything() {
    let cascade = cascade(vec![
        Selector::tag("a").with_pseudo_class(PseudoClass::Hover),
        Selector::tag("span").with_next(
            Combinator::Descendant,
            Selector::tag("p").with_pseudo_class(PseudoClass::Focus),
        ),
    ]);
    let document = DocumentContext::default();
    let doc = tree();
    let div = doc.elements().into_iter().find(|element| &**element.local_name() == "div").unwrap();
    assert!(cascade.has_state_dependent_style(&div, &document, ElementState::HOVER).is_empty());
    assert!(cascade.has_state_dependent_style(&div, &document, ElementState::empty()).is_empty());

    let p = doc.elements().into_iter().find(|element| &**element.local_name() == "p").unwrap();
    assert!(cascade.has_state_dependent_style(&p, &document, ElementState::HOVER).is_empty());
    assert_eq!(
        cascade.has_state_dependent_style(&p, &document, ElementState::FOCUS | ElementState::HOVER),
        RestyleHint::SUBTREE
    );
}

#[test]
fn negated_any_reports_its_state() {
    init_logging();
    let selector = Selector::tag("span").with_next(
        Combinator::Descendant,
        Selector::tag("div").with_negation(Selector::universal().with_pseudo_class(PseudoClass::MozAny(
            SelectorList::new(vec![Selector::universal().with_pseudo_class(PseudoClass::Hover)]),
        ))),
    );
    let cascade = cascade(vec![selector]);
    let document = DocumentContext::default();
    let doc = tree();
    let div = doc.elements().into_iter().find(|element| &**element.local_name() == "div").unwrap();

    for hovered in [false, true] {
        let mut doc = doc.clone();
        if hovered {
            doc.toggle_state(div.index(), ElementState::HOVER);
        }
        let hint = cascade.has_state_dependent_style(&doc.element(div.index()), &document, ElementState::HOVER);
        assert!(hint.contains(RestyleHint::SUBTREE), "hovered: {}", hovered);
    }
}

fn attribute_rules() -> Vec<Selector> {
    vec![
        Selector::universal().with_id("x"),
        Selector::tag("li").with_next(Combinator::Child, Selector::universal().with_id("list")),
        Selector::universal().with_id("y"),
        Selector::universal().with_class("a"),
        Selector::tag("div").with_next(Combinator::LaterSibling, Selector::universal().with_class("a")),
        Selector::tag("li").with_negation(Selector::universal().with_class("b")),
        Selector::tag("span").with_next(
            Combinator::Descendant,
            Selector::universal().with_pseudo_class(PseudoClass::MozAny(SelectorList::new(vec![
                Selector::universal().with_class("c"),
            ]))),
        ),
        Selector::universal().with_attr(AttrSelector::exists("title")),
        Selector::tag("li").with_next(
            Combinator::NextSibling,
            Selector::universal().with_attr(AttrSelector::new("title", AttrSelectorOperator::Equal, "t")),
        ),
        Selector::tag("span").with_next(
            Combinator::Descendant,
            Selector::universal().with_attr(AttrSelector::exists("data-x")),
        ),
        Selector::tag("li").with_negation(Selector::universal().with_attr(AttrSelector::exists("title"))),
        Selector::universal().with_attr(AttrSelector::exists("TITLE")),
    ]
}

type Mutation = (&'static str, &'static str, fn(&mut Document, usize));

#[test]
fn attribute_hints_cover_every_restyle() {
    init_logging();
    let cascade = cascade(attribute_rules());
    let document = DocumentContext::default();
    let doc = tree();
    let before = all_matches(&cascade, &document, &doc);

    let mutations: [Mutation; 9] = [
        ("id", "set id x", |doc, node| doc.set_id(node, "x")),
        ("id", "set id y", |doc, node| doc.set_id(node, "y")),
        ("id", "set id list", |doc, node| doc.set_id(node, "list")),
        ("class", "add a", |doc, node| doc.add_class(node, "a")),
        ("class", "remove a", |doc, node| doc.remove_class(node, "a")),
        ("class", "add b", |doc, node| doc.add_class(node, "b")),
        ("class", "add c", |doc, node| doc.add_class(node, "c")),
        ("title", "set title", |doc, node| doc.set_attr(node, "title", "t")),
        ("data-x", "set data-x", |doc, node| doc.set_attr(node, "data-x", "")),
    ];
    let removals: [Mutation; 2] = [
        ("title", "remove title", |doc, node| doc.remove_attr(node, "title")),
        ("data-x", "remove data-x", |doc, node| doc.remove_attr(node, "data-x")),
    ];

    for node in 0..doc.len() {
        for (attr, what, mutate) in mutations.iter().chain(removals.iter()) {
            let attr = Atom::from(*attr);
            let mut changed = doc.clone();
            mutate(&mut changed, node);
            let hint = cascade.has_attribute_dependent_style(&doc.element(node), &document, &attr, false) |
                cascade.has_attribute_dependent_style(&changed.element(node), &document, &attr, true);
            let after = all_matches(&cascade, &document, &changed);
            assert_covered(&doc, node, hint, &before, &after, what);
        }
    }
}

#[test]
fn unrelated_attributes_need_nothing() {
    let cascade = cascade(attribute_rules());
    let document = DocumentContext::default();
    let doc = tree();
    for element in doc.elements() {
        let hint = cascade.has_attribute_dependent_style(&element, &document, &Atom::from("href"), true);
        assert!(hint.is_empty());
    }
}

#[test]
fn lang_changes_restyle_the_subtree() {
    let document = DocumentContext::default();
    let doc = tree();
    let body = doc.element(1);
    let lang = Atom::from("lang");

    let without = cascade(vec![Selector::universal().with_class("a")]);
    assert!(without.has_attribute_dependent_style(&body, &document, &lang, true).is_empty());

    let with = cascade(vec![
        Selector::tag("span").with_pseudo_class(PseudoClass::Lang("fr".into())),
    ]);
    assert_eq!(
        with.has_attribute_dependent_style(&body, &document, &lang, false),
        RestyleHint::SUBTREE
    );
}

#[test]
fn lightweight_theme_attributes_restyle_the_window() {
    let cascade = cascade(vec![]);
    let document = DocumentContext {
        theme: DocumentTheme::Dark,
        ..DocumentContext::default()
    };
    let mut window = Document::xml("window", NamespaceId::XUL);
    let child = window.append(Document::ROOT, "box");
    let lwtheme = Atom::from("lwtheme");

    let root = window.element(Document::ROOT);
    assert_eq!(
        cascade.has_attribute_dependent_style(&root, &document, &lwtheme, true),
        RestyleHint::SUBTREE
    );
    assert_eq!(
        cascade.has_attribute_dependent_style(&root, &document, &Atom::from("lwthemetextcolor"), true),
        RestyleHint::SUBTREE
    );
    // Only once the change is done.
    assert!(cascade.has_attribute_dependent_style(&root, &document, &lwtheme, false).is_empty());
    // Only on the root.
    assert!(
        cascade
            .has_attribute_dependent_style(&window.element(child), &document, &lwtheme, true)
            .is_empty()
    );
    // Only in XUL.
    let html = Document::html("html");
    assert!(
        cascade
            .has_attribute_dependent_style(&html.element(Document::ROOT), &document, &lwtheme, true)
            .is_empty()
    );
}

#[test]
fn document_state_dependencies() {
    let dependent = cascade(vec![
        Selector::universal().with_pseudo_class(PseudoClass::MozWindowInactive),
        Selector::universal().with_negation(
            Selector::universal().with_pseudo_class(PseudoClass::MozLocaleDir("rtl".into())),
        ),
    ]);
    assert!(dependent.has_document_state_dependent_style(DocumentState::WINDOW_INACTIVE));
    assert!(dependent.has_document_state_dependent_style(DocumentState::RTL_LOCALE));
    assert!(!dependent.has_document_state_dependent_style(DocumentState::empty()));

    let plain = cascade(vec![Selector::universal().with_pseudo_class(PseudoClass::Hover)]);
    assert!(!plain.has_document_state_dependent_style(DocumentState::all()));
}
