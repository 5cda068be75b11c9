/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::dom::{Document, TestElement, author_sheet, init_logging, rule_name, style_rule};
use cascade_selectors::attr::AttrSelector;
use cascade_selectors::element_state::ElementState;
use cascade_selectors::matching::{ignore_selector_flags, matches_selector};
use cascade_selectors::parser::NthSelectorData;
use cascade_selectors::{Atom, Combinator, DocumentContext, Element, MatchingContext, NamespaceId};
use cascade_selectors::{NodeMatchingContext, PseudoClass, PseudoElement, QuirksMode, Selector, SelectorList};
use cascade_selectors::VisitedHandlingMode;
use cascade_style::applicable_declarations::ApplicableDeclarationList;
use cascade_style::media_queries::{Device, MediaType};
use cascade_style::selector_map::SelectorMap;
use cascade_style::stylesheets::{CssRule, DeclarationBlock, Importance, StyleRule, Stylesheet};
use cascade_style::stylist::{CascadeData, Rule, Stylist};
use servo_arc::Arc;

fn screen() -> Device {
    Device::new(MediaType::screen(), 1024, 768)
}

fn matched_blocks(
    cascade: &CascadeData,
    element: TestElement,
    pseudo_element: Option<&PseudoElement>,
) -> ApplicableDeclarationList {
    let document = DocumentContext::default();
    let mut context = MatchingContext::new(
        &document,
        cascade.quirks_mode(),
        VisitedHandlingMode::AllLinksUnvisited,
    );
    let mut declarations = ApplicableDeclarationList::new();
    cascade.push_applicable_declarations(
        &element,
        pseudo_element,
        &mut context,
        &mut declarations,
        &mut ignore_selector_flags::<TestElement>,
    );
    declarations
}

fn matched(cascade: &CascadeData, element: TestElement) -> Vec<String> {
    matched_blocks(cascade, element, None)
        .iter()
        .map(|block| rule_name(&block.rule))
        .collect()
}

fn matches(element: TestElement, selector: &Selector, quirks_mode: QuirksMode) -> bool {
    let document = DocumentContext::default();
    let mut context = MatchingContext::new(&document, quirks_mode, VisitedHandlingMode::AllLinksUnvisited);
    matches_selector(
        selector,
        &element,
        &mut context,
        &NodeMatchingContext::new(ElementState::empty(), element.is_link()),
        &mut ignore_selector_flags::<TestElement>,
    )
}

#[test]
fn end_to_end_example() {
    init_logging();
    let id_and_class = Selector::universal().with_id("a").with_class("b");
    let class = Selector::universal().with_class("b");
    let tag = Selector::tag("div");
    assert_eq!(id_and_class.specificity(), 0x010100);
    assert_eq!(class.specificity(), 0x000100);
    assert_eq!(tag.specificity(), 0x000001);

    let mut map = SelectorMap::new();
    for (order, (name, selector)) in [("#a.b", id_and_class), (".b", class), ("div", tag)]
        .into_iter()
        .enumerate()
    {
        let specificity = selector.specificity();
        let rule = style_rule(name, vec![selector.clone()]);
        map.insert(
            Rule::new(Arc::new(selector), rule, order as u32, specificity),
            QuirksMode::NoQuirks,
        )
        .unwrap();
    }

    let mut doc = Document::html("div");
    doc.set_id(Document::ROOT, "a");
    doc.add_class(Document::ROOT, "b");
    let element = doc.element(Document::ROOT);

    let mut names = vec![];
    map.enumerate_all_rules(
        element.namespace(),
        element.local_name(),
        element.id(),
        &[Atom::from("b")],
        QuirksMode::NoQuirks,
        |rule: &Rule| {
            if matches(element, &rule.selector, QuirksMode::NoQuirks) {
                names.push(rule_name(&rule.style_rule));
            }
        },
    );
    assert_eq!(names, vec!["#a.b", ".b", "div"]);
}

#[test]
fn cascade_orders_by_specificity_then_source() {
    init_logging();
    let sheet = author_sheet(vec![
        style_rule("#a.b", vec![Selector::universal().with_id("a").with_class("b")]),
        style_rule("first .b", vec![Selector::universal().with_class("b")]),
        style_rule("div", vec![Selector::tag("div")]),
        style_rule("second .b", vec![Selector::universal().with_class("b")]),
    ]);
    let cascade = CascadeData::new(&[sheet], &screen(), QuirksMode::NoQuirks);

    let mut doc = Document::html("div");
    doc.set_id(Document::ROOT, "a");
    doc.add_class(Document::ROOT, "b");
    assert_eq!(
        matched(&cascade, doc.element(Document::ROOT)),
        vec!["div", "first .b", "second .b", "#a.b"]
    );
    assert_eq!(cascade.num_selectors(), 4);
    assert_eq!(cascade.num_declarations(), 4);
}

struct Fixture {
    doc: Document,
    sheet: Arc<Stylesheet>,
}

fn fixture() -> Fixture {
    let mut doc = Document::html("html");
    let body = doc.append(Document::ROOT, "body");
    let x = doc.append(body, "div");
    doc.set_id(x, "x");
    doc.add_class(x, "a");
    doc.add_class(x, "b");
    doc.set_attr(x, "title", "t");
    let plain = doc.append(body, "div");
    doc.add_class(plain, "a");
    let p = doc.append(body, "p");
    let span = doc.append(p, "span");
    doc.add_class(span, "a");
    doc.set_state(span, ElementState::HOVER);
    let ul = doc.append(body, "ul");
    for i in 0..3 {
        let li = doc.append(ul, "li");
        if i > 0 {
            doc.add_class(li, "b");
        }
    }
    let svg = doc.append_ns(body, "svg", NamespaceId::SVG);
    doc.append(svg, "g");
    doc.append(body, "hr");

    let selectors = vec![
        Selector::universal(),
        Selector::tag("div"),
        Selector::tag("DIV"),
        Selector::universal().with_class("a"),
        Selector::universal().with_class("b"),
        Selector::universal().with_id("x"),
        Selector::tag("div").with_class("a"),
        Selector::universal().with_class("a").with_class("b"),
        Selector::universal()
            .with_class("a")
            .with_next(Combinator::Descendant, Selector::tag("p")),
        Selector::tag("div").with_next(Combinator::Child, Selector::tag("body")),
        Selector::tag("li").with_pseudo_class(PseudoClass::FirstChild),
        Selector::tag("li").with_pseudo_class(PseudoClass::NthChild(NthSelectorData::new(2, 0))),
        Selector::universal().with_attr(AttrSelector::exists("title")),
        Selector::universal().with_namespace(NamespaceId::SVG),
        Selector::universal().with_negation(Selector::universal().with_class("a")),
        Selector::universal().with_class("a").with_pseudo_class(PseudoClass::Hover),
        Selector::universal().with_id("x").with_class("a").with_class("c"),
        Selector::tag("li").with_next(
            Combinator::NextSibling,
            Selector::tag("li").with_next(Combinator::Descendant, Selector::tag("ul")),
        ),
        Selector::universal().with_pseudo_class(PseudoClass::MozAny(SelectorList::new(vec![
            Selector::tag("p"),
            Selector::universal().with_class("b"),
        ]))),
        Selector::universal()
            .with_class("b")
            .with_next(Combinator::LaterSibling, Selector::tag("li")),
        Selector::universal().with_class("B"),
        Selector::universal().with_pseudo_class(PseudoClass::Empty),
    ];

    let mut rules: Vec<Arc<StyleRule>> = selectors
        .into_iter()
        .enumerate()
        .map(|(i, selector)| style_rule(&format!("r{}", i), vec![selector]))
        .collect();
    rules.push(style_rule(
        "list",
        vec![Selector::tag("g"), Selector::universal().with_id("x")],
    ));

    Fixture {
        doc,
        sheet: author_sheet(rules),
    }
}

/// Every selector of every rule against every element, sorted the way the
/// cascade numbers them.
fn linear_scan(sheet: &Stylesheet, element: TestElement) -> Vec<String> {
    let mut candidates = vec![];
    for rule in &sheet.rules {
        if let CssRule::Style(ref rule) = *rule {
            for complex in rule.selectors.iter() {
                candidates.push((complex.specificity, rule.clone(), complex.selector.clone()));
            }
        }
    }
    candidates.sort_by_key(|&(specificity, _, _)| specificity);
    candidates
        .into_iter()
        .filter(|(_, _, selector)| matches(element, selector, QuirksMode::NoQuirks))
        .map(|(_, rule, _)| rule_name(&rule))
        .collect()
}

#[test]
fn indexed_matching_equals_linear_scan() {
    init_logging();
    let Fixture { doc, sheet } = fixture();
    let cascade = CascadeData::new(&[sheet.clone()], &screen(), QuirksMode::NoQuirks);
    for element in doc.elements() {
        assert_eq!(
            matched(&cascade, element),
            linear_scan(&sheet, element),
            "{:?}",
            element
        );
    }
}

#[test]
fn emission_is_ordered() {
    let Fixture { doc, sheet } = fixture();
    let cascade = CascadeData::new(&[sheet], &screen(), QuirksMode::NoQuirks);
    for element in doc.elements() {
        let blocks = matched_blocks(&cascade, element, None);
        for pair in blocks.windows(2) {
            assert!(pair[0].source_order() < pair[1].source_order());
            assert!(pair[0].specificity <= pair[1].specificity);
        }
    }
}

#[test]
fn rebuilding_is_idempotent() {
    let Fixture { doc, sheet } = fixture();
    let sheets = [sheet];
    let first = CascadeData::new(&sheets, &screen(), QuirksMode::NoQuirks);
    let second = CascadeData::new(&sheets, &screen(), QuirksMode::NoQuirks);
    assert_eq!(first.num_selectors(), second.num_selectors());
    assert_eq!(first.num_dependencies(), second.num_dependencies());
    for element in doc.elements() {
        assert_eq!(matched(&first, element), matched(&second, element));
    }
}

#[test]
fn quirks_mode_cascade_folds_case() {
    let Fixture { doc, sheet } = fixture();
    let cascade = CascadeData::new(&[sheet.clone()], &screen(), QuirksMode::Quirks);
    let x = doc
        .elements()
        .into_iter()
        .find(|element| element.id().is_some())
        .unwrap();
    let names = matched(&cascade, x);
    // `.B` now matches `.b`.
    assert!(names.contains(&"r20".to_owned()));
    assert!(!matched(&CascadeData::new(&[sheet], &screen(), QuirksMode::NoQuirks), x).contains(&"r20".to_owned()));
}

#[test]
fn pseudo_elements_and_anonymous_boxes() {
    init_logging();
    let before = |left: Combinator| {
        Selector::universal()
            .with_pseudo_element(PseudoElement::Before)
            .with_next(left, Selector::tag("p").with_class("note"))
    };
    let anon = Atom::from("-moz-anonymous-block");
    let sheet = author_sheet(vec![
        style_rule("p::before", vec![before(Combinator::Child)]),
        style_rule("p", vec![Selector::tag("p")]),
        style_rule("broken", vec![before(Combinator::Descendant)]),
        style_rule(
            "anon",
            vec![Selector::universal().with_pseudo_element(PseudoElement::AnonBox(anon.clone()))],
        ),
        style_rule(
            "anon 2",
            vec![Selector::universal().with_pseudo_element(PseudoElement::AnonBox(anon.clone()))],
        ),
    ]);
    let cascade = CascadeData::new(&[sheet], &screen(), QuirksMode::NoQuirks);

    let mut doc = Document::html("html");
    let p = doc.append(Document::ROOT, "p");
    doc.add_class(p, "note");

    assert_eq!(matched(&cascade, doc.element(p)), vec!["p"]);
    let pseudo: Vec<String> = matched_blocks(&cascade, doc.element(p), Some(&PseudoElement::Before))
        .iter()
        .map(|block| rule_name(&block.rule))
        .collect();
    assert_eq!(pseudo, vec!["p::before"]);
    let blocks = matched_blocks(&cascade, doc.element(p), Some(&PseudoElement::Before));
    assert!(blocks[0].selector.pseudo_element.is_none());
    assert!(matched_blocks(&cascade, doc.element(p), Some(&PseudoElement::After)).is_empty());

    let mut anon_rules = ApplicableDeclarationList::new();
    cascade.push_anon_box_rules(&anon, &mut anon_rules);
    let names: Vec<String> = anon_rules.iter().map(|block| rule_name(&block.rule)).collect();
    assert_eq!(names, vec!["anon", "anon 2"]);

    let mut none = ApplicableDeclarationList::new();
    cascade.push_anon_box_rules(&Atom::from("-moz-scrolled-content"), &mut none);
    assert!(none.is_empty());
}

#[test]
fn stylist_caches_cascades_per_medium() {
    use cascade_style::media_queries::{Expression, MediaFeature, MediaList, MediaQuery, MediaQueryType, Range};
    use cascade_style::stylesheets::MediaRule;

    init_logging();
    let wide_only = CssRule::Media(Arc::new(MediaRule {
        media_queries: MediaList {
            media_queries: vec![
                MediaQuery::new(None, MediaQueryType::All)
                    .with_expression(Expression::new(MediaFeature::Width, Range::Min, 500)),
            ],
        },
        rules: vec![CssRule::Style(style_rule("wide", vec![Selector::tag("p")]))],
        source_location: crate::dom::location(2),
    }));
    let sheet = Arc::new(Stylesheet::new(
        cascade_style::stylesheets::Origin::Author,
        vec![CssRule::Style(style_rule("p", vec![Selector::tag("p")])), wide_only],
    ));

    let mut doc = Document::html("html");
    let p = doc.append(Document::ROOT, "p");

    let mut stylist = Stylist::new(QuirksMode::NoQuirks);
    assert!(!stylist.medium_features_changed(&screen()));
    stylist.set_stylesheets(vec![sheet]);

    let wide = Device::new(MediaType::screen(), 800, 600);
    let wider = Device::new(MediaType::screen(), 1200, 600);
    let narrow = Device::new(MediaType::screen(), 400, 600);

    let first = stylist.cascade_for(&wide);
    assert_eq!(matched(&first, doc.element(p)), vec!["p", "wide"]);
    assert_eq!(stylist.num_rebuilds(), 1);

    // Same outcomes, same cascade.
    assert!(Arc::ptr_eq(&first, &stylist.cascade_for(&wider)));
    assert!(!stylist.medium_features_changed(&wider));
    assert_eq!(stylist.num_rebuilds(), 1);

    assert!(stylist.medium_features_changed(&narrow));
    let second = stylist.cascade_for(&narrow);
    assert_eq!(matched(&second, doc.element(p)), vec!["p"]);
    assert_eq!(stylist.num_rebuilds(), 2);

    // Both stay cached; the most recent one is in front.
    assert!(Arc::ptr_eq(&first, &stylist.cascade_for(&wide)));
    assert!(Arc::ptr_eq(stylist.current_cascade().unwrap(), &first));
    assert_eq!(stylist.num_rebuilds(), 2);

    // Print is another medium altogether.
    stylist.cascade_for(&Device::new(MediaType::print(), 800, 600));
    assert_eq!(stylist.num_rebuilds(), 3);

    stylist.set_quirks_mode(QuirksMode::Quirks);
    assert!(stylist.current_cascade().is_none());
    let quirky = stylist.cascade_for(&wide);
    assert_eq!(quirky.quirks_mode(), QuirksMode::Quirks);
    assert_eq!(stylist.num_rebuilds(), 4);

    stylist.clear_cascades();
    assert!(!stylist.medium_features_changed(&wide));
}

#[test]
fn published_rules_are_never_edited() {
    init_logging();
    let rule = style_rule("old", vec![Selector::tag("p")]);
    let mut stylist = Stylist::new(QuirksMode::NoQuirks);
    stylist.set_stylesheets(vec![author_sheet(vec![rule.clone()])]);
    let old_cascade = stylist.cascade_for(&screen());

    let edited = rule.with_block(DeclarationBlock::new().with_declaration("color", "new", Importance::Normal));
    assert!(!Arc::ptr_eq(&rule, &edited));
    assert_eq!(rule_name(&rule), "old");
    stylist.set_stylesheets(vec![author_sheet(vec![edited])]);
    let new_cascade = stylist.cascade_for(&screen());

    let mut doc = Document::html("html");
    let p = doc.append(Document::ROOT, "p");
    assert_eq!(matched(&old_cascade, doc.element(p)), vec!["old"]);
    assert_eq!(matched(&new_cascade, doc.element(p)), vec!["new"]);
    let blocks = matched_blocks(&old_cascade, doc.element(p), None);
    assert!(Arc::ptr_eq(blocks[0].block(), &rule.block));
}
