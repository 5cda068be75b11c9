/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::dom::{Document, TestElement, init_logging, location, rule_name, style_rule};
use cascade_selectors::matching::ignore_selector_flags;
use cascade_selectors::{DocumentContext, MatchingContext, QuirksMode, Selector, VisitedHandlingMode};
use cascade_style::applicable_declarations::ApplicableDeclarationList;
use cascade_style::media_queries::{Device, MediaList, MediaQuery, MediaQueryType, MediaType, Qualifier};
use cascade_style::stylesheets::{CssRule, DocumentRule, FontFaceRule, ImportRule, MediaRule};
use cascade_style::stylesheets::{Origin, Source, Stylesheet, UrlMatchingFunction};
use cascade_style::stylist::CascadeData;
use servo_arc::Arc;
use url::Url;

fn print_only() -> MediaList {
    MediaList {
        media_queries: vec![MediaQuery::new(None, MediaQueryType::Concrete(MediaType::print()))],
    }
}

fn paragraph(name: &str) -> CssRule {
    CssRule::Style(style_rule(name, vec![Selector::tag("p")]))
}

fn font_face(family: &str) -> CssRule {
    CssRule::FontFace(Arc::new(FontFaceRule {
        family: family.into(),
        sources: vec![Source::Local(family.into())],
        source_location: location(1),
    }))
}

fn import(stylesheet: Stylesheet) -> CssRule {
    CssRule::Import(Arc::new(ImportRule {
        url: "imported.css".into(),
        stylesheet: Arc::new(stylesheet),
        source_location: location(1),
    }))
}

fn matched_names(sheets: &[Arc<Stylesheet>], device: &Device) -> Vec<String> {
    let cascade = CascadeData::new(sheets, device, QuirksMode::NoQuirks);
    let mut doc = Document::html("html");
    let p = doc.append(Document::ROOT, "p");
    let element = doc.element(p);

    let document = DocumentContext::default();
    let mut context = MatchingContext::new(&document, QuirksMode::NoQuirks, VisitedHandlingMode::AllLinksUnvisited);
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

fn screen() -> Device {
    Device::new(MediaType::screen(), 800, 600)
}

#[test]
fn imports_come_before_the_importing_rules() {
    init_logging();
    let sheet = Stylesheet::new(
        Origin::Author,
        vec![
            import(Stylesheet::new(Origin::Author, vec![paragraph("imported")])),
            paragraph("own"),
            import(Stylesheet::new(Origin::Author, vec![paragraph("late import")])),
        ],
    );
    assert_eq!(
        matched_names(&[Arc::new(sheet)], &screen()),
        vec!["imported", "late import", "own"]
    );
}

#[test]
fn imports_and_sheets_honor_their_media() {
    init_logging();
    let sheet = Stylesheet::new(
        Origin::Author,
        vec![
            import(Stylesheet::new(Origin::Author, vec![paragraph("print import")]).with_media(print_only())),
            paragraph("own"),
        ],
    );
    let print_sheet = Stylesheet::new(Origin::User, vec![paragraph("print sheet")]).with_media(print_only());
    let sheets = [Arc::new(sheet), Arc::new(print_sheet)];

    assert_eq!(matched_names(&sheets, &screen()), vec!["own"]);
    assert_eq!(
        matched_names(&sheets, &Device::new(MediaType::print(), 800, 600)),
        vec!["print import", "own", "print sheet"]
    );
}

#[test]
fn media_rules_nest() {
    init_logging();
    let not_print = MediaList {
        media_queries: vec![MediaQuery::new(
            Some(Qualifier::Not),
            MediaQueryType::Concrete(MediaType::print()),
        )],
    };
    let inner = CssRule::Media(Arc::new(MediaRule {
        media_queries: print_only(),
        rules: vec![paragraph("never")],
        source_location: location(3),
    }));
    let outer = CssRule::Media(Arc::new(MediaRule {
        media_queries: not_print,
        rules: vec![paragraph("not print"), inner],
        source_location: location(2),
    }));
    let sheet = Arc::new(Stylesheet::new(Origin::Author, vec![outer]));
    assert_eq!(matched_names(&[sheet.clone()], &screen()), vec!["not print"]);
    assert!(matched_names(&[sheet], &Device::new(MediaType::print(), 800, 600)).is_empty());
}

#[test]
fn disabled_sheets_are_skipped() {
    let mut disabled = Stylesheet::new(Origin::Author, vec![paragraph("disabled"), font_face("Gone")]);
    disabled.disabled = true;
    assert!(disabled.disabled());
    let disabled = Arc::new(disabled);
    assert!(matched_names(&[disabled.clone()], &screen()).is_empty());
    let cascade = CascadeData::new(&[disabled], &screen(), QuirksMode::NoQuirks);
    assert!(cascade.font_face_rules().is_empty());
    assert_eq!(cascade.num_selectors(), 0);
}

#[test]
fn document_rules_follow_the_document_url() {
    init_logging();
    let sheet = Arc::new(Stylesheet::new(
        Origin::User,
        vec![CssRule::Document(Arc::new(DocumentRule {
            conditions: vec![
                UrlMatchingFunction::Domain("example.org".into()),
                UrlMatchingFunction::Url("about:blank".into()),
            ],
            rules: vec![paragraph("site")],
            source_location: location(1),
        }))],
    ));
    let at = |url: &str| screen().with_document_url(Url::parse(url).unwrap());

    assert_eq!(matched_names(&[sheet.clone()], &at("https://www.example.org/a")), vec!["site"]);
    assert_eq!(matched_names(&[sheet.clone()], &at("about:blank")), vec!["site"]);
    assert!(matched_names(&[sheet.clone()], &at("https://badexample.org/")).is_empty());
    assert!(matched_names(&[sheet.clone()], &screen()).is_empty());

    // The outcome is part of the cache key.
    let cascade = CascadeData::new(&[sheet], &at("https://example.org/"), QuirksMode::NoQuirks);
    assert!(cascade.cache_key().matches(&at("https://sub.example.org/"), QuirksMode::NoQuirks));
    assert!(!cascade.cache_key().matches(&at("https://example.com/"), QuirksMode::NoQuirks));
}

#[test]
fn font_faces_are_collected_in_cascade_order() {
    init_logging();
    let user = Arc::new(Stylesheet::new(
        Origin::User,
        vec![
            font_face("User"),
            import(Stylesheet::new(Origin::Author, vec![font_face("Imported")])),
        ],
    ));
    let author = Arc::new(Stylesheet::new(
        Origin::Author,
        vec![
            CssRule::Media(Arc::new(MediaRule {
                media_queries: print_only(),
                rules: vec![font_face("Print")],
                source_location: location(1),
            })),
            font_face("Author"),
        ],
    ));
    let cascade = CascadeData::new(&[user, author], &screen(), QuirksMode::NoQuirks);

    let faces: Vec<(&str, Origin)> = cascade
        .font_face_rules()
        .iter()
        .map(|(rule, origin)| (&*rule.family, *origin))
        .collect();
    assert_eq!(
        faces,
        vec![
            ("Imported", Origin::User),
            ("User", Origin::User),
            ("Author", Origin::Author),
        ]
    );

    let mut appended = vec![];
    cascade.append_font_face_rules(&mut appended);
    assert_eq!(appended.len(), 3);
    assert!(Arc::ptr_eq(&appended[0].0, &cascade.font_face_rules()[0].0));
}
