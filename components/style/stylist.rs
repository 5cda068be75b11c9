/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Selector matching.

use crate::Atom;
use crate::applicable_declarations::ApplicableDeclarationBlock;
use crate::hash::FxHashMap;
use crate::media_queries::{CacheKey, Device};
use crate::restyle_hints::{DependencySet, RestyleHint};
use crate::selector_map::{SelectorMap, SelectorMapEntry};
use crate::sink::Push;
use crate::stylesheets::{CssRule, FontFaceRule, Origin, StyleRule, Stylesheet};
use cascade_selectors::element_state::{DocumentState, ElementState};
use cascade_selectors::matching::{ElementSelectorFlags, matches_selector};
use cascade_selectors::{Combinator, DocumentContext, Element, MatchingContext, NodeMatchingContext};
use cascade_selectors::{PseudoElement, QuirksMode, Selector};
use cssparser::ToCss;
use fallible::{FailedAllocationError, FallibleHashMap, FallibleVec};
use log::{debug, trace, warn};
use servo_arc::Arc;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// This structure holds the stylesheets of a document and the cascades
/// built from them, one per set of media query and `@-moz-document`
/// outcomes seen so far.
///
/// A cascade is never edited once built: changing the stylesheets or the
/// quirks mode drops every cascade, and the next request builds a new one.
/// Holders of an older `Arc<CascadeData>` keep a consistent view.
#[derive(Debug)]
pub struct Stylist {
    /// The active stylesheets, in cascade order.
    stylesheets: Vec<Arc<Stylesheet>>,

    /// The quirks mode of the document.
    quirks_mode: QuirksMode,

    /// The cascades built so far, most recently used first.
    cascades: Vec<Arc<CascadeData>>,

    /// The number of times a cascade has been built.
    num_rebuilds: usize,
}

impl Stylist {
    /// Construct a new `Stylist` with no stylesheets.
    #[inline]
    pub fn new(quirks_mode: QuirksMode) -> Self {
        Stylist {
            stylesheets: vec![],
            quirks_mode,
            cascades: vec![],
            num_rebuilds: 0,
        }
    }

    /// Returns the number of times a cascade has been built.
    pub fn num_rebuilds(&self) -> usize {
        self.num_rebuilds
    }

    /// The active stylesheets.
    pub fn stylesheets(&self) -> &[Arc<Stylesheet>] {
        &self.stylesheets
    }

    /// The quirks mode cascades are built for.
    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// Replaces the active stylesheets.
    pub fn set_stylesheets(&mut self, stylesheets: Vec<Arc<Stylesheet>>) {
        self.stylesheets = stylesheets;
        self.clear_cascades();
    }

    /// Sets the quirks mode of the document.
    pub fn set_quirks_mode(&mut self, quirks_mode: QuirksMode) {
        if self.quirks_mode == quirks_mode {
            return;
        }
        self.quirks_mode = quirks_mode;
        self.clear_cascades();
    }

    /// Drops every cached cascade.
    pub fn clear_cascades(&mut self) {
        if !self.cascades.is_empty() {
            debug!("Dropping {} cascades", self.cascades.len());
        }
        self.cascades.clear();
    }

    /// The cascade most recently handed out, if any.
    pub fn current_cascade(&self) -> Option<&Arc<CascadeData>> {
        self.cascades.first()
    }

    /// Returns the cascade for `device`, reusing a cached one whose media
    /// query and document condition outcomes all still hold, and building
    /// one otherwise.
    pub fn cascade_for(&mut self, device: &Device) -> Arc<CascadeData> {
        let quirks_mode = self.quirks_mode;
        if let Some(index) = self
            .cascades
            .iter()
            .position(|cascade| cascade.cache_key.matches(device, quirks_mode))
        {
            let cascade = self.cascades.remove(index);
            self.cascades.insert(0, cascade.clone());
            return cascade;
        }

        self.num_rebuilds += 1;
        debug!(
            "Building cascade #{} for {:?} ({} sheets)",
            self.num_rebuilds,
            device.media_type,
            self.stylesheets.len()
        );
        let cascade = Arc::new(CascadeData::new(&self.stylesheets, device, quirks_mode));
        self.cascades.insert(0, cascade.clone());
        cascade
    }

    /// Brings the current cascade up to date with `device`, returning
    /// whether it changed. Nothing changes when no cascade was requested
    /// yet.
    pub fn medium_features_changed(&mut self, device: &Device) -> bool {
        let Some(old) = self.cascades.first().cloned() else {
            return false;
        };
        let new = self.cascade_for(device);
        !Arc::ptr_eq(&old, &new)
    }
}

/// The rule maps and dependency data built from a set of stylesheets for
/// one medium.
#[derive(Debug)]
pub struct CascadeData {
    /// The outcomes this cascade depends on.
    cache_key: CacheKey,

    /// The quirks mode the maps were keyed for.
    quirks_mode: QuirksMode,

    /// The selector maps corresponding to a given pseudo-element
    /// (non-eager), and the ones for the element itself.
    element_map: SelectorMap<Rule>,
    pseudos_map: FxHashMap<PseudoElement, SelectorMap<Rule>>,

    /// Rules for anonymous boxes, by box tag, in cascade order.
    anon_box_rules: FxHashMap<Atom, SmallVec<[Rule; 1]>>,

    /// Selector dependencies used to compute restyle hints.
    dependencies: DependencySet,

    /// The `@font-face` rules that apply, in cascade order, with the origin
    /// of the sheet they came from.
    font_faces: Vec<(Arc<FontFaceRule>, Origin)>,

    /// A monotonically increasing counter to represent the order on which a
    /// style rule appears in a stylesheet, needed to sort them by source
    /// order.
    rules_source_order: u32,

    /// The total number of selectors.
    num_selectors: usize,

    /// The total number of declarations.
    num_declarations: usize,
}

impl CascadeData {
    /// Builds the cascade for `stylesheets` as they apply to `device`.
    ///
    /// Selectors are numbered by ascending specificity first and by their
    /// position in the sheets second, so that source order alone sorts
    /// the matched rules in cascade order. A rule that can't be indexed is
    /// dropped with a warning and the build goes on.
    pub fn new(stylesheets: &[Arc<Stylesheet>], device: &Device, quirks_mode: QuirksMode) -> Self {
        let mut cache_key = CacheKey::new(device, quirks_mode);
        let mut rules_by_specificity: BTreeMap<u32, Vec<(Arc<StyleRule>, Arc<Selector>)>> =
            BTreeMap::new();
        let mut font_faces = vec![];
        let mut num_declarations = 0;

        for stylesheet in stylesheets {
            if !stylesheet.is_effective_for_device(device, &mut cache_key) {
                debug!("Skipping {:?} stylesheet", stylesheet.origin);
                continue;
            }
            let origin = stylesheet.origin;
            stylesheet.effective_rules(device, &mut cache_key, &mut |rule| match *rule {
                CssRule::Style(ref style_rule) => {
                    num_declarations += style_rule.block.len();
                    for complex in style_rule.selectors.iter() {
                        let result = rules_by_specificity
                            .entry(complex.specificity)
                            .or_default()
                            .try_push((style_rule.clone(), complex.selector.clone()));
                        if let Err(error) = result {
                            warn!("Dropping selector {}: {}", complex.selector.to_css_string(), error);
                        }
                    }
                },
                CssRule::FontFace(ref font_face) => {
                    if let Err(error) = font_faces.try_push((font_face.clone(), origin)) {
                        warn!("Dropping @font-face {}: {}", font_face.family, error);
                    }
                },
                _ => {},
            });
        }

        let mut cascade = CascadeData {
            cache_key,
            quirks_mode,
            element_map: SelectorMap::new(),
            pseudos_map: FxHashMap::default(),
            anon_box_rules: FxHashMap::default(),
            dependencies: DependencySet::new(),
            font_faces,
            rules_source_order: 0,
            num_selectors: 0,
            num_declarations,
        };

        for (specificity, rules) in rules_by_specificity {
            for (style_rule, selector) in rules {
                cascade.add_rule(style_rule, selector, specificity);
            }
        }

        debug!(
            "Built cascade: {} selectors, {} declarations, {} dependencies",
            cascade.num_selectors,
            cascade.num_declarations,
            cascade.dependencies.len()
        );
        cascade
    }

    fn add_rule(&mut self, style_rule: Arc<StyleRule>, selector: Arc<Selector>, specificity: u32) {
        self.num_selectors += 1;
        let source_order = self.rules_source_order;
        self.rules_source_order += 1;
        if let Err(error) = self.try_add_rule(style_rule, &selector, source_order, specificity) {
            warn!("Dropping selector {}: {}", selector.to_css_string(), error);
        }
    }

    fn try_add_rule(
        &mut self,
        style_rule: Arc<StyleRule>,
        selector: &Arc<Selector>,
        source_order: u32,
        specificity: u32,
    ) -> Result<(), FailedAllocationError> {
        let quirks_mode = self.quirks_mode;
        let indexed = match selector.pseudo_element {
            None => {
                let rule = Rule::new(selector.clone(), style_rule, source_order, specificity);
                self.element_map.insert(rule, quirks_mode)?;
                selector.clone()
            },
            Some(PseudoElement::AnonBox(ref tag)) => {
                let rule = Rule::new(selector.clone(), style_rule, source_order, specificity);
                return self
                    .anon_box_rules
                    .try_entry(tag.clone())?
                    .or_insert_with(SmallVec::new)
                    .try_push(rule);
            },
            Some(ref pseudo) => {
                // Pseudo-elements hang off their originating element with
                // an implicit child combinator; index the originating
                // compound.
                let Some((Combinator::Child, ref originating)) = selector.next else {
                    warn!(
                        "Ignoring pseudo-element selector without an originating element: {}",
                        selector.to_css_string()
                    );
                    return Ok(());
                };
                let rule = Rule::new(originating.clone(), style_rule, source_order, specificity);
                self.pseudos_map
                    .try_entry(pseudo.clone())?
                    .or_insert_with(SelectorMap::new)
                    .insert(rule, quirks_mode)?;
                originating.clone()
            },
        };
        self.dependencies.note_selector(&indexed, quirks_mode)
    }

    /// The media query and document condition outcomes this cascade was
    /// built with.
    pub fn cache_key(&self) -> &CacheKey {
        &self.cache_key
    }

    /// The quirks mode this cascade was built for.
    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// Returns the number of selectors.
    pub fn num_selectors(&self) -> usize {
        self.num_selectors
    }

    /// Returns the number of declarations.
    pub fn num_declarations(&self) -> usize {
        self.num_declarations
    }

    /// Returns the number of dependencies in the DependencySet.
    pub fn num_dependencies(&self) -> usize {
        self.dependencies.len()
    }

    /// The selector map for `pseudo_element`, or for elements themselves.
    pub fn selector_map(&self, pseudo_element: Option<&PseudoElement>) -> Option<&SelectorMap<Rule>> {
        match pseudo_element {
            None => Some(&self.element_map),
            Some(pseudo) => self.pseudos_map.get(pseudo),
        }
    }

    /// Pushes the rules matching `element` (or its `pseudo_element`) to
    /// `applicable_declarations`, in cascade order.
    ///
    /// `context.relevant_link_found` is set when the element or one of its
    /// ancestors was used as the relevant link, in which case the caller
    /// matches again with [`VisitedHandlingMode::RelevantLinkVisited`] to
    /// get the rules for the visited style.
    ///
    /// [`VisitedHandlingMode::RelevantLinkVisited`]: cascade_selectors::VisitedHandlingMode::RelevantLinkVisited
    ///
    /// This corresponds to `ElementRuleCollector` in WebKit.
    pub fn push_applicable_declarations<E, V, F>(
        &self,
        element: &E,
        pseudo_element: Option<&PseudoElement>,
        context: &mut MatchingContext,
        applicable_declarations: &mut V,
        flags_setter: &mut F,
    ) where
        E: Element,
        V: Push<ApplicableDeclarationBlock>,
        F: FnMut(&E, ElementSelectorFlags),
    {
        debug_assert!(
            pseudo_element.is_none_or(|pseudo| !pseudo.is_anon_box()),
            "Anonymous boxes have no originating element"
        );
        let Some(map) = self.selector_map(pseudo_element) else {
            return;
        };

        let mut classes = SmallVec::<[Atom; 8]>::new();
        element.each_class(|class| classes.push(class.clone()));

        let quirks_mode = context.quirks_mode;
        let node_context = NodeMatchingContext::new(ElementState::empty(), element.is_link());
        map.enumerate_all_rules(
            element.namespace(),
            element.local_name(),
            element.id(),
            &classes,
            quirks_mode,
            |rule| {
                if matches_selector(&rule.selector, element, context, &node_context, flags_setter) {
                    trace!("Matched {}", rule.selector.to_css_string());
                    applicable_declarations.push(rule.to_applicable_declaration_block());
                }
            },
        );
    }

    /// Pushes the rules for the anonymous box `tag`, in cascade order.
    pub fn push_anon_box_rules<V>(&self, tag: &Atom, applicable_declarations: &mut V)
    where
        V: Push<ApplicableDeclarationBlock>,
    {
        if let Some(rules) = self.anon_box_rules.get(tag) {
            for rule in rules {
                applicable_declarations.push(rule.to_applicable_declaration_block());
            }
        }
    }

    /// What needs restyling when the element state bits in `changed` flip
    /// on `element`.
    pub fn has_state_dependent_style<E>(
        &self,
        element: &E,
        document: &DocumentContext,
        changed: ElementState,
    ) -> RestyleHint
    where
        E: Element,
    {
        self.dependencies
            .compute_state_hint(element, document, self.quirks_mode, changed)
    }

    /// What needs restyling when the attribute `attr` of `element` is about
    /// to change (`attr_has_changed` unset) or just changed (set).
    pub fn has_attribute_dependent_style<E>(
        &self,
        element: &E,
        document: &DocumentContext,
        attr: &Atom,
        attr_has_changed: bool,
    ) -> RestyleHint
    where
        E: Element,
    {
        self.dependencies.compute_attribute_hint(
            element,
            document,
            self.quirks_mode,
            attr,
            attr_has_changed,
        )
    }

    /// Whether a change of the document state bits in `changed` can affect
    /// any element.
    pub fn has_document_state_dependent_style(&self, changed: DocumentState) -> bool {
        self.dependencies.has_document_state_dependency(changed)
    }

    /// The `@font-face` rules that apply, in cascade order.
    pub fn font_face_rules(&self) -> &[(Arc<FontFaceRule>, Origin)] {
        &self.font_faces
    }

    /// Appends the `@font-face` rules that apply to `rules`, in cascade
    /// order.
    pub fn append_font_face_rules(&self, rules: &mut Vec<(Arc<FontFaceRule>, Origin)>) {
        rules.extend(self.font_faces.iter().cloned());
    }
}

/// A rule, that wraps a style rule, but represents a single selector of the
/// rule.
#[derive(Clone, Debug)]
pub struct Rule {
    /// The selector this struct represents, without any pseudo-element
    /// part.
    pub selector: Arc<Selector>,
    /// The actual style rule.
    pub style_rule: Arc<StyleRule>,
    /// The source order this style rule appears in.
    pub source_order: u32,
    /// The specificity of the rule this selector represents.
    pub specificity: u32,
}

impl SelectorMapEntry for Rule {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn source_order(&self) -> u32 {
        self.source_order
    }
}

impl Rule {
    /// Creates a new Rule.
    pub fn new(selector: Arc<Selector>, style_rule: Arc<StyleRule>, source_order: u32, specificity: u32) -> Self {
        Rule {
            selector,
            style_rule,
            source_order,
            specificity,
        }
    }

    fn to_applicable_declaration_block(&self) -> ApplicableDeclarationBlock {
        ApplicableDeclarationBlock::new(
            self.style_rule.clone(),
            self.selector.clone(),
            self.source_order,
            self.specificity,
        )
    }
}
