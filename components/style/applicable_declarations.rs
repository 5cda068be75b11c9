/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Applicable declarations management.

use crate::stylesheets::{DeclarationBlock, StyleRule};
use cascade_selectors::Selector;
use servo_arc::Arc;
use smallvec::SmallVec;

/// List of applicable declarations. This is a transient structure that
/// shuttles declarations between selector matching and style resolution,
/// and therefore we want to avoid heap-allocation where possible.
pub type ApplicableDeclarationList = SmallVec<[ApplicableDeclarationBlock; 16]>;

/// A rule that matched, with the selector that made it match and its place
/// in the cascade.
#[derive(Clone, Debug)]
pub struct ApplicableDeclarationBlock {
    /// The style rule that matched.
    pub rule: Arc<StyleRule>,
    /// The alternative of the rule's selector list that matched, without
    /// any pseudo-element part.
    pub selector: Arc<Selector>,
    source_order: u32,
    /// The specificity of the selector this block is represented by.
    pub specificity: u32,
}

impl ApplicableDeclarationBlock {
    /// Constructs an applicable declaration block from the given components
    #[inline]
    pub fn new(rule: Arc<StyleRule>, selector: Arc<Selector>, source_order: u32, specificity: u32) -> Self {
        ApplicableDeclarationBlock {
            rule,
            selector,
            source_order,
            specificity,
        }
    }

    /// Returns the source order of the block.
    #[inline]
    pub fn source_order(&self) -> u32 {
        self.source_order
    }

    /// The declarations to apply.
    #[inline]
    pub fn block(&self) -> &Arc<DeclarationBlock> {
        &self.rule.block
    }
}
