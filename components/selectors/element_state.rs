/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! States elements can be in.

use bitflags::bitflags;

bitflags! {
    /// Event-based element states.
    ///
    /// NB: The bit values are private to the matcher, callers should only
    /// ever combine the named constants.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct ElementState: u32 {
        /// <https://html.spec.whatwg.org/multipage/#selector-active>
        const ACTIVE = 1 << 0;
        /// <https://html.spec.whatwg.org/multipage/#selector-focus>
        const FOCUS = 1 << 1;
        /// <https://html.spec.whatwg.org/multipage/#selector-hover>
        const HOVER = 1 << 2;
        /// <https://html.spec.whatwg.org/multipage/#selector-enabled>
        const ENABLED = 1 << 3;
        /// <https://html.spec.whatwg.org/multipage/#selector-disabled>
        const DISABLED = 1 << 4;
        /// <https://html.spec.whatwg.org/multipage/#selector-checked>
        const CHECKED = 1 << 5;
        /// <https://html.spec.whatwg.org/multipage/#selector-indeterminate>
        const INDETERMINATE = 1 << 6;
        /// <https://html.spec.whatwg.org/multipage/#selector-target>
        const TARGET = 1 << 7;
        /// <https://html.spec.whatwg.org/multipage/#selector-visited>
        const VISITED = 1 << 8;
        /// <https://html.spec.whatwg.org/multipage/#selector-link>
        const UNVISITED = 1 << 9;
        /// <https://html.spec.whatwg.org/multipage/#selector-required>
        const REQUIRED = 1 << 10;
        /// <https://html.spec.whatwg.org/multipage/#selector-optional>
        const OPTIONAL = 1 << 11;
        /// <https://html.spec.whatwg.org/multipage/#selector-valid>
        const VALID = 1 << 12;
        /// <https://html.spec.whatwg.org/multipage/#selector-invalid>
        const INVALID = 1 << 13;
        /// <https://html.spec.whatwg.org/multipage/#selector-in-range>
        const INRANGE = 1 << 14;
        /// <https://html.spec.whatwg.org/multipage/#selector-out-of-range>
        const OUTOFRANGE = 1 << 15;
        /// <https://html.spec.whatwg.org/multipage/#selector-read-only>
        const READONLY = 1 << 16;
        /// <https://html.spec.whatwg.org/multipage/#selector-read-write>
        const READWRITE = 1 << 17;
        /// <https://html.spec.whatwg.org/multipage/#selector-default>
        const DEFAULT = 1 << 18;
        /// Non-standard: an input showing its placeholder text.
        const PLACEHOLDER_SHOWN = 1 << 19;
        /// Non-standard: focus that should draw a focus ring.
        const FOCUSRING = 1 << 20;
    }
}

impl ElementState {
    /// The two bits only a link ever carries.
    pub const LINK_STATES: ElementState = ElementState::VISITED.union(ElementState::UNVISITED);
}

bitflags! {
    /// Document-wide states, shared by every element of a document.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct DocumentState: u8 {
        /// The application locale is right-to-left.
        const RTL_LOCALE = 1 << 0;
        /// The window containing the document is not the active one.
        const WINDOW_INACTIVE = 1 << 1;
    }
}
