/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Boolean and integer preferences, owned by whoever embeds the cascade.
//!
//! There is no process-wide instance: each embedder builds a
//! [`Preferences`] and hands the values the cascade needs to it.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use log::{debug, warn};
use serde::Deserialize;

/// Whether `:visited` may match at all. On by default.
pub const VISITED_LINKS_ENABLED: &str = "layout.css.visited_links_enabled";

/// Errors loading preferences.
#[derive(Debug)]
pub enum PrefError {
    /// The input wasn't a JSON object of preferences.
    Parse(serde_json::Error),
    /// A preference had a value that is neither a boolean nor a 32-bit
    /// integer.
    UnsupportedValue(String),
}

impl fmt::Display for PrefError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PrefError::Parse(ref error) => write!(f, "malformed preferences: {}", error),
            PrefError::UnsupportedValue(ref key) => {
                write!(f, "preference {:?} is neither a boolean nor an integer", key)
            },
        }
    }
}

impl Error for PrefError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            PrefError::Parse(ref error) => Some(error),
            PrefError::UnsupportedValue(..) => None,
        }
    }
}

impl From<serde_json::Error> for PrefError {
    fn from(error: serde_json::Error) -> Self {
        PrefError::Parse(error)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PrefValue {
    Bool(bool),
    Int(i64),
    Other(serde_json::Value),
}

#[derive(Debug)]
pub struct Preferences {
    bool_prefs: RwLock<HashMap<String, bool>>,
    i32_prefs: RwLock<HashMap<String, i32>>,
}

impl Default for Preferences {
    fn default() -> Self {
        let prefs = Preferences {
            bool_prefs: RwLock::new(HashMap::new()),
            i32_prefs: RwLock::new(HashMap::new()),
        };
        prefs.set_bool(VISITED_LINKS_ENABLED, true);
        prefs
    }
}

impl Preferences {
    /// Builds preferences from a JSON object mapping names to booleans or
    /// integers, on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, PrefError> {
        let values: HashMap<String, PrefValue> = serde_json::from_str(json)?;
        let prefs = Preferences::default();
        for (key, value) in values {
            match value {
                PrefValue::Bool(value) => prefs.set_bool(&key, value),
                PrefValue::Int(value) => match i32::try_from(value) {
                    Ok(value) => prefs.set_i32(&key, value),
                    Err(..) => {
                        warn!("Preference {} is out of range: {}", key, value);
                        return Err(PrefError::UnsupportedValue(key));
                    },
                },
                PrefValue::Other(value) => {
                    warn!("Preference {} has an unsupported value: {}", key, value);
                    return Err(PrefError::UnsupportedValue(key));
                },
            }
        }
        debug!("Loaded preferences: {:?}", prefs);
        Ok(prefs)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        let prefs = self.bool_prefs.read().unwrap_or_else(PoisonError::into_inner);
        *prefs.get(key).unwrap_or(&false)
    }

    pub fn get_i32(&self, key: &str) -> i32 {
        let prefs = self.i32_prefs.read().unwrap_or_else(PoisonError::into_inner);
        *prefs.get(key).unwrap_or(&0)
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        let mut prefs = self.bool_prefs.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(pref) = prefs.get_mut(key) {
            *pref = value;
        } else {
            prefs.insert(key.to_owned(), value);
        }
    }

    pub fn set_i32(&self, key: &str, value: i32) {
        let mut prefs = self.i32_prefs.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(pref) = prefs.get_mut(key) {
            *pref = value;
        } else {
            prefs.insert(key.to_owned(), value);
        }
    }

    #[inline]
    pub fn visited_links_enabled(&self) -> bool {
        self.get_bool(VISITED_LINKS_ENABLED)
    }
}
