// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Rate limit keys.

use std::fmt;

/// Key under which a caller's submissions are counted.
///
/// An authenticated user id wins over a network address, so a signed-in
/// user keeps one bucket across networks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub const UNKNOWN: &'static str = "unknown";

    /// Build the identifier from whatever the request offers.
    pub fn resolve(user_id: Option<&str>, address: Option<&str>) -> Self {
        fn non_empty(s: &str) -> Option<&str> {
            let s = s.trim();
            (!s.is_empty()).then_some(s)
        }

        if let Some(uid) = user_id.and_then(non_empty) {
            return Self::user(uid);
        }
        if let Some(addr) = address.and_then(non_empty) {
            return Self::address(addr);
        }
        Self::unknown()
    }

    pub fn user(id: &str) -> Self {
        Self(format!("user_{id}"))
    }

    pub fn address(addr: &str) -> Self {
        Self(format!("ip_{addr}"))
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
