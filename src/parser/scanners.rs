// eximscope - GPL-3.0-or-later
// This file is part of eximscope.
//
// Copyright (C) 2025 Daniel Freiermuth
//
// eximscope is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// eximscope is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with eximscope.  If not, see <https://www.gnu.org/licenses/>.

//! Independent scanners that pull optional annotations out of the details text.
//!
//! A line can carry any combination of annotations, so every scanner runs on
//! every record and only touches its own fields.

use super::line::Annotations;
use fancy_regex::Regex;
use std::sync::LazyLock;

// Any spam filter token (SpamAssassin, X-Spam-Score, spamd, ...) followed by a score.
// Greedy, so the last score on the line wins.
static SPAM_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\S*spam\S*.*score=(-?\d+(?:\.\d+)?)").expect("valid regex literal")
});

// The port suffix after the bracket is optional, older Exim builds omit it
static AUTH_FAILURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"dovecot_login authenticator failed for .* \[([^\]]*)\](?::\d+)?: 535 Incorrect authentication data",
    )
    .expect("valid regex literal")
});

const FROZEN_MARKER: &str = "Message is frozen";

/// A single annotation extractor applied to the details of a parsed line
pub trait DetailScanner: Sync {
    fn scan(&self, details: &str, annotations: &mut Annotations);
}

pub struct SpamScoreScanner;

impl DetailScanner for SpamScoreScanner {
    fn scan(&self, details: &str, annotations: &mut Annotations) {
        if let Ok(Some(caps)) = SPAM_SCORE.captures(details) {
            annotations.spam_score = caps[1].parse::<f64>().ok();
        }
    }
}

pub struct AuthFailureScanner;

impl DetailScanner for AuthFailureScanner {
    fn scan(&self, details: &str, annotations: &mut Annotations) {
        if let Ok(Some(caps)) = AUTH_FAILURE.captures(details) {
            annotations.auth_failure = true;
            annotations.source_ip = caps
                .get(1)
                .map(|m| m.as_str().trim())
                .filter(|ip| !ip.is_empty())
                .map(str::to_string);
        }
    }
}

pub struct FrozenScanner;

impl DetailScanner for FrozenScanner {
    fn scan(&self, details: &str, annotations: &mut Annotations) {
        if details.contains(FROZEN_MARKER) {
            annotations.frozen = true;
        }
    }
}

/// Scanners applied to every parsed line, in this order
pub static DEFAULT_SCANNERS: &[&dyn DetailScanner] =
    &[&SpamScoreScanner, &AuthFailureScanner, &FrozenScanner];

/// Run all scanners over `details` and collect their annotations
pub fn annotate(details: &str, scanners: &[&dyn DetailScanner]) -> Annotations {
    let mut annotations = Annotations::default();
    for scanner in scanners {
        scanner.scan(details, &mut annotations);
    }
    annotations
}
