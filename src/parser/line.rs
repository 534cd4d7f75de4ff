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

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Message flow marker between the message id and the address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// `<=` message arrival
    Received,
    /// `=>` normal delivery
    Sent,
    /// `==` delivery to an additional address
    SentOther,
    /// `<>` bounce or message without sender
    BounceOrNoSender,
}

impl Direction {
    /// Map the literal log token to a direction. Only the four exact tokens are recognized.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "<=" => Some(Self::Received),
            "=>" => Some(Self::Sent),
            "==" => Some(Self::SentOther),
            "<>" => Some(Self::BounceOrNoSender),
            _ => None,
        }
    }

    pub const fn token(self) -> &'static str {
        match self {
            Self::Received => "<=",
            Self::Sent => "=>",
            Self::SentOther => "==",
            Self::BounceOrNoSender => "<>",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Sent => "sent",
            Self::SentOther => "sent-other",
            Self::BounceOrNoSender => "bounce-or-no-sender",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Values pulled out of the free-text details by the detail scanners
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    pub spam_score: Option<f64>,
    pub auth_failure: bool,
    pub frozen: bool,
    /// Address captured by the auth failure scanner, `None` when the brackets were empty
    pub source_ip: Option<String>,
}

/// One parsed mainlog line.
///
/// Records are built once by the parser and never modified afterwards,
/// so all fields are private and only exposed through accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    line_number: usize,
    timestamp: NaiveDateTime,
    message_id: String,
    direction: Direction,
    participant_address: String,
    details: String,
    spam_score: Option<f64>,
    auth_failure: bool,
    frozen: bool,
    source_ip: Option<String>,
}

impl LogRecord {
    pub(crate) fn new(
        line_number: usize,
        timestamp: NaiveDateTime,
        message_id: String,
        direction: Direction,
        participant_address: String,
        details: String,
        annotations: Annotations,
    ) -> Self {
        Self {
            line_number,
            timestamp,
            message_id,
            direction,
            participant_address,
            details,
            spam_score: annotations.spam_score,
            auth_failure: annotations.auth_failure,
            frozen: annotations.frozen,
            source_ip: annotations.source_ip,
        }
    }

    /// Original line number in the source file (1-based)
    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Sender or recipient, depending on the direction
    pub fn participant_address(&self) -> &str {
        &self.participant_address
    }

    /// Everything after the address, verbatim
    pub fn details(&self) -> &str {
        &self.details
    }

    pub const fn spam_score(&self) -> Option<f64> {
        self.spam_score
    }

    pub const fn auth_failure(&self) -> bool {
        self.auth_failure
    }

    pub const fn frozen(&self) -> bool {
        self.frozen
    }

    pub fn source_ip(&self) -> Option<&str> {
        self.source_ip.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_tokens() {
        for token in ["<=", "=>", "==", "<>"] {
            let direction = Direction::from_token(token).expect("known token");
            assert_eq!(direction.token(), token);
        }
        assert_eq!(Direction::from_token("->"), None);
        assert_eq!(Direction::from_token("<= "), None);
    }

    #[test]
    fn test_direction_labels() {
        assert_eq!(Direction::Received.label(), "received");
        assert_eq!(Direction::BounceOrNoSender.label(), "bounce-or-no-sender");
        assert_eq!(Direction::SentOther.to_string(), "==");
    }
}
