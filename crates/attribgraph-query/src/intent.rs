//! Question → intent classification.
//!
//! A fixed, ordered list of templates; the first one that matches wins. No
//! tokenizer, no scoring: every template is a couple of substring checks on
//! the lower-cased question, plus one regex for the "what does X target"
//! phrasing.

use regex::Regex;

use attribgraph_core::NodeKind;

use crate::countries::COUNTRY_TOKENS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Actors with two or more distinct sponsors.
    MultipleSponsors,
    /// Targets of one sponsor; `token` is the raw country text from the question.
    CountryTargets { token: String },
    /// Targets ranked by incoming victim/target weight.
    MostTargeted,
    /// Sources of the given kind ranked by outgoing weight.
    MostActive { category: NodeKind },
    Unknown,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::MultipleSponsors => "multiple_sponsors",
            Intent::CountryTargets { .. } => "country_targets",
            Intent::MostTargeted => "most_targeted",
            Intent::MostActive { .. } => "most_active",
            Intent::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    what_does_target: Regex,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self {
            what_does_target: Regex::new(r"(?i)\bwhat\s+does\s+(.+?)\s+target")
                .expect("intent template regex is valid"),
        }
    }

    pub fn classify(&self, question: &str) -> Intent {
        let lower = question.to_lowercase();

        if lower.contains("multiple") && (lower.contains("sponsor") || lower.contains("backed")) {
            return Intent::MultipleSponsors;
        }

        if lower.contains("target") {
            if let Some(token) = self.country_token(question, &lower) {
                return Intent::CountryTargets { token };
            }
        }

        if lower.contains("most targeted") {
            return Intent::MostTargeted;
        }

        if lower.contains("most active") && (lower.contains("sponsor") || lower.contains("actor")) {
            let category = if lower.contains("sponsor") {
                NodeKind::Sponsor
            } else {
                NodeKind::Actor
            };
            return Intent::MostActive { category };
        }

        Intent::Unknown
    }

    /// Captured subject of "what does X target", else the earliest known
    /// country token in the question.
    fn country_token(&self, question: &str, lower: &str) -> Option<String> {
        if let Some(caps) = self.what_does_target.captures(question) {
            let subject = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            if !subject.is_empty() {
                return Some(subject.to_string());
            }
        }
        COUNTRY_TOKENS
            .iter()
            .filter_map(|t| lower.find(t).map(|pos| (pos, *t)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, t)| t.to_string())
    }
}
