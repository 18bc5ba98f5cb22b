//! Query evaluation over a normalized graph.
//!
//! Evaluation is read-only and total: every question yields one of the five
//! [`QueryResult`] shapes, and the same question over the same graph always
//! yields the same result.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

use attribgraph_core::{NodeKind, NormalizedGraph};

use crate::aggregate::{rank_by_weight, RankedEntry};
use crate::countries::CountryTable;
use crate::intent::{Intent, IntentClassifier};

pub const COUNTRY_TARGETS_LIMIT: usize = 10;
pub const RANKING_LIMIT: usize = 15;

/// Link type marking a sponsor → actor backing relation.
pub const SPONSOR_TO_ACTOR: &str = "sponsor_to_actor";

pub const GUIDANCE_MESSAGE: &str = "I can answer questions like:\n\
    - \"Which actors have multiple state sponsors?\"\n\
    - \"What does China target most?\"\n\
    - \"What are the most targeted sectors?\"\n\
    - \"Who are the most active sponsors?\"\n\
    - \"Which actors are the most active?\"";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SponsoredActor {
    pub actor: String,
    #[serde(rename = "sponsorCount")]
    pub sponsor_count: usize,
    /// Distinct sponsors in the order their links were first seen.
    pub sponsors: Vec<String>,
    pub degree: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum QueryResult {
    MultipleSponsors {
        count: usize,
        results: Vec<SponsoredActor>,
    },
    CountryTargets {
        sponsor: String,
        results: Vec<RankedEntry>,
    },
    MostTargeted {
        results: Vec<RankedEntry>,
    },
    MostActive {
        category: NodeKind,
        results: Vec<RankedEntry>,
    },
    Unknown {
        message: String,
    },
}

impl QueryResult {
    pub fn intent_name(&self) -> &'static str {
        match self {
            QueryResult::MultipleSponsors { .. } => "multiple_sponsors",
            QueryResult::CountryTargets { .. } => "country_targets",
            QueryResult::MostTargeted { .. } => "most_targeted",
            QueryResult::MostActive { .. } => "most_active",
            QueryResult::Unknown { .. } => "unknown",
        }
    }

    /// Ranked entries for the weight-based intents; empty otherwise.
    pub fn ranked(&self) -> &[RankedEntry] {
        match self {
            QueryResult::CountryTargets { results, .. }
            | QueryResult::MostTargeted { results }
            | QueryResult::MostActive { results, .. } => results,
            QueryResult::MultipleSponsors { .. } | QueryResult::Unknown { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryEvaluator {
    classifier: IntentClassifier,
    countries: CountryTable,
}

impl QueryEvaluator {
    pub fn new(countries: CountryTable) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            countries,
        }
    }

    pub fn countries(&self) -> &CountryTable {
        &self.countries
    }

    pub fn classify(&self, question: &str) -> Intent {
        self.classifier.classify(question)
    }

    pub fn evaluate(&self, graph: &NormalizedGraph, question: &str) -> QueryResult {
        let intent = self.classify(question);
        tracing::debug!(intent = intent.name(), question, "classified question");
        match intent {
            Intent::MultipleSponsors => multiple_sponsors(graph),
            Intent::CountryTargets { token } => {
                let (sponsor, results) = self.sponsor_targets(graph, &token);
                QueryResult::CountryTargets { sponsor, results }
            }
            Intent::MostTargeted => QueryResult::MostTargeted {
                results: most_targeted(graph),
            },
            Intent::MostActive { category } => QueryResult::MostActive {
                category,
                results: most_active(graph, category),
            },
            Intent::Unknown => QueryResult::Unknown {
                message: GUIDANCE_MESSAGE.to_string(),
            },
        }
    }

    /// The captured subject may carry filler words ("China usually"). When it
    /// is neither a table key nor a matching source, retry with the first
    /// table key found inside it.
    fn sponsor_targets(&self, graph: &NormalizedGraph, token: &str) -> (String, Vec<RankedEntry>) {
        let sponsor = self.countries.resolve(token);
        let results = country_targets(graph, token, &sponsor);
        if !results.is_empty() || self.countries.contains(token) {
            return (sponsor, results);
        }
        match self.countries.find_in(token) {
            Some(key) => {
                tracing::debug!(subject = token, key, "narrowed question subject to country");
                let sponsor = self.countries.resolve(key);
                let results = country_targets(graph, key, &sponsor);
                (sponsor, results)
            }
            None => (sponsor, results),
        }
    }
}

static DEFAULT_EVALUATOR: OnceLock<QueryEvaluator> = OnceLock::new();

/// Evaluate with the built-in country table. The evaluator is built once and
/// shared across calls.
pub fn evaluate(graph: &NormalizedGraph, question: &str) -> QueryResult {
    DEFAULT_EVALUATOR
        .get_or_init(QueryEvaluator::default)
        .evaluate(graph, question)
}

// ============================================================================
// Aggregations
// ============================================================================

fn multiple_sponsors(graph: &NormalizedGraph) -> QueryResult {
    // target -> distinct sponsors, in link order
    let mut backers: HashMap<&str, Vec<&str>> = HashMap::new();
    for link in graph.links() {
        if !link.kind.to_lowercase().contains(SPONSOR_TO_ACTOR) {
            continue;
        }
        let sponsors = backers.entry(link.target.as_str()).or_default();
        if !sponsors.contains(&link.source.as_str()) {
            sponsors.push(link.source.as_str());
        }
    }

    let mut results: Vec<SponsoredActor> = graph
        .nodes()
        .iter()
        .filter(|n| n.kind == NodeKind::Actor)
        .filter_map(|n| {
            let sponsors = backers.get(n.id.as_str())?;
            (sponsors.len() >= 2).then(|| SponsoredActor {
                actor: n.id.clone(),
                sponsor_count: sponsors.len(),
                sponsors: sponsors.iter().map(|s| s.to_string()).collect(),
                degree: n.degree,
            })
        })
        .collect();
    results.sort_by(|a, b| b.sponsor_count.cmp(&a.sponsor_count));

    QueryResult::MultipleSponsors {
        count: results.len(),
        results,
    }
}

/// Targets of links whose source is the sponsor: an exact match on the
/// canonical name, or a case-insensitive substring match on either the
/// canonical name or the token as typed.
fn country_targets(graph: &NormalizedGraph, token: &str, sponsor: &str) -> Vec<RankedEntry> {
    let token_lower = token.trim().to_lowercase();
    let sponsor_lower = sponsor.to_lowercase();
    let items = graph.links().iter().filter_map(|link| {
        let source_lower = link.source.to_lowercase();
        let hit = link.source == sponsor
            || link.source == token
            || (!sponsor_lower.is_empty() && source_lower.contains(&sponsor_lower))
            || (!token_lower.is_empty() && source_lower.contains(&token_lower));
        hit.then_some((link.target.as_str(), link.weight))
    });
    rank_by_weight(items, COUNTRY_TARGETS_LIMIT)
}

fn most_targeted(graph: &NormalizedGraph) -> Vec<RankedEntry> {
    let items = graph.links().iter().filter_map(|link| {
        let kind = link.kind.to_lowercase();
        let hit = kind.contains("victim") || kind.contains("target");
        hit.then_some((link.target.as_str(), link.weight))
    });
    rank_by_weight(items, RANKING_LIMIT)
}

fn most_active(graph: &NormalizedGraph, category: NodeKind) -> Vec<RankedEntry> {
    let items = graph.links().iter().filter_map(|link| {
        let hit = graph.kind_of(&link.source) == Some(category);
        hit.then_some((link.source.as_str(), link.weight))
    });
    rank_by_weight(items, RANKING_LIMIT)
}
