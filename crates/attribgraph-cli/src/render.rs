//! Human-readable rendering of query results and graph summaries.

use colored::Colorize;
use std::fmt::Write as _;

use attribgraph_core::{NormalizeReport, NormalizedGraph};
use attribgraph_query::{QueryResult, RankedEntry};

/// Whole weights print without a fractional part.
pub fn format_count(count: f64) -> String {
    if count.fract() == 0.0 && count.abs() < 1e15 {
        format!("{}", count as i64)
    } else {
        format!("{count:.2}")
    }
}

pub fn query_text(result: &QueryResult) -> String {
    let mut out = String::new();
    match result {
        QueryResult::MultipleSponsors { count, results } => {
            let _ = writeln!(
                out,
                "{} {count} actor(s) with multiple sponsors",
                "multiple_sponsors".cyan().bold()
            );
            for (i, r) in results.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:>3}. {}  sponsors={} degree={}  [{}]",
                    i + 1,
                    r.actor.bold(),
                    r.sponsor_count,
                    r.degree,
                    r.sponsors.join(", ")
                );
            }
        }
        QueryResult::CountryTargets { sponsor, results } => {
            let _ = writeln!(
                out,
                "{} top targets of {}",
                "country_targets".cyan().bold(),
                sponsor.bold()
            );
            ranked_lines(&mut out, results);
        }
        QueryResult::MostTargeted { results } => {
            let _ = writeln!(out, "{} by incoming weight", "most_targeted".cyan().bold());
            ranked_lines(&mut out, results);
        }
        QueryResult::MostActive { category, results } => {
            let _ = writeln!(
                out,
                "{} {category}s by outgoing weight",
                "most_active".cyan().bold()
            );
            ranked_lines(&mut out, results);
        }
        QueryResult::Unknown { message } => {
            let _ = writeln!(out, "{}", "unknown question".yellow().bold());
            let _ = writeln!(out, "{message}");
        }
    }
    out
}

fn ranked_lines(out: &mut String, results: &[RankedEntry]) {
    if results.is_empty() {
        let _ = writeln!(out, "  (no matches)");
        return;
    }
    for (i, entry) in results.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}  {}", i + 1, entry.name, format_count(entry.count));
    }
}

pub fn summary_text(graph: &NormalizedGraph, report: &NormalizeReport, top: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "graph".green().bold(), report.summary_line());
    for (kind, count) in graph.kind_counts() {
        let _ = writeln!(out, "  {kind:<8} {count}");
    }
    if !report.split.is_empty() {
        let _ = writeln!(out, "{} {}", "split".green().bold(), report.split.join(", "));
    }
    if top > 0 {
        let _ = writeln!(out, "{} top {top} by degree", "degree".green().bold());
        for node in graph.top_by_degree(top) {
            let _ = writeln!(out, "  {:<40} {:<8} {}", node.id, node.kind, node.degree);
        }
    }
    out
}
