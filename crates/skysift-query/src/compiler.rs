//! Criteria → query string compilation.
//!
//! Clauses are emitted in a fixed order and joined with single spaces:
//!
//! 1. text/language must-group `+(text_<lang>:<text> ...)`, or the
//!    existence clause `rkey:[* TO *]` when there is no text or no language
//! 2. hashtags `+tag:(...)`
//! 3. tri-states: `is:reply`, `has:label`, `has:tag`, `has:embed`, `has:error`
//! 4. excluded labels `-label:("..." ...)`
//! 5. included labels `+label:("..." ...)`
//! 6. embed kinds `+embed_type:(...)`
//!
//! The index rejects queries without a positive clause, so the first slot is
//! always filled.

use chrono::{Local, TimeZone};
use skysift_core::{SearchCriteria, TriState};

use crate::request::{CompiledRequest, PAGE_SIZE, SortKey};

/// Clause that matches every post.
pub const MATCH_ALL: &str = "rkey:[* TO *]";

/// Compiles criteria, resolving local date bounds in the process timezone.
pub fn compile(criteria: &SearchCriteria) -> CompiledRequest {
    compile_in(criteria, &Local)
}

/// Compiles criteria, resolving local date bounds in `tz`.
pub fn compile_in<Tz: TimeZone>(criteria: &SearchCriteria, tz: &Tz) -> CompiledRequest {
    let request = CompiledRequest {
        query: compile_query(criteria),
        sort: vec![SortKey::from(criteria.sort)],
        limit: PAGE_SIZE,
        debug: false,
        author_ids: distinct(&criteria.author_ids),
        before: criteria.before.map(|ts| ts.to_iso_string(tz)),
        after: criteria.after.map(|ts| ts.to_iso_string(tz)),
    };
    log::debug!("compiled query: {}", request.query);
    request
}

/// Compiles only the query string.
pub fn compile_query(criteria: &SearchCriteria) -> String {
    let mut query = QueryBuilder::default();

    let text = criteria.text.trim();
    let languages = distinct(&criteria.languages);
    if !text.is_empty() && !languages.is_empty() {
        let disjuncts: Vec<String> = languages
            .iter()
            .map(|lang| format!("text_{lang}:{text}"))
            .collect();
        query.push(format!("+({})", disjuncts.join(" ")));
    } else {
        query.push(MATCH_ALL.to_string());
    }

    query.group("+tag", &non_blank(&criteria.hashtags), false);

    let tri_states = [
        (criteria.is_reply, "is:reply"),
        (criteria.has_label, "has:label"),
        (criteria.has_tag, "has:tag"),
        (criteria.has_embed, "has:embed"),
        (criteria.has_error, "has:error"),
    ];
    for (state, field) in tri_states {
        query.tri_state(state, field);
    }

    query.group("-label", &distinct(&criteria.exclude_labels), true);
    query.group("+label", &distinct(&criteria.include_labels), true);

    let embeds: Vec<String> = criteria
        .embed_types
        .iter()
        .map(|kind| kind.as_str().to_string())
        .collect();
    query.group("+embed_type", &distinct(&embeds), false);

    query.build()
}

/// Accumulates clauses in emission order.
#[derive(Default)]
struct QueryBuilder {
    clauses: Vec<String>,
}

impl QueryBuilder {
    fn push(&mut self, clause: String) {
        self.clauses.push(clause);
    }

    /// `<prefix>:(v1 v2 ...)`, optionally quoting each value. Empty input
    /// emits nothing.
    fn group(&mut self, prefix: &str, values: &[String], quoted: bool) {
        if values.is_empty() {
            return;
        }
        let items: Vec<String> = if quoted {
            values.iter().map(|v| format!("\"{v}\"")).collect()
        } else {
            values.to_vec()
        };
        self.push(format!("{prefix}:({})", items.join(" ")));
    }

    fn tri_state(&mut self, state: TriState, field: &str) {
        if let Some(sign) = state.sign() {
            self.push(format!("{sign}{field}"));
        }
    }

    fn build(self) -> String {
        self.clauses.join(" ").trim().to_string()
    }
}

/// Trimmed, non-blank values, first occurrence wins.
fn distinct(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in non_blank(values) {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// Trimmed, non-blank values in input order.
fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
