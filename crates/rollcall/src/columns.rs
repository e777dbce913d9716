//! Fuzzy column resolution.
//!
//! Configurations name columns logically ("Employee Code"); the file
//! carries whatever the organization actually typed ("Empl  Code ",
//! "EMPLOYEE\nCODE", "Emp Id."). Resolution tolerates case, whitespace,
//! partial containment and token-level variance, in that order.

/// Minimum token-overlap ratio for a stage-3 match.
const TOKEN_OVERLAP_THRESHOLD: f64 = 0.7;

/// Resolves a logical column name against the labels actually present.
///
/// Matching order, first stage with a hit wins:
/// 1. exact match, ignoring case and whitespace runs;
/// 2. containment either direction, best length ratio wins;
/// 3. token overlap `|intersection| / max(|a|, |b|)` at or above
///    [`TOKEN_OVERLAP_THRESHOLD`], where tokens also count as equal
///    when one is a prefix of the other ("Empl" ~ "Employee").
///
/// Returns `None` when nothing clears the bar. Callers resolving a
/// required column must report that as a configuration error, not treat
/// the column as absent.
pub fn resolve_column<'a>(columns: &'a [String], logical: &str) -> Option<&'a str> {
    let target = normalize(logical);
    if target.is_empty() {
        return None;
    }

    // Stage 1: exact.
    for label in columns {
        if normalize(label) == target {
            return Some(label);
        }
    }

    // Stage 2: containment either direction.
    let mut best: Option<(&str, f64)> = None;
    for label in columns {
        let candidate = normalize(label);
        if candidate.is_empty() {
            continue;
        }
        if candidate.contains(&target) || target.contains(&candidate) {
            let ratio = candidate.len().min(target.len()) as f64
                / candidate.len().max(target.len()) as f64;
            if best.map_or(true, |(_, b)| ratio > b) {
                best = Some((label, ratio));
            }
        }
    }
    if let Some((label, _)) = best {
        return Some(label);
    }

    // Stage 3: token overlap.
    let target_tokens: Vec<&str> = target.split_whitespace().collect();
    let mut best: Option<(&str, f64)> = None;
    for label in columns {
        let candidate = normalize(label);
        let candidate_tokens: Vec<&str> = candidate.split_whitespace().collect();
        let ratio = token_overlap(&target_tokens, &candidate_tokens);
        if ratio >= TOKEN_OVERLAP_THRESHOLD && best.map_or(true, |(_, b)| ratio > b) {
            best = Some((label, ratio));
        }
    }
    best.map(|(label, _)| label)
}

fn normalize(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn token_overlap(a: &[&str], b: &[&str]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a
        .iter()
        .filter(|token| b.iter().any(|other| tokens_match(token, other)))
        .count();
    intersection as f64 / a.len().max(b.len()) as f64
}

/// Tokens match when equal or one abbreviates the other as a prefix.
fn tokens_match(a: &str, b: &str) -> bool {
    a == b || a.starts_with(b) || b.starts_with(a)
}
