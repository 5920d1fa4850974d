//! Company naming convention in work-item titles.
//!
//! Minutes are titled `[COMPANY] Subject` or `[ATA][COMPANY] Subject`. Tokens
//! that name a work-item type rather than a company are ignored.

use std::collections::BTreeSet;

use crate::WorkItem;

/// Bracketed tokens that are never a company.
pub const EXCLUDED_TERMS: &[&str] = &["ATA", "TASK", "BUG", "FEATURE", "USER STORY"];

/// Returns true if `token` is one of [`EXCLUDED_TERMS`], ignoring case.
pub fn is_excluded(token: &str) -> bool {
    let upper = token.trim().to_uppercase();
    EXCLUDED_TERMS.contains(&upper.as_str())
}

/// Extracts the company code from a title.
///
/// `[ATA][X]` yields `X`; otherwise a leading `[X]` yields `X` unless it is
/// an excluded term.
pub fn extract_company_from_title(title: &str) -> Option<String> {
    let tokens = leading_tokens(title.trim());
    let mut tokens = tokens.into_iter().filter(|t| !t.is_empty());
    let first = tokens.next()?;

    if first.eq_ignore_ascii_case("ATA") {
        return tokens
            .next()
            .filter(|second| !is_excluded(second))
            .map(str::to_string);
    }

    (!is_excluded(first)).then(|| first.to_string())
}

/// Case-insensitive company comparison used by list filters.
pub fn matches_company(item_company: Option<&str>, filter: &str) -> bool {
    item_company.is_some_and(|c| c.trim().eq_ignore_ascii_case(filter.trim()))
}

/// Keeps only items whose derived company matches `filter`. A blank filter
/// keeps everything.
pub fn filter_by_company(items: Vec<WorkItem>, filter: Option<&str>) -> Vec<WorkItem> {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(f) => items
            .into_iter()
            .filter(|item| matches_company(item.company.as_deref(), f))
            .collect(),
        None => items,
    }
}

/// Distinct, upper-cased, sorted companies across `items`.
///
/// Items without a derived company fall back to parsing their title.
pub fn collect_companies(items: &[WorkItem]) -> Vec<String> {
    let companies: BTreeSet<String> = items
        .iter()
        .filter_map(|item| {
            item.company
                .clone()
                .or_else(|| extract_company_from_title(item.title()))
        })
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty() && !is_excluded(c))
        .collect();

    companies.into_iter().collect()
}

/// Splits `[A][B] rest` into `["A", "B"]`, stopping at the first character
/// that does not open a bracket.
fn leading_tokens(title: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = title;

    while let Some(inner) = rest.strip_prefix('[') {
        let Some(end) = inner.find(']') else {
            break;
        };
        tokens.push(inner[..end].trim());
        rest = inner[end + 1..].trim_start();
    }

    tokens
}
