//! Academic vs. non-academic affiliation heuristic.

/// Substrings that mark an affiliation as academic (matched case-insensitively)
pub const ACADEMIC_TERMS: &[&str] = &[
    "university",
    "college",
    "institute",
    "laboratory",
    "school",
    "dept",
    "department",
];

/// Returns `true` when the affiliation does NOT look academic.
///
/// Anything without an academic keyword counts as company-like, so hospitals and
/// government agencies land here too.
pub fn is_company_affiliation(affiliation: &str) -> bool {
    let lower = affiliation.to_lowercase();
    !ACADEMIC_TERMS.iter().any(|term| lower.contains(term))
}

/// Text before the first comma (the whole string if there is none)
pub fn organization_name(affiliation: &str) -> &str {
    affiliation.split(',').next().unwrap_or(affiliation)
}
