/// Returns the desired outcomes that appear in `text`.
///
/// Matching is case-insensitive substring containment. The result keeps the
/// order of `desired_outcomes`, not the order of appearance in the text, and
/// lists each phrase at most once per entry regardless of how often it occurs.
pub fn find_matches(text: &str, desired_outcomes: &[String]) -> Vec<String> {
    if text.is_empty() || desired_outcomes.is_empty() {
        return Vec::new();
    }

    let haystack = text.to_lowercase();
    desired_outcomes
        .iter()
        .filter(|outcome| !outcome.is_empty() && haystack.contains(&outcome.to_lowercase()))
        .cloned()
        .collect()
}
