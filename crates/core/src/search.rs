//! Admin table search.

/// Case-insensitive substring search over several fields.
///
/// A blank query matches everything.
#[must_use]
pub fn matches_query(query: &str, fields: &[&str]) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_matches_all() {
        assert!(matches_query("  ", &["anything"]));
        assert!(matches_query("", &[]));
    }

    #[test]
    fn test_matches_any_field_ignoring_case() {
        let fields = ["2020 Prevost H3-45", "Nashville, TN"];
        assert!(matches_query("prevost", &fields));
        assert!(matches_query("NASH", &fields));
        assert!(!matches_query("marathon", &fields));
    }
}
