use super::comparison::fold;

/// Case-folded containment. An empty needle matches everything, including a
/// missing haystack; otherwise a missing haystack never matches.
pub fn substring_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    match haystack {
        Some(h) => fold(h).contains(&fold(needle)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_ignores_case() {
        assert!(substring_ignore_case(Some("Sunrise Dental Care"), "dental"));
        assert!(substring_ignore_case(Some("Sunrise Dental Care"), "SUNRISE D"));
        assert!(!substring_ignore_case(Some("Sunrise Dental Care"), "ortho"));
    }

    #[test]
    fn test_empty_needle_always_matches() {
        assert!(substring_ignore_case(Some("anything"), ""));
        assert!(substring_ignore_case(None, ""));
    }

    #[test]
    fn test_missing_haystack() {
        assert!(!substring_ignore_case(None, "a"));
    }
}
