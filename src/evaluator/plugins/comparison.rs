/// Case-folded equality. A missing operand never matches.
pub fn exact_ignore_case(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => fold(a) == fold(b),
        _ => false,
    }
}

pub(crate) fn fold(text: &str) -> String {
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_ignores_case() {
        assert!(exact_ignore_case(Some("Dental"), Some("dENTAL")));
        assert!(!exact_ignore_case(Some("Dental"), Some("Dent")));
    }

    #[test]
    fn test_exact_null_operands() {
        assert!(!exact_ignore_case(None, Some("Active")));
        assert!(!exact_ignore_case(Some("Active"), None));
        assert!(!exact_ignore_case(None, None));
    }

    #[test]
    fn test_exact_folds_unicode() {
        assert!(exact_ignore_case(Some("ÉCOLE"), Some("école")));
    }
}
