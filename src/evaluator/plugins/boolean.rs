/// Strict equality. A missing field never equals a set criterion.
pub fn bool_equals(a: Option<bool>, b: bool) -> bool {
    a == Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_equals() {
        assert!(bool_equals(Some(true), true));
        assert!(bool_equals(Some(false), false));
        assert!(!bool_equals(Some(false), true));
        assert!(!bool_equals(None, false));
    }
}
