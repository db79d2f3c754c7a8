use super::comparison::exact_ignore_case;
use super::like::substring_ignore_case;
use crate::core::Value;

/// True iff any text element of `list` matches `needle`.
///
/// With `exact` the elements are compared by case-folded equality, otherwise
/// by case-folded containment. A missing or empty list never matches.
/// Non-text elements are skipped.
pub fn list_contains_ignore_case<'a, I>(list: Option<I>, needle: &str, exact: bool) -> bool
where
    I: IntoIterator<Item = &'a Value>,
{
    let Some(list) = list else {
        return false;
    };

    list.into_iter().filter_map(Value::as_str).any(|item| {
        if exact {
            exact_ignore_case(Some(item), Some(needle))
        } else {
            substring_ignore_case(Some(item), needle)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> Vec<Value> {
        vec![Value::from("X-Ray"), Value::from("Root Canal"), Value::Integer(7)]
    }

    #[test]
    fn test_list_substring_match() {
        let list = services();
        assert!(list_contains_ignore_case(Some(&list), "canal", false));
        assert!(!list_contains_ignore_case(Some(&list), "canal", true));
    }

    #[test]
    fn test_list_exact_match() {
        let list = services();
        assert!(list_contains_ignore_case(Some(&list), "x-ray", true));
    }

    #[test]
    fn test_empty_and_missing_list() {
        let empty: Vec<Value> = Vec::new();
        assert!(!list_contains_ignore_case(Some(&empty), "x", false));
        assert!(!list_contains_ignore_case(None::<&Vec<Value>>, "x", false));
        assert!(!list_contains_ignore_case(None::<&Vec<Value>>, "", false));
    }

    #[test]
    fn test_non_text_elements_skipped() {
        let list = services();
        assert!(!list_contains_ignore_case(Some(&list), "7", true));
    }
}
