use crate::core::Value;
use std::cmp::Ordering;

/// Inclusive range check with optional bounds.
///
/// A missing value passes only when both bounds are unset. A value whose type
/// cannot be ordered against a bound fails that bound.
pub fn range_inclusive(value: Option<&Value>, min: Option<&Value>, max: Option<&Value>) -> bool {
    let Some(value) = value else {
        return min.is_none() && max.is_none();
    };

    let ge_min = min.is_none_or(|low| {
        matches!(value.compare(low), Ok(Ordering::Greater | Ordering::Equal))
    });
    let le_max = max.is_none_or(|high| {
        matches!(value.compare(high), Ok(Ordering::Less | Ordering::Equal))
    });

    ge_min && le_max
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_bounds_are_inclusive() {
        let v = Value::Integer(10);
        assert!(range_inclusive(Some(&v), Some(&Value::Integer(10)), Some(&Value::Integer(10))));
        assert!(range_inclusive(Some(&v), Some(&Value::Float(9.5)), None));
        assert!(!range_inclusive(Some(&v), None, Some(&Value::Integer(9))));
    }

    #[test]
    fn test_missing_value() {
        assert!(range_inclusive(None, None, None));
        assert!(!range_inclusive(None, Some(&Value::Integer(1)), None));
        assert!(!range_inclusive(None, None, Some(&Value::Integer(1))));
    }

    #[test]
    fn test_dates_against_text_bounds() {
        let dob = Value::Date(NaiveDate::from_ymd_opt(1985, 3, 14).unwrap());
        assert!(range_inclusive(
            Some(&dob),
            Some(&Value::from("1980-01-01")),
            Some(&Value::from("1989-12-31"))
        ));
        let text_dob = Value::from("1985-03-14");
        assert!(range_inclusive(
            Some(&text_dob),
            Some(&Value::Date(NaiveDate::from_ymd_opt(1985, 3, 14).unwrap())),
            None
        ));
    }

    #[test]
    fn test_incomparable_types_fail() {
        let v = Value::from("tall");
        assert!(!range_inclusive(Some(&v), Some(&Value::Integer(1)), None));
    }
}
