//! Stock predicates for common field rules.

use super::validation::FieldValidator;

/// Present and not only whitespace.
pub fn required() -> impl FieldValidator + 'static {
    |value: Option<&str>| value.is_some_and(|value| !value.trim().is_empty())
}

pub fn min_chars(min: usize) -> impl FieldValidator + 'static {
    move |value: Option<&str>| value.is_some_and(|value| value.chars().count() >= min)
}

/// An absent value passes; combine with [`required`] when it must not.
pub fn max_chars(max: usize) -> impl FieldValidator + 'static {
    move |value: Option<&str>| value.is_none_or(|value| value.chars().count() <= max)
}

/// For toggles, whose value is `"true"` or `"false"`.
pub fn checked() -> impl FieldValidator + 'static {
    |value: Option<&str>| value == Some("true")
}

pub fn number_in_range(min: f64, max: f64) -> impl FieldValidator + 'static {
    move |value: Option<&str>| {
        value
            .and_then(|value| value.trim().parse::<f64>().ok())
            .is_some_and(|number| number >= min && number <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_and_absent() {
        let rule = required();
        assert!(!rule.validate(None));
        assert!(!rule.validate(Some("   ")));
        assert!(rule.validate(Some("a")));
    }

    #[test]
    fn char_limits_count_characters_not_bytes() {
        assert!(min_chars(2).validate(Some("日本")));
        assert!(!min_chars(3).validate(Some("日本")));
        assert!(max_chars(2).validate(Some("日本")));
        assert!(max_chars(2).validate(None));
    }

    #[test]
    fn checked_and_ranges_read_converter_output() {
        assert!(checked().validate(Some("true")));
        assert!(!checked().validate(Some("false")));
        assert!(number_in_range(1.0, 5.0).validate(Some("3.5")));
        assert!(!number_in_range(1.0, 5.0).validate(Some("")));
        assert!(!number_in_range(1.0, 5.0).validate(Some("7")));
    }
}
