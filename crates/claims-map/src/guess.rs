//! Coarse type guessing over a column sample.

use claims_model::ValueType;

use crate::patterns::{
    DIAGNOSIS_CODE_REGEX, LOOSE_DATE_REGEX, POSTAL_CODE_REGEX, PROCEDURE_CODE_REGEX,
    PROVIDER_ID_REGEX,
};

/// Classifies a single value. Values that are empty after trimming are not
/// classified.
pub fn classify_value(value: &str) -> Option<ValueType> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    // Rule order matters: a bare five-digit value is claimed by the postal
    // rule before the procedure-code rule is consulted.
    let kind = if POSTAL_CODE_REGEX.is_match(value)
        || PROVIDER_ID_REGEX.is_match(value)
        || PROCEDURE_CODE_REGEX.is_match(value)
    {
        ValueType::Numeric
    } else if DIAGNOSIS_CODE_REGEX.is_match(value) {
        ValueType::Text
    } else if LOOSE_DATE_REGEX.is_match(value) {
        ValueType::Date
    } else {
        ValueType::Text
    };
    Some(kind)
}

/// Majority vote over the classified samples.
///
/// Ties go to the type declared first (numeric, then text, then date). A
/// sample with nothing to classify is text.
pub fn guess_type<S: AsRef<str>>(samples: &[S]) -> ValueType {
    let mut counts = [0usize; 3];
    for sample in samples {
        if let Some(kind) = classify_value(sample.as_ref()) {
            counts[slot(kind)] += 1;
        }
    }

    if counts.iter().all(|&count| count == 0) {
        return ValueType::Text;
    }

    let mut best = ValueType::ALL[0];
    for kind in ValueType::ALL {
        if counts[slot(kind)] > counts[slot(best)] {
            best = kind;
        }
    }
    best
}

fn slot(kind: ValueType) -> usize {
    match kind {
        ValueType::Numeric => 0,
        ValueType::Text => 1,
        ValueType::Date => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_single_values() {
        assert_eq!(classify_value("30301"), Some(ValueType::Numeric));
        assert_eq!(classify_value("30301-1234"), Some(ValueType::Numeric));
        assert_eq!(classify_value("1234567890"), Some(ValueType::Numeric));
        assert_eq!(classify_value("E11.9"), Some(ValueType::Text));
        assert_eq!(classify_value("01/15/2024"), Some(ValueType::Date));
        assert_eq!(classify_value("1-5-24"), Some(ValueType::Date));
        assert_eq!(classify_value("2024-01-15"), Some(ValueType::Text));
        assert_eq!(classify_value("123.45"), Some(ValueType::Text));
        assert_eq!(classify_value("   "), None);
    }

    #[test]
    fn majority_wins() {
        let samples = ["1234567890", "1234567891", "John", "01/02/2020"];
        assert_eq!(guess_type(&samples), ValueType::Numeric);
    }

    #[test]
    fn numeric_wins_tie_with_text() {
        let samples = ["30301", "Mary"];
        assert_eq!(guess_type(&samples), ValueType::Numeric);
    }

    #[test]
    fn text_wins_tie_with_date() {
        let samples = ["01/02/2020", "Mary"];
        assert_eq!(guess_type(&samples), ValueType::Text);
    }

    #[test]
    fn date_majority() {
        let samples = ["01/02/2020", "1/3/20", "Mary"];
        assert_eq!(guess_type(&samples), ValueType::Date);
    }

    #[test]
    fn empty_sample_is_text() {
        assert_eq!(guess_type::<&str>(&[]), ValueType::Text);
        assert_eq!(guess_type(&["", "  "]), ValueType::Text);
    }
}
