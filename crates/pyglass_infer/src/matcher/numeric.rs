//! Numeric promotion table: bool ⊂ int ⊂ long ⊂ float ⊂ complex ⊂ number.
//!
//! Each abstract surface name admits the same concrete subset as its
//! concrete counterpart. A missing name on either side is answered
//! optimistically; an unrecognized pair degrades to name equality.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use pyglass_types::names;

static PROMOTIONS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    const TO_INT: &[&str] = &[names::BOOL];
    const TO_LONG: &[&str] = &[names::BOOL, names::INT];
    const TO_FLOAT: &[&str] = &[names::BOOL, names::INT, names::LONG];
    const TO_COMPLEX: &[&str] = &[names::BOOL, names::INT, names::LONG, names::FLOAT];
    const TO_NUMBER: &[&str] = &[
        names::BOOL,
        names::INT,
        names::LONG,
        names::FLOAT,
        names::COMPLEX,
    ];

    let mut table: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    table.insert(names::INT, TO_INT);
    table.insert(names::LONG, TO_LONG);
    table.insert(names::ABC_INTEGRAL, TO_LONG);
    table.insert(names::FLOAT, TO_FLOAT);
    table.insert(names::ABC_REAL, TO_FLOAT);
    table.insert(names::COMPLEX, TO_COMPLEX);
    table.insert(names::ABC_COMPLEX, TO_COMPLEX);
    table.insert(names::ABC_NUMBER, TO_NUMBER);
    table
});

/// Name-level promotion check used as the matcher's final fallback.
pub fn matches_numeric_names(expected: Option<&str>, actual: Option<&str>) -> bool {
    let (Some(expected), Some(actual)) = (expected, actual) else {
        return true;
    };
    if expected == actual {
        return true;
    }
    PROMOTIONS
        .get(expected)
        .is_some_and(|admitted| admitted.contains(&actual))
}
