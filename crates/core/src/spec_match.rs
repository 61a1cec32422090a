//! Specification comparison shared by upgrade-path search and urgent matching.

use crate::records::{SpecMap, SpecValue};

/// Whether `actual` satisfies `required`.
///
/// Numeric when both sides read as numbers (`actual >= required`), otherwise
/// case-insensitive equality of their textual forms.
pub fn meets_requirement(actual: &SpecValue, required: &SpecValue) -> bool {
    match (actual.as_number(), required.as_number()) {
        (Some(a), Some(r)) => a >= r,
        _ => actual.normalized_text() == required.normalized_text(),
    }
}

/// Every key in `target` is present in `specs` and meets its requirement.
pub fn meets_all(specs: &SpecMap, target: &SpecMap) -> bool {
    target.iter().all(|(key, required)| {
        specs
            .get(key)
            .is_some_and(|actual| meets_requirement(actual, required))
    })
}

/// Fraction of `required` keys that `specs` meets, in `0.0..=1.0`.
///
/// No requirements is a perfect match; an asset without any specs matches
/// nothing.
pub fn match_fraction(specs: &SpecMap, required: &SpecMap) -> f64 {
    if required.is_empty() {
        return 1.0;
    }
    if specs.is_empty() {
        return 0.0;
    }
    let met = required
        .iter()
        .filter(|(key, req)| {
            specs
                .get(key.as_str())
                .is_some_and(|actual| meets_requirement(actual, req))
        })
        .count();
    met as f64 / required.len() as f64
}
