use crate::core::models::structure::Structure;
use crate::core::topology::rings::{find_rings, fingerprint_histogram};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingComparison {
    /// Model fingerprints whose counts differ, then fingerprints only the candidate has.
    pub differences: Vec<(String, i64)>,
    /// Sum of the positive differences.
    pub missing_count: usize,
}

/// Ring fingerprint counts of `structure`, rings bounded to `max_len` atoms.
pub fn ring_counts(structure: &Structure, max_len: usize) -> BTreeMap<String, usize> {
    fingerprint_histogram(&find_rings(structure, max_len))
}

pub fn compare(
    model: &BTreeMap<String, usize>,
    candidate: &BTreeMap<String, usize>,
) -> RingComparison {
    let mut differences = Vec::new();
    for (key, &expected) in model {
        let found = candidate.get(key).copied().unwrap_or(0);
        if found != expected {
            differences.push((key.clone(), expected as i64 - found as i64));
        }
    }
    for (key, &found) in candidate {
        if !model.contains_key(key) {
            differences.push((key.clone(), -(found as i64)));
        }
    }
    let missing_count = differences
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(_, count)| *count as usize)
        .sum();
    RingComparison {
        differences,
        missing_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;
    use crate::core::models::topology::BondType;
    use crate::engine::tasks::fixtures::Fixture;

    fn counts(entries: &[(&str, usize)]) -> BTreeMap<String, usize> {
        entries.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn identical_histograms_have_no_differences() {
        let model = counts(&[("C5O", 1), ("C6", 2)]);
        let result = compare(&model, &model.clone());
        assert_eq!(result, RingComparison::default());
    }

    #[test]
    fn absent_ring_is_missing() {
        let model = counts(&[("C5O", 1)]);
        let result = compare(&model, &BTreeMap::new());
        assert_eq!(result.differences, vec![("C5O".to_string(), 1)]);
        assert_eq!(result.missing_count, 1);
    }

    #[test]
    fn extra_rings_are_negative_and_listed_last() {
        let model = counts(&[("C5O", 2), ("C6", 1)]);
        let candidate = counts(&[("C4N", 1), ("C5O", 1), ("C6", 3)]);
        let result = compare(&model, &candidate);
        assert_eq!(
            result.differences,
            vec![
                ("C5O".to_string(), 1),
                ("C6".to_string(), -2),
                ("C4N".to_string(), -1)
            ]
        );
        assert_eq!(result.missing_count, 1);
    }

    #[test]
    fn opened_ring_is_reported_missing() {
        let pyranose = |closed: bool| {
            let mut fixture = Fixture::new("PYR", "PYR")
                .atom(1, "C1", Element::C, [1.2, 0.7, 0.0])
                .atom(2, "C2", Element::C, [1.2, -0.7, 0.0])
                .atom(3, "C3", Element::C, [0.0, -1.4, 0.0])
                .atom(4, "C4", Element::C, [-1.2, -0.7, 0.0])
                .atom(5, "C5", Element::C, [-1.2, 0.7, 0.0])
                .atom(6, "O5", Element::O, [0.0, 1.4, 0.0])
                .bond(1, 2, BondType::Single)
                .bond(2, 3, BondType::Single)
                .bond(3, 4, BondType::Single)
                .bond(4, 5, BondType::Single)
                .bond(5, 6, BondType::Single);
            if closed {
                fixture = fixture.bond(6, 1, BondType::Single);
            }
            fixture.build()
        };
        let model = ring_counts(&pyranose(true), 8);
        assert_eq!(model, counts(&[("C5O", 1)]));

        let result = compare(&model, &ring_counts(&pyranose(false), 8));
        assert_eq!(result.missing_count, 1);
        assert_eq!(result.differences, vec![("C5O".to_string(), 1)]);
    }
}
