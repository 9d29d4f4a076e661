//! `SampleSet`: validated `(size, price)` observations.
//!
//! Raw records arrive as `(key, value)` pairs where the key is the size as it
//! was written in the dataset file. Ingestion:
//!
//! - parses every key according to the numeric mode
//! - applies the duplicate policy to keys that resolve to the same x
//! - orders samples by ascending x so every view is deterministic
//!
//! `xs()` and `ys()` are both derived from the single sample vector.

use std::collections::HashMap;

use crate::domain::{DuplicatePolicy, NumericMode, Sample};
use crate::error::SampleError;

/// Raw dataset records: `(key, value)` in source order.
pub type RawRecords = Vec<(String, f64)>;

/// Ordered, unique-by-x sample collection.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    /// Build a sample set from raw records.
    pub fn from_records(
        records: &[(String, f64)],
        mode: NumericMode,
        duplicates: DuplicatePolicy,
    ) -> Result<Self, SampleError> {
        if records.is_empty() {
            return Err(SampleError::Empty);
        }

        let mut samples: Vec<Sample> = Vec::with_capacity(records.len());
        let mut keys: Vec<&str> = Vec::with_capacity(records.len());
        let mut index: HashMap<u64, usize> = HashMap::with_capacity(records.len());

        for (key, value) in records {
            let x = parse_key(key, mode)?;
            let y = parse_value(*value, mode)?;

            match index.get(&x_bits(x)) {
                Some(&i) => match duplicates {
                    DuplicatePolicy::LastWins => {
                        samples[i].y = y;
                        keys[i] = key.as_str();
                    }
                    DuplicatePolicy::Fail => {
                        return Err(SampleError::DuplicateKey {
                            x,
                            first: keys[i].to_string(),
                            second: key.clone(),
                        });
                    }
                },
                None => {
                    index.insert(x_bits(x), samples.len());
                    samples.push(Sample { x, y });
                    keys.push(key.as_str());
                }
            }
        }

        samples.sort_by(|a, b| a.x.total_cmp(&b.x));
        Ok(Self { samples })
    }

    /// Build directly from samples (already numeric). Duplicates keep the last value.
    pub fn from_samples(samples: impl IntoIterator<Item = Sample>) -> Result<Self, SampleError> {
        let records: Vec<(String, f64)> = samples
            .into_iter()
            .map(|s| (s.x.to_string(), s.y))
            .collect();
        Self::from_records(&records, NumericMode::Real, DuplicatePolicy::LastWins)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn xs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.y).collect()
    }

    pub fn size(&self) -> usize {
        self.samples.len()
    }

    /// `(min x, max x)`; never fails because a set is never empty.
    pub fn x_range(&self) -> (f64, f64) {
        let first = self.samples.first().map(|s| s.x).unwrap_or(0.0);
        let last = self.samples.last().map(|s| s.x).unwrap_or(0.0);
        (first, last)
    }
}

// -0.0 and 0.0 are the same size.
fn x_bits(x: f64) -> u64 {
    if x == 0.0 { 0.0f64.to_bits() } else { x.to_bits() }
}

fn parse_key(key: &str, mode: NumericMode) -> Result<f64, SampleError> {
    let raw = key.trim();
    let parsed = match mode {
        NumericMode::Real => raw.parse::<f64>().ok().filter(|v| v.is_finite()),
        NumericMode::Integral => raw.parse::<i64>().ok().map(|v| v as f64),
    };
    parsed.ok_or_else(|| SampleError::Parse {
        what: "size",
        raw: key.to_string(),
        expected: match mode {
            NumericMode::Real => "a finite number",
            NumericMode::Integral => "an integer",
        },
    })
}

fn parse_value(value: f64, mode: NumericMode) -> Result<f64, SampleError> {
    if !value.is_finite() {
        return Err(SampleError::Parse {
            what: "price",
            raw: value.to_string(),
            expected: "a finite number",
        });
    }
    Ok(mode.apply(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recs(pairs: &[(&str, f64)]) -> RawRecords {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn orders_by_size_and_keeps_pairs_aligned() {
        let set = SampleSet::from_records(
            &recs(&[("30", 21.0), ("10", 5.0), ("20", 12.0)]),
            NumericMode::Real,
            DuplicatePolicy::LastWins,
        )
        .unwrap();
        assert_eq!(set.xs(), vec![10.0, 20.0, 30.0]);
        assert_eq!(set.ys(), vec![5.0, 12.0, 21.0]);
        assert_eq!(set.size(), 3);
        assert_eq!(set.x_range(), (10.0, 30.0));
    }

    #[test]
    fn rejects_empty_input() {
        let err = SampleSet::from_records(&[], NumericMode::Real, DuplicatePolicy::LastWins).unwrap_err();
        assert_eq!(err, SampleError::Empty);
    }

    #[test]
    fn rejects_unparsable_key() {
        let err = SampleSet::from_records(
            &recs(&[("10", 1.0), ("big", 2.0)]),
            NumericMode::Real,
            DuplicatePolicy::LastWins,
        )
        .unwrap_err();
        assert!(matches!(err, SampleError::Parse { what: "size", .. }));
    }

    #[test]
    fn rejects_non_finite_key_and_value() {
        let err = SampleSet::from_records(&recs(&[("inf", 1.0)]), NumericMode::Real, DuplicatePolicy::LastWins)
            .unwrap_err();
        assert!(matches!(err, SampleError::Parse { what: "size", .. }));

        let err = SampleSet::from_records(&recs(&[("1", f64::NAN)]), NumericMode::Real, DuplicatePolicy::LastWins)
            .unwrap_err();
        assert!(matches!(err, SampleError::Parse { what: "price", .. }));
    }

    #[test]
    fn integral_mode_requires_integer_keys_and_rounds_values() {
        let err = SampleSet::from_records(&recs(&[("10.5", 1.0)]), NumericMode::Integral, DuplicatePolicy::LastWins)
            .unwrap_err();
        assert!(matches!(err, SampleError::Parse { expected: "an integer", .. }));

        let set = SampleSet::from_records(
            &recs(&[("10", 4.6), ("20", 12.2)]),
            NumericMode::Integral,
            DuplicatePolicy::LastWins,
        )
        .unwrap();
        assert_eq!(set.ys(), vec![5.0, 12.0]);
    }

    #[test]
    fn duplicate_sizes_last_write_wins() {
        let set = SampleSet::from_records(
            &recs(&[("10", 1.0), ("20", 2.0), ("10.0", 3.0)]),
            NumericMode::Real,
            DuplicatePolicy::LastWins,
        )
        .unwrap();
        assert_eq!(set.xs(), vec![10.0, 20.0]);
        assert_eq!(set.ys(), vec![3.0, 2.0]);
    }

    #[test]
    fn duplicate_sizes_fail_when_configured() {
        let err = SampleSet::from_records(
            &recs(&[("10", 1.0), ("1e1", 3.0)]),
            NumericMode::Real,
            DuplicatePolicy::Fail,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SampleError::DuplicateKey {
                x: 10.0,
                first: "10".to_string(),
                second: "1e1".to_string()
            }
        );
    }

    #[test]
    fn negative_zero_is_a_duplicate_of_zero() {
        let set = SampleSet::from_records(
            &recs(&[("0", 1.0), ("-0", 2.0)]),
            NumericMode::Real,
            DuplicatePolicy::LastWins,
        )
        .unwrap();
        assert_eq!(set.size(), 1);
        assert_eq!(set.ys(), vec![2.0]);
    }
}
