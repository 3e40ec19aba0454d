//! Contribution ledger and its durable text codec.
//!
//! The ledger is persisted as a single JSON object column, e.g.
//! `{"0xAAA":500.0,"0xBBB":500.0}`. Anything reading that column must go
//! through [`decode`]; anything writing it must go through [`encode`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("malformed ledger JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("contribution from {address} is not a finite number")]
    NonFiniteAmount { address: String },
}

/// Mapping from contributor address to amount contributed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contributions(HashMap<String, f64>);

impl Contributions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a contribution, replacing any previous amount for `address`.
    pub fn insert(&mut self, address: impl Into<String>, amount: f64) -> Option<f64> {
        self.0.insert(address.into(), amount)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of every recorded contribution.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Contributions {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Encode a ledger into its column representation.
///
/// JSON has no spelling for NaN or infinity, so those amounts are refused
/// here instead of being written as `null` and failing on the next read.
pub fn encode(contributions: &Contributions) -> Result<String, LedgerError> {
    if let Some((address, _)) = contributions.iter().find(|(_, v)| !v.is_finite()) {
        return Err(LedgerError::NonFiniteAmount {
            address: address.to_string(),
        });
    }
    Ok(serde_json::to_string(contributions)?)
}

/// Decode a ledger column back into [`Contributions`].
pub fn decode(raw: &str) -> Result<Contributions, LedgerError> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn empty_ledger_round_trips() {
        let ledger = Contributions::new();
        let raw = encode(&ledger).unwrap();
        assert_eq!(raw, "{}");
        assert_eq!(decode(&raw).unwrap(), ledger);
    }

    #[test]
    fn single_entry_round_trips() {
        let ledger: Contributions = [("0xAAA", 12.5)].into_iter().collect();
        let decoded = decode(&encode(&ledger).unwrap()).unwrap();
        assert_eq!(decoded, ledger);
        assert_eq!(decoded.iter().collect::<Vec<_>>(), [("0xAAA", 12.5)]);
    }

    #[test]
    fn many_entries_round_trip_regardless_of_order() {
        let ledger: Contributions = (0..50)
            .map(|i| (format!("0x{i:040x}"), i as f64 * 1.25))
            .collect();
        let decoded = decode(&encode(&ledger).unwrap()).unwrap();
        assert_eq!(decoded.len(), 50);
        assert_eq!(decoded, ledger);
    }

    #[test]
    fn fractional_amounts_round_trip_bit_for_bit() {
        let mut rng = StdRng::seed_from_u64(0x6772_616e_7473);
        let ledger: Contributions = (0..20_000)
            .map(|i| (format!("0x{i:08x}"), rng.gen_range(0.0..1e6)))
            .collect();

        let decoded = decode(&encode(&ledger).unwrap()).unwrap();
        let mismatches: Vec<_> = ledger
            .iter()
            .filter(|(address, amount)| {
                decoded
                    .iter()
                    .find(|(a, _)| a == address)
                    .map(|(_, v)| v.to_bits())
                    != Some(amount.to_bits())
            })
            .collect();
        assert!(
            mismatches.is_empty(),
            "{} amounts drifted, e.g. {:?}",
            mismatches.len(),
            &mismatches[..mismatches.len().min(5)]
        );
    }

    #[test]
    fn awkward_amounts_round_trip_bit_for_bit() {
        let amounts = [
            912221.7316509271,
            0.1,
            0.1 + 0.2,
            1e-300,
            f64::MIN_POSITIVE,
            f64::MAX,
            -123.456789012345,
            5e-324,
        ];
        let ledger: Contributions = amounts
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("0x{i}"), *v))
            .collect();
        let decoded = decode(&encode(&ledger).unwrap()).unwrap();
        for (address, amount) in ledger.iter() {
            let (_, back) = decoded.iter().find(|(a, _)| *a == address).unwrap();
            assert_eq!(back.to_bits(), amount.to_bits(), "{address}: {amount} -> {back}");
        }
    }

    #[test]
    fn decodes_integer_amounts_written_by_other_clients() {
        let decoded = decode(r#"{"0x123":500,"0x456":500}"#).unwrap();
        let expected: Contributions = [("0x123", 500.0), ("0x456", 500.0)].into_iter().collect();
        assert_eq!(decoded, expected);
        assert_eq!(decoded.total(), 1000.0);
    }

    #[test]
    fn non_finite_amount_fails_to_encode() {
        let ledger: Contributions = [("0xBAD", f64::NAN)].into_iter().collect();
        match encode(&ledger) {
            Err(LedgerError::NonFiniteAmount { address }) => assert_eq!(address, "0xBAD"),
            other => panic!("expected NonFiniteAmount, got {other:?}"),
        }
        let ledger: Contributions = [("0xINF", f64::INFINITY)].into_iter().collect();
        assert!(encode(&ledger).is_err());
    }

    #[test]
    fn corrupt_text_fails_to_decode() {
        for raw in ["", "not json", "[1,2]", r#"{"0x1":"ten"}"#, "null", r#"{"0x1":5"#] {
            assert!(
                matches!(decode(raw), Err(LedgerError::Json(_))),
                "{raw:?} should not decode"
            );
        }
    }
}
