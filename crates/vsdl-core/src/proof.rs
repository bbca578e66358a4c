//! The delegate-visible partition proof and its local verification.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::commitment::{self, Opening};
use crate::error::{Error, Result};
use crate::group::Point;

/// One disclosed field, wire-encoded: hex point/scalar, plain-text value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningWire {
    pub name: String,
    pub value: String,
    /// Hex-encoded, fixed-width 32-byte scalar (spec §4.3: `r_encoded`).
    pub r: String,
}

impl OpeningWire {
    pub fn from_opening(o: &Opening) -> Self {
        OpeningWire { name: o.name.clone(), value: o.value.clone(), r: hex::encode(o.r.encode()) }
    }

    fn to_opening(&self) -> Result<Opening> {
        let bytes = hex::decode(&self.r).map_err(|_| Error::Malformed)?;
        let r = crate::group::Scalar::decode(&bytes)?;
        Ok(Opening { name: self.name.clone(), value: self.value.clone(), r })
    }
}

/// The proof object handed to the delegate at Dispense (spec §4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionProof {
    /// Hex-encoded `C_D`, the full record commitment.
    pub record_commitment: String,
    /// Hex-encoded `C_H`, the commitment to the hidden subset.
    pub hidden_commitment: String,
    /// Disclosed openings for every visible field present in the record.
    pub openings: Vec<OpeningWire>,
    /// Advisory only — MUST NOT be trusted for correctness (spec §4.3).
    pub hidden_field_count: usize,
}

/// Outcome of a local `Verify` call (spec §4.5), carrying the recomputed
/// `C_F` for display even when verification fails.
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub valid: bool,
    pub recomputed_visible_commitment: Point,
}

impl PartitionProof {
    /// Verify this proof against the record commitment bound into the
    /// signed token (never `self.record_commitment` alone — a dishonest
    /// server could echo a different `C_D` in the proof body than the one
    /// it committed to at Issue time; source issue #5, §9) and the set of
    /// field names the policy actually authorizes as visible.
    ///
    /// `expected_visible` should be `policy.visible ∩ record-names`, i.e.
    /// the set the server is supposed to have disclosed. If the names in
    /// `openings` don't match it exactly — an omission or an extra
    /// disclosure — verification fails deterministically (spec §8, law 6),
    /// independent of the point-equation check.
    pub fn verify(&self, token_bound_commitment: &Point, expected_visible: &HashSet<String>) -> Result<VerificationOutcome> {
        let c_d = Point::decode(&hex::decode(&self.record_commitment).map_err(|_| Error::Malformed)?)?;
        let c_h = Point::decode(&hex::decode(&self.hidden_commitment).map_err(|_| Error::Malformed)?)?;

        if !crate::group::point_eq(&c_d, token_bound_commitment) {
            return Ok(VerificationOutcome { valid: false, recomputed_visible_commitment: Point::identity() });
        }

        let disclosed_names: HashSet<String> = self.openings.iter().map(|o| o.name.clone()).collect();
        if &disclosed_names != expected_visible {
            return Ok(VerificationOutcome { valid: false, recomputed_visible_commitment: Point::identity() });
        }

        let openings: Result<Vec<Opening>> = self.openings.iter().map(OpeningWire::to_opening).collect();
        let openings = openings?;
        let c_f = commitment::recompute_from_openings(&openings);

        let valid = commitment::verify_partition(&c_d, &c_h, &c_f);
        Ok(VerificationOutcome { valid, recomputed_visible_commitment: c_f })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::{commit_record, subset_commitment};
    use crate::record::Record;
    use rand::rngs::OsRng;

    fn sample_record() -> Record {
        let mut r = Record::new();
        r.insert("name", "Jane Citizen").unwrap();
        r.insert("nationalId", "AB123456").unwrap();
        r.insert("dateOfBirth", "1990-01-01").unwrap();
        r.insert("address", "1 Example Rd").unwrap();
        r
    }

    fn build_proof(record: &Record, visible: &HashSet<String>, hidden: &HashSet<String>) -> (Point, PartitionProof) {
        let mut rng = OsRng;
        let rc = commit_record(record, &mut rng);
        let c_h = subset_commitment(&rc.fields, hidden);
        let openings: Vec<OpeningWire> = visible
            .iter()
            .map(|n| {
                let fc = &rc.fields[n];
                OpeningWire { name: fc.name.clone(), value: fc.value.clone(), r: hex::encode(fc.r.encode()) }
            })
            .collect();
        let proof = PartitionProof {
            record_commitment: hex::encode(rc.c_d.encode()),
            hidden_commitment: hex::encode(c_h.encode()),
            openings,
            hidden_field_count: hidden.len(),
        };
        (rc.c_d, proof)
    }

    #[test]
    fn honest_proof_verifies() {
        let record = sample_record();
        let visible: HashSet<String> = ["name".into(), "nationalId".into()].into_iter().collect();
        let hidden: HashSet<String> = ["dateOfBirth".into(), "address".into()].into_iter().collect();
        let (c_d, proof) = build_proof(&record, &visible, &hidden);

        let outcome = proof.verify(&c_d, &visible).unwrap();
        assert!(outcome.valid);
    }

    #[test]
    fn rejects_commitment_bound_elsewhere() {
        let record = sample_record();
        let visible: HashSet<String> = ["name".into()].into_iter().collect();
        let hidden: HashSet<String> = ["nationalId".into(), "dateOfBirth".into(), "address".into()].into_iter().collect();
        let (_c_d, proof) = build_proof(&record, &visible, &hidden);

        // token claims a different commitment than the one the proof embeds
        let forged_commitment = Point::generator_g();
        let outcome = proof.verify(&forged_commitment, &visible).unwrap();
        assert!(!outcome.valid);
    }

    #[test]
    fn rejects_omitted_opening() {
        let record = sample_record();
        let visible: HashSet<String> = ["name".into(), "nationalId".into()].into_iter().collect();
        let hidden: HashSet<String> = ["dateOfBirth".into(), "address".into()].into_iter().collect();
        let (c_d, mut proof) = build_proof(&record, &visible, &hidden);

        proof.openings.pop(); // server drops one disclosed field
        let outcome = proof.verify(&c_d, &visible).unwrap();
        assert!(!outcome.valid);
    }

    #[test]
    fn rejects_extra_opening() {
        let record = sample_record();
        let visible: HashSet<String> = ["name".into()].into_iter().collect();
        let hidden: HashSet<String> = ["nationalId".into(), "dateOfBirth".into(), "address".into()].into_iter().collect();
        let (c_d, mut proof) = build_proof(&record, &visible, &hidden);

        let mut rng = OsRng;
        let rc = commit_record(&record, &mut rng);
        let extra = &rc.fields["nationalId"];
        proof.openings.push(OpeningWire { name: extra.name.clone(), value: extra.value.clone(), r: hex::encode(extra.r.encode()) });

        let outcome = proof.verify(&c_d, &visible).unwrap();
        assert!(!outcome.valid);
    }
}
