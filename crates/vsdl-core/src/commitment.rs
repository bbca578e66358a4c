//! Pedersen commitments over individual fields and whole records, and the
//! homomorphic partition-verification algorithm that relates them.

use std::collections::{HashMap, HashSet};

use rand_core::{CryptoRng, RngCore};

use crate::group::{Point, Scalar};
use crate::record::Record;

/// `C = g·H(msg) + h·r` for one named field, plus the opening material
/// needed to reproduce it.
#[derive(Clone, Debug)]
pub struct FieldCommitment {
    pub name: String,
    pub value: String,
    pub r: Scalar,
    pub c: Point,
}

/// The length-prefixed message hashed into a field commitment.
///
/// Replaces the reference's `name ∥ "||" ∥ value` concatenation, which
/// collides whenever a name or value legitimately contains `"||"` (source
/// issue #2, §9): prefixing each component with its own length makes the
/// encoding injective.
fn field_message(name: &str, value: &str) -> Vec<u8> {
    let mut msg = Vec::with_capacity(16 + name.len() + value.len());
    msg.extend_from_slice(&(name.len() as u64).to_be_bytes());
    msg.extend_from_slice(name.as_bytes());
    msg.extend_from_slice(&(value.len() as u64).to_be_bytes());
    msg.extend_from_slice(value.as_bytes());
    msg
}

/// Commit to a single `(name, value)` pair. Samples fresh randomness from
/// `rng` when `r` is `None`.
pub fn commit_field(
    name: impl Into<String>,
    value: impl Into<String>,
    r: Option<Scalar>,
    rng: &mut (impl RngCore + CryptoRng),
) -> FieldCommitment {
    let name = name.into();
    let value = value.into();
    let r = r.unwrap_or_else(|| Scalar::random(rng));
    let m = Scalar::hash_to_scalar(&field_message(&name, &value));
    let c = Point::generator_g().scalar_mul(&m).add(&Point::generator_h().scalar_mul(&r));
    FieldCommitment { name, value, r, c }
}

/// The full-record commitment and its constituent per-field commitments.
pub struct RecordCommitment {
    pub c_d: Point,
    pub fields: HashMap<String, FieldCommitment>,
}

/// Commit to every field of a record with freshly sampled randomness;
/// `C_D = Σ C_i` (spec §4.2, invariant 1).
pub fn commit_record(record: &Record, rng: &mut (impl RngCore + CryptoRng)) -> RecordCommitment {
    let mut fields = HashMap::with_capacity(record.len());
    let mut c_d = Point::identity();

    for (name, value) in record.iter() {
        let fc = commit_field(name, value, None, rng);
        c_d = c_d.add(&fc.c);
        fields.insert(name.to_string(), fc);
    }

    RecordCommitment { c_d, fields }
}

/// Sum of the commitments named in `names`; names absent from `field_commitments`
/// are skipped silently (spec §4.2). An empty selection returns the identity.
pub fn subset_commitment(
    field_commitments: &HashMap<String, FieldCommitment>,
    names: &HashSet<String>,
) -> Point {
    names
        .iter()
        .filter_map(|n| field_commitments.get(n))
        .map(|fc| fc.c)
        .sum()
}

/// `C_D == C_H + C_F`, the partition equation (spec §4.2).
pub fn verify_partition(c_d: &Point, c_h: &Point, c_f: &Point) -> bool {
    crate::group::point_eq(c_d, &c_h.add(c_f))
}

/// A disclosed `(name, value, randomness)` triple for one visible field.
#[derive(Clone, Debug)]
pub struct Opening {
    pub name: String,
    pub value: String,
    pub r: Scalar,
}

/// Recompute the commitment implied by a set of openings: `Σ g·H(msg_i) + h·r_i`.
/// Empty input returns the identity.
pub fn recompute_from_openings(openings: &[Opening]) -> Point {
    openings
        .iter()
        .map(|o| {
            let m = Scalar::hash_to_scalar(&field_message(&o.name, &o.value));
            Point::generator_g().scalar_mul(&m).add(&Point::generator_h().scalar_mul(&o.r))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn commit_field_is_reproducible_from_opening() {
        let mut rng = OsRng;
        let fc = commit_field("k", "v", None, &mut rng);
        let recomputed = recompute_from_openings(&[Opening { name: fc.name.clone(), value: fc.value.clone(), r: fc.r }]);
        assert_eq!(fc.c, recomputed);
    }

    #[test]
    fn record_commitment_equals_sum_of_field_commitments() {
        let mut rng = OsRng;
        let record = sample_record();
        let rc = commit_record(&record, &mut rng);

        let summed: Point = rc.fields.values().map(|fc| fc.c).sum();
        assert_eq!(rc.c_d, summed);
    }

    #[test]
    fn homomorphism_holds_for_any_partition() {
        let mut rng = OsRng;
        let record = sample_record();
        let rc = commit_record(&record, &mut rng);

        let visible: HashSet<String> = ["name".into(), "nationalId".into()].into_iter().collect();
        let hidden: HashSet<String> = ["dateOfBirth".into(), "address".into()].into_iter().collect();

        let c_v = subset_commitment(&rc.fields, &visible);
        let c_h = subset_commitment(&rc.fields, &hidden);
        assert_eq!(rc.c_d, c_v.add(&c_h));
    }

    #[test]
    fn empty_set_commits_to_identity() {
        let fields = HashMap::new();
        let empty = HashSet::new();
        assert_eq!(subset_commitment(&fields, &empty), Point::identity());
        assert_eq!(recompute_from_openings(&[]), Point::identity());
    }

    #[test]
    fn partition_proof_round_trips_honestly() {
        let mut rng = OsRng;
        let record = sample_record();
        let rc = commit_record(&record, &mut rng);

        let hidden: HashSet<String> = ["dateOfBirth".into(), "address".into()].into_iter().collect();
        let c_h = subset_commitment(&rc.fields, &hidden);

        let openings: Vec<Opening> = ["name", "nationalId"]
            .iter()
            .map(|n| {
                let fc = &rc.fields[*n];
                Opening { name: fc.name.clone(), value: fc.value.clone(), r: fc.r }
            })
            .collect();
        let c_f = recompute_from_openings(&openings);

        assert!(verify_partition(&rc.c_d, &c_h, &c_f));
    }

    #[test]
    fn tampered_opening_value_fails_verification() {
        let mut rng = OsRng;
        let record = sample_record();
        let rc = commit_record(&record, &mut rng);

        let hidden: HashSet<String> = ["dateOfBirth".into(), "nationalId".into()].into_iter().collect();
        let c_h = subset_commitment(&rc.fields, &hidden);

        let fc = &rc.fields["address"];
        let tampered = Opening { name: fc.name.clone(), value: "Elsewhere".to_string(), r: fc.r };
        let c_f = recompute_from_openings(&[tampered]);

        assert!(!verify_partition(&rc.c_d, &c_h, &c_f));
    }

    #[test]
    fn substituted_randomness_fails_verification() {
        let mut rng = OsRng;
        let record = sample_record();
        let rc = commit_record(&record, &mut rng);

        let hidden: HashSet<String> = ["dateOfBirth".into(), "address".into()].into_iter().collect();
        let c_h = subset_commitment(&rc.fields, &hidden);

        let fc = &rc.fields["nationalId"];
        let wrong_r = Scalar::random(&mut rng);
        let tampered = Opening { name: fc.name.clone(), value: fc.value.clone(), r: wrong_r };
        let c_f = recompute_from_openings(&[tampered]);

        assert!(!verify_partition(&rc.c_d, &c_h, &c_f));
    }
}
