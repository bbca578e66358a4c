//! vsdl-core: the Pedersen-commitment engine and proof objects underlying
//! verifiable selective-disclosure delegation tokens.
//!
//! Module layout mirrors the components in the system design:
//! - [`group`] — Group Primitives (G): the prime-order group, scalars, points.
//! - [`commitment`] — Commitment Engine (C): field/record commitments,
//!   subset sums, and partition verification.
//! - [`proof`] — Proof Objects (P): the wire-format partition proof and its
//!   delegate-side verification.
//! - [`record`] — the owner's record and policy data model.
//! - [`policy`] — Policy Binder (B): deterministic policy hashing.
//! - [`token`] — the signed compact token codec (HMAC-SHA256).

pub mod commitment;
pub mod error;
pub mod group;
pub mod policy;
pub mod proof;
pub mod record;
pub mod token;

pub use commitment::{commit_field, commit_record, recompute_from_openings, subset_commitment, verify_partition, FieldCommitment, Opening, RecordCommitment};
pub use error::{Error, Result};
pub use group::{point_eq, Point, Scalar};
pub use policy::policy_hash;
pub use proof::{OpeningWire, PartitionProof, VerificationOutcome};
pub use record::{Field, Policy, Record};
