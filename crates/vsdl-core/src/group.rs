//! Prime-order group primitives.
//!
//! Wraps Ristretto255 (`curve25519-dalek`) behind typed `Scalar`/`Point`
//! newtypes so a scalar can never be substituted where a point is expected.
//! Ristretto255's standardized `hash_from_bytes` (Elligator2-based
//! map-to-curve) gives the second Pedersen generator `h` with unknown
//! discrete log base `g` — nobody, including this module, ever computes
//! `log_g h`.

use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar as DalekScalar,
    traits::Identity,
};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// Domain separation tag for deriving the second Pedersen generator `h`.
const GENERATOR_H_SEED: &[u8] = b"VSDL_GENERATOR_H_SEED_V1";

/// An integer modulo the group order `q`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Scalar(pub(crate) DalekScalar);

impl Scalar {
    /// Sample a uniform scalar in `[0, q)` from a cryptographic RNG.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Scalar(DalekScalar::random(rng))
    }

    /// SHA-256 of `bytes`, interpreted big-endian and reduced mod `q`.
    pub fn hash_to_scalar(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut wide = [0u8; 64];
        // digest is big-endian; from_bytes_mod_order_wide wants little-endian.
        for (i, b) in digest.iter().rev().enumerate() {
            wide[i] = *b;
        }
        Scalar(DalekScalar::from_bytes_mod_order_wide(&wide))
    }

    /// Fixed-width 32-byte canonical little-endian scalar encoding.
    pub fn encode(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Decode a canonical 32-byte scalar encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| Error::Malformed)?;
        let opt = DalekScalar::from_canonical_bytes(arr);
        if bool::from(opt.is_some()) {
            Ok(Scalar(opt.unwrap()))
        } else {
            Err(Error::Malformed)
        }
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0.as_bytes().ct_eq(other.0.as_bytes())
    }
}

impl std::ops::Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 + rhs.0)
    }
}

impl std::fmt::Debug for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scalar({})", hex::encode(self.encode()))
    }
}

/// Overwrites the opening randomness once a hidden field's commitment has
/// served its purpose, so it doesn't linger in server memory longer than
/// Dispense needs it (spec §5, resource lifecycle).
impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0 = DalekScalar::ZERO;
    }
}

/// An element of the prime-order group.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Point(pub(crate) RistrettoPoint);

impl Point {
    /// The group identity (used for an empty-set commitment).
    pub fn identity() -> Self {
        Point(RistrettoPoint::identity())
    }

    /// The standard Ristretto255 base point, `g`.
    pub fn generator_g() -> Self {
        Point(curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT)
    }

    /// The second Pedersen generator `h`, derived by hash-to-curve from a
    /// fixed domain-separated seed so that `log_g h` is unknown to any party.
    pub fn generator_h() -> Self {
        Point(RistrettoPoint::hash_from_bytes::<Sha512>(GENERATOR_H_SEED))
    }

    pub fn add(&self, other: &Point) -> Point {
        Point(self.0 + other.0)
    }

    pub fn scalar_mul(&self, scalar: &Scalar) -> Point {
        Point(self.0 * scalar.0)
    }

    /// Compressed 32-byte point encoding.
    pub fn encode(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    /// Decode a compressed 32-byte point encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| Error::Malformed)?;
        CompressedRistretto(arr)
            .decompress()
            .map(Point)
            .ok_or(Error::Malformed)
    }
}

impl ConstantTimeEq for Point {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0.compress().as_bytes().ct_eq(other.0.compress().as_bytes())
    }
}

/// Constant-time point equality (spec §4.1).
pub fn point_eq(a: &Point, b: &Point) -> bool {
    a.ct_eq(b).into()
}

impl std::iter::Sum for Point {
    fn sum<I: Iterator<Item = Point>>(iter: I) -> Point {
        iter.fold(Point::identity(), |acc, p| acc.add(&p))
    }
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Point({})", hex::encode(self.encode()))
    }
}
