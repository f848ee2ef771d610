//! ## Keys, signatures, and authentications.
//!
//! We simplify the code by using only the projective form as produced by
//! algebraic operations, like aggregation, signing, and
//! `SecretKey::to_public`, for signatures and keys alike.  In principle,
//! one benefits from an affine form in serialization and pairings, but the
//! conversion from projective is free when no further algebra happens, so
//! verifiers batch normalize at the last moment instead.
//!
//! All values here are immutable once constructed.  Every operation
//! allocates and returns fresh points, so any of them may be shared across
//! threads freely.

use ark_ec::{AffineRepr, CurveGroup};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::Zero;
use rand::Rng;
use zeroize::Zeroize;

use crate::engine::CurveSystem;
use crate::errors::KoskError;

// //////////////// SECRETS //////////////// //

/// Secret signing key, a scalar in the curve's prime-order field.
///
/// Owned exclusively by its signer and never transmitted.  The scalar is
/// zeroed when the key is dropped.  We perform no range validation beyond
/// what the scalar field type enforces.
pub struct SecretKey<E: CurveSystem>(pub E::Scalar);

impl<E: CurveSystem> Clone for SecretKey<E> {
    fn clone(&self) -> Self {
        SecretKey(self.0)
    }
}

impl<E: CurveSystem> Drop for SecretKey<E> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

// Keep the scalar out of debug output.
impl<E: CurveSystem> core::fmt::Debug for SecretKey<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "SecretKey(<elided>)")
    }
}

impl<E: CurveSystem> SecretKey<E> {
    /// Generate a fresh secret key from the supplied CSPRNG.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        SecretKey(E::generate(rng))
    }

    /// Derive our public key, a scalar multiple of the key group generator.
    pub fn to_public(&self) -> PublicKey<E> {
        PublicKey(E::generator_of_public_key_group() * self.0)
    }

    /// Canonical little-endian field encoding of the scalar.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.compressed_size());
        self.0
            .serialize_compressed(&mut bytes)
            .expect("writing a scalar to a Vec cannot fail");
        bytes
    }

    /// Decode a secret key, rejecting encodings outside the field.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KoskError> {
        Ok(SecretKey(E::Scalar::deserialize_compressed(bytes)?))
    }
}

// ////////////// NON-SECRETS ////////////// //

// /////// BEGIN MACROS /////// //

macro_rules! broken_derives {
    ($wrapper:tt) => {
        impl<E: CurveSystem> Clone for $wrapper<E> {
            fn clone(&self) -> Self {
                $wrapper(self.0)
            }
        }
        impl<E: CurveSystem> Copy for $wrapper<E> {}

        impl<E: CurveSystem> PartialEq<Self> for $wrapper<E> {
            fn eq(&self, other: &Self) -> bool {
                self.0.eq(&other.0)
            }
        }
        impl<E: CurveSystem> Eq for $wrapper<E> {}

        impl<E: CurveSystem> core::fmt::Debug for $wrapper<E> {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                write!(f, concat!(stringify!($wrapper), "({:?})"), self.0)
            }
        }
    };
} // macro_rules!

macro_rules! point_encoding {
    ($wrapper:tt, $group:tt) => {
        impl<E: CurveSystem> $wrapper<E> {
            /// Canonical compressed encoding of the underlying point.
            pub fn to_bytes(&self) -> Vec<u8> {
                let affine = self.0.into_affine();
                let mut bytes = Vec::with_capacity(affine.compressed_size());
                affine
                    .serialize_compressed(&mut bytes)
                    .expect("writing a point to a Vec cannot fail");
                bytes
            }

            /// Decode from the canonical compressed encoding, rejecting
            /// non-canonical bytes and points outside the prime-order group.
            pub fn from_bytes(bytes: &[u8]) -> Result<Self, KoskError> {
                let affine =
                    <<E as CurveSystem>::$group as CurveGroup>::Affine::deserialize_compressed(
                        bytes,
                    )?;
                Ok($wrapper(affine.into_group()))
            }
        }
    };
} // macro_rules!

// //////// END MACROS //////// //

/// Detached BLS signature in the application domain.
pub struct Signature<E: CurveSystem>(pub E::SignatureGroup);

broken_derives!(Signature);
point_encoding!(Signature, SignatureGroup);

impl<E: CurveSystem> Signature<E> {
    /// Sum signatures into one aggregate signature by group addition.
    ///
    /// Order independent.  An empty iterator yields the identity, which
    /// verifies only against an empty or cancelling key set.
    pub fn aggregate<'a, I>(signatures: I) -> Self
    where
        I: IntoIterator<Item = &'a Signature<E>>,
    {
        let mut sum = E::SignatureGroup::zero();
        for signature in signatures {
            sum += signature.0;
        }
        Signature(sum)
    }
}

/// BLS public key.
///
/// Shared freely, but worthless to verifiers of aggregates until its owner
/// has produced an `Authentication` for it.  See the crate documentation
/// for the rogue public-key attack this forecloses.
pub struct PublicKey<E: CurveSystem>(pub E::PublicKeyGroup);

broken_derives!(PublicKey);
point_encoding!(PublicKey, PublicKeyGroup);

impl<E: CurveSystem> PublicKey<E> {
    /// Sum public keys into one effective key by group addition.
    pub fn aggregate<'a, I>(publickeys: I) -> Self
    where
        I: IntoIterator<Item = &'a PublicKey<E>>,
    {
        let mut sum = E::PublicKeyGroup::zero();
        for publickey in publickeys {
            sum += publickey.0;
        }
        PublicKey(sum)
    }
}

/// Proof that a party knows the secret key behind a public key.
///
/// An authentication is itself a BLS signature on the key's own canonical
/// encoding, tagged with the authentication domain byte, so it never
/// collides with any application-domain signature.  The newtype keeps the
/// two domains apart in the type system as well.
///
/// Authentications are aggregatable like any other BLS signatures, and
/// since each one signs a distinct message, its own public key, distinct
/// message aggregation is optimal for checking them in bulk.
pub struct Authentication<E: CurveSystem>(pub Signature<E>);

impl<E: CurveSystem> Clone for Authentication<E> {
    fn clone(&self) -> Self {
        Authentication(self.0)
    }
}
impl<E: CurveSystem> Copy for Authentication<E> {}

impl<E: CurveSystem> PartialEq<Self> for Authentication<E> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}
impl<E: CurveSystem> Eq for Authentication<E> {}

impl<E: CurveSystem> core::fmt::Debug for Authentication<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Authentication({:?})", (self.0).0)
    }
}

impl<E: CurveSystem> Authentication<E> {
    /// Canonical compressed encoding of the underlying point.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    /// Decode from the canonical compressed encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KoskError> {
        Ok(Authentication(Signature::from_bytes(bytes)?))
    }

    /// Sum authentications by group addition.
    pub fn aggregate<'a, I>(authentications: I) -> Self
    where
        I: IntoIterator<Item = &'a Authentication<E>>,
    {
        Authentication(Signature::aggregate(
            authentications.into_iter().map(|a| &a.0),
        ))
    }
}

/// Scale each key by the matching factor with per-point scalar
/// multiplication.  Callers must supply slices of equal length.
pub fn scale_keys<E: CurveSystem>(
    publickeys: &[PublicKey<E>],
    factors: &[E::Scalar],
) -> Vec<PublicKey<E>> {
    publickeys
        .iter()
        .zip(factors)
        .map(|(publickey, factor)| PublicKey(publickey.0 * *factor))
        .collect()
}

/// BLS keypair.
///
/// We keep the public key next to the secret key to avoid recomputing it,
/// which usually takes longer than signing when the key group is `G1`.
pub struct Keypair<E: CurveSystem> {
    pub secret: SecretKey<E>,
    pub public: PublicKey<E>,
}

impl<E: CurveSystem> Clone for Keypair<E> {
    fn clone(&self) -> Self {
        Keypair {
            secret: self.secret.clone(),
            public: self.public,
        }
    }
}

impl<E: CurveSystem> Keypair<E> {
    /// Generate a keypair from the supplied CSPRNG.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let secret = SecretKey::generate(rng);
        let public = secret.to_public();
        Keypair { secret, public }
    }
}
