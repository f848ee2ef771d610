//! ## Pairing engines for BLS-like signatures.
//!
//! We provide a `CurveSystem` trait that adapts `ark_ec::pairing::Pairing`
//! to BLS-like signatures by permitting the group roles to be transposed,
//! while retaining the correct associations between scalars, public keys,
//! and signatures.
//!
//! Every signing and verification operation in this crate takes its curve
//! system as an explicit type parameter, so several instantiations can
//! coexist in one binary and be tested independently.  There is no global
//! curve selection.

use core::iter::once;
use core::marker::PhantomData;

use ark_ec::bls12::{Bls12, Bls12Config, G1Projective, G2Projective};
use ark_ec::hashing::curve_maps::wb::{WBConfig, WBMap};
use ark_ec::hashing::map_to_curve_hasher::MapToCurveBasedHasher;
use ark_ec::hashing::HashToCurve;
use ark_ec::pairing::{MillerLoopOutput, Pairing, PairingOutput};
use ark_ec::{AffineRepr, CurveGroup, Group};
use ark_ff::field_hashers::DefaultFieldHasher;
use ark_ff::{One, PrimeField};
use ark_std::UniformRand;
use rand::Rng;
use sha2::Sha256;
use zeroize::Zeroize;

/// Convenience type alias for the affine form of a curve system's key group.
pub type PublicKeyAffine<E> = <<E as CurveSystem>::PublicKeyGroup as CurveGroup>::Affine;

/// Convenience type alias for the affine form of a curve system's signature group.
pub type SignatureAffine<E> = <<E as CurveSystem>::SignatureGroup as CurveGroup>::Affine;

/// A weakening of `ark_ec::pairing::Pairing` to permit transposing the groups.
///
/// You cannot transpose the two groups of a `Pairing` directly because its
/// methods fix which argument is `G1`.  This trait replicates the
/// transposable functionality, leaving the actual signature scheme to
/// wrapper types, and extracts the two functions users may wish to
/// override: random scalar generation and hashing to the signature curve.
pub trait CurveSystem: Sized + Send + Sync + 'static {
    /// The underlying pairing engine.
    type Engine: Pairing<ScalarField = Self::Scalar>;

    /// The prime-order scalar field shared by both groups.
    type Scalar: PrimeField + Zeroize;

    /// Group where BLS public keys live.
    ///
    /// You should take this to be the `G1` curve usually because all
    /// verifiers perform additions, and sometimes scalar multiplications,
    /// on this curve.
    type PublicKeyGroup: CurveGroup<ScalarField = Self::Scalar>;

    /// Group where BLS signatures and hashed messages live.
    ///
    /// You should take this to be the `G2` curve usually because only
    /// aggregators perform additions on this curve.
    type SignatureGroup: CurveGroup<ScalarField = Self::Scalar>;

    /// Prepared form of public key group elements, for Miller loops.
    type PublicKeyPrepared: Clone + Send + Sync;

    /// Prepared form of signature group elements, for Miller loops.
    type SignaturePrepared: Clone + Send + Sync;

    /// Curve name embedded into the hash-to-curve domain separation tag.
    const CURVE_NAME: &'static [u8];

    /// Name of the group signatures live in, `b"G1"` or `b"G2"`.
    const SIG_GROUP_NAME: &'static [u8];

    /// Generate a random scalar for use as a secret key.
    fn generate<R: Rng>(rng: &mut R) -> Self::Scalar {
        Self::Scalar::rand(rng)
    }

    /// Domain separation tag for this curve system's hash-to-curve suite.
    ///
    /// We cannot concatenate associated consts of `Self` in a const
    /// context, so we build the tag at runtime.
    fn signature_curve_dst() -> Vec<u8> {
        [
            b"BLS_SIG_" as &[u8],
            Self::CURVE_NAME,
            Self::SIG_GROUP_NAME,
            b"_XMD:SHA-256_SSWU_RO_NUL_",
        ]
        .concat()
    }

    /// Hash a message to the signature curve with this curve system's
    /// own suite.
    ///
    /// Callers may substitute any function of the same shape through the
    /// `*_with_hasher` entry points, but signer and verifier must agree
    /// on the substitution.
    fn hash_to_signature_curve(message: &[u8]) -> Self::SignatureGroup;

    /// Generator of the public key group.
    fn generator_of_public_key_group() -> Self::PublicKeyGroup {
        Self::PublicKeyGroup::generator()
    }

    fn prepare_public_key(g: impl Into<PublicKeyAffine<Self>>) -> Self::PublicKeyPrepared;

    fn prepare_signature(g: impl Into<SignatureAffine<Self>>) -> Self::SignaturePrepared;

    /// Run the Miller loop from `Engine` but orient its arguments to be a
    /// `PublicKeyGroup` and `SignatureGroup`.
    fn miller_loop<I>(i: I) -> MillerLoopOutput<Self::Engine>
    where
        I: IntoIterator<Item = (Self::PublicKeyPrepared, Self::SignaturePrepared)>;

    /// Perform final exponentiation on the result of a Miller loop.
    fn final_exponentiation(
        m: MillerLoopOutput<Self::Engine>,
    ) -> Option<PairingOutput<Self::Engine>> {
        Self::Engine::final_exponentiation(m)
    }

    /// Perform a pairing operation `e(p, q)` oriented so that `p` lives in
    /// the `PublicKeyGroup` and `q` in the `SignatureGroup`.
    fn pairing(p: Self::PublicKeyGroup, q: Self::SignatureGroup) -> PairingOutput<Self::Engine>;

    /// Implement the verification equation for aggregate BLS signatures
    /// provided as prepared points, checking
    /// `e(generator, signature) == prod_i e(pk_i, m_i)` as the single
    /// product `e(-generator, signature) * prod_i e(pk_i, m_i) == 1`.
    ///
    /// This low-level routine does no verification of critical security
    /// properties like message domain separation.  It exists purely so
    /// optimized variants can replace mid-level routines wholesale.
    fn verify_prepared<I>(signature: Self::SignaturePrepared, inputs: I) -> bool
    where
        I: IntoIterator<Item = (Self::PublicKeyPrepared, Self::SignaturePrepared)>,
    {
        let minus_generator = -Self::generator_of_public_key_group();
        let lhs = (Self::prepare_public_key(minus_generator), signature);
        Self::final_exponentiation(Self::miller_loop(inputs.into_iter().chain(once(lhs))))
            .map_or(false, |e| e.0.is_one())
    }
}

/// Extra naming data our hash-to-curve suites need from a `Bls12Config`.
pub trait CurveExtraConfig: Bls12Config {
    /// Curve name as spelled inside IETF ciphersuite identifiers.
    const CURVE_NAME: &'static [u8];
}

impl CurveExtraConfig for ark_bls12_381::Config {
    const CURVE_NAME: &'static [u8] = b"BLS12381";
}

/// Usual BLS variant with tiny 48 byte public keys and 96 byte signatures.
///
/// We favor this variant because verifiers always perform `O(signers)`
/// additions on the `PublicKeyGroup`, or worse scalar multiplications when
/// weighting keys by multiplicity.
pub struct UsualBLS<P: Bls12Config>(PhantomData<fn() -> P>);

impl<P> CurveSystem for UsualBLS<P>
where
    P: Bls12Config + CurveExtraConfig,
    P::G2Config: WBConfig,
    <Bls12<P> as Pairing>::ScalarField: Zeroize,
{
    type Engine = Bls12<P>;
    type Scalar = <Bls12<P> as Pairing>::ScalarField;
    type PublicKeyGroup = G1Projective<P>;
    type SignatureGroup = G2Projective<P>;
    type PublicKeyPrepared = <Bls12<P> as Pairing>::G1Prepared;
    type SignaturePrepared = <Bls12<P> as Pairing>::G2Prepared;

    const CURVE_NAME: &'static [u8] = <P as CurveExtraConfig>::CURVE_NAME;
    const SIG_GROUP_NAME: &'static [u8] = b"G2";

    fn hash_to_signature_curve(message: &[u8]) -> Self::SignatureGroup {
        MapToCurveBasedHasher::<
            G2Projective<P>,
            DefaultFieldHasher<Sha256, 128>,
            WBMap<P::G2Config>,
        >::new(&Self::signature_curve_dst())
        .expect("G2 suite domain separation tag is valid")
        .hash(message)
        .expect("isogeny hash to G2 is infallible")
        .into_group()
    }

    fn prepare_public_key(g: impl Into<PublicKeyAffine<Self>>) -> Self::PublicKeyPrepared {
        <Bls12<P> as Pairing>::G1Prepared::from(g.into())
    }

    fn prepare_signature(g: impl Into<SignatureAffine<Self>>) -> Self::SignaturePrepared {
        <Bls12<P> as Pairing>::G2Prepared::from(g.into())
    }

    fn miller_loop<I>(i: I) -> MillerLoopOutput<Self::Engine>
    where
        I: IntoIterator<Item = (Self::PublicKeyPrepared, Self::SignaturePrepared)>,
    {
        let (publickeys, signatures): (Vec<_>, Vec<_>) = i.into_iter().unzip();
        Bls12::<P>::multi_miller_loop(publickeys, signatures)
    }

    fn pairing(p: Self::PublicKeyGroup, q: Self::SignatureGroup) -> PairingOutput<Self::Engine> {
        Bls12::<P>::pairing(p, q)
    }
}

/// Infrequently used BLS variant with tiny 48 byte signatures and 96 byte
/// public keys.
///
/// We recommend against this variant by default because verifiers perform
/// `O(signers)` additions on the `PublicKeyGroup`, which is the larger and
/// slower group here.  Yet, there are specific use cases where aggregators
/// dominate and this variant performs better.
pub struct TinyBLS<P: Bls12Config>(PhantomData<fn() -> P>);

impl<P> CurveSystem for TinyBLS<P>
where
    P: Bls12Config + CurveExtraConfig,
    P::G1Config: WBConfig,
    <Bls12<P> as Pairing>::ScalarField: Zeroize,
{
    type Engine = Bls12<P>;
    type Scalar = <Bls12<P> as Pairing>::ScalarField;
    type PublicKeyGroup = G2Projective<P>;
    type SignatureGroup = G1Projective<P>;
    type PublicKeyPrepared = <Bls12<P> as Pairing>::G2Prepared;
    type SignaturePrepared = <Bls12<P> as Pairing>::G1Prepared;

    const CURVE_NAME: &'static [u8] = <P as CurveExtraConfig>::CURVE_NAME;
    const SIG_GROUP_NAME: &'static [u8] = b"G1";

    fn hash_to_signature_curve(message: &[u8]) -> Self::SignatureGroup {
        MapToCurveBasedHasher::<
            G1Projective<P>,
            DefaultFieldHasher<Sha256, 128>,
            WBMap<P::G1Config>,
        >::new(&Self::signature_curve_dst())
        .expect("G1 suite domain separation tag is valid")
        .hash(message)
        .expect("isogeny hash to G1 is infallible")
        .into_group()
    }

    fn prepare_public_key(g: impl Into<PublicKeyAffine<Self>>) -> Self::PublicKeyPrepared {
        <Bls12<P> as Pairing>::G2Prepared::from(g.into())
    }

    fn prepare_signature(g: impl Into<SignatureAffine<Self>>) -> Self::SignaturePrepared {
        <Bls12<P> as Pairing>::G1Prepared::from(g.into())
    }

    fn miller_loop<I>(i: I) -> MillerLoopOutput<Self::Engine>
    where
        I: IntoIterator<Item = (Self::PublicKeyPrepared, Self::SignaturePrepared)>,
    {
        let (publickeys, signatures): (Vec<_>, Vec<_>) = i.into_iter().unzip();
        Bls12::<P>::multi_miller_loop(signatures, publickeys)
    }

    fn pairing(p: Self::PublicKeyGroup, q: Self::SignatureGroup) -> PairingOutput<Self::Engine> {
        Bls12::<P>::pairing(q, p)
    }
}

/// Usual aggregate BLS signature scheme on ZCash's BLS12-381 curve.
pub type ZBLS = UsualBLS<ark_bls12_381::Config>;

/// Transposed aggregate BLS signature scheme on ZCash's BLS12-381 curve.
pub type TinyZBLS = TinyBLS<ark_bls12_381::Config>;

#[cfg(test)]
mod tests {
    use super::*;

    use ark_std::Zero;
    use rand::thread_rng;

    fn bilinearity<E: CurveSystem>() {
        let mut rng = thread_rng();
        let x = E::generate(&mut rng);
        let g = E::generator_of_public_key_group();
        let h = E::hash_to_signature_curve(b"bilinearity");
        assert_eq!(E::pairing(g * x, h), E::pairing(g, h * x));
    }

    #[test]
    fn pairing_is_bilinear() {
        bilinearity::<ZBLS>();
        bilinearity::<TinyZBLS>();
    }

    #[test]
    fn hash_to_curve_separates_inputs() {
        let a = ZBLS::hash_to_signature_curve(b"one input");
        let b = ZBLS::hash_to_signature_curve(b"another input");
        assert_eq!(a, ZBLS::hash_to_signature_curve(b"one input"));
        assert_ne!(a, b);
        assert!(!a.is_zero());
    }

    #[test]
    fn transposed_engine_uses_its_own_groups() {
        use ark_serialize::CanonicalSerialize;
        let z = ZBLS::hash_to_signature_curve(b"sizes").into_affine();
        let t = TinyZBLS::hash_to_signature_curve(b"sizes").into_affine();
        assert_eq!(z.compressed_size(), 96);
        assert_eq!(t.compressed_size(), 48);
    }
}
