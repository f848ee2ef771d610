//! ## Knowledge-of-secret-key (Kosk) BLS signatures.
//!
//! This module defends aggregate BLS signatures against the rogue
//! public-key attack by requiring every signer to authenticate their key:
//! a BLS signature on the key's own encoding, proving possession of the
//! matching secret key.
//!
//! Signing one's own public key does not by itself prove knowledge of the
//! secret key.  Suppose a signing oracle exists for `(pk1, sk1)` and let
//! `pkA = -pk1 + x g`.  Then `sig_pkA(pkA) = -sig_pk1(pkA) + x H(pkA)`, so
//! if `pk1` ever signs the byte string `pkA`, party A obtains a valid
//! authentication for `pkA` without knowing `skA`, and the rogue key
//! attack goes through.  We foreclose this by making it impossible for any
//! key to sign the byte string used in another key's authentication:
//! authentication prepends [`AUTHENTICATION_DOMAIN`] to the key encoding
//! before hashing, while every application signature prepends
//! [`APPLICATION_DOMAIN`] to its message.  The two domains are disjoint by
//! prefix mismatch, and one only ever authenticates one's own key, so no
//! signature you hand out can serve as anyone else's authentication.
//!
//! This construction sacrifices interoperability with plain BLS, but the
//! authentications stay aggregatable: they are ordinary BLS signatures on
//! distinct messages, namely the distinct public keys.
//!
//! Verifiers must check each signer's authentication once, at key
//! registration, before trusting any multi- or aggregate-signature
//! verification here.  [`verify_multi_signature_with_authentications`]
//! bundles both steps for callers without a registration phase.

use crate::engine::CurveSystem;
use crate::single::{scale_keys, Authentication, Keypair, PublicKey, SecretKey, Signature};
use crate::verifiers::{verify_aggregate_points, verify_multi_point};

/// Domain byte prepended to the key encoding inside authentications.
pub const AUTHENTICATION_DOMAIN: u8 = 0x00;

/// Domain byte prepended to every application message before signing.
pub const APPLICATION_DOMAIN: u8 = 0x01;

/// Prepend a domain byte to a message.
fn tagged(domain: u8, message: &[u8]) -> Vec<u8> {
    let mut t = Vec::with_capacity(1 + message.len());
    t.push(domain);
    t.extend_from_slice(message);
    t
}

impl<E: CurveSystem> SecretKey<E> {
    /// Sign a message in the application domain.
    pub fn sign(&self, message: &[u8]) -> Signature<E> {
        self.sign_with_hasher(message, E::hash_to_signature_curve)
    }

    /// Sign a message in the application domain with a substitute
    /// hash-to-curve function.  Verifiers must use the same substitution.
    pub fn sign_with_hasher<H>(&self, message: &[u8], hash: H) -> Signature<E>
    where
        H: Fn(&[u8]) -> E::SignatureGroup,
    {
        Signature(hash(&tagged(APPLICATION_DOMAIN, message)) * self.0)
    }

    /// Produce the aggregatable authentication for our public key.
    pub fn authenticate(&self) -> Authentication<E> {
        self.authenticate_with_hasher(E::hash_to_signature_curve)
    }

    /// Produce our authentication with a substitute hash-to-curve function.
    pub fn authenticate_with_hasher<H>(&self, hash: H) -> Authentication<E>
    where
        H: Fn(&[u8]) -> E::SignatureGroup,
    {
        let encoding = self.to_public().to_bytes();
        Authentication(Signature(
            hash(&tagged(AUTHENTICATION_DOMAIN, &encoding)) * self.0,
        ))
    }
}

impl<E: CurveSystem> Keypair<E> {
    /// Sign a message in the application domain.
    pub fn sign(&self, message: &[u8]) -> Signature<E> {
        self.secret.sign(message)
    }

    /// Produce the aggregatable authentication for our public key.
    pub fn authenticate(&self) -> Authentication<E> {
        // Reuse the stored public key rather than rederiving it.
        let encoding = self.public.to_bytes();
        Authentication(Signature(
            E::hash_to_signature_curve(&tagged(AUTHENTICATION_DOMAIN, &encoding)) * self.secret.0,
        ))
    }
}

impl<E: CurveSystem> PublicKey<E> {
    /// Check that `authentication` proves possession of our secret key.
    ///
    /// A boolean gate, not a diagnostic: malformed or mismatched inputs
    /// and failed pairing checks are all indistinguishably `false`.
    pub fn check_authentication(&self, authentication: &Authentication<E>) -> bool {
        self.check_authentication_with_hasher(authentication, E::hash_to_signature_curve)
    }

    /// Check an authentication produced with a substitute hash-to-curve
    /// function.
    pub fn check_authentication_with_hasher<H>(
        &self,
        authentication: &Authentication<E>,
        hash: H,
    ) -> bool
    where
        H: Fn(&[u8]) -> E::SignatureGroup,
    {
        let encoding = self.to_bytes();
        let point = hash(&tagged(AUTHENTICATION_DOMAIN, &encoding));
        verify_aggregate_points(&authentication.0, core::slice::from_ref(self), vec![point])
    }
}

/// Check that a single application-domain signature is valid.
pub fn verify_single_signature<E: CurveSystem>(
    publickey: &PublicKey<E>,
    message: &[u8],
    signature: &Signature<E>,
) -> bool {
    verify_single_signature_with_hasher(publickey, message, signature, E::hash_to_signature_curve)
}

/// Check a single application-domain signature under a substitute
/// hash-to-curve function.
pub fn verify_single_signature_with_hasher<E: CurveSystem, H>(
    publickey: &PublicKey<E>,
    message: &[u8],
    signature: &Signature<E>,
    hash: H,
) -> bool
where
    H: Fn(&[u8]) -> E::SignatureGroup,
{
    let point = hash(&tagged(APPLICATION_DOMAIN, message));
    verify_aggregate_points(signature, core::slice::from_ref(publickey), vec![point])
}

/// Check that an aggregate signature proves every listed key signed the
/// same message.
///
/// Security precondition: every key in `publickeys` must already have
/// produced a valid [`Authentication`], checked at registration.  This
/// routine does not re-check authentications; without them it is
/// vulnerable to the rogue public-key attack.
pub fn verify_multi_signature<E: CurveSystem>(
    aggregated: &Signature<E>,
    publickeys: &[PublicKey<E>],
    message: &[u8],
) -> bool {
    verify_multi_signature_with_hasher(aggregated, publickeys, message, E::hash_to_signature_curve)
}

/// [`verify_multi_signature`] under a substitute hash-to-curve function.
pub fn verify_multi_signature_with_hasher<E: CurveSystem, H>(
    aggregated: &Signature<E>,
    publickeys: &[PublicKey<E>],
    message: &[u8],
    hash: H,
) -> bool
where
    H: Fn(&[u8]) -> E::SignatureGroup,
{
    let point = hash(&tagged(APPLICATION_DOMAIN, message));
    verify_multi_point(aggregated, publickeys, point)
}

/// Check that an aggregate signature proves each listed key signed its
/// matching message.  Fails closed when the slices differ in length.
///
/// Same security precondition as [`verify_multi_signature`]: all keys must
/// be pre-authenticated.
pub fn verify_aggregate_signature<E: CurveSystem, M: AsRef<[u8]>>(
    aggregated: &Signature<E>,
    publickeys: &[PublicKey<E>],
    messages: &[M],
) -> bool {
    verify_aggregate_signature_with_hasher(
        aggregated,
        publickeys,
        messages,
        E::hash_to_signature_curve,
    )
}

/// [`verify_aggregate_signature`] under a substitute hash-to-curve function.
pub fn verify_aggregate_signature_with_hasher<E: CurveSystem, M: AsRef<[u8]>, H>(
    aggregated: &Signature<E>,
    publickeys: &[PublicKey<E>],
    messages: &[M],
    hash: H,
) -> bool
where
    H: Fn(&[u8]) -> E::SignatureGroup,
{
    if publickeys.len() != messages.len() {
        return false;
    }
    let points = messages
        .iter()
        .map(|message| hash(&tagged(APPLICATION_DOMAIN, message.as_ref())))
        .collect();
    verify_aggregate_points(aggregated, publickeys, points)
}

/// Check a batch of independent multi-signatures with one pairing-product
/// equation.
///
/// We sum all the aggregate signatures, sum each entry's key set into one
/// effective key, and reduce to [`verify_aggregate_signature`].  This
/// exists purely as a performance optimization over checking each entry
/// with [`verify_multi_signature`], amortizing `O(sum of set sizes)`
/// pairings down to one batched equation, and carries the same
/// pre-authentication precondition for every key in every set.
pub fn verify_batch_multi_signature<E: CurveSystem, M: AsRef<[u8]>>(
    aggregated: &[Signature<E>],
    publickey_sets: &[Vec<PublicKey<E>>],
    messages: &[M],
) -> bool {
    if aggregated.len() != publickey_sets.len() || aggregated.len() != messages.len() {
        return false;
    }
    let signature = Signature::aggregate(aggregated);
    let effective: Vec<PublicKey<E>> = publickey_sets
        .iter()
        .map(|set| PublicKey::aggregate(set))
        .collect();
    verify_aggregate_signature(&signature, &effective, messages)
}

/// Check a multi-signature in which some signers' signatures were summed
/// into the aggregate more than once.
///
/// `multiplicity[i]` records how many times key `i`'s signature was
/// counted.  By bilinearity, pairing against `m * key` matches an `m`-fold
/// summed signature, so we scale each key by its count and reuse the plain
/// multi-signature path.  A count of zero drops that signer's
/// contribution.  `None` behaves exactly like [`verify_multi_signature`];
/// a vector of the wrong length fails closed.
pub fn verify_multi_signature_with_multiplicity<E: CurveSystem>(
    aggregated: &Signature<E>,
    publickeys: &[PublicKey<E>],
    multiplicity: Option<&[u64]>,
    message: &[u8],
) -> bool {
    let multiplicity = match multiplicity {
        None => return verify_multi_signature(aggregated, publickeys, message),
        Some(counts) => counts,
    };
    if publickeys.len() != multiplicity.len() {
        return false;
    }
    let factors: Vec<E::Scalar> = multiplicity
        .iter()
        .map(|count| E::Scalar::from(*count))
        .collect();
    let scaled = scale_keys(publickeys, &factors);
    verify_multi_signature(aggregated, &scaled, message)
}

/// Check a multi-signature together with the signers' authentications.
///
/// For callers without a key-registration phase, this closes the gap
/// between "caller forgot to authenticate" and "protocol is unsafe".
/// Because each authentication signs a distinct message, its own key, one
/// aggregate pairing-product equation checks them all, so the whole call
/// costs two pairing checks regardless of the number of signers.
pub fn verify_multi_signature_with_authentications<E: CurveSystem>(
    aggregated: &Signature<E>,
    publickeys: &[PublicKey<E>],
    authentications: &[Authentication<E>],
    message: &[u8],
) -> bool {
    if publickeys.len() != authentications.len() {
        return false;
    }
    let combined = Authentication::aggregate(authentications);
    let points = publickeys
        .iter()
        .map(|publickey| {
            E::hash_to_signature_curve(&tagged(AUTHENTICATION_DOMAIN, &publickey.to_bytes()))
        })
        .collect();
    if !verify_aggregate_points(&combined.0, publickeys, points) {
        return false;
    }
    verify_multi_signature(aggregated, publickeys, message)
}

/// A claim that the listed keys jointly signed one message.
///
/// Constructed by an aggregator, consumed by verifiers through
/// [`MultiSig::verify`].  Vulnerable to the rogue public-key attack if the
/// keys have not been authenticated.
pub struct MultiSig<E: CurveSystem> {
    signature: Signature<E>,
    publickeys: Vec<PublicKey<E>>,
    message: Vec<u8>,
}

impl<E: CurveSystem> Clone for MultiSig<E> {
    fn clone(&self) -> Self {
        MultiSig {
            signature: self.signature,
            publickeys: self.publickeys.clone(),
            message: self.message.clone(),
        }
    }
}

impl<E: CurveSystem> core::fmt::Debug for MultiSig<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("MultiSig")
            .field("signature", &self.signature)
            .field("publickeys", &self.publickeys)
            .field("message", &self.message)
            .finish()
    }
}

impl<E: CurveSystem> MultiSig<E> {
    pub fn new(
        signature: Signature<E>,
        publickeys: Vec<PublicKey<E>>,
        message: Vec<u8>,
    ) -> MultiSig<E> {
        MultiSig {
            signature,
            publickeys,
            message,
        }
    }

    pub fn signature(&self) -> &Signature<E> {
        &self.signature
    }

    pub fn publickeys(&self) -> &[PublicKey<E>] {
        &self.publickeys
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Check that the message has been signed by all listed keys.
    pub fn verify(&self) -> bool {
        verify_multi_signature(&self.signature, &self.publickeys, &self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CurveSystem, TinyZBLS, ZBLS};

    use rand::{thread_rng, Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn keypairs<E: CurveSystem>(n: usize) -> Vec<Keypair<E>> {
        let mut rng = thread_rng();
        (0..n).map(|_| Keypair::generate(&mut rng)).collect()
    }

    #[test]
    fn authentication_round_trip() {
        let keypair = Keypair::<ZBLS>::generate(&mut thread_rng());
        let authentication = keypair.authenticate();
        assert_eq!(authentication, keypair.secret.authenticate());
        assert!(keypair.public.check_authentication(&authentication));

        let stranger = Keypair::<ZBLS>::generate(&mut thread_rng());
        assert!(!stranger.public.check_authentication(&authentication));
    }

    #[test]
    fn single_signature_round_trip() {
        let keypair = Keypair::<ZBLS>::generate(&mut thread_rng());
        let signature = keypair.sign(b"test message");
        assert!(verify_single_signature(
            &keypair.public,
            b"test message",
            &signature
        ));
        assert!(!verify_single_signature(
            &keypair.public,
            b"wrong message",
            &signature
        ));

        let stranger = Keypair::<ZBLS>::generate(&mut thread_rng());
        assert!(!verify_single_signature(
            &stranger.public,
            b"test message",
            &signature
        ));
    }

    #[test]
    fn cross_domain_reuse_always_fails() {
        let keypair = Keypair::<ZBLS>::generate(&mut thread_rng());
        let encoding = keypair.public.to_bytes();

        // An authentication is not an application signature on the key
        // encoding, and an application signature on the key encoding is
        // not an authentication.
        let authentication = keypair.authenticate();
        let lookalike = keypair.sign(&encoding);
        assert_ne!(authentication.0, lookalike);
        assert!(!verify_single_signature(
            &keypair.public,
            &encoding,
            &authentication.0
        ));
        assert!(!keypair
            .public
            .check_authentication(&Authentication(lookalike)));
    }

    #[test]
    fn multi_signature_common_message() {
        let signers = keypairs::<ZBLS>(5);
        let message = b"five signers, one message";
        let signatures: Vec<_> = signers.iter().map(|kp| kp.sign(message)).collect();
        let publickeys: Vec<_> = signers.iter().map(|kp| kp.public).collect();
        let aggregated = Signature::aggregate(&signatures);

        assert!(verify_multi_signature(&aggregated, &publickeys, message));
        assert!(MultiSig::new(aggregated, publickeys.clone(), message.to_vec()).verify());

        let mut flipped = message.to_vec();
        flipped[0] ^= 1;
        assert!(!verify_multi_signature(&aggregated, &publickeys, &flipped));

        let mut substituted = publickeys.clone();
        substituted[2] = Keypair::<ZBLS>::generate(&mut thread_rng()).public;
        assert!(!verify_multi_signature(&aggregated, &substituted, message));
    }

    #[test]
    fn aggregate_signature_distinct_messages() {
        let signers = keypairs::<ZBLS>(4);
        let messages: Vec<Vec<u8>> = (0..4).map(|i| format!("message {}", i).into_bytes()).collect();
        let signatures: Vec<_> = signers
            .iter()
            .zip(&messages)
            .map(|(kp, message)| kp.sign(message))
            .collect();
        let publickeys: Vec<_> = signers.iter().map(|kp| kp.public).collect();
        let aggregated = Signature::aggregate(&signatures);

        assert!(verify_aggregate_signature(
            &aggregated,
            &publickeys,
            &messages
        ));

        // Swapping two messages between keys breaks the association.
        let mut swapped = messages.clone();
        swapped.swap(0, 1);
        assert!(!verify_aggregate_signature(
            &aggregated,
            &publickeys,
            &swapped
        ));

        assert!(!verify_aggregate_signature(
            &aggregated,
            &publickeys,
            &messages[..3]
        ));
    }

    #[test]
    fn batch_multi_signature_matches_individual_checks() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let mut aggregated = Vec::new();
        let mut publickey_sets = Vec::new();
        let mut messages = Vec::new();
        for (entry, size) in [3usize, 1, 5].iter().enumerate() {
            let signers: Vec<Keypair<ZBLS>> =
                (0..*size).map(|_| Keypair::generate(&mut rng)).collect();
            let message = format!("batch entry {}", entry).into_bytes();
            let signatures: Vec<_> = signers.iter().map(|kp| kp.sign(&message)).collect();
            aggregated.push(Signature::aggregate(&signatures));
            publickey_sets.push(signers.iter().map(|kp| kp.public).collect::<Vec<_>>());
            messages.push(message);
        }

        for (i, signature) in aggregated.iter().enumerate() {
            assert!(verify_multi_signature(
                signature,
                &publickey_sets[i],
                &messages[i]
            ));
        }
        assert!(verify_batch_multi_signature(
            &aggregated,
            &publickey_sets,
            &messages
        ));

        // One corrupted entry fails the whole batch.
        let mut corrupted = aggregated.clone();
        corrupted[1] = corrupted[0];
        assert!(!verify_batch_multi_signature(
            &corrupted,
            &publickey_sets,
            &messages
        ));

        assert!(!verify_batch_multi_signature(
            &aggregated[..2],
            &publickey_sets,
            &messages
        ));
    }

    #[test]
    fn multiplicity_matches_duplicated_aggregation() {
        let signers = keypairs::<ZBLS>(2);
        let message = b"weighted voting";
        let publickeys: Vec<_> = signers.iter().map(|kp| kp.public).collect();

        // Signer 1's signature lands in the aggregate three times.
        let s0 = signers[0].sign(message);
        let s1 = signers[1].sign(message);
        let aggregated = Signature::aggregate(&[s0, s1, s1, s1]);

        assert!(verify_multi_signature_with_multiplicity(
            &aggregated,
            &publickeys,
            Some(&[1, 3]),
            message
        ));
        assert!(!verify_multi_signature_with_multiplicity(
            &aggregated,
            &publickeys,
            Some(&[1, 2]),
            message
        ));
        assert!(!verify_multi_signature_with_multiplicity(
            &aggregated,
            &publickeys,
            Some(&[1, 4]),
            message
        ));

        // Pre-scaling the key and verifying without multiplicities must
        // agree with the weighted check.
        let scaled = [
            publickeys[0],
            scale_keys(&publickeys[1..], &[<ZBLS as CurveSystem>::Scalar::from(3u64)])[0],
        ];
        assert!(verify_multi_signature_with_multiplicity(
            &aggregated,
            &scaled,
            None,
            message
        ));

        // Zero drops a signer: an aggregate missing signer 1 verifies
        // with multiplicity zero for it.
        let solo = Signature::aggregate(&[s0]);
        assert!(verify_multi_signature_with_multiplicity(
            &solo,
            &publickeys,
            Some(&[1, 0]),
            message
        ));

        assert!(!verify_multi_signature_with_multiplicity(
            &aggregated,
            &publickeys,
            Some(&[1]),
            message
        ));
    }

    #[test]
    fn combined_authentication_check() {
        let signers = keypairs::<ZBLS>(3);
        let message = b"registered and signed";
        let signatures: Vec<_> = signers.iter().map(|kp| kp.sign(message)).collect();
        let publickeys: Vec<_> = signers.iter().map(|kp| kp.public).collect();
        let authentications: Vec<_> = signers.iter().map(|kp| kp.authenticate()).collect();
        let aggregated = Signature::aggregate(&signatures);

        assert!(verify_multi_signature_with_authentications(
            &aggregated,
            &publickeys,
            &authentications,
            message
        ));

        // A valid multi-signature with one bad authentication still fails.
        let mut tampered = authentications.clone();
        tampered[1] = Keypair::<ZBLS>::generate(&mut thread_rng()).authenticate();
        assert!(verify_multi_signature(&aggregated, &publickeys, message));
        assert!(!verify_multi_signature_with_authentications(
            &aggregated,
            &publickeys,
            &tampered,
            message
        ));

        assert!(!verify_multi_signature_with_authentications(
            &aggregated,
            &publickeys,
            &authentications[..2],
            message
        ));
    }

    #[test]
    fn custom_hasher_must_match_on_both_sides() {
        let custom = |message: &[u8]| {
            ZBLS::hash_to_signature_curve(&[b"custom suite" as &[u8], message].concat())
        };
        let keypair = Keypair::<ZBLS>::generate(&mut thread_rng());

        let signature = keypair.secret.sign_with_hasher(b"payload", custom);
        assert!(verify_single_signature_with_hasher(
            &keypair.public,
            b"payload",
            &signature,
            custom
        ));
        assert!(!verify_single_signature(
            &keypair.public,
            b"payload",
            &signature
        ));

        let authentication = keypair.secret.authenticate_with_hasher(custom);
        assert!(keypair
            .public
            .check_authentication_with_hasher(&authentication, custom));
        assert!(!keypair.public.check_authentication(&authentication));
    }

    #[test]
    fn empty_aggregate_is_vacuously_valid() {
        let aggregated = Signature::<ZBLS>::aggregate(&[]);
        let no_keys: [PublicKey<ZBLS>; 0] = [];
        assert!(verify_multi_signature(&aggregated, &no_keys, b"anything"));

        // But a real signature never verifies against no keys.
        let keypair = Keypair::<ZBLS>::generate(&mut thread_rng());
        let signature = keypair.sign(b"anything");
        assert!(!verify_multi_signature(&signature, &no_keys, b"anything"));
    }

    #[test]
    fn transposed_engine_round_trip() {
        let mut rng = thread_rng();
        let signers: Vec<Keypair<TinyZBLS>> =
            (0..3).map(|_| Keypair::generate(&mut rng)).collect();
        let message = b"tiny signatures";
        let signatures: Vec<_> = signers.iter().map(|kp| kp.sign(message)).collect();
        let publickeys: Vec<_> = signers.iter().map(|kp| kp.public).collect();
        let aggregated = Signature::aggregate(&signatures);

        for (keypair, authentication) in signers.iter().map(|kp| (kp, kp.authenticate())) {
            assert!(keypair.public.check_authentication(&authentication));
        }
        assert!(verify_multi_signature(&aggregated, &publickeys, message));

        let mut tampered = message.to_vec();
        let flip: u8 = thread_rng().gen_range(1..=u8::MAX);
        tampered[0] ^= flip;
        assert!(!verify_multi_signature(&aggregated, &publickeys, &tampered));
    }
}
