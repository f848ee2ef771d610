//! ## Pairing-product checks shared by all verification entry points.
//!
//! Routines here take message points already hashed to the signature
//! curve.  Domain tagging happens above, in `kosk`, so that no code path
//! can reach a pairing check with an untagged message.
//!
//! We batch normalize projective points before preparing them for the
//! Miller loop, since keys and aggregate signatures usually arrive fresh
//! from algebraic operations.  We deliberately do not merge duplicate
//! signers: the knowledge-of-secret-key layer counts duplicates through
//! multiplicities instead.

use ark_ec::CurveGroup;

use crate::engine::CurveSystem;
use crate::single::{PublicKey, Signature};

/// Check `e(generator, signature) == prod_i e(publickeys[i], message_points[i])`.
///
/// The minimum number of pairings is one per listed key, which we achieve
/// here with a single Miller loop and final exponentiation.  Fails closed
/// on a length mismatch.
pub fn verify_aggregate_points<E: CurveSystem>(
    signature: &Signature<E>,
    publickeys: &[PublicKey<E>],
    message_points: Vec<E::SignatureGroup>,
) -> bool {
    if publickeys.len() != message_points.len() {
        return false;
    }

    let publickeys: Vec<_> = publickeys.iter().map(|publickey| publickey.0).collect();
    let publickeys = E::PublicKeyGroup::normalize_batch(&publickeys);

    // Normalize the signature together with the message points.
    let mut message_points = message_points;
    message_points.push(signature.0);
    let mut message_points = E::SignatureGroup::normalize_batch(&message_points);
    let signature = E::prepare_signature(
        message_points
            .pop()
            .expect("message_points contains at least the signature"),
    );

    let prepared = publickeys
        .into_iter()
        .zip(message_points)
        .map(|(publickey, point)| (E::prepare_public_key(publickey), E::prepare_signature(point)));
    E::verify_prepared(signature, prepared)
}

/// Check one aggregate signature over one message point and many keys.
///
/// Bilinearity collapses the per-key pairings into a single pairing
/// against the group-sum of the keys.
pub fn verify_multi_point<E: CurveSystem>(
    signature: &Signature<E>,
    publickeys: &[PublicKey<E>],
    message_point: E::SignatureGroup,
) -> bool {
    let effective = PublicKey::aggregate(publickeys);
    verify_aggregate_points(signature, &[effective], vec![message_point])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CurveSystem, ZBLS};
    use crate::single::Keypair;

    use rand::thread_rng;

    #[test]
    fn raw_equation_accepts_scalar_multiples_only() {
        let mut rng = thread_rng();
        let keypair = Keypair::<ZBLS>::generate(&mut rng);
        let point = ZBLS::hash_to_signature_curve(b"raw equation");
        let signature = Signature::<ZBLS>(point * keypair.secret.0);

        assert!(verify_aggregate_points(
            &signature,
            &[keypair.public],
            vec![point]
        ));

        let other = ZBLS::hash_to_signature_curve(b"some other point");
        assert!(!verify_aggregate_points(
            &signature,
            &[keypair.public],
            vec![other]
        ));
    }

    #[test]
    fn length_mismatch_fails_closed() {
        let mut rng = thread_rng();
        let keypair = Keypair::<ZBLS>::generate(&mut rng);
        let point = ZBLS::hash_to_signature_curve(b"mismatch");
        let signature = Signature::<ZBLS>(point * keypair.secret.0);
        assert!(!verify_aggregate_points(
            &signature,
            &[keypair.public],
            vec![point, point]
        ));
        assert!(!verify_aggregate_points(&signature, &[keypair.public], vec![]));
    }
}
