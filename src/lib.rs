//! # Aggregate BLS signatures hardened against rogue public keys
//!
//! Boneh-Lynn-Shacham signatures aggregate beautifully: summing any set
//! of signatures yields one group element checkable against the signers'
//! public keys with a single pairing-product equation.  The catch is the
//! rogue public-key attack, in which an adversary publishes a key of the
//! form `pkA = -pk1 + x g` and thereby forges "aggregate" signatures
//! implicating `pk1` without its owner ever signing.
//!
//! This crate takes the knowledge-of-secret-key (Kosk) route: every
//! signer must publish an [`Authentication`], a BLS signature over their
//! own public key's encoding, before their key is trusted in aggregates.
//! A rogue key's owner cannot produce one, because doing so would require
//! the discrete logarithm of `pkA`.  Authentications and ordinary
//! signatures hash into disjoint domains, separated by a one-byte prefix,
//! so no application signature can double as an authentication or vice
//! versa.  See the [`kosk`] module docs for why that separation is
//! load-bearing.
//!
//! Verification entry points never return errors: bad lengths, identity
//! inputs, and failed pairing equations all come back as a plain `false`.
//! Decoding untrusted bytes is the only fallible surface, reported as
//! [`KoskError`].
//!
//! The curve and the assignment of keys and signatures to the two pairing
//! groups are both pluggable through [`CurveSystem`].  [`ZBLS`] puts
//! public keys in BLS12-381's compact `G1` and signatures in `G2`, which
//! suits protocols where keys travel more than signatures.  [`TinyZBLS`]
//! transposes the groups for 48-byte signatures.
//!
//! ```rust
//! use bls_kosk::{Keypair, Signature, ZBLS, verify_multi_signature};
//!
//! let mut rng = rand::thread_rng();
//! let alice = Keypair::<ZBLS>::generate(&mut rng);
//! let bob = Keypair::<ZBLS>::generate(&mut rng);
//!
//! // Key registration: check authentications before trusting aggregates.
//! assert!(alice.public.check_authentication(&alice.authenticate()));
//! assert!(bob.public.check_authentication(&bob.authenticate()));
//!
//! let message = b"the vault opens at dawn";
//! let aggregated = Signature::aggregate(&[alice.sign(message), bob.sign(message)]);
//! assert!(verify_multi_signature(&aggregated, &[alice.public, bob.public], message));
//! ```

pub mod engine;
pub mod errors;
pub mod kosk;
pub mod single;
pub mod verifiers;

pub use engine::{CurveExtraConfig, CurveSystem, TinyBLS, TinyZBLS, UsualBLS, ZBLS};
pub use errors::KoskError;
pub use kosk::{
    verify_aggregate_signature, verify_aggregate_signature_with_hasher,
    verify_batch_multi_signature, verify_multi_signature,
    verify_multi_signature_with_authentications, verify_multi_signature_with_hasher,
    verify_multi_signature_with_multiplicity, verify_single_signature,
    verify_single_signature_with_hasher, MultiSig, APPLICATION_DOMAIN, AUTHENTICATION_DOMAIN,
};
pub use single::{scale_keys, Authentication, Keypair, PublicKey, SecretKey, Signature};
