//! Property tests for hierarchical derivation
//!
//! - derivation is deterministic for a fixed seed and path
//! - distinct account paths yield distinct public keys
//! - derived keys sign messages that verify under the derived public key

use proptest::prelude::*;
use sol_crypto::{derive_keypair, derive_public_key, DerivationPath};

fn seed_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 16..=64)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn derivation_is_deterministic(seed in seed_strategy(), account in 0u32..1_000, change in 0u32..4) {
        let path = DerivationPath::solana(Some(account), Some(change)).unwrap();
        let a = derive_keypair(&seed, &path).unwrap();
        let b = derive_keypair(&seed, &path).unwrap();
        prop_assert_eq!(a.public_key(), b.public_key());
        prop_assert_eq!(*a.secret_bytes(), *b.secret_bytes());
    }

    #[test]
    fn distinct_paths_distinct_keys(seed in seed_strategy(), a in 0u32..10_000, b in 0u32..10_000) {
        prop_assume!(a != b);
        let key_a = derive_public_key(&seed, &DerivationPath::for_account(a).unwrap()).unwrap();
        let key_b = derive_public_key(&seed, &DerivationPath::for_account(b).unwrap()).unwrap();
        prop_assert_ne!(key_a, key_b);
    }

    #[test]
    fn path_depth_changes_key(seed in seed_strategy(), account in 0u32..1_000) {
        let shallow = derive_public_key(&seed, &DerivationPath::solana(Some(account), None).unwrap()).unwrap();
        let deep = derive_public_key(&seed, &DerivationPath::solana(Some(account), Some(0)).unwrap()).unwrap();
        prop_assert_ne!(shallow, deep);
    }

    #[test]
    fn derived_keys_sign(seed in seed_strategy(), message in prop::collection::vec(any::<u8>(), 0..512)) {
        let keypair = derive_keypair(&seed, &DerivationPath::for_account(0).unwrap()).unwrap();
        let signature = keypair.sign(&message);
        prop_assert!(signature.verify(&keypair.public_key(), &message));
    }
}
