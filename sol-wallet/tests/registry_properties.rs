//! Registry invariants under arbitrary selection sequences.

use std::sync::Arc;

use proptest::prelude::*;
use sol_crypto::PublicKey;
use sol_store::MemoryStore;
use sol_wallet::{AccountKind, AccountRegistry};

#[derive(Debug, Clone)]
enum Action {
    Select(usize),
    Attach(u8),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => (0usize..8).prop_map(Action::Select),
        1 => any::<u8>().prop_map(Action::Attach),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn hardware_slot_is_unique_and_last(actions in prop::collection::vec(action(), 0..24)) {
        let store = Arc::new(MemoryStore::new());
        let mut registry = AccountRegistry::load(store.clone()).unwrap();

        for action in actions {
            let before = registry.len();
            match action {
                Action::Select(index) => {
                    registry.select(index, None).unwrap();
                }
                Action::Attach(byte) => {
                    registry.select(0, Some(PublicKey::new([byte; 32]))).unwrap();
                }
            }
            // never shrinks, grows by at most one
            prop_assert!(registry.len() == before || registry.len() == before + 1);

            let kinds: Vec<_> = (0..registry.len()).filter_map(|i| registry.kind_of(i)).collect();
            prop_assert_eq!(kinds.len(), registry.len());
            let hardware = kinds.iter().filter(|k| **k == AccountKind::Hardware).count();
            prop_assert!(hardware <= 1);
            if hardware == 1 {
                prop_assert_eq!(kinds.last(), Some(&AccountKind::Hardware));
            }
            prop_assert!(registry.selected() < registry.len());
        }

        let reloaded = AccountRegistry::load(store).unwrap();
        prop_assert_eq!(reloaded.len(), registry.len());
        prop_assert_eq!(reloaded.selected(), registry.selected());
        prop_assert_eq!(reloaded.hardware_key(), registry.hardware_key());
    }
}
