//! Intent construction properties: determinism and publish pairing

use proptest::prelude::*;
use suiforge::intent::{
    build_move_call, build_publish, sanity_check_publish_pairing, CallArg, Command, MoveTarget,
    StepResult,
};
use suiforge::types::SuiAddress;

fn addr(c: char) -> SuiAddress {
    SuiAddress::parse(&format!("0x{}", c.to_string().repeat(64))).unwrap()
}

fn mint_intent(
    name: &str,
    description: &str,
    image_url: &str,
    level: u64,
    power: u64,
    rarity: u8,
    gas_budget: Option<u64>,
) -> suiforge::TransactionIntent {
    let target = MoveTarget::new(addr('b'), "basic_nft", "mint_game_nft").unwrap();
    build_move_call(
        addr('a'),
        target,
        vec![
            CallArg::str(name),
            CallArg::str(description),
            CallArg::str(image_url),
            CallArg::u64(level),
            CallArg::u64(power),
            CallArg::u8_checked(rarity as u64).unwrap(),
        ],
        gas_budget,
    )
    .unwrap()
}

proptest! {
    /// Identical logical parameters produce byte-identical intents.
    #[test]
    fn mint_intents_are_deterministic(
        name in ".{0,40}",
        description in ".{0,80}",
        image_url in "[a-z]{1,20}",
        level in 0u64..1_000,
        power in 0u64..1_000_000,
        rarity in 1u8..=4,
        gas in proptest::option::of(1_000u64..100_000_000),
    ) {
        let first = mint_intent(&name, &description, &image_url, level, power, rarity, gas);
        let second = mint_intent(&name, &description, &image_url, level, power, rarity, gas);
        prop_assert_eq!(first.canonical_bytes(), second.canonical_bytes());
    }

    /// Changing any parameter changes the encoding.
    #[test]
    fn mint_encoding_tracks_parameters(
        power in 0u64..1_000_000,
    ) {
        let base = mint_intent("Hero", "desc", "url", 1, power, 4, None);
        let other = mint_intent("Hero", "desc", "url", 1, power + 1, 4, None);
        prop_assert_ne!(base.canonical_bytes(), other.canonical_bytes());
    }

    /// Every publish intent carries the capability transfer, whatever the
    /// module bytes and dependency list look like.
    #[test]
    fn publish_always_pairs_capability_transfer(
        modules in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 1..64),
            1..4,
        ),
        dep_count in 0usize..3,
    ) {
        let deps = (0..dep_count)
            .map(|i| SuiAddress::parse(&format!("0x{}", i + 1)).unwrap())
            .collect();
        let intent = build_publish(addr('a'), modules, deps, Some(50_000_000)).unwrap();

        prop_assert!(intent.is_publish());
        prop_assert!(sanity_check_publish_pairing(&intent).is_ok());

        // The transfer directly follows the publish and routes result 0
        // back to the sender.
        match &intent.commands()[1] {
            Command::TransferObjects { objects, recipient } => {
                prop_assert_eq!(objects, &vec![StepResult(0)]);
                prop_assert_eq!(recipient, intent.sender());
            }
            other => prop_assert!(false, "expected TransferObjects, got {:?}", other),
        }
    }

    /// Publish encoding is deterministic too.
    #[test]
    fn publish_intents_are_deterministic(
        module in proptest::collection::vec(any::<u8>(), 1..128),
    ) {
        let first = build_publish(addr('a'), vec![module.clone()], vec![], None).unwrap();
        let second = build_publish(addr('a'), vec![module], vec![], None).unwrap();
        prop_assert_eq!(first.canonical_bytes(), second.canonical_bytes());
    }
}

#[test]
fn publish_with_no_modules_is_a_validation_error() {
    let result = build_publish(addr('a'), vec![], vec![], None);
    assert!(matches!(
        result,
        Err(suiforge::IntentError::EmptyModules)
    ));
}
