use banquet_structs::core::*;
use serde_json::json;

fn sample_group() -> Group {
    serde_json::from_value(json!({
        "name": "lunch",
        "satiety": { "target": 12, "exact_match_reward": true, "reward_percent": 20.0, "penalty_percent": 5.0 },
        "intents": [[1], [], [2]],
        "materials": [
            { "id": 1, "quantity": 40, "category": "meat" },
            { "id": 2, "category": "fish", "addition": 0.1 }
        ],
        "agents": [{
            "id": 7,
            "rarity": 4,
            "skills": [10, 0, 5, 0, 0, 0],
            "ultimate_effects": [{
                "kind": { "price": { "skill": "stirfry" } },
                "calc": "percent",
                "value": 20.0,
                "scope": "partial",
                "condition": { "kind": "rank", "value": 3 }
            }]
        }],
        "items": [{
            "id": 3,
            "rarity": 2,
            "price": 100.0,
            "requirements": [2, 0, 1, 0, 0, 0],
            "ingredients": [{ "material": 1, "amount": 2 }, { "material": 2, "amount": 1 }],
            "flavor": "spicy",
            "limit": 30
        }]
    }))
    .unwrap()
}

#[test]
fn test_group_deserializes_with_defaults() {
    let group = sample_group();
    assert!(group.satiety_scored());
    assert_eq!(group.slot_count(), 3);
    assert!(group.agents[0].owned);
    assert_eq!(group.agents[0].ultimate_effects[0].scope, Scope::Partial);
    assert_eq!(
        group.agents[0].ultimate_effects[0].condition,
        Condition::Rank(3)
    );
    assert_eq!(group.materials[1].quantity, None);
    assert_eq!(group.modifiers.multiply, 0.0);
    assert!(!group.toggles.disable_skill_rank);
}

#[test]
fn test_slot_count_follows_intents_only_with_satiety() {
    let mut group = sample_group();
    group.intents = vec![vec![1], vec![2]];
    assert_eq!(group.slot_count(), 2);

    group.satiety.target = 0;
    assert_eq!(group.slot_count(), DEFAULT_SLOT_COUNT);

    group.satiety.target = 12;
    group.intents.clear();
    assert_eq!(group.slot_count(), DEFAULT_SLOT_COUNT);
}

#[test]
fn test_prepare_fills_item_targets() {
    let mut group = sample_group();
    assert_eq!(group.items[0].targets, 0);
    group.prepare();
    let item = &group.items[0];
    assert!(item.accepts(PriceTarget::Any));
    assert!(item.accepts(PriceTarget::Skill(Skill::Stirfry)));
    assert!(item.accepts(PriceTarget::Skill(Skill::Knife)));
    assert!(!item.accepts(PriceTarget::Skill(Skill::Boil)));
    assert!(item.accepts(PriceTarget::Flavor(Flavor::Spicy)));
    assert!(!item.accepts(PriceTarget::Flavor(Flavor::Sweet)));
    assert!(item.accepts(PriceTarget::Category(MaterialCategory::Meat)));
    assert!(item.accepts(PriceTarget::Category(MaterialCategory::Fish)));
    assert!(!item.accepts(PriceTarget::Category(MaterialCategory::Vegetable)));
}

#[test]
fn test_price_target_bits_are_distinct() {
    let mut targets = vec![PriceTarget::Any];
    targets.extend(Skill::ALL.iter().map(|s| PriceTarget::Skill(*s)));
    for flavor in [
        Flavor::Sweet,
        Flavor::Sour,
        Flavor::Spicy,
        Flavor::Salty,
        Flavor::Bitter,
        Flavor::Tasty,
    ] {
        targets.push(PriceTarget::Flavor(flavor));
    }
    for category in [
        MaterialCategory::Fish,
        MaterialCategory::Creation,
        MaterialCategory::Meat,
        MaterialCategory::Vegetable,
    ] {
        targets.push(PriceTarget::Category(category));
    }
    let mut seen = 0u32;
    for target in targets {
        assert_eq!(seen & target.bit(), 0);
        seen |= target.bit();
    }
}

#[test]
fn test_validate_rejects_duplicate_items() {
    let mut group = sample_group();
    assert!(group.validate().is_ok());
    let copy = group.items[0].clone();
    group.items.push(copy);
    let contest = Contest {
        groups: vec![group],
        catalog: IntentCatalog::default(),
    };
    assert!(contest.validate().is_err());
}

#[test]
fn test_disk_active_effects_follow_level() {
    let effect = Effect::new(EffectKind::Skill(Skill::Fry), Calc::Abs, 10.0);
    let mut disk = Disk {
        level: 0,
        sockets: vec![DiskSocket {
            levels: vec![vec![], vec![effect.clone()]],
        }],
    };
    assert_eq!(disk.active_effects().count(), 0);
    disk.level = 2;
    let active: Vec<&[Effect]> = disk.active_effects().collect();
    assert_eq!(active, vec![&[effect][..]]);
    disk.level = 3;
    assert_eq!(disk.active_effects().count(), 0);
}

#[test]
fn test_intent_catalog_lookup() {
    let catalog: IntentCatalog = serde_json::from_value(json!({
        "intents": {
            "1": { "id": 1, "condition": { "kind": "group", "value": "boil" }, "effect": { "kind": "createBuff", "value": 9 } }
        },
        "buffs": {
            "9": { "id": 9, "condition": { "kind": "always" }, "effect": { "kind": "pricePercent", "value": 15.0 }, "from_buff": true, "last_rounds": 2 }
        }
    }))
    .unwrap();
    assert_eq!(
        catalog.intent(1).map(|i| i.effect),
        Some(IntentEffect::CreateBuff(9))
    );
    assert_eq!(catalog.buff(9).map(|b| b.last_rounds), Some(2));
    assert!(catalog.intent(9).is_none());
}
