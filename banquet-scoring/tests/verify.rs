use banquet_scoring::{
    generate::{generate_contest, GenerateParams},
    verify_grid, AgentIdx, Grid, ItemIdx, ItemPick, SlotState,
};
use banquet_structs::core::{Agent, Contest, Disk, Group, Ingredient, IntentCatalog, Item, Material};

fn agent(id: u32) -> Agent {
    Agent {
        id,
        name: String::new(),
        rarity: 2,
        addition: 0.0,
        skills: [10, 10, 0, 0, 0, 0],
        tags: Vec::new(),
        special_effects: Vec::new(),
        ultimate_effects: Vec::new(),
        equipment: None,
        disk: Disk::default(),
        owned: true,
    }
}

fn item(id: u32, requirement: u32) -> Item {
    Item {
        id,
        name: String::new(),
        rarity: 1,
        price: 20.0,
        requirements: [requirement, 0, 0, 0, 0, 0],
        ingredients: vec![Ingredient {
            material: 1,
            amount: 2,
        }],
        flavor: None,
        tags: Vec::new(),
        limit: 4,
        addition: 0.0,
        activity_addition: 0.0,
        ultimate_addition: 0.0,
        owned: true,
        targets: 0,
    }
}

fn contest() -> Contest {
    let group = Group {
        agents: vec![agent(1), agent(2)],
        items: vec![item(1, 5), item(2, 5), item(3, 50)],
        materials: vec![Material {
            id: 1,
            quantity: Some(10),
            category: None,
            addition: 0.0,
        }],
        ..Default::default()
    };
    let mut contest = Contest {
        groups: vec![group.clone(), group],
        catalog: IntentCatalog::default(),
    };
    contest.prepare();
    contest
}

fn single(agent: usize, item: usize, quantity: u32) -> SlotState {
    SlotState {
        agent: Some(AgentIdx::new(agent)),
        items: [
            Some(ItemPick {
                item: ItemIdx::new(item),
                quantity,
            }),
            None,
            None,
        ],
    }
}

#[test]
fn test_accepts_legal_grid() {
    let contest = contest();
    let mut grid = Grid::empty(&contest);
    grid.groups[0][0] = single(0, 0, 4);
    grid.groups[1][0] = single(1, 1, 1);
    assert!(verify_grid(&contest, &grid).is_ok());
}

#[test]
fn test_rejects_agent_used_in_two_groups() {
    let contest = contest();
    let mut grid = Grid::empty(&contest);
    grid.groups[0][0] = single(0, 0, 1);
    grid.groups[1][0] = single(0, 1, 1);
    let err = verify_grid(&contest, &grid).unwrap_err();
    assert_eq!(err.to_string(), "Agent 1 is assigned more than once");
}

#[test]
fn test_rejects_item_used_twice() {
    let contest = contest();
    let mut grid = Grid::empty(&contest);
    grid.groups[0][0] = single(0, 0, 1);
    grid.groups[1][0] = single(1, 0, 1);
    let err = verify_grid(&contest, &grid).unwrap_err();
    assert_eq!(err.to_string(), "Item 1 is assigned more than once");
}

#[test]
fn test_rejects_incapable_agent() {
    let contest = contest();
    let mut grid = Grid::empty(&contest);
    grid.groups[0][0] = single(0, 2, 1);
    let err = verify_grid(&contest, &grid).unwrap_err();
    assert_eq!(err.to_string(), "Agent 1 cannot perform item 3");
}

#[test]
fn test_rejects_quantity_above_bound() {
    let contest = contest();
    let mut grid = Grid::empty(&contest);
    grid.groups[0][0] = single(0, 0, 4);
    grid.groups[0][1] = single(1, 1, 2);
    assert!(verify_grid(&contest, &grid).is_err());
}

#[test]
fn test_rejects_unowned_agent() {
    let mut contest = contest();
    contest.groups[0].agents[1].owned = false;
    let mut grid = Grid::empty(&contest);
    grid.groups[0][0] = single(1, 0, 1);
    let err = verify_grid(&contest, &grid).unwrap_err();
    assert_eq!(err.to_string(), "Agent 2 is not owned");
}

#[test]
fn test_assignment_conversion_keeps_grid() {
    let contest = contest();
    let mut grid = Grid::empty(&contest);
    grid.groups[0][2] = single(1, 1, 3);
    let assignment = grid.to_assignment(&contest, &[]);
    assert_eq!(assignment.agent_count(), 1);
    assert_eq!(Grid::from_assignment(&contest, &assignment).unwrap(), grid);
}

#[test]
fn test_generated_contest_is_deterministic() {
    let params = GenerateParams {
        with_intents: true,
        ..Default::default()
    };
    let a = generate_contest([7; 32], &params);
    let b = generate_contest([7; 32], &params);
    assert_eq!(a, b);
    assert_eq!(a.groups.len(), 2);
    assert!(a.validate().is_ok());
    assert!(verify_grid(&a, &Grid::empty(&a)).is_ok());
}
