//! Integration tests for robot assemblies, the verifier and the catalog.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test assembly_integration
//! ```

use std::sync::Arc;

use botforge::components::robotcomponent::{
    Attribute, ComponentKind, ComponentModel, ComponentType, GridPoint, PlacedComponent,
};
use botforge::components::robotgroup::RobotModelGroup;
use botforge::components::robotmodel::RobotModel;
use botforge::resources::catalog::ModelCatalog;
use botforge::resources::gameconfig::GameConfig;
use botforge::systems::verifier::{NOT_MOVABLE_MESSAGE, OVERLAP_MESSAGE, Verifier};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn placed(catalog: &ModelCatalog, id: &str, x: i32, y: i32) -> PlacedComponent {
    PlacedComponent::new(catalog.get(id).unwrap(), x, y)
}

#[test]
fn stats_follow_component_list() {
    let engine = Arc::new(ComponentModel::new(
        "engine",
        20,
        3,
        100,
        ComponentKind::Movement { force: 10.0, turn: 5.0 },
    ));
    let hull = Arc::new(ComponentModel::new("hull", 5, 2, 50, ComponentKind::Block));
    let model = RobotModel::new(
        "sample",
        vec![PlacedComponent::new(engine, 0, 0), PlacedComponent::new(hull, 1, 0)],
    );

    assert_eq!(model.health(), 25);
    assert_eq!(model.weight(), 5);
    assert_eq!(model.price(), 150);
    assert!(approx_eq(model.max_speed(), 10.0));
    assert!(approx_eq(model.max_acceleration(), 0.5));
    assert!(approx_eq(model.turn_speed(), 5.0));
    assert!(!model.is_empty());
}

#[test]
fn builtin_parts_make_a_valid_robot() {
    let catalog = ModelCatalog::builtin();
    let model = RobotModel::new(
        "stock",
        vec![
            placed(&catalog, "wheels", 0, 2),
            placed(&catalog, "wheels", 3, 2),
            placed(&catalog, "weapon_mount", 1, 1),
            placed(&catalog, "cannon", 1, 1),
            placed(&catalog, "armor_block", 1, 2),
        ],
    );
    assert!(model.verify().is_empty());
    assert_eq!(model.components_of(ComponentType::Movement).count(), 2);
    assert!(approx_eq(model.max_speed(), 6.0));
}

#[test]
fn cannon_mounted_either_way_is_accepted() {
    let catalog = ModelCatalog::builtin();
    for order in [["weapon_mount", "cannon"], ["cannon", "weapon_mount"]] {
        let model = RobotModel::new(
            "mounted",
            vec![
                placed(&catalog, "tracks", 0, 0),
                placed(&catalog, order[0], 4, 4),
                placed(&catalog, order[1], 4, 4),
            ],
        );
        assert!(model.verify().is_empty(), "order {:?}", order);
    }
}

#[test]
fn both_checks_report_together() {
    let catalog = ModelCatalog::builtin();
    let model = RobotModel::new(
        "broken",
        vec![
            placed(&catalog, "armor_block", 2, 2),
            placed(&catalog, "armor_block", 2, 2),
            placed(&catalog, "cannon", 5, 5),
            placed(&catalog, "armor_block", 5, 5),
        ],
    );
    let violations = model.verify();
    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0].message, NOT_MOVABLE_MESSAGE);
    assert!(violations[0].points.is_empty());
    assert_eq!(violations[1].message, OVERLAP_MESSAGE);
    assert_eq!(violations[1].points, vec![GridPoint::new(2, 2), GridPoint::new(5, 5)]);
    assert!(violations[1].to_string().contains("(2, 2), (5, 5)"));
}

#[test]
fn two_mount_capable_blocks_still_overlap() {
    let mount = Arc::new(
        ComponentModel::new("bracket", 1, 1, 1, ComponentKind::Block).with_attribute(Attribute::WeaponMount),
    );
    let wheels = ModelCatalog::builtin().get("wheels").unwrap();
    let model = RobotModel::new(
        "brackets",
        vec![
            PlacedComponent::new(wheels, 0, 0),
            PlacedComponent::new(mount.clone(), 1, 1),
            PlacedComponent::new(mount, 1, 1),
        ],
    );
    let violations = Verifier::default().verify(&model);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].points, vec![GridPoint::new(1, 1)]);
}

#[test]
fn model_json_keeps_components_and_recomputes_stats() {
    let catalog = ModelCatalog::builtin();
    let model = RobotModel::new(
        "saved",
        vec![placed(&catalog, "tracks", 1, 1), placed(&catalog, "armor_block", 3, 1)],
    );
    let json = serde_json::to_string(&model).unwrap();
    let loaded: RobotModel = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, model);
    assert_eq!(loaded.price(), model.price());
    assert_eq!(loaded.visual_key(), model.visual_key());
}

#[test]
fn group_serializes_and_respects_limit() {
    let config = GameConfig {
        robot_group_size: 2,
        ..GameConfig::new()
    };
    let group = RobotModelGroup::new(
        ["a", "b", "c"].map(|name| RobotModel::new(name, Vec::new())),
        &config,
    );
    assert_eq!(group.len(), 2);
    let json = serde_json::to_string(&group).unwrap();
    let back: RobotModelGroup = serde_json::from_str(&json).unwrap();
    assert_eq!(back, group);
}
