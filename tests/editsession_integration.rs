//! Integration tests for the robot edit session.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test editsession_integration
//! ```

use botforge::components::robotcomponent::GridPoint;
use botforge::components::robotmodel::RobotModel;
use botforge::error::EngineError;
use botforge::resources::catalog::ModelCatalog;
use botforge::resources::editsession::EditSession;
use botforge::resources::gameconfig::GameConfig;
use botforge::systems::verifier::{NOT_MOVABLE_MESSAGE, OVERLAP_MESSAGE};

fn session_with_grid(grid_num: i32) -> EditSession {
    let config = GameConfig {
        edit_grid_num: grid_num,
        ..GameConfig::new()
    };
    EditSession::new(RobotModel::new("draft", Vec::new()), &config)
}

#[test]
fn building_a_robot_step_by_step() {
    let catalog = ModelCatalog::builtin();
    let mut edit = session_with_grid(8);

    edit.put_component(catalog.get("armor_block").unwrap(), 3, 3).unwrap();
    let violations = edit.verify();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].message, NOT_MOVABLE_MESSAGE);

    edit.put_component(catalog.get("wheels").unwrap(), 3, 4).unwrap();
    assert!(edit.verify().is_empty());

    edit.put_component(catalog.get("cannon").unwrap(), 3, 3).unwrap();
    let violations = edit.verify();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].message, OVERLAP_MESSAGE);
    assert_eq!(violations[0].points, vec![GridPoint::new(3, 3)]);

    assert!(edit.undo());
    assert!(edit.verify().is_empty());
    assert_eq!(edit.model().price(), 60);
}

#[test]
fn symmetric_wide_part_mirrors_by_its_width() {
    let catalog = ModelCatalog::builtin();
    let mut edit = session_with_grid(8);
    edit.symmetric = true;

    edit.put_component(catalog.get("tracks").unwrap(), 1, 6).unwrap();
    let cells: Vec<_> = edit.model().components().iter().map(|c| c.cell()).collect();
    assert_eq!(cells, vec![GridPoint::new(1, 6), GridPoint::new(5, 6)]);
}

#[test]
fn symmetric_center_cell_is_not_doubled() {
    let catalog = ModelCatalog::builtin();
    let mut edit = session_with_grid(7);
    edit.symmetric = true;

    edit.put_component(catalog.get("armor_block").unwrap(), 3, 0).unwrap();
    assert_eq!(edit.model().components().len(), 1);
}

#[test]
fn failed_edits_change_nothing() {
    let catalog = ModelCatalog::builtin();
    let mut edit = session_with_grid(4);
    edit.put_component(catalog.get("wheels").unwrap(), 3, 3).unwrap();
    let before = edit.model().clone();

    assert!(matches!(
        edit.put_component(catalog.get("tracks").unwrap(), 3, 0),
        Err(EngineError::OutOfGrid { x: 3, y: 0 })
    ));
    assert!(edit.move_all(0, 1).is_err());
    assert!(edit.remove_component_at(4, 4).is_err());

    assert_eq!(edit.model(), &before);
    assert_eq!(edit.history_len(), 1);
}

#[test]
fn reset_and_rename_are_undoable() {
    let mut edit = session_with_grid(8);
    edit.rename("alpha");
    edit.reset(RobotModel::new("template", Vec::new()));
    assert_eq!(edit.model().name(), "template");
    assert!(edit.undo());
    assert_eq!(edit.model().name(), "alpha");
    assert!(edit.undo());
    assert_eq!(edit.model().name(), "draft");
    assert!(!edit.can_undo());
}
