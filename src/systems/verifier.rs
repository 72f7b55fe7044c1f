//! Structural checks over robot models.
//!
//! A [`Verifier`] runs an ordered list of independent checks and returns
//! every violation found, in check order. Violations are data for the editor
//! to display, never errors.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::components::robotcomponent::{ComponentType, GridPoint, PlacedComponent};
use crate::components::robotmodel::RobotModel;

pub const NOT_MOVABLE_MESSAGE: &str = "The robot can't move! put some movement components";
pub const OVERLAP_MESSAGE: &str = "Overlapped components found";

/// A problem with a robot model and the grid cells involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub message: String,
    pub points: Vec<GridPoint>,
}

impl Violation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            points: Vec::new(),
        }
    }

    pub fn with_points(mut self, points: Vec<GridPoint>) -> Self {
        self.points = points;
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.points.is_empty() {
            let cells: Vec<String> = self
                .points
                .iter()
                .map(|p| format!("({}, {})", p.x, p.y))
                .collect();
            write!(f, " at {}", cells.join(", "))?;
        }
        Ok(())
    }
}

type Check = Box<dyn Fn(&RobotModel) -> Option<Violation> + Send + Sync>;

pub struct Verifier {
    checks: Vec<Check>,
}

impl Default for Verifier {
    /// Movability, then overlap.
    fn default() -> Self {
        Self::empty().with_check(check_movable).with_check(check_overlap)
    }
}

impl Verifier {
    /// A verifier with no checks.
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }

    /// Append a check; it runs after the ones already registered.
    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&RobotModel) -> Option<Violation> + Send + Sync + 'static,
    {
        self.checks.push(Box::new(check));
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check; none short-circuits another.
    pub fn verify(&self, model: &RobotModel) -> Vec<Violation> {
        self.checks.iter().filter_map(|check| check(model)).collect()
    }
}

/// Fails when no component can move the robot.
pub fn check_movable(model: &RobotModel) -> Option<Violation> {
    if model.components_of(ComponentType::Movement).next().is_some() {
        None
    } else {
        Some(Violation::new(NOT_MOVABLE_MESSAGE))
    }
}

/// A weapon may share a cell with a weapon mount, in either order.
fn may_share_cell(first: &PlacedComponent, second: &PlacedComponent) -> bool {
    let weapon_on_mount = |mount: &PlacedComponent, weapon: &PlacedComponent| {
        mount.model.is_weapon_mount() && weapon.component_type() == ComponentType::Weapon
    };
    weapon_on_mount(first, second) || weapon_on_mount(second, first)
}

/// Collects every cell holding two components that may not share it.
///
/// Each component is compared against the first one seen on its cell.
pub fn check_overlap(model: &RobotModel) -> Option<Violation> {
    let mut occupied: FxHashMap<GridPoint, &PlacedComponent> = FxHashMap::default();
    let mut overlapped: Vec<GridPoint> = Vec::new();

    for component in model.components() {
        let cell = component.cell();
        match occupied.get(&cell).copied() {
            None => {
                occupied.insert(cell, component);
            }
            Some(first) if may_share_cell(first, component) => {}
            Some(_) => {
                if !overlapped.contains(&cell) {
                    overlapped.push(cell);
                }
            }
        }
    }

    if overlapped.is_empty() {
        None
    } else {
        Some(Violation::new(OVERLAP_MESSAGE).with_points(overlapped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::robotcomponent::{Attribute, ComponentKind, ComponentModel};
    use std::sync::Arc;

    fn block(id: &str) -> Arc<ComponentModel> {
        Arc::new(ComponentModel::new(id, 10, 1, 10, ComponentKind::Block))
    }

    fn mount() -> Arc<ComponentModel> {
        Arc::new(
            ComponentModel::new("mount", 10, 1, 10, ComponentKind::Block)
                .with_attribute(Attribute::WeaponMount),
        )
    }

    fn gun() -> Arc<ComponentModel> {
        Arc::new(ComponentModel::new(
            "gun",
            5,
            1,
            30,
            ComponentKind::Weapon { damage: 4, range: 120.0, cooldown: 20 },
        ))
    }

    fn wheel() -> Arc<ComponentModel> {
        Arc::new(ComponentModel::new(
            "wheel",
            5,
            1,
            20,
            ComponentKind::Movement { force: 2.0, turn: 0.1 },
        ))
    }

    fn model(parts: Vec<(Arc<ComponentModel>, i32, i32)>) -> RobotModel {
        RobotModel::new(
            "test",
            parts
                .into_iter()
                .map(|(m, x, y)| PlacedComponent::new(m, x, y))
                .collect(),
        )
    }

    #[test]
    fn no_movement_is_reported_without_points() {
        let violations = Verifier::default().verify(&model(vec![(block("a"), 0, 0)]));
        assert_eq!(violations, vec![Violation::new(NOT_MOVABLE_MESSAGE)]);
    }

    #[test]
    fn empty_model_only_fails_movability() {
        let violations = Verifier::default().verify(&RobotModel::empty());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, NOT_MOVABLE_MESSAGE);
    }

    #[test]
    fn plain_overlap_yields_one_violation_with_the_cell() {
        let violations = check_overlap(&model(vec![
            (block("a"), 2, 3),
            (block("b"), 2, 3),
            (block("c"), 2, 3),
        ]));
        assert_eq!(
            violations,
            Some(Violation::new(OVERLAP_MESSAGE).with_points(vec![GridPoint::new(2, 3)]))
        );
    }

    #[test]
    fn weapon_on_mount_is_allowed_in_either_order() {
        assert_eq!(check_overlap(&model(vec![(mount(), 1, 1), (gun(), 1, 1)])), None);
        assert_eq!(check_overlap(&model(vec![(gun(), 1, 1), (mount(), 1, 1)])), None);
    }

    #[test]
    fn two_mounts_without_a_weapon_overlap() {
        let result = check_overlap(&model(vec![(mount(), 0, 0), (mount(), 0, 0)]));
        assert_eq!(result.map(|v| v.points), Some(vec![GridPoint::new(0, 0)]));
    }

    #[test]
    fn weapon_on_plain_block_overlaps() {
        assert!(check_overlap(&model(vec![(block("a"), 0, 0), (gun(), 0, 0)])).is_some());
    }

    #[test]
    fn checks_report_in_declaration_order() {
        let robot = model(vec![(block("a"), 4, 4), (block("b"), 4, 4), (block("c"), 5, 5), (block("d"), 5, 5)]);
        let violations = Verifier::default().verify(&robot);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].message, NOT_MOVABLE_MESSAGE);
        assert_eq!(violations[1].points, vec![GridPoint::new(4, 4), GridPoint::new(5, 5)]);
    }

    #[test]
    fn valid_model_has_no_violations() {
        let robot = model(vec![(wheel(), 0, 0), (mount(), 1, 0), (gun(), 1, 0)]);
        assert!(Verifier::default().verify(&robot).is_empty());
    }

    #[test]
    fn custom_checks_run_after_defaults() {
        let verifier = Verifier::default().with_check(|m: &RobotModel| {
            (m.price() > 100).then(|| Violation::new("too expensive"))
        });
        assert_eq!(verifier.len(), 3);
        let robot = model(vec![(wheel(), 0, 0), (gun(), 1, 0), (gun(), 2, 0), (gun(), 3, 0), (gun(), 4, 0)]);
        let violations = verifier.verify(&robot);
        assert_eq!(violations, vec![Violation::new("too expensive")]);
    }
}
