//! Robot editing without a UI.
//!
//! An [`EditSession`] holds the robot model being edited and an undo stack.
//! Models are immutable: every successful edit builds a new [`RobotModel`]
//! and pushes the previous one. Failed edits leave both untouched.
//!
//! Placement happens on a square grid of `edit.grid_num` cells per side. A
//! component occupies `width x height` cells starting at its grid position.

use std::sync::Arc;

use log::debug;

use crate::components::robotcomponent::{ComponentModel, PlacedComponent};
use crate::components::robotmodel::RobotModel;
use crate::error::{EngineError, Result};
use crate::resources::gameconfig::GameConfig;
use crate::systems::verifier::{Verifier, Violation};

pub struct EditSession {
    model: RobotModel,
    history: Vec<RobotModel>,
    grid_num: i32,
    /// Mirror every placement across the vertical center line.
    pub symmetric: bool,
    verifier: Verifier,
}

impl EditSession {
    pub fn new(model: RobotModel, config: &GameConfig) -> Self {
        Self {
            model,
            history: Vec::new(),
            grid_num: config.edit_grid_num,
            symmetric: false,
            verifier: Verifier::default(),
        }
    }

    /// Replace the default checks run by [`EditSession::verify`].
    pub fn with_verifier(mut self, verifier: Verifier) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn model(&self) -> &RobotModel {
        &self.model
    }

    /// Give up the session and keep the current model.
    pub fn into_model(self) -> RobotModel {
        self.model
    }

    pub fn grid_num(&self) -> i32 {
        self.grid_num
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn fits(&self, x: i32, y: i32, width: u32, height: u32) -> bool {
        let grid = i64::from(self.grid_num);
        x >= 0
            && y >= 0
            && i64::from(x) + i64::from(width) <= grid
            && i64::from(y) + i64::from(height) <= grid
    }

    fn commit(&mut self, next: RobotModel) {
        let previous = std::mem::replace(&mut self.model, next);
        self.history.push(previous);
    }

    /// Place `component` with its top-left cell at `(x, y)`.
    ///
    /// In symmetric mode the mirrored copy goes to `grid_num - x - width`
    /// unless that is the same cell. Both placements are one undo step.
    pub fn put_component(&mut self, component: Arc<ComponentModel>, x: i32, y: i32) -> Result<()> {
        if !self.fits(x, y, component.width, component.height) {
            return Err(EngineError::OutOfGrid { x, y });
        }
        let mut components = self.model.components().to_vec();
        components.push(PlacedComponent::new(component.clone(), x, y));

        if self.symmetric {
            // fits() bounds x + width by grid_num
            let mirror_x = self.grid_num - x - component.width as i32;
            if mirror_x != x {
                components.push(PlacedComponent::new(component.clone(), mirror_x, y));
            }
        }

        debug!("placed '{}' at ({}, {})", component.id, x, y);
        self.commit(RobotModel::new(self.model.name(), components));
        Ok(())
    }

    /// Remove the most recently placed component covering `(x, y)`.
    ///
    /// Returns `Ok(None)` when the cell is empty; nothing is recorded then.
    pub fn remove_component_at(&mut self, x: i32, y: i32) -> Result<Option<PlacedComponent>> {
        if !self.fits(x, y, 1, 1) {
            return Err(EngineError::OutOfGrid { x, y });
        }
        let covers = |c: &PlacedComponent| {
            let (left, top) = (i64::from(c.grid_x), i64::from(c.grid_y));
            let (x, y) = (i64::from(x), i64::from(y));
            x >= left
                && x < left + i64::from(c.model.width)
                && y >= top
                && y < top + i64::from(c.model.height)
        };
        let Some(index) = self.model.components().iter().rposition(covers) else {
            return Ok(None);
        };
        let mut components = self.model.components().to_vec();
        let removed = components.remove(index);
        self.commit(RobotModel::new(self.model.name(), components));
        Ok(Some(removed))
    }

    /// Shift every component by `(dx, dy)`.
    ///
    /// Refused with the first offending position if anything would leave the
    /// grid.
    pub fn move_all(&mut self, dx: i32, dy: i32) -> Result<()> {
        let mut shifted = Vec::with_capacity(self.model.components().len());
        for c in self.model.components() {
            match c.shifted(dx, dy) {
                Some(moved) if self.fits(moved.grid_x, moved.grid_y, c.model.width, c.model.height) => {
                    shifted.push(moved);
                }
                Some(moved) => {
                    return Err(EngineError::OutOfGrid {
                        x: moved.grid_x,
                        y: moved.grid_y,
                    });
                }
                None => {
                    return Err(EngineError::OutOfGrid {
                        x: c.grid_x.saturating_add(dx),
                        y: c.grid_y.saturating_add(dy),
                    });
                }
            }
        }
        self.commit(RobotModel::new(self.model.name(), shifted));
        Ok(())
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        let renamed = self.model.renamed(name);
        self.commit(renamed);
    }

    /// Start over from `model`; the current one stays undoable.
    pub fn reset(&mut self, model: RobotModel) {
        self.commit(model);
    }

    /// Restore the previous model. Returns `false` if there is none.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.model = previous;
                true
            }
            None => false,
        }
    }

    pub fn verify(&self) -> Vec<Violation> {
        self.verifier.verify(&self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::robotcomponent::{ComponentKind, GridPoint};

    fn session() -> EditSession {
        EditSession::new(RobotModel::new("bot", Vec::new()), &GameConfig::new())
    }

    fn plate() -> Arc<ComponentModel> {
        Arc::new(ComponentModel::new("plate", 5, 1, 5, ComponentKind::Block))
    }

    fn cells(session: &EditSession) -> Vec<GridPoint> {
        session.model().components().iter().map(PlacedComponent::cell).collect()
    }

    #[test]
    fn put_rejects_cells_outside_grid() {
        let mut edit = session();
        assert!(matches!(
            edit.put_component(plate(), 8, 0),
            Err(EngineError::OutOfGrid { x: 8, y: 0 })
        ));
        assert!(edit.put_component(plate(), -1, 3).is_err());
        assert!(edit.put_component(plate().as_ref().clone().with_size(2, 1).into(), 7, 0).is_err());
        assert!(!edit.can_undo());
    }

    #[test]
    fn put_at_extreme_coordinates_is_out_of_grid() {
        let mut edit = session();
        assert!(matches!(
            edit.put_component(plate(), i32::MAX, 0),
            Err(EngineError::OutOfGrid { x: i32::MAX, y: 0 })
        ));
        assert!(edit.put_component(plate(), 0, i32::MAX).is_err());
        assert!(edit.remove_component_at(i32::MAX, i32::MAX).is_err());
        assert!(!edit.can_undo());
    }

    #[test]
    fn move_all_by_extreme_offsets_is_refused() {
        let mut edit = session();
        edit.put_component(plate(), 1, 1).unwrap();
        assert!(matches!(
            edit.move_all(i32::MAX, 0),
            Err(EngineError::OutOfGrid { x: i32::MAX, y: 1 })
        ));
        assert!(matches!(
            edit.move_all(0, i32::MIN),
            Err(EngineError::OutOfGrid { x: 1, y: i32::MIN })
        ));
        assert_eq!(cells(&edit), vec![GridPoint::new(1, 1)]);
        assert_eq!(edit.history_len(), 1);
    }

    #[test]
    fn symmetric_put_mirrors_across_center() {
        let mut edit = session();
        edit.symmetric = true;
        edit.put_component(plate(), 1, 2).unwrap();
        assert_eq!(cells(&edit), vec![GridPoint::new(1, 2), GridPoint::new(6, 2)]);
        assert_eq!(edit.history_len(), 1);
    }

    #[test]
    fn remove_takes_topmost_component() {
        let mut edit = session();
        edit.put_component(plate(), 0, 0).unwrap();
        edit.put_component(plate(), 0, 0).unwrap();
        assert!(edit.remove_component_at(0, 0).unwrap().is_some());
        assert_eq!(edit.model().components().len(), 1);
        assert_eq!(edit.remove_component_at(5, 5).unwrap(), None);
        assert_eq!(edit.history_len(), 3);
    }

    #[test]
    fn move_all_is_all_or_nothing() {
        let mut edit = session();
        edit.put_component(plate(), 0, 0).unwrap();
        edit.put_component(plate(), 6, 0).unwrap();
        edit.move_all(1, 1).unwrap();
        assert_eq!(cells(&edit), vec![GridPoint::new(1, 1), GridPoint::new(7, 1)]);
        assert!(matches!(edit.move_all(1, 0), Err(EngineError::OutOfGrid { x: 8, y: 1 })));
        assert_eq!(cells(&edit), vec![GridPoint::new(1, 1), GridPoint::new(7, 1)]);
    }

    #[test]
    fn undo_walks_back_through_edits() {
        let mut edit = session();
        edit.put_component(plate(), 3, 3).unwrap();
        edit.rename("tank");
        assert_eq!(edit.model().name(), "tank");
        assert!(edit.undo());
        assert_eq!(edit.model().name(), "bot");
        assert_eq!(edit.model().components().len(), 1);
        assert!(edit.undo());
        assert!(edit.model().is_empty());
        assert!(!edit.undo());
    }
}
