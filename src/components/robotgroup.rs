use arrayvec::ArrayVec;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::components::robotmodel::RobotModel;
use crate::resources::gameconfig::GameConfig;

/// Hard upper bound on robots per group, whatever the config says.
pub const MAX_GROUP_SIZE: usize = 8;

/// An ordered, bounded set of robot designs a player brings to a battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotModelGroup {
    models: ArrayVec<RobotModel, MAX_GROUP_SIZE>,
}

impl RobotModelGroup {
    /// Keep at most `robot.group_size` models, dropping the rest.
    pub fn new(models: impl IntoIterator<Item = RobotModel>, config: &GameConfig) -> Self {
        let limit = config.robot_group_size.min(MAX_GROUP_SIZE);
        let mut kept = ArrayVec::new();
        let mut dropped = 0usize;
        for model in models {
            if kept.len() < limit {
                kept.push(model);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!("robot group truncated to {} models ({} dropped)", limit, dropped);
        }
        Self { models: kept }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RobotModel> {
        self.models.get(index)
    }

    /// Replace the model at `index`. Returns the previous one.
    pub fn replace(&mut self, index: usize, model: RobotModel) -> Option<RobotModel> {
        self.models
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, model))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RobotModel> {
        self.models.iter()
    }
}

impl<'a> IntoIterator for &'a RobotModelGroup {
    type Item = &'a RobotModel;
    type IntoIter = std::slice::Iter<'a, RobotModel>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}
