//! Transform propagation for node hierarchies.
//!
//! Computes [`GlobalTransform2D`] for every node: roots mirror their own
//! position and rotation, and each child's local offset is rotated by its
//! parent's world orientation and added to the parent's world position.
//! Orientations add up and are normalized.
//!
//! # Schedule position
//!
//! Runs last in the tick, after updates and despawns, so the render callback
//! sees up-to-date world positions.

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;

use crate::components::globaltransform2d::GlobalTransform2D;
use crate::components::mapposition::MapPosition;
use crate::components::node::NodeId;
use crate::components::rotation::Rotation;

/// Propagate transforms from root nodes down through the hierarchy.
pub fn propagate_transforms(
    roots: Query<(Entity, &MapPosition, &Rotation, Option<&Children>), Without<ChildOf>>,
    children_query: Query<(&MapPosition, &Rotation, Option<&Children>), With<ChildOf>>,
    mut globals: Query<&mut GlobalTransform2D>,
) {
    for (root_entity, pos, rot, children) in roots.iter() {
        let root_gt = GlobalTransform2D::new(*pos, rot.radians);
        if let Ok(mut gt) = globals.get_mut(root_entity) {
            *gt = root_gt;
        }
        if let Some(children) = children {
            propagate_children(&root_gt, children, &children_query, &mut globals);
        }
    }
}

fn propagate_children(
    parent_gt: &GlobalTransform2D,
    children: &Children,
    children_query: &Query<(&MapPosition, &Rotation, Option<&Children>), With<ChildOf>>,
    globals: &mut Query<&mut GlobalTransform2D>,
) {
    for child_entity in children.iter() {
        let Ok((pos, rot, grandchildren)) = children_query.get(child_entity) else {
            continue;
        };
        let child_gt = parent_gt.compose(*pos, rot.radians);
        if let Ok(mut gt) = globals.get_mut(child_entity) {
            *gt = child_gt;
        }
        if let Some(grandchildren) = grandchildren {
            propagate_children(&child_gt, grandchildren, children_query, globals);
        }
    }
}

/// World transform of a single node, walking up its parent chain.
///
/// Does not need a prior [`propagate_transforms`] run. Returns `None` if the
/// entity has no position.
pub fn world_transform(world: &World, id: NodeId) -> Option<GlobalTransform2D> {
    let local = |id: NodeId| -> Option<(MapPosition, f64)> {
        let position = *world.get::<MapPosition>(id)?;
        let radians = world.get::<Rotation>(id).map_or(0.0, |rot| rot.radians);
        Some((position, radians))
    };

    let mut chain = vec![local(id)?];
    let mut parent = world.get::<ChildOf>(id).map(ChildOf::parent);
    while let Some(parent_id) = parent {
        let Some(transform) = local(parent_id) else {
            break;
        };
        chain.push(transform);
        parent = world.get::<ChildOf>(parent_id).map(ChildOf::parent);
    }

    let mut levels = chain.into_iter().rev();
    let (position, radians) = levels.next()?;
    let root = GlobalTransform2D::new(position, radians);
    Some(levels.fold(root, |world_gt, (position, radians)| {
        world_gt.compose(position, radians)
    }))
}
