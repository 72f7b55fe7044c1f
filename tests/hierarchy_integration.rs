//! Integration tests for the node hierarchy and world transforms.
//!
//! Tests are organized by how the hierarchy is built: directly in a bare
//! world, then through the director's node queue.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test hierarchy_integration
//! ```

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;

use botforge::components::globaltransform2d::GlobalTransform2D;
use botforge::components::mapposition::MapPosition;
use botforge::components::node::{FieldId, Node, NodeId};
use botforge::components::rotation::Rotation;
use botforge::resources::battlefield::Battlefield;
use botforge::resources::director::GameDirector;
use botforge::resources::gameconfig::GameConfig;
use botforge::systems::propagate_transforms::{propagate_transforms, world_transform};

const EPSILON: f64 = 1e-6;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn tick_propagate(world: &mut World) {
    let mut schedule = Schedule::default();
    schedule.add_systems(propagate_transforms);
    schedule.run(world);
}

/// Root at (100, 50) facing down, child 10 units ahead turned a further
/// eighth, grandchild 5 units ahead of the child.
fn three_levels() -> (GameDirector, NodeId, NodeId, NodeId) {
    let config = GameConfig::new();
    let mut director = GameDirector::new(Battlefield::from_config("tree", &config), &config);
    let queue = director.node_queue();

    queue.add(Node::new(100.0, 50.0, 20.0, 20.0).with_orientation(FRAC_PI_2));
    director.tick();
    let root = director.nodes().iter().next().map(|node| node.id()).unwrap();

    queue.add_child(root, Node::new(10.0, 0.0, 4.0, 4.0).with_orientation(FRAC_PI_4));
    director.tick();
    let child = director.nodes().children_of(root).next().map(|node| node.id()).unwrap();

    queue.add_child(child, Node::new(5.0, 0.0, 2.0, 2.0));
    director.tick();
    let grandchild = director.nodes().children_of(child).next().map(|node| node.id()).unwrap();

    (director, root, child, grandchild)
}

// =============================================================================
// PHASE 1: GlobalTransform2D component + propagate_transforms system
// =============================================================================

#[test]
fn globaltransform2d_default_values() {
    let gt = GlobalTransform2D::default();
    assert_eq!(gt.position, MapPosition::new(0.0, 0.0));
    assert!(approx_eq(gt.orientation, 0.0));
}

#[test]
fn orientations_wrap_when_composed() {
    let parent = GlobalTransform2D::new(MapPosition::new(0.0, 0.0), 3.0 * FRAC_PI_2);
    let child = parent.compose(MapPosition::new(0.0, 0.0), PI);
    assert!(approx_eq(child.orientation, FRAC_PI_2));
}

#[test]
fn propagate_standalone_root_mirrors_itself() {
    let mut world = World::new();
    let root = world
        .spawn((
            MapPosition::new(30.0, -4.0),
            Rotation::new(FRAC_PI_4),
            GlobalTransform2D::default(),
        ))
        .id();

    tick_propagate(&mut world);

    let gt = world.get::<GlobalTransform2D>(root).unwrap();
    assert!(approx_eq(gt.position.x, 30.0));
    assert!(approx_eq(gt.position.y, -4.0));
    assert!(approx_eq(gt.orientation, FRAC_PI_4));
}

#[test]
fn propagate_child_offset_rotates_with_parent() {
    let mut world = World::new();
    let parent = world
        .spawn((
            MapPosition::new(10.0, 10.0),
            Rotation::new(FRAC_PI_2),
            GlobalTransform2D::default(),
        ))
        .id();
    let child = world
        .spawn((
            MapPosition::new(4.0, 0.0),
            Rotation::default(),
            GlobalTransform2D::default(),
            ChildOf(parent),
        ))
        .id();
    world.flush();
    assert_eq!(world.get::<Children>(parent).map(|c| c.len()), Some(1));

    tick_propagate(&mut world);

    let gt = world.get::<GlobalTransform2D>(child).unwrap();
    assert!(approx_eq(gt.position.x, 10.0));
    assert!(approx_eq(gt.position.y, 14.0));
    assert!(approx_eq(gt.orientation, FRAC_PI_2));
}

#[test]
fn propagate_follows_parent_after_it_moves() {
    let mut world = World::new();
    let parent = world
        .spawn((MapPosition::new(0.0, 0.0), Rotation::default(), GlobalTransform2D::default()))
        .id();
    let child = world
        .spawn((
            MapPosition::new(1.0, 0.0),
            Rotation::default(),
            GlobalTransform2D::default(),
            ChildOf(parent),
        ))
        .id();
    tick_propagate(&mut world);

    world.get_mut::<MapPosition>(parent).unwrap().x = 50.0;
    tick_propagate(&mut world);

    let gt = world.get::<GlobalTransform2D>(child).unwrap();
    assert!(approx_eq(gt.position.x, 51.0));
}

// =============================================================================
// PHASE 2: hierarchy built through the director
// =============================================================================

#[test]
fn root_transform_is_its_own_position() {
    let (director, root, _, _) = three_levels();
    let gt = world_transform(director.field().world(), root).unwrap();
    assert!(approx_eq(gt.position.x, 100.0));
    assert!(approx_eq(gt.position.y, 50.0));
    assert!(approx_eq(gt.orientation, FRAC_PI_2));
}

#[test]
fn child_offset_rotates_with_parent() {
    let (director, _, child, grandchild) = three_levels();
    let world = director.field().world();

    let gt = world_transform(world, child).unwrap();
    assert!(approx_eq(gt.position.x, 100.0));
    assert!(approx_eq(gt.position.y, 60.0));
    assert!(approx_eq(gt.orientation, 3.0 * FRAC_PI_4));
    assert!(approx_eq(gt.degree_orientation(), 135.0));

    let gt = world_transform(world, grandchild).unwrap();
    let half_diagonal = 5.0 / 2f64.sqrt();
    assert!(approx_eq(gt.position.x, 100.0 - half_diagonal));
    assert!(approx_eq(gt.position.y, 60.0 + half_diagonal));
}

#[test]
fn tick_propagation_matches_single_lookups() {
    let (director, root, child, grandchild) = three_levels();
    let nodes = director.nodes();
    for id in [root, child, grandchild] {
        let single = world_transform(director.field().world(), id).unwrap();
        let ticked = nodes.get(id).unwrap().global;
        assert!(approx_eq(single.position.x, ticked.position.x));
        assert!(approx_eq(single.position.y, ticked.position.y));
        assert!(approx_eq(single.orientation, ticked.orientation));
    }
}

#[test]
fn links_are_kept_both_ways() {
    let (director, root, child, grandchild) = three_levels();
    let nodes = director.nodes();
    assert_eq!(nodes.get(root).unwrap().children(), &[child]);
    assert_eq!(nodes.get(child).unwrap().parent(), Some(root));
    assert_eq!(nodes.get(grandchild).unwrap().parent(), Some(child));
    assert_eq!(nodes.roots().count(), 1);
    let field: FieldId = director.field().id();
    assert_eq!(nodes.get(child).unwrap().field(), Some(field));
}

#[test]
fn missing_node_has_no_transform() {
    let (director, _, _, _) = three_levels();
    assert!(world_transform(director.field().world(), Entity::PLACEHOLDER).is_none());
}
