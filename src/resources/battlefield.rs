//! The world one battle runs in.
//!
//! A [`Battlefield`] owns a bevy [`World`] whose entities are the battle's
//! nodes. Besides the node components the world holds the battlefield's
//! [`FieldId`] and the [`NodeOrder`] resource: the live nodes in insertion
//! order, which is the order they are updated and handed to the renderer.
//!
//! [`spawn_node`] and [`despawn_node`] are the only ways nodes enter or leave
//! the world, so the order list always matches the live entities.

use std::sync::atomic::{AtomicU32, Ordering};

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;
use log::debug;
use rustc_hash::FxHashSet;

use crate::components::node::{FieldId, NodeId, NodeKind, NodeRef};
use crate::error::{EngineError, Result};
use crate::resources::gameconfig::GameConfig;
use crate::resources::queues::PendingNode;

static NEXT_FIELD_ID: AtomicU32 = AtomicU32::new(1);

/// Live nodes in insertion order.
#[derive(Resource, Debug, Default)]
pub struct NodeOrder(pub Vec<NodeId>);

fn is_node(world: &World, id: NodeId) -> bool {
    world.get::<NodeKind>(id).is_some()
}

/// Spawn a node, attached to its parent if it has one.
pub fn spawn_node(world: &mut World, pending: PendingNode) -> Result<NodeId> {
    let PendingNode { node, parent } = pending;
    let id = match parent {
        Some(parent) if !is_node(world, parent) => {
            return Err(EngineError::ParentNotFound(parent));
        }
        Some(parent) => world.spawn((node, ChildOf(parent))).id(),
        None => world.spawn(node).id(),
    };
    world.get_resource_or_insert_with(NodeOrder::default).0.push(id);
    Ok(id)
}

/// Despawn a node and its whole subtree. Returns how many nodes went away.
pub fn despawn_node(world: &mut World, id: NodeId) -> Result<usize> {
    if !is_node(world, id) {
        return Err(EngineError::NodeNotFound(id));
    }
    let mut removed: FxHashSet<NodeId> = FxHashSet::default();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if removed.insert(current) {
            if let Some(children) = world.get::<Children>(current) {
                stack.extend(children.iter());
            }
        }
    }

    if let Ok(entity) = world.get_entity_mut(id) {
        entity.despawn();
    }
    if let Some(mut order) = world.get_resource_mut::<NodeOrder>() {
        order.0.retain(|live| !removed.contains(live));
    }
    debug!("removed {} node(s) rooted at {}", removed.len(), id);
    Ok(removed.len())
}

pub struct Battlefield {
    pub name: String,
    pub width: f64,
    pub height: f64,
    id: FieldId,
    world: World,
}

impl Battlefield {
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        let id = FieldId(NEXT_FIELD_ID.fetch_add(1, Ordering::Relaxed));
        let mut world = World::new();
        world.insert_resource(id);
        world.insert_resource(NodeOrder::default());
        Self {
            name: name.into(),
            width,
            height,
            id,
            world,
        }
    }

    /// A battlefield sized from the config.
    pub fn from_config(name: impl Into<String>, config: &GameConfig) -> Self {
        Self::new(name, config.battlefield_width, config.battlefield_height)
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Insert a node right away, bypassing the director's queue.
    pub fn insert(&mut self, pending: PendingNode) -> Result<NodeId> {
        spawn_node(&mut self.world, pending)
    }

    /// Remove a node and its subtree right away. Returns the number removed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize> {
        despawn_node(&mut self.world, id)
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        NodeRef::from_world(&self.world, id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        is_node(&self.world, id)
    }

    /// Live node ids in insertion order.
    pub fn ids(&self) -> &[NodeId] {
        self.world
            .get_resource::<NodeOrder>()
            .map(|order| order.0.as_slice())
            .unwrap_or_default()
    }

    /// Live nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.ids().iter().filter_map(|id| self.get(*id))
    }

    /// Live top-level nodes in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.nodes().filter(|node| node.parent().is_none())
    }

    pub fn children_of(&self, id: NodeId) -> impl Iterator<Item = NodeRef<'_>> {
        self.get(id)
            .map(|node| node.children())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.get(*child))
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::node::Node;

    fn pending(x: f64, parent: Option<NodeId>) -> PendingNode {
        PendingNode {
            node: Node::new(x, 0.0, 1.0, 1.0),
            parent,
        }
    }

    #[test]
    fn insert_keeps_insertion_order() {
        let mut field = Battlefield::new("test", 100.0, 100.0);
        let a = field.insert(pending(1.0, None)).unwrap();
        let b = field.insert(pending(2.0, None)).unwrap();
        assert_eq!(field.ids(), &[a, b]);
        assert_eq!(field.get(b).unwrap().id(), b);
        assert_eq!(field.get(a).unwrap().field(), Some(field.id()));
    }

    #[test]
    fn child_links_both_ways() {
        let mut field = Battlefield::new("test", 100.0, 100.0);
        let parent = field.insert(pending(0.0, None)).unwrap();
        let child = field.insert(pending(1.0, Some(parent))).unwrap();
        field.world_mut().flush();
        assert_eq!(field.get(parent).unwrap().children(), &[child]);
        assert_eq!(field.get(child).unwrap().parent(), Some(parent));
        assert_eq!(field.roots().count(), 1);
        assert_eq!(field.children_of(parent).count(), 1);
    }

    #[test]
    fn missing_parent_is_rejected() {
        let mut field = Battlefield::new("test", 100.0, 100.0);
        let err = field.insert(pending(0.0, Some(Entity::PLACEHOLDER))).unwrap_err();
        assert!(matches!(err, EngineError::ParentNotFound(id) if id == Entity::PLACEHOLDER));
        assert!(field.is_empty());
    }

    #[test]
    fn non_node_entity_is_not_a_parent() {
        let mut field = Battlefield::new("test", 100.0, 100.0);
        let stray = field.world_mut().spawn_empty().id();
        assert!(field.insert(pending(0.0, Some(stray))).is_err());
        assert!(!field.contains(stray));
    }

    #[test]
    fn remove_takes_subtree_and_keeps_order() {
        let mut field = Battlefield::new("test", 100.0, 100.0);
        let a = field.insert(pending(0.0, None)).unwrap();
        let b = field.insert(pending(1.0, None)).unwrap();
        let a1 = field.insert(pending(2.0, Some(a))).unwrap();
        let a11 = field.insert(pending(3.0, Some(a1))).unwrap();
        let c = field.insert(pending(4.0, None)).unwrap();

        assert_eq!(field.remove(a).unwrap(), 3);
        assert_eq!(field.ids(), &[b, c]);
        assert!(!field.contains(a11));
        assert!(matches!(field.remove(a1), Err(EngineError::NodeNotFound(_))));
    }

    #[test]
    fn removing_child_detaches_from_parent() {
        let mut field = Battlefield::new("test", 100.0, 100.0);
        let parent = field.insert(pending(0.0, None)).unwrap();
        let child = field.insert(pending(1.0, Some(parent))).unwrap();
        field.remove(child).unwrap();
        assert!(field.get(parent).unwrap().children().is_empty());
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut field = Battlefield::new("test", 100.0, 100.0);
        let first = field.insert(pending(0.0, None)).unwrap();
        field.remove(first).unwrap();
        let second = field.insert(pending(0.0, None)).unwrap();
        assert_ne!(first, second);
        assert!(field.get(first).is_none());
    }
}
