//! Hierarchy tracker
//!
//! Parent pointers and ordered child lists per entity, plus the ordered list
//! of root entities. Every tracked entity is either in the root list or in
//! exactly one parent's child list.

use std::collections::HashMap;

use crate::ecs::EntityId;

#[derive(Debug, Clone, Default)]
struct Node {
    parent: Option<EntityId>,
    children: Vec<EntityId>,
}

/// Parent/child edges and the root set of one scene
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    nodes: HashMap<EntityId, Node>,
    roots: Vec<EntityId>,
}

impl Hierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new root entity. Returns `false` if already tracked.
    pub fn insert_root(&mut self, id: EntityId) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, Node::default());
        self.roots.push(id);
        true
    }

    /// Track a new entity under `parent`. Returns `false` if `id` is already
    /// tracked or `parent` is not.
    pub fn insert_child(&mut self, parent: EntityId, id: EntityId) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return false;
        };
        parent_node.children.push(id);
        self.nodes.insert(
            id,
            Node {
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        true
    }

    /// Check whether an entity is tracked
    pub fn contains(&self, id: EntityId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of tracked entities
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parent of an entity
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Children of an entity in order
    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.nodes.get(&id).map_or(&[], |node| node.children.as_slice())
    }

    /// Root entities in order
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// True if `ancestor` is `id` itself or above it
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    fn unlink(&mut self, id: EntityId) {
        match self.parent(id) {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent) {
                    parent_node.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
    }

    /// Move `child` to the end of `parent`'s children.
    ///
    /// Returns `false` without changes when either side is untracked or the
    /// move would create a cycle.
    pub fn attach(&mut self, parent: EntityId, child: EntityId) -> bool {
        if !self.contains(parent) || !self.contains(child) || self.is_ancestor(child, parent) {
            return false;
        }

        self.unlink(child);
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(child);
        }
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = Some(parent);
        }
        true
    }

    /// Move an entity to the end of the root list. Returns `false` if it
    /// was already a root or is untracked.
    pub fn detach(&mut self, id: EntityId) -> bool {
        if self.parent(id).is_none() {
            return false;
        }

        self.unlink(id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
        self.roots.push(id);
        true
    }

    /// `id` and everything below it, parents before children
    pub fn subtree(&self, id: EntityId) -> Vec<EntityId> {
        if !self.contains(id) {
            return Vec::new();
        }

        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        order
    }

    /// Every tracked entity, depth-first from the roots in order
    pub fn depth_first(&self) -> Vec<EntityId> {
        self.roots.iter().flat_map(|root| self.subtree(*root)).collect()
    }

    /// Stop tracking `id` and its whole subtree. Returns the removed ids,
    /// children before parents.
    pub fn remove_subtree(&mut self, id: EntityId) -> Vec<EntityId> {
        let mut removed = self.subtree(id);
        if removed.is_empty() {
            return removed;
        }

        self.unlink(id);
        for node in &removed {
            self.nodes.remove(node);
        }
        removed.reverse();
        removed
    }

    /// Check the structural invariants: roots have no parent, every other
    /// entity is listed exactly once by its parent.
    pub fn is_consistent(&self) -> bool {
        let roots_ok = self
            .roots
            .iter()
            .all(|root| self.nodes.get(root).is_some_and(|node| node.parent.is_none()));

        let listed_once = self.nodes.iter().all(|(id, node)| match node.parent {
            None => self.roots.iter().filter(|root| *root == id).count() == 1,
            Some(parent) => {
                self.children(parent).iter().filter(|child| *child == id).count() == 1
                    && !self.roots.contains(id)
            }
        });

        roots_ok && listed_once
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn test_insert_and_query() {
        let mut hierarchy = Hierarchy::new();
        assert!(hierarchy.insert_root(id(0)));
        assert!(hierarchy.insert_child(id(0), id(1)));
        assert!(!hierarchy.insert_child(id(9), id(2)));
        assert!(!hierarchy.insert_root(id(1)));

        assert_eq!(hierarchy.roots(), &[id(0)]);
        assert_eq!(hierarchy.children(id(0)), &[id(1)]);
        assert_eq!(hierarchy.parent(id(1)), Some(id(0)));
        assert!(hierarchy.is_consistent());
    }

    #[test]
    fn test_attach_moves_between_parents() {
        let mut hierarchy = Hierarchy::new();
        hierarchy.insert_root(id(0));
        hierarchy.insert_root(id(1));
        hierarchy.insert_child(id(0), id(2));

        assert!(hierarchy.attach(id(1), id(2)));
        assert!(hierarchy.children(id(0)).is_empty());
        assert_eq!(hierarchy.children(id(1)), &[id(2)]);

        // Root moves under a parent and leaves the root list
        assert!(hierarchy.attach(id(1), id(0)));
        assert_eq!(hierarchy.roots(), &[id(1)]);
        assert!(hierarchy.is_consistent());
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let mut hierarchy = Hierarchy::new();
        hierarchy.insert_root(id(0));
        hierarchy.insert_child(id(0), id(1));
        hierarchy.insert_child(id(1), id(2));

        assert!(!hierarchy.attach(id(2), id(0)));
        assert!(!hierarchy.attach(id(1), id(1)));
        assert_eq!(hierarchy.parent(id(0)), None);
        assert!(hierarchy.is_consistent());
    }

    #[test]
    fn test_detach_to_roots() {
        let mut hierarchy = Hierarchy::new();
        hierarchy.insert_root(id(0));
        hierarchy.insert_child(id(0), id(1));

        assert!(hierarchy.detach(id(1)));
        assert!(!hierarchy.detach(id(1)));
        assert_eq!(hierarchy.roots(), &[id(0), id(1)]);
        assert!(hierarchy.is_consistent());
    }

    #[test]
    fn test_remove_subtree_children_first() {
        let mut hierarchy = Hierarchy::new();
        hierarchy.insert_root(id(0));
        hierarchy.insert_child(id(0), id(1));
        hierarchy.insert_child(id(1), id(2));
        hierarchy.insert_child(id(0), id(3));
        hierarchy.insert_root(id(4));

        let removed = hierarchy.remove_subtree(id(1));
        assert_eq!(removed, vec![id(2), id(1)]);
        assert_eq!(hierarchy.children(id(0)), &[id(3)]);
        assert_eq!(hierarchy.len(), 3);
        assert!(hierarchy.is_consistent());

        let removed = hierarchy.remove_subtree(id(0));
        assert_eq!(removed, vec![id(3), id(0)]);
        assert_eq!(hierarchy.roots(), &[id(4)]);
    }

    #[test]
    fn test_depth_first_order() {
        let mut hierarchy = Hierarchy::new();
        hierarchy.insert_root(id(0));
        hierarchy.insert_child(id(0), id(1));
        hierarchy.insert_child(id(1), id(2));
        hierarchy.insert_child(id(0), id(3));
        hierarchy.insert_root(id(4));

        assert_eq!(hierarchy.depth_first(), vec![id(0), id(1), id(2), id(3), id(4)]);
    }
}
