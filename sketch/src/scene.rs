use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constraint::{collect_constraints, ConstraintScene, NodeId};
use crate::error::Result;
use crate::model::{Constraint, ConstraintId, ElementId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    pub id: NodeId,
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Parametric element this entity stands for, if any.
    pub element: Option<ElementId>,
    /// `None` for entities that cannot host constraints.
    pub constraints: Option<Vec<Constraint>>,
}

/// Hierarchical scene of entities; the tree the constraint collector walks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityTree {
    entities: HashMap<NodeId, Entity>,
    root: NodeId,
    next_id: NodeId,
}

impl Default for EntityTree {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityTree {
    pub fn new() -> Self {
        let mut tree = EntityTree {
            entities: HashMap::new(),
            root: 0,
            next_id: 0,
        };
        let root = tree.next_id();
        tree.entities.insert(
            root,
            Entity {
                id: root,
                name: "scene".to_string(),
                parent: None,
                children: Vec::new(),
                element: None,
                constraints: Some(Vec::new()),
            },
        );
        tree.root = root;
        tree
    }

    fn next_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn insert(&mut self, name: String, parent: NodeId, element: Option<ElementId>, hosts: bool) -> Option<NodeId> {
        if !self.entities.contains_key(&parent) {
            return None;
        }
        let id = self.next_id();
        self.entities.insert(
            id,
            Entity {
                id,
                name,
                parent: Some(parent),
                children: Vec::new(),
                element,
                constraints: hosts.then(Vec::new),
            },
        );
        if let Some(p) = self.entities.get_mut(&parent) {
            p.children.push(id);
        }
        Some(id)
    }

    /// Plain grouping entity without constraint capability.
    pub fn create_group(&mut self, name: String, parent: NodeId) -> Option<NodeId> {
        self.insert(name, parent, None, false)
    }

    /// Entity standing for a parametric element; can host constraints.
    pub fn create_element(&mut self, name: String, parent: NodeId, element: ElementId) -> Option<NodeId> {
        self.insert(name, parent, Some(element), true)
    }

    pub fn get(&self, id: NodeId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Removes an entity, handing its children to its parent in its place.
    /// The root cannot be removed.
    pub fn remove_entity(&mut self, id: NodeId) -> bool {
        let parent_id = match self.entities.get(&id).and_then(|e| e.parent) {
            Some(p) => p,
            None => return false,
        };
        let entity = match self.entities.remove(&id) {
            Some(e) => e,
            None => return false,
        };
        if let Some(parent) = self.entities.get_mut(&parent_id) {
            match parent.children.iter().position(|&c| c == id) {
                Some(at) => {
                    parent.children.remove(at);
                    for (k, child) in entity.children.iter().enumerate() {
                        parent.children.insert(at + k, *child);
                    }
                }
                None => parent.children.extend(entity.children.iter().copied()),
            }
        }
        for child_id in &entity.children {
            if let Some(child) = self.entities.get_mut(child_id) {
                child.parent = Some(parent_id);
            }
        }
        true
    }

    fn is_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        let mut current = of;
        loop {
            if current == ancestor {
                return true;
            }
            match self.entities.get(&current).and_then(|e| e.parent) {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    /// Moves `id` under `new_parent` (appended last). Refused when it would
    /// put an entity below itself.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> bool {
        if id == self.root || !self.entities.contains_key(&new_parent) || self.is_ancestor(id, new_parent) {
            return false;
        }
        let old_parent = match self.entities.get(&id).and_then(|e| e.parent) {
            Some(p) => p,
            None => return false,
        };
        if let Some(p) = self.entities.get_mut(&old_parent) {
            p.children.retain(|&c| c != id);
        }
        if let Some(p) = self.entities.get_mut(&new_parent) {
            p.children.push(id);
        }
        if let Some(e) = self.entities.get_mut(&id) {
            e.parent = Some(new_parent);
        }
        true
    }

    pub fn add_constraint(&mut self, node: NodeId, constraint: Constraint) -> bool {
        match self.entities.get_mut(&node).and_then(|e| e.constraints.as_mut()) {
            Some(list) => {
                list.push(constraint);
                true
            }
            None => false,
        }
    }

    pub fn remove_constraint(&mut self, node: NodeId, id: ConstraintId) -> bool {
        match self.entities.get_mut(&node).and_then(|e| e.constraints.as_mut()) {
            Some(list) => {
                let before = list.len();
                list.retain(|c| c.id != id);
                list.len() != before
            }
            None => false,
        }
    }

    /// Every constraint under `root`, in collection order.
    pub fn collect_all(&self, root: NodeId) -> Result<Vec<Constraint>> {
        let mut out = Vec::new();
        collect_constraints(self, root, |c| out.push(c.clone()))?;
        Ok(out)
    }
}

impl ConstraintScene for EntityTree {
    fn contains(&self, node: NodeId) -> bool {
        self.entities.contains_key(&node)
    }

    fn for_each_constraint(&self, node: NodeId, f: &mut dyn FnMut(&Constraint)) {
        if let Some(list) = self.entities.get(&node).and_then(|e| e.constraints.as_ref()) {
            for c in list {
                f(c);
            }
        }
    }

    fn for_each_child(&self, node: NodeId, f: &mut dyn FnMut(NodeId)) {
        if let Some(e) = self.entities.get(&node) {
            for c in &e.children {
                f(*c);
            }
        }
    }
}
