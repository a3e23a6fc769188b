use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::Result;
use crate::model::{Constraint, ConstraintKind, ElementId};

/// One many-to-many relation between element ids.
#[derive(Clone, Debug, Default)]
pub struct Relation {
    sets: HashMap<ElementId, HashSet<ElementId>>,
}

impl Relation {
    /// Returns true when anything was inserted.
    pub fn link(&mut self, a: ElementId, b: ElementId, bidirectional: bool) -> bool {
        if a == b {
            return false;
        }
        let mut changed = self.sets.entry(a).or_default().insert(b);
        if bidirectional {
            changed |= self.sets.entry(b).or_default().insert(a);
        }
        changed
    }

    /// Drops `id`'s own set and sweeps it out of every other set. Unknown
    /// ids are a no-op.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let mut changed = self.sets.remove(&id).is_some();
        self.sets.retain(|_, related| {
            changed |= related.remove(&id);
            !related.is_empty()
        });
        changed
    }

    /// Related ids in ascending order; empty when there are none.
    pub fn get(&self, id: ElementId) -> Vec<ElementId> {
        let mut out: Vec<ElementId> = self
            .sets
            .get(&id)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }

    pub fn contains(&self, a: ElementId, b: ElementId) -> bool {
        self.sets.get(&a).map_or(false, |s| s.contains(&b))
    }

    /// Everything reachable from `id`, excluding `id`, in BFS order.
    pub fn closure(&self, id: ElementId) -> Vec<ElementId> {
        let mut seen: HashSet<ElementId> = HashSet::new();
        seen.insert(id);
        let mut out = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(cur) = queue.pop_front() {
            for next in self.get(cur) {
                if seen.insert(next) {
                    out.push(next);
                    queue.push_back(next);
                }
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }

    fn to_pairs(&self) -> Vec<(ElementId, Vec<ElementId>)> {
        let mut keys: Vec<ElementId> = self.sets.keys().copied().collect();
        keys.sort_unstable();
        keys.into_iter().map(|k| (k, self.get(k))).collect()
    }

    fn from_pairs(pairs: Vec<(ElementId, Vec<ElementId>)>) -> Self {
        let mut rel = Relation::default();
        for (a, related) in pairs {
            for b in related {
                rel.link(a, b, false);
            }
        }
        rel
    }
}

/// Positional and rotational relationships between parametric elements.
#[derive(Clone, Debug, Default)]
pub struct ConstraintGraph {
    positional: Relation,
    rotational: Relation,
}

/// Sorted, serializable form of a [`ConstraintGraph`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub version: u32,
    pub positional: Vec<(ElementId, Vec<ElementId>)>,
    pub rotational: Vec<(ElementId, Vec<ElementId>)>,
}

impl ConstraintGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_positional(&mut self, a: ElementId, b: ElementId, bidirectional: bool) -> bool {
        self.positional.link(a, b, bidirectional)
    }

    pub fn set_rotational(&mut self, a: ElementId, b: ElementId, bidirectional: bool) -> bool {
        self.rotational.link(a, b, bidirectional)
    }

    pub fn remove_positional(&mut self, id: ElementId) -> bool {
        self.positional.remove(id)
    }

    pub fn remove_rotational(&mut self, id: ElementId) -> bool {
        self.rotational.remove(id)
    }

    /// Drops `id` from both relations, e.g. when the element is deleted.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        let p = self.positional.remove(id);
        let r = self.rotational.remove(id);
        p || r
    }

    pub fn get_positional(&self, id: ElementId) -> Vec<ElementId> {
        self.positional.get(id)
    }

    pub fn get_rotational(&self, id: ElementId) -> Vec<ElementId> {
        self.rotational.get(id)
    }

    pub fn positional_closure(&self, id: ElementId) -> Vec<ElementId> {
        self.positional.closure(id)
    }

    pub fn rotational_closure(&self, id: ElementId) -> Vec<ElementId> {
        self.rotational.closure(id)
    }

    pub fn positional(&self) -> &Relation {
        &self.positional
    }

    pub fn rotational(&self) -> &Relation {
        &self.rotational
    }

    /// Links every pair of a constraint's targets in the relation matching
    /// its kind. Opaque constraints carry no relation.
    pub fn link_constraint(&mut self, c: &Constraint) -> bool {
        let rel = match c.kind {
            ConstraintKind::Positional => &mut self.positional,
            ConstraintKind::Rotational => &mut self.rotational,
            ConstraintKind::Opaque => return false,
        };
        let mut changed = false;
        for (i, a) in c.targets.iter().enumerate() {
            for b in &c.targets[i + 1..] {
                changed |= rel.link(*a, *b, true);
            }
        }
        changed
    }

    pub fn clear(&mut self) {
        self.positional.clear();
        self.rotational.clear();
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            version: 1,
            positional: self.positional.to_pairs(),
            rotational: self.rotational.to_pairs(),
        }
    }

    pub fn from_snapshot(snap: GraphSnapshot) -> Self {
        ConstraintGraph {
            positional: Relation::from_pairs(snap.positional),
            rotational: Relation::from_pairs(snap.rotational),
        }
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_json_value(v: serde_json::Value) -> Result<Self> {
        let snap: GraphSnapshot = serde_json::from_value(v)?;
        Ok(Self::from_snapshot(snap))
    }
}
