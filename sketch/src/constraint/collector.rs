use std::collections::HashSet;

use crate::error::{Result, SketchError};
use crate::model::Constraint;

pub type NodeId = u32;

/// Node capabilities the collector relies on. Nodes that cannot carry
/// constraints simply report none.
pub trait ConstraintScene {
    fn contains(&self, node: NodeId) -> bool;

    fn for_each_constraint(&self, node: NodeId, f: &mut dyn FnMut(&Constraint));

    /// Children in their natural order.
    fn for_each_child(&self, node: NodeId, f: &mut dyn FnMut(NodeId));
}

/// Depth-first pre-order of the subtree under `root`. A node reached twice
/// fails the whole walk before any constraint is reported.
fn traversal_order<S: ConstraintScene + ?Sized>(scene: &S, root: NodeId) -> Result<Vec<NodeId>> {
    if !scene.contains(root) {
        return Err(SketchError::UnknownNode(root));
    }
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![root];
    let mut children = Vec::new();
    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            log::warn!("constraint collection aborted: node {} reached twice", node);
            return Err(SketchError::CycleDetected { node });
        }
        order.push(node);
        children.clear();
        scene.for_each_child(node, &mut |c| children.push(c));
        for &c in children.iter().rev() {
            if !scene.contains(c) {
                return Err(SketchError::UnknownNode(c));
            }
            stack.push(c);
        }
    }
    Ok(order)
}

/// Calls `callback` once per constraint reachable from `root`, in discovery
/// order. Returns the number of constraints reported.
pub fn collect_constraints<S, F>(scene: &S, root: NodeId, mut callback: F) -> Result<usize>
where
    S: ConstraintScene + ?Sized,
    F: FnMut(&Constraint),
{
    collect_constraints_with(scene, root, &mut (), |_, c| callback(c))
}

/// Same as [`collect_constraints`] with `context` handed to every call.
pub fn collect_constraints_with<S, C, F>(scene: &S, root: NodeId, context: &mut C, mut callback: F) -> Result<usize>
where
    S: ConstraintScene + ?Sized,
    F: FnMut(&mut C, &Constraint),
{
    let order = traversal_order(scene, root)?;
    let mut count = 0usize;
    for node in order {
        scene.for_each_constraint(node, &mut |c| {
            callback(context, c);
            count += 1;
        });
    }
    log::debug!("collected {} constraints under node {}", count, root);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintKind, ElementId};
    use std::collections::HashMap;

    #[derive(Default)]
    struct AdjScene {
        children: HashMap<NodeId, Vec<NodeId>>,
        constraints: HashMap<NodeId, Vec<Constraint>>,
    }

    impl ConstraintScene for AdjScene {
        fn contains(&self, node: NodeId) -> bool {
            self.children.contains_key(&node)
        }
        fn for_each_constraint(&self, node: NodeId, f: &mut dyn FnMut(&Constraint)) {
            for c in self.constraints.get(&node).into_iter().flatten() {
                f(c);
            }
        }
        fn for_each_child(&self, node: NodeId, f: &mut dyn FnMut(NodeId)) {
            for c in self.children.get(&node).into_iter().flatten() {
                f(*c);
            }
        }
    }

    fn c(id: u32) -> Constraint {
        Constraint::new(id, ConstraintKind::Opaque, vec![ElementId(id)])
    }

    fn sample() -> AdjScene {
        let mut s = AdjScene::default();
        s.children.insert(0, vec![1, 2]);
        s.children.insert(1, vec![3]);
        s.children.insert(2, vec![]);
        s.children.insert(3, vec![]);
        s.constraints.insert(0, vec![c(10)]);
        s.constraints.insert(3, vec![c(30), c(31)]);
        s.constraints.insert(2, vec![c(20)]);
        s
    }

    #[test]
    fn depth_first_natural_order() {
        let s = sample();
        let mut ids = Vec::new();
        let n = collect_constraints(&s, 0, |c| ids.push(c.id.0)).unwrap();
        assert_eq!(n, 4);
        assert_eq!(ids, vec![10, 30, 31, 20]);
    }

    #[test]
    fn context_is_passed_through() {
        let s = sample();
        let mut ctx: Vec<u32> = Vec::new();
        collect_constraints_with(&s, 1, &mut ctx, |acc, c| acc.push(c.id.0)).unwrap();
        assert_eq!(ctx, vec![30, 31]);
    }

    #[test]
    fn cycle_is_an_error_and_reports_nothing() {
        let mut s = sample();
        s.children.insert(3, vec![0]);
        let mut calls = 0;
        let r = collect_constraints(&s, 0, |_| calls += 1);
        assert!(matches!(r, Err(SketchError::CycleDetected { node: 0 })));
        assert_eq!(calls, 0);
    }

    #[test]
    fn unknown_root() {
        let s = sample();
        assert!(matches!(collect_constraints(&s, 42, |_| {}), Err(SketchError::UnknownNode(42))));
    }
}
