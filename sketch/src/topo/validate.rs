//! Structural checks for loops held in a [`TopoStore`].

use super::store::{LoopId, TopoStore};

#[derive(Clone, Debug, PartialEq)]
pub enum LoopIssue {
    Missing,
    Empty,
    LengthMismatch { coedges: usize, vertices: usize },
    Dangling { at: usize },
    /// Coedge `at` does not end where coedge `at + 1` starts.
    Open { at: usize },
    /// Vertex `at` is not the traversal start of coedge `at`.
    VertexOff { at: usize },
}

pub fn validate_loop(store: &TopoStore, id: LoopId, tol: f64) -> Vec<LoopIssue> {
    let mut issues = Vec::new();
    let lp = match store.get_loop(id) {
        Some(lp) => lp,
        None => return vec![LoopIssue::Missing],
    };
    if lp.is_empty() {
        issues.push(LoopIssue::Empty);
        return issues;
    }
    if lp.coedges().len() != lp.vertices().len() {
        issues.push(LoopIssue::LengthMismatch {
            coedges: lp.coedges().len(),
            vertices: lp.vertices().len(),
        });
        return issues;
    }
    let mut curves = Vec::with_capacity(lp.len());
    for (i, c) in lp.coedges().iter().enumerate() {
        match (store.coedge_curve(*c), store.vertex(lp.vertices()[i])) {
            (Some(curve), Some(v)) => {
                if !curve.start_pt().coincides(&v.pos, tol) {
                    issues.push(LoopIssue::VertexOff { at: i });
                }
                curves.push(curve);
            }
            _ => {
                issues.push(LoopIssue::Dangling { at: i });
                return issues;
            }
        }
    }
    let n = curves.len();
    for i in 0..n {
        if !curves[i].end_pt().coincides(&curves[(i + 1) % n].start_pt(), tol) {
            issues.push(LoopIssue::Open { at: i });
        }
    }
    issues
}
