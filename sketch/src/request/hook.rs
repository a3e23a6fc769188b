use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use crate::model::Point3;
use crate::sketch::Sketch;

/// Runs after a region edit has been written to its builder.
pub trait PostCommitHook {
    fn after_commit(&mut self, sketch: &Sketch);

    fn after_undo(&mut self, _sketch: &Sketch) {}

    fn after_redo(&mut self, _sketch: &Sketch) {}
}

/// Marker for a face the user just drew.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawingRegion {
    pub id: u32,
    pub topo: String,
    pub outer: Vec<Point3>,
}

/// Drawing regions of the active layer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DrawingRegionList {
    regions: Vec<DrawingRegion>,
    next_id: u32,
}

impl DrawingRegionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push(&mut self, region: DrawingRegion) {
        self.regions.push(region);
    }

    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.regions.len();
        self.regions.retain(|r| r.id != id);
        self.regions.len() != before
    }

    pub fn get(&self, id: u32) -> Option<&DrawingRegion> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn regions(&self) -> &[DrawingRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Adds a drawing region when a commit leaves exactly one face.
pub struct DrawingRegionHook {
    list: Rc<RefCell<DrawingRegionList>>,
    created: Option<DrawingRegion>,
}

impl DrawingRegionHook {
    pub fn new(list: Rc<RefCell<DrawingRegionList>>) -> Self {
        DrawingRegionHook { list, created: None }
    }

    pub fn created(&self) -> Option<&DrawingRegion> {
        self.created.as_ref()
    }
}

impl PostCommitHook for DrawingRegionHook {
    fn after_commit(&mut self, sketch: &Sketch) {
        let face = match sketch.faces.as_slice() {
            [face] => face,
            _ => return,
        };
        let mut list = self.list.borrow_mut();
        let marker = DrawingRegion {
            id: list.allocate_id(),
            topo: face.topo.clone(),
            outer: face.outer.clone(),
        };
        log::debug!("drawing region {} created for face {}", marker.id, marker.topo);
        list.push(marker.clone());
        self.created = Some(marker);
    }

    fn after_undo(&mut self, _sketch: &Sketch) {
        if let Some(m) = &self.created {
            self.list.borrow_mut().remove(m.id);
        }
    }

    fn after_redo(&mut self, _sketch: &Sketch) {
        if let Some(m) = &self.created {
            let mut list = self.list.borrow_mut();
            if list.get(m.id).is_none() {
                list.push(m.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::Face;

    fn face(topo: &str) -> Face {
        Face {
            topo: topo.to_string(),
            outer: vec![Point3::xy(0.0, 0.0), Point3::xy(1.0, 0.0), Point3::xy(0.0, 1.0)],
            holes: Vec::new(),
            area: 0.5,
        }
    }

    #[test]
    fn marker_only_for_single_face() {
        let list = Rc::new(RefCell::new(DrawingRegionList::new()));
        let mut hook = DrawingRegionHook::new(Rc::clone(&list));
        let mut sketch = Sketch::default();
        sketch.faces = vec![face("0_drawface"), face("1_drawface")];
        hook.after_commit(&sketch);
        assert!(list.borrow().is_empty());
        sketch.faces.truncate(1);
        hook.after_commit(&sketch);
        assert_eq!(list.borrow().len(), 1);
        assert_eq!(list.borrow().regions()[0].topo, "0_drawface");
    }

    #[test]
    fn undo_and_redo_toggle_the_same_marker() {
        let list = Rc::new(RefCell::new(DrawingRegionList::new()));
        let mut hook = DrawingRegionHook::new(Rc::clone(&list));
        let sketch = Sketch {
            faces: vec![face("-1_face")],
            ..Sketch::default()
        };
        hook.after_commit(&sketch);
        let id = hook.created().unwrap().id;
        hook.after_undo(&sketch);
        assert!(list.borrow().is_empty());
        hook.after_redo(&sketch);
        assert_eq!(list.borrow().regions()[0].id, id);
        hook.after_redo(&sketch);
        assert_eq!(list.borrow().len(), 1);
    }
}
