use sketch::model::polygon_curves;
use sketch::request::RequestState;
use sketch::{
    Curve, DrawingRegionHook, DrawingRegionList, Point3, RegionEditRequest, RegionInput, Sketch2dBuilder,
    SketchBuilder, SketchError, SketchHandle, SketchRegistry, TransactionManager,
};
use std::cell::RefCell;
use std::rc::Rc;

fn registry() -> (SketchRegistry, SketchHandle) {
    let mut reg = SketchRegistry::new();
    let h = reg.insert(Box::new(Sketch2dBuilder::new()));
    (reg, h)
}

fn triangle(x0: f64) -> Vec<Curve> {
    polygon_curves(&[(x0, 0.0), (x0 + 3.0, 0.0), (x0, 3.0)])
}

fn square(x0: f64, y0: f64, s: f64) -> Vec<Curve> {
    polygon_curves(&[(x0, y0), (x0 + s, y0), (x0 + s, y0 + s), (x0, y0 + s)])
}

fn commit(reg: &mut SketchRegistry, h: SketchHandle, inputs: &[RegionInput]) -> RegionEditRequest {
    let mut req = RegionEditRequest::new(h);
    req.execute(reg, inputs).unwrap();
    req.commit(reg).unwrap();
    req
}

fn tags(reg: &SketchRegistry, h: SketchHandle) -> Vec<String> {
    reg.get(h).unwrap().regions().iter().map(|r| r.topo.clone()).collect()
}

#[test]
fn undo_restores_prior_regions() {
    let (mut reg, h) = registry();
    commit(&mut reg, h, &[RegionInput::new(square(10.0, 10.0, 2.0))]);
    let prior = reg.get(h).unwrap().regions().to_vec();

    let mut req = commit(&mut reg, h, &[RegionInput::new(triangle(0.0))]);
    assert_eq!(reg.get(h).unwrap().regions().len(), 2);
    req.undo(&mut reg).unwrap();
    assert_eq!(reg.get(h).unwrap().regions(), prior.as_slice());
    assert_eq!(tags(&reg, h), vec!["0_drawface"]);

    req.redo(&mut reg).unwrap();
    assert_eq!(tags(&reg, h), vec!["0_drawface", "1_drawface"]);
    assert_eq!(reg.get(h).unwrap().sketch().appendix.face_count, 2);
}

#[test]
fn redrawing_an_existing_face_is_a_replacement() {
    let (mut reg, h) = registry();
    commit(&mut reg, h, &[RegionInput::new(square(0.0, 0.0, 4.0))]);
    // Same outline, clockwise and starting elsewhere, with a hole this time.
    let mut outline = square(0.0, 0.0, 4.0);
    outline.rotate_left(1);
    let outline: Vec<Curve> = outline.iter().rev().map(Curve::reversed).collect();
    let input = RegionInput::new(outline).with_hole(square(1.0, 1.0, 1.0));
    let mut req = RegionEditRequest::new(h);
    req.execute(&mut reg, &[input]).unwrap();
    assert_eq!(req.built()[0].topo, "-1_face");
    req.commit(&mut reg).unwrap();

    let b = reg.get(h).unwrap();
    assert_eq!(tags(&reg, h), vec!["-1_face"]);
    assert_eq!(b.regions()[0].holes.len(), 1);
    assert!((b.sketch().faces[0].area - 15.0).abs() < 1e-9);
}

#[test]
fn one_request_in_flight_per_builder() {
    let (mut reg, h) = registry();
    let mut first = RegionEditRequest::new(h);
    first.execute(&mut reg, &[RegionInput::new(triangle(0.0))]).unwrap();
    let mut second = RegionEditRequest::new(h);
    let err = second.execute(&mut reg, &[RegionInput::new(triangle(5.0))]).unwrap_err();
    assert!(matches!(err, SketchError::RequestInFlight(_)));
    assert_eq!(err.code(), "request_in_flight");

    first.commit(&mut reg).unwrap();
    second.execute(&mut reg, &[RegionInput::new(triangle(5.0))]).unwrap();
    assert_eq!(second.state(), RequestState::Executed);
}

#[test]
fn dropping_an_uncommitted_request_cancels_it() {
    let (mut reg, h) = registry();
    {
        let mut req = RegionEditRequest::new(h);
        req.execute(&mut reg, &[RegionInput::new(triangle(0.0))]).unwrap();
        assert!(reg.is_in_flight(h));
    }
    assert!(!reg.is_in_flight(h));
    assert!(reg.get(h).unwrap().regions().is_empty());
}

#[test]
fn execute_leaves_the_builder_untouched() {
    let (mut reg, h) = registry();
    let mut req = RegionEditRequest::new(h);
    req.execute(&mut reg, &[RegionInput::new(triangle(0.0))]).unwrap();
    assert!(reg.get(h).unwrap().regions().is_empty());
    assert_eq!(reg.get(h).unwrap().sketch().appendix.face_count, 0);
    assert_eq!(req.inputs()[0].outer, triangle(0.0));
}

#[test]
fn open_outer_boundary_is_rejected() {
    let (mut reg, h) = registry();
    let mut open = square(0.0, 0.0, 2.0);
    open.pop();
    let good = RegionInput::new(triangle(5.0));
    let err = RegionEditRequest::new(h)
        .execute(&mut reg, &[good, RegionInput::new(open)])
        .unwrap_err();
    assert!(matches!(err, SketchError::InvalidRegion { index: 1, .. }));
    // No topo id was spent on the rejected batch.
    let mut req = RegionEditRequest::new(h);
    req.execute(&mut reg, &[RegionInput::new(triangle(5.0))]).unwrap();
    assert_eq!(req.built()[0].topo, "0_drawface");
}

#[test]
fn limits_are_enforced() {
    let (mut reg, h) = registry();
    let far = polygon_curves(&[(0.0, 0.0), (2.0e9, 0.0), (0.0, 1.0)]);
    let err = RegionEditRequest::new(h)
        .execute(&mut reg, &[RegionInput::new(far)])
        .unwrap_err();
    assert_eq!(err.code(), "non_finite");

    let mut many = RegionInput::new(square(0.0, 0.0, 100.0));
    for _ in 0..=sketch::geometry::limits::MAX_HOLES_PER_REGION {
        many.holes.push(square(1.0, 1.0, 1.0));
    }
    let err = RegionEditRequest::new(h).execute(&mut reg, &[many]).unwrap_err();
    assert!(matches!(err, SketchError::LimitExceeded { .. }));
}

#[test]
fn unknown_handle_is_reported() {
    let mut reg = SketchRegistry::new();
    let err = RegionEditRequest::new(SketchHandle(9))
        .execute(&mut reg, &[RegionInput::new(triangle(0.0))])
        .unwrap_err();
    assert_eq!(err.code(), "invalid_id");
}

#[test]
fn drawing_region_hook_through_transactions() {
    let (mut reg, h) = registry();
    let list = Rc::new(RefCell::new(DrawingRegionList::new()));
    let mut tx = TransactionManager::new();

    let mut req = RegionEditRequest::new(h).with_hook(Box::new(DrawingRegionHook::new(Rc::clone(&list))));
    req.execute(&mut reg, &[RegionInput::new(triangle(0.0))]).unwrap();
    tx.commit(&mut reg, Box::new(req)).unwrap();
    assert_eq!(list.borrow().len(), 1);
    let marker = list.borrow().regions()[0].clone();
    assert_eq!(marker.topo, "0_drawface");
    assert!(marker.outer.contains(&Point3::xy(3.0, 0.0)));

    // A second face: the hook does not fire.
    let mut req = RegionEditRequest::new(h).with_hook(Box::new(DrawingRegionHook::new(Rc::clone(&list))));
    req.execute(&mut reg, &[RegionInput::new(triangle(10.0))]).unwrap();
    tx.commit(&mut reg, Box::new(req)).unwrap();
    assert_eq!(list.borrow().len(), 1);

    assert!(tx.undo(&mut reg).unwrap());
    assert!(tx.undo(&mut reg).unwrap());
    assert!(list.borrow().is_empty());
    assert!(reg.get(h).unwrap().regions().is_empty());
    assert!(tx.redo(&mut reg).unwrap());
    assert_eq!(list.borrow().regions(), &[marker]);
}

#[test]
fn arc_boundaries_become_faces() {
    let (mut reg, h) = registry();
    let arc = Curve::arc(Point3::xy(0.0, 0.0), 1.0, 0.0, std::f64::consts::PI);
    let chord = Curve::line(Point3::xy(-1.0, 0.0), Point3::xy(1.0, 0.0));
    commit(&mut reg, h, &[RegionInput::new(vec![chord, arc])]);
    let face = &reg.get(h).unwrap().sketch().faces[0];
    assert!((face.area - std::f64::consts::FRAC_PI_2).abs() < 1e-2);
}

const NOTCHED: [(f64, f64); 8] = [
    (0.0, 0.0),
    (10.0, 0.0),
    (10.0, 10.0),
    (6.0, 10.0),
    (6.0, 2.0),
    (4.0, 2.0),
    (4.0, 10.0),
    (0.0, 10.0),
];

#[test]
fn hole_across_a_concave_notch_is_rejected() {
    let (mut reg, h) = registry();
    let across = polygon_curves(&[(2.0, 5.0), (8.0, 5.0), (8.0, 7.0), (2.0, 7.0)]);
    let input = RegionInput::new(polygon_curves(&NOTCHED)).with_hole(across);
    let err = RegionEditRequest::new(h).execute(&mut reg, &[input]).unwrap_err();
    assert!(matches!(err, SketchError::InvalidRegion { index: 0, .. }));
    assert!(!reg.is_in_flight(h));

    // A hole kept within one prong is fine.
    let inside = polygon_curves(&[(1.0, 4.0), (3.0, 4.0), (3.0, 6.0), (1.0, 6.0)]);
    commit(&mut reg, h, &[RegionInput::new(polygon_curves(&NOTCHED)).with_hole(inside)]);
    let face = &reg.get(h).unwrap().sketch().faces[0];
    assert!((face.area - 80.0).abs() < 1e-9);
}

#[test]
fn overlapping_or_nested_holes_are_rejected() {
    let (mut reg, h) = registry();
    let overlapping = RegionInput::new(square(0.0, 0.0, 10.0))
        .with_hole(square(1.0, 1.0, 3.0))
        .with_hole(square(2.0, 2.0, 3.0));
    let nested = RegionInput::new(square(0.0, 0.0, 10.0))
        .with_hole(square(1.0, 1.0, 6.0))
        .with_hole(square(2.0, 2.0, 1.0));
    for input in [overlapping, nested] {
        let err = RegionEditRequest::new(h).execute(&mut reg, &[input]).unwrap_err();
        assert_eq!(err.code(), "invalid_region");
    }
    let apart = RegionInput::new(square(0.0, 0.0, 10.0))
        .with_hole(square(1.0, 1.0, 2.0))
        .with_hole(square(5.0, 5.0, 2.0));
    commit(&mut reg, h, &[apart]);
    assert!((reg.get(h).unwrap().sketch().faces[0].area - 92.0).abs() < 1e-9);
}

#[test]
fn undo_and_redo_wait_for_the_request_in_flight() {
    let (mut reg, h) = registry();
    let mut tx = TransactionManager::new();
    let mut first = RegionEditRequest::new(h);
    first.execute(&mut reg, &[RegionInput::new(square(0.0, 0.0, 4.0))]).unwrap();
    tx.commit(&mut reg, Box::new(first)).unwrap();

    let mut redraw = RegionEditRequest::new(h);
    redraw.execute(&mut reg, &[RegionInput::new(square(0.0, 0.0, 4.0))]).unwrap();
    assert_eq!(redraw.built()[0].topo, "-1_face");
    let err = tx.undo(&mut reg).unwrap_err();
    assert!(matches!(err, SketchError::RequestInFlight(_)));
    assert!(tx.can_undo());
    assert_eq!(tags(&reg, h), vec!["0_drawface"]);

    redraw.commit(&mut reg).unwrap();
    assert_eq!(tags(&reg, h), vec!["-1_face"]);
    assert_eq!(reg.get(h).unwrap().regions().len(), 1);

    assert!(tx.undo(&mut reg).unwrap());
    let mut pending = RegionEditRequest::new(h);
    pending.execute(&mut reg, &[RegionInput::new(triangle(20.0))]).unwrap();
    assert!(matches!(tx.redo(&mut reg), Err(SketchError::RequestInFlight(_))));
    drop(pending);
    assert!(tx.redo(&mut reg).unwrap());
}

#[test]
fn cancelled_request_spends_no_topo_ids() {
    let (mut reg, h) = registry();
    {
        let mut req = RegionEditRequest::new(h);
        req.execute(&mut reg, &[RegionInput::new(triangle(0.0))]).unwrap();
        assert_eq!(req.built()[0].topo, "0_drawface");
    }
    let req = commit(&mut reg, h, &[RegionInput::new(triangle(0.0))]);
    assert_eq!(req.built()[0].topo, "0_drawface");
    assert_eq!(tags(&reg, h), vec!["0_drawface"]);
    let req = commit(&mut reg, h, &[RegionInput::new(triangle(10.0))]);
    assert_eq!(req.built()[0].topo, "1_drawface");
}

#[test]
fn one_face_cannot_be_redrawn_twice_in_a_request() {
    let (mut reg, h) = registry();
    commit(&mut reg, h, &[RegionInput::new(square(0.0, 0.0, 4.0))]);
    let mut rotated = square(0.0, 0.0, 4.0);
    rotated.rotate_left(2);
    let err = RegionEditRequest::new(h)
        .execute(&mut reg, &[RegionInput::new(square(0.0, 0.0, 4.0)), RegionInput::new(rotated)])
        .unwrap_err();
    assert!(matches!(err, SketchError::InvalidRegion { index: 1, .. }));
    assert_eq!(tags(&reg, h), vec!["0_drawface"]);
}
