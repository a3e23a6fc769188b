use sketch::model::polygon_curves;
use sketch::wall::{LayerLookup, LayerServices, OuterWallInfo, RoomBuilder, RoomWallInfo, SlabBuilder, WallSide};
use sketch::{LayerId, Region, SketchError, Wall, WallId, WallTopologyInfo};
use std::cell::Cell;
use std::collections::HashMap;

/// Slab with fixed answers per wall.
struct FixedSlab {
    outer: HashMap<WallId, OuterWallInfo>,
    interior: Cell<u32>,
}

impl SlabBuilder for FixedSlab {
    fn outer_wall_info(&self, wall: &Wall) -> OuterWallInfo {
        self.outer.get(&wall.id).copied().unwrap_or(OuterWallInfo {
            outer_wall_side: None,
            reversed: false,
        })
    }

    fn is_wall_shared(&self, wall: &Wall) -> bool {
        self.outer.get(&wall.id).is_none()
    }

    fn is_interior_wall(&self, wall: &Wall) -> bool {
        self.interior.set(self.interior.get() + 1);
        self.outer.get(&wall.id).map_or(true, |o| o.outer_wall_side.is_none())
    }
}

struct Rooms(Vec<Region>);

impl RoomBuilder for Rooms {
    fn wall_info(&self, _wall: WallId) -> RoomWallInfo {
        RoomWallInfo { regions: self.0.clone() }
    }
}

struct Floor {
    id: LayerId,
    slab: FixedSlab,
    rooms: Rooms,
}

impl LayerServices for Floor {
    fn id(&self) -> LayerId {
        self.id
    }
    fn slab_builder(&self) -> &dyn SlabBuilder {
        &self.slab
    }
    fn room_builder(&self) -> &dyn RoomBuilder {
        &self.rooms
    }
}

/// A building keyed by layer id.
struct Building(HashMap<LayerId, Floor>);

impl LayerLookup for Building {
    fn layer(&self, id: LayerId) -> Option<&dyn LayerServices> {
        self.0.get(&id).map(|f| f as &dyn LayerServices)
    }
}

fn building() -> Building {
    let mut outer = HashMap::new();
    outer.insert(
        WallId(1),
        OuterWallInfo {
            outer_wall_side: Some(WallSide::Right),
            reversed: true,
        },
    );
    let room = Region {
        outer: polygon_curves(&[(0.0, 0.0), (5.0, 0.0), (5.0, 4.0), (0.0, 4.0)]),
        holes: Vec::new(),
        topo: "0_drawface".to_string(),
    };
    let floor = Floor {
        id: LayerId(2),
        slab: FixedSlab {
            outer,
            interior: Cell::new(0),
        },
        rooms: Rooms(vec![room.clone(), room]),
    };
    let mut floors = HashMap::new();
    floors.insert(floor.id, floor);
    Building(floors)
}

#[test]
fn wall_without_layer_is_an_error() {
    let b = building();
    let wall = Wall::new(42, None);
    let err = WallTopologyInfo::new(&wall, &b).unwrap_err();
    assert!(matches!(err, SketchError::MissingLayer { wall: WallId(42) }));
    assert!(err.to_string().contains("42"));
}

#[test]
fn exterior_wall_is_populated() {
    let b = building();
    let wall = Wall::new(1, Some(2));
    let info = WallTopologyInfo::new(&wall, &b).unwrap();
    assert_eq!(info.outer_wall_side, Some(WallSide::Right));
    assert_eq!(info.inner_wall_side(), Some(WallSide::Left));
    assert!(info.reversed);
    assert!(!info.shared);
    assert_eq!(info.region_count(), 2);
    assert_eq!(info.layer(), LayerId(2));
    assert!(!info.is_interior_wall());
}

#[test]
fn interior_wall_is_asked_once() {
    let b = building();
    let wall = Wall::new(7, Some(2));
    let info = WallTopologyInfo::new(&wall, &b).unwrap();
    assert!(info.shared);
    assert_eq!(info.outer_wall_side, None);
    for _ in 0..3 {
        assert!(info.is_interior_wall());
    }
    assert_eq!(b.0[&LayerId(2)].slab.interior.get(), 1);
}
