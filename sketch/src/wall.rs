//! Derived wall topology, composed from a layer's slab and room builders.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;

use crate::error::{Result, SketchError};
use crate::model::Region;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WallId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u32);

impl fmt::Display for WallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallSide {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: WallId,
    pub parent: Option<LayerId>,
}

impl Wall {
    pub fn new(id: u32, parent: Option<u32>) -> Self {
        Wall {
            id: WallId(id),
            parent: parent.map(LayerId),
        }
    }
}

/// Which side of the wall faces outdoors; `None` when neither does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OuterWallInfo {
    pub outer_wall_side: Option<WallSide>,
    pub reversed: bool,
}

pub trait SlabBuilder {
    fn outer_wall_info(&self, wall: &Wall) -> OuterWallInfo;
    fn is_wall_shared(&self, wall: &Wall) -> bool;
    fn is_interior_wall(&self, wall: &Wall) -> bool;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoomWallInfo {
    pub regions: Vec<Region>,
}

pub trait RoomBuilder {
    fn wall_info(&self, wall: WallId) -> RoomWallInfo;
}

/// Per-layer services a wall's topology is computed from.
pub trait LayerServices {
    fn id(&self) -> LayerId;
    fn slab_builder(&self) -> &dyn SlabBuilder;
    fn room_builder(&self) -> &dyn RoomBuilder;
}

pub trait LayerLookup {
    fn layer(&self, id: LayerId) -> Option<&dyn LayerServices>;
}

impl<L: LayerServices> LayerLookup for [L] {
    fn layer(&self, id: LayerId) -> Option<&dyn LayerServices> {
        self.iter().find(|l| l.id() == id).map(|l| l as &dyn LayerServices)
    }
}

/// Snapshot of a wall's topology at construction time. Not refreshed when
/// the wall or layer changes afterwards; build a new one instead.
pub struct WallTopologyInfo<'a> {
    wall: &'a Wall,
    layer: &'a dyn LayerServices,
    pub outer_wall_side: Option<WallSide>,
    pub reversed: bool,
    pub shared: bool,
    pub regions: Vec<Region>,
    is_interior: Cell<Option<bool>>,
}

impl<'a> WallTopologyInfo<'a> {
    pub fn new<L: LayerLookup + ?Sized>(wall: &'a Wall, layers: &'a L) -> Result<Self> {
        let layer_id = wall.parent.ok_or(SketchError::MissingLayer { wall: wall.id })?;
        let layer = layers.layer(layer_id).ok_or(SketchError::UnknownLayer {
            wall: wall.id,
            layer: layer_id,
        })?;
        Ok(Self::with_layer(wall, layer))
    }

    /// Uses `layer` directly, bypassing the parent lookup.
    pub fn with_layer(wall: &'a Wall, layer: &'a dyn LayerServices) -> Self {
        let slab = layer.slab_builder();
        let outer = slab.outer_wall_info(wall);
        let shared = slab.is_wall_shared(wall);
        let regions = layer.room_builder().wall_info(wall.id).regions;
        WallTopologyInfo {
            wall,
            layer,
            outer_wall_side: outer.outer_wall_side,
            reversed: outer.reversed,
            shared,
            regions,
            is_interior: Cell::new(None),
        }
    }

    pub fn wall(&self) -> &Wall {
        self.wall
    }

    pub fn layer(&self) -> LayerId {
        self.layer.id()
    }

    /// Asked of the slab builder once, then memoized.
    pub fn is_interior_wall(&self) -> bool {
        if let Some(v) = self.is_interior.get() {
            return v;
        }
        let v = self.layer.slab_builder().is_interior_wall(self.wall);
        self.is_interior.set(Some(v));
        v
    }

    /// Side facing the rooms: the opposite of the outer side.
    pub fn inner_wall_side(&self) -> Option<WallSide> {
        self.outer_wall_side.map(|s| match s {
            WallSide::Left => WallSide::Right,
            WallSide::Right => WallSide::Left,
        })
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

impl fmt::Debug for WallTopologyInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WallTopologyInfo")
            .field("wall", &self.wall.id)
            .field("layer", &self.layer.id())
            .field("outer_wall_side", &self.outer_wall_side)
            .field("reversed", &self.reversed)
            .field("shared", &self.shared)
            .field("regions", &self.regions.len())
            .field("is_interior", &self.is_interior.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Slab {
        interior_calls: Cell<u32>,
    }

    impl SlabBuilder for Slab {
        fn outer_wall_info(&self, _wall: &Wall) -> OuterWallInfo {
            OuterWallInfo {
                outer_wall_side: Some(WallSide::Left),
                reversed: true,
            }
        }
        fn is_wall_shared(&self, wall: &Wall) -> bool {
            wall.id.0 % 2 == 0
        }
        fn is_interior_wall(&self, _wall: &Wall) -> bool {
            self.interior_calls.set(self.interior_calls.get() + 1);
            false
        }
    }

    struct Rooms;

    impl RoomBuilder for Rooms {
        fn wall_info(&self, _wall: WallId) -> RoomWallInfo {
            RoomWallInfo::default()
        }
    }

    struct Layer {
        slab: Slab,
        rooms: Rooms,
    }

    impl LayerServices for Layer {
        fn id(&self) -> LayerId {
            LayerId(7)
        }
        fn slab_builder(&self) -> &dyn SlabBuilder {
            &self.slab
        }
        fn room_builder(&self) -> &dyn RoomBuilder {
            &self.rooms
        }
    }

    fn layers() -> Vec<Layer> {
        vec![Layer {
            slab: Slab {
                interior_calls: Cell::new(0),
            },
            rooms: Rooms,
        }]
    }

    #[test]
    fn interior_check_is_lazy_and_memoized() {
        let layers = layers();
        let wall = Wall::new(4, Some(7));
        let info = WallTopologyInfo::new(&wall, layers.as_slice()).unwrap();
        assert_eq!(layers[0].slab.interior_calls.get(), 0);
        assert!(!info.is_interior_wall());
        assert!(!info.is_interior_wall());
        assert_eq!(layers[0].slab.interior_calls.get(), 1);
        assert_eq!(info.inner_wall_side(), Some(WallSide::Right));
        assert!(info.shared);
    }

    #[test]
    fn unknown_parent_is_reported() {
        let layers = layers();
        let wall = Wall::new(3, Some(99));
        let err = WallTopologyInfo::new(&wall, layers.as_slice()).unwrap_err();
        assert_eq!(err.code(), "missing_layer");
        assert!(err.to_string().contains("wall 3"));
    }
}
