use std::collections::BTreeMap;

use bevy::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::fixed_math::{FixedNum, FixedVec2};
use super::graph::{Vertex, WorldGraph};
use super::pathfinding;

mod systems;

pub use systems::{handle_map_clicks, ingest_loaded_batches, setup_world_map, MapClick, WorldMapHandle, WorldMapPlugin};

/// Unit offsets to the six neighbors of a cell on an even row.
pub const EVEN_ROW_NEIGHBORS: [(i32, i32); 6] =
    [(-1, 0), (1, 0), (0, -1), (-1, -1), (0, 1), (-1, 1)];

/// Unit offsets to the six neighbors of a cell on an odd row. Mirrors the
/// even-row set across the stagger so that every offset is reciprocal
/// between adjacent rows.
pub const ODD_ROW_NEIGHBORS: [(i32, i32); 6] =
    [(-1, 0), (1, 0), (0, -1), (1, -1), (0, 1), (1, 1)];

/// Row multiplier for draw ordering. Must exceed the z-index range of any
/// single cell so stacking never crosses rows.
const ROW_ORDER_STRIDE: i32 = -100;

/// Draw order shared by terrain layers and actors: rows stack back to front,
/// z resolves stacking within a row.
pub fn sort_order(v: Vertex, z: i32) -> i32 {
    v.y * ROW_ORDER_STRIDE + z
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Excluded from the traversal graph and never a destination.
    Blocked,
    /// Open to traversal and occupancy.
    Walkable,
    /// Reachable only as an adjacent terminal hop, never occupied.
    Visitable,
}

/// One visual layer of a tile as delivered by the map-data collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileLayer {
    pub sprite: String,
    pub offset: Option<(f32, f32)>,
    pub scale: Option<f32>,
    pub color: Option<[f32; 4]>,
    pub z: i32,
}

/// External tile descriptor, one per cell of an ingestion batch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileSeed {
    pub position: Vertex,
    pub kind: TileKind,
    pub layers: Vec<TileLayer>,
    pub on_visit: Option<String>,
    pub occupant: Option<String>,
}

/// A complete map delivery. Also loadable as a hot-reloadable RON asset.
#[derive(Asset, TypePath, Clone, Debug, Serialize, Deserialize)]
pub struct TileBatch {
    pub tiles: Vec<TileSeed>,
}

/// Owned registry entry for one cell.
#[derive(Clone, Debug)]
pub struct Tile {
    pub kind: TileKind,
    pub on_visit: Option<String>,
    pub occupant: Option<String>,
}

/// One render registry entry, keyed by (position, z). Consumed opaquely by
/// the rendering collaborator.
#[derive(Clone, Debug)]
pub struct RenderEntry {
    pub sprite: String,
    pub offset: Option<(f32, f32)>,
    pub scale: Option<f32>,
    pub color: Option<[f32; 4]>,
    pub order: i32,
}

/// A resolved click: the vertex path to walk and the clicked tile's on-visit
/// action, delivered with the arrival notification.
#[derive(Clone, Debug)]
pub struct Route {
    pub vertices: Vec<Vertex>,
    pub on_visit: Option<String>,
}

/// The exploration world map: tile and render registries plus the layout
/// needed to move between grid and world coordinates.
#[derive(Resource)]
pub struct WorldMap {
    tile_width: FixedNum,
    row_height: FixedNum,
    tiles: BTreeMap<Vertex, Tile>,
    render: FxHashMap<(Vertex, i32), RenderEntry>,
}

impl WorldMap {
    pub fn new(tile_width: f32, row_height: f32) -> Self {
        assert!(
            tile_width > 0.0 && row_height > 0.0,
            "world map layout requires positive tile dimensions"
        );
        Self {
            tile_width: FixedNum::from_num(tile_width),
            row_height: FixedNum::from_num(row_height),
            tiles: BTreeMap::new(),
            render: FxHashMap::default(),
        }
    }

    /// Replace the whole tile registry with a fresh batch. Returns the
    /// occupant descriptors so the caller can spawn them as actors.
    pub fn ingest(&mut self, batch: &TileBatch) -> Vec<(Vertex, String)> {
        self.tiles.clear();
        self.render.clear();

        let mut occupants = Vec::new();
        for seed in &batch.tiles {
            for layer in &seed.layers {
                self.render.insert(
                    (seed.position, layer.z),
                    RenderEntry {
                        sprite: layer.sprite.clone(),
                        offset: layer.offset,
                        scale: layer.scale,
                        color: layer.color,
                        order: sort_order(seed.position, layer.z),
                    },
                );
            }
            if let Some(id) = &seed.occupant {
                occupants.push((seed.position, id.clone()));
            }
            self.tiles.insert(
                seed.position,
                Tile {
                    kind: seed.kind,
                    on_visit: seed.on_visit.clone(),
                    occupant: seed.occupant.clone(),
                },
            );
        }
        occupants
    }

    pub fn tile(&self, v: Vertex) -> Option<&Tile> {
        self.tiles.get(&v)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Terrain render entries with their (position, z) keys.
    pub fn render_entries(&self) -> impl Iterator<Item = (&(Vertex, i32), &RenderEntry)> {
        self.render.iter()
    }

    pub fn render_entry(&self, v: Vertex, z: i32) -> Option<&RenderEntry> {
        self.render.get(&(v, z))
    }

    /// World position of a cell center. Odd rows are staggered half a tile
    /// to the right.
    pub fn vertex_to_world(&self, v: Vertex) -> FixedVec2 {
        let stagger = if v.y.rem_euclid(2) == 1 {
            FixedNum::from_num(0.5)
        } else {
            FixedNum::ZERO
        };
        FixedVec2::new(
            (FixedNum::from_num(v.x) + stagger) * self.tile_width,
            FixedNum::from_num(v.y) * self.row_height,
        )
    }

    /// Nearest cell to a world position; exact inverse of `vertex_to_world`
    /// on cell centers.
    pub fn world_to_vertex(&self, p: FixedVec2) -> Vertex {
        let row: i32 = (p.y / self.row_height).round().to_num();
        let stagger = if row.rem_euclid(2) == 1 {
            FixedNum::from_num(0.5)
        } else {
            FixedNum::ZERO
        };
        let col: i32 = (p.x / self.tile_width - stagger).round().to_num();
        Vertex::new(col, row)
    }

    /// Resolve a clicked world point into a route for the hero standing at
    /// `hero_at`. `None` means no movement: the click landed off-map, on a
    /// Blocked tile, or on something unreachable.
    pub fn resolve_click(&self, point: FixedVec2, hero_at: Vertex) -> Option<Route> {
        let target = self.world_to_vertex(point);
        let tile = self.tiles.get(&target)?;

        let vertices = match tile.kind {
            TileKind::Walkable => pathfinding::shortest_path(self, hero_at, target),
            TileKind::Visitable => {
                // Approach the cell without ever occupying it: path to the
                // closest of its walkable neighbors.
                let approaches: Vec<Vertex> = self.neighbors(target).into_iter().collect();
                pathfinding::shortest_path_to_closest(self, hero_at, &approaches)
            }
            TileKind::Blocked => return None,
        };

        if vertices.is_empty() {
            return None;
        }
        Some(Route {
            vertices,
            on_visit: tile.on_visit.clone(),
        })
    }
}

impl WorldGraph for WorldMap {
    fn vertices(&self) -> Vec<Vertex> {
        self.tiles
            .iter()
            .filter(|(_, tile)| tile.kind == TileKind::Walkable)
            .map(|(&v, _)| v)
            .collect()
    }

    fn neighbors(&self, v: Vertex) -> SmallVec<[Vertex; 6]> {
        let offsets = if v.y.rem_euclid(2) == 1 {
            &ODD_ROW_NEIGHBORS
        } else {
            &EVEN_ROW_NEIGHBORS
        };
        offsets
            .iter()
            .map(|&(dx, dy)| Vertex::new(v.x + dx, v.y + dy))
            .filter(|n| matches!(self.tiles.get(n), Some(tile) if tile.kind == TileKind::Walkable))
            .collect()
    }
}
