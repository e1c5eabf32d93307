use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::id::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Biome {
    TemperateForest,
    Grassland,
    AridShrubland,
    Desert,
    Tundra,
    BorealForest,
    Swamp,
    IceSheet,
    SeaIce,
    Ocean,
}

string_enum!(Biome {
    TemperateForest => "temperate_forest",
    Grassland => "grassland",
    AridShrubland => "arid_shrubland",
    Desert => "desert",
    Tundra => "tundra",
    BorealForest => "boreal_forest",
    Swamp => "swamp",
    IceSheet => "ice_sheet",
    SeaIce => "sea_ice",
    Ocean => "ocean",
});

impl Biome {
    /// Ice biomes never host a settlement.
    pub fn is_ice(self) -> bool {
        matches!(self, Biome::IceSheet | Biome::SeaIce)
    }

    /// Multiplier applied to edge length when walking through this biome.
    pub fn movement_cost(self) -> f64 {
        match self {
            Biome::Grassland | Biome::TemperateForest => 1.0,
            Biome::AridShrubland | Biome::BorealForest => 1.2,
            Biome::Desert | Biome::Tundra => 1.5,
            Biome::Swamp => 2.0,
            Biome::IceSheet | Biome::SeaIce => 3.0,
            Biome::Ocean => 1.0,
        }
    }
}

/// Read-only spatial substrate the simulation runs on.
///
/// Implemented by the host's world representation; `TileGraph` is the in-crate
/// implementation used for generation and tests.
pub trait WorldGraph {
    fn node_count(&self) -> usize;

    fn neighbors(&self, node: NodeId) -> &[NodeId];

    /// Straight-line distance in tile units.
    fn approx_distance(&self, a: NodeId, b: NodeId) -> f64;

    /// Path-weighted distance over land tiles. `None` when unreachable.
    fn traversal_distance(&self, a: NodeId, b: NodeId) -> Option<f64>;

    fn is_water(&self, node: NodeId) -> bool;

    fn biome(&self, node: NodeId) -> Biome;

    fn random_node(&self, rng: &mut dyn RngCore) -> Option<NodeId> {
        let count = self.node_count();
        if count == 0 {
            return None;
        }
        Some(NodeId(rng.random_range(0..count) as u32))
    }

    /// Every node reachable within `hops` edges of `start`, excluding `start`.
    /// Returned in breadth-first discovery order.
    fn nodes_within_hops(&self, start: NodeId, hops: u32) -> Vec<NodeId> {
        if start.index() >= self.node_count() {
            return Vec::new();
        }
        let mut visited = vec![false; self.node_count()];
        visited[start.index()] = true;
        let mut queue = VecDeque::from([(start, 0u32)]);
        let mut found = Vec::new();
        while let Some((node, depth)) = queue.pop_front() {
            if depth >= hops {
                continue;
            }
            for &next in self.neighbors(node) {
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    found.push(next);
                    queue.push_back((next, depth + 1));
                }
            }
        }
        found
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub x: f64,
    pub y: f64,
    pub biome: Biome,
    pub water: bool,
}

/// Planar tile graph with explicit adjacency.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileGraph {
    tiles: Vec<Tile>,
    adjacency: Vec<Vec<NodeId>>,
}

impl TileGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tile(&mut self, x: f64, y: f64, biome: Biome) -> NodeId {
        let id = NodeId(self.tiles.len() as u32);
        self.tiles.push(Tile {
            x,
            y,
            biome,
            water: biome == Biome::Ocean,
        });
        self.adjacency.push(Vec::new());
        id
    }

    /// Connect two tiles in both directions. Repeated links are ignored.
    pub fn link(&mut self, a: NodeId, b: NodeId) {
        assert!(a != b, "link: cannot link {a} to itself");
        assert!(
            a.index() < self.tiles.len() && b.index() < self.tiles.len(),
            "link: {a} or {b} out of range"
        );
        if !self.adjacency[a.index()].contains(&b) {
            self.adjacency[a.index()].push(b);
        }
        if !self.adjacency[b.index()].contains(&a) {
            self.adjacency[b.index()].push(a);
        }
    }

    pub fn set_biome(&mut self, node: NodeId, biome: Biome) {
        let tile = &mut self.tiles[node.index()];
        tile.biome = biome;
        tile.water = biome == Biome::Ocean;
    }

    pub fn tile(&self, node: NodeId) -> &Tile {
        &self.tiles[node.index()]
    }

    /// `width × height` grid with 4-neighbour adjacency and unit spacing.
    pub fn grid(width: u32, height: u32, biome: Biome) -> Self {
        let mut graph = Self::new();
        for y in 0..height {
            for x in 0..width {
                graph.add_tile(x as f64, y as f64, biome);
            }
        }
        for y in 0..height {
            for x in 0..width {
                let id = NodeId(y * width + x);
                if x + 1 < width {
                    graph.link(id, NodeId(y * width + x + 1));
                }
                if y + 1 < height {
                    graph.link(id, NodeId((y + 1) * width + x));
                }
            }
        }
        graph
    }

    /// Straight chain of `len` tiles, tile `i` at `x = i`.
    pub fn line(len: u32, biome: Biome) -> Self {
        Self::grid(len, 1, biome)
    }

    fn edge_cost(&self, from: NodeId, to: NodeId) -> f64 {
        let a = &self.tiles[from.index()];
        let b = &self.tiles[to.index()];
        let length = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        length * (a.biome.movement_cost() + b.biome.movement_cost()) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Frontier {
    cost: f64,
    node: NodeId,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl WorldGraph for TileGraph {
    fn node_count(&self) -> usize {
        self.tiles.len()
    }

    fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.adjacency
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Unknown nodes are infinitely far away.
    fn approx_distance(&self, a: NodeId, b: NodeId) -> f64 {
        let (Some(ta), Some(tb)) = (self.tiles.get(a.index()), self.tiles.get(b.index())) else {
            return f64::INFINITY;
        };
        ((ta.x - tb.x).powi(2) + (ta.y - tb.y).powi(2)).sqrt()
    }

    fn traversal_distance(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let count = self.tiles.len();
        if a.index() >= count || b.index() >= count {
            return None;
        }
        if a == b {
            return Some(0.0);
        }
        let mut best = vec![f64::INFINITY; count];
        best[a.index()] = 0.0;
        let mut heap = BinaryHeap::from([Frontier { cost: 0.0, node: a }]);
        while let Some(Frontier { cost, node }) = heap.pop() {
            if node == b {
                return Some(cost);
            }
            if cost > best[node.index()] {
                continue;
            }
            for &next in self.neighbors(node) {
                // Water blocks overland travel unless it is the destination itself.
                if self.tiles[next.index()].water && next != b {
                    continue;
                }
                let candidate = cost + self.edge_cost(node, next);
                if candidate < best[next.index()] {
                    best[next.index()] = candidate;
                    heap.push(Frontier {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }
        None
    }

    fn is_water(&self, node: NodeId) -> bool {
        self.tiles[node.index()].water
    }

    fn biome(&self, node: NodeId) -> Biome {
        self.tiles[node.index()].biome
    }
}
