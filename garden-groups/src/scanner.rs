use std::fmt::Debug;

use itertools::Itertools;
use petgraph::{
    graph::{NodeIndex, UnGraph},
    visit::{Dfs, VisitMap},
};
use tracing::{debug, trace};

use crate::grid::{Coordinate, Corner, Grid};

// Corner masks, one bit per surrounding cell: top-left, top-right,
// bottom-right, bottom-left.
const TOP_LEFT_BOTTOM_RIGHT: u8 = 0b0101;
const TOP_RIGHT_BOTTOM_LEFT: u8 = 0b1010;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(usize);

impl RegionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single plot in the adjacency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Plot<L> {
    pub label: L,
    pub position: Coordinate,
}

/// A maximal 4-connected set of plots sharing one label. `cells` is sorted
/// row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region<L> {
    pub id: RegionId,
    pub label: L,
    pub cells: Vec<Coordinate>,
}

impl<L> Region<L> {
    pub fn area(&self) -> usize {
        self.cells.len()
    }
}

/// How a region's fence is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostModel {
    /// area × perimeter
    #[default]
    Perimeter,
    /// area × sides, the bulk discount
    Sides,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionMetrics<L> {
    pub id: RegionId,
    pub label: L,
    pub area: usize,
    pub perimeter: usize,
    pub sides: usize,
}

impl<L> RegionMetrics<L> {
    pub fn cost(&self, model: CostModel) -> usize {
        match model {
            CostModel::Perimeter => self.area * self.perimeter,
            CostModel::Sides => self.area * self.sides,
        }
    }
}

/// Partitions a grid into regions.
///
/// Every plot becomes a node, added in row-major order so a node's index is
/// its cell's row-major index. Edges join 4-adjacent plots with equal labels,
/// so each connected component of the graph is exactly one region.
pub struct RegionScanner<'g, L> {
    grid: &'g Grid<L>,
    graph: UnGraph<Plot<L>, ()>,
}

impl<'g, L: Copy + Eq + Debug> RegionScanner<'g, L> {
    pub fn new(grid: &'g Grid<L>) -> Self {
        let mut graph = UnGraph::with_capacity(grid.len(), 2 * grid.len());

        for (position, label) in grid.cells() {
            graph.add_node(Plot { label, position });
        }

        // Right and down cover every adjacent pair once.
        for (position, label) in grid.cells() {
            let Some(current) = grid.index_of(position) else {
                continue;
            };

            let right = Coordinate::new(position.row, position.col + 1);
            let down = Coordinate::new(position.row + 1, position.col);

            for neighbor in [right, down] {
                if grid.get(neighbor) != Some(&label) {
                    continue;
                }
                if let Some(other) = grid.index_of(neighbor) {
                    graph.add_edge(NodeIndex::new(current), NodeIndex::new(other), ());
                }
            }
        }

        Self { grid, graph }
    }

    pub fn graph(&self) -> &UnGraph<Plot<L>, ()> {
        &self.graph
    }

    /// Discovers every region in one pass. Regions are numbered in the order
    /// their row-major first cell appears.
    #[tracing::instrument(level = "debug", skip(self), fields(dimensions = ?self.grid.dimensions()))]
    pub fn scan(&self) -> Regions<L> {
        let mut regions = Vec::new();
        // Every slot is overwritten: each node is discovered exactly once.
        let mut owner = vec![RegionId(0); self.graph.node_count()];
        let mut dfs = Dfs::empty(&self.graph);

        for start in self.graph.node_indices() {
            if dfs.discovered.is_visited(&start) {
                continue;
            }

            let id = RegionId(regions.len());
            let mut cells = Vec::new();

            dfs.move_to(start);
            while let Some(node) = dfs.next(&self.graph) {
                owner[node.index()] = id;
                cells.push(self.graph[node].position);
            }
            cells.sort_unstable();

            let label = self.graph[start].label;
            trace!(?id, ?label, area = cells.len(), "discovered region");
            regions.push(Region { id, label, cells });
        }

        debug!("Found {} regions", regions.len());

        Regions {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            regions,
            owner,
        }
    }
}

pub fn discover_regions<L: Copy + Eq + Debug>(grid: &Grid<L>) -> Regions<L> {
    RegionScanner::new(grid).scan()
}

/// The partition produced by a scan: an arena of regions plus a
/// cell → region lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regions<L> {
    rows: usize,
    cols: usize,
    regions: Vec<Region<L>>,
    owner: Vec<RegionId>,
}

impl<L: Copy> Regions<L> {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region<L>> {
        self.regions.iter()
    }

    pub fn get(&self, id: RegionId) -> Option<&Region<L>> {
        self.regions.get(id.index())
    }

    pub fn region_of(&self, coordinate: Coordinate) -> Option<&Region<L>> {
        self.owner_of(coordinate).and_then(|id| self.get(id))
    }

    fn owner_of(&self, coordinate: Coordinate) -> Option<RegionId> {
        if coordinate.row >= self.rows || coordinate.col >= self.cols {
            return None;
        }
        self.owner.get(coordinate.row * self.cols + coordinate.col).copied()
    }

    fn is_member(&self, region: &Region<L>, coordinate: Coordinate) -> bool {
        self.owner_of(coordinate) == Some(region.id)
    }

    /// Unit edges of the region not shared with another cell of the same
    /// region.
    pub fn perimeter(&self, region: &Region<L>) -> usize {
        region
            .cells
            .iter()
            .map(|&cell| {
                let shared = cell
                    .neighbors()
                    .filter(|&neighbor| self.is_member(region, neighbor))
                    .count();
                4 - shared
            })
            .sum()
    }

    /// Number of straight fence sections, counted as the corners of the
    /// region's outline.
    pub fn sides(&self, region: &Region<L>) -> usize {
        region
            .cells
            .iter()
            .flat_map(|cell| cell.corners())
            .unique()
            .map(|corner| corner_weight(self.corner_mask(region, corner)))
            .sum()
    }

    fn corner_mask(&self, region: &Region<L>, corner: Corner) -> u8 {
        corner
            .cells()
            .into_iter()
            .enumerate()
            .fold(0, |mask, (bit, cell)| match cell {
                Some(cell) if self.is_member(region, cell) => mask | (1 << bit),
                _ => mask,
            })
    }

    pub fn measure(&self, region: &Region<L>) -> RegionMetrics<L> {
        RegionMetrics {
            id: region.id,
            label: region.label,
            area: region.area(),
            perimeter: self.perimeter(region),
            sides: self.sides(region),
        }
    }

    pub fn metrics(&self) -> Vec<RegionMetrics<L>> {
        self.iter().map(|region| self.measure(region)).collect()
    }

    /// Sums the price of every region. Only the metric the model needs is
    /// computed.
    pub fn total_cost(&self, model: CostModel) -> usize {
        self.iter()
            .map(|region| {
                let fence = match model {
                    CostModel::Perimeter => self.perimeter(region),
                    CostModel::Sides => self.sides(region),
                };
                region.area() * fence
            })
            .sum()
    }
}

fn corner_weight(mask: u8) -> usize {
    match mask.count_ones() {
        1 | 3 => 1,
        2 if mask == TOP_LEFT_BOTTOM_RIGHT || mask == TOP_RIGHT_BOTTOM_LEFT => 2,
        _ => 0,
    }
}
