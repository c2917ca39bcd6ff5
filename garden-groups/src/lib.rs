pub mod grid;
pub mod part1;
pub mod part2;
pub mod scanner;

pub use grid::{Coordinate, Corner, Grid, GridError};
pub use scanner::{
    discover_regions, CostModel, Region, RegionId, RegionMetrics, RegionScanner, Regions,
};
