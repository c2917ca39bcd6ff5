use miette::{Context, Result};
use tracing::{debug, info};

use crate::grid::Grid;
use crate::scanner::{CostModel, RegionScanner};

/// Total fence price under the bulk discount: every region costs
/// area × number of sides.
#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    info!("Pricing fences by sides");
    let grid = Grid::<char>::parse(input).context("Failed to parse garden map")?;

    debug!("Created map with dimensions {:?}", grid.dimensions());

    let regions = RegionScanner::new(&grid).scan();
    let price = regions.total_cost(CostModel::Sides);

    debug!("Bulk price of {} regions is {}", regions.len(), price);
    Ok(price.to_string())
}
