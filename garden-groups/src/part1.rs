use miette::{Context, Result};
use tracing::{debug, info};

use crate::grid::Grid;
use crate::scanner::{CostModel, RegionScanner};

/// Total fence price of a garden map: every region costs area × perimeter.
///
/// # Errors
/// * If the map is empty, ragged or contains whitespace inside a row
#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    info!("Pricing fences by perimeter");
    let grid = Grid::<char>::parse(input).context("Failed to parse garden map")?;

    debug!("Created map with dimensions {:?}", grid.dimensions());

    let regions = RegionScanner::new(&grid).scan();
    for metrics in regions.metrics() {
        debug!(
            "Region {:?} of {}: area {}, perimeter {}",
            metrics.id, metrics.label, metrics.area, metrics.perimeter
        );
    }

    let price = regions.total_cost(CostModel::Perimeter);
    Ok(price.to_string())
}
