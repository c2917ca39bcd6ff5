use garden_groups::part2::process;
use miette::Context;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[tracing::instrument]
fn main() -> miette::Result<()> {
    init();

    let file = include_str!("../../input2.txt");
    let result = process(file).context("process part 2")?;
    println!("{}", result);
    Ok(())
}

fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("garden_groups=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::NONE)
        .try_init();
}
