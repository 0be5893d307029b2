//! Status command - print the health report

use crate::app::AppContext;
use crate::cli::args::StatusArgs;
use crate::config::Config;
use crate::error::MushafResult;
use crate::health::HealthReport;
use tracing::info;

pub async fn execute(args: StatusArgs, config: &Config) -> MushafResult<()> {
    let ctx = AppContext::from_config(config.clone())?;

    if args.probe {
        let available = ctx.catalog().surah_index().await.is_available();
        info!(available, "Probed surah index");
    }

    println!("{}", HealthReport::collect(&ctx).to_json()?);
    Ok(())
}
