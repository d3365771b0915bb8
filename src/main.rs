use anyhow::Result;
use clap::Parser;
use tracing::error;

use paramspider::{domain, pipeline, utils, Args, PipelineConfig};

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose, args.quiet);
    utils::validate_args(&args)?;

    let domains = domain::resolve_targets(args.domain.as_deref(), args.list.as_deref())?;
    let config = PipelineConfig::from_args(&args);

    match pipeline::run(&domains, &config) {
        Ok(summary) => {
            if summary.processed == 0 && summary.skipped > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            error!(action = "abort", component = "main", error = %format!("{:#}", e), "Run aborted");
            std::process::exit(1);
        }
    }
}
