use clap::Parser;
use tennis_odds::config::cli::report_failure;
use tennis_odds::utils::logger;
use tennis_odds::{CliArgs, Runner};

#[derive(Parser)]
#[command(name = "tennis-odds")]
#[command(about = "Scrape model matchups and market odds, then publish the HTML report")]
struct Args {
    #[command(flatten)]
    cli: CliArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init(args.cli.verbose, args.cli.log_json);
    tracing::info!("🚀 Starting tennis-odds chain in {}", args.cli.root_str());

    let config = match args.cli.prepare() {
        Ok(Some(config)) => config,
        Ok(None) => return Ok(()),
        Err(e) => std::process::exit(report_failure(&e)),
    };

    let runner = Runner::new(config, &args.cli.root).with_monitoring(args.cli.monitor);

    match runner.run_chain().await {
        Ok(page) => {
            tracing::info!("✅ Chain completed, report at {}", page);
            println!("✅ Report generated: {}", page);
        }
        Err(e) => {
            let exit_code = report_failure(&e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
