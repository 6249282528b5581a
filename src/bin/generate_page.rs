use clap::Parser;
use tennis_odds::config::cli::report_failure;
use tennis_odds::utils::logger;
use tennis_odds::{CliArgs, Runner};

#[derive(Parser)]
#[command(name = "generate-page")]
#[command(about = "Render the latest matchup snapshot into a static HTML page")]
struct Args {
    #[command(flatten)]
    cli: CliArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.cli.verbose, args.cli.log_json);

    let config = match args.cli.prepare() {
        Ok(Some(config)) => config,
        Ok(None) => return Ok(()),
        Err(e) => std::process::exit(report_failure(&e)),
    };

    let runner = Runner::new(config, &args.cli.root).with_monitoring(args.cli.monitor);

    match runner.generate_page().await {
        Ok(path) => println!("📁 Report written to: {}", path),
        Err(e) => {
            let exit_code = report_failure(&e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
