use clap::Parser;
use tennis_odds::config::cli::report_failure;
use tennis_odds::utils::logger;
use tennis_odds::{CliArgs, Fetcher, Runner};

#[derive(Parser)]
#[command(name = "scrape-matchups")]
#[command(about = "Scrape upcoming matchup probabilities into a dated CSV snapshot")]
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

    let fetcher = match Fetcher::from_config(&config.fetch).await {
        Ok(fetcher) => fetcher,
        Err(e) => std::process::exit(report_failure(&e)),
    };

    let runner = Runner::new(config, &args.cli.root).with_monitoring(args.cli.monitor);
    let result = runner.scrape_matchups(&fetcher).await;
    fetcher.shutdown().await;

    match result {
        Ok(path) => println!("📁 Matchups saved to: {}", path),
        Err(e) => {
            let exit_code = report_failure(&e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
