use clap::Parser;
use tennis_odds::app::runner::log_step_failure;
use tennis_odds::config::cli::report_failure;
use tennis_odds::utils::logger;
use tennis_odds::{CliArgs, Fetcher, Runner};

#[derive(Parser)]
#[command(name = "scrape-odds")]
#[command(about = "Scrape bookmaker odds and merge them into the latest matchup snapshot")]
struct Args {
    #[command(flatten)]
    cli: CliArgs,
}

/// 賠率為輔助資料：抓取失敗只記錄，退出碼固定為 0
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
        Err(e) => {
            log_step_failure("market odds", &e);
            return Ok(());
        }
    };

    let runner = Runner::new(config, &args.cli.root).with_monitoring(args.cli.monitor);
    let result = runner.scrape_odds(&fetcher).await;
    fetcher.shutdown().await;

    match result {
        Ok(Some(path)) => println!("📁 Market odds saved to: {}", path),
        Ok(None) => println!("⏭️ No odds sources configured"),
        Err(e) => {
            log_step_failure("market odds", &e);
            eprintln!("⚠️ {}", e.user_friendly_message());
        }
    }

    Ok(())
}
