use careers_scraper::{HttpFetcher, Result, ScrapeConfig, ScrapePipeline, TechversantClient};
use env_logger::Env;

fn run() -> Result<()> {
    let config = ScrapeConfig::default();
    let client = TechversantClient::new(&config, HttpFetcher::new(&config)?)?;

    let report = ScrapePipeline::new(config).crawl(&client)?.save()?;
    log::info!(
        "🎉 Done: {} jobs written to {}",
        report.summary.total,
        report.output_path.display()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("💥 Job scraping failed: {e}");
        std::process::exit(1);
    }
}
