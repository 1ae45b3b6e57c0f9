use gradesync::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting gradesync");

    // Load configuration
    let config = startup::load_config()?;

    // Scrape the course page and sync due dates
    startup::run(config).await
}
