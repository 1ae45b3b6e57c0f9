use crate::components::google_calendar::{self, CalendarService};
use crate::components::gradescope::{
    extract_assignments, AssignmentRecord, CourseSession, GradescopeSession,
};
use crate::config::Config;
use crate::error::{Error, SyncResult};
use crate::sync::{SyncSummary, Synchronizer};
use std::future::Future;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fantoccini=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Log in, open the course and extract its assignments
async fn scrape<S: CourseSession>(session: &S, config: &Config) -> SyncResult<Vec<AssignmentRecord>> {
    session
        .login(&config.gradescope_email, &config.gradescope_password)
        .await?;
    session.open_course(&config.course_name).await?;

    let rows = session.read_rows().await?;
    Ok(extract_assignments(rows, &config.filters))
}

/// Scrape through `session`, closing it whatever happens
pub async fn scrape_with<S: CourseSession>(
    session: S,
    config: &Config,
) -> SyncResult<Vec<AssignmentRecord>> {
    let result = scrape(&session, config).await;

    if let Err(e) = session.close().await {
        warn!("Failed to close browser session: {}", e);
    }
    result
}

/// Scrape with a fresh browser session
pub async fn scrape_assignments(config: &Config) -> SyncResult<Vec<AssignmentRecord>> {
    let session = GradescopeSession::connect(config).await?;
    scrape_with(session, config).await
}

/// Push assignments into the configured calendar
pub async fn sync_assignments(
    calendar: &dyn CalendarService,
    config: &Config,
    assignments: &[AssignmentRecord],
) -> SyncResult<SyncSummary> {
    let info = calendar.calendar_info(&config.calendar_id).await?;
    info!(
        "🗓  Target calendar: {}  (id: {})",
        info.summary.as_deref().unwrap_or("?"),
        info.id
    );

    let summary = Synchronizer::from_config(calendar, config)
        .run(assignments)
        .await;
    Ok(summary)
}

/// Sync scraped assignments, connecting to the calendar only when there are any
pub async fn sync_scraped<C, F, Fut>(
    config: &Config,
    assignments: &[AssignmentRecord],
    connect: F,
) -> SyncResult<Option<SyncSummary>>
where
    C: CalendarService,
    F: FnOnce() -> Fut,
    Fut: Future<Output = SyncResult<C>>,
{
    if assignments.is_empty() {
        info!("No assignments found.");
        return Ok(None);
    }

    let calendar = connect().await?;
    let summary = sync_assignments(&calendar, config, assignments).await?;

    info!("Done. {}", summary);
    Ok(Some(summary))
}

/// One full run: scrape, then sync
pub async fn run(config: Config) -> miette::Result<()> {
    let assignments = scrape_assignments(&config).await?;
    sync_scraped(&config, &assignments, || google_calendar::connect(&config)).await?;
    Ok(())
}
