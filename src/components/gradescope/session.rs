use super::models::{RowLink, RowSnapshot};
use crate::config::Config;
use crate::error::{browser_error, scrape_error, SyncResult};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

const LOGIN_BUTTON: &str = "a[href*='/log_in'], .tiiBtn.tiiBtn-secondarySplash.js-logInButton";
const EMAIL_INPUT: &str = "input#session_email";
const PASSWORD_INPUT: &str = "input#session_password";
const SUBMIT_BUTTON: &str = "button[type='submit'], input[type='submit'], [name='commit']";
const ASSIGNMENT_ROWS: &str = "table tbody tr";

/// Course-site operations a scrape depends on
#[async_trait]
pub trait CourseSession: Send + Sync {
    /// Sign in with the given credentials
    async fn login(&self, email: &str, password: &str) -> SyncResult<()>;

    /// Open the course whose tile mentions `course_name`
    async fn open_course(&self, course_name: &str) -> SyncResult<Option<String>>;

    /// Read every assignment row; each row succeeds or fails on its own
    async fn read_rows(&self) -> SyncResult<Vec<SyncResult<RowSnapshot>>>;

    /// End the session
    async fn close(self) -> SyncResult<()>;
}

/// WebDriver session driving the Gradescope web UI
pub struct GradescopeSession {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl GradescopeSession {
    /// Open a new browser session through the configured WebDriver
    pub async fn connect(config: &Config) -> SyncResult<Self> {
        let mut args = vec!["--window-size=1280,1024"];
        if config.headless {
            args.extend(["--headless=new", "--disable-gpu"]);
        }

        let mut capabilities = serde_json::Map::new();
        capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        info!("Connecting to WebDriver at {}", config.webdriver_url);
        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities);
        let client = builder.connect(&config.webdriver_url).await?;

        Ok(Self {
            client,
            base_url: config.gradescope_url.clone(),
            timeout: config.wait_timeout(),
        })
    }

    async fn wait_for(&self, selector: Locator<'_>, what: &str) -> SyncResult<Element> {
        self.client
            .wait()
            .at_most(self.timeout)
            .for_element(selector)
            .await
            .map_err(|e| browser_error(&format!("Timed out waiting for {}: {}", what, e)))
    }
}

#[async_trait]
impl CourseSession for GradescopeSession {
    /// Sign in through the landing page login modal
    async fn login(&self, email: &str, password: &str) -> SyncResult<()> {
        self.client.goto(&self.base_url).await?;

        self.wait_for(Locator::Css(LOGIN_BUTTON), "login button")
            .await?
            .click()
            .await?;

        let email_input = self.wait_for(Locator::Css(EMAIL_INPUT), "email field").await?;
        let password_input = self
            .wait_for(Locator::Css(PASSWORD_INPUT), "password field")
            .await?;

        email_input.clear().await?;
        email_input.send_keys(email).await?;
        tokio::time::sleep(Duration::from_millis(100)).await;
        password_input.clear().await?;
        password_input.send_keys(password).await?;
        tokio::time::sleep(Duration::from_millis(100)).await;

        match self.wait_for(Locator::Css(SUBMIT_BUTTON), "submit button").await {
            Ok(submit) => submit.click().await?,
            Err(e) => {
                warn!("{}, submitting with Enter instead", e);
                password_input.send_keys("\n").await?;
            }
        }

        self.wait_for(Locator::Css("main"), "dashboard").await?;
        info!("Logged in as {}", email);
        Ok(())
    }

    /// Open the course whose tile mentions `course_name`, returning its URL
    async fn open_course(&self, course_name: &str) -> SyncResult<Option<String>> {
        let xpath = format!(
            "//a[(contains(@class,'courseBox') or contains(@class,'courseBox--short')) and contains(., '{}')]",
            course_name
        );
        let tile = self
            .wait_for(Locator::XPath(&xpath), &format!("course tile '{}'", course_name))
            .await?;
        let url = tile.prop("href").await?;

        tile.click().await?;
        self.wait_for(Locator::Css("table"), "assignment table").await?;

        info!("Opened course {} ({})", course_name, url.as_deref().unwrap_or("?"));
        Ok(url)
    }

    /// Read every assignment row; each row succeeds or fails on its own
    async fn read_rows(&self) -> SyncResult<Vec<SyncResult<RowSnapshot>>> {
        let rows = self.client.find_all(Locator::Css(ASSIGNMENT_ROWS)).await?;

        let mut snapshots = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let snapshot = read_row(row)
                .await
                .map_err(|e| scrape_error(&format!("row {}: {}", idx + 1, e)));
            snapshots.push(snapshot);
        }
        Ok(snapshots)
    }

    /// End the WebDriver session
    async fn close(self) -> SyncResult<()> {
        debug!("Closing browser session");
        self.client.close().await?;
        Ok(())
    }
}

async fn read_link(anchor: &Element) -> SyncResult<RowLink> {
    Ok(RowLink {
        text: anchor.text().await?.trim().to_string(),
        href: anchor.prop("href").await?,
    })
}

async fn read_row(row: &Element) -> SyncResult<RowSnapshot> {
    let tds = row.find_all(Locator::Css("td")).await?;
    if tds.is_empty() {
        return Ok(RowSnapshot::default());
    }

    let mut cells = Vec::with_capacity(tds.len());
    for td in &tds {
        cells.push(td.text().await?);
    }

    // A first cell without an anchor is normal
    let first_cell_link = match tds[0].find(Locator::Css("a")).await {
        Ok(anchor) => Some(read_link(&anchor).await?),
        Err(_) => None,
    };

    let mut links = Vec::new();
    for anchor in row.find_all(Locator::Css("a")).await? {
        links.push(read_link(&anchor).await?);
    }

    Ok(RowSnapshot {
        cells,
        first_cell_link,
        links,
    })
}
