//! `RemoteActor` over a WebDriver session.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{elements::Element, error::CmdError, Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use rxbatch_config::{RunConfig, Selectors};
use rxbatch_contracts::{
    error::{RxError, RxResult},
    records::Credentials,
};
use rxbatch_core::traits::RemoteActor;

use crate::capabilities::chrome_capabilities;
use crate::downloads::{DownloadDir, Snapshot};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Everything the actor needs besides the WebDriver session itself.
#[derive(Debug, Clone)]
pub struct WebDriverOptions {
    pub webdriver_url: String,
    pub login_url: String,
    pub form_url: String,
    pub headless: bool,
    pub selectors: Selectors,
    pub post_login_settle: Duration,
    /// `None` leaves the browser's download behaviour untouched.
    pub download_dir: Option<PathBuf>,
}

impl WebDriverOptions {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            webdriver_url: config.remote.webdriver_url.clone(),
            login_url: config.remote.login_url.clone(),
            form_url: config.remote.form_url.clone(),
            headless: config.remote.headless,
            selectors: config.selectors.clone(),
            post_login_settle: Duration::from_millis(config.timing.post_login_settle_ms),
            download_dir: config
                .download
                .enabled
                .then(|| config.download.directory.clone()),
        }
    }
}

/// Drives the prescription web application through a browser.
pub struct WebDriverActor {
    client: Option<Client>,
    options: WebDriverOptions,
    downloads: Option<DownloadDir>,
    before_download: Option<Snapshot>,
}

impl WebDriverActor {
    /// Start a browser session on the configured WebDriver server.
    ///
    /// Fails with `RxError::DriverUnavailable` when the server cannot be
    /// reached or refuses the session, and with `RxError::ConfigError` when
    /// the download directory cannot be created.
    pub async fn connect(options: WebDriverOptions) -> RxResult<Self> {
        let downloads = options
            .download_dir
            .as_deref()
            .map(DownloadDir::prepare)
            .transpose()?;
        let caps = chrome_capabilities(options.headless, downloads.as_ref().map(|d| d.path()));

        info!(webdriver = %options.webdriver_url, headless = options.headless, "starting browser session");
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&options.webdriver_url)
            .await
            .map_err(|e| RxError::DriverUnavailable {
                reason: format!("cannot start session on '{}': {}", options.webdriver_url, e),
            })?;

        Ok(Self {
            client: Some(client),
            options,
            downloads,
            before_download: None,
        })
    }

    fn client(&self) -> RxResult<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| RxError::remote("browser session already closed"))
    }

    fn selectors(&self) -> &Selectors {
        &self.options.selectors
    }

    async fn find(&self, css: &str) -> RxResult<Element> {
        self.client()?
            .find(Locator::Css(css))
            .await
            .map_err(failed(format!("find '{}'", css)))
    }

    /// Wait, without bound, for `css` to be present in the page.
    async fn wait_for(&self, css: &str) -> RxResult<Element> {
        self.client()?
            .wait()
            .forever()
            .for_element(Locator::Css(css))
            .await
            .map_err(failed(format!("wait for '{}'", css)))
    }

    /// Wait, without bound, for `css` to be present and displayed.
    async fn wait_visible(&self, css: &str) -> RxResult<Element> {
        loop {
            let element = self.wait_for(css).await?;
            match element.is_displayed().await {
                Ok(true) => return Ok(element),
                Ok(false) => {}
                Err(e) if element_replaced(&e) => {}
                Err(e) => return Err(failed(format!("check visibility of '{}'", css))(e)),
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&self, css: &str) -> RxResult<()> {
        debug!(selector = %css, "click");
        self.find(css)
            .await?
            .click()
            .await
            .map_err(failed(format!("click '{}'", css)))
    }

    async fn type_into(&self, css: &str, text: &str) -> RxResult<()> {
        self.find(css)
            .await?
            .send_keys(text)
            .await
            .map_err(failed(format!("type into '{}'", css)))
    }

    async fn goto(&self, url: &str) -> RxResult<()> {
        debug!(url = %url, "navigate");
        self.client()?
            .goto(url)
            .await
            .map_err(failed(format!("open '{}'", url)))
    }

    async fn location(&self) -> RxResult<String> {
        self.client()?
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(failed("read current location".to_string()))
    }
}

/// The element was replaced or removed between lookup and use.
fn element_replaced(e: &CmdError) -> bool {
    e.is_stale_element_reference() || e.is_no_such_element()
}

fn failed(action: String) -> impl FnOnce(CmdError) -> RxError {
    move |e| RxError::remote(format!("{}: {}", action, e))
}

#[async_trait]
impl RemoteActor for WebDriverActor {
    async fn open_login(&mut self) -> RxResult<()> {
        let url = self.options.login_url.clone();
        self.goto(&url).await?;
        self.wait_for(&self.selectors().username).await?;
        Ok(())
    }

    /// Fill the login form and wait for the page to navigate away, for at
    /// most the configured settle time. Staying put is not an error here; the
    /// session driver decides from the final location.
    async fn submit_credentials(&mut self, credentials: &Credentials) -> RxResult<()> {
        let selectors = self.selectors().clone();
        self.type_into(&selectors.username, &credentials.username).await?;
        self.type_into(&selectors.password, &credentials.password).await?;

        let before = self.location().await?;
        self.click(&selectors.login_button).await?;

        let deadline = Instant::now() + self.options.post_login_settle;
        while Instant::now() < deadline {
            if self.location().await? != before {
                return Ok(());
            }
            sleep(POLL_INTERVAL).await;
        }
        warn!(
            waited_ms = self.options.post_login_settle.as_millis() as u64,
            "location unchanged after login"
        );
        Ok(())
    }

    async fn current_location(&mut self) -> RxResult<String> {
        self.location().await
    }

    async fn open_prescription_form(&mut self) -> RxResult<()> {
        let url = self.options.form_url.clone();
        self.goto(&url).await?;
        self.wait_for(&self.selectors().search_open).await?;
        Ok(())
    }

    async fn search_patient(&mut self, query: &str) -> RxResult<()> {
        let selectors = self.selectors().clone();
        self.click(&selectors.search_open).await?;
        self.wait_for(&selectors.search_modal).await?;
        self.type_into(&selectors.search_input, query).await?;
        self.click(&selectors.search_submit).await
    }

    async fn wait_for_results(&mut self) -> RxResult<()> {
        self.wait_for(&self.selectors().search_results).await?;
        Ok(())
    }

    async fn select_first_result(&mut self) -> RxResult<()> {
        let selectors = self.selectors().clone();
        self.click(&selectors.first_result).await?;
        self.wait_visible(&selectors.patient_loaded).await?;
        Ok(())
    }

    async fn select_prescription_type(&mut self, kind: &str) -> RxResult<()> {
        let css = self.selectors().prescription_type.clone();
        self.find(&css)
            .await?
            .select_by_value(kind)
            .await
            .map_err(failed(format!("select '{}' in '{}'", kind, css)))
    }

    async fn select_default_coverage(&mut self) -> RxResult<()> {
        let css = self.selectors().default_coverage.clone();
        self.click(&css).await
    }

    async fn switch_to_free_text(&mut self) -> RxResult<()> {
        let css = self.selectors().free_text_tab.clone();
        self.click(&css).await
    }

    async fn clear_free_text(&mut self) -> RxResult<()> {
        let css = self.selectors().free_text_field.clone();
        self.client()?
            .execute(
                "const field = document.querySelector(arguments[0]); if (field) { field.value = ''; }",
                vec![json!(css)],
            )
            .await
            .map(|_| ())
            .map_err(failed(format!("clear '{}'", css)))
    }

    async fn type_free_text(&mut self, text: &str) -> RxResult<()> {
        let css = self.selectors().free_text_field.clone();
        self.type_into(&css, text).await
    }

    async fn trigger_generation(&mut self) -> RxResult<()> {
        let css = self.selectors().generate.clone();
        self.click(&css).await
    }

    async fn wait_for_generated(&mut self) -> RxResult<()> {
        self.wait_visible(&self.selectors().generated).await?;
        Ok(())
    }

    async fn trigger_download(&mut self) -> RxResult<()> {
        self.before_download = self.downloads.as_ref().map(DownloadDir::snapshot);
        let css = self.selectors().download.clone();
        self.click(&css).await
    }

    async fn last_download(&mut self) -> RxResult<Option<PathBuf>> {
        let (Some(dir), Some(before)) = (&self.downloads, self.before_download.take()) else {
            return Ok(None);
        };
        Ok(dir.newest_since(&before))
    }

    async fn close(&mut self) -> RxResult<()> {
        if let Some(client) = self.client.take() {
            info!("closing browser session");
            client
                .close()
                .await
                .map_err(failed("close browser session".to_string()))?;
        }
        Ok(())
    }
}
