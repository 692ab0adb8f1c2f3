//! # rxbatch-webdriver
//!
//! The production [`RemoteActor`](rxbatch_core::traits::RemoteActor): drives
//! the prescription web application in a Chrome browser through a WebDriver
//! server (chromedriver on `http://localhost:4444` by default).
//!
//! ```rust,ignore
//! use rxbatch_webdriver::{WebDriverActor, WebDriverOptions};
//!
//! let actor = WebDriverActor::connect(WebDriverOptions::from_config(&config)).await?;
//! ```
//!
//! Selectors and URLs come from the `[remote]` and `[selectors]` sections of
//! the run configuration. Waits are unbounded here; the pipeline applies its
//! own timeouts.

pub mod actor;
pub mod capabilities;
pub mod downloads;

pub use actor::{WebDriverActor, WebDriverOptions};
pub use downloads::DownloadDir;
