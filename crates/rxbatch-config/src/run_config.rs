//! Loading and validating a `RunConfig`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use rxbatch_contracts::{
    error::{RxError, RxResult},
    settings::PipelineSettings,
};

use crate::sections::{ColumnsSection, DownloadSection, RemoteSection, Selectors, TimingSection};

/// The whole configuration of a run.
///
/// ```rust,ignore
/// use rxbatch_config::RunConfig;
///
/// let config = RunConfig::from_file(Path::new("config/rxbatch.toml"))?;
/// let pipeline = PrescriptionPipeline::new(config.pipeline_settings());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub remote: RemoteSection,
    pub selectors: Selectors,
    pub download: DownloadSection,
    pub timing: TimingSection,
    pub columns: ColumnsSection,
}

impl RunConfig {
    /// Parse `s` as TOML. Missing keys take their default value.
    ///
    /// Returns `RxError::ConfigError` if the TOML is malformed, names an
    /// unknown section, or fails validation.
    pub fn from_toml_str(s: &str) -> RxResult<Self> {
        let config: RunConfig = toml::from_str(s).map_err(|e| RxError::ConfigError {
            reason: format!("failed to parse configuration TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it with `from_toml_str`.
    pub fn from_file(path: &Path) -> RxResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RxError::ConfigError {
            reason: format!("failed to read configuration file '{}': {}", path.display(), e),
        })?;
        debug!(path = %path.display(), "configuration file read");
        Self::from_toml_str(&contents)
    }

    /// `from_file` when a path is given, the built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> RxResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Render the effective configuration back to TOML.
    pub fn to_toml_string(&self) -> RxResult<String> {
        toml::to_string_pretty(self).map_err(|e| RxError::ConfigError {
            reason: format!("failed to render configuration: {}", e),
        })
    }

    /// The pipeline knobs this configuration describes.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        let timing = &self.timing;
        PipelineSettings {
            pacing_delay: Duration::from_millis(timing.between_patients_ms),
            generation_timeout: Duration::from_millis(timing.generation_timeout_ms),
            download_settle_delay: Duration::from_millis(self.download.settle_delay_ms),
            remote_wait_timeout: timing.remote_wait_timeout_ms.map(Duration::from_millis),
            download_dir: self
                .download
                .enabled
                .then(|| self.download.directory.clone()),
        }
    }

    fn validate(&self) -> RxResult<()> {
        let invalid = |reason: String| Err(RxError::ConfigError { reason });

        for (key, value) in [
            ("remote.login_url", &self.remote.login_url),
            ("remote.form_url", &self.remote.form_url),
            ("remote.webdriver_url", &self.remote.webdriver_url),
        ] {
            if value.trim().is_empty() {
                return invalid(format!("'{}' must not be empty", key));
            }
        }
        if self.timing.generation_timeout_ms == 0 {
            return invalid("'timing.generation_timeout_ms' must be greater than zero".to_string());
        }
        if self.timing.remote_wait_timeout_ms == Some(0) {
            return invalid("'timing.remote_wait_timeout_ms' must be greater than zero".to_string());
        }
        if self.download.enabled && self.download.directory.as_os_str().is_empty() {
            return invalid("'download.directory' must not be empty when downloads are enabled".to_string());
        }
        Ok(())
    }
}
