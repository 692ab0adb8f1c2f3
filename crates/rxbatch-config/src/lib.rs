//! # rxbatch-config
//!
//! TOML run configuration for rxbatch.
//!
//! ## Overview
//!
//! [`RunConfig`] groups the remote endpoints, the form selectors, download
//! behaviour, timing and spreadsheet column names. Every key has a default
//! matching the production deployment, so an empty document is a valid
//! configuration and a file only needs the keys it changes.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use rxbatch_config::RunConfig;
//!
//! let config = RunConfig::load(Some(Path::new("config/rxbatch.toml")))?;
//! let settings = config.pipeline_settings();
//! ```

pub mod run_config;
pub mod sections;

pub use run_config::RunConfig;
pub use sections::{ColumnsSection, DownloadSection, RemoteSection, Selectors, TimingSection};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use rxbatch_contracts::error::RxError;

    use crate::RunConfig;

    const SHIPPED: &str = include_str!("../../../config/rxbatch.toml");

    fn assert_config_error(result: Result<RunConfig, RxError>, needle: &str) {
        match result {
            Err(RxError::ConfigError { reason }) => assert!(
                reason.contains(needle),
                "expected '{needle}' in reason, got: {reason}"
            ),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = RunConfig::from_toml_str("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.selectors.first_result, "#tabla-resultados tr:first-child");
        assert_eq!(config.columns.formulas.id, "Nº");
    }

    #[test]
    fn shipped_file_matches_defaults() {
        let config = RunConfig::from_toml_str(SHIPPED).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let toml = r#"
            [remote]
            headless = true

            [timing]
            between_patients_ms = 250
            remote_wait_timeout_ms = 45000

            [columns.patients]
            identity = "Nombre"
        "#;

        let config = RunConfig::from_toml_str(toml).unwrap();

        assert!(config.remote.headless);
        assert_eq!(config.remote.webdriver_url, "http://localhost:4444");
        assert_eq!(config.timing.generation_timeout_ms, 30_000);
        assert_eq!(config.columns.patients.identity, "Nombre");
        assert_eq!(config.columns.patients.quantity, "Cantidad_comp");

        let settings = config.pipeline_settings();
        assert_eq!(settings.pacing_delay, Duration::from_millis(250));
        assert_eq!(settings.remote_wait_timeout, Some(Duration::from_secs(45)));
    }

    #[test]
    fn default_pipeline_settings_match_original_timings() {
        let settings = RunConfig::default().pipeline_settings();

        assert_eq!(settings.pacing_delay, Duration::from_secs(1));
        assert_eq!(settings.generation_timeout, Duration::from_secs(30));
        assert_eq!(settings.download_settle_delay, Duration::from_secs(3));
        assert_eq!(settings.remote_wait_timeout, None);
        assert_eq!(settings.download_dir, Some(PathBuf::from("./recetas-generadas")));
    }

    #[test]
    fn disabled_download_clears_download_dir() {
        let config = RunConfig::from_toml_str("[download]\nenabled = false\n").unwrap();
        assert!(!config.pipeline_settings().downloads_enabled());
    }

    #[test]
    fn malformed_toml_is_config_error() {
        assert_config_error(RunConfig::from_toml_str("[remote\nheadless = "), "parse");
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert_config_error(RunConfig::from_toml_str("[browser]\nkind = \"chrome\"\n"), "parse");
    }

    #[test]
    fn zero_generation_timeout_is_rejected() {
        assert_config_error(
            RunConfig::from_toml_str("[timing]\ngeneration_timeout_ms = 0\n"),
            "generation_timeout_ms",
        );
    }

    #[test]
    fn empty_url_is_rejected() {
        assert_config_error(
            RunConfig::from_toml_str("[remote]\nform_url = \" \"\n"),
            "remote.form_url",
        );
    }

    #[test]
    fn missing_file_is_config_error() {
        assert_config_error(
            RunConfig::from_file(Path::new("/nonexistent/rxbatch.toml")),
            "failed to read",
        );
    }

    #[test]
    fn load_without_path_uses_defaults() {
        assert_eq!(RunConfig::load(None).unwrap(), RunConfig::default());
    }

    #[test]
    fn rendered_config_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("effective.toml");
        let mut config = RunConfig::default();
        config.timing.remote_wait_timeout_ms = Some(5_000);
        config.download.enabled = false;

        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        assert_eq!(RunConfig::from_file(&path).unwrap(), config);
    }
}
