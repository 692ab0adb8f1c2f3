//! Browser capabilities for the WebDriver session.

use std::path::Path;

use serde_json::{json, Map, Value};

/// Chrome capabilities: a maximized window, optional headless mode, and PDF
/// downloads saved to `download_dir` without a prompt.
pub fn chrome_capabilities(headless: bool, download_dir: Option<&Path>) -> Map<String, Value> {
    let mut args = vec!["--start-maximized".to_string()];
    if headless {
        args.push("--headless=new".to_string());
        args.push("--window-size=1920,1080".to_string());
    }

    let mut options = Map::new();
    options.insert("args".to_string(), json!(args));
    if let Some(dir) = download_dir {
        options.insert(
            "prefs".to_string(),
            json!({
                "download.default_directory": dir.display().to_string(),
                "download.prompt_for_download": false,
                "plugins.always_open_pdf_externally": true,
            }),
        );
    }

    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), Value::Object(options));
    caps
}
