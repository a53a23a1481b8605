//! Share links and report export.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use reqwest::Url;
use tracing::{info, warn};

use crate::{
    error::ParadeError,
    model::EventQuery,
    results::ResultsView,
};

pub const SHARE_TITLE: &str = "Will It Rain On My Parade?";
pub const SHARE_TEXT: &str = "Check out my weather analysis!";
pub const REPORT_PNG: &str = "weather-report.png";
pub const REPORT_JSON: &str = "weather-report.json";

/// Link that reopens the same query, marked as shared.
pub fn share_url(base: &str, query: &EventQuery) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid share base URL '{base}'"))?;

    url.query_pairs_mut()
        .append_pair("location", &query.location)
        .append_pair("at", &query.local_time.format("%Y-%m-%dT%H:%M").to_string())
        .append_pair("event", query.event.as_str())
        .append_pair("shared", "true");

    Ok(url)
}

/// A native "share sheet".
pub trait ShareTarget {
    fn share(&self, title: &str, text: &str, url: &Url) -> Result<(), ParadeError>;
}

pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), ParadeError>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Copied(Url),
    /// Nothing worked; show the link so it can be copied by hand.
    Manual { url: Url, reason: String },
}

/// Platform share first, then the clipboard, then a manual notice.
pub fn share_results(
    url: &Url,
    platform: Option<&dyn ShareTarget>,
    clipboard: Option<&dyn Clipboard>,
) -> ShareOutcome {
    if let Some(target) = platform {
        match target.share(SHARE_TITLE, SHARE_TEXT, url) {
            Ok(()) => return ShareOutcome::Shared,
            Err(err) => warn!(error = %err, "platform share failed, trying clipboard"),
        }
    }

    let Some(clipboard) = clipboard else {
        return ShareOutcome::Manual {
            url: url.clone(),
            reason: ParadeError::ShareUnavailable.to_string(),
        };
    };

    match clipboard.write_text(url.as_str()) {
        Ok(()) => ShareOutcome::Copied(url.clone()),
        Err(err) => {
            warn!(error = %err, "clipboard copy failed");
            ShareOutcome::Manual { url: url.clone(), reason: err.to_string() }
        }
    }
}

/// Renders a results view to PNG bytes.
pub trait Rasterizer {
    fn rasterize(&self, view: &ResultsView) -> Result<Vec<u8>>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    /// No rasterizer; a JSON snapshot was written instead.
    Fallback { path: PathBuf, notice: String },
}

pub fn export_report(
    view: &ResultsView,
    rasterizer: Option<&dyn Rasterizer>,
    dir: &Path,
) -> Result<ExportOutcome> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    if let Some(rasterizer) = rasterizer {
        let path = dir.join(REPORT_PNG);
        let png = rasterizer.rasterize(view).context("Failed to render weather report")?;
        fs::write(&path, png)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        info!(path = %path.display(), "exported report image");
        return Ok(ExportOutcome::Saved(path));
    }

    let path = dir.join(REPORT_JSON);
    let json = serde_json::to_vec_pretty(view).context("Failed to serialize weather report")?;
    fs::write(&path, json).with_context(|| format!("Failed to write report: {}", path.display()))?;
    info!(path = %path.display(), "exported report snapshot");

    Ok(ExportOutcome::Fallback {
        notice: format!("Image export is unavailable here; saved {REPORT_JSON} instead"),
        path,
    })
}
