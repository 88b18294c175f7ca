use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Versioned logo manifest as published on the CDN.
///
/// `logos` order reflects display priority. `version` is an opaque string
/// that changes on every publish; equality (not ordering) is what the
/// pipeline relies on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    #[serde(default)]
    pub logos: Vec<LogoEntry>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Manifest {
    pub fn logo_count(&self) -> usize {
        self.logos.len()
    }

    /// Entries eligible for display right now.
    pub fn active_logos(&self) -> impl Iterator<Item = &LogoEntry> {
        self.logos.iter().filter(|l| l.active)
    }
}

/// One logo asset in the manifest.
///
/// Published manifests are hand-edited often enough that everything beyond
/// `id` and `url` is lenient: a missing `active` means displayable, a
/// missing `priority` sorts at 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogoEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl LogoEntry {
    /// File extension hint for storing the asset locally, taken from
    /// `filename` first, then from the URL path.
    pub fn extension(&self) -> Option<&str> {
        let candidate = match self.filename.as_deref() {
            Some(name) => name,
            None => {
                // Strip query/fragment before looking at the path tail
                let end = self.url.find(['?', '#']).unwrap_or(self.url.len());
                &self.url[..end]
            }
        };
        let tail = candidate.rsplit('/').next()?;
        let (_, ext) = tail.rsplit_once('.')?;
        if ext.is_empty() {
            None
        } else {
            Some(ext)
        }
    }
}
