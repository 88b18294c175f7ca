use crate::manifest::{LogoEntry, Manifest};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of validating a candidate manifest against the previous one.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Candidate manifest reduced to entries that passed validation
    pub usable: Manifest,
    /// Usable entries absent from the previous usable set, keyed by id
    pub added: Vec<LogoEntry>,
    /// Previous entries absent from the candidate usable set, keyed by id
    pub removed: Vec<LogoEntry>,
    /// Entries excluded from the usable set (dead link, unreachable,
    /// duplicate id)
    pub broken: Vec<LogoEntry>,
}

impl ValidationReport {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Lightweight existence check for a logo URL.
///
/// A seam rather than a concrete client so tests can stub reachability; the
/// production implementation is [`HttpProbe`].
#[async_trait]
pub trait UrlProbe: Send + Sync {
    async fn exists(&self, url: &str) -> bool;
}

/// Probes remote URLs with a HEAD request and local references with a
/// metadata stat.
pub struct HttpProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProbe {
    /// Reuses the fetcher's pooled client; the shorter probe timeout is
    /// applied per request.
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl UrlProbe for HttpProbe {
    async fn exists(&self, url: &str) -> bool {
        if let Some(rest) = url.strip_prefix("file://") {
            return tokio::fs::metadata(Path::new(rest)).await.is_ok();
        }
        if !url.contains("://") {
            return tokio::fs::metadata(Path::new(url)).await.is_ok();
        }
        match self.client.head(url).timeout(self.timeout).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(url = %url, error = %e, "reachability probe failed");
                false
            }
        }
    }
}

/// Validates candidate manifests and diffs them against the last usable one.
///
/// Per-entry failures degrade the entry to `broken` and continue; nothing in
/// here errors out for a single bad logo. A structurally unparsable
/// candidate never reaches this type (the fetcher rejects it first).
pub struct ManifestValidator {
    probe: Box<dyn UrlProbe>,
}

impl ManifestValidator {
    pub fn new(probe: Box<dyn UrlProbe>) -> Self {
        Self { probe }
    }

    /// `validate(candidate, previous) -> {usable, added, removed, broken}`.
    ///
    /// Called twice with identical inputs this produces identical sets; the
    /// diff is keyed by entry id against `previous`'s logo list.
    pub async fn validate(
        &self,
        candidate: &Manifest,
        previous: Option<&Manifest>,
    ) -> ValidationReport {
        let mut usable_logos: Vec<LogoEntry> = Vec::with_capacity(candidate.logos.len());
        let mut broken: Vec<LogoEntry> = Vec::new();
        let mut seen_ids: HashSet<&str> = HashSet::with_capacity(candidate.logos.len());

        for entry in &candidate.logos {
            if !seen_ids.insert(entry.id.as_str()) {
                warn!(id = %entry.id, "duplicate logo id in manifest, dropping later entry");
                broken.push(entry.clone());
                continue;
            }

            match self.check_entry(entry).await {
                Some(checked) => usable_logos.push(checked),
                None => {
                    warn!(id = %entry.id, url = %entry.url, "logo entry unusable, excluded");
                    broken.push(entry.clone());
                }
            }
        }

        let usable = Manifest {
            version: candidate.version.clone(),
            logos: usable_logos,
            last_updated: candidate.last_updated,
        };

        let previous_ids: HashSet<&str> = previous
            .map(|m| m.logos.iter().map(|l| l.id.as_str()).collect())
            .unwrap_or_default();
        let usable_ids: HashSet<&str> = usable.logos.iter().map(|l| l.id.as_str()).collect();

        let added = usable
            .logos
            .iter()
            .filter(|l| !previous_ids.contains(l.id.as_str()))
            .cloned()
            .collect();
        let removed = previous
            .map(|m| {
                m.logos
                    .iter()
                    .filter(|l| !usable_ids.contains(l.id.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        ValidationReport {
            usable,
            added,
            removed,
            broken,
        }
    }

    /// Probe one entry. Returns the entry to keep (possibly with a rewritten
    /// URL) or `None` when it is broken.
    async fn check_entry(&self, entry: &LogoEntry) -> Option<LogoEntry> {
        if !is_dead_link_pattern(&entry.url) && self.probe.exists(&entry.url).await {
            return Some(entry.clone());
        }

        // Best-effort normalization: a browsable repository link sometimes
        // converts to a direct raw-content link. Re-test once, then give up.
        if let Some(raw_url) = rewrite_browsable_url(&entry.url) {
            debug!(id = %entry.id, from = %entry.url, to = %raw_url, "retrying rewritten URL");
            if self.probe.exists(&raw_url).await {
                let mut rewritten = entry.clone();
                rewritten.url = raw_url;
                return Some(rewritten);
            }
        }

        None
    }
}

/// Known-dead URL shapes, excluded without probing.
///
/// Placeholder heuristic: today this recognizes VCS browsable "blob" links,
/// which serve an HTML page instead of the image bytes. Replace here when a
/// better detection rule lands; callers treat this as an opaque predicate.
pub fn is_dead_link_pattern(url: &str) -> bool {
    github_path(url).map_or(false, |path| path.contains("/blob/"))
}

/// Path component of a URL whose host is exactly github.com (or its www
/// alias). Substring matching would misclassify hosts like notgithub.com.
fn github_path(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    rest.strip_prefix("github.com/")
}

/// Convert a browsable GitHub blob link to its raw-content form:
/// `github.com/{owner}/{repo}/blob/{ref}/{path}` becomes
/// `raw.githubusercontent.com/{owner}/{repo}/{ref}/{path}`.
pub fn rewrite_browsable_url(url: &str) -> Option<String> {
    let path = github_path(url)?;
    let blob_idx = path.find("/blob/")?;
    let owner_repo = &path[..blob_idx];
    let ref_and_path = &path[blob_idx + "/blob/".len()..];
    if owner_repo.is_empty() || ref_and_path.is_empty() {
        return None;
    }
    Some(format!(
        "https://raw.githubusercontent.com/{}/{}",
        owner_repo, ref_and_path
    ))
}
