//! Gerrit code-owners backend
//!
//! Asks the code-owners REST plugin who may approve each path and picks a
//! covering reviewer set. The review host is derived from the `origin`
//! remote URL; `*.googlesource.com` repositories serve review traffic
//! from their `-review` twin. Credentials, when present, come from the
//! netscape-format `~/.gitcookies` file git itself uses.

use crate::error::{Error, Result};
use crate::owners::OwnersService;
use crate::types::ReviewerSet;
use reqwest::blocking::Client;
use reqwest::header;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gerrit prefixes every JSON response with an XSSI guard.
const XSSI_PREFIX: &str = ")]}'";

/// Candidates requested per path; the server returns them best-first.
const SUGGESTION_LIMIT: &str = "10";

/// Owners lookup against a Gerrit code-owners server
pub struct GerritOwnersService {
    client: Client,
    base: Url,
    project: String,
    branch: String,
    cookie: Option<String>,
}

#[derive(Deserialize)]
struct CodeOwnerInfo {
    account: AccountInfo,
}

#[derive(Deserialize)]
struct AccountInfo {
    email: Option<String>,
}

impl GerritOwnersService {
    /// Create a service for `project` on the server at `base`.
    ///
    /// `branch` is the destination branch whose OWNERS state is queried.
    #[must_use]
    pub fn new(base: Url, project: String, branch: String) -> Self {
        let cookie = base.host_str().and_then(gitcookies_cookie);
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base,
            project,
            branch,
            cookie,
        }
    }

    /// Derive the service from a git remote URL.
    pub fn from_remote(
        remote_url: &str,
        host_override: Option<&str>,
        branch: impl Into<String>,
    ) -> Result<Self> {
        let (derived_base, project) = parse_review_remote(remote_url)?;
        let base = match host_override {
            Some(host) => Url::parse(&format!("https://{host}/"))?,
            None => derived_base,
        };
        Ok(Self::new(base, project, branch.into()))
    }

    fn owners_for_path(&self, path: &str) -> Result<Vec<String>> {
        let mut endpoint = format!(
            "projects/{}/branches/{}/code_owners/{}",
            urlencoding::encode(&self.project),
            urlencoding::encode(&self.branch),
            urlencoding::encode(path)
        );
        // Authenticated requests go through the /a/ prefix.
        if self.cookie.is_some() {
            endpoint = format!("a/{endpoint}");
        }
        let url = self.base.join(&endpoint)?;
        debug!("code-owners lookup: {url}");

        let mut request = self
            .client
            .get(url)
            .query(&[("limit", SUGGESTION_LIMIT), ("resolve-all-users", "false")]);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie.as_str());
        }

        let response = request.send()?;
        if !response.status().is_success() {
            return Err(Error::Owners(format!(
                "code-owners request for {path} failed with {}",
                response.status()
            )));
        }
        parse_code_owners(&response.text()?)
    }
}

impl OwnersService for GerritOwnersService {
    /// Greedy cover: walk the paths in order and only add a reviewer when
    /// no already-selected one can approve the path. Candidates arrive
    /// best-first from the server, so the first admissible one is taken.
    fn suggest_owners(&self, paths: &[String], exclude: &[String]) -> Result<ReviewerSet> {
        let mut selected = ReviewerSet::new();
        for path in paths {
            let candidates: Vec<String> = self
                .owners_for_path(path)?
                .into_iter()
                .filter(|owner| !exclude.contains(owner))
                .collect();
            if candidates.iter().any(|c| selected.contains(c)) {
                continue;
            }
            if let Some(best) = candidates.into_iter().next() {
                selected.insert(best);
            }
        }
        Ok(selected)
    }
}

/// Parse a code-owners response body into owner emails.
fn parse_code_owners(body: &str) -> Result<Vec<String>> {
    let json = body.strip_prefix(XSSI_PREFIX).unwrap_or(body).trim_start();
    let infos: Vec<CodeOwnerInfo> = serde_json::from_str(json)
        .map_err(|err| Error::Owners(format!("malformed code-owners response: {err}")))?;
    Ok(infos
        .into_iter()
        .filter_map(|info| info.account.email)
        .collect())
}

/// Derive (review base URL, project) from a git remote URL.
///
/// Handles https and scp-like ssh remotes, strips the `/a/` auth prefix
/// and a `.git` suffix from the project path.
pub fn parse_review_remote(url: &str) -> Result<(Url, String)> {
    let (host, path): (String, String) = if let Some(rest) = url.strip_prefix("git@") {
        let (host, path) = rest
            .split_once(':')
            .ok_or_else(|| Error::Parse(format!("cannot parse remote URL: {url}")))?;
        (host.to_string(), path.to_string())
    } else {
        let parsed =
            Url::parse(url).map_err(|_| Error::Parse(format!("cannot parse remote URL: {url}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| Error::Parse(format!("remote URL has no host: {url}")))?
            .to_string();
        (host, parsed.path().to_string())
    };

    let project = path
        .trim_matches('/')
        .trim_end_matches(".git")
        .trim_start_matches("a/")
        .to_string();
    if project.is_empty() {
        return Err(Error::Parse(format!("remote URL has no project: {url}")));
    }

    let base = Url::parse(&format!("https://{}/", review_host_for(&host)))?;
    Ok((base, project))
}

/// `chromium.googlesource.com` serves review traffic from
/// `chromium-review.googlesource.com`; other hosts are their own review
/// host.
fn review_host_for(host: &str) -> String {
    match host.strip_suffix(".googlesource.com") {
        Some(instance) if !instance.ends_with("-review") => {
            format!("{instance}-review.googlesource.com")
        }
        _ => host.to_string(),
    }
}

/// Cookie for `host` from the gitcookies file, as a `name=value` header
/// value.
fn gitcookies_cookie(host: &str) -> Option<String> {
    let path = std::env::var_os("GIT_COOKIES_PATH")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".gitcookies")))?;
    let content = std::fs::read_to_string(path).ok()?;
    parse_gitcookies(&content, host)
}

fn parse_gitcookies(content: &str, host: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 7 {
            continue;
        }
        let domain = fields[0].trim_start_matches('.');
        if host == domain || host.ends_with(&format!(".{domain}")) {
            return Some(format!("{}={}", fields[5], fields[6]));
        }
    }
    None
}
