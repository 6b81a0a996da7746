//! Directory and credential collaborators

use super::cache::{CacheStore, Clock, DIRECTORY_CACHE_KEY, DIRECTORY_TTL, Expiry};
use super::store::KeyValueStore;
use crate::models::RawDirectory;
use crate::services::directory::{Directory, DirectoryData};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies a bearer credential from the host platform.
pub trait TokenProvider {
    fn acquire(&self) -> Result<String>;
}

/// Fixed credential, for local sources that ignore it.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn acquire(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Credential read from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
    fallback: Option<String>,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            fallback: None,
        }
    }

    /// Use `fallback` when the variable is unset or blank.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }
}

impl TokenProvider for EnvToken {
    fn acquire(&self) -> Result<String> {
        std::env::var(&self.var)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| Error::Auth(format!("{} is not set", self.var)))
    }
}

/// Acquires the credential once and keeps it for the session.
#[derive(Debug)]
pub struct SessionToken<P> {
    provider: P,
    token: Option<String>,
}

impl<P: TokenProvider> SessionToken<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            token: None,
        }
    }

    /// The session credential. A failed acquisition is not retried here;
    /// the next call asks the provider again.
    pub fn get(&mut self) -> Result<&str> {
        if self.token.is_none() {
            let token = self.provider.acquire().map_err(|err| {
                log::error!("Token acquisition failed: {err}");
                err
            })?;
            log::debug!("Session token acquired");
            self.token = Some(token);
        }
        Ok(self.token.as_deref().unwrap_or_default())
    }
}

/// Fetches the raw directory payload.
pub trait DirectorySource {
    fn fetch(&self, token: &str) -> Result<RawDirectory>;
}

/// Reads `{ "orgList": [...], "empList": [...] }` from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DirectorySource for JsonFileSource {
    fn fetch(&self, _token: &str) -> Result<RawDirectory> {
        let text = fs::read_to_string(&self.path)?;
        serde_json::from_str(&text).map_err(|err| {
            Error::Parse(format!("{}: {err}", self.path.display()))
        })
    }
}

/// Load the session directory, serving a fresh cached copy when available.
///
/// On a miss the source is fetched with the session credential, ingested and
/// written back to the cache.
pub fn load_directory<D, P, S, C>(
    source: &D,
    token: &mut SessionToken<P>,
    cache: &mut CacheStore<S, C>,
) -> Result<Directory>
where
    D: DirectorySource + ?Sized,
    P: TokenProvider,
    S: KeyValueStore,
    C: Clock,
{
    if let Some(data) =
        cache.get::<DirectoryData>(DIRECTORY_CACHE_KEY, Expiry::After(DIRECTORY_TTL))
    {
        log::info!("Using cached directory data");
        return Ok(Directory::from_data(data));
    }

    let raw = source.fetch(token.get()?)?;
    log::info!(
        "Fetched directory: {} orgs, {} employees",
        raw.org_list.len(),
        raw.emp_list.len()
    );

    let directory = Directory::ingest(raw);
    cache.set(DIRECTORY_CACHE_KEY, &directory.to_data());
    Ok(directory)
}
