//! Fetches `<section>.json` data files and keeps only the current locale's slice.
//!
//! Data files are either partitioned by locale:
//!
//! ```json
//! { "es": { "title": "Hola" }, "en": { "title": "Hi" } }
//! ```
//!
//! or locale-agnostic, in which case they are returned as-is. Failures never
//! reach the caller: they are logged and turn into `None`.

use std::future::Future;
use std::path::{ Component, Path, PathBuf };
use std::pin::Pin;
use std::sync::Arc;

use bevy::log::{ debug, error };
use bevy::prelude::Resource;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::locale::{ Locale, DEFAULT_DATA_FALLBACK };

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{0}' points outside the data folder")]
    OutsideRoot(String),
    #[error("'{url}' answered with status {status}")]
    Status {
        url: String,
        status: u16,
    },
    #[cfg(feature = "http")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "http")]
    #[error("failed to start the HTTP runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[cfg(feature = "http")]
    #[error("HTTP task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid section name '{0}'")]
    InvalidSection(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<String, FetchError>> + Send + 'a>>;

/// Retrieves the raw body of a data file.
pub trait Fetch: Send + Sync + 'static {
    /// Body of the resource at `path`, relative to the fetcher's root.
    fn fetch<'a>(&'a self, path: &'a str) -> FetchFuture<'a>;
}

/// Reads data files from a local folder.
///
/// Paths that could leave the folder (`..`, absolute paths, `./`) are refused.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Fetch for DirectoryFetcher {
    fn fetch<'a>(&'a self, path: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            let relative = Path::new(path);
            let contained = relative.components().all(|c| matches!(c, Component::Normal(_)));
            if path.is_empty() || !contained {
                return Err(FetchError::OutsideRoot(path.to_string()));
            }
            let path = self.root.join(relative);
            std::fs::read_to_string(&path).map_err(|source| FetchError::Io { path, source })
        })
    }
}

/// GETs data files from `<base_url>/<path>`.
///
/// `reqwest` needs a Tokio reactor, which Bevy's task pools do not provide, so
/// the fetcher owns a single-worker Tokio runtime and awaits its join handles
/// from whatever executor polls the returned future.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
    runtime: Arc<tokio::runtime::Runtime>,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("folio-http")
            .enable_all()
            .build()
            .map_err(FetchError::Runtime)?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            runtime: Arc::new(runtime),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(feature = "http")]
impl Fetch for HttpFetcher {
    fn fetch<'a>(&'a self, path: &'a str) -> FetchFuture<'a> {
        let url = format!("{}/{}", self.base_url, path);
        let request = self.runtime.spawn(get_text(self.client.clone(), url));
        Box::pin(async move { request.await? })
    }
}

#[cfg(feature = "http")]
async fn get_text(client: reqwest::Client, url: String) -> Result<String, FetchError> {
    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status { url, status: status.as_u16() });
    }
    Ok(response.text().await?)
}

/// Path of the data file for `section`.
pub fn resource_path(section: &str) -> String {
    format!("{}.json", section)
}

/// Section names are single file stems: no separators and no `..`.
pub fn is_valid_section(section: &str) -> bool {
    !section.is_empty() && !section.contains(['/', '\\']) && !section.contains("..")
}

/// Picks the part of `document` that belongs to `current`.
///
/// Entries count only when they are "set": not null, `false`, `0` or `""`.
///
/// 1. An object with a set `current` entry yields that entry.
/// 2. An object with every supported locale set yields the `fallback` entry.
/// 3. Anything else is locale-agnostic and returned unchanged.
///
/// Step 2 needs the `current` entry to be set too, so with the current locale
/// always among the supported ones a partitioned file whose `current` entry is
/// unset comes back whole.
pub fn localized_subtree(document: Value, current: Locale, fallback: Locale) -> Value {
    let mut map = match document {
        Value::Object(map) => map,
        other => return other,
    };

    let is_set = |locale: Locale| map.get(locale.code()).is_some_and(is_truthy);
    let chosen = if is_set(current) {
        Some(current)
    } else if Locale::ALL.into_iter().all(is_set) {
        Some(fallback)
    } else {
        None
    };

    match chosen.and_then(|locale| map.remove(locale.code())) {
        Some(subtree) => subtree,
        None => Value::Object(map),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Loads localized data files through a [`Fetch`] implementation.
#[derive(Resource, Clone)]
pub struct DataLoader {
    fetcher: Arc<dyn Fetch>,
    fallback: Locale,
}

impl DataLoader {
    pub fn new(fetcher: impl Fetch) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            fallback: DEFAULT_DATA_FALLBACK,
        }
    }

    /// Overrides the locale served when a partitioned file lacks the current one.
    pub fn with_fallback(mut self, fallback: Locale) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> Locale {
        self.fallback
    }

    /// Data for `section` in `locale`, or `None` if it could not be fetched or parsed.
    pub async fn load(&self, section: &str, locale: Locale) -> Option<Value> {
        match self.try_load(section, locale).await {
            Ok(data) => Some(data),
            Err(e) => {
                error!("Failed to load {} data: {}", section, e);
                None
            }
        }
    }

    /// Like [`load`](Self::load), deserialized into `T`.
    pub async fn load_as<T: DeserializeOwned>(&self, section: &str, locale: Locale) -> Option<T> {
        let data = self.load(section, locale).await?;
        match serde_json::from_value(data) {
            Ok(typed) => Some(typed),
            Err(e) => {
                error!("Unexpected shape for {} data: {}", section, e);
                None
            }
        }
    }

    async fn try_load(&self, section: &str, locale: Locale) -> Result<Value, LoadError> {
        if !is_valid_section(section) {
            return Err(LoadError::InvalidSection(section.to_string()));
        }
        let path = resource_path(section);
        debug!("Fetching {}", path);
        let body = self.fetcher.fetch(&path).await?;
        let document: Value = serde_json::from_str(&body)?;
        Ok(localized_subtree(document, locale, self.fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::tasks::block_on;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;
    use std::fs;

    /// Serves bodies from memory; unknown paths answer 404.
    struct StaticFetcher(HashMap<String, String>);

    impl Fetch for StaticFetcher {
        fn fetch<'a>(&'a self, path: &'a str) -> FetchFuture<'a> {
            Box::pin(async move {
                self.0.get(path).cloned().ok_or_else(|| FetchError::Status {
                    url: path.to_string(),
                    status: 404,
                })
            })
        }
    }

    fn loader(files: &[(&str, &str)]) -> DataLoader {
        DataLoader::new(StaticFetcher(
            files.iter().map(|(p, b)| (p.to_string(), b.to_string())).collect()
        ))
    }

    const PROFILE: &str = r#"{ "es": {"title": "Hola"}, "en": {"title": "Hi"} }"#;

    #[test]
    fn selects_current_locale_subtree() {
        let loader = loader(&[("profile.json", PROFILE)]);
        assert_eq!(block_on(loader.load("profile", Locale::En)), Some(json!({"title": "Hi"})));
        assert_eq!(block_on(loader.load("profile", Locale::Es)), Some(json!({"title": "Hola"})));
    }

    #[test]
    fn fetch_failure_is_none() {
        let loader = loader(&[]);
        assert_eq!(block_on(loader.load("profile", Locale::En)), None);
    }

    #[test]
    fn parse_failure_is_none() {
        let loader = loader(&[("profile.json", "{ not json")]);
        assert_eq!(block_on(loader.load("profile", Locale::Es)), None);
    }

    #[test]
    fn unpartitioned_documents_pass_through() {
        let doc = json!({ "skills": ["rust", "svelte"], "en": {"title": "Hi"} });
        assert_eq!(localized_subtree(doc.clone(), Locale::Es, Locale::En), doc);

        let list = json!([1, 2, 3]);
        assert_eq!(localized_subtree(list.clone(), Locale::Es, Locale::En), list);
    }

    #[test]
    fn unset_current_entry_returns_whole_document() {
        let doc = json!({ "es": null, "en": {"title": "Hi"} });
        assert_eq!(localized_subtree(doc.clone(), Locale::Es, Locale::En), doc);

        let doc = json!({ "en": "", "es": {"title": "Hola"} });
        assert_eq!(localized_subtree(doc.clone(), Locale::En, Locale::Es), doc);

        let doc = json!({ "es": false, "en": 0 });
        assert_eq!(localized_subtree(doc.clone(), Locale::Es, Locale::En), doc);
    }

    #[test]
    fn set_scalar_entries_are_selected() {
        let doc = json!({ "es": "hola", "en": 1 });
        assert_eq!(localized_subtree(doc.clone(), Locale::Es, Locale::En), json!("hola"));
        assert_eq!(localized_subtree(doc, Locale::En, Locale::Es), json!(1));
    }

    #[test]
    fn lone_null_entry_is_left_in_place() {
        let doc = json!({ "es": null, "other": 1 });
        assert_eq!(localized_subtree(doc.clone(), Locale::Es, Locale::En), doc);
    }

    #[test]
    fn typed_loading() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Header {
            title: String,
        }

        let loader = loader(&[("profile.json", PROFILE), ("broken.json", r#"{"en": [1]}"#)]);
        assert_eq!(
            block_on(loader.load_as::<Header>("profile", Locale::Es)),
            Some(Header { title: "Hola".into() })
        );
        assert_eq!(block_on(loader.load_as::<Header>("broken", Locale::En)), None);
    }

    #[test]
    fn directory_fetcher_reads_section_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("profile.json"), PROFILE).unwrap();
        let loader = DataLoader::new(DirectoryFetcher::new(dir.path()));

        assert_eq!(block_on(loader.load("profile", Locale::En)), Some(json!({"title": "Hi"})));
        assert_eq!(block_on(loader.load("missing", Locale::En)), None);
    }

    #[test]
    fn sections_cannot_leave_the_data_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("secret.json"), PROFILE).unwrap();
        let loader = DataLoader::new(DirectoryFetcher::new(dir.path().join("data")));

        let absolute = dir.path().join("secret").to_string_lossy().to_string();
        for section in ["../secret", "..", "data/../../secret", "..\\secret", absolute.as_str(), ""] {
            assert_eq!(block_on(loader.load(section, Locale::En)), None, "{}", section);
        }
        assert!(is_valid_section("profile"));
        assert!(!is_valid_section("../secret"));
    }

    #[test]
    fn directory_fetcher_refuses_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = DirectoryFetcher::new(dir.path());

        for path in ["../secret.json", "/etc/hosts", "./profile.json"] {
            assert!(
                matches!(block_on(fetcher.fetch(path)), Err(FetchError::OutsideRoot(_))),
                "{}",
                path
            );
        }
    }

    #[cfg(feature = "http")]
    mod http {
        use super::*;
        use std::io::{ Read, Write };
        use std::net::TcpListener;
        use std::thread;

        /// Answers a single request, returning the server's base URL.
        fn serve_once(status_line: &'static str, body: &'static str) -> String {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            thread::spawn(move || {
                let (mut stream, _) = listener.accept().unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 512];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            });
            format!("http://{}", addr)
        }

        #[test]
        fn http_fetcher_serves_data_outside_tokio() {
            let fetcher = HttpFetcher::new(serve_once("200 OK", PROFILE)).unwrap();
            let loader = DataLoader::new(fetcher);
            assert_eq!(block_on(loader.load("profile", Locale::En)), Some(json!({"title": "Hi"})));
        }

        #[test]
        fn http_error_status_is_none() {
            let fetcher = HttpFetcher::new(serve_once("404 Not Found", "")).unwrap();
            assert!(
                matches!(block_on(fetcher.fetch("profile.json")), Err(FetchError::Status { status: 404, .. }))
            );

            let loader = DataLoader::new(HttpFetcher::new(serve_once("500 Internal Server Error", "")).unwrap());
            assert_eq!(block_on(loader.load("profile", Locale::En)), None);
        }

        #[test]
        fn refused_connection_is_none() {
            let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
            let loader = DataLoader::new(HttpFetcher::new(format!("http://{}/", addr)).unwrap());
            assert_eq!(block_on(loader.load("profile", Locale::En)), None);
        }
    }
}
