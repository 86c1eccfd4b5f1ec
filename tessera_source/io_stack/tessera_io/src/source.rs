use crate::AssetError;
use async_trait::async_trait;
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    io::{self, Read},
    path::{Component, Path, PathBuf},
    rc::Rc,
};
use url::Url;

/// Where raw asset bytes come from.
///
/// `resolve` turns a manifest-relative path into the key the store caches under;
/// `None` means the path does not live under this source's base.
#[async_trait(?Send)]
pub trait AssetSource {
    /// Base location, used in error messages.
    fn describe(&self) -> String;

    fn resolve(&self, path: &str) -> Option<String>;

    async fn fetch(&self, resolved: &str) -> Result<Vec<u8>, AssetError>;
}

#[async_trait(?Send)]
impl<S: AssetSource + ?Sized> AssetSource for Rc<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn resolve(&self, path: &str) -> Option<String> {
        (**self).resolve(path)
    }

    async fn fetch(&self, resolved: &str) -> Result<Vec<u8>, AssetError> {
        (**self).fetch(resolved).await
    }
}

/// Base location an `AssetStore` is built from. URL and directory are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    Url(String),
    Directory(PathBuf),
}

impl AssetLocation {
    /// Pick the single configured base, rejecting "neither" and "both".
    pub fn from_parts(url: Option<&str>, dir: Option<&Path>) -> Result<Self, AssetError> {
        match (url, dir) {
            (Some(url), None) => Ok(Self::Url(url.to_string())),
            (None, Some(dir)) => Ok(Self::Directory(dir.to_path_buf())),
            (None, None) => Err(AssetError::InvalidConstructorArgument(
                "expected a base URL or a directory, got neither".to_string(),
            )),
            (Some(_), Some(_)) => Err(AssetError::InvalidConstructorArgument(
                "a base URL and a directory are mutually exclusive".to_string(),
            )),
        }
    }
}

/// Split a relative asset path into clean segments. Parent-dir hops never resolve.
fn relative_segments(path: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    for component in Path::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => segments.push(part.to_str()?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments)
}

/// Assets read from a local directory with `tokio::fs`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait(?Send)]
impl AssetSource for DirectorySource {
    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }

    fn resolve(&self, path: &str) -> Option<String> {
        let segments = relative_segments(path)?;
        let mut full = self.root.clone();
        for segment in segments {
            full.push(segment);
        }
        Some(full.to_string_lossy().into_owned())
    }

    async fn fetch(&self, resolved: &str) -> Result<Vec<u8>, AssetError> {
        tokio::fs::read(resolved).await.map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => AssetError::not_found(resolved, self.describe()),
            _ => AssetError::Io {
                path: resolved.to_string(),
                reason: err.to_string(),
            },
        })
    }
}

/// Assets held in memory, keyed by their clean relative path.
///
/// Every fetch yields to the scheduler once, so concurrent loads interleave
/// the way they would against a real directory or server.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RefCell<HashMap<String, Rc<[u8]>>>,
    fetches: Cell<usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, contents: impl AsRef<[u8]>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Paths that would not resolve are ignored.
    pub fn insert(&self, path: &str, contents: impl AsRef<[u8]>) {
        if let Some(key) = self.resolve(path) {
            self.files
                .borrow_mut()
                .insert(key, Rc::from(contents.as_ref()));
        }
    }

    pub fn remove(&self, path: &str) -> bool {
        self.resolve(path)
            .is_some_and(|key| self.files.borrow_mut().remove(&key).is_some())
    }

    /// Number of `fetch` calls so far, hits and misses alike.
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

#[async_trait(?Send)]
impl AssetSource for MemorySource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn resolve(&self, path: &str) -> Option<String> {
        relative_segments(path).map(|segments| segments.join("/"))
    }

    async fn fetch(&self, resolved: &str) -> Result<Vec<u8>, AssetError> {
        self.fetches.set(self.fetches.get() + 1);
        tokio::task::yield_now().await;
        self.files
            .borrow()
            .get(resolved)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| AssetError::not_found(resolved, self.describe()))
    }
}

/// Assets fetched over HTTP(S) from a URL prefix.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base: String,
}

impl HttpSource {
    /// `base` must be an absolute http(s) URL; a trailing slash is stripped.
    pub fn new(base: &str) -> Result<Self, AssetError> {
        let trimmed = base.trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|err| {
            AssetError::InvalidConstructorArgument(format!("invalid base URL `{base}`: {err}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AssetError::InvalidConstructorArgument(format!(
                "base URL `{base}` must use http or https"
            )));
        }
        Ok(Self {
            base: trimmed.to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

#[async_trait(?Send)]
impl AssetSource for HttpSource {
    fn describe(&self) -> String {
        format!("URL {}", self.base)
    }

    fn resolve(&self, path: &str) -> Option<String> {
        let segments = relative_segments(path)?;
        Some(format!("{}/{}", self.base, segments.join("/")))
    }

    async fn fetch(&self, resolved: &str) -> Result<Vec<u8>, AssetError> {
        let url = resolved.to_string();
        let base = self.describe();
        let outcome = tokio::task::spawn_blocking(move || http_get(&url)).await;
        match outcome {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(HttpFailure::Missing)) => Err(AssetError::not_found(resolved, base)),
            Ok(Err(HttpFailure::Other(reason))) => Err(AssetError::Io {
                path: resolved.to_string(),
                reason,
            }),
            Err(join_err) => Err(AssetError::Io {
                path: resolved.to_string(),
                reason: join_err.to_string(),
            }),
        }
    }
}

enum HttpFailure {
    Missing,
    Other(String),
}

fn http_get(url: &str) -> Result<Vec<u8>, HttpFailure> {
    let response = match ureq::get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(404 | 410, _)) => return Err(HttpFailure::Missing),
        Err(err) => return Err(HttpFailure::Other(err.to_string())),
    };
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|err| HttpFailure::Other(err.to_string()))?;
    Ok(bytes)
}
