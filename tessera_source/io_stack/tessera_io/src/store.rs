use crate::{AssetError, AssetLocation, AssetSource, DirectorySource, HttpSource};
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use serde_json::Value;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Decoded asset payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetData {
    Json(Value),
    Bytes(Rc<[u8]>),
}

/// One loaded asset, keyed by the path it resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub path: String,
    pub data: AssetData,
}

impl Asset {
    pub fn json(&self) -> Option<&Value> {
        match &self.data {
            AssetData::Json(value) => Some(value),
            AssetData::Bytes(_) => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.data {
            AssetData::Bytes(bytes) => Some(bytes),
            AssetData::Json(_) => None,
        }
    }
}

pub type AssetResult = Result<Rc<Asset>, AssetError>;

type PendingLoad = Shared<LocalBoxFuture<'static, AssetResult>>;

/// Fetch-and-cache front for an `AssetSource`.
///
/// Single-threaded: concurrent `load` calls on the same path await one shared fetch.
/// Successful loads stay cached for the store's lifetime; failures are handed to
/// every waiter of that fetch and then forgotten so a later call fetches again.
pub struct AssetStore {
    source: Rc<dyn AssetSource>,
    cache: RefCell<HashMap<String, Rc<Asset>>>,
    in_flight: RefCell<HashMap<String, PendingLoad>>,
}

impl AssetStore {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        Self {
            source: Rc::new(source),
            cache: RefCell::new(HashMap::new()),
            in_flight: RefCell::new(HashMap::new()),
        }
    }

    pub fn from_location(location: AssetLocation) -> Result<Self, AssetError> {
        Ok(match location {
            AssetLocation::Url(url) => Self::new(HttpSource::new(&url)?),
            AssetLocation::Directory(dir) => Self::new(DirectorySource::new(dir)),
        })
    }

    pub fn describe_base(&self) -> String {
        self.source.describe()
    }

    pub fn resolve(&self, path: &str) -> Result<String, AssetError> {
        self.source
            .resolve(path)
            .ok_or_else(|| AssetError::not_found(path, self.source.describe()))
    }

    pub fn is_cached(&self, path: &str) -> bool {
        self.source
            .resolve(path)
            .is_some_and(|resolved| self.cache.borrow().contains_key(&resolved))
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub async fn load(&self, path: &str) -> AssetResult {
        let resolved = self.resolve(path)?;
        if let Some(asset) = self.cache.borrow().get(&resolved) {
            return Ok(Rc::clone(asset));
        }

        let pending = self.pending_load(&resolved);
        let result = pending.clone().await;

        // Whichever waiter settles first retires the in-flight entry.
        let mut in_flight = self.in_flight.borrow_mut();
        if in_flight
            .get(&resolved)
            .is_some_and(|current| current.ptr_eq(&pending))
        {
            in_flight.remove(&resolved);
            if let Ok(asset) = &result {
                self.cache
                    .borrow_mut()
                    .insert(resolved.clone(), Rc::clone(asset));
            }
        }
        drop(in_flight);

        match &result {
            Ok(_) => log::debug!("asset loaded: {resolved}"),
            Err(err) => log::debug!("asset load failed: {err}"),
        }
        result
    }

    pub async fn load_json(&self, path: &str) -> Result<Value, AssetError> {
        let asset = self.load(path).await?;
        asset.json().cloned().ok_or_else(|| AssetError::Parse {
            path: asset.path.clone(),
            reason: "expected a JSON asset".to_string(),
        })
    }

    fn pending_load(&self, resolved: &str) -> PendingLoad {
        let mut in_flight = self.in_flight.borrow_mut();
        if let Some(pending) = in_flight.get(resolved) {
            log::trace!("joining in-flight load of {resolved}");
            return pending.clone();
        }

        let source = Rc::clone(&self.source);
        let key = resolved.to_string();
        let pending = async move {
            let bytes = source.fetch(&key).await?;
            decode(key, bytes).map(Rc::new)
        }
        .boxed_local()
        .shared();
        in_flight.insert(resolved.to_string(), pending.clone());
        pending
    }
}

fn decode(path: String, bytes: Vec<u8>) -> Result<Asset, AssetError> {
    if !path.to_ascii_lowercase().ends_with(".json") {
        return Ok(Asset {
            path,
            data: AssetData::Bytes(bytes.into()),
        });
    }
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => Ok(Asset {
            path,
            data: AssetData::Json(value),
        }),
        Err(err) => Err(AssetError::Parse {
            path,
            reason: err.to_string(),
        }),
    }
}
