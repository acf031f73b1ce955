use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use reqwest::StatusCode;

use crate::error::PersistError;
use crate::http_client::http_client;
use crate::identity::Identity;
use crate::session::MatchSnapshot;

const CACHE_DIR: &str = "piste_scout";
const COLLECTION: &str = "fencing_scout_matches";
const DOCUMENT_ID: &str = "current_match";

/// Where a user's live match document lives.
pub fn document_path(identity: &Identity) -> String {
    format!(
        "/artifacts/{}/users/{}/{COLLECTION}/{DOCUMENT_ID}",
        identity.app_id, identity.user_id
    )
}

/// Remote (or local) keyed document storage. `Ok(None)` means the path has no document yet.
pub trait DocumentStore: Send {
    fn load(&self, path: &str) -> Result<Option<MatchSnapshot>, PersistError>;
    fn save(&self, path: &str, snapshot: &MatchSnapshot) -> Result<(), PersistError>;
    fn describe(&self) -> String;
}

/// JSON-over-HTTP store: one document per `<base><path>.json`.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    base_url: String,
}

impl HttpDocumentStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_start_matches('/'))
    }
}

impl DocumentStore for HttpDocumentStore {
    fn load(&self, path: &str) -> Result<Option<MatchSnapshot>, PersistError> {
        let resp = http_client()?.get(self.url(path)).send()?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = resp.text()?;
        if !status.is_success() {
            return Err(PersistError::Status {
                status: status.as_u16(),
                body,
            });
        }
        // A missing document may also come back as a literal `null`.
        let snapshot = serde_json::from_str::<Option<MatchSnapshot>>(&body)?;
        Ok(snapshot)
    }

    fn save(&self, path: &str, snapshot: &MatchSnapshot) -> Result<(), PersistError> {
        let resp = http_client()?.put(self.url(path)).json(snapshot).send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(PersistError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("remote {}", self.base_url)
    }
}

/// Documents as JSON files below `root`, mirroring the document path.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted in the user cache directory, if one can be found.
    pub fn in_cache_dir() -> Option<Self> {
        app_cache_dir().map(|dir| Self::new(dir.join("documents")))
    }

    fn file_for(&self, path: &str) -> PathBuf {
        let mut file = self.root.clone();
        for part in path.split('/').filter(|p| !p.is_empty() && *p != "..") {
            file.push(part);
        }
        file.set_extension("json");
        file
    }
}

impl DocumentStore for FileDocumentStore {
    fn load(&self, path: &str) -> Result<Option<MatchSnapshot>, PersistError> {
        let file = self.file_for(path);
        if !file.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&file)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, path: &str, snapshot: &MatchSnapshot) -> Result<(), PersistError> {
        let file = self.file_for(path);
        if let Some(dir) = file.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string(snapshot)?;
        write_atomic(&file, &json)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("local {}", self.root.display())
    }
}

fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

/// In-process store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<HashMap<String, String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn load(&self, path: &str) -> Result<Option<MatchSnapshot>, PersistError> {
        let raw = match self.docs.lock() {
            Ok(docs) => docs.get(path).cloned(),
            Err(poisoned) => poisoned.into_inner().get(path).cloned(),
        };
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, path: &str, snapshot: &MatchSnapshot) -> Result<(), PersistError> {
        let json = serde_json::to_string(snapshot)?;
        let mut docs = match self.docs.lock() {
            Ok(docs) => docs,
            Err(poisoned) => poisoned.into_inner(),
        };
        docs.insert(path.to_string(), json);
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}
