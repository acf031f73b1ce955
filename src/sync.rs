use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use chrono::{SecondsFormat, Utc};

use crate::config::AppConfig;
use crate::identity::resolve_identity;
use crate::persist::{
    DocumentStore, FileDocumentStore, HttpDocumentStore, MemoryDocumentStore, document_path,
};
use crate::state::{Delta, SyncCommand};

/// Picks the store the configuration asks for: remote when a URL is set, otherwise files in
/// the cache directory, otherwise memory.
pub fn open_store(config: &AppConfig) -> Box<dyn DocumentStore> {
    if let Some(url) = config.store_url.as_deref() {
        return Box::new(HttpDocumentStore::new(url));
    }
    match FileDocumentStore::in_cache_dir() {
        Some(store) => Box::new(store),
        None => {
            log::warn!("no cache directory available, session will not survive a restart");
            Box::new(MemoryDocumentStore::new())
        }
    }
}

pub fn spawn_sync_worker(
    config: AppConfig,
    store: Box<dyn DocumentStore>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<SyncCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || run_sync_worker(&config, store.as_ref(), &tx, cmd_rx))
}

/// Resolves identity, loads the stored session, then writes every snapshot it is handed
/// until the command channel closes. Failures are logged and never stop the loop.
pub fn run_sync_worker(
    config: &AppConfig,
    store: &dyn DocumentStore,
    tx: &Sender<Delta>,
    cmd_rx: Receiver<SyncCommand>,
) {
    let identity = resolve_identity(config);
    let path = document_path(&identity);
    log::info!("syncing {path} via {}", store.describe());
    let _ = tx.send(Delta::IdentityReady(identity));
    let _ = tx.send(Delta::StoreReady(store.describe()));

    let loaded = match store.load(&path) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            log::warn!("loading {path} failed, starting with defaults: {err}");
            let _ = tx.send(Delta::Log(format!("[WARN] Load failed: {err}")));
            None
        }
    };
    let _ = tx.send(Delta::SessionLoaded(loaded));

    for cmd in cmd_rx {
        match cmd {
            SyncCommand::Save(mut snapshot) => {
                let at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
                snapshot.updated_at = Some(at.clone());
                match store.save(&path, &snapshot) {
                    Ok(()) => {
                        log::debug!("saved {} log entries to {path}", snapshot.log.len());
                        let _ = tx.send(Delta::Saved { at });
                    }
                    Err(err) => {
                        log::warn!("saving {path} failed: {err}");
                        let _ = tx.send(Delta::Log(format!("[WARN] Save failed: {err}")));
                    }
                }
            }
        }
    }
    log::info!("sync worker stopped");
}
