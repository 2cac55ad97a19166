//! In-memory implementation of link repository with an optional append-only log.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::link_log::{LinkLog, LogEntry};
use crate::domain::deletion_request::DeletionRequest;
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(Default)]
struct Store {
    links: Vec<Link>,
    by_code: HashMap<String, usize>,
    by_target: HashMap<String, usize>,
    log: Option<LinkLog>,
}

impl Store {
    fn find_by_target(&self, target: &str) -> Option<&Link> {
        self.by_target.get(target).map(|&i| &self.links[i])
    }

    fn insert(&mut self, link: Link) {
        let index = self.links.len();
        self.by_code.insert(link.code.clone(), index);
        self.by_target.insert(link.target.clone(), index);
        self.links.push(link);
    }

    fn record(&mut self, entries: &[LogEntry]) -> Result<(), AppError> {
        match self.log.as_mut() {
            Some(log) if !entries.is_empty() => log.append(entries),
            _ => Ok(()),
        }
    }

    fn replay(&mut self, entries: Vec<LogEntry>) {
        for entry in entries {
            match entry {
                LogEntry::Created {
                    code,
                    target,
                    owner_id,
                } => {
                    if self.by_code.contains_key(&code) || self.by_target.contains_key(&target) {
                        warn!(%code, "Skipping duplicate link in log");
                        continue;
                    }
                    self.insert(Link::new(code, target, owner_id));
                }
                LogEntry::Deleted { code, owner_id } => {
                    if let Some(&i) = self.by_code.get(&code)
                        && self.links[i].owner_id == owner_id
                    {
                        self.links[i].deleted = true;
                    }
                }
            }
        }
    }
}

/// Link storage held in process memory.
///
/// All state sits behind one `RwLock`. When opened with a log path, every
/// mutation is written to the log before it is applied in memory, so a
/// failed write leaves the store unchanged.
#[derive(Default)]
pub struct MemoryLinkRepository {
    store: RwLock<Store>,
}

impl MemoryLinkRepository {
    /// Creates an empty repository that keeps nothing on disk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a repository persisted to `path`, replaying what is already there.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] if the log cannot be read or opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let (log, entries) = LinkLog::open(path)?;
        let replayed = entries.len();

        let mut store = Store::default();
        store.replay(entries);
        info!(
            path = %log.path().display(),
            replayed,
            links = store.links.len(),
            "Opened link log"
        );
        store.log = Some(log);

        Ok(Self {
            store: RwLock::new(store),
        })
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn get_or_create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut store = self.store.write().await;

        if let Some(existing) = store.find_by_target(&new_link.target) {
            return Ok(existing.clone());
        }
        if store.by_code.contains_key(&new_link.code) {
            return Err(AppError::CodeConflict {
                code: new_link.code,
            });
        }

        store.record(&[LogEntry::Created {
            code: new_link.code.clone(),
            target: new_link.target.clone(),
            owner_id: new_link.owner_id,
        }])?;

        let link = Link::from(new_link);
        store.insert(link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let store = self.store.read().await;
        Ok(store.by_code.get(code).map(|&i| store.links[i].clone()))
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.store.read().await.by_code.contains_key(code))
    }

    async fn get_or_create_many(&self, new_links: Vec<NewLink>) -> Result<Vec<Link>, AppError> {
        let mut store = self.store.write().await;

        let mut results = Vec::with_capacity(new_links.len());
        let mut created = Vec::new();
        let mut batch_targets = HashSet::new();
        let mut batch_codes = HashSet::new();

        for new_link in new_links {
            if let Some(existing) = store.find_by_target(&new_link.target) {
                results.push(existing.clone());
                continue;
            }
            if !batch_targets.insert(new_link.target.clone()) {
                continue;
            }
            if store.by_code.contains_key(&new_link.code) || !batch_codes.insert(new_link.code.clone()) {
                return Err(AppError::CodeConflict {
                    code: new_link.code,
                });
            }
            let link = Link::from(new_link);
            created.push(link.clone());
            results.push(link);
        }

        let entries: Vec<LogEntry> = created
            .iter()
            .map(|link| LogEntry::Created {
                code: link.code.clone(),
                target: link.target.clone(),
                owner_id: link.owner_id,
            })
            .collect();
        store.record(&entries)?;

        debug!(created = created.len(), returned = results.len(), "Stored link batch");
        for link in created {
            store.insert(link);
        }

        Ok(results)
    }

    async fn list_by_owner(&self, owner_id: u64) -> Result<Vec<Link>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .links
            .iter()
            .filter(|link| link.is_owned_by(owner_id))
            .cloned()
            .collect())
    }

    async fn mark_deleted(&self, requests: Vec<DeletionRequest>) -> Result<(), AppError> {
        let mut store = self.store.write().await;

        let mut indices = Vec::new();
        let mut seen = HashSet::new();
        for request in &requests {
            if let Some(&i) = store.by_code.get(&request.code) {
                let link = &store.links[i];
                if link.is_owned_by(request.owner_id) && !link.deleted && seen.insert(i) {
                    indices.push(i);
                }
            }
        }

        let entries: Vec<LogEntry> = indices
            .iter()
            .map(|&i| LogEntry::Deleted {
                code: store.links[i].code.clone(),
                owner_id: store.links[i].owner_id,
            })
            .collect();
        store.record(&entries)?;

        for &i in &indices {
            store.links[i].deleted = true;
        }

        debug!(
            requested = requests.len(),
            deleted = indices.len(),
            "Applied deletion batch"
        );
        Ok(())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.store.read().await.links.len() as i64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
