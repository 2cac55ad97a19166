//! Link creation, resolution and deletion service.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::domain::deletion_worker::DeletionPipeline;
use crate::domain::entities::{BatchItem, BatchResult, Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, RandomCodeGenerator};
use crate::utils::url_parser::parse_target;

/// Tunables for [`LinkService`].
#[derive(Debug, Clone)]
pub struct LinkServiceSettings {
    /// Prefix joined with a code to form the short URL.
    pub base_url: String,
    /// Code length used until the keyspace at that length gets crowded.
    pub min_code_length: usize,
    /// Longest code the service will ever allocate.
    pub max_code_length: usize,
    /// Candidates tried at one length before moving to the next.
    pub regeneration_attempts: usize,
    pub delete_queue_capacity: usize,
    pub delete_flush_interval: Duration,
}

impl Default for LinkServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/".to_string(),
            min_code_length: 5,
            max_code_length: 20,
            regeneration_attempts: 5,
            delete_queue_capacity: 1024,
            delete_flush_interval: Duration::from_secs(5),
        }
    }
}

impl LinkServiceSettings {
    /// Checks the settings for values the service cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidSettings`] describing the first problem found.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.min_code_length == 0 {
            return Err(AppError::InvalidSettings(
                "minimum code length must be greater than zero".to_string(),
            ));
        }
        if self.max_code_length < self.min_code_length {
            return Err(AppError::InvalidSettings(format!(
                "maximum code length {} is less than minimum {}",
                self.max_code_length, self.min_code_length
            )));
        }
        if self.regeneration_attempts == 0 {
            return Err(AppError::InvalidSettings(
                "regeneration attempts must be at least 1".to_string(),
            ));
        }
        if self.delete_queue_capacity == 0 {
            return Err(AppError::InvalidSettings(
                "delete queue capacity must be at least 1".to_string(),
            ));
        }
        if self.delete_flush_interval.is_zero() {
            return Err(AppError::InvalidSettings(
                "delete flush interval must be greater than zero".to_string(),
            ));
        }

        let base = Url::parse(&self.base_url).map_err(|e| {
            AppError::InvalidSettings(format!("base URL {:?}: {e}", self.base_url))
        })?;
        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(AppError::InvalidSettings(format!(
                "base URL {:?} must be an absolute http(s) URL",
                self.base_url
            )));
        }

        Ok(())
    }
}

/// Service for shortening URLs and managing their lifecycle.
///
/// Allocates collision-free codes against the repository, deduplicates by
/// target, and owns the background deletion pipeline.
///
/// # Code Length
///
/// Allocation starts at `min_code_length`. When every candidate at the
/// current length collides, the length grows by one for the rest of the
/// process lifetime. Previously issued codes stay valid. Once the length
/// passes `max_code_length`, allocation fails with
/// [`AppError::LengthExceeded`].
pub struct LinkService<R: LinkRepository + ?Sized> {
    repository: Arc<R>,
    generator: Arc<dyn CodeGenerator>,
    base_url: String,
    current_length: AtomicUsize,
    max_length: usize,
    regeneration_attempts: usize,
    deletion: DeletionPipeline,
}

/// Service over a backend chosen at runtime.
pub type DynLinkService = LinkService<dyn LinkRepository>;

impl<R: LinkRepository + ?Sized + 'static> LinkService<R> {
    /// Creates a service with a random code generator and starts its
    /// deletion worker. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidSettings`] if `settings` fail validation.
    pub fn new(repository: Arc<R>, settings: LinkServiceSettings) -> Result<Self, AppError> {
        Self::with_generator(repository, Arc::new(RandomCodeGenerator), settings)
    }

    /// Same as [`LinkService::new`] with a caller-supplied code generator.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidSettings`] if `settings` fail validation.
    pub fn with_generator(
        repository: Arc<R>,
        generator: Arc<dyn CodeGenerator>,
        settings: LinkServiceSettings,
    ) -> Result<Self, AppError> {
        settings.validate()?;

        let deletion = DeletionPipeline::start(
            repository.clone(),
            settings.delete_queue_capacity,
            settings.delete_flush_interval,
        );

        Ok(Self {
            repository,
            generator,
            base_url: settings.base_url,
            current_length: AtomicUsize::new(settings.min_code_length),
            max_length: settings.max_code_length,
            regeneration_attempts: settings.regeneration_attempts,
            deletion,
        })
    }
}

impl<R: LinkRepository + ?Sized> LinkService<R> {
    /// Returns the length new codes are currently allocated with.
    pub fn current_code_length(&self) -> usize {
        self.current_length.load(Ordering::Acquire)
    }

    /// Shortens `target` for `owner_id`, reusing the existing code when the
    /// target is already known.
    ///
    /// Returns the stored link and whether it existed before this call. An
    /// existing link keeps its original owner.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] if `target` is not an absolute URL or bare hostname
    /// - [`AppError::LengthExceeded`] if the code keyspace is exhausted
    /// - [`AppError::StorageUnavailable`] / [`AppError::CodeConflict`] from the repository
    pub async fn get_or_create(
        &self,
        target: &str,
        owner_id: u64,
    ) -> Result<(Link, bool), AppError> {
        parse_target(target)?;

        let code = self.allocate_code(&HashSet::new()).await?;
        let link = self
            .repository
            .get_or_create(NewLink::new(code.as_str(), target, owner_id))
            .await?;

        let existed = link.code != code;
        debug!(code = %link.code, owner_id, existed, "Resolved get-or-create");

        Ok((link, existed))
    }

    /// Shortens many targets with a single storage call.
    ///
    /// The result follows the order of `items`. Rows sharing a target all
    /// receive the same short URL.
    ///
    /// # Errors
    ///
    /// Fails as a whole: one invalid target yields [`AppError::InvalidUrl`]
    /// before anything is stored. See [`LinkService::get_or_create`] for the
    /// other cases.
    pub async fn get_or_create_batch(
        &self,
        items: Vec<BatchItem>,
        owner_id: u64,
    ) -> Result<Vec<BatchResult>, AppError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        for item in &items {
            parse_target(&item.target)?;
        }

        let mut reserved = HashSet::new();
        let mut seen_targets = HashSet::new();
        let mut new_links = Vec::new();

        for item in &items {
            if !seen_targets.insert(item.target.as_str()) {
                continue;
            }
            let code = self.allocate_code(&reserved).await?;
            reserved.insert(code.clone());
            new_links.push(NewLink::new(code, item.target.as_str(), owner_id));
        }

        debug!(
            rows = items.len(),
            distinct = new_links.len(),
            owner_id,
            "Storing link batch"
        );

        let stored = self.repository.get_or_create_many(new_links).await?;
        let codes: HashMap<&str, &str> = stored
            .iter()
            .map(|link| (link.target.as_str(), link.code.as_str()))
            .collect();

        items
            .into_iter()
            .map(|item| {
                let code = codes.get(item.target.as_str()).ok_or_else(|| {
                    AppError::storage(format!("batch result is missing target {:?}", item.target))
                })?;
                Ok(BatchResult {
                    correlation_id: item.correlation_id,
                    short_url: self.short_url(code),
                })
            })
            .collect()
    }

    /// Looks up a code. Deleted links are returned too; callers check
    /// [`Link::deleted`] themselves.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code was never assigned.
    pub async fn resolve(&self, code: &str) -> Result<Link, AppError> {
        self.repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found(code))
    }

    /// Joins the configured base URL and `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}{}", self.base_url, code)
    }

    /// Lists links created by `owner_id`. No links is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on repository errors.
    pub async fn list_owned(&self, owner_id: u64) -> Result<Vec<Link>, AppError> {
        self.repository.list_by_owner(owner_id).await
    }

    /// Counts stored links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on repository errors.
    pub async fn count_links(&self) -> Result<i64, AppError> {
        self.repository.count().await
    }

    /// Checks that the repository is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] when it is not.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    /// Schedules `codes` for soft deletion on behalf of `owner_id`.
    ///
    /// Fire-and-forget: returns once the requests are queued, not applied.
    /// Codes the owner does not own are ignored at flush time. After
    /// [`LinkService::shutdown`] requests are dropped silently.
    pub async fn request_delete(&self, owner_id: u64, codes: Vec<String>) {
        if codes.is_empty() {
            return;
        }
        self.deletion.enqueue(owner_id, codes).await;
    }

    /// Returns false once the deletion pipeline has been shut down.
    pub fn accepts_deletions(&self) -> bool {
        self.deletion.is_running()
    }

    /// Flushes pending deletions and stops the deletion pipeline.
    ///
    /// Creation and resolution keep working afterwards.
    pub async fn shutdown(&self) {
        info!("Shutting down link service deletion pipeline");
        self.deletion.shutdown().await;
    }

    /// Allocates a code that is neither stored nor in `reserved`.
    async fn allocate_code(&self, reserved: &HashSet<String>) -> Result<String, AppError> {
        loop {
            let length = self.current_code_length();
            if length > self.max_length {
                return Err(AppError::LengthExceeded {
                    max_length: self.max_length,
                });
            }

            for _ in 0..self.regeneration_attempts {
                let candidate = self.generator.generate(length)?;
                if reserved.contains(&candidate) {
                    continue;
                }
                if !self.repository.exists(&candidate).await? {
                    return Ok(candidate);
                }
            }

            self.escalate_length(length);
        }
    }

    /// Grows the code length from `from` by one. Concurrent callers that
    /// observed the same `from` escalate only once.
    fn escalate_length(&self, from: usize) {
        match self.current_length.compare_exchange(
            from,
            from + 1,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => warn!(
                from,
                to = from + 1,
                max = self.max_length,
                "All code candidates collided, increasing code length"
            ),
            Err(current) => debug!(from, current, "Code length already increased"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deletion_request::DeletionRequest;
    use crate::domain::repositories::MockLinkRepository;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Always yields `symbol` repeated to the requested length.
    struct RepeatGenerator(char);

    impl CodeGenerator for RepeatGenerator {
        fn generate(&self, length: usize) -> Result<String, AppError> {
            if length == 0 {
                return Err(AppError::InvalidLength);
            }
            Ok(std::iter::repeat_n(self.0, length).collect())
        }
    }

    /// Yields the queued codes in order, ignoring the requested length.
    struct SequenceGenerator(Mutex<VecDeque<&'static str>>);

    impl SequenceGenerator {
        fn new(codes: &[&'static str]) -> Self {
            Self(Mutex::new(codes.iter().copied().collect()))
        }
    }

    impl CodeGenerator for SequenceGenerator {
        fn generate(&self, _length: usize) -> Result<String, AppError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| AppError::storage("sequence exhausted"))
        }
    }

    fn settings(min: usize, max: usize, attempts: usize) -> LinkServiceSettings {
        LinkServiceSettings {
            base_url: "http://localhost:8080/".to_string(),
            min_code_length: min,
            max_code_length: max,
            regeneration_attempts: attempts,
            ..LinkServiceSettings::default()
        }
    }

    fn service(
        repo: MockLinkRepository,
        generator: impl CodeGenerator + 'static,
        settings: LinkServiceSettings,
    ) -> LinkService<MockLinkRepository> {
        LinkService::with_generator(Arc::new(repo), Arc::new(generator), settings).unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_new_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().times(1).returning(|_| Ok(false));
        repo.expect_get_or_create()
            .withf(|new_link| {
                new_link.target == "https://example.com"
                    && new_link.owner_id == 7
                    && new_link.code.len() == 5
            })
            .times(1)
            .returning(|new_link| Ok(Link::from(new_link)));

        let service = LinkService::new(Arc::new(repo), LinkServiceSettings::default()).unwrap();

        let (link, existed) = service
            .get_or_create("https://example.com", 7)
            .await
            .unwrap();

        assert!(!existed);
        assert_eq!(link.code.len(), 5);
        assert_eq!(link.owner_id, 7);
    }

    #[tokio::test]
    async fn test_get_or_create_existing_target() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_get_or_create()
            .times(1)
            .returning(|_| Ok(Link::new("first", "https://example.com", 1)));

        let service = service(repo, RepeatGenerator('z'), settings(5, 20, 5));

        let (link, existed) = service
            .get_or_create("https://example.com", 2)
            .await
            .unwrap();

        assert!(existed);
        assert_eq!(link.code, "first");
        assert_eq!(link.owner_id, 1);
    }

    #[tokio::test]
    async fn test_get_or_create_accepts_bare_hostname() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_get_or_create()
            .withf(|new_link| new_link.target == "example.com")
            .returning(|new_link| Ok(Link::from(new_link)));

        let service = service(repo, RepeatGenerator('a'), settings(3, 5, 1));

        let (link, _) = service.get_or_create("example.com", 1).await.unwrap();
        assert_eq!(link.target, "example.com");
    }

    #[tokio::test]
    async fn test_get_or_create_invalid_url() {
        let repo = MockLinkRepository::new();
        let service = service(repo, RepeatGenerator('a'), settings(3, 5, 1));

        let result = service.get_or_create("exa mple.com", 1).await;

        assert!(matches!(result, Err(AppError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_collision_escalates_length() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|code| Ok(code == "a"));
        repo.expect_get_or_create()
            .returning(|new_link| Ok(Link::from(new_link)));

        let service = service(repo, RepeatGenerator('a'), settings(1, 2, 1));
        assert_eq!(service.current_code_length(), 1);

        let (link, existed) = service.get_or_create("http://b.com", 1).await.unwrap();

        assert!(!existed);
        assert_eq!(link.code, "aa");
        assert_eq!(service.current_code_length(), 2);
    }

    #[tokio::test]
    async fn test_escalated_length_is_never_reduced() {
        let mut repo = MockLinkRepository::new();
        let checks = AtomicUsize::new(0);
        // Only the very first candidate collides.
        repo.expect_exists()
            .returning(move |_| Ok(checks.fetch_add(1, Ordering::SeqCst) == 0));
        repo.expect_get_or_create()
            .returning(|new_link| Ok(Link::from(new_link)));

        let service = service(repo, RepeatGenerator('q'), settings(1, 4, 1));

        let (first, _) = service.get_or_create("http://one.com", 1).await.unwrap();
        let (second, _) = service.get_or_create("http://two.com", 1).await.unwrap();

        assert_eq!(first.code.len(), 2);
        assert_eq!(second.code.len(), 2);
        assert_eq!(service.current_code_length(), 2);
    }

    #[tokio::test]
    async fn test_length_exceeded() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(true));
        repo.expect_get_or_create().never();

        let service = service(repo, RepeatGenerator('a'), settings(1, 1, 1));

        let result = service.get_or_create("http://b.com", 1).await;
        assert!(matches!(
            result,
            Err(AppError::LengthExceeded { max_length: 1 })
        ));

        // Once exhausted, later calls fail without touching storage.
        let result = service.get_or_create("http://c.com", 1).await;
        assert!(matches!(result, Err(AppError::LengthExceeded { .. })));
        assert_eq!(service.current_code_length(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_escalation_from_same_length_grows_once() {
        let repo = MockLinkRepository::new();
        let service = service(repo, RepeatGenerator('a'), settings(3, 10, 1));

        service.escalate_length(3);
        service.escalate_length(3);

        assert_eq!(service.current_code_length(), 4);
    }

    #[tokio::test]
    async fn test_storage_error_on_exists_propagates() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists()
            .returning(|_| Err(AppError::storage("connection refused")));
        repo.expect_get_or_create().never();

        let service = service(repo, RepeatGenerator('a'), settings(3, 5, 2));

        let result = service.get_or_create("http://a.com", 1).await;
        assert!(matches!(result, Err(AppError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_storage_error_on_create_propagates() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_get_or_create()
            .times(1)
            .returning(|_| Err(AppError::storage("timeout")));

        let service = service(repo, RepeatGenerator('a'), settings(3, 5, 2));

        let result = service.get_or_create("http://a.com", 1).await;
        assert!(matches!(result, Err(AppError::StorageUnavailable(msg)) if msg == "timeout"));
    }

    #[tokio::test]
    async fn test_batch_preserves_correlation_with_duplicate_targets() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_get_or_create_many()
            .withf(|new_links| new_links.len() == 2)
            .times(1)
            .returning(|new_links| {
                // The first target was stored earlier under another code.
                Ok(new_links
                    .into_iter()
                    .map(|new_link| {
                        if new_link.target == "http://a.com" {
                            Link::new("old", "http://a.com", 99)
                        } else {
                            Link::from(new_link)
                        }
                    })
                    .rev()
                    .collect())
            });

        let service = service(
            repo,
            SequenceGenerator::new(&["c1", "c2"]),
            settings(2, 5, 3),
        );

        let results = service
            .get_or_create_batch(
                vec![
                    BatchItem::new("1", "http://a.com"),
                    BatchItem::new("2", "http://b.com"),
                    BatchItem::new("3", "http://a.com"),
                ],
                5,
            )
            .await
            .unwrap();

        assert_eq!(
            results,
            vec![
                BatchResult {
                    correlation_id: "1".to_string(),
                    short_url: "http://localhost:8080/old".to_string(),
                },
                BatchResult {
                    correlation_id: "2".to_string(),
                    short_url: "http://localhost:8080/c2".to_string(),
                },
                BatchResult {
                    correlation_id: "3".to_string(),
                    short_url: "http://localhost:8080/old".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_batch_never_reuses_a_candidate() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_get_or_create_many()
            .withf(|new_links| {
                let codes: Vec<&str> = new_links.iter().map(|l| l.code.as_str()).collect();
                codes == ["dup", "new"]
            })
            .times(1)
            .returning(|new_links| Ok(new_links.into_iter().map(Link::from).collect()));

        let service = service(
            repo,
            SequenceGenerator::new(&["dup", "dup", "new"]),
            settings(3, 5, 3),
        );

        let results = service
            .get_or_create_batch(
                vec![
                    BatchItem::new("x", "http://x.com"),
                    BatchItem::new("y", "http://y.com"),
                ],
                1,
            )
            .await
            .unwrap();

        assert_eq!(results[0].short_url, "http://localhost:8080/dup");
        assert_eq!(results[1].short_url, "http://localhost:8080/new");
    }

    #[tokio::test]
    async fn test_batch_invalid_url_fails_before_storage() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().never();
        repo.expect_get_or_create_many().never();

        let service = service(repo, RepeatGenerator('a'), settings(3, 5, 1));

        let result = service
            .get_or_create_batch(
                vec![
                    BatchItem::new("1", "http://ok.com"),
                    BatchItem::new("2", "http://"),
                ],
                1,
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_batch_empty() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get_or_create_many().never();

        let service = service(repo, RepeatGenerator('a'), settings(3, 5, 1));

        let results = service.get_or_create_batch(Vec::new(), 1).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .withf(|code| code == "nope")
            .returning(|_| Ok(None));

        let service = service(repo, RepeatGenerator('a'), settings(3, 5, 1));

        let result = service.resolve("nope").await;
        assert!(matches!(result, Err(AppError::NotFound { code }) if code == "nope"));
    }

    #[tokio::test]
    async fn test_resolve_returns_deleted_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().returning(|code| {
            let mut link = Link::new(code, "https://gone.com", 1);
            link.deleted = true;
            Ok(Some(link))
        });

        let service = service(repo, RepeatGenerator('a'), settings(3, 5, 1));

        let link = service.resolve("abc").await.unwrap();
        assert!(link.is_deleted());
        assert_eq!(link.target, "https://gone.com");
    }

    #[tokio::test]
    async fn test_short_url() {
        let repo = MockLinkRepository::new();
        let mut settings = settings(3, 5, 1);
        settings.base_url = "https://s.example.com/go/".to_string();
        let service = service(repo, RepeatGenerator('a'), settings);

        assert_eq!(service.short_url("Ab3"), "https://s.example.com/go/Ab3");
    }

    #[tokio::test]
    async fn test_list_owned_empty() {
        let mut repo = MockLinkRepository::new();
        repo.expect_list_by_owner()
            .withf(|owner_id| *owner_id == 42)
            .returning(|_| Ok(Vec::new()));

        let service = service(repo, RepeatGenerator('a'), settings(3, 5, 1));

        assert!(service.list_owned(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_links() {
        let mut repo = MockLinkRepository::new();
        repo.expect_count().times(1).returning(|| Ok(12));

        let service = service(repo, RepeatGenerator('a'), settings(3, 5, 1));

        assert_eq!(service.count_links().await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_request_delete_then_shutdown_flushes() {
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let sink = recorded.clone();
        let mut repo = MockLinkRepository::new();
        repo.expect_mark_deleted().returning(move |requests| {
            sink.lock().unwrap().extend(requests);
            Ok(())
        });

        let service = service(repo, RepeatGenerator('a'), settings(3, 5, 1));

        service
            .request_delete(3, vec!["X".to_string(), "Y".to_string()])
            .await;
        service.shutdown().await;

        assert!(!service.accepts_deletions());
        assert_eq!(
            *recorded.lock().unwrap(),
            vec![DeletionRequest::new("X", 3), DeletionRequest::new("Y", 3)]
        );
    }

    #[tokio::test]
    async fn test_creation_still_works_after_shutdown() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_get_or_create()
            .returning(|new_link| Ok(Link::from(new_link)));

        let service = service(repo, RepeatGenerator('a'), settings(3, 5, 1));
        service.shutdown().await;

        assert!(service.get_or_create("http://a.com", 1).await.is_ok());
    }

    #[test]
    fn test_settings_validation() {
        assert!(LinkServiceSettings::default().validate().is_ok());

        let cases = [
            LinkServiceSettings {
                min_code_length: 0,
                ..LinkServiceSettings::default()
            },
            LinkServiceSettings {
                min_code_length: 6,
                max_code_length: 5,
                ..LinkServiceSettings::default()
            },
            LinkServiceSettings {
                regeneration_attempts: 0,
                ..LinkServiceSettings::default()
            },
            LinkServiceSettings {
                delete_queue_capacity: 0,
                ..LinkServiceSettings::default()
            },
            LinkServiceSettings {
                delete_flush_interval: Duration::ZERO,
                ..LinkServiceSettings::default()
            },
            LinkServiceSettings {
                base_url: "localhost:8080".to_string(),
                ..LinkServiceSettings::default()
            },
            LinkServiceSettings {
                base_url: "ftp://files.example.com/".to_string(),
                ..LinkServiceSettings::default()
            },
        ];

        for settings in cases {
            assert!(
                matches!(settings.validate(), Err(AppError::InvalidSettings(_))),
                "expected {settings:?} to be rejected"
            );
        }
    }
}
