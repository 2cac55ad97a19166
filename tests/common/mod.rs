#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use link_shortener::application::services::{LinkService, LinkServiceSettings};
use link_shortener::domain::entities::NewLink;
use link_shortener::domain::repositories::LinkRepository;
use link_shortener::infrastructure::persistence::MemoryLinkRepository;

pub const BASE_URL: &str = "http://sho.rt/";
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(5);

pub fn test_settings() -> LinkServiceSettings {
    LinkServiceSettings {
        base_url: BASE_URL.to_string(),
        min_code_length: 5,
        max_code_length: 20,
        regeneration_attempts: 5,
        delete_queue_capacity: 64,
        delete_flush_interval: FLUSH_INTERVAL,
    }
}

pub fn memory_service() -> (
    Arc<MemoryLinkRepository>,
    LinkService<MemoryLinkRepository>,
) {
    let repo = Arc::new(MemoryLinkRepository::new());
    let service = LinkService::new(repo.clone(), test_settings()).unwrap();
    (repo, service)
}

pub async fn create_test_link<R: LinkRepository + ?Sized>(
    repo: &R,
    code: &str,
    target: &str,
    owner_id: u64,
) {
    repo.get_or_create(NewLink::new(code, target, owner_id))
        .await
        .unwrap();
}
