use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::testutil::{FakeSite, service_row};
use slotbot_protocols::Intent;

/// Hands out pre-scripted fake pages, one per created session.
struct QueueFactory {
    pages: Mutex<VecDeque<Arc<FakeSite>>>,
    created: AtomicUsize,
}

impl QueueFactory {
    fn new(pages: Vec<Arc<FakeSite>>) -> Arc<Self> {
        Arc::new(Self {
            pages: Mutex::new(pages.into()),
            created: AtomicUsize::new(0),
        })
    }

    fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for QueueFactory {
    async fn create(&self, _user_id: &str) -> Result<Session, EngineError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let page = self
            .pages
            .lock()
            .pop_front()
            .ok_or_else(|| EngineError::driver("no more scripted sessions"))?;
        Ok(Session::detached(page))
    }
}

fn catalog_site() -> Arc<FakeSite> {
    let site = FakeSite::new();
    site.with(|s| {
        s.service_rows = vec![service_row("12", "Массаж", "60 мин", "2000")];
    });
    site
}

fn engine_with(factory: Arc<QueueFactory>, ttl_secs: u64) -> Engine {
    let mut config = Config::default();
    config.cache.services_ttl_secs = ttl_secs;
    Engine::with_factory(&config, factory, crate::tuning::EngineTuning::fast())
}

fn fetch_services_intent() -> Intent {
    Intent::FetchServices {
        room_url: "https://example.net/grey".to_string(),
    }
}

#[tokio::test]
async fn driver_fault_destroys_session_and_retries_once() {
    let dead = FakeSite::new();
    dead.with(|s| s.driver_dead = true);
    let healthy = catalog_site();
    let factory = QueueFactory::new(vec![dead, healthy]);
    let engine = engine_with(factory.clone(), 600);

    let outcome = engine.dispatch("alice", fetch_services_intent()).await;

    match outcome {
        Outcome::Services { services } => assert_eq!(services[0].id, "12"),
        other => panic!("expected services, got {other:?}"),
    }
    // First session died, second was created for the retry.
    assert_eq!(factory.created(), 2);
}

#[tokio::test]
async fn second_driver_fault_is_surfaced_not_retried() {
    let dead1 = FakeSite::new();
    dead1.with(|s| s.driver_dead = true);
    let dead2 = FakeSite::new();
    dead2.with(|s| s.driver_dead = true);
    let factory = QueueFactory::new(vec![dead1, dead2]);
    let engine = engine_with(factory.clone(), 600);

    let outcome = engine.dispatch("alice", fetch_services_intent()).await;

    assert!(matches!(outcome, Outcome::Error { .. }));
    assert_eq!(factory.created(), 2);
}

#[tokio::test]
async fn logic_failures_are_not_retried() {
    // A session that works but shows no catalog: a flow-internal failure.
    let empty = FakeSite::new();
    let factory = QueueFactory::new(vec![empty]);
    let engine = engine_with(factory.clone(), 600);

    let outcome = engine.dispatch("alice", fetch_services_intent()).await;

    match outcome {
        Outcome::Error { message } => assert!(message.contains("услуг")),
        other => panic!("expected error, got {other:?}"),
    }
    assert_eq!(factory.created(), 1);
}

#[tokio::test]
async fn fresh_catalog_is_served_from_cache() {
    let site = catalog_site();
    let factory = QueueFactory::new(vec![site.clone()]);
    let engine = engine_with(factory.clone(), 600);

    let first = engine.dispatch("alice", fetch_services_intent()).await;
    let second = engine.dispatch("alice", fetch_services_intent()).await;

    assert_eq!(first, second);
    // The page was only opened once; the second answer came from cache.
    assert_eq!(site.with(|s| s.opened_urls.len()), 1);
}

#[tokio::test]
async fn expired_catalog_is_refetched() {
    let site = catalog_site();
    let factory = QueueFactory::new(vec![site.clone()]);
    let engine = engine_with(factory.clone(), 0);

    engine.dispatch("alice", fetch_services_intent()).await;
    engine.dispatch("alice", fetch_services_intent()).await;

    assert_eq!(site.with(|s| s.opened_urls.len()), 2);
    // Same worker, same session: no extra browser was created.
    assert_eq!(factory.created(), 1);
}

#[tokio::test]
async fn reset_catalog_invalidates_the_entry() {
    let site = catalog_site();
    let factory = QueueFactory::new(vec![site.clone()]);
    let engine = engine_with(factory.clone(), 600);

    engine.dispatch("alice", fetch_services_intent()).await;
    engine.reset_catalog("https://example.net/grey");
    engine.dispatch("alice", fetch_services_intent()).await;

    assert_eq!(site.with(|s| s.opened_urls.len()), 2);
}

#[tokio::test]
async fn each_user_gets_an_exclusive_session() {
    let factory = QueueFactory::new(vec![catalog_site(), catalog_site()]);
    let engine = engine_with(factory.clone(), 0);

    engine.dispatch("alice", fetch_services_intent()).await;
    engine.dispatch("bob", fetch_services_intent()).await;

    assert_eq!(factory.created(), 2);
}

#[tokio::test]
async fn empty_catalog_is_never_cached() {
    // Rows whose titles all come out empty produce an empty catalog; an
    // empty catalog is a failed extraction and must not be pinned for the
    // TTL window.
    let site = FakeSite::new();
    site.with(|s| {
        s.service_rows = vec![service_row("12", "", "", "")];
    });
    let factory = QueueFactory::new(vec![site.clone()]);
    let engine = engine_with(factory.clone(), 600);

    let first = engine.dispatch("alice", fetch_services_intent()).await;
    assert!(matches!(first, Outcome::Services { ref services } if services.is_empty()));

    engine.dispatch("alice", fetch_services_intent()).await;
    // No cache hit: the page was opened twice.
    assert_eq!(site.with(|s| s.opened_urls.len()), 2);
}

#[test]
fn user_ids_map_to_safe_profile_names() {
    assert_eq!(sanitize_user_id("tg:123/456"), "tg_123_456");
    assert_eq!(sanitize_user_id("alice-01_x.y"), "alice-01_x.y");
    assert_eq!(sanitize_user_id("иван"), "____");
}
