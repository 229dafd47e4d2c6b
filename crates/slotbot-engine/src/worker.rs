//! Session/worker manager: one exclusive automation session per end user.
//!
//! The worker registry and the per-URL catalog cache are the only shared
//! mutable state in the engine, both owned by [`Engine`] — constructed
//! once, passed around explicitly, never reinitialized behind the scenes.
//!
//! Concurrency boundary: every public operation holds its worker's own
//! async lock for the full duration. Operations for different users run
//! fully in parallel; operations for the same user are strictly
//! sequential, so no flow can observe a session left mid-mutation.
//!
//! Recovery: when an operation fails with a driver fault (the substrate
//! died, or staleness escaped a flow's own bounded retries), the session
//! is destroyed and the whole operation retried exactly once against a
//! fresh one. A second failure is surfaced as a typed outcome.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use slotbot_config::{Config, SiteMarkers};
use slotbot_protocols::{
    AuthResult, BookingAttempt, EngineError, Intent, Outcome, RecordsResult, ServiceItem,
    TimesResult,
};
use tracing::{info, warn};

use crate::cdp::{CdpClient, ChromeProcess};
use crate::flows;
use crate::probe::DomProbe;
use crate::retry::{self, RetryPolicy};
use crate::site::SitePage;
use crate::tuning::EngineTuning;

/// One live automation session: a page handle plus the driver parts that
/// keep it alive. Fakes in tests carry no driver parts.
pub struct Session {
    page: Arc<dyn SitePage>,
    driver: Option<DriverParts>,
}

struct DriverParts {
    chrome: ChromeProcess,
    /// Held for its receive loop; dropping it closes the WebSocket.
    _client: CdpClient,
}

impl Session {
    /// A session over an externally managed page (used by tests).
    pub fn detached(page: Arc<dyn SitePage>) -> Self {
        Self { page, driver: None }
    }

    async fn teardown(mut self) {
        if let Some(mut parts) = self.driver.take() {
            parts.chrome.shutdown().await;
        }
    }
}

/// Creates sessions for workers. The production implementation launches
/// Chrome; tests substitute scripted pages.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self, user_id: &str) -> Result<Session, EngineError>;
}

/// Production factory: Chrome process + CDP client + DOM probe, with a
/// persistent per-user profile directory for carried-over login state.
pub struct ChromeSessionFactory {
    config: Arc<Config>,
    markers: Arc<SiteMarkers>,
}

impl ChromeSessionFactory {
    pub fn new(config: Arc<Config>) -> Self {
        let markers = Arc::new(config.markers.clone());
        Self { config, markers }
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    async fn create(&self, user_id: &str) -> Result<Session, EngineError> {
        let profile_dir = self
            .config
            .browser
            .profiles_root()
            .join(sanitize_user_id(user_id));

        let chrome = ChromeProcess::launch(&self.config.browser, &profile_dir).await?;
        let client = CdpClient::connect(chrome.endpoint()).await?;
        let page = client.new_page(None).await?;
        let probe = DomProbe::new(Arc::new(page), self.markers.clone());

        Ok(Session {
            page: Arc::new(probe),
            driver: Some(DriverParts {
                chrome,
                _client: client,
            }),
        })
    }
}

/// Map a user identity to a filesystem-safe profile directory name.
pub fn sanitize_user_id(user_id: &str) -> String {
    user_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Owner of one end-user's exclusive session.
pub struct Worker {
    user_id: String,
    factory: Arc<dyn SessionFactory>,
    markers: Arc<SiteMarkers>,
    tuning: Arc<EngineTuning>,
    /// Serializes all public operations for this user.
    op_lock: tokio::sync::Mutex<()>,
    /// Lazily created; `None` after an unrecoverable driver error.
    session: tokio::sync::Mutex<Option<Session>>,
}

impl Worker {
    fn new(
        user_id: &str,
        factory: Arc<dyn SessionFactory>,
        markers: Arc<SiteMarkers>,
        tuning: Arc<EngineTuning>,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            factory,
            markers,
            tuning,
            op_lock: tokio::sync::Mutex::new(()),
            session: tokio::sync::Mutex::new(None),
        }
    }

    /// Run one intent under this worker's lock, with the
    /// one-retry-with-fresh-session policy for driver faults.
    pub async fn dispatch(&self, intent: Intent) -> Outcome {
        let _guard = self.op_lock.lock().await;

        let result = retry::bounded(
            RetryPolicy::once_more(),
            || self.run_once(&intent),
            EngineError::is_driver_fault,
            || self.destroy_session(),
        )
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    "{} for user {} failed: {}",
                    intent.label(),
                    self.user_id,
                    e
                );
                failure_outcome(&intent, &e)
            }
        }
    }

    async fn run_once(&self, intent: &Intent) -> Result<Outcome, EngineError> {
        let page = self.ensure_session().await?;
        let page = page.as_ref();
        let markers = self.markers.as_ref();
        let tuning = self.tuning.as_ref();

        match intent {
            Intent::FetchServices { room_url } => {
                flows::services::fetch_services(page, markers, tuning, room_url)
                    .await
                    .map(|services| Outcome::Services { services })
            }
            Intent::FetchSlots {
                room_url,
                service_ids,
                date,
            } => flows::slots::fetch_slots(page, markers, tuning, room_url, service_ids, *date)
                .await
                .map(|result| Outcome::Slots { result }),
            Intent::Book {
                room_url,
                service_ids,
                date,
                times,
                comment,
            } => Ok(Outcome::Booking {
                attempts: flows::booking::book_slots(
                    page,
                    markers,
                    tuning,
                    room_url,
                    service_ids,
                    *date,
                    times,
                    comment,
                )
                .await,
            }),
            Intent::Login { phone, password } => {
                flows::auth::login(page, markers, tuning, phone, password)
                    .await
                    .map(|result| Outcome::Auth { result })
            }
            Intent::Register {
                name,
                phone,
                password,
                confirm,
            } => flows::auth::register(page, markers, tuning, name, phone, password, confirm)
                .await
                .map(|result| Outcome::Auth { result }),
            Intent::FetchRecords => flows::records::fetch_records(page, markers)
                .await
                .map(|result| Outcome::Records { result }),
        }
    }

    async fn ensure_session(&self) -> Result<Arc<dyn SitePage>, EngineError> {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(session.page.clone());
        }
        info!("creating browser session for user {}", self.user_id);
        let session = self.factory.create(&self.user_id).await?;
        let page = session.page.clone();
        *slot = Some(session);
        Ok(page)
    }

    async fn destroy_session(&self) {
        let taken = self.session.lock().await.take();
        if let Some(session) = taken {
            warn!("destroying browser session for user {}", self.user_id);
            session.teardown().await;
        }
    }

    /// Tear down the session (waits for any in-flight operation).
    pub async fn shutdown(&self) {
        let _guard = self.op_lock.lock().await;
        self.destroy_session().await;
    }
}

/// Translate a failed operation into the discriminated outcome the
/// front-end expects; a raw fault never crosses this boundary.
fn failure_outcome(intent: &Intent, error: &EngineError) -> Outcome {
    let message = user_message(error);
    match intent {
        Intent::FetchServices { .. } => Outcome::Error { message },
        Intent::FetchSlots { .. } => Outcome::Slots {
            result: TimesResult::error(message),
        },
        Intent::Book { times, .. } => Outcome::Booking {
            attempts: times
                .iter()
                .map(|t| BookingAttempt::failed(t, message.clone()))
                .collect(),
        },
        Intent::Login { .. } | Intent::Register { .. } => Outcome::Auth {
            result: AuthResult::unverified(false, message),
        },
        Intent::FetchRecords => Outcome::Records {
            result: RecordsResult {
                ok: false,
                records: Vec::new(),
                message,
            },
        },
    }
}

fn user_message(error: &EngineError) -> String {
    match error {
        EngineError::Logic { message } | EngineError::RemoteServer { message } => message.clone(),
        EngineError::Timeout { what } => {
            format!("Страница не ответила вовремя ({what}). Попробуйте ещё раз.")
        }
        EngineError::Driver { .. } | EngineError::Stale { .. } => {
            "Сессия браузера была перезапущена, но операция не удалась. Попробуйте ещё раз."
                .to_string()
        }
    }
}

/// Cached catalog for one room URL.
struct CatalogEntry {
    services: Vec<ServiceItem>,
    fetched_at: Instant,
}

/// Process-scoped engine context: the worker registry and the read-through
/// service catalog cache.
pub struct Engine {
    tuning: Arc<EngineTuning>,
    markers: Arc<SiteMarkers>,
    factory: Arc<dyn SessionFactory>,
    /// Registry mutation is the only globally shared lock; held briefly.
    workers: Mutex<HashMap<String, Arc<Worker>>>,
    /// Keyed by room URL, not by user; same-URL access serializes without
    /// blocking unrelated URLs.
    catalog: DashMap<String, CatalogEntry>,
    services_ttl: Duration,
}

impl Engine {
    /// Production engine over real Chrome sessions.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let factory = Arc::new(ChromeSessionFactory::new(config.clone()));
        Self::with_factory(&config, factory, EngineTuning::default())
    }

    /// Engine with an injected session factory and tuning.
    pub fn with_factory(
        config: &Config,
        factory: Arc<dyn SessionFactory>,
        tuning: EngineTuning,
    ) -> Self {
        Self {
            tuning: Arc::new(tuning),
            markers: Arc::new(config.markers.clone()),
            factory,
            workers: Mutex::new(HashMap::new()),
            catalog: DashMap::new(),
            services_ttl: Duration::from_secs(config.cache.services_ttl_secs),
        }
    }

    /// Dispatch one intent for one user. Catalog queries are answered from
    /// the cache when fresh.
    pub async fn dispatch(&self, user_id: &str, intent: Intent) -> Outcome {
        if let Intent::FetchServices { room_url } = &intent {
            if let Some(services) = self.cached_services(room_url) {
                return Outcome::Services { services };
            }
        }

        let worker = self.worker(user_id);
        let outcome = worker.dispatch(intent.clone()).await;

        if let (Intent::FetchServices { room_url }, Outcome::Services { services }) =
            (&intent, &outcome)
        {
            // An empty catalog is a failed extraction, not a fact worth
            // caching for the TTL window.
            if !services.is_empty() {
                self.catalog.insert(
                    room_url.clone(),
                    CatalogEntry {
                        services: services.clone(),
                        fetched_at: Instant::now(),
                    },
                );
            }
        }

        outcome
    }

    /// Drop the cached catalog for one room URL.
    pub fn reset_catalog(&self, room_url: &str) {
        self.catalog.remove(room_url);
    }

    fn cached_services(&self, room_url: &str) -> Option<Vec<ServiceItem>> {
        let entry = self.catalog.get(room_url)?;
        (entry.fetched_at.elapsed() < self.services_ttl && !entry.services.is_empty())
            .then(|| entry.services.clone())
    }

    fn worker(&self, user_id: &str) -> Arc<Worker> {
        let mut workers = self.workers.lock();
        workers
            .entry(user_id.to_string())
            .or_insert_with(|| {
                Arc::new(Worker::new(
                    user_id,
                    self.factory.clone(),
                    self.markers.clone(),
                    self.tuning.clone(),
                ))
            })
            .clone()
    }

    /// Tear down every live session.
    pub async fn shutdown(&self) {
        let workers: Vec<Arc<Worker>> = self.workers.lock().values().cloned().collect();
        for worker in workers {
            worker.shutdown().await;
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
