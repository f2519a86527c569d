//! Usage tracker.
//!
//! While a user is logged in the tracker reports focus changes, page views
//! and a periodic heartbeat to the analytics endpoint. Events go through an
//! outbound queue drained by a background task; failures are only logged.

use anyhow::Result;
use rand::Rng;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::models::{Rol, UserProfile};
use crate::router::Route;
use crate::session::{SessionContext, SessionSnapshot};
use crate::storage::{Storage, ANALYTICS_SESSION_KEY};

mod transport;

pub use transport::{HttpTransport, Transport};

/// How long `stop` waits for queued events to go out
const DRAIN_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Focus,
    Blur,
    Heartbeat,
    PageView,
    Unload,
}

/// Tracking payload as the endpoint expects it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEvent {
    pub session_id: String,
    pub user_id: Option<i64>,
    pub rol: Option<Rol>,
    pub route: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Immediate,
    /// Must survive shutdown; beacon first, then a regular send
    UnloadSafe,
}

type Outbound = (TrackEvent, Delivery);

#[derive(Debug, Default)]
struct TrackerState {
    user: Option<(i64, Rol)>,
    route: String,
    last_focus_at: Option<Instant>,
    last_page_view: Option<String>,
}

impl TrackerState {
    /// Milliseconds since the last focus or heartbeat mark
    fn elapsed_ms(&self) -> u64 {
        self.last_focus_at
            .map(|at| at.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Cloneable sender side shared with the heartbeat task
#[derive(Clone)]
struct Emitter {
    session_id: Arc<str>,
    state: Arc<Mutex<TrackerState>>,
    outbox: mpsc::UnboundedSender<Outbound>,
}

impl Emitter {
    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, state: &TrackerState, kind: EventKind, duration_ms: Option<u64>, delivery: Delivery) {
        let event = TrackEvent {
            session_id: self.session_id.to_string(),
            user_id: state.user.map(|(id, _)| id),
            rol: state.user.map(|(_, rol)| rol),
            route: state.route.clone(),
            kind,
            duration_ms,
        };

        if self.outbox.send((event, delivery)).is_err() {
            tracing::debug!("Tracker queue closed, dropping {:?} event", kind);
        }
    }

    fn heartbeat(&self) {
        let mut state = self.state();
        let elapsed = state.elapsed_ms();
        self.emit(&state, EventKind::Heartbeat, Some(elapsed), Delivery::Immediate);
        state.last_focus_at = Some(Instant::now());
    }
}

struct Running {
    emitter: Emitter,
    heartbeat: JoinHandle<()>,
    delivery: JoinHandle<()>,
}

/// Usage tracker with an explicit start/stop lifecycle
pub struct Tracker {
    session_id: Arc<str>,
    heartbeat_every: Duration,
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<TrackerState>>,
    running: Option<Running>,
}

impl Tracker {
    /// Create a stopped tracker, reusing the analytics session id in storage
    pub fn new(storage: &Storage, transport: Arc<dyn Transport>, heartbeat_every: Duration) -> Result<Self> {
        let session_id = analytics_session_id(storage)?;

        Ok(Self {
            session_id: session_id.into(),
            heartbeat_every,
            transport,
            state: Arc::new(Mutex::new(TrackerState::default())),
            running: None,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start tracking `user` on `route`: initial focus mark plus a page view
    pub fn start(&mut self, user: &UserProfile, route: &str) {
        if self.running.is_some() {
            self.set_user(user);
            return;
        }

        let (outbox, inbox) = mpsc::unbounded_channel();
        let emitter = Emitter {
            session_id: self.session_id.clone(),
            state: self.state.clone(),
            outbox,
        };

        {
            let mut state = emitter.state();
            state.user = Some((user.id, user.rol));
            state.route = route.to_string();
            state.last_page_view = None;
        }

        let delivery = tokio::spawn(deliver(self.transport.clone(), inbox));

        let ticker = emitter.clone();
        let every = self.heartbeat_every;
        let heartbeat = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
            loop {
                interval.tick().await;
                ticker.heartbeat();
            }
        });

        tracing::debug!("Tracker started for user {} ({})", user.id, self.session_id);

        self.running = Some(Running {
            emitter,
            heartbeat,
            delivery,
        });

        self.focus();
        self.page_view(route);
    }

    /// Refresh the user attached to subsequent events
    pub fn set_user(&self, user: &UserProfile) {
        if let Ok(mut state) = self.state.lock() {
            state.user = Some((user.id, user.rol));
        }
    }

    pub fn focus(&self) {
        let Some(running) = &self.running else { return };
        let mut state = running.emitter.state();
        state.last_focus_at = Some(Instant::now());
        running.emitter.emit(&state, EventKind::Focus, None, Delivery::Immediate);
    }

    pub fn blur(&self) {
        let Some(running) = &self.running else { return };
        let mut state = running.emitter.state();
        let elapsed = state.elapsed_ms();
        state.last_focus_at = None;
        running
            .emitter
            .emit(&state, EventKind::Blur, Some(elapsed), Delivery::UnloadSafe);
    }

    /// Record a route change; repeats of the last route are not sent
    pub fn page_view(&self, path: &str) {
        let Some(running) = &self.running else { return };
        if path.is_empty() {
            return;
        }

        let mut state = running.emitter.state();
        if state.last_page_view.as_deref() == Some(path) {
            return;
        }
        state.last_page_view = Some(path.to_string());
        state.route = path.to_string();
        running
            .emitter
            .emit(&state, EventKind::PageView, None, Delivery::Immediate);
    }

    /// Stop tracking: final unload event, then drain the queue
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else { return };
        running.heartbeat.abort();

        {
            let mut state = running.emitter.state();
            let elapsed = state.elapsed_ms();
            running
                .emitter
                .emit(&state, EventKind::Unload, Some(elapsed), Delivery::UnloadSafe);
            state.last_focus_at = None;
            state.last_page_view = None;
        }

        // Closing the last sender lets the delivery task finish
        let Running {
            emitter,
            heartbeat,
            mut delivery,
        } = running;
        drop(emitter);
        let _ = heartbeat.await;

        if tokio::time::timeout(DRAIN_TIMEOUT, &mut delivery).await.is_err() {
            tracing::debug!("Tracker queue not drained in time, dropping remaining events");
            delivery.abort();
        }

        if let Ok(mut state) = self.state.lock() {
            state.user = None;
        }
        tracing::debug!("Tracker stopped");
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.heartbeat.abort();
        }
    }
}

async fn deliver(transport: Arc<dyn Transport>, mut inbox: mpsc::UnboundedReceiver<Outbound>) {
    while let Some((event, delivery)) = inbox.recv().await {
        let result = match delivery {
            Delivery::Immediate => transport.send(&event).await,
            Delivery::UnloadSafe => match transport.beacon(&event).await {
                Ok(true) => Ok(()),
                Ok(false) => transport.send(&event).await,
                Err(e) => {
                    tracing::debug!("Beacon failed, falling back: {:#}", e);
                    transport.send(&event).await
                }
            },
        };

        if let Err(e) = result {
            tracing::debug!("Dropped {:?} event: {:#}", event.kind, e);
        }
    }
}

/// Read or create the opaque analytics session id
pub fn analytics_session_id(storage: &Storage) -> Result<String> {
    if let Some(id) = storage.get_item(ANALYTICS_SESSION_KEY)? {
        if !id.is_empty() {
            return Ok(id);
        }
    }

    let id = generate_session_id();
    storage.set_item(ANALYTICS_SESSION_KEY, &id)?;
    Ok(id)
}

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `<millis since epoch in base36>-<6 random base36 chars>`
fn generate_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    format!("{}-{}", to_base36(millis), suffix)
}

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Tracker driven by the session: running while someone is logged in
pub struct TrackerHandle {
    tracker: Arc<tokio::sync::Mutex<Tracker>>,
    session: SessionContext,
    follower: JoinHandle<()>,
}

impl TrackerHandle {
    /// Start following `session`; starts right away when already logged in
    pub async fn follow(mut tracker: Tracker, session: &SessionContext, route: Route) -> Self {
        let changes = session.subscribe();
        if let Some(current) = session.current() {
            tracker.start(&current.user, route.path());
        }

        let tracker = Arc::new(tokio::sync::Mutex::new(tracker));
        let follower = tokio::spawn(follow_session(tracker.clone(), changes));

        Self {
            tracker,
            session: session.clone(),
            follower,
        }
    }

    /// Lock the tracker with the current session applied, even when the
    /// follower has not seen the latest change yet
    async fn synced(&self, route: &str) -> tokio::sync::MutexGuard<'_, Tracker> {
        let mut tracker = self.tracker.lock().await;
        match self.session.current() {
            Some(current) if tracker.is_running() => tracker.set_user(&current.user),
            Some(current) => tracker.start(&current.user, route),
            None => tracker.stop().await,
        }
        tracker
    }

    pub async fn page_view(&self, route: Route) {
        self.synced(route.path()).await.page_view(route.path());
    }

    pub async fn focus(&self) {
        self.synced(Route::Dashboard.path()).await.focus();
    }

    pub async fn blur(&self) {
        self.synced(Route::Dashboard.path()).await.blur();
    }

    pub async fn is_running(&self) -> bool {
        self.tracker.lock().await.is_running()
    }

    /// Stop following and send the final unload event
    pub async fn shutdown(self) {
        self.follower.abort();
        self.synced(Route::Dashboard.path()).await.stop().await;
    }
}
