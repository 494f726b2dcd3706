//! Session — the root owner of one arena and everything created under it.
//!
//! Agents, tool registries and protocol clients register themselves with a
//! session when they are created. Closing the session is the single
//! teardown point: clients are disconnected, agents shut down, registries
//! released and finally the arena is destroyed, which invalidates every
//! arena handle issued under the session.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use ferroact_arena::{ArenaStats, SharedArena};
use ferroact_config::RuntimeConfig;
use ferroact_core::error::{Error, Result};
use ferroact_core::event::{DomainEvent, EventBus};
use ferroact_core::protocol::ProtocolClient;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::loop_runner::Agent;
use crate::registry::ToolRegistry;

const INITIAL_SLOTS: usize = 4;

/// How many items a session currently tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounts {
    pub agents: usize,
    pub registries: usize,
    pub protocol_clients: usize,
}

struct SessionState {
    closed: bool,
    agents: Vec<Arc<Agent>>,
    registries: Vec<Arc<ToolRegistry>>,
    clients: Vec<Arc<dyn ProtocolClient>>,
}

impl SessionState {
    fn new() -> Result<Self> {
        let mut state = Self {
            closed: false,
            agents: Vec::new(),
            registries: Vec::new(),
            clients: Vec::new(),
        };
        state
            .agents
            .try_reserve_exact(INITIAL_SLOTS)
            .and_then(|_| state.registries.try_reserve_exact(INITIAL_SLOTS))
            .and_then(|_| state.clients.try_reserve_exact(INITIAL_SLOTS))
            .map_err(|_| Error::OutOfMemory("session collections".into()))?;
        Ok(state)
    }

    fn counts(&self) -> SessionCounts {
        SessionCounts {
            agents: self.agents.len(),
            registries: self.registries.len(),
            protocol_clients: self.clients.len(),
        }
    }
}

/// Append `item` to `items` unless it is already there.
fn track<T: ?Sized>(items: &mut Vec<Arc<T>>, item: Arc<T>, kind: &str) -> Result<()> {
    if items.iter().any(|existing| Arc::ptr_eq(existing, &item)) {
        debug!(kind, "Item already tracked by session");
        return Ok(());
    }
    items
        .try_reserve(1)
        .map_err(|_| Error::OutOfMemory(format!("cannot track another {kind}")))?;
    items.push(item);
    Ok(())
}

pub struct Session {
    id: String,
    arena: Arc<SharedArena>,
    working_dir: Option<PathBuf>,
    events: Option<Arc<EventBus>>,
    state: Mutex<SessionState>,
}

impl Session {
    /// Open a session with default settings.
    pub fn open() -> Result<Arc<Self>> {
        Self::open_with(&RuntimeConfig::default())
    }

    /// Open a session sized and rooted per `config`.
    pub fn open_with(config: &RuntimeConfig) -> Result<Arc<Self>> {
        Self::open_inner(config, None)
    }

    /// Like [`Session::open_with`], publishing `SessionClosed` (and agent
    /// events, unless an agent brings its own bus) to `events`.
    pub fn open_observed(config: &RuntimeConfig, events: Arc<EventBus>) -> Result<Arc<Self>> {
        Self::open_inner(config, Some(events))
    }

    fn open_inner(config: &RuntimeConfig, events: Option<Arc<EventBus>>) -> Result<Arc<Self>> {
        let arena =
            SharedArena::with_block_size(config.arena.initial_capacity, config.arena.block_size)
                .ok_or_else(|| Error::OutOfMemory("session arena".into()))?;
        let state = SessionState::new()?;

        let working_dir = config
            .session
            .working_dir
            .clone()
            .or_else(|| std::env::current_dir().ok());

        let session = Arc::new(Self {
            id: uuid::Uuid::new_v4().to_string(),
            arena: Arc::new(arena),
            working_dir,
            events,
            state: Mutex::new(state),
        });

        info!(
            session_id = %session.id,
            arena_capacity = session.arena.stats().total_capacity,
            "Session opened"
        );
        Ok(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Directory tools resolve relative paths against.
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn counts(&self) -> SessionCounts {
        self.state.lock().counts()
    }

    /// Informational arena usage; all zeros once the session is closed.
    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    pub(crate) fn arena(&self) -> &Arc<SharedArena> {
        &self.arena
    }

    pub(crate) fn events(&self) -> Option<&Arc<EventBus>> {
        self.events.as_ref()
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::InvalidState(format!("session {} is closed", self.id)));
        }
        Ok(())
    }

    pub fn add_agent(&self, agent: Arc<Agent>) -> Result<()> {
        let mut state = self.state.lock();
        self.check_open(&state)?;
        self.check_owner(agent.session_id(), "agent")?;
        track(&mut state.agents, agent, "agent")
    }

    pub fn add_registry(&self, registry: Arc<ToolRegistry>) -> Result<()> {
        let mut state = self.state.lock();
        self.check_open(&state)?;
        self.check_owner(registry.session_id(), "registry")?;
        track(&mut state.registries, registry, "registry")
    }

    /// Track a protocol client so it is disconnected when the session closes.
    pub fn add_protocol_client(&self, client: Arc<dyn ProtocolClient>) -> Result<()> {
        let mut state = self.state.lock();
        self.check_open(&state)?;
        debug!(session_id = %self.id, client = client.name(), "Tracking protocol client");
        track(&mut state.clients, client, "protocol client")
    }

    fn check_owner(&self, owner: &str, kind: &str) -> Result<()> {
        if owner != self.id {
            return Err(Error::InvalidArgument(format!(
                "{kind} belongs to session {owner}, not {}",
                self.id
            )));
        }
        Ok(())
    }

    fn check_open(&self, state: &SessionState) -> Result<()> {
        if state.closed {
            return Err(Error::InvalidState(format!("session {} is closed", self.id)));
        }
        Ok(())
    }

    /// Tear down everything this session owns. A second call only warns.
    pub fn close(&self) -> Result<()> {
        let (clients, agents, registries) = {
            let mut state = self.state.lock();
            if state.closed {
                warn!(session_id = %self.id, "Session already closed");
                return Ok(());
            }
            state.closed = true;
            (
                std::mem::take(&mut state.clients),
                std::mem::take(&mut state.agents),
                std::mem::take(&mut state.registries),
            )
        };

        // tools may still hold client handles, so clients go first
        for client in &clients {
            client.disconnect();
        }
        for agent in &agents {
            agent.shutdown();
        }
        for registry in &registries {
            registry.release();
        }

        let counts = SessionCounts {
            agents: agents.len(),
            registries: registries.len(),
            protocol_clients: clients.len(),
        };
        drop((clients, agents, registries));
        self.arena.destroy();

        info!(
            session_id = %self.id,
            agents = counts.agents,
            registries = counts.registries,
            protocol_clients = counts.protocol_clients,
            "Session closed"
        );
        if let Some(events) = &self.events {
            events.publish(DomainEvent::SessionClosed {
                session_id: self.id.clone(),
                agents: counts.agents,
                registries: counts.registries,
                protocol_clients: counts.protocol_clients,
                timestamp: Utc::now(),
            });
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.state.get_mut().closed {
            let _ = self.close();
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .field("counts", &self.counts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loop_runner::AgentOptions;
    use crate::test_helpers::{NullClient, scripted};

    #[test]
    fn open_assigns_unique_ids() {
        let a = Session::open().unwrap();
        let b = Session::open().unwrap();
        assert_ne!(a.id(), b.id());
        assert!(!a.is_closed());
        assert_eq!(a.counts(), SessionCounts::default());
        assert!(a.arena_stats().total_capacity >= ferroact_arena::MIN_CAPACITY);
    }

    #[test]
    fn working_dir_comes_from_config() {
        let mut config = RuntimeConfig::default();
        config.session.working_dir = Some(PathBuf::from("/srv/agents"));
        let session = Session::open_with(&config).unwrap();
        assert_eq!(session.working_dir(), Some(Path::new("/srv/agents")));
    }

    #[test]
    fn close_twice_is_a_no_op() {
        let session = Session::open().unwrap();
        session.close().unwrap();
        assert!(session.is_closed());
        session.close().unwrap();
        assert!(session.is_closed());
    }

    #[test]
    fn close_destroys_arena_and_releases_registries() {
        let session = Session::open().unwrap();
        let registry = ToolRegistry::create(&session).unwrap();
        registry.add(Arc::new(ferroact_tools::EchoTool)).unwrap();
        assert!(session.arena_stats().total_used > 0);

        session.close().unwrap();
        assert_eq!(session.arena_stats().block_count, 0);
        assert!(registry.is_empty());
        assert!(registry.find("echo").is_none());
    }

    #[test]
    fn additions_after_close_are_invalid_state() {
        let session = Session::open().unwrap();
        let registry = ToolRegistry::create(&session).unwrap();
        let agent = Agent::create(&session, AgentOptions::new("a"), scripted(vec![])).unwrap();
        session.close().unwrap();

        let code = |r: Result<()>| r.unwrap_err().code();
        assert_eq!(code(session.add_registry(registry)), ferroact_core::ErrorCode::InvalidState);
        assert_eq!(code(session.add_agent(agent)), ferroact_core::ErrorCode::InvalidState);
        assert_eq!(
            code(session.add_protocol_client(Arc::new(NullClient::default()))),
            ferroact_core::ErrorCode::InvalidState
        );
        assert!(ToolRegistry::create(&session).is_err());
    }

    #[test]
    fn foreign_items_are_rejected() {
        let home = Session::open().unwrap();
        let other = Session::open().unwrap();
        let registry = ToolRegistry::create(&other).unwrap();

        let err = home.add_registry(registry).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(home.counts().registries, 0);
    }

    #[test]
    fn closed_state_wins_over_foreign_ownership() {
        let home = Session::open().unwrap();
        let other = Session::open().unwrap();
        let registry = ToolRegistry::create(&other).unwrap();
        let agent = Agent::create(&other, AgentOptions::new("a"), scripted(vec![])).unwrap();
        home.close().unwrap();

        assert!(matches!(home.add_registry(registry), Err(Error::InvalidState(_))));
        assert!(matches!(home.add_agent(agent), Err(Error::InvalidState(_))));
    }

    #[test]
    fn collections_grow_past_initial_capacity() {
        let session = Session::open().unwrap();
        for _ in 0..(INITIAL_SLOTS * 3) {
            ToolRegistry::create(&session).unwrap();
        }
        assert_eq!(session.counts().registries, INITIAL_SLOTS * 3);
    }

    #[test]
    fn re_adding_the_same_item_is_tracked_once() {
        let session = Session::open().unwrap();
        let registry = ToolRegistry::create(&session).unwrap();
        session.add_registry(registry.clone()).unwrap();
        assert_eq!(session.counts().registries, 1);
    }

    #[test]
    fn close_disconnects_clients() {
        let session = Session::open().unwrap();
        let client = Arc::new(NullClient::connected());
        session.add_protocol_client(client.clone()).unwrap();
        assert!(client.is_connected());

        session.close().unwrap();
        assert!(!client.is_connected());
    }

    #[test]
    fn close_shuts_down_agents() {
        let session = Session::open().unwrap();
        let agent = Agent::create(&session, AgentOptions::new("a"), scripted(vec![])).unwrap();
        assert_eq!(session.counts().agents, 1);

        session.close().unwrap();
        assert!(agent.is_shut_down());
    }

    #[tokio::test]
    async fn close_publishes_event() {
        let bus = Arc::new(EventBus::new(8));
        let mut rx = bus.subscribe();
        let session = Session::open_observed(&RuntimeConfig::default(), bus).unwrap();
        ToolRegistry::create(&session).unwrap();
        session.close().unwrap();

        match rx.recv().await.unwrap().as_ref() {
            DomainEvent::SessionClosed { registries, agents, .. } => {
                assert_eq!(*registries, 1);
                assert_eq!(*agents, 0);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn drop_closes_open_session() {
        let session = Session::open().unwrap();
        let client = Arc::new(NullClient::connected());
        session.add_protocol_client(client.clone()).unwrap();
        drop(session);
        assert!(!client.is_connected());
    }
}
