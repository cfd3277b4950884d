use axum::extract::FromRef;

use crate::groups::GroupStore;
use crate::music_api::MusicApi;
use crate::profile::ProfileStore;
use crate::snapshot::SnapshotCache;
use crate::social::SocialStore;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use super::session::SessionManager;
use super::{ApiError, ServerConfig};

pub type GuardedProfiles = Arc<Mutex<ProfileStore>>;
pub type GuardedSimilarity = Arc<Mutex<SnapshotCache>>;
pub type GuardedSocial = Arc<Mutex<SocialStore>>;
pub type GuardedGroups = Arc<Mutex<GroupStore>>;
pub type GuardedSessions = Arc<Mutex<SessionManager>>;
pub type SharedMusicApi = Arc<dyn MusicApi>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub profiles: GuardedProfiles,
    pub similarity: GuardedSimilarity,
    pub social: GuardedSocial,
    pub groups: GuardedGroups,
    pub sessions: GuardedSessions,
    pub music_api: SharedMusicApi,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        profiles: ProfileStore,
        similarity: SnapshotCache,
        music_api: SharedMusicApi,
    ) -> ServerState {
        let sessions = SessionManager::with_idle_timeout(config.session_idle_timeout);
        ServerState {
            config,
            start_time: Instant::now(),
            profiles: Arc::new(Mutex::new(profiles)),
            similarity: Arc::new(Mutex::new(similarity)),
            social: Arc::new(Mutex::new(SocialStore::new())),
            groups: Arc::new(Mutex::new(GroupStore::new())),
            sessions: Arc::new(Mutex::new(sessions)),
            music_api,
        }
    }
}

/// Lock a piece of shared state, turning a poisoned lock into a 500.
pub fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ApiError> {
    mutex
        .lock()
        .map_err(|_| ApiError::Internal("Server state lock poisoned".to_owned()))
}

impl FromRef<ServerState> for GuardedProfiles {
    fn from_ref(input: &ServerState) -> Self {
        input.profiles.clone()
    }
}

impl FromRef<ServerState> for GuardedSimilarity {
    fn from_ref(input: &ServerState) -> Self {
        input.similarity.clone()
    }
}

impl FromRef<ServerState> for GuardedSocial {
    fn from_ref(input: &ServerState) -> Self {
        input.social.clone()
    }
}

impl FromRef<ServerState> for GuardedGroups {
    fn from_ref(input: &ServerState) -> Self {
        input.groups.clone()
    }
}

impl FromRef<ServerState> for GuardedSessions {
    fn from_ref(input: &ServerState) -> Self {
        input.sessions.clone()
    }
}

impl FromRef<ServerState> for SharedMusicApi {
    fn from_ref(input: &ServerState) -> Self {
        input.music_api.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
