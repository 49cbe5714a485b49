//! Whiteboard cache: board table, live-board discipline, realtime dispatch.
//!
//! DESIGN
//! ======
//! The cache owns every [`Whiteboard`] it has seen, keyed by board id, plus
//! the id of the one board currently receiving realtime traffic. All of it
//! sits behind a single `RwLock`: the table is small, only one board is
//! live, and a single lock makes every transition (most importantly the
//! fresh/stale hand-over in [`WhiteboardCache::init_and_start_realtime_for_board`])
//! atomic to readers on other threads.
//!
//! Inbound events reach the cache through a [`RealtimeChannel`] it was built
//! with. [`WhiteboardCache::start`] registers the cache's shared state as a
//! subscriber and keeps the [`Subscription`] handle; [`WhiteboardCache::stop`]
//! drops it. Direct API calls work regardless of the subscription state.
//!
//! ERROR HANDLING
//! ==============
//! Nothing arriving over the channel can fail the caller. Undecodable
//! payloads are logged and dropped, unknown actions decode to
//! [`RealtimeCommand::Ignored`], and commits or clears with no live board
//! are no-ops. Committed strokes are never touched by a rejected event.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, trace, warn};

use crate::channel::{RealtimeChannel, RealtimeEvent, RealtimeSubscriber, Subscription};
use crate::config::CacheConfig;
use crate::decoder::{self, RealtimeCommand};
use crate::stroke::Stroke;
use crate::whiteboard::{BoardId, Whiteboard};

// =============================================================================
// BOARD TABLE
// =============================================================================

/// Boards keyed by id plus the live board's id.
#[derive(Debug, Default)]
struct BoardTable {
    boards: HashMap<BoardId, Whiteboard>,
    current: Option<BoardId>,
}

impl BoardTable {
    /// Replace (or create) `board_id`, make it the only fresh board.
    fn init(&mut self, board_id: BoardId, strokes: Vec<Stroke>) {
        for board in self.boards.values_mut() {
            board.set_stale(true);
        }
        self.boards
            .insert(board_id.clone(), Whiteboard::new(board_id.clone(), strokes));
        self.current = Some(board_id);
    }

    fn current_mut(&mut self) -> Option<&mut Whiteboard> {
        let id = self.current.as_ref()?;
        self.boards.get_mut(id)
    }

    fn evict_all(&mut self) -> usize {
        let evicted = self.boards.len();
        self.boards.clear();
        self.current = None;
        evicted
    }
}

// =============================================================================
// SHARED STATE
// =============================================================================

/// State shared between the cache handle and its channel subscription.
struct CacheState {
    table: RwLock<BoardTable>,
    config: CacheConfig,
}

impl CacheState {
    fn read(&self) -> RwLockReadGuard<'_, BoardTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BoardTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn add_stroke_to_current(&self, stroke: Stroke) -> bool {
        let mut table = self.write();
        let Some(board) = table.current_mut() else {
            debug!("no live board; stroke dropped");
            return false;
        };
        board.append(stroke);
        true
    }

    fn clear_current(&self) -> bool {
        let mut table = self.write();
        let Some(board) = table.current_mut() else {
            debug!("no live board; clear ignored");
            return false;
        };
        board.clear();
        true
    }

    fn apply(&self, command: RealtimeCommand) {
        match command {
            RealtimeCommand::Commit(stroke) => {
                trace!(points = stroke.point_count(), blend_mode = ?stroke.blend_mode(), "apply commit");
                self.add_stroke_to_current(stroke);
            }
            RealtimeCommand::ClearEnd => {
                trace!("apply clear");
                self.clear_current();
            }
            RealtimeCommand::Ignored => {}
        }
    }

    fn handle_event(&self, event: &RealtimeEvent) {
        match decoder::decode_payload(event.payload()) {
            Ok(command) => self.apply(command),
            Err(e) if self.config.log_dropped_payloads => {
                warn!(error = %e, "whiteboard cache: dropping realtime payload");
            }
            Err(e) => {
                debug!(error = %e, "whiteboard cache: dropping realtime payload");
            }
        }
    }
}

impl RealtimeSubscriber for CacheState {
    fn on_realtime_event(&self, event: &RealtimeEvent) {
        self.handle_event(event);
    }
}

// =============================================================================
// WHITEBOARD CACHE
// =============================================================================

/// In-memory whiteboard store kept in sync with realtime edit events.
///
/// Safe to share across threads (`Arc<WhiteboardCache>`): every method takes
/// `&self` and completes without blocking on anything but the table lock.
pub struct WhiteboardCache {
    state: Arc<CacheState>,
    channel: RealtimeChannel,
    subscription: Mutex<Option<Subscription>>,
}

impl WhiteboardCache {
    /// Create an unstarted cache bound to `channel`.
    #[must_use]
    pub fn new(channel: RealtimeChannel) -> Self {
        Self::with_config(channel, CacheConfig::default())
    }

    #[must_use]
    pub fn with_config(channel: RealtimeChannel, config: CacheConfig) -> Self {
        Self {
            state: Arc::new(CacheState { table: RwLock::new(BoardTable::default()), config }),
            channel,
            subscription: Mutex::new(None),
        }
    }

    /// Subscribe to the realtime channel. Calling it again while started
    /// does nothing.
    pub fn start(&self) {
        let mut subscription = self.subscription.lock().unwrap_or_else(PoisonError::into_inner);
        if subscription.is_some() {
            debug!("whiteboard cache already started");
            return;
        }
        let subscriber: Arc<dyn RealtimeSubscriber> = self.state.clone();
        let handle = self.channel.subscribe(subscriber);
        info!(subscription = %handle.id(), "whiteboard cache started");
        *subscription = Some(handle);
    }

    /// Unsubscribe from the realtime channel. Events published after this
    /// returns are not applied.
    pub fn stop(&self) {
        let handle = self.subscription.lock().unwrap_or_else(PoisonError::into_inner).take();
        match handle {
            Some(handle) => {
                info!(subscription = %handle.id(), "whiteboard cache stopped");
                handle.unsubscribe();
            }
            None => debug!("whiteboard cache already stopped"),
        }
    }

    /// Whether the cache currently reacts to channel events.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.subscription.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Make `board_id` the live board, seeded with `initial_strokes`.
    ///
    /// An existing entry for the id is replaced outright. Every other board
    /// becomes stale in the same critical section.
    pub fn init_and_start_realtime_for_board(
        &self,
        board_id: impl Into<BoardId>,
        initial_strokes: Vec<Stroke>,
    ) {
        let board_id = board_id.into();
        debug!(%board_id, strokes = initial_strokes.len(), "init realtime board");
        self.state.write().init(board_id, initial_strokes);
    }

    /// Snapshot of `board_id`, or `None` if it is not cached.
    #[must_use]
    pub fn get_whiteboard(&self, board_id: &str) -> Option<Whiteboard> {
        self.state.read().boards.get(board_id).cloned()
    }

    /// Run `f` against `board_id` under the read lock without cloning it.
    ///
    /// `f` must not call back into the cache: any mutating method would wait
    /// on the read lock `f` is running under and deadlock.
    pub fn with_whiteboard<R>(&self, board_id: &str, f: impl FnOnce(&Whiteboard) -> R) -> Option<R> {
        self.state.read().boards.get(board_id).map(f)
    }

    /// Append `stroke` to the live board. Returns `false` (and drops the
    /// stroke) when no board is live.
    pub fn add_stroke_to_current_realtime_board(&self, stroke: Stroke) -> bool {
        self.state.add_stroke_to_current(stroke)
    }

    /// Remove every stroke from the live board. Other boards and staleness
    /// are untouched. Returns `false` when no board is live.
    pub fn clear_current_realtime_board(&self) -> bool {
        self.state.clear_current()
    }

    /// Drop every cached board and forget the live board.
    pub fn evict_all(&self) {
        let evicted = self.state.write().evict_all();
        info!(evicted, "whiteboard cache evicted");
    }

    /// Apply an already-decoded command to the live board.
    pub fn apply(&self, command: RealtimeCommand) {
        self.state.apply(command);
    }

    /// Decode and apply one realtime event.
    ///
    /// This is what the channel subscription invokes; calling it directly
    /// bypasses the started/stopped state.
    pub fn on_realtime_event(&self, event: &RealtimeEvent) {
        self.state.handle_event(event);
    }

    /// Id of the live board, if any.
    #[must_use]
    pub fn current_board_id(&self) -> Option<BoardId> {
        self.state.read().current.clone()
    }

    /// Number of cached boards.
    #[must_use]
    pub fn board_count(&self) -> usize {
        self.state.read().boards.len()
    }
}

impl std::fmt::Debug for WhiteboardCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhiteboardCache")
            .field("boards", &self.board_count())
            .field("current", &self.current_board_id())
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}
