//! # Game Sessions
//!
//! A `GameSession` runs one game on the tokio runtime. The controller sits
//! behind an `Arc<Mutex<_>>` shared with two kinds of background task:
//!
//! - **Bot turns**: after a human move, if the bot is to act, the
//!   [`BotScheduler`] spawns a task that sleeps for the bot delay and then
//!   plays the bot's action. It keeps playing while the bot stays on turn
//!   (an Uno Skip, for example). Cancelling aborts the task.
//! - **Pong clock**: a Pong session drives the simulation from a
//!   `tokio::time::interval` at [`TICK_MS`], skipping ticks while paused.
//!
//! Every transition takes the lock, runs to completion and releases it, so a
//! snapshot never observes a half-applied action. Snapshots are saved after
//! each player decision and at game over; an outcome report is handed to the
//! stats recorder exactly once per game. Session events are published on an
//! unbounded channel for whatever front-end is listening.

use crate::game_controller::{GameController, MoveResult};
use crate::game_wrapper::{GameKind, GameWrapper, MoveWrapper};
use crate::games::pong::TICK_MS;
use crate::persistence::SnapshotStore;
use crate::stats::{OutcomeReport, StatsRecorder};
use crate::{GameError, PLAYER_TWO};
use log::{debug, error, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Paddle adjustments the autopilot may make between two Pong frames.
const MAX_AUTOPILOT_STEPS: usize = 8;

/// Timing and seating of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Pause before each bot action.
    pub bot_delay: Duration,
    /// Pong simulation period.
    pub tick_interval: Duration,
    /// Let the bots play both seats.
    pub autoplay: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bot_delay: Duration::from_millis(crate::config::DEFAULT_BOT_DELAY_MS),
            tick_interval: Duration::from_millis(TICK_MS),
            autoplay: false,
        }
    }
}

/// Notifications published by a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A player decision was applied. Pong clock ticks are not reported.
    Moved {
        player: i32,
        move_made: MoveWrapper,
        by_bot: bool,
    },
    /// The game reached a terminal state.
    Finished(OutcomeReport),
    /// An engine consistency check failed; the game is over without a result.
    Abandoned(String),
}

/// State shared between the session handle and its background tasks.
struct Shared {
    controller: Arc<Mutex<GameController>>,
    recorder: Arc<dyn StatsRecorder>,
    store: Option<Arc<dyn SnapshotStore>>,
    events: UnboundedSender<SessionEvent>,
    reported: AtomicBool,
    /// Bumped under the controller lock whenever the game is replaced, so a
    /// task started for an earlier game never acts on the new one.
    generation: AtomicU64,
    autoplay: bool,
}

impl Shared {
    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// True when the next action belongs to a bot.
    fn bot_on_turn(&self) -> bool {
        let controller = self.controller.lock();
        if controller.is_game_over() || controller.kind() == GameKind::Pong {
            return false;
        }
        self.autoplay || controller.get_current_player() == PLAYER_TWO
    }

    /// Handles the aftermath of one transition outside the lock.
    fn settle(&self, result: &MoveResult, by_bot: bool, snapshot: Option<GameWrapper>) {
        match result {
            MoveResult::Success {
                move_made,
                player,
                game_over,
                ..
            } => {
                if !move_made.is_tick() {
                    self.publish(SessionEvent::Moved {
                        player: *player,
                        move_made: move_made.clone(),
                        by_bot,
                    });
                }
                if let Some(state) = snapshot {
                    self.save(&state);
                }
                if *game_over {
                    self.finish();
                }
            }
            MoveResult::Invalid {
                reason: GameError::InvariantViolation(msg),
            } => {
                error!("session abandoned: {}", msg);
                self.publish(SessionEvent::Abandoned(msg.clone()));
            }
            MoveResult::Invalid { .. } | MoveResult::GameOver => {}
        }
    }

    /// Applies an action under the lock and settles it. Actions issued for an
    /// earlier game than `generation` are dropped.
    fn apply(&self, generation: u64, mv: MoveWrapper, by_bot: bool) -> MoveResult {
        let (result, snapshot) = {
            let mut controller = self.controller.lock();
            if self.generation() != generation {
                return MoveResult::Invalid {
                    reason: GameError::InvalidAction("the game was restarted".to_string()),
                };
            }
            let result = controller.try_make_move(mv);
            let snapshot = match &result {
                MoveResult::Success { move_made, game_over, .. } if !move_made.is_tick() || *game_over => {
                    Some(controller.snapshot())
                }
                _ => None,
            };
            (result, snapshot)
        };
        self.settle(&result, by_bot, snapshot);
        result
    }

    /// Plays one bot action for game `generation`. Returns true if a bot is on
    /// turn again afterwards.
    fn play_bot_turn(&self, generation: u64) -> bool {
        let (result, snapshot) = {
            let mut controller = self.controller.lock();
            if self.generation() != generation {
                debug!("dropping a bot turn scheduled for a replaced game");
                return false;
            }
            let result = controller.play_bot_move();
            let snapshot = matches!(result, MoveResult::Success { .. }).then(|| controller.snapshot());
            (result, snapshot)
        };
        if let MoveResult::Invalid { reason } = &result {
            warn!("bot action rejected: {}", reason);
        }
        self.settle(&result, true, snapshot);
        matches!(result, MoveResult::Success { game_over: false, .. }) && self.bot_on_turn()
    }

    /// One Pong frame. Returns false once the game is over or replaced.
    fn pong_frame(&self, generation: u64) -> bool {
        use crate::games::pong::PongMove;

        if self.autoplay {
            // The autopilot settles its paddle before the clock moves.
            for _ in 0..MAX_AUTOPILOT_STEPS {
                let next = {
                    let mut controller = self.controller.lock();
                    if controller.is_game_over() || self.generation() != generation {
                        return false;
                    }
                    controller.suggest_bot_move()
                };
                match next {
                    Some(MoveWrapper::Pong(PongMove::Tick)) | None => break,
                    Some(mv) => {
                        self.apply(generation, mv, true);
                    }
                }
            }
        }

        let paused = {
            let controller = self.controller.lock();
            if controller.is_game_over() || self.generation() != generation {
                return false;
            }
            !controller.get_legal_moves().contains(&MoveWrapper::Pong(PongMove::Tick))
        };
        if paused {
            return true;
        }
        match self.apply(generation, MoveWrapper::Pong(PongMove::Tick), false) {
            MoveResult::Success { game_over, .. } => !game_over,
            MoveResult::Invalid { .. } | MoveResult::GameOver => false,
        }
    }

    fn save(&self, state: &GameWrapper) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(state) {
                warn!("failed to save {} snapshot: {}", state.kind(), e);
            }
        }
    }

    fn finish(&self) {
        if self.reported.swap(true, Ordering::SeqCst) {
            return;
        }
        let report = self.controller.lock().outcome_report();
        if let Some(report) = report {
            self.recorder.record(&report);
            self.publish(SessionEvent::Finished(report));
        }
    }

    fn publish(&self, event: SessionEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}

/// Schedules delayed bot turns on the tokio runtime.
#[derive(Debug, Default)]
pub struct BotScheduler {
    pending: Option<JoinHandle<()>>,
}

impl BotScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a bot turn after `delay`, replacing any pending one.
    fn schedule(&mut self, shared: Arc<Shared>, delay: Duration) {
        self.cancel();
        debug!("bot turn scheduled in {:?}", delay);
        let generation = shared.generation();
        self.pending = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(delay).await;
                if !shared.play_bot_turn(generation) {
                    break;
                }
            }
        }));
    }

    /// Aborts the pending bot turn, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

/// One running game.
///
/// Must be created inside a tokio runtime. Dropping the session cancels its
/// background tasks.
pub struct GameSession {
    shared: Arc<Shared>,
    config: SessionConfig,
    scheduler: BotScheduler,
    ticker: Option<JoinHandle<()>>,
}

impl GameSession {
    /// Starts a session and returns it with the receiving end of its event channel.
    pub fn start(
        controller: GameController,
        config: SessionConfig,
        recorder: Arc<dyn StatsRecorder>,
        store: Option<Arc<dyn SnapshotStore>>,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let is_pong = controller.kind() == GameKind::Pong;
        let shared = Arc::new(Shared {
            controller: Arc::new(Mutex::new(controller)),
            recorder,
            store,
            events,
            reported: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            autoplay: config.autoplay,
        });

        let mut session = Self {
            shared,
            config,
            scheduler: BotScheduler::new(),
            ticker: None,
        };
        if is_pong {
            session.start_ticker();
        }
        if session.shared.controller.lock().is_game_over() {
            session.shared.finish();
        }
        session.schedule_bot_if_needed();
        (session, rx)
    }

    fn start_ticker(&mut self) {
        let shared = Arc::clone(&self.shared);
        let period = self.config.tick_interval;
        let generation = shared.generation();
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if !shared.pong_frame(generation) {
                    break;
                }
            }
            debug!("pong clock stopped");
        }));
    }

    fn schedule_bot_if_needed(&mut self) {
        if self.shared.bot_on_turn() {
            self.scheduler.schedule(Arc::clone(&self.shared), self.config.bot_delay);
        }
    }

    /// Applies a human action. On success the bot's answer is scheduled.
    pub fn submit(&mut self, mv: MoveWrapper) -> MoveResult {
        if self.scheduler.is_pending() {
            return MoveResult::Invalid {
                reason: GameError::InvalidAction("wait for the bot to move".to_string()),
            };
        }
        let result = self.shared.apply(self.shared.generation(), mv, false);
        if matches!(result, MoveResult::Success { game_over: false, .. }) {
            self.schedule_bot_if_needed();
        }
        result
    }

    /// Parses an action in the game's notation and submits it.
    pub fn submit_str(&mut self, input: &str) -> MoveResult {
        let parsed = self.shared.controller.lock().get_render_state().parse_move(input);
        match parsed {
            Ok(mv) => self.submit(mv),
            Err(reason) => MoveResult::Invalid { reason },
        }
    }

    /// A consistent copy of the current state.
    pub fn snapshot(&self) -> GameWrapper {
        self.shared.controller.lock().snapshot()
    }

    /// Runs `f` with the controller locked.
    pub fn with_controller<T>(&self, f: impl FnOnce(&GameController) -> T) -> T {
        f(&self.shared.controller.lock())
    }

    pub fn is_bot_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn is_game_over(&self) -> bool {
        self.shared.controller.lock().is_game_over()
    }

    /// Cancels a scheduled bot turn without playing it.
    pub fn cancel_bot(&mut self) {
        self.scheduler.cancel();
    }

    /// Replaces the game with a new one, cancelling pending work. A bot turn
    /// already running on another thread finds the game replaced and stops.
    pub fn restart(&mut self, state: GameWrapper) {
        self.cancel_tasks();
        let is_pong = state.kind() == GameKind::Pong;
        if let Some(store) = &self.shared.store {
            if let Err(e) = store.clear(state.kind()) {
                warn!("failed to clear {} snapshot: {}", state.kind(), e);
            }
        }
        {
            let mut controller = self.shared.controller.lock();
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
            controller.reset(state);
        }
        self.shared.reported.store(false, Ordering::SeqCst);
        if is_pong {
            self.start_ticker();
        }
        self.schedule_bot_if_needed();
    }

    /// Stops all background work. The game state is kept.
    pub fn stop(&mut self) {
        self.cancel_tasks();
    }

    fn cancel_tasks(&mut self) {
        self.scheduler.cancel();
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.cancel_tasks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_wrapper::GameSetup;
    use crate::games::connect4::Connect4Move;
    use crate::games::pong::PongMove;
    use crate::persistence::MemorySnapshotStore;
    use crate::stats::MemoryStatsRecorder;
    use crate::{GameState, PLAYER_ONE};

    fn session(kind: GameKind, config: SessionConfig) -> (GameSession, Arc<MemoryStatsRecorder>, Arc<MemorySnapshotStore>) {
        let recorder = Arc::new(MemoryStatsRecorder::new());
        let store = Arc::new(MemorySnapshotStore::new());
        let controller = GameController::new(GameWrapper::new(kind, &GameSetup { seed: 3, ..GameSetup::default() }), 3);
        let (session, _rx) = GameSession::start(controller, config, recorder.clone(), Some(store.clone()));
        (session, recorder, store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_bot_answers_after_delay() {
        let config = SessionConfig::default();
        let (mut session, _, store) = session(GameKind::Connect4, config);

        let result = session.submit(MoveWrapper::Connect4(Connect4Move(3)));
        assert!(matches!(result, MoveResult::Success { .. }));
        assert!(session.is_bot_pending());
        assert!(store.raw(GameKind::Connect4).is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(session.snapshot().get_current_player(), PLAYER_TWO);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(session.snapshot().get_current_player(), PLAYER_ONE);
        assert!(!session.is_bot_pending());
        assert_eq!(session.with_controller(|c| c.move_count()), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_human_cannot_move_during_bot_turn() {
        let (mut session, _, _) = session(GameKind::Connect4, SessionConfig::default());
        session.submit(MoveWrapper::Connect4(Connect4Move(3)));
        let early = session.submit(MoveWrapper::Connect4(Connect4Move(4)));
        assert!(matches!(
            early,
            MoveResult::Invalid {
                reason: GameError::InvalidAction(_)
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_bot_turn_never_plays() {
        let (mut session, _, _) = session(GameKind::Connect4, SessionConfig::default());
        session.submit(MoveWrapper::Connect4(Connect4Move(3)));
        session.cancel_bot();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(session.with_controller(|c| c.move_count()), 1);
        assert_eq!(session.snapshot().get_current_player(), PLAYER_TWO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_reports_outcome_once() {
        let config = SessionConfig {
            bot_delay: Duration::from_millis(10),
            autoplay: true,
            ..SessionConfig::default()
        };
        let (session, recorder, store) = session(GameKind::Connect4, config);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(session.is_game_over());
        assert_eq!(recorder.len(), 1);
        let report = &recorder.reports()[0];
        assert_eq!(report.game_type, GameKind::Connect4);
        let saved = store.load(GameKind::Connect4).unwrap().unwrap();
        assert!(saved.is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pong_clock_runs_and_pauses() {
        let (mut session, _, _) = session(GameKind::Pong, SessionConfig::default());
        let ticks = |s: &GameSession| match s.snapshot() {
            GameWrapper::Pong(p) => p.ticks(),
            _ => unreachable!(),
        };

        tokio::time::sleep(Duration::from_millis(16 * 10 + 5)).await;
        let running = ticks(&session);
        assert!((10..=12).contains(&running), "ticks = {}", running);

        session.submit(MoveWrapper::Pong(PongMove::Pause));
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ticks(&session), running);

        session.submit(MoveWrapper::Pong(PongMove::Resume));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(ticks(&session) > running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_the_clock() {
        let (mut session, _, _) = session(GameKind::Pong, SessionConfig::default());
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.stop();
        let before = session.snapshot();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(session.snapshot(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bot_turn_from_before_restart_is_dropped() {
        let (mut session, _, _) = session(GameKind::Connect4, SessionConfig::default());
        session.submit(MoveWrapper::Connect4(Connect4Move(3)));
        let earlier = session.shared.generation();
        session.restart(GameWrapper::new(GameKind::Connect4, &GameSetup::default()));

        // A bot turn that was already running when the game was replaced.
        assert!(!session.shared.play_bot_turn(earlier));
        assert_eq!(session.with_controller(|c| c.move_count()), 0);
        assert_eq!(session.snapshot().get_current_player(), PLAYER_ONE);

        let result = session.submit(MoveWrapper::Connect4(Connect4Move(2)));
        assert!(matches!(result, MoveResult::Success { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invariant_violation_abandons_session() {
        use crate::games::chess::{Board, ChessState, Color};

        // No black king: the first move leaves a board that fails its checks.
        let board = Board::from_placement("8/8/8/8/8/8/8/4K2R").unwrap();
        let controller = GameController::new(GameWrapper::Chess(ChessState::from_board(board, Color::White)), 1);
        let recorder = Arc::new(MemoryStatsRecorder::new());
        let (mut session, mut events) = GameSession::start(controller, SessionConfig::default(), recorder.clone(), None);

        let result = session.submit_str("h1h5");
        assert!(matches!(
            result,
            MoveResult::Invalid {
                reason: GameError::InvariantViolation(_)
            }
        ));
        assert!(matches!(events.try_recv(), Ok(SessionEvent::Abandoned(_))));
        assert!(session.is_game_over());
        assert!(!session.is_bot_pending());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(recorder.is_empty());
        assert!(events.try_recv().is_err());
        assert_eq!(session.submit_str("e1e2"), MoveResult::GameOver);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_clears_snapshot() {
        let (mut session, _, store) = session(GameKind::Connect4, SessionConfig::default());
        session.submit(MoveWrapper::Connect4(Connect4Move(0)));
        assert!(store.raw(GameKind::Connect4).is_some());
        session.restart(GameWrapper::new(GameKind::Connect4, &GameSetup::default()));
        assert!(store.raw(GameKind::Connect4).is_none());
        assert!(!session.is_bot_pending());
        assert_eq!(session.with_controller(|c| c.move_count()), 0);
    }
}
