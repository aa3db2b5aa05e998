//! # Pong Game Implementation
//!
//! A portrait-orientation Pong field: the player's paddle runs along the
//! bottom edge and the bot's paddle along the top. The simulation advances in
//! fixed ticks (one `PongMove::Tick` per ~16 ms frame); the player moves their
//! paddle between ticks and the bot steers its paddle inside each tick.
//!
//! ## Rules
//! - The ball bounces off the left and right walls
//! - A paddle hit sends the ball back and sets its sideways speed from where
//!   it struck the paddle; the bot's returns are slightly noisy
//! - The ball leaving through the top scores for the player, through the
//!   bottom for the bot; the ball is then served toward the side that conceded
//! - First to `win_score` points wins, there are no draws

use crate::{GameError, GameState, PLAYER_ONE, PLAYER_TWO};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const FIELD_WIDTH: f64 = 360.0;
pub const FIELD_HEIGHT: f64 = 640.0;
pub const PADDLE_WIDTH: f64 = 80.0;
pub const PADDLE_HEIGHT: f64 = 12.0;
/// Gap between a paddle and its edge of the field.
pub const PADDLE_MARGIN: f64 = 24.0;
/// Pixels a paddle travels per step at full speed.
pub const PADDLE_SPEED: f64 = 8.0;
pub const BALL_RADIUS: f64 = 8.0;
pub const BALL_SPEED_MIN: f64 = 3.0;
pub const BALL_SPEED_MAX: f64 = 12.0;
pub const DEFAULT_BALL_SPEED: f64 = 5.0;
pub const WIN_SCORE: u32 = 5;
/// Length of one simulation tick in milliseconds (~60 Hz).
pub const TICK_MS: u64 = 16;

/// Scales the normalized hit offset into a sideways velocity multiplier.
const HIT_ANGLE_FACTOR: f64 = 1.5;
/// Upper bound of the sideways velocity multiplier after a paddle hit.
const MAX_ANGLE_MULTIPLIER: f64 = 1.2;
/// Sideways noise added to the bot's returns.
const BOT_PERTURBATION: f64 = 0.6;
/// Distance from the ball inside which the tracking paddle stays still.
pub const TRACKING_TOLERANCE: f64 = 10.0;
/// Chance that the tracking paddle does not move on a tick.
pub const HOLD_CHANCE: f64 = 0.15;
/// Chance that the tracking paddle moves at half speed on a tick.
pub const SLOW_CHANCE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner.
    pub position: Vec2,
    pub width: f64,
    pub height: f64,
    pub speed: f64,
}

impl Paddle {
    fn at_row(y: f64) -> Self {
        Self {
            position: Vec2::new((FIELD_WIDTH - PADDLE_WIDTH) / 2.0, y),
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            speed: PADDLE_SPEED,
        }
    }

    pub fn center_x(&self) -> f64 {
        self.position.x + self.width / 2.0
    }

    /// Moves the paddle to `x`, clamped to the field.
    pub fn move_to(&mut self, x: f64) {
        self.position.x = x.clamp(0.0, FIELD_WIDTH - self.width);
    }

    pub fn shift(&mut self, dx: f64) {
        self.move_to(self.position.x + dx);
    }

    /// Imperfect reactive tracking of `target_x`: returns the sideways shift
    /// for this tick. The paddle ignores targets within the tolerance band,
    /// sometimes skips a tick and sometimes moves at half speed.
    pub fn track<R: Rng + ?Sized>(&self, target_x: f64, rng: &mut R) -> f64 {
        let diff = target_x - self.center_x();
        if diff.abs() <= TRACKING_TOLERANCE {
            return 0.0;
        }
        if rng.random_bool(HOLD_CHANCE) {
            return 0.0;
        }
        let speed = if rng.random_bool(SLOW_CHANCE) { self.speed / 2.0 } else { self.speed };
        diff.signum() * speed.min(diff.abs())
    }

    fn spans(&self, x: f64, radius: f64) -> bool {
        x >= self.position.x - radius && x <= self.position.x + self.width + radius
    }

    /// Hit offset of `x` from the paddle centre, normalized to [-1, 1].
    fn hit_offset(&self, x: f64) -> f64 {
        ((x - self.center_x()) / (self.width / 2.0)).clamp(-1.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Bot,
}

impl Side {
    pub fn player_id(self) -> i32 {
        match self {
            Side::Player => PLAYER_ONE,
            Side::Bot => PLAYER_TWO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PongPhase {
    Playing,
    Paused,
    GameOver,
}

/// Paddle returns per side over the whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HitCounters {
    pub player: u32,
    pub bot: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RallyCounters {
    /// Returns since the last point.
    pub current: u32,
    pub longest: u32,
    /// Points played so far.
    pub completed: u32,
}

/// Tunables for a new Pong game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongConfig {
    pub ball_speed: f64,
    pub win_score: u32,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            ball_speed: DEFAULT_BALL_SPEED,
            win_score: WIN_SCORE,
        }
    }
}

/// A player action. `Tick` advances the simulation by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PongMove {
    Tick,
    Left,
    Right,
    MoveTo(f64),
    Pause,
    Resume,
    SetBallSpeed(f64),
}

impl fmt::Display for PongMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PongMove::Tick => write!(f, "tick"),
            PongMove::Left => write!(f, "left"),
            PongMove::Right => write!(f, "right"),
            PongMove::MoveTo(x) => write!(f, "move {}", x),
            PongMove::Pause => write!(f, "pause"),
            PongMove::Resume => write!(f, "resume"),
            PongMove::SetBallSpeed(s) => write!(f, "speed {}", s),
        }
    }
}

impl FromStr for PongMove {
    type Err = String;

    /// Parses `tick`, `left`, `right`, `move <x>`, `pause`, `resume` or `speed <s>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let number = |arg: Option<&&str>| -> Result<f64, String> {
            arg.ok_or_else(|| "Missing number".to_string())?
                .parse::<f64>()
                .map_err(|e| e.to_string())
        };
        match parts.first().map(|p| p.to_ascii_lowercase()).as_deref() {
            Some("tick") | Some("t") => Ok(PongMove::Tick),
            Some("left") | Some("l") => Ok(PongMove::Left),
            Some("right") | Some("r") => Ok(PongMove::Right),
            Some("move") => Ok(PongMove::MoveTo(number(parts.get(1))?)),
            Some("pause") => Ok(PongMove::Pause),
            Some("resume") => Ok(PongMove::Resume),
            Some("speed") => Ok(PongMove::SetBallSpeed(number(parts.get(1))?)),
            _ => Err("Expected tick, left, right, move <x>, pause, resume or speed <s>".to_string()),
        }
    }
}

/// Represents the complete state of a Pong game, including the generator
/// that drives the bot and the serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PongState {
    player_paddle: Paddle,
    bot_paddle: Paddle,
    ball: Ball,
    player_score: u32,
    bot_score: u32,
    phase: PongPhase,
    winner: Option<Side>,
    ball_speed: f64,
    win_score: u32,
    hits: HitCounters,
    rally: RallyCounters,
    ticks: u64,
    rng: Xoshiro256PlusPlus,
}

impl PongState {
    pub fn new(seed: u64) -> Self {
        Self::with_config(PongConfig::default(), seed)
    }

    /// Creates a game with the given tunables. The ball speed is clamped to
    /// the supported range and the first serve goes toward the player.
    pub fn with_config(config: PongConfig, seed: u64) -> Self {
        let mut state = Self {
            player_paddle: Paddle::at_row(FIELD_HEIGHT - PADDLE_MARGIN - PADDLE_HEIGHT),
            bot_paddle: Paddle::at_row(PADDLE_MARGIN),
            ball: Ball {
                position: Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0),
                velocity: Vec2::default(),
                radius: BALL_RADIUS,
            },
            player_score: 0,
            bot_score: 0,
            phase: PongPhase::Playing,
            winner: None,
            ball_speed: config.ball_speed.clamp(BALL_SPEED_MIN, BALL_SPEED_MAX),
            win_score: config.win_score.max(1),
            hits: HitCounters::default(),
            rally: RallyCounters::default(),
            ticks: 0,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        };
        state.serve(Side::Player);
        state
    }

    pub fn player_paddle(&self) -> &Paddle {
        &self.player_paddle
    }

    pub fn bot_paddle(&self) -> &Paddle {
        &self.bot_paddle
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn player_score(&self) -> u32 {
        self.player_score
    }

    pub fn bot_score(&self) -> u32 {
        self.bot_score
    }

    pub fn phase(&self) -> PongPhase {
        self.phase
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn ball_speed(&self) -> f64 {
        self.ball_speed
    }

    pub fn win_score(&self) -> u32 {
        self.win_score
    }

    pub fn hits(&self) -> HitCounters {
        self.hits
    }

    pub fn rally(&self) -> RallyCounters {
        self.rally
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Changes the ball speed, rescaling the current velocity so its direction is kept.
    fn set_ball_speed(&mut self, speed: f64) {
        let factor = speed / self.ball_speed;
        self.ball.velocity.x *= factor;
        self.ball.velocity.y *= factor;
        self.ball_speed = speed;
    }

    /// Puts the ball back in the centre heading toward `toward`.
    fn serve(&mut self, toward: Side) {
        let speed = self.ball_speed;
        let vx = speed * self.rng.random_range(-0.5..0.5);
        let vy = (speed * speed - vx * vx).sqrt();
        self.ball.position = Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0);
        self.ball.velocity = match toward {
            Side::Player => Vec2::new(vx, vy),
            Side::Bot => Vec2::new(vx, -vy),
        };
    }

    fn return_velocity(&self, paddle: &Paddle) -> f64 {
        let multiplier = (paddle.hit_offset(self.ball.position.x) * HIT_ANGLE_FACTOR)
            .clamp(-MAX_ANGLE_MULTIPLIER, MAX_ANGLE_MULTIPLIER);
        self.ball_speed * multiplier
    }

    /// One simulation frame: bot steering, ball motion, collisions and scoring.
    fn tick(&mut self) {
        self.ticks += 1;

        let shift = self.bot_paddle.track(self.ball.position.x, &mut self.rng);
        self.bot_paddle.shift(shift);

        let ball = &mut self.ball;
        ball.position.x += ball.velocity.x;
        ball.position.y += ball.velocity.y;

        if ball.position.x - ball.radius <= 0.0 {
            ball.position.x = ball.radius;
            ball.velocity.x = ball.velocity.x.abs();
        } else if ball.position.x + ball.radius >= FIELD_WIDTH {
            ball.position.x = FIELD_WIDTH - ball.radius;
            ball.velocity.x = -ball.velocity.x.abs();
        }

        self.collide_player_paddle();
        self.collide_bot_paddle();

        if self.ball.position.y < 0.0 {
            self.point_scored(Side::Player);
        } else if self.ball.position.y > FIELD_HEIGHT {
            self.point_scored(Side::Bot);
        }
    }

    fn collide_player_paddle(&mut self) {
        let paddle = self.player_paddle;
        let ball = self.ball;
        let leading_edge = ball.position.y + ball.radius;
        let top = paddle.position.y;
        if ball.velocity.y > 0.0
            && leading_edge >= top
            && leading_edge <= top + paddle.height + ball.velocity.y
            && paddle.spans(ball.position.x, ball.radius)
        {
            let vx = self.return_velocity(&paddle);
            self.ball.position.y = top - ball.radius;
            self.ball.velocity = Vec2::new(vx, -ball.velocity.y.abs());
            self.hits.player += 1;
            self.rally.current += 1;
        }
    }

    fn collide_bot_paddle(&mut self) {
        let paddle = self.bot_paddle;
        let ball = self.ball;
        let leading_edge = ball.position.y - ball.radius;
        let bottom = paddle.position.y + paddle.height;
        if ball.velocity.y < 0.0
            && leading_edge <= bottom
            && leading_edge >= paddle.position.y + ball.velocity.y
            && paddle.spans(ball.position.x, ball.radius)
        {
            let vx = self.return_velocity(&paddle)
                + self.rng.random_range(-BOT_PERTURBATION..=BOT_PERTURBATION);
            self.ball.position.y = bottom + ball.radius;
            self.ball.velocity = Vec2::new(vx, ball.velocity.y.abs());
            self.hits.bot += 1;
            self.rally.current += 1;
        }
    }

    fn point_scored(&mut self, by: Side) {
        let score = match by {
            Side::Player => {
                self.player_score += 1;
                self.player_score
            }
            Side::Bot => {
                self.bot_score += 1;
                self.bot_score
            }
        };
        self.rally.longest = self.rally.longest.max(self.rally.current);
        self.rally.completed += 1;
        self.rally.current = 0;

        if score >= self.win_score {
            self.phase = PongPhase::GameOver;
            self.winner = Some(by);
            return;
        }
        let conceded = match by {
            Side::Player => Side::Bot,
            Side::Bot => Side::Player,
        };
        self.serve(conceded);
    }
}

impl fmt::Display for PongState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Player {} - {} Bot | ball ({:.0}, {:.0}) | rally {} | {:?}",
            self.player_score,
            self.bot_score,
            self.ball.position.x,
            self.ball.position.y,
            self.rally.current,
            self.phase
        )
    }
}

impl GameState for PongState {
    type Move = PongMove;

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        match self.phase {
            PongPhase::Playing => vec![PongMove::Tick, PongMove::Left, PongMove::Right, PongMove::Pause],
            PongPhase::Paused => vec![PongMove::Resume],
            PongPhase::GameOver => Vec::new(),
        }
    }

    fn make_move(&mut self, mv: &Self::Move) {
        match *mv {
            PongMove::Tick => self.tick(),
            PongMove::Left => self.player_paddle.shift(-self.player_paddle.speed),
            PongMove::Right => self.player_paddle.shift(self.player_paddle.speed),
            PongMove::MoveTo(x) => self.player_paddle.move_to(x),
            PongMove::Pause => self.phase = PongPhase::Paused,
            PongMove::Resume => self.phase = PongPhase::Playing,
            PongMove::SetBallSpeed(speed) => self.set_ball_speed(speed),
        }
    }

    fn is_terminal(&self) -> bool {
        self.phase == PongPhase::GameOver
    }

    fn get_winner(&self) -> Option<i32> {
        self.winner.map(Side::player_id)
    }

    /// The player is always the one acting; the bot steers inside each tick.
    fn get_current_player(&self) -> i32 {
        PLAYER_ONE
    }

    fn check_invariants(&self) -> Result<(), GameError> {
        for (name, paddle) in [("player", &self.player_paddle), ("bot", &self.bot_paddle)] {
            let x = paddle.position.x;
            if !(0.0..=FIELD_WIDTH - paddle.width).contains(&x) {
                return Err(GameError::InvariantViolation(format!("{} paddle at x={} is off the field", name, x)));
            }
        }
        let b = &self.ball;
        if ![b.position.x, b.position.y, b.velocity.x, b.velocity.y].iter().all(|v| v.is_finite()) {
            return Err(GameError::InvariantViolation("ball state is not finite".to_string()));
        }
        if !(BALL_SPEED_MIN..=BALL_SPEED_MAX).contains(&self.ball_speed) || self.win_score == 0 {
            return Err(GameError::InvariantViolation(format!(
                "ball speed {} or win score {} out of range",
                self.ball_speed, self.win_score
            )));
        }
        let reached = self.player_score >= self.win_score || self.bot_score >= self.win_score;
        if reached != (self.phase == PongPhase::GameOver) {
            return Err(GameError::InvariantViolation(format!(
                "score {}-{} does not match phase {:?}",
                self.player_score, self.bot_score, self.phase
            )));
        }
        Ok(())
    }

    fn validate_move(&self, mv: &Self::Move) -> Result<(), GameError> {
        match *mv {
            PongMove::MoveTo(x) if !x.is_finite() => {
                return Err(GameError::MalformedInput(format!("paddle position {} is not finite", x)));
            }
            PongMove::SetBallSpeed(s) if !(BALL_SPEED_MIN..=BALL_SPEED_MAX).contains(&s) => {
                return Err(GameError::MalformedInput(format!(
                    "ball speed {} is outside {}..={}",
                    s, BALL_SPEED_MIN, BALL_SPEED_MAX
                )));
            }
            _ => {}
        }
        let allowed = match (self.phase, mv) {
            (PongPhase::GameOver, _) => false,
            (_, PongMove::SetBallSpeed(_)) => true,
            (PongPhase::Paused, PongMove::Resume) => true,
            (PongPhase::Paused, _) => false,
            (PongPhase::Playing, PongMove::Resume) => false,
            (PongPhase::Playing, _) => true,
        };
        if allowed {
            Ok(())
        } else {
            Err(GameError::InvalidAction(format!("{} is not allowed while {:?}", mv, self.phase)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Places the ball just below the top edge heading out, away from the bot paddle.
    fn line_up_player_point(state: &mut PongState) {
        state.bot_paddle.move_to(FIELD_WIDTH);
        state.ball.position = Vec2::new(20.0, 2.0);
        state.ball.velocity = Vec2::new(0.0, -state.ball_speed);
    }

    #[test]
    fn test_new_game() {
        let game = PongState::new(7);
        assert_eq!(game.phase(), PongPhase::Playing);
        assert_eq!(game.player_score(), 0);
        assert!((game.ball().velocity.length() - DEFAULT_BALL_SPEED).abs() < 1e-9);
        assert!(game.ball().velocity.y > 0.0);
        assert!(game.check_invariants().is_ok());
    }

    #[test]
    fn test_paddle_is_clamped() {
        let mut game = PongState::new(1);
        game.apply_move(&PongMove::MoveTo(-50.0)).unwrap();
        assert_eq!(game.player_paddle().position.x, 0.0);
        game.apply_move(&PongMove::MoveTo(10_000.0)).unwrap();
        assert_eq!(game.player_paddle().position.x, FIELD_WIDTH - PADDLE_WIDTH);
        game.apply_move(&PongMove::Right).unwrap();
        assert_eq!(game.player_paddle().position.x, FIELD_WIDTH - PADDLE_WIDTH);
        game.apply_move(&PongMove::Left).unwrap();
        assert_eq!(game.player_paddle().position.x, FIELD_WIDTH - PADDLE_WIDTH - PADDLE_SPEED);
    }

    #[test]
    fn test_side_wall_reflects_horizontal_velocity() {
        let mut game = PongState::new(2);
        game.ball.position = Vec2::new(BALL_RADIUS + 1.0, 300.0);
        game.ball.velocity = Vec2::new(-3.0, 4.0);
        game.apply_move(&PongMove::Tick).unwrap();
        assert_eq!(game.ball().velocity.x, 3.0);
        assert_eq!(game.ball().velocity.y, 4.0);
    }

    #[test]
    fn test_player_paddle_returns_ball() {
        let mut game = PongState::new(3);
        let top = game.player_paddle().position.y;
        let centre = game.player_paddle().center_x();
        game.ball.position = Vec2::new(centre, top - BALL_RADIUS - 2.0);
        game.ball.velocity = Vec2::new(0.0, 5.0);
        game.apply_move(&PongMove::Tick).unwrap();
        assert!(game.ball().velocity.y < 0.0);
        assert_eq!(game.ball().velocity.x, 0.0);
        assert_eq!(game.hits().player, 1);
        assert_eq!(game.rally().current, 1);
    }

    #[test]
    fn test_off_centre_hit_angles_the_ball() {
        let mut game = PongState::new(3);
        let top = game.player_paddle().position.y;
        let right_edge = game.player_paddle().position.x + PADDLE_WIDTH;
        game.ball.position = Vec2::new(right_edge, top - BALL_RADIUS - 2.0);
        game.ball.velocity = Vec2::new(0.0, 5.0);
        game.apply_move(&PongMove::Tick).unwrap();
        assert!((game.ball().velocity.x - game.ball_speed() * MAX_ANGLE_MULTIPLIER).abs() < 1e-9);
    }

    #[test]
    fn test_bot_scores_through_bottom() {
        let mut game = PongState::new(4);
        game.player_paddle.move_to(0.0);
        game.ball.position = Vec2::new(FIELD_WIDTH - 20.0, FIELD_HEIGHT - 2.0);
        game.ball.velocity = Vec2::new(0.0, 5.0);
        game.apply_move(&PongMove::Tick).unwrap();
        assert_eq!(game.bot_score(), 1);
        assert_eq!(game.rally().completed, 1);
        // Served toward the player, who conceded.
        assert!(game.ball().velocity.y > 0.0);
        assert_eq!(game.ball().position, Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0));
    }

    #[test]
    fn test_game_ends_on_the_winning_tick() {
        let mut game = PongState::new(5);
        while game.player_score() < WIN_SCORE {
            let before = game.player_score();
            line_up_player_point(&mut game);
            game.apply_move(&PongMove::Tick).unwrap();
            assert_eq!(game.player_score(), before + 1);
            if game.player_score() < WIN_SCORE {
                assert_eq!(game.phase(), PongPhase::Playing);
                assert!(game.ball().velocity.y < 0.0, "serve goes toward the bot after it concedes");
            }
        }
        assert_eq!(game.phase(), PongPhase::GameOver);
        assert_eq!(game.winner(), Some(Side::Player));
        assert_eq!(game.get_winner(), Some(1));
        assert!(game.apply_move(&PongMove::Tick).is_err());
    }

    #[test]
    fn test_ball_speed_rescales_velocity() {
        let mut game = PongState::new(6);
        let before = game.ball().velocity;
        game.apply_move(&PongMove::SetBallSpeed(10.0)).unwrap();
        let after = game.ball().velocity;
        assert!((after.x - before.x * 2.0).abs() < 1e-9);
        assert!((after.y - before.y * 2.0).abs() < 1e-9);
        assert!(matches!(
            game.apply_move(&PongMove::SetBallSpeed(50.0)),
            Err(GameError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_pause_blocks_ticks() {
        let mut game = PongState::new(8);
        game.apply_move(&PongMove::Pause).unwrap();
        assert_eq!(game.get_possible_moves(), vec![PongMove::Resume]);
        assert!(matches!(game.apply_move(&PongMove::Tick), Err(GameError::InvalidAction(_))));
        game.apply_move(&PongMove::SetBallSpeed(4.0)).unwrap();
        game.apply_move(&PongMove::Resume).unwrap();
        game.apply_move(&PongMove::Tick).unwrap();
        assert_eq!(game.ticks(), 1);
    }

    #[test]
    fn test_tracking_tolerance() {
        let paddle = Paddle::at_row(PADDLE_MARGIN);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        for _ in 0..50 {
            assert_eq!(paddle.track(paddle.center_x() + TRACKING_TOLERANCE, &mut rng), 0.0);
            let dx = paddle.track(paddle.center_x() + 100.0, &mut rng);
            assert!(dx == 0.0 || dx == PADDLE_SPEED || dx == PADDLE_SPEED / 2.0);
        }
    }

    #[test]
    fn test_invariants_catch_broken_state() {
        let mut off_field = PongState::new(9);
        off_field.player_paddle.position.x = -5.0;
        assert!(matches!(off_field.check_invariants(), Err(GameError::InvariantViolation(_))));

        let mut lost_ball = PongState::new(9);
        lost_ball.ball.velocity.x = f64::NAN;
        assert!(matches!(lost_ball.check_invariants(), Err(GameError::InvariantViolation(_))));

        let mut unfinished = PongState::new(9);
        unfinished.bot_score = WIN_SCORE;
        assert!(matches!(unfinished.check_invariants(), Err(GameError::InvariantViolation(_))));

        let mut too_fast = PongState::new(9);
        too_fast.ball_speed = 40.0;
        assert!(matches!(too_fast.check_invariants(), Err(GameError::InvariantViolation(_))));
    }

    #[test]
    fn test_move_parsing() {
        assert_eq!(PongMove::from_str("l"), Ok(PongMove::Left));
        assert_eq!(PongMove::from_str("move 12.5"), Ok(PongMove::MoveTo(12.5)));
        assert_eq!(PongMove::from_str("speed 7"), Ok(PongMove::SetBallSpeed(7.0)));
        assert!(PongMove::from_str("jump").is_err());
        assert!(PongMove::from_str("move").is_err());
    }
}
