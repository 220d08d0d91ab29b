use crate::physics;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{Direction, Match, MatchStatus, Role, PADDLE_MAX_Y, PADDLE_VELOCITY};

/// Authoritative match record and the only code allowed to mutate it.
#[derive(Debug, Clone)]
pub struct GameState {
    pub tick: u32,
    state: Match,
    score_limit: Option<u32>,
    rng: StdRng,
}

impl GameState {
    pub fn new(score_limit: Option<u32>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            tick: 0,
            state: Match::new(),
            score_limit,
            rng,
        }
    }

    pub fn state(&self) -> &Match {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut Match {
        &mut self.state
    }

    pub fn status(&self) -> MatchStatus {
        self.state.status
    }

    /// Both seats are filled: serve a fresh ball and start playing.
    pub fn start(&mut self) {
        self.state.status = MatchStatus::Playing;
        self.state.ball = physics::reset_ball(&mut self.rng);
        info!(
            "Match started at {} - {}",
            self.state.left_score, self.state.right_score
        );
    }

    /// A seat emptied mid-match. Scores and positions are preserved.
    pub fn pause(&mut self) {
        self.state.status = MatchStatus::Waiting;
        info!(
            "Match paused at {} - {}, waiting for players",
            self.state.left_score, self.state.right_score
        );
    }

    /// Discards the finished match and waits for a new pair of players.
    pub fn reset(&mut self) {
        self.state = Match::new();
        info!("Match reset");
    }

    /// Moves the paddle owned by `role` one step in `direction`.
    ///
    /// The caller must pass the role resolved from the connection table, not
    /// one taken from the message. Spectators own no paddle and are refused.
    pub fn apply_paddle_input(&mut self, role: Role, direction: Direction) -> bool {
        let paddle = match role {
            Role::Left => &mut self.state.left_paddle_y,
            Role::Right => &mut self.state.right_paddle_y,
            Role::Spectator => return false,
        };

        *paddle = (*paddle + direction.sign() * PADDLE_VELOCITY).clamp(0.0, PADDLE_MAX_Y);
        debug!("{} paddle moved to {}", role.as_str(), paddle);
        true
    }

    /// Advances physics by one tick. Returns false when the match is not
    /// being played and nothing changed.
    pub fn tick(&mut self) -> bool {
        if self.state.status != MatchStatus::Playing {
            return false;
        }

        let step = physics::advance(&self.state);
        self.state = step.state;
        self.tick = self.tick.wrapping_add(1);

        if let Some(scorer) = step.scorer {
            info!(
                "{} player scored. Score: {} - {}",
                scorer.as_str(),
                self.state.left_score,
                self.state.right_score
            );

            let reached_limit = self
                .score_limit
                .zip(self.state.score(scorer))
                .is_some_and(|(limit, score)| score >= limit);

            if reached_limit {
                self.state.status = MatchStatus::Ended;
                info!("Match over, {} player wins", scorer.as_str());
            } else {
                self.state.ball = physics::reset_ball(&mut self.rng);
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::{Ball, ARENA_HEIGHT, ARENA_WIDTH, BALL_SIZE, BALL_SPEED, PADDLE_HEIGHT};

    fn playing() -> GameState {
        let mut game = GameState::new(None, Some(11));
        game.start();
        game
    }

    #[test]
    fn test_game_creation() {
        let game = GameState::new(Some(5), Some(1));
        assert_eq!(game.tick, 0);
        assert_eq!(game.status(), MatchStatus::Waiting);
        assert_eq!(*game.state(), Match::new());
    }

    #[test]
    fn test_start_serves_ball_at_fixed_speed() {
        let game = playing();
        assert_eq!(game.status(), MatchStatus::Playing);
        assert_approx_eq!(game.state().ball.speed(), BALL_SPEED, 1e-4);
        assert_eq!(game.state().ball.x, ARENA_WIDTH / 2.0 - BALL_SIZE / 2.0);
    }

    #[test]
    fn test_tick_is_noop_unless_playing() {
        let mut game = GameState::new(None, Some(2));
        let before = *game.state();

        assert!(!game.tick());
        assert_eq!(*game.state(), before);
        assert_eq!(game.tick, 0);
    }

    #[test]
    fn test_tick_advances_ball() {
        let mut game = playing();
        let before = game.state().ball;

        assert!(game.tick());
        assert_eq!(game.tick, 1);
        assert_approx_eq!(game.state().ball.x, before.x + before.vx);
    }

    #[test]
    fn test_left_input_moves_only_left_paddle() {
        let mut game = playing();
        let right_before = game.state().right_paddle_y;

        assert!(game.apply_paddle_input(Role::Left, Direction::Down));
        assert_eq!(game.state().left_paddle_y, 190.0);
        assert_eq!(game.state().right_paddle_y, right_before);
    }

    #[test]
    fn test_spectator_input_is_refused() {
        let mut game = playing();
        let before = *game.state();

        assert!(!game.apply_paddle_input(Role::Spectator, Direction::Up));
        assert_eq!(*game.state(), before);
    }

    #[test]
    fn test_paddle_clamps_at_top() {
        let mut game = playing();
        for _ in 0..20 {
            game.apply_paddle_input(Role::Left, Direction::Up);
            assert!(game.state().left_paddle_y >= 0.0);
        }
        assert_eq!(game.state().left_paddle_y, 0.0);
    }

    #[test]
    fn test_paddle_clamps_at_bottom() {
        let mut game = playing();
        for _ in 0..20 {
            game.apply_paddle_input(Role::Right, Direction::Down);
        }
        assert_eq!(game.state().right_paddle_y, ARENA_HEIGHT - PADDLE_HEIGHT);
    }

    #[test]
    fn test_input_accepted_while_waiting() {
        let mut game = GameState::new(None, Some(3));
        assert!(game.apply_paddle_input(Role::Right, Direction::Up));
        assert_eq!(game.state().right_paddle_y, 110.0);
    }

    #[test]
    fn test_scoring_resets_ball_to_center() {
        let mut game = playing();
        game.state.left_paddle_y = 0.0;
        game.state.ball = Ball {
            x: 2.0,
            y: 300.0,
            vx: -7.0,
            vy: 0.0,
        };

        assert!(game.tick());

        let state = game.state();
        assert_eq!(state.right_score, 1);
        assert_eq!(state.left_score, 0);
        assert_eq!(state.ball.x, ARENA_WIDTH / 2.0 - BALL_SIZE / 2.0);
        assert_eq!(state.ball.y, ARENA_HEIGHT / 2.0 - BALL_SIZE / 2.0);
        assert_approx_eq!(state.ball.speed(), BALL_SPEED, 1e-4);
        assert_eq!(state.status, MatchStatus::Playing);
    }

    #[test]
    fn test_reaching_score_limit_ends_match() {
        let mut game = GameState::new(Some(1), Some(4));
        game.start();
        game.state.right_paddle_y = 0.0;
        game.state.ball = Ball {
            x: ARENA_WIDTH - BALL_SIZE - 1.0,
            y: 300.0,
            vx: 7.0,
            vy: 0.0,
        };

        assert!(game.tick());
        assert_eq!(game.state().left_score, 1);
        assert_eq!(game.status(), MatchStatus::Ended);

        let frozen = *game.state();
        assert!(!game.tick());
        assert_eq!(*game.state(), frozen);
    }

    #[test]
    fn test_pause_preserves_scores_and_paddles() {
        let mut game = playing();
        game.state.left_score = 3;
        game.state.right_score = 4;
        game.apply_paddle_input(Role::Right, Direction::Down);
        let right_y = game.state().right_paddle_y;

        game.pause();

        assert_eq!(game.status(), MatchStatus::Waiting);
        assert_eq!(game.state().left_score, 3);
        assert_eq!(game.state().right_score, 4);
        assert_eq!(game.state().right_paddle_y, right_y);
    }

    #[test]
    fn test_reset_clears_finished_match() {
        let mut game = playing();
        game.state.left_score = 9;
        game.state.status = MatchStatus::Ended;

        game.reset();
        assert_eq!(*game.state(), Match::new());
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let mut a = GameState::new(None, Some(99));
        let mut b = GameState::new(None, Some(99));
        a.start();
        b.start();

        for _ in 0..500 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.state(), b.state());
    }
}
