//! Pure ball physics for one fixed tick.
//!
//! Nothing in here performs I/O or touches shared state: `advance` maps a
//! match record to the next one, and `reset_ball` draws a serve from the
//! supplied RNG.

use rand::Rng;
use shared::{
    Ball, Match, Role, ARENA_HEIGHT, ARENA_WIDTH, BALL_SIZE, BALL_SPEED, MAX_BOUNCE_ANGLE,
    PADDLE_HEIGHT, PADDLE_WIDTH,
};

/// Result of advancing the match by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub state: Match,
    /// Set when a point was scored this tick; the ball then still holds its
    /// pre-tick position and the caller is expected to serve a new one.
    pub scorer: Option<Role>,
}

/// Advances ball physics by one tick.
pub fn advance(current: &Match) -> Step {
    let mut next = *current;
    let before = current.ball;
    let ball = &mut next.ball;

    ball.x += ball.vx;
    ball.y += ball.vy;

    if let Some(side) = paddle_contact(&before, ball, current) {
        let paddle_y = match side {
            Role::Left => current.left_paddle_y,
            _ => current.right_paddle_y,
        };
        let (vx, vy) = bounce_velocity(paddle_y, ball.y, ball.vx);
        ball.vx = vx;
        ball.vy = vy;
        ball.x = match side {
            Role::Left => PADDLE_WIDTH,
            _ => ARENA_WIDTH - PADDLE_WIDTH - BALL_SIZE,
        };
    }

    if ball.y <= 0.0 {
        ball.y = 0.0;
        ball.vy = ball.vy.abs();
    } else if ball.y + BALL_SIZE >= ARENA_HEIGHT {
        ball.y = ARENA_HEIGHT - BALL_SIZE;
        ball.vy = -ball.vy.abs();
    }

    let scorer = if ball.x <= 0.0 {
        Some(Role::Right)
    } else if ball.x + BALL_SIZE >= ARENA_WIDTH {
        Some(Role::Left)
    } else {
        None
    };

    match scorer {
        Some(Role::Left) => next.left_score += 1,
        Some(Role::Right) => next.right_score += 1,
        _ => {}
    }
    if scorer.is_some() {
        next.ball = before;
    }

    Step {
        state: next,
        scorer,
    }
}

/// Returns the paddle the ball struck during this tick, if any.
///
/// The ball must be travelling toward the paddle, its leading edge must cross
/// the paddle plane during the tick, and the vertical extents must overlap.
fn paddle_contact(before: &Ball, after: &Ball, state: &Match) -> Option<Role> {
    let left_plane = PADDLE_WIDTH;
    let right_plane = ARENA_WIDTH - PADDLE_WIDTH;

    if after.vx < 0.0
        && before.x >= left_plane
        && after.x <= left_plane
        && overlaps_paddle(after.y, state.left_paddle_y)
    {
        return Some(Role::Left);
    }

    if after.vx > 0.0
        && before.x + BALL_SIZE <= right_plane
        && after.x + BALL_SIZE >= right_plane
        && overlaps_paddle(after.y, state.right_paddle_y)
    {
        return Some(Role::Right);
    }

    None
}

fn overlaps_paddle(ball_y: f32, paddle_y: f32) -> bool {
    ball_y + BALL_SIZE >= paddle_y && ball_y <= paddle_y + PADDLE_HEIGHT
}

/// Computes the return velocity for a ball striking a paddle.
///
/// `contact_y` is the ball's top edge. Its offset from the paddle centre,
/// normalized to `[-1, 1]`, maps
/// linearly onto `[-MAX_BOUNCE_ANGLE, MAX_BOUNCE_ANGLE]`. Hits above the
/// centre go up, hits below go down, and the speed is always `BALL_SPEED`.
pub fn bounce_velocity(paddle_y: f32, contact_y: f32, approach_vx: f32) -> (f32, f32) {
    let half = PADDLE_HEIGHT / 2.0;
    let offset = ((paddle_y + half - contact_y) / half).clamp(-1.0, 1.0);
    let angle = offset * MAX_BOUNCE_ANGLE;
    let heading = if approach_vx > 0.0 { -1.0 } else { 1.0 };

    (
        BALL_SPEED * angle.cos() * heading,
        -BALL_SPEED * angle.sin(),
    )
}

/// Serves a fresh ball from the arena centre.
///
/// The angle is drawn uniformly within `±MAX_BOUNCE_ANGLE` of horizontal and
/// the horizontal direction is a coin flip.
pub fn reset_ball<R: Rng + ?Sized>(rng: &mut R) -> Ball {
    let angle = rng.gen_range(-MAX_BOUNCE_ANGLE..=MAX_BOUNCE_ANGLE);
    let heading = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };

    Ball::centered(
        BALL_SPEED * angle.cos() * heading,
        BALL_SPEED * angle.sin(),
    )
}
