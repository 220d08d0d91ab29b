use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;

pub mod codec;

pub use codec::{CodecError, Encoding, Frame};

pub const ARENA_WIDTH: f32 = 800.0;
pub const ARENA_HEIGHT: f32 = 400.0;
pub const PADDLE_WIDTH: f32 = 10.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
pub const BALL_SIZE: f32 = 10.0;
pub const PADDLE_VELOCITY: f32 = 40.0;
pub const BALL_SPEED: f32 = 7.0;
pub const MAX_BOUNCE_ANGLE: f32 = FRAC_PI_4;

/// Highest valid paddle offset; paddles live in `[0, PADDLE_MAX_Y]`.
pub const PADDLE_MAX_Y: f32 = ARENA_HEIGHT - PADDLE_HEIGHT;

/// Opaque identifier of one live connection, stable for its lifetime.
pub type ConnectionId = u32;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Left,
    Right,
    Spectator,
}

impl Role {
    pub fn is_player(&self) -> bool {
        !matches!(self, Role::Spectator)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Left => "left",
            Role::Right => "right",
            Role::Spectator => "spectator",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Waiting,
    Playing,
    Ended,
}

/// Paddle movement request, one step up (`-1`) or down (`+1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn sign(&self) -> f32 {
        match self {
            Direction::Up => -1.0,
            Direction::Down => 1.0,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = i8;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Direction::Up),
            1 => Ok(Direction::Down),
            other => Err(other),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Ball {
    /// Ball resting at the arena centre with the given velocity.
    pub fn centered(vx: f32, vy: f32) -> Self {
        Self {
            x: ARENA_WIDTH / 2.0 - BALL_SIZE / 2.0,
            y: ARENA_HEIGHT / 2.0 - BALL_SIZE / 2.0,
            vx,
            vy,
        }
    }

    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    pub fn center_y(&self) -> f32 {
        self.y + BALL_SIZE / 2.0
    }
}

/// The single authoritative live game record.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub status: MatchStatus,
    pub left_paddle_y: f32,
    pub right_paddle_y: f32,
    pub ball: Ball,
    pub left_score: u32,
    pub right_score: u32,
}

impl Match {
    pub fn new() -> Self {
        let paddle_y = ARENA_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0;
        Self {
            status: MatchStatus::Waiting,
            left_paddle_y: paddle_y,
            right_paddle_y: paddle_y,
            ball: Ball::centered(BALL_SPEED, 0.0),
            left_score: 0,
            right_score: 0,
        }
    }

    /// Paddle offset for a player role; spectators have no paddle.
    pub fn paddle_y(&self, role: Role) -> Option<f32> {
        match role {
            Role::Left => Some(self.left_paddle_y),
            Role::Right => Some(self.right_paddle_y),
            Role::Spectator => None,
        }
    }

    pub fn score(&self, role: Role) -> Option<u32> {
        match role {
            Role::Left => Some(self.left_score),
            Role::Right => Some(self.right_score),
            Role::Spectator => None,
        }
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub position: Role,
    pub id: ConnectionId,
}

/// Seated players plus a head count of everyone else watching.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub players: Vec<RosterEntry>,
    pub spectators: u32,
}

impl Roster {
    pub fn holder(&self, role: Role) -> Option<ConnectionId> {
        self.players
            .iter()
            .find(|entry| entry.position == role)
            .map(|entry| entry.id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Snapshot {
    pub tick: u32,
    #[serde(rename = "match")]
    pub state: Match,
    pub roster: Roster,
}

/// Events pushed from the server to every client.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ServerEvent {
    PlayerAssignment(Role),
    GameState(Snapshot),
}

/// Events sent by a client. The `player` field is advisory only: the
/// server resolves the sender's role from its own connection table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ClientEvent {
    MovePaddle { player: Role, direction: i8 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_match_creation() {
        let state = Match::new();
        assert_eq!(state.status, MatchStatus::Waiting);
        assert_eq!(state.left_paddle_y, 150.0);
        assert_eq!(state.right_paddle_y, 150.0);
        assert_eq!(state.left_score, 0);
        assert_eq!(state.right_score, 0);
        assert_eq!(state.ball.x, 395.0);
        assert_eq!(state.ball.y, 195.0);
        assert_approx_eq!(state.ball.speed(), BALL_SPEED, 1e-5);
    }

    #[test]
    fn test_paddle_lookup_by_role() {
        let mut state = Match::new();
        state.left_paddle_y = 10.0;
        state.right_paddle_y = 250.0;

        assert_eq!(state.paddle_y(Role::Left), Some(10.0));
        assert_eq!(state.paddle_y(Role::Right), Some(250.0));
        assert_eq!(state.paddle_y(Role::Spectator), None);
        assert_eq!(state.score(Role::Spectator), None);
    }

    #[test]
    fn test_direction_from_wire_value() {
        assert_eq!(Direction::try_from(-1), Ok(Direction::Up));
        assert_eq!(Direction::try_from(1), Ok(Direction::Down));
        assert_eq!(Direction::try_from(0), Err(0));
        assert_eq!(Direction::try_from(5), Err(5));
        assert_eq!(Direction::Up.sign(), -1.0);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Left).unwrap(), "\"left\"");
        assert_eq!(
            serde_json::to_string(&Role::Spectator).unwrap(),
            "\"spectator\""
        );
        assert_eq!(Role::Right.as_str(), "right");
        assert!(Role::Right.is_player());
        assert!(!Role::Spectator.is_player());
    }

    #[test]
    fn test_player_assignment_json_shape() {
        let json = serde_json::to_string(&ServerEvent::PlayerAssignment(Role::Right)).unwrap();
        assert_eq!(json, r#"{"playerAssignment":"right"}"#);
    }

    #[test]
    fn test_game_state_json_shape() {
        let snapshot = Snapshot {
            tick: 3,
            state: Match::new(),
            roster: Roster {
                players: vec![RosterEntry {
                    position: Role::Left,
                    id: 7,
                }],
                spectators: 2,
            },
        };

        let value = serde_json::to_value(ServerEvent::GameState(snapshot)).unwrap();
        let body = &value["gameState"];
        assert_eq!(body["tick"], 3);
        assert_eq!(body["match"]["status"], "waiting");
        assert_eq!(body["match"]["leftPaddleY"], 150.0);
        assert_eq!(body["roster"]["players"][0]["position"], "left");
        assert_eq!(body["roster"]["spectators"], 2);
    }

    #[test]
    fn test_move_paddle_parses_from_json() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"movePaddle":{"player":"left","direction":-1}}"#).unwrap();
        assert_eq!(
            event,
            ClientEvent::MovePaddle {
                player: Role::Left,
                direction: -1
            }
        );
    }

    #[test]
    fn test_move_paddle_missing_field_is_rejected() {
        let result: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"movePaddle":{"player":"left"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_roster_holder() {
        let roster = Roster {
            players: vec![
                RosterEntry {
                    position: Role::Left,
                    id: 1,
                },
                RosterEntry {
                    position: Role::Right,
                    id: 4,
                },
            ],
            spectators: 0,
        };
        assert_eq!(roster.holder(Role::Right), Some(4));
        assert_eq!(Roster::default().holder(Role::Left), None);
    }
}
