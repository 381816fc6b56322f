//! Game state: the single root value the engine folds over.
//!
//! ## GameState
//!
//! Everything about one game: players, fleets, phase position, pending
//! effect totals, commitment records, power memory, and the append-only
//! event log. The engine is a pure function over this value plus
//! inputs; callers persist and serialize it whole.
//!
//! Uses `im` persistent data structures so cloning a state to produce
//! the next one is cheap and the caller's value is never mutated in
//! place.
//!
//! ## PendingTurn
//!
//! Damage, healing and line gains accumulate here during resolution and
//! fold into authoritative player values exactly once, at end-of-turn.
//! Deferring the write makes the final totals independent of effect
//! evaluation order.

use im::{HashMap as ImHashMap, HashSet as ImHashSet, Vector};
use serde::{Deserialize, Serialize};

use crate::commit::record::{CommitKey, CommitRecord, Stance};
use crate::phases::sequence::{PhaseKey, SetupPhase};
use crate::units::definition::UnitTypeId;

use super::event::GameEvent;
use super::player::{PlayerId, PlayerState};

/// Milliseconds since the Unix epoch, injected by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Raw milliseconds.
    #[must_use]
    pub const fn millis(self) -> i64 {
        self.0
    }
}

/// Opaque game identifier, issued by the caller's storage layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    /// Create a new game ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw ID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Game lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Created, species not yet resolved.
    Waiting,
    /// In play.
    Active,
    /// Terminal; the state is immutable from here on.
    Finished,
}

/// Why the game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    HealthDepleted,
    Concession,
}

/// Who won.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Winner(PlayerId),
    Draw,
}

/// Terminal outcome of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub result: MatchResult,
    pub reason: TerminalReason,
}

/// Unique identifier of a ship instance within one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipId(pub u32);

impl ShipId {
    /// Create a new ship ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ShipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ship({})", self.0)
    }
}

/// A unit on the board.
///
/// Ships never reference each other; relationships ("units you have")
/// are computed by scanning the owner's fleet. Destroyed ships are
/// flagged, not removed, until the turn wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipInstance {
    pub id: ShipId,
    pub unit_type: UnitTypeId,

    /// Charge count for charge-based powers.
    pub charges: u32,

    /// Turn this ship was built on (for once-only and built-this-turn
    /// powers).
    pub created_turn: u32,

    /// Destroyed this turn; swept at turn wrap.
    #[serde(default)]
    pub destroyed: bool,
}

impl ShipInstance {
    /// Create a new ship built on the given turn.
    #[must_use]
    pub fn new(id: ShipId, unit_type: UnitTypeId, created_turn: u32) -> Self {
        Self {
            id,
            unit_type,
            charges: 0,
            created_turn,
            destroyed: false,
        }
    }
}

/// Composite key guarding once-only power firing.
///
/// One entry per (instance, type, power slot); the same uniqueness a
/// concatenated string key would give, without the stringly typing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OncePowerKey {
    pub ship: ShipId,
    pub unit_type: UnitTypeId,
    pub power_index: u32,
}

/// Persistent memory for power resolution.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PowerMemory {
    /// Once-only powers that have fired.
    pub fired: ImHashSet<OncePowerKey>,

    /// Per-instance chosen dice trigger numbers (1..=6).
    pub dice_triggers: ImHashMap<ShipId, u8>,
}

/// Per-player totals accumulated during a turn, applied at end-of-turn.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PendingTurn {
    pub damage: ImHashMap<PlayerId, i64>,
    pub heal: ImHashMap<PlayerId, i64>,
    pub lines: ImHashMap<PlayerId, i64>,
}

impl PendingTurn {
    /// Add pending damage against a player.
    pub fn add_damage(&mut self, target: PlayerId, amount: i64) {
        *self.damage.entry(target).or_insert(0) += amount;
    }

    /// Add pending healing for a player.
    pub fn add_heal(&mut self, target: PlayerId, amount: i64) {
        *self.heal.entry(target).or_insert(0) += amount;
    }

    /// Add pending line gain for a player.
    pub fn add_lines(&mut self, target: PlayerId, amount: i64) {
        *self.lines.entry(target).or_insert(0) += amount;
    }

    /// Pending damage total against a player.
    #[must_use]
    pub fn damage_for(&self, target: PlayerId) -> i64 {
        self.damage.get(&target).copied().unwrap_or(0)
    }

    /// Pending heal total for a player.
    #[must_use]
    pub fn heal_for(&self, target: PlayerId) -> i64 {
        self.heal.get(&target).copied().unwrap_or(0)
    }

    /// Pending line gain for a player.
    #[must_use]
    pub fn lines_for(&self, target: PlayerId) -> i64 {
        self.lines.get(&target).copied().unwrap_or(0)
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.damage.is_empty() && self.heal.is_empty() && self.lines.is_empty()
    }
}

/// What happened to one player last turn, for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDelta {
    pub player: PlayerId,
    pub damage: i64,
    pub heal: i64,
    pub lines: i64,
}

/// Turn-scoped data, cleared on turn wrap.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct TurnData {
    /// The turn's die, rolled on entering `build.dice_roll`.
    pub dice: Option<u8>,

    /// Players ready to leave the current phase. Cleared on every
    /// successful advance.
    pub ready: ImHashSet<PlayerId>,

    /// Battle plans revealed this turn.
    pub plans: ImHashMap<PlayerId, Stance>,
}

/// The engine-owned block of game data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    /// Single-sourced turn number. 0 during setup, 1 from the first
    /// build phase.
    pub turn_number: u32,

    /// Current phase.
    pub phase: PhaseKey,

    /// Legacy mirror of the phase key as a display string; kept
    /// consistent by `sync_phase_fields`.
    #[serde(default)]
    pub phase_label: Option<String>,

    /// Per-player ship lists.
    pub fleets: ImHashMap<PlayerId, Vector<ShipInstance>>,

    /// Turn-scoped data.
    pub turn: TurnData,

    /// Deferred per-player totals.
    pub pending: PendingTurn,

    /// Last turn's aggregated deltas, for display.
    pub last_turn: ImHashMap<PlayerId, PlayerDelta>,

    /// Once-only firing memory and dice-trigger choices.
    pub power_memory: PowerMemory,

    /// Commitment records, keyed by decision scope then player.
    pub commits: ImHashMap<CommitKey, ImHashMap<PlayerId, CommitRecord>>,

    /// Next ship instance id to allocate.
    next_ship_id: u32,
}

impl GameData {
    fn new() -> Self {
        Self {
            turn_number: 0,
            phase: PhaseKey::Setup(SetupPhase::SpeciesSelect),
            phase_label: None,
            fleets: ImHashMap::new(),
            turn: TurnData::default(),
            pending: PendingTurn::default(),
            last_turn: ImHashMap::new(),
            power_memory: PowerMemory::default(),
            commits: ImHashMap::new(),
            next_ship_id: 0,
        }
    }

    /// Allocate the next ship instance id.
    pub fn alloc_ship_id(&mut self) -> ShipId {
        let id = ShipId(self.next_ship_id);
        self.next_ship_id += 1;
        id
    }
}

/// Full game state: the value the engine receives and returns whole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub id: GameId,
    pub status: GameStatus,

    /// Terminal result, present once finished.
    pub outcome: Option<GameOutcome>,

    pub players: Vector<PlayerState>,
    pub data: GameData,

    /// Legacy mirror of `data.turn_number`; normalized by
    /// `sync_phase_fields`.
    #[serde(default)]
    pub turn_number: u32,

    /// Append-only typed event log for audit and replay.
    pub log: Vector<GameEvent>,
}

impl GameState {
    /// Create a fresh two-player game in setup.
    #[must_use]
    pub fn new(id: GameId) -> Self {
        let players: Vector<PlayerState> = [PlayerId::new(0), PlayerId::new(1)]
            .into_iter()
            .map(PlayerState::new)
            .collect();

        let mut data = GameData::new();
        for player in &players {
            data.fleets.insert(player.id, Vector::new());
        }

        Self {
            id,
            status: GameStatus::Waiting,
            outcome: None,
            players,
            data,
            turn_number: 0,
            log: Vector::new(),
        }
    }

    /// Add a spectator seat.
    pub fn add_spectator(&mut self, id: PlayerId) {
        self.players.push_back(PlayerState::spectator(id));
    }

    /// Whether the game is over.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    /// Look up a seat.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Look up a seat mutably.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Ids of all active (non-spectator) players.
    #[must_use]
    pub fn active_player_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id)
            .collect()
    }

    /// Whether a seat is an active player.
    #[must_use]
    pub fn is_participant(&self, id: PlayerId) -> bool {
        self.player(id).is_some_and(PlayerState::is_active)
    }

    /// The other active player.
    #[must_use]
    pub fn opponent_of(&self, id: PlayerId) -> Option<PlayerId> {
        self.active_player_ids().into_iter().find(|p| *p != id)
    }

    /// A player's fleet, empty if the seat has none yet.
    #[must_use]
    pub fn fleet(&self, id: PlayerId) -> Vector<ShipInstance> {
        self.data.fleets.get(&id).cloned().unwrap_or_default()
    }

    /// Find a ship in a player's fleet.
    #[must_use]
    pub fn ship(&self, owner: PlayerId, ship: ShipId) -> Option<&ShipInstance> {
        self.data
            .fleets
            .get(&owner)
            .and_then(|fleet| fleet.iter().find(|s| s.id == ship))
    }

    /// Find a ship mutably.
    pub fn ship_mut(&mut self, owner: PlayerId, ship: ShipId) -> Option<&mut ShipInstance> {
        self.data
            .fleets
            .get_mut(&owner)
            .and_then(|fleet| fleet.iter_mut().find(|s| s.id == ship))
    }

    /// Append an event to the audit log.
    pub fn push_event(&mut self, event: GameEvent) {
        self.log.push_back(event);
    }

    /// Append several events to the audit log.
    pub fn push_events(&mut self, events: &[GameEvent]) {
        for event in events {
            self.log.push_back(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(GameId::new("g1"))
    }

    #[test]
    fn test_new_game_defaults() {
        let s = state();
        assert_eq!(s.status, GameStatus::Waiting);
        assert_eq!(s.data.turn_number, 0);
        assert_eq!(s.data.phase, PhaseKey::Setup(SetupPhase::SpeciesSelect));
        assert_eq!(s.active_player_ids().len(), 2);
        assert!(s.log.is_empty());
    }

    #[test]
    fn test_opponent_lookup() {
        let s = state();
        assert_eq!(s.opponent_of(PlayerId::new(0)), Some(PlayerId::new(1)));
        assert_eq!(s.opponent_of(PlayerId::new(1)), Some(PlayerId::new(0)));
    }

    #[test]
    fn test_spectator_is_not_participant() {
        let mut s = state();
        s.add_spectator(PlayerId::new(7));
        assert!(!s.is_participant(PlayerId::new(7)));
        assert!(s.is_participant(PlayerId::new(0)));
        // A spectator is never anyone's opponent.
        assert_eq!(s.opponent_of(PlayerId::new(0)), Some(PlayerId::new(1)));
    }

    #[test]
    fn test_ship_allocation_and_lookup() {
        let mut s = state();
        let p0 = PlayerId::new(0);

        let id = s.data.alloc_ship_id();
        let ship = ShipInstance::new(id, UnitTypeId::new(3), 1);
        s.data.fleets.get_mut(&p0).unwrap().push_back(ship);

        assert_eq!(s.fleet(p0).len(), 1);
        assert_eq!(s.ship(p0, id).unwrap().unit_type, UnitTypeId::new(3));
        assert!(s.ship(PlayerId::new(1), id).is_none());

        let next = s.data.alloc_ship_id();
        assert_ne!(id, next);
    }

    #[test]
    fn test_pending_turn_accumulates() {
        let mut pending = PendingTurn::default();
        let p1 = PlayerId::new(1);

        pending.add_damage(p1, 2);
        pending.add_damage(p1, 3);
        pending.add_heal(p1, 1);

        assert_eq!(pending.damage_for(p1), 5);
        assert_eq!(pending.heal_for(p1), 1);
        assert_eq!(pending.lines_for(p1), 0);
        assert!(!pending.is_empty());
    }

    #[test]
    fn test_clone_does_not_alias() {
        let mut a = state();
        let b = a.clone();

        a.player_mut(PlayerId::new(0)).unwrap().lines = 9;
        assert_eq!(b.player(PlayerId::new(0)).unwrap().lines, 0);
    }

    #[test]
    fn test_state_serde_roundtrip() {
        let s = state();
        let json = serde_json::to_string(&s).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
