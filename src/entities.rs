/// All game entity types — pure data, no logic.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerAction {
    Idle,
    Jumping,
    Sliding,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GamePhase {
    Loading,
    Menu,
    Playing,
    Paused,
    GameOver,
}

// ── Scheduled effects ─────────────────────────────────────────────────────────

/// What a scheduled effect does when its countdown reaches zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectKind {
    /// Shadow-clone window ends: clear the ability flag and re-derive
    /// invincibility from the damage-grace flag.
    AbilityExpire,
    /// Post-hit grace window ends: the player is vulnerable again unless the
    /// clone ability is still running.
    GraceExpire,
    /// Put the oni back at the right edge of the field, active.
    EnemyRespawn,
    /// Drop one bonus scroll at the right edge (level-up reward).
    SpawnBonus,
}

/// A one-shot timed effect, counted in frames.  Aged only by `compute::tick`,
/// so a paused game suspends every in-flight window and a fresh run drops
/// them wholesale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledEffect {
    pub kind: EffectKind,
    /// Frames until the effect fires.
    pub remaining: u32,
}

// ── Player, enemy, collectibles ───────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    /// Left edge, virtual units from the field's left border.
    pub x: i32,
    /// Bottom edge, virtual units above the ground.
    pub y: i32,
    pub action: PlayerAction,
    /// Frames spent in the current non-idle action (drives the jump arc).
    pub action_ticks: u32,
    pub invincible: bool,
}

/// The single oni.  Never destroyed — scoring and damage deactivate it until
/// an `EnemyRespawn` effect repositions it at the right edge.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub x: i32,
    /// Units moved leftward per frame while active.
    pub speed: i32,
    pub active: bool,
}

/// A chakra scroll drifting leftward until picked up or off-screen.
#[derive(Clone, Debug)]
pub struct Collectible {
    pub x: i32,
    pub y: i32,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire session state.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub enemy: Enemy,
    pub collectibles: Vec<Collectible>,
    /// In-flight one-shot timers (ability window, grace window, respawn,
    /// staggered bonus drops).
    pub effects: Vec<ScheduledEffect>,
    pub score: u32,
    /// The highest score seen so far; lifted at game over when beaten.
    pub high_score: u32,
    /// Derived: score / 10 + 1, recomputed every tick.
    pub level: u32,
    pub lives: u32,
    /// Bounded resource in [0, 100]; regenerates each frame, spent by the
    /// shadow-clone ability.
    pub chakra: f32,
    pub ability_active: bool,
    pub damage_grace: bool,
    /// Set at game over when the final score beat the stored high score.
    pub new_record: bool,
    /// Frames left to show the level-up banner.
    pub level_flash: u32,
    pub phase: GamePhase,
    pub difficulty: Difficulty,
    pub frame: u64,
    pub width: u16,
    pub height: u16,
}
