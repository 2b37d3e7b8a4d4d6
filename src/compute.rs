/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (and, where needed, an RNG handle) and returns a brand-new
/// `GameState`.  Side effects are limited to the injected RNG.
///
/// Geometry runs in a fixed virtual field — x in [0, 800] rightward, y in
/// units above the ground — so the logic is independent of terminal size;
/// the display layer scales to cells.

use rand::Rng;

use crate::entities::{
    Collectible, Difficulty, EffectKind, Enemy, GamePhase, GameState, Player, PlayerAction,
    ScheduledEffect,
};

// ── Field geometry ───────────────────────────────────────────────────────────

/// Width of the virtual play field; the oni spawns at its right edge.
pub const FIELD_WIDTH: i32 = 800;

const PLAYER_SPAWN_X: i32 = 80;
const PLAYER_STEP: i32 = 40;
/// The player may roam the left half of the field only.
const PLAYER_MAX_X: i32 = FIELD_WIDTH / 2 - PLAYER_WIDTH;
const PLAYER_WIDTH: i32 = 60;
const PLAYER_HEIGHT: i32 = 100;
const SLIDE_HEIGHT: i32 = 50;
const ENEMY_WIDTH: i32 = 60;
const ENEMY_HEIGHT: i32 = 80;
const COLLECT_SIZE: i32 = 30;
const COLLECT_SPEED: i32 = 9;
const COLLECT_MAX_Y: i32 = 140;

// ── Collision tuning ─────────────────────────────────────────────────────────

/// Both boxes shrink inward by this much before the damage overlap test.
const HIT_MARGIN: i32 = 20;
/// A jumping player's bottom edge must sit within this many units above the
/// oni's top edge to count as a landing.
const TOP_LAND_WINDOW: i32 = 30;
/// Minimum horizontal overlap, on each side, for a landing.
const TOP_LAND_OVERLAP: i32 = 20;

// ── Timing (frames, ~30 FPS) ─────────────────────────────────────────────────

const JUMP_TICKS: u32 = 21; // ≈700 ms airborne
const JUMP_HEIGHT: i32 = 150;
const SLIDE_TICKS: u32 = 15; // ≈500 ms low profile
const ABILITY_TICKS: u32 = 90; // 3 s shadow-clone window
const GRACE_TICKS: u32 = 30; // 1 s post-hit grace
const RESPAWN_TICKS: u32 = 30; // 1 s until the oni re-enters
const LEVEL_FLASH_TICKS: u32 = 45;
const BONUS_STAGGER_TICKS: u32 = 15; // ≈500 ms between level-up scrolls
const BONUS_SCROLLS: u32 = 3;

// ── Chakra ───────────────────────────────────────────────────────────────────

const CHAKRA_MAX: f32 = 100.0;
const CHAKRA_REGEN: f32 = 0.2;
const CHAKRA_PICKUP: f32 = 20.0;
const ABILITY_COST: f32 = 30.0;

// ── Difficulty tables ────────────────────────────────────────────────────────

fn base_enemy_speed(difficulty: Difficulty) -> i32 {
    match difficulty {
        Difficulty::Easy => 7,
        Difficulty::Normal => 10,
        Difficulty::Hard => 14,
    }
}

/// Effective oni speed: grows one unit per level past the first, capped at
/// double the difficulty's base.
fn enemy_speed(difficulty: Difficulty, level: u32) -> i32 {
    let base = base_enemy_speed(difficulty);
    (base + level.saturating_sub(1) as i32).min(base * 2)
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build a fresh session for one run: full lives and chakra, zero score, the
/// player at the spawn point, the oni entering from the right edge, no
/// in-flight effects.  Phase starts at `Playing`.
pub fn init_state(
    difficulty: Difficulty,
    width: u16,
    height: u16,
    high_score: u32,
) -> GameState {
    GameState {
        player: Player {
            x: PLAYER_SPAWN_X,
            y: 0,
            action: PlayerAction::Idle,
            action_ticks: 0,
            invincible: false,
        },
        enemy: Enemy {
            x: FIELD_WIDTH,
            speed: enemy_speed(difficulty, 1),
            active: true,
        },
        collectibles: Vec::new(),
        effects: Vec::new(),
        score: 0,
        high_score,
        level: 1,
        lives: 3,
        chakra: CHAKRA_MAX,
        ability_active: false,
        damage_grace: false,
        new_record: false,
        level_flash: 0,
        phase: GamePhase::Playing,
        difficulty,
        frame: 0,
        width,
        height,
    }
}

// ── Input-driven state transitions (pure) ────────────────────────────────────

/// Start a jump.  One-shot: ignored unless the player is idle, so holding the
/// key cannot restart the arc mid-air.
pub fn player_jump(state: &GameState) -> GameState {
    if state.player.action != PlayerAction::Idle {
        return state.clone();
    }
    GameState {
        player: Player {
            action: PlayerAction::Jumping,
            action_ticks: 0,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

/// Duck into a slide.  Same one-shot guard as the jump.
pub fn player_slide(state: &GameState) -> GameState {
    if state.player.action != PlayerAction::Idle {
        return state.clone();
    }
    GameState {
        player: Player {
            action: PlayerAction::Sliding,
            action_ticks: 0,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

pub fn move_player_left(state: &GameState) -> GameState {
    let new_x = (state.player.x - PLAYER_STEP).max(0);
    GameState {
        player: Player {
            x: new_x,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

pub fn move_player_right(state: &GameState) -> GameState {
    let new_x = (state.player.x + PLAYER_STEP).min(PLAYER_MAX_X);
    GameState {
        player: Player {
            x: new_x,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

/// Activate the shadow clone: costs 30 chakra, grants invincibility for the
/// 3-second window.  A no-op while the window is already open or when chakra
/// is short — the caller cannot stack clones.
pub fn activate_ability(state: &GameState) -> GameState {
    if state.ability_active || state.chakra < ABILITY_COST {
        return state.clone();
    }
    let mut s = state.clone();
    s.chakra -= ABILITY_COST;
    s.ability_active = true;
    s.player.invincible = true;
    s.effects.push(ScheduledEffect {
        kind: EffectKind::AbilityExpire,
        remaining: ABILITY_TICKS,
    });
    s
}

// ── Phase transitions ────────────────────────────────────────────────────────

/// `Playing → Paused`; a no-op from any other phase.
pub fn pause_game(state: &GameState) -> GameState {
    if state.phase != GamePhase::Playing {
        return state.clone();
    }
    GameState {
        phase: GamePhase::Paused,
        ..state.clone()
    }
}

/// `Paused → Playing`; a no-op from any other phase.
pub fn resume_game(state: &GameState) -> GameState {
    if state.phase != GamePhase::Paused {
        return state.clone();
    }
    GameState {
        phase: GamePhase::Playing,
        ..state.clone()
    }
}

/// The wall-clock passive-progress driver: +1 score while playing.  Called by
/// main on its own 2-second deadline, never from `tick`.
pub fn auto_score(state: &GameState) -> GameState {
    if state.phase != GamePhase::Playing {
        return state.clone();
    }
    GameState {
        score: state.score + 1,
        ..state.clone()
    }
}

// ── Collision evaluator ──────────────────────────────────────────────────────

/// Axis-aligned bounding box.  `y` is the bottom edge, measured up from the
/// ground.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Aabb {
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn top(&self) -> i32 {
        self.y + self.h
    }
}

pub fn player_box(player: &Player) -> Aabb {
    let h = if player.action == PlayerAction::Sliding {
        SLIDE_HEIGHT
    } else {
        PLAYER_HEIGHT
    };
    Aabb {
        x: player.x,
        y: player.y,
        w: PLAYER_WIDTH,
        h,
    }
}

pub fn enemy_box(enemy: &Enemy) -> Aabb {
    Aabb {
        x: enemy.x,
        y: 0,
        w: ENEMY_WIDTH,
        h: ENEMY_HEIGHT,
    }
}

pub fn collectible_box(c: &Collectible) -> Aabb {
    Aabb {
        x: c.x,
        y: c.y,
        w: COLLECT_SIZE,
        h: COLLECT_SIZE,
    }
}

/// Strict overlap test after shrinking both boxes inward by `margin`.
pub fn boxes_overlap(a: &Aabb, b: &Aabb, margin: i32) -> bool {
    a.x + margin < b.right() - margin
        && b.x + margin < a.right() - margin
        && a.y + margin < b.top() - margin
        && b.y + margin < a.top() - margin
}

/// The landing sub-case: a jumping player whose bottom edge sits within
/// `TOP_LAND_WINDOW` units above the oni's top edge, with at least
/// `TOP_LAND_OVERLAP` units of horizontal overlap on each side.  Checked
/// before the damage test and short-circuits it.
pub fn landed_on_top(player: &Aabb, enemy: &Aabb, action: PlayerAction) -> bool {
    action == PlayerAction::Jumping
        && player.y >= enemy.top()
        && player.y <= enemy.top() + TOP_LAND_WINDOW
        && player.right() - enemy.x >= TOP_LAND_OVERLAP
        && enemy.right() - player.x >= TOP_LAND_OVERLAP
}

// ── Per-frame tick (nearly pure — RNG is injected) ───────────────────────────

/// Height of the jump arc after `t` frames: a symmetric parabola peaking at
/// `JUMP_HEIGHT` halfway through `JUMP_TICKS`.
fn jump_arc(t: u32) -> i32 {
    let t = t as i32;
    let d = JUMP_TICKS as i32;
    4 * JUMP_HEIGHT * t * (d - t) / (d * d)
}

/// Take the oni out of play and schedule its re-entry.  While inactive it
/// neither moves, collides, nor scores, which is what makes every pass and
/// every hit count at most once.
fn retire_enemy(s: &mut GameState) {
    s.enemy.active = false;
    s.effects.push(ScheduledEffect {
        kind: EffectKind::EnemyRespawn,
        remaining: RESPAWN_TICKS,
    });
}

fn apply_effect(s: &mut GameState, kind: EffectKind, rng: &mut impl Rng) {
    match kind {
        EffectKind::AbilityExpire => {
            s.ability_active = false;
            s.player.invincible = s.damage_grace;
        }
        EffectKind::GraceExpire => {
            s.damage_grace = false;
            s.player.invincible = s.ability_active;
        }
        EffectKind::EnemyRespawn => {
            s.enemy = Enemy {
                x: FIELD_WIDTH,
                speed: enemy_speed(s.difficulty, s.level),
                active: true,
            };
        }
        EffectKind::SpawnBonus => {
            s.collectibles.push(Collectible {
                x: FIELD_WIDTH,
                y: rng.gen_range(0..=COLLECT_MAX_Y),
            });
        }
    }
}

/// Advance the simulation by one frame.  All randomness comes through `rng`
/// so callers control determinism (useful for tests with a seeded RNG).
///
/// The caller gates on phase — `tick` is only meaningful while `Playing` —
/// and the death frame returns early so nothing spawns or scores after the
/// transition to `GameOver`.
pub fn tick(state: &GameState, rng: &mut impl Rng) -> GameState {
    let mut s = state.clone();
    s.frame += 1;

    // ── 1. Chakra regeneration ───────────────────────────────────────────────
    s.chakra = (s.chakra + CHAKRA_REGEN).min(CHAKRA_MAX);

    // ── 2. Advance the player's jump / slide arc ─────────────────────────────
    match s.player.action {
        PlayerAction::Jumping => {
            s.player.action_ticks += 1;
            if s.player.action_ticks >= JUMP_TICKS {
                s.player.action = PlayerAction::Idle;
                s.player.action_ticks = 0;
                s.player.y = 0;
            } else {
                s.player.y = jump_arc(s.player.action_ticks);
            }
        }
        PlayerAction::Sliding => {
            s.player.action_ticks += 1;
            if s.player.action_ticks >= SLIDE_TICKS {
                s.player.action = PlayerAction::Idle;
                s.player.action_ticks = 0;
            }
        }
        PlayerAction::Idle => {}
    }

    // ── 3. Advance the oni ───────────────────────────────────────────────────
    if s.enemy.active {
        s.enemy.x -= s.enemy.speed;
    }

    // ── 4. Advance collectibles, dropping the ones fully off-screen ──────────
    for c in &mut s.collectibles {
        c.x -= COLLECT_SPEED;
    }
    s.collectibles.retain(|c| c.x + COLLECT_SIZE > 0);

    // ── 5. Age scheduled effects and fire the expired ones ───────────────────
    let mut fired: Vec<EffectKind> = Vec::new();
    s.effects = s
        .effects
        .iter()
        .filter_map(|e| {
            if e.remaining <= 1 {
                fired.push(e.kind);
                None
            } else {
                Some(ScheduledEffect {
                    kind: e.kind,
                    remaining: e.remaining - 1,
                })
            }
        })
        .collect();
    for kind in fired {
        apply_effect(&mut s, kind, rng);
    }

    // ── 6. Collisions with the oni — landing first, then damage ──────────────
    if s.enemy.active {
        let p_box = player_box(&s.player);
        let e_box = enemy_box(&s.enemy);
        if landed_on_top(&p_box, &e_box, s.player.action) {
            s.score += 1;
            retire_enemy(&mut s);
        } else if !s.player.invincible && boxes_overlap(&p_box, &e_box, HIT_MARGIN) {
            s.lives = s.lives.saturating_sub(1);
            s.damage_grace = true;
            s.player.invincible = true;
            s.effects.push(ScheduledEffect {
                kind: EffectKind::GraceExpire,
                remaining: GRACE_TICKS,
            });
            retire_enemy(&mut s);
            if s.lives == 0 {
                s.phase = GamePhase::GameOver;
                s.new_record = s.score > s.high_score;
                if s.new_record {
                    s.high_score = s.score;
                }
                return s;
            }
        }
    }

    // ── 7. Pass-avoidance: the oni made it fully past the left edge ──────────
    if s.enemy.active && s.enemy.x + ENEMY_WIDTH < 0 {
        s.score += 10;
        retire_enemy(&mut s);
    }

    // ── 8. Scroll pickups ────────────────────────────────────────────────────
    let p_box = player_box(&s.player);
    let mut picked: u32 = 0;
    s.collectibles.retain(|c| {
        if boxes_overlap(&p_box, &collectible_box(c), 0) {
            picked += 1;
            false
        } else {
            true
        }
    });
    if picked > 0 {
        s.score += 5 * picked;
        s.chakra = (s.chakra + CHAKRA_PICKUP * picked as f32).min(CHAKRA_MAX);
    }

    // ── 9. Random scroll spawn at the right edge ─────────────────────────────
    if rng.gen_ratio(1, 100) {
        s.collectibles.push(Collectible {
            x: FIELD_WIDTH,
            y: rng.gen_range(0..=COLLECT_MAX_Y),
        });
    }

    // ── 10. Level: derived from score, announced on every increase ───────────
    let level = s.score / 10 + 1;
    if level > s.level {
        s.level_flash = LEVEL_FLASH_TICKS;
        for i in 1..=BONUS_SCROLLS {
            s.effects.push(ScheduledEffect {
                kind: EffectKind::SpawnBonus,
                remaining: BONUS_STAGGER_TICKS * i,
            });
        }
    }
    s.level = level;

    // ── 11. Fade the level-up banner ─────────────────────────────────────────
    s.level_flash = s.level_flash.saturating_sub(1);

    s
}
