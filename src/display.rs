/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// state into terminal commands, scaling virtual field units to cells.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use ninja_dash::compute::FIELD_WIDTH;
use ninja_dash::entities::{
    Collectible, Difficulty, EffectKind, Enemy, GamePhase, GameState, PlayerAction,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_GROUND: Color = Color::DarkGreen;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_PLAYER_CLONE: Color = Color::Yellow;
const C_ENEMY: Color = Color::Red;
const C_SCROLL: Color = Color::Cyan;
const C_CHAKRA: Color = Color::Blue;
const C_BANNER: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

/// Virtual units per terminal row when mapping heights.
const UNITS_PER_ROW: i32 = 25;

// ── Coordinate mapping ────────────────────────────────────────────────────────

/// Virtual x → terminal column inside the border.
fn col_for(state: &GameState, x: i32) -> u16 {
    let inner = state.width.saturating_sub(2) as i32;
    let col = 1 + x * inner / FIELD_WIDTH;
    col.clamp(1, inner.max(1)) as u16
}

/// Last playable row, just above the ground line.
fn ground_row(state: &GameState) -> u16 {
    state.height.saturating_sub(3)
}

/// Virtual height above ground → terminal row.
fn row_for(state: &GameState, y: i32) -> u16 {
    ground_row(state).saturating_sub((y / UNITS_PER_ROW) as u16)
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, state)?;
    draw_hud(out, state)?;

    for scroll in &state.collectibles {
        draw_scroll(out, state, scroll)?;
    }
    if state.enemy.active {
        draw_enemy(out, state, &state.enemy)?;
    }
    draw_player(out, state)?;
    draw_status_row(out, state)?;

    if state.level_flash > 0 {
        draw_level_banner(out, state)?;
    }
    match state.phase {
        GamePhase::Paused => draw_paused(out, state)?,
        GamePhase::GameOver => draw_game_over(out, state)?,
        _ => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, state.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border & ground ───────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let w = state.width as usize;
    let h = state.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1 — top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(state.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    // Row h-2 — the ground the ninja runs on
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(style::SetForegroundColor(C_GROUND))?;
    out.queue(Print(format!("└{}┘", "▔".repeat(w.saturating_sub(2)))))?;

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    // Score + best — left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Score:{:>6}  Best:{:>6}",
        state.score, state.high_score
    )))?;

    // Difficulty + level — centre
    let diff_str = match state.difficulty {
        Difficulty::Easy => "EASY",
        Difficulty::Normal => "NORMAL",
        Difficulty::Hard => "HARD",
    };
    let diff_color = match state.difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Normal => Color::Yellow,
        Difficulty::Hard => Color::Red,
    };
    let centre = format!("[ {} ]  Lv {}", diff_str, state.level);
    let lx = (state.width / 2).saturating_sub(centre.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(diff_color))?;
    out.queue(Print(&centre))?;

    // Clone-window countdown + lives — right side, right-aligned
    let clone_tag = if state.ability_active {
        let secs = state
            .effects
            .iter()
            .find(|e| e.kind == EffectKind::AbilityExpire)
            .map(|e| e.remaining / 30 + 1)
            .unwrap_or(0);
        format!("[✦ CLONE {:>1}s] ", secs)
    } else {
        String::new()
    };
    let hearts: String = "♥".repeat(state.lives as usize);
    let lives_str = format!("Lives:{}", hearts);
    let right_str = format!("{}{}", clone_tag, lives_str);

    let rx = state
        .width
        .saturating_sub(right_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    if !clone_tag.is_empty() {
        out.queue(style::SetForegroundColor(C_PLAYER_CLONE))?;
        out.queue(Print(&clone_tag))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let p = &state.player;
    let col = col_for(state, p.x);
    let base = row_for(state, p.y);

    // The clone window tints the ninja gold; the grace window leaves the
    // normal colour (the flicker would cost more than it tells).
    let color = if state.ability_active {
        C_PLAYER_CLONE
    } else {
        C_PLAYER
    };
    out.queue(style::SetForegroundColor(color))?;

    if p.action == PlayerAction::Sliding {
        // Low profile (1 row, 3 cols):  ▄█▄
        out.queue(cursor::MoveTo(col, base))?;
        out.queue(Print("▄█▄"))?;
    } else {
        // Upright sprite (2 rows, 3 cols):
        //   ◈      ← head
        //  ╱█╲     ← body
        if base > 2 {
            out.queue(cursor::MoveTo(col + 1, base - 1))?;
            out.queue(Print("◈"))?;
        }
        out.queue(cursor::MoveTo(col, base))?;
        out.queue(Print("╱█╲"))?;
    }

    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, state: &GameState, enemy: &Enemy) -> std::io::Result<()> {
    // Skip once it is out of the visible field (it stays live in the logic
    // until fully past the left edge).
    if enemy.x < 0 || enemy.x >= FIELD_WIDTH {
        return Ok(());
    }
    let col = col_for(state, enemy.x);
    let base = ground_row(state);

    // Oni sprite (2 rows, 3 cols):
    //   «Ω»    ← horns + face
    //   ╚╩╝    ← stance
    out.queue(style::SetForegroundColor(C_ENEMY))?;
    if base > 2 {
        out.queue(cursor::MoveTo(col, base - 1))?;
        out.queue(Print("«Ω»"))?;
    }
    out.queue(cursor::MoveTo(col, base))?;
    out.queue(Print("╚╩╝"))?;

    Ok(())
}

/// Draw a chakra scroll drifting toward the player.
fn draw_scroll<W: Write>(
    out: &mut W,
    state: &GameState,
    scroll: &Collectible,
) -> std::io::Result<()> {
    if scroll.x < 0 || scroll.x >= FIELD_WIDTH {
        return Ok(());
    }
    out.queue(cursor::MoveTo(
        col_for(state, scroll.x),
        row_for(state, scroll.y),
    ))?;
    out.queue(style::SetForegroundColor(C_SCROLL))?;
    out.queue(Print("§"))?;
    Ok(())
}

// ── Chakra bar + controls hint (last row) ─────────────────────────────────────

fn draw_status_row<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let row = state.height.saturating_sub(1);

    // 10-cell chakra bar, left
    let filled = (state.chakra / 10.0).round().clamp(0.0, 10.0) as usize;
    let bar = format!(
        "Chakra [{}{}] {:>3.0}%",
        "█".repeat(filled),
        "·".repeat(10 - filled),
        state.chakra
    );
    out.queue(cursor::MoveTo(1, row))?;
    out.queue(style::SetForegroundColor(C_CHAKRA))?;
    out.queue(Print(&bar))?;

    // Key hints, right of the bar
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "   ↑/SPACE Jump  ↓ Slide  ← → Move  C Clone  ESC Pause  Q Quit",
    ))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_level_banner<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let msg = format!("★ LEVEL {} ★", state.level);
    let col = (state.width / 2).saturating_sub(msg.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, 3))?;
    out.queue(style::SetForegroundColor(C_BANNER))?;
    out.queue(Print(&msg))?;
    Ok(())
}

fn draw_centered_lines<W: Write>(
    out: &mut W,
    state: &GameState,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let cx = state.width / 2;
    let start_row = (state.height / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

fn draw_paused<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    draw_centered_lines(
        out,
        state,
        &[
            ("╔══════════════╗", Color::Cyan),
            ("║    PAUSED    ║", Color::Cyan),
            ("╚══════════════╝", Color::Cyan),
            ("ESC - Resume   Q - Quit", Color::White),
        ],
    )
}

fn draw_game_over<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let score_line = format!("Final Score: {}", state.score);
    let best_line = format!("Best: {}", state.high_score);
    let mut lines: Vec<(&str, Color)> = vec![
        ("╔══════════════════╗", Color::Red),
        ("║    GAME  OVER    ║", Color::Red),
        ("╚══════════════════╝", Color::Red),
        (&score_line, Color::Yellow),
        (&best_line, Color::Yellow),
    ];
    if state.new_record {
        lines.push(("☆ NEW RECORD! ☆", Color::Magenta));
    }
    lines.push(("R - Retry   M - Menu   Q - Quit", Color::White));

    draw_centered_lines(out, state, &lines)
}
