mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;

use ninja_dash::compute::{
    activate_ability, auto_score, init_state, move_player_left, move_player_right, pause_game,
    player_jump, player_slide, resume_game, tick,
};
use ninja_dash::config::{self, Settings};
use ninja_dash::entities::{Difficulty, GamePhase, GameState};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Passive-progress cadence: +1 score on this wall-clock interval while
/// playing.  Deliberately a separate driver from the frame loop — it is
/// stopped on pause and restarted from zero on resume.
const AUTO_SCORE_INTERVAL: Duration = Duration::from_millis(2000);

/// Splash screen dwell before the menu appears.
const SPLASH: Duration = Duration::from_millis(1200);

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// Min frames between player movements while a direction key is held.
/// 3 frames @ 30 FPS ≈ 10 moves/sec (≈ normal OS key-repeat feel).
const MOVE_COOLDOWN: u32 = 3;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── Loading splash ────────────────────────────────────────────────────────────

fn show_splash<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let lines: &[(&str, Color)] = &[
        ("⚡  N I N J A   D A S H  ⚡", Color::Cyan),
        ("", Color::White),
        ("— loading —", Color::DarkGrey),
    ];
    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = cy.saturating_sub(2) + i as u16;
        out.queue(cursor::MoveTo(
            cx.saturating_sub(msg.chars().count() as u16 / 2),
            row,
        ))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    out.queue(style::ResetColor)?;
    out.flush()?;

    thread::sleep(SPLASH);
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn draw_menu<W: Write>(
    out: &mut W,
    high_score: u32,
    settings: &Settings,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "⚡  N I N J A   D A S H  ⚡";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(8),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    // High score display
    if high_score > 0 {
        let hs_str = format!("Best Score: {}", high_score);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs_str.chars().count() as u16 / 2),
            cy.saturating_sub(7),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy.saturating_sub(5)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Difficulty (saved between runs):"))?;

    let options: &[(&str, Difficulty, &str, Color, &str)] = &[
        ("1", Difficulty::Easy, "Easy  ", Color::Green, "A leisurely oni"),
        ("2", Difficulty::Normal, "Normal", Color::Yellow, "Balanced challenge"),
        ("3", Difficulty::Hard, "Hard  ", Color::Red, "Fast and relentless!"),
    ];

    for (i, (key, diff, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(3) + i as u16;
        let marker = if settings.difficulty == *diff { "▸" } else { " " };
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(marker))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" [{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" — {}", desc)))?;
    }

    // Volume settings
    let vol = |v: f32| format!("{:>3.0}%", v * 100.0);
    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 1))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print(format!(
        "  [-/+] SFX volume   {}    [[/]] Music volume {}",
        vol(settings.sfx_volume),
        vol(settings.music_volume)
    )))?;

    // What to chase, what to dodge
    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 3))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("On the field:"))?;

    let legend: &[(&str, Color, &str)] = &[
        ("§", Color::Cyan, " Scroll — +5 score, +20 chakra"),
        ("Ω", Color::Red, " Oni    — jump it (+10), land on it (+1), touch it (-1 life)"),
        ("✦", Color::Yellow, " Clone  — C key, 30 chakra, 3 s of invincibility"),
    ];
    for (i, (sym, color, desc)) in legend.iter().enumerate() {
        let row = cy + 4 + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*sym))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*desc))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 8))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("ENTER / SPACE : Start   Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

/// Block until the user starts a run or quits.  Difficulty and volume edits
/// are persisted immediately.
fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    high_score: u32,
    settings: &mut Settings,
) -> std::io::Result<MenuResult> {
    loop {
        draw_menu(out, high_score, settings)?;

        let ev = match rx.recv() {
            Ok(ev) => ev,
            Err(_) => return Ok(MenuResult::Quit), // reader thread gone
        };
        let Event::Key(KeyEvent { code, kind, .. }) = ev else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }
        match code {
            KeyCode::Char('1') => {
                settings.difficulty = Difficulty::Easy;
                config::save_settings(settings);
            }
            KeyCode::Char('2') => {
                settings.difficulty = Difficulty::Normal;
                config::save_settings(settings);
            }
            KeyCode::Char('3') => {
                settings.difficulty = Difficulty::Hard;
                config::save_settings(settings);
            }
            KeyCode::Char('-') => {
                settings.sfx_volume = (settings.sfx_volume - 0.1).max(0.0);
                config::save_settings(settings);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                settings.sfx_volume = (settings.sfx_volume + 0.1).min(1.0);
                config::save_settings(settings);
            }
            KeyCode::Char('[') => {
                settings.music_volume = (settings.music_volume - 0.1).max(0.0);
                config::save_settings(settings);
            }
            KeyCode::Char(']') => {
                settings.music_volume = (settings.music_volume + 0.1).min(1.0);
                config::save_settings(settings);
            }
            KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                return Ok(MenuResult::Quit);
            }
            _ => {}
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Menu,
    Retry,
}

/// Drive one run until the player quits, retries, or backs out to the menu.
///
/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which keys are still "fresh"
/// (within `HOLD_WINDOW` frames) and apply movement for all of them, so a
/// held arrow keeps the ninja drifting while jump/slide/clone stay one-shot
/// press actions.
///
/// The frame loop itself never stops while paused — it keeps rendering and
/// simply skips `tick` unless the phase is `Playing`.  The auto-score
/// deadline, by contrast, is reset on resume so its 2-second cadence always
/// measures uninterrupted play.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<LoopExit> {
    let mut rng = thread_rng();

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut move_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let mut last_auto = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::FocusLost => {
                    *state = pause_game(state);
                }
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    // Press: record key + handle one-shot actions
                    KeyEventKind::Press => {
                        key_frame.insert(code.clone(), frame);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') => {
                                return Ok(LoopExit::Quit);
                            }
                            KeyCode::Char('c')
                                if modifiers.contains(KeyModifiers::CONTROL) =>
                            {
                                return Ok(LoopExit::Quit);
                            }
                            KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P') => {
                                match state.phase {
                                    GamePhase::Playing => *state = pause_game(state),
                                    GamePhase::Paused => {
                                        *state = resume_game(state);
                                        last_auto = Instant::now();
                                    }
                                    _ => {}
                                }
                            }
                            KeyCode::Up if state.phase == GamePhase::Playing => {
                                *state = player_jump(state);
                            }
                            KeyCode::Char(' ') => match state.phase {
                                GamePhase::Playing => *state = player_jump(state),
                                GamePhase::Paused => {
                                    *state = resume_game(state);
                                    last_auto = Instant::now();
                                }
                                _ => {}
                            },
                            KeyCode::Down if state.phase == GamePhase::Playing => {
                                *state = player_slide(state);
                            }
                            KeyCode::Char('c') | KeyCode::Char('C')
                                if state.phase == GamePhase::Playing =>
                            {
                                *state = activate_ability(state);
                            }
                            KeyCode::Char('r') | KeyCode::Char('R')
                                if state.phase == GamePhase::GameOver =>
                            {
                                return Ok(LoopExit::Retry);
                            }
                            KeyCode::Char('m') | KeyCode::Char('M')
                                if state.phase == GamePhase::GameOver =>
                            {
                                return Ok(LoopExit::Menu);
                            }
                            _ => {}
                        }
                    }
                    // Repeat: refresh timestamp so key stays "held"
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    // Release: remove key immediately (keyboard-enhancement path)
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                _ => {}
            }
        }

        // ── Apply held-key movement every frame ───────────────────────────────
        if state.phase == GamePhase::Playing {
            let left = is_held(&key_frame, &KeyCode::Left, frame);
            let right = is_held(&key_frame, &KeyCode::Right, frame);

            // Throttled so the ninja doesn't teleport
            if move_cooldown == 0 {
                if left {
                    *state = move_player_left(state);
                    move_cooldown = MOVE_COOLDOWN;
                } else if right {
                    *state = move_player_right(state);
                    move_cooldown = MOVE_COOLDOWN;
                }
            }
        }
        move_cooldown = move_cooldown.saturating_sub(1);

        // ── Auto score: the independent wall-clock driver ─────────────────────
        if state.phase == GamePhase::Playing && last_auto.elapsed() >= AUTO_SCORE_INTERVAL {
            *state = auto_score(state);
            last_auto = Instant::now();
        }

        // ── Frame tick: inert unless playing ──────────────────────────────────
        if state.phase == GamePhase::Playing {
            *state = tick(state, &mut rng);
        }

        display::render(out, state)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableFocusChange)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break; // receiver dropped → program exiting
                    }
                }
                Err(_) => break,
            }
        }
    });

    let result = run(&mut out, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableFocusChange);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let mut high_score = config::load_high_score();
    let mut settings = config::load_settings();

    // Loading → Menu after the splash dwell
    show_splash(out)?;

    'menu: loop {
        match show_menu(out, rx, high_score, &mut settings)? {
            MenuResult::Quit => break,
            MenuResult::Start => loop {
                let (width, height) = terminal::size()?;
                let mut state = init_state(settings.difficulty, width, height, high_score);
                let exit = game_loop(out, &mut state, rx)?;

                // `tick` lifts `high_score` at game over when beaten; persist
                // the record here, once per run.
                if state.high_score > high_score {
                    high_score = state.high_score;
                    config::save_high_score(high_score);
                }

                match exit {
                    LoopExit::Quit => break 'menu,
                    LoopExit::Menu => continue 'menu,
                    LoopExit::Retry => {} // straight into the next run
                }
            },
        }
    }
    Ok(())
}
