//! Math Tiles entry point
//!
//! A minimal line-oriented terminal front end. Type a command and press
//! Enter (`play`, `tutorial`, `back`, `shop`, `buy skip`, `skip`, `restart`,
//! `quit`) or a number to answer. Esc or Ctrl-C quits. `--autoplay` runs a
//! demo player instead.

use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use math_tiles::game::{Command, Game, MenuOption, Screen, Snapshot};
use math_tiles::input::{KeyAction, LineInput, RawModeGuard, poll_keys};
use math_tiles::persistence::{JsonFileStore, SaveStore, data_dir};
use math_tiles::settings::Settings;

/// Command-line overrides
#[derive(Debug, Default)]
struct Args {
    seed: Option<u64>,
    save: Option<PathBuf>,
    autoplay: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => {
                let value = it.next().context("--seed needs a value")?;
                args.seed = Some(value.parse().context("--seed must be an integer")?);
            }
            "--save" => args.save = Some(it.next().context("--save needs a path")?.into()),
            "--autoplay" => args.autoplay = true,
            other => bail!("unknown argument '{other}'"),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let (settings, save_path) = resolve(&args, data_dir())?;

    log::info!("Math Tiles starting (save: {})", save_path.display());
    let game = Game::new(JsonFileStore::new(save_path), &settings);

    if args.autoplay {
        run_autoplay(game, &settings)
    } else {
        run_interactive(game, &settings)
    }
}

/// Settings and save path for this run. The data directory is only
/// required when neither `--save` nor the settings name a save file.
fn resolve(args: &Args, dir: Result<PathBuf>) -> Result<(Settings, PathBuf)> {
    let mut settings = match &dir {
        Ok(dir) => Settings::load(&dir.join(Settings::FILE_NAME)),
        Err(e) => {
            log::warn!("No data directory ({:#}), using default settings", e);
            Settings::default()
        }
    };
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    let save_path = match args.save.clone().or_else(|| settings.save_path.clone()) {
        Some(path) => path,
        None => dir?.join(JsonFileStore::FILE_NAME),
    };
    Ok((settings, save_path))
}

/// Fixed-rate loop: drain pending keys, advance one frame, redraw on change
fn run_interactive<S: SaveStore>(mut game: Game<S>, settings: &Settings) -> Result<()> {
    let _raw = RawModeGuard::enable()?;
    let mut out = io::stdout();
    let mut input = LineInput::new();

    let frame = Duration::from_secs_f32(settings.frame_dt());
    let mut last = Instant::now();
    let mut shown: Option<String> = None;

    while game.is_running() {
        let now = Instant::now();
        let dt = (now - last).as_secs_f32();
        last = now;

        let mut commands = Vec::new();
        let mut edited = false;
        for key in poll_keys()? {
            match input.feed(key) {
                KeyAction::Command(command) => commands.push(command),
                KeyAction::Rejected(e) => log::debug!("{}", e),
                KeyAction::Edited => edited = true,
                KeyAction::Ignored => {}
            }
        }
        let snapshot = game.frame(commands, dt);

        let view = render(&snapshot);
        if shown.as_deref() != Some(view.as_str()) {
            draw(&mut out, Some(&view), input.pending())?;
            shown = Some(view);
        } else if edited {
            draw(&mut out, None, input.pending())?;
        }
        game.drain_events();

        thread::sleep(frame.saturating_sub(now.elapsed()));
    }
    queue!(out, Print("\r\n"))?;
    out.flush()?;
    Ok(())
}

/// Rewrite the prompt line, printing `view` above it first. Raw mode needs
/// explicit carriage returns.
fn draw(out: &mut impl Write, view: Option<&str>, pending: &str) -> Result<()> {
    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    if let Some(view) = view {
        for line in view.lines() {
            queue!(out, Print(line), Print("\r\n"))?;
        }
    }
    queue!(out, Print("> "), Print(pending))?;
    out.flush()?;
    Ok(())
}

/// Demo player: answers after a short think, sometimes wrongly, and
/// shops when it can afford a shield. Plays one session, then quits.
fn run_autoplay<S: SaveStore>(mut game: Game<S>, settings: &Settings) -> Result<()> {
    let mut rng = Pcg32::seed_from_u64(settings.resolve_seed() ^ 0x5eed);
    let dt = settings.frame_dt();
    let mut think = 0.0f32;

    game.frame([Command::SelectMenu(MenuOption::Play)], 0.0);

    while game.is_running() {
        let snapshot = game.snapshot();
        let mut commands = Vec::new();

        if snapshot.game_over {
            log::info!("{}", serde_json::to_string(&snapshot)?);
            commands.push(Command::Quit);
        } else if snapshot.screen == Screen::Shop {
            commands.push(Command::Buy(math_tiles::sim::Item::Shield));
            commands.push(Command::ToggleShop);
        } else if snapshot.coins >= math_tiles::consts::COST_SHIELD {
            commands.push(Command::ToggleShop);
        } else if let Some(active) = &snapshot.active {
            think += dt;
            if think >= 1.5 {
                think = 0.0;
                let answer = game
                    .session()
                    .active_tile()
                    .map(|t| t.answer())
                    .unwrap_or_default();
                let pick = if rng.random_bool(0.85) {
                    answer
                } else {
                    active.choices[rng.random_range(0..active.choices.len())]
                };
                commands.push(Command::SubmitAnswer(pick));
            }
        }

        let snapshot = game.frame(commands, dt);
        for event in game.drain_events() {
            log::debug!("{:?}", event);
        }
        if !snapshot.game_over && snapshot.screen == Screen::Playing {
            log::trace!("{}", render(&snapshot));
        }
    }

    println!("High score: {}", game.record().high_score);
    Ok(())
}

/// Plain-text view of a snapshot
fn render(snapshot: &Snapshot) -> String {
    match snapshot.screen {
        Screen::Menu => "== MATH TILES ==  play | tutorial | quit".to_string(),
        Screen::Tutorial => {
            let mut text = String::from("== HOW TO PLAY ==\n");
            for line in snapshot.tutorial.unwrap_or_default() {
                text.push_str(line);
                text.push('\n');
            }
            text.push_str("(back)");
            text
        }
        Screen::Shop => {
            let mut text = format!("== SHOP ==  coins: {}\n", snapshot.coins);
            for tag in &snapshot.prices {
                text.push_str(&format!(
                    "  buy {:<7} cost {:>2}  (have {})\n",
                    tag.item,
                    tag.price,
                    snapshot.items.count(tag.item)
                ));
            }
            text.push_str("(shop to close)");
            text
        }
        Screen::Playing if snapshot.game_over => format!(
            "== GAME OVER ==  score {}  high score {}  (restart | quit)",
            snapshot.score, snapshot.high_score
        ),
        Screen::Playing => {
            let hud = format!(
                "score {}  lives {}  coins {}  high {}  skip x{}  shield x{}",
                snapshot.score,
                snapshot.lives,
                snapshot.coins,
                snapshot.high_score,
                snapshot.items.skip,
                snapshot.items.shield
            );
            match &snapshot.active {
                Some(active) => {
                    // Coarse fall bar so the view only changes every tenth
                    let filled = snapshot
                        .tiles
                        .first()
                        .map(|t| (t.progress * 10.0) as usize)
                        .unwrap_or(0);
                    format!(
                        "{hud}\n  {} = ?   [{:<10}]   {:?}",
                        active.problem,
                        "#".repeat(filled),
                        active.choices
                    )
                }
                None => format!("{hud}\n  (waiting for the next tile)"),
            }
        }
        Screen::Terminated => "Bye!".to_string(),
    }
}
