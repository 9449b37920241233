//! Terminal Example - Drive a player from the keyboard and mouse
//!
//! Runs a player on the simulated host with a fake three-minute video:
//! - Space / k: play or pause
//! - Left / Right: seek 5 s
//! - m: mute, f: fullscreen
//! - Click or drag on the bottom row: seek
//! - q: quit
//!
//! Run with: RUST_LOG=debug cargo run --example terminal

use std::io::{stdout, Write};
use std::rc::Rc;
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType};

use spark_player::input::{self, InputEvent, PointerPhase};
use spark_player::math::format_time;
use spark_player::sim::{SimHost, SimMedia, SimTrack, SimCue};
use spark_player::{MediaElement, Player, PlayerProps, Rect, Source};

const FRAME_MS: u64 = 100;

fn draw(player: &Player, width: u16) -> std::io::Result<()> {
    let media = player.video();
    let bar_width = usize::from(width.saturating_sub(40)).max(10);
    let filled = (player.progress().get() * bar_width as f64).round() as usize;

    let status = format!(
        "{} {} / {} [{}{}] vol {:>3}%{}{}",
        if player.is_playing().get() { "▶" } else { "⏸" },
        format_time(media.current_time()),
        format_time(media.duration()),
        "=".repeat(filled),
        "-".repeat(bar_width.saturating_sub(filled)),
        (player.volume().get() * 100.0).round(),
        if player.is_fullscreen().get() { " [full]" } else { "" },
        if player.show_controls().get() { "" } else { " (idle)" },
    );

    let mut out = stdout();
    execute!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    write!(out, "{status}")?;
    out.flush()
}

fn run(sim: &SimHost, media: &Rc<SimMedia>, player: &Player) -> std::io::Result<()> {
    let (mut width, mut height) = terminal::size()?;
    player.set_track_bounds(Rect::new(0.0, f64::from(height - 1), f64::from(width), 1.0));

    loop {
        if let Some(event) = input::poll_event(Duration::from_millis(FRAME_MS))? {
            match &event {
                InputEvent::Key(key) if key.key == "q" => return Ok(()),
                InputEvent::Resize(w, h) => {
                    (width, height) = (*w, *h);
                    player.set_track_bounds(Rect::new(0.0, f64::from(h - 1), f64::from(*w), 1.0));
                }
                InputEvent::Pointer(PointerPhase::Down, pointer)
                    if pointer.client_y >= f64::from(height - 1) =>
                {
                    player.seek_track().pointer_down(pointer);
                }
                InputEvent::Pointer(PointerPhase::Move, pointer) => {
                    player.playback().reveal_controls(false);
                    if pointer.client_y >= f64::from(height - 1) {
                        player.hover_track(pointer.client_x);
                    } else {
                        player.leave_track();
                    }
                }
                _ => {}
            }
            if let Some((name, payload)) = input::to_dom_event(&event) {
                sim.window.dispatch(name, &payload);
            }
        }

        media.tick(FRAME_MS as f64 / 1000.0);
        sim.advance(FRAME_MS, player, media);
        draw(player, width)?;
    }
}

fn main() -> std::io::Result<()> {
    env_logger::init();

    let sim = SimHost::new();
    let media = Rc::new(SimMedia::new(200.0));
    media.add_track(Rc::new(SimTrack::new("en", vec![Rc::new(SimCue::new("Hello"))])));

    let props = PlayerProps {
        sources: Some(Source::Url("demo.mp4".into())).into(),
        persistent_volume: Some(true).into(),
        ..Default::default()
    }
    .listen("ended", |_| log::info!("playback finished"));

    let player = match Player::new(props, media.clone(), sim.host()) {
        Ok(player) => player,
        Err(err) => {
            eprintln!("failed to create player: {err}");
            return Ok(());
        }
    };

    terminal::enable_raw_mode()?;
    input::enable_mouse()?;
    let result = run(&sim, &media, &player);
    input::disable_mouse()?;
    terminal::disable_raw_mode()?;
    println!();

    player.dispose();
    result
}
