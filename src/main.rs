//! Terminal demo for scroll-driven keyframe animation.
//!
//! Run the binary to scroll through a few animated sections.
//! Run with `--headless` to print the animated values frame by frame.

mod app;
mod ui;

use std::io::{self, stderr, Stderr, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use scroll_keyframes::config::EngineConfig;
use scroll_keyframes::{Axis, Easing, ManualClock, SystemClock};
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    keys::Bindings,
    scene::Scene,
    state::DemoState,
};
use crate::ui::{layout::DemoLayout, readout::ReadoutWidget, stage::StageWidget, theme::Theme};

/// Frame interval for both the TUI and the headless simulation.
const FRAME: Duration = Duration::from_millis(16);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Scroll-driven keyframe animation demo")]
struct Cli {
    /// Config file (defaults to `$XDG_CONFIG_HOME/scroll-keyframes/config.toml`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scroll axis (`x` or `y`), overriding the config file.
    #[arg(long)]
    axis: Option<Axis>,

    /// Animator update interval in milliseconds; `0` disables throttling.
    #[arg(long = "throttle-ms")]
    throttle_ms: Option<u64>,

    /// Keyframe easing (`linear`, `ease-in`, `ease-out`, `ease-in-out`).
    #[arg(long)]
    easing: Option<Easing>,

    /// Print animated values per frame instead of opening the TUI.
    #[arg(long)]
    headless: bool,

    /// Frames to simulate in headless mode.
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Viewport width in headless mode.
    #[arg(long, default_value_t = 80)]
    width: u16,

    /// Viewport height in headless mode.
    #[arg(long, default_value_t = 24)]
    height: u16,
}

impl Cli {
    /// Config file values with command-line overrides applied.
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load_from(path)?,
            None => EngineConfig::load(),
        };
        if let Some(axis) = self.axis {
            config.scroll_axis = axis;
        }
        if let Some(ms) = self.throttle_ms {
            config.throttle_ms = ms;
        }
        if let Some(easing) = self.easing {
            config.easing = easing;
        }
        Ok(config)
    }
}

// ───────────────────────────────────────── headless ──────────

/// Scroll from top to bottom on a manual clock, printing one line per frame.
fn run_headless(cli: &Cli, config: &EngineConfig) -> Result<()> {
    let clock = Rc::new(ManualClock::new());
    let scene = Scene::new(
        config.container_options(),
        config.animator_options(),
        clock.clone(),
    )?;
    let bindings = Bindings::from_table(config.key_table());
    let mut state = DemoState::new(scene, bindings, config.scroll_step);
    state.resize(cli.width, cli.height)?;
    state.scroll_to(f64::INFINITY);

    let mut out = io::stdout().lock();
    for frame in 0..cli.frames {
        clock.advance(FRAME);
        state.advance();
        let snapshot = state.scene.frame();
        write!(
            out,
            "{frame:>4} pos={:>7.2} progress={:.3} velocity={:>7.1}",
            snapshot.position, snapshot.progress, snapshot.velocity
        )?;
        for item in &snapshot.items {
            let values: Vec<String> = item
                .values
                .iter()
                .map(|(property, value)| format!("{}={}", property.name(), value.to_css_for(property)))
                .collect();
            write!(out, " | {} {}", item.kind.id(), values.join(" "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

// ───────────────────────────────────────── TUI ───────────────

fn viewport_for(width: u16, height: u16) -> Rect {
    DemoLayout::from_area(Rect::new(0, 0, width, height)).viewport()
}

fn draw(frame: &mut Frame, state: &DemoState) {
    let layout = DemoLayout::from_area(frame.area());
    let snapshot = state.scene.frame();

    let stage_block = Block::default()
        .title(format!(" scroll · {} · {} ", snapshot.axis, snapshot.easing))
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());
    frame.render_widget(StageWidget::new(&snapshot).block(stage_block), layout.stage_area);

    let readout_block = Block::default()
        .title(" state ")
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());
    frame.render_widget(
        ReadoutWidget::new(&snapshot, &state.bindings).block(readout_block),
        layout.readout_area,
    );

    let hint = state.bindings.status_bar_hint();
    let status_text = state.status_message.as_deref().unwrap_or(&hint);
    let status = Paragraph::new(status_text).style(Theme::status_bar_style());
    frame.render_widget(status, layout.status_area);
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    state: &mut DemoState,
) -> Result<()> {
    let size = terminal.size()?;
    let viewport = viewport_for(size.width, size.height);
    state.resize(viewport.width, viewport.height)?;

    let mut events = spawn_event_reader();
    let mut frames = tokio::time::interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Frames only run while something moves or a trailing update is pending.
    let mut animating = true;

    loop {
        terminal.draw(|frame| draw(frame, state))?;

        let wants_frame = animating || state.scene.next_deadline().is_some();
        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(state, m),
                    AppEvent::Resize(w, h) => {
                        let viewport = viewport_for(w, h);
                        state.resize(viewport.width, viewport.height)?;
                    }
                }
                animating = true;
            }

            _ = frames.tick(), if wants_frame => {
                animating = state.advance();
            }

            else => break,
        }

        if state.should_quit {
            break;
        }
    }
    Ok(())
}

async fn run_tui(config: &EngineConfig) -> Result<()> {
    let scene = Scene::new(
        config.container_options(),
        config.animator_options(),
        Rc::new(SystemClock),
    )?;
    let bindings = Bindings::from_table(config.key_table());
    let mut state = DemoState::new(scene, bindings, config.scroll_step);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let outcome = event_loop(&mut terminal, &mut state).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    outcome
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();
    let config = cli.engine_config().context("loading configuration")?;
    info!(
        axis = %config.scroll_axis,
        throttle_ms = config.throttle_ms,
        easing = %config.easing,
        "starting"
    );

    if cli.headless {
        return run_headless(&cli, &config);
    }
    run_tui(&config).await
}
