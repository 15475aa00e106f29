//! Colour palette and text styles used across the UI.

use palette::{Mix, Srgb, Srgba};
use ratatui::style::{Color, Modifier, Style};

/// Background the stage is drawn on; faded content mixes towards it.
pub const STAGE_BG: (u8, u8, u8) = (18, 18, 24);
const SECTION_BG: (u8, u8, u8) = (48, 52, 64);
const SECTION_FG: (u8, u8, u8) = (230, 230, 235);

/// Central theme: change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── stage ──────────────────────────────────────────────────
    pub fn stage_style() -> Style {
        Style::default().bg(rgb(STAGE_BG))
    }

    /// Section fill: the animated background colour when there is one,
    /// faded towards the stage by `opacity`.
    pub fn section_style(background: Option<Srgba>, opacity: f64) -> Style {
        let bg = background.map_or(SECTION_BG, to_rgb8);
        Style::default()
            .bg(fade(bg, opacity))
            .fg(fade(SECTION_FG, opacity))
    }

    pub fn section_title_style(opacity: f64) -> Style {
        Style::default()
            .fg(fade(SECTION_FG, opacity))
            .add_modifier(Modifier::BOLD)
    }

    // ── readout ────────────────────────────────────────────────
    pub fn label_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn value_style() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn active_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

/// 8-bit channels of an animated colour, alpha composited over the stage.
fn to_rgb8(color: Srgba) -> (u8, u8, u8) {
    let over = stage_linear();
    let lin = color.color.into_linear().mix(over, 1.0 - color.alpha.clamp(0.0, 1.0));
    let out: Srgb<u8> = Srgb::from_linear(lin);
    (out.red, out.green, out.blue)
}

/// `base` mixed towards the stage background; opacity 1 leaves it alone.
fn fade(base: (u8, u8, u8), opacity: f64) -> Color {
    let opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
    if opacity >= 1.0 {
        return rgb(base);
    }
    if opacity <= 0.0 {
        return rgb(STAGE_BG);
    }
    let (r, g, b) = base;
    let lin = Srgb::new(r, g, b)
        .into_linear::<f32>()
        .mix(stage_linear(), 1.0 - opacity as f32);
    let out: Srgb<u8> = Srgb::from_linear(lin);
    rgb((out.red, out.green, out.blue))
}

fn stage_linear() -> palette::LinSrgb {
    let (r, g, b) = STAGE_BG;
    Srgb::new(r, g, b).into_linear()
}
