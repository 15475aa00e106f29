//! Side pane listing live scroll state and each section's animated values.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};
use crate::app::keys::{Action, Bindings};

use crate::app::scene::SceneFrame;

use super::theme::Theme;

pub struct ReadoutWidget<'a> {
    frame: &'a SceneFrame,
    bindings: &'a Bindings,
    block: Option<Block<'a>>,
}

impl<'a> ReadoutWidget<'a> {
    pub fn new(frame: &'a SceneFrame, bindings: &'a Bindings) -> Self {
        Self {
            frame,
            bindings,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

fn row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<10}"), Theme::label_style()),
        Span::styled(value, Theme::value_style()),
    ])
}

impl Widget for ReadoutWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame = self.frame;
        let mut lines = vec![
            row("axis", frame.axis.to_string()),
            row(
                "position",
                format!("{:.1} / {:.0}", frame.position, frame.max_scroll_position),
            ),
            row("progress", format!("{:.3}", frame.progress)),
            row("velocity", format!("{:.1}", frame.velocity)),
            row("easing", frame.easing.to_string()),
            Line::raw(""),
        ];

        for item in &frame.items {
            let marker = if item.visible { "● " } else { "○ " };
            let style = if item.visible {
                Theme::active_style()
            } else {
                Theme::label_style()
            };
            lines.push(Line::from(Span::styled(
                format!("{marker}{}", item.kind.id()),
                style,
            )));
            for (property, value) in item.values.iter() {
                lines.push(row(
                    &format!("  {}", property.name()),
                    value.to_css_for(property),
                ));
            }
        }

        lines.push(Line::raw(""));
        for &action in Action::ALL {
            lines.push(row(action.label(), self.bindings.describe(action)));
        }

        let mut paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        if let Some(block) = self.block {
            paragraph = paragraph.block(block);
        }
        paragraph.render(area, buf);
    }
}
