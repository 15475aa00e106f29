//! Widget that draws the scene's sections at their scrolled, animated
//! positions.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use scroll_keyframes::{Axis, StyleProperty, StyleValue};

use crate::app::scene::{ItemFrame, SceneFrame};

use super::theme::Theme;

pub struct StageWidget<'a> {
    frame: &'a SceneFrame,
    block: Option<Block<'a>>,
}

impl<'a> StageWidget<'a> {
    pub fn new(frame: &'a SceneFrame) -> Self {
        Self { frame, block: None }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for StageWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let viewport = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        buf.set_style(viewport, Theme::stage_style());

        for item in &self.frame.items {
            if let Some(placed) = place(self.frame, item, viewport) {
                render_item(item, placed, buf);
            }
        }
    }
}

fn number(item: &ItemFrame, property: StyleProperty) -> Option<f64> {
    item.values.get(property).and_then(StyleValue::as_number)
}

/// Screen rect for `item`: scrolled along the axis, shifted and scaled
/// across it, clipped to `viewport`.
fn place(frame: &SceneFrame, item: &ItemFrame, viewport: Rect) -> Option<Rect> {
    let rect = item.rect?;
    let (mut x, mut y, mut width, mut height) = (rect.x, rect.y, rect.width, rect.height);
    match frame.axis {
        Axis::Y => {
            y -= frame.position;
            x += number(item, StyleProperty::TranslateX).unwrap_or(0.0);
            let scale = number(item, StyleProperty::ScaleX).unwrap_or(1.0).max(0.0);
            x += width * (1.0 - scale) / 2.0;
            width *= scale;
        }
        Axis::X => {
            x -= frame.position;
            y += number(item, StyleProperty::TranslateY).unwrap_or(0.0);
            let scale = number(item, StyleProperty::ScaleY).unwrap_or(1.0).max(0.0);
            y += height * (1.0 - scale) / 2.0;
            height *= scale;
        }
    }

    let left = x.round().max(0.0);
    let top = y.round().max(0.0);
    let right = (x + width).round().min(viewport.width as f64);
    let bottom = (y + height).round().min(viewport.height as f64);
    if !left.is_finite() || !top.is_finite() || right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(
        viewport.x + left as u16,
        viewport.y + top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    ))
}

fn render_item(item: &ItemFrame, area: Rect, buf: &mut Buffer) {
    let opacity = number(item, StyleProperty::Opacity).unwrap_or(1.0);
    let background = item
        .values
        .get(StyleProperty::BackgroundColor)
        .and_then(StyleValue::as_color);
    let style = Theme::section_style(background, opacity);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", item.kind.title()),
            Theme::section_title_style(opacity),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(style);

    let lines = vec![
        Line::raw(format!("transform: {}", item.transform)),
        Line::raw(format!("through section: {:>3.0}%", item.travel * 100.0)),
    ];
    Paragraph::new(lines).block(block).render(area, buf);
}

#[cfg(test)]
mod tests {
    use scroll_keyframes::{Easing, Rect as ContentRect, StyleSet};

    use super::*;
    use crate::app::scene::SectionKind;

    fn frame(position: f64, values: StyleSet) -> SceneFrame {
        SceneFrame {
            axis: Axis::Y,
            position,
            max_scroll_position: 100.0,
            progress: position / 100.0,
            velocity: 0.0,
            easing: Easing::Linear,
            items: vec![ItemFrame {
                kind: SectionKind::Slide,
                rect: Some(ContentRect::new(0.0, 30.0, 40.0, 10.0)),
                values,
                transform: "none".into(),
                visible: true,
                travel: 0.5,
            }],
        }
    }

    #[test]
    fn sections_scroll_and_translate() {
        let viewport = Rect::new(1, 1, 40, 20);
        let f = frame(20.0, StyleSet::new().translate_x(StyleValue::px(5.0)));
        let placed = place(&f, &f.items[0], viewport).unwrap();
        assert_eq!(placed, Rect::new(6, 11, 35, 10));
    }

    #[test]
    fn offscreen_sections_are_skipped() {
        let viewport = Rect::new(0, 0, 40, 20);
        let f = frame(0.0, StyleSet::new());
        assert!(place(&f, &f.items[0], viewport).is_none());
    }

    #[test]
    fn scale_shrinks_about_the_centre() {
        let viewport = Rect::new(0, 0, 40, 20);
        let f = frame(25.0, StyleSet::new().scale_x(0.5));
        let placed = place(&f, &f.items[0], viewport).unwrap();
        assert_eq!(placed, Rect::new(10, 5, 20, 10));
    }
}
