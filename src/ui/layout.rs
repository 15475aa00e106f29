//! Layout helpers: split the terminal into stage, readout and status bar.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Primary screen layout: the scrolling stage, a readout pane beside it and
/// a bottom status bar.
pub struct DemoLayout {
    pub stage_area: Rect,
    pub readout_area: Rect,
    pub status_area: Rect,
}

impl DemoLayout {
    pub fn from_area(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // stage + readout
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(34)])
            .split(rows[0]);

        Self {
            stage_area: columns[0],
            readout_area: columns[1],
            status_area: rows[1],
        }
    }

    /// Stage area inside its border: the viewport sections scroll through.
    pub fn viewport(&self) -> Rect {
        self.stage_area.inner(ratatui::layout::Margin::new(1, 1))
    }
}
