use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of one cell in the unit grid, including its gap.
pub const GRID_CELL_WIDTH: u16 = 32;
const ACTIVITY_PERCENT: u16 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub header: Rect,
    pub grid: Rect,
    pub activity: Rect,
    pub pagination: Rect,
    pub footer: Rect,
}

pub fn split(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(area);
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(100 - ACTIVITY_PERCENT),
            Constraint::Percentage(ACTIVITY_PERCENT),
        ])
        .split(rows[1]);

    Areas {
        header: rows[0],
        grid: body[0],
        activity: body[1],
        pagination: rows[2],
        footer: rows[3],
    }
}

/// Columns the grid fits in `grid`, never fewer than one.
pub fn grid_columns(grid: Rect) -> usize {
    usize::from((grid.width.saturating_sub(2) / GRID_CELL_WIDTH).max(1))
}

/// Rows visible inside the bordered grid block.
pub fn grid_rows(grid: Rect) -> usize {
    usize::from(grid.height.saturating_sub(2).max(1))
}

/// First grid row to draw so that `selected_row` stays visible.
pub fn first_visible_row(selected_row: usize, visible_rows: usize) -> usize {
    (selected_row + 1).saturating_sub(visible_rows.max(1))
}

pub fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = area.width * percent_x.min(100) / 100;
    let height = area.height * percent_y.min(100) / 100;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
