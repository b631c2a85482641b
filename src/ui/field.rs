//! Mapping between logical field coordinates and terminal cells.
//!
//! Drawing and mouse hit-testing both go through [`target_rect`] so a
//! click lands on exactly what was drawn.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::UnicodeWidthStr;

use numtap::session::FieldSize;
use numtap::target::Target;

const HORIZONTAL_MARGIN: u16 = 2;
const HEADER_LINES: u16 = 3;

/// Screen regions, top to bottom
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Areas {
    pub header: Rect,
    pub field: Rect,
    pub status: Rect,
    pub legend: Rect,
}

impl Areas {
    /// Drawable area inside the field border
    pub fn field_inner(&self) -> Rect {
        self.field.inner(ratatui::layout::Margin {
            horizontal: 1,
            vertical: 1,
        })
    }
}

pub fn layout(area: Rect) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(HEADER_LINES),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    Areas {
        header: chunks[0],
        field: chunks[1],
        status: chunks[2],
        legend: chunks[3],
    }
}

/// Text drawn for a target: its number, plus hit time and countdown once fading
pub fn target_label(t: &Target) -> Vec<String> {
    let mut lines = vec![format!(" {} ", t.id)];
    if t.is_fading() {
        lines.push(format!(
            "{:.1}s {:.0}",
            t.cleared_at.unwrap_or_default(),
            t.countdown.unwrap_or_default()
        ));
    }
    lines
}

pub fn target_rect(inner: Rect, field: FieldSize, t: &Target) -> Rect {
    let lines = target_label(t);
    let w = lines.iter().map(|l| l.width()).max().unwrap_or(1) as u16;
    let h = lines.len() as u16;
    let w = w.min(inner.width);
    let h = h.min(inner.height);

    let col = scale(t.x, field.width, inner.width.saturating_sub(w));
    let row = scale(t.y, field.height, inner.height.saturating_sub(h));
    Rect::new(inner.x + col, inner.y + row, w, h)
}

/// Topmost target under the cell; later (higher) ids draw over earlier ones
pub fn hit_test(
    targets: &[Target],
    inner: Rect,
    field: FieldSize,
    col: u16,
    row: u16,
) -> Option<u32> {
    targets
        .iter()
        .rev()
        .find(|t| {
            let r = target_rect(inner, field, t);
            col >= r.x && col < r.right() && row >= r.y && row < r.bottom()
        })
        .map(|t| t.id)
}

fn scale(v: f64, max: f64, span: u16) -> u16 {
    if max <= 0.0 || !v.is_finite() {
        return 0;
    }
    let pos = (v / max * (f64::from(span) + 1.0)).floor();
    pos.clamp(0.0, f64::from(span)) as u16
}
