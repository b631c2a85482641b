pub mod field;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use numtap::{GameSnapshot, Phase};

use crate::App;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snap = &self.snapshot;
        let areas = field::layout(area);

        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let banner = match snap.phase {
            Phase::Cleared => Span::styled(
                "ALL CLEARED",
                Style::default().patch(bold_style).fg(Color::Green),
            ),
            Phase::Failed => Span::styled(
                "GAME OVER",
                Style::default().patch(bold_style).fg(Color::Red),
            ),
            Phase::Setup | Phase::Running => Span::styled("LET'S PLAY", bold_style),
        };

        let info = Line::from(vec![
            Span::raw("Points: "),
            Span::styled(snap.points.to_string(), bold_style),
            Span::raw("   Time: "),
            Span::styled(format!("{:.1}s", snap.elapsed), bold_style),
            Span::raw("   Rule: "),
            Span::styled(snap.rule.to_string(), bold_style),
            Span::raw("   Auto play: "),
            Span::styled(if snap.auto_play { "ON" } else { "OFF" }, bold_style),
        ]);

        Paragraph::new(vec![Line::from(banner), info])
            .alignment(Alignment::Center)
            .render(areas.header, buf);

        Block::default()
            .borders(Borders::ALL)
            .title("field")
            .render(areas.field, buf);
        render_targets(snap, areas.field_inner(), buf);

        let mut status = vec![];
        if snap.phase != Phase::Cleared {
            status.push(Span::raw("Next: "));
            status.push(Span::styled(
                snap.next.map_or_else(|| "None".to_string(), |n| n.to_string()),
                bold_style,
            ));
        }
        if !self.entry.is_empty() {
            status.push(Span::raw("   Hit: "));
            status.push(Span::styled(format!("{}_", self.entry), dim_style));
        }
        Paragraph::new(Line::from(status)).render(areas.status, buf);

        let legend = if snap.phase == Phase::Running {
            "(p) restart / (a)uto play / 0-9 + enter or click to hit / ↑↓ points / (esc)ape"
        } else {
            "(p)lay / ↑↓ pgup/pgdn points / (esc)ape"
        };
        Paragraph::new(Span::styled(legend, italic_style)).render(areas.legend, buf);
    }
}

fn render_targets(snap: &GameSnapshot, inner: Rect, buf: &mut Buffer) {
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let active_style = Style::default()
        .fg(Color::White)
        .bg(Color::Red)
        .add_modifier(Modifier::BOLD);
    let fading_style = Style::default().add_modifier(Modifier::DIM);

    for t in &snap.targets {
        let rect = field::target_rect(inner, snap.field, t);
        let lines = field::target_label(t)
            .into_iter()
            .map(Line::from)
            .collect::<Vec<Line>>();
        let style = if t.is_active() {
            active_style
        } else {
            fading_style
        };

        Clear.render(rect, buf);
        Paragraph::new(lines)
            .style(style)
            .alignment(Alignment::Center)
            .render(rect, buf);
    }
}
