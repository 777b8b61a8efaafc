use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect as Area},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GameState, Rect};
use crate::metrics::GameMetrics;

/// What occupies one terminal cell of the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Bird,
    Food,
}

/// Mode-specific text around the playfield
#[derive(Debug, Clone, Default)]
pub struct Hud {
    /// Shown in the playfield border
    pub title: String,
    /// Left part of the footer, e.g. whose turn it is
    pub status: String,
    /// Key help in the footer
    pub controls: String,
    /// Replaces the playfield when set, e.g. a game over message
    pub banner: Option<Vec<String>>,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, metrics: &GameMetrics, hud: &Hud) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(0),    // Playfield
                Constraint::Length(2), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, metrics), chunks[0]);

        match &hud.banner {
            Some(lines) => frame.render_widget(self.render_banner(lines), chunks[1]),
            None => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::White))
                    .title(format!(" {} ", hud.title));
                let inner = block.inner(chunks[1]);
                frame.render_widget(self.render_playfield(inner, state).block(block), chunks[1]);
            }
        }

        frame.render_widget(self.render_footer(hud), chunks[2]);
    }

    fn render_playfield(&self, area: Area, state: &GameState) -> Paragraph<'_> {
        let cells = rasterize(state, area.width as usize, area.height as usize);

        let lines: Vec<Line> = cells
            .into_iter()
            .map(|row| {
                Line::from(
                    row.into_iter()
                        .map(|cell| match cell {
                            Cell::Bird => Span::styled(
                                "█",
                                Style::default()
                                    .fg(Color::Yellow)
                                    .add_modifier(Modifier::BOLD),
                            ),
                            Cell::Food => Span::styled("●", Style::default().fg(Color::Red)),
                            Cell::Empty => Span::styled(" ", Style::default().bg(Color::Reset)),
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        Paragraph::new(lines)
    }

    fn render_stats(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(
                state.score.to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Steps: ", label),
            Span::styled(state.steps.to_string(), value),
            Span::raw("    "),
            Span::styled("Reward: ", label),
            Span::styled(format!("{:.2}", metrics.episode_reward), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.high_score.to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
        ]);

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_banner<'a>(&self, lines: &'a [String]) -> Paragraph<'a> {
        let mut text = vec![Line::from("")];
        for (idx, line) in lines.iter().enumerate() {
            let style = if idx == 0 {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            text.push(Line::from(Span::styled(line.as_str(), style)));
            text.push(Line::from(""));
        }

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_footer<'a>(&self, hud: &'a Hud) -> Paragraph<'a> {
        let text = vec![
            Line::from(Span::styled(
                hud.status.as_str(),
                Style::default().fg(Color::Green),
            )),
            Line::from(Span::styled(
                hud.controls.as_str(),
                Style::default().fg(Color::Cyan),
            )),
        ];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Project the world onto a `cols` x `rows` grid of cells
///
/// Food is drawn before the bird, so the bird wins where they overlap.
pub fn rasterize(state: &GameState, cols: usize, rows: usize) -> Vec<Vec<Cell>> {
    let mut cells = vec![vec![Cell::Empty; cols]; rows];
    if cols == 0 || rows == 0 {
        return cells;
    }

    let scale_x = cols as f32 / state.screen_width;
    let scale_y = rows as f32 / state.screen_height;

    let mut fill = |rect: &Rect, cell: Cell| {
        let (col_start, col_end) = cell_span(rect.left, rect.right(), scale_x, cols);
        let (row_start, row_end) = cell_span(rect.top, rect.bottom(), scale_y, rows);
        for row in &mut cells[row_start..row_end] {
            for slot in &mut row[col_start..col_end] {
                *slot = cell;
            }
        }
    };

    for food in &state.foods {
        fill(&food.rect, Cell::Food);
    }
    fill(&state.bird.rect, Cell::Bird);

    cells
}

/// Cell indices covered by `[start, end)` in world units, clipped to the grid
fn cell_span(start: f32, end: f32, scale: f32, len: usize) -> (usize, usize) {
    let first = (start * scale).floor().max(0.0) as usize;
    let last = ((end * scale).ceil().max(0.0) as usize).min(len);
    (first.min(last), last)
}
