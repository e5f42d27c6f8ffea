use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Rectangle},
        Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table, Widget, Wrap,
    },
};

use lofitab::{
    arcade::{Sprite, SpriteKind, Variant},
    config::View,
};

use crate::{ui::arcade_chunks, App};

/// One tab of the new-tab page.
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
    /// Key hints for the footer.
    fn keys(&self, app: &App) -> &'static str;
}

pub fn for_view(view: View) -> Box<dyn Screen> {
    match view {
        View::Focus => Box::new(FocusScreen),
        View::Quests => Box::new(QuestsScreen),
        View::Arcade => Box::new(ArcadeScreen),
        View::Portal => Box::new(PortalScreen),
        View::Inspiration => Box::new(InspirationScreen),
        View::Leaderboard => Box::new(LeaderboardScreen),
    }
}

fn bordered(title: &str) -> Block<'_> {
    Block::default().borders(Borders::ALL).title(title)
}

fn selected_style(on: bool) -> Style {
    if on {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    }
}

pub struct FocusScreen;

impl Screen for FocusScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let timer = &app.focus;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(8)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .split(area);

        Paragraph::new(Span::styled(
            timer.mode().to_string(),
            Style::default().fg(Color::Magenta),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        let clock_style = if timer.is_running() {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD | Modifier::DIM)
        };
        Paragraph::new(Span::styled(timer.display(), clock_style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP | Borders::BOTTOM))
            .render(chunks[2], buf);

        Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(timer.progress().clamp(0.0, 1.0))
            .label("")
            .render(chunks[3], buf);

        let note = match app.note.text() {
            "" => Span::styled(
                "What are you focusing on?",
                Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
            ),
            text => Span::styled(text.to_string(), Style::default().add_modifier(Modifier::ITALIC)),
        };
        Paragraph::new(note)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[5], buf);

        if let Some(vibe) = app.vibe {
            Paragraph::new(Span::styled(
                format!("♪ {vibe}"),
                Style::default().fg(Color::Green).add_modifier(Modifier::DIM),
            ))
            .alignment(Alignment::Center)
            .render(Rect { height: 1, ..chunks[4] }, buf);
        }
    }

    fn keys(&self, app: &App) -> &'static str {
        if app.focus.is_running() {
            "(space) pause  (r) reset  (m) mode  (n) note  (v) vibe"
        } else {
            "(space) start  (r) reset  (m) mode  (n) note  (v) vibe"
        }
    }
}

pub struct QuestsScreen;

impl Screen for QuestsScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let quests = app.ledger.quests();
        let area = Layout::default()
            .horizontal_margin(2)
            .constraints([Constraint::Min(1)])
            .split(area)[0];

        if quests.is_empty() {
            Paragraph::new("No quests yet. Press (a) to add one.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray))
                .block(bordered("Quests"))
                .render(area, buf);
            return;
        }

        let done = quests.iter().filter(|q| q.completed).count();
        let items = quests
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let (mark, style) = if q.completed {
                    ("[x] ", Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM))
                } else {
                    ("[ ] ", Style::default())
                };
                ListItem::new(Line::from(vec![
                    Span::raw(mark),
                    Span::styled(q.text.clone(), style),
                ]))
                .style(selected_style(i == app.cursor))
            })
            .collect::<Vec<_>>();

        let title = format!("Quests {done}/{}", quests.len());
        List::new(items).block(bordered(&title)).render(area, buf);
    }

    fn keys(&self, _app: &App) -> &'static str {
        "(a) add  (enter) done  (d) delete  (R) reset progress"
    }
}

pub struct ArcadeScreen;

impl ArcadeScreen {
    fn sprite_color(kind: SpriteKind) -> Color {
        match kind {
            SpriteKind::Target | SpriteKind::Faller => Color::Yellow,
            SpriteKind::Receiver | SpriteKind::Player => Color::Cyan,
            SpriteKind::Obstacle => Color::Red,
            SpriteKind::SnakeHead => Color::LightGreen,
            SpriteKind::SnakeBody => Color::Green,
            SpriteKind::Food => Color::Magenta,
            SpriteKind::Word { locked: true, .. } => Color::Yellow,
            SpriteKind::Word { .. } => Color::White,
            SpriteKind::Cell { lit: true } => Color::LightYellow,
            SpriteKind::Cell { lit: false } => Color::DarkGray,
        }
    }

    fn label(sprite: &Sprite) -> Option<Line<'static>> {
        let text = sprite.label.clone()?;
        let line = match sprite.kind {
            SpriteKind::Word { typed, .. } => {
                let split = typed.min(text.len());
                Line::from(vec![
                    Span::styled(
                        text[..split].to_string(),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(text[split..].to_string()),
                ])
            }
            SpriteKind::Cell { lit: true } => Line::styled(
                text,
                Style::default()
                    .fg(Color::LightYellow)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            ),
            _ => Line::raw(text),
        };
        Some(line)
    }

    fn render_field(app: &App, area: Rect, buf: &mut Buffer) {
        let play = app.arcade.area();
        let sprites = app.arcade.sprites();
        let title = app.arcade.variant().title();

        Canvas::default()
            .block(bordered(title))
            .marker(Marker::Braille)
            .x_bounds([0.0, play.width])
            .y_bounds([0.0, play.height])
            .paint(|ctx| {
                for sprite in &sprites {
                    let r = sprite.rect;
                    // play y grows downward, canvas y upward
                    let y = play.height - r.y - r.h;
                    ctx.draw(&Rectangle {
                        x: r.x,
                        y,
                        width: r.w,
                        height: r.h,
                        color: Self::sprite_color(sprite.kind),
                    });
                    if let Some(line) = Self::label(sprite) {
                        ctx.print(r.x, y + r.h / 2.0, line);
                    }
                }
            })
            .render(area, buf);
    }

    fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
        let items = Variant::ALL
            .iter()
            .map(|v| {
                let style = selected_style(*v == app.arcade.variant());
                ListItem::new(format!("  {}  ", v.title())).style(style)
            })
            .collect::<Vec<_>>();
        List::new(items)
            .block(bordered("Arcade"))
            .render(area, buf);
    }
}

impl Screen for ArcadeScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let [status, field] = arcade_chunks(area);
        let harness = app.arcade.harness();

        let state = if app.arcade.is_running() {
            Span::styled("playing", Style::default().fg(Color::Green))
        } else {
            Span::styled("ready", Style::default().add_modifier(Modifier::DIM))
        };
        let line = Line::from(vec![
            Span::styled(
                app.arcade.variant().title(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "   Score: {}   Time: {}   ",
                harness.score(),
                harness.timer_label()
            )),
            state,
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(status, buf);

        if app.arcade.is_running() {
            Self::render_field(app, field, buf);
        } else {
            Self::render_menu(app, field, buf);
        }
    }

    fn keys(&self, app: &App) -> &'static str {
        match (app.arcade.is_running(), app.arcade.variant()) {
            (false, _) => "(←/→) choose game  (enter) start",
            (true, Variant::Clicker) => "(click) catch stars  (esc) stop",
            (true, Variant::Catcher) => "(mouse or ←/→) move  (esc) stop",
            (true, Variant::Runner) => "(space/↑) jump  (esc) stop",
            (true, Variant::Snake) => "(arrows) steer  (esc) stop",
            (true, Variant::Typer) => "(type) words before they land  (esc) stop",
            (true, Variant::MemorySequence) => "(1-9 or click) repeat the pattern  (esc) stop",
        }
    }
}

pub struct PortalScreen;

impl Screen for PortalScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let rows = app
            .ledger
            .shortcuts()
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Row::new(vec![
                    Cell::from(s.name.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
                    Cell::from(s.url.clone()).style(Style::default().fg(Color::Blue)),
                ])
                .style(selected_style(i == app.cursor))
            })
            .collect::<Vec<_>>();

        let area = Layout::default()
            .horizontal_margin(2)
            .constraints([Constraint::Min(1)])
            .split(area)[0];
        Table::new(rows, [Constraint::Length(20), Constraint::Min(10)])
            .block(bordered("Portal"))
            .column_spacing(2)
            .render(area, buf);
    }

    fn keys(&self, _app: &App) -> &'static str {
        "(enter) open  (a) add  (d) delete"
    }
}

pub struct InspirationScreen;

impl Screen for InspirationScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let insp = &app.inspiration;
        let Some(card) = insp.card() else {
            Paragraph::new("Loading inspiration...")
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        };

        let italic = Style::default().add_modifier(Modifier::ITALIC);
        let dim = Style::default().add_modifier(Modifier::DIM);
        let now = chrono::Local::now();
        let lines = vec![
            Line::styled(
                now.format("%H:%M").to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::styled(now.format("%A, %B %-d").to_string(), dim),
            Line::raw(""),
            Line::styled(card.greeting, Style::default().add_modifier(Modifier::BOLD)),
            Line::raw(""),
            Line::styled(format!("\"{}\"", card.quote.text), italic),
            Line::styled(format!("- {}", card.quote.author), dim),
            Line::raw(""),
            Line::styled(card.image_url, Style::default().fg(Color::Blue)),
            Line::raw(""),
            Line::styled(
                format!(
                    "every {}h, next in {}",
                    insp.refresh_hours(),
                    insp.next_refresh_label(crate::now_ms())
                ),
                dim,
            ),
        ];

        let height = lines.len() as u16 + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(6)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(height),
                Constraint::Fill(1),
            ])
            .split(area);
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(bordered("Inspiration"))
            .render(chunks[1], buf);
    }

    fn keys(&self, _app: &App) -> &'static str {
        "(r) new card  (h) change interval"
    }
}

pub struct LeaderboardScreen;

impl Screen for LeaderboardScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let header = Row::new(vec!["#", "Name", "Level", "XP"])
            .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
        let rows = app
            .board
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let style = if e.is_user {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    (i + 1).to_string(),
                    e.name.clone(),
                    e.level.to_string(),
                    e.xp.to_string(),
                ])
                .style(style)
            })
            .collect::<Vec<_>>();

        let title = match app.session.user_name() {
            Some(name) => format!("Leaderboard (signed in as {name})"),
            None => "Leaderboard (offline)".to_string(),
        };
        let area = Layout::default()
            .horizontal_margin(2)
            .constraints([Constraint::Min(1)])
            .split(area)[0];
        Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Min(12),
                Constraint::Length(6),
                Constraint::Length(6),
            ],
        )
        .header(header)
        .block(bordered(&title))
        .column_spacing(2)
        .render(area, buf);
    }

    fn keys(&self, app: &App) -> &'static str {
        if app.session.is_signed_in() {
            "(r) refresh  (o) sign out"
        } else {
            "(r) refresh"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofitab::arcade::Rect as PlayRect;

    #[test]
    fn typed_prefix_is_split_out() {
        let sprite = Sprite::labelled(
            SpriteKind::Word {
                typed: 2,
                locked: true,
            },
            PlayRect::new(0.0, 0.0, 40.0, 20.0),
            "rain",
        );
        let line = ArcadeScreen::label(&sprite).unwrap();
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[0].content, "ra");
        assert_eq!(line.spans[1].content, "in");
    }

    #[test]
    fn unlabelled_sprites_print_nothing() {
        let sprite = Sprite::new(SpriteKind::Food, PlayRect::new(0.0, 0.0, 20.0, 20.0));
        assert!(ArcadeScreen::label(&sprite).is_none());
    }

    #[test]
    fn every_view_has_a_screen() {
        for view in View::ALL {
            let _ = for_view(view);
        }
    }
}
