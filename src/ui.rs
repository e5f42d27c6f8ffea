pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use lofitab::{arcade::PlayArea, config::View, progression::XP_PER_LEVEL};

use crate::{App, Prompt};

const HORIZONTAL_MARGIN: u16 = 2;
const POPUP_WIDTH: u16 = 50;

/// Header, body and footer. Zen mode gives the whole frame to the body.
fn frame_chunks(area: Rect, zen: bool) -> [Rect; 3] {
    let (header, footer) = if zen { (0, 0) } else { (3, 1) };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header),
            Constraint::Min(1),
            Constraint::Length(footer),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Status line above the play field.
pub(crate) fn arcade_chunks(body: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(body);
    [chunks[0], chunks[1]]
}

/// Inner rectangle the arcade canvas draws into, when the arcade is on screen.
pub fn arena_area(area: Rect, app: &App) -> Option<Rect> {
    if app.view != View::Arcade {
        return None;
    }
    let [_, body, _] = frame_chunks(area, app.zen);
    let [_, field] = arcade_chunks(body);
    Some(Block::default().borders(Borders::ALL).inner(field))
}

/// Map a terminal cell inside `arena` to play-field coordinates.
pub fn to_play(arena: Rect, col: u16, row: u16, play: PlayArea) -> Option<(f64, f64)> {
    if arena.width == 0 || arena.height == 0 || !arena.contains(Position::new(col, row)) {
        return None;
    }
    let x = ((col - arena.x) as f64 + 0.5) * play.width / arena.width as f64;
    let y = ((row - arena.y) as f64 + 0.5) * play.height / arena.height as f64;
    Some((x, y))
}

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());

    if let Some(prompt) = &app.prompt {
        let text = match prompt {
            Prompt::Note => app.note.text().to_string(),
            Prompt::Quest(text) | Prompt::ShortcutName(text) => text.clone(),
            Prompt::ShortcutUrl { url, .. } => url.clone(),
        };
        let area = popup(f.area(), 3);
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(format!("{text}▏")).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(prompt.title())
                    .title_bottom("(enter) ok  (esc) cancel"),
            ),
            area,
        );
    } else if let Some(question) = app.confirm_question() {
        notice(f, &question);
    } else if let Some(msg) = app.notices.front() {
        notice(f, msg);
    }
}

fn notice(f: &mut Frame, msg: &str) {
    let inner_width = POPUP_WIDTH.saturating_sub(4).max(1);
    let lines = (msg.width() as u16).div_ceil(inner_width) + 2;
    let area = popup(f.area(), lines + 1);
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(msg)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title_bottom("press any key"),
            ),
        area,
    );
}

fn popup(area: Rect, height: u16) -> Rect {
    let width = POPUP_WIDTH.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// While a game runs every letter is game input, so only tab is global.
fn footer_help(app: &App, screen: &dyn screen::Screen) -> String {
    if app.view == View::Arcade && app.arcade.is_running() {
        format!("{}  (tab) switch", screen.keys(app))
    } else {
        format!("{}  (tab) switch  (z) zen  (q) quit", screen.keys(app))
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let [header, body, footer] = frame_chunks(area, self.zen);
        let screen = screen::for_view(self.view);

        screen.render(self, body, buf);
        if self.zen {
            return;
        }

        let header_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([Constraint::Min(30), Constraint::Length(40)])
            .split(Rect { height: 2, ..header });

        let titles = View::ALL.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        let selected = View::ALL.iter().position(|v| *v == self.view).unwrap_or(0);
        Tabs::new(titles)
            .select(selected)
            .highlight_style(Style::default().patch(bold_style).fg(Color::Magenta))
            .render(header_chunks[0], buf);

        let user = self.session.user_name().unwrap_or("guest");
        let level = Line::from(vec![
            Span::styled(format!("Lv {}", self.ledger.level()), bold_style.fg(Color::Cyan)),
            Span::raw(format!("  {}/{} XP  ", self.ledger.xp(), XP_PER_LEVEL)),
            Span::styled(user.to_string(), dim_style),
        ]);
        Paragraph::new(level)
            .alignment(Alignment::Right)
            .render(header_chunks[1], buf);

        Paragraph::new(Span::styled(footer_help(self, screen.as_ref()), dim_style))
            .alignment(Alignment::Center)
            .render(footer, buf);
    }
}
