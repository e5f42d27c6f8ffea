mod ui;

use std::{
    collections::VecDeque,
    error::Error,
    io::{self, stdin},
    path::{Path, PathBuf},
    rc::Rc,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use tracing::{info, warn};
use webbrowser::Browser;

use lofitab::{
    app_dirs::AppDirs,
    arcade::{Arcade, GameOver, Input, Key, Variant},
    auth::{self, Profile},
    config::{Config, ConfigStore, FileConfigStore, View},
    content,
    focus::{FocusMode, FocusNote, FocusTimer, Vibe, COMPLETION_MESSAGE},
    inspiration::Inspiration,
    leaderboard::{self, Entry},
    logging,
    progression::{Ledger, LevelUp},
    runtime::{AppEvent, Clock, CrosstermEventSource, FixedTicker, Pump},
    storage::{KvStore, MemoryStore, SqliteStore},
};

const TICK_RATE_MS: u64 = 16;
/// Keyboard steering step for the catcher, in play units.
const POINTER_STEP: f64 = 30.0;
const REFRESH_CHOICES: [f64; 5] = [1.0, 6.0, 12.0, 24.0, 168.0];
const MEMORY_ROOT: &str = ":memory:";

/// lofi productivity new tab for your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A focus timer, quest log with levels and XP, shortcut portal, daily inspiration and a small arcade, all in one terminal tab."
)]
pub struct Cli {
    /// screen to open on
    #[clap(short, long, value_enum)]
    view: Option<View>,

    /// arcade game selected at startup
    #[clap(short, long, value_enum)]
    game: Option<Variant>,

    /// database file; ":memory:" keeps nothing between runs
    #[clap(long)]
    db: Option<PathBuf>,

    /// seed every random source for a reproducible run
    #[clap(long)]
    seed: Option<u64>,

    /// hours between inspiration refreshes
    #[clap(long)]
    refresh_hours: Option<f64>,

    /// arcade play field width, in game units
    #[clap(long)]
    width: Option<f64>,

    /// arcade play field height, in game units
    #[clap(long)]
    height: Option<f64>,

    /// write the effective settings back to the config file
    #[clap(long)]
    save_config: bool,

    /// record a finished sign-in with this access token
    #[clap(long, requires = "user_name")]
    token: Option<String>,

    /// display name for --token
    #[clap(long)]
    user_name: Option<String>,

    /// email for --token
    #[clap(long)]
    user_email: Option<String>,

    /// forget the signed-in user
    #[clap(long, conflicts_with = "token")]
    sign_out: bool,
}

impl Cli {
    /// Overlay command-line flags on the stored config.
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(view) = self.view {
            cfg.default_view = view;
        }
        if let Some(game) = self.game {
            cfg.default_game = game;
        }
        if let Some(hours) = self.refresh_hours {
            cfg.refresh_hours = hours;
        }
        if let Some(width) = self.width {
            cfg.play_area.width = width;
        }
        if let Some(height) = self.height {
            cfg.play_area.height = height;
        }
        cfg
    }

    fn apply_auth(&self, session: &mut auth::Session) -> lofitab::Result<()> {
        if self.sign_out {
            return session.sign_out();
        }
        if let Some(token) = &self.token {
            let profile = Profile {
                name: self.user_name.clone().unwrap_or_default(),
                email: self.user_email.clone().unwrap_or_default(),
                picture: None,
            };
            session.sign_in(token, profile)?;
        }
        Ok(())
    }
}

/// Text being typed into a popup.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Quest(String),
    /// Edits go straight to the stored note.
    Note,
    ShortcutName(String),
    ShortcutUrl { name: String, url: String },
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self {
            Prompt::Quest(_) => "New quest",
            Prompt::Note => "What are you focusing on?",
            Prompt::ShortcutName(_) => "Shortcut name",
            Prompt::ShortcutUrl { .. } => "Shortcut URL",
        }
    }

    fn buffer(&mut self) -> Option<&mut String> {
        match self {
            Prompt::Quest(text) | Prompt::ShortcutName(text) => Some(text),
            Prompt::ShortcutUrl { url, .. } => Some(url),
            Prompt::Note => None,
        }
    }
}

/// A destructive action waiting for a y/n answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Reset,
    DeleteShortcut(usize),
}

pub struct App {
    pub view: View,
    pub zen: bool,
    pub focus: FocusTimer,
    pub note: FocusNote,
    pub ledger: Ledger,
    pub arcade: Arcade,
    pub inspiration: Inspiration,
    pub session: auth::Session,
    pub board: Vec<Entry>,
    pub notices: VecDeque<String>,
    pub prompt: Option<Prompt>,
    pub cursor: usize,
    pub confirm: Option<Confirm>,
    pub vibe: Option<Vibe>,
    /// Inner rectangle of the arcade field on screen, for mouse mapping.
    pub arena: Option<Rect>,
    pub should_quit: bool,
    bot_names: Vec<String>,
    pointer_x: f64,
    rng: StdRng,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl App {
    pub fn new(cfg: &Config, store: Rc<dyn KvStore>, seed: Option<u64>) -> lofitab::Result<Self> {
        let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        let mut arcade = Arcade::new(cfg.play_area, Box::new(StdRng::seed_from_u64(rng.gen())));
        arcade.select(cfg.default_game);

        let ledger = Ledger::load(store.clone());
        let mut inspiration = Inspiration::load(store.clone())?;
        if inspiration.record().seed.is_none() {
            inspiration.set_refresh_hours(cfg.refresh_hours, now_ms(), &mut rng)?;
        } else {
            inspiration.check(now_ms(), false, &mut rng)?;
        }

        let bot_names = content::bot_names()?;
        let board = leaderboard::simulate(ledger.record(), &bot_names, &mut rng);

        Ok(Self {
            view: cfg.default_view,
            zen: false,
            focus: FocusTimer::default(),
            note: FocusNote::load(store.clone()),
            ledger,
            arcade,
            inspiration,
            session: auth::Session::restore(store),
            board,
            notices: VecDeque::new(),
            prompt: None,
            cursor: 0,
            confirm: None,
            vibe: None,
            arena: None,
            should_quit: false,
            bot_names,
            pointer_x: cfg.play_area.width / 2.0,
            rng,
        })
    }

    pub fn notify(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        info!(%msg, "notice");
        self.notices.push_back(msg);
    }

    fn report(&mut self, err: lofitab::Error) {
        match err {
            lofitab::Error::InvalidInput(msg) => self.notify(msg),
            err => {
                warn!(%err, "operation failed");
                self.notify(format!("Something went wrong: {err}"));
            }
        }
    }

    fn level_up(&mut self, up: Option<LevelUp>) {
        if let Some(up) = up {
            self.notify(up.to_string());
        }
    }

    fn game_over(&mut self, over: Option<GameOver>) {
        if let Some(msg) = over.and_then(|o| o.message) {
            self.notify(msg);
        }
    }

    pub fn set_refresh_hours(&mut self, hours: f64) {
        if let Err(err) = self
            .inspiration
            .set_refresh_hours(hours, now_ms(), &mut self.rng)
        {
            self.report(err);
        }
    }

    pub fn on_tick(&mut self, dt: Duration) {
        // an open notice holds the game clock
        if self.notices.is_empty() {
            let over = self.arcade.advance(dt);
            self.game_over(over);
        }

        match self.focus.advance(dt, &mut self.ledger) {
            Ok(Some(done)) => {
                self.notify(COMPLETION_MESSAGE);
                self.level_up(done.level_up);
            }
            Ok(None) => {}
            Err(err) => self.report(err),
        }

        if let Err(err) = self.inspiration.check(now_ms(), false, &mut self.rng) {
            self.report(err);
        }
    }

    fn list_len(&self) -> usize {
        match self.view {
            View::Quests => self.ledger.quests().len(),
            View::Portal => self.ledger.shortcuts().len(),
            _ => 0,
        }
    }

    fn move_cursor(&mut self, down: bool) {
        let len = self.list_len();
        if len == 0 {
            self.cursor = 0;
        } else if down {
            self.cursor = (self.cursor + 1).min(len - 1);
        } else {
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.list_len().saturating_sub(1));
    }

    pub fn confirm_question(&self) -> Option<String> {
        match self.confirm? {
            Confirm::Reset => {
                Some("Reset all progress? Level and XP go back to the start. (y/n)".to_string())
            }
            Confirm::DeleteShortcut(i) => {
                let name = self.ledger.shortcuts().get(i).map_or("", |s| s.name.as_str());
                Some(format!("Delete shortcut \"{name}\"? (y/n)"))
            }
        }
    }

    fn confirmed(&mut self, confirm: Confirm) {
        let res = match confirm {
            Confirm::Reset => {
                let res = self.ledger.reset();
                if res.is_ok() {
                    self.notify("Progress reset to Level 1.");
                }
                res
            }
            Confirm::DeleteShortcut(i) => self.ledger.delete_shortcut(i),
        };
        if let Err(err) = res {
            self.report(err);
        }
        self.clamp_cursor();
    }

    fn open_url(&mut self, url: &str) {
        if !Browser::is_available() {
            self.notify(format!("No browser available. {url}"));
        } else if let Err(err) = webbrowser::open(url) {
            warn!(%url, %err, "could not open browser");
            self.notify(format!("Could not open {url}"));
        }
    }

    fn switch_view(&mut self, view: View) {
        self.view = view;
        self.cursor = 0;
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.notices.pop_front().is_some() {
            return;
        }
        if self.prompt.is_some() {
            self.on_prompt_key(key);
            return;
        }
        if let Some(confirm) = self.confirm.take() {
            if key.code == KeyCode::Char('y') {
                self.confirmed(confirm);
            }
            return;
        }

        match key.code {
            KeyCode::Tab => return self.switch_view(self.view.next()),
            KeyCode::BackTab => return self.switch_view(self.view.prev()),
            _ => {}
        }
        if self.view == View::Arcade && self.arcade.is_running() {
            self.on_game_key(key);
            return;
        }

        match key.code {
            KeyCode::Esc if self.zen => self.zen = false,
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('z') => self.zen = !self.zen,
            KeyCode::Up | KeyCode::Char('k') if self.list_len() > 0 => self.move_cursor(false),
            KeyCode::Down | KeyCode::Char('j') if self.list_len() > 0 => self.move_cursor(true),
            _ => match self.view {
                View::Focus => self.on_focus_key(key),
                View::Quests => self.on_quests_key(key),
                View::Arcade => self.on_arcade_key(key),
                View::Portal => self.on_portal_key(key),
                View::Inspiration => self.on_inspiration_key(key),
                View::Leaderboard => self.on_leaderboard_key(key),
            },
        }
    }

    fn on_focus_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') => self.focus.toggle(),
            KeyCode::Char('r') => self.focus.reset(),
            KeyCode::Char('m') => {
                let modes = FocusMode::ALL;
                let i = modes.iter().position(|m| *m == self.focus.mode()).unwrap_or(0);
                self.focus.set_mode(modes[(i + 1) % modes.len()]);
            }
            KeyCode::Char('n') => self.prompt = Some(Prompt::Note),
            KeyCode::Char('v') => {
                let vibe = self.vibe.map_or(Vibe::Study, Vibe::next);
                self.vibe = Some(vibe);
                info!(%vibe, "vibe changed");
                self.open_url(vibe.url());
            }
            _ => {}
        }
    }

    fn on_quests_key(&mut self, key: KeyEvent) {
        let selected = self.ledger.quests().get(self.cursor).map(|q| q.id);
        match (key.code, selected) {
            (KeyCode::Char('a'), _) => self.prompt = Some(Prompt::Quest(String::new())),
            (KeyCode::Char('R'), _) => self.confirm = Some(Confirm::Reset),
            (KeyCode::Enter | KeyCode::Char(' '), Some(id)) => match self.ledger.toggle_quest(id) {
                Ok(up) => self.level_up(up),
                Err(err) => self.report(err),
            },
            (KeyCode::Char('d'), Some(id)) => {
                if let Err(err) = self.ledger.delete_quest(id) {
                    self.report(err);
                }
                self.clamp_cursor();
            }
            _ => {}
        }
    }

    fn on_arcade_key(&mut self, key: KeyEvent) {
        let games = Variant::ALL;
        let i = games
            .iter()
            .position(|v| *v == self.arcade.variant())
            .unwrap_or(0);
        match key.code {
            KeyCode::Left => self.arcade.select(games[(i + games.len() - 1) % games.len()]),
            KeyCode::Right => self.arcade.select(games[(i + 1) % games.len()]),
            KeyCode::Enter | KeyCode::Char('s') => {
                self.pointer_x = self.arcade.area().width / 2.0;
                if let Err(err) = self.arcade.start() {
                    self.report(err);
                }
            }
            _ => {}
        }
    }

    fn on_game_key(&mut self, key: KeyEvent) {
        let variant = self.arcade.variant();
        let input = match key.code {
            KeyCode::Esc => {
                self.arcade.stop();
                return;
            }
            KeyCode::Left | KeyCode::Right if variant == Variant::Catcher => {
                let step = if key.code == KeyCode::Left {
                    -POINTER_STEP
                } else {
                    POINTER_STEP
                };
                self.pointer_x = (self.pointer_x + step).clamp(0.0, self.arcade.area().width);
                Input::PointerMove { x: self.pointer_x }
            }
            KeyCode::Char(c @ '1'..='9') if variant == Variant::MemorySequence => {
                Input::Cell(c as usize - '1' as usize)
            }
            KeyCode::Char(' ') => Input::Key(Key::Space),
            KeyCode::Char(c) => Input::Key(Key::Char(c)),
            KeyCode::Up => Input::Key(Key::Up),
            KeyCode::Down => Input::Key(Key::Down),
            KeyCode::Left => Input::Key(Key::Left),
            KeyCode::Right => Input::Key(Key::Right),
            _ => return,
        };
        let over = self.arcade.input(input);
        self.game_over(over);
    }

    pub fn on_mouse(&mut self, ev: MouseEvent) {
        if self.view != View::Arcade || !self.arcade.is_running() || !self.notices.is_empty() {
            return;
        }
        let Some(arena) = self.arena else {
            return;
        };
        let Some((x, y)) = ui::to_play(arena, ev.column, ev.row, self.arcade.area()) else {
            return;
        };
        let input = match ev.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.pointer_x = x;
                Input::PointerMove { x }
            }
            MouseEventKind::Down(MouseButton::Left) => Input::Click { x, y },
            _ => return,
        };
        let over = self.arcade.input(input);
        self.game_over(over);
    }

    fn on_portal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('a') => self.prompt = Some(Prompt::ShortcutName(String::new())),
            KeyCode::Char('d') if self.cursor < self.list_len() => {
                self.confirm = Some(Confirm::DeleteShortcut(self.cursor));
            }
            KeyCode::Enter => {
                if let Some(url) = self.ledger.shortcuts().get(self.cursor).map(|s| s.url.clone())
                {
                    self.open_url(&url);
                }
            }
            _ => {}
        }
    }

    fn on_inspiration_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => {
                if let Err(err) = self.inspiration.check(now_ms(), true, &mut self.rng) {
                    self.report(err);
                }
            }
            KeyCode::Char('h') => {
                let current = self.inspiration.refresh_hours();
                let next = REFRESH_CHOICES
                    .iter()
                    .copied()
                    .find(|h| *h > current)
                    .unwrap_or(REFRESH_CHOICES[0]);
                self.set_refresh_hours(next);
            }
            _ => {}
        }
    }

    fn on_leaderboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => {
                self.board =
                    leaderboard::simulate(self.ledger.record(), &self.bot_names, &mut self.rng);
            }
            KeyCode::Char('o') if self.session.is_signed_in() => {
                if let Err(err) = self.session.sign_out() {
                    self.report(err);
                }
            }
            _ => {}
        }
    }

    fn on_prompt_key(&mut self, key: KeyEvent) {
        let Some(mut prompt) = self.prompt.take() else {
            return;
        };

        if prompt == Prompt::Note {
            let res = match key.code {
                KeyCode::Enter | KeyCode::Esc => return,
                KeyCode::Backspace => self.note.pop(),
                KeyCode::Char(c) => self.note.push(c),
                _ => Ok(()),
            };
            if let Err(err) = res {
                self.report(err);
            }
            self.prompt = Some(prompt);
            return;
        }

        match key.code {
            KeyCode::Esc => {}
            KeyCode::Enter => self.submit(prompt),
            KeyCode::Backspace => {
                if let Some(buf) = prompt.buffer() {
                    buf.pop();
                }
                self.prompt = Some(prompt);
            }
            KeyCode::Char(c) => {
                if let Some(buf) = prompt.buffer() {
                    buf.push(c);
                }
                self.prompt = Some(prompt);
            }
            _ => self.prompt = Some(prompt),
        }
    }

    fn submit(&mut self, prompt: Prompt) {
        let res = match prompt {
            Prompt::Quest(text) => {
                let res = self.ledger.add_quest(&text);
                if res.is_ok() {
                    self.cursor = 0;
                }
                res
            }
            Prompt::ShortcutName(name) => {
                self.prompt = Some(Prompt::ShortcutUrl {
                    name,
                    url: String::new(),
                });
                Ok(())
            }
            Prompt::ShortcutUrl { name, url } => self.ledger.add_shortcut(&name, &url),
            Prompt::Note => Ok(()),
        };
        if let Err(err) = res {
            self.report(err);
        }
    }
}

fn open_store(db: Option<&Path>) -> lofitab::Result<Rc<dyn KvStore>> {
    let path = match db {
        Some(p) if p == Path::new(MEMORY_ROOT) => return Ok(Rc::new(MemoryStore::new())),
        Some(p) => Some(p.to_path_buf()),
        None => AppDirs::db_path(),
    };
    match path {
        Some(path) => Ok(Rc::new(SqliteStore::open(path)?)),
        None => {
            warn!("no state directory, progress will not be kept");
            Ok(Rc::new(SqliteStore::open_in_memory()?))
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        logging::init_file_tracing(&log_path)?;
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if cli.save_config {
        config_store.save(&config)?;
    }

    let store = open_store(cli.db.as_deref())?;
    let mut app = App::new(&config, store, cli.seed)?;
    cli.apply_auth(&mut app.session)?;
    if cli.refresh_hours.is_some() {
        app.set_refresh_hours(config.refresh_hours);
    }
    info!(view = %app.view, game = %app.arcade.variant(), "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let pump = Pump::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut clock = Clock::new();

    while !app.should_quit {
        let size = terminal.size()?;
        app.arena = ui::arena_area(Rect::new(0, 0, size.width, size.height), app);
        terminal.draw(|f| ui::draw(app, f))?;

        match pump.step() {
            AppEvent::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
            AppEvent::Mouse(mouse) => app.on_mouse(mouse),
            AppEvent::Key(_) | AppEvent::Resize | AppEvent::Tick => {}
        }
        app.on_tick(clock.lap());
    }

    if let Some(over) = app.arcade.stop() {
        info!(score = over.score, "game abandoned on exit");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofitab::{arcade::PlayArea, progression::RewardSink};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new(&Config::default(), Rc::new(MemoryStore::new()), Some(7)).unwrap()
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.on_key(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["lofitab"]);
        assert_eq!(cli.view, None);
        assert_eq!(cli.game, None);
        assert!(!cli.save_config);
        assert_eq!(cli.apply(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "lofitab",
            "--view",
            "arcade",
            "--game",
            "memory",
            "--width",
            "400",
            "--refresh-hours",
            "6",
        ]);
        let cfg = cli.apply(Config::default());
        assert_eq!(cfg.default_view, View::Arcade);
        assert_eq!(cfg.default_game, Variant::MemorySequence);
        assert_eq!(cfg.play_area.width, 400.0);
        assert_eq!(cfg.play_area.height, PlayArea::default().height);
        assert_eq!(cfg.refresh_hours, 6.0);
    }

    #[test]
    fn test_cli_token_requires_name() {
        assert!(Cli::try_parse_from(["lofitab", "--token", "t"]).is_err());
        let cli = Cli::parse_from(["lofitab", "--token", "t", "--user-name", "Ada"]);
        let mut app = app();
        cli.apply_auth(&mut app.session).unwrap();
        assert_eq!(app.session.user_name(), Some("Ada"));
    }

    #[test]
    fn test_tick_rate_fits_fastest_game() {
        const _: () = assert!(TICK_RATE_MS <= lofitab::arcade::typer::TICK_MS);
    }

    #[test]
    fn test_tab_cycles_views() {
        let mut app = app();
        assert_eq!(app.view, View::Focus);
        app.on_key(press(KeyCode::Tab));
        assert_eq!(app.view, View::Quests);
        app.on_key(press(KeyCode::BackTab));
        app.on_key(press(KeyCode::BackTab));
        assert_eq!(app.view, View::Leaderboard);
    }

    #[test]
    fn test_add_and_complete_quest() {
        let mut app = app();
        app.switch_view(View::Quests);
        app.on_key(press(KeyCode::Char('a')));
        type_str(&mut app, "read a chapter");
        app.on_key(press(KeyCode::Enter));
        assert_eq!(app.prompt, None);
        assert_eq!(app.ledger.quests()[0].text, "read a chapter");

        app.on_key(press(KeyCode::Enter));
        assert!(app.ledger.quests()[0].completed);
        assert_eq!(app.ledger.xp(), 20);
    }

    #[test]
    fn test_empty_quest_shows_notice() {
        let mut app = app();
        app.switch_view(View::Quests);
        app.on_key(press(KeyCode::Char('a')));
        app.on_key(press(KeyCode::Enter));
        assert!(app.ledger.quests().is_empty());
        assert_eq!(app.notices.len(), 1);

        // any key dismisses the notice
        app.on_key(press(KeyCode::Char('x')));
        assert!(app.notices.is_empty());
    }

    #[test]
    fn test_reset_needs_confirmation() {
        let mut app = app();
        app.ledger.gain_xp(150).unwrap();
        app.notices.clear();
        app.switch_view(View::Quests);

        app.on_key(press(KeyCode::Char('R')));
        app.on_key(press(KeyCode::Char('n')));
        assert_eq!(app.ledger.level(), 2);

        app.on_key(press(KeyCode::Char('R')));
        app.on_key(press(KeyCode::Char('y')));
        assert_eq!(app.ledger.level(), 1);
        assert_eq!(
            app.notices.front().map(String::as_str),
            Some("Progress reset to Level 1.")
        );
    }

    #[test]
    fn test_shortcut_prompt_two_steps() {
        let mut app = app();
        app.switch_view(View::Portal);
        app.on_key(press(KeyCode::Char('a')));
        type_str(&mut app, "Docs");
        app.on_key(press(KeyCode::Enter));
        assert!(matches!(app.prompt, Some(Prompt::ShortcutUrl { .. })));
        type_str(&mut app, "docs.rs");
        app.on_key(press(KeyCode::Enter));

        let last = app.ledger.shortcuts().last().unwrap();
        assert_eq!(last.name, "Docs");
        assert_eq!(last.url, "https://docs.rs");
    }

    #[test]
    fn test_focus_completion_notices() {
        let mut app = app();
        app.on_key(press(KeyCode::Char('m')));
        assert_eq!(app.focus.mode(), FocusMode::ShortBreak);
        app.on_key(press(KeyCode::Char(' ')));
        app.on_tick(Duration::from_secs(300));

        assert_eq!(app.ledger.xp(), 50);
        assert_eq!(
            app.notices.front().map(String::as_str),
            Some(COMPLETION_MESSAGE)
        );
    }

    #[test]
    fn test_note_edits_are_saved() {
        let mut app = app();
        app.on_key(press(KeyCode::Char('n')));
        type_str(&mut app, "deep work");
        app.on_key(press(KeyCode::Backspace));
        app.on_key(press(KeyCode::Enter));
        assert_eq!(app.prompt, None);
        assert_eq!(app.note.text(), "deep wor");
    }

    #[test]
    fn test_arcade_keys_reach_running_game() {
        let mut app = app();
        app.switch_view(View::Arcade);
        app.on_key(press(KeyCode::Right));
        app.on_key(press(KeyCode::Right));
        assert_eq!(app.arcade.variant(), Variant::Runner);

        app.on_key(press(KeyCode::Enter));
        assert!(app.arcade.is_running());
        // q is game input now, not quit
        app.on_key(press(KeyCode::Char('q')));
        assert!(!app.should_quit);

        app.on_key(press(KeyCode::Esc));
        assert!(!app.arcade.is_running());
        assert!(app.notices.is_empty());
    }

    #[test]
    fn test_game_over_becomes_notice() {
        let mut app = app();
        app.switch_view(View::Arcade);
        app.on_key(press(KeyCode::Enter));
        app.on_tick(Duration::from_secs(30));
        assert!(!app.arcade.is_running());
        assert!(app
            .notices
            .iter()
            .any(|n| n.starts_with("Time's up! Final Score:")));
    }

    #[test]
    fn test_esc_leaves_zen_before_quitting() {
        let mut app = app();
        app.on_key(press(KeyCode::Char('z')));
        assert!(app.zen);

        app.on_key(press(KeyCode::Esc));
        assert!(!app.zen);
        assert!(!app.should_quit);

        app.on_key(press(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_shortcut_delete_needs_confirmation() {
        let mut app = app();
        app.switch_view(View::Portal);
        app.on_key(press(KeyCode::Down));

        app.on_key(press(KeyCode::Char('d')));
        assert_eq!(app.confirm, Some(Confirm::DeleteShortcut(1)));
        assert_eq!(
            app.confirm_question().as_deref(),
            Some("Delete shortcut \"YouTube\"? (y/n)")
        );
        app.on_key(press(KeyCode::Char('n')));
        assert_eq!(app.confirm, None);
        assert_eq!(app.ledger.shortcuts().len(), 4);

        app.on_key(press(KeyCode::Char('d')));
        app.on_key(press(KeyCode::Char('y')));
        let names = app
            .ledger
            .shortcuts()
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Google", "GitHub", "Spotify"]);
    }

    #[test]
    fn test_notice_holds_the_game_clock() {
        let mut app = app();
        app.switch_view(View::Arcade);
        app.on_key(press(KeyCode::Enter));
        app.notify("LEVEL UP! You reached Level 2!");

        app.on_tick(Duration::from_secs(60));
        assert!(app.arcade.is_running());
        assert_eq!(app.arcade.harness().time_remaining(), Some(30));

        // dismissing resumes play
        app.on_key(press(KeyCode::Char('x')));
        app.on_tick(Duration::from_secs(1));
        assert_eq!(app.arcade.harness().time_remaining(), Some(29));
    }
}
