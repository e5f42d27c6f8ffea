//! Pomodoro-style focus timer.
//!
//! ```text
//! Paused ──toggle──> Running ──(reaches 00:00)──> Paused, +50 XP
//! ```
//!
//! No threads; the caller feeds elapsed time through [`FocusTimer::advance`].

use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::progression::{LevelUp, RewardSink};
use crate::storage::{self, KvStore, KEY_FOCUS_NOTE};

pub const COMPLETION_XP: u32 = 50;
pub const COMPLETION_MESSAGE: &str = "Focus session complete! +50 XP";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    #[default]
    #[strum(serialize = "Focus")]
    Focus,
    #[strum(serialize = "Short Break")]
    ShortBreak,
    #[strum(serialize = "Long Break")]
    LongBreak,
}

impl FocusMode {
    pub const ALL: [FocusMode; 3] = [FocusMode::Focus, FocusMode::ShortBreak, FocusMode::LongBreak];

    pub fn minutes(&self) -> u32 {
        match self {
            FocusMode::Focus => 25,
            FocusMode::ShortBreak => 5,
            FocusMode::LongBreak => 15,
        }
    }

    pub fn secs(&self) -> u32 {
        self.minutes() * 60
    }
}

/// Background playlist picked next to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Vibe {
    Study,
    Sad,
    Energy,
}

impl Vibe {
    pub const ALL: [Vibe; 3] = [Vibe::Study, Vibe::Sad, Vibe::Energy];

    pub fn url(&self) -> &'static str {
        match self {
            Vibe::Study => "https://open.spotify.com/playlist/0vvXsWCC9xrXsKd4FyS8kM",
            Vibe::Sad => "https://open.spotify.com/playlist/37i9dQZF1DX7qK8ma5wgG1",
            Vibe::Energy => "https://open.spotify.com/playlist/37i9dQZF1DXdLEN7aqioXM",
        }
    }

    pub fn next(self) -> Vibe {
        let i = Vibe::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Vibe::ALL[(i + 1) % Vibe::ALL.len()]
    }
}

/// What a completed countdown produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    pub mode: FocusMode,
    pub level_up: Option<LevelUp>,
}

#[derive(Debug, Clone)]
pub struct FocusTimer {
    mode: FocusMode,
    remaining_secs: u32,
    running: bool,
    /// Sub-second time carried between advances.
    carry_ms: u64,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(FocusMode::Focus)
    }
}

impl FocusTimer {
    pub fn new(mode: FocusMode) -> Self {
        Self {
            mode,
            remaining_secs: mode.secs(),
            running: false,
            carry_ms: 0,
        }
    }

    pub fn mode(&self) -> FocusMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    /// 0.0 at the start of the mode, 1.0 when done.
    pub fn progress(&self) -> f64 {
        let total = self.mode.secs() as f64;
        1.0 - self.remaining_secs as f64 / total
    }

    pub fn toggle(&mut self) {
        if self.remaining_secs == 0 {
            self.remaining_secs = self.mode.secs();
        }
        self.running = !self.running;
        self.carry_ms = 0;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.carry_ms = 0;
        self.remaining_secs = self.mode.secs();
    }

    pub fn set_mode(&mut self, mode: FocusMode) {
        self.mode = mode;
        self.reset();
    }

    /// Count down by whole seconds. Reaching zero pauses the timer and pays
    /// the completion reward into `sink`.
    pub fn advance(&mut self, dt: Duration, sink: &mut dyn RewardSink) -> Result<Option<Completed>> {
        if !self.running {
            return Ok(None);
        }
        self.carry_ms += dt.as_millis() as u64;
        let whole = (self.carry_ms / 1000) as u32;
        self.carry_ms %= 1000;
        self.remaining_secs = self.remaining_secs.saturating_sub(whole);

        if self.remaining_secs > 0 {
            return Ok(None);
        }
        self.running = false;
        self.carry_ms = 0;
        info!(mode = %self.mode, "focus session complete");
        let level_up = sink.gain_xp(COMPLETION_XP)?;
        Ok(Some(Completed {
            mode: self.mode,
            level_up,
        }))
    }
}

/// The "what are you focusing on" line, saved on every edit.
pub struct FocusNote {
    text: String,
    store: Rc<dyn KvStore>,
}

impl std::fmt::Debug for FocusNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FocusNote").field(&self.text).finish()
    }
}

impl FocusNote {
    pub fn load(store: Rc<dyn KvStore>) -> Self {
        let text = storage::load_or_default(store.as_ref(), KEY_FOCUS_NOTE);
        Self { text, store }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, text: impl Into<String>) -> Result<()> {
        self.text = text.into();
        storage::save(self.store.as_ref(), KEY_FOCUS_NOTE, &self.text)
    }

    pub fn push(&mut self, c: char) -> Result<()> {
        let mut text = std::mem::take(&mut self.text);
        text.push(c);
        self.set(text)
    }

    pub fn pop(&mut self) -> Result<()> {
        let mut text = std::mem::take(&mut self.text);
        text.pop();
        self.set(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::Progression;

    #[derive(Default)]
    struct Tally(Progression);

    impl RewardSink for Tally {
        fn gain_xp(&mut self, amount: u32) -> Result<Option<LevelUp>> {
            Ok(self.0.gain_xp(amount))
        }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn vibes_cycle_through_distinct_playlists() {
        assert_eq!(Vibe::Study.next(), Vibe::Sad);
        assert_eq!(Vibe::Energy.next(), Vibe::Study);
        assert!(Vibe::ALL
            .iter()
            .all(|v| v.url().starts_with("https://open.spotify.com/playlist/")));
        assert_ne!(Vibe::Study.url(), Vibe::Energy.url());
    }

    #[test]
    fn modes_have_their_durations() {
        assert_eq!(FocusTimer::new(FocusMode::Focus).display(), "25:00");
        assert_eq!(FocusTimer::new(FocusMode::ShortBreak).display(), "05:00");
        assert_eq!(FocusTimer::new(FocusMode::LongBreak).display(), "15:00");
        assert_eq!(FocusMode::ShortBreak.to_string(), "Short Break");
    }

    #[test]
    fn paused_timer_does_not_move() {
        let mut t = FocusTimer::default();
        let mut sink = Tally::default();
        t.advance(secs(10), &mut sink).unwrap();
        assert_eq!(t.display(), "25:00");
    }

    #[test]
    fn counts_down_whole_seconds() {
        let mut t = FocusTimer::default();
        let mut sink = Tally::default();
        t.toggle();
        t.advance(Duration::from_millis(700), &mut sink).unwrap();
        assert_eq!(t.display(), "25:00");
        t.advance(Duration::from_millis(700), &mut sink).unwrap();
        assert_eq!(t.display(), "24:59");
        t.advance(secs(59), &mut sink).unwrap();
        assert_eq!(t.display(), "24:00");
    }

    #[test]
    fn completion_pays_fifty_xp_once() {
        let mut t = FocusTimer::new(FocusMode::ShortBreak);
        let mut sink = Tally::default();
        t.toggle();

        let done = t.advance(secs(300), &mut sink).unwrap().unwrap();
        assert_eq!(done.mode, FocusMode::ShortBreak);
        assert_eq!(done.level_up, None);
        assert_eq!(sink.0.xp, COMPLETION_XP);
        assert!(!t.is_running());
        assert_eq!(t.display(), "00:00");

        assert_eq!(t.advance(secs(5), &mut sink).unwrap(), None);
        assert_eq!(sink.0.xp, COMPLETION_XP);
    }

    #[test]
    fn note_is_saved_on_every_edit() {
        let store = Rc::new(crate::storage::MemoryStore::new());
        let mut note = FocusNote::load(store.clone());
        note.set("ship it").unwrap();
        note.push('!').unwrap();
        assert_eq!(FocusNote::load(store.clone()).text(), "ship it!");
        note.pop().unwrap();
        assert_eq!(FocusNote::load(store).text(), "ship it");
    }

    #[test]
    fn set_mode_resets_and_stops() {
        let mut t = FocusTimer::default();
        let mut sink = Tally::default();
        t.toggle();
        t.advance(secs(30), &mut sink).unwrap();
        t.set_mode(FocusMode::LongBreak);
        assert!(!t.is_running());
        assert_eq!(t.display(), "15:00");
    }
}
