//! Level, XP, quests and the shortcut portal, kept in one persisted record.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::{self, KvStore, KEY_PROGRESSION};

pub const XP_PER_LEVEL: u32 = 100;
pub const QUEST_XP: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub name: String,
    pub url: String,
}

impl Shortcut {
    fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

pub fn default_shortcuts() -> Vec<Shortcut> {
    vec![
        Shortcut::new("Google", "https://google.com"),
        Shortcut::new("YouTube", "https://youtube.com"),
        Shortcut::new("GitHub", "https://github.com"),
        Shortcut::new("Spotify", "https://spotify.com"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub level: u32,
    pub xp: u32,
    #[serde(default)]
    pub quests: Vec<Quest>,
    #[serde(default = "default_shortcuts")]
    pub shortcuts: Vec<Shortcut>,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            quests: vec![],
            shortcuts: default_shortcuts(),
        }
    }
}

/// Reported when a reward pushed the level up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub level: u32,
}

impl fmt::Display for LevelUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LEVEL UP! You reached Level {}!", self.level)
    }
}

impl Progression {
    /// Overflow carries: every full 100 XP is one level, the rest stays.
    pub fn gain_xp(&mut self, amount: u32) -> Option<LevelUp> {
        let total = self.xp + amount;
        let gained = total / XP_PER_LEVEL;
        self.level += gained;
        self.xp = total % XP_PER_LEVEL;
        (gained > 0).then_some(LevelUp { level: self.level })
    }

    /// Fold surplus xp from a hand-edited or older record into levels.
    fn normalize(&mut self) {
        self.level = self.level.max(1) + self.xp / XP_PER_LEVEL;
        self.xp %= XP_PER_LEVEL;
    }

    /// Insert at the top. Ids are millisecond timestamps, bumped to stay unique.
    pub fn add_quest(&mut self, text: &str, now_ms: i64) -> Result<&Quest> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::invalid_input("Quest text cannot be empty."));
        }
        let newest = self.quests.iter().map(|q| q.id).max();
        let id = match newest {
            Some(max) if max >= now_ms => max + 1,
            _ => now_ms,
        };
        self.quests.insert(
            0,
            Quest {
                id,
                text: text.to_string(),
                completed: false,
            },
        );
        Ok(&self.quests[0])
    }

    /// Completing awards quest XP; un-completing awards nothing.
    /// Returns `None` when the id is unknown.
    pub fn toggle_quest(&mut self, id: i64) -> Option<Option<LevelUp>> {
        let quest = self.quests.iter_mut().find(|q| q.id == id)?;
        quest.completed = !quest.completed;
        if quest.completed {
            Some(self.gain_xp(QUEST_XP))
        } else {
            Some(None)
        }
    }

    pub fn delete_quest(&mut self, id: i64) -> Option<Quest> {
        let pos = self.quests.iter().position(|q| q.id == id)?;
        Some(self.quests.remove(pos))
    }

    pub fn add_shortcut(&mut self, name: &str, url: &str) -> Result<&Shortcut> {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() || url.is_empty() {
            return Err(Error::invalid_input("Please enter both Name and URL."));
        }
        let url = if url.starts_with("http") {
            url.to_string()
        } else {
            format!("https://{url}")
        };
        self.shortcuts.push(Shortcut {
            name: name.to_string(),
            url,
        });
        Ok(&self.shortcuts[self.shortcuts.len() - 1])
    }

    pub fn delete_shortcut(&mut self, index: usize) -> Option<Shortcut> {
        (index < self.shortcuts.len()).then(|| self.shortcuts.remove(index))
    }

    /// Back to level 1 with no quests. Shortcuts are kept.
    pub fn reset(&mut self) {
        self.level = 1;
        self.xp = 0;
        self.quests.clear();
    }
}

/// Anything that can take XP.
pub trait RewardSink {
    fn gain_xp(&mut self, amount: u32) -> Result<Option<LevelUp>>;
}

/// The progression record bound to its store; every mutation is persisted.
pub struct Ledger {
    record: Progression,
    store: Rc<dyn KvStore>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    pub fn load(store: Rc<dyn KvStore>) -> Self {
        let mut record: Progression = storage::load_or_default(store.as_ref(), KEY_PROGRESSION);
        record.normalize();
        Self { record, store }
    }

    pub fn record(&self) -> &Progression {
        &self.record
    }

    pub fn level(&self) -> u32 {
        self.record.level
    }

    pub fn xp(&self) -> u32 {
        self.record.xp
    }

    pub fn quests(&self) -> &[Quest] {
        &self.record.quests
    }

    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.record.shortcuts
    }

    fn persist(&self) -> Result<()> {
        storage::save(self.store.as_ref(), KEY_PROGRESSION, &self.record)
    }

    pub fn add_quest(&mut self, text: &str) -> Result<()> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let quest = self.record.add_quest(text, now_ms)?;
        debug!(id = quest.id, "quest added");
        self.persist()
    }

    pub fn toggle_quest(&mut self, id: i64) -> Result<Option<LevelUp>> {
        match self.record.toggle_quest(id) {
            Some(level_up) => {
                if let Some(up) = level_up {
                    info!(level = up.level, "level up");
                }
                self.persist()?;
                Ok(level_up)
            }
            None => {
                warn!(id, "quest not found");
                Ok(None)
            }
        }
    }

    pub fn delete_quest(&mut self, id: i64) -> Result<()> {
        if self.record.delete_quest(id).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    pub fn add_shortcut(&mut self, name: &str, url: &str) -> Result<()> {
        self.record.add_shortcut(name, url)?;
        self.persist()
    }

    pub fn delete_shortcut(&mut self, index: usize) -> Result<()> {
        if self.record.delete_shortcut(index).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        self.record.reset();
        info!("progress reset");
        self.persist()
    }
}

impl RewardSink for Ledger {
    fn gain_xp(&mut self, amount: u32) -> Result<Option<LevelUp>> {
        let level_up = self.record.gain_xp(amount);
        if let Some(up) = level_up {
            info!(level = up.level, "level up");
        }
        self.persist()?;
        Ok(level_up)
    }
}
