//! The arcade: six mini-games sharing one session lifecycle.
//!
//! ```text
//! select ──> Ready ──start──> Running ──(stop | loss | time's up)──> Ready
//! ```
//!
//! [`Arcade`] owns the scheduler, the key-listener slot and the single
//! session slot. Every transition into `Running` first releases whatever loop
//! or listener the previous session held, so at most one game is ever live.

pub mod catcher;
pub mod clicker;
pub mod geometry;
pub mod harness;
pub mod input;
pub mod memory;
pub mod runner;
pub mod session;
pub mod snake;
pub mod typer;

use std::fmt;
use std::time::Duration;

use rand::{rngs::StdRng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::scheduler::{Scheduler, TimerId};

pub use geometry::{PlayArea, Rect};
pub use harness::Harness;
pub use input::{Input, Key, KeyListeners, ListenerId};
pub use session::{Env, GameOver, ReadySession, RunningSession};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Clicker,
    Catcher,
    Runner,
    Snake,
    Typer,
    #[value(name = "memory")]
    #[serde(rename = "memory")]
    MemorySequence,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::Clicker,
        Variant::Catcher,
        Variant::Runner,
        Variant::Snake,
        Variant::Typer,
        Variant::MemorySequence,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Variant::Clicker => "STAR CLICKER",
            Variant::Catcher => "STAR CATCHER",
            Variant::Runner => "DINO RUN",
            Variant::Snake => "NEON SNAKE",
            Variant::Typer => "RAINY TYPER",
            Variant::MemorySequence => "MEMORY MATRIX",
        }
    }

    /// Cadence of the main update loop. Memory is turn based and has none.
    pub fn tick_period(&self) -> Option<Duration> {
        let ms = match self {
            Variant::Clicker => clicker::SPAWN_MS,
            Variant::Catcher => catcher::SPAWN_MS,
            Variant::Runner => runner::TICK_MS,
            Variant::Snake => snake::TICK_MS,
            Variant::Typer => typer::TICK_MS,
            Variant::MemorySequence => return None,
        };
        Some(Duration::from_millis(ms))
    }

    pub fn round_secs(&self) -> Option<u32> {
        match self {
            Variant::Clicker | Variant::Catcher | Variant::Typer => Some(harness::ROUND_SECS),
            Variant::Runner | Variant::Snake | Variant::MemorySequence => None,
        }
    }

    /// Whether the game takes global key presses.
    pub fn listens_for_keys(&self) -> bool {
        matches!(self, Variant::Runner | Variant::Snake | Variant::Typer)
    }

    pub fn build(&self, area: PlayArea) -> Box<dyn MiniGame> {
        match self {
            Variant::Clicker => Box::new(clicker::Clicker::new(area)),
            Variant::Catcher => Box::new(catcher::Catcher::new(area)),
            Variant::Runner => Box::new(runner::Runner::new(area)),
            Variant::Snake => Box::new(snake::Snake::new(area)),
            Variant::Typer => Box::new(typer::Typer::new(area)),
            Variant::MemorySequence => Box::new(memory::Memory::new(area)),
        }
    }
}

/// Payload carried by every arcade timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Loop,
    Countdown,
    /// Variant-owned timer; the number is meaningful only to the variant.
    Sub(u64),
}

/// What a game step decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Over(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Target,
    Faller,
    Receiver,
    Player,
    Obstacle,
    SnakeHead,
    SnakeBody,
    Food,
    Word { typed: usize, locked: bool },
    Cell { lit: bool },
}

/// A visual element the display surface should draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub rect: Rect,
    pub label: Option<String>,
}

impl Sprite {
    pub fn new(kind: SpriteKind, rect: Rect) -> Self {
        Self {
            kind,
            rect,
            label: None,
        }
    }

    pub fn labelled(kind: SpriteKind, rect: Rect, label: impl Into<String>) -> Self {
        Self {
            kind,
            rect,
            label: Some(label.into()),
        }
    }
}

/// Everything a game may touch while handling a tick, wake or input.
pub struct Ctx<'a> {
    sched: &'a mut Scheduler<Wake>,
    subs: &'a mut Vec<TimerId>,
    rng: &'a mut dyn RngCore,
    harness: &'a mut Harness,
    area: PlayArea,
}

impl<'a> Ctx<'a> {
    pub(crate) fn new(
        sched: &'a mut Scheduler<Wake>,
        subs: &'a mut Vec<TimerId>,
        rng: &'a mut dyn RngCore,
        harness: &'a mut Harness,
        area: PlayArea,
    ) -> Self {
        Self {
            sched,
            subs,
            rng,
            harness,
            area,
        }
    }

    /// Periodic sub-timer owned by the session and cancelled on stop.
    pub fn every(&mut self, period: Duration, tag: u64) -> TimerId {
        let id = self.sched.every(period, Wake::Sub(tag));
        self.subs.push(id);
        id
    }

    /// One-shot sub-timer owned by the session and cancelled on stop.
    pub fn after(&mut self, delay: Duration, tag: u64) -> TimerId {
        let id = self.sched.after(delay, Wake::Sub(tag));
        self.subs.push(id);
        id
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.sched.cancel(id);
        self.subs.retain(|sub| *sub != id);
    }

    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }

    pub fn area(&self) -> PlayArea {
        self.area
    }

    pub fn score(&self) -> u32 {
        self.harness.score()
    }

    pub fn add_score(&mut self, points: u32) {
        self.harness.add(points);
    }

    pub fn raise_score_to(&mut self, value: u32) {
        self.harness.raise_to(value);
    }
}

/// Capability set every variant implements.
pub trait MiniGame: fmt::Debug {
    fn variant(&self) -> Variant;

    /// Called once when the session enters Running, after the shared loops exist.
    fn on_start(&mut self, _ctx: &mut Ctx<'_>) {}

    /// One invocation of the main update loop.
    fn on_tick(&mut self, _ctx: &mut Ctx<'_>) -> Flow {
        Flow::Continue
    }

    /// A sub-timer scheduled through [`Ctx::every`] or [`Ctx::after`] came due.
    fn on_wake(&mut self, _tag: u64, _ctx: &mut Ctx<'_>) -> Flow {
        Flow::Continue
    }

    fn on_input(&mut self, input: &Input, ctx: &mut Ctx<'_>) -> Flow;

    /// Discard transient visuals. Timers are already cancelled by the session.
    fn on_stop(&mut self);

    fn sprites(&self) -> Vec<Sprite>;
}

#[derive(Debug)]
enum Slot {
    Ready(ReadySession),
    Running(RunningSession),
}

/// Session controller: holds the shared resources and the one session slot.
#[derive(Debug)]
pub struct Arcade {
    env: Env,
    slot: Slot,
}

impl Arcade {
    pub fn new(area: PlayArea, rng: Box<dyn RngCore>) -> Self {
        Self {
            env: Env::new(area, rng),
            slot: Slot::Ready(ReadySession::new(Variant::Clicker)),
        }
    }

    pub fn with_seed(area: PlayArea, seed: u64) -> Self {
        Self::new(area, Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn variant(&self) -> Variant {
        match &self.slot {
            Slot::Ready(s) => s.variant(),
            Slot::Running(s) => s.variant(),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.slot, Slot::Running(_))
    }

    pub fn harness(&self) -> &Harness {
        match &self.slot {
            Slot::Ready(s) => s.harness(),
            Slot::Running(s) => s.harness(),
        }
    }

    pub fn score(&self) -> u32 {
        self.harness().score()
    }

    pub fn area(&self) -> PlayArea {
        self.env.area()
    }

    pub fn sprites(&self) -> Vec<Sprite> {
        match &self.slot {
            Slot::Ready(_) => vec![],
            Slot::Running(s) => s.sprites(),
        }
    }

    pub fn running(&self) -> Option<&RunningSession> {
        match &self.slot {
            Slot::Running(s) => Some(s),
            Slot::Ready(_) => None,
        }
    }

    /// Timers alive in the scheduler (update loop, countdown and sub-timers).
    pub fn live_timers(&self) -> usize {
        self.env.live_timers()
    }

    pub fn live_listeners(&self) -> usize {
        self.env.live_listeners()
    }

    /// Switch games. A running session is torn down silently, without reward.
    pub fn select(&mut self, variant: Variant) {
        if let Slot::Running(running) = self.take_slot() {
            let (_, over) = running.stop(&mut self.env, None);
            info!(from = %over.variant, to = %variant, "switched game mid-session");
        }
        self.slot = Slot::Ready(ReadySession::new(variant));
    }

    pub fn start(&mut self) -> Result<()> {
        match self.take_slot() {
            Slot::Ready(ready) => {
                let variant = ready.variant();
                match ready.start(&mut self.env) {
                    Ok(running) => {
                        self.slot = Slot::Running(running);
                        Ok(())
                    }
                    Err(err) => {
                        self.slot = Slot::Ready(ReadySession::new(variant));
                        Err(err)
                    }
                }
            }
            Slot::Running(running) => {
                let variant = running.variant();
                self.slot = Slot::Running(running);
                Err(Error::InvalidTransition {
                    variant,
                    state: "already running",
                })
            }
        }
    }

    /// Explicit stop from the user. No notification is produced.
    pub fn stop(&mut self) -> Option<GameOver> {
        match self.take_slot() {
            Slot::Running(running) => {
                let (ready, over) = running.stop(&mut self.env, None);
                self.slot = Slot::Ready(ready);
                Some(over)
            }
            ready => {
                self.slot = ready;
                None
            }
        }
    }

    /// Advance the clock by `dt`, running every timer that comes due.
    /// Returns the game-over report when the session ended on its own.
    pub fn advance(&mut self, dt: Duration) -> Option<GameOver> {
        let until = self.env.now_ms() + dt.as_millis() as u64;
        let mut ended = None;

        while let Some(fired) = self.env.pop_due(until) {
            let flow = match &mut self.slot {
                Slot::Running(running) => running.dispatch(&mut self.env, fired),
                Slot::Ready(_) => Flow::Continue,
            };
            if let Flow::Over(message) = flow {
                ended = self.finish(message);
            }
        }

        self.env.settle(until);
        ended
    }

    pub fn input(&mut self, input: Input) -> Option<GameOver> {
        let flow = match &mut self.slot {
            Slot::Running(running) => running.input(&mut self.env, &input),
            Slot::Ready(_) => Flow::Continue,
        };
        match flow {
            Flow::Over(message) => self.finish(message),
            Flow::Continue => None,
        }
    }

    fn finish(&mut self, message: String) -> Option<GameOver> {
        match self.take_slot() {
            Slot::Running(running) => {
                let (ready, over) = running.stop(&mut self.env, Some(message));
                self.slot = Slot::Ready(ready);
                Some(over)
            }
            ready => {
                self.slot = ready;
                None
            }
        }
    }

    fn take_slot(&mut self) -> Slot {
        let placeholder = Slot::Ready(ReadySession::new(self.variant()));
        std::mem::replace(&mut self.slot, placeholder)
    }
}
