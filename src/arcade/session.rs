use std::fmt;
use std::time::Duration;

use rand::RngCore;
use tracing::{debug, info};

use super::{Ctx, Flow, Harness, Input, KeyListeners, ListenerId, MiniGame, PlayArea, Sprite, Variant, Wake};
use crate::error::Result;
use crate::scheduler::{Fired, Scheduler, TimerId};

/// Resources shared by every session: the clock, the key-listener slot, the
/// random source and the play field.
pub struct Env {
    sched: Scheduler<Wake>,
    keys: KeyListeners,
    rng: Box<dyn RngCore>,
    area: PlayArea,
}

impl Env {
    pub fn new(area: PlayArea, rng: Box<dyn RngCore>) -> Self {
        Self {
            sched: Scheduler::new(),
            keys: KeyListeners::new(),
            rng,
            area,
        }
    }

    pub fn area(&self) -> PlayArea {
        self.area
    }

    pub fn now_ms(&self) -> u64 {
        self.sched.now_ms()
    }

    pub fn live_timers(&self) -> usize {
        self.sched.live_count()
    }

    pub fn live_listeners(&self) -> usize {
        self.keys.live_count()
    }

    pub(crate) fn pop_due(&mut self, until_ms: u64) -> Option<Fired<Wake>> {
        self.sched.pop_due(until_ms)
    }

    pub(crate) fn settle(&mut self, until_ms: u64) {
        self.sched.settle(until_ms)
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("sched", &self.sched)
            .field("keys", &self.keys)
            .field("area", &self.area)
            .finish_non_exhaustive()
    }
}

/// Report of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOver {
    pub variant: Variant,
    pub score: u32,
    /// Terminal notification for the user. `None` when the user stopped the game.
    pub message: Option<String>,
}

/// A selected game that is not running. Only this state can start.
#[derive(Debug)]
pub struct ReadySession {
    variant: Variant,
    harness: Harness,
}

impl ReadySession {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            harness: Harness::for_variant(variant),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Score and timer still on display (fresh, or from the last round).
    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    pub fn start(self, env: &mut Env) -> Result<RunningSession> {
        let variant = self.variant;
        let mut harness = Harness::for_variant(variant);

        env.keys.clear();

        let countdown = variant
            .round_secs()
            .map(|_| env.sched.every(Duration::from_secs(1), Wake::Countdown));
        let tick = variant
            .tick_period()
            .map(|period| env.sched.every(period, Wake::Loop));

        let listener = if variant.listens_for_keys() {
            match env.keys.register() {
                Ok(id) => Some(id),
                Err(err) => {
                    for id in tick.into_iter().chain(countdown) {
                        env.sched.cancel(id);
                    }
                    return Err(err);
                }
            }
        } else {
            None
        };

        let mut game = variant.build(env.area);
        let mut subs = Vec::new();
        {
            let mut ctx = Ctx::new(&mut env.sched, &mut subs, &mut *env.rng, &mut harness, env.area);
            game.on_start(&mut ctx);
        }

        info!(%variant, "game started");
        Ok(RunningSession {
            variant,
            game,
            harness,
            tick,
            countdown,
            subs,
            listener,
        })
    }
}

/// The live game. Exclusively owns its loops, sub-timers and key listener.
#[derive(Debug)]
pub struct RunningSession {
    variant: Variant,
    game: Box<dyn MiniGame>,
    harness: Harness,
    tick: Option<TimerId>,
    countdown: Option<TimerId>,
    subs: Vec<TimerId>,
    listener: Option<ListenerId>,
}

impl RunningSession {
    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    pub fn sprites(&self) -> Vec<Sprite> {
        self.game.sprites()
    }

    pub fn game(&self) -> &dyn MiniGame {
        self.game.as_ref()
    }

    pub fn dispatch(&mut self, env: &mut Env, fired: Fired<Wake>) -> Flow {
        match fired.payload {
            Wake::Countdown => {
                if self.harness.countdown() {
                    Flow::Over(format!("Time's up! Final Score: {}", self.harness.score()))
                } else {
                    Flow::Continue
                }
            }
            Wake::Loop => {
                let mut ctx = Ctx::new(&mut env.sched, &mut self.subs, &mut *env.rng, &mut self.harness, env.area);
                self.game.on_tick(&mut ctx)
            }
            Wake::Sub(tag) => {
                if !env.sched.is_live(fired.id) {
                    self.subs.retain(|id| *id != fired.id);
                }
                let mut ctx = Ctx::new(&mut env.sched, &mut self.subs, &mut *env.rng, &mut self.harness, env.area);
                self.game.on_wake(tag, &mut ctx)
            }
        }
    }

    pub fn input(&mut self, env: &mut Env, input: &Input) -> Flow {
        if let Input::Key(_) = input {
            let registered = self
                .listener
                .map(|id| env.keys.is_registered(id))
                .unwrap_or(false);
            if !registered {
                return Flow::Continue;
            }
        }
        let mut ctx = Ctx::new(&mut env.sched, &mut self.subs, &mut *env.rng, &mut self.harness, env.area);
        self.game.on_input(input, &mut ctx)
    }

    /// Tear down: cancel every timer, release the listener, clear visuals.
    pub fn stop(mut self, env: &mut Env, message: Option<String>) -> (ReadySession, GameOver) {
        for id in self.tick.take().into_iter().chain(self.countdown.take()) {
            env.sched.cancel(id);
        }
        for id in self.subs.drain(..) {
            env.sched.cancel(id);
        }
        if let Some(id) = self.listener.take() {
            env.keys.unregister(id);
        }
        self.game.on_stop();

        let over = GameOver {
            variant: self.variant,
            score: self.harness.score(),
            message,
        };
        match &over.message {
            Some(msg) => info!(variant = %over.variant, score = over.score, %msg, "game over"),
            None => debug!(variant = %over.variant, score = over.score, "game stopped"),
        }

        let ready = ReadySession {
            variant: self.variant,
            harness: self.harness,
        };
        (ready, over)
    }
}
