use std::time::Duration;

use rand::Rng;
use tracing::debug;

use super::{Ctx, Flow, Input, MiniGame, PlayArea, Rect, Sprite, SpriteKind, Variant};
use crate::scheduler::TimerId;

pub const SPAWN_MS: u64 = 800;
pub const TARGET_LIFETIME_MS: u64 = 2000;
pub const TARGET_SIZE: f64 = 40.0;
pub const POINTS: u32 = 10;

#[derive(Debug, Clone)]
struct Target {
    id: u64,
    rect: Rect,
    expiry: TimerId,
}

/// Click the star before it fades.
#[derive(Debug)]
pub struct Clicker {
    area: PlayArea,
    targets: Vec<Target>,
    next_id: u64,
}

impl Clicker {
    pub fn new(area: PlayArea) -> Self {
        Self {
            area,
            targets: vec![],
            next_id: 0,
        }
    }

    pub fn targets(&self) -> Vec<Rect> {
        self.targets.iter().map(|t| t.rect).collect()
    }

    fn spawn(&mut self, ctx: &mut Ctx<'_>) {
        let max_x = (self.area.width - TARGET_SIZE).max(1.0);
        let max_y = (self.area.height - TARGET_SIZE).max(1.0);
        let x = ctx.rng().gen_range(0.0..max_x);
        let y = ctx.rng().gen_range(0.0..max_y);

        let id = self.next_id;
        self.next_id += 1;
        let expiry = ctx.after(Duration::from_millis(TARGET_LIFETIME_MS), id);
        self.targets.push(Target {
            id,
            rect: Rect::new(x, y, TARGET_SIZE, TARGET_SIZE),
            expiry,
        });
    }
}

impl MiniGame for Clicker {
    fn variant(&self) -> Variant {
        Variant::Clicker
    }

    fn on_tick(&mut self, ctx: &mut Ctx<'_>) -> Flow {
        self.spawn(ctx);
        Flow::Continue
    }

    fn on_wake(&mut self, tag: u64, _ctx: &mut Ctx<'_>) -> Flow {
        self.targets.retain(|t| t.id != tag);
        Flow::Continue
    }

    fn on_input(&mut self, input: &Input, ctx: &mut Ctx<'_>) -> Flow {
        if let Input::Click { x, y } = *input {
            // newest target is drawn on top
            if let Some(pos) = self.targets.iter().rposition(|t| t.rect.contains(x, y)) {
                let hit = self.targets.remove(pos);
                ctx.cancel(hit.expiry);
                ctx.add_score(POINTS);
                debug!(score = ctx.score(), "star clicked");
            }
        }
        Flow::Continue
    }

    fn on_stop(&mut self) {
        self.targets.clear();
    }

    fn sprites(&self) -> Vec<Sprite> {
        self.targets
            .iter()
            .map(|t| Sprite::new(SpriteKind::Target, t.rect))
            .collect()
    }
}
