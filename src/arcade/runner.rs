use std::time::Duration;

use super::{Ctx, Flow, Input, Key, MiniGame, PlayArea, Rect, Sprite, SpriteKind, Variant};

pub const TICK_MS: u64 = 50;
pub const JUMP_MS: u64 = 500;
pub const TICKS_PER_POINT: u64 = 10;
/// Obstacle edges the player may graze without crashing.
pub const HIT_INSET: f64 = 10.0;

const PLAYER_X: f64 = 50.0;
const PLAYER_W: f64 = 30.0;
const PLAYER_H: f64 = 40.0;
const JUMP_HEIGHT: f64 = 90.0;
const OBSTACLE_W: f64 = 30.0;
const OBSTACLE_H: f64 = 40.0;
/// Ticks for the obstacle to cross the whole field.
const SWEEP_TICKS: f64 = 30.0;

const LAND: u64 = 0;

/// Jump over the obstacle that sweeps across the field forever.
#[derive(Debug)]
pub struct Runner {
    area: PlayArea,
    obstacle_x: f64,
    airborne: bool,
    ticks: u64,
}

impl Runner {
    pub fn new(area: PlayArea) -> Self {
        Self {
            area,
            obstacle_x: area.width,
            airborne: false,
            ticks: 0,
        }
    }

    pub fn is_airborne(&self) -> bool {
        self.airborne
    }

    pub fn player(&self) -> Rect {
        let ground = self.area.height - PLAYER_H;
        let y = if self.airborne {
            ground - JUMP_HEIGHT
        } else {
            ground
        };
        Rect::new(PLAYER_X, y, PLAYER_W, PLAYER_H)
    }

    pub fn obstacle(&self) -> Rect {
        Rect::new(
            self.obstacle_x,
            self.area.height - OBSTACLE_H,
            OBSTACLE_W,
            OBSTACLE_H,
        )
    }

    fn speed(&self) -> f64 {
        (self.area.width + OBSTACLE_W) / SWEEP_TICKS
    }

    pub fn crashed(&self) -> bool {
        let hitbox = self.obstacle().inset(HIT_INSET, HIT_INSET, HIT_INSET, 0.0);
        self.player().overlaps(&hitbox)
    }
}

impl MiniGame for Runner {
    fn variant(&self) -> Variant {
        Variant::Runner
    }

    fn on_tick(&mut self, ctx: &mut Ctx<'_>) -> Flow {
        self.ticks += 1;
        if self.ticks % TICKS_PER_POINT == 0 {
            ctx.add_score(1);
        }

        self.obstacle_x -= self.speed();
        if self.obstacle().right() < 0.0 {
            self.obstacle_x = self.area.width;
        }

        if self.crashed() {
            return Flow::Over(format!("Ouch! Game Over. Score: {}", ctx.score()));
        }
        Flow::Continue
    }

    fn on_wake(&mut self, tag: u64, _ctx: &mut Ctx<'_>) -> Flow {
        if tag == LAND {
            self.airborne = false;
        }
        Flow::Continue
    }

    fn on_input(&mut self, input: &Input, ctx: &mut Ctx<'_>) -> Flow {
        if let Input::Key(Key::Space) = input {
            if !self.airborne {
                self.airborne = true;
                ctx.after(Duration::from_millis(JUMP_MS), LAND);
            }
        }
        Flow::Continue
    }

    fn on_stop(&mut self) {
        self.obstacle_x = self.area.width;
        self.airborne = false;
    }

    fn sprites(&self) -> Vec<Sprite> {
        vec![
            Sprite::new(SpriteKind::Player, self.player()),
            Sprite::new(SpriteKind::Obstacle, self.obstacle()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::{Arcade, Variant};

    fn running() -> Arcade {
        let mut a = Arcade::with_seed(PlayArea::default(), 1);
        a.select(Variant::Runner);
        a.start().unwrap();
        a
    }

    #[test]
    fn standing_still_hits_the_obstacle() {
        let mut a = running();
        // the obstacle enters the hit window on tick 26
        assert_eq!(a.advance(Duration::from_millis(1250)), None);
        assert_eq!(a.score(), 2);

        let over = a.advance(Duration::from_millis(50)).unwrap();
        assert_eq!(over.message.as_deref(), Some("Ouch! Game Over. Score: 2"));
        assert_eq!(over.score, 2);
        assert_eq!(a.live_timers(), 0);
        assert_eq!(a.live_listeners(), 0);
    }

    #[test]
    fn jumping_clears_the_obstacle() {
        let mut a = running();
        a.advance(Duration::from_millis(1000));
        a.input(Input::Key(Key::Space));

        assert_eq!(a.advance(Duration::from_millis(1000)), None);
        assert!(a.is_running());
        assert_eq!(a.score(), 4);
    }

    #[test]
    fn jump_cannot_be_retriggered_midair() {
        let mut a = running();
        a.input(Input::Key(Key::Space));
        let timers = a.live_timers();
        a.advance(Duration::from_millis(200));
        a.input(Input::Key(Key::Space));
        assert_eq!(a.live_timers(), timers);

        // lands 500ms after the first press, not the second
        a.advance(Duration::from_millis(300));
        let player = a
            .sprites()
            .into_iter()
            .find(|s| s.kind == SpriteKind::Player)
            .unwrap();
        assert_eq!(player.rect.bottom(), a.area().height);
    }

    #[test]
    fn grazing_the_edge_is_forgiven() {
        let mut r = Runner::new(PlayArea::default());
        // obstacle left edge 5 units inside the player's right edge
        r.obstacle_x = PLAYER_X + PLAYER_W - 5.0;
        assert!(r.player().overlaps(&r.obstacle()));
        assert!(!r.crashed());
    }
}
