use std::time::Duration;

use rand::Rng;

use super::{Ctx, Flow, Input, MiniGame, PlayArea, Rect, Sprite, SpriteKind, Variant};
use crate::scheduler::TimerId;

pub const SPAWN_MS: u64 = 1000;
pub const FALL_MS: u64 = 30;
pub const FALL_STEP: f64 = 5.0;
pub const FALLER_SIZE: f64 = 20.0;
pub const RECEIVER_HALF_WIDTH: f64 = 30.0;
pub const RECEIVER_HEIGHT: f64 = 20.0;
pub const POINTS: u32 = 10;

#[derive(Debug, Clone)]
struct Faller {
    id: u64,
    rect: Rect,
    timer: TimerId,
}

/// Move the basket under falling stars.
///
/// Each star owns its own fall timer, so star state never leaks between stars.
#[derive(Debug)]
pub struct Catcher {
    area: PlayArea,
    receiver_x: f64,
    fallers: Vec<Faller>,
    next_id: u64,
}

impl Catcher {
    pub fn new(area: PlayArea) -> Self {
        Self {
            area,
            receiver_x: area.width / 2.0,
            fallers: vec![],
            next_id: 0,
        }
    }

    /// Center of the receiver along x.
    pub fn receiver_x(&self) -> f64 {
        self.receiver_x
    }

    pub fn receiver(&self) -> Rect {
        Rect::new(
            self.receiver_x - RECEIVER_HALF_WIDTH,
            self.area.height - RECEIVER_HEIGHT - 10.0,
            RECEIVER_HALF_WIDTH * 2.0,
            RECEIVER_HEIGHT,
        )
    }

    pub fn fallers(&self) -> Vec<Rect> {
        self.fallers.iter().map(|f| f.rect).collect()
    }

    fn move_receiver(&mut self, x: f64) {
        let max = (self.area.width - RECEIVER_HALF_WIDTH).max(RECEIVER_HALF_WIDTH);
        self.receiver_x = x.clamp(RECEIVER_HALF_WIDTH, max);
    }

    fn fall(&mut self, id: u64, ctx: &mut Ctx<'_>) {
        let receiver = self.receiver();
        let Some(pos) = self.fallers.iter().position(|f| f.id == id) else {
            return;
        };

        let faller = &mut self.fallers[pos];
        faller.rect.y += FALL_STEP;

        if faller.rect.overlaps(&receiver) {
            let caught = self.fallers.remove(pos);
            ctx.cancel(caught.timer);
            ctx.add_score(POINTS);
        } else if faller.rect.top() > self.area.height {
            let missed = self.fallers.remove(pos);
            ctx.cancel(missed.timer);
        }
    }
}

impl MiniGame for Catcher {
    fn variant(&self) -> Variant {
        Variant::Catcher
    }

    fn on_tick(&mut self, ctx: &mut Ctx<'_>) -> Flow {
        let max_x = (self.area.width - FALLER_SIZE).max(1.0);
        let x = ctx.rng().gen_range(0.0..max_x);
        let id = self.next_id;
        self.next_id += 1;
        let timer = ctx.every(Duration::from_millis(FALL_MS), id);
        self.fallers.push(Faller {
            id,
            rect: Rect::new(x, 0.0, FALLER_SIZE, FALLER_SIZE),
            timer,
        });
        Flow::Continue
    }

    fn on_wake(&mut self, tag: u64, ctx: &mut Ctx<'_>) -> Flow {
        self.fall(tag, ctx);
        Flow::Continue
    }

    fn on_input(&mut self, input: &Input, _ctx: &mut Ctx<'_>) -> Flow {
        if let Input::PointerMove { x } = *input {
            self.move_receiver(x);
        }
        Flow::Continue
    }

    fn on_stop(&mut self) {
        self.fallers.clear();
    }

    fn sprites(&self) -> Vec<Sprite> {
        let mut sprites: Vec<Sprite> = self
            .fallers
            .iter()
            .map(|f| Sprite::new(SpriteKind::Faller, f.rect))
            .collect();
        sprites.push(Sprite::new(SpriteKind::Receiver, self.receiver()));
        sprites
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::{Arcade, Variant};

    fn running() -> Arcade {
        let mut a = Arcade::with_seed(PlayArea::default(), 3);
        a.select(Variant::Catcher);
        a.start().unwrap();
        a
    }

    fn faller_rects(a: &Arcade) -> Vec<Rect> {
        a.sprites()
            .into_iter()
            .filter(|s| s.kind == SpriteKind::Faller)
            .map(|s| s.rect)
            .collect()
    }

    fn receiver_rect(a: &Arcade) -> Rect {
        a.sprites()
            .into_iter()
            .find(|s| s.kind == SpriteKind::Receiver)
            .map(|s| s.rect)
            .unwrap()
    }

    #[test]
    fn receiver_is_clamped_to_bounds() {
        let mut a = running();
        a.input(Input::PointerMove { x: -100.0 });
        assert_eq!(receiver_rect(&a).left(), 0.0);

        a.input(Input::PointerMove { x: 10_000.0 });
        assert_eq!(receiver_rect(&a).right(), a.area().width);
    }

    #[test]
    fn objects_fall_five_units_every_thirty_ms() {
        let mut a = running();
        a.advance(Duration::from_millis(1000));
        assert_eq!(faller_rects(&a)[0].y, 0.0);

        a.advance(Duration::from_millis(90));
        assert_eq!(faller_rects(&a)[0].y, 15.0);
    }

    #[test]
    fn catching_scores_and_removes() {
        let mut a = running();
        a.advance(Duration::from_millis(1000));
        let star = faller_rects(&a)[0];
        a.input(Input::PointerMove {
            x: star.x + star.w / 2.0,
        });

        // the star reaches the receiver about 1530ms after spawning
        a.advance(Duration::from_millis(1800));
        assert_eq!(a.score(), 10);
        assert!(faller_rects(&a).iter().all(|r| r.y < 200.0));
    }

    #[test]
    fn missed_object_is_removed_without_penalty() {
        let mut a = running();
        a.advance(Duration::from_millis(1000));
        let star = faller_rects(&a)[0];
        // park the receiver as far from the star as possible
        let away = if star.x > a.area().width / 2.0 { 0.0 } else { a.area().width };
        a.input(Input::PointerMove { x: away });

        // the star passes the floor at 1830ms after spawning
        a.advance(Duration::from_millis(2000));
        assert_eq!(a.score(), 0);
        assert!(a.is_running());
        assert!(faller_rects(&a).iter().all(|r| r.top() <= a.area().height));
    }
}
