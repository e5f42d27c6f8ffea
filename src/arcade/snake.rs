use std::collections::VecDeque;

use rand::{Rng, RngCore};

use super::{Ctx, Flow, Input, Key, MiniGame, PlayArea, Rect, Sprite, SpriteKind, Variant};

pub const TICK_MS: u64 = 150;
pub const CELL: f64 = 20.0;
pub const POINTS: u32 = 10;

const START: GridPos = GridPos { x: 10, y: 10 };
const FIRST_FOOD: GridPos = GridPos { x: 15, y: 10 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    fn rect(self) -> Rect {
        Rect::new(self.x as f64 * CELL, self.y as f64 * CELL, CELL, CELL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Up => Some(Direction::Up),
            Key::Down => Some(Direction::Down),
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            Key::Char(_) | Key::Space => None,
        }
    }
}

/// Outcome of one movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved,
    Ate,
    Crashed,
    BitSelf,
}

#[derive(Debug)]
pub struct Snake {
    cols: i32,
    rows: i32,
    body: VecDeque<GridPos>,
    heading: Direction,
    pending: Direction,
    food: GridPos,
}

impl Snake {
    pub fn new(area: PlayArea) -> Self {
        Self {
            cols: (area.width / CELL).floor() as i32,
            rows: (area.height / CELL).floor() as i32,
            body: VecDeque::from([START]),
            heading: Direction::Right,
            pending: Direction::Right,
            food: FIRST_FOOD,
        }
    }

    /// Head first.
    pub fn body(&self) -> impl Iterator<Item = &GridPos> {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn food(&self) -> GridPos {
        self.food
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn pending(&self) -> Direction {
        self.pending
    }

    /// Queue a turn for the next step. The reverse of the current heading is
    /// refused.
    pub fn request(&mut self, dir: Direction) -> bool {
        if dir == self.heading.opposite() {
            return false;
        }
        self.pending = dir;
        true
    }

    fn in_grid(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.cols && pos.y >= 0 && pos.y < self.rows
    }

    pub fn advance(&mut self, rng: &mut dyn RngCore) -> Step {
        self.heading = self.pending;
        let Some(&head) = self.body.front() else {
            return Step::Crashed;
        };
        let next = head.step(self.heading);

        if !self.in_grid(next) {
            return Step::Crashed;
        }
        if self.body.contains(&next) {
            return Step::BitSelf;
        }

        self.body.push_front(next);
        if next == self.food {
            // may land under the body
            self.food = GridPos::new(
                rng.gen_range(0..(self.cols - 1).max(1)),
                rng.gen_range(0..(self.rows - 1).max(1)),
            );
            Step::Ate
        } else {
            self.body.pop_back();
            Step::Moved
        }
    }
}

impl MiniGame for Snake {
    fn variant(&self) -> Variant {
        Variant::Snake
    }

    fn on_tick(&mut self, ctx: &mut Ctx<'_>) -> Flow {
        match self.advance(ctx.rng()) {
            Step::Moved => Flow::Continue,
            Step::Ate => {
                ctx.add_score(POINTS);
                Flow::Continue
            }
            Step::Crashed => Flow::Over(format!("Crashed! Score: {}", ctx.score())),
            Step::BitSelf => Flow::Over(format!("Bit yourself! Score: {}", ctx.score())),
        }
    }

    fn on_input(&mut self, input: &Input, _ctx: &mut Ctx<'_>) -> Flow {
        if let Input::Key(key) = *input {
            if let Some(dir) = Direction::from_key(key) {
                self.request(dir);
            }
        }
        Flow::Continue
    }

    fn on_stop(&mut self) {}

    fn sprites(&self) -> Vec<Sprite> {
        let mut sprites = vec![Sprite::new(SpriteKind::Food, self.food.rect())];
        sprites.extend(self.body.iter().enumerate().map(|(i, pos)| {
            let kind = if i == 0 {
                SpriteKind::SnakeHead
            } else {
                SpriteKind::SnakeBody
            };
            Sprite::new(kind, pos.rect())
        }));
        sprites
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::arcade::{Arcade, Variant};

    fn snake() -> Snake {
        Snake::new(PlayArea::default())
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(9)
    }

    #[test]
    fn grid_follows_play_area() {
        let s = Snake::new(PlayArea {
            width: 110.0,
            height: 65.0,
        });
        assert_eq!((s.cols, s.rows), (5, 3));
    }

    #[test]
    fn reverse_turn_is_refused() {
        let mut s = snake();
        assert!(!s.request(Direction::Left));
        assert_eq!(s.pending(), Direction::Right);

        assert!(s.request(Direction::Up));
        // still heading right until the next step commits the turn
        assert!(!s.request(Direction::Left));
        s.advance(&mut rng());
        assert_eq!(s.heading(), Direction::Up);
        assert!(!s.request(Direction::Down));
    }

    #[test]
    fn eating_grows_by_one() {
        let mut s = snake();
        let mut r = rng();
        for _ in 0..4 {
            assert_eq!(s.advance(&mut r), Step::Moved);
            assert_eq!(s.len(), 1);
        }
        assert_eq!(s.advance(&mut r), Step::Ate);
        assert_eq!(s.len(), 2);
        assert_eq!(s.body().next(), Some(&GridPos::new(15, 10)));
        assert!(s.food().x < s.cols - 1 && s.food().y < s.rows - 1);
    }

    #[test]
    fn leaving_the_grid_crashes() {
        let mut s = snake();
        let mut r = rng();
        s.request(Direction::Up);
        for _ in 0..10 {
            assert_ne!(s.advance(&mut r), Step::Crashed);
        }
        assert_eq!(s.body().next(), Some(&GridPos::new(10, 0)));
        assert_eq!(s.advance(&mut r), Step::Crashed);
    }

    #[test]
    fn running_into_the_body_bites() {
        let mut s = snake();
        s.body = VecDeque::from([
            GridPos::new(5, 5),
            GridPos::new(4, 5),
            GridPos::new(4, 6),
            GridPos::new(5, 6),
            GridPos::new(6, 6),
        ]);
        s.request(Direction::Down);
        assert_eq!(s.advance(&mut rng()), Step::BitSelf);
    }

    #[test]
    fn session_reports_crash_with_score() {
        let mut a = Arcade::with_seed(PlayArea::default(), 5);
        a.select(Variant::Snake);
        a.start().unwrap();

        // the first food sits in the path, the right wall is 20 steps away
        let over = a.advance(Duration::from_millis(TICK_MS * 20)).unwrap();
        assert!(over.score >= POINTS);
        assert_eq!(
            over.message,
            Some(format!("Crashed! Score: {}", over.score))
        );
        assert_eq!(a.live_listeners(), 0);
    }

    #[test]
    fn arrow_keys_steer() {
        let mut a = Arcade::with_seed(PlayArea::default(), 5);
        a.select(Variant::Snake);
        a.start().unwrap();
        a.input(Input::Key(Key::Down));
        a.advance(Duration::from_millis(TICK_MS));

        let head = a
            .sprites()
            .into_iter()
            .find(|s| s.kind == SpriteKind::SnakeHead)
            .unwrap();
        assert_eq!(head.rect, GridPos::new(10, 11).rect());
    }
}
