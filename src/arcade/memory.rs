use std::time::Duration;

use rand::Rng;
use tracing::debug;

use super::{Ctx, Flow, Input, MiniGame, PlayArea, Rect, Sprite, SpriteKind, Variant};
use crate::scheduler::TimerId;

pub const GRID: usize = 3;
pub const CELLS: usize = GRID * GRID;
pub const FIRST_ROUND_MS: u64 = 500;
pub const PLAYBACK_MS: u64 = 600;
pub const HIGHLIGHT_MS: u64 = 300;
pub const NEXT_ROUND_MS: u64 = 1000;

const ROUND: u64 = 0;
const PLAYBACK: u64 = 1;
const UNLIGHT: u64 = 2;

/// Repeat the growing sequence of lit tiles.
#[derive(Debug)]
pub struct Memory {
    area: PlayArea,
    sequence: Vec<usize>,
    /// Next tile to replay, or next tile expected from the player.
    cursor: usize,
    waiting: bool,
    lit: Option<usize>,
    playback: Option<TimerId>,
}

impl Memory {
    pub fn new(area: PlayArea) -> Self {
        Self {
            area,
            sequence: vec![],
            cursor: 0,
            waiting: false,
            lit: None,
            playback: None,
        }
    }

    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    pub fn is_waiting_for_input(&self) -> bool {
        self.waiting
    }

    /// The square grid is centred in the play area.
    pub fn cell_rect(&self, index: usize) -> Rect {
        let side = self.area.width.min(self.area.height);
        let cell = side / GRID as f64;
        let left = (self.area.width - side) / 2.0;
        let top = (self.area.height - side) / 2.0;
        let (row, col) = (index / GRID, index % GRID);
        Rect::new(
            left + col as f64 * cell,
            top + row as f64 * cell,
            cell,
            cell,
        )
    }

    fn cell_at(&self, x: f64, y: f64) -> Option<usize> {
        (0..CELLS).find(|&i| self.cell_rect(i).contains(x, y))
    }

    fn next_round(&mut self, ctx: &mut Ctx<'_>) {
        self.sequence.push(ctx.rng().gen_range(0..CELLS));
        self.cursor = 0;
        self.waiting = false;
        ctx.raise_score_to(self.sequence.len() as u32 - 1);
        self.playback = Some(ctx.every(Duration::from_millis(PLAYBACK_MS), PLAYBACK));
        debug!(len = self.sequence.len(), "memory round");
    }

    fn play_next(&mut self, ctx: &mut Ctx<'_>) {
        match self.sequence.get(self.cursor) {
            Some(&cell) => {
                self.lit = Some(cell);
                ctx.after(Duration::from_millis(HIGHLIGHT_MS), UNLIGHT);
                self.cursor += 1;
            }
            None => {
                if let Some(id) = self.playback.take() {
                    ctx.cancel(id);
                }
                self.cursor = 0;
                self.waiting = true;
            }
        }
    }

    fn pick(&mut self, cell: usize, ctx: &mut Ctx<'_>) -> Flow {
        if !self.waiting {
            return Flow::Continue;
        }
        if self.sequence.get(self.cursor) != Some(&cell) {
            return Flow::Over(format!(
                "Wrong tile! Sequence reached: {}",
                self.sequence.len().saturating_sub(1)
            ));
        }

        self.cursor += 1;
        if self.cursor == self.sequence.len() {
            self.waiting = false;
            ctx.after(Duration::from_millis(NEXT_ROUND_MS), ROUND);
        }
        Flow::Continue
    }
}

impl MiniGame for Memory {
    fn variant(&self) -> Variant {
        Variant::MemorySequence
    }

    fn on_start(&mut self, ctx: &mut Ctx<'_>) {
        ctx.after(Duration::from_millis(FIRST_ROUND_MS), ROUND);
    }

    fn on_wake(&mut self, tag: u64, ctx: &mut Ctx<'_>) -> Flow {
        match tag {
            ROUND => self.next_round(ctx),
            PLAYBACK => self.play_next(ctx),
            UNLIGHT => self.lit = None,
            _ => {}
        }
        Flow::Continue
    }

    fn on_input(&mut self, input: &Input, ctx: &mut Ctx<'_>) -> Flow {
        let cell = match *input {
            Input::Cell(i) if i < CELLS => Some(i),
            Input::Click { x, y } => self.cell_at(x, y),
            _ => None,
        };
        match cell {
            Some(cell) => self.pick(cell, ctx),
            None => Flow::Continue,
        }
    }

    fn on_stop(&mut self) {
        self.sequence.clear();
        self.lit = None;
        self.waiting = false;
        self.playback = None;
    }

    fn sprites(&self) -> Vec<Sprite> {
        (0..CELLS)
            .map(|i| {
                let kind = SpriteKind::Cell {
                    lit: self.lit == Some(i),
                };
                Sprite::labelled(kind, self.cell_rect(i), (i + 1).to_string())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::{Arcade, Variant};

    fn running() -> Arcade {
        let mut a = Arcade::with_seed(PlayArea::default(), 21);
        a.select(Variant::MemorySequence);
        a.start().unwrap();
        a
    }

    fn lit(a: &Arcade) -> Option<usize> {
        a.sprites()
            .iter()
            .position(|s| s.kind == SpriteKind::Cell { lit: true })
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn cells_tile_the_centre_square() {
        let m = Memory::new(PlayArea::default());
        assert_eq!(m.cell_rect(0), Rect::new(150.0, 0.0, 100.0, 100.0));
        assert_eq!(m.cell_rect(8), Rect::new(350.0, 200.0, 100.0, 100.0));
        assert_eq!(m.cell_at(260.0, 150.0), Some(4));
        assert_eq!(m.cell_at(10.0, 10.0), None);
    }

    #[test]
    fn playback_lights_each_tile_briefly() {
        let mut a = running();
        a.advance(ms(1099));
        assert_eq!(lit(&a), None);
        a.advance(ms(1));
        assert!(lit(&a).is_some());
        a.advance(ms(300));
        assert_eq!(lit(&a), None);
    }

    #[test]
    fn input_is_locked_during_playback() {
        let mut a = running();
        a.advance(ms(1100));
        let shown = lit(&a).unwrap();
        let wrong = (shown + 1) % CELLS;
        assert_eq!(a.input(Input::Cell(wrong)), None);
        assert!(a.is_running());
    }

    #[test]
    fn failing_round_two_reports_one() {
        let mut a = running();

        // round 1: one tile shown at 1100, input opens at 1700
        a.advance(ms(1100));
        let first = lit(&a).unwrap();
        a.advance(ms(600));
        assert_eq!(a.score(), 0);
        assert_eq!(a.input(Input::Cell(first)), None);

        // round 2 starts 1000ms later and replays two tiles
        a.advance(ms(1000));
        assert_eq!(a.score(), 1);
        a.advance(ms(600));
        assert_eq!(lit(&a), Some(first));
        a.advance(ms(1200));

        let wrong = (first + 1) % CELLS;
        let over = a.input(Input::Cell(wrong)).unwrap();
        assert_eq!(
            over.message.as_deref(),
            Some("Wrong tile! Sequence reached: 1")
        );
        assert_eq!(over.score, 1);
        assert_eq!(a.live_timers(), 0);
    }

    #[test]
    fn clicks_map_onto_cells() {
        let mut a = running();
        a.advance(ms(1100));
        let first = lit(&a).unwrap();
        a.advance(ms(600));

        let r = a.sprites()[first].rect;
        let click = Input::Click {
            x: r.x + r.w / 2.0,
            y: r.y + r.h / 2.0,
        };
        assert_eq!(a.input(click), None);
        a.advance(ms(1000));
        assert_eq!(a.score(), 1);
    }
}
