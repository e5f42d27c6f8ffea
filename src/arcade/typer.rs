use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tracing::debug;

use super::{Ctx, Flow, Input, Key, MiniGame, PlayArea, Rect, Sprite, SpriteKind, Variant};

pub const TICK_MS: u64 = 16;
pub const SPAWN_CHANCE: f64 = 0.02;
pub const MAX_WORDS: usize = 5;
pub const POINTS: u32 = 10;
/// Distance above the bottom edge at which a word counts as landed.
pub const FLOOR_MARGIN: f64 = 20.0;

const SPAWN_MARGIN: f64 = 50.0;
const CHAR_WIDTH: f64 = 10.0;
const WORD_HEIGHT: f64 = 16.0;

pub static WORDS: [&str; 20] = [
    "const", "let", "var", "array", "object", "function", "class", "html", "css", "grid", "flex",
    "pixel", "focus", "style", "code", "lofi", "neon", "dark", "void", "null",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub id: u64,
    pub text: &'static str,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    /// Characters matched so far.
    pub progress: usize,
}

impl Word {
    fn rect(&self) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.text.len() as f64 * CHAR_WIDTH,
            WORD_HEIGHT,
        )
    }

    fn expects(&self, c: char) -> bool {
        self.text[self.progress..].starts_with(c)
    }

    fn is_complete(&self) -> bool {
        self.progress >= self.text.len()
    }
}

/// Result of feeding one character to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Typed {
    Ignored,
    Matched,
    Completed,
}

/// Type the falling words before they land.
#[derive(Debug)]
pub struct Typer {
    area: PlayArea,
    words: Vec<Word>,
    target: Option<u64>,
    next_id: u64,
}

impl Typer {
    pub fn new(area: PlayArea) -> Self {
        Self {
            area,
            words: vec![],
            target: None,
            next_id: 0,
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn target(&self) -> Option<&Word> {
        self.target
            .and_then(|id| self.words.iter().find(|w| w.id == id))
    }

    pub fn spawn_word(&mut self, rng: &mut dyn RngCore) {
        let Some(&text) = WORDS.choose(&mut *rng) else {
            return;
        };
        let max_x = (self.area.width - SPAWN_MARGIN).max(1.0);
        let x = rng.gen_range(0.0..max_x);
        let speed = rng.gen_range(0.5..1.0);
        self.push_word(text, x, speed);
    }

    fn push_word(&mut self, text: &'static str, x: f64, speed: f64) {
        let id = self.next_id;
        self.next_id += 1;
        self.words.push(Word {
            id,
            text,
            x,
            y: 0.0,
            speed,
            progress: 0,
        });
    }

    /// Move every word down by its speed. Returns true once a word lands.
    pub fn fall(&mut self) -> bool {
        let floor = self.area.height - FLOOR_MARGIN;
        let mut landed = false;
        for word in &mut self.words {
            word.y += word.speed;
            landed |= word.y > floor;
        }
        landed
    }

    pub fn type_char(&mut self, c: char) -> Typed {
        let c = c.to_lowercase().next().unwrap_or(c);

        let pos = match self.target {
            Some(id) => self.words.iter().position(|w| w.id == id),
            None => self.words.iter().position(|w| w.text.starts_with(c)),
        };
        let Some(pos) = pos else {
            self.target = None;
            return Typed::Ignored;
        };

        let word = &mut self.words[pos];
        if !word.expects(c) {
            return Typed::Ignored;
        }
        word.progress += c.len_utf8();
        self.target = Some(word.id);

        if word.is_complete() {
            let done = self.words.remove(pos);
            debug!(word = done.text, "word typed");
            self.target = None;
            Typed::Completed
        } else {
            Typed::Matched
        }
    }
}

impl MiniGame for Typer {
    fn variant(&self) -> Variant {
        Variant::Typer
    }

    fn on_tick(&mut self, ctx: &mut Ctx<'_>) -> Flow {
        if self.words.len() < MAX_WORDS && ctx.rng().gen_bool(SPAWN_CHANCE) {
            self.spawn_word(ctx.rng());
        }
        if self.fall() {
            return Flow::Over(format!("Word hit floor! Score: {}", ctx.score()));
        }
        Flow::Continue
    }

    fn on_input(&mut self, input: &Input, ctx: &mut Ctx<'_>) -> Flow {
        if let Input::Key(Key::Char(c)) = *input {
            if self.type_char(c) == Typed::Completed {
                ctx.add_score(POINTS);
            }
        }
        Flow::Continue
    }

    fn on_stop(&mut self) {
        self.words.clear();
        self.target = None;
    }

    fn sprites(&self) -> Vec<Sprite> {
        self.words
            .iter()
            .map(|w| {
                let kind = SpriteKind::Word {
                    typed: w.progress,
                    locked: self.target == Some(w.id),
                };
                Sprite::labelled(kind, w.rect(), w.text)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::arcade::{Arcade, Variant};

    fn typer_with(words: &[&'static str]) -> Typer {
        let mut t = Typer::new(PlayArea::default());
        for (i, &w) in words.iter().enumerate() {
            t.push_word(w, i as f64 * 60.0, 1.0);
        }
        t
    }

    #[test]
    fn first_matching_word_becomes_target() {
        let mut t = typer_with(&["neon", "null", "code"]);
        assert_eq!(t.type_char('n'), Typed::Matched);
        assert_eq!(t.target().map(|w| w.text), Some("neon"));
        assert_eq!(t.target().map(|w| w.progress), Some(1));
    }

    #[test]
    fn completing_a_word_removes_it() {
        let mut t = typer_with(&["let", "css"]);
        assert_eq!(t.type_char('l'), Typed::Matched);
        assert_eq!(t.type_char('e'), Typed::Matched);
        assert_eq!(t.type_char('t'), Typed::Completed);
        assert_eq!(t.words().len(), 1);
        assert!(t.target().is_none());
    }

    #[test]
    fn wrong_key_leaves_state_unchanged() {
        let mut t = typer_with(&["grid", "flex"]);
        t.type_char('g');
        let before = t.words().to_vec();

        assert_eq!(t.type_char('x'), Typed::Ignored);
        assert_eq!(t.words(), &before[..]);
        assert_eq!(t.target().map(|w| w.text), Some("grid"));

        // no word starts with z
        let mut idle = typer_with(&["grid"]);
        assert_eq!(idle.type_char('z'), Typed::Ignored);
        assert!(idle.target().is_none());
    }

    #[test]
    fn input_is_lower_cased() {
        let mut t = typer_with(&["void"]);
        assert_eq!(t.type_char('V'), Typed::Matched);
    }

    #[test]
    fn word_past_floor_lands() {
        let mut t = typer_with(&["dark"]);
        t.words[0].y = PlayArea::default().height - FLOOR_MARGIN - 0.5;
        assert!(t.fall());
    }

    #[test]
    fn spawned_words_come_from_the_bank() {
        let mut t = Typer::new(PlayArea::default());
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            t.spawn_word(&mut rng);
        }
        for w in t.words() {
            assert!(WORDS.contains(&w.text));
            assert!(w.x >= 0.0 && w.x < 550.0);
            assert!((0.5..1.0).contains(&w.speed));
        }
    }

    #[test]
    fn typing_a_falling_word_scores_ten() {
        let mut a = Arcade::with_seed(PlayArea::default(), 11);
        a.select(Variant::Typer);
        a.start().unwrap();

        let mut label = None;
        for _ in 0..2000 {
            a.advance(Duration::from_millis(TICK_MS));
            if let Some(s) = a.sprites().into_iter().next() {
                label = s.label;
                break;
            }
        }
        let label = label.expect("a word should spawn");
        for c in label.chars() {
            a.input(Input::Key(Key::Char(c)));
        }
        assert_eq!(a.score(), POINTS);
        assert!(a.sprites().is_empty());
    }
}
