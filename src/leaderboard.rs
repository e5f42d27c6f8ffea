use std::cmp::Reverse;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::progression::Progression;

pub const BOTS: usize = 9;
pub const USER_NAME: &str = "You";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub level: u32,
    pub xp: u32,
    pub is_user: bool,
}

/// Simulated standings: the user plus a fresh set of bots, best first.
pub fn simulate(progress: &Progression, names: &[String], rng: &mut dyn RngCore) -> Vec<Entry> {
    let user = Entry {
        name: USER_NAME.to_string(),
        level: progress.level,
        xp: progress.xp,
        is_user: true,
    };

    let bots = (0..BOTS).map(|_| {
        let stem = names.choose(&mut *rng).map(String::as_str).unwrap_or("Bot");
        Entry {
            name: format!("{stem}{}", rng.gen_range(0..99)),
            level: rng.gen_range(1..=15),
            xp: rng.gen_range(0..100),
            is_user: false,
        }
    });

    std::iter::once(user)
        .chain(bots)
        .sorted_by_key(|e| (Reverse(e.level), Reverse(e.xp)))
        .collect()
}
