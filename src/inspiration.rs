//! Daily inspiration: a seeded picture, quote and greeting that rotate on a
//! configurable interval.

use std::rc::Rc;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::content::{self, Quote};
use crate::error::{Error, Result};
use crate::storage::{self, KvStore, KEY_INSPIRATION};

pub const DEFAULT_REFRESH_HOURS: f64 = 24.0;
pub const SEED_RANGE: u32 = 1_000_000;
const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;

fn default_refresh_hours() -> f64 {
    DEFAULT_REFRESH_HOURS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspirationRecord {
    #[serde(default)]
    pub seed: Option<u32>,
    #[serde(default)]
    pub last_update_epoch_ms: i64,
    #[serde(default = "default_refresh_hours")]
    pub refresh_hours: f64,
}

impl Default for InspirationRecord {
    fn default() -> Self {
        Self {
            seed: None,
            last_update_epoch_ms: 0,
            refresh_hours: DEFAULT_REFRESH_HOURS,
        }
    }
}

impl InspirationRecord {
    fn interval_ms(&self) -> i64 {
        (self.refresh_hours * HOUR_MS) as i64
    }

    pub fn is_stale(&self, now_ms: i64) -> bool {
        self.seed.is_none() || now_ms - self.last_update_epoch_ms > self.interval_ms()
    }

    pub fn next_refresh_ms(&self) -> i64 {
        self.last_update_epoch_ms + self.interval_ms()
    }
}

/// Everything derived from one seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub seed: u32,
    pub image_url: String,
    pub quote: Quote,
    pub greeting: String,
}

pub fn image_url(seed: u32) -> String {
    format!("https://picsum.photos/seed/{seed}/600/300")
}

/// A zero seed picks like a one-digit seed.
fn numeric(seed: u32) -> usize {
    if seed == 0 {
        1
    } else {
        seed as usize
    }
}

pub struct Inspiration {
    record: InspirationRecord,
    quotes: Vec<Quote>,
    greetings: Vec<String>,
    store: Rc<dyn KvStore>,
}

impl std::fmt::Debug for Inspiration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inspiration")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl Inspiration {
    pub fn load(store: Rc<dyn KvStore>) -> Result<Self> {
        let record = storage::load_or_default(store.as_ref(), KEY_INSPIRATION);
        Ok(Self {
            record,
            quotes: content::quotes()?,
            greetings: content::greetings()?,
            store,
        })
    }

    pub fn record(&self) -> &InspirationRecord {
        &self.record
    }

    pub fn refresh_hours(&self) -> f64 {
        self.record.refresh_hours
    }

    /// Roll a new seed when forced, stale, or never seeded.
    /// Returns whether the card changed.
    pub fn check(&mut self, now_ms: i64, force: bool, rng: &mut dyn RngCore) -> Result<bool> {
        if !force && !self.record.is_stale(now_ms) {
            return Ok(false);
        }
        let seed = rng.gen_range(0..SEED_RANGE);
        self.record.seed = Some(seed);
        self.record.last_update_epoch_ms = now_ms;
        debug!(seed, "new inspiration seed");
        storage::save(self.store.as_ref(), KEY_INSPIRATION, &self.record)?;
        Ok(true)
    }

    /// Change the interval and re-roll immediately.
    pub fn set_refresh_hours(
        &mut self,
        hours: f64,
        now_ms: i64,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(Error::invalid_input("Refresh interval must be positive."));
        }
        self.record.refresh_hours = hours;
        self.check(now_ms, true, rng)?;
        Ok(())
    }

    pub fn card(&self) -> Option<Card> {
        let seed = self.record.seed?;
        let n = numeric(seed);
        let (Some(quote), Some(greeting)) = (
            self.quotes.get(n % self.quotes.len().max(1)),
            self.greetings.get((n + 7) % self.greetings.len().max(1)),
        ) else {
            warn!("inspiration content is empty");
            return None;
        };
        Some(Card {
            seed,
            image_url: image_url(seed),
            quote: quote.clone(),
            greeting: greeting.clone(),
        })
    }

    /// Time left before the next automatic refresh, formatted like `5h 03m`.
    pub fn next_refresh_label(&self, now_ms: i64) -> String {
        let left_min = ((self.record.next_refresh_ms() - now_ms).max(0) / 60_000) as u64;
        format!("{}h {:02}m", left_min / 60, left_min % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const HOUR: i64 = 3_600_000;

    fn setup() -> (Rc<MemoryStore>, Inspiration, StdRng) {
        let store = Rc::new(MemoryStore::new());
        let insp = Inspiration::load(store.clone()).unwrap();
        (store, insp, StdRng::seed_from_u64(4))
    }

    #[test]
    fn first_check_always_seeds() {
        let (_, mut insp, mut rng) = setup();
        assert!(insp.card().is_none());
        assert!(insp.check(0, false, &mut rng).unwrap());
        assert!(insp.card().unwrap().seed < SEED_RANGE);
    }

    #[test]
    fn seed_kept_until_interval_passes() {
        let (_, mut insp, mut rng) = setup();
        insp.check(HOUR, false, &mut rng).unwrap();
        let seed = insp.record().seed;

        assert!(!insp.check(HOUR * 25, false, &mut rng).unwrap());
        assert_eq!(insp.record().seed, seed);
        assert!(insp.check(HOUR * 25 + 1, false, &mut rng).unwrap());
        assert_eq!(insp.record().last_update_epoch_ms, HOUR * 25 + 1);
    }

    #[test]
    fn card_is_derived_from_seed() {
        let (_, mut insp, mut rng) = setup();
        insp.check(0, false, &mut rng).unwrap();
        insp.record.seed = Some(123_456);

        let card = insp.card().unwrap();
        assert_eq!(card.image_url, "https://picsum.photos/seed/123456/600/300");
        // 123456 % 6 == 0, (123456 + 7) % 9 == 1
        assert_eq!(card.quote.author, "Steve Jobs");
        assert_eq!(card.greeting, "Hello!");
    }

    #[test]
    fn interval_change_persists_and_rerolls() {
        let (store, mut insp, mut rng) = setup();
        insp.check(0, false, &mut rng).unwrap();
        insp.set_refresh_hours(1.0, 10, &mut rng).unwrap();
        assert!(insp.set_refresh_hours(0.0, 10, &mut rng).is_err());

        let reloaded = Inspiration::load(store).unwrap();
        assert_eq!(reloaded.refresh_hours(), 1.0);
        assert_eq!(reloaded.record().last_update_epoch_ms, 10);
        assert_eq!(reloaded.next_refresh_label(10 + HOUR / 2), "0h 30m");
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let rec: InspirationRecord =
            serde_json::from_str(r#"{"seed":5,"lastUpdateEpochMs":9}"#).unwrap();
        assert_eq!(rec.seed, Some(5));
        assert_eq!(rec.refresh_hours, DEFAULT_REFRESH_HOURS);
    }
}
