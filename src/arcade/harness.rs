use super::Variant;

/// Length of a fixed-duration round.
pub const ROUND_SECS: u32 = 30;

/// Score and countdown shared by every variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harness {
    score: u32,
    time_remaining: Option<u32>,
}

impl Harness {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            score: 0,
            time_remaining: variant.round_secs(),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add(&mut self, points: u32) {
        self.score += points;
    }

    /// Raise the shown score to `value`. The score never goes down mid-session.
    pub fn raise_to(&mut self, value: u32) {
        self.score = self.score.max(value);
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.time_remaining
    }

    /// One second elapsed. Returns true when the countdown just hit zero.
    pub fn countdown(&mut self) -> bool {
        match self.time_remaining.as_mut() {
            Some(secs) => {
                *secs = secs.saturating_sub(1);
                *secs == 0
            }
            None => false,
        }
    }

    pub fn timer_label(&self) -> String {
        match self.time_remaining {
            Some(secs) => format!("{secs}s"),
            None => "∞".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_duration_variants_count_down() {
        let mut h = Harness::for_variant(Variant::Clicker);
        assert_eq!(h.time_remaining(), Some(ROUND_SECS));
        assert_eq!(h.timer_label(), "30s");

        for _ in 0..ROUND_SECS - 1 {
            assert!(!h.countdown());
        }
        assert!(h.countdown());
        assert_eq!(h.timer_label(), "0s");
    }

    #[test]
    fn endless_variants_never_expire() {
        let mut h = Harness::for_variant(Variant::Snake);
        assert_eq!(h.time_remaining(), None);
        assert!(!h.countdown());
        assert_eq!(h.timer_label(), "∞");
    }

    #[test]
    fn raise_never_lowers() {
        let mut h = Harness::for_variant(Variant::MemorySequence);
        h.raise_to(3);
        h.raise_to(1);
        assert_eq!(h.score(), 3);
        h.add(10);
        assert_eq!(h.score(), 13);
    }
}
