use crate::model::Athlete;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTracker {
    scores: [u32; 2],
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scores(score_a: u32, score_b: u32) -> Self {
        Self {
            scores: [score_a, score_b],
        }
    }

    pub fn get(&self, athlete: Athlete) -> u32 {
        self.scores[athlete.index()]
    }

    pub fn pair(&self) -> (u32, u32) {
        (self.scores[0], self.scores[1])
    }

    /// Adds `delta`, flooring at zero. There is no ceiling.
    pub fn adjust(&mut self, athlete: Athlete, delta: i64) {
        let slot = &mut self.scores[athlete.index()];
        let next = i64::from(*slot).saturating_add(delta).max(0);
        *slot = u32::try_from(next).unwrap_or(u32::MAX);
    }

    pub fn reset(&mut self) {
        self.scores = [0, 0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrement_floors_at_zero() {
        let mut score = ScoreTracker::new();
        score.adjust(Athlete::A, -1);
        assert_eq!(score.get(Athlete::A), 0);
        score.adjust(Athlete::B, 3);
        score.adjust(Athlete::B, -5);
        assert_eq!(score.pair(), (0, 0));
    }

    #[test]
    fn athletes_are_independent() {
        let mut score = ScoreTracker::new();
        score.adjust(Athlete::A, 1);
        score.adjust(Athlete::A, 1);
        score.adjust(Athlete::B, 1);
        assert_eq!(score.pair(), (2, 1));
    }

    #[test]
    fn extreme_deltas_saturate() {
        let mut score = ScoreTracker::with_scores(1, 0);
        score.adjust(Athlete::A, i64::MAX);
        assert_eq!(score.get(Athlete::A), u32::MAX);
        score.adjust(Athlete::A, i64::MIN);
        assert_eq!(score.get(Athlete::A), 0);
        assert_eq!(score.get(Athlete::B), 0);
    }
}
