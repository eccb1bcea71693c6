use std::f64::consts::TAU;

use crate::prize::{total_probability, Prize, NO_WIN_LABEL};

/// The angular slice of the wheel corresponding to one prize, or to the
/// synthesized no-win outcome. Angles are radians; segments are contiguous,
/// non-overlapping and walk the circle in prize order.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Index into the prize list; `prizes.len()` marks the no-win slice.
    pub index: usize,
    pub label: String,
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn bisector(&self) -> f64 {
        0.5 * (self.start + self.end)
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// Map a prize set onto angular segments of the circle.
///
/// Probabilities summing to less than 1 leave a trailing no-win segment that
/// closes the circle exactly at 2π. Probabilities summing to more than 1 are
/// scaled down by the total, so the segments always partition [0, 2π) and
/// every declared prize stays reachable. Zero-probability prizes produce
/// zero-width segments rather than being dropped.
pub fn layout(prizes: &[Prize]) -> Vec<Segment> {
    let total = total_probability(prizes);
    let scale = if total > 1.0 { TAU / total } else { TAU };

    let mut segments = Vec::with_capacity(prizes.len() + 1);
    let mut cursor = 0.0;
    for (index, prize) in prizes.iter().enumerate() {
        let span = prize.probability * scale;
        segments.push(Segment {
            index,
            label: prize.name.clone(),
            start: cursor,
            end: cursor + span,
        });
        cursor += span;
    }

    if total < 1.0 {
        segments.push(Segment {
            index: prizes.len(),
            label: NO_WIN_LABEL.to_string(),
            start: cursor,
            end: TAU,
        });
    }

    segments
}
