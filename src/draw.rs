use rand::Rng;

use crate::prize::{total_probability, Prize};

/// Weighted selection over a prize set.
///
/// Returns the index of the chosen prize; `prizes.len()` means the draw
/// landed in the uncovered no-win tail. A single in-order cumulative scan,
/// O(n) in the prize count.
///
/// The draw is taken over `max(Σp, 1)`, so a set summing below 1 keeps its
/// declared per-prize probabilities (the shortfall is the no-win chance),
/// while a set summing above 1 is effectively normalized by its total.
pub fn pick(prizes: &[Prize], rng: &mut impl Rng) -> usize {
    let total = total_probability(prizes);
    let r: f64 = rng.random::<f64>() * total.max(1.0);

    let mut cumulative = 0.0;
    for (index, prize) in prizes.iter().enumerate() {
        cumulative += prize.probability;
        if r < cumulative {
            return index;
        }
    }

    if total < 1.0 || prizes.is_empty() {
        // Uncovered tail: the synthesized no-win outcome.
        prizes.len()
    } else {
        // Float rounding pushed r past the last cumulative bound.
        prizes.len() - 1
    }
}

/// Like [`pick`], but materializes the chosen prize, synthesizing the
/// no-win pseudo-prize for the uncovered tail.
pub fn draw(prizes: &[Prize], rng: &mut impl Rng) -> Prize {
    let index = pick(prizes, rng);
    prizes.get(index).cloned().unwrap_or_else(Prize::no_win)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prize::NO_WIN_LABEL;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const N: usize = 100_000;

    fn frequencies(prizes: &[Prize], seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = vec![0usize; prizes.len() + 1];
        for _ in 0..N {
            counts[pick(prizes, &mut rng)] += 1;
        }
        counts.iter().map(|&c| c as f64 / N as f64).collect()
    }

    #[test]
    fn full_coverage_matches_declared_probabilities() {
        let prizes = vec![
            Prize::new("甲", 0.2),
            Prize::new("乙", 0.3),
            Prize::new("丙", 0.5),
        ];
        let freq = frequencies(&prizes, 7);
        // ±0.01 is over 6 sigma at n = 100k for these probabilities.
        assert!((freq[0] - 0.2).abs() < 0.01, "甲 at {}", freq[0]);
        assert!((freq[1] - 0.3).abs() < 0.01, "乙 at {}", freq[1]);
        assert!((freq[2] - 0.5).abs() < 0.01, "丙 at {}", freq[2]);
        assert_eq!(freq[3], 0.0, "no draw can fall past a full circle");
    }

    #[test]
    fn shortfall_lands_on_no_win() {
        let prizes = vec![Prize::new("甲", 0.2), Prize::new("乙", 0.3)];
        let freq = frequencies(&prizes, 11);
        assert!((freq[2] - 0.5).abs() < 0.01, "no-win at {}", freq[2]);

        let mut rng = StdRng::seed_from_u64(11);
        let drawn = (0..N).map(|_| draw(&prizes, &mut rng));
        let no_win = drawn.filter(|p| p.name == NO_WIN_LABEL).count() as f64 / N as f64;
        assert!((no_win - 0.5).abs() < 0.01);
    }

    #[test]
    fn sole_certain_prize_always_wins() {
        let prizes = vec![Prize::new("A", 1.0)];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1_000 {
            assert_eq!(draw(&prizes, &mut rng).name, "A");
        }
    }

    #[test]
    fn oversubscribed_set_never_synthesizes_no_win() {
        let prizes = vec![Prize::new("甲", 1.0), Prize::new("乙", 2.0)];
        let freq = frequencies(&prizes, 19);
        assert_eq!(freq[2], 0.0);
        assert!((freq[0] - 1.0 / 3.0).abs() < 0.01);
        assert!((freq[1] - 2.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn empty_set_draws_no_win() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(pick(&[], &mut rng), 0);
        assert_eq!(draw(&[], &mut rng).name, NO_WIN_LABEL);
    }

    #[test]
    fn zero_probability_prize_is_never_drawn() {
        let prizes = vec![Prize::new("甲", 0.0), Prize::new("乙", 1.0)];
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..10_000 {
            assert_eq!(pick(&prizes, &mut rng), 1);
        }
    }
}
