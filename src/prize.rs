use serde::{Deserialize, Serialize};

/// Reserved label for the synthesized no-win outcome. Never user-entered;
/// it only exists as the probability mass left unassigned by the prize list.
pub const NO_WIN_LABEL: &str = "未中奖";

/// A named, weighted outcome of a lottery draw, optionally carrying a
/// display image. Probabilities are intended to lie in [0, 1] but the sum
/// across a prize set is not required to be 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub name: String,
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Prize {
    pub fn new(name: impl Into<String>, probability: f64) -> Self {
        Self {
            name: name.into(),
            probability,
            image: None,
        }
    }

    /// The synthesized no-win pseudo-prize returned when a draw lands in
    /// the uncovered probability tail.
    pub fn no_win() -> Self {
        Self {
            name: NO_WIN_LABEL.to_string(),
            probability: 0.0,
            image: None,
        }
    }

    pub fn is_no_win(&self) -> bool {
        self.name == NO_WIN_LABEL
    }
}

/// Outcome of the most recent completed spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub name: String,
    pub image: Option<String>,
}

impl From<&Prize> for RoundResult {
    fn from(prize: &Prize) -> Self {
        Self {
            name: prize.name.clone(),
            image: prize.image.clone(),
        }
    }
}

pub fn total_probability(prizes: &[Prize]) -> f64 {
    prizes.iter().map(|p| p.probability).sum()
}

/// Built-in prize set used when no session exists or the backend is
/// unreachable. Declared probabilities sum to 0.8, leaving a 0.2 no-win tail.
pub fn default_prizes() -> Vec<Prize> {
    vec![
        Prize::new("点歌券一张", 0.10),
        Prize::new("翻唱一首歌", 0.05),
        Prize::new("专属表情包", 0.20),
        Prize::new("晚安语音", 0.20),
        Prize::new("手机壁纸", 0.25),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prizes_leave_a_no_win_tail() {
        let total = total_probability(&default_prizes());
        assert!(total < 1.0, "defaults must leave room for the no-win slice");
        assert!((total - 0.8).abs() < 1e-12);
    }

    #[test]
    fn no_win_is_recognized() {
        assert!(Prize::no_win().is_no_win());
        assert!(!Prize::new("点歌券", 0.1).is_no_win());
    }

    #[test]
    fn prize_wire_format_round_trips() {
        let json = r#"[{"name":"点歌券一张","probability":0.1,"image":"https://cdn.example/p.png"},
                       {"name":"晚安语音","probability":0.2}]"#;
        let prizes: Vec<Prize> = serde_json::from_str(json).unwrap();
        assert_eq!(prizes.len(), 2);
        assert_eq!(prizes[0].image.as_deref(), Some("https://cdn.example/p.png"));
        assert_eq!(prizes[1].image, None);

        let back = serde_json::to_string(&prizes).unwrap();
        assert!(!back.contains("\"image\":null"));
        let again: Vec<Prize> = serde_json::from_str(&back).unwrap();
        assert_eq!(again, prizes);
    }
}
