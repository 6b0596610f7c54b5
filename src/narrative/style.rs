//! Narrative style configuration (spec.md §4.G).

use serde::{Deserialize, Serialize};

use crate::narrative::vocabulary::Tone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    Minimal,
    Standard,
    Detailed,
    Verbose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    First,
    Second,
    Third,
    ThirdLimited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphStyle {
    /// One sentence per paragraph.
    Staccato,
    /// Sentences grouped into a handful of flowing paragraphs.
    Flowing,
    /// Everything in a single block.
    Unbroken,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub tone: Tone,
    pub detail: DetailLevel,
    pub perspective: Perspective,
    pub include_internal_monologue: bool,
    pub include_timestamps: bool,
    pub paragraph_style: ParagraphStyle,
    /// 0.0 (flat) .. 1.0 (maximal emphasis on feeling).
    pub emotional_emphasis: f64,
}

impl StyleConfig {
    pub fn new(tone: Tone) -> Self {
        Self {
            tone,
            detail: DetailLevel::Standard,
            perspective: Perspective::Third,
            include_internal_monologue: false,
            include_timestamps: false,
            paragraph_style: ParagraphStyle::Flowing,
            emotional_emphasis: 0.5,
        }
    }

    pub fn emotional_emphasis_clamped(&self) -> f64 {
        self.emotional_emphasis.clamp(0.0, 1.0)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::new(Tone::Clinical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_clinical_third_person() {
        let style = StyleConfig::default();
        assert_eq!(style.tone, Tone::Clinical);
        assert_eq!(style.perspective, Perspective::Third);
    }

    #[test]
    fn emphasis_clamps_out_of_range_values() {
        let mut style = StyleConfig::default();
        style.emotional_emphasis = 1.5;
        assert_eq!(style.emotional_emphasis_clamped(), 1.0);
        style.emotional_emphasis = -0.2;
        assert_eq!(style.emotional_emphasis_clamped(), 0.0);
    }
}
