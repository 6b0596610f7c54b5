//! The tone x emotion vocabulary matrix (spec.md §4.G): every tone defines
//! every bank for every emotional state. No tone is allowed to fall back to
//! a default — a missing entry here is a build defect, not a renderer concern.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::loop_::EmotionalState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Hopeful,
    Desperate,
    Clinical,
    Melancholic,
    DarkHumor,
    Philosophical,
    Terse,
    Poetic,
}

impl Tone {
    pub const ALL: [Tone; 8] = [
        Tone::Hopeful,
        Tone::Desperate,
        Tone::Clinical,
        Tone::Melancholic,
        Tone::DarkHumor,
        Tone::Philosophical,
        Tone::Terse,
        Tone::Poetic,
    ];
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tone::Hopeful => "hopeful",
            Tone::Desperate => "desperate",
            Tone::Clinical => "clinical",
            Tone::Melancholic => "melancholic",
            Tone::DarkHumor => "dark_humor",
            Tone::Philosophical => "philosophical",
            Tone::Terse => "terse",
            Tone::Poetic => "poetic",
        };
        write!(f, "{s}")
    }
}

/// One tone's full bank set.
#[derive(Debug, Clone)]
struct ToneBank {
    death_verbs: Vec<&'static str>,
    reset_verbs: Vec<&'static str>,
    decision_verbs: Vec<&'static str>,
    emotional_adjectives: HashMap<EmotionalState, Vec<&'static str>>,
    connectors: Vec<&'static str>,
}

fn adjectives(pairs: [(&'static str, &'static str, &'static str); 10]) -> HashMap<EmotionalState, Vec<&'static str>> {
    let mut map = HashMap::new();
    for (state, a, b) in pairs {
        let key = match state {
            "hopeful" => EmotionalState::Hopeful,
            "curious" => EmotionalState::Curious,
            "frustrated" => EmotionalState::Frustrated,
            "desperate" => EmotionalState::Desperate,
            "numb" => EmotionalState::Numb,
            "determined" => EmotionalState::Determined,
            "broken" => EmotionalState::Broken,
            "calm" => EmotionalState::Calm,
            "angry" => EmotionalState::Angry,
            "resigned" => EmotionalState::Resigned,
            other => unreachable!("unknown emotional state key: {other}"),
        };
        map.insert(key, vec![a, b]);
    }
    map
}

/// The full vocabulary table, built once and shared read-only.
pub struct Vocabulary {
    banks: HashMap<Tone, ToneBank>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::build()
    }
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn death_verb(&self, tone: Tone, index: usize) -> &'static str {
        let bank = &self.banks[&tone];
        bank.death_verbs[index % bank.death_verbs.len()]
    }

    pub fn reset_verb(&self, tone: Tone, index: usize) -> &'static str {
        let bank = &self.banks[&tone];
        bank.reset_verbs[index % bank.reset_verbs.len()]
    }

    pub fn decision_verb(&self, tone: Tone, index: usize) -> &'static str {
        let bank = &self.banks[&tone];
        bank.decision_verbs[index % bank.decision_verbs.len()]
    }

    pub fn emotional_adjective(&self, tone: Tone, emotion: EmotionalState, index: usize) -> &'static str {
        let adjectives = &self.banks[&tone].emotional_adjectives[&emotion];
        adjectives[index % adjectives.len()]
    }

    pub fn connector(&self, tone: Tone, index: usize) -> &'static str {
        let bank = &self.banks[&tone];
        bank.connectors[index % bank.connectors.len()]
    }

    fn build() -> Self {
        let mut banks = HashMap::new();

        banks.insert(
            Tone::Hopeful,
            ToneBank {
                death_verbs: vec!["fell", "slipped away", "was cut short"],
                reset_verbs: vec!["began again", "got another chance", "woke up once more"],
                decision_verbs: vec!["chose", "decided", "reached for"],
                emotional_adjectives: adjectives([
                    ("hopeful", "bright", "buoyant"),
                    ("curious", "eager", "wide-eyed"),
                    ("frustrated", "undeterred", "still trying"),
                    ("desperate", "clinging to hope", "refusing to quit"),
                    ("numb", "quietly hopeful", "faintly warm"),
                    ("determined", "resolute", "unshaken"),
                    ("broken", "bruised but mending", "bent, not broken"),
                    ("calm", "steady", "at ease"),
                    ("angry", "fired up", "determined"),
                    ("resigned", "patient", "waiting for a better day"),
                ]),
                connectors: vec!["and then,", "before long,", "soon after,"],
            },
        );

        banks.insert(
            Tone::Desperate,
            ToneBank {
                death_verbs: vec!["died screaming", "was torn apart", "ran out of time"],
                reset_verbs: vec!["was dragged back", "clawed back to the start", "snapped back to morning"],
                decision_verbs: vec!["gambled on", "threw everything at", "forced"],
                emotional_adjectives: adjectives([
                    ("hopeful", "fragile", "thin"),
                    ("curious", "frantic", "searching"),
                    ("frustrated", "raw", "at the edge"),
                    ("desperate", "desperate", "unraveling"),
                    ("numb", "hollowed out", "past feeling"),
                    ("determined", "white-knuckled", "grasping"),
                    ("broken", "shattered", "barely holding"),
                    ("calm", "forced-calm", "trembling-still"),
                    ("angry", "seething", "on the verge"),
                    ("resigned", "exhausted", "out of moves"),
                ]),
                connectors: vec!["no time to think,", "with seconds left,", "desperate now,"],
            },
        );

        banks.insert(
            Tone::Clinical,
            ToneBank {
                death_verbs: vec!["ceased function", "terminated", "expired"],
                reset_verbs: vec!["re-initialized", "reverted to baseline", "restarted the cycle"],
                decision_verbs: vec!["selected", "executed", "committed to"],
                emotional_adjectives: adjectives([
                    ("hopeful", "elevated", "optimism-indexed"),
                    ("curious", "exploratory", "investigative"),
                    ("frustrated", "suboptimal", "below baseline"),
                    ("desperate", "critical", "flagged urgent"),
                    ("numb", "affect-flattened", "low-response"),
                    ("determined", "goal-directed", "high-persistence"),
                    ("broken", "degraded", "impaired"),
                    ("calm", "nominal", "within tolerance"),
                    ("angry", "elevated arousal", "irritability-flagged"),
                    ("resigned", "disengaged", "acceptance-state"),
                ]),
                connectors: vec!["subsequently,", "at this juncture,", "data indicates that"],
            },
        );

        banks.insert(
            Tone::Melancholic,
            ToneBank {
                death_verbs: vec!["faded", "was lost, again", "slipped into silence"],
                reset_verbs: vec!["was returned, unasked, to morning", "began the day it could not escape", "woke to the same grey light"],
                decision_verbs: vec!["chose, without conviction,", "settled, wearily, on", "gave in to"],
                emotional_adjectives: adjectives([
                    ("hopeful", "wistful", "quietly hoping, despite it all"),
                    ("curious", "absently curious", "half-interested"),
                    ("frustrated", "worn thin", "tired of trying"),
                    ("desperate", "quietly desperate", "aching"),
                    ("numb", "grey", "hollow"),
                    ("determined", "doggedly persistent", "tired but unwilling to stop"),
                    ("broken", "worn down", "fraying"),
                    ("calm", "subdued", "still, like held breath"),
                    ("angry", "bitter", "simmering, unspoken"),
                    ("resigned", "resigned", "past arguing"),
                ]),
                connectors: vec!["and so,", "as always,", "once more,"],
            },
        );

        banks.insert(
            Tone::DarkHumor,
            ToneBank {
                death_verbs: vec!["bought the farm, spectacularly", "checked out early, again", "bit it, creatively this time"],
                reset_verbs: vec!["got the redo nobody asked for", "hit the cosmic snooze button", "woke up to do the bit again"],
                decision_verbs: vec!["rolled the dice on", "bet the farm on", "decided, against all sense,"],
                emotional_adjectives: adjectives([
                    ("hopeful", "suspiciously optimistic", "annoyingly chipper"),
                    ("curious", "morbidly curious", "nosy, as usual"),
                    ("frustrated", "fed up", "ready to flip a table"),
                    ("desperate", "comically desperate", "one bad day from a montage"),
                    ("numb", "past caring", "running on fumes and spite"),
                    ("determined", "stubborn to a fault", "too stubborn to die properly"),
                    ("broken", "held together with tape", "barely functional, emotionally"),
                    ("calm", "suspiciously chill", "weirdly zen about it"),
                    ("angry", "ready to fight the universe", "furious, in a fun way"),
                    ("resigned", "darkly amused", "laughing because the alternative is screaming"),
                ]),
                connectors: vec!["naturally,", "of course,", "because why not,"],
            },
        );

        banks.insert(
            Tone::Philosophical,
            ToneBank {
                death_verbs: vec!["returned to whatever precedes beginning", "met the end that is not an end", "dissolved into what comes before"],
                reset_verbs: vec!["was asked, again, what a day even is", "circled back to its own first cause", "began once more to become itself"],
                decision_verbs: vec!["chose, as if choice were more than motion,", "committed to a branch of the possible", "selected one future among the unweighted many"],
                emotional_adjectives: adjectives([
                    ("hopeful", "open to possibility", "provisionally hopeful"),
                    ("curious", "turned toward the question", "inquiring"),
                    ("frustrated", "caught against the limit of the given", "straining at the boundary"),
                    ("desperate", "pressed against necessity", "at the edge of what can be willed"),
                    ("numb", "suspended between feeling and its absence", "unanchored"),
                    ("determined", "oriented toward a chosen end", "committed, provisionally, to meaning"),
                    ("broken", "fractured along a prior certainty", "no longer whole in the old sense"),
                    ("calm", "settled into what is", "at rest within the repetition"),
                    ("angry", "resisting the given order", "refusing the terms offered"),
                    ("resigned", "accepting the shape of the loop", "at peace with recurrence"),
                ]),
                connectors: vec!["and so it follows that", "which raises the question of whether", "as before, and yet not quite,"],
            },
        );

        banks.insert(
            Tone::Terse,
            ToneBank {
                death_verbs: vec!["died.", "didn't make it.", "was gone."],
                reset_verbs: vec!["reset.", "started over.", "back to morning."],
                decision_verbs: vec!["chose", "picked", "took"],
                emotional_adjectives: adjectives([
                    ("hopeful", "hopeful.", "steady."),
                    ("curious", "curious.", "alert."),
                    ("frustrated", "tired.", "tense."),
                    ("desperate", "desperate.", "cornered."),
                    ("numb", "numb.", "flat."),
                    ("determined", "set.", "sure."),
                    ("broken", "hurt.", "spent."),
                    ("calm", "calm.", "still."),
                    ("angry", "angry.", "hard-eyed."),
                    ("resigned", "done.", "quiet."),
                ]),
                connectors: vec!["then", "next", "after that,"],
            },
        );

        banks.insert(
            Tone::Poetic,
            ToneBank {
                death_verbs: vec!["went out like a struck match", "was unmade, petal by petal", "fell, soft as dusk"],
                reset_verbs: vec!["was folded back into morning", "rose again from the same seam of light", "returned to the first hour, unhealed and unhelped"],
                decision_verbs: vec!["leaned into", "let fall like a coin toward", "gave their weight to"],
                emotional_adjectives: adjectives([
                    ("hopeful", "lit from within", "carrying a small, stubborn light"),
                    ("curious", "reaching", "a question made of breath"),
                    ("frustrated", "taut as a drawn string", "weathered and unyielding"),
                    ("desperate", "burning down to the wick", "a held breath that will not release"),
                    ("numb", "grey as unwritten pages", "still as water with no wind"),
                    ("determined", "a blade turned toward one direction", "unbending as old wood"),
                    ("broken", "cracked like dry clay", "a shape that remembers being whole"),
                    ("calm", "still as held water", "quiet as snowfall"),
                    ("angry", "a coal kept carefully lit", "a storm not yet let loose"),
                    ("resigned", "settled like dust after the fall", "at peace the way rivers are, by moving on"),
                ]),
                connectors: vec!["and in that hour,", "as the day turned over itself,", "between one breath and the next,"],
            },
        );

        Self { banks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tone_defines_every_emotion() {
        let vocab = Vocabulary::new();
        for tone in Tone::ALL {
            for emotion in EmotionalState::ALL {
                let adj = vocab.emotional_adjective(tone, emotion, 0);
                assert!(!adj.is_empty());
            }
        }
    }

    #[test]
    fn death_and_reset_verbs_exist_for_every_tone() {
        let vocab = Vocabulary::new();
        for tone in Tone::ALL {
            assert!(!vocab.death_verb(tone, 0).is_empty());
            assert!(!vocab.reset_verb(tone, 0).is_empty());
            assert!(!vocab.decision_verb(tone, 0).is_empty());
            assert!(!vocab.connector(tone, 0).is_empty());
        }
    }

    #[test]
    fn index_wraps_around_bank_length() {
        let vocab = Vocabulary::new();
        let first = vocab.death_verb(Tone::Terse, 0);
        let wrapped = vocab.death_verb(Tone::Terse, 3);
        assert_eq!(first, wrapped);
    }
}
