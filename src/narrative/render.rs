//! Loop / montage / epoch-summary renderers (spec.md §4.G).

use crate::graph::DayGraph;
use crate::ids::NodeId;
use crate::model::{EquivalenceClass, Loop};
use crate::model::{Epoch, EmotionalState, Outcome, OutcomeType};

use super::style::{ParagraphStyle, Perspective, StyleConfig};
use super::vocabulary::Vocabulary;

fn pronoun(perspective: Perspective) -> &'static str {
    match perspective {
        Perspective::First => "I",
        Perspective::Second => "you",
        Perspective::Third | Perspective::ThirdLimited => "they",
    }
}

fn possessive(perspective: Perspective) -> &'static str {
    match perspective {
        Perspective::First => "my",
        Perspective::Second => "your",
        Perspective::Third | Perspective::ThirdLimited => "their",
    }
}

fn join_sentences(sentences: &[String], style: ParagraphStyle) -> String {
    match style {
        ParagraphStyle::Staccato => sentences.join("\n\n"),
        ParagraphStyle::Flowing => sentences.join(" "),
        ParagraphStyle::Unbroken => sentences.concat(),
    }
}

fn opening_sentence(emotion: EmotionalState, vocab: &Vocabulary, style: &StyleConfig) -> String {
    let adjective = vocab.emotional_adjective(style.tone, emotion, 0);
    let connector = vocab.connector(style.tone, 0);
    format!("{} began the day {adjective}, {connector}", capitalize(pronoun(style.perspective)))
}

fn node_sentence(node_id: NodeId, graph: &DayGraph, vocab: &Vocabulary, style: &StyleConfig, index: usize) -> Option<String> {
    if style.detail == super::style::DetailLevel::Minimal {
        return None;
    }
    let node = graph.node(node_id)?;
    let connector = vocab.connector(style.tone, index);
    let timestamp = if style.include_timestamps {
        format!(" at {}", node.time_slot)
    } else {
        String::new()
    };
    Some(format!("{connector} {} reached {}{timestamp}.", pronoun(style.perspective), node.label))
}

fn decision_sentence(node_id: NodeId, choice_index: usize, graph: &DayGraph, vocab: &Vocabulary, style: &StyleConfig, index: usize) -> Option<String> {
    let node = graph.node(node_id)?;
    let verb = vocab.decision_verb(style.tone, index);
    let label = node
        .choices
        .as_ref()
        .and_then(|choices| choices.iter().find(|c| c.index == choice_index))
        .map(|c| c.label.clone())
        .unwrap_or_else(|| "a path forward".to_string());
    Some(format!("{} {verb} {label}.", capitalize(pronoun(style.perspective))))
}

fn outcome_sentence(outcome: &Outcome, vocab: &Vocabulary, style: &StyleConfig) -> String {
    let subject = capitalize(pronoun(style.perspective));
    match outcome.outcome_type {
        OutcomeType::Death => format!("{subject} {}.", vocab.death_verb(style.tone, 0)),
        OutcomeType::ResetTrigger | OutcomeType::VoluntaryReset => {
            format!("{subject} {}.", vocab.reset_verb(style.tone, 0))
        }
        OutcomeType::DayEnd => format!("{subject} reached the end of the day.", ),
        OutcomeType::SubLoopExit => format!("{subject} broke free of the repeating segment."),
        OutcomeType::Success => format!("{subject} succeeded, at last."),
        OutcomeType::Failure => format!("{subject} failed."),
        OutcomeType::Partial => format!("{subject} got partway there."),
    }
}

fn transition_sentence(start: EmotionalState, end: EmotionalState, vocab: &Vocabulary, style: &StyleConfig) -> Option<String> {
    if start == end {
        return None;
    }
    let from = vocab.emotional_adjective(style.tone, start, 1);
    let to = vocab.emotional_adjective(style.tone, end, 1);
    Some(format!(
        "By the end, {} {} had turned {to}, no longer {from}.",
        possessive(style.perspective),
        "mood"
    ))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Renders one loop end to end: opening, per-node narration, outcome,
/// optional emotional-transition close.
pub fn render_loop(loop_: &Loop, graph: &DayGraph, vocab: &Vocabulary, style: &StyleConfig) -> String {
    let mut sentences = vec![opening_sentence(loop_.emotional_state_start, vocab, style)];

    if let Some(path) = &loop_.path {
        for (index, &node_id) in path.iter().enumerate() {
            let decision = loop_.decisions.iter().find(|d| d.node_id == node_id);
            let sentence = match decision {
                Some(d) => decision_sentence(node_id, d.choice_index, graph, vocab, style, index),
                None => node_sentence(node_id, graph, vocab, style, index),
            };
            if let Some(s) = sentence {
                sentences.push(s);
            }
        }
    }

    if let Some(outcome) = &loop_.outcome {
        sentences.push(outcome_sentence(outcome, vocab, style));
    }

    if let Some(end) = loop_.emotional_state_end {
        if let Some(s) = transition_sentence(loop_.emotional_state_start, end, vocab, style) {
            sentences.push(s);
        }
    }

    join_sentences(&sentences, style.paragraph_style)
}

/// Renders a montage across an equivalence class's repeated attempts.
pub fn render_montage(class: &EquivalenceClass, sample_loops: &[&Loop], vocab: &Vocabulary, style: &StyleConfig) -> String {
    let connector = vocab.connector(style.tone, 0);
    if class.member_count <= 1 {
        return format!("{connector} a single attempt played out: {}", class.outcome_summary);
    }

    let opening = match style.tone {
        super::vocabulary::Tone::Poetic => format!("{} times the dance repeated,", class.member_count),
        super::vocabulary::Tone::Terse => format!("{} attempts.", class.member_count),
        super::vocabulary::Tone::Clinical => format!("{} recorded iterations converged on this outcome.", class.member_count),
        _ => format!("{connector} {} times, the same ending found {} differently.", class.member_count, pronoun(style.perspective)),
    };

    let mut body = vec![opening, class.outcome_summary.clone()];
    if !sample_loops.is_empty() && style.detail != super::style::DetailLevel::Minimal {
        body.push(format!("{} of those attempts were recorded in detail.", sample_loops.len()));
    }

    join_sentences(&body, style.paragraph_style)
}

/// Renders an epoch-level summary: title, dominant-tone opening, optional
/// stats block, anchors and notable classes.
pub fn render_epoch_summary(epoch: &Epoch, loops: &[&Loop], vocab: &Vocabulary, style: &StyleConfig) -> String {
    let mut sentences = vec![format!("== {} ==", epoch.name)];
    let connector = vocab.connector(style.tone, 0);
    sentences.push(format!("{connector} this phase unfolded across {} loops.", loops.len()));

    if style.detail != super::style::DetailLevel::Minimal {
        let mut histogram: std::collections::HashMap<OutcomeType, usize> = std::collections::HashMap::new();
        for l in loops {
            if let Some(outcome) = &l.outcome {
                *histogram.entry(outcome.outcome_type).or_default() += 1;
            }
        }
        let anchors = loops.iter().filter(|l| l.is_anchor).count();
        let mut parts: Vec<String> = histogram.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        parts.sort();
        sentences.push(format!("Outcomes — {}. Anchor loops: {anchors}.", parts.join(", ")));
    }

    let deaths = loops.iter().filter(|l| l.outcome.as_ref().is_some_and(|o| o.outcome_type == OutcomeType::Death)).count();
    if deaths > 0 {
        sentences.push(format!("{} of those ended in death, node by node, {}.", deaths, vocab.death_verb(style.tone, 1)));
    }

    join_sentences(&sentences, style.paragraph_style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TimeBounds;
    use crate::ids::{EdgeId, EpochId, GraphId, KnowledgeStateId, LoopId};
    use crate::model::{EdgeKind, GraphEdge, GraphNode};
    use crate::narrative::style::DetailLevel;
    use crate::narrative::vocabulary::Tone;
    use crate::time_slot::TimeSlot;
    use chrono::Utc;

    fn slot(h: u8) -> TimeSlot {
        TimeSlot::new(h, 0).unwrap()
    }

    fn small_graph() -> (DayGraph, NodeId, NodeId) {
        let bounds = TimeBounds { start: slot(0), end: slot(23) };
        let a = GraphNode::new(NodeId::new(), NodeKind::Event, slot(6), "the kitchen");
        let death = GraphNode::new(NodeId::new(), NodeKind::Death, slot(7), "the explosion");
        let mut g = DayGraph::new(GraphId::new(), "day", bounds, a.id);
        g.add_node(a.clone()).unwrap();
        g.add_node(death.clone()).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), a.id, death.id, EdgeKind::Default)).unwrap();
        (g, a.id, death.id)
    }

    #[test]
    fn renders_a_basic_loop_with_death_outcome() {
        let (g, a, death) = small_graph();
        let mut loop_ = Loop::start(LoopId::new(), 1, EpochId::new(), GraphId::new(), KnowledgeStateId::new(), EmotionalState::Hopeful, Utc::now());
        loop_.path = Some(vec![a, death]);
        loop_.outcome = Some(crate::model::Outcome::new(OutcomeType::Death, death, Utc::now()));

        let vocab = Vocabulary::new();
        let style = StyleConfig::new(Tone::Terse);
        let text = render_loop(&loop_, &g, &vocab, &style);
        assert!(!text.is_empty());
        assert!(text.contains("died") || text.contains("didn't make it") || text.contains("was gone"));
    }

    #[test]
    fn minimal_detail_suppresses_node_sentences() {
        let (g, a, death) = small_graph();
        let mut loop_ = Loop::start(LoopId::new(), 1, EpochId::new(), GraphId::new(), KnowledgeStateId::new(), EmotionalState::Hopeful, Utc::now());
        loop_.path = Some(vec![a, death]);
        loop_.outcome = Some(crate::model::Outcome::new(OutcomeType::Death, death, Utc::now()));

        let vocab = Vocabulary::new();
        let mut style = StyleConfig::new(Tone::Terse);
        style.detail = DetailLevel::Minimal;
        let minimal = render_loop(&loop_, &g, &vocab, &style);
        style.detail = DetailLevel::Standard;
        let standard = render_loop(&loop_, &g, &vocab, &style);
        assert!(minimal.len() <= standard.len());
    }

    #[test]
    fn single_member_montage_uses_single_pass_variant() {
        let class = EquivalenceClass {
            id: crate::ids::EquivalenceClassId::new(),
            outcome_hash: "a".repeat(64),
            knowledge_end_hash: "b".repeat(64),
            composite_hash: "c".repeat(64),
            representative_loop_id: LoopId::new(),
            sample_loop_ids: vec![],
            member_count: 1,
            per_epoch_distribution: Default::default(),
            outcome_summary: "died in the kitchen".to_string(),
            knowledge_delta_summary: String::new(),
            common_tags: vec![],
            decision_vector_centroid: None,
            decision_vector_variance: None,
            first_occurrence_loop_id: LoopId::new(),
            last_occurrence_loop_id: LoopId::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            narrative_template: None,
        };
        let vocab = Vocabulary::new();
        let style = StyleConfig::new(Tone::Poetic);
        let text = render_montage(&class, &[], &vocab, &style);
        assert!(text.contains("single attempt"));
    }
}
