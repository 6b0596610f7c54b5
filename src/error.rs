//! Rich diagnostic error types for the time-loop engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so callers know exactly
//! what went wrong and how to fix it. The engine never uses exceptions as
//! control flow: every public boundary returns a `Result` carrying one of
//! these variants.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the time-loop engine.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Loop(#[from] LoopError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pathing(#[from] PathingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

// ---------------------------------------------------------------------------
// Structural / validation errors (component A)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error("unknown id: {id}")]
    #[diagnostic(
        code(timeloop::validation::unknown_id),
        help("No entity with this id exists in the referenced collection.")
    )]
    UnknownId { id: String },

    #[error("duplicate id: {id}")]
    #[diagnostic(
        code(timeloop::validation::duplicate_id),
        help("An entity with this id already exists. Ids must be unique within their collection.")
    )]
    DuplicateId { id: String },

    #[error("invalid enum value \"{value}\" for field {field}")]
    #[diagnostic(
        code(timeloop::validation::invalid_enum),
        help("Check the allowed values for this field in the data model.")
    )]
    InvalidEnum { field: String, value: String },

    #[error("invalid time format: \"{value}\" (expected HH:MM)")]
    #[diagnostic(
        code(timeloop::validation::invalid_time_format),
        help("Time slots must be written as zero-padded HH:MM, 00:00 through 23:59.")
    )]
    InvalidTimeFormat { value: String },

    #[error("invalid hash format: \"{value}\" (expected 64 lowercase hex characters)")]
    #[diagnostic(
        code(timeloop::validation::invalid_hash_format),
        help("Hashes are rendered as 64 lowercase hex characters (256 bits).")
    )]
    InvalidHashFormat { value: String },

    #[error("missing required field: {field}")]
    #[diagnostic(
        code(timeloop::validation::missing_field),
        help("This field is required on this entity kind.")
    )]
    MissingField { field: String },

    #[error("value out of range for field {field}: {value}")]
    #[diagnostic(
        code(timeloop::validation::out_of_range),
        help("Check the documented numeric range for this field.")
    )]
    OutOfRange { field: String, value: String },
}

// ---------------------------------------------------------------------------
// Day graph errors (component B)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("duplicate node id: {id}")]
    #[diagnostic(
        code(timeloop::graph::duplicate_id),
        help("A node with this id already exists in the graph. Choose a different id.")
    )]
    DuplicateId { id: String },

    #[error("unknown endpoint: {id}")]
    #[diagnostic(
        code(timeloop::graph::unknown_endpoint),
        help("An edge's source or target must reference a node already present in the graph.")
    )]
    UnknownEndpoint { id: String },

    #[error("self-loops are forbidden: {id} -> {id}")]
    #[diagnostic(
        code(timeloop::graph::self_loop_forbidden),
        help("An edge cannot have the same node as both source and target.")
    )]
    SelfLoopForbidden { id: String },

    #[error("unknown node: {id}")]
    #[diagnostic(
        code(timeloop::graph::unknown_node),
        help("No node with this id exists in the graph.")
    )]
    UnknownNode { id: String },

    #[error("unknown edge: {id}")]
    #[diagnostic(code(timeloop::graph::unknown_edge), help("No edge with this id exists."))]
    UnknownEdge { id: String },

    #[error("start node {id} is not present in the graph")]
    #[diagnostic(
        code(timeloop::graph::missing_start_node),
        help("`start_node_id` must reference an existing node.")
    )]
    MissingStartNode { id: String },
}

// ---------------------------------------------------------------------------
// Loop store / factory errors (component C)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoopError {
    #[error("loop {id} is not in progress")]
    #[diagnostic(
        code(timeloop::loop::not_in_progress),
        help("Decisions can only be appended to a loop while it is `in_progress`.")
    )]
    NotInProgress { id: String },

    #[error("loop {id} cannot be completed: {reason}")]
    #[diagnostic(
        code(timeloop::loop::not_completable),
        help("Resolve the stated reason (e.g. missing outcome data) before completing the loop.")
    )]
    NotCompletable { id: String, reason: String },

    #[error("decision references node {node_id}, which is not a decision node")]
    #[diagnostic(
        code(timeloop::loop::not_a_decision_node),
        help("A `Decision` record's `node_id` must reference a graph node of kind `decision`.")
    )]
    NotADecisionNode { node_id: String },

    #[error("choice index {choice_index} is invalid for decision node {node_id}")]
    #[diagnostic(
        code(timeloop::loop::invalid_choice_index),
        help("The choice index must be within 0..choices.len() for the referenced decision node.")
    )]
    InvalidChoiceIndex { node_id: String, choice_index: usize },

    #[error("terminal node {terminal_node_id} kind does not match outcome type {outcome_type}")]
    #[diagnostic(
        code(timeloop::loop::terminal_kind_mismatch),
        help("`death` outcomes must terminate on a `death` node; `reset_trigger` outcomes on a `reset` node.")
    )]
    TerminalNodeKindMismatch {
        terminal_node_id: String,
        outcome_type: String,
    },

    #[error("unknown sequence number: {sequence_number}")]
    #[diagnostic(code(timeloop::loop::unknown_sequence), help("No loop with this sequence number exists."))]
    UnknownSequence { sequence_number: u64 },
}

// ---------------------------------------------------------------------------
// Pathing / operator errors (component B pathing, component E operators)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PathingError {
    #[error("no path found from {from} to {to}")]
    #[diagnostic(
        code(timeloop::pathing::no_path),
        help("There is no sequence of edges connecting these two nodes in the current graph.")
    )]
    NoPath { from: String, to: String },

    #[error("target unreachable: {target}")]
    #[diagnostic(
        code(timeloop::pathing::unreachable_target),
        help("No path exists from the graph's start node to this target. Check edge connectivity.")
    )]
    UnreachableTarget { target: String },

    #[error("unknown target: {target}")]
    #[diagnostic(
        code(timeloop::pathing::unknown_target),
        help("This node id does not exist in the graph.")
    )]
    UnknownTarget { target: String },

    #[error("every path from start to a terminal passes through an avoided node")]
    #[diagnostic(
        code(timeloop::pathing::unavoidable_target),
        help("Removing the avoided nodes disconnects the start node from every terminal. \
              There is no way to reach an ending without passing through one of them.")
    )]
    UnavoidableTarget,

    #[error("sequence step {step} (\"{node}\") is unachievable from the preceding checkpoint")]
    #[diagnostic(
        code(timeloop::pathing::unachievable_sequence),
        help("Checkpoint pathing stitches shortest paths between consecutive targets; \
              this hop has no connecting path.")
    )]
    UnachievableSequence { step: usize, node: String },
}

// ---------------------------------------------------------------------------
// Template engine errors (component G)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    #[error("unknown filter: {name}")]
    #[diagnostic(
        code(timeloop::template::unknown_filter),
        help("Known filters are: uppercase, lowercase, capitalize, length, join, pluralize.")
    )]
    UnknownFilter { name: String },

    #[error("unclosed block: {{{{#{tag} ...}}}} has no matching {{{{/{tag}}}}}")]
    #[diagnostic(
        code(timeloop::template::unclosed_block),
        help("Every {{#if}}, {{#unless}}, and {{#each}} must have a matching closing tag.")
    )]
    UnclosedBlock { tag: String },

    #[error("unexpected closing tag: {{{{/{tag}}}}} with no matching opening tag")]
    #[diagnostic(
        code(timeloop::template::dangling_close),
        help("Remove the stray closing tag or add the matching opener before it.")
    )]
    DanglingClose { tag: String },

    #[error("unknown template: {name}")]
    #[diagnostic(code(timeloop::template::unknown_template), help("No template registered under this name."))]
    UnknownTemplate { name: String },
}

// ---------------------------------------------------------------------------
// Cache / batch loader errors (component I)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CacheError {
    #[error("request cancelled: cache was cleared")]
    #[diagnostic(
        code(timeloop::cache::cleared),
        help("A `clear()` call cancelled pending loads. Retry the request.")
    )]
    Cleared,

    #[error("key not found: {key}")]
    #[diagnostic(code(timeloop::cache::key_not_found), help("No value is cached or loadable for this key."))]
    KeyNotFound { key: String },
}

// ---------------------------------------------------------------------------
// Resolution-mode errors (component H)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ResolutionError {
    #[error("unknown arc: {id}")]
    #[diagnostic(code(timeloop::resolution::unknown_arc), help("No arc with this id is registered."))]
    UnknownArc { id: String },

    #[error("unknown resolution mode: {id}")]
    #[diagnostic(code(timeloop::resolution::unknown_mode), help("No resolution mode with this id exists on the arc."))]
    UnknownMode { id: String },

    #[error("no unlocked resolution mode is available for arc {arc_id}")]
    #[diagnostic(
        code(timeloop::resolution::no_unlocked_mode),
        help("Raise the arc's meta level or acquire the missing knowledge flags to unlock a mode.")
    )]
    NoUnlockedMode { arc_id: String },
}

// ---------------------------------------------------------------------------
// Project artifact errors (import/export, §6)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ProjectError {
    #[error("malformed project document: {message}")]
    #[diagnostic(
        code(timeloop::project::malformed),
        help("The project JSON did not match the expected schema. Check field names and types.")
    )]
    Malformed { message: String },

    #[error("dangling reference: {kind} {id} is referenced but not present in the project")]
    #[diagnostic(
        code(timeloop::project::dangling_reference),
        help("Every cross-reference (graph.start_node_id, loop.epoch_id, etc.) must resolve \
              to an entity present in the same document.")
    )]
    DanglingReference { kind: String, id: String },

    #[error("I/O error: {source}")]
    #[diagnostic(code(timeloop::project::io), help("Check that the path exists and is readable/writable."))]
    Io {
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(code(timeloop::config::read), help("Ensure the config file exists and is readable."))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {message}")]
    #[diagnostic(code(timeloop::config::parse), help("Check the TOML syntax in the config file."))]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(code(timeloop::config::write), help("Ensure you have write permissions to the target directory."))]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
