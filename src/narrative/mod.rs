//! Narrative engine (component G): template language, vocabulary, and the
//! renderers that turn loops, equivalence classes, and epochs into prose.

pub mod render;
pub mod style;
pub mod template;
pub mod vocabulary;

pub use render::{render_epoch_summary, render_loop, render_montage};
pub use style::StyleConfig;
pub use template::{Context, Template};
pub use vocabulary::{Tone, Vocabulary};
