//! Use cases: rendering and submitting a form, resolving a configuration
//! for an embed, and producing embed markup.

pub mod embed;
pub mod renderer;
pub mod resolver;

pub use embed::{EmbedCode, DYNAMIC_FORM_PATH};
pub use renderer::{FormSession, FormView, SubmissionState, SubmitOutcome};
pub use resolver::{FormResolver, Resolution, ResolutionSource};
