// Generation: the collaborator boundary, the fill pipeline that drafts a new
// document, and the natural-language edit pipeline.
// All model calls go through `GenerationCollaborator`; nothing here talks to
// the Anthropic API directly.

pub mod collaborator;
pub mod fill;
pub mod gate;
pub mod handlers;
pub mod nl_edit;
pub mod prompts;
