// Quality: a deterministic checklist scorer for narrative text. Independent of
// the document model and the generation collaborator.

pub mod handlers;
pub mod scorer;
