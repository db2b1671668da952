pub mod compiler;
pub mod descriptor;
pub mod handlers;
pub mod html;
pub mod markdown;
pub mod normalize;
pub mod sanitize;
mod skins;

use thiserror::Error;

pub use descriptor::TemplateId;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),
}
