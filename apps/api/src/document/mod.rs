// Document model: provenance-tracked blocks, the portfolio projection,
// open-session registry and the save boundary.

pub mod block;
pub mod handlers;
pub mod model;
pub mod provenance;
pub mod save;
pub mod store;
