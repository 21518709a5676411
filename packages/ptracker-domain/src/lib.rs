pub mod chunking;
pub mod clustering;
pub mod evidence;
pub mod kind;
pub mod links;
pub mod similarity;

pub use kind::{EntityKind, PromiseStatus};
