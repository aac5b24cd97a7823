mod action;
mod node;
mod pack;

pub use action::Action;
pub use node::{Citation, NextOnModel, NodeModel, NodeType};
pub use pack::RulePackModel;
