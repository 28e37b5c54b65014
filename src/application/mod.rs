//! Resolution policy and the collaborator seams it depends on.

pub mod bundle;
pub mod cms;
pub mod error;
pub mod render;
pub mod resolver;
