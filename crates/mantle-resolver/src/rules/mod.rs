//! Targeting rules: the stored form, the compiled form, and the tag
//! vocabulary rule authors pick from.

mod kind;
mod roles;
mod stored;
pub mod vocabulary;

pub use kind::{RuleKind, SpecificTarget};
pub use roles::RoleRule;
pub use stored::StoredRule;
