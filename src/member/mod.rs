pub mod canonicalizer;
pub mod registry;
pub mod service;
pub mod text;
pub mod validation;

pub use canonicalizer::{NameCanonicalizer, NameOptions, UNREGISTERED_SUFFIX};
pub use registry::{
    AliasRemoval, MemberSection, Player, PlayerRegistry, RegistryError, RegistryLimits,
};
pub use service::{MemberAction, MemberService};
pub use validation::{validate_name, NameRules, ValidationError};
