//! Social network: relationship edges and personal memory

pub mod memory;
pub mod network;
pub mod relation;

pub use memory::{Memory, MemoryKind, MemoryLog};
pub use network::SocialNetwork;
pub use relation::{InteractionRecord, RelationKind, SocialRelation};
