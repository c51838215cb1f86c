pub mod ring;
pub mod slot_arena;

pub use ring::{RingIter, SentinelRing};
pub use slot_arena::{SlotArena, SlotId};
