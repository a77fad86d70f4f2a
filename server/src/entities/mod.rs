//! Server-side entity definitions.

mod character;
mod item;

pub use character::{Character, CharacterId};
pub use item::ItemInstance;
