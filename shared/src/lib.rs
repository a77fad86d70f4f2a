pub mod protocol;
pub mod classes;
pub mod maps;
pub mod items;

pub use protocol::*;
pub use classes::*;
pub use maps::*;
pub use items::*;
