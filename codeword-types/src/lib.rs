pub mod errors;
pub mod game;
pub mod messages;
pub mod room;
pub mod view;

pub type PlayerId = uuid::Uuid;

// Re-export all types
pub use errors::*;
pub use game::*;
pub use messages::*;
pub use room::*;
pub use view::*;
