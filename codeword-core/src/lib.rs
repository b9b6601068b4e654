pub mod actions;
pub mod board;
pub mod error;
pub mod game_log;
pub mod patch;
pub mod room_code;
pub mod store;
pub mod synchronizer;
pub mod team_formation;
pub mod turn_engine;
pub mod view;
pub mod vocabulary;

// Re-export main components
pub use actions::*;
pub use board::BoardGenerator;
pub use error::*;
pub use patch::*;
pub use room_code::*;
pub use store::*;
pub use synchronizer::*;
pub use turn_engine::*;
pub use view::*;
pub use vocabulary::*;
