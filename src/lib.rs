// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod click_policy;
pub mod config;
pub mod game;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod target;
pub mod timers;

pub use game::{GameEvent, GameSession, GameSnapshot, Phase};
pub use session::{ClickRule, SessionConfig};
