pub mod errors;
pub mod hud;
pub mod snapshot;
pub mod sound;
pub mod theme;
pub mod ui;
pub mod writer;

pub use errors::HudError;
