//! Terminal status display.
//!
//! - `render`: draws the status block for one `StatusSnapshot`
//! - `presenter`: `TerminalPresenter`, the `StatusPresenter` for a real terminal
//! - `styles`: colors and text styles

pub mod presenter;
pub mod render;
pub mod styles;

pub use presenter::TerminalPresenter;
