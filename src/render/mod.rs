pub mod renderer;
pub mod terminal;

pub use renderer::{Cell, Hud, Renderer, rasterize};
pub use terminal::TerminalSession;
