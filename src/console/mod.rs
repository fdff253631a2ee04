mod commands;
mod drawing;
mod surface;

pub use commands::{parse_command, Command, HELP};
pub use drawing::ConsoleDrawingTool;
pub use surface::{ConsoleSurface, SurfacePointer};
