// Entry point for the Minesweeper TUI application

use std::error::Error;

// Module declarations
mod rsw_color; // Board palette and terminal color-depth handling
mod rsw_game; // Core game logic: board generation, reveal/flag rules
mod rsw_ui; // Terminal UI rendering and event handling

fn main() -> Result<(), Box<dyn Error>> {
    rsw_ui::run()
}
