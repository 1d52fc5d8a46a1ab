// Board palette with cross-terminal color handling.
// Colors are defined as RGB; terminals without truecolor support fall
// back to a fixed xterm-256 index, and plain 16-color terminals get the
// nearest basic ANSI color.

use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Pick the best representation of a color for the current terminal:
/// exact RGB under truecolor, a stable 256-palette index otherwise, or
/// the given basic ANSI color as the last resort.
fn downgrade(rgb: (u8, u8, u8), index256: u8, basic: Color) -> Color {
    let support = ColorSupport::stdout();
    if support.has_16m {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    } else if support.has_256 {
        Color::Indexed(index256)
    } else {
        basic
    }
}

/// Foreground for a revealed digit, the classic 1-8 palette.
pub fn digit(n: u8) -> Color {
    match n {
        1 => downgrade((0, 0, 255), 21, Color::Blue),
        2 => downgrade((0, 128, 0), 28, Color::Green),
        3 => downgrade((255, 0, 0), 196, Color::Red),
        4 => downgrade((0, 0, 128), 18, Color::Blue),
        5 => downgrade((128, 0, 0), 88, Color::Red),
        6 => downgrade((0, 128, 128), 30, Color::Cyan),
        7 => downgrade((12, 12, 12), 232, Color::Black),
        _ => downgrade((118, 118, 118), 243, Color::DarkGray),
    }
}

/// Checkerboard background for hidden and flagged cells.
pub fn hidden_bg(row: usize, col: usize) -> Color {
    if (row + col) % 2 == 0 {
        downgrade((170, 255, 170), 157, Color::LightGreen)
    } else {
        downgrade((100, 200, 100), 71, Color::Green)
    }
}

/// Background for revealed cells.
pub fn revealed_bg() -> Color {
    downgrade((200, 255, 200), 194, Color::White)
}

pub fn flag_fg() -> Color {
    downgrade((197, 15, 31), 160, Color::Red)
}

pub fn mine_fg() -> Color {
    downgrade((12, 12, 12), 232, Color::Black)
}

/// Background for the mine the player actually hit.
pub fn mine_hit_bg() -> Color {
    downgrade((197, 15, 31), 160, Color::Red)
}

/// Background for the cell under the keyboard/mouse cursor.
pub fn cursor_bg() -> Color {
    downgrade((59, 120, 255), 63, Color::LightBlue)
}
