use ratatui::style::Color;

pub const THEME_PRIMARY: Color = Color::Rgb(79, 172, 254);
pub const THEME_SUCCESS: Color = Color::Rgb(34, 197, 94);
pub const THEME_WARNING: Color = Color::Rgb(251, 191, 36);
pub const THEME_ERROR: Color = Color::Rgb(239, 68, 68);
pub const THEME_MUTED: Color = Color::Rgb(156, 163, 175);
pub const THEME_SURFACE: Color = Color::Rgb(31, 41, 55);
pub const THEME_TEXT: Color = Color::Rgb(243, 244, 246);
