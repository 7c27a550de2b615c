use crate::types::{Appearance, Theme};

/// Terminal styling for one appearance. Every field is an ANSI SGR escape.
pub struct ThemePalette {
    pub user: &'static str,
    pub ai: &'static str,
    pub muted: &'static str,
    pub warning: &'static str,
    pub reset: &'static str,
}

pub fn resolve_appearance(theme: Theme, system: Appearance) -> Appearance {
    match theme {
        Theme::Light => Appearance::Light,
        Theme::Dark => Appearance::Dark,
        Theme::Auto => system,
    }
}

pub fn theme_palette(appearance: Appearance) -> ThemePalette {
    match appearance {
        Appearance::Dark => DARK_PALETTE,
        Appearance::Light => LIGHT_PALETTE,
    }
}

const DARK_PALETTE: ThemePalette = ThemePalette {
    user: "\x1b[1;97m",
    ai: "\x1b[96m",
    muted: "\x1b[90m",
    warning: "\x1b[91m",
    reset: "\x1b[0m",
};

const LIGHT_PALETTE: ThemePalette = ThemePalette {
    user: "\x1b[1;30m",
    ai: "\x1b[34m",
    muted: "\x1b[37m",
    warning: "\x1b[31m",
    reset: "\x1b[0m",
};

/// Reads the `COLORFGBG` convention (`"fg;bg"` or `"fg;default;bg"`).
/// Background indices 0-6 and 8 are dark.
pub fn appearance_from_colorfgbg(value: &str) -> Option<Appearance> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    match background {
        0..=6 | 8 => Some(Appearance::Dark),
        _ => Some(Appearance::Light),
    }
}
