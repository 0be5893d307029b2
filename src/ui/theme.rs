//! cliclack theme

use cliclack::ThemeState;
use console::Style;

/// Green bars, the colour of the mushaf cover
#[derive(Debug, Clone, Default)]
pub struct MushafTheme;

impl cliclack::Theme for MushafTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().green(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Active | ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Install [`MushafTheme`] for every later prompt
pub fn init_theme() {
    cliclack::set_theme(MushafTheme);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliclack::Theme;

    #[test]
    fn errors_are_red_in_every_role() {
        let theme = MushafTheme;
        let state = ThemeState::Error(String::new());
        assert_eq!(theme.bar_color(&state), Style::new().red());
        assert_eq!(theme.state_symbol_color(&state), Style::new().red());
    }
}
