//! cliclack theme

use cliclack::ThemeState;
use console::Style;

/// Blue-accented prompt theme
#[derive(Debug, Clone, Default)]
pub struct SiteSyncTheme;

impl SiteSyncTheme {
    fn accent(state: &ThemeState, submitted: Style) -> Style {
        match state {
            ThemeState::Active => Style::new().blue(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => submitted,
        }
    }
}

impl cliclack::Theme for SiteSyncTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        Self::accent(state, Style::new().blue().dim())
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        Self::accent(state, Style::new().green())
    }
}

/// Install the theme for all prompts of this process
pub fn init_theme() {
    cliclack::set_theme(SiteSyncTheme);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliclack::Theme;

    #[test]
    fn error_state_is_red() {
        let theme = SiteSyncTheme;
        let error = ThemeState::Error("bad".to_string());
        assert_eq!(
            theme.bar_color(&error).apply_to("x").to_string(),
            Style::new().red().apply_to("x").to_string()
        );
        let _ = theme.state_symbol_color(&ThemeState::Submit);
    }
}
