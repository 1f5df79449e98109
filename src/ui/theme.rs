//! Prompt theme

use cliclack::ThemeState;
use console::Style;

/// Hospital green for active prompts, red for errors
#[derive(Debug, Clone, Default)]
pub struct ProcurementTheme;

impl cliclack::Theme for ProcurementTheme {
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
            ThemeState::Active => Style::new().green(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().cyan(),
        }
    }
}

/// Install the theme for every later prompt
pub fn init_theme() {
    cliclack::set_theme(ProcurementTheme);
}
