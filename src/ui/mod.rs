//! Terminal output
//!
//! Uses `cliclack` for framed output and prompts in a terminal, with plain
//! `[OK]`/`[WARN]` lines when scripted or in CI.

mod context;
mod output;
mod progress;
mod prompts;
mod theme;
mod view;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, notice, outro_success, remark, section, step_error,
    step_info, step_ok, step_ok_detail, step_warn, step_warn_hint,
};
pub use progress::{InstallProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::{init_theme, ProcurementTheme};
pub use view::{badge, render_table, ConsoleView};
