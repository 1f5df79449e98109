//! Spinners and progress bars with a plain-text fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Spinner for a single long-running step
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Progress of an offline install, one tick per fetched manifest entry.
///
/// Interactive terminals get an indicatif bar; scripted runs print every
/// tenth entry and the last one.
pub struct InstallProgress {
    bar: Option<ProgressBar>,
    printed: AtomicUsize,
}

impl InstallProgress {
    pub fn new(ctx: &UiContext, cache_name: &str, total: usize) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total as u64);
            let template = ProgressStyle::default_bar()
                .template("  {spinner:.green} Caching {prefix}  {bar:24.green/dim} {pos}/{len}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                .progress_chars("━╸─");
            bar.set_style(template);
            bar.set_prefix(cache_name.to_string());
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            println!("Caching {} entries into {}...", total, cache_name);
            None
        };

        Self {
            bar,
            printed: AtomicUsize::new(0),
        }
    }

    /// Record `done` of `total` entries fetched
    pub fn update(&self, done: usize, total: usize) {
        match self.bar {
            Some(ref bar) => {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
            }
            None => {
                if should_print(done, total) && self.printed.fetch_max(done, Ordering::SeqCst) < done {
                    println!("  fetched {}/{}", done, total);
                }
            }
        }
    }

    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

fn should_print(done: usize, total: usize) -> bool {
    done == total || done % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_non_interactive() {
        let ctx = UiContext::non_interactive();
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start("Exporting...");
        spinner.stop("Done");
    }

    #[test]
    fn install_progress_non_interactive() {
        let ctx = UiContext::non_interactive();
        let progress = InstallProgress::new(&ctx, "mh-procurement-cache-v1", 24);
        for done in 1..=24 {
            progress.update(done, 24);
        }
        progress.finish();
        assert_eq!(progress.printed.load(Ordering::SeqCst), 24);
    }

    #[test]
    fn prints_every_tenth_and_last() {
        assert!(should_print(10, 24));
        assert!(should_print(24, 24));
        assert!(!should_print(7, 24));
    }
}
