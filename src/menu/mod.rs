//! 互動式主選單

mod handlers;
mod main_menu;

pub use main_menu::show_main_menu;

use crate::config::Config;
use anyhow::Result;
use console::{Term, style};
use log::{info, warn};
use rust_i18n::t;

/// 重複顯示主選單直到使用者離開
pub fn run_interactive(config: &mut Config) -> Result<()> {
    let term = Term::stdout();

    loop {
        match show_main_menu(&term, config) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {}", style(t!("main_menu.error_prefix")).red().bold(), e);
                break;
            }
        }
    }

    Ok(())
}
