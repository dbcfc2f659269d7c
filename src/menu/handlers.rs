use crate::component::{BatchRename, DpiNormalization, MediaAudit, RenameProfile};
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use log::warn;
use rust_i18n::t;
use std::fmt::Display;

fn report_error(error: impl Display) {
    warn!("元件執行失敗: {error}");
    eprintln!("{} {}", style(t!("main_menu.error_prefix")).red().bold(), error);
}

pub fn run_media_audit(term: &Term, config: &Config) -> Result<()> {
    let audit = MediaAudit::new(config.clone());

    if let Err(e) = audit.run() {
        report_error(format!("{e:#}"));
    }

    pause(term)?;
    Ok(())
}

pub fn run_batch_rename(term: &Term, config: &Config, profile: RenameProfile) -> Result<()> {
    let renamer = BatchRename::new(config.clone(), profile);

    if let Err(e) = renamer.run() {
        report_error(format!("{e:#}"));
    }

    pause(term)?;
    Ok(())
}

pub fn run_dpi_normalization(term: &Term, config: &Config) -> Result<()> {
    let normalizer = DpiNormalization::new(config.clone());

    if let Err(e) = normalizer.run() {
        report_error(format!("{e:#}"));
    }

    pause(term)?;
    Ok(())
}
