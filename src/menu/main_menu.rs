use crate::component::RenameProfile;
use crate::config::save::save_settings;
use crate::config::{Config, Language};
use crate::menu::handlers::{run_batch_rename, run_dpi_normalization, run_media_audit};
use anyhow::Result;
use console::{Term, style};
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use rust_i18n::t;

pub fn show_main_menu(term: &Term, config: &mut Config) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_audit"),
        t!("main_menu.opt_rename_images"),
        t!("main_menu.opt_rename_videos"),
        t!("main_menu.opt_dpi"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_media_audit(term, config)?;
            Ok(true)
        }
        Some(1) => {
            run_batch_rename(term, config, RenameProfile::Images)?;
            Ok(true)
        }
        Some(2) => {
            run_batch_rename(term, config, RenameProfile::Videos)?;
            Ok(true)
        }
        Some(3) => {
            run_dpi_normalization(term, config)?;
            Ok(true)
        }
        Some(4) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(5) => Ok(false),
        None => Ok(false), // ESC
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_missing_dpi"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_missing_dpi_menu(term, config)?,
            Some(1) => show_language_menu(term, config)?,
            Some(2) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// 未宣告 DPI 的處理方式
fn show_missing_dpi_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.missing_dpi.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let choices = [false, true];
    let items: Vec<String> = vec![
        t!("settings.missing_dpi.keep").to_string(),
        t!(
            "settings.missing_dpi.write",
            dpi = config.settings.dpi.target_dpi
        )
        .to_string(),
    ];

    let default_index = usize::from(config.settings.dpi.normalize_missing);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.missing_dpi.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    let Some(selection) = selection else {
        return Ok(());
    };

    let normalize_missing = choices[selection];
    if normalize_missing != config.settings.dpi.normalize_missing {
        config.settings.dpi.normalize_missing = normalize_missing;
        save_settings(&config.settings)?;
        println!(
            "\n{} {}",
            style(t!("settings.saved")).green(),
            items[selection]
        );
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::EnUs, Language::ZhTw];
    let items: Vec<String> = languages.iter().map(ToString::to_string).collect();

    let default_index = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        println!(
            "\n{} {}",
            style(t!("settings.saved")).green(),
            selected_lang
        );
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}
