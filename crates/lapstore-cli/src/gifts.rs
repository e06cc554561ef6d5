use clap::Subcommand;
use lapstore_core::{load_gift_presets, preset_gifts, AppConfig, FreeGift};

/// Sub-commands available under `gifts`.
#[derive(Debug, Subcommand)]
pub enum GiftsCommands {
    /// List the preset gifts offered in the product editor
    List,
}

pub(crate) fn run(config: &AppConfig, command: &GiftsCommands) -> anyhow::Result<()> {
    match command {
        GiftsCommands::List => {
            let gifts = match &config.gifts_path {
                Some(path) => load_gift_presets(path)?,
                None => preset_gifts(),
            };
            println!("{:<6}{:<16}NAME", "ID", "CATEGORY");
            for gift in &gifts {
                println!("{}", format_gift(gift));
            }
            Ok(())
        }
    }
}

pub(crate) fn format_gift(gift: &FreeGift) -> String {
    format!("{:<6}{:<16}{}", gift.id, gift.category.label(), gift.name)
}
