//! Config command - show or initialise configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::MushafResult;
use crate::ui::{self, UiContext};

pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> MushafResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
    }
    Ok(())
}

fn show_config(config: &Config) -> MushafResult<()> {
    let mut shown = config.clone();
    if shown.search.api_key.is_some() {
        shown.search.api_key = Some("<redacted>".to_string());
    }
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> MushafResult<()> {
    let ctx = UiContext::detect().with_assume_yes(force);
    let path = manager.path();

    if path.exists() {
        let overwrite = ui::confirm(
            &ctx,
            &format!("Overwrite {}?", path.display()),
            false,
        )
        .await?;
        if !overwrite {
            ui::step_warn_hint(
                &ctx,
                &format!("Config already exists at {}", path.display()),
                "Use --force to overwrite",
            );
            return Ok(());
        }
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());
    Ok(())
}
