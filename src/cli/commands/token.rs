//! Token command - encode and decode navigation tokens

use crate::cli::args::{TokenAction, TokenArgs};
use crate::config::Config;
use crate::error::{MushafError, MushafResult};
use crate::nav::{NavigationCodec, NavigationIntent, ViewKind};
use crate::ui::{self, UiContext};

pub fn execute(args: TokenArgs, config: &Config) -> MushafResult<()> {
    let codec = NavigationCodec::new(config.navigation.max_token_bytes);

    match args.action {
        TokenAction::Encode {
            view,
            primary,
            secondary,
            page,
        } => {
            let token = codec.encode(&intent_for(&view, primary, secondary, page)?)?;
            println!("{token}");
        }
        TokenAction::Decode { token } => {
            let ctx = UiContext::detect();
            let intent = codec.decode(&token)?;
            ui::key_value(&ctx, "view", &format!("{:?} ({})", intent.view, intent.view.tag()));
            for &field in intent.view.fields() {
                if let Some(value) = intent.get(field) {
                    ui::key_value(&ctx, field.name(), &value.to_string());
                }
            }
            ui::key_value(&ctx, "bytes", &format!("{} of {}", token.len(), codec.max_bytes()));
        }
    }
    Ok(())
}

fn intent_for(
    tag: &str,
    primary: Option<u32>,
    secondary: Option<u32>,
    page: Option<u32>,
) -> MushafResult<NavigationIntent> {
    let view = ViewKind::from_tag(tag).ok_or_else(|| {
        let known: Vec<&str> = ViewKind::ALL.iter().map(|v| v.tag()).collect();
        MushafError::User(format!("Unknown view '{tag}', expected one of: {}", known.join(", ")))
    })?;

    let mut intent = NavigationIntent::new(view);
    intent.primary = primary;
    intent.secondary = secondary;
    intent.page = page;
    Ok(intent)
}
