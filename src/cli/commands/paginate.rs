//! Paginate command - page arithmetic for a listing

use crate::cli::args::PaginateArgs;
use crate::config::Config;
use crate::error::MushafResult;
use crate::paginate::paginate;
use crate::ui::{self, UiContext};

pub fn execute(args: PaginateArgs, config: &Config) -> MushafResult<()> {
    let page_size = args.page_size.unwrap_or(config.navigation.page_size);
    let page = paginate(args.total, page_size, args.page);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let ctx = UiContext::detect();
    ui::key_value(&ctx, "page", &page.label());
    ui::key_value(
        &ctx,
        "items",
        &format!("{}..{} of {}", page.start_index, page.end_index, args.total),
    );
    ui::key_value(&ctx, "previous", yes_no(page.has_prev));
    ui::key_value(&ctx, "next", yes_no(page.has_next));
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
