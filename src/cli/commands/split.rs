//! Split command - cut long text the way reading views do

use crate::cli::args::SplitArgs;
use crate::config::Config;
use crate::error::{MushafError, MushafResult};
use crate::split::{split_from, ResumeMarker};
use crate::ui::{self, UiContext};
use tokio::io::AsyncReadExt;

pub async fn execute(args: SplitArgs, config: &Config) -> MushafResult<()> {
    let text = match &args.file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MushafError::io(format!("reading {}", path.display()), e))?,
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .map_err(|e| MushafError::io("reading stdin", e))?;
            text
        }
    };

    let max_bytes = args.max_bytes.unwrap_or(config.navigation.max_chunk_bytes);
    if max_bytes == 0 {
        return Err(MushafError::User("--max-bytes must be at least 1".to_string()));
    }
    let chunks = split_from(&text, max_bytes, ResumeMarker(args.from));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
        return Ok(());
    }

    let ctx = UiContext::detect();
    for chunk in &chunks {
        let resume = match chunk.resume_marker {
            Some(marker) => format!("resume at {}", marker.offset()),
            None => "last".to_string(),
        };
        ui::section(
            &ctx,
            &format!("Chunk {} ({} bytes, {resume})", chunk.sequence_index, chunk.text.len()),
        );
        println!("{}", chunk.text);
    }
    Ok(())
}
