//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Mushaf - navigation core of a button-driven Quran reading bot
///
/// Drive the bot from a terminal, inspect navigation tokens and warm the
/// remote catalogs.
#[derive(Parser, Debug)]
#[command(name = "mushaf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "MUSHAF_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Talk to the bot on stdin: numbers press buttons, text searches
    Console(ConsoleArgs),

    /// Encode or decode navigation tokens
    Token(TokenArgs),

    /// Show which items land on a page of a listing
    Paginate(PaginateArgs),

    /// Split a long text into message-sized chunks
    Split(SplitArgs),

    /// Load a remote catalog and summarise it
    Catalog(CatalogArgs),

    /// Print the health report as JSON
    Status(StatusArgs),

    /// Show or initialise configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the console command
#[derive(Parser, Debug)]
pub struct ConsoleArgs {
    /// User id attached to every event
    #[arg(long, default_value_t = 1)]
    pub user: i64,
}

/// Arguments for the token command
#[derive(Parser, Debug)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub action: TokenAction,
}

#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Build the token for a view and its fields
    Encode {
        /// View tag: menu, idx, sura, read, cont, imgs, page, aidx, recs, play, jidx, juz,
        /// srch or sub
        view: String,

        #[arg(long)]
        primary: Option<u32>,

        #[arg(long)]
        secondary: Option<u32>,

        /// Listing page index
        #[arg(long)]
        page: Option<u32>,
    },

    /// Show the view and fields carried by a token
    Decode {
        token: String,
    },
}

/// Arguments for the paginate command
#[derive(Parser, Debug)]
pub struct PaginateArgs {
    /// Number of items in the listing
    pub total: usize,

    /// Items per page (defaults to navigation.page_size)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// 0-based page index
    #[arg(short, long, default_value_t = 0)]
    pub page: usize,

    /// Print the page as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the split command
#[derive(Parser, Debug)]
pub struct SplitArgs {
    /// File to split; stdin when omitted
    pub file: Option<PathBuf>,

    /// Chunk size in bytes (defaults to navigation.max_chunk_bytes)
    #[arg(long)]
    pub max_bytes: Option<usize>,

    /// Byte offset to resume from
    #[arg(long, default_value_t = 0)]
    pub from: usize,

    /// Print chunks as JSON
    #[arg(long)]
    pub json: bool,
}

/// Catalog kinds that can be listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogKind {
    Surahs,
    Reciters,
    Juz,
}

/// Arguments for the catalog command
#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Which catalog to load
    #[arg(value_enum)]
    pub kind: CatalogKind,

    /// Also fetch the text of every surah
    #[arg(long)]
    pub prefetch: bool,

    /// Concurrent fetches while prefetching
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Load the surah index first so the report reflects a live fetch
    #[arg(long)]
    pub probe: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}
