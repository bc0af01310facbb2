//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use introskip_core::models::{MediaKind, SegmentKind};

#[derive(Debug, Parser)]
#[command(name = "introskip", version, about = "Find and skip intros on streaming pages")]
pub struct Cli {
    /// Also write logs to a daily-rotated file in the data directory.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the media context extracted from page signals.
    Extract(PageArgs),

    /// Extract, resolve against the catalog and fetch segments.
    Resolve(PageArgs),

    /// Submit a measured segment to the segment database.
    Submit(SubmitArgs),

    /// Show skip statistics.
    Stats(StatsArgs),

    /// Manage the segment database API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Show or change the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Raw page signals, as a browser would report them.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page URL.
    pub url: String,

    /// Document title.
    #[arg(short, long, default_value = "")]
    pub title: String,

    /// Visible body text.
    #[arg(short, long, default_value = "", conflicts_with = "body_file")]
    pub body: String,

    /// Read the visible body text from a file.
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    /// Current playback position in seconds.
    #[arg(short, long, default_value_t = 0.0)]
    pub position: f64,

    /// `og:title` meta content.
    #[arg(long)]
    pub og_title: Option<String>,

    /// First `<h1>` text.
    #[arg(long)]
    pub h1: Option<String>,

    /// File holding an `application/ld+json` block. Repeatable.
    #[arg(long = "json-ld")]
    pub json_ld: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Movie,
    Tv,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Movie => MediaKind::Movie,
            KindArg::Tv => MediaKind::Tv,
        }
    }
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Catalog (TMDB) id.
    #[arg(long)]
    pub tmdb_id: u64,

    #[arg(long = "type", value_enum)]
    pub kind: KindArg,

    /// intro, recap, credits or preview.
    #[arg(long)]
    pub segment: SegmentKind,

    /// Start time (`H:MM:SS`, `MM:SS` or seconds).
    #[arg(long)]
    pub start: String,

    /// End time. Omit for credits/preview running to the end.
    #[arg(long)]
    pub end: Option<String>,

    #[arg(long)]
    pub season: Option<u32>,

    #[arg(long)]
    pub episode: Option<u32>,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Include community-wide counters.
    #[arg(long)]
    pub community: bool,

    /// Include your own submission counters (needs an API key).
    #[arg(long)]
    pub me: bool,

    /// Reset local skip statistics.
    #[arg(long, conflicts_with_all = ["community", "me"])]
    pub reset: bool,
}

#[derive(Debug, Subcommand)]
pub enum KeyAction {
    /// Store an API key.
    Set { key: String },
    /// Remove the stored API key.
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the config file location.
    Path,
    /// Update settings and write them to the config file.
    Set(ConfigSetArgs),
}

#[derive(Debug, Args)]
pub struct ConfigSetArgs {
    /// TMDB read access token.
    #[arg(long)]
    pub tmdb_token: Option<String>,

    /// Segment database base URL.
    #[arg(long)]
    pub api_url: Option<String>,

    #[arg(long)]
    pub log_to_file: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "introskip",
            "extract",
            "https://www.netflix.com/watch/81234567",
            "--title",
            "Dark | Netflix",
            "--position",
            "12.5",
        ])
        .unwrap();
        let Command::Extract(page) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(page.title, "Dark | Netflix");
        assert_eq!(page.position, 12.5);
        assert!(!cli.log_file);
    }

    #[test]
    fn test_parse_submit() {
        let cli = Cli::try_parse_from([
            "introskip", "submit", "--tmdb-id", "70523", "--type", "tv", "--segment", "intro",
            "--start", "0:05", "--end", "1:30", "--season", "1", "--episode", "2", "--log-file",
        ])
        .unwrap();
        let Command::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(args.kind, KindArg::Tv);
        assert_eq!(args.segment, SegmentKind::Intro);
        assert_eq!(args.end.as_deref(), Some("1:30"));
        assert!(cli.log_file);
    }

    #[test]
    fn test_unknown_segment_rejected() {
        assert!(Cli::try_parse_from([
            "introskip", "submit", "--tmdb-id", "1", "--type", "movie", "--segment", "outro",
            "--start", "0",
        ])
        .is_err());
    }

    #[test]
    fn test_reset_conflicts() {
        assert!(Cli::try_parse_from(["introskip", "stats", "--reset", "--me"]).is_err());
    }

    #[test]
    fn test_config_set() {
        let cli = Cli::try_parse_from([
            "introskip", "config", "set", "--tmdb-token", "tok", "--log-to-file", "true",
        ])
        .unwrap();
        let Command::Config {
            action: ConfigAction::Set(args),
        } = cli.command
        else {
            panic!("expected config set");
        };
        assert_eq!(args.tmdb_token.as_deref(), Some("tok"));
        assert_eq!(args.log_to_file, Some(true));
        assert!(args.api_url.is_none());
    }

    #[test]
    fn test_key_actions() {
        let cli = Cli::try_parse_from(["introskip", "key", "set", "abc"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Key {
                action: KeyAction::Set { ref key }
            } if key == "abc"
        ));
        let cli = Cli::try_parse_from(["introskip", "key", "clear"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Key {
                action: KeyAction::Clear
            }
        ));
    }
}
