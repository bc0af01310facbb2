use std::fmt::Write as _;
use std::path::Path;

use introskip_api::{IntroDbClient, IntroDbError, SegmentService, Submission};
use introskip_core::config::AppConfig;
use introskip_core::models::{format_duration, DiscoveryResult, SegmentKind, SkipStats};
use introskip_core::storage::INTRODB_KEY;
use introskip_detect::{PageMeta, PageSignals};
use introskip_parse::time::{format_clock, parse_clock};
use introskip_runtime::Runtime;

use crate::cli::{ConfigAction, ConfigSetArgs, KeyAction, PageArgs, StatsArgs, SubmitArgs};

/// Tab id used for one-shot CLI requests.
const CLI_TAB: u64 = 0;

pub type CommandResult = Result<(), String>;

/// Turn CLI page arguments into extractor input.
pub fn page_signals(args: &PageArgs) -> Result<PageSignals, String> {
    let body = match &args.body_file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?,
        None => args.body.clone(),
    };
    let json_ld = args
        .json_ld
        .iter()
        .map(|path| {
            std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(
        PageSignals::new(&args.url, &args.title, body, args.position).with_meta(PageMeta {
            og_title: args.og_title.clone(),
            twitter_title: None,
            h1: args.h1.clone(),
            json_ld,
        }),
    )
}

pub fn extract(args: &PageArgs) -> CommandResult {
    let signals = page_signals(args)?;
    if introskip_detect::is_restricted_url(&signals.url) {
        return Err(format!("{} is a browser-internal page", signals.url));
    }
    let ctx = introskip_detect::extract_page(&signals);
    print_json(&ctx)
}

pub async fn resolve(runtime: &Runtime, args: &PageArgs) -> CommandResult {
    let signals = page_signals(args)?;
    let ctx = introskip_detect::extract_page(&signals);
    if !ctx.is_ready() {
        tracing::warn!(title = %ctx.title, "Extracted title too short to resolve");
    }

    let background = runtime.spawn_background();
    let result = background.resolve_and_fetch(CLI_TAB, ctx).await;
    print!("{}", describe_discovery(&result));
    Ok(())
}

/// Human-readable summary of a discovery result.
pub fn describe_discovery(result: &DiscoveryResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "status: {}", result.status);
    if let Some(id) = result.catalog_id {
        let _ = writeln!(out, "catalog id: {id}");
    }
    for segment in result.segments.iter() {
        let end = match segment.end_ms {
            Some(end) if end < introskip_core::models::OPEN_END_SENTINEL_MS => {
                format_clock(end as f64 / 1000.0)
            }
            _ => "end".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<8} {} - {}",
            segment.kind.as_str(),
            format_clock(segment.start_ms as f64 / 1000.0),
            end
        );
    }
    out
}

/// Build and validate a submission from CLI input.
pub fn build_submission(args: &SubmitArgs) -> Result<Submission, String> {
    let start_sec =
        parse_clock(&args.start).ok_or_else(|| format!("invalid start time: {}", args.start))?;
    let end_sec = match &args.end {
        Some(end) => Some(parse_clock(end).ok_or_else(|| format!("invalid end time: {end}"))?),
        None => None,
    };
    let submission = Submission {
        tmdb_id: args.tmdb_id,
        media_type: args.kind.into(),
        segment: args.segment,
        start_sec,
        end_sec,
        season: args.season,
        episode: args.episode,
    };
    submission.validate()?;
    Ok(submission)
}

pub async fn submit(runtime: &Runtime, args: &SubmitArgs) -> CommandResult {
    let submission = build_submission(args)?;
    runtime
        .background()
        .segment_db()
        .submit(&submission)
        .await
        .map_err(|e| submit_error_text(&e))?;
    println!(
        "Submitted {} {}-{} for {}",
        submission.segment,
        format_clock(submission.start_sec),
        submission
            .end_sec
            .map(format_clock)
            .unwrap_or_else(|| "end".into()),
        submission.tmdb_id
    );
    Ok(())
}

fn submit_error_text(e: &IntroDbError) -> String {
    match e {
        IntroDbError::Unauthorized => {
            "no valid API key; store one with `introskip key set <KEY>`".into()
        }
        IntroDbError::Invalid(msg) => msg.clone(),
        IntroDbError::Api { message, .. } => format!("submission rejected: {message}"),
        IntroDbError::Http(_) => "could not reach the segment database".into(),
        other => other.to_string(),
    }
}

pub async fn stats(runtime: &Runtime, args: &StatsArgs) -> CommandResult {
    let db = runtime.db();
    if args.reset {
        db.reset_skip_stats().await.map_err(|e| e.to_string())?;
        println!("Skip statistics reset.");
        return Ok(());
    }

    let local = db.skip_stats().await.map_err(|e| e.to_string())?;
    print!("{}", describe_skip_stats(&local));

    let service = runtime.background().segment_db();
    if args.community {
        match service.community_stats().await {
            Ok(s) => println!("community submissions: {}", s.total_submissions),
            Err(e) => tracing::warn!("Community stats unavailable: {e}"),
        }
    }
    if args.me {
        match service.user_stats().await {
            Ok(s) => {
                println!(
                    "your submissions: {} ({} accepted, {} pending, {} rejected)",
                    s.total, s.accepted, s.pending, s.rejected
                );
                if let Some(saved) = s.total_time_saved_ms {
                    println!("time saved for others: {}", format_duration(saved));
                }
            }
            Err(e) => tracing::warn!("User stats unavailable: {e}"),
        }
    }
    Ok(())
}

pub fn describe_skip_stats(stats: &SkipStats) -> String {
    let mut out = String::new();
    for &kind in SegmentKind::ALL {
        let s = stats.get(kind);
        let _ = writeln!(
            out,
            "{:<8} {:>5} skips  {}",
            kind.as_str(),
            s.count,
            format_duration(s.saved_ms)
        );
    }
    let _ = writeln!(
        out,
        "{:<8} {:>5} skips  {}",
        "total",
        stats.total_count(),
        format_duration(stats.total_saved_ms())
    );
    out
}

pub async fn key(runtime: &Runtime, action: &KeyAction) -> CommandResult {
    let db = runtime.db();
    match action {
        KeyAction::Set { key } => {
            db.set_credential(INTRODB_KEY, key)
                .await
                .map_err(|e| e.to_string())?;
            println!("API key saved.");
        }
        KeyAction::Clear => {
            let removed = db
                .clear_credential(INTRODB_KEY)
                .await
                .map_err(|e| e.to_string())?;
            println!("{}", if removed { "API key removed." } else { "No API key stored." });
        }
    }
    Ok(())
}

pub fn config(action: &ConfigAction) -> CommandResult {
    let path = AppConfig::config_path();
    match action {
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Set(args) => {
            update_config(&path, args)?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

/// Apply `args` to the file at `path`. Environment overrides are not persisted.
pub fn update_config(path: &Path, args: &ConfigSetArgs) -> Result<AppConfig, String> {
    let mut config = AppConfig::load_from(path).map_err(|e| e.to_string())?;
    if let Some(token) = &args.tmdb_token {
        config.services.tmdb.token = token.trim().to_string();
    }
    if let Some(url) = &args.api_url {
        IntroDbClient::new(url, None).map_err(|e| format!("invalid API URL: {e}"))?;
        config.services.introdb.api_url = url.trim().to_string();
    }
    if let Some(enabled) = args.log_to_file {
        config.general.log_to_file = enabled;
    }
    config.save_to(path).map_err(|e| e.to_string())?;
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T) -> CommandResult {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use introskip_core::models::{KindStats, NormalizedSegments, Segment};

    use crate::cli::KindArg;

    fn submit_args(kind: KindArg, segment: SegmentKind, start: &str, end: Option<&str>) -> SubmitArgs {
        SubmitArgs {
            tmdb_id: 70523,
            kind,
            segment,
            start: start.into(),
            end: end.map(str::to_string),
            season: (kind == KindArg::Tv).then_some(1),
            episode: (kind == KindArg::Tv).then_some(2),
        }
    }

    fn config_args(tmdb_token: Option<&str>, api_url: Option<&str>) -> ConfigSetArgs {
        ConfigSetArgs {
            tmdb_token: tmdb_token.map(str::to_string),
            api_url: api_url.map(str::to_string),
            log_to_file: None,
        }
    }

    #[test]
    fn test_update_config_keeps_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[playback]\nretry_ceiling_ms = 30000\n").unwrap();

        update_config(&path, &config_args(Some(" tok "), None)).unwrap();
        let config = update_config(&path, &config_args(None, Some("http://localhost:9000/v2"))).unwrap();
        assert_eq!(config.services.tmdb.token, "tok");
        assert_eq!(config.services.introdb.api_url, "http://localhost:9000/v2");

        let reloaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.services.tmdb.token, "tok");
        assert_eq!(reloaded.playback.retry_ceiling_ms, 30_000);
    }

    #[test]
    fn test_update_config_rejects_bad_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let err = update_config(&path, &config_args(None, Some("not a url"))).unwrap_err();
        assert!(err.starts_with("invalid API URL"));
        assert!(!path.exists());
    }

    #[test]
    fn test_build_submission() {
        let s = build_submission(&submit_args(KindArg::Tv, SegmentKind::Intro, "0:05", Some("1:30")))
            .unwrap();
        assert_eq!(s.start_sec, 5.0);
        assert_eq!(s.end_sec, Some(90.0));
        assert_eq!(s.season, Some(1));
    }

    #[test]
    fn test_build_submission_errors_are_readable() {
        let err = build_submission(&submit_args(KindArg::Movie, SegmentKind::Intro, "abc", None))
            .unwrap_err();
        assert_eq!(err, "invalid start time: abc");

        let err = build_submission(&submit_args(KindArg::Movie, SegmentKind::Intro, "10", None))
            .unwrap_err();
        assert_eq!(err, "intro segments need an end time");

        // Credits may run to the end.
        assert!(build_submission(&submit_args(KindArg::Movie, SegmentKind::Credits, "1:40:00", None)).is_ok());
    }

    #[test]
    fn test_unauthorized_text() {
        assert!(submit_error_text(&IntroDbError::Unauthorized).contains("introskip key set"));
    }

    #[test]
    fn test_describe_discovery() {
        let mut segs = NormalizedSegments::new();
        segs.insert(Segment {
            kind: SegmentKind::Intro,
            start_ms: 5_000,
            end_ms: Some(90_000),
        });
        segs.insert(Segment {
            kind: SegmentKind::Credits,
            start_ms: 3_000_000,
            end_ms: None,
        });
        let text = describe_discovery(&DiscoveryResult::success(70523, segs));
        assert!(text.contains("status: success"));
        assert!(text.contains("catalog id: 70523"));
        assert!(text.contains("intro    00:05 - 01:30"));
        assert!(text.contains("credits  50:00 - end"));
    }

    #[test]
    fn test_describe_skip_stats() {
        let mut stats = SkipStats::default();
        stats.by_kind.insert(
            SegmentKind::Intro,
            KindStats {
                count: 3,
                saved_ms: 150_000,
            },
        );
        let text = describe_skip_stats(&stats);
        assert!(text.contains("intro        3 skips  2m 30s"));
        assert!(text.contains("total        3 skips  2m 30s"));
    }

    #[test]
    fn test_page_signals_meta() {
        let args = PageArgs {
            url: "https://example.com/movie/550".into(),
            title: "Fight Club".into(),
            body: String::new(),
            body_file: None,
            position: 3.0,
            og_title: Some("Fight Club (1999)".into()),
            h1: None,
            json_ld: Vec::new(),
        };
        let signals = page_signals(&args).unwrap();
        assert_eq!(signals.meta.og_title.as_deref(), Some("Fight Club (1999)"));
        assert_eq!(signals.playback_seconds, 3.0);
    }
}
