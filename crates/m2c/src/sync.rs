//! Sync command: CLI arguments, wiring and result printing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use m2c_config::{CliSettings, Config};
use m2c_confluence::ConfluenceClient;
use m2c_renderer::StorageRenderer;
use m2c_sync::{
    DocumentResult, DocumentSource, FsSource, SyncAction, SyncEngine, SyncReport, SyncRunner,
};

use crate::error::CliError;
use crate::output::{Output, Tone};

/// Log verbosity accepted by `--log-level`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogLevel {
    Debug,
    Info,
    #[value(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    /// `EnvFilter` directive for this level.
    pub(crate) fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

/// Publish markdown documents as Confluence pages.
#[derive(Parser, Debug)]
#[command(name = "m2c", version, about)]
pub(crate) struct SyncArgs {
    /// Markdown files or directories to publish, comma-separated in the
    /// environment [default: .].
    #[arg(env = "CONFLUENCE_FILEPATH", value_delimiter = ',')]
    paths: Vec<PathBuf>,

    /// Log level (RUST_LOG takes precedence when set).
    #[arg(
        long,
        env = "LOG_LEVEL",
        value_enum,
        ignore_case = true,
        default_value = "info"
    )]
    pub(crate) log_level: LogLevel,

    /// Confluence base URL (e.g. https://example.atlassian.net).
    #[arg(long, env = "CONFLUENCE_BASE_URL")]
    base_url: Option<String>,

    /// Confluence user name or account email.
    #[arg(long, env = "CONFLUENCE_USER")]
    user: Option<String>,

    /// Confluence password or API token.
    #[arg(long, env = "CONFLUENCE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Space used when front matter names none.
    #[arg(long, env = "CONFLUENCE_DEFAULT_SPACE")]
    default_space: Option<String>,

    /// Parent page ID used when front matter names no parent.
    #[arg(long, env = "CONFLUENCE_DEFAULT_ANCESTOR")]
    default_ancestor: Option<String>,

    /// Descend into subdirectories.
    #[arg(short, long, env = "CONFLUENCE_RECURSIVE")]
    recursive: bool,

    /// Number of worker threads.
    #[arg(short, long, env = "M2C_JOBS")]
    jobs: Option<usize>,

    /// Decide what would change without touching Confluence.
    #[arg(long)]
    dry_run: bool,

    /// Path to configuration file (default: auto-discover m2c.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl SyncArgs {
    /// Run the sync.
    ///
    /// Returns `Ok(false)` when at least one document failed.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or discovery fails, before any
    /// document is processed.
    pub(crate) fn execute(self, output: &Output) -> Result<bool, CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let client = ConfluenceClient::from_config(config.require_confluence()?);

        let source = FsSource::discover(&config.sync.paths, config.sync.recursive)?;
        if source.list().is_empty() {
            output.line(Tone::Notice, "No markdown files found.");
            return Ok(true);
        }
        tracing::debug!(count = source.files().len(), "Discovered documents");

        let engine = SyncEngine::new(
            &client,
            &config.sync,
            StorageRenderer::from_config(&config.render),
        );
        let report = SyncRunner::new(engine, config.sync.jobs).run(&source)?;

        if config.sync.dry_run {
            output.line(Tone::Notice, "[DRY RUN] No changes made.");
        }
        print_report(output, &report);
        Ok(report.is_success())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            base_url: self.base_url.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            default_space: self.default_space.clone(),
            default_ancestor: self.default_ancestor.clone(),
            recursive: self.recursive.then_some(true),
            paths: (!self.paths.is_empty()).then(|| self.paths.clone()),
            jobs: self.jobs,
            dry_run: self.dry_run.then_some(true),
        }
    }
}

fn print_report(output: &Output, report: &SyncReport) {
    for result in &report.results {
        let (tone, line) = describe(result);
        output.line(tone, &line);
    }
    let tone = if report.is_success() {
        Tone::Done
    } else {
        Tone::Failed
    };
    output.line(tone, &summary(report));
}

/// Progress line for one document.
fn describe(result: &DocumentResult) -> (Tone, String) {
    let outcome = match &result.result {
        Ok(outcome) => outcome,
        Err(err) => return (Tone::Failed, format!("{}: {err}", result.id)),
    };

    let page = match (&outcome.page_id, outcome.version) {
        (Some(page_id), Some(version)) => format!("page {page_id}, v{version}"),
        (Some(page_id), None) => format!("page {page_id}"),
        _ => "new page".to_owned(),
    };

    let (tone, verb) = match (outcome.action, outcome.dry_run) {
        (SyncAction::Skip, _) => (Tone::Unchanged, "unchanged"),
        (SyncAction::Create, true) => (Tone::Plain, "would create"),
        (SyncAction::Update, true) => (Tone::Plain, "would update"),
        (SyncAction::Create, false) => (Tone::Done, "created"),
        (SyncAction::Update, false) => (Tone::Done, "updated"),
    };
    (
        tone,
        format!("{}: {verb} ({page}, {})", result.id, outcome.fingerprint),
    )
}

/// One-line batch summary.
fn summary(report: &SyncReport) -> String {
    format!(
        "{} created, {} updated, {} unchanged, {} failed",
        report.count(SyncAction::Create),
        report.count(SyncAction::Update),
        report.count(SyncAction::Skip),
        report.failed()
    )
}

#[cfg(test)]
mod tests {
    use m2c_config::SyncConfig;
    use m2c_sync::mock::{MemorySource, MockRepository};
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(args: &[&str]) -> SyncArgs {
        SyncArgs::try_parse_from(std::iter::once("m2c").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_map_to_cli_settings() {
        let args = parse(&[
            "--base-url",
            "https://example.atlassian.net",
            "--user",
            "alice",
            "--password",
            "secret",
            "--default-space",
            "ENG",
            "--default-ancestor",
            "42",
            "--recursive",
            "--jobs",
            "4",
            "--dry-run",
            "docs",
            "README.md",
        ]);
        let settings = args.cli_settings();

        assert_eq!(
            settings.base_url.as_deref(),
            Some("https://example.atlassian.net")
        );
        assert_eq!(settings.user.as_deref(), Some("alice"));
        assert_eq!(settings.password.as_deref(), Some("secret"));
        assert_eq!(settings.default_space.as_deref(), Some("ENG"));
        assert_eq!(settings.default_ancestor.as_deref(), Some("42"));
        assert_eq!(settings.recursive, Some(true));
        assert_eq!(settings.jobs, Some(4));
        assert_eq!(settings.dry_run, Some(true));
        assert_eq!(
            settings.paths,
            Some(vec![PathBuf::from("docs"), PathBuf::from("README.md")])
        );
    }

    #[test]
    fn test_unset_flags_do_not_override_config() {
        let args = SyncArgs {
            paths: Vec::new(),
            log_level: LogLevel::Info,
            base_url: None,
            user: None,
            password: None,
            default_space: None,
            default_ancestor: None,
            recursive: false,
            jobs: None,
            dry_run: false,
            config: None,
        };
        let settings = args.cli_settings();

        assert_eq!(settings.recursive, None);
        assert_eq!(settings.dry_run, None);
        assert_eq!(settings.paths, None);
    }

    #[test]
    fn test_log_level_values() {
        assert_eq!(
            parse(&["--log-level", "warning"]).log_level.directive(),
            "warn"
        );
        assert_eq!(parse(&["--log-level", "warn"]).log_level, LogLevel::Warning);
        assert_eq!(parse(&["--log-level", "debug"]).log_level.directive(), "debug");
        assert!(SyncArgs::try_parse_from(["m2c", "--log-level", "trace"]).is_err());
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        assert_eq!(parse(&["--log-level", "INFO"]).log_level, LogLevel::Info);
        assert_eq!(parse(&["--log-level", "WARNING"]).log_level, LogLevel::Warning);
        assert_eq!(parse(&["--log-level", "Debug"]).log_level, LogLevel::Debug);
    }

    #[test]
    fn test_path_list_is_comma_separated() {
        let settings = parse(&["docs,README.md"]).cli_settings();
        assert_eq!(
            settings.paths,
            Some(vec![PathBuf::from("docs"), PathBuf::from("README.md")])
        );
    }

    #[test]
    fn test_describe_lines() {
        let repo = MockRepository::new()
            .with_page("7", "DOCS", "Same", 3)
            .with_label("7", "sha-00000000");
        let config = SyncConfig {
            default_space: Some("DOCS".to_owned()),
            default_ancestor: Some("9".to_owned()),
            dry_run: true,
            ..SyncConfig::default()
        };
        let source = MemorySource::new()
            .with_document("new.md", "---\npage_title: New\n---\n")
            .with_document("same.md", "---\npage_title: Same\n---\n")
            .with_document("bad.md", "---\nspace: DOCS\n---\n");
        let engine = SyncEngine::new(&repo, &config, StorageRenderer::new());
        let report = SyncRunner::new(engine, 1).run(&source).unwrap();

        let lines: Vec<_> = report.results.iter().map(describe).collect();
        assert_eq!(
            lines,
            vec![
                (
                    Tone::Plain,
                    "new.md: would create (new page, sha-e3b0c442)".to_owned()
                ),
                (
                    Tone::Plain,
                    "same.md: would update (page 7, v4, sha-e3b0c442)".to_owned()
                ),
                (
                    Tone::Failed,
                    "bad.md: front matter missing page_title".to_owned()
                ),
            ]
        );
    }

    #[test]
    fn test_summary_counts() {
        let repo = MockRepository::new()
            .with_page("1", "DOCS", "Old", 1)
            .with_label("1", "sha-00000000");
        let config = SyncConfig {
            default_space: Some("DOCS".to_owned()),
            default_ancestor: Some("9".to_owned()),
            ..SyncConfig::default()
        };
        let source = MemorySource::new()
            .with_document("new.md", "---\npage_title: New\n---\nnew")
            .with_document("old.md", "---\npage_title: Old\n---\nchanged")
            .with_document("bad.md", "no front matter");
        let engine = SyncEngine::new(&repo, &config, StorageRenderer::new());
        let report = SyncRunner::new(engine, 1).run(&source).unwrap();

        assert_eq!(
            summary(&report),
            "1 created, 1 updated, 0 unchanged, 1 failed"
        );
    }
}
