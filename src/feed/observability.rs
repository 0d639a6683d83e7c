use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::FeedError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FeedSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal, e.g. a truncated result).
    Warning,
    /// Error-level event (the dataset build failed).
    Error,
    /// Critical error (transport failures: the feed could not be reached or refused the query).
    Critical,
}

impl FeedSeverity {
    /// Severity of a failed fetch.
    pub fn for_error(e: &FeedError) -> Self {
        match e.root() {
            FeedError::Http(_) | FeedError::HttpStatus { .. } | FeedError::Url(_) => Self::Critical,
            _ => Self::Error,
        }
    }
}

/// Context about a fetch attempt.
#[derive(Debug, Clone)]
pub struct FeedContext {
    /// The request URL.
    pub url: String,
}

/// Stats reported on a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedStats {
    /// Number of coerced rows.
    pub rows: usize,
    /// Number of schema columns.
    pub columns: usize,
    /// Distinct categorical values encoded across all text columns.
    pub categories: usize,
    /// Text column with the most distinct categorical values, and that count.
    pub most_categories: Option<(String, usize)>,
    /// The service truncated the result.
    pub truncated: bool,
}

impl fmt::Display for FeedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows={} columns={} categories={}",
            self.rows, self.columns, self.categories
        )?;
        if let Some((column, count)) = &self.most_categories {
            write!(f, " most_categories={column}:{count}")?;
        }
        if self.truncated {
            f.write_str(" truncated")?;
        }
        Ok(())
    }
}

/// Observer interface for fetch outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait FeedObserver: Send + Sync {
    /// Called when a fetch succeeds.
    fn on_success(&self, _ctx: &FeedContext, _stats: &FeedStats) {}

    /// Called when a fetch fails.
    fn on_failure(&self, _ctx: &FeedContext, _severity: FeedSeverity, _error: &FeedError) {}

    /// Called when a fetch failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &FeedContext, severity: FeedSeverity, error: &FeedError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn FeedObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn FeedObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl FeedObserver for CompositeObserver {
    fn on_success(&self, ctx: &FeedContext, stats: &FeedStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &FeedContext, severity: FeedSeverity, error: &FeedError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &FeedContext, severity: FeedSeverity, error: &FeedError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs fetch events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl FeedObserver for StdErrObserver {
    fn on_success(&self, ctx: &FeedContext, stats: &FeedStats) {
        eprintln!("[feed][ok] url={} {stats}", ctx.url);
    }

    fn on_failure(&self, ctx: &FeedContext, severity: FeedSeverity, error: &FeedError) {
        eprintln!("[feed][{severity:?}] url={} err={error}", ctx.url);
    }

    fn on_alert(&self, ctx: &FeedContext, severity: FeedSeverity, error: &FeedError) {
        eprintln!("[ALERT][feed][{severity:?}] url={} err={error}", ctx.url);
    }
}

/// Appends fetch events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl FeedObserver for FileObserver {
    fn on_success(&self, ctx: &FeedContext, stats: &FeedStats) {
        self.append_line(&format!("{} ok url={} {stats}", unix_ts(), ctx.url));
    }

    fn on_failure(&self, ctx: &FeedContext, severity: FeedSeverity, error: &FeedError) {
        self.append_line(&format!(
            "{} fail severity={severity:?} url={} err={error}",
            unix_ts(),
            ctx.url
        ));
    }

    fn on_alert(&self, ctx: &FeedContext, severity: FeedSeverity, error: &FeedError) {
        self.append_line(&format!(
            "{} ALERT severity={severity:?} url={} err={error}",
            unix_ts(),
            ctx.url
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::{CompositeObserver, FeedContext, FeedObserver, FeedSeverity, FeedStats};
    use crate::error::FeedError;

    #[derive(Default)]
    struct Counting {
        successes: AtomicUsize,
        failures: AtomicUsize,
    }

    impl FeedObserver for Counting {
        fn on_success(&self, _ctx: &FeedContext, _stats: &FeedStats) {
            self.successes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_failure(&self, _ctx: &FeedContext, _severity: FeedSeverity, _error: &FeedError) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn composite_fans_out_and_alert_defaults_to_failure() {
        let a = Arc::new(Counting::default());
        let b = Arc::new(Counting::default());
        let composite = CompositeObserver::new(vec![a.clone() as Arc<dyn FeedObserver>, b.clone()]);
        let ctx = FeedContext {
            url: "http://example.invalid".to_string(),
        };

        composite.on_success(
            &ctx,
            &FeedStats {
                rows: 1,
                columns: 1,
                categories: 0,
                most_categories: None,
                truncated: false,
            },
        );
        let err = FeedError::UnknownField {
            name: "X".to_string(),
        };
        composite.on_alert(&ctx, FeedSeverity::Error, &err);

        for o in [&a, &b] {
            assert_eq!(o.successes.load(Ordering::SeqCst), 1);
            assert_eq!(o.failures.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn stats_display_names_the_busiest_column() {
        let stats = FeedStats {
            rows: 4,
            columns: 11,
            categories: 7,
            most_categories: Some(("STREET1".to_string(), 3)),
            truncated: true,
        };
        assert_eq!(
            stats.to_string(),
            "rows=4 columns=11 categories=7 most_categories=STREET1:3 truncated"
        );
    }

    #[test]
    fn transport_errors_are_critical() {
        let e = FeedError::HttpStatus {
            status: 503,
            url: "http://example.invalid".to_string(),
        };
        assert_eq!(FeedSeverity::for_error(&e), FeedSeverity::Critical);
    }

    #[test]
    fn core_errors_are_errors_even_when_wrapped() {
        let e = FeedError::UnknownField {
            name: "X".to_string(),
        }
        .in_record(4);
        assert_eq!(FeedSeverity::for_error(&e), FeedSeverity::Error);
        assert!(FeedSeverity::Critical > FeedSeverity::Error);
    }
}
