//! Blocking feed client: one request, one envelope, one [`FeedData`].
//!
//! - The query is built from [`FeedOptions::query`].
//! - A non-success HTTP status fails the fetch; there are no retries.
//! - If an [`FeedObserver`] is provided, success/failure/alerts are reported to it.
//! - With [`FeedOptions::debug`] set, the query URL, envelope summary and column mapping are
//!   logged at `info` level instead of `debug`.

use std::fmt;
use std::sync::Arc;

use reqwest::blocking::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FeedError, FeedResult};

use super::envelope::{FeedData, FeedEnvelope, assemble, parse_envelope};
use super::observability::{FeedContext, FeedObserver, FeedSeverity, FeedStats};
use super::query::FeedQuery;

/// Options controlling a [`FeedClient`].
///
/// Use [`Default`] for the full published KSI range.
#[derive(Clone)]
pub struct FeedOptions {
    /// Which records to request.
    pub query: FeedQuery,
    /// Log the query, envelope summary and column mapping at `info` level.
    pub debug: bool,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
    /// `User-Agent` header sent with the request.
    pub user_agent: String,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn FeedObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: FeedSeverity,
}

impl fmt::Debug for FeedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedOptions")
            .field("query", &self.query)
            .field("debug", &self.debug)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("user_agent", &self.user_agent)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            query: FeedQuery::default(),
            debug: false,
            accept_invalid_certs: false,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            observer: None,
            alert_at_or_above: FeedSeverity::Critical,
        }
    }
}

/// Issues the feed request and assembles the response.
pub struct FeedClient {
    http: Client,
    options: FeedOptions,
}

impl fmt::Debug for FeedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedClient")
            .field("options", &self.options)
            .finish()
    }
}

impl FeedClient {
    /// Create a client. Fails if the HTTP client cannot be built (e.g. TLS backend errors).
    pub fn new(options: FeedOptions) -> FeedResult<Self> {
        let http = Client::builder()
            .user_agent(options.user_agent.clone())
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()?;
        Ok(Self { http, options })
    }

    pub fn options(&self) -> &FeedOptions {
        &self.options
    }

    /// The URL [`Self::fetch`] will request.
    pub fn query_url(&self) -> FeedResult<Url> {
        self.options.query.to_url()
    }

    /// Request the feed once and coerce every record.
    ///
    /// When an observer is configured, this reports:
    ///
    /// - `on_success` on success, with row/column/category stats
    /// - `on_failure` on failure, with a computed severity
    /// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
    pub fn fetch(&self) -> FeedResult<FeedData> {
        let url = self.query_url();
        let ctx = FeedContext {
            url: url
                .as_ref()
                .map(|u| u.to_string())
                .unwrap_or_else(|_| self.options.query.base_url.clone()),
        };

        let result = url.and_then(|url| {
            let body = self.get(url)?;
            let envelope = parse_envelope(&body)?;
            self.build(&envelope)
        });

        self.report(&ctx, &result);
        result
    }

    fn get(&self, url: Url) -> FeedResult<String> {
        self.dump("feed query", &url);

        let response = self.http.get(url.clone()).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text()?;
        debug!(bytes = body.len(), "feed response received");
        Ok(body)
    }

    fn build(&self, envelope: &FeedEnvelope) -> FeedResult<FeedData> {
        self.dump(
            "feed envelope",
            &format!(
                "fields={} features={} exceeded_transfer_limit={}",
                envelope.fields.as_ref().map_or(0, Vec::len),
                envelope.features.len(),
                envelope.exceeded_transfer_limit
            ),
        );

        let data = assemble(envelope)?;
        if data.exceeded_transfer_limit {
            warn!(
                rows = data.dataset.row_count(),
                "feed truncated the result; narrow the index range to get every record"
            );
        }

        self.dump("column mapping", &data.mapper);
        Ok(data)
    }

    fn report(&self, ctx: &FeedContext, result: &FeedResult<FeedData>) {
        let Some(obs) = self.options.observer.as_ref() else {
            return;
        };
        match result {
            Ok(data) => obs.on_success(ctx, &stats_for(data)),
            Err(e) => {
                let sev = FeedSeverity::for_error(e);
                obs.on_failure(ctx, sev, e);
                if sev >= self.options.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }

    fn dump(&self, what: &str, body: &dyn fmt::Display) {
        if self.options.debug {
            info!("{what}:\n{body}");
        } else {
            debug!("{what}:\n{body}");
        }
    }
}

/// Stats reported to observers for a successful fetch.
pub fn stats_for(data: &FeedData) -> FeedStats {
    FeedStats {
        rows: data.dataset.row_count(),
        columns: data.dataset.column_count(),
        categories: data.mapper.columns().map(|c| c.category_count()).sum(),
        most_categories: data
            .mapper
            .columns()
            .filter(|c| c.category_count() > 0)
            .fold(None, |best: Option<(&str, usize)>, c| match best {
                Some((_, n)) if n >= c.category_count() => best,
                _ => Some((c.name(), c.category_count())),
            })
            .map(|(name, n)| (name.to_string(), n)),
        truncated: data.exceeded_transfer_limit,
    }
}
