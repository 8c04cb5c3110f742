//! The sequential dispatch loop.

use super::BatchDownloader;
use super::validate::parse_urls;
use crate::error::{Error, Result};
use crate::types::{BatchResult, Event, Outcome, RetrievalRequest};

impl BatchDownloader {
    /// Validate `raw_input` and retrieve every accepted URL in order
    ///
    /// Items run one at a time. A failing item is recorded and the loop moves
    /// on. When the strategy asks for pacing, the loop waits that long between
    /// two items (never after the last one).
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` when the input is blank or contains no
    /// accepted URL. Nothing is dispatched in that case. Item failures never
    /// produce an `Err`.
    pub async fn run(&self, raw_input: &str) -> Result<BatchResult> {
        let requests = parse_urls(raw_input, &self.config.download.url_filter)?;
        let total = requests.len();

        tracing::info!(total, strategy = self.strategy.name(), "starting batch");
        self.emit(Event::BatchStarted {
            total,
            strategy: self.strategy.kind(),
        });

        let mut result = BatchResult::default();
        let mut cancelled = false;

        for (index, request) in requests.iter().enumerate() {
            if self.cancel_token.is_cancelled() {
                cancelled = true;
                break;
            }

            self.emit(Event::ItemStarted {
                index,
                total,
                url: request.url().to_string(),
            });

            let outcome = self.dispatch(index, total, request).await;
            match &outcome {
                Outcome::Success { filename } => self.emit(Event::ItemSucceeded {
                    index,
                    url: request.url().to_string(),
                    filename: filename.clone(),
                }),
                Outcome::Failure { reason } => self.emit(Event::ItemFailed {
                    index,
                    url: request.url().to_string(),
                    reason: reason.clone(),
                }),
            }
            result.record(request.url(), outcome);

            if index + 1 < total
                && let Some(delay) = self.strategy.pacing_delay()
            {
                tracing::debug!(?delay, "pacing before next item");
                self.emit(Event::Pacing { delay });
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = self.cancel_token.cancelled() => {}
                }
            }
        }

        if cancelled {
            tracing::warn!(
                dispatched = result.total(),
                total,
                "batch cancelled before all items were dispatched"
            );
            self.emit(Event::BatchCancelled {
                dispatched: result.total(),
            });
        }

        tracing::info!(
            success = result.success_count,
            failed = result.fail_count,
            "batch finished"
        );
        self.emit(Event::BatchFinished {
            result: result.clone(),
        });

        Ok(result)
    }

    /// Resolve one item, converting every error into a failed outcome
    async fn dispatch(&self, index: usize, total: usize, request: &RetrievalRequest) -> Outcome {
        tracing::info!(item = index + 1, total, url = %request, "dispatching");

        let attempt = self.strategy.resolve(request);
        let resolved = match self.config.download.item_timeout {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .unwrap_or_else(|_| Err(Error::Timeout(limit))),
            None => attempt.await,
        };

        match resolved {
            Ok(filename) => {
                tracing::info!(url = %request, filename = %filename, "item succeeded");
                Outcome::Success { filename }
            }
            Err(e) => {
                if e.is_item_scoped() {
                    tracing::warn!(
                        url = %request,
                        code = e.error_code(),
                        error = %e,
                        "item failed"
                    );
                } else {
                    // Still confined to this item; the batch keeps going
                    tracing::error!(
                        url = %request,
                        code = e.error_code(),
                        error = %e,
                        "strategy returned a non-item error"
                    );
                }
                Outcome::Failure {
                    reason: e.to_string(),
                }
            }
        }
    }
}
