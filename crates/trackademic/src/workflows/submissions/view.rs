use std::cmp::Reverse;

use super::domain::SubmissionRecord;
use super::filter::{FilterChange, FilterConfig, FilterError};
use super::repository::{SubmissionScope, Subscription, SubscriptionClosed};

/// A dashboard's visible slice of a live subscription.
///
/// The view owns its subscription, so dropping the view releases the
/// standing query.
#[derive(Debug)]
pub struct LiveView {
    subscription: Subscription,
    filters: FilterConfig,
    records: Vec<SubmissionRecord>,
    visible: Vec<SubmissionRecord>,
}

impl LiveView {
    pub fn new(mut subscription: Subscription, filters: FilterConfig) -> Self {
        let records = sorted(subscription.current());
        let visible = filters.evaluate(&records);
        Self {
            subscription,
            filters,
            records,
            visible,
        }
    }

    pub fn scope(&self) -> &SubmissionScope {
        self.subscription.scope()
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    /// Records passing the active filters, newest first.
    pub fn visible(&self) -> &[SubmissionRecord] {
        &self.visible
    }

    /// Every record in scope, ignoring filters.
    pub fn all(&self) -> &[SubmissionRecord] {
        &self.records
    }

    pub fn update_filter(&mut self, change: FilterChange) -> Result<&[SubmissionRecord], FilterError> {
        self.filters.apply(change)?;
        self.recompute();
        Ok(&self.visible)
    }

    pub fn replace_filters(&mut self, filters: FilterConfig) -> &[SubmissionRecord] {
        self.filters = filters;
        self.recompute();
        &self.visible
    }

    /// Wait for the store's next push and re-evaluate.
    pub async fn next_push(&mut self) -> Result<&[SubmissionRecord], SubscriptionClosed> {
        self.records = sorted(self.subscription.changed().await?);
        self.recompute();
        Ok(&self.visible)
    }

    /// Pick up a push that already arrived without waiting.
    pub fn sync(&mut self) -> &[SubmissionRecord] {
        if self.subscription.has_pending_push() {
            self.records = sorted(self.subscription.current());
            self.recompute();
        }
        &self.visible
    }

    pub fn close(self) {
        self.subscription.cancel();
    }

    fn recompute(&mut self) {
        self.visible = self.filters.evaluate(&self.records);
    }
}

fn sorted(mut records: Vec<SubmissionRecord>) -> Vec<SubmissionRecord> {
    records.sort_by(|a, b| {
        Reverse(a.last_modified)
            .cmp(&Reverse(b.last_modified))
            .then_with(|| a.id.cmp(&b.id))
    });
    records
}
