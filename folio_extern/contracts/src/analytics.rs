use std::future::Future;

use folio_models::analytics::{EventData, PortfolioEvent};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait AnalyticsService: Send + Sync + 'static {
    /// Record an event. Best effort: failures are logged and never returned.
    fn track_event(&self, event: PortfolioEvent, data: EventData)
        -> impl Future<Output = ()> + Send;
}
