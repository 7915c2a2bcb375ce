//! Progress-callback trait for per-section generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::ReportConfigBuilder::progress_callback`] to receive
//! events as the composer walks the document. Callers can forward them to a
//! terminal spinner, a log line or a job-status record without the library
//! knowing how the host application communicates.
//!
//! # Example
//!
//! ```rust
//! use condo_report::{GenerationProgressCallback, ReportConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     sections: Arc<AtomicUsize>,
//! }
//!
//! impl GenerationProgressCallback for CountingCallback {
//!     fn on_section_complete(&self, name: &str, records: usize) {
//!         self.sections.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{name}: {records} records");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     sections: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ReportConfig::builder()
//!     .progress_callback(counter as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the composer as it lays out each part of the document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Layout is single-threaded, but the trait is
/// `Send + Sync` so one callback can be shared across concurrent requests.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called once after assets are resolved, before the first draw.
    ///
    /// # Arguments
    /// * `sections`: number of body sections that will be laid out
    fn on_generation_start(&self, sections: usize) {
        let _ = sections;
    }

    /// Called before a section's first block is drawn.
    fn on_section_start(&self, name: &str) {
        let _ = name;
    }

    /// Called after a section is drawn.
    ///
    /// # Arguments
    /// * `name`   : section title as printed
    /// * `records`: records left after the date-range filter (0 renders a placeholder)
    fn on_section_complete(&self, name: &str, records: usize) {
        let _ = (name, records);
    }

    /// Called when a logo or signature could not be resolved and is omitted.
    fn on_asset_error(&self, source: &str, error: &str) {
        let _ = (source, error);
    }

    /// Called once the artifact has been serialised.
    fn on_generation_complete(&self, pages: usize) {
        let _ = pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReportConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        started: AtomicUsize,
        names: Mutex<Vec<String>>,
        asset_errors: AtomicUsize,
        pages: AtomicUsize,
    }

    impl GenerationProgressCallback for TrackingCallback {
        fn on_generation_start(&self, sections: usize) {
            self.started.store(sections, Ordering::SeqCst);
        }

        fn on_section_complete(&self, name: &str, _records: usize) {
            self.names.lock().unwrap().push(name.to_string());
        }

        fn on_asset_error(&self, _source: &str, _error: &str) {
            self.asset_errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_generation_complete(&self, pages: usize) {
            self.pages.store(pages, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_generation_start(5);
        cb.on_section_start("Costos");
        cb.on_section_complete("Costos", 0);
        cb.on_asset_error("https://cdn.test/logo.png", "HTTP 404");
        cb.on_generation_complete(3);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_generation_start(2);
        tracker.on_section_complete("Tickets", 4);
        tracker.on_section_complete("Costos", 10);
        tracker.on_asset_error("firma.png", "unreadable");
        tracker.on_generation_complete(6);

        assert_eq!(tracker.started.load(Ordering::SeqCst), 2);
        assert_eq!(*tracker.names.lock().unwrap(), vec!["Tickets", "Costos"]);
        assert_eq!(tracker.asset_errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.pages.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn GenerationProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_generation_start(5);
        cb.on_section_start("Contratos");
    }
}
