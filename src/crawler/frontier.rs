//! The crawl driver
//!
//! A [`Frontier`] owns the `pending` and `visited` sets and the [`Catalogue`].
//! Each step takes one pending URL, waits for the rate limiter, fetches the
//! page, and files every link it contains. The crawl is done when nothing is
//! pending.

use crate::crawler::fetcher::{FailureReason, Fetcher, Transport};
use crate::crawler::rate_limiter::RateLimiter;
use crate::robots::RobotsPolicy;
use crate::state::{Catalogue, UrlRecord, UrlStatus};
use crate::url::{classify_link, robots_path, LinkClass, SeedDomain};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use url::{Position, Url};

/// Progress notifications emitted while crawling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A page was fetched successfully
    PageFetched {
        url: String,
        status: u16,
        links: usize,
    },
    /// A page fetch failed
    PageFailed { url: String, reason: FailureReason },
    /// A link was found on a fetched page
    LinkFound {
        from: String,
        to: String,
        class: LinkClass,
    },
}

/// Requests a running crawl to stop after the current step
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of a single [`Frontier::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A page was fetched (successfully or not)
    Fetched,
    /// A pending entry was already visited and was dropped
    Skipped,
    /// Nothing is pending
    Done,
}

/// Drives a single-domain crawl
pub struct Frontier<T> {
    seed: SeedDomain,
    pending: HashMap<String, Url>,
    visited: HashSet<String>,
    catalogue: Catalogue,
    fetcher: Fetcher<T>,
    limiter: Arc<RateLimiter>,
    robots: Box<dyn RobotsPolicy>,
    events: Option<UnboundedSender<CrawlEvent>>,
    stop: StopHandle,
    pages_fetched: usize,
}

impl<T: Transport> Frontier<T> {
    /// Creates a frontier with the seed URL pending
    ///
    /// The seed is not checked against robots.txt.
    pub fn new(
        seed: SeedDomain,
        fetcher: Fetcher<T>,
        limiter: Arc<RateLimiter>,
        robots: Box<dyn RobotsPolicy>,
    ) -> Self {
        let root = classify_link(seed.root_url().as_str(), &seed, None);

        let mut pending = HashMap::new();
        pending.insert(root.key.clone(), seed.root_url().clone());

        let mut catalogue = Catalogue::new();
        catalogue.insert_if_absent(UrlRecord::new(&root, UrlStatus::Pending, None));

        Self {
            seed,
            pending,
            visited: HashSet::new(),
            catalogue,
            fetcher,
            limiter,
            robots,
            events: None,
            stop: StopHandle::new(),
            pages_fetched: 0,
        }
    }

    /// Replaces the stop handle, e.g. with one already wired to a signal
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Returns a handle that stops [`Frontier::run`] between steps
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Opens a progress event stream
    ///
    /// Only the most recent subscriber receives events. Dropping the receiver
    /// has no effect on the crawl.
    pub fn subscribe(&mut self) -> UnboundedReceiver<CrawlEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn seed(&self) -> &SeedDomain {
        &self.seed
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn into_catalogue(self) -> Catalogue {
        self.catalogue
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    pub fn is_visited(&self, key: &str) -> bool {
        self.visited.contains(key)
    }

    /// Returns true when nothing is pending
    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of fetch attempts made so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Processes one pending URL
    ///
    /// All state changes for the page are applied after its fetch completes,
    /// so dropping the returned future mid-fetch leaves the frontier unchanged.
    pub async fn step(&mut self) -> StepOutcome {
        let Some((key, url)) = self
            .pending
            .iter()
            .next()
            .map(|(k, u)| (k.clone(), u.clone()))
        else {
            return StepOutcome::Done;
        };

        if self.visited.contains(&key) {
            tracing::warn!("Pending URL {} was already visited, dropping it", key);
            self.pending.remove(&key);
            return StepOutcome::Skipped;
        }

        self.limiter.acquire().await;
        let result = self.fetcher.fetch(&url).await;

        self.pending.remove(&key);
        self.visited.insert(key.clone());
        self.pages_fetched += 1;

        match result {
            Ok(page) => {
                tracing::debug!("Fetched {} ({}, {} links)", key, page.status, page.links.len());
                self.catalogue.mark_visited(&key, page.status, page.title);
                self.emit(CrawlEvent::PageFetched {
                    url: key.clone(),
                    status: page.status,
                    links: page.links.len(),
                });

                if !same_resource(&page.final_url, &url) {
                    self.file_redirect_target(&key, &page.final_url, page.status);
                }

                for raw in &page.links {
                    self.file_link(&key, &page.final_url, raw);
                }
            }
            Err(failure) => {
                tracing::debug!("Failed to fetch {}: {}", key, failure.detail);
                self.emit(CrawlEvent::PageFailed {
                    url: key.clone(),
                    reason: failure.reason.clone(),
                });
                self.catalogue.mark_unreachable(&key, failure.reason);
            }
        }

        StepOutcome::Fetched
    }

    /// Runs until nothing is pending or a stop is requested
    ///
    /// Returns the number of pages fetched during this call.
    pub async fn run(&mut self) -> usize {
        let start_time = std::time::Instant::now();
        let mut fetched = 0;

        while !self.stop.is_stopped() {
            match self.step().await {
                StepOutcome::Done => break,
                StepOutcome::Skipped => continue,
                StepOutcome::Fetched => fetched += 1,
            }

            if fetched % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages fetched, {} pending, {} URLs catalogued, {:.2} pages/sec",
                    fetched,
                    self.pending.len(),
                    self.catalogue.len(),
                    fetched as f64 / start_time.elapsed().as_secs_f64()
                );
            }
        }

        if self.stop.is_stopped() && !self.is_done() {
            tracing::info!("Crawl stopped with {} URLs still pending", self.pending.len());
        }

        fetched
    }

    /// Records the URL a page was redirected to as visited
    ///
    /// Its body was the one just fetched, so it must not be fetched again.
    fn file_redirect_target(&mut self, page_key: &str, target: &Url, status: u16) {
        let link = classify_link(target.as_str(), &self.seed, None);
        self.catalogue.add_edge(page_key, &link.key);

        if link.class != LinkClass::Local {
            tracing::warn!("{} was served from outside the seed domain ({})", page_key, link.key);
            self.catalogue
                .insert_if_absent(UrlRecord::new(&link, UrlStatus::External, Some(page_key)));
            return;
        }

        if self.visited.contains(&link.key) {
            return;
        }

        tracing::debug!("{} redirected to {}", page_key, link.key);
        self.pending.remove(&link.key);
        self.visited.insert(link.key.clone());
        self.catalogue
            .insert_if_absent(UrlRecord::new(&link, UrlStatus::Pending, Some(page_key)));
        self.catalogue.mark_visited(&link.key, status, None);
    }

    /// Classifies one raw link from `page` and files it
    fn file_link(&mut self, page_key: &str, page_url: &Url, raw: &str) {
        let link = classify_link(raw, &self.seed, Some(page_url));
        tracing::trace!("Link {:?} on {} is {}", raw, page_key, link.class);

        self.catalogue.add_edge(page_key, &link.key);
        self.emit(CrawlEvent::LinkFound {
            from: page_key.to_string(),
            to: link.key.clone(),
            class: link.class,
        });

        let status = match (&link.class, &link.url) {
            (LinkClass::Malformed, _) => UrlStatus::Malformed,
            (LinkClass::External, _) => UrlStatus::External,
            (LinkClass::Local, Some(target)) => {
                if self.visited.contains(&link.key)
                    || self.pending.contains_key(&link.key)
                    || self.catalogue.contains(&link.key)
                {
                    return;
                }

                if self.robots.is_allowed(&robots_path(target)) {
                    self.pending.insert(link.key.clone(), target.clone());
                    UrlStatus::Pending
                } else {
                    tracing::debug!("{} is excluded by robots.txt", link.key);
                    UrlStatus::ExcludedByPolicy
                }
            }
            (LinkClass::Local, None) => UrlStatus::Malformed,
        };

        self.catalogue
            .insert_if_absent(UrlRecord::new(&link, status, Some(page_key)));
    }

    fn emit(&mut self, event: CrawlEvent) {
        let closed = self
            .events
            .as_ref()
            .map(|tx| tx.send(event).is_err())
            .unwrap_or(false);

        if closed {
            self.events = None;
        }
    }
}

/// True when two URLs differ at most in their fragment
fn same_resource(a: &Url, b: &Url) -> bool {
    a[..Position::AfterQuery] == b[..Position::AfterQuery]
}
