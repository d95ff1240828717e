//! Controller driving catalog refreshes and item loads.

use crate::error::Result;
use crate::models::{Catalog, Config, Item, LayoutConfig};
use crate::services::{Aggregator, load_challenge, load_post};
use crate::source::Sources;
use crate::state::machine::{Event, ViewState};

/// A selection whose content is still to be fetched.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    pub token: u64,
    pub item: Item,
}

/// Performs item loads without touching the view state.
///
/// Cheap to clone and `'static`, so loads can run on spawned tasks.
#[derive(Clone)]
pub struct Fetcher {
    sources: Sources,
    layout: LayoutConfig,
}

impl Fetcher {
    pub fn new(sources: Sources, layout: LayoutConfig) -> Self {
        Self { sources, layout }
    }

    /// Fetch the ticket's content and turn the result into an event.
    pub async fn fetch(&self, ticket: LoadTicket) -> Event {
        let result = match &ticket.item {
            Item::Challenge(entry) => {
                load_challenge(self.sources.writeups.as_ref(), &self.layout, entry).await
            }
            Item::Post(entry) => load_post(self.sources.posts.as_ref(), entry).await,
        };

        match result {
            Ok(item) => Event::ItemLoaded {
                token: ticket.token,
                item,
            },
            Err(e) => {
                if e.is_not_found() {
                    log::info!("Content for {} not found: {}", ticket.item.name(), e);
                } else {
                    log::warn!("Failed to load {}: {}", ticket.item.name(), e);
                }
                Event::ItemFailed {
                    token: ticket.token,
                }
            }
        }
    }
}

/// Owns the sources, the aggregator and the single `ViewState`.
pub struct Browser {
    fetcher: Fetcher,
    aggregator: Aggregator,
    state: ViewState,
}

impl Browser {
    pub fn new(sources: Sources, aggregator: Aggregator) -> Self {
        let fetcher = Fetcher::new(sources, aggregator.layout().clone());
        Self {
            fetcher,
            aggregator,
            state: ViewState::new(),
        }
    }

    /// Build a browser over the backends selected by the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let sources = Sources::from_config(config)?;
        let aggregator = Aggregator::new(config.layout.clone(), config.http.max_concurrent);
        Ok(Self::new(sources, aggregator))
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn fetcher(&self) -> Fetcher {
        self.fetcher.clone()
    }

    /// Apply an event to the owned state.
    pub fn dispatch(&mut self, event: Event) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(event);
    }

    /// Rebuild both catalogs.
    ///
    /// The two builds run concurrently. A failed build leaves its list empty.
    pub async fn refresh(&mut self) {
        self.dispatch(Event::CatalogRequested);

        let sources = &self.fetcher.sources;
        let (challenges, posts) = futures::join!(
            self.aggregator
                .build_challenge_catalog(sources.writeups.as_ref()),
            self.aggregator.build_post_catalog(sources.posts.as_ref())
        );

        let challenges = challenges
            .map(|outcome| outcome.entries)
            .unwrap_or_else(|e| {
                log::error!("Error fetching challenges: {}", e);
                Vec::new()
            });
        let posts = posts.unwrap_or_else(|e| {
            log::error!("Error fetching posts: {}", e);
            Vec::new()
        });

        self.dispatch(Event::CatalogLoaded(Catalog { challenges, posts }));
    }

    /// Select an item and hand back the load to perform.
    pub fn begin(&mut self, item: Item) -> LoadTicket {
        self.dispatch(Event::Selected(item.clone()));
        LoadTicket {
            token: self.state.token(),
            item,
        }
    }

    /// Select an item and load it.
    pub async fn open(&mut self, item: Item) {
        let ticket = self.begin(item);
        let event = self.fetcher.fetch(ticket).await;
        self.dispatch(event);
    }

    pub fn toggle_solver(&mut self) {
        self.dispatch(Event::ToggleSolver);
    }

    pub fn deselect(&mut self) {
        self.dispatch(Event::Deselected);
    }
}
