//! Selection and loading state.
//!
//! `ViewState::reduce` is a pure function from (state, event) to state.
//! Every selection takes a fresh request token; load results carrying an
//! older token are dropped, so the latest selection always wins.

use serde::{Deserialize, Serialize};

use crate::models::{Catalog, Item};
use crate::services::LoadedItem;

/// Shown in place of a writeup that could not be fetched.
pub const WRITEUP_ERROR: &str = "# Error loading writeup";

/// Shown in place of a post that could not be fetched.
pub const POST_ERROR: &str = "# Error loading post";

/// Shown in the solver panel when a challenge has no solver script.
pub const SOLVER_MISSING: &str = "Solver not found, you should probably check the github repo";

/// Lifecycle of the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    CatalogLoading,
    CatalogReady,
    ItemLoading,
    ItemReady,
    ItemLoadError,
}

/// Top-level sections of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Page {
    #[default]
    Home,
    Ctf,
    Malware,
    Posts,
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum Event {
    CatalogRequested,
    CatalogLoaded(Catalog),
    Selected(Item),
    ItemLoaded { token: u64, item: LoadedItem },
    ItemFailed { token: u64 },
    Deselected,
    ToggleSolver,
    Navigated(Page),
}

/// Application state owned by a single controller.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub phase: Phase,
    pub page: Page,
    pub catalog: Catalog,
    pub selected: Option<Item>,
    pub content: String,
    pub solver: Option<String>,
    pub solver_visible: bool,
    request: u64,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token of the most recent selection.
    pub fn token(&self) -> u64 {
        self.request
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::CatalogLoading | Phase::ItemLoading)
    }

    /// Text of the solver panel, or `None` while the panel is hidden.
    pub fn solver_panel(&self) -> Option<&str> {
        if !self.solver_visible {
            return None;
        }
        Some(self.solver.as_deref().unwrap_or(SOLVER_MISSING))
    }

    /// Apply one event.
    pub fn reduce(mut self, event: Event) -> Self {
        match event {
            Event::CatalogRequested => {
                self.phase = Phase::CatalogLoading;
            }
            Event::CatalogLoaded(catalog) => {
                self.catalog = catalog;
                if self.selected.is_none() {
                    self.phase = Phase::CatalogReady;
                }
            }
            Event::Selected(item) => {
                self.request += 1;
                self.selected = Some(item);
                self.clear_item();
                self.phase = Phase::ItemLoading;
            }
            Event::ItemLoaded { token, item } => {
                if self.is_current(token) {
                    self.content = item.content;
                    self.solver = item.solver;
                    self.phase = Phase::ItemReady;
                }
            }
            Event::ItemFailed { token } => {
                if self.is_current(token) {
                    let placeholder = match self.selected {
                        Some(Item::Post(_)) => POST_ERROR,
                        _ => WRITEUP_ERROR,
                    };
                    self.content = placeholder.to_string();
                    self.solver = None;
                    self.phase = Phase::ItemLoadError;
                }
            }
            Event::Deselected => {
                self.deselect();
            }
            Event::ToggleSolver => {
                if matches!(self.selected, Some(Item::Challenge(_))) {
                    self.solver_visible = !self.solver_visible;
                }
            }
            Event::Navigated(page) => {
                self.page = page;
                self.deselect();
            }
        }
        self
    }

    fn is_current(&self, token: u64) -> bool {
        let current = token == self.request && self.selected.is_some();
        if !current {
            log::debug!(
                "Dropping stale load result (token {}, current {})",
                token,
                self.request
            );
        }
        current
    }

    fn clear_item(&mut self) {
        self.content.clear();
        self.solver = None;
        self.solver_visible = false;
    }

    fn deselect(&mut self) {
        if self.selected.take().is_some() {
            // In-flight loads for the old selection become stale
            self.request += 1;
        }
        self.clear_item();
        if matches!(
            self.phase,
            Phase::ItemLoading | Phase::ItemReady | Phase::ItemLoadError
        ) {
            self.phase = Phase::CatalogReady;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChallengeEntry, Locator, PostEntry};

    fn challenge(name: &str) -> Item {
        Item::Challenge(ChallengeEntry {
            name: name.to_string(),
            ctf: "ctfA".to_string(),
            writeup: Locator::new(format!("ctfA/{name}/WRITEUP.md")),
            solution: None,
        })
    }

    fn post(name: &str) -> Item {
        Item::Post(PostEntry {
            name: name.to_string(),
            url: Locator::new(format!("{name}.md")),
        })
    }

    fn loaded(content: &str, solver: Option<&str>) -> LoadedItem {
        LoadedItem {
            content: content.to_string(),
            solver: solver.map(str::to_string),
        }
    }

    fn ready() -> ViewState {
        ViewState::new()
            .reduce(Event::CatalogRequested)
            .reduce(Event::CatalogLoaded(Catalog::default()))
    }

    #[test]
    fn test_startup_phases() {
        let state = ViewState::new();
        assert_eq!(state.phase, Phase::Idle);

        let state = state.reduce(Event::CatalogRequested);
        assert_eq!(state.phase, Phase::CatalogLoading);
        assert!(state.is_loading());

        let state = state.reduce(Event::CatalogLoaded(Catalog::default()));
        assert_eq!(state.phase, Phase::CatalogReady);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_select_and_load() {
        let state = ready().reduce(Event::Selected(challenge("chal1")));
        assert_eq!(state.phase, Phase::ItemLoading);
        let token = state.token();

        let state = state.reduce(Event::ItemLoaded {
            token,
            item: loaded("# chal1", Some("print(1)")),
        });
        assert_eq!(state.phase, Phase::ItemReady);
        assert_eq!(state.content, "# chal1");
        assert_eq!(state.solver.as_deref(), Some("print(1)"));
    }

    #[test]
    fn test_failed_load_shows_placeholder() {
        let state = ready().reduce(Event::Selected(challenge("chal1")));
        let token = state.token();
        let state = state.reduce(Event::ItemFailed { token });
        assert_eq!(state.phase, Phase::ItemLoadError);
        assert_eq!(state.content, WRITEUP_ERROR);

        let state = state.reduce(Event::Selected(post("hello")));
        let token = state.token();
        let state = state.reduce(Event::ItemFailed { token });
        assert_eq!(state.content, POST_ERROR);
    }

    #[test]
    fn test_latest_selection_wins_in_any_order() {
        let state = ready().reduce(Event::Selected(post("x")));
        let token_x = state.token();
        let state = state.reduce(Event::Selected(post("y")));
        let token_y = state.token();

        // Y resolves first, then the slower X
        let state = state
            .reduce(Event::ItemLoaded {
                token: token_y,
                item: loaded("Y", None),
            })
            .reduce(Event::ItemLoaded {
                token: token_x,
                item: loaded("X", None),
            });
        assert_eq!(state.content, "Y");
        assert_eq!(state.selected, Some(post("y")));

        // X resolves first, then Y
        let state = ready().reduce(Event::Selected(post("x")));
        let token_x = state.token();
        let state = state.reduce(Event::Selected(post("y")));
        let token_y = state.token();
        let state = state
            .reduce(Event::ItemLoaded {
                token: token_x,
                item: loaded("X", None),
            })
            .reduce(Event::ItemLoaded {
                token: token_y,
                item: loaded("Y", None),
            });
        assert_eq!(state.content, "Y");
        assert_eq!(state.phase, Phase::ItemReady);
    }

    #[test]
    fn test_stale_failure_ignored() {
        let state = ready().reduce(Event::Selected(post("x")));
        let token_x = state.token();
        let state = state.reduce(Event::Selected(post("y")));
        let state = state.reduce(Event::ItemFailed { token: token_x });
        assert_eq!(state.phase, Phase::ItemLoading);
        assert!(state.content.is_empty());
    }

    #[test]
    fn test_new_selection_resets_item_fields() {
        let state = ready().reduce(Event::Selected(challenge("chal1")));
        let token = state.token();
        let state = state
            .reduce(Event::ItemLoaded {
                token,
                item: loaded("# chal1", Some("print(1)")),
            })
            .reduce(Event::ToggleSolver);
        assert!(state.solver_visible);

        let state = state.reduce(Event::Selected(challenge("chal2")));
        assert!(state.content.is_empty());
        assert!(state.solver.is_none());
        assert!(!state.solver_visible);
    }

    #[test]
    fn test_solver_panel_messages() {
        let state = ready().reduce(Event::Selected(challenge("chal1")));
        let token = state.token();
        let state = state.reduce(Event::ItemLoaded {
            token,
            item: loaded("# chal1", None),
        });
        assert_eq!(state.solver_panel(), None);

        let state = state.reduce(Event::ToggleSolver);
        assert_eq!(state.solver_panel(), Some(SOLVER_MISSING));

        let state = state.reduce(Event::ToggleSolver);
        assert_eq!(state.solver_panel(), None);
    }

    #[test]
    fn test_toggle_ignored_for_posts() {
        let state = ready()
            .reduce(Event::Selected(post("hello")))
            .reduce(Event::ToggleSolver);
        assert!(!state.solver_visible);
    }

    #[test]
    fn test_deselect_returns_to_catalog_and_drops_inflight() {
        let state = ready().reduce(Event::Selected(post("x")));
        let token = state.token();
        let state = state.reduce(Event::Deselected);
        assert_eq!(state.phase, Phase::CatalogReady);
        assert!(state.selected.is_none());

        let state = state.reduce(Event::ItemLoaded {
            token,
            item: loaded("X", None),
        });
        assert_eq!(state.phase, Phase::CatalogReady);
        assert!(state.content.is_empty());
    }

    #[test]
    fn test_navigation_clears_selection() {
        let state = ready()
            .reduce(Event::Navigated(Page::Posts))
            .reduce(Event::Selected(post("hello")))
            .reduce(Event::Navigated(Page::Home));
        assert_eq!(state.page, Page::Home);
        assert!(state.selected.is_none());
        assert_eq!(state.phase, Phase::CatalogReady);
    }

    #[test]
    fn test_catalog_reload_keeps_open_item() {
        let state = ready().reduce(Event::Selected(post("x")));
        let state = state.reduce(Event::CatalogLoaded(Catalog::default()));
        assert_eq!(state.phase, Phase::ItemLoading);
    }
}
