//! Screen state and key handling for the watcher.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use pulse_service::{
    apis::api_models::response::TokensPageResponse,
    models::{
        sorts::SortColumn,
        token_query::Pagination,
        tokens::{PriceUpdate, TokenStatus},
    },
};

use crate::{live_patch::LivePatchMerger, settings::PageRequest};

/// Work the main loop has to do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The request changed; fetch the page again.
    Refetch,
    Quit,
}

/// Column shortcuts. Lowercase replaces the sort, uppercase (shift) adds to it.
pub const SORT_KEYS: [(char, SortColumn); 6] = [
    ('r', SortColumn::Rank),
    ('p', SortColumn::Price),
    ('d', SortColumn::Change24h),
    ('w', SortColumn::Change7d),
    ('v', SortColumn::Volume24h),
    ('m', SortColumn::MarketCap),
];

pub fn sort_key_for(column: SortColumn) -> char {
    SORT_KEYS
        .iter()
        .find(|(_, c)| *c == column)
        .map(|(k, _)| *k)
        .unwrap_or('?')
}

fn column_for(key: char) -> Option<SortColumn> {
    let key = key.to_ascii_lowercase();
    SORT_KEYS.iter().find(|(k, _)| *k == key).map(|(_, c)| *c)
}

fn next_tab(tab: TokenStatus) -> TokenStatus {
    match tab {
        TokenStatus::New => TokenStatus::Final,
        TokenStatus::Final => TokenStatus::Migrated,
        TokenStatus::Migrated => TokenStatus::New,
    }
}

pub struct WatchApp {
    pub request: PageRequest,
    pub total: u64,
    pub merger: LivePatchMerger,
    /// Last fetch error, shown in the footer until the next good fetch.
    pub status: Option<String>,
}

impl WatchApp {
    pub fn new(request: PageRequest, page: TokensPageResponse, flash_duration: Duration) -> Self {
        let total = page.total;
        Self {
            request,
            total,
            merger: LivePatchMerger::new(page.data, flash_duration),
            status: None,
        }
    }

    /// The tab on screen. The service lists `new` when none is asked for.
    pub fn tab(&self) -> TokenStatus {
        self.request.tab.unwrap_or_default()
    }

    pub fn total_pages(&self) -> u64 {
        self.request.pagination.total_pages(self.total).max(1)
    }

    pub fn apply_page(&mut self, page: TokensPageResponse) {
        self.total = page.total;
        self.merger.replace_page(page.data);
        self.status = None;
    }

    pub fn apply_update(&mut self, update: &PriceUpdate, now: Instant) -> bool {
        self.merger.apply(update, now).is_some()
    }

    fn go_to_page(&mut self, page: u32) -> Option<Action> {
        if page == self.request.pagination.page() {
            return None;
        }
        let pagination = Pagination::new(page, self.request.pagination.page_size()).ok()?;
        self.request.pagination = pagination;
        Some(Action::Refetch)
    }

    fn first_page(&mut self) {
        if let Ok(pagination) = Pagination::new(1, self.request.pagination.page_size()) {
            self.request.pagination = pagination;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Action::Quit),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('c') => {
                if self.request.sort.is_empty() {
                    return None;
                }
                self.request.sort.clear();
                self.first_page();
                Some(Action::Refetch)
            }
            KeyCode::Char(c) => {
                let column = column_for(c)?;
                if c.is_ascii_uppercase() || key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.request.sort.extend(column);
                } else {
                    self.request.sort.toggle(column);
                }
                self.first_page();
                Some(Action::Refetch)
            }
            KeyCode::Tab => {
                self.request.tab = Some(next_tab(self.tab()));
                self.first_page();
                Some(Action::Refetch)
            }
            KeyCode::Right | KeyCode::PageDown => {
                let page = self.request.pagination.page();
                if u64::from(page) >= self.total_pages() {
                    return None;
                }
                self.go_to_page(page + 1)
            }
            KeyCode::Left | KeyCode::PageUp => {
                let page = self.request.pagination.page();
                self.go_to_page(page.saturating_sub(1).max(1))
            }
            _ => None,
        }
    }
}
