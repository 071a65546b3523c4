use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::action::Action;
use crate::cache::{self, TicketCache};
use crate::catalog::QueryCatalog;
use crate::cursor;
use crate::event::Event;
use crate::source::TicketSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    QueryList,    // Saved searches
    TicketList,   // Results of the selected search
    #[allow(dead_code)]
    TicketDetail, // Single issue view, not wired up yet
}

/// Which page and query are active, and which were active before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    pub current_page: Page,
    pub previous_page: Page,
    pub current_query: Option<usize>,
    pub previous_query: Option<usize>,
}

impl Default for NavigationContext {
    fn default() -> Self {
        Self {
            current_page: Page::QueryList,
            previous_page: Page::QueryList,
            current_query: None,
            previous_query: None,
        }
    }
}

impl NavigationContext {
    fn go_to(&mut self, page: Page) {
        self.previous_page = self.current_page;
        self.current_page = page;
        debug!(from = ?self.previous_page, to = ?self.current_page, "page change");
    }

    fn open_query(&mut self, index: usize) {
        self.previous_query = self.current_query;
        self.current_query = Some(index);
        debug!(previous = ?self.previous_query, current = index, "query change");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub query_selected: usize,
    pub ticket_selected: usize,
}

pub struct App {
    pub nav: NavigationContext,
    pub selection: SelectionState,
    pub catalog: QueryCatalog,
    pub tickets: TicketCache,
    pub should_quit: bool,
    source: Arc<dyn TicketSource>,
    action_tx: mpsc::UnboundedSender<Action>,
    fetch_task: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(
        catalog: QueryCatalog,
        source: Arc<dyn TicketSource>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            nav: NavigationContext::default(),
            selection: SelectionState::default(),
            catalog,
            tickets: TicketCache::default(),
            should_quit: false,
            source,
            action_tx,
            fetch_task: None,
        }
    }

    pub fn page(&self) -> Page {
        self.nav.current_page
    }

    /// The saved query whose results the ticket page shows.
    pub fn current_query_name(&self) -> Option<&str> {
        self.nav
            .current_query
            .and_then(|i| self.catalog.at(i))
            .map(|q| q.name.as_str())
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        let chorded = KeyModifiers::CONTROL
            | KeyModifiers::ALT
            | KeyModifiers::SUPER
            | KeyModifiers::HYPER
            | KeyModifiers::META;
        if key.modifiers.intersects(chorded) {
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('j') => Action::Down,
            KeyCode::Char('k') => Action::Up,
            KeyCode::Char('l') => Action::Select,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.abort_fetch();
                self.should_quit = true;
            }
            Action::Up => match self.nav.current_page {
                Page::QueryList => {
                    self.selection.query_selected =
                        cursor::retreat(self.selection.query_selected, 1, self.catalog.count());
                }
                Page::TicketList => {
                    self.selection.ticket_selected =
                        cursor::retreat(self.selection.ticket_selected, 1, self.tickets.len());
                }
                Page::TicketDetail => {}
            },
            Action::Down => match self.nav.current_page {
                Page::QueryList => {
                    self.selection.query_selected =
                        cursor::advance(self.selection.query_selected, 1, self.catalog.count());
                }
                Page::TicketList => {
                    self.selection.ticket_selected =
                        cursor::advance(self.selection.ticket_selected, 1, self.tickets.len());
                }
                Page::TicketDetail => {}
            },
            Action::Select => match self.nav.current_page {
                Page::QueryList => self.open_selected_query(),
                Page::TicketList => {
                    // Back to the static query list; loaded rows stay as they are
                    if self.tickets.is_loading() {
                        self.tickets.cancel();
                    }
                    self.abort_fetch();
                    self.nav.go_to(Page::QueryList);
                }
                Page::TicketDetail => {}
            },

            Action::TicketsLoaded { rows, load_id } => {
                if self.tickets.complete(load_id, Ok(rows)) {
                    debug!(
                        load_id = self.tickets.load_id(),
                        rows = self.tickets.len(),
                        "tickets loaded"
                    );
                    self.fetch_task = None;
                    self.selection.ticket_selected =
                        cursor::clamp(self.selection.ticket_selected, self.tickets.len());
                }
            }
            Action::TicketsFailed { message, load_id } => {
                if self.tickets.complete(load_id, Err(message)) {
                    self.fetch_task = None;
                    self.selection.ticket_selected = 0;
                }
            }
            Action::None => {}
        }
    }

    fn open_selected_query(&mut self) {
        let index = self.selection.query_selected;
        let Some(query) = self.catalog.at(index) else {
            return;
        };
        let expression = query.expression.clone();
        debug!(index, name = %query.name, "opening saved query");

        self.nav.go_to(Page::TicketList);
        self.nav.open_query(index);
        self.selection.ticket_selected = 0;

        let load_id = self.tickets.begin();
        self.spawn_fetch(expression, load_id);
    }

    fn spawn_fetch(&mut self, expression: String, load_id: u64) {
        self.abort_fetch();

        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        self.fetch_task = Some(tokio::spawn(async move {
            let result = cache::refresh(source.as_ref(), &expression).await;
            tx.send(Action::from_fetch(result, load_id)).ok();
        }));
    }

    fn abort_fetch(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::cache::TicketRows;
    use crate::catalog::SavedQuery;
    use crate::error::{Result, TixError};

    #[derive(Debug, Default)]
    struct FakeSource {
        results: HashMap<String, std::result::Result<Vec<String>, String>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with_rows(mut self, query: &str, rows: &[&str]) -> Self {
            let rows = rows.iter().map(|r| r.to_string()).collect();
            self.results.insert(query.to_string(), Ok(rows));
            self
        }

        fn with_error(mut self, query: &str, message: &str) -> Self {
            self.results.insert(query.to_string(), Err(message.to_string()));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TicketSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn search(&self, query: &str) -> Result<Vec<String>> {
            self.calls.lock().unwrap().push(query.to_string());
            match self.results.get(query) {
                Some(Ok(rows)) => Ok(rows.clone()),
                Some(Err(e)) => Err(TixError::Api(e.clone())),
                None => Ok(Vec::new()),
            }
        }
    }

    fn two_query_catalog() -> QueryCatalog {
        QueryCatalog::new(vec![
            SavedQuery::new("My Tickets", "Q1"),
            SavedQuery::new("Unlabelled", "Q2"),
        ])
    }

    fn setup(source: FakeSource) -> (App, Arc<FakeSource>, mpsc::UnboundedReceiver<Action>) {
        let source = Arc::new(source);
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(two_query_catalog(), source.clone(), tx);
        (app, source, rx)
    }

    /// Apply the next action the fetch task sends back.
    async fn settle(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Action>) {
        let action = rx.recv().await.expect("fetch result");
        app.update(action);
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    /// A source whose searches never finish.
    #[derive(Debug)]
    struct StalledSource;

    #[async_trait]
    impl TicketSource for StalledSource {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn search(&self, _query: &str) -> Result<Vec<String>> {
            futures::future::pending().await
        }
    }

    #[tokio::test]
    async fn initial_state() {
        let (app, source, _rx) = setup(FakeSource::default());
        assert_eq!(app.page(), Page::QueryList);
        assert_eq!(app.nav, NavigationContext::default());
        assert_eq!(app.selection, SelectionState::default());
        assert!(!app.should_quit);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn key_bindings() {
        let (app, _source, _rx) = setup(FakeSource::default());
        assert_eq!(app.handle_event(key('q')), Action::Quit);
        assert_eq!(app.handle_event(key('j')), Action::Down);
        assert_eq!(app.handle_event(key('k')), Action::Up);
        assert_eq!(app.handle_event(key('l')), Action::Select);
        assert_eq!(app.handle_event(key('x')), Action::None);
        assert_eq!(app.handle_event(Event::Render), Action::None);
    }

    #[tokio::test]
    async fn modified_keys_are_not_bound() {
        let (app, _source, _rx) = setup(FakeSource::default());
        let chord = |c, modifiers| Event::Key(KeyEvent::new(KeyCode::Char(c), modifiers));

        assert_eq!(app.handle_event(chord('q', KeyModifiers::CONTROL)), Action::None);
        assert_eq!(app.handle_event(chord('q', KeyModifiers::ALT)), Action::None);
        assert_eq!(app.handle_event(chord('j', KeyModifiers::SUPER)), Action::None);
        assert_eq!(app.handle_event(chord('l', KeyModifiers::SHIFT)), Action::Select);
    }

    #[tokio::test]
    async fn quit_aborts_in_flight_fetch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(two_query_catalog(), Arc::new(StalledSource), tx);

        app.update(Action::Select);
        let handle = app.fetch_task.as_ref().expect("fetch started").abort_handle();
        tokio::task::yield_now().await;
        assert!(!handle.is_finished());

        app.update(Action::Quit);
        assert!(app.should_quit);
        assert!(app.fetch_task.is_none());

        for _ in 0..10 {
            if handle.is_finished() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(handle.is_finished());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn query_cursor_is_clamped() {
        let (mut app, _source, _rx) = setup(FakeSource::default());
        for _ in 0..5 {
            app.update(Action::Down);
            assert!(app.selection.query_selected < app.catalog.count());
        }
        assert_eq!(app.selection.query_selected, 1);

        for _ in 0..5 {
            app.update(Action::Up);
        }
        assert_eq!(app.selection.query_selected, 0);
    }

    #[tokio::test]
    async fn browse_scenario() {
        let source = FakeSource::default().with_rows("Q2", &["OPS-1: a", "OPS-2: b"]);
        let (mut app, source, mut rx) = setup(source);

        app.update(Action::Down);
        assert_eq!(app.selection.query_selected, 1);

        app.update(Action::Select);
        assert_eq!(app.page(), Page::TicketList);
        assert_eq!(app.nav.previous_page, Page::QueryList);
        assert_eq!(app.nav.current_query, Some(1));
        assert_eq!(app.selection.ticket_selected, 0);
        assert!(app.tickets.is_loading());

        settle(&mut app, &mut rx).await;
        assert_eq!(source.calls(), vec!["Q2".to_string()]);
        assert_eq!(app.tickets.len(), 2);

        for _ in 0..3 {
            app.update(Action::Down);
        }
        assert_eq!(app.selection.ticket_selected, 1);

        app.update(Action::Select);
        assert_eq!(app.page(), Page::QueryList);
        assert_eq!(app.nav.previous_page, Page::TicketList);
        assert_eq!(app.selection.query_selected, 1);
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn returning_to_queries_keeps_cache_and_does_not_fetch() {
        let source = FakeSource::default().with_rows("Q1", &["OPS-1: a"]);
        let (mut app, source, mut rx) = setup(source);

        app.update(Action::Select);
        settle(&mut app, &mut rx).await;
        let before = app.tickets.state().clone();

        app.update(Action::Select);
        assert_eq!(app.page(), Page::QueryList);
        assert_eq!(app.tickets.state(), &before);
        assert_eq!(source.calls().len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn selecting_resets_ticket_cursor() {
        let source = FakeSource::default().with_rows("Q1", &["A-1", "A-2", "A-3"]);
        let (mut app, _source, mut rx) = setup(source);

        app.update(Action::Select);
        settle(&mut app, &mut rx).await;
        app.update(Action::Down);
        app.update(Action::Down);
        assert_eq!(app.selection.ticket_selected, 2);

        app.update(Action::Select);
        app.update(Action::Select);
        assert_eq!(app.selection.ticket_selected, 0);
    }

    #[tokio::test]
    async fn reselecting_same_query_fetches_again() {
        let source = FakeSource::default().with_rows("Q1", &["A-1"]);
        let (mut app, source, mut rx) = setup(source);

        app.update(Action::Select);
        settle(&mut app, &mut rx).await;
        let first_load = app.tickets.load_id();

        app.update(Action::Select);
        app.update(Action::Select);
        settle(&mut app, &mut rx).await;

        assert_eq!(source.calls(), vec!["Q1".to_string(), "Q1".to_string()]);
        assert!(app.tickets.load_id() > first_load);
        assert_eq!(app.tickets.rows(), ["A-1".to_string()].as_slice());
        assert_eq!(app.nav.previous_query, Some(0));
        assert_eq!(app.nav.current_query, Some(0));
    }

    #[tokio::test]
    async fn fetch_failure_is_shown_and_loop_stays_usable() {
        let source = FakeSource::default().with_error("Q1", "JQL syntax error");
        let (mut app, _source, mut rx) = setup(source);

        app.update(Action::Select);
        settle(&mut app, &mut rx).await;
        match app.tickets.state() {
            TicketRows::Failed(message) => assert!(message.contains("JQL syntax error")),
            other => panic!("expected failure, got {:?}", other),
        }

        app.update(Action::Down);
        assert_eq!(app.selection.ticket_selected, 0);

        app.update(Action::Select);
        assert_eq!(app.page(), Page::QueryList);

        app.update(Action::Quit);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn stale_result_is_discarded() {
        let (mut app, _source, _rx) = setup(FakeSource::default());

        app.update(Action::Select);
        let stale = app.tickets.load_id();
        app.update(Action::Select);
        app.update(Action::Select);

        app.update(Action::TicketsLoaded {
            rows: vec!["OLD-1".to_string()],
            load_id: stale,
        });
        assert!(app.tickets.is_loading());
    }

    #[tokio::test]
    async fn leaving_during_load_drops_the_result() {
        let (mut app, _source, _rx) = setup(FakeSource::default());

        app.update(Action::Select);
        let load_id = app.tickets.load_id();
        app.update(Action::Select);
        assert_eq!(app.page(), Page::QueryList);

        app.update(Action::TicketsLoaded {
            rows: vec!["LATE-1".to_string()],
            load_id,
        });
        assert!(app.tickets.rows().is_empty());
    }

    #[tokio::test]
    async fn select_on_empty_catalog_is_noop() {
        let source: Arc<FakeSource> = Arc::new(FakeSource::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(QueryCatalog::new(Vec::new()), source.clone(), tx);

        app.update(Action::Down);
        app.update(Action::Select);
        assert_eq!(app.page(), Page::QueryList);
        assert_eq!(app.selection.query_selected, 0);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn detail_page_ignores_navigation() {
        let (mut app, source, _rx) = setup(FakeSource::default());
        app.nav.current_page = Page::TicketDetail;

        app.update(Action::Down);
        app.update(Action::Select);
        assert_eq!(app.page(), Page::TicketDetail);
        assert!(source.calls().is_empty());

        app.update(Action::Quit);
        assert!(app.should_quit);
    }
}
