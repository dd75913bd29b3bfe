use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState, Wrap};

use courtside::activity_log::ActivityLog;
use courtside::compare::{CompareField, CompareView};
use courtside::config::Config;
use courtside::detail::{DetailView, Route};
use courtside::favorites::FavoritesStore;
use courtside::history::SearchHistoryStore;
use courtside::model::{Player, PlayerKey};
use courtside::pipeline::{ListViewModel, LoadMode, PageRequest, ProximityTrigger};
use courtside::worker::{QueryCommand, QueryEvent, spawn_query_worker};

// Rows from the end of the list at which the next page is requested.
const SCROLL_SENTINEL_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    List,
    Detail,
    Compare,
    NotFound,
}

struct App {
    screen: Screen,
    searching: bool,
    history_cursor: Option<usize>,
    selected: usize,
    list: ListViewModel,
    favorites: FavoritesStore,
    favorites_dirty: Arc<AtomicBool>,
    history: SearchHistoryStore,
    detail: Option<DetailView>,
    roster: Vec<Player>,
    compare: CompareView,
    team_count: Option<usize>,
    scroll_trigger: ProximityTrigger,
    log: ActivityLog,
    cmd_tx: mpsc::Sender<QueryCommand>,
    should_quit: bool,
}

impl App {
    fn new(config: &Config, log: ActivityLog, cmd_tx: mpsc::Sender<QueryCommand>) -> Self {
        let storage = config.storage(&log);
        let mut favorites = FavoritesStore::new(storage.clone(), log.clone());
        let favorites_dirty = Arc::new(AtomicBool::new(false));
        let dirty = Arc::clone(&favorites_dirty);
        favorites.subscribe(move |_| dirty.store(true, Ordering::Relaxed));

        Self {
            screen: Screen::List,
            searching: false,
            history_cursor: None,
            selected: 0,
            list: ListViewModel::new(config.per_page, config.debounce, log.clone()),
            favorites,
            favorites_dirty,
            history: SearchHistoryStore::new(storage, log.clone()),
            detail: None,
            roster: Vec::new(),
            compare: CompareView::default(),
            team_count: None,
            scroll_trigger: ProximityTrigger::new(1.0),
            log,
            cmd_tx,
            should_quit: false,
        }
    }

    fn send(&self, cmd: QueryCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            self.log.warn("Query worker unavailable");
        }
    }

    fn request_page(&self, request: Option<PageRequest>) {
        if let Some(request) = request {
            self.send(QueryCommand::Page(request));
        }
    }

    fn navigate(&mut self, route: Route) {
        match route {
            Route::Home | Route::Players => self.screen = Screen::List,
            Route::PlayerDetail(key) => self.open_detail(key),
            Route::Compare => self.open_compare(),
            Route::NotFound => self.screen = Screen::NotFound,
        }
    }

    fn open_detail(&mut self, key: PlayerKey) {
        self.roster.clear();
        self.send(QueryCommand::Player {
            id: key.to_string(),
        });
        self.detail = Some(DetailView::begin(key));
        self.screen = Screen::Detail;
    }

    fn open_compare(&mut self) {
        let Some(players) = self.list.compare_handoff() else {
            self.log.info("Select at least two players to compare");
            return;
        };
        self.compare = CompareView::from_handoff(players);
        self.screen = Screen::Compare;
    }

    fn selected_player(&self) -> Option<&Player> {
        self.list.items().get(self.selected)
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) {
        if self.searching {
            self.on_search_key(key, now);
            return;
        }
        match self.screen {
            Screen::List => self.on_list_key(key, now),
            Screen::Detail => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('f') => {
                    if let Some(player) = self.detail.as_ref().and_then(|d| d.player()).cloned() {
                        self.favorites.toggle(&player);
                    }
                }
                KeyCode::Esc | KeyCode::Char('b') => self.screen = Screen::List,
                _ => {}
            },
            Screen::Compare => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char(c @ '1'..='3') => {
                    let index = c as usize - '1' as usize;
                    self.compare.remove(index);
                }
                KeyCode::Esc | KeyCode::Char('b') => self.screen = Screen::List,
                _ => {}
            },
            Screen::NotFound => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                _ => self.screen = Screen::List,
            },
        }
    }

    fn on_search_key(&mut self, key: KeyEvent, now: Instant) {
        let mut input = self.list.search_input().to_string();
        match key.code {
            KeyCode::Esc => {
                self.searching = false;
                self.history_cursor = None;
                return;
            }
            KeyCode::Enter => {
                self.searching = false;
                let picked = self
                    .history_cursor
                    .take()
                    .and_then(|i| self.history.history().get(i).cloned())
                    .filter(|term| *term == input);
                let request = match picked {
                    Some(term) => self.list.use_history_term(
                        &term,
                        now,
                        &mut self.history,
                        self.favorites.favorites(),
                    ),
                    None => self
                        .list
                        .submit_search(&mut self.history, self.favorites.favorites()),
                };
                self.selected = 0;
                self.request_page(request);
                return;
            }
            KeyCode::Tab => {
                let history = self.history.history();
                if history.is_empty() {
                    return;
                }
                let next = self.history_cursor.map(|i| (i + 1) % history.len()).unwrap_or(0);
                self.history_cursor = Some(next);
                input = history[next].clone();
            }
            KeyCode::Delete => {
                let term = self
                    .history_cursor
                    .and_then(|i| self.history.history().get(i))
                    .cloned();
                if let Some(term) = term {
                    self.history.remove_item(&term);
                    self.history_cursor = None;
                }
                return;
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            _ => return,
        }
        self.list.on_search_input(&input, now);
    }

    fn on_list_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('x') => self.list.clear_search(now),
            KeyCode::Char('H') => self.history.clear_history(),
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('n') | KeyCode::Right => {
                let request = self.list.next_page();
                if request.is_some() {
                    self.selected = 0;
                }
                self.request_page(request);
            }
            KeyCode::Char('p') | KeyCode::Left => {
                let request = self.list.previous_page();
                if request.is_some() {
                    self.selected = 0;
                }
                self.request_page(request);
            }
            KeyCode::Char('m') => {
                let request = self.list.load_more();
                self.request_page(request);
            }
            KeyCode::Char('s') => {
                let order = self.list.cycle_sort();
                self.log.info(format!("Sort: {}", order.label()));
            }
            KeyCode::Char('f') => {
                if let Some(player) = self.selected_player().cloned() {
                    self.favorites.toggle(&player);
                }
            }
            KeyCode::Char('F') => {
                let enabled = !self.list.is_favorites_only();
                let request = self
                    .list
                    .set_favorites_only(enabled, self.favorites.favorites());
                self.selected = 0;
                self.request_page(request);
            }
            KeyCode::Char('C') => self.favorites.clear_all(),
            KeyCode::Char(' ') => {
                if let Some(player) = self.selected_player().cloned() {
                    if !self.list.toggle_selection(&player) {
                        self.log.info("Compare selection is full (3 players)");
                    }
                }
            }
            KeyCode::Char('c') => self.navigate(Route::Compare),
            KeyCode::Char('X') => {
                self.list.clear_selection();
                self.log.info("Compare selection cleared");
            }
            KeyCode::Enter | KeyCode::Char('d') => {
                if let Some(player) = self.selected_player() {
                    let key = player.key();
                    self.navigate(Route::PlayerDetail(key));
                }
            }
            _ => {}
        }
    }

    fn select_next(&mut self) {
        let total = self.list.items().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(total - 1);

        let remaining = total - 1 - self.selected;
        let visible = if remaining < SCROLL_SENTINEL_ROWS { 1.0 } else { 0.0 };
        let mut wants_more = false;
        self.scroll_trigger.observe(visible, || wants_more = true);
        if wants_more {
            let request = self.list.load_more();
            self.request_page(request);
        }
    }

    fn on_event(&mut self, event: QueryEvent, now: Instant) {
        match event {
            QueryEvent::Page(response) => {
                let mode = response.request.mode;
                if self.list.apply_response(response) {
                    self.scroll_trigger.rearm();
                    if mode == LoadMode::Replace {
                        self.selected = 0;
                    }
                }
            }
            QueryEvent::Player { id, result } => {
                let Some(detail) = self.detail.as_mut() else {
                    return;
                };
                if detail.id().as_str() != id {
                    return;
                }
                detail.apply(result, now);
                if let Some(team_id) = detail.player().and_then(|p| p.team_id.clone()) {
                    self.send(QueryCommand::Roster { team_id });
                }
            }
            QueryEvent::Teams(result) => match result {
                Ok(teams) => self.team_count = Some(teams.len()),
                Err(err) => self.log.warn(format!("Teams unavailable: {err}")),
            },
            QueryEvent::Roster { team_id, result } => {
                let current = self
                    .detail
                    .as_ref()
                    .and_then(|d| d.player())
                    .and_then(|p| p.team_id.as_deref());
                if current != Some(team_id.as_str()) {
                    return;
                }
                match result {
                    Ok(players) => self.roster = players.as_ref().clone(),
                    Err(err) => self.log.warn(format!("Roster unavailable: {err}")),
                }
            }
        }
    }

    fn tick(&mut self, now: Instant) {
        let request = self.list.poll_search(now, self.favorites.favorites());
        if request.is_some() {
            self.selected = 0;
        }
        self.request_page(request);

        if self.favorites_dirty.swap(false, Ordering::Relaxed) {
            self.list.refresh_favorites(self.favorites.favorites());
            let total = self.list.items().len();
            if self.selected >= total {
                self.selected = total.saturating_sub(1);
            }
        }

        if self.screen == Screen::Detail
            && self.detail.as_ref().is_some_and(|d| d.should_redirect(now))
        {
            self.detail = None;
            self.screen = Screen::NotFound;
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();
    let log = config.activity_log();
    let catalogue = Arc::new(config.catalogue(&log));

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (tx, rx) = mpsc::channel();
    spawn_query_worker(catalogue, config.fetch_parallelism, cmd_rx, tx);

    let mut app = App::new(&config, log, cmd_tx);
    let initial = app.list.initial_request();
    app.send(QueryCommand::Page(initial));
    app.send(QueryCommand::Teams);
    if let Some(path) = std::env::args().nth(1) {
        app.navigate(Route::parse(&path));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<QueryEvent>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(50);

    loop {
        let now = Instant::now();
        while let Ok(event) = rx.try_recv() {
            app.on_event(event, now);
        }
        app.tick(now);

        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key, Instant::now());
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.screen {
        Screen::List => render_list(frame, chunks[1], app),
        Screen::Detail => render_detail(frame, chunks[1], app),
        Screen::Compare => render_compare(frame, chunks[1], app),
        Screen::NotFound => {
            let body = Paragraph::new("Player not found. Press any key to return to the list.")
                .block(Block::default().borders(Borders::ALL).title("404"));
            frame.render_widget(body, chunks[1]);
        }
    }

    let console: Vec<Line> = app.log.tail(4).into_iter().map(Line::from).collect();
    let footer = Paragraph::new(console).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);
}

fn header_text(app: &App) -> Vec<Line<'static>> {
    let mode = if app.list.is_favorites_only() {
        "favorites"
    } else {
        "catalogue"
    };
    let sort = app
        .list
        .sort()
        .map(|s| s.label())
        .unwrap_or_else(|| "name asc".to_string());
    let teams = app
        .team_count
        .map(|n| format!(" | {n} teams"))
        .unwrap_or_default();
    let cursor = if app.searching { "_" } else { "" };
    vec![
        Line::from(vec![
            Span::styled("COURTSIDE", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                "  {mode} | sort {sort} | favorites {} | compare {}/3{teams}",
                app.favorites.count(),
                app.list.selection().len()
            )),
        ]),
        Line::from(format!(
            "search: {}{cursor}   history: {}",
            app.list.search_input(),
            app.history.history().join(", ")
        )),
    ]
}

fn render_list(frame: &mut Frame, area: Rect, app: &App) {
    let rows: Vec<Row> = app
        .list
        .items()
        .iter()
        .map(|p| {
            let fav = if app.favorites.is_favorite(p) { "*" } else { " " };
            let pick = if app.list.selection().contains(p) { "+" } else { " " };
            Row::new(vec![
                format!("{fav}{pick}"),
                p.name.clone(),
                p.team.clone(),
                p.position.clone().unwrap_or_default(),
                p.nationality.clone().unwrap_or_default(),
            ])
        })
        .collect();

    let meta = app.list.meta();
    let status = if app.list.is_loading() {
        " loading...".to_string()
    } else if app.list.is_loading_more() {
        " loading more...".to_string()
    } else if let Some(err) = app.list.error() {
        format!(" {err}")
    } else if app.list.is_favorites_only() {
        format!(" {} favorites", meta.total_count)
    } else {
        let pages: Vec<String> = app
            .list
            .page_numbers()
            .into_iter()
            .map(|n| {
                if n == meta.current_page {
                    format!("[{n}]")
                } else {
                    n.to_string()
                }
            })
            .collect();
        format!(" {} players | page {} ", meta.total_count, pages.join(" "))
    };

    let widths = [
        Constraint::Length(3),
        Constraint::Percentage(30),
        Constraint::Percentage(30),
        Constraint::Percentage(15),
        Constraint::Percentage(20),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["", "Name", "Team", "Position", "Nationality"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(status))
        .highlight_style(Style::default().bg(Color::DarkGray));
    let mut state = TableState::default();
    if !app.list.items().is_empty() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("Player");
    let Some(detail) = app.detail.as_ref() else {
        frame.render_widget(block, area);
        return;
    };
    let mut lines: Vec<Line> = Vec::new();
    if detail.is_loading() {
        lines.push(Line::from("Loading..."));
    } else if let Some(err) = detail.error() {
        lines.push(Line::styled(err.to_string(), Style::default().fg(Color::Red)));
        lines.push(Line::from("Redirecting..."));
    } else if let Some(p) = detail.player() {
        let fav = if app.favorites.is_favorite(p) { " *" } else { "" };
        lines.push(Line::styled(
            format!("{}{fav}", p.name),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        let field = |label: &str, value: Option<&str>| {
            Line::from(format!("{label:<12} {}", value.unwrap_or("N/A")))
        };
        lines.push(field("Team", Some(p.team.as_str())));
        lines.push(field("Position", p.position.as_deref()));
        lines.push(field("Number", p.jersey_number.as_deref()));
        lines.push(field("Nationality", p.nationality.as_deref()));
        lines.push(field("Height", p.height.as_deref()));
        lines.push(field("Weight", p.weight.as_deref()));
        lines.push(field("Born", p.birth_date.as_deref()));
        if !app.roster.is_empty() {
            lines.push(Line::from(""));
            let mates: Vec<&str> = app
                .roster
                .iter()
                .filter(|m| m.id != p.id)
                .map(|m| m.name.as_str())
                .collect();
            lines.push(Line::from(format!("Teammates: {}", mates.join(", "))));
        }
    }
    let body = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(body, area);
}

fn render_compare(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Compare (1-3 remove, b back)");
    if !app.compare.can_compare() {
        let body = Paragraph::new("Select at least two players to compare.").block(block);
        frame.render_widget(body, area);
        return;
    }
    let today = chrono::Local::now().date_naive();
    let mut header = vec![String::new()];
    header.extend(app.compare.players().iter().map(|p| p.name.clone()));
    let rows: Vec<Row> = CompareField::ALL
        .iter()
        .map(|field| {
            let mut cells = vec![field.label().to_string()];
            cells.extend(
                app.compare
                    .comparison(*field, today)
                    .into_iter()
                    .map(|c| c.value),
            );
            Row::new(cells)
        })
        .collect();
    let mut widths = vec![Constraint::Length(12)];
    widths.extend(app.compare.players().iter().map(|_| Constraint::Percentage(28)));
    let table = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(block);
    frame.render_widget(table, area);
}
