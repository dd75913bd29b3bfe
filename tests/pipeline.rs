use std::time::{Duration, Instant};

use courtside::activity_log::ActivityLog;
use courtside::catalogue::query_page;
use courtside::error::CatalogueError;
use courtside::history::SearchHistoryStore;
use courtside::model::Player;
use courtside::pipeline::{
    CompareSelection, ListViewModel, LoadMode, PageRequest, PageResponse, ProximityTrigger,
    SearchDebouncer, SortDirection, SortField, SortOrder,
};
use courtside::storage::PersistentStore;

fn player(id: usize, name: &str, team: &str, position: &str, nationality: &str) -> Player {
    Player {
        id: id.to_string(),
        name: name.to_string(),
        team: team.to_string(),
        sport: "Basketball".to_string(),
        position: Some(position.to_string()),
        nationality: Some(nationality.to_string()),
        height: None,
        weight: None,
        photo_url: None,
        birth_date: None,
        jersey_number: None,
        team_id: None,
    }
}

fn roster(count: usize) -> Vec<Player> {
    (0..count)
        .map(|i| {
            player(
                i + 1,
                &format!("Player {:02}", i + 1),
                &format!("Team {}", (i % 4) + 1),
                ["Guard", "Forward", "Center"][i % 3],
                "USA",
            )
        })
        .collect()
}

fn view() -> ListViewModel {
    ListViewModel::new(12, Duration::from_millis(300), ActivityLog::new())
}

// Executes a request against an in-memory catalogue, as the worker would.
fn answer(all: &[Player], request: PageRequest) -> PageResponse {
    let data = query_page(all, request.page, request.search.as_deref(), request.per_page);
    PageResponse {
        request,
        result: Ok(data),
    }
}

fn history() -> SearchHistoryStore {
    let log = ActivityLog::new();
    SearchHistoryStore::new(PersistentStore::noop(log.clone()), log)
}

#[test]
fn debouncer_emits_after_quiet_period_only() {
    let start = Instant::now();
    let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));

    debouncer.on_input("cu", start);
    debouncer.on_input("cur", start + Duration::from_millis(100));
    assert_eq!(debouncer.poll(start + Duration::from_millis(350)), None);
    assert_eq!(
        debouncer.poll(start + Duration::from_millis(400)).as_deref(),
        Some("cur")
    );
    assert_eq!(debouncer.poll(start + Duration::from_millis(900)), None);
}

#[test]
fn debouncer_skips_repeat_of_previous_value() {
    let start = Instant::now();
    let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));
    debouncer.on_input("curry", start);
    assert!(debouncer.poll(start + Duration::from_millis(300)).is_some());

    debouncer.on_input("curr", start + Duration::from_millis(400));
    debouncer.on_input("curry", start + Duration::from_millis(450));
    assert_eq!(debouncer.poll(start + Duration::from_millis(800)), None);
    assert!(!debouncer.is_pending());
}

#[test]
fn search_resets_to_first_page() {
    let all = roster(40);
    let mut list = view();
    let first = list.initial_request();
    assert!(list.apply_response(answer(&all, first)));

    let second = list.next_page().expect("page 2 exists");
    assert!(list.apply_response(answer(&all, second)));
    assert_eq!(list.current_page(), 2);

    let start = Instant::now();
    list.on_search_input("team 1", start);
    let request = list
        .poll_search(start + Duration::from_millis(300), &[])
        .expect("search should query");
    assert_eq!(request.page, 1);
    assert_eq!(request.search.as_deref(), Some("team 1"));
    assert_eq!(request.mode, LoadMode::Replace);
    assert!(list.is_loading());
}

#[test]
fn stale_response_is_dropped() {
    let all = roster(30);
    let mut list = view();
    let start = Instant::now();

    list.on_search_input("team 2", start);
    let slow = list
        .poll_search(start + Duration::from_millis(300), &[])
        .expect("first search");
    list.on_search_input("team 3", start + Duration::from_millis(400));
    let fast = list
        .poll_search(start + Duration::from_millis(700), &[])
        .expect("second search");

    assert!(list.apply_response(answer(&all, fast)));
    assert!(!list.apply_response(answer(&all, slow)));
    assert!(list.items().iter().all(|p| p.team == "Team 3"));
}

#[test]
fn load_more_appends_until_last_page() {
    let all = roster(25);
    let mut list = view();
    let first = list.initial_request();
    list.apply_response(answer(&all, first));
    assert_eq!(list.items().len(), 12);

    let more = list.load_more().expect("page 2");
    assert_eq!(more.mode, LoadMode::Append);
    assert!(list.is_loading_more());
    assert!(!list.is_loading());
    assert!(list.load_more().is_none(), "only one append in flight");
    list.apply_response(answer(&all, more));
    assert_eq!(list.items().len(), 24);

    let last = list.load_more().expect("page 3");
    assert_eq!(last.page, 3);
    list.apply_response(answer(&all, last));
    assert_eq!(list.items().len(), 25);
    assert!(!list.has_more());
    assert!(list.load_more().is_none());
}

#[test]
fn discrete_pages_stay_in_range() {
    let all = roster(25);
    let mut list = view();
    let first = list.initial_request();
    list.apply_response(answer(&all, first));

    assert!(list.previous_page().is_none());
    assert!(list.go_to_page(1).is_none());
    assert!(list.go_to_page(4).is_none());
    let third = list.go_to_page(3).expect("page 3");
    list.apply_response(answer(&all, third));
    assert_eq!(list.items().len(), 1);
    assert!(list.next_page().is_none());
    assert_eq!(list.meta().next_page, None);
}

#[test]
fn page_number_window_holds_five() {
    let all = roster(120);
    let mut list = view();
    let first = list.initial_request();
    list.apply_response(answer(&all, first));
    assert_eq!(list.page_numbers(), vec![1, 2, 3, 4, 5]);

    let req = list.go_to_page(6).expect("page 6");
    list.apply_response(answer(&all, req));
    assert_eq!(list.page_numbers(), vec![4, 5, 6, 7, 8]);

    let req = list.go_to_page(10).expect("page 10");
    list.apply_response(answer(&all, req));
    assert_eq!(list.page_numbers(), vec![6, 7, 8, 9, 10]);
}

#[test]
fn sort_reorders_loaded_items_only() {
    let all = vec![
        player(1, "Bam Adebayo", "Miami Heat", "Center", "USA"),
        player(2, "Luka Doncic", "Dallas Mavericks", "Guard", "Slovenia"),
        player(3, "Rudy Gobert", "Minnesota Timberwolves", "Center", "France"),
    ];
    let mut list = view();
    let first = list.initial_request();
    let generation = list.generation();
    list.apply_response(answer(&all, first));

    list.set_sort(SortOrder::new(SortField::Team, SortDirection::Descending));
    let teams: Vec<&str> = list.items().iter().map(|p| p.team.as_str()).collect();
    assert_eq!(
        teams,
        vec!["Minnesota Timberwolves", "Miami Heat", "Dallas Mavericks"]
    );
    assert_eq!(list.generation(), generation, "sorting does not re-query");

    list.set_sort(SortOrder::new(SortField::Nationality, SortDirection::Ascending));
    let nations: Vec<&str> = list
        .items()
        .iter()
        .filter_map(|p| p.nationality.as_deref())
        .collect();
    assert_eq!(nations, vec!["France", "Slovenia", "USA"]);
}

#[test]
fn sort_cycle_walks_every_field_and_direction() {
    let mut order = SortOrder::new(SortField::Name, SortDirection::Ascending);
    let mut seen = vec![order];
    for _ in 0..7 {
        order = order.cycle();
        seen.push(order);
    }
    assert_eq!(seen.len(), 8);
    assert_eq!(order.cycle(), SortOrder::new(SortField::Name, SortDirection::Ascending));
    assert_eq!(seen[7], SortOrder::new(SortField::Nationality, SortDirection::Descending));
}

#[test]
fn favorites_only_filters_in_memory_set() {
    let favorites = vec![
        player(1, "Stephen Curry", "Golden State Warriors", "Guard", "USA"),
        player(2, "Nikola Jokic", "Denver Nuggets", "Center", "Serbia"),
    ];
    let mut list = view();
    let pending = list.initial_request();

    assert!(list.set_favorites_only(true, &favorites).is_none());
    assert_eq!(list.items().len(), 2);
    assert_eq!(list.total_pages(), 1);
    assert!(!list.has_more());
    assert!(list.load_more().is_none());

    // The catalogue answer that was in flight no longer applies.
    assert!(!list.apply_response(answer(&roster(5), pending)));

    let start = Instant::now();
    list.on_search_input("nugg", start);
    assert!(list.poll_search(start + Duration::from_millis(300), &favorites).is_none());
    assert_eq!(list.items().len(), 1);
    assert_eq!(list.items()[0].name, "Nikola Jokic");

    list.refresh_favorites(&favorites[..1]);
    assert!(list.items().is_empty());

    let back = list.set_favorites_only(false, &favorites).expect("catalogue query");
    assert_eq!(back.page, 1);
    assert_eq!(back.search.as_deref(), Some("nugg"));
}

#[test]
fn failed_replace_clears_items_and_sets_error() {
    let mut list = view();
    let request = list.initial_request();
    list.apply_response(PageResponse {
        request,
        result: Err(CatalogueError::Http { status: 500 }),
    });
    assert!(list.items().is_empty());
    assert_eq!(list.error(), Some("Server error. Please try again later."));
    assert!(!list.is_loading());
}

#[test]
fn submit_records_history_and_flushes_debounce() {
    let mut list = view();
    let mut history = history();
    let start = Instant::now();

    list.on_search_input("  Curry ", start);
    let request = list.submit_search(&mut history, &[]).expect("immediate query");
    assert_eq!(request.search.as_deref(), Some("Curry"));
    assert_eq!(history.history(), &["Curry".to_string()]);
    assert!(list.poll_search(start + Duration::from_secs(1), &[]).is_none());
}

#[test]
fn compare_selection_is_capped_at_three() {
    let players = roster(5);
    let mut selection = CompareSelection::default();
    assert!(!selection.can_compare());

    assert!(selection.toggle(&players[0]));
    assert!(!selection.can_compare());
    assert!(selection.toggle(&players[1]));
    assert!(selection.can_compare());
    assert!(selection.toggle(&players[2]));
    assert!(!selection.toggle(&players[3]));
    assert_eq!(selection.len(), 3);
    assert!(!selection.contains(&players[3]));

    assert!(selection.toggle(&players[0]));
    assert!(selection.toggle(&players[4]));
    assert_eq!(selection.len(), 3);
    assert!(selection.contains(5u32));
}

#[test]
fn compare_handoff_requires_two() {
    let players = roster(2);
    let mut list = view();
    list.toggle_selection(&players[0]);
    assert!(list.compare_handoff().is_none());
    list.toggle_selection(&players[1]);
    assert_eq!(list.compare_handoff().map(|p| p.len()), Some(2));
}

#[test]
fn proximity_trigger_fires_once_per_crossing() {
    let mut trigger = ProximityTrigger::new(0.5);
    let mut fired = 0;
    trigger.observe(0.2, || fired += 1);
    trigger.observe(0.6, || fired += 1);
    trigger.observe(1.0, || fired += 1);
    assert_eq!(fired, 1);
    trigger.observe(0.0, || fired += 1);
    trigger.observe(0.9, || fired += 1);
    assert_eq!(fired, 2);
}

#[test]
fn history_term_runs_search_immediately() {
    let mut list = view();
    let mut history = history();
    history.add_search("tatum");
    history.add_search("curry");

    let request = list
        .use_history_term("tatum", Instant::now(), &mut history, &[])
        .expect("query without waiting for debounce");
    assert_eq!(request.search.as_deref(), Some("tatum"));
    assert_eq!(list.search_input(), "tatum");
    assert_eq!(history.history()[0], "tatum");
}

#[test]
fn clearing_selection_blocks_handoff() {
    let players = roster(3);
    let mut list = view();
    list.toggle_selection(&players[0]);
    list.toggle_selection(&players[1]);
    assert!(list.can_compare());

    list.clear_selection();
    assert!(list.selection().is_empty());
    assert!(list.compare_handoff().is_none());
}
