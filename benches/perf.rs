use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use courtside::catalogue::query_page;
use courtside::model::Player;
use courtside::pipeline::{SortDirection, SortField, SortOrder};
use courtside::sources::parse_players_json;

const NAMES: [&str; 6] = [
    "Luka Dončić",
    "Nikola Jokić",
    "Ángel Delgado",
    "Stephen Curry",
    "Jayson Tatum",
    "Zion Williamson",
];
const TEAMS: [&str; 4] = [
    "Boston Celtics",
    "Denver Nuggets",
    "Dallas Mavericks",
    "Golden State Warriors",
];
const POSITIONS: [&str; 3] = ["Guard", "Forward", "Center"];

fn synthetic_roster(count: usize) -> Vec<Player> {
    (0..count)
        .map(|i| Player {
            id: (100_000 + i).to_string(),
            name: format!("{} {i}", NAMES[i % NAMES.len()]),
            team: TEAMS[i % TEAMS.len()].to_string(),
            sport: "Basketball".to_string(),
            position: Some(POSITIONS[i % POSITIONS.len()].to_string()),
            nationality: Some(if i % 5 == 0 { "Serbia" } else { "USA" }.to_string()),
            height: None,
            weight: None,
            photo_url: None,
            birth_date: None,
            jersey_number: None,
            team_id: None,
        })
        .collect()
}

fn bench_query_page_unfiltered(c: &mut Criterion) {
    let roster = synthetic_roster(5_000);
    c.bench_function("query_page_unfiltered", |b| {
        b.iter(|| {
            let page = query_page(black_box(&roster), 7, None, 12);
            black_box(page.meta.total_pages);
        })
    });
}

fn bench_query_page_search(c: &mut Criterion) {
    let roster = synthetic_roster(5_000);
    c.bench_function("query_page_search_folded", |b| {
        b.iter(|| {
            let page = query_page(black_box(&roster), 1, Some("jokic"), 12);
            black_box(page.data.len());
        })
    });
}

fn bench_sort_loaded_items(c: &mut Criterion) {
    let roster = synthetic_roster(600);
    let order = SortOrder::new(SortField::Team, SortDirection::Descending);
    c.bench_function("sort_loaded_items", |b| {
        b.iter(|| {
            let mut items = roster.clone();
            order.apply(&mut items);
            black_box(items.len());
        })
    });
}

fn bench_players_parse(c: &mut Criterion) {
    c.bench_function("sportsdb_players_parse", |b| {
        b.iter(|| {
            let rows = parse_players_json(black_box(PLAYERS_JSON)).unwrap();
            black_box(rows.len());
        })
    });
}

criterion_group!(
    perf,
    bench_query_page_unfiltered,
    bench_query_page_search,
    bench_sort_loaded_items,
    bench_players_parse
);
criterion_main!(perf);

static PLAYERS_JSON: &str = include_str!("../data/players.json");
