use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::catalogue::PlayerCatalogue;
use crate::error::CatalogueError;
use crate::model::{Player, Team};
use crate::pipeline::{PageRequest, PageResponse};

#[derive(Debug, Clone)]
pub enum QueryCommand {
    Page(PageRequest),
    Player { id: String },
    Teams,
    Roster { team_id: String },
}

#[derive(Debug, Clone)]
pub enum QueryEvent {
    Page(PageResponse),
    Player {
        id: String,
        result: Result<Player, CatalogueError>,
    },
    Teams(Result<Arc<Vec<Team>>, CatalogueError>),
    Roster {
        team_id: String,
        result: Result<Arc<Vec<Player>>, CatalogueError>,
    },
}

/// Runs catalogue queries off the UI thread.
///
/// Commands are dispatched onto a small rayon pool so a slow request does
/// not hold up later ones; results arrive on `tx` in completion order. The
/// thread exits once every command sender is dropped.
pub fn spawn_query_worker(
    catalogue: Arc<PlayerCatalogue>,
    parallelism: usize,
    cmd_rx: Receiver<QueryCommand>,
    tx: Sender<QueryEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let pool = build_query_pool(parallelism);
        while let Ok(cmd) = cmd_rx.recv() {
            let catalogue = Arc::clone(&catalogue);
            let tx = tx.clone();
            let job = move || {
                let _ = tx.send(run_command(&catalogue, cmd));
            };
            match pool.as_ref() {
                Some(pool) => pool.spawn(job),
                None => job(),
            }
        }
    })
}

pub fn run_command(catalogue: &PlayerCatalogue, cmd: QueryCommand) -> QueryEvent {
    match cmd {
        QueryCommand::Page(request) => {
            let result =
                catalogue.get_players(request.page, request.search.as_deref(), request.per_page);
            QueryEvent::Page(PageResponse { request, result })
        }
        QueryCommand::Player { id } => {
            let result = catalogue.get_player_by_id(id.as_str());
            QueryEvent::Player { id, result }
        }
        QueryCommand::Teams => QueryEvent::Teams(catalogue.get_teams()),
        QueryCommand::Roster { team_id } => {
            let result = catalogue.get_players_by_team(&team_id);
            QueryEvent::Roster { team_id, result }
        }
    }
}

fn build_query_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.clamp(1, 16))
        .thread_name(|idx| format!("courtside-query-{idx}"))
        .build()
        .ok()
}
