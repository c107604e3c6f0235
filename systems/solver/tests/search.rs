use lockstep_core::{CellCoord, Direction, SearchOutcome, Solution};
use lockstep_system_solver::Solver;
use lockstep_world::{self as world, query, Engine};

const CORRIDOR: &str = "# # # # # # \n# S     G # \n# # # # # # ";

fn solve(board: &str, waypoints: &[CellCoord], cost_limit: u32) -> SearchOutcome {
    let mut solver = Solver::new(board, waypoints).expect("board parses");
    solver.search(cost_limit).outcome
}

fn won(outcome: SearchOutcome) -> Solution {
    match outcome {
        SearchOutcome::Won(solution) => solution,
        other => panic!("expected a win, got {other:?}"),
    }
}

/// Drives a fresh engine through a solution's steps and returns every
/// location the player occupied, starting with the start cell.
fn walk(board: &str, solution: &Solution) -> Vec<CellCoord> {
    let mut engine = Engine::new(board).expect("board parses");
    let mut events = Vec::new();
    let mut locations = vec![query::start(&engine)];

    for record in &solution.steps {
        events.clear();
        assert!(
            world::apply_move(&mut engine, record.direction, &mut events).is_some(),
            "solution step was rejected"
        );
        locations.push(query::player(&engine).location());
    }

    locations
}

#[test]
fn corridor_solves_with_cost_three() {
    let solution = won(solve(CORRIDOR, &[], 10));

    assert_eq!(solution.cost, 3);
    assert_eq!(solution.steps.len(), 3);
    assert!(solution
        .steps
        .iter()
        .all(|step| step.direction == Direction::East));
}

#[test]
fn search_reports_diagnostics() {
    let mut solver = Solver::new(CORRIDOR, &[]).expect("corridor parses");
    let report = solver.search(10);

    assert!(matches!(report.outcome, SearchOutcome::Won(_)));
    assert!(report.diagnostics.iterations > 0);
    assert!(report.diagnostics.peak_frontier >= 1);
    assert!(report.diagnostics.distinct_states >= 1);
}

#[test]
fn a_tight_bound_aborts_the_run() {
    assert_eq!(solve(CORRIDOR, &[], 1), SearchOutcome::BoundExceeded);
}

#[test]
fn a_sealed_start_exhausts_the_frontier() {
    let sealed = "# # # # # \n# S # G # \n# # # # # ";
    assert_eq!(solve(sealed, &[], 10), SearchOutcome::Exhausted);
}

#[test]
fn oscillation_without_progress_terminates() {
    // The goal is walled off and nothing on the board ever changes, so
    // every snapshot is one spike-free plateau. The stagnation guard must
    // drain the frontier instead of pacing back and forth forever.
    let pocket = "# # # # # # \n# S   # G # \n# # # # # # ";
    let mut solver = Solver::new(pocket, &[]).expect("pocket parses");
    let report = solver.search(1_000);

    assert_eq!(report.outcome, SearchOutcome::Exhausted);
    assert!(report.diagnostics.iterations < 20);
}

#[test]
fn spike_corridor_pays_for_the_rising_phase() {
    // The spike is retracted in the input, so the first step lands on it
    // just as it rises: cost 2, then two plain steps.
    let gauntlet = "# # # # # # \n# S -   G # \n# # # # # # ";
    let solution = won(solve(gauntlet, &[], 10));
    assert_eq!(solution.cost, 4);
}

#[test]
fn brick_detour_requires_two_pushes() {
    let detour = "# # # # # # \n# S #   G # \n#    B    # \n# # # # # # ";
    let solution = won(solve(detour, &[], 15));
    assert_eq!(solution.cost, 7);
}

#[test]
fn monster_gate_is_cleared_by_a_kill() {
    let gate = "# # # # # # \n# S    M# # \n# # # G # # \n# # # # # # ";
    let solution = won(solve(gate, &[], 12));
    assert_eq!(solution.cost, 4);

    // The kill step leaves the player in place, so two consecutive
    // locations in the walk coincide.
    let locations = walk(gate, &solution);
    assert!(locations.windows(2).any(|pair| pair[0] == pair[1]));
}

#[test]
fn key_must_come_before_the_lock() {
    let solvable = "# # # # # # \n# S   L G # \n# K # # # # \n# # # # # # ";
    let solution = won(solve(solvable, &[], 12));
    assert_eq!(solution.cost, 5);

    // With the key sealed behind the lock, no order works.
    let sealed = "# # # # # # # \n# S L K G # # \n# # # # # # # ";
    assert_eq!(solve(sealed, &[], 12), SearchOutcome::Exhausted);
}

#[test]
fn waypoints_divert_the_shortest_path() {
    let patrol = "# # # # # # \n# S     G # \n#         # \n# # # # # # ";
    let waypoint = CellCoord::new(4, 2);

    // Without the waypoint the corridor costs 3; the detour costs 5.
    assert_eq!(won(solve(patrol, &[], 12)).cost, 3);
    let solution = won(solve(patrol, &[waypoint], 12));
    assert_eq!(solution.cost, 5);

    let locations = walk(patrol, &solution);
    let visited = locations
        .iter()
        .position(|&location| location == waypoint)
        .expect("waypoint was visited");
    assert!(visited < locations.len() - 1);
    assert_eq!(locations.last(), Some(&CellCoord::new(4, 1)));
}

#[test]
fn waypoints_are_visited_in_the_supplied_order() {
    let patrol = "# # # # # # \n# S     G # \n#         # \n# # # # # # ";
    let first = CellCoord::new(1, 2);
    let second = CellCoord::new(4, 2);

    let solution = won(solve(patrol, &[first, second], 15));
    assert_eq!(solution.cost, 5);

    let locations = walk(patrol, &solution);
    let first_visit = locations
        .iter()
        .position(|&location| location == first)
        .expect("first waypoint was visited");
    let second_visit = locations
        .iter()
        .position(|&location| location == second)
        .expect("second waypoint was visited");
    assert!(first_visit < second_visit);
    assert!(second_visit < locations.len() - 1);
}
