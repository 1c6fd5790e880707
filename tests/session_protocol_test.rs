//! Tests for the session state machine, driven without any I/O.

use std::sync::Arc;

use tictactoe_net::{
    AbandonReason, Board, Delivery, Mark, MemoryBackend, Session, SessionOutcome, SessionState, StatsRecord,
    StatsStore,
};

fn started_session() -> (Session, MemoryBackend, Arc<StatsStore>) {
    let backend = MemoryBackend::new();
    let stats = Arc::new(StatsStore::open(backend.clone()));
    let mut session = Session::new("alice", "bob", Arc::clone(&stats));
    session.start();
    (session, backend, stats)
}

fn lines_for(deliveries: &[Delivery], mark: Mark) -> Vec<String> {
    deliveries
        .iter()
        .filter(|d| *d.to() == mark)
        .map(|d| d.message().to_string())
        .collect()
}

fn play(session: &mut Session, moves: &[(Mark, &str)]) -> Vec<Delivery> {
    let mut last = Vec::new();
    for (mark, line) in moves {
        last = session.handle_line(*mark, line);
    }
    last
}

#[test]
fn test_opening_lines() {
    let stats = Arc::new(StatsStore::open(MemoryBackend::new()));
    stats.record_result("alice", "carol", false).unwrap();
    let mut session = Session::new("alice", "bob", stats);

    let opening = session.start();

    assert_eq!(
        lines_for(&opening, Mark::X),
        vec![
            "START X bob",
            "STATS 1 0 0",
            "BOARD ---------",
            "TURN X",
            "INFO Game started! X goes first.",
            "INFO Your turn. Use: MOVE row col (0-2) or CHAT message",
        ]
    );
    assert_eq!(
        lines_for(&opening, Mark::O),
        vec![
            "START O alice",
            "STATS 0 0 0",
            "BOARD ---------",
            "TURN X",
            "INFO Game started! X goes first.",
            "INFO Waiting for opponent...",
        ]
    );
    assert_eq!(session.state(), SessionState::AwaitingMove(Mark::X));
}

#[test]
fn test_x_wins_top_row() {
    let (mut session, backend, stats) = started_session();

    let last = play(
        &mut session,
        &[
            (Mark::X, "MOVE 0 0"),
            (Mark::O, "MOVE 1 1"),
            (Mark::X, "MOVE 0 1"),
            (Mark::O, "MOVE 2 2"),
            (Mark::X, "MOVE 0 2"),
        ],
    );

    assert_eq!(session.outcome(), Some(SessionOutcome::Win(Mark::X)));
    assert_eq!(session.board().to_string(), "XXX-O---O");
    assert_eq!(
        lines_for(&last, Mark::X),
        vec![
            "BOARD XXX-O---O",
            "TURN X",
            "INFO Player alice (X) wins!",
            "RESULT WIN",
        ]
    );
    assert_eq!(
        lines_for(&last, Mark::O),
        vec![
            "BOARD XXX-O---O",
            "TURN X",
            "INFO Player alice (X) wins!",
            "RESULT LOSE",
        ]
    );
    assert_eq!(stats.get("alice"), StatsRecord::new(1, 0, 0));
    assert_eq!(stats.get("bob"), StatsRecord::new(0, 1, 0));
    assert_eq!(backend.save_count(), 1);
}

#[test]
fn test_o_wins_column() {
    let (mut session, _backend, stats) = started_session();

    let last = play(
        &mut session,
        &[
            (Mark::X, "MOVE 0 0"),
            (Mark::O, "MOVE 0 2"),
            (Mark::X, "MOVE 1 0"),
            (Mark::O, "MOVE 1 2"),
            (Mark::X, "MOVE 2 1"),
            (Mark::O, "MOVE 2 2"),
        ],
    );

    assert_eq!(session.outcome(), Some(SessionOutcome::Win(Mark::O)));
    assert_eq!(lines_for(&last, Mark::O).last().map(String::as_str), Some("RESULT WIN"));
    assert_eq!(lines_for(&last, Mark::X).last().map(String::as_str), Some("RESULT LOSE"));
    assert_eq!(stats.get("bob"), StatsRecord::new(1, 0, 0));
    assert_eq!(stats.get("alice"), StatsRecord::new(0, 1, 0));
}

#[test]
fn test_full_board_draw() {
    let (mut session, backend, stats) = started_session();

    let last = play(
        &mut session,
        &[
            (Mark::X, "MOVE 0 0"),
            (Mark::O, "MOVE 0 1"),
            (Mark::X, "MOVE 0 2"),
            (Mark::O, "MOVE 1 1"),
            (Mark::X, "MOVE 1 0"),
            (Mark::O, "MOVE 1 2"),
            (Mark::X, "MOVE 2 1"),
            (Mark::O, "MOVE 2 0"),
            (Mark::X, "MOVE 2 2"),
        ],
    );

    assert_eq!(session.outcome(), Some(SessionOutcome::Draw));
    for mark in [Mark::X, Mark::O] {
        assert_eq!(
            lines_for(&last, mark),
            vec!["BOARD XOXXOOOXX", "TURN O", "INFO Game is a draw.", "RESULT DRAW"]
        );
    }
    assert_eq!(stats.get("alice"), StatsRecord::new(0, 0, 1));
    assert_eq!(stats.get("bob"), StatsRecord::new(0, 0, 1));
    assert_eq!(backend.save_count(), 1);
}

#[test]
fn test_turn_alternates_after_each_move() {
    let (mut session, _backend, _stats) = started_session();

    let moves = [(Mark::X, "MOVE 1 1"), (Mark::O, "MOVE 0 0"), (Mark::X, "MOVE 2 2")];
    for (mark, line) in moves {
        let out = session.handle_line(mark, line);
        assert_eq!(session.current_mark(), Some(mark.opponent()));
        assert_eq!(
            lines_for(&out, mark.opponent()),
            vec![
                format!("BOARD {}", session.board()),
                format!("TURN {}", mark.opponent()),
                "INFO Your turn. Use: MOVE row col (0-2) or CHAT message".to_string(),
            ]
        );
    }
}

#[test]
fn test_move_out_of_turn_is_rejected() {
    let (mut session, backend, _stats) = started_session();

    let out = session.handle_line(Mark::O, "MOVE 0 0");

    assert_eq!(lines_for(&out, Mark::O), vec!["INFO It's not your turn."]);
    assert!(lines_for(&out, Mark::X).is_empty());
    assert_eq!(session.board(), &Board::new());
    assert_eq!(session.current_mark(), Some(Mark::X));
    assert_eq!(backend.save_count(), 0);
}

#[test]
fn test_turn_checked_before_arguments() {
    let (mut session, _backend, _stats) = started_session();

    let out = session.handle_line(Mark::O, "MOVE banana");

    assert_eq!(lines_for(&out, Mark::O), vec!["INFO It's not your turn."]);
}

#[test]
fn test_row_out_of_range_is_rejected() {
    let (mut session, _backend, _stats) = started_session();

    let out = session.handle_line(Mark::X, "MOVE 3 0");

    assert_eq!(lines_for(&out, Mark::X), vec!["INFO Row and col must be between 0 and 2"]);
    assert_eq!(session.board(), &Board::new());
    assert_eq!(session.current_mark(), Some(Mark::X));
}

#[test]
fn test_malformed_moves_are_rejected() {
    let (mut session, _backend, _stats) = started_session();

    let cases = [
        ("MOVE", "INFO Usage: MOVE row col"),
        ("MOVE 1", "INFO Usage: MOVE row col"),
        ("MOVE 1 x", "INFO Row and col must be integers 0-2"),
        ("MOVE -1 0", "INFO Row and col must be between 0 and 2"),
    ];
    for (line, expected) in cases {
        let out = session.handle_line(Mark::X, line);
        assert_eq!(lines_for(&out, Mark::X), vec![expected], "{line}");
    }
    assert_eq!(session.board(), &Board::new());
    assert_eq!(session.current_mark(), Some(Mark::X));
}

#[test]
fn test_occupied_cell_is_rejected() {
    let (mut session, _backend, _stats) = started_session();
    session.handle_line(Mark::X, "MOVE 1 1");
    let before = session.board().clone();

    let out = session.handle_line(Mark::O, "move 1 1");

    assert_eq!(lines_for(&out, Mark::O), vec!["INFO That cell is already taken."]);
    assert_eq!(session.board(), &before);
    assert_eq!(session.current_mark(), Some(Mark::O));
}

#[test]
fn test_chat_from_either_peer() {
    let (mut session, _backend, _stats) = started_session();

    let out = session.handle_line(Mark::O, "CHAT good luck!");

    for mark in [Mark::X, Mark::O] {
        assert_eq!(lines_for(&out, mark), vec!["MSG bob: good luck!"]);
    }
    assert_eq!(session.current_mark(), Some(Mark::X));
}

#[test]
fn test_empty_chat_is_rejected() {
    let (mut session, _backend, _stats) = started_session();

    let out = session.handle_line(Mark::X, "CHAT   ");

    assert_eq!(lines_for(&out, Mark::X), vec!["INFO Usage: CHAT your message"]);
    assert!(lines_for(&out, Mark::O).is_empty());
}

#[test]
fn test_unknown_and_user_commands() {
    let (mut session, _backend, _stats) = started_session();

    for line in ["DANCE", "USER mallory"] {
        let out = session.handle_line(Mark::O, line);
        assert_eq!(
            lines_for(&out, Mark::O),
            vec!["INFO Unknown command. Use MOVE or CHAT or QUIT."]
        );
        assert!(lines_for(&out, Mark::X).is_empty());
    }
}

#[test]
fn test_blank_lines_are_ignored() {
    let (mut session, _backend, _stats) = started_session();
    assert!(session.handle_line(Mark::X, "   ").is_empty());
}

#[test]
fn test_quit_hands_opponent_the_win() {
    let (mut session, backend, stats) = started_session();

    let out = session.handle_line(Mark::O, "QUIT");

    assert_eq!(
        session.outcome(),
        Some(SessionOutcome::Abandoned { by: Mark::O, reason: AbandonReason::Quit })
    );
    assert_eq!(
        lines_for(&out, Mark::X),
        vec!["INFO Opponent quit. You win by default.", "RESULT WIN"]
    );
    assert_eq!(
        lines_for(&out, Mark::O),
        vec!["INFO You quit. Opponent wins by default.", "RESULT LOSE"]
    );
    assert_eq!(stats.get("alice"), StatsRecord::new(1, 0, 0));
    assert_eq!(stats.get("bob"), StatsRecord::new(0, 1, 0));
    assert_eq!(backend.save_count(), 1);
}

#[test]
fn test_disconnect_while_awaiting_opponent_move() {
    let (mut session, _backend, stats) = started_session();
    session.handle_line(Mark::X, "MOVE 0 0");
    assert_eq!(session.state(), SessionState::AwaitingMove(Mark::O));

    let out = session.peer_lost(Mark::O);

    assert_eq!(
        session.outcome(),
        Some(SessionOutcome::Abandoned { by: Mark::O, reason: AbandonReason::Disconnect })
    );
    assert_eq!(
        lines_for(&out, Mark::X),
        vec!["INFO Opponent disconnected. You win by default.", "RESULT WIN"]
    );
    assert!(lines_for(&out, Mark::O).is_empty());
    assert_eq!(stats.get("alice"), StatsRecord::new(1, 0, 0));
    assert_eq!(stats.get("bob"), StatsRecord::new(0, 1, 0));
}

#[test]
fn test_terminal_state_is_absorbing() {
    let (mut session, backend, stats) = started_session();
    session.handle_line(Mark::X, "QUIT");
    let outcome = session.outcome();

    assert!(session.handle_line(Mark::O, "MOVE 0 0").is_empty());
    assert!(session.handle_line(Mark::O, "QUIT").is_empty());
    assert!(session.handle_line(Mark::X, "CHAT hello?").is_empty());
    assert!(session.peer_lost(Mark::X).is_empty());
    assert!(session.peer_lost(Mark::O).is_empty());

    assert_eq!(session.outcome(), outcome);
    assert_eq!(backend.save_count(), 1);
    assert_eq!(stats.get("bob"), StatsRecord::new(1, 0, 0));
    assert_eq!(stats.get("alice"), StatsRecord::new(0, 1, 0));
}

#[test]
fn test_exactly_one_result_per_peer() {
    let (mut session, _backend, _stats) = started_session();
    let mut all = Vec::new();
    for (mark, line) in [
        (Mark::X, "MOVE 0 0"),
        (Mark::O, "MOVE 1 0"),
        (Mark::X, "MOVE 1 1"),
        (Mark::O, "MOVE 2 0"),
        (Mark::X, "MOVE 2 2"),
        (Mark::O, "MOVE 0 1"),
    ] {
        all.extend(session.handle_line(mark, line));
    }
    all.extend(session.peer_lost(Mark::O));

    for mark in [Mark::X, Mark::O] {
        let results = lines_for(&all, mark)
            .into_iter()
            .filter(|l| l.starts_with("RESULT "))
            .count();
        assert_eq!(results, 1, "{mark}");
    }
    assert_eq!(session.outcome(), Some(SessionOutcome::Win(Mark::X)));
}
