use banqi_core::{Referee, Response};

fn lines(response: &Response) -> Vec<&str> {
    response.lines.iter().map(String::as_str).collect()
}

#[test]
fn commands_before_start_are_refused() {
    let mut referee = Referee::with_seed(1);
    assert_eq!(lines(&referee.handle("STATE")), ["ERR Run START first"]);
    assert_eq!(lines(&referee.handle("FLIP D2")), ["ERR Run START first"]);
    assert_eq!(lines(&referee.handle("MOVE A1")), ["ERR Run START first"]);
    assert_eq!(lines(&referee.handle("HELLO")), ["ERR Unknown command"]);
    assert_eq!(lines(&referee.handle("START")), ["ERR Bad Command"]);
}

#[test]
fn hidden_game_session() {
    let mut referee = Referee::with_seed(17);
    assert_eq!(lines(&referee.handle("START 1")), ["OK"]);

    let state = referee.handle("STATE");
    assert_eq!(
        lines(&state),
        ["IN-PLAY", "????????/????????/????????/???????? r", "OK"]
    );

    assert_eq!(lines(&referee.handle("FLIP D2")), ["OK"]);
    let state = referee.handle("STATE");
    assert_eq!(state.lines[0], "IN-PLAY");
    assert!(!state.lines[1].starts_with("????????/????????"));
    assert_eq!(lines(&referee.handle("MOVE D2")), ["ERR Invalid Move Format"]);

    let bye = referee.handle("QUIT");
    assert_eq!(lines(&bye), ["BYE"]);
    assert!(bye.quit);
}

#[test]
fn illegal_move_loses_on_next_state() {
    let mut referee = Referee::with_seed(3);
    referee.handle("START 1");
    // Moving a face-down piece is illegal but still acknowledged.
    assert_eq!(lines(&referee.handle("MOVE A1 A2")), ["OK"]);
    let state = referee.handle("STATE");
    assert_eq!(state.lines[0], "BLACK WINS");
    assert_eq!(state.lines[2], "Illegal move.");
    assert_eq!(state.lines[3], "OK");
}

#[test]
fn restart_replaces_game() {
    let mut referee = Referee::with_seed(4);
    referee.handle("START 1");
    referee.handle("FLIP A1");
    referee.handle("START 1");
    let state = referee.handle("STATE");
    assert_eq!(state.lines[1], "????????/????????/????????/???????? r");
}
