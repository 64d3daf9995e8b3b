use std::fmt;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use anyhow::Context;
use crossterm::style::{self, Stylize};
use crossterm::{cursor, execute, terminal};
use itertools::Itertools;
use latrones_client::client::{GameController, NotableEvent};
use latrones_client::coord::Square;
use latrones_client::display::GameView;
use latrones_client::timer::TimerCommand;
use log::{info, warn};

use crate::config::ConsoleConfig;
use crate::network::{self, HttpTransport, ServerResponse};
use crate::terminal_view::{TerminalView, square_offset};
use crate::timer_queue::TimerQueue;


pub struct ClientConfig {
    pub server_address: String,
    pub console: ConsoleConfig,
}

enum IncomingEvent {
    Server(ServerResponse),
    Input(String),
    InputClosed,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Command {
    Click(Square),
    Hover(Square),
    Start,
    Restart { confirmed: bool },
    Retry,
    Time(String),
    BoardSize(String),
    Color(String),
    Bot(String),
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  X Y | click X Y    click a square
  hover X Y          hover over a square
  start              start the clock
  restart[!]         new game with the settings below; \"!\" skips confirmation
  retry              repeat the request that failed
  time SECONDS       game time for the next game
  size N             board size for the next game
  color light|dark   your color in the next game
  bot true|false     whether to play against the bot
  quit";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let square = |x: &str, y: &str| -> Result<Square, String> {
        let parse = |v: &str| v.parse::<u32>().map_err(|_| format!("Not a coordinate: '{v}'"));
        Ok(Square::new(parse(x)?, parse(y)?))
    };
    match words.as_slice() {
        [x, y] if x.parse::<u32>().is_ok() => Ok(Command::Click(square(x, y)?)),
        ["click", x, y] => Ok(Command::Click(square(x, y)?)),
        ["hover", x, y] => Ok(Command::Hover(square(x, y)?)),
        ["start"] => Ok(Command::Start),
        ["restart"] => Ok(Command::Restart { confirmed: false }),
        ["restart!"] => Ok(Command::Restart { confirmed: true }),
        ["retry"] => Ok(Command::Retry),
        ["time", value] => Ok(Command::Time(value.to_string())),
        ["size", value] => Ok(Command::BoardSize(value.to_string())),
        ["color", value] => Ok(Command::Color(value.to_string())),
        ["bot", value] => Ok(Command::Bot(value.to_string())),
        ["help"] | ["?"] => Ok(Command::Help),
        ["quit"] | ["exit"] => Ok(Command::Quit),
        [] => Err("Empty command".to_owned()),
        _ => Err(format!("Unknown command: '{}'", line.trim())),
    }
}

fn writeln_raw(stdout: &mut io::Stdout, v: impl fmt::Display) -> io::Result<()> {
    let s = v.to_string();
    // Note. Not using `lines()` because it removes trailing new line.
    for line in s.split('\n') {
        execute!(stdout, style::Print(line), cursor::MoveToNextLine(1))?;
    }
    Ok(())
}

fn render(
    stdout: &mut io::Stdout, view: &TerminalView, last_event: &Option<String>,
    command_error: &Option<String>,
) -> io::Result<()> {
    execute!(stdout, cursor::MoveTo(0, 0), terminal::Clear(terminal::ClearType::All))?;
    writeln_raw(stdout, view.render())?;
    if let Some(event) = last_event {
        writeln_raw(stdout, event.clone().with(style::Color::DarkGrey))?;
    }
    if let Some(err) = command_error {
        writeln_raw(stdout, err.clone().with(style::Color::Red))?;
    }
    execute!(stdout, style::Print("> "))?;
    Ok(())
}

fn describe_event(event: &NotableEvent) -> String {
    match event {
        NotableEvent::PieceSelected(square) => format!("Selected {square}"),
        NotableEvent::MoveSubmitted { from, to } => format!("Moving {from} -> {to}"),
        NotableEvent::BotMoveRequested => "Bot is thinking...".to_owned(),
        NotableEvent::BoardUpdated(state) => format!("{} to move", state.current_turn),
        NotableEvent::GameOver { winner } => format!("Game over: {winner} won"),
        NotableEvent::GameRestarted => "New game".to_owned(),
        NotableEvent::RequestFailed(message) => format!("Request failed: {message}"),
    }
}

// Returns false when the user wants to leave.
fn execute_command(
    controller: &mut GameController<TerminalView>, command: Command,
) -> anyhow::Result<bool> {
    controller.view_mut().restart_refused = false;
    controller.view_mut().restart_confirmed = false;
    match command {
        Command::Click(square) => controller.on_square_click(square, square_offset(square))?,
        Command::Hover(square) => {
            // Rendered board, which may be taller than `board_size`.
            let board = controller.view().board()?;
            for (x, y) in (0..board.size_x).cartesian_product(0..board.size_y) {
                controller.on_square_leave(Square::new(x, y))?;
            }
            controller.on_square_enter(square)?;
        }
        Command::Start => controller.start()?,
        Command::Restart { confirmed } => {
            controller.view_mut().restart_confirmed = confirmed;
            controller.restart()?;
        }
        Command::Retry => controller.retry()?,
        Command::Time(value) => {
            controller.view_mut().form.game_time_seconds = value.clone();
            controller.on_time_input(&value)?;
        }
        Command::BoardSize(value) => {
            controller.view_mut().form.board_size = value.clone();
            controller.on_board_size_input(&value)?;
        }
        Command::Color(value) => controller.view_mut().form.user_color = value,
        Command::Bot(value) => controller.view_mut().form.play_against_bot = value,
        Command::Help => {}
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

pub fn run(config: ClientConfig) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&config.server_address, config.console.request_timeout)?;
    info!("Loading game from {}...", config.server_address);
    let page = async_std::task::block_on(transport.fetch_page())
        .with_context(|| format!("Cannot load the game from {}", config.server_address))?;

    let (events_tx, events_rx) = mpsc::channel();
    let (requests_tx, requests_rx) = mpsc::channel();
    let (timer_commands_tx, timer_commands_rx) = mpsc::channel::<TimerCommand>();
    let view = TerminalView::new(&page)?;
    let mut controller = GameController::new(view, requests_tx, timer_commands_tx)?;
    if let Some(ref settings) = config.console.settings {
        controller.view_mut().form = settings.to_form();
    }
    network::spawn_transport(transport, requests_rx, events_tx.clone(), IncomingEvent::Server);
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if events_tx.send(IncomingEvent::Input(line)).is_err() {
                return;
            }
        }
        let _ = events_tx.send(IncomingEvent::InputClosed);
    });

    let mut timers = TimerQueue::new(config.console.swap_delay);
    let mut stdout = io::stdout();
    let mut last_event = None;
    let mut command_error = Some(HELP.to_owned());
    loop {
        for command in timer_commands_rx.try_iter() {
            timers.apply(command, Instant::now());
        }
        while let Some(event) = controller.next_notable_event() {
            last_event = Some(describe_event(&event));
        }
        render(&mut stdout, controller.view(), &last_event, &command_error)?;

        let event = match timers.next_deadline() {
            Some(deadline) => {
                match events_rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(event) => Some(event),
                    Err(mpsc::RecvTimeoutError::Timeout) => None,
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match events_rx.recv() {
                Ok(event) => Some(event),
                Err(_) => break,
            },
        };
        match event {
            Some(IncomingEvent::Server(ServerResponse { id, body })) => {
                let result = match body {
                    Ok(body) => controller.process_response(id, &body),
                    Err(message) => controller.request_failed(id, &message),
                };
                if let Err(err) = result {
                    warn!("Cannot process server response: {err}");
                }
            }
            Some(IncomingEvent::Input(line)) => {
                command_error = None;
                match parse_command(&line) {
                    Ok(Command::Help) => command_error = Some(HELP.to_owned()),
                    Ok(command) => match execute_command(&mut controller, command) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(err) => command_error = Some(err.to_string()),
                    },
                    Err(err) => command_error = Some(err),
                }
            }
            Some(IncomingEvent::InputClosed) => break,
            None => {}
        }
        for handle in timers.pop_due(Instant::now()) {
            if let Err(err) = controller.on_timer(handle) {
                warn!("Timer callback failed: {err}");
            }
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_commands() {
        assert_eq!(parse_command("3 4"), Ok(Command::Click(Square::new(3, 4))));
        assert_eq!(parse_command("  click 0 7 "), Ok(Command::Click(Square::new(0, 7))));
        assert_eq!(parse_command("hover 1 2"), Ok(Command::Hover(Square::new(1, 2))));
        assert_eq!(parse_command("restart"), Ok(Command::Restart { confirmed: false }));
        assert_eq!(parse_command("restart!"), Ok(Command::Restart { confirmed: true }));
        assert_eq!(parse_command("time 90"), Ok(Command::Time("90".to_owned())));
        assert_eq!(parse_command("bot false"), Ok(Command::Bot("false".to_owned())));
    }

    #[test]
    fn hover_moves_across_non_square_board() {
        use latrones_client::display::Highlight;
        use latrones_client::force::Force;
        use latrones_client::game::GameState;
        use latrones_client::piece::BoardSnapshot;
        use latrones_client::settings::GameSettings;
        use latrones_client::test_util::{piece, render_page};

        let settings = GameSettings { play_against_bot: false, ..GameSettings::default() };
        let board = BoardSnapshot {
            size_x: 8,
            size_y: 10,
            pieces: vec![
                piece(1, 9, Force::Light),
                piece(0, 8, Force::Light),
                piece(1, 0, Force::Dark),
            ],
        };
        let page = render_page(&settings, &board, &GameState::new_game());
        let (requests_tx, _requests_rx) = mpsc::channel();
        let (timer_commands_tx, _timer_commands_rx) = mpsc::channel();
        let view = TerminalView::new(&page).unwrap();
        let mut controller = GameController::new(view, requests_tx, timer_commands_tx).unwrap();

        execute_command(&mut controller, Command::Hover(Square::new(1, 9))).unwrap();
        assert!(controller.view().has_highlight(Square::new(1, 9), Highlight::Hovered));
        execute_command(&mut controller, Command::Hover(Square::new(0, 8))).unwrap();
        assert!(!controller.view().has_highlight(Square::new(1, 9), Highlight::Hovered));
        assert!(controller.view().has_highlight(Square::new(0, 8), Highlight::Hovered));
    }

    #[test]
    fn reject_bad_commands() {
        assert!(parse_command("").is_err());
        assert!(parse_command("click 1").is_err());
        assert!(parse_command("click a b").is_err());
        assert!(parse_command("3 -1").is_err());
        assert!(parse_command("resign").is_err());
    }
}
