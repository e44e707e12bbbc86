//! A line-oriented terminal client for two-player blackjack over a direct
//! peer link.
//!
//! One side hosts, the other joins. The client turns typed commands into
//! the four replicated actions and re-renders a read-only snapshot after
//! every change, local or remote. The main loop is the only thread touching
//! the session: remote actions and stdin lines both arrive through queues
//! it drains on its own schedule.

use anyhow::{Context, Result};
use log::info;
use pico_args::Arguments;
use std::{
    io::{self, BufRead, Write},
    net::SocketAddr,
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

use blackjack_duel::{
    Action, DEFAULT_PORT, Listener, PeerChannel, RoundState, Seat, Session, Table, TableView,
    utils,
};

mod commands;

use commands::{Command, parse_command};

const HELP: &str = "\
Play two-player blackjack over a direct peer link

USAGE:
  bd_client [OPTIONS]

OPTIONS:
  --host               Host a table and wait for the opponent
  --join IP[:PORT]     Join a table at the given address
  --port PORT          Port to listen on or connect to  [default: 55555]

FLAGS:
  -h, --help           Print help information

Run without options for the interactive menu.
";

/// How often the main loop drains remote actions while waiting for input.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

struct Args {
    host: bool,
    join: Option<String>,
    port: u16,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        host: pargs.contains("--host"),
        join: pargs.opt_value_from_str("--join")?,
        port: pargs.value_from_str("--port").unwrap_or(DEFAULT_PORT),
    };

    let table = if args.host {
        host(args.port)?
    } else if let Some(addr) = &args.join {
        join(addr, args.port)?
    } else {
        menu(args.port)?
    };
    play(table)
}

/// The entry menu. Setup failures are recoverable: they print and drop the
/// player back here to try again with new input.
fn menu(port: u16) -> Result<Table> {
    println!("♠ Blackjack Duel ♥");
    println!("Your address: {}:{port}", utils::local_ip());
    loop {
        println!();
        println!("  h            Host a table");
        println!("  j ADDRESS    Join a table");
        println!("  q            Quit");
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            std::process::exit(0);
        }
        let parts: Vec<&str> = line.split_ascii_whitespace().collect();
        match parts.as_slice() {
            ["h"] => match host(port) {
                Ok(table) => return Ok(table),
                Err(error) => println!("✗ {error}"),
            },
            ["j", addr] => match join(addr, port) {
                Ok(table) => return Ok(table),
                Err(error) => println!("✗ {error}"),
            },
            ["q"] => std::process::exit(0),
            _ => println!("Unrecognized choice"),
        }
    }
}

/// Host role: bind, wait for the one opponent, open the table. The host's
/// opening action replicates the betting state to the joiner.
fn host(port: u16) -> Result<Table> {
    let listener = Listener::bind(port)?;
    println!("Waiting for an opponent on port {port}...");
    let channel = listener.accept()?;
    let peer = channel.peer_addr()?;
    info!("hosting as player 1, peer {peer}");
    println!("Opponent connected from {peer}");
    let mut table = Table::new(Session::new(Seat::One), channel)?;
    table.act(Action::NewRound)?;
    Ok(table)
}

/// Connector role: dial the host.
fn join(addr: &str, default_port: u16) -> Result<Table> {
    let addr: SocketAddr = if addr.contains(':') {
        addr.parse()
    } else {
        format!("{addr}:{default_port}").parse()
    }
    .with_context(|| format!("invalid address '{addr}'"))?;

    println!("Connecting to {addr}...");
    let channel = PeerChannel::connect(addr)?;
    info!("joined {addr} as player 2");
    let table = Table::new(Session::new(Seat::Two), channel)?;
    Ok(table)
}

/// Feed stdin lines through a queue so the game loop can interleave them
/// with remote actions without blocking on either.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn play(mut table: Table) -> Result<()> {
    println!();
    println!("You are player {}. Type 'help' for commands.", table.seat());
    render(&table.view(), table.seat());

    let input = spawn_stdin_reader();
    loop {
        if table.pump() > 0 {
            render(&table.view(), table.seat());
        }
        if !table.is_connected() {
            println!("Opponent disconnected. Game over.");
            return Ok(());
        }
        let line = match input.recv_timeout(POLL_TIMEOUT) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        };
        if line.trim().is_empty() {
            continue;
        }
        let seat = table.seat();
        match parse_command(&line) {
            Ok(Command::Bet(amount)) => act(&mut table, Action::Bet { player: seat, amount }),
            Ok(Command::Hit) => act(&mut table, Action::Hit { player: seat }),
            Ok(Command::Stand) => act(&mut table, Action::Stand { player: seat }),
            Ok(Command::Deal) => act(&mut table, Action::NewRound),
            Ok(Command::Help) => println!("{}", commands::HELP),
            Ok(Command::Quit) => return Ok(()),
            Err(error) => println!("✗ {error}"),
        }
    }
}

/// Apply a local action; a rejection prints without changing anything.
fn act(table: &mut Table, action: Action) {
    match table.act(action) {
        Ok(()) => render(&table.view(), table.seat()),
        Err(error) => println!("✗ {error}"),
    }
}

/// Redraw the table from a snapshot. The opponent's cards and score stay
/// hidden until the round is over.
fn render(view: &TableView, seat: Seat) {
    let opponent = seat.other();
    let reveal = view.state == RoundState::Ended;

    println!();
    println!(
        "opponent  ${:<6} bet ${}",
        view.balances[opponent], view.bets[opponent]
    );
    if reveal {
        println!("   {} ({})", view.hands[opponent], view.scores[opponent]);
    } else {
        println!("   {}", "## ".repeat(view.hands[opponent].len()));
    }
    println!(
        "you       ${:<6} bet ${}",
        view.balances[seat], view.bets[seat]
    );
    println!("   {} ({})", view.hands[seat], view.scores[seat]);
    println!("» {}", view.message);

    match view.state {
        RoundState::Betting if view.bets[seat] == 0 => println!("  [bet AMOUNT]"),
        RoundState::Turn(turn) if turn == seat => println!("  [hit | stand]"),
        RoundState::Ended => println!("  [deal | quit]"),
        _ => {}
    }
}
