use blackjack_duel::Chips;
use std::fmt;

pub const HELP: &str = "\
bet AMOUNT
        Stake chips on the round. Once both bets are in, the cards come out.
hit
        Draw another card.
stand
        End your turn.
deal
        Start the next round once the previous one has ended.
help
        Show this help.
quit
        Leave the table.
";

/// A parsed line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Bet(Chips),
    Hit,
    Stand,
    Deal,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid bet amount (not a valid number).
    InvalidBetAmount(String),
    /// Bet command missing its amount.
    BetMissingAmount,
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBetAmount(value) => write!(
                f,
                "Invalid bet amount '{value}'. Must be a whole number of chips (e.g., 'bet 100')"
            ),
            Self::BetMissingAmount => {
                write!(f, "Bet requires an amount (e.g., 'bet 100')")
            }
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{cmd}'. Type 'help' to see available commands"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a line of input into a [`Command`].
///
/// # Errors
///
/// Returns a [`ParseError`] with a descriptive message for anything that
/// isn't one of the documented commands.
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    // Try single-word commands first
    match trimmed {
        "hit" => return Ok(Command::Hit),
        "stand" => return Ok(Command::Stand),
        "deal" => return Ok(Command::Deal),
        "help" => return Ok(Command::Help),
        "quit" | "q" => return Ok(Command::Quit),
        _ => {}
    }

    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.as_slice() {
        ["bet"] => Err(ParseError::BetMissingAmount),
        ["bet", value] => value
            .parse::<Chips>()
            .map(Command::Bet)
            .map_err(|_| ParseError::InvalidBetAmount((*value).to_string())),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_word_commands() {
        assert_eq!(parse_command("hit"), Ok(Command::Hit));
        assert_eq!(parse_command("  stand "), Ok(Command::Stand));
        assert_eq!(parse_command("deal"), Ok(Command::Deal));
        assert_eq!(parse_command("help"), Ok(Command::Help));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
    }

    #[test]
    fn parses_bet_with_amount() {
        assert_eq!(parse_command("bet 100"), Ok(Command::Bet(100)));
        assert_eq!(parse_command("bet 1"), Ok(Command::Bet(1)));
    }

    #[test]
    fn rejects_bet_without_amount() {
        assert_eq!(parse_command("bet"), Err(ParseError::BetMissingAmount));
    }

    #[test]
    fn rejects_non_numeric_bet() {
        assert_eq!(
            parse_command("bet lots"),
            Err(ParseError::InvalidBetAmount("lots".to_string()))
        );
        assert_eq!(
            parse_command("bet -5"),
            Err(ParseError::InvalidBetAmount("-5".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_commands() {
        assert_eq!(
            parse_command("fold"),
            Err(ParseError::UnrecognizedCommand("fold".to_string()))
        );
    }
}
