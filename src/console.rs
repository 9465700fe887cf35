// Operator console commands
//
// One command per line, e.g. `set motor1 100`, `move motor2=40`, `commit wave`.

use crate::motor::MotorId;

/// Parsed operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { motor: MotorId, value: i64 },
    Get { motor: MotorId },
    Rename { motor: MotorId, name: String },
    Status,
    New,
    /// Empty list means "record the current positions"
    AddMove(Vec<(MotorId, i64)>),
    Title(String),
    Commit(Option<String>),
    Discard,
    List,
    Delete(usize),
    Show { sequence: usize, index: usize },
    Play(usize),
    Calibrate,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown command '{0}', try 'help'")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Not a motor id: '{0}'")]
    BadMotor(String),

    #[error("Not a number: '{0}'")]
    BadNumber(String),
}

pub const HELP: &str = "\
set <motor> <value>      move a motor (0..65535)
get <motor>              show a motor's position
name <motor> <label>     rename a motor
status                   show all motors and the link state
new                      start editing a new sequence
move [<motor>=<value>..] record a move (current positions if none given)
title <name>             name the sequence being edited
commit [<name>]          save the sequence being edited
discard                  drop the sequence being edited
list                     list saved sequences
delete <n>               delete saved sequence n
show <n> <m>             print move m of sequence n
play <n>                 replay sequence n on the arm
calibrate                calibrate the vertical axis
quit";

fn motor(token: &str) -> Result<MotorId, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::BadMotor(token.to_string()))
}

fn number<N: std::str::FromStr>(token: &str) -> Result<N, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::BadNumber(token.to_string()))
}

/// Parse one console line; blank lines yield `None`
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let cmd = match (verb, args.as_slice()) {
        ("set", [m, v]) => Command::Set {
            motor: motor(m)?,
            value: number(v)?,
        },
        ("set", _) => return Err(ParseError::Usage("set <motor> <value>")),
        ("get", [m]) => Command::Get { motor: motor(m)? },
        ("get", _) => return Err(ParseError::Usage("get <motor>")),
        ("name", [m, rest @ ..]) if !rest.is_empty() => Command::Rename {
            motor: motor(m)?,
            name: rest.join(" "),
        },
        ("name", _) => return Err(ParseError::Usage("name <motor> <label>")),
        ("status", []) => Command::Status,
        ("new", []) => Command::New,
        ("move", pairs) => {
            let mut positions = Vec::with_capacity(pairs.len());
            for pair in pairs {
                let (m, v) = pair
                    .split_once('=')
                    .ok_or(ParseError::Usage("move [<motor>=<value> ...]"))?;
                positions.push((motor(m)?, number(v)?));
            }
            Command::AddMove(positions)
        }
        ("title", rest) if !rest.is_empty() => Command::Title(rest.join(" ")),
        ("title", _) => return Err(ParseError::Usage("title <name>")),
        ("commit", []) => Command::Commit(None),
        ("commit", rest) => Command::Commit(Some(rest.join(" "))),
        ("discard", []) => Command::Discard,
        ("list", []) => Command::List,
        ("delete", [n]) => Command::Delete(number(n)?),
        ("delete", _) => return Err(ParseError::Usage("delete <n>")),
        ("show", [n, m]) => Command::Show {
            sequence: number(n)?,
            index: number(m)?,
        },
        ("show", _) => return Err(ParseError::Usage("show <n> <m>")),
        ("play", [n]) => Command::Play(number(n)?),
        ("play", _) => return Err(ParseError::Usage("play <n>")),
        ("calibrate", []) => Command::Calibrate,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        (other, _) => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(cmd))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn test_set_and_get() {
        assert_eq!(
            parse("set motor1 100"),
            Ok(Some(Command::Set {
                motor: MotorId(1),
                value: 100
            }))
        );
        // range is checked by the controller, not the parser
        assert_eq!(
            parse("set motor1 70000"),
            Ok(Some(Command::Set {
                motor: MotorId(1),
                value: 70000
            }))
        );
        assert_eq!(
            parse("get motor6"),
            Ok(Some(Command::Get { motor: MotorId(6) }))
        );
        assert_eq!(parse("set motor1"), Err(ParseError::Usage("set <motor> <value>")));
        assert_eq!(
            parse("set wrist 3"),
            Err(ParseError::BadMotor("wrist".to_string()))
        );
    }

    #[test]
    fn test_move_pairs() {
        assert_eq!(parse("move"), Ok(Some(Command::AddMove(vec![]))));
        assert_eq!(
            parse("move motor1=10 motor3=30"),
            Ok(Some(Command::AddMove(vec![(MotorId(1), 10), (MotorId(3), 30)])))
        );
        assert_eq!(
            parse("move motor1=ten"),
            Err(ParseError::BadNumber("ten".to_string()))
        );
    }

    #[test]
    fn test_sequence_commands() {
        assert_eq!(parse("new"), Ok(Some(Command::New)));
        assert_eq!(parse("commit"), Ok(Some(Command::Commit(None))));
        assert_eq!(
            parse("commit big wave"),
            Ok(Some(Command::Commit(Some("big wave".to_string()))))
        );
        assert_eq!(parse("delete 2"), Ok(Some(Command::Delete(2))));
        assert_eq!(
            parse("show 0 1"),
            Ok(Some(Command::Show {
                sequence: 0,
                index: 1
            }))
        );
        assert_eq!(
            parse("jump"),
            Err(ParseError::UnknownCommand("jump".to_string()))
        );
    }
}
