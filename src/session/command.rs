//! Text command parsing for the session front-end.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::config::{action_for_key, KeyAction};
use crate::measurement::{PixelPoint, RectangleGroup};

/// Command parsing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown key: {0}")]
    UnknownKey(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unrecognized command: {0} (press 'h' for help)")]
    Unrecognized(String),
}

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Click at page-pixel coordinates.
    Click(PixelPoint),
    Key(KeyAction),
    /// Known length of the reference line, in millimetres.
    Length(f64),
    /// Answer to a confirmation prompt.
    Confirm(bool),
    /// Jump to a page (1-based, as typed).
    Page(usize),
    DeleteRectangle(RectangleGroup),
    DeleteParticle(u32),
    ShowParticle(u32),
    Status,
}

const NUMBER: &str = r"[-+]?(?:\d+(?:\.\d*)?|\.\d+)";

static CLICK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:click\s+)?\(?\s*({n})\s*(?:,\s*|\s+)({n})\s*\)?$",
        n = NUMBER
    ))
    .expect("click pattern")
});
static KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^key\s+(\S+)$").expect("key pattern"));
static LENGTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^length\s+(\S+?)(?:\s*mm)?$").expect("length pattern"));
static PAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^page\s+(\S+)$").expect("page pattern"));
static DELETE_RECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^delete\s+rect(?:angle)?\s+(\S+)$").expect("delete rect pattern"));
static DELETE_PARTICLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^delete\s+particle\s+(\S+)$").expect("delete particle pattern"));
static SHOW_PARTICLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^particle\s+(\S+)$").expect("particle pattern"));

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}

/// Parse one line of user input.
pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let line = input.trim().to_lowercase();
    if line.is_empty() {
        return Err(CommandError::Empty);
    }

    match line.as_str() {
        "yes" => return Ok(Command::Confirm(true)),
        "no" => return Ok(Command::Confirm(false)),
        "status" => return Ok(Command::Status),
        _ => {}
    }

    if let Some(caps) = CLICK_RE.captures(&line) {
        let x: f64 = parse_number(&caps[1])?;
        let y: f64 = parse_number(&caps[2])?;
        return Ok(Command::Click(PixelPoint::new(x, y)));
    }

    if let Some(caps) = KEY_RE.captures(&line) {
        return action_for_key(&caps[1])
            .map(Command::Key)
            .ok_or_else(|| CommandError::UnknownKey(caps[1].to_string()));
    }

    if let Some(caps) = LENGTH_RE.captures(&line) {
        let length: f64 = parse_number(&caps[1])?;
        return Ok(Command::Length(length));
    }

    if let Some(caps) = PAGE_RE.captures(&line) {
        let page: usize = parse_number(&caps[1])?;
        return Ok(Command::Page(page));
    }

    if let Some(caps) = DELETE_RECT_RE.captures(&line) {
        return caps[1]
            .parse::<RectangleGroup>()
            .map(Command::DeleteRectangle)
            .map_err(|_| CommandError::InvalidArgument(format!("rectangle group '{}'", &caps[1])));
    }

    if let Some(caps) = DELETE_PARTICLE_RE.captures(&line) {
        let id: u32 = parse_number(&caps[1])?;
        return Ok(Command::DeleteParticle(id));
    }

    if let Some(caps) = SHOW_PARTICLE_RE.captures(&line) {
        let id: u32 = parse_number(&caps[1])?;
        return Ok(Command::ShowParticle(id));
    }

    // A bare key name
    action_for_key(&line)
        .map(Command::Key)
        .ok_or(CommandError::Unrecognized(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clicks() {
        let expected = Command::Click(PixelPoint::new(100.5, 400.2));
        assert_eq!(parse_command("click 100.5 400.2").unwrap(), expected);
        assert_eq!(parse_command("(100.5, 400.2)").unwrap(), expected);
        assert_eq!(parse_command("  Click 100.5,400.2 ").unwrap(), expected);
        assert_eq!(
            parse_command("click 3 4").unwrap(),
            Command::Click(PixelPoint::new(3.0, 4.0))
        );
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(parse_command("m").unwrap(), Command::Key(KeyAction::Measure));
        assert_eq!(parse_command("key ]").unwrap(), Command::Key(KeyAction::NextPage));
        assert_eq!(parse_command("Escape").unwrap(), Command::Key(KeyAction::Cancel));
        assert_eq!(parse_command("?").unwrap(), Command::Key(KeyAction::Help));
        assert_eq!(
            parse_command("key z"),
            Err(CommandError::UnknownKey("z".to_string()))
        );
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_command("length 25.4").unwrap(), Command::Length(25.4));
        assert_eq!(parse_command("length 10 mm").unwrap(), Command::Length(10.0));
        assert_eq!(parse_command("page 3").unwrap(), Command::Page(3));
        assert_eq!(parse_command("yes").unwrap(), Command::Confirm(true));
        assert_eq!(parse_command("NO").unwrap(), Command::Confirm(false));
        assert_eq!(parse_command("status").unwrap(), Command::Status);
        assert_eq!(
            parse_command("delete rect post").unwrap(),
            Command::DeleteRectangle(RectangleGroup::Post)
        );
        assert_eq!(
            parse_command("delete particle 7").unwrap(),
            Command::DeleteParticle(7)
        );
        assert_eq!(parse_command("particle 3").unwrap(), Command::ShowParticle(3));
        assert_eq!(
            parse_command("particle p3"),
            Err(CommandError::InvalidNumber("p3".to_string()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("length abc"),
            Err(CommandError::InvalidNumber("abc".to_string()))
        );
        assert_eq!(
            parse_command("page -1"),
            Err(CommandError::InvalidNumber("-1".to_string()))
        );
        assert!(matches!(
            parse_command("delete rect fiber"),
            Err(CommandError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_command("measure everything"),
            Err(CommandError::Unrecognized(_))
        ));
    }
}
