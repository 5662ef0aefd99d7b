//! Line tokenizer.
//!
//! Turns `M/D HH:MM:SS.mmm  EVENT_NAME,p1,p2,...` into a [`LogLine`]. The
//! parameter tail has no strict grammar: numbers are bare, names are usually
//! quoted, flags are bare hex, and nested lists use either `()` or `[]`. The
//! tail is rewritten into JSON text piece by piece and then parsed with
//! `serde_json`.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use memchr::{memchr, memchr2_iter};

use super::Token;
use crate::error::ParseError;

/// Process-wide counter, used only to trace lines through the pipeline.
static NEXT_LINE_ID: AtomicU64 = AtomicU64::new(0);

/// A successfully tokenized log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub id: u64,
    pub raw: String,
    /// Milliseconds since the Unix epoch, read as UTC.
    pub timestamp: i64,
    pub event: String,
    pub parameters: Vec<Token>,
}

impl LogLine {
    pub fn param(&self, index: usize) -> Option<&Token> {
        self.parameters.get(index)
    }
}

/// Tokenize one raw line. `anchor_year` supplies the year the format omits.
pub fn parse_log_line(raw: &str, anchor_year: i32) -> Result<LogLine, ParseError> {
    let line = raw.trim_end();

    let (rest, timestamp) =
        parse_timestamp(line, anchor_year).ok_or(ParseError::unparsable("bad timestamp"))?;

    let rest = rest.trim_start();
    let comma = memchr(b',', rest.as_bytes()).ok_or(ParseError::unparsable("no parameters"))?;
    let event = &rest[..comma];
    let tail = &rest[comma + 1..];

    if event.is_empty() || !event.bytes().all(|b| b.is_ascii_uppercase() || b == b'_') {
        return Err(ParseError::unparsable("bad event name"));
    }
    if tail.is_empty() {
        return Err(ParseError::unparsable("no parameters"));
    }

    let parameters = parse_parameters(tail)?;

    Ok(LogLine {
        id: NEXT_LINE_ID.fetch_add(1, Ordering::Relaxed),
        raw: raw.to_string(),
        timestamp,
        event: event.to_string(),
        parameters,
    })
}

/// Parse the leading `M/D[/YYYY] H:MM:SS.fff` prefix, returning the remainder
/// and the timestamp in milliseconds.
pub fn parse_timestamp(input: &str, anchor_year: i32) -> Option<(&str, i64)> {
    let b = input.as_bytes();
    let mut pos = 0;

    let month = take_digits(b, &mut pos, 1, 2)?;
    expect(b, &mut pos, b'/')?;
    let day = take_digits(b, &mut pos, 1, 2)?;
    let year = if b.get(pos) == Some(&b'/') {
        pos += 1;
        take_digits(b, &mut pos, 4, 4)? as i32
    } else {
        anchor_year
    };

    // At least one separator between date and time
    let ws_start = pos;
    while b.get(pos).is_some_and(|c| c.is_ascii_whitespace()) {
        pos += 1;
    }
    if pos == ws_start {
        return None;
    }

    let hour = take_digits(b, &mut pos, 1, 2)?;
    expect(b, &mut pos, b':')?;
    let minute = take_digits(b, &mut pos, 2, 2)?;
    expect(b, &mut pos, b':')?;
    let second = take_digits(b, &mut pos, 2, 2)?;
    expect(b, &mut pos, b'.')?;

    // Fraction may carry 1-4 digits; keep milliseconds only
    let frac_start = pos;
    let mut millis = 0u32;
    while let Some(c) = b.get(pos).filter(|c| c.is_ascii_digit()) {
        if pos - frac_start < 3 {
            millis = millis * 10 + u32::from(c - b'0');
        }
        pos += 1;
    }
    let frac_len = pos - frac_start;
    if frac_len == 0 {
        return None;
    }
    for _ in frac_len..3 {
        millis *= 10;
    }

    let timestamp = NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_milli_opt(hour, minute, second, millis)?
        .and_utc()
        .timestamp_millis();

    Some((&input[pos..], timestamp))
}

fn take_digits(b: &[u8], pos: &mut usize, min: usize, max: usize) -> Option<u32> {
    let start = *pos;
    let mut value = 0u32;
    while *pos - start < max {
        match b.get(*pos) {
            Some(c) if c.is_ascii_digit() => {
                value = value * 10 + u32::from(c - b'0');
                *pos += 1;
            }
            _ => break,
        }
    }
    (*pos - start >= min).then_some(value)
}

fn expect(b: &[u8], pos: &mut usize, byte: u8) -> Option<()> {
    if b.get(*pos) == Some(&byte) {
        *pos += 1;
        Some(())
    } else {
        None
    }
}

/// Rebuild the parameter tail as JSON text and parse it.
pub fn parse_parameters(tail: &str) -> Result<Vec<Token>, ParseError> {
    let json = reconstruct_json(tail);
    serde_json::from_str::<Vec<Token>>(&json)
        .map_err(|_| ParseError::unparsable("parameters do not form a list"))
}

fn reconstruct_json(tail: &str) -> String {
    let mut out = String::with_capacity(tail.len() + tail.len() / 4 + 2);
    out.push('[');
    for (i, piece) in split_outside_quotes(tail).into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_piece(piece, &mut out);
    }
    out.push(']');
    out
}

/// Split on commas that are not inside a quoted string.
fn split_outside_quotes(tail: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for pos in memchr2_iter(b',', b'"', tail.as_bytes()) {
        match tail.as_bytes()[pos] {
            b'"' => in_quotes = !in_quotes,
            _ if !in_quotes => {
                pieces.push(&tail[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    pieces.push(&tail[start..]);
    pieces
}

fn is_listy(piece: &str) -> bool {
    !piece.is_empty()
        && piece
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'(' | b')' | b'.' | b'[' | b']'))
}

fn is_open_delim(c: char) -> bool {
    c == '(' || c == '['
}

fn is_close_delim(c: char) -> bool {
    c == ')' || c == ']'
}

fn push_delims(delims: &str, out: &mut String) {
    for c in delims.chars() {
        out.push(match c {
            '(' => '[',
            ')' => ']',
            other => other,
        });
    }
}

fn write_piece(piece: &str, out: &mut String) {
    if is_listy(piece) {
        // Long zero runs (empty unit ids) are not valid JSON numbers
        let core_start = piece.len() - piece.trim_start_matches(is_open_delim).len();
        let core = piece[core_start..].trim_end_matches(is_close_delim);
        if !core.is_empty() && core.bytes().all(|b| b == b'0') {
            push_delims(&piece[..core_start], out);
            out.push('0');
            push_delims(&piece[core_start + core.len()..], out);
        } else {
            push_delims(piece, out);
        }
        return;
    }

    let core_start = piece.len() - piece.trim_start_matches(is_open_delim).len();
    let leading = &piece[..core_start];
    let rest = &piece[core_start..];
    let core = rest.trim_end_matches(is_close_delim);
    // A quoted core keeps any parentheses that sit inside its quotes
    let core = if core.starts_with('"') && !core.ends_with('"') {
        match rest.rfind('"') {
            Some(q) if q > 0 => &rest[..=q],
            _ => core,
        }
    } else {
        core
    };
    let trailing = &rest[core.len()..];

    push_delims(leading, out);
    if core.starts_with('"') {
        out.push_str(core);
    } else {
        out.push('"');
        for c in core.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                c if c.is_control() => {}
                c => out.push(c),
            }
        }
        out.push('"');
    }
    push_delims(trailing, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2021;

    fn params(tail: &str) -> Vec<Token> {
        parse_parameters(tail).expect("tail should parse")
    }

    #[test]
    fn test_parse_timestamp() {
        let (rest, ts) = parse_timestamp("5/21 16:34:31.398  SPELL_CAST_START,x", YEAR).unwrap();
        assert_eq!(rest, "  SPELL_CAST_START,x");
        let expected = NaiveDate::from_ymd_opt(2021, 5, 21)
            .unwrap()
            .and_hms_milli_opt(16, 34, 31, 398)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert_eq!(ts, expected);
    }

    #[test]
    fn test_parse_timestamp_with_year_and_four_digit_fraction() {
        let (_, ts) = parse_timestamp("12/3/2024 01:02:03.4567 X,1", YEAR).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 12, 3)
            .unwrap()
            .and_hms_milli_opt(1, 2, 3, 456)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert_eq!(ts, expected);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("hello world", YEAR).is_none());
        assert!(parse_timestamp("13/40 10:00:00.000 X,1", YEAR).is_none());
        assert!(parse_timestamp("5/21 16:34:31 X,1", YEAR).is_none());
        assert!(parse_timestamp("5/2116:34:31.000 X,1", YEAR).is_none());
    }

    #[test]
    fn test_parse_simple_line() {
        let line = parse_log_line("8/20 22:11:20.529  ARENA_MATCH_START,1552,30,2v2,1", YEAR)
            .unwrap();
        assert_eq!(line.event, "ARENA_MATCH_START");
        assert_eq!(
            line.parameters,
            vec![
                Token::Number(1552.0),
                Token::Number(30.0),
                Token::Str("2v2".into()),
                Token::Number(1.0),
            ]
        );
    }

    #[test]
    fn test_quoted_and_bare_strings() {
        let p = params(r#"Player-57-0CE7FCBF,"Assinoth-Whitemane",0x511,0x0,nil"#);
        assert_eq!(p[0], Token::Str("Player-57-0CE7FCBF".into()));
        assert_eq!(p[1], Token::Str("Assinoth-Whitemane".into()));
        assert_eq!(p[2], Token::Str("0x511".into()));
        assert_eq!(p[4], Token::Str("nil".into()));
    }

    #[test]
    fn test_zero_runs_collapse() {
        let p = params("0000000000000000,nil,0x80000000");
        assert_eq!(p[0], Token::Number(0.0));
        assert!(p[0].is_null_guid());
    }

    #[test]
    fn test_zero_runs_collapse_inside_lists() {
        let p = params("[0000000000000000,5],(7,0000000000000000)");
        assert_eq!(
            p[0],
            Token::List(vec![Token::Number(0.0), Token::Number(5.0)])
        );
        assert_eq!(
            p[1],
            Token::List(vec![Token::Number(7.0), Token::Number(0.0)])
        );
    }

    #[test]
    fn test_nested_lists_stay_one_parameter() {
        let p = params("1,[(123,200,(),(1,2),()),(456,210,(),(),())],(1,2,3),2");
        assert_eq!(p.len(), 4);
        let equipment = p[1].as_list().unwrap();
        assert_eq!(equipment.len(), 2);
        let first = equipment[0].as_list().unwrap();
        assert_eq!(first[0], Token::Number(123.0));
        assert_eq!(first[3], Token::List(vec![Token::Number(1.0), Token::Number(2.0)]));
        assert_eq!(p[2].as_list().unwrap().len(), 3);
    }

    #[test]
    fn test_bare_strings_inside_lists() {
        let p = params("[Player-1-ABC,12345,Pet-0-99],7");
        assert_eq!(
            p[0],
            Token::List(vec![
                Token::Str("Player-1-ABC".into()),
                Token::Number(12345.0),
                Token::Str("Pet-0-99".into()),
            ])
        );
        assert_eq!(p[1], Token::Number(7.0));
    }

    #[test]
    fn test_commas_and_parens_inside_quotes() {
        let p = params(r#"1,"Healing Stream Totem (Rank 2), Improved",("Inner",3)"#);
        assert_eq!(p.len(), 3);
        assert_eq!(p[1], Token::Str("Healing Stream Totem (Rank 2), Improved".into()));
        assert_eq!(
            p[2],
            Token::List(vec![Token::Str("Inner".into()), Token::Number(3.0)])
        );
    }

    #[test]
    fn test_power_lists_stay_strings() {
        let p = params("0|3,100|50");
        assert_eq!(p[0], Token::Str("0|3".into()));
        assert_eq!(p[1], Token::Str("100|50".into()));
    }

    #[test]
    fn test_empty_pieces_become_empty_strings() {
        let p = params("1,,2");
        assert_eq!(p[1], Token::Str(String::new()));
    }

    #[test]
    fn test_unbalanced_lists_fail() {
        let err = parse_log_line("5/21 16:34:31.398  SPELL_CAST_START,[(1,2", YEAR).unwrap_err();
        assert!(matches!(err, ParseError::UnparsableLine { .. }));
    }

    #[test]
    fn test_line_grammar_failures() {
        assert!(parse_log_line("not a log line", YEAR).is_err());
        assert!(parse_log_line("5/21 16:34:31.398  SPELL_CAST_START", YEAR).is_err());
        assert!(parse_log_line("5/21 16:34:31.398  spell_cast,1", YEAR).is_err());
        assert!(parse_log_line("5/21 16:34:31.398  SPELL_CAST_START,", YEAR).is_err());
    }

    #[test]
    fn test_tokenizing_twice_is_structurally_equal() {
        let raw = r#"5/21 16:34:31.398  SPELL_AURA_APPLIED,Player-1,"A",0x511,0x0,Player-2,"B",0x548,0x0,1022,"Blessing of Protection",0x2,BUFF"#;
        let a = parse_log_line(raw, YEAR).unwrap();
        let b = parse_log_line(raw, YEAR).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.timestamp, b.timestamp);
        assert_eq!(a.event, b.event);
        assert_eq!(a.parameters, b.parameters);
        assert_eq!(a.raw, raw);
    }
}
