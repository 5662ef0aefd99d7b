use serde::{Deserialize, Serialize};

/// All-zero unit id the client writes when a unit slot is empty.
pub const NULL_GUID: &str = "0000000000000000";

/// True for an id that names no unit: empty, the sentinel, or the sentinel
/// after zero-run collapsing.
pub fn is_null_id(id: &str) -> bool {
    id.is_empty() || id == NULL_GUID || id == "0"
}

/// One structured parameter value recovered from a log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    Number(f64),
    Str(String),
    List(Vec<Token>),
}

impl Token {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Token]> {
        match self {
            Token::List(items) => Some(items),
            _ => None,
        }
    }

    /// Numeric value. Strings are accepted when they hold a plain decimal.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Token::Number(n) if n.is_finite() => Some(*n),
            Token::Str(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Integer value, truncating any fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|n| n.trunc() as i64)
    }

    /// Unit flag field, written by the client as `0x...` hex.
    pub fn as_flags(&self) -> Option<u32> {
        match self {
            Token::Str(s) => {
                let s = s.trim();
                let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
                u32::from_str_radix(hex, 16).ok()
            }
            Token::Number(n) if n.is_finite() && *n >= 0.0 => Some(*n as u32),
            _ => None,
        }
    }

    /// Scalar rendered as text: strings verbatim, integral numbers without a
    /// fraction. Lists have no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Token::Str(s) => Some(s.clone()),
            Token::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            Token::Number(n) => Some(n.to_string()),
            Token::List(_) => None,
        }
    }

    /// True for the empty-unit sentinel. The tokenizer collapses all-zero
    /// runs to `0`, so the numeric form counts as well.
    pub fn is_null_guid(&self) -> bool {
        match self {
            Token::Number(n) => *n == 0.0,
            Token::Str(s) => is_null_id(s),
            Token::List(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_from_hex() {
        assert_eq!(Token::Str("0x511".into()).as_flags(), Some(0x511));
        assert_eq!(Token::Str("0x10548".into()).as_flags(), Some(0x10548));
        assert_eq!(Token::Number(0.0).as_flags(), Some(0));
        assert_eq!(Token::Str("nil".into()).as_flags(), None);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Token::Number(1.0).to_text().as_deref(), Some("1"));
        assert_eq!(Token::Number(-12.5).to_text().as_deref(), Some("-12.5"));
        assert_eq!(Token::Str("2v2".into()).to_text().as_deref(), Some("2v2"));
        assert_eq!(Token::List(vec![]).to_text(), None);
    }

    #[test]
    fn test_null_guid() {
        assert!(Token::Number(0.0).is_null_guid());
        assert!(Token::Str(NULL_GUID.into()).is_null_guid());
        assert!(!Token::Str("Player-57-0CE7FCBF".into()).is_null_guid());
    }

    #[test]
    fn test_numeric_strings_truncate() {
        assert_eq!(Token::Str("42".into()).as_i64(), Some(42));
        assert_eq!(Token::Number(-1234.9).as_i64(), Some(-1234));
        assert_eq!(Token::Str("Player-1".into()).as_i64(), None);
    }
}
