//! Numeric field grammar
//!
//! Survey sheets are typed in by hand, so every measurement arrives as text.
//! Blank text means "not entered yet" and parses to `Ok(None)`; anything
//! else must match the grammar below or it is an error.
//!
//! ```text
//! field    ::= ws* sign? mantissa exponent? ws*
//! mantissa ::= digit+ ('.' digit*)? | '.' digit+
//! exponent ::= ('e' | 'E') sign? digit+
//! distance ::= ws* sign? mantissa exponent? ws* '*'? ws*
//! ```

use nom::{
    branch::alt,
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map, opt, recognize},
    error::ParseError as NomParseError,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumberFormatError {
    #[error("'{0}' is not a valid number")]
    Malformed(String),

    #[error("'*' must follow a distance")]
    BareExclusion,
}

/// A distance field after the optional trailing `*` is stripped
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedDistance {
    pub value: f64,
    pub excluded: bool,
}

// ============================================================================
// Public API
// ============================================================================

/// Parse a plain numeric field
pub fn parse_numeric_field(raw: &str) -> Result<Option<f64>, NumberFormatError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match all_consuming(delimited(
        multispace0::<_, nom::error::Error<&str>>,
        numeral,
        multispace0,
    ))(raw)
    {
        Ok((_, text)) => to_f64(text, raw).map(Some),
        Err(_) => Err(NumberFormatError::Malformed(raw.trim().to_string())),
    }
}

/// Parse a distance field, which may carry a trailing `*` marking the
/// distance as excluded from length totals
pub fn parse_distance_field(raw: &str) -> Result<Option<ParsedDistance>, NumberFormatError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed == "*" {
        return Err(NumberFormatError::BareExclusion);
    }
    match all_consuming(distance::<nom::error::Error<&str>>)(raw) {
        Ok((_, (text, excluded))) => Ok(Some(ParsedDistance {
            value: to_f64(text, raw)?,
            excluded,
        })),
        Err(_) => Err(NumberFormatError::Malformed(trimmed.to_string())),
    }
}

// ============================================================================
// Internal Parsers
// ============================================================================

fn to_f64(text: &str, raw: &str) -> Result<f64, NumberFormatError> {
    text.parse::<f64>()
        .map_err(|_| NumberFormatError::Malformed(raw.trim().to_string()))
}

fn numeral<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    recognize(tuple((opt(one_of("+-")), mantissa, opt(exponent))))(input)
}

fn mantissa<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ))(input)
}

fn exponent<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

fn distance<'a, E: NomParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (&'a str, bool), E> {
    let (input, _) = multispace0(input)?;
    let (input, text) = numeral(input)?;
    let (input, excluded) = map(opt(preceded(multispace0, char('*'))), |star| star.is_some())(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, (text, excluded)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_not_entered() {
        assert_eq!(parse_numeric_field(""), Ok(None));
        assert_eq!(parse_numeric_field("   \t"), Ok(None));
        assert_eq!(parse_distance_field(""), Ok(None));
        assert_eq!(parse_distance_field("  "), Ok(None));
    }

    #[test]
    fn test_numeric_forms() {
        let cases = [
            ("12", 12.0),
            ("-12", -12.0),
            ("+3.5", 3.5),
            ("7.", 7.0),
            (".25", 0.25),
            ("1e3", 1000.0),
            ("2.5E-1", 0.25),
            ("-4e+2", -400.0),
        ];
        for (text, expected) in cases {
            assert_eq!(parse_numeric_field(text), Ok(Some(expected)), "{text}");
        }
    }

    #[test]
    fn test_whitespace_insensitive() {
        for text in ["42.5", " 42.5", "42.5 ", "\t42.5\n", "   42.5   "] {
            assert_eq!(parse_numeric_field(text), Ok(Some(42.5)), "{text:?}");
        }
    }

    #[test]
    fn test_malformed_numbers() {
        for text in ["abc", "1.2.3", "--1", ".", "e5", "1e", "12 5", "0x10", "1,5"] {
            assert!(
                matches!(parse_numeric_field(text), Err(NumberFormatError::Malformed(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_distance_exclusion() {
        assert_eq!(
            parse_distance_field("12.5 *"),
            Ok(Some(ParsedDistance { value: 12.5, excluded: true }))
        );
        assert_eq!(
            parse_distance_field("12.5*"),
            Ok(Some(ParsedDistance { value: 12.5, excluded: true }))
        );
        assert_eq!(
            parse_distance_field("12.5"),
            Ok(Some(ParsedDistance { value: 12.5, excluded: false }))
        );
    }

    #[test]
    fn test_distance_rejects_garbage() {
        assert!(matches!(parse_distance_field("abc"), Err(NumberFormatError::Malformed(_))));
        assert!(matches!(parse_distance_field("12 * *"), Err(NumberFormatError::Malformed(_))));
        assert!(matches!(parse_distance_field("*12"), Err(NumberFormatError::Malformed(_))));
        assert_eq!(parse_distance_field(" * "), Err(NumberFormatError::BareExclusion));
    }

    #[test]
    fn test_plain_field_rejects_star() {
        assert!(parse_numeric_field("12 *").is_err());
    }
}
