//! Type-aware tokenizer.
//!
//! Converts a remaining-input cursor into typed tokens, given the field's
//! declared type: `true` is a boolean literal for a boolean field but a
//! bare word for a string field, and `12/2006` only means December 2006
//! for a datetime field. Rules are tried in a fixed priority order and
//! the first match wins.
//!
//! Word keywords (`AND`, `BETWEEN`, `BEFORE`, …) match case-insensitively
//! and require a word boundary, so `NOTfoo` stays a single word. Symbols
//! (`!=`, `<=`, `...`) match exactly.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, tag_no_case, take_while1, take_while_m_n},
    character::complete::{anychar, char, digit0, digit1, multispace0, multispace1, one_of},
    combinator::{map, map_res, opt, recognize, value},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};

use crate::ast::{FieldType, Number};
use crate::clock::Clock;
use crate::datetime::DateTimePartial;
use crate::error::{QueryError, QueryResult};
use crate::money::Money;

/// One lexeme. Literal variants carry the raw matched text alongside the
/// decoded value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    Null,
    Ellipsis,
    And,
    Or,
    Between,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    Eq,
    Not,
    Like,
    ParenOpen,
    ParenClose,
    Str { raw: String, text: String },
    Word { raw: String, text: String },
    Number { raw: String, value: Number },
    Boolean { raw: String, value: bool },
    Money { raw: String, value: Money },
    DateTime { raw: String, value: DateTimePartial },
}

impl Token {
    /// Whether this token can stand as a literal operand.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::Null
                | Token::Str { .. }
                | Token::Word { .. }
                | Token::Number { .. }
                | Token::Boolean { .. }
                | Token::Money { .. }
                | Token::DateTime { .. }
        )
    }

    /// The literal as plain text, for coercion into a LIKE pattern.
    /// Decoded text for strings and words, the raw spelling otherwise.
    pub fn literal_text(&self) -> Option<String> {
        match self {
            Token::Str { text, .. } | Token::Word { text, .. } => Some(text.clone()),
            Token::Null => Some(String::new()),
            Token::Number { raw, .. }
            | Token::Boolean { raw, .. }
            | Token::Money { raw, .. }
            | Token::DateTime { raw, .. } => Some(raw.clone()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Null => write!(f, "NULL"),
            Token::Ellipsis => write!(f, "..."),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Between => write!(f, "BETWEEN"),
            Token::Ne => write!(f, "!="),
            Token::Le => write!(f, "<="),
            Token::Ge => write!(f, ">="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Eq => write!(f, "="),
            Token::Not => write!(f, "NOT"),
            Token::Like => write!(f, "LIKE"),
            Token::ParenOpen => write!(f, "("),
            Token::ParenClose => write!(f, ")"),
            Token::Str { raw, .. }
            | Token::Word { raw, .. }
            | Token::Number { raw, .. }
            | Token::Boolean { raw, .. }
            | Token::Money { raw, .. }
            | Token::DateTime { raw, .. } => write!(f, "{raw:?}"),
        }
    }
}

/// Tokenizer over one field's input.
pub struct Lexer<'a> {
    input: &'a str,
    field_type: FieldType,
    clock: Clock,
    keywords: Vec<String>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, field_type: FieldType, clock: Clock) -> Self {
        Self {
            input,
            field_type,
            clock,
            keywords: Vec::new(),
        }
    }

    /// The next token, or `None` at end of input. Fails when no rule
    /// matches the remaining input for this field type.
    pub fn next_token(&mut self) -> QueryResult<Option<Token>> {
        self.input = self.input.trim_start();
        if self.input.is_empty() {
            return Ok(None);
        }
        let (rest, token) = self.lex_one()?;
        self.input = rest;
        Ok(Some(token))
    }

    /// The unconsumed input, for error reporting.
    pub fn remaining(&self) -> &'a str {
        self.input
    }

    /// Free-text terms seen so far (quoted strings and bare words), for
    /// optional external indexing.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn into_keywords(self) -> Vec<String> {
        self.keywords
    }

    fn lex_one(&mut self) -> QueryResult<(&'a str, Token)> {
        let input = self.input;

        if let Ok((rest, token)) = operator(input) {
            return Ok((rest, token));
        }

        if let Ok((rest, text)) = quoted_string(input) {
            self.keywords.push(text.clone());
            let raw = matched(input, rest).to_string();
            return Ok((rest, Token::Str { raw, text }));
        }

        if self.field_type == FieldType::Boolean {
            if let Ok((rest, value)) = boolean(input) {
                let raw = matched(input, rest).to_string();
                return Ok((rest, Token::Boolean { raw, value }));
            }
        }

        if self.field_type == FieldType::Money {
            if let Ok((rest, text)) = money_text(input) {
                let value = Money::parse(text)?;
                let raw = text.to_string();
                return Ok((rest, Token::Money { raw, value }));
            }
        }

        if self.field_type == FieldType::Datetime {
            if let Some(lexed) = self.lex_datetime(input)? {
                return Ok(lexed);
            }
        }

        if let Ok((rest, value)) = number(input) {
            let raw = matched(input, rest).to_string();
            return Ok((rest, Token::Number { raw, value }));
        }

        if self.field_type == FieldType::String {
            if let Ok((rest, text)) = word(input) {
                self.keywords.push(text.to_string());
                return Ok((
                    rest,
                    Token::Word {
                        raw: text.to_string(),
                        text: text.to_string(),
                    },
                ));
            }
        }

        Err(QueryError::syntax(format!(
            "invalid character for {} field at {:?}",
            self.field_type, input
        )))
    }

    /// The calendar-pattern cascade. Ordered most-specific first so
    /// `2/4/2006 14:30:33` is not cut short at minute precision.
    fn lex_datetime(&self, input: &'a str) -> QueryResult<Option<(&'a str, Token)>> {
        // mm/dd/yyyy hh:mm:ss[am|pm]
        if let Ok((rest, (m, d, y, h, min, s, ap))) = mdy_hms(input) {
            let value = DateTimePartial::second(y, m, d, fix_12h(h, ap), min, s)?;
            return Ok(Some(self.datetime_token(input, rest, value)));
        }
        // mm/dd/yyyy hh:mm[am|pm]
        if let Ok((rest, (m, d, y, h, min, ap))) = mdy_hm(input) {
            let value = DateTimePartial::minute(y, m, d, fix_12h(h, ap), min)?;
            return Ok(Some(self.datetime_token(input, rest, value)));
        }
        // mm/dd/yyyy hh[am|pm]
        if let Ok((rest, (m, d, y, h, ap))) = mdy_h(input) {
            let value = DateTimePartial::hour(y, m, d, fix_12h(h, ap))?;
            return Ok(Some(self.datetime_token(input, rest, value)));
        }
        // yyyy/mm/dd
        if let Ok((rest, (y, m, d))) = ymd(input) {
            let value = DateTimePartial::day(y, m, d)?;
            return Ok(Some(self.datetime_token(input, rest, value)));
        }
        // mm/dd/yyyy
        if let Ok((rest, (m, d, y))) = mdy(input) {
            let value = DateTimePartial::day(y, m, d)?;
            return Ok(Some(self.datetime_token(input, rest, value)));
        }
        // mm/yyyy
        if let Ok((rest, (m, y))) = month_year(input) {
            let value = DateTimePartial::month(y, m)?;
            return Ok(Some(self.datetime_token(input, rest, value)));
        }
        // mm/dd, year defaulting to the clock's idea of this year
        if let Ok((rest, (m, d))) = month_day(input) {
            let value = DateTimePartial::day(self.clock.this_year(), m, d)?;
            return Ok(Some(self.datetime_token(input, rest, value)));
        }
        // yyyy/mm
        if let Ok((rest, (y, m))) = year_month(input) {
            let value = DateTimePartial::month(y, m)?;
            return Ok(Some(self.datetime_token(input, rest, value)));
        }
        // yyyy
        if let Ok((rest, y)) = bare_year(input) {
            let value = DateTimePartial::year(y);
            return Ok(Some(self.datetime_token(input, rest, value)));
        }

        if let Ok((rest, _)) = keyword("now")(input) {
            let value = DateTimePartial::from_datetime(self.clock.now());
            return Ok(Some(self.datetime_token(input, rest, value)));
        }
        if let Ok((rest, _)) = this_year_kw(input) {
            let value = DateTimePartial::year(self.clock.this_year());
            return Ok(Some(self.datetime_token(input, rest, value)));
        }
        if let Ok((rest, _)) = keyword("yesterday")(input) {
            return Ok(Some(self.offset_day_token(input, rest, -1)?));
        }
        if let Ok((rest, n)) = today_offset('-')(input) {
            return Ok(Some(self.offset_day_token(input, rest, -n)?));
        }
        if let Ok((rest, _)) = keyword("tomorrow")(input) {
            return Ok(Some(self.offset_day_token(input, rest, 1)?));
        }
        if let Ok((rest, n)) = today_offset('+')(input) {
            return Ok(Some(self.offset_day_token(input, rest, n)?));
        }
        if let Ok((rest, _)) = keyword("today")(input) {
            return Ok(Some(self.offset_day_token(input, rest, 0)?));
        }

        Ok(None)
    }

    fn datetime_token(
        &self,
        input: &'a str,
        rest: &'a str,
        value: DateTimePartial,
    ) -> (&'a str, Token) {
        let raw = matched(input, rest).to_string();
        (rest, Token::DateTime { raw, value })
    }

    fn offset_day_token(
        &self,
        input: &'a str,
        rest: &'a str,
        days: i64,
    ) -> QueryResult<(&'a str, Token)> {
        let date = self
            .clock
            .today()
            .checked_add_signed(chrono::Duration::days(days))
            .ok_or_else(|| QueryError::syntax("date out of range"))?;
        Ok(self.datetime_token(input, rest, DateTimePartial::from_date(date)))
    }
}

/// The slice of `input` consumed to reach `rest`.
fn matched<'a>(input: &'a str, rest: &'a str) -> &'a str {
    &input[..input.len() - rest.len()]
}

fn lex_err(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag))
}

/// Succeed (consuming nothing) unless the next character continues a word.
fn word_boundary(input: &str) -> IResult<&str, ()> {
    match input.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => Err(lex_err(input)),
        _ => Ok((input, ())),
    }
}

/// Case-insensitive word keyword with a boundary check.
fn keyword(kw: &'static str) -> impl Fn(&str) -> IResult<&str, &str> {
    move |input| terminated(tag_no_case(kw), word_boundary)(input)
}

fn ne_op(input: &str) -> IResult<&str, &str> {
    alt((
        tag("!="),
        tag("<>"),
        recognize(tuple((
            keyword("NOT"),
            multispace1,
            keyword("EQUAL"),
            opt(pair(multispace1, keyword("TO"))),
        ))),
    ))(input)
}

fn lt_op(input: &str) -> IResult<&str, &str> {
    alt((
        keyword("BEFORE"),
        recognize(pair(keyword("LESS"), opt(pair(multispace1, keyword("THAN"))))),
        tag("<"),
    ))(input)
}

fn gt_op(input: &str) -> IResult<&str, &str> {
    alt((
        keyword("AFTER"),
        recognize(pair(keyword("GREATER"), opt(pair(multispace1, keyword("THAN"))))),
        tag(">"),
    ))(input)
}

fn eq_op(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(keyword("EQUAL"), opt(pair(multispace1, keyword("TO"))))),
        tag("=="),
        tag("="),
    ))(input)
}

/// Keyword and symbol operators, in priority order. `NOT EQUAL` outranks
/// `NOT`, `!=` outranks `!`, `<=`/`<>` outrank `<`.
fn operator(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Null, keyword("NULL")),
        value(Token::Ellipsis, tag("...")),
        value(Token::And, alt((keyword("AND"), tag("&")))),
        value(Token::Or, alt((keyword("OR"), tag("|")))),
        value(Token::Between, keyword("BETWEEN")),
        value(Token::Ne, ne_op),
        value(Token::Le, tag("<=")),
        value(Token::Ge, tag(">=")),
        value(Token::Lt, lt_op),
        value(Token::Gt, gt_op),
        value(Token::Eq, eq_op),
        value(Token::Not, alt((keyword("NOT"), tag("!")))),
        value(Token::Like, alt((keyword("LIKE"), tag("~")))),
        value(Token::ParenOpen, tag("(")),
        value(Token::ParenClose, tag(")")),
    ))(input)
}

/// `"..."` with backslash escapes (`\x` decodes to `x`).
fn quoted_string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(is_not("\\\""), '\\', anychar)),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

fn boolean(input: &str) -> IResult<&str, bool> {
    alt((
        value(true, keyword("true")),
        value(false, keyword("false")),
    ))(input)
}

/// Optional `$`, optional sign, digit groups with `,` separators,
/// optional fraction. Decoding is delegated to `Money::parse`.
fn money_text(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('$')),
        opt(one_of("+-")),
        alt((
            recognize(pair(
                take_while1(|c: char| c.is_ascii_digit() || c == ','),
                opt(pair(char('.'), digit1)),
            )),
            recognize(pair(char('.'), digit1)),
        )),
    )))(input)
}

fn float_mantissa(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ))(input)
}

fn float_text(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        opt(one_of("+-")),
        alt((
            recognize(tuple((float_mantissa, one_of("eE"), opt(one_of("+-")), digit1))),
            recognize(pair(char('.'), digit1)),
            recognize(tuple((digit1, char('.'), digit0))),
        )),
    ))(input)
}

fn int_text(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(one_of("+-")), digit1))(input)
}

/// Signed integer or float (exponent notation included). Numbers lex the
/// same under every field type so numeric BETWEEN bounds work everywhere.
fn number(input: &str) -> IResult<&str, Number> {
    alt((
        map_res(float_text, |s: &str| s.parse::<f64>().map(Number::Float)),
        map_res(int_text, |s: &str| s.parse::<i64>().map(Number::Int)),
    ))(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

// ------------------------------------------------------------------
// Calendar patterns
// ------------------------------------------------------------------

/// One or two digits.
fn d2(input: &str) -> IResult<&str, u32> {
    map_res(take_while_m_n(1, 2, |c: char| c.is_ascii_digit()), str::parse)(input)
}

/// Exactly two digits.
fn d2_strict(input: &str) -> IResult<&str, u32> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_digit()), str::parse)(input)
}

/// Exactly four digits.
fn d4(input: &str) -> IResult<&str, i32> {
    map_res(take_while_m_n(4, 4, |c: char| c.is_ascii_digit()), str::parse)(input)
}

/// `-` or whitespace between the date and time parts.
fn date_sep(input: &str) -> IResult<&str, &str> {
    alt((recognize(char('-')), multispace1))(input)
}

/// Optional am/pm suffix (`am`, `pm`, bare `a`/`p`), lowercased.
fn am_pm(input: &str) -> IResult<&str, Option<char>> {
    opt(map(
        preceded(
            multispace0,
            terminated(pair(one_of("apAP"), opt(one_of("mM"))), word_boundary),
        ),
        |(c, _)| c.to_ascii_lowercase(),
    ))(input)
}

/// Convert a 12-hour clock reading: `12am` is midnight, `12pm` is noon,
/// any other pm hour gains twelve.
fn fix_12h(hour: u32, am_pm: Option<char>) -> u32 {
    match am_pm {
        Some('a') if hour == 12 => 0,
        Some('p') if hour != 12 => hour + 12,
        _ => hour,
    }
}

fn mdy_date(input: &str) -> IResult<&str, (u32, u32, i32)> {
    map(
        tuple((d2, char('/'), d2, char('/'), d4)),
        |(m, _, d, _, y)| (m, d, y),
    )(input)
}

type HmsTail = (u32, u32, u32, Option<char>);

/// `hh[:]mm[:]ss [am|pm]` after the separator; colons optional so
/// `143033` reads as 14:30:33.
fn hms_tail(input: &str) -> IResult<&str, HmsTail> {
    let (input, h) = d2(input)?;
    let (input, _) = opt(char(':'))(input)?;
    let (input, m) = d2_strict(input)?;
    let (input, _) = opt(char(':'))(input)?;
    let (input, s) = d2_strict(input)?;
    let (input, ap) = am_pm(input)?;
    Ok((input, (h, m, s, ap)))
}

fn hm_tail(input: &str) -> IResult<&str, (u32, u32, Option<char>)> {
    let (input, h) = d2(input)?;
    let (input, _) = opt(char(':'))(input)?;
    let (input, m) = d2_strict(input)?;
    let (input, ap) = am_pm(input)?;
    Ok((input, (h, m, ap)))
}

#[allow(clippy::type_complexity)]
fn mdy_hms(input: &str) -> IResult<&str, (u32, u32, i32, u32, u32, u32, Option<char>)> {
    let (input, (m, d, y)) = mdy_date(input)?;
    let (input, _) = date_sep(input)?;
    let (input, (h, min, s, ap)) = hms_tail(input)?;
    Ok((input, (m, d, y, h, min, s, ap)))
}

#[allow(clippy::type_complexity)]
fn mdy_hm(input: &str) -> IResult<&str, (u32, u32, i32, u32, u32, Option<char>)> {
    let (input, (m, d, y)) = mdy_date(input)?;
    let (input, _) = date_sep(input)?;
    let (input, (h, min, ap)) = hm_tail(input)?;
    Ok((input, (m, d, y, h, min, ap)))
}

fn mdy_h(input: &str) -> IResult<&str, (u32, u32, i32, u32, Option<char>)> {
    let (input, (m, d, y)) = mdy_date(input)?;
    let (input, _) = date_sep(input)?;
    let (input, h) = d2(input)?;
    let (input, ap) = am_pm(input)?;
    Ok((input, (m, d, y, h, ap)))
}

fn ymd(input: &str) -> IResult<&str, (i32, u32, u32)> {
    map(
        tuple((d4, char('/'), d2, char('/'), d2)),
        |(y, _, m, _, d)| (y, m, d),
    )(input)
}

fn mdy(input: &str) -> IResult<&str, (u32, u32, i32)> {
    mdy_date(input)
}

fn month_year(input: &str) -> IResult<&str, (u32, i32)> {
    map(tuple((d2, char('/'), d4)), |(m, _, y)| (m, y))(input)
}

fn month_day(input: &str) -> IResult<&str, (u32, u32)> {
    map(tuple((d2, char('/'), d2)), |(m, _, d)| (m, d))(input)
}

fn year_month(input: &str) -> IResult<&str, (i32, u32)> {
    map(tuple((d4, char('/'), d2)), |(y, _, m)| (y, m))(input)
}

fn bare_year(input: &str) -> IResult<&str, i32> {
    d4(input)
}

/// `this year`, with the space optional.
fn this_year_kw(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag_no_case("this"), pair(multispace0, keyword("year"))))(input)
}

/// `today-N` / `today+N`.
fn today_offset(sign: char) -> impl Fn(&str) -> IResult<&str, i64> {
    move |input| {
        map_res(
            preceded(
                tuple((keyword("today"), multispace0, char(sign), multispace0)),
                digit1,
            ),
            |s: &str| s.parse::<i64>(),
        )(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(input: &str, field_type: FieldType) -> QueryResult<Vec<Token>> {
        let clock = Clock::fixed(
            chrono::NaiveDate::from_ymd_opt(2006, 2, 4)
                .unwrap()
                .and_hms_opt(0, 30, 15)
                .unwrap(),
        );
        let mut lexer = Lexer::new(input, field_type, clock);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn one(input: &str, field_type: FieldType) -> Token {
        let tokens = lex_all(input, field_type).unwrap();
        assert_eq!(tokens.len(), 1, "expected one token for {input:?}: {tokens:?}");
        tokens.into_iter().next().unwrap()
    }

    #[test]
    fn test_operator_priority() {
        assert_eq!(lex_all("<=", FieldType::Number).unwrap(), vec![Token::Le]);
        assert_eq!(lex_all("<>", FieldType::Number).unwrap(), vec![Token::Ne]);
        assert_eq!(lex_all("!=", FieldType::Number).unwrap(), vec![Token::Ne]);
        assert_eq!(lex_all("==", FieldType::Number).unwrap(), vec![Token::Eq]);
        assert_eq!(
            lex_all("! <", FieldType::Number).unwrap(),
            vec![Token::Not, Token::Lt]
        );
    }

    #[test]
    fn test_word_operators_need_boundary() {
        // NOTfoo is one word, not NOT + foo
        assert_eq!(
            one("NOTfoo", FieldType::String),
            Token::Word {
                raw: "NOTfoo".into(),
                text: "NOTfoo".into()
            }
        );
        assert_eq!(
            lex_all("NOT foo", FieldType::String).unwrap()[0],
            Token::Not
        );
    }

    #[test]
    fn test_word_operators_case_insensitive() {
        assert_eq!(lex_all("between", FieldType::Number).unwrap(), vec![Token::Between]);
        assert_eq!(
            lex_all("not equal to 5", FieldType::Number).unwrap()[0],
            Token::Ne
        );
        assert_eq!(lex_all("Before 5", FieldType::Number).unwrap()[0], Token::Lt);
        assert_eq!(
            lex_all("GREATER THAN 5", FieldType::Number).unwrap()[0],
            Token::Gt
        );
    }

    #[test]
    fn test_quoted_string_escapes() {
        assert_eq!(
            one(r#""a\"b""#, FieldType::String),
            Token::Str {
                raw: r#""a\"b""#.into(),
                text: "a\"b".into()
            }
        );
        assert_eq!(
            one(r#""\\""#, FieldType::String),
            Token::Str {
                raw: r#""\\""#.into(),
                text: "\\".into()
            }
        );
        assert_eq!(
            one(r#""""#, FieldType::String),
            Token::Str {
                raw: r#""""#.into(),
                text: String::new()
            }
        );
    }

    #[test]
    fn test_boolean_is_type_gated() {
        assert_eq!(
            one("true", FieldType::Boolean),
            Token::Boolean {
                raw: "true".into(),
                value: true
            }
        );
        // For a string field the same input is just a word.
        assert_eq!(
            one("true", FieldType::String),
            Token::Word {
                raw: "true".into(),
                text: "true".into()
            }
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            one("-123", FieldType::Number),
            Token::Number {
                raw: "-123".into(),
                value: Number::Int(-123)
            }
        );
        assert_eq!(
            one("+1.2e10", FieldType::Number),
            Token::Number {
                raw: "+1.2e10".into(),
                value: Number::Float(1.2e10)
            }
        );
        assert_eq!(
            one("0.25e-8", FieldType::Number),
            Token::Number {
                raw: "0.25e-8".into(),
                value: Number::Float(0.25e-8)
            }
        );
    }

    #[test]
    fn test_money() {
        let token = one("$1,234.56", FieldType::Money);
        assert_eq!(
            token,
            Token::Money {
                raw: "$1,234.56".into(),
                value: Money::parse("1234.56").unwrap()
            }
        );
    }

    #[test]
    fn test_datetime_cascade_precision() {
        let second = one("2/4/2006 143033", FieldType::Datetime);
        assert_eq!(
            second,
            Token::DateTime {
                raw: "2/4/2006 143033".into(),
                value: DateTimePartial::second(2006, 2, 4, 14, 30, 33).unwrap()
            }
        );

        let minute = one("2/4/2006 9:00p", FieldType::Datetime);
        assert_eq!(
            minute,
            Token::DateTime {
                raw: "2/4/2006 9:00p".into(),
                value: DateTimePartial::minute(2006, 2, 4, 21, 0).unwrap()
            }
        );

        let hour = one("2/4/2006-5 AM", FieldType::Datetime);
        assert_eq!(
            hour,
            Token::DateTime {
                raw: "2/4/2006-5 AM".into(),
                value: DateTimePartial::hour(2006, 2, 4, 5).unwrap()
            }
        );
    }

    #[test]
    fn test_datetime_date_forms() {
        assert_eq!(
            one("2006/12/25", FieldType::Datetime),
            Token::DateTime {
                raw: "2006/12/25".into(),
                value: DateTimePartial::day(2006, 12, 25).unwrap()
            }
        );
        assert_eq!(
            one("12/2006", FieldType::Datetime),
            Token::DateTime {
                raw: "12/2006".into(),
                value: DateTimePartial::month(2006, 12).unwrap()
            }
        );
        assert_eq!(
            one("2006/12", FieldType::Datetime),
            Token::DateTime {
                raw: "2006/12".into(),
                value: DateTimePartial::month(2006, 12).unwrap()
            }
        );
        // mm/dd picks up the clock's year
        assert_eq!(
            one("12/31", FieldType::Datetime),
            Token::DateTime {
                raw: "12/31".into(),
                value: DateTimePartial::day(2006, 12, 31).unwrap()
            }
        );
        assert_eq!(
            one("2006", FieldType::Datetime),
            Token::DateTime {
                raw: "2006".into(),
                value: DateTimePartial::year(2006)
            }
        );
    }

    #[test]
    fn test_datetime_twelve_hour_fix() {
        let midnight = one("12/31/2005 12:00:00am", FieldType::Datetime);
        assert_eq!(
            midnight,
            Token::DateTime {
                raw: "12/31/2005 12:00:00am".into(),
                value: DateTimePartial::second(2005, 12, 31, 0, 0, 0).unwrap()
            }
        );
        let noon = one("2/4/2006 12P", FieldType::Datetime);
        assert_eq!(
            noon,
            Token::DateTime {
                raw: "2/4/2006 12P".into(),
                value: DateTimePartial::hour(2006, 2, 4, 12).unwrap()
            }
        );
    }

    #[test]
    fn test_datetime_relative_keywords() {
        let now = one("now", FieldType::Datetime);
        assert_eq!(
            now,
            Token::DateTime {
                raw: "now".into(),
                value: DateTimePartial::second(2006, 2, 4, 0, 30, 15).unwrap()
            }
        );
        assert_eq!(
            one("yesterday", FieldType::Datetime),
            Token::DateTime {
                raw: "yesterday".into(),
                value: DateTimePartial::day(2006, 2, 3).unwrap()
            }
        );
        assert_eq!(
            one("today+1", FieldType::Datetime),
            Token::DateTime {
                raw: "today+1".into(),
                value: DateTimePartial::day(2006, 2, 5).unwrap()
            }
        );
        assert_eq!(
            one("this year", FieldType::Datetime),
            Token::DateTime {
                raw: "this year".into(),
                value: DateTimePartial::year(2006)
            }
        );
    }

    #[test]
    fn test_invalid_calendar_date_is_syntax_error() {
        assert!(lex_all("13/2006", FieldType::Datetime).is_err());
        assert!(lex_all("2/30/2006", FieldType::Datetime).is_err());
    }

    #[test]
    fn test_no_rule_matches() {
        let err = lex_all("##@!@", FieldType::String).unwrap_err();
        assert!(err.to_string().contains("invalid character for string field"));
    }

    #[test]
    fn test_keywords_collected() {
        let clock = Clock::default();
        let mut lexer = Lexer::new(r#"foo "bar baz""#, FieldType::String, clock);
        while lexer.next_token().unwrap().is_some() {}
        assert_eq!(lexer.keywords(), ["foo".to_string(), "bar baz".to_string()]);
    }
}
