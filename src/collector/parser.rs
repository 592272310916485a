//! NGX ticker text parser
//!
//! The NGX site publishes a delayed ticker as plain text:
//!
//! ```text
//! 30 MINUTES DELAYED DATA: BUACEMENT N168.600.00 % AIRTELAFRI N2310.500.00 %
//! ```
//!
//! Each quote is `SYMBOL N<price><change>%`, where the price and the change
//! run together. The price is the leading digits/commas plus at most one
//! decimal point and its fraction digits; everything up to `%` is the change.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Marker preceding the ticker on NGX pages
const DELAYED_DATA_MARKER: &str = "DELAYED DATA:";

/// Characters parsed after the marker
const DELAYED_DATA_WINDOW: usize = 10_000;

/// A quote parsed out of ticker text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuote {
    pub symbol: String,
    pub price: Decimal,
    pub change: Decimal,
}

/// Parse every quote in `text`, skipping entries priced above `max_price`
/// or with unparseable numbers.
pub fn parse_quotes(text: &str, max_price: Decimal) -> Vec<ParsedQuote> {
    let chars: Vec<char> = text.chars().collect();
    let mut quotes = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match match_quote(&chars, i) {
            Some((raw, end)) => {
                if let Some(quote) = raw.into_quote() {
                    if quote.price <= max_price {
                        quotes.push(quote);
                    }
                }
                i = end;
            }
            None => i += 1,
        }
    }

    quotes
}

/// Reduce an HTML page to text and parse the ticker out of it
pub fn extract_from_html(html: &str, max_price: Decimal) -> Vec<ParsedQuote> {
    let text = html_to_text(html);

    if let Some(start) = text.find(DELAYED_DATA_MARKER) {
        let window: String = text[start..].chars().take(DELAYED_DATA_WINDOW).collect();
        return parse_quotes(&window, max_price);
    }

    parse_quotes(&text, max_price)
}

/// Strip tags and decode the handful of entities the NGX pages use
fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&amp;", "&")
}

struct RawQuote {
    symbol: String,
    price: String,
    change: String,
}

impl RawQuote {
    fn into_quote(self) -> Option<ParsedQuote> {
        let price = Decimal::from_str(&self.price.replace(',', "")).ok()?;
        let change = if self.change.is_empty() {
            Decimal::ZERO
        } else {
            Decimal::from_str(&normalize_number(&self.change)).ok()?
        };

        Some(ParsedQuote {
            symbol: self.symbol,
            price,
            change,
        })
    }
}

/// Give bare fractions a leading zero (".00" -> "0.00", "-.5" -> "-0.5")
fn normalize_number(s: &str) -> String {
    let (sign, rest) = match s.strip_prefix(['+', '-']) {
        Some(rest) => (&s[..1], rest),
        None => ("", s),
    };
    if rest.starts_with('.') {
        format!("{sign}0{rest}")
    } else {
        s.to_string()
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ',' | '.' | '+' | '-')
}

/// Try to match one quote starting exactly at `start`
fn match_quote(chars: &[char], start: usize) -> Option<(RawQuote, usize)> {
    let mut i = start;

    // SYMBOL
    while i < chars.len() && is_symbol_char(chars[i]) {
        i += 1;
    }
    if i == start {
        return None;
    }
    let symbol: String = chars[start..i].iter().collect();

    // whitespace, then 'N'
    let ws_start = i;
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    if i == ws_start || chars.get(i) != Some(&'N') {
        return None;
    }
    i += 1;

    // price and change share one run of number characters
    let run_start = i;
    while i < chars.len() && is_number_char(chars[i]) {
        i += 1;
    }
    let run = &chars[run_start..i];

    // optional whitespace, then '%'
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    if chars.get(i) != Some(&'%') {
        return None;
    }
    let end = i + 1;

    let (price, change) = split_price_change(run)?;
    Some((
        RawQuote {
            symbol,
            price,
            change,
        },
        end,
    ))
}

/// Split `168.600.00` into (`168.600`, `.00`)
fn split_price_change(run: &[char]) -> Option<(String, String)> {
    let mut i = 0;
    while i < run.len() && (run[i].is_ascii_digit() || run[i] == ',') {
        i += 1;
    }
    if i == 0 {
        return None;
    }
    if run.get(i) == Some(&'.') {
        i += 1;
        while i < run.len() && run[i].is_ascii_digit() {
            i += 1;
        }
    }

    let change = &run[i..];
    if change.contains(&',') {
        return None;
    }

    Some((run[..i].iter().collect(), change.iter().collect()))
}
