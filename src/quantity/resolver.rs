//! Free-form quantity parsing
//!
//! "150g", "2 cups", "1 1/2 tbsp", "½ katori", "3 idli" all resolve to a
//! [`Quantity`] in grams, millilitres or pieces.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::units::{classify, QuantityUnit};
use crate::error::ParseError;

/// A parsed amount normalized to its base unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Amount in grams, millilitres or pieces depending on `unit`
    pub amount: f64,
    pub unit: QuantityUnit,
    /// False when the unit token was not in the vocabulary and the amount
    /// fell back to a piece count.
    pub unit_recognized: bool,
}

impl Quantity {
    pub fn new(amount: f64, unit: QuantityUnit) -> Self {
        Self {
            amount,
            unit,
            unit_recognized: true,
        }
    }

    pub fn grams(amount: f64) -> Self {
        Self::new(amount, QuantityUnit::Mass)
    }

    pub fn millilitres(amount: f64) -> Self {
        Self::new(amount, QuantityUnit::Volume)
    }

    pub fn pieces(amount: f64) -> Self {
        Self::new(amount, QuantityUnit::Count)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = (self.amount * 10.0).round() / 10.0;
        match self.unit {
            QuantityUnit::Count if (amount - 1.0).abs() < f64::EPSILON => write!(f, "1 piece"),
            QuantityUnit::Count => write!(f, "{} pieces", amount),
            unit => write!(f, "{} {}", amount, unit.symbol()),
        }
    }
}

/// Parse a quantity string.
///
/// Unknown unit words are accepted and counted as pieces with
/// `unit_recognized == false`; a bare number is a piece count.
pub fn resolve(input: &str) -> Result<Quantity, ParseError> {
    let (amount, rest) = split_amount(input)?;
    if !amount.is_finite() {
        return Err(ParseError::InvalidAmount(input.trim().to_string()));
    }

    let words: Vec<String> = rest
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return Ok(Quantity::pieces(amount));
    }

    match match_unit(&words) {
        Some((unit, factor)) => Ok(Quantity::new(amount * factor, unit)),
        None => {
            tracing::debug!(
                "Unrecognized unit '{}' in '{}', counting as pieces",
                words[0],
                input.trim()
            );
            Ok(Quantity {
                amount,
                unit: QuantityUnit::Count,
                unit_recognized: false,
            })
        }
    }
}

/// Two-word units ("fl oz") win over their first word.
fn match_unit(words: &[String]) -> Option<(QuantityUnit, f64)> {
    if words.len() >= 2 {
        if let Some(found) = classify(&format!("{} {}", words[0], words[1])) {
            return Some(found);
        }
    }
    classify(&words[0])
}

/// Split a leading numeric literal from the rest of the string.
fn split_amount(input: &str) -> Result<(f64, &str), ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Some(unsigned) = trimmed.strip_prefix('-') {
        let (digits, _) = leading_number(unsigned.trim_start());
        if digits.is_empty() {
            return Err(ParseError::NoAmount(trimmed.to_string()));
        }
        return Err(ParseError::Negative(trimmed.to_string()));
    }

    let (whole, rest) = leading_number(trimmed);
    if whole.is_empty() {
        let mut chars = trimmed.chars();
        return match chars.next().and_then(vulgar_fraction) {
            Some(fraction) => Ok((fraction, chars.as_str())),
            None => Err(ParseError::NoAmount(trimmed.to_string())),
        };
    }

    let amount = parse_literal(trimmed, whole)?;

    // "1/2"
    if let Some(after_slash) = rest.strip_prefix('/') {
        let (denominator, tail) = leading_number(after_slash);
        if denominator.is_empty() {
            return Err(ParseError::InvalidAmount(trimmed.to_string()));
        }
        let denominator = parse_literal(trimmed, denominator)?;
        if denominator == 0.0 {
            return Err(ParseError::InvalidAmount(trimmed.to_string()));
        }
        return Ok((amount / denominator, tail));
    }

    // "1½"
    let mut chars = rest.chars();
    if let Some(fraction) = chars.next().and_then(vulgar_fraction) {
        return Ok((amount + fraction, chars.as_str()));
    }

    // "1 1/2" or "1 ½"
    if let Some((fraction, tail)) = mixed_fraction(rest) {
        return Ok((amount + fraction, tail));
    }

    Ok((amount, rest))
}

/// Digits with optional `.` and `,` separators. A trailing comma is left
/// in the rest ("2, chopped").
fn leading_number(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == ','))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let literal = s[..end].trim_end_matches(',');
    s.split_at(literal.len())
}

/// Parse a numeric literal, accepting commas only as thousands separators
fn parse_literal(input: &str, literal: &str) -> Result<f64, ParseError> {
    let invalid = || ParseError::InvalidAmount(input.to_string());
    if !literal.contains(',') {
        return literal.parse::<f64>().map_err(|_| invalid());
    }

    let (integer, fraction) = literal.split_once('.').unwrap_or((literal, ""));
    let mut groups = integer.split(',');
    let leading = groups.next().unwrap_or_default();
    let grouped = !leading.is_empty()
        && leading.len() <= 3
        && groups.all(|g| g.len() == 3)
        && !fraction.contains(',');
    if !grouped {
        return Err(invalid());
    }
    literal.replace(',', "").parse::<f64>().map_err(|_| invalid())
}

fn mixed_fraction(rest: &str) -> Option<(f64, &str)> {
    let candidate = rest.trim_start();
    if candidate.len() == rest.len() {
        return None;
    }

    let mut chars = candidate.chars();
    if let Some(fraction) = chars.next().and_then(vulgar_fraction) {
        return Some((fraction, chars.as_str()));
    }

    let (numerator, after) = leading_number(candidate);
    let after_slash = after.strip_prefix('/')?;
    let (denominator, tail) = leading_number(after_slash);
    let numerator: f64 = numerator.parse().ok()?;
    let denominator: f64 = denominator.parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some((numerator / denominator, tail))
}

fn vulgar_fraction(c: char) -> Option<f64> {
    match c {
        '½' => Some(0.5),
        '⅓' => Some(1.0 / 3.0),
        '⅔' => Some(2.0 / 3.0),
        '¼' => Some(0.25),
        '¾' => Some(0.75),
        '⅛' => Some(0.125),
        _ => None,
    }
}
