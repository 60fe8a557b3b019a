//! Per-field input validation.
//!
//! # Responsibility
//! - Decide whether one raw input line is acceptable for one field kind.
//! - Report a distinguishable rejection reason for user messaging.
//!
//! # Invariants
//! - Validation is stateless and never prints; callers own messaging.
//! - Optional kinds accept the literal `skip` and yield `None`.

use crate::model::person::{is_valid_name, EyeColor, HairColor, MIN_COORDINATE_Y_EXCLUSIVE};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Literal accepted by optional fields to leave them empty.
pub const SKIP_LITERAL: &str = "skip";

/// Field kinds read while building one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Name,
    Decimal,
    CoordinateY,
    Height,
    Date,
    EyeColor,
    HairColor,
    LocationX,
    LocationZ,
    LocationName,
}

impl FieldKind {
    /// Whether the literal `skip` is accepted for this kind.
    pub fn is_optional(self) -> bool {
        matches!(
            self,
            Self::Date | Self::EyeColor | Self::HairColor | Self::LocationX
        )
    }
}

/// Reason a raw field value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRejection {
    /// No token was given.
    Empty { optional: bool },
    /// More than one token was given.
    TooManyTokens,
    /// The token does not parse as the expected type.
    Malformed,
    /// The token parses but violates a range rule.
    OutOfRange,
    /// The token is not one of the enumerated values.
    UnknownVariant,
}

impl Display for FieldRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty { optional: true } => {
                write!(f, "value is empty; type '{SKIP_LITERAL}' to leave the field blank")
            }
            Self::Empty { optional: false } => write!(f, "value cannot be empty"),
            Self::TooManyTokens => write!(f, "enter exactly one value"),
            Self::Malformed => write!(f, "invalid format"),
            Self::OutOfRange => write!(f, "value is out of the allowed range"),
            Self::UnknownVariant => write!(f, "value is not in the list"),
        }
    }
}

impl Error for FieldRejection {}

/// Validates pre-split tokens for one field kind.
///
/// Returns the accepted raw token, or `None` when `skip` was accepted.
///
/// # Errors
/// - Returns the first rule the input violates.
pub fn validate(tokens: &[&str], kind: FieldKind) -> Result<Option<String>, FieldRejection> {
    let token = match tokens {
        [] => {
            return Err(FieldRejection::Empty {
                optional: kind.is_optional(),
            })
        }
        [token] => *token,
        _ => return Err(FieldRejection::TooManyTokens),
    };

    if kind.is_optional() && token == SKIP_LITERAL {
        return Ok(None);
    }

    match kind {
        FieldKind::Name | FieldKind::LocationName => {
            if !is_valid_name(token) {
                return Err(FieldRejection::Malformed);
            }
        }
        FieldKind::Decimal => {
            let value = token
                .parse::<f32>()
                .map_err(|_| FieldRejection::Malformed)?;
            if !value.is_finite() {
                return Err(FieldRejection::Malformed);
            }
        }
        FieldKind::CoordinateY => {
            let value = token
                .parse::<i64>()
                .map_err(|_| FieldRejection::Malformed)?;
            if value <= MIN_COORDINATE_Y_EXCLUSIVE {
                return Err(FieldRejection::OutOfRange);
            }
        }
        FieldKind::Height => {
            let value = token
                .parse::<i32>()
                .map_err(|_| FieldRejection::Malformed)?;
            if value <= 0 {
                return Err(FieldRejection::OutOfRange);
            }
        }
        FieldKind::Date => {
            token
                .parse::<NaiveDate>()
                .map_err(|_| FieldRejection::Malformed)?;
        }
        FieldKind::EyeColor => {
            EyeColor::parse(token).ok_or(FieldRejection::UnknownVariant)?;
        }
        FieldKind::HairColor => {
            HairColor::parse(token).ok_or(FieldRejection::UnknownVariant)?;
        }
        FieldKind::LocationX => {
            token
                .parse::<i64>()
                .map_err(|_| FieldRejection::Malformed)?;
        }
        FieldKind::LocationZ => {
            token
                .parse::<i32>()
                .map_err(|_| FieldRejection::Malformed)?;
        }
    }

    Ok(Some(token.to_string()))
}

/// Splits a raw line and validates it.
pub fn validate_line(line: &str, kind: FieldKind) -> Result<Option<String>, FieldRejection> {
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    validate(&tokens, kind)
}

/// Boolean form of `validate`.
pub fn is_valid(tokens: &[&str], kind: FieldKind) -> bool {
    validate(tokens, kind).is_ok()
}

#[cfg(test)]
mod tests {
    use super::{validate, validate_line, FieldKind, FieldRejection};

    #[test]
    fn skip_only_applies_to_optional_kinds() {
        assert_eq!(validate(&["skip"], FieldKind::Date), Ok(None));
        assert_eq!(validate(&["skip"], FieldKind::LocationX), Ok(None));
        assert_eq!(
            validate(&["skip"], FieldKind::LocationZ),
            Err(FieldRejection::Malformed)
        );
        // `skip` is a valid latin name, so it is kept as a value.
        assert_eq!(
            validate(&["skip"], FieldKind::Name),
            Ok(Some("skip".to_string()))
        );
    }

    #[test]
    fn empty_rejection_knows_whether_skip_is_allowed() {
        assert_eq!(
            validate_line("   ", FieldKind::HairColor),
            Err(FieldRejection::Empty { optional: true })
        );
        assert_eq!(
            validate_line("", FieldKind::Height),
            Err(FieldRejection::Empty { optional: false })
        );
        assert!(FieldRejection::Empty { optional: true }
            .to_string()
            .contains("skip"));
    }

    #[test]
    fn extra_whitespace_between_tokens_is_not_a_token() {
        assert_eq!(
            validate_line("  170  ", FieldKind::Height),
            Ok(Some("170".to_string()))
        );
        assert_eq!(
            validate_line("1 2", FieldKind::Height),
            Err(FieldRejection::TooManyTokens)
        );
    }

    #[test]
    fn decimal_rejects_non_finite_values() {
        assert_eq!(
            validate(&["NaN"], FieldKind::Decimal),
            Err(FieldRejection::Malformed)
        );
        assert_eq!(
            validate(&["inf"], FieldKind::Decimal),
            Err(FieldRejection::Malformed)
        );
        assert!(validate(&["-0.25"], FieldKind::Decimal).is_ok());
    }
}
