use num_traits::{Bounded, CheckedAdd, CheckedSub, Num, NumCast};
use std::fmt::{Display, UpperHex};
use thiserror::Error;

const NODEID_TOKEN: &str = "$NODEID";

/// The integer types that can be decoded from a literal: `u8`, `u16`, `u32`, ...
pub trait IntegerLiteral: Num + Bounded + CheckedAdd + CheckedSub + NumCast + Copy {}

impl<T> IntegerLiteral for T where T: Num + Bounded + CheckedAdd + CheckedSub + NumCast + Copy {}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LiteralError {
    /// `InvalidInteger`: the literal contains invalid digits or does not fit into the target type
    #[error("\"{literal}\" is not a valid {width} value")]
    InvalidInteger { literal: String, width: &'static str },

    /// `UnresolvedNodeId`: a $NODEID formula was found, but no node id is known
    #[error("Cannot evaluate $NODEID formula \"{formula}\": no node id is available")]
    UnresolvedNodeId { formula: String },

    /// `InvalidFormula`: the text following $NODEID is not a single `+` or `-` operation
    #[error("Invalid $NODEID formula \"{formula}\"")]
    InvalidFormula { formula: String },
}

/// Access rights of an object or sub-object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AccessType {
    #[default]
    ReadOnly,
    WriteOnly,
    ReadWrite,
    /// read-write, mappable into a process input (TPDO)
    ReadWriteInput,
    /// read-write, mappable into a process output (RPDO)
    ReadWriteOutput,
    Constant,
}

impl AccessType {
    /// look up the access type for one of the tokens `ro`, `wo`, `rw`, `rwr`, `rww` or `const`
    ///
    /// The comparison is case-insensitive. Returns `None` if the token is not known.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        [
            AccessType::ReadOnly,
            AccessType::WriteOnly,
            AccessType::ReadWrite,
            AccessType::ReadWriteInput,
            AccessType::ReadWriteOutput,
            AccessType::Constant,
        ]
        .into_iter()
        .find(|access| access.token().eq_ignore_ascii_case(token))
    }

    /// the token that represents this access type in a file
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            AccessType::ReadOnly => "ro",
            AccessType::WriteOnly => "wo",
            AccessType::ReadWrite => "rw",
            AccessType::ReadWriteInput => "rwr",
            AccessType::ReadWriteOutput => "rww",
            AccessType::Constant => "const",
        }
    }

    /// can the value be read over the bus
    #[must_use]
    pub fn is_readable(self) -> bool {
        self != AccessType::WriteOnly
    }

    /// can the value be written over the bus
    #[must_use]
    pub fn is_writable(self) -> bool {
        matches!(
            self,
            AccessType::WriteOnly
                | AccessType::ReadWrite
                | AccessType::ReadWriteInput
                | AccessType::ReadWriteOutput
        )
    }
}

impl Display for AccessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/**
Decode an unsigned integer literal

The literal is trimmed and then decoded in this order:
- an empty string is 0
- `$NODEID`, optionally followed by `+<literal>` or `-<literal>`, is evaluated using `node_id`
- a `0x` prefix marks a hexadecimal number
- a leading `0` followed by another digit marks an octal number
- everything else is decimal

```rust
# use edsfile::parse_integer;
assert_eq!(parse_integer::<u8>("0x1A", None), Ok(26));
assert_eq!(parse_integer::<u16>("0377", None), Ok(255));
assert_eq!(parse_integer::<u32>("$NODEID+0x200", Some(5)), Ok(517));
```

# Errors

[`LiteralError::InvalidInteger`] if the digits are invalid or the value does not fit into `T`,
[`LiteralError::UnresolvedNodeId`] if a `$NODEID` formula is found while `node_id` is `None`,
[`LiteralError::InvalidFormula`] if the formula has more than one operation.
 */
pub fn parse_integer<T: IntegerLiteral>(text: &str, node_id: Option<u8>) -> Result<T, LiteralError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(T::zero());
    }

    if let Some(operation) = strip_node_id_token(text) {
        return evaluate_node_id_formula(text, operation, node_id);
    }

    parse_plain_integer(text)
}

/// check if a literal is a `$NODEID` formula
#[must_use]
pub fn is_node_id_formula(text: &str) -> bool {
    strip_node_id_token(text.trim()).is_some()
}

/// Decode a boolean literal
///
/// `1`, `true` and `yes` are true, ignoring case. Everything else is false.
#[must_use]
pub fn parse_bool(text: &str) -> bool {
    let text = text.trim();
    text == "1" || text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("yes")
}

/// Decode an access type; unknown tokens are treated as read-only
#[must_use]
pub fn parse_access_type(text: &str) -> AccessType {
    AccessType::from_token(text).unwrap_or_default()
}

/// format an integer the way it is usually written in EDS files: `0x` followed by uppercase hex digits
pub fn format_hex<T: UpperHex>(value: T) -> String {
    format!("0x{value:X}")
}

/// format a boolean as `0` or `1`
#[must_use]
pub fn format_bool(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

// strip_node_id_token()
// case-insensitive check for the leading $NODEID, returning the remaining text
fn strip_node_id_token(text: &str) -> Option<&str> {
    let prefix = text.get(..NODEID_TOKEN.len())?;
    if prefix.eq_ignore_ascii_case(NODEID_TOKEN) {
        Some(&text[NODEID_TOKEN.len()..])
    } else {
        None
    }
}

// evaluate_node_id_formula()
// $NODEID may only be followed by a single operation
fn evaluate_node_id_formula<T: IntegerLiteral>(
    formula: &str,
    operation: &str,
    node_id: Option<u8>,
) -> Result<T, LiteralError> {
    let invalid_formula = || LiteralError::InvalidFormula {
        formula: formula.to_string(),
    };

    let operation = operation.trim();
    let (operator, operand) = match operation.chars().next() {
        None => (None, ""),
        Some(op @ ('+' | '-')) => (Some(op), operation[1..].trim()),
        Some(_) => return Err(invalid_formula()),
    };
    if operator.is_some() && (operand.is_empty() || operand.contains(['+', '-'])) {
        return Err(invalid_formula());
    }

    let Some(node_id) = node_id else {
        return Err(LiteralError::UnresolvedNodeId {
            formula: formula.to_string(),
        });
    };
    let overflow = || LiteralError::InvalidInteger {
        literal: formula.to_string(),
        width: std::any::type_name::<T>(),
    };
    let base: T = NumCast::from(node_id).ok_or_else(overflow)?;

    match operator {
        Some('+') => {
            let offset: T = parse_plain_integer(operand)?;
            base.checked_add(&offset).ok_or_else(overflow)
        }
        Some(_) => {
            let offset: T = parse_plain_integer(operand)?;
            base.checked_sub(&offset).ok_or_else(overflow)
        }
        None => Ok(base),
    }
}

// parse_plain_integer()
// hex, octal or decimal digits without any formula
fn parse_plain_integer<T: Num>(text: &str) -> Result<T, LiteralError> {
    let (digits, radix) = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        (hex, 16)
    } else if text.len() > 1
        && text.starts_with('0')
        && text.as_bytes()[1].is_ascii_digit()
    {
        (&text[1..], 8)
    } else {
        (text, 10)
    };

    // from_str_radix accepts a leading sign, which is not valid here
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(LiteralError::InvalidInteger {
            literal: text.to_string(),
            width: std::any::type_name::<T>(),
        });
    }

    T::from_str_radix(digits, radix).map_err(|_| LiteralError::InvalidInteger {
        literal: text.to_string(),
        width: std::any::type_name::<T>(),
    })
}
