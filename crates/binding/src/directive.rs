//! Binding directives encoded in element ids.

use std::fmt;

/// How an element wants a measurement rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingDirective {
    /// `mi_<field>`: raw value
    Raw {
        /// Measurement name
        field: String,
    },
    /// `ms_<field>`: raw value, displayed as a string
    Text {
        /// Measurement name
        field: String,
    },
    /// `mf<d>_<field>`: numeric value with `precision` decimal places
    Fixed {
        /// Digits after the decimal point (0-9)
        precision: u8,
        /// Measurement name
        field: String,
    },
}

impl BindingDirective {
    /// Parse an element id.
    ///
    /// `m[is]_` is tried before `mf[0-9]_`, so an id selects at most one
    /// formatting path. Returns `None` for ids outside the naming scheme.
    pub fn parse(id: &str) -> Option<Self> {
        let bytes = id.as_bytes();

        if bytes.len() >= 3 && bytes[0] == b'm' && bytes[2] == b'_' {
            match bytes[1] {
                b'i' => {
                    return Some(Self::Raw {
                        field: id[3..].to_string(),
                    })
                }
                b's' => {
                    return Some(Self::Text {
                        field: id[3..].to_string(),
                    })
                }
                _ => {}
            }
        }

        if bytes.len() >= 4
            && bytes[0] == b'm'
            && bytes[1] == b'f'
            && bytes[2].is_ascii_digit()
            && bytes[3] == b'_'
        {
            return Some(Self::Fixed {
                precision: bytes[2] - b'0',
                field: id[4..].to_string(),
            });
        }

        None
    }

    /// Name of the measurement this directive reads.
    pub fn field(&self) -> &str {
        match self {
            Self::Raw { field } | Self::Text { field } | Self::Fixed { field, .. } => field,
        }
    }
}

impl fmt::Display for BindingDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw { field } => write!(f, "mi_{}", field),
            Self::Text { field } => write!(f, "ms_{}", field),
            Self::Fixed { precision, field } => write!(f, "mf{}_{}", precision, field),
        }
    }
}
