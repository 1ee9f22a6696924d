//! Wire format selector
//!
//! Names accepted when parsing: `binary`/`bin` and `textual`/`text`/`json`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Byte-level encoding used by a converter.
///
/// Selection is always explicit; the format is never sniffed from payload
/// bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Compact varint binary encoding.
    #[default]
    Binary,
    /// Schema-checked JSON, meant for debugging and diagnostics.
    Textual,
}

impl WireFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Textual => "textual",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "bin" => Ok(Self::Binary),
            "textual" | "text" | "json" => Ok(Self::Textual),
            other => Err(format!("unknown wire format: {other}")),
        }
    }
}
