use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Identifiers of the rate sources the toolkit knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Central Bank of Russia daily archive.
    Cbr,
    /// Deterministic offline source.
    Synthetic,
}

impl ProviderId {
    pub const ALL: [Self; 2] = [Self::Cbr, Self::Synthetic];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cbr => "cbr",
            Self::Synthetic => "synthetic",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cbr" => Ok(Self::Cbr),
            "synthetic" => Ok(Self::Synthetic),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}
