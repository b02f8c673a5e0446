use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Class (programme) a student is enrolled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassName {
    MadaniFirst,
    MadaniSecond,
    HifzBeginner,
    HifzIntermediate,
    HifzAdvanced,
    Nazera,
    Qaida,
}

impl ClassName {
    pub const ALL: [ClassName; 7] = [
        ClassName::MadaniFirst,
        ClassName::MadaniSecond,
        ClassName::HifzBeginner,
        ClassName::HifzIntermediate,
        ClassName::HifzAdvanced,
        ClassName::Nazera,
        ClassName::Qaida,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ClassName::MadaniFirst => "madani-first",
            ClassName::MadaniSecond => "madani-second",
            ClassName::HifzBeginner => "hifz-beginner",
            ClassName::HifzIntermediate => "hifz-intermediate",
            ClassName::HifzAdvanced => "hifz-advanced",
            ClassName::Nazera => "nazera",
            ClassName::Qaida => "qaida",
        }
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ClassName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ClassName::ALL
            .into_iter()
            .find(|c| c.label() == trimmed)
            .ok_or_else(|| ValidationError::InvalidClassName(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_kebab_labels() {
        for c in ClassName::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.label()));
        }
    }

    #[test]
    fn from_str_trims_and_rejects_unknown() {
        assert_eq!(
            " hifz-advanced ".parse::<ClassName>().unwrap(),
            ClassName::HifzAdvanced
        );
        assert!(matches!(
            "grade-9".parse::<ClassName>(),
            Err(ValidationError::InvalidClassName(_))
        ));
    }
}
