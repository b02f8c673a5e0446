use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Letter grade of a single result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl Grade {
    /// Every grade, best first.
    pub const ALL: [Grade; 11] = [
        Grade::APlus,
        Grade::A,
        Grade::AMinus,
        Grade::BPlus,
        Grade::B,
        Grade::BMinus,
        Grade::CPlus,
        Grade::C,
        Grade::CMinus,
        Grade::D,
        Grade::F,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    /// Everything except `D` and `F` counts as a pass.
    pub fn is_passing(self) -> bool {
        !matches!(self, Grade::D | Grade::F)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Grade {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Grade::ALL
            .into_iter()
            .find(|g| g.label() == trimmed)
            .ok_or_else(|| ValidationError::InvalidGrade(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_label() {
        for g in Grade::ALL {
            assert_eq!(g.label().parse::<Grade>().unwrap(), g);
        }
    }

    #[test]
    fn rejects_unknown_label() {
        assert_eq!(
            "E".parse::<Grade>(),
            Err(ValidationError::InvalidGrade("E".to_string()))
        );
        assert!("a+".parse::<Grade>().is_err());
    }

    #[test]
    fn only_d_and_f_fail() {
        let failing: Vec<Grade> = Grade::ALL.into_iter().filter(|g| !g.is_passing()).collect();
        assert_eq!(failing, vec![Grade::D, Grade::F]);
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(serde_json::to_string(&Grade::BMinus).unwrap(), "\"B-\"");
        let g: Grade = serde_json::from_str("\"C+\"").unwrap();
        assert_eq!(g, Grade::CPlus);
    }
}
