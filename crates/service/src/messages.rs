//! User-facing text. Bengali is the default locale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Bn,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bn" => Ok(Locale::Bn),
            "en" => Ok(Locale::En),
            other => Err(format!("unknown locale '{other}': expected 'bn' or 'en'")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Locale::Bn => "bn",
            Locale::En => "en",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    ResultCreated,
    ResultUpdated,
    ResultDeleted,
    StudentCreated,
    StudentUpdated,
    StudentDeleted,
    ResultNotFound,
    StudentNotFound,
    DuplicateResult,
    RouteNotFound,
    InvalidBody,
    MissingApiKey,
    InvalidApiKey,
    ServerError,
}

impl Message {
    pub fn text(self, locale: Locale) -> &'static str {
        use Message::*;
        match locale {
            Locale::Bn => match self {
                ResultCreated => "ফলাফল সফলভাবে যুক্ত হয়েছে",
                ResultUpdated => "ফলাফল সফলভাবে আপডেট হয়েছে",
                ResultDeleted => "ফলাফল সফলভাবে মুছে ফেলা হয়েছে",
                StudentCreated => "শিক্ষার্থী সফলভাবে যুক্ত হয়েছে",
                StudentUpdated => "শিক্ষার্থী সফলভাবে আপডেট হয়েছে",
                StudentDeleted => "শিক্ষার্থী সফলভাবে মুছে ফেলা হয়েছে",
                ResultNotFound => "ফলাফল পাওয়া যায়নি",
                StudentNotFound => "শিক্ষার্থী পাওয়া যায়নি",
                DuplicateResult => "এই শিক্ষার্থীর এই পরীক্ষার ফলাফল ইতিমধ্যে যুক্ত করা হয়েছে",
                RouteNotFound => "রুট পাওয়া যায়নি",
                InvalidBody => "অনুরোধের ডেটা সঠিক নয়",
                MissingApiKey => "অনুমোদন প্রয়োজন",
                InvalidApiKey => "API কী সঠিক নয়",
                ServerError => "Server Error",
            },
            Locale::En => match self {
                ResultCreated => "Result created successfully",
                ResultUpdated => "Result updated successfully",
                ResultDeleted => "Result deleted successfully",
                StudentCreated => "Student created successfully",
                StudentUpdated => "Student updated successfully",
                StudentDeleted => "Student deleted successfully",
                ResultNotFound => "Result not found",
                StudentNotFound => "Student not found",
                DuplicateResult => "A result for this student and exam already exists",
                RouteNotFound => "Route not found",
                InvalidBody => "Invalid request body",
                MissingApiKey => "Authentication required",
                InvalidApiKey => "Invalid API key",
                ServerError => "Server Error",
            },
        }
    }
}

impl Locale {
    fn field_label(self, field: &str) -> &str {
        match (self, field) {
            (Locale::Bn, "studentId") => "শিক্ষার্থী",
            (Locale::Bn, "studentName") => "শিক্ষার্থীর নাম",
            (Locale::Bn, "exam") => "পরীক্ষা",
            (Locale::Bn, "grade") => "গ্রেড",
            (Locale::Bn, "fullName") => "নাম",
            (Locale::Bn, "className") => "শ্রেণী",
            (Locale::En, "studentId") => "student",
            (Locale::En, "studentName") => "student name",
            (Locale::En, "exam") => "exam",
            (Locale::En, "grade") => "grade",
            (Locale::En, "fullName") => "full name",
            (Locale::En, "className") => "class",
            (_, other) => other,
        }
    }

    /// "a, b and c are required", in this locale.
    pub(crate) fn missing_fields(self, fields: &[&str]) -> String {
        let labels: Vec<&str> = fields.iter().map(|f| self.field_label(f)).collect();
        let (and, suffix) = match self {
            Locale::Bn => (" এবং ", " প্রয়োজন"),
            Locale::En if labels.len() == 1 => (" and ", " is required"),
            Locale::En => (" and ", " are required"),
        };
        let joined = match labels.split_last() {
            None => String::new(),
            Some((last, [])) => last.to_string(),
            Some((last, init)) => format!("{}{and}{last}", init.join(", ")),
        };
        let mut out = format!("{joined}{suffix}");
        if self == Locale::En {
            if let Some(first) = out.get(..1) {
                out = first.to_ascii_uppercase() + &out[1..];
            }
        }
        out
    }
}
