//! Grade distribution and pass/fail aggregation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::class_name::ClassName;
use crate::grade::Grade;
use crate::record::ResultRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCount {
    pub grade: Grade,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStats {
    pub class_name: ClassName,
    pub count: u64,
    /// Mean over the results that carry marks; `None` when none do.
    pub avg_marks: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_results: u64,
    pub passed: u64,
    pub failed: u64,
    pub pass_percentage: f64,
    /// Grades present in the input, ordered by ascending label.
    pub grade_distribution: Vec<GradeCount>,
    /// Classes present in the input, ordered by ascending label.
    pub classwise_stats: Vec<ClassStats>,
}

/// `passed / total * 100` rounded to two decimals; `0` for an empty set.
pub fn pass_percentage(passed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = passed as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

#[derive(Default)]
struct ClassAcc {
    count: u64,
    marks_sum: f64,
    marks_n: u64,
}

impl Statistics {
    /// Aggregate an already-filtered set of results.
    pub fn compute<'a, S: 'a>(records: impl IntoIterator<Item = &'a ResultRecord<S>>) -> Self {
        let mut total = 0u64;
        let mut passed = 0u64;
        let mut grades: BTreeMap<&'static str, (Grade, u64)> = BTreeMap::new();
        let mut classes: BTreeMap<&'static str, (ClassName, ClassAcc)> = BTreeMap::new();

        for r in records {
            total += 1;
            if r.is_passed() {
                passed += 1;
            }
            grades.entry(r.grade.label()).or_insert((r.grade, 0)).1 += 1;

            let (_, acc) = classes
                .entry(r.class_name.label())
                .or_insert_with(|| (r.class_name, ClassAcc::default()));
            acc.count += 1;
            if let Some(m) = r.marks {
                acc.marks_sum += m;
                acc.marks_n += 1;
            }
        }

        Statistics {
            total_results: total,
            passed,
            failed: total - passed,
            pass_percentage: pass_percentage(passed, total),
            grade_distribution: grades
                .into_values()
                .map(|(grade, count)| GradeCount { grade, count })
                .collect(),
            classwise_stats: classes
                .into_values()
                .map(|(class_name, acc)| ClassStats {
                    class_name,
                    count: acc.count,
                    avg_marks: (acc.marks_n > 0).then(|| acc.marks_sum / acc.marks_n as f64),
                })
                .collect(),
        }
    }
}
