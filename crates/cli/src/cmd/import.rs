use std::path::Path;
use std::process;
use std::sync::Arc;

use scholar_core::NewStudent;
use scholar_service::MutationService;
use scholar_storage::RecordStore;

use crate::{report_error, runtime, OutputFormat};

/// Bulk-create students from a JSON array file into `data`.
///
/// Invalid rows are reported and skipped; the exit code is 1 if any row
/// failed.
pub(crate) fn cmd_import_students(file: &Path, data: &Path, output: OutputFormat, quiet: bool) {
    let text = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            report_error(
                &format!("error reading file '{}': {}", file.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    };
    let rows: Vec<NewStudent> = match serde_json::from_str(&text) {
        Ok(rows) => rows,
        Err(e) => {
            report_error(
                &format!("error parsing JSON in '{}': {}", file.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    };

    let rt = runtime(output, quiet);
    let report = rt.block_on(async {
        let store: Arc<dyn RecordStore> = Arc::new(super::open(data, output, quiet).await);
        MutationService::new(store).import_students(rows).await
    });
    let report = match report {
        Ok(r) => r,
        Err(e) => {
            report_error(&format!("import aborted: {e}"), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => {
            let failures: Vec<serde_json::Value> = report
                .failures
                .iter()
                .map(|f| serde_json::json!({ "row": f.row, "error": f.error.to_string() }))
                .collect();
            let result = serde_json::json!({
                "created": report.created.len(),
                "failures": failures,
            });
            println!("{}", result);
        }
        OutputFormat::Text => {
            if !quiet {
                println!("Imported {} student(s)", report.created.len());
                for f in &report.failures {
                    eprintln!("  row {}: {}", f.row, f.error);
                }
            }
        }
    }

    if !report.failures.is_empty() {
        process::exit(1);
    }
}
