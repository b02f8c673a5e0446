use std::path::Path;
use std::process;
use std::sync::Arc;

use scholar_service::QueryService;
use scholar_storage::RecordStore;

use crate::{report_error, runtime, OutputFormat};

/// Print the statistics object for `data` as pretty JSON on stdout.
pub(crate) fn cmd_stats(
    data: &Path,
    class_name: Option<String>,
    exam: Option<String>,
    output: OutputFormat,
    quiet: bool,
) {
    let rt = runtime(output, quiet);
    let stats = rt.block_on(async {
        let store: Arc<dyn RecordStore> = Arc::new(super::open_existing(data, output, quiet).await);
        QueryService::new(store).statistics(class_name, exam).await
    });

    let stats = match stats {
        Ok(s) => s,
        Err(e) => {
            report_error(&format!("error computing statistics: {e}"), output, quiet);
            process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&stats) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            report_error(&format!("error serializing statistics: {e}"), output, quiet);
            process::exit(1);
        }
    }
}
