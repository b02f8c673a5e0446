pub(crate) mod import;
pub(crate) mod serve;
pub(crate) mod stats;

use std::path::Path;
use std::process;

use scholar_storage::MemoryStore;

use crate::{report_error, OutputFormat};

/// Open an existing data file, or exit with an error.
pub(crate) async fn open_existing(data: &Path, output: OutputFormat, quiet: bool) -> MemoryStore {
    if !data.exists() {
        report_error(
            &format!("error: data file '{}' does not exist", data.display()),
            output,
            quiet,
        );
        process::exit(1);
    }
    open(data, output, quiet).await
}

/// Open a data file, creating it on first write, or exit with an error.
pub(crate) async fn open(data: &Path, output: OutputFormat, quiet: bool) -> MemoryStore {
    match MemoryStore::open(data).await {
        Ok(store) => store,
        Err(e) => {
            report_error(
                &format!("error opening data file '{}': {}", data.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    }
}
