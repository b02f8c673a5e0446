use std::path::PathBuf;
use std::process;

use scholar_server::ServerConfig;

use crate::{report_error, runtime, OutputFormat};

/// Flags that override the config file and environment.
pub(crate) struct ServeFlags {
    pub(crate) config: Option<PathBuf>,
    pub(crate) port: Option<u16>,
    pub(crate) data: Option<PathBuf>,
    pub(crate) tls_cert: Option<PathBuf>,
    pub(crate) tls_key: Option<PathBuf>,
}

impl ServeFlags {
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(data) = self.data {
            config.data_file = Some(data);
        }
        if self.tls_cert.is_some() {
            config.tls_cert = self.tls_cert;
            config.tls_key = self.tls_key;
        }
        config
    }
}

pub(crate) fn cmd_serve(flags: ServeFlags, output: OutputFormat, quiet: bool) {
    let config = match ServerConfig::load(flags.config.as_deref()) {
        Ok(c) => flags.apply(c),
        Err(e) => {
            report_error(&format!("error: {e}"), output, quiet);
            process::exit(1);
        }
    };
    tracing::debug!(
        port = config.port,
        data_file = ?config.data_file,
        locale = %config.locale,
        "resolved server configuration"
    );

    let rt = runtime(output, quiet);
    if let Err(e) = rt.block_on(scholar_server::start_server(config)) {
        report_error(&format!("Server error: {e}"), output, quiet);
        process::exit(1);
    }
}
