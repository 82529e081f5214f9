use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{error, info, warn, LevelFilter};
use log4rs_dynamic_filters::DynamicLevelFilter;
use reqwest::{Method, StatusCode};

/// Logging targets of the HTTP stack, silenced unless running verbosely.
const HTTP_TARGETS: [&str; 2] = ["reqwest", "hyper"];

/// A unique identifier for a particular outgoing request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Atomically get the next ID. This wraps around back to zero if you somehow exceed a usize.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Log an outgoing request.
    pub fn log_request(self, method: &Method, url: &str) {
        info!("->req{self} {method} {url}");
    }

    /// Log the response to a request, at a level matching its status class.
    pub fn log_response(self, status: StatusCode, url: &str) {
        let log_msg = format!("<-rsp{self} {status} {url}");
        if status.is_server_error() {
            error!("{log_msg}");
        } else if status.is_client_error() {
            warn!("{log_msg}");
        } else {
            info!("{log_msg}");
        }
    }
}

/// Initialise log4rs from a YAML config file.
///
/// The HTTP stack is quietened to `warn` unless `verbose` is set.
pub fn init(config_path: impl AsRef<Path>, verbose: bool) -> anyhow::Result<()> {
    log4rs::init_file(config_path, log4rs_dynamic_filters::default_deserializers())?;
    if !verbose {
        for target in HTTP_TARGETS {
            DynamicLevelFilter::set(target, LevelFilter::Warn);
        }
    }
    info!("Initialised logging");
    Ok(())
}
