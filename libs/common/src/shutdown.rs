//! Process termination signals

use std::fmt;

use tracing::warn;

/// Signal that ended the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

async fn interrupt() -> ShutdownSignal {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    ShutdownSignal::Interrupt
}

#[cfg(unix)]
async fn terminate() -> ShutdownSignal {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sig) => {
            sig.recv().await;
        },
        Err(e) => {
            warn!("Cannot install SIGTERM handler, only Ctrl+C stops the service: {}", e);
            std::future::pending::<()>().await;
        },
    }
    ShutdownSignal::Terminate
}

#[cfg(not(unix))]
async fn terminate() -> ShutdownSignal {
    std::future::pending().await
}

/// Resolve on the first SIGINT or SIGTERM
///
/// ```ignore
/// tokio::select! {
///     signal = common::shutdown::wait_for_shutdown() => info!("{} received", signal),
///     _ = handle.join() => {},
/// }
/// ```
pub async fn wait_for_shutdown() -> ShutdownSignal {
    tokio::select! {
        signal = interrupt() => signal,
        signal = terminate() => signal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_names() {
        assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM");
    }
}
