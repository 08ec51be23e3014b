//! Graceful shutdown.

use std::future::IntoFuture;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

/// How a server run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The server returned, after draining if a signal was received.
    Drained,
    /// Requests were still in flight when the grace period ran out.
    TimedOut,
}

/// Drive `server` to completion, giving up `grace` after `stopping` flips to true.
///
/// A dropped sender that never signalled sets no deadline.
pub async fn run_with_grace<F, E>(
    server: F,
    mut stopping: watch::Receiver<bool>,
    grace: Duration,
) -> Result<ShutdownOutcome, E>
where
    F: IntoFuture<Output = Result<(), E>>,
{
    let deadline = async move {
        if stopping.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server.into_future() => result.map(|()| ShutdownOutcome::Drained),
        _ = deadline => {
            warn!(
                grace_ms = grace.as_millis() as u64,
                "Shutdown grace period elapsed with requests in flight"
            );
            Ok(ShutdownOutcome::TimedOut)
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[tokio::test]
    async fn test_finished_server_is_drained() {
        let (_tx, rx) = watch::channel(false);
        let server = async { Ok::<(), io::Error>(()) };
        let outcome = run_with_grace(server, rx, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(outcome, ShutdownOutcome::Drained);
    }

    #[tokio::test]
    async fn test_stuck_server_times_out_after_signal() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let outcome = run_with_grace(
            std::future::pending::<Result<(), io::Error>>(),
            rx,
            Duration::from_millis(20),
        )
        .await
        .unwrap();
        assert_eq!(outcome, ShutdownOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_no_deadline_without_signal() {
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let server = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<(), io::Error>(())
        };
        let outcome = run_with_grace(server, rx, Duration::from_millis(1)).await.unwrap();
        assert_eq!(outcome, ShutdownOutcome::Drained);
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let (_tx, rx) = watch::channel(false);
        let server = async { Err::<(), _>(io::Error::new(io::ErrorKind::AddrInUse, "busy")) };
        let err = run_with_grace(server, rx, Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
    }
}
