use tokio::sync::watch;

/// Resolves once `true` is published on `shutdown`.
///
/// A dropped sender can no longer request shutdown, so in that case this
/// never resolves.
pub async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
