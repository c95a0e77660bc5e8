use std::{future::IntoFuture, io};

/// Drives the plain and TLS listeners together. The first listener to fail
/// ends the wait with its error; a clean shutdown waits for both.
pub async fn run_listeners<P, S>(plain: P, secure: S) -> io::Result<()>
where
    P: IntoFuture<Output = io::Result<()>>,
    S: IntoFuture<Output = io::Result<()>>,
{
    tokio::try_join!(plain.into_future(), secure.into_future()).map(|_| ())
}
