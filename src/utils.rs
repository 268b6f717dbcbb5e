use anyhow::{bail, Result};
use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::info;

/// Polls `check` until it reports `true`, sleeping on a Fibonacci schedule
/// between polls.
///
/// An error from `check` ends the wait immediately. Gives up after
/// `max_polls` negative answers.
pub async fn wait_until<F, Fut>(check: F, initial_delay: Duration, max_polls: usize) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let mut polls = 0;
    let mut fib = (initial_delay, initial_delay);

    loop {
        if check().await? {
            return Ok(());
        }
        if polls >= max_polls {
            bail!("condition not met after {max_polls} polls");
        }
        polls += 1;
        info!(
            "Not ready yet. Checking again in {:?} (poll {}/{})",
            fib.0, polls, max_polls
        );
        sleep(fib.0).await;
        fib = (fib.1, fib.0 + fib.1);
    }
}
