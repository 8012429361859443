//! Background worker that drains the click queue.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::application::services::ClickIngestionService;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;

/// Consumes click events until every sender is dropped.
///
/// At most `concurrency` clicks are enriched and written at once. When the
/// channel closes, in-flight writes are awaited before returning, so a
/// graceful shutdown drains everything already queued.
pub async fn run_click_worker<C>(
    mut rx: mpsc::Receiver<ClickEvent>,
    ingestion: Arc<ClickIngestionService<C>>,
    concurrency: usize,
) where
    C: ClickRepository + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let ingestion = ingestion.clone();
        in_flight.spawn(async move {
            let link_id = event.link_id;
            match ingestion.ingest(event).await {
                Ok(click) => {
                    metrics::counter!("clicks_recorded_total").increment(1);
                    debug!(%link_id, click_id = click.id, is_bot = click.is_bot, "click recorded");
                }
                Err(e) => {
                    metrics::counter!("clicks_failed_total").increment(1);
                    error!(%link_id, error = %e, "click lost after retries");
                }
            }
            drop(permit);
        });

        // reap finished tasks so the set does not grow unbounded
        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}
    info!("Click worker stopped");
}
