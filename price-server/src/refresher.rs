use crate::config::WORKER_TICK;
use crate::manager::{CatalogManager, RefreshSummary};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Результат обновления, который получают все ждавшие его сессии
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RefreshOutcome {
    Updated(RefreshSummary),
    Failed(String),
}

type Waiter = Sender<RefreshOutcome>;

/// Очередь запросов на обновление прайса с единственным исполнителем.
///
/// Запросы, накопившиеся пока идёт сборка, склеиваются в одну следующую
/// сборку: десять `/update` подряд не дают десять скачиваний.
#[derive(Clone)]
pub(crate) struct RefreshQueue {
    tx: Sender<Waiter>,
}

impl RefreshQueue {
    /// Поставить запрос в очередь; ответ придёт в возвращённый канал
    pub(crate) fn submit(&self) -> Receiver<RefreshOutcome> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        if self.tx.send(reply_tx).is_err() {
            warn!("refresh worker is gone; request dropped");
        }
        reply_rx
    }

    /// Поставить запрос и ждать результат не дольше `wait`
    pub(crate) fn request(&self, wait: Duration) -> Option<RefreshOutcome> {
        match self.submit().recv_timeout(wait) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => {
                warn!("refresh did not finish in {wait:?}");
                None
            }
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

pub(crate) fn spawn_refresh_worker(
    manager: Arc<CatalogManager>,
    shutdown: Arc<AtomicBool>,
) -> (RefreshQueue, thread::JoinHandle<()>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let h = thread::spawn(move || run_refresh_worker(manager, rx, shutdown));
    (RefreshQueue { tx }, h)
}

fn run_refresh_worker(
    manager: Arc<CatalogManager>,
    rx: Receiver<Waiter>,
    shutdown: Arc<AtomicBool>,
) {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("shutting down refresh worker");
            break;
        }

        let first = match rx.recv_timeout(WORKER_TICK) {
            Ok(w) => w,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        // всё, что пришло к этому моменту, обслужим одной сборкой
        let mut waiters = vec![first];
        waiters.extend(rx.try_iter());
        debug!("refresh requested by {} session(s)", waiters.len());

        let outcome = match manager.refresh() {
            Ok(summary) => RefreshOutcome::Updated(summary),
            Err(e) => {
                warn!("catalog refresh failed: {e}");
                RefreshOutcome::Failed(e.to_string())
            }
        };

        for w in waiters {
            // сессия могла уже уйти по таймауту
            let _ = w.send(outcome.clone());
        }
    }
}
