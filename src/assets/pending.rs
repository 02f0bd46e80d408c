use crate::assets::AssetSource;
use crate::error::{SceneError, SceneResult};
use crate::model::{self, LoadedModel};
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

/// A model load running on a worker thread.
///
/// The loop thread polls it once per frame; the result is delivered exactly
/// once. With a timeout set, a load that has not finished in time resolves to
/// [`SceneError::LoadTimedOut`] and its eventual result is discarded.
pub struct PendingModel {
    resource: String,
    rx: Receiver<SceneResult<LoadedModel>>,
    started: Instant,
    timeout: Option<Duration>,
    done: bool,
}

impl PendingModel {
    pub fn spawn(source: Arc<dyn AssetSource>, path: &str, timeout: Option<Duration>) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let resource = path.to_string();
        let worker_path = resource.clone();
        thread::spawn(move || {
            let _ = tx.send(model::load_model(source.as_ref(), &worker_path));
        });

        log::info!("loading {resource}");
        Self {
            resource,
            rx,
            started: Instant::now(),
            timeout,
            done: false,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Returns the result the first time it is available, `None` otherwise.
    pub fn poll(&mut self) -> Option<SceneResult<LoadedModel>> {
        if self.done {
            return None;
        }

        let result = match self.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Disconnected) => Err(self.worker_lost()),
            Err(TryRecvError::Empty) => match self.timeout {
                Some(timeout) if self.started.elapsed() >= timeout => Err(self.timed_out(timeout)),
                _ => return None,
            },
        };
        self.done = true;
        Some(result)
    }

    /// Blocks until the load finishes or the timeout runs out.
    pub fn wait(mut self) -> SceneResult<LoadedModel> {
        if self.done {
            return Err(SceneError::resource_load(&self.resource, "result already taken"));
        }
        self.done = true;

        match self.timeout {
            Some(timeout) => {
                let remaining = timeout.saturating_sub(self.started.elapsed());
                match self.rx.recv_timeout(remaining) {
                    Ok(result) => result,
                    Err(RecvTimeoutError::Timeout) => Err(self.timed_out(timeout)),
                    Err(RecvTimeoutError::Disconnected) => Err(self.worker_lost()),
                }
            }
            None => self.rx.recv().unwrap_or_else(|_| Err(self.worker_lost())),
        }
    }

    fn timed_out(&self, timeout: Duration) -> SceneError {
        log::error!("{} did not load within {timeout:?}", self.resource);
        SceneError::LoadTimedOut {
            resource: self.resource.clone(),
            seconds: timeout.as_secs_f32(),
        }
    }

    fn worker_lost(&self) -> SceneError {
        SceneError::resource_load(&self.resource, "loader thread exited without a result")
    }
}
