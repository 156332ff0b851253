// crates/splicer-media/src/worker.rs
//
// MediaWorker: spawns probe and combine threads and funnels their results
// into one channel. All public API that splicer-ui calls lives here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use uuid::Uuid;

use splicer_core::media_types::MediaResult;

use crate::encode::{combine, CombineSpec};
use crate::probe::probe_clip;

/// Probes running at once. Probing only reads headers, but a folder of
/// clips dropped in at once would otherwise open every file simultaneously.
const PROBE_CONCURRENCY: u32 = 4;

/// Counting semaphore: (active_count, Condvar).
type Semaphore = Arc<(Mutex<u32>, Condvar)>;

struct SemGuard(Semaphore);

impl SemGuard {
    fn acquire(sem: Semaphore) -> Self {
        {
            let (lock, cvar) = &*sem;
            let mut count = lock.lock();
            while *count >= PROBE_CONCURRENCY {
                cvar.wait(&mut count);
            }
            *count += 1;
        }
        Self(sem)
    }
}

impl Drop for SemGuard {
    fn drop(&mut self) {
        let (lock, cvar) = &*self.0;
        *lock.lock() -= 1;
        cvar.notify_one();
    }
}

pub struct MediaWorker {
    /// Shared result channel: probe results and combine progress.
    pub rx:    Receiver<MediaResult>,
    tx:        Sender<MediaResult>,
    shutdown:  Arc<AtomicBool>,
    probe_sem: Semaphore,
    /// Per-job cancel flags. Inserted by start_combine, removed when the job
    /// thread exits.
    combine_cancels: Arc<Mutex<HashMap<Uuid, Arc<AtomicBool>>>>,
}

impl Default for MediaWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaWorker {
    pub fn new() -> Self {
        let (tx, rx) = bounded(512);
        Self {
            rx,
            tx,
            shutdown:        Arc::new(AtomicBool::new(false)),
            probe_sem:       Arc::new((Mutex::new(0), Condvar::new())),
            combine_cancels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Cancel every running job and refuse new ones.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for flag in self.combine_cancels.lock().values() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Probe `path` in the background; answers with ClipProbed or ProbeFailed.
    pub fn probe(&self, id: Uuid, path: PathBuf) {
        let tx  = self.tx.clone();
        let sd  = self.shutdown.clone();
        let sem = self.probe_sem.clone();

        thread::spawn(move || {
            let _guard = SemGuard::acquire(sem);
            if sd.load(Ordering::Relaxed) { return; }

            let result = match probe_clip(&path) {
                Ok(info) => MediaResult::ClipProbed { id, info },
                Err(e) => {
                    log::warn!("[worker] probe failed for {}: {e}", path.display());
                    MediaResult::ProbeFailed { id, msg: e.to_string() }
                }
            };
            let _ = tx.send(result);
        });
    }

    /// Spawn a background thread that combines `spec` to disk.
    pub fn start_combine(&self, spec: CombineSpec) {
        let job_id = spec.job_id;
        let cancel = Arc::new(AtomicBool::new(false));
        let tx     = self.tx.clone();
        let sd     = self.shutdown.clone();

        // Register before spawning so an immediate cancel always finds the flag.
        self.combine_cancels.lock().insert(job_id, Arc::clone(&cancel));

        let cancels = Arc::clone(&self.combine_cancels);
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) {
                let _ = tx.send(MediaResult::CombineError {
                    job_id,
                    msg:       "worker shutting down".into(),
                    cancelled: true,
                });
            } else {
                combine(spec, cancel, tx);
            }
            cancels.lock().remove(&job_id);
        });
    }

    /// Ask the job to stop. It finishes its current frame, deletes the partial
    /// output, and reports `CombineError { cancelled: true }`.
    pub fn cancel_combine(&self, job_id: Uuid) {
        if let Some(flag) = self.combine_cancels.lock().get(&job_id) {
            log::info!("[worker] cancelling combine {job_id}");
            flag.store(true, Ordering::Relaxed);
        }
    }
}
