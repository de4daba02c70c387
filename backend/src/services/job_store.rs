use crate::models::{JobStatus, VideoJob};
use chrono::{Duration, Utc};
use log::debug;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// In-memory registry of download jobs. Every mutation is broadcast to
/// subscribers as a full job snapshot.
pub struct JobStore {
    jobs: Mutex<HashMap<Uuid, VideoJob>>,
    updates: broadcast::Sender<VideoJob>,
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStore {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        JobStore {
            jobs: Mutex::new(HashMap::new()),
            updates,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<VideoJob> {
        self.updates.subscribe()
    }

    pub fn create(&self, url: String, format_id: String) -> Option<VideoJob> {
        let job = VideoJob::new(url, format_id);
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.insert(job.id, job.clone());
        } else {
            return None;
        }
        self.publish(&job);
        Some(job)
    }

    /// Returns the in-flight job for the same URL and format if there is
    /// one, otherwise registers a new job. The flag is true for new jobs.
    pub fn create_or_join(&self, url: String, format_id: String) -> Option<(VideoJob, bool)> {
        let job = {
            let mut jobs = self.jobs.lock().ok()?;
            let existing = jobs.values().find(|job| {
                !job.status.is_terminal() && job.url == url && job.format_id == format_id
            });
            if let Some(job) = existing {
                return Some((job.clone(), false));
            }

            let job = VideoJob::new(url, format_id);
            jobs.insert(job.id, job.clone());
            job
        };
        self.publish(&job);
        Some((job, true))
    }

    pub fn get(&self, id: &Uuid) -> Option<VideoJob> {
        self.jobs.lock().ok()?.get(id).cloned()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.jobs
            .lock()
            .map(|jobs| jobs.contains_key(id))
            .unwrap_or(false)
    }

    /// All jobs, newest first.
    pub fn list(&self) -> Vec<VideoJob> {
        let mut items: Vec<VideoJob> = if let Ok(jobs) = self.jobs.lock() {
            jobs.values().cloned().collect()
        } else {
            Vec::new()
        };
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    pub fn get_size(&self) -> usize {
        self.jobs.lock().map(|jobs| jobs.len()).unwrap_or(0)
    }

    pub fn mark_downloading(&self, id: &Uuid) -> Option<VideoJob> {
        self.transition(id, |job| {
            if job.status != JobStatus::Pending {
                return false;
            }
            job.status = JobStatus::Downloading;
            job.progress = Some(0.0);
            true
        })
    }

    /// Records download progress. Updates that do not move the integer
    /// percentage forward are dropped to keep the broadcast quiet.
    ///
    /// Selectors such as `bv+ba` fetch video and audio separately and the
    /// extractor restarts its count for the second stream. Those updates
    /// are dropped too, so the job holds its high-water mark (often 100%)
    /// until the merge finishes and it completes.
    pub fn update_progress(&self, id: &Uuid, percent: f32) -> Option<VideoJob> {
        self.transition(id, |job| {
            if job.status != JobStatus::Downloading {
                return false;
            }
            let current = job.progress.unwrap_or(0.0);
            if percent.floor() <= current.floor() {
                return false;
            }
            job.progress = Some(percent.min(100.0));
            true
        })
    }

    pub fn mark_complete(&self, id: &Uuid, file_path: PathBuf) -> Option<VideoJob> {
        self.transition(id, |job| {
            if job.status.is_terminal() {
                return false;
            }
            job.status = JobStatus::Complete;
            job.file_path = Some(file_path);
            job.error = None;
            job.progress = Some(100.0);
            job.finished_at = Some(Utc::now());
            true
        })
    }

    pub fn mark_failed(&self, id: &Uuid, error: String) -> Option<VideoJob> {
        self.transition(id, |job| {
            if job.status.is_terminal() {
                return false;
            }
            job.status = JobStatus::Failed;
            job.file_path = None;
            job.error = Some(error);
            job.finished_at = Some(Utc::now());
            true
        })
    }

    /// Drops finished jobs older than `retention` and returns them so the
    /// caller can delete their files. In-flight jobs are never collected.
    pub fn collect_garbage(&self, retention: Duration) -> Vec<VideoJob> {
        let cutoff = Utc::now() - retention;
        let Ok(mut jobs) = self.jobs.lock() else {
            return Vec::new();
        };

        let expired: Vec<Uuid> = jobs
            .values()
            .filter(|job| job.status.is_terminal())
            .filter(|job| job.finished_at.is_some_and(|finished| finished < cutoff))
            .map(|job| job.id)
            .collect();

        expired.iter().filter_map(|id| jobs.remove(id)).collect()
    }

    fn transition<F>(&self, id: &Uuid, apply: F) -> Option<VideoJob>
    where
        F: FnOnce(&mut VideoJob) -> bool,
    {
        let updated = {
            let mut jobs = self.jobs.lock().ok()?;
            let job = jobs.get_mut(id)?;
            if !apply(job) {
                debug!("Ignoring update for job {id} in state {}", job.status.as_str());
                return None;
            }
            job.updated_at = Utc::now();
            job.clone()
        };
        self.publish(&updated);
        Some(updated)
    }

    fn publish(&self, job: &VideoJob) {
        // Sending only fails while nobody is subscribed.
        let _ = self.updates.send(job.clone());
    }
}
