//! Job postings as the views see them.

use std::sync::{
  Arc,
  atomic::{AtomicUsize, Ordering},
};

use rozgar_core::{
  Backend,
  job::{JobListing, JobPatch, JobPosting, JobQuery, NewJob},
};
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use crate::{
  notify::Toaster,
  outcome::{self, Outcome},
};

/// The last listing fetched, the filters that produced it, and the
/// operations that change it.
pub struct Jobs<B> {
  backend:    Arc<B>,
  toaster:    Toaster,
  listings:   watch::Sender<Vec<JobListing>>,
  in_flight:  AtomicUsize,
  last_query: Mutex<JobQuery>,
}

/// Decrements the in-flight counter on drop.
pub(crate) struct Loading<'a>(&'a AtomicUsize);

impl<'a> Loading<'a> {
  pub(crate) fn start(counter: &'a AtomicUsize) -> Self {
    counter.fetch_add(1, Ordering::SeqCst);
    Self(counter)
  }
}

impl Drop for Loading<'_> {
  fn drop(&mut self) { self.0.fetch_sub(1, Ordering::SeqCst); }
}

fn validate(job: &NewJob) -> Outcome<()> {
  outcome::required("title", &job.title)?;
  outcome::required("company", &job.company)?;
  outcome::required("location", &job.location)?;
  outcome::required("salary", &job.salary)?;
  outcome::required("description", &job.description)?;
  Ok(())
}

impl<B: Backend> Jobs<B> {
  pub fn new(backend: Arc<B>, toaster: Toaster) -> Self {
    Self {
      backend,
      toaster,
      listings: watch::channel(Vec::new()).0,
      in_flight: AtomicUsize::new(0),
      last_query: Mutex::new(JobQuery::default()),
    }
  }

  pub fn listings(&self) -> Vec<JobListing> { self.listings.borrow().clone() }

  pub fn subscribe(&self) -> watch::Receiver<Vec<JobListing>> { self.listings.subscribe() }

  pub fn is_loading(&self) -> bool { self.in_flight.load(Ordering::SeqCst) > 0 }

  /// Fetch with `query` and remember it for later refreshes. On failure the
  /// previous listing stays in place.
  pub async fn list(&self, query: JobQuery) -> Outcome<Vec<JobListing>> {
    *self.last_query.lock().await = query.clone();
    self.fetch(&query).await
  }

  /// Fetch again with the filters of the last [`Jobs::list`].
  pub async fn refresh(&self) -> Outcome<Vec<JobListing>> {
    let query = self.last_query.lock().await.clone();
    self.fetch(&query).await
  }

  async fn fetch(&self, query: &JobQuery) -> Outcome<Vec<JobListing>> {
    let _loading = Loading::start(&self.in_flight);
    match self.backend.list_jobs(query).await {
      Ok(rows) => {
        tracing::debug!(count = rows.len(), "jobs loaded");
        self.listings.send_replace(rows.clone());
        Ok(rows)
      }
      Err(e) => {
        tracing::error!(error = %e, "loading jobs failed");
        self.toaster.error("toast.jobs.load_failed");
        Err(e.into())
      }
    }
  }

  pub async fn create(&self, job: NewJob) -> Outcome<JobPosting> {
    validate(&job)?;
    let result = {
      let _loading = Loading::start(&self.in_flight);
      self.backend.insert_job(job).await
    };
    match result {
      Ok(posting) => {
        tracing::info!(job_id = %posting.id, "job posted");
        self.toaster.success("toast.job.created");
        let _ = self.refresh().await;
        Ok(posting)
      }
      Err(e) => {
        tracing::error!(error = %e, "posting job failed");
        self.toaster.error("toast.job.create_failed");
        Err(e.into())
      }
    }
  }

  pub async fn update(&self, id: Uuid, patch: JobPatch) -> Outcome<JobPosting> {
    if let Some(title) = &patch.title {
      outcome::required("title", title)?;
    }
    let result = {
      let _loading = Loading::start(&self.in_flight);
      self.backend.update_job(id, patch).await
    };
    match result {
      Ok(posting) => {
        self.toaster.success("toast.job.updated");
        let _ = self.refresh().await;
        Ok(posting)
      }
      Err(e) => {
        tracing::error!(job_id = %id, error = %e, "updating job failed");
        self.toaster.error("toast.job.update_failed");
        Err(e.into())
      }
    }
  }

  pub async fn delete(&self, id: Uuid) -> Outcome<()> {
    let result = {
      let _loading = Loading::start(&self.in_flight);
      self.backend.delete_job(id).await
    };
    match result {
      Ok(()) => {
        self.toaster.success("toast.job.deleted");
        let _ = self.refresh().await;
        Ok(())
      }
      Err(e) => {
        tracing::error!(job_id = %id, error = %e, "deleting job failed");
        self.toaster.error("toast.job.delete_failed");
        Err(e.into())
      }
    }
  }

  /// Count a view of the posting. Failures are logged only.
  pub async fn increment_views(&self, id: Uuid) {
    if let Err(e) = self.backend.increment_job_views(id).await {
      tracing::error!(job_id = %id, error = %e, "incrementing views failed");
    }
  }
}
