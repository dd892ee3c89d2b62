//! Applications as the views see them.

use std::sync::{
  Arc,
  atomic::{AtomicUsize, Ordering},
};

use rozgar_core::{
  Backend, Error,
  application::{
    Application, ApplicationPatch, ApplicationQuery, ApplicationRecord,
    ApplicationStatus, NewApplication,
  },
};
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use crate::{
  jobs::Loading,
  notify::Toaster,
  outcome::{Failure, Outcome},
};

pub struct Applications<B> {
  backend:    Arc<B>,
  toaster:    Toaster,
  records:    watch::Sender<Vec<ApplicationRecord>>,
  in_flight:  AtomicUsize,
  last_query: Mutex<ApplicationQuery>,
}

impl<B: Backend> Applications<B> {
  pub fn new(backend: Arc<B>, toaster: Toaster) -> Self {
    Self {
      backend,
      toaster,
      records: watch::channel(Vec::new()).0,
      in_flight: AtomicUsize::new(0),
      last_query: Mutex::new(ApplicationQuery::default()),
    }
  }

  pub fn records(&self) -> Vec<ApplicationRecord> { self.records.borrow().clone() }

  pub fn subscribe(&self) -> watch::Receiver<Vec<ApplicationRecord>> { self.records.subscribe() }

  pub fn is_loading(&self) -> bool { self.in_flight.load(Ordering::SeqCst) > 0 }

  pub async fn list(&self, query: ApplicationQuery) -> Outcome<Vec<ApplicationRecord>> {
    *self.last_query.lock().await = query.clone();
    self.fetch(&query).await
  }

  pub async fn refresh(&self) -> Outcome<Vec<ApplicationRecord>> {
    let query = self.last_query.lock().await.clone();
    self.fetch(&query).await
  }

  async fn fetch(&self, query: &ApplicationQuery) -> Outcome<Vec<ApplicationRecord>> {
    let _loading = Loading::start(&self.in_flight);
    match self.backend.list_applications(query).await {
      Ok(rows) => {
        self.records.send_replace(rows.clone());
        Ok(rows)
      }
      Err(e) => {
        tracing::error!(error = %e, "loading applications failed");
        self.toaster.error("toast.applications.load_failed");
        Err(e.into())
      }
    }
  }

  /// Whether `user_id` already applied to `job_id`. Lookup failures read as
  /// `false`.
  pub async fn exists(&self, job_id: Uuid, user_id: Uuid) -> bool {
    match self.backend.find_application(job_id, user_id).await {
      Ok(found) => found.is_some(),
      Err(e) => {
        tracing::error!(%job_id, %user_id, error = %e, "checking for application failed");
        false
      }
    }
  }

  /// Apply to a job once. A second application for the same pair fails with
  /// [`Failure::AlreadyApplied`], whether the pre-check or the backend's
  /// uniqueness constraint catches it.
  pub async fn create(&self, application: NewApplication) -> Outcome<Application> {
    if self.exists(application.job_id, application.user_id).await {
      self.toaster.error("toast.application.duplicate");
      return Err(Failure::AlreadyApplied);
    }

    let result = {
      let _loading = Loading::start(&self.in_flight);
      self.backend.insert_application(application).await
    };
    match result {
      Ok(created) => {
        tracing::info!(application_id = %created.id, "application submitted");
        self.toaster.success("toast.application.created");
        let _ = self.refresh().await;
        Ok(created)
      }
      Err(Error::Conflict(reason)) => {
        tracing::warn!(%reason, "duplicate application rejected by backend");
        self.toaster.error("toast.application.duplicate");
        Err(Failure::AlreadyApplied)
      }
      Err(e) => {
        tracing::error!(error = %e, "submitting application failed");
        self.toaster.error("toast.application.create_failed");
        Err(e.into())
      }
    }
  }

  pub async fn update_status(&self, id: Uuid, status: ApplicationStatus) -> Outcome<Application> {
    let patch = ApplicationPatch { status: Some(status), ..ApplicationPatch::default() };
    self.update(id, patch).await
  }

  pub async fn update(&self, id: Uuid, patch: ApplicationPatch) -> Outcome<Application> {
    let result = {
      let _loading = Loading::start(&self.in_flight);
      self.backend.update_application(id, patch).await
    };
    match result {
      Ok(updated) => {
        self.toaster.success("toast.application.updated");
        let _ = self.refresh().await;
        Ok(updated)
      }
      Err(e) => {
        tracing::error!(application_id = %id, error = %e, "updating application failed");
        self.toaster.error("toast.application.update_failed");
        Err(e.into())
      }
    }
  }

  pub async fn delete(&self, id: Uuid) -> Outcome<()> {
    let result = {
      let _loading = Loading::start(&self.in_flight);
      self.backend.delete_application(id).await
    };
    match result {
      Ok(()) => {
        self.toaster.success("toast.application.deleted");
        let _ = self.refresh().await;
        Ok(())
      }
      Err(e) => {
        tracing::error!(application_id = %id, error = %e, "deleting application failed");
        self.toaster.error("toast.application.delete_failed");
        Err(e.into())
      }
    }
  }
}
