//! Session store behaviour against the SQLite backend.

use std::{
  sync::{Arc, atomic::Ordering},
  time::Duration,
};

use rozgar_core::{
  Error,
  profile::{ProfilePatch, UserType},
};
use rozgar_store_sqlite::SqliteBackend;
use tokio::{sync::mpsc, time::timeout};

use super::support::{Capture, PASSWORD, Rigged, app, creds, errors, seeded};
use crate::{
  App, Failure, View,
  persist::{CURRENT_USER, Persistence, StoredUser},
  session::{Phase, Role, SignUp},
};

const WAIT: Duration = Duration::from_secs(5);

fn employer_form(company: Option<&str>) -> SignUp {
  SignUp {
    email:        "neha@corp.in".into(),
    password:     "secret1".into(),
    full_name:    " Neha Gupta ".into(),
    phone:        Some("  ".into()),
    user_type:    UserType::Employer,
    company_name: company.map(str::to_owned),
    location:     Some("Jaipur".into()),
  }
}

// ─── Startup and routing ─────────────────────────────────────────────────────

#[tokio::test]
async fn starts_anonymous_on_the_landing_view() {
  let app = app(seeded().await);
  let snapshot = app.session.wait_until_resolved().await;
  assert_eq!(snapshot.phase, Phase::Anonymous);
  assert!(snapshot.session.is_none());
  assert_eq!(app.view(), View::Landing);
}

#[tokio::test]
async fn job_seeker_sign_in() {
  let persistence = Persistence::in_memory();
  let app = App::start(Arc::new(seeded().await), persistence.clone());
  app.session.wait_until_resolved().await;

  app.session.sign_in(creds("ram@example.com", PASSWORD)).await.unwrap();
  let snapshot = app.session.wait_until_resolved().await;

  assert_eq!(snapshot.phase, Phase::Authenticated);
  assert!(!snapshot.is_admin);
  assert_eq!(snapshot.profile.as_ref().map(|p| p.full_name.as_str()), Some("राम शर्मा"));
  assert_eq!(app.view(), View::JobSeeker);

  let toasts = app.toasts.drain();
  assert_eq!(toasts.len(), 1);
  assert_eq!(toasts[0].message, "सफलतापूर्वक लॉगिन हो गए!");

  let stored: StoredUser = persistence.load(CURRENT_USER).unwrap();
  assert_eq!(stored.full_name.as_deref(), Some("राम शर्मा"));
  assert_eq!(stored.user_type, Some(UserType::JobSeeker));
}

#[tokio::test]
async fn wrong_password_raises_one_error() {
  let app = app(seeded().await);
  app.session.wait_until_resolved().await;

  let err = app.session.sign_in(creds("ram@example.com", "nope-nope")).await.unwrap_err();
  assert!(matches!(err, Failure::Backend(Error::InvalidCredentials)));
  assert_eq!(app.session.snapshot().phase, Phase::Anonymous);

  let toasts = app.toasts.drain();
  assert_eq!(errors(&toasts), 1);
  assert_eq!(toasts[0].message, "गलत ईमेल या पासवर्ड");
}

#[tokio::test]
async fn invalid_input_is_not_toasted() {
  let app = app(seeded().await);
  app.session.wait_until_resolved().await;

  let err = app.session.sign_in(creds("not-an-email", PASSWORD)).await.unwrap_err();
  assert!(err.is_validation());
  assert!(app.toasts.drain().is_empty());
}

#[tokio::test]
async fn admin_and_employer_views() {
  let app = app(seeded().await);
  app.session.wait_until_resolved().await;

  app.session.sign_in(creds("admin@babadham.com", "admin123")).await.unwrap();
  let snapshot = app.session.wait_until_resolved().await;
  assert!(snapshot.is_admin);
  assert_eq!(app.view(), View::Admin);

  app.session.sign_in(creds("hr@abc.com", PASSWORD)).await.unwrap();
  let snapshot = app.session.wait_until_resolved().await;
  assert!(!snapshot.is_admin);
  assert_eq!(snapshot.profile.unwrap().company_name.as_deref(), Some("ABC Technologies"));
  assert_eq!(app.view(), View::Employer);
}

#[tokio::test]
async fn sign_in_for_another_role_is_refused() {
  let persistence = Persistence::in_memory();
  let app = App::start(Arc::new(seeded().await), persistence.clone());
  app.session.wait_until_resolved().await;

  let err = app
    .session
    .sign_in_as(creds("hr@abc.com", PASSWORD), Role::JobSeeker)
    .await
    .unwrap_err();
  assert!(matches!(err, Failure::WrongRole { expected: Role::JobSeeker }));

  let toasts = app.toasts.drain();
  assert_eq!(errors(&toasts), 1);
  assert_eq!(toasts[0].message, "यह खाता इस भूमिका के लिए पंजीकृत नहीं है");

  // Let the listener catch up on the sign-in and sign-out events.
  tokio::time::sleep(Duration::from_millis(50)).await;
  let snapshot = app.session.wait_until_resolved().await;
  assert_eq!(snapshot.phase, Phase::Anonymous);
  assert!(persistence.load::<StoredUser>(CURRENT_USER).is_none());
  assert_eq!(app.view(), View::Landing);
}

#[tokio::test]
async fn sign_in_for_the_matching_role() {
  let app = app(seeded().await);
  app.session.wait_until_resolved().await;

  app.session.sign_in_as(creds("hr@abc.com", PASSWORD), Role::Employer).await.unwrap();
  app.session.wait_until_resolved().await;
  assert_eq!(app.view(), View::Employer);

  let err = app
    .session
    .sign_in_as(creds("ram@example.com", PASSWORD), Role::Admin)
    .await
    .unwrap_err();
  assert!(matches!(err, Failure::WrongRole { expected: Role::Admin }));

  app.session.sign_in_as(creds("admin@babadham.com", "admin123"), Role::Admin).await.unwrap();
  let snapshot = app.session.wait_until_resolved().await;
  assert!(snapshot.is_admin);
  assert_eq!(app.view(), View::Admin);
}

#[tokio::test]
async fn failed_admin_lookup_counts_as_not_admin() {
  let app = app(Rigged::new(seeded().await));
  app.session.wait_until_resolved().await;
  app.backend.fail_admin.store(true, Ordering::SeqCst);

  app.session.sign_in(creds("admin@babadham.com", "admin123")).await.unwrap();
  let snapshot = timeout(WAIT, app.session.wait_until_resolved()).await.unwrap();
  assert_eq!(snapshot.phase, Phase::Authenticated);
  assert!(snapshot.admin_checked);
  assert!(!snapshot.is_admin);
  assert!(snapshot.profile.is_some());
  assert_eq!(app.view(), View::JobSeeker);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn saved_session_is_restored_on_restart() {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("rozgar.db");

  let first = SqliteBackend::open(&db).await.unwrap();
  assert!(first.seed_demo().await.unwrap());
  let app = App::start(Arc::new(first), Persistence::in_dir(dir.path()));
  app.session.wait_until_resolved().await;
  app.session.sign_in(creds("sita@example.com", PASSWORD)).await.unwrap();
  app.session.wait_until_resolved().await;
  app.shutdown();

  let second = SqliteBackend::open(&db).await.unwrap();
  let app = App::start(Arc::new(second), Persistence::in_dir(dir.path()));
  let snapshot = app.session.wait_until_resolved().await;
  assert_eq!(snapshot.phase, Phase::Authenticated);
  assert_eq!(snapshot.profile.unwrap().full_name, "सीता देवी");
  assert_eq!(app.view(), View::JobSeeker);
}

#[tokio::test]
async fn outage_at_startup_keeps_the_saved_session() {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("rozgar.db");

  let first = SqliteBackend::open(&db).await.unwrap();
  assert!(first.seed_demo().await.unwrap());
  let app = App::start(Arc::new(first), Persistence::in_dir(dir.path()));
  app.session.wait_until_resolved().await;
  app.session.sign_in(creds("sita@example.com", PASSWORD)).await.unwrap();
  app.session.wait_until_resolved().await;
  app.shutdown();

  let unreachable = Rigged::new(SqliteBackend::open(&db).await.unwrap());
  unreachable.fail_restore.store(true, Ordering::SeqCst);
  let persistence = Persistence::in_dir(dir.path());
  let app = App::start(Arc::new(unreachable), persistence.clone());
  let snapshot = app.session.wait_until_resolved().await;
  assert_eq!(snapshot.phase, Phase::Anonymous);
  assert_eq!(app.view(), View::Landing);
  let saved: StoredUser = persistence.load(CURRENT_USER).unwrap();
  assert_eq!(saved.full_name.as_deref(), Some("सीता देवी"));
  app.shutdown();

  let healthy = SqliteBackend::open(&db).await.unwrap();
  let app = App::start(Arc::new(healthy), Persistence::in_dir(dir.path()));
  let snapshot = app.session.wait_until_resolved().await;
  assert_eq!(snapshot.phase, Phase::Authenticated);
  assert_eq!(snapshot.identity().unwrap().email.as_deref(), Some("sita@example.com"));
  assert_eq!(app.view(), View::JobSeeker);
}

#[tokio::test]
async fn sign_out_clears_state_and_storage() {
  let persistence = Persistence::in_memory();
  let app = App::start(Arc::new(seeded().await), persistence.clone());
  app.session.wait_until_resolved().await;
  app.session.sign_in(creds("ram@example.com", PASSWORD)).await.unwrap();
  app.session.wait_until_resolved().await;

  app.session.sign_out().await.unwrap();
  let snapshot = app.session.snapshot();
  assert_eq!(snapshot.phase, Phase::Anonymous);
  assert!(snapshot.profile.is_none());
  assert!(persistence.load::<StoredUser>(CURRENT_USER).is_none());
  assert_eq!(app.view(), View::Landing);
}

// ─── Sign-up and phone sign-in ───────────────────────────────────────────────

#[tokio::test]
async fn employer_sign_up_creates_a_profile() {
  let app = app(seeded().await);
  app.session.wait_until_resolved().await;

  let registration = app.session.sign_up(employer_form(Some("Corp Pvt Ltd"))).await.unwrap();
  assert!(registration.session.is_some());

  let snapshot = app.session.wait_until_resolved().await;
  let profile = snapshot.profile.unwrap();
  assert_eq!(profile.full_name, "Neha Gupta");
  assert_eq!(profile.phone, None);
  assert_eq!(profile.company_name.as_deref(), Some("Corp Pvt Ltd"));
  assert_eq!(app.view(), View::Employer);
}

#[tokio::test]
async fn sign_up_survives_a_failed_profile_insert() {
  let app = app(Rigged::new(seeded().await));
  app.session.wait_until_resolved().await;
  app.backend.fail_profile_insert.store(true, Ordering::SeqCst);

  let registration = app.session.sign_up(employer_form(Some("Corp Pvt Ltd"))).await.unwrap();
  assert!(registration.session.is_some());

  let snapshot = timeout(WAIT, app.session.wait_until_resolved()).await.unwrap();
  assert_eq!(snapshot.phase, Phase::Authenticated);
  assert!(snapshot.profile.is_none());
  assert!(snapshot.profile_checked);
  assert_eq!(app.view(), View::Landing);

  let toasts = app.toasts.drain();
  assert_eq!(errors(&toasts), 0);
  assert_eq!(toasts[0].message, "खाता सफलतापूर्वक बनाया गया! कृपया अपना ईमेल चेक करें।");
}

#[tokio::test]
async fn employer_sign_up_needs_a_company() {
  let app = app(seeded().await);
  app.session.wait_until_resolved().await;

  let err = app.session.sign_up(employer_form(Some(" "))).await.unwrap_err();
  assert!(matches!(err, Failure::Validation { field: "company_name", .. }));
  assert_eq!(app.session.snapshot().phase, Phase::Anonymous);
}

#[tokio::test]
async fn taken_email_is_reported() {
  let app = app(seeded().await);
  app.session.wait_until_resolved().await;

  let form = SignUp { email: "ram@example.com".into(), ..employer_form(Some("Corp")) };
  let err = app.session.sign_up(form).await.unwrap_err();
  assert!(matches!(err, Failure::Backend(Error::EmailTaken(_))));
  assert_eq!(errors(&app.toasts.drain()), 1);
}

#[tokio::test]
async fn phone_identity_without_profile_lands() {
  let capture = Arc::new(Capture::default());
  let backend = seeded().await.with_code_sender(capture.clone());
  let app = app(backend);
  app.session.wait_until_resolved().await;

  app.session.request_otp("+91 99999 00000").await.unwrap();
  let err = app.session.verify_otp("+91 99999 00000", "000000x").await.unwrap_err();
  assert!(matches!(err, Failure::Backend(Error::InvalidCode)));

  app.session.verify_otp("+91 99999 00000", &capture.last_code()).await.unwrap();
  let snapshot = app.session.wait_until_resolved().await;
  assert_eq!(snapshot.phase, Phase::Authenticated);
  assert!(snapshot.profile.is_none());
  assert!(snapshot.profile_checked);
  assert_eq!(app.view(), View::Landing);
}

#[tokio::test]
async fn phone_sign_in_finds_the_existing_account() {
  let capture = Arc::new(Capture::default());
  let backend = seeded().await.with_code_sender(capture.clone());
  let app = app(backend);
  app.session.wait_until_resolved().await;

  app.session.request_otp("+919876543210").await.unwrap();
  app.session.verify_otp("+919876543210", &capture.last_code()).await.unwrap();
  let snapshot = app.session.wait_until_resolved().await;
  assert_eq!(snapshot.profile.unwrap().full_name, "राम शर्मा");
}

// ─── Ordering ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn slow_lookup_for_a_replaced_session_is_dropped() {
  let app = app(Rigged::new(seeded().await));
  app.session.wait_until_resolved().await;
  app.backend.hold_profiles.store(true, Ordering::SeqCst);

  app.session.sign_in(creds("ram@example.com", PASSWORD)).await.unwrap();
  assert!(app.session.snapshot().is_resolving());
  assert_eq!(app.view(), View::Loading);

  app.session.sign_in(creds("sita@example.com", PASSWORD)).await.unwrap();
  app.backend.release_profiles();

  let snapshot = timeout(WAIT, app.session.wait_until_resolved()).await.unwrap();
  assert_eq!(snapshot.identity().unwrap().email.as_deref(), Some("sita@example.com"));
  assert_eq!(snapshot.profile.unwrap().full_name, "सीता देवी");
}

#[tokio::test]
async fn slow_lookup_after_sign_out_is_dropped() {
  let app = app(Rigged::new(seeded().await));
  app.session.wait_until_resolved().await;
  app.backend.hold_profiles.store(true, Ordering::SeqCst);

  app.session.sign_in(creds("ram@example.com", PASSWORD)).await.unwrap();
  app.session.sign_out().await.unwrap();
  app.backend.release_profiles();
  tokio::time::sleep(Duration::from_millis(50)).await;

  let snapshot = app.session.snapshot();
  assert_eq!(snapshot.phase, Phase::Anonymous);
  assert!(snapshot.profile.is_none());
  assert_eq!(app.view(), View::Landing);
}

#[tokio::test]
async fn change_handler_stops_when_dropped() {
  let app = app(seeded().await);
  app.session.wait_until_resolved().await;

  let (tx, mut rx) = mpsc::unbounded_channel();
  let subscription = app.session.on_change(move |snapshot| {
    let _ = tx.send((snapshot.phase, snapshot.profile.is_some()));
  });

  app.session.sign_in(creds("ram@example.com", PASSWORD)).await.unwrap();
  timeout(WAIT, async {
    while let Some((phase, has_profile)) = rx.recv().await {
      if phase == Phase::Authenticated && has_profile {
        break;
      }
    }
  })
  .await
  .unwrap();

  subscription.unsubscribe();
  // The handler owned the sender, so the channel closes once it is gone.
  timeout(WAIT, async { while rx.recv().await.is_some() {} }).await.unwrap();
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn profile_update_is_read_back() {
  let app = app(seeded().await);
  app.session.wait_until_resolved().await;
  app.session.sign_in(creds("ram@example.com", PASSWORD)).await.unwrap();
  app.session.wait_until_resolved().await;

  let patch = ProfilePatch {
    location: Some("Pune, Maharashtra".into()),
    skills: Some(vec!["Excel".into(), "Tally".into()]),
    ..ProfilePatch::default()
  };
  let updated = app.session.update_profile(patch).await.unwrap();
  assert_eq!(updated.location.as_deref(), Some("Pune, Maharashtra"));

  let snapshot = app.session.snapshot();
  let profile = snapshot.profile.unwrap();
  assert_eq!(profile.skills, vec!["Excel".to_owned(), "Tally".to_owned()]);
  assert_eq!(profile.full_name, "राम शर्मा");
}

#[tokio::test]
async fn profile_update_needs_a_session() {
  let app = app(seeded().await);
  app.session.wait_until_resolved().await;

  let err = app.session.update_profile(ProfilePatch::default()).await.unwrap_err();
  assert!(matches!(err, Failure::NotSignedIn));
  assert!(app.toasts.drain().is_empty());
}
