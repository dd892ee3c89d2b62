//! Which top-level view to show.

use rozgar_core::profile::UserType;

use crate::session::SessionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
  Loading,
  Admin,
  Employer,
  JobSeeker,
  Landing,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteInput {
  pub loading:          bool,
  pub identity_present: bool,
  pub profile_present:  bool,
  pub is_admin:         bool,
  pub user_type:        Option<UserType>,
}

impl From<&SessionSnapshot> for RouteInput {
  fn from(snapshot: &SessionSnapshot) -> Self {
    Self {
      loading:          snapshot.is_resolving(),
      identity_present: snapshot.identity().is_some(),
      profile_present:  snapshot.profile.is_some(),
      is_admin:         snapshot.is_admin,
      user_type:        snapshot.profile.as_ref().map(|p| p.user_type),
    }
  }
}

/// Loading wins over everything. A signed-in identity without a profile
/// lands on [`View::Landing`], same as a visitor.
pub fn route(input: RouteInput) -> View {
  if input.loading {
    return View::Loading;
  }
  if !(input.identity_present && input.profile_present) {
    return View::Landing;
  }
  if input.is_admin {
    return View::Admin;
  }
  match input.user_type {
    Some(UserType::Employer) => View::Employer,
    _ => View::JobSeeker,
  }
}
