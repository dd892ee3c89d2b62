//! Demo accounts and postings for a fresh offline database.

use rozgar_core::{
  Tables as _,
  admin::AdminLevel,
  job::{JobType, NewJob},
  profile::{NewProfile, UserType},
};

use crate::{
  Result,
  auth::hash_password,
  backend::SqliteBackend,
};

struct DemoUser {
  email:     &'static str,
  password:  &'static str,
  full_name: &'static str,
  user_type: UserType,
  phone:     &'static str,
  company:   Option<&'static str>,
  location:  &'static str,
  admin:     bool,
}

const USERS: &[DemoUser] = &[
  DemoUser {
    email:     "ram@example.com",
    password:  "password123",
    full_name: "राम शर्मा",
    user_type: UserType::JobSeeker,
    phone:     "+919876543210",
    company:   None,
    location:  "Mumbai, Maharashtra",
    admin:     false,
  },
  DemoUser {
    email:     "sita@example.com",
    password:  "password123",
    full_name: "सीता देवी",
    user_type: UserType::JobSeeker,
    phone:     "+919876543211",
    company:   None,
    location:  "Delhi, NCR",
    admin:     false,
  },
  DemoUser {
    email:     "hr@abc.com",
    password:  "password123",
    full_name: "ABC कंपनी HR",
    user_type: UserType::Employer,
    phone:     "+919876543212",
    company:   Some("ABC Technologies"),
    location:  "Bangalore, Karnataka",
    admin:     false,
  },
  DemoUser {
    email:     "jobs@xyz.com",
    password:  "password123",
    full_name: "XYZ HR Manager",
    user_type: UserType::Employer,
    phone:     "+919876543213",
    company:   Some("XYZ Industries"),
    location:  "Pune, Maharashtra",
    admin:     false,
  },
  DemoUser {
    email:     "admin@babadham.com",
    password:  "admin123",
    full_name: "Admin User",
    user_type: UserType::JobSeeker,
    phone:     "+919876543214",
    company:   None,
    location:  "Head Office",
    admin:     true,
  },
];

fn strings(items: &[&str]) -> Vec<String> { items.iter().map(|s| (*s).to_owned()).collect() }

pub(crate) async fn seed_demo(backend: &SqliteBackend) -> Result<bool> {
  let existing: i64 = backend
    .conn
    .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
    .await?;
  if existing > 0 {
    return Ok(false);
  }

  let mut ids = Vec::with_capacity(USERS.len());
  for user in USERS {
    let hash = hash_password(user.password)?;
    let identity = backend
      .create_user(Some(user.email.to_owned()), Some(user.phone.to_owned()), Some(hash))
      .await?;
    backend
      .insert_profile(NewProfile {
        id:           identity.id,
        email:        user.email.to_owned(),
        full_name:    user.full_name.to_owned(),
        phone:        Some(user.phone.to_owned()),
        user_type:    user.user_type,
        company_name: user.company.map(str::to_owned),
        location:     Some(user.location.to_owned()),
      })
      .await?;
    if user.admin {
      backend.grant_admin(identity.id, AdminLevel::SuperAdmin, None).await?;
    }
    ids.push(identity.id);
  }

  // Indices follow `USERS`.
  let (abc, xyz) = (ids[2], ids[3]);

  let jobs = [
    NewJob {
      title:                "Marketing Manager".into(),
      company:              "XYZ Industries".into(),
      location:             "Delhi, NCR".into(),
      salary:               "₹6-10 LPA".into(),
      salary_min:           Some(600_000),
      salary_max:           Some(1_000_000),
      job_type:             JobType::FullTime,
      experience:           Some("3-5 years".into()),
      skills:               strings(&["Digital Marketing", "SEO", "Analytics"]),
      description:          "Lead brand and digital campaigns across North India.".into(),
      requirements:         strings(&["MBA in Marketing", "Team leadership"]),
      benefits:             strings(&["Health insurance", "Performance bonus"]),
      posted_by:            xyz,
      application_deadline: None,
      remote_work_allowed:  false,
    },
    NewJob {
      title:                "Software Developer".into(),
      company:              "ABC Technologies".into(),
      location:             "Mumbai, Maharashtra".into(),
      salary:               "₹8-12 LPA".into(),
      salary_min:           Some(800_000),
      salary_max:           Some(1_200_000),
      job_type:             JobType::FullTime,
      experience:           Some("2-4 years".into()),
      skills:               strings(&["React", "Node.js", "MongoDB"]),
      description:          "Build and maintain customer-facing web applications.".into(),
      requirements:         strings(&["B.Tech/BE in Computer Science", "REST API design"]),
      benefits:             strings(&["Health insurance", "Flexible hours"]),
      posted_by:            abc,
      application_deadline: None,
      remote_work_allowed:  true,
    },
  ];

  for job in jobs {
    backend.insert_job(job).await?;
  }

  tracing::info!(users = USERS.len(), "seeded demo data");
  Ok(true)
}
