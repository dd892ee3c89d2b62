//! SQL schema for the Rozgar SQLite backend.
//!
//! Executed once at connection startup, after [`MIGRATE_FROM_V1`] when the
//! file is at version 1.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Auth ----------------------------------------------------------------------

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT UNIQUE,     -- lowercased; NULL for phone-only identities
    phone         TEXT UNIQUE,
    password_hash TEXT,            -- argon2 PHC string; NULL for phone-only
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    access_token  TEXT PRIMARY KEY,
    refresh_token TEXT NOT NULL UNIQUE,
    user_id       TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    expires_at    TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

-- At most one outstanding code per phone; a new request replaces the old.
CREATE TABLE IF NOT EXISTS otp_codes (
    phone      TEXT PRIMARY KEY,
    code_hash  TEXT NOT NULL,      -- sha256 hex of the six-digit code
    expires_at TEXT NOT NULL,
    attempts   INTEGER NOT NULL DEFAULT 0  -- wrong guesses so far
);

CREATE TABLE IF NOT EXISTS recovery_tokens (
    token_hash TEXT PRIMARY KEY,   -- sha256 hex of the emailed token
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    expires_at TEXT NOT NULL
);

-- Tables --------------------------------------------------------------------

CREATE TABLE IF NOT EXISTS profiles (
    id                TEXT PRIMARY KEY REFERENCES users(user_id) ON DELETE CASCADE,
    email             TEXT NOT NULL,
    full_name         TEXT NOT NULL,
    phone             TEXT,
    user_type         TEXT NOT NULL CHECK (user_type IN ('jobseeker', 'employer')),
    company_name      TEXT,
    location          TEXT,
    bio               TEXT,
    skills            TEXT NOT NULL DEFAULT '[]',   -- JSON array
    experience_years  INTEGER,
    education         TEXT,
    resume_url        TEXT,
    profile_image_url TEXT,
    is_verified       INTEGER NOT NULL DEFAULT 0,
    is_active         INTEGER NOT NULL DEFAULT 1,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS admin_users (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    admin_level TEXT NOT NULL CHECK (admin_level IN ('super_admin', 'admin', 'moderator')),
    permissions TEXT NOT NULL DEFAULT '[]',         -- JSON array
    created_by  TEXT REFERENCES users(user_id),
    created_at  TEXT NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS jobs (
    id                   TEXT PRIMARY KEY,
    title                TEXT NOT NULL,
    company              TEXT NOT NULL,
    location             TEXT NOT NULL,
    salary               TEXT NOT NULL,
    salary_min           INTEGER,
    salary_max           INTEGER,
    job_type             TEXT NOT NULL
                         CHECK (job_type IN ('Full-time', 'Part-time', 'Contract', 'Internship')),
    experience           TEXT,
    skills               TEXT NOT NULL DEFAULT '[]',
    description          TEXT NOT NULL,
    requirements         TEXT NOT NULL DEFAULT '[]',
    benefits             TEXT NOT NULL DEFAULT '[]',
    posted_by            TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    status               TEXT NOT NULL DEFAULT 'active'
                         CHECK (status IN ('active', 'inactive', 'closed')),
    application_deadline TEXT,     -- YYYY-MM-DD
    remote_work_allowed  INTEGER NOT NULL DEFAULT 0,
    views_count          INTEGER NOT NULL DEFAULT 0,
    applications_count   INTEGER NOT NULL DEFAULT 0,
    created_at           TEXT NOT NULL,
    updated_at           TEXT NOT NULL
);

-- One application per (job, applicant); the client checks first, this makes
-- concurrent double-submits fail too.
CREATE TABLE IF NOT EXISTS applications (
    id               TEXT PRIMARY KEY,
    job_id           TEXT NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
    user_id          TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    status           TEXT NOT NULL DEFAULT 'pending'
                     CHECK (status IN ('pending', 'reviewed', 'shortlisted', 'rejected', 'hired')),
    cover_letter     TEXT,
    resume_url       TEXT,
    additional_notes TEXT,
    applied_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    UNIQUE (job_id, user_id)
);

-- Present for parity with the hosted schema; nothing reads it yet.
CREATE TABLE IF NOT EXISTS notifications (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    title      TEXT NOT NULL,
    message    TEXT NOT NULL,
    type       TEXT NOT NULL DEFAULT 'info',
    is_read    INTEGER NOT NULL DEFAULT 0,
    related_id TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS jobs_posted_by_idx    ON jobs(posted_by);
CREATE INDEX IF NOT EXISTS jobs_created_idx      ON jobs(created_at);
CREATE INDEX IF NOT EXISTS applications_user_idx ON applications(user_id);
CREATE INDEX IF NOT EXISTS admin_users_user_idx  ON admin_users(user_id);

PRAGMA user_version = 2;
";

/// Version 1 kept no attempt count on one-time codes. Outstanding codes are
/// short-lived, so the table is simply rebuilt.
pub const MIGRATE_FROM_V1: &str = "DROP TABLE IF EXISTS otp_codes;";
