//! The signed-in boards: a jobs tab and an applications tab, with a detail
//! pane for the row under the cursor.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs, Wrap},
};
use rozgar_app::View;
use rozgar_core::{
  Backend,
  application::{ApplicationRecord, ApplicationStatus},
  job::{JobListing, JobStatus},
};

use crate::app::{Tab, Tui};

fn highlight() -> Style {
  Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
}

fn pane(title: String) -> Block<'static> {
  Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

fn tab_keys(view: View) -> [&'static str; 2] {
  match view {
    View::Employer => ["employer.jobs", "employer.applicants"],
    View::Admin => ["admin.jobs", "admin.applications"],
    _ => ["jobseeker.browse", "jobseeker.applications"],
  }
}

/// Render the board for the current view into `area`.
pub fn draw<B: Backend>(f: &mut Frame, area: Rect, tui: &Tui<B>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(1), Constraint::Min(0)])
    .split(area);

  let titles: Vec<String> = tab_keys(tui.view).iter().map(|k| tui.app.translate(k)).collect();
  let selected = match tui.tab {
    Tab::Jobs => 0,
    Tab::Applications => 1,
  };
  f.render_widget(
    Tabs::new(titles)
      .select(selected)
      .style(Style::default().fg(Color::Gray))
      .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    rows[0],
  );

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
    .split(rows[1]);

  match tui.tab {
    Tab::Jobs => {
      let title = tui.app.translate(tab_keys(tui.view)[0]);
      jobs_table(f, cols[0], tui, title, Some(tui.cursor));
      job_detail(f, cols[1], tui, tui.selected_job());
    }
    Tab::Applications => {
      applications_table(f, cols[0], tui);
      application_detail(f, cols[1], tui, tui.selected_record());
    }
  }
}

// ─── Jobs ─────────────────────────────────────────────────────────────────────

fn status_color(status: JobStatus) -> Color {
  match status {
    JobStatus::Active => Color::Green,
    JobStatus::Inactive => Color::Yellow,
    JobStatus::Closed => Color::Red,
  }
}

/// The job listing as a table. `cursor` is `None` when the table is not
/// focused.
pub fn jobs_table<B: Backend>(
  f: &mut Frame,
  area: Rect,
  tui: &Tui<B>,
  title: String,
  cursor: Option<usize>,
) {
  let t = |key: &str| tui.app.translate(key);
  let listings = tui.app.jobs.listings();
  let block = pane(format!("{title} ({})", listings.len()));

  if listings.is_empty() {
    let text = if tui.app.jobs.is_loading() { t("common.loading") } else { t("common.empty") };
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::DarkGray)), inner);
    return;
  }

  let header = Row::new(
    ["column.title", "column.company", "column.location", "column.salary", "column.status"]
      .map(|k| Cell::from(t(k))),
  )
  .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let rows = listings.iter().map(|listing| {
    let job = &listing.job;
    let mark = if tui.has_applied(job.id) { "✓ " } else { "" };
    Row::new(vec![
      Cell::from(format!("{mark}{}", job.title)),
      Cell::from(job.company.clone()),
      Cell::from(job.location.clone()),
      Cell::from(job.salary.clone()),
      Cell::from(job.status.as_str()).style(Style::default().fg(status_color(job.status))),
    ])
  });

  let table = Table::new(rows, [
    Constraint::Percentage(28),
    Constraint::Percentage(22),
    Constraint::Percentage(22),
    Constraint::Percentage(16),
    Constraint::Percentage(12),
  ])
  .header(header)
  .block(block)
  .row_highlight_style(highlight());

  let mut state = TableState::default().with_selected(cursor);
  f.render_stateful_widget(table, area, &mut state);
}

fn list_line(label: String, items: &[String]) -> Option<Line<'static>> {
  (!items.is_empty()).then(|| labelled(label, items.join(", ")))
}

fn labelled(label: String, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{label:<12}"), Style::default().fg(Color::Cyan)),
    Span::raw(value),
  ])
}

fn job_detail<B: Backend>(f: &mut Frame, area: Rect, tui: &Tui<B>, listing: Option<JobListing>) {
  let t = |key: &str| tui.app.translate(key);
  let block = pane(t("common.view"));
  let Some(listing) = listing else {
    f.render_widget(block, area);
    return;
  };
  let job = &listing.job;

  let mut lines = vec![
    Line::from(Span::styled(job.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
    labelled(t("column.company"), job.company.clone()),
    labelled(t("column.location"), job.location.clone()),
    labelled(t("column.salary"), job.salary.clone()),
    labelled(t("column.type"), job.job_type.to_string()),
    labelled(t("column.views"), job.views_count.to_string()),
  ];
  if let Some(poster) = listing.poster.as_ref().and_then(|p| p.full_name.clone()) {
    lines.push(labelled("↳".into(), poster));
  }
  if let Some(experience) = &job.experience {
    lines.push(labelled("Exp".into(), experience.clone()));
  }
  lines.extend(list_line("Skills".into(), &job.skills));
  lines.push(Line::from(""));
  lines.push(Line::from(job.description.clone()));
  lines.extend(list_line("Req".into(), &job.requirements));
  lines.extend(list_line("Benefits".into(), &job.benefits));

  f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

// ─── Applications ─────────────────────────────────────────────────────────────

fn application_color(status: ApplicationStatus) -> Color {
  match status {
    ApplicationStatus::Pending => Color::Yellow,
    ApplicationStatus::Reviewed => Color::Blue,
    ApplicationStatus::Shortlisted => Color::Cyan,
    ApplicationStatus::Rejected => Color::Red,
    ApplicationStatus::Hired => Color::Green,
  }
}

fn applications_table<B: Backend>(f: &mut Frame, area: Rect, tui: &Tui<B>) {
  let t = |key: &str| tui.app.translate(key);
  let records = tui.app.applications.records();
  let block = pane(format!("{} ({})", t(tab_keys(tui.view)[1]), records.len()));

  if records.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new(t("common.empty")).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let header = Row::new(
    ["column.title", "column.applicant", "column.applied", "column.status"]
      .map(|k| Cell::from(t(k))),
  )
  .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let rows = records.iter().map(|record| {
    let application = &record.application;
    let title = record.job.as_ref().map(|j| j.title.clone()).unwrap_or_else(|| "—".into());
    let applicant = record
      .applicant
      .as_ref()
      .and_then(|a| a.full_name.clone())
      .unwrap_or_else(|| "—".into());
    Row::new(vec![
      Cell::from(title),
      Cell::from(applicant),
      Cell::from(application.applied_at.format("%Y-%m-%d").to_string()),
      Cell::from(application.status.as_str())
        .style(Style::default().fg(application_color(application.status))),
    ])
  });

  let table = Table::new(rows, [
    Constraint::Percentage(35),
    Constraint::Percentage(30),
    Constraint::Percentage(18),
    Constraint::Percentage(17),
  ])
  .header(header)
  .block(block)
  .row_highlight_style(highlight());

  let mut state = TableState::default().with_selected(Some(tui.cursor));
  f.render_stateful_widget(table, area, &mut state);
}

fn application_detail<B: Backend>(
  f: &mut Frame,
  area: Rect,
  tui: &Tui<B>,
  record: Option<ApplicationRecord>,
) {
  let t = |key: &str| tui.app.translate(key);
  let block = pane(t("common.view"));
  let Some(record) = record else {
    f.render_widget(block, area);
    return;
  };

  let mut lines = Vec::new();
  if let Some(job) = &record.job {
    lines.push(Line::from(Span::styled(
      job.title.clone(),
      Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(labelled(t("column.company"), job.company.clone()));
    lines.push(labelled(t("column.salary"), job.salary.clone()));
  }
  if let Some(applicant) = &record.applicant {
    lines.push(Line::from(""));
    if let Some(name) = &applicant.full_name {
      lines.push(labelled(t("column.applicant"), name.clone()));
    }
    if let Some(email) = &applicant.email {
      lines.push(labelled(t("auth.email"), email.clone()));
    }
    if let Some(phone) = &applicant.phone {
      lines.push(labelled(t("auth.phone"), phone.clone()));
    }
    if let Some(years) = applicant.experience_years {
      lines.push(labelled("Exp".into(), format!("{years}")));
    }
    lines.extend(list_line("Skills".into(), &applicant.skills));
  }
  let application = &record.application;
  lines.push(Line::from(""));
  lines.push(labelled(t("column.status"), application.status.to_string()));
  if let Some(letter) = &application.cover_letter {
    lines.push(Line::from(letter.clone()));
  }
  if let Some(notes) = &application.additional_notes {
    lines.push(Line::from(Span::styled(notes.clone(), Style::default().fg(Color::DarkGray))));
  }

  f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}
