//! TUI rendering: header, the routed view, status bar.

pub mod board;
pub mod landing;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};
use rozgar_app::{View, notify::ToastLevel};
use rozgar_core::Backend;

use crate::app::Tui;

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<B: Backend>(f: &mut Frame, tui: &Tui<B>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], tui);
  match tui.view {
    View::Loading => draw_loading(f, rows[1], tui),
    View::Landing => landing::draw(f, rows[1], tui),
    View::JobSeeker | View::Employer | View::Admin => board::draw(f, rows[1], tui),
  }
  draw_status(f, rows[2], tui);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<B: Backend>(f: &mut Frame, area: Rect, tui: &Tui<B>) {
  let t = |key: &str| tui.app.translate(key);
  let snapshot = tui.app.session.snapshot();

  let title_key = if tui.view == View::Admin { "admin.title" } else { "header.title" };
  let left = Span::styled(
    format!(" {}", t(title_key)),
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
  );

  let mut right = Vec::new();
  if let Some(profile) = &snapshot.profile {
    right.push(format!("{}, {}", t("dashboard.welcome"), profile.full_name));
  }
  if tui.offline {
    right.push(t("common.offline"));
  }
  right.push(tui.app.locale.language().code().to_uppercase());
  right.push(Local::now().format("%Y-%m-%d").to_string());
  let right = Span::styled(format!("{} ", right.join("  ")), Style::default().fg(Color::Gray));

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);
  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

fn draw_loading<B: Backend>(f: &mut Frame, area: Rect, tui: &Tui<B>) {
  let middle = Rect { y: area.y + area.height / 2, height: 1.min(area.height), ..area };
  f.render_widget(
    Paragraph::new(tui.app.translate("dashboard.loading"))
      .alignment(Alignment::Center)
      .style(Style::default().fg(Color::DarkGray)),
    middle,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<B: Backend>(f: &mut Frame, area: Rect, tui: &Tui<B>) {
  let (mode_label, hint_key) = match tui.view {
    View::Loading => ("…", None),
    View::Landing => ("LOGIN", Some("hint.landing")),
    View::JobSeeker => ("JOBSEEKER", Some("hint.jobseeker")),
    View::Employer => ("EMPLOYER", Some("hint.employer")),
    View::Admin => ("ADMIN", Some("hint.admin")),
  };
  let mode_label = if tui.search_active { "SEARCH" } else { mode_label };

  // Newest toast wins over the key hints.
  let message = match tui.app.toasts.active().pop() {
    Some(toast) => {
      let color = match toast.level {
        ToastLevel::Success => Color::Green,
        ToastLevel::Error => Color::Red,
      };
      Span::styled(format!("  {}", toast.message), Style::default().fg(color))
    }
    None if tui.search_active => Span::styled(
      format!("  {}: {}_", tui.app.translate("common.search"), tui.search),
      Style::default().fg(Color::Yellow),
    ),
    None => Span::styled(
      format!("  {}", hint_key.map(|k| tui.app.translate(k)).unwrap_or_default()),
      Style::default().fg(Color::DarkGray),
    ),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
  );
  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, message])).style(Style::default().bg(Color::Black)),
    area,
  );
}
