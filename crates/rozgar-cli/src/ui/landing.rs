//! Landing view: sign-in form beside the public job listing.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use rozgar_core::Backend;

use super::board;
use crate::app::{LoginMode, Tui};

pub fn draw<B: Backend>(f: &mut Frame, area: Rect, tui: &Tui<B>) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
    .split(area);

  draw_form(f, cols[0], tui);
  board::jobs_table(f, cols[1], tui, tui.app.translate("landing.stats.jobs"), None);
}

fn draw_form<B: Backend>(f: &mut Frame, area: Rect, tui: &Tui<B>) {
  let t = |key: &str| tui.app.translate(key);
  let form = &tui.form;

  let block = Block::default()
    .title(format!(" {} ", t("auth.welcome")))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mode = match form.mode {
    LoginMode::Email => t("auth.email"),
    LoginMode::Otp => t("auth.phone"),
  };
  let mut lines = vec![
    Line::from(Span::styled(t("landing.hero.title"), Style::default().add_modifier(Modifier::BOLD))),
    Line::from(Span::styled(t("landing.hero.subtitle"), Style::default().fg(Color::Gray))),
    Line::from(""),
    Line::from(format!("{} · {mode}", t("auth.signin.subtitle"))),
    Line::from(""),
  ];
  if form.mode == LoginMode::Email {
    lines.push(Line::from(Span::styled(t("auth.who.are.you"), Style::default().fg(Color::Cyan))));
    lines.push(Line::from(format!("  ‹ {} ›", t(form.role.label_key()))));
  }

  for (i, field) in form.fields().into_iter().enumerate() {
    let focused = i == form.focus;
    let value = if field.secret { "•".repeat(field.value.chars().count()) } else { field.value.to_owned() };
    let cursor = if focused { "_" } else { "" };
    let label_style = if focused {
      Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Cyan)
    };
    lines.push(Line::from(Span::styled(t(field.label), label_style)));
    lines.push(Line::from(format!("  {value}{cursor}")));
  }

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    format!("[ Enter: {} ]", t(form.action())),
    Style::default().fg(Color::Black).bg(Color::Cyan),
  )));

  if tui.user_id().is_some() {
    // Signed in, but the account has no profile yet.
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      format!("F10: {}", t("header.logout")),
      Style::default().fg(Color::DarkGray),
    )));
  }

  f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}
