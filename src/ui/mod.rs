mod views;

use crate::app::{App, ViewState};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  draw_header(frame, chunks[0], app);

  // Draw current view
  if let Some(view) = app.current_view() {
    match view {
      ViewState::UserList {
        rows,
        selected,
        loading,
      } => {
        views::users::draw_user_list(frame, chunks[1], rows, *selected, *loading);
      }
      ViewState::UserDetail { lines, .. } => {
        let label = app.view_breadcrumb().pop().unwrap_or_default();
        views::user_detail::draw_user_detail(frame, chunks[1], &label, lines);
      }
    }
  }

  // Draw status bar
  draw_status_bar(frame, chunks[2], app);
}

/// Draw the header bar with logo, title and breadcrumb
fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
  let header = Line::from(vec![
    Span::styled(" u9s ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", app.title()), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", app.view_breadcrumb().join(" > ")),
      Style::default().fg(Color::Yellow).bold(),
    ),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = match app.status_error() {
    Some(error) => (format!(" Error: {}", error), Style::default().fg(Color::Red)),
    None => (
      " j/k:nav  Enter:details  r:reload  q:back  Ctrl-C:quit".to_string(),
      Style::default().fg(Color::DarkGray),
    ),
  };

  let paragraph = Paragraph::new(content).style(style);
  frame.render_widget(paragraph, area);
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}
