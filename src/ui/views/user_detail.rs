use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Draw the detail lines of a single user
pub fn draw_user_detail(
  frame: &mut Frame,
  area: Rect,
  label: &str,
  lines: &[(&'static str, String)],
) {
  let block = Block::default()
    .title(format!(" {} ", label))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  let text: Vec<Line> = lines
    .iter()
    .map(|(field, value)| {
      Line::from(vec![
        Span::styled(format!("{:<10}", field), Style::default().fg(Color::DarkGray)),
        Span::raw(value.as_str()),
      ])
    })
    .collect();

  let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
  frame.render_widget(paragraph, area);
}
