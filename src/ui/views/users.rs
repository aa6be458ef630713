use crate::ui::truncate;
use crate::users::UserRow;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

pub fn draw_user_list(
  frame: &mut Frame,
  area: Rect,
  rows: &[UserRow],
  selected: usize,
  loading: bool,
) {
  let title = if loading {
    " Users (loading...) ".to_string()
  } else {
    format!(" Users ({}) ", rows.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if rows.is_empty() {
    let content = if loading { "Loading users..." } else { "No users found." };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = rows
    .iter()
    .map(|row| {
      let line = Line::from(vec![
        Span::raw(format!("{:<30}", truncate(&row.name, 30))),
        Span::raw(" "),
        Span::styled(format!("{:>5}", row.id), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(
          truncate(&row.username, 30),
          Style::default().fg(Color::Yellow),
        ),
      ]);
      ListItem::new(line)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(selected));

  frame.render_stateful_widget(list, area, &mut state);
}
