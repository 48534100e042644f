//! Popup state and rendering

use crate::types::DecisionRecord;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const POPUP_WIDTH: u16 = 60;
const POPUP_HEIGHT: u16 = 14;

const BACKGROUND: Color = Color::Rgb(0x1a, 0x1a, 0x2e);
const ACCENT: Color = Color::Rgb(0xe9, 0x45, 0x60);

/// What the user has typed so far and whether they decided
#[derive(Debug, Clone)]
pub struct PopupApp {
    title: String,
    message: String,
    input: String,
}

impl PopupApp {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            input: String::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Apply a key press; returns the decision once the user makes one
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<DecisionRecord> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => {
                Some(DecisionRecord::dismissed())
            }
            (KeyCode::Enter, _) => Some(DecisionRecord::answered(self.input.trim())),
            (KeyCode::Backspace, _) => {
                self.input.pop();
                None
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.input.clear();
                None
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.input.push(c);
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = centered(frame.area(), POPUP_WIDTH, POPUP_HEIGHT);
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(ACCENT))
            .title(Line::from(" 🔔 ring ").alignment(Alignment::Center))
            .style(Style::default().bg(BACKGROUND).fg(Color::White));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [title_area, message_area, input_area, help_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(2),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(inner);

        let title = Paragraph::new(self.title.as_str())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(title, title_area);

        let message = Paragraph::new(self.message.as_str())
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(message, message_area);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Type your response... ");
        let input_inner = input_block.inner(input_area);

        // Keep the tail of long input visible
        let visible = input_inner.width.saturating_sub(1) as usize;
        let shown: String = {
            let chars: Vec<char> = self.input.chars().collect();
            let start = chars.len().saturating_sub(visible);
            chars[start..].iter().collect()
        };
        let cursor_x = input_inner.x + shown.chars().count() as u16;
        frame.render_widget(Paragraph::new(shown).block(input_block), input_area);
        frame.set_cursor_position((cursor_x, input_inner.y));

        let help = Line::from(vec![
            Span::styled("Enter", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Span::raw(" Answer   "),
            Span::styled("Esc", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Span::raw(" Dismiss"),
        ]);
        frame.render_widget(Paragraph::new(help).alignment(Alignment::Center), help_area);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}
