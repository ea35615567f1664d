//! UI rendering with Ratatui.

use crate::app::{App, AppState, AuthField, DashboardStatus, InputMode};
use crate::form::{CredentialForm, FormField};
use crate::toast::ToastVariant;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use vaultx_core::{Category, Credential};

/// Fixed-width mask shown for hidden passwords.
const PASSWORD_MASK: &str = "••••••••";

/// Height of one credential card.
const CARD_HEIGHT: u16 = 9;

/// Main render function.
pub fn render(frame: &mut Frame, app: &App) {
    match app.state {
        AppState::Landing => render_landing(frame),
        AppState::Auth => render_auth(frame, app),
        AppState::Dashboard => render_dashboard(frame, app),
        AppState::Quit => {}
    }
    render_toasts(frame, app);
}

/// Cards per grid row for a terminal `width`.
pub fn grid_columns(width: u16) -> usize {
    match width {
        w if w >= 150 => 3,
        w if w >= 100 => 2,
        _ => 1,
    }
}

fn render_landing(frame: &mut Frame) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Tagline
            Constraint::Length(2), // Actions
            Constraint::Min(6),    // Features
        ])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled("🔑 ", Style::default()),
        Span::styled(
            "VaultX Password Manager",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let tagline = Paragraph::new(
        "Securely store and manage all your passwords in one vault.\n\
         Access your credentials anywhere, anytime.",
    )
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center);
    frame.render_widget(tagline, chunks[1]);

    let actions = Paragraph::new(Line::from(vec![
        Span::styled(" Enter ", Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::raw(" Get Started   "),
        Span::styled(" s ", Style::default().fg(Color::Cyan)),
        Span::raw(" Sign In   "),
        Span::styled(" q ", Style::default().fg(Color::DarkGray)),
        Span::raw(" Quit"),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(actions, chunks[2]);

    let features = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[3]);

    let cards = [
        ("🛡 Hosted Storage", "Your credentials live in your own backend project."),
        ("🔒 Private", "Row-level policies keep every vault to its owner."),
        ("⚡ Quick Access", "Find and copy your credentials instantly with search."),
    ];
    for ((heading, body), area) in cards.iter().zip(features.iter()) {
        let block = Block::default()
            .title(format!(" {} ", heading))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(*body)
            .block(block)
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, *area);
    }
}

fn render_auth(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let dialog_area = centered_rect(50, 10, area);

    frame.render_widget(Clear, dialog_area);

    let form = &app.auth_form;
    let heading = if form.sign_up {
        " 🔐 VaultX - Create Account "
    } else {
        " 🔐 VaultX - Sign In "
    };

    let block = Block::default()
        .title(heading)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    let masked = "*".repeat(form.password.chars().count());
    render_input(
        frame,
        "Email",
        &form.email,
        form.focus == AuthField::Email,
        chunks[0],
    );
    render_input(
        frame,
        "Password",
        &masked,
        form.focus == AuthField::Password,
        chunks[1],
    );

    let status = if app.is_busy() {
        if form.sign_up {
            "Creating account..."
        } else {
            "Signing in..."
        }
    } else {
        ""
    };
    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::Yellow)),
        chunks[2],
    );

    let toggle = if form.sign_up {
        "Ctrl+N: sign in instead"
    } else {
        "Ctrl+N: create an account"
    };
    let help = Paragraph::new(format!("Enter: submit | Tab: next | {} | Esc: back", toggle))
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    frame.render_widget(help, chunks[3]);
}

fn render_input(frame: &mut Frame, label: &str, value: &str, focused: bool, area: Rect) {
    let cursor = if focused { "_" } else { "" };
    let marker_color = if focused { Color::Cyan } else { Color::DarkGray };
    let lines = vec![
        Line::from(Span::styled(label, Style::default().fg(Color::DarkGray))),
        Line::from(vec![
            Span::styled("▸ ", Style::default().fg(marker_color)),
            Span::styled(value, Style::default().fg(Color::White)),
            Span::styled(cursor, Style::default().fg(Color::White)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_dashboard(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.dashboard.status == DashboardStatus::Loading {
        let loading = Paragraph::new("🔑\nLoading your vault...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(loading, centered_rect(40, 2, area));
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Search
            Constraint::Min(3),    // Grid
            Constraint::Length(1), // Help line
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_search(frame, app, chunks[1]);
    render_grid(frame, app, chunks[2]);

    let help = Paragraph::new(
        "a: add | e: edit | d: delete | v: show | u/p/w: copy | /: search | L: logout | q: quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);

    if let Some(form) = app.active_form() {
        render_form(frame, form, area);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let count = app.dashboard.credentials.len();
    let account = app
        .dashboard
        .user
        .as_ref()
        .and_then(|u| u.email.clone())
        .unwrap_or_default();

    let line = Line::from(vec![
        Span::styled(
            " 🔑 VaultX ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} credentials stored ", count),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(account, Style::default().fg(Color::Gray)),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let searching = app.input_mode == InputMode::Search;
    let border_color = if searching { Color::Magenta } else { Color::DarkGray };

    let query = &app.dashboard.search_query;
    let mut spans = vec![Span::styled("🔍 ", Style::default())];
    if query.is_empty() && !searching {
        spans.push(Span::styled(
            "Search credentials...",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(query.as_str(), Style::default().fg(Color::White)));
    }
    if searching {
        spans.push(Span::styled(
            "_",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    let credentials = app.filtered_credentials();

    if credentials.is_empty() {
        let hint = if app.dashboard.search_query.is_empty() {
            "Start by adding your first credential (press a)"
        } else {
            "No credentials match your search"
        };
        let text = vec![
            Line::from(Span::styled(
                "No credentials yet",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        ];
        let message = Paragraph::new(text).alignment(Alignment::Center);
        frame.render_widget(message, centered_rect(area.width, 2, area));
        return;
    }

    let columns = app.grid_columns.max(1);
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = app.dashboard.selected_index / columns;
    // Scroll so the selected row stays on screen.
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(area);

    for (offset, row_area) in row_areas.iter().enumerate() {
        let row = first_row + offset;
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);

        for (col, cell) in cells.iter().enumerate() {
            let index = row * columns + col;
            if let Some(credential) = credentials.get(index) {
                let selected = index == app.dashboard.selected_index;
                render_card(frame, app, credential, selected, *cell);
            }
        }
    }
}

/// Badge colour per category.
fn category_color(category: Category) -> Color {
    match category {
        Category::Social => Color::Blue,
        Category::Work => Color::Green,
        Category::Finance => Color::Yellow,
        Category::General => Color::Magenta,
    }
}

fn render_card(frame: &mut Frame, app: &App, credential: &Credential, selected: bool, area: Rect) {
    let border_color = if selected { Color::Cyan } else { Color::DarkGray };
    let category = credential.category();

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", credential.title),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(Span::styled(
            format!(" {} ", category.as_str()),
            Style::default().fg(category_color(category)),
        )))
        .borders(Borders::ALL)
        .border_type(if selected {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let password = if app.is_revealed(&credential.id) {
        credential.password.as_str()
    } else {
        PASSWORD_MASK
    };

    let mut lines = Vec::new();
    if !credential.website().is_empty() {
        lines.push(Line::from(vec![
            Span::styled("🌐 ", Style::default()),
            Span::styled(
                credential.website(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("👤 ", Style::default()),
        Span::styled(credential.username.as_str(), Style::default().fg(Color::Green)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("🔑 ", Style::default()),
        Span::styled(password, Style::default().fg(Color::Yellow)),
    ]));
    if !credential.notes().is_empty() {
        lines.push(Line::from(""));
        for note_line in credential.notes().lines().take(2) {
            lines.push(Line::from(Span::styled(
                note_line,
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_form(frame: &mut Frame, form: &CredentialForm, area: Rect) {
    let dialog_width = 64.min(area.width.saturating_sub(4));
    let dialog_height = 22.min(area.height.saturating_sub(2));
    let dialog_area = centered_rect(dialog_width, dialog_height, area);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(format!(" {} ", form.heading()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let mut constraints: Vec<Constraint> = FormField::all()
        .iter()
        .map(|field| match field {
            FormField::Notes => Constraint::Min(4),
            _ => Constraint::Length(2),
        })
        .collect();
    constraints.push(Constraint::Length(1)); // Validation
    constraints.push(Constraint::Length(1)); // Actions

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner);

    for (field, chunk) in FormField::all().iter().zip(chunks.iter()) {
        render_form_field(frame, form, *field, *chunk);
    }

    let n = FormField::all().len();
    if let Some(message) = &form.validation {
        frame.render_widget(
            Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red)),
            chunks[n],
        );
    }

    let submit_style = if form.saving {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    };
    let actions = Line::from(vec![
        Span::styled(" Esc ", Style::default().fg(Color::DarkGray)),
        Span::raw("Cancel  "),
        Span::styled(format!(" {} ", form.submit_label()), submit_style),
        Span::styled("  Ctrl+G: generate password", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(actions), chunks[n + 1]);
}

fn render_form_field(frame: &mut Frame, form: &CredentialForm, field: FormField, area: Rect) {
    let focused = form.focus == field;
    let value = form.value(field);

    let value_span = if field == FormField::Category {
        let category = form.draft.category();
        Span::styled(
            format!("◂ {} ▸", category.label()),
            Style::default().fg(category_color(category)),
        )
    } else if value.is_empty() && !focused {
        Span::styled(field.placeholder(), Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(value.to_string(), Style::default().fg(Color::White))
    };

    let marker_color = if focused { Color::Cyan } else { Color::DarkGray };
    let label = Line::from(Span::styled(
        field.label(),
        Style::default().fg(marker_color),
    ));

    if field == FormField::Notes {
        let text = format!("{}{}", value, if focused { "_" } else { "" });
        let notes = Paragraph::new(text)
            .block(
                Block::default()
                    .title(label)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(marker_color)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(notes, area);
        return;
    }

    let mut input = vec![Span::styled("▸ ", Style::default().fg(marker_color)), value_span];
    if focused && field != FormField::Category {
        input.push(Span::styled("_", Style::default().fg(Color::White)));
    }

    frame.render_widget(Paragraph::new(vec![label, Line::from(input)]), area);
}

fn render_toasts(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let width = 44.min(area.width);
    let mut y = area.y + area.height;

    for toast in app.toasts.iter() {
        let height = 4;
        if y < area.y + height {
            break;
        }
        y -= height;
        let toast_area = Rect::new(area.x + area.width - width, y, width, height);

        let color = match toast.variant {
            ToastVariant::Default => Color::Cyan,
            ToastVariant::Destructive => Color::Red,
        };

        frame.render_widget(Clear, toast_area);
        let paragraph = Paragraph::new(toast.description.as_str())
            .block(
                Block::default()
                    .title(Span::styled(
                        format!(" {} ", toast.title),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, toast_area);
    }
}

/// Helper to create a centered rectangle.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppOptions;
    use crate::clipboard::testing::RecordingClipboard;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;
    use vaultx_core::{CredentialDraft, MemoryBackend};

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app(backend: Arc<MemoryBackend>) -> App {
        let mut app = App::new(
            backend,
            Box::new(RecordingClipboard::default()),
            AppOptions::default(),
        );
        while app.pending.is_some() {
            app.run_pending();
        }
        app.grid_columns = grid_columns(120);
        app
    }

    #[test]
    fn grid_columns_follow_width() {
        assert_eq!(grid_columns(80), 1);
        assert_eq!(grid_columns(120), 2);
        assert_eq!(grid_columns(200), 3);
    }

    #[test]
    fn password_is_masked_until_revealed() {
        let backend = Arc::new(MemoryBackend::signed_in("alice"));
        backend.seed(
            "alice",
            CredentialDraft {
                title: "Gmail".into(),
                username: "alice".into(),
                password: "Sup3rSecret".into(),
                website: "mail.google.com".into(),
                ..Default::default()
            },
        );
        let mut app = app(backend);

        let text = screen_text(&app);
        assert!(text.contains("Gmail"));
        assert!(text.contains("mail.google.com"));
        assert!(!text.contains("https://mail.google.com"));
        assert!(text.contains("1 credentials stored"));
        assert!(!text.contains("Sup3rSecret"));

        app.toggle_reveal();
        assert!(screen_text(&app).contains("Sup3rSecret"));
    }

    #[test]
    fn empty_search_shows_no_match_message() {
        let backend = Arc::new(MemoryBackend::signed_in("alice"));
        let mut app = app(backend);

        assert!(screen_text(&app).contains("Start by adding your first credential"));
        app.search_push('z');
        assert!(screen_text(&app).contains("No credentials match your search"));
    }

    #[test]
    fn landing_shows_sign_in_links() {
        let app = app(Arc::new(MemoryBackend::new()));
        let text = screen_text(&app);
        assert!(text.contains("VaultX Password Manager"));
        assert!(text.contains("Sign In"));
    }
}
