use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, List, ListItem, Paragraph, Widget},
};

use super::app::{command_for, RoleCount};
use crate::models::{BmiCategory, UserProfile};
use crate::router::Route;

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Gray))
}

fn label(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(Color::Gray))
}

fn value(text: String, color: Color) -> Span<'static> {
    Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

/// Greeting and role welcome message
pub fn render_welcome(area: Rect, buf: &mut Buffer, greeting: &str, user: &UserProfile) {
    let block = panel(" 💪 Stay Hungry Gym ");
    let inner = block.inner(area);
    block.render(area, buf);

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{}, {}", greeting, user.nombre),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  ({})", user.rol), Style::default().fg(Color::Gray)),
        ]),
        Line::from(user.rol.welcome_message()),
    ];

    Paragraph::new(lines).render(inner, buf);
}

fn bmi_color(category: BmiCategory) -> Color {
    match category {
        BmiCategory::Normal => Color::Green,
        BmiCategory::BajoPeso | BmiCategory::Sobrepeso => Color::Yellow,
        BmiCategory::Obesidad => Color::Red,
    }
}

/// Profile card with BMI
pub fn render_profile(area: Rect, buf: &mut Buffer, user: &UserProfile, bmi: Option<(f64, BmiCategory)>) {
    let block = panel(" 👤 Perfil ");
    let inner = block.inner(area);
    block.render(area, buf);

    let opt = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        Line::from(vec![label("Email:     "), Span::raw(user.email.clone())]),
        Line::from(vec![label("Edad:      "), Span::raw(opt(user.edad.map(|e| e.to_string())))]),
        Line::from(vec![
            label("Peso:      "),
            Span::raw(opt(user.peso.map(|p| format!("{:.1} kg", p)))),
        ]),
        Line::from(vec![
            label("Estatura:  "),
            Span::raw(opt(user.estatura.map(|e| format!("{:.2} m", e)))),
        ]),
        Line::from(vec![label("Miembro:   "), Span::raw(user.member_since())]),
        Line::from(""),
    ];

    lines.push(match bmi {
        Some((bmi, category)) => Line::from(vec![
            label("IMC:       "),
            value(format!("{:.1}", bmi), bmi_color(category)),
            Span::styled(format!("  {}", category), Style::default().fg(bmi_color(category))),
        ]),
        None => Line::from(vec![
            label("IMC:       "),
            Span::styled("completa peso y estatura", Style::default().fg(Color::DarkGray)),
        ]),
    });

    Paragraph::new(lines).render(inner, buf);
}

/// Role menu with the selected entry highlighted
pub fn render_menu(area: Rect, buf: &mut Buffer, menu: &[Route], selected_index: usize) {
    let block = panel(" ☰ Menú ");
    let inner = block.inner(area);
    block.render(area, buf);

    let items: Vec<ListItem> = menu
        .iter()
        .enumerate()
        .map(|(idx, route)| {
            let style = if idx == selected_index {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::White)
            };

            let content = format!("  {:<14} {}", route.title(), route.path());
            ListItem::new(Line::from(Span::styled(content, style)))
        })
        .collect();

    List::new(items).render(inner, buf);
}

/// Users per role as a bar chart, administrators only
pub fn render_role_counts(area: Rect, buf: &mut Buffer, counts: Option<&[RoleCount]>) {
    let block = panel(" 📊 Usuarios por rol ");
    let inner = block.inner(area);
    block.render(area, buf);

    let Some(counts) = counts else {
        Paragraph::new("No disponible")
            .style(Style::default().fg(Color::Gray))
            .render(inner, buf);
        return;
    };

    let labels: Vec<String> = counts
        .iter()
        .map(|c| format!("{} ({} act.)", c.rol, c.activos))
        .collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(counts.iter())
        .map(|(label, c)| (label.as_str(), c.total as u64))
        .collect();

    BarChart::default()
        .data(&data)
        .bar_width(18)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::White).bg(Color::Green))
        .render(inner, buf);
}

pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" ❓ Help ")
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(area);
    block.render(area, buf);

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  ↑/k      - Move up"),
        Line::from("  ↓/j      - Move down"),
        Line::from("  Enter    - Show the command for a screen"),
        Line::from("  R        - Refresh data"),
        Line::from("  ?        - Toggle this help"),
        Line::from("  q/Esc    - Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or ESC to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    Paragraph::new(help_text).render(inner, buf);
}

pub fn render_status_bar(area: Rect, buf: &mut Buffer, status: &str, selected: Option<Route>) {
    let message = if status.is_empty() {
        selected.map(command_for).unwrap_or_default().to_string()
    } else {
        status.to_string()
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", message),
            Style::default().fg(Color::Green).bg(Color::DarkGray),
        ),
        Span::styled(
            " Press ? for help ",
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        ),
    ]);
    Paragraph::new(line).render(area, buf);
}
