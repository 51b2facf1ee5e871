use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};

use crate::app::{App, FlashLevel, InputMode, Page, PageKind};
use crate::k8s::format_elapsed_seconds;
use crate::view::{ConfirmKind, Details, ResourceViewer};

const BG: Color = Color::Rgb(9, 15, 25);
const PANEL: Color = Color::Rgb(16, 27, 44);
const ACCENT: Color = Color::Rgb(52, 211, 153);
const MUTED: Color = Color::Rgb(140, 156, 178);
const WARN: Color = Color::Rgb(251, 191, 36);
const ERROR: Color = Color::Rgb(248, 113, 113);
const MARKED: Color = Color::Rgb(125, 211, 252);
const PL_A: Color = Color::Rgb(17, 94, 89);
const PL_B: Color = Color::Rgb(30, 64, 175);
const PL_C: Color = Color::Rgb(55, 48, 163);

pub fn render(frame: &mut Frame, app: &App) {
    let headless = app.config().settings().is_headless();
    let crumbsless = app.config().settings().is_crumbsless();
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if headless { 0 } else { 2 }),
            Constraint::Min(3),
            Constraint::Length(if crumbsless { 0 } else { 1 }),
            Constraint::Length(1),
        ])
        .split(frame.area());

    if !headless {
        render_header(frame, root[0], app);
    }
    match app.top() {
        Some(Page {
            kind: PageKind::Resource(viewer),
            ..
        }) => render_table(frame, root[1], viewer.as_ref()),
        Some(Page {
            kind: PageKind::Details(details),
            ..
        }) => render_details(frame, root[1], details),
        None => {}
    }
    if !crumbsless {
        render_crumbs(frame, root[2], app);
    }
    render_footer(frame, root[3], app);

    if app.show_help() {
        render_help_modal(frame, app);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let config = app.config();
    let mut spans = Vec::new();
    push_powerline_segment(&mut spans, " OSC ", Color::Black, ACCENT, PL_A);
    push_powerline_segment(
        &mut spans,
        format!(" ctx {} ", compact_text(config.current_context(), 20)),
        Color::White,
        PL_A,
        PL_B,
    );
    push_powerline_segment(
        &mut spans,
        format!(" cluster {} ", compact_text(config.current_cluster(), 20)),
        Color::White,
        PL_B,
        PL_C,
    );
    push_powerline_segment(
        &mut spans,
        format!(" ns {} ", compact_text(&config.active_namespace(), 16)),
        Color::White,
        PL_C,
        BG,
    );
    if config.is_read_only() {
        spans.push(Span::styled(
            " read-only ",
            Style::default().fg(Color::Black).bg(WARN).add_modifier(Modifier::BOLD),
        ));
    }
    let forwards = app.port_forwards().len();
    if forwards > 0 {
        spans.push(Span::styled(
            format!(" pf:{forwards} "),
            Style::default().fg(ACCENT).bg(BG),
        ));
    }

    let mut hint_spans = Vec::new();
    for (key, description) in app.hints() {
        let chunk_width = key.chars().count() + description.chars().count() + 4;
        if spans_width(&hint_spans) + chunk_width > area.width as usize {
            break;
        }
        hint_spans.push(Span::styled(format!("<{key}>"), Style::default().fg(ACCENT)));
        hint_spans.push(Span::styled(
            format!(" {description} "),
            Style::default().fg(MUTED),
        ));
    }

    frame.render_widget(
        Paragraph::new(vec![Line::from(spans), Line::from(hint_spans)])
            .style(Style::default().bg(BG).fg(Color::White)),
        area,
    );
}

fn render_table(frame: &mut Frame, area: Rect, viewer: &dyn ResourceViewer) {
    let table = viewer.table();
    if let Some(error) = &table.error {
        let panel = Paragraph::new(Text::from(error.clone()))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(format!("{} Error", viewer.name()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(ERROR))
                    .style(Style::default().bg(PANEL)),
            )
            .style(Style::default().fg(ERROR));
        frame.render_widget(panel, area);
        return;
    }

    let headers = &table.headers;
    let colorer = viewer.colorer();
    let visible_rows = table.visible_rows();

    let header_row = Row::new(headers.iter().map(|header| {
        let label = match &table.sort {
            Some(sort) if sort.column.eq_ignore_ascii_case(header) => {
                format!("{header}{}", if sort.ascending { "↑" } else { "↓" })
            }
            _ => header.clone(),
        };
        Cell::from(label).style(Style::default().add_modifier(Modifier::BOLD))
    }))
    .height(1)
    .style(Style::default().fg(ACCENT));

    let rows = visible_rows.iter().map(|row| {
        let color = if table.marked.contains(&row.path()) {
            MARKED
        } else {
            match colorer(headers, row) {
                Color::Reset => Color::White,
                color => color,
            }
        };
        Row::new(
            row.columns
                .iter()
                .map(|column| Cell::from(column.clone()).style(Style::default().fg(color))),
        )
    });

    let mut title = format!("{} ({})", viewer.name(), visible_rows.len());
    if !table.filter.is_empty() {
        title.push_str(&format!(" </{}>", table.filter));
    }
    if let Some(refreshed) = table.last_refreshed {
        title.push_str(&format!(" {}", refreshed.format("%H:%M:%S")));
    }
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .style(Style::default().bg(PANEL));

    let widget = Table::new(rows, column_constraints(headers.len()))
        .header(header_row)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(
            Style::default()
                .bg(Color::Rgb(24, 36, 58))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select((!visible_rows.is_empty()).then_some(table.selected));
    frame.render_stateful_widget(widget, area, &mut state);
}

fn render_details(frame: &mut Frame, area: Rect, details: &Details) {
    let (text, border) = if details.loading {
        (Text::from("Loading..."), MUTED)
    } else if let Some(error) = &details.error {
        let mut lines = vec![Line::styled(error.clone(), Style::default().fg(ERROR))];
        lines.extend(details.content.lines().map(|line| Line::from(line.to_string())));
        (Text::from(lines), ERROR)
    } else {
        (Text::from(details.content.clone()), ACCENT)
    };
    let block = Block::default()
        .title(details.heading())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(PANEL));
    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(Color::White))
        .scroll((details.scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_crumbs(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    let last = app.pages().len().saturating_sub(1);
    for (index, page) in app.pages().iter().enumerate() {
        let bg = if index == last { ACCENT } else { PL_B };
        let fg = if index == last { Color::Black } else { Color::White };
        spans.push(Span::styled(
            format!(" {} ", page.title().to_ascii_lowercase()),
            Style::default().fg(fg).bg(bg),
        ));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    match app.mode() {
        InputMode::Normal => {
            if let Some(flash) = app.flash() {
                let (bg, fg) = match flash.level {
                    FlashLevel::Info => (PL_B, Color::White),
                    FlashLevel::Warn => (WARN, Color::Black),
                    FlashLevel::Error => (ERROR, Color::Black),
                };
                push_powerline_segment(
                    &mut spans,
                    format!(" {} ", compact_text(&flash.message, area.width as usize)),
                    fg,
                    bg,
                    BG,
                );
            } else if let Some(age) = refreshed_age(app) {
                spans.push(Span::styled(
                    format!(" refreshed {age} ago"),
                    Style::default().fg(MUTED),
                ));
            }
        }
        InputMode::Confirm(kind, target) => {
            let verb = match kind {
                ConfirmKind::Restart => "Restart",
                ConfirmKind::Delete => "Delete",
            };
            push_powerline_segment(
                &mut spans,
                format!(" {verb} {} {}? (y/n) ", target.gvr.resource(), target.path),
                Color::Black,
                WARN,
                BG,
            );
        }
        mode => {
            let (label, prompt, bg) = match mode {
                InputMode::Filter => (" flt ", format!("/{}", app.input()), WARN),
                InputMode::Prompt(kind, target) => (
                    " ask ",
                    format!(
                        "{} {} {}: {}",
                        kind.label(),
                        target.path,
                        kind.placeholder(),
                        app.input()
                    ),
                    WARN,
                ),
                _ => (" cmd ", format!(":{}", app.input()), ACCENT),
            };
            push_powerline_segment(&mut spans, label, Color::Black, bg, PL_B);
            push_powerline_segment(&mut spans, format!(" {prompt} "), Color::White, PL_B, BG);
        }
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );
}

fn render_help_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(format!(
            "osc help  ctx:{}  ns:{}",
            app.config().current_context(),
            app.config().active_namespace()
        )),
        Line::from(""),
        Line::from(format!(
            "Favorites: {}",
            app.config().fav_namespaces().join("  ")
        )),
        Line::from("Commands: :<alias>  :ns <name>  :pol <s|u|g> <name>  :q"),
        Line::from("Input: : command  / filter  Tab complete  Esc cancel"),
        Line::from(""),
    ];
    for (key, description) in app.hints() {
        lines.push(Line::from(vec![
            Span::styled(format!("{key:>12} "), Style::default().fg(ACCENT)),
            Span::raw(description),
        ]));
    }

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .style(Style::default().bg(PANEL)),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(modal, area);
}

fn refreshed_age(app: &App) -> Option<String> {
    let Some(Page {
        kind: PageKind::Resource(viewer),
        ..
    }) = app.top()
    else {
        return None;
    };
    let refreshed = viewer.table().last_refreshed?;
    let seconds = (chrono::Local::now() - refreshed).num_seconds().max(0);
    Some(format_elapsed_seconds(seconds))
}

fn push_powerline_segment(
    spans: &mut Vec<Span<'static>>,
    content: impl Into<String>,
    fg: Color,
    bg: Color,
    next_bg: Color,
) {
    spans.push(Span::styled(
        content.into(),
        Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("", Style::default().fg(bg).bg(next_bg)));
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|span| span.content.chars().count()).sum()
}

fn compact_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }

    if max_chars <= 1 {
        return "…".to_string();
    }

    let mut out = value
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    out.push('…');
    out
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn column_constraints(columns: usize) -> Vec<Constraint> {
    if columns == 0 {
        return vec![Constraint::Percentage(100)];
    }

    let width = (100 / columns as u16).max(1);
    (0..columns)
        .map(|_| Constraint::Percentage(width))
        .collect()
}
