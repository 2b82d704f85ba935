use fiddy_core::forms::{FieldView, Mood, PreferenceForm};
use fiddy_core::metrics::Point;
use fiddy_core::{ModuleKind, Origin, QuickAction, Severity, SAMPLE_METRICS};
use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{BarChart, Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, PlanModule, Screen};

const SAMPLE_TITLE: &str = " Sample data (illustrative, not from your plan) ";

fn accent(kind: ModuleKind) -> Color {
    match kind {
        ModuleKind::Nutrition => Color::Green,
        ModuleKind::Workout => Color::LightRed,
        ModuleKind::Companion => Color::Magenta,
    }
}

/// Animated ellipsis: cycles through ".", "..", "..."
fn dots(frame: u8) -> String {
    ".".repeat(frame as usize + 1)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Home => render_home(app, frame, body_area),
        Screen::Nutrition => {
            let charts = app.show_sample_charts;
            render_plan_screen(&app.nutrition, app.animation_frame, charts, frame, body_area)
        }
        Screen::Workout => {
            let charts = app.show_sample_charts;
            render_plan_screen(&app.workout, app.animation_frame, charts, frame, body_area)
        }
        Screen::Companion => render_companion(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if app.notice.is_some() {
        render_notice(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let section = match app.screen {
        Screen::Home => String::new(),
        Screen::Nutrition => format!(" · {}", ModuleKind::Nutrition.display_name()),
        Screen::Workout => format!(" · {}", ModuleKind::Workout.display_name()),
        Screen::Companion => format!(" · {}", ModuleKind::Companion.display_name()),
    };

    let title = Line::from(vec![
        Span::styled(" Fiddy ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(section, Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Home => " HOME ",
        Screen::Nutrition => " DIET ",
        Screen::Workout => " WORKOUT ",
        Screen::Companion => " POOKIE ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [Span::styled(key, key_style), Span::styled(label, label_style)]
    };

    let hints: Vec<Span> = match (app.screen, app.input_mode) {
        (Screen::Home, _) => [
            hint(" j/k ", " nav "),
            hint(" Enter ", " open "),
            hint(" 1-3 ", " jump "),
            hint(" q ", " quit "),
        ]
        .concat(),
        (Screen::Nutrition | Screen::Workout, _) => [
            hint(" j/k ", " field "),
            hint(" h/l ", " option "),
            hint(" Space ", " choose "),
            hint(" g ", " generate "),
            hint(" J/K ", " scroll "),
            hint(" Esc ", " home "),
        ]
        .concat(),
        (Screen::Companion, InputMode::Normal) => [
            hint(" i ", " type "),
            hint(" h/l ", " mood "),
            hint(" Space ", " pick "),
            hint(" s ", " send "),
            hint(" 1-4 ", " quick "),
            hint(" j/k ", " scroll "),
            hint(" Esc ", " home "),
        ]
        .concat(),
        (Screen::Companion, InputMode::Editing) => [
            hint(" Enter ", " send "),
            hint(" Esc ", " stop typing "),
        ]
        .concat(),
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_home(app: &mut App, frame: &mut Frame, area: Rect) {
    let [intro_area, list_area, status_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    let intro = Paragraph::new(vec![
        Line::from(Span::styled(
            "Your wellness journey starts here",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Personalized diet plans, workout routines, and a friend to talk to.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: true });
    frame.render_widget(intro, intro_area.inner(Margin::new(2, 1)));

    let items: Vec<ListItem> = ModuleKind::all()
        .into_iter()
        .enumerate()
        .map(|(i, kind)| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        kind.display_name(),
                        Style::default().fg(accent(kind)).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("   {}", kind.description()),
                    Style::default().fg(Color::Gray),
                )),
                Line::default(),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Choose a module "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut app.home_state);

    let (key_text, key_color) = if app.has_credential {
        ("API key configured", Color::Green)
    } else {
        ("No API key: set GEMINI_API_KEY or api_key in config.json", Color::Yellow)
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled(key_text, Style::default().fg(key_color)),
        Span::styled(format!("  ·  model {}", app.model), Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(status, status_area);
}

fn field_lines(field: &FieldView, focused: bool, highlight: usize, color: Color) -> Vec<Line<'static>> {
    let marker = if field.required { " *" } else { "" };
    let label_style = if focused {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = Vec::with_capacity(field.options.len() * 2);
    for (i, option) in field.options.iter().enumerate() {
        let chosen = field.chosen.contains(&i);
        let mark = match (field.multi, chosen) {
            (true, true) => "[x] ",
            (true, false) => "[ ] ",
            (false, true) => "(•) ",
            (false, false) => "( ) ",
        };
        let mut style = if chosen {
            Style::default().fg(color)
        } else {
            Style::default().fg(Color::Gray)
        };
        if focused && i == highlight {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(format!("{}{}", mark, option), style));
        spans.push(Span::raw("  "));
    }

    vec![
        Line::from(vec![
            Span::styled(if focused { "> " } else { "  " }, label_style),
            Span::styled(field.label, label_style),
            Span::styled(marker, Style::default().fg(Color::Red)),
        ]),
        Line::from(spans),
        Line::default(),
    ]
}

fn render_plan_screen<F: PreferenceForm>(
    module: &PlanModule<F>,
    animation_frame: u8,
    show_charts: bool,
    frame: &mut Frame,
    area: Rect,
) {
    let kind = F::MODULE;
    let color = accent(kind);
    let loading = module.workflow.is_in_flight();

    let [form_area, right_area] = Layout::horizontal([
        Constraint::Percentage(42),
        Constraint::Percentage(58),
    ])
    .areas(area);

    // Form
    let mut lines: Vec<Line> = Vec::new();
    for (i, field) in module.workflow.form().fields().iter().enumerate() {
        lines.extend(field_lines(field, module.field == i, module.option, color));
    }

    let button_label = if loading {
        format!(" Generating{} ", dots(animation_frame))
    } else {
        format!(" Generate {} ", title_case(kind.artifact()))
    };
    let button_style = if module.on_generate_button() {
        Style::default().bg(color).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(vec![
        Span::raw(if module.on_generate_button() { "> " } else { "  " }),
        Span::styled(button_label, button_style),
    ]));

    let form = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", kind.display_name())),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(form, form_area);

    // Plan + sample charts
    let (plan_area, chart_area) = if show_charts {
        let [plan, charts] = Layout::vertical([Constraint::Min(0), Constraint::Length(12)])
            .areas(right_area);
        (plan, Some(charts))
    } else {
        (right_area, None)
    };

    render_plan_pane(module, animation_frame, color, frame, plan_area);

    if let Some(chart_area) = chart_area {
        render_sample_charts(kind, frame, chart_area);
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_plan_pane<F: PreferenceForm>(
    module: &PlanModule<F>,
    animation_frame: u8,
    color: Color,
    frame: &mut Frame,
    area: Rect,
) {
    let kind = F::MODULE;
    let badges = match kind {
        ModuleKind::Nutrition => " [AI Generated] [Personalized] ",
        _ => " [AI Generated] [Custom Routine] ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Your {} ", title_case(kind.artifact())))
        .title_bottom(Line::from(Span::styled(badges, Style::default().fg(color))).right_aligned());

    let text = match module.workflow.plan() {
        // The most recent plan stays visible while a new one is generated
        Some(plan) => Text::raw(plan.as_str()),
        None if module.workflow.is_in_flight() => Text::from(vec![
            Line::default(),
            Line::from(Span::styled(
                format!("Creating Your Plan{}", dots(animation_frame)),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Analyzing your preferences",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        ]),
        None => Text::from(Span::styled(
            format!(
                "Fill in your preferences and choose Generate to create your {}.",
                kind.artifact()
            ),
            Style::default().fg(Color::DarkGray),
        )),
    };

    let pane = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((module.plan_scroll, 0));
    frame.render_widget(pane, area);
}

fn bar_data(points: &[Point]) -> Vec<(&'static str, u64)> {
    points.iter().map(|p| (p.label, p.value)).collect()
}

fn render_sample_charts(kind: ModuleKind, frame: &mut Frame, area: Rect) {
    let sample_block = |title: &'static str| {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title)
    };

    match kind {
        ModuleKind::Nutrition => {
            let [macros_area, calories_area] = Layout::horizontal([
                Constraint::Percentage(40),
                Constraint::Percentage(60),
            ])
            .areas(area);

            let macros = bar_data(SAMPLE_METRICS.macro_split);
            let chart = BarChart::default()
                .block(sample_block(" Macros % (sample) "))
                .direction(Direction::Horizontal)
                .data(macros.as_slice())
                .bar_width(1)
                .bar_gap(1)
                .max(100)
                .bar_style(Style::default().fg(Color::Green))
                .value_style(Style::default().fg(Color::Black).bg(Color::Green));
            frame.render_widget(chart, macros_area);

            let calories = bar_data(SAMPLE_METRICS.calories_by_day);
            let chart = BarChart::default()
                .block(sample_block(SAMPLE_TITLE))
                .data(calories.as_slice())
                .bar_width(5)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::LightGreen))
                .value_style(Style::default().fg(Color::Black).bg(Color::LightGreen));
            frame.render_widget(chart, calories_area);
        }
        ModuleKind::Workout => {
            let intensity = bar_data(SAMPLE_METRICS.intensity_by_day);
            let chart = BarChart::default()
                .block(sample_block(SAMPLE_TITLE))
                .data(intensity.as_slice())
                .bar_width(5)
                .bar_gap(2)
                .max(10)
                .bar_style(Style::default().fg(Color::LightRed))
                .value_style(Style::default().fg(Color::Black).bg(Color::LightRed));
            frame.render_widget(chart, area);
        }
        ModuleKind::Companion => {}
    }
}

fn render_companion(app: &mut App, frame: &mut Frame, area: Rect) {
    let color = accent(ModuleKind::Companion);

    let [mood_area, chat_area, quick_area, input_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(area);

    // Mood row
    let current = app.chat.session.mood();
    let mut mood_spans = Vec::new();
    for (i, mood) in Mood::ALL.iter().enumerate() {
        let mut style = if current == Some(*mood) {
            Style::default().fg(Color::Black).bg(color)
        } else {
            Style::default().fg(Color::Gray)
        };
        if app.input_mode == InputMode::Normal && i == app.chat.mood_cursor {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        mood_spans.push(Span::styled(format!(" {} {} ", mood.emoji(), mood.label()), style));
        mood_spans.push(Span::raw(" "));
    }
    let moods = Paragraph::new(Line::from(mood_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" How are you feeling? "),
    );
    frame.render_widget(moods, mood_area);

    // Chat history
    app.chat.chat_height = chat_area.height.saturating_sub(2);
    app.chat.chat_width = chat_area.width.saturating_sub(2);

    let mut lines: Vec<Line> = Vec::new();
    for msg in app.chat.session.messages() {
        let (who, style) = match msg.origin {
            Origin::User => ("You", Style::default().fg(Color::Cyan)),
            Origin::Companion => ("Pookie", Style::default().fg(color)),
        };
        lines.push(Line::from(vec![
            Span::styled(who, style.add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(" · {}", msg.created_at.format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        for line in msg.body.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }
    if app.chat.session.is_in_flight() {
        lines.push(Line::from(Span::styled(
            "Pookie",
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("typing{}", dots(app.animation_frame)),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(" Chat with Pookie 💕 "),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.chat.scroll, 0));
    frame.render_widget(chat, chat_area);

    // Quick actions
    let mut quick_spans = Vec::new();
    for (i, action) in QuickAction::all().iter().enumerate() {
        quick_spans.push(Span::styled(
            format!(" {} ", i + 1),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ));
        quick_spans.push(Span::styled(
            format!(" {}  ", action.label()),
            Style::default().fg(Color::Gray),
        ));
    }
    let quick = Paragraph::new(Line::from(quick_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Quick actions "),
    );
    frame.render_widget(quick, quick_area);

    // Input
    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(if app.chat.session.can_send() {
            " Message (Enter to send) "
        } else {
            " Message "
        });

    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat.cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let draft = app.chat.session.draft();
    let input = if draft.is_empty() && !editing {
        Paragraph::new(Span::styled(
            "Share what's on your mind... (press i)",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let visible: String = draft.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan))
    };
    frame.render_widget(input.block(input_block), input_area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_notice(app: &App, frame: &mut Frame, area: Rect) {
    let Some(active) = &app.notice else {
        return;
    };
    let notice = &active.notice;

    let color = match notice.severity {
        Severity::Info => Color::Cyan,
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
    };

    let popup_width = 54.min(area.width.saturating_sub(2));
    let body_lines = if notice.description.is_empty() { 0 } else { 2 };
    let popup_height = (3 + body_lines).min(area.height);
    let popup_area = Rect::new(
        area.x + area.width.saturating_sub(popup_width + 1),
        area.y + 1,
        popup_width,
        popup_height,
    );

    frame.render_widget(Clear, popup_area);

    let mut lines = vec![Line::from(Span::styled(
        notice.title.clone(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];
    if !notice.description.is_empty() {
        lines.push(Line::from(notice.description.clone()));
    }

    let banner = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(banner, popup_area);
}
