use ratatui::{prelude::*, widgets::*};
use shared::NotificationLevel;
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerWidget};

use crate::app::{App, Mode};
use crate::cache::CollectionKey;
use crate::panel::Loadable;
use crate::resolver::resolve_column;
use crate::store::BoardSnapshot;

const CARD_HEIGHT: u16 = 3;

pub fn draw(f: &mut Frame, app: &mut App) {
    let snapshot = app.snapshot.clone();
    let full = f.area();
    app.column_areas.clear();
    app.card_areas.clear();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Board (+ logs)
            Constraint::Length(1), // Help footer
        ])
        .split(full);

    draw_header(f, app, chunks[0]);

    let board_area = if app.show_log {
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[1]);
        draw_log(f, app, main_chunks[1]);
        main_chunks[0]
    } else {
        chunks[1]
    };

    draw_board(f, app, &snapshot, board_area);
    draw_footer(f, app, chunks[2]);

    if matches!(app.mode, Mode::Panel | Mode::Metrics) {
        draw_panel(f, app, &snapshot, full);
    }
    if app.mode == Mode::Metrics {
        draw_metrics_form(f, app, full);
    }
    if app.mode == Mode::Confirm {
        draw_confirm(f, app, full);
    }

    draw_toasts(f, app, board_area);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let loading = [
        CollectionKey::WorkflowStages,
        CollectionKey::Campaigns,
        CollectionKey::Applications,
        CollectionKey::Creators,
    ]
    .iter()
    .any(|key| app.store().cache().is_loading(*key));

    let mut spans = vec![
        Span::raw(" Palco "),
        Span::styled(" Quadro de Campanhas ", Style::default().fg(Color::Yellow)),
        Span::raw(format!(" | empresa {} | ", app.store().company_id())),
        if loading {
            Span::styled(
                " Carregando... ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(" Sincronizado ", Style::default().fg(Color::Green))
        },
    ];

    if let Some(campaign_id) = app.store().campaign_filter() {
        let title = app
            .store()
            .campaigns()
            .iter()
            .find(|c| c.id == campaign_id)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| format!("#{campaign_id}"));
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!(" Filtro: {title} "),
            Style::default().fg(Color::Magenta),
        ));
    }

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(header, area);
}

fn draw_board(f: &mut Frame, app: &mut App, snapshot: &BoardSnapshot, area: Rect) {
    if snapshot.stages.is_empty() {
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Nenhuma etapa configurada",
                Style::default().fg(Color::Yellow),
            )),
        ];
        if let Some(error) = app.store().cache().last_error(CollectionKey::WorkflowStages) {
            lines.push(Line::from(Span::styled(
                error,
                Style::default().fg(Color::Red).add_modifier(Modifier::DIM),
            )));
            lines.push(Line::from(Span::styled(
                "Pressione 'r' para tentar novamente",
                Style::default().fg(Color::DarkGray),
            )));
        }
        let empty = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    }

    let hover = app.drag.hover_stage().map(str::to_string);
    let dragging = app.drag.dragging_card();
    let selected_column = app.selected_column;
    let selected_card = app.selected_card;
    let is_dragging = app.drag.is_dragging();

    let columns = snapshot.columns();
    let constraints = vec![Constraint::Ratio(1, columns.len() as u32); columns.len()];
    let column_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (column_index, column) in columns.iter().enumerate() {
        let column_area = column_chunks[column_index];
        app.column_areas
            .push((column_area, column.stage.name.clone()));

        let hovered = hover.as_deref() == Some(column.stage.name.as_str());
        let border_style = if hovered {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else if column_index == selected_column && !is_dragging {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(
                format!(" {} ({}) ", column.stage.name, column.cards.len()),
                Style::default().fg(stage_color(&column.stage.color)),
            ));
        let inner = block.inner(column_area);
        f.render_widget(block, column_area);

        if column.cards.is_empty() {
            if hovered {
                let hint = Paragraph::new("▼ solte aqui")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Yellow));
                f.render_widget(hint, inner);
            }
            continue;
        }

        for (card_index, card) in column.cards.iter().enumerate() {
            let y = inner.y + (card_index as u16) * CARD_HEIGHT;
            if y + CARD_HEIGHT > inner.y + inner.height {
                let remaining = column.cards.len() - card_index;
                if inner.y + inner.height > y {
                    let more_area = Rect::new(inner.x, y, inner.width, 1);
                    let more = Paragraph::new(format!("… mais {remaining}"))
                        .style(Style::default().fg(Color::DarkGray));
                    f.render_widget(more, more_area);
                }
                break;
            }
            let card_area = Rect::new(inner.x, y, inner.width, CARD_HEIGHT);
            app.card_areas
                .push((card_area, card.id(), column.stage.name.clone()));

            let moving = app.store().is_moving(card.id());
            let is_selected = !is_dragging
                && column_index == selected_column
                && card_index == selected_card
                && app.mode == Mode::Board;
            let is_lifted = dragging == Some(card.id());

            let marker = if moving {
                "⏳ "
            } else if is_lifted {
                "↕ "
            } else {
                "• "
            };
            let mut name_style = Style::default().add_modifier(Modifier::BOLD);
            let mut title_style = Style::default().fg(Color::DarkGray);
            if moving {
                name_style = name_style.add_modifier(Modifier::DIM);
                title_style = title_style.add_modifier(Modifier::DIM);
            }
            if is_lifted {
                name_style = name_style.fg(Color::Yellow);
            }

            let stale = resolve_column(card.workflow_status(), &snapshot.stages)
                .is_some_and(|a| a.is_fallback() && card.workflow_status().is_some());
            let mut first_line = vec![Span::raw(marker), Span::styled(&card.creator.name, name_style)];
            if stale {
                first_line.push(Span::styled(
                    " ⚠",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::DIM),
                ));
            }

            let mut paragraph = Paragraph::new(vec![
                Line::from(first_line),
                Line::from(Span::styled(
                    format!("  {}", card.campaign.title),
                    title_style,
                )),
            ]);
            if is_selected {
                paragraph = paragraph.style(Style::default().add_modifier(Modifier::REVERSED));
            }
            f.render_widget(paragraph, card_area);
        }
    }
}

fn draw_log(f: &mut Frame, app: &App, area: Rect) {
    let log = TuiLoggerWidget::default()
        .block(
            Block::default()
                .title(" Logs ")
                .border_style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::DIM),
                )
                .borders(Borders::ALL),
        )
        .output_separator('|')
        .output_timestamp(Some("%H:%M:%S".to_string()))
        .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
        .output_target(false)
        .output_file(false)
        .output_line(false)
        .style(Style::default().fg(Color::White))
        .state(&app.logger_state);
    f.render_widget(log, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hint = if app.drag.is_dragging() {
        " ←/→ escolher coluna | Enter soltar | Esc cancelar"
    } else {
        match app.mode {
            Mode::Board => {
                " q sair | r atualizar | f filtro | x excluir | setas navegar | g arrastar | Enter abrir | l logs"
            }
            Mode::Panel => " Esc fechar | ←/→ etapa | Enter mover | m métricas",
            Mode::Metrics => " Tab próximo campo | Enter salvar | Esc voltar",
            Mode::Confirm => " y confirmar | n cancelar",
        }
    };
    let footer = Paragraph::new(hint).style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, area);
}

fn draw_panel(f: &mut Frame, app: &App, snapshot: &BoardSnapshot, area: Rect) {
    let Some(panel) = &app.panel else {
        return;
    };
    let Some(card) = snapshot
        .cards
        .iter()
        .find(|c| c.id() == panel.application_id)
    else {
        return;
    };

    let popup = centered_rect(80, 80, area);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Detalhes da Aplicação ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Creator / campaign
            Constraint::Length(3), // Stage pills
            Constraint::Min(1),    // Deliverables + messages
        ])
        .split(inner);

    let instagram = card.creator.instagram.as_deref().unwrap_or("-");
    let metrics = card
        .application
        .metrics
        .as_ref()
        .map(|m| {
            format!(
                "views {} | likes {} | comentários {} | compartilhamentos {}",
                m.views, m.likes, m.comments, m.shares
            )
        })
        .unwrap_or_else(|| "sem métricas".to_string());
    let info = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(&card.creator.name, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(format!("@{instagram}"), Style::default().fg(Color::Magenta)),
        ]),
        Line::from(vec![
            Span::raw("Campanha: "),
            Span::styled(&card.campaign.title, Style::default().fg(Color::Yellow)),
        ]),
        Line::from(Span::styled(metrics, Style::default().fg(Color::DarkGray))),
    ]);
    f.render_widget(info, sections[0]);

    // Stage pills; the current stage is underlined, the selection reversed.
    let current_stage = resolve_column(card.workflow_status(), &snapshot.stages)
        .map(|assignment| assignment.stage().id);
    let mut pill_spans = Vec::new();
    for (index, stage) in snapshot.stages.iter().enumerate() {
        let mut style = Style::default().fg(stage_color(&stage.color));
        if current_stage == Some(stage.id) {
            style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
        }
        if index == app.selected_pill {
            style = style.add_modifier(Modifier::REVERSED);
        }
        pill_spans.push(Span::styled(format!(" {} ", stage.name), style));
        pill_spans.push(Span::raw(" "));
    }
    if app.store().is_moving(card.id()) {
        pill_spans.push(Span::styled(
            " movendo… ",
            Style::default().fg(Color::Yellow),
        ));
    }
    let pills = Paragraph::new(Line::from(pill_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Etapa ")
            .border_style(Style::default().add_modifier(Modifier::DIM)),
    );
    f.render_widget(pills, sections[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(sections[2]);

    draw_loadable_list(
        f,
        body[0],
        " Entregas ",
        &panel.deliverables,
        |items: &Vec<shared::Deliverable>| {
            items
                .iter()
                .map(|d| {
                    let mut text = format!("• {} [{}]", d.title, d.status);
                    if let Some(due) = d.due_date {
                        text.push_str(&format!(" até {}", due.format("%d/%m")));
                    }
                    Line::from(text)
                })
                .collect()
        },
        "Sem entregas",
    );
    draw_loadable_list(
        f,
        body[1],
        " Mensagens ",
        &panel.messages,
        |items: &Vec<shared::ChatMessage>| {
            items
                .iter()
                .map(|m| {
                    let mut spans = Vec::new();
                    if let Some(at) = m.created_at {
                        spans.push(Span::styled(
                            format!("{} ", at.format("%d/%m %H:%M")),
                            Style::default().fg(Color::DarkGray),
                        ));
                    }
                    spans.push(Span::styled(
                        format!("{}: ", m.sender),
                        Style::default().fg(Color::Cyan),
                    ));
                    spans.push(Span::raw(m.content.clone()));
                    Line::from(spans)
                })
                .collect()
        },
        "Sem mensagens",
    );
}

fn draw_loadable_list<T, F>(
    f: &mut Frame,
    area: Rect,
    title: &str,
    loadable: &Loadable<Vec<T>>,
    to_lines: F,
    empty_text: &str,
) where
    F: Fn(&Vec<T>) -> Vec<Line<'static>>,
{
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::DIM));

    let lines = match loadable {
        Loadable::Idle | Loadable::Loading => {
            vec![Line::from(Span::styled(
                "Carregando…",
                Style::default().fg(Color::DarkGray),
            ))]
        }
        Loadable::Failed => vec![Line::from(Span::styled(
            "Falha ao carregar",
            Style::default().fg(Color::Red),
        ))],
        Loadable::Ready(items) if items.is_empty() => vec![Line::from(Span::styled(
            empty_text.to_string(),
            Style::default().fg(Color::DarkGray),
        ))],
        Loadable::Ready(items) => to_lines(items),
    };

    let list = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(list, area);
}

fn draw_metrics_form(f: &mut Frame, app: &App, area: Rect) {
    let Some(form) = &app.metrics_form else {
        return;
    };

    let height = (form.inputs.len() as u16) * 3 + 2 + form.errors.len() as u16;
    let popup = centered_rect(40, 60, area);
    let popup = Rect {
        height: height.min(popup.height).min(area.height),
        ..popup
    };
    f.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Métricas ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut constraints = vec![Constraint::Length(3); form.inputs.len()];
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (index, input) in form.inputs.iter().enumerate() {
        let focused = index == form.focus;
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let field_area = rows[index];
        let width = field_area.width.max(3) - 3;
        let scroll = input.visual_scroll(width as usize);
        let field = Paragraph::new(input.value())
            .style(style)
            .scroll((0, scroll as u16))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", crate::panel::METRIC_FIELDS[index])),
            );
        f.render_widget(field, field_area);

        if focused {
            f.set_cursor_position((
                field_area.x + ((input.visual_cursor().max(scroll) - scroll) as u16) + 1,
                field_area.y + 1,
            ));
        }
    }

    if !form.errors.is_empty() {
        let errors: Vec<Line> = form
            .errors
            .iter()
            .map(|e| Line::from(Span::styled(e.clone(), Style::default().fg(Color::Red))))
            .collect();
        let errors = Paragraph::new(errors).wrap(Wrap { trim: true });
        f.render_widget(errors, rows[form.inputs.len()]);
    }
}

fn draw_confirm(f: &mut Frame, app: &App, area: Rect) {
    let Some(campaign_id) = app.confirm_delete else {
        return;
    };
    let title = app
        .store()
        .campaigns()
        .iter()
        .find(|c| c.id == campaign_id)
        .map(|c| c.title.clone())
        .unwrap_or_else(|| format!("#{campaign_id}"));

    let popup = centered_rect(50, 20, area);
    let popup = Rect {
        height: popup.height.min(7),
        ..popup
    };
    f.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Excluir campanha ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::raw(format!("Excluir \"{title}\"?"))),
        Line::from(Span::styled(
            "Os cards desta campanha sairão do quadro.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Style::default().fg(Color::Red)),
            Span::raw(" excluir   "),
            Span::styled("[n]", Style::default().fg(Color::Green)),
            Span::raw(" cancelar"),
        ]),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(text, inner);
}

fn draw_toasts(f: &mut Frame, app: &App, area: Rect) {
    let toasts = app.store().toasts().active();
    if toasts.is_empty() {
        return;
    }

    let width = 42.min(area.width);
    let height = (toasts.len() as u16 + 2).min(area.height);
    let popup = Rect::new(area.x + area.width - width, area.y, width, height);
    f.render_widget(Clear, popup);

    let lines: Vec<Line> = toasts
        .iter()
        .map(|toast| {
            let color = match toast.level {
                NotificationLevel::Info => Color::Green,
                NotificationLevel::Warning => Color::Yellow,
                NotificationLevel::Error => Color::Red,
            };
            Line::from(Span::styled(
                toast.message.clone(),
                Style::default().fg(color),
            ))
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(" Avisos ")
            .borders(Borders::ALL)
            .border_style(Style::default().add_modifier(Modifier::DIM)),
    );
    f.render_widget(widget, popup);
}

fn stage_color(color: &Option<String>) -> Color {
    color
        .as_deref()
        .and_then(parse_hex_color)
        .unwrap_or(Color::Cyan)
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
