use std::io;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Terminal;

use wisebox_client::contracts::ChatTransport;
use wisebox_client::contracts::MessagePart;
use wisebox_client::contracts::RawChatResponse;
use wisebox_client::encode::encode_file;
use wisebox_client::gemini::GeminiSession;
use wisebox_core::events::ChatEffect;
use wisebox_core::events::ChatEvent;
use wisebox_core::events::RuntimeEvent;
use wisebox_core::events::UserEvent;
use wisebox_core::parser::action_items;
use wisebox_core::parser::parse_reply;
use wisebox_core::parser::GroundingChunk;
use wisebox_core::reducer::reduce;
use wisebox_core::state::AttachmentMeta;
use wisebox_core::state::ChatState;
use wisebox_core::state::ConversationTurn;
use wisebox_core::state::DocumentStatus;
use wisebox_core::state::GroundingSource;
use wisebox_core::state::Role;
use wisebox_core::state::TurnId;

/// User-facing text for any transport failure; the real error goes to the log.
const TRANSPORT_FAILURE: &str = "Failed to get a response from the assistant.";

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableBracketedPaste,
            crossterm::cursor::Show
        );
    }
}

struct TransportJob {
    pending_turn: TurnId,
    message: String,
    attachment: Option<AttachmentMeta>,
}

enum WorkerEvent {
    Resolved {
        pending_turn: TurnId,
        response: RawChatResponse,
    },
    Failed {
        pending_turn: TurnId,
        message: String,
    },
}

pub fn run(mut state: ChatState, session: GeminiSession) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        crossterm::cursor::Hide
    )?;
    let _guard = TuiGuard; // Ensures terminal is restored on exit or panic

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (job_tx, job_rx) = mpsc::channel::<TransportJob>();
    let (event_tx, event_rx) = mpsc::channel::<WorkerEvent>();
    let worker = std::thread::spawn(move || transport_worker(session, job_rx, event_tx));

    let result = run_app(&mut terminal, &mut state, &job_tx, &event_rx);

    // Closing the job channel lets the worker drain and exit.
    drop(job_tx);
    let _ = worker.join();
    result.map_err(|e| e.into())
}

/// The worker owns the session outright; jobs arrive one at a time, so the
/// conversation history never sees interleaved turns.
fn transport_worker(
    mut session: GeminiSession,
    jobs: mpsc::Receiver<TransportJob>,
    events: mpsc::Sender<WorkerEvent>,
) {
    while let Ok(job) = jobs.recv() {
        let pending_turn = job.pending_turn;
        let event = match run_job(&mut session, job) {
            Ok(response) => WorkerEvent::Resolved {
                pending_turn,
                response,
            },
            Err(message) => WorkerEvent::Failed {
                pending_turn,
                message,
            },
        };
        if events.send(event).is_err() {
            break;
        }
    }
}

fn run_job(session: &mut GeminiSession, job: TransportJob) -> Result<RawChatResponse, String> {
    let mut parts = vec![MessagePart::Text(job.message)];
    if let Some(meta) = job.attachment {
        let encoded = encode_file(&meta.path).map_err(|err| {
            tracing::error!(%err, "attachment encode failed");
            err.to_string()
        })?;
        parts.push(MessagePart::InlineData {
            data: encoded.data,
            mime_type: encoded.mime_type,
        });
    }
    session.send_message(parts).map_err(|err| {
        tracing::error!(%err, "chat request failed");
        TRANSPORT_FAILURE.to_string()
    })
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut ChatState,
    jobs: &mpsc::Sender<TransportJob>,
    events: &mpsc::Receiver<WorkerEvent>,
) -> io::Result<()> {
    let mut effects = reduce(state, ChatEvent::User(UserEvent::StartConversation));

    loop {
        while let Ok(event) = events.try_recv() {
            let runtime = match event {
                WorkerEvent::Resolved {
                    pending_turn,
                    response,
                } => {
                    let chunks: Vec<GroundingChunk> = response
                        .grounding
                        .into_iter()
                        .map(|chunk| GroundingChunk {
                            web: chunk.web.map(|web| GroundingSource {
                                uri: web.uri,
                                title: web.title,
                            }),
                        })
                        .collect();
                    RuntimeEvent::TurnResolved {
                        pending_turn,
                        reply: parse_reply(&response.text, &chunks),
                    }
                }
                WorkerEvent::Failed {
                    pending_turn,
                    message,
                } => RuntimeEvent::TurnFailed {
                    pending_turn,
                    message,
                },
            };
            effects.extend(reduce(state, ChatEvent::Runtime(runtime)));
        }

        for effect in std::mem::take(&mut effects) {
            match effect {
                ChatEffect::DispatchRequest {
                    pending_turn,
                    message,
                    attachment,
                } => {
                    let job = TransportJob {
                        pending_turn,
                        message,
                        attachment,
                    };
                    if jobs.send(job).is_err() {
                        effects.extend(reduce(
                            state,
                            ChatEvent::Runtime(RuntimeEvent::TurnFailed {
                                pending_turn,
                                message: "assistant worker stopped".to_string(),
                            }),
                        ));
                    }
                }
                ChatEffect::Quit => return Ok(()),
                // Redrawn every iteration anyway.
                ChatEffect::RequestFrame => {}
            }
        }

        terminal.draw(|f| draw(f, state))?;

        // Short poll keeps the pending spinner animating.
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(user) = map_key(key) {
                        effects.extend(reduce(state, ChatEvent::User(user)));
                    }
                }
                Event::Paste(text) => {
                    effects.extend(reduce(state, ChatEvent::User(UserEvent::Paste(text))));
                }
                _ => {}
            }
        }
    }
}

fn map_key(key: KeyEvent) -> Option<UserEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(UserEvent::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Esc => Some(UserEvent::Quit),
        KeyCode::Enter => Some(UserEvent::Submit),
        KeyCode::Backspace => Some(UserEvent::Backspace),
        KeyCode::Up => Some(UserEvent::Scroll(-1)),
        KeyCode::Down => Some(UserEvent::Scroll(1)),
        KeyCode::PageUp => Some(UserEvent::Scroll(-10)),
        KeyCode::PageDown => Some(UserEvent::Scroll(10)),
        KeyCode::End => Some(UserEvent::ScrollToBottom),
        KeyCode::Char(ch) => Some(UserEvent::Input(ch)),
        _ => None,
    }
}

fn get_spinner() -> &'static str {
    let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let idx = (std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis()
        / 100) as usize
        % frames.len();
    frames[idx]
}

fn draw(f: &mut ratatui::Frame, state: &ChatState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_status_banner(f, state, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(rows[1]);
    draw_transcript(f, state, columns[0]);
    draw_sidebar(f, state, columns[1]);

    draw_input(f, state, rows[2]);
    draw_footer(f, state, rows[3]);
}

fn status_colors(status: DocumentStatus) -> (Color, Color) {
    match status {
        DocumentStatus::Red => (Color::Red, Color::White),
        DocumentStatus::Yellow => (Color::Yellow, Color::Black),
        DocumentStatus::Green => (Color::Green, Color::Black),
        DocumentStatus::Unknown => (Color::DarkGray, Color::White),
    }
}

fn draw_status_banner(f: &mut ratatui::Frame, state: &ChatState, area: Rect) {
    let (bg, fg) = status_colors(state.status);
    let banner = Paragraph::new(format!(" {}", state.status.banner()))
        .style(Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD));
    f.render_widget(banner, area);
}

fn turn_lines(turn: &ConversationTurn) -> Vec<Line<'static>> {
    let label_style = match turn.role {
        Role::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        Role::Assistant => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    };
    let mut lines = vec![Line::from(Span::styled(
        format!("[{}]", turn.role.label()),
        label_style,
    ))];

    if turn.pending {
        lines.push(Line::from(Span::styled(
            format!("{} thinking", get_spinner()),
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        let body_style = if turn.is_error() {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        for text in turn.text.lines() {
            lines.push(Line::from(Span::styled(text.to_string(), body_style)));
        }
    }

    if let Some(meta) = &turn.attachment {
        lines.push(Line::from(Span::styled(
            format!("  [attached: {} ({})]", meta.name, meta.mime_type),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::default());
    lines
}

fn draw_transcript(f: &mut ratatui::Frame, state: &ChatState, area: Rect) {
    let lines: Vec<Line> = state.transcript.iter().flat_map(turn_lines).collect();
    let viewport = area.height.saturating_sub(2) as usize;
    let max_offset = lines.len().saturating_sub(viewport);
    let offset = if state.interaction.stick_to_bottom {
        max_offset
    } else {
        state.interaction.scroll.min(max_offset)
    };

    let transcript = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Conversation"))
        .wrap(Wrap { trim: false })
        .scroll((offset as u16, 0));
    f.render_widget(transcript, area);
}

fn draw_sidebar(f: &mut ratatui::Frame, state: &ChatState, area: Rect) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(7),
            Constraint::Length(5),
        ])
        .split(area);

    let actions = action_items(&state.actions);
    let action_rows: Vec<ListItem> = if actions.is_empty() {
        vec![ListItem::new(Span::styled(
            "Nothing pending.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        actions
            .into_iter()
            .map(|item| ListItem::new(format!("- {item}")))
            .collect()
    };
    f.render_widget(
        List::new(action_rows)
            .block(Block::default().borders(Borders::ALL).title("Next Actions")),
        sections[0],
    );

    let source_items: Vec<ListItem> = match &state.sources {
        Some(sources) if !sources.is_empty() => sources
            .iter()
            .map(|source| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        source.title.clone(),
                        Style::default().fg(Color::Blue),
                    )),
                    Line::from(Span::styled(
                        source.uri.clone(),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect(),
        _ => vec![ListItem::new(Span::styled(
            "No sources for this reply.",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    f.render_widget(
        List::new(source_items).block(Block::default().borders(Borders::ALL).title("Sources")),
        sections[1],
    );

    let mut profile_lines = vec![Line::from(vec![
        Span::raw("Status: "),
        Span::styled(
            state.status.label(),
            Style::default().fg(status_colors(state.status).0),
        ),
    ])];
    match &state.profile {
        Some(profile) => {
            profile_lines.push(Line::from(format!("Fields: {}", profile.field_count())));
            if let Some(title) = profile.get("property_title").and_then(|v| v.as_str()) {
                profile_lines.push(Line::from(title.to_string()));
            }
        }
        None => {
            profile_lines.push(Line::from(Span::styled(
                "No profile yet.",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    f.render_widget(
        Paragraph::new(profile_lines)
            .block(Block::default().borders(Borders::ALL).title("Profile"))
            .wrap(Wrap { trim: true }),
        sections[2],
    );
}

fn draw_input(f: &mut ratatui::Frame, state: &ChatState, area: Rect) {
    let title = if state.busy {
        format!("Message {} (waiting)", get_spinner())
    } else {
        "Message".to_string()
    };
    let input = Paragraph::new(format!("{}\u{258c}", state.interaction.input))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, area);
}

fn draw_footer(f: &mut ratatui::Frame, state: &ChatState, area: Rect) {
    let (text, style) = if let Some(notice) = &state.interaction.notice {
        (notice.clone(), Style::default().fg(Color::Yellow))
    } else if let Some(meta) = &state.interaction.attachment {
        (
            format!("Attachment ready: {} (/detach to remove)", meta.name),
            Style::default().fg(Color::Cyan),
        )
    } else {
        (
            "Enter send | /help commands | Esc quit".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };
    f.render_widget(Paragraph::new(Span::styled(format!(" {text}"), style)), area);
}
