use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph, Scrollbar, ScrollbarOrientation};
use ratatui::Terminal;

use tui_tree_filter::{
    FilterTree, Notice, SearchConfig, SearchSession, Tree, TreeItem, TreeRegistry,
    TreeState,
};

const TREE_ID: &str = "alphabet";

struct App {
    registry: TreeRegistry,
    session: SearchSession,
    state: TreeState,
    input: String,
    notice: Option<Notice>,
}

impl App {
    fn new() -> tui_tree_filter::Result<Self> {
        let items = vec![
            TreeItem::new_leaf("a", "Alfa"),
            TreeItem::new(
                "b",
                "Bravo",
                vec![
                    TreeItem::new_leaf("c", "Charlie"),
                    TreeItem::new(
                        "d",
                        "Delta",
                        vec![
                            TreeItem::new_leaf("e", "Echo"),
                            TreeItem::new_leaf("f", "Foxtrot"),
                        ],
                    )?,
                    TreeItem::new_leaf("g", "Golf"),
                ],
            )?,
            TreeItem::new_leaf("h", "Hotel"),
            TreeItem::new(
                "i",
                "India",
                vec![
                    TreeItem::new_leaf("j", "Juliett"),
                    TreeItem::new_leaf("k", "Kilo"),
                    TreeItem::new_leaf("l", "Lima"),
                    TreeItem::new_leaf("m", "Mike"),
                    TreeItem::new_leaf("n", "November"),
                ],
            )?,
            TreeItem::new_leaf("o", "Oscar"),
            TreeItem::new(
                "p",
                "Papa",
                vec![
                    TreeItem::new_leaf("q", "Quebec"),
                    TreeItem::new_leaf("r", "Romeo"),
                    TreeItem::new_leaf("s", "Sierra"),
                    TreeItem::new_leaf("t", "Tango"),
                    TreeItem::new_leaf("u", "Uniform"),
                    TreeItem::new(
                        "v",
                        "Victor",
                        vec![
                            TreeItem::new_leaf("w", "Whiskey"),
                            TreeItem::new_leaf("x", "Xray"),
                            TreeItem::new_leaf("y", "Yankee"),
                        ],
                    )?,
                ],
            )?,
            TreeItem::new_leaf("z", "Zulu"),
        ];

        let config = SearchConfig::default();
        let mut registry = TreeRegistry::new();
        registry.insert(
            TREE_ID,
            FilterTree::normalized(items)?.markup(config.markup.clone()),
        );

        Ok(Self {
            registry,
            session: SearchSession::new(TREE_ID, config),
            state: TreeState::default(),
            input: String::new(),
            notice: None,
        })
    }

    fn after_search(&mut self) {
        self.state.deselect_invisible(tree(&mut self.registry));
    }
}

fn tree(registry: &mut TreeRegistry) -> &mut FilterTree {
    registry
        .get_tree_mut(TREE_ID)
        .expect("the tree is registered on start")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Terminal initialization
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // App
    let app = App::new()?;
    let res = run_app(&mut terminal, app);

    // restore terminal
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| {
            let [input_area, tree_area] =
                Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(frame.size());

            let status = app
                .notice
                .as_ref()
                .map_or_else(String::new, ToString::to_string);
            frame.render_widget(
                Paragraph::new(app.input.as_str()).block(
                    Block::bordered()
                        .title("Search (Enter: now, Ctrl-L: clear, Esc: quit)")
                        .title_bottom(status),
                ),
                input_area,
            );

            let widget = Tree::new(tree(&mut app.registry))
                .block(Block::bordered().title("Tree"))
                .scrollbar(Some(
                    Scrollbar::new(ScrollbarOrientation::VerticalRight)
                        .begin_symbol(None)
                        .track_symbol(None)
                        .end_symbol(None),
                ))
                .highlight_style(
                    Style::new()
                        .fg(Color::Black)
                        .bg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(">> ");
            frame.render_stateful_widget(widget, tree_area, &mut app.state);
        })?;

        let timeout = app
            .session
            .deadline()
            .map_or(Duration::from_secs(60), |deadline| {
                deadline.saturating_duration_since(Instant::now())
            });
        if !crossterm::event::poll(timeout)? {
            if let Some(result) =
                app.session
                    .run_pending(&mut app.registry, Instant::now(), &mut app.notice)
            {
                result?;
                app.after_search();
            }
            continue;
        }

        match crossterm::event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.input.clear();
                    app.notice = None;
                    app.session.clear(&mut app.registry, &mut app.notice)?;
                }
                KeyCode::Char(c) => {
                    app.input.push(c);
                    app.notice = None;
                    app.session.on_input(app.input.clone(), Instant::now());
                }
                KeyCode::Backspace => {
                    app.input.pop();
                    app.notice = None;
                    app.session.on_input(app.input.clone(), Instant::now());
                }
                KeyCode::Enter => {
                    app.notice = None;
                    app.session
                        .on_change(&mut app.registry, &app.input, &mut app.notice)?;
                    app.after_search();
                }
                KeyCode::Tab => {
                    app.state.toggle_selected(tree(&mut app.registry));
                }
                KeyCode::Left => {
                    app.state.key_left(tree(&mut app.registry));
                }
                KeyCode::Right => {
                    app.state.key_right(tree(&mut app.registry));
                }
                KeyCode::Down => {
                    app.state.key_down(tree(&mut app.registry));
                }
                KeyCode::Up => {
                    app.state.key_up(tree(&mut app.registry));
                }
                KeyCode::PageDown => {
                    app.state.scroll_down(3);
                }
                KeyCode::PageUp => {
                    app.state.scroll_up(3);
                }
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => {
                    app.state.scroll_down(1);
                }
                MouseEventKind::ScrollUp => {
                    app.state.scroll_up(1);
                }
                _ => {}
            },
            _ => {}
        }
    }
}
