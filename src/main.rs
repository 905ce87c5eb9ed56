use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;

use logtint_logs::{
    LineSource, LogDocument, SeverityRuleSet, SeveritySettings, SharedVisibility,
    SourceEvent, SourceReader, TagExtractor, VisibilityConfig, VisibilitySettings,
};
use logtint_tui::{
    Action, AnsiPrinter, AppState, Event, EventHandler, KeyBindings, KeyContext, StyleTable,
    TerminalViewer, ViewerAdapter,
};

/// logtint - view log files tinted by severity
#[derive(Parser, Debug)]
#[command(name = "logtint")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log files to view ("-" or none reads stdin)
    #[arg(value_name = "FILE")]
    files: Vec<String>,

    /// Severity settings (TOML); defaults to <config dir>/logtint/settings.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Visibility settings (JSON), loaded at start and saved on exit
    #[arg(long, value_name = "PATH")]
    visibility: Option<PathBuf>,

    /// Only show these severities, e.g. "error,warning,unclassified"
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    show: Vec<String>,

    /// Only show lines with these tags, e.g. "build,net"
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    tags: Vec<String>,

    /// Keep reading as the file grows
    #[arg(short, long)]
    follow: bool,

    /// Print to stdout instead of opening the viewer
    #[arg(short, long)]
    print: bool,

    /// When to color printed output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Buffer size for log lines, per file
    #[arg(long, default_value = "10000")]
    buffer_size: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

/// Everything built from the settings files, shared by all documents
struct Setup {
    rules: Arc<SeverityRuleSet>,
    tags: Option<TagExtractor>,
    styles: StyleTable,
    visibility: SharedVisibility,
    tag_filter: Vec<String>,
    capacity: usize,
}

impl Setup {
    fn load(args: &Args) -> Result<Self> {
        let settings = SeveritySettings::load(args.config.as_deref())
            .context("failed to load severity settings")?;
        let rules = SeverityRuleSet::new(&settings).context("invalid severity settings")?;
        let tags = TagExtractor::from_pattern(settings.tags.pattern.as_deref())
            .context("invalid tag settings")?;
        let styles = StyleTable::from_settings(&settings).context("invalid severity colors")?;

        let mut visibility = match &args.visibility {
            Some(path) if path.exists() => {
                let config = VisibilityConfig::load(path).with_context(|| {
                    format!("failed to load visibility settings from {}", path.display())
                })?;
                VisibilitySettings::from_config(&config)
            }
            _ => VisibilitySettings::default(),
        };

        if !args.show.is_empty() {
            // Unknown names are logged and skipped
            visibility.set_visible_severities(&args.show);
        }

        Ok(Self {
            rules: Arc::new(rules),
            tags,
            styles,
            visibility: SharedVisibility::new(visibility),
            tag_filter: args.tags.clone(),
            capacity: args.buffer_size,
        })
    }

    /// A fresh document with its own classifier state
    fn document(&self) -> LogDocument {
        let mut document = LogDocument::new(
            self.rules.clone(),
            self.tags.clone(),
            self.visibility.clone(),
            self.capacity,
        );
        if !self.tag_filter.is_empty() {
            document.restrict_tags(&self.tag_filter);
        }
        document
    }
}

async fn run(args: Args) -> Result<()> {
    let setup = Setup::load(&args)?;

    let sources: Vec<LineSource> = if args.files.is_empty() {
        vec![LineSource::Stdin]
    } else {
        args.files
            .iter()
            .map(|f| LineSource::from_arg(f, args.follow))
            .collect()
    };

    let stdout_is_tty = io::stdout().is_terminal();
    if args.print || !stdout_is_tty {
        let color = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => stdout_is_tty,
        };
        return run_print(&setup, sources, color).await;
    }

    run_viewer(&setup, sources).await?;

    if let Some(path) = &args.visibility {
        setup
            .visibility
            .snapshot()
            .to_config()
            .save(path)
            .with_context(|| format!("failed to save visibility settings to {}", path.display()))?;
    }

    Ok(())
}

/// Stream every source in turn to stdout
async fn run_print(setup: &Setup, sources: Vec<LineSource>, color: bool) -> Result<()> {
    let mut printer = AnsiPrinter::new(io::stdout());
    if !color {
        printer = printer.plain();
    }

    for source in sources {
        let mut document = setup.document();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _reader = SourceReader::start(source, tx);

        while let Some(event) = rx.recv().await {
            match event {
                SourceEvent::Line(line) => {
                    let classified = document.ingest(&line);
                    if !document.visibility().is_visible(&classified) {
                        continue;
                    }
                    match printer.render(std::slice::from_ref(&classified), &setup.styles) {
                        Ok(()) => {}
                        // Reader went away (e.g. piped into head)
                        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => return Ok(()),
                        Err(e) => return Err(e).context("failed to write output"),
                    }
                }
                SourceEvent::Truncated => document.reset(),
                SourceEvent::Eof => break,
                SourceEvent::Error(e) => anyhow::bail!(e),
            }
        }
    }

    Ok(())
}

/// One open source in the viewer
struct Pane {
    name: String,
    document: LogDocument,
    finished: bool,
    _reader: SourceReader,
}

async fn run_viewer(setup: &Setup, sources: Vec<LineSource>) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(100));
    let mut panes = Vec::with_capacity(sources.len());

    for (index, source) in sources.into_iter().enumerate() {
        let name = source.name();
        let (tx, rx) = mpsc::unbounded_channel();
        let reader = SourceReader::start(source, tx);
        events.attach_source(index, rx);

        panes.push(Pane {
            name,
            document: setup.document(),
            finished: false,
            _reader: reader,
        });
    }

    let mut active = 0;
    let mut viewer = TerminalViewer::new(AppState::new(panes[active].name.clone()))
        .context("failed to initialize terminal")?;
    let keybindings = KeyBindings::new();

    // Lines are batched until the next tick; everything else redraws at once
    let mut needs_redraw = true;
    let mut lines_pending = false;

    loop {
        if needs_redraw {
            draw(&mut viewer, &panes[active], &setup.styles)?;
            needs_redraw = false;
        }

        let Some(event) = events.next().await else {
            break;
        };

        match event {
            Event::Key(key) => {
                let context = if viewer.state().help_visible {
                    KeyContext::Help
                } else {
                    KeyContext::LogViewer
                };
                if let Some(action) = keybindings.get_action(context, &key) {
                    handle_action(&mut viewer, &panes, &mut active, &setup.visibility, action);
                    needs_redraw = true;
                }
            }
            Event::Tick => {
                if lines_pending {
                    lines_pending = false;
                    needs_redraw = true;
                }
            }
            Event::Resize(_, _) => needs_redraw = true,
            Event::Source { index, event } => {
                let is_active = index == active;
                let pane = &mut panes[index];
                match event {
                    SourceEvent::Line(line) => {
                        pane.document.ingest(&line);
                        if is_active {
                            viewer.state_mut().touch();
                            lines_pending = true;
                        }
                    }
                    SourceEvent::Truncated => {
                        tracing::debug!(source = %pane.name, "source truncated, reloading");
                        pane.document.reset();
                        if is_active {
                            viewer.state_mut().reset_scroll();
                            needs_redraw = true;
                        }
                    }
                    SourceEvent::Eof => {
                        pane.finished = true;
                        if is_active {
                            viewer.state_mut().finished = true;
                            needs_redraw = true;
                        }
                    }
                    SourceEvent::Error(e) => {
                        viewer.state_mut().apply(Action::ShowError(e));
                        needs_redraw = true;
                    }
                }
            }
            Event::Error(e) => {
                viewer.state_mut().apply(Action::ShowError(e));
                needs_redraw = true;
            }
        }

        if viewer.state().should_quit {
            break;
        }
    }

    events.shutdown();
    viewer.restore().context("failed to restore terminal")?;

    Ok(())
}

fn handle_action(
    viewer: &mut TerminalViewer,
    panes: &[Pane],
    active: &mut usize,
    visibility: &SharedVisibility,
    action: Action,
) {
    match action {
        Action::ToggleSeverity(severity) => {
            visibility.update(|v| {
                let shown = v.is_severity_visible(severity);
                v.set_severity_visible(severity, !shown);
            });
        }
        Action::ToggleUnclassified => {
            visibility.update(|v| {
                let shown = v.is_unclassified_visible();
                v.set_unclassified_visible(!shown);
            });
        }
        Action::ShowAllSeverities => {
            visibility.update(|v| v.show_all_severities());
        }
        Action::NextSource => {
            *active = (*active + 1) % panes.len();
            let pane = &panes[*active];
            let state = viewer.state_mut();
            state.source_name = pane.name.clone();
            state.finished = pane.finished;
            state.last_update = None;
            state.reset_scroll();
        }
        other => viewer.state_mut().apply(other),
    }
}

/// Fresh filter pass over the active document
fn draw(viewer: &mut TerminalViewer, pane: &Pane, styles: &StyleTable) -> Result<()> {
    let visibility = pane.document.visibility().snapshot();
    let lines = pane.document.buffer().visible(&visibility);

    viewer.state_mut().counts = pane.document.buffer().severity_counts();
    viewer.set_visibility(visibility);
    viewer.render(&lines, styles).context("failed to draw")?;

    Ok(())
}
