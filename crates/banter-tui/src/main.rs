use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use banter::chat::{ChatSession, select_backend};
use banter::config::{Config, Credentials};
use banter_tui::views::ChatView;
use banter_tui::{App, Event, EventPump, Tui};

#[derive(Parser, Debug)]
#[command(name = "banter-tui")]
#[command(about = "Terminal chat client for the Banter companion engine")]
#[command(version)]
struct Args {
    /// Path to config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let credentials = Credentials::from_env(&config);
    let backend = select_backend(&config, &credentials)?;
    let session = ChatSession::new(&config.chat, backend);

    let mut events = EventPump::new(Duration::from_millis(250));
    let mut app = App::new(session, events.sender());
    let view = ChatView::new();

    let mut tui = Tui::new()?;
    tui.enter()?;
    let result = run(&mut app, &view, &mut tui, &mut events).await;
    tui.exit()?;
    result
}

async fn run(
    app: &mut App,
    view: &ChatView,
    tui: &mut Tui,
    events: &mut EventPump,
) -> anyhow::Result<()> {
    while !app.should_quit {
        tui.terminal().draw(|frame| {
            view.render(frame, frame.area(), app.snapshot(), app.scroll_from_bottom());
        })?;

        match events.next().await {
            Some(Event::Key(key)) => app.handle_key(key),
            Some(Event::Resize(_, _)) | Some(Event::Tick) | Some(Event::Refresh) => app.refresh(),
            None => break,
        }
    }
    Ok(())
}
