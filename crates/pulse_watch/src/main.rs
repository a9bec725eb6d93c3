use std::time::Instant;

use crossterm::event::{Event, EventStream};
use dotenv::dotenv;
use futures_util::StreamExt;
use pulse_service::models::tokens::PriceUpdate;
use pulse_watch::{
    api_client::PulseClient,
    app::{Action, WatchApp},
    display::render,
    error::WatchError,
    settings,
    socket::PriceSocket,
    terminal::{restore_terminal, setup_terminal, Tui},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const UPDATE_BUFFER: usize = 256;

async fn run(
    terminal: &mut Tui,
    app: &mut WatchApp,
    client: &PulseClient,
    updates: &mut mpsc::Receiver<PriceUpdate>,
) -> Result<(), WatchError> {
    let mut events = EventStream::new();

    loop {
        terminal.draw(|frame| render(frame, app, Instant::now()))?;

        let deadline = app.merger.next_deadline();
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                app.apply_update(&update, Instant::now());
            }
            _ = async {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
                    None => std::future::pending().await,
                }
            } => {
                let expired = app.merger.expire(Instant::now());
                debug!(expired, "Flashes expired");
            }
            event = events.next() => {
                let Some(event) = event else { break };
                // resizes fall through to the redraw
                let Event::Key(key) = event? else { continue };
                match app.handle_key(key) {
                    Some(Action::Quit) => {
                        info!("Stopping");
                        break;
                    }
                    Some(Action::Refetch) => match client.fetch_page(&app.request).await {
                        Ok(page) => {
                            info!(total = page.total, "Showing page {}", page.page);
                            app.apply_page(page);
                        }
                        Err(e) => {
                            warn!(error = %e, "Refetch failed");
                            app.status = Some(e.to_string());
                        }
                    },
                    None => {}
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let settings = settings::load_settings()?;
    pulse_watch::init_tracing(&settings)?;

    let request = settings.page_request()?;
    let client = PulseClient::new(settings.base_url());

    // fail on a bad url before taking over the screen
    let page = client.fetch_page(&request).await?;
    info!(total = page.total, "Watching page {}", page.page);
    let mut app = WatchApp::new(request, page, settings.flash_duration());

    let (tx, mut updates) = mpsc::channel(UPDATE_BUFFER);
    let socket = PriceSocket::new(client.ws_url(), settings.reconnect_delay(), tx);
    let socket_task = tokio::spawn(socket.run());

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app, &client, &mut updates).await;
    restore_terminal(&mut terminal)?;

    drop(updates);
    socket_task.abort();
    result.map_err(Into::into)
}
