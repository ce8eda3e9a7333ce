//! WebSocket route backing one open analyzer screen.
//!
//! The engine process is spawned right after the first render and shut down
//! when the socket closes. At most `MAX_ENGINES` screens hold an engine at a
//! time; the rest can edit positions but not analyse. Client events and
//! engine lines are handled on this task only.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    Extension,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use engine_session::{EngineHandle, EngineSender};

use crate::config::Config;
use crate::screen::{ClientEvent, Screen, ServerEvent};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(config): Extension<Config>,
    Extension(engine_slots): Extension<Arc<Semaphore>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, config, engine_slots))
}

async fn handle_socket(socket: WebSocket, config: Config, engine_slots: Arc<Semaphore>) {
    let (mut sender, mut receiver) = socket.split();

    // Render before the engine handshake so a slow engine never leaves the
    // page blank. No client event is handled until the engine is attached.
    let mut screen = Screen::new(EngineSender::disconnected(), config.default_depth);
    info!("Screen opened");
    if let Err(e) = send_msg(&mut sender, &ServerEvent::State { view: screen.view() }).await {
        debug!("Screen closed before first render: {e}");
        return;
    }

    let (mut engine, _slot) = match engine_slots.try_acquire_owned() {
        Ok(slot) => match EngineHandle::spawn(&config.engine).await {
            Ok(engine) => (Some(engine), Some(slot)),
            Err(e) => {
                error!("Engine unavailable, analysis disabled for this screen: {e}");
                (None, None)
            }
        },
        Err(_) => {
            warn!(
                max_engines = config.max_engines,
                "Engine limit reached, analysis disabled for this screen"
            );
            (None, None)
        }
    };
    // A screen without an engine still edits positions; analysis commands
    // just go nowhere.
    if let Some(engine) = &engine {
        screen.attach_engine(engine.sender());
    }
    let mut engine_alive = engine.is_some();

    if let Err(e) = run_screen(
        &mut screen,
        &mut sender,
        &mut receiver,
        &mut engine,
        &mut engine_alive,
    )
    .await
    {
        debug!("Screen socket ended: {e}");
    }

    if let Some(engine) = engine {
        engine.shutdown().await;
    }
    info!("Screen closed");
}

async fn run_screen(
    screen: &mut Screen<EngineSender>,
    sender: &mut SplitSink<WebSocket, Message>,
    receiver: &mut SplitStream<WebSocket>,
    engine: &mut Option<EngineHandle>,
    engine_alive: &mut bool,
) -> Result<()> {
    loop {
        tokio::select! {
            msg = receiver.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(t))) => t.to_string(),
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Err(e)) => return Err(e.into()),
                    Some(Ok(_)) => continue,
                };

                let event: ClientEvent = match serde_json::from_str(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("Invalid client message: {e}");
                        send_msg(sender, &ServerEvent::Error {
                            message: format!("Invalid message: {e}"),
                        })
                        .await?;
                        continue;
                    }
                };

                for out in screen.handle(event) {
                    send_msg(sender, &out).await?;
                }
            }
            line = next_engine_line(engine), if *engine_alive => {
                match line {
                    Some(line) => {
                        if let Some(out) = screen.on_engine_line(&line) {
                            send_msg(sender, &out).await?;
                        }
                    }
                    None => {
                        warn!("Engine stopped responding; analysis unavailable until reload");
                        *engine_alive = false;
                    }
                }
            }
        }
    }
}

async fn next_engine_line(engine: &mut Option<EngineHandle>) -> Option<String> {
    match engine {
        Some(engine) => engine.next_line().await,
        None => std::future::pending().await,
    }
}

async fn send_msg(sender: &mut SplitSink<WebSocket, Message>, msg: &ServerEvent) -> Result<()> {
    let json = serde_json::to_string(msg)?;
    sender.send(Message::Text(json.into())).await?;
    Ok(())
}
