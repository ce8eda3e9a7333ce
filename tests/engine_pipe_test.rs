//! Analysis session wired to a scripted engine over an in-memory pipe, so the
//! channel pumps and the request correlation run together.

use std::time::Duration;

use engine_session::{AnalysisSession, Depth, EngineConfig, EngineConnection, LineOutcome};
use tokio::io::{duplex, split, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::mpsc;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Minimal UCI engine: answers the handshake, reports every command it gets
/// after that, and replies to `go`/`stop` only when told to via `replies`.
async fn scripted_engine(
    stream: DuplexStream,
    seen: mpsc::UnboundedSender<String>,
    mut replies: mpsc::UnboundedReceiver<String>,
) {
    let (read, mut write) = split(stream);
    let mut lines = BufReader::new(read).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                match line.as_str() {
                    "uci" => write.write_all(b"id name Scripted\nuciok\n").await.unwrap(),
                    "isready" => write.write_all(b"readyok\n").await.unwrap(),
                    _ => {
                        let _ = seen.send(line);
                    }
                }
            }
            reply = replies.recv() => {
                let Some(reply) = reply else { break };
                write.write_all(format!("{reply}\n").as_bytes()).await.unwrap();
            }
        }
    }
}

struct Harness {
    conn: EngineConnection,
    seen: mpsc::UnboundedReceiver<String>,
    replies: mpsc::UnboundedSender<String>,
}

async fn harness() -> Harness {
    let (ours, theirs) = duplex(8192);
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    tokio::spawn(scripted_engine(theirs, seen_tx, reply_rx));

    let (read, write) = split(ours);
    let config = EngineConfig {
        handshake_timeout: Duration::from_secs(2),
        ..EngineConfig::default()
    };
    let conn = EngineConnection::open(read, write, &config)
        .await
        .expect("handshake should succeed");

    Harness {
        conn,
        seen: seen_rx,
        replies: reply_tx,
    }
}

async fn next_seen(h: &mut Harness) -> String {
    tokio::time::timeout(Duration::from_secs(2), h.seen.recv())
        .await
        .expect("engine saw nothing")
        .expect("engine gone")
}

async fn next_line(h: &mut Harness) -> String {
    tokio::time::timeout(Duration::from_secs(2), h.conn.next_line())
        .await
        .expect("no engine output")
        .expect("engine output closed")
}

#[tokio::test]
async fn test_handshake_sets_options_then_commands_flow() {
    let mut h = harness().await;
    assert_eq!(next_seen(&mut h).await, "setoption name Threads value 1");
    assert_eq!(next_seen(&mut h).await, "setoption name Hash value 64");

    let mut session = AnalysisSession::new(h.conn.sender());
    session.start(START_FEN, Depth::new(20).unwrap());
    assert_eq!(next_seen(&mut h).await, format!("position fen {START_FEN}"));
    assert_eq!(next_seen(&mut h).await, "go depth 20");

    h.replies.send("info depth 20 score cp 25 pv e2e4".into()).unwrap();
    h.replies.send("bestmove e2e4 ponder e7e5".into()).unwrap();

    let line = next_line(&mut h).await;
    assert_eq!(session.on_line(&line), LineOutcome::Ignored);
    let line = next_line(&mut h).await;
    assert!(matches!(session.on_line(&line), LineOutcome::BestMove { .. }));
    assert_eq!(session.best_move(), Some("e2e4"));
}

#[tokio::test]
async fn test_late_completion_from_superseded_request_is_dropped() {
    let mut h = harness().await;
    let mut session = AnalysisSession::new(h.conn.sender());

    let first = session.start(START_FEN, Depth::new(30).unwrap());
    session.stop();
    let second = session.start(START_FEN, Depth::new(5).unwrap());

    // setoption x2, then position/go/stop/position/go
    let mut commands = Vec::new();
    for _ in 0..7 {
        commands.push(next_seen(&mut h).await);
    }
    assert_eq!(&commands[4], "stop");

    h.replies.send("bestmove d2d4".into()).unwrap();
    let line = next_line(&mut h).await;
    assert_eq!(session.on_line(&line), LineOutcome::Stale(first));
    assert_eq!(session.best_move(), None);
    assert!(session.is_analyzing());

    h.replies.send("bestmove c2c4".into()).unwrap();
    let line = next_line(&mut h).await;
    assert_eq!(
        session.on_line(&line),
        LineOutcome::BestMove {
            request: second,
            best_move: "c2c4".into()
        }
    );
}
