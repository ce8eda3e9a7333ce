use std::net::SocketAddr;
use std::path::Path;

use engine_session::EngineConfig;
use reqwest::Client;
use server::config::Config;

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::new()
}

/// Config pointing at an engine binary that does not exist, so no test ever
/// depends on Stockfish being installed.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        engine: EngineConfig {
            path: "/nonexistent/stockfish".into(),
            ..EngineConfig::default()
        },
        default_depth: Default::default(),
        max_engines: 4,
    }
}

/// Start the app on an ephemeral port and return its address.
pub async fn spawn_server() -> SocketAddr {
    spawn_server_with(test_config()).await
}

/// Start the app with a custom config on an ephemeral port.
pub async fn spawn_server_with(config: Config) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(server::serve(listener, config));
    addr
}

/// Answers the handshake, then `bestmove e2e4` to every `go`; exits on `quit`.
pub const OBEDIENT_ENGINE: &str = r#"#!/bin/sh
while IFS= read -r line; do
  case "$line" in
    uci) echo "id name Scripted"; echo "uciok" ;;
    isready) echo "readyok" ;;
    "go depth"*) echo "info depth 1 score cp 20 pv e2e4"; echo "bestmove e2e4 ponder e7e5" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Like [`OBEDIENT_ENGINE`] but never honours `quit`.
pub const STUBBORN_ENGINE: &str = r#"#!/bin/sh
while IFS= read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
  esac
done
"#;

/// Completes the handshake, then dies on the first search.
pub const CRASHING_ENGINE: &str = r#"#!/bin/sh
while IFS= read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    "go depth"*) exit 3 ;;
  esac
done
"#;

/// Takes a few seconds to answer `uci`, then behaves.
pub const SLOW_ENGINE: &str = r#"#!/bin/sh
while IFS= read -r line; do
  case "$line" in
    uci) sleep 3; echo "uciok" ;;
    isready) echo "readyok" ;;
    "go depth"*) echo "bestmove d2d4" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Exits without ever answering `uci`.
pub const MUTE_ENGINE: &str = "#!/bin/sh\nexit 0\n";

/// Write an executable engine script into `dir` and return its path.
#[cfg(unix)]
pub fn engine_script(dir: &Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).expect("Failed to write engine script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to mark engine script executable");
    path.to_string_lossy().into_owned()
}

/// Test config whose engine is the script at `path`.
pub fn config_with_engine(path: &str) -> Config {
    let mut config = test_config();
    config.engine.path = path.to_string();
    config
}

/// Build a URL for an endpoint on a spawned server.
pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}
