//! Development server with live reload and a view counter

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use crate::commands::generate;
use crate::helpers::url_for;
use crate::Site;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Per-page view totals, kept in memory for the lifetime of the server
#[derive(Default)]
pub struct ViewCounter {
    totals: RwLock<HashMap<String, u64>>,
}

/// Response body of the view counter endpoint
#[derive(Debug, Serialize, PartialEq)]
pub struct ViewCount {
    pub slug: String,
    pub total: u64,
}

impl ViewCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current total for a page
    pub async fn get(&self, slug: &str) -> ViewCount {
        let slug = normalize_slug(slug);
        let total = self.totals.read().await.get(&slug).copied().unwrap_or(0);
        ViewCount { slug, total }
    }

    /// Record one view and return the new total
    pub async fn increment(&self, slug: &str) -> ViewCount {
        let slug = normalize_slug(slug);
        let mut totals = self.totals.write().await;
        let total = totals.entry(slug.clone()).or_insert(0);
        *total += 1;
        ViewCount {
            slug,
            total: *total,
        }
    }
}

/// `writings/foo` and `/writings/foo/` count as the same page
fn normalize_slug(slug: &str) -> String {
    let trimmed = slug.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Server state
struct ServerState {
    public_dir: PathBuf,
    /// Site root the pages link under, e.g. `/` or `/blog/`
    root: String,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
    views: ViewCounter,
}

/// Start the development server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    // Create broadcast channel for live reload notifications
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        public_dir: site.public_dir.clone(),
        root: url_for(&site.config, ""),
        reload_tx: reload_tx.clone(),
        live_reload: watch,
        views: ViewCounter::new(),
    });

    let app = router(site, state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, url_for(&site.config, ""));
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    // Start file watcher if watch mode is enabled
    if watch {
        let site = site.clone();
        tokio::spawn(async move {
            let notify = move || {
                // Notify all connected clients to reload
                let _ = reload_tx.send(());
            };
            if let Err(e) = generate::watch_then(&site, notify).await {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Live reload socket, view counter (when enabled) and the public directory
fn router(site: &Site, state: Arc<ServerState>) -> Router {
    let mut app = Router::new().route("/__livereload", get(livereload_handler));

    let views = &site.config.views;
    if views.enable {
        // Same URL the page script posts to
        let route = format!("{}*slug", url_for(&site.config, &views.endpoint));
        tracing::debug!("View counter at {}", route);
        app = app.route(&route, get(view_count).post(record_view));
    }

    app.fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET: read the total for a page
async fn view_count(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Json<ViewCount> {
    Json(state.views.get(&slug).await)
}

/// POST: count a view of a page
async fn record_view(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Json<ViewCount> {
    let count = state.views.increment(&slug).await;
    tracing::debug!("{} viewed {} times", count.slug, count.total);
    Json(count)
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            // Wait for reload signal
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            // Handle incoming messages (ping/pong)
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve the public directory, injecting the live reload script into pages
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let Some(file_path) = public_file(&state.public_dir, &state.root, request.uri().path()) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html && state.live_reload {
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => Html(inject_live_reload(&content)).into_response(),
            Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        }
    } else {
        // Serve static file using tower-http
        let mut service = ServeFile::new(&file_path);
        match service.try_call(request).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

/// File under `public_dir` for a request path, `None` if it would leave it
///
/// Pages link under the site root, so that prefix is dropped first. Paths
/// without it are served as-is.
fn public_file(public_dir: &FsPath, root: &str, request_path: &str) -> Option<PathBuf> {
    let decoded = percent_encoding::percent_decode_str(request_path).decode_utf8_lossy();
    let relative = decoded
        .strip_prefix(root)
        .or_else(|| decoded.strip_prefix('/'))
        .unwrap_or(decoded.as_ref());

    let mut file_path = public_dir.to_path_buf();
    for component in FsPath::new(relative).components() {
        match component {
            Component::Normal(part) => file_path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                tracing::warn!("Refusing to serve {}", request_path);
                return None;
            }
        }
    }

    if file_path.is_dir() {
        file_path.push("index.html");
    }
    Some(file_path)
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        // If no </body> tag, append to end
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
