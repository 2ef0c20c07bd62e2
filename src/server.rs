// ABOUTME: HTTP server for the pitch-deck application
// ABOUTME: Serves slide pages and a small versioned navigation API over tiny_http

use crate::deck::Deck;
use crate::errors::{DeckError, Result};
use crate::html;
use crate::navigation::{Intent, NavigationState};
use log::{debug, error, info};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use url::Url;

/// Version of the JSON control API under `/api/v{N}`
pub const API_VERSION: u32 = 1;

/// A response computed by [`handle`] before it is written to the socket
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub location: Option<String>,
}

impl Reply {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
            location: None,
        }
    }

    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status: 200,
                content_type: "application/json",
                body,
                location: None,
            },
            Err(e) => Self::text(500, format!("Failed to encode response: {}", e)),
        }
    }

    fn redirect(location: String) -> Self {
        Self {
            status: 303,
            content_type: "text/plain; charset=utf-8",
            body: format!("See {}", location),
            location: Some(location),
        }
    }

    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
            location: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct DeckInfo<'a> {
    version: u32,
    title: &'a str,
    count: usize,
    slides: Vec<SlideInfo<'a>>,
}

#[derive(Debug, Serialize)]
struct SlideInfo<'a> {
    index: usize,
    title: &'a str,
}

#[derive(Debug, Serialize)]
struct NavigationInfo<'a> {
    index: usize,
    title: &'a str,
    previous_enabled: bool,
    next_enabled: bool,
}

/// Route one request. `target` is the raw request target, e.g. `/?slide=3`.
pub fn handle(deck: &Deck, method: &Method, target: &str) -> Reply {
    if *method != Method::Get && *method != Method::Head {
        return Reply::text(405, "405 Method Not Allowed");
    }

    let url = match Url::parse("http://localhost").and_then(|base| base.join(target)) {
        Ok(url) => url,
        Err(e) => return Reply::text(400, format!("Bad request target: {}", e)),
    };
    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();

    let result = match url.path() {
        "/" => render_slide(deck, &query),
        "/navigate" => navigate(deck, &query)
            .map(|state| Reply::redirect(format!("/?slide={}", state.current()))),
        path if path == format!("/api/v{}/deck", API_VERSION) => Ok(deck_info(deck)),
        path if path == format!("/api/v{}/navigate", API_VERSION) => {
            navigate(deck, &query).map(|state| navigation_info(deck, &state))
        }
        _ => Ok(Reply::text(404, "404 Not Found")),
    };

    result.unwrap_or_else(|e| Reply::text(400, e.to_string()))
}

/// `/` starts a fresh presentation at slide 0; `?slide=N` mounts it at N
fn render_slide(deck: &Deck, query: &HashMap<String, String>) -> Result<Reply> {
    let index = match query.get("slide") {
        Some(raw) => parse_index("slide", raw)?,
        None => 0,
    };
    let state = NavigationState::at(index, deck.len())?;
    Ok(Reply::html(html::render_page(deck, &state)))
}

fn navigate(deck: &Deck, query: &HashMap<String, String>) -> Result<NavigationState> {
    let from = match query.get("from") {
        Some(raw) => parse_index("from", raw)?,
        None => 0,
    };
    // `steps` carries every press made on one page before it was replaced
    let intents = match (query.get("steps"), query.get("intent")) {
        (Some(steps), _) => Intent::parse_steps(steps)?,
        (None, Some(name)) => vec![Intent::from_query(name, query.get("index").map(String::as_str))?],
        (None, None) => {
            return Err(DeckError::ValidationError(
                "Missing intent or steps parameter".to_string(),
            ))
        }
    };

    let state = NavigationState::at(from, deck.len())?.apply_all(intents.iter().copied());
    debug!("Navigation {:?} from {} -> {}", intents, from, state.current());
    Ok(state)
}

fn parse_index(name: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>().map_err(|_| {
        DeckError::ValidationError(format!("Invalid {} parameter: {}", name, raw))
    })
}

fn deck_info(deck: &Deck) -> Reply {
    Reply::json(&DeckInfo {
        version: API_VERSION,
        title: deck.title(),
        count: deck.len(),
        slides: deck
            .slides()
            .iter()
            .map(|slide| SlideInfo {
                index: slide.index,
                title: &slide.title,
            })
            .collect(),
    })
}

fn navigation_info(deck: &Deck, state: &NavigationState) -> Reply {
    let controls = state.controls();
    Reply::json(&NavigationInfo {
        index: state.current(),
        title: deck
            .get(state.current())
            .map(|slide| slide.title.as_str())
            .unwrap_or_default(),
        previous_enabled: controls.previous_enabled,
        next_enabled: controls.next_enabled,
    })
}

fn respond(request: tiny_http::Request, reply: Reply) {
    let mut response = Response::from_string(reply.body).with_status_code(StatusCode(reply.status));

    if let Ok(header) = Header::from_bytes("Content-Type", reply.content_type) {
        response.add_header(header);
    }
    if let Some(location) = reply.location {
        if let Ok(header) = Header::from_bytes("Location", location) {
            response.add_header(header);
        }
    }

    if let Err(e) = request.respond(response) {
        error!("Failed to send response: {}", e);
    }
}

fn run_loop(server: &Server, deck: &Deck) {
    for request in server.incoming_requests() {
        debug!("{} {}", request.method(), request.url());
        let reply = handle(deck, request.method(), request.url());
        respond(request, reply);
    }
}

fn bind(addr: &str) -> Result<Server> {
    Server::http(addr)
        .map_err(|e| DeckError::ServerError(format!("Failed to start HTTP server on {}: {}", addr, e)))
}

/// Serve the deck on `addr`, blocking the calling thread
pub fn serve(deck: Deck, addr: &str) -> Result<()> {
    let server = bind(addr)?;
    info!("Presentation listening on http://{}", addr);
    println!("Presentation listening on http://{} (Press Ctrl+C to stop)", addr);
    run_loop(&server, &deck);
    Ok(())
}

/// A server running on a background thread; stopped when dropped
pub struct ServerHandle {
    server: Arc<Server>,
    addr: SocketAddr,
    thread: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Serve the deck on a background thread. Bind to port 0 to pick a free port.
pub fn spawn(deck: Deck, addr: &str) -> Result<ServerHandle> {
    let server = Arc::new(bind(addr)?);
    let bound = server.server_addr().to_ip().ok_or_else(|| {
        DeckError::ServerError(format!("Server on {} is not bound to an IP address", addr))
    })?;

    let server_thread = server.clone();
    let thread = thread::spawn(move || {
        info!("Presentation listening on http://{}", bound);
        run_loop(&server_thread, &deck);
    });

    Ok(ServerHandle {
        server,
        addr: bound,
        thread: Some(thread),
    })
}
