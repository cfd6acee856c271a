//! Preset HTTP service: a small TCP server exposing the preset store.
//!
//! Routes:
//! - `GET /api/presets` lists presets
//! - `POST /api/presets` creates one from a JSON body
//! - `DELETE /api/presets/{id}` removes one (idempotent)
//!
//! Each connection is handled on its own thread and carries exactly one
//! request, so concurrent clients only contend on the store mutex.

use std::io::{self, BufReader};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use log::{error, info, warn};

use crate::error::StoreError;
use crate::store::{NewPreset, PresetStore};

pub mod http;

use http::{read_request, write_response, Request, Response};

/// Store handle shared across connection threads.
pub type SharedStore = Arc<Mutex<Box<dyn PresetStore + Send>>>;

/// HTTP front end for a preset store.
pub struct PresetService {
    listener: TcpListener,
    store: SharedStore,
}

impl PresetService {
    /// Bind to an address. Pass port 0 to let the OS pick one.
    pub fn bind(addr: &str, store: SharedStore) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        info!("Preset service listening on {}", listener.local_addr()?);
        Ok(PresetService { listener, store })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails.
    pub fn serve(&self) -> io::Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let store = Arc::clone(&self.store);
                    thread::spawn(move || handle_connection(stream, store));
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
        Ok(())
    }
}

fn handle_connection(stream: TcpStream, store: SharedStore) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".into());

    let read_stream = match stream.try_clone() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to clone stream for {}: {}", peer, e);
            return;
        }
    };
    let mut reader = BufReader::new(read_stream);
    let mut writer = stream;

    let response = match read_request(&mut reader) {
        Ok(request) => {
            let response = route(&request, &store);
            info!(
                "{} {} {} -> {}",
                peer,
                request.method,
                request.path,
                response.status()
            );
            response
        }
        Err(e) => {
            warn!("Malformed request from {}: {}", peer, e);
            Response::error(400, "Malformed request")
        }
    };

    if let Err(e) = write_response(&mut writer, &response) {
        warn!("Failed to respond to {}: {}", peer, e);
    }
}

fn route(request: &Request, store: &SharedStore) -> Response {
    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/api/presets") => list_presets(store),
        ("POST", "/api/presets") => create_preset(&request.body, store),
        (method, path) => {
            if method == "DELETE" {
                if let Some(id_text) = path.strip_prefix("/api/presets/") {
                    return delete_preset(id_text, store);
                }
            }
            Response::error(404, "Not found")
        }
    }
}

fn list_presets(store: &SharedStore) -> Response {
    let store = lock_store(store);
    match store.list() {
        Ok(records) => encode_json(&records),
        Err(e) => store_failure(e),
    }
}

fn create_preset(body: &[u8], store: &SharedStore) -> Response {
    let preset: NewPreset = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => return Response::error(400, &format!("Invalid preset: {e}")),
    };

    let mut store = lock_store(store);
    match store.create(preset) {
        Ok(record) => encode_json(&record),
        Err(e) => store_failure(e),
    }
}

fn delete_preset(id_text: &str, store: &SharedStore) -> Response {
    let id: i64 = match id_text.parse() {
        Ok(id) if id > 0 => id,
        _ => return Response::error(400, "Invalid ID"),
    };

    let mut store = lock_store(store);
    match store.delete(id) {
        Ok(()) => Response::empty(204),
        Err(e) => store_failure(e),
    }
}

fn encode_json<T: serde::Serialize>(value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(json) => Response::json(json),
        Err(e) => {
            error!("Failed to encode response: {}", e);
            Response::error(503, "Store unavailable")
        }
    }
}

fn store_failure(err: StoreError) -> Response {
    match err {
        StoreError::InvalidRecord(msg) => Response::error(400, &msg),
        StoreError::Unavailable(msg) => {
            error!("Store failure: {}", msg);
            Response::error(503, "Store unavailable")
        }
    }
}

/// Lock the shared store, recovering from a poisoned mutex. A panic in
/// one connection thread must not take the whole service down.
fn lock_store(store: &SharedStore) -> MutexGuard<'_, Box<dyn PresetStore + Send>> {
    match store.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
