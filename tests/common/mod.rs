//! Shared fixtures: a local HTTP server standing in for the manifest,
//! descriptor and artifact hosts, plus a release built on top of it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use ctlauncher::core::downloader::{sha1_hex, InstallObserver};
use tokio::net::TcpListener;

#[derive(Default)]
struct Shared {
    files: Mutex<HashMap<String, Vec<u8>>>,
    /// Sent as a chunked stream, without a Content-Length header.
    streamed: Mutex<HashMap<String, Vec<u8>>>,
    request_counts: Mutex<HashMap<String, usize>>,
}

/// Serves whatever was `put` into it and counts requests per path.
pub struct FixtureServer {
    base_url: String,
    shared: Arc<Shared>,
}

impl FixtureServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://127.0.0.1:{}", addr.port());

        let shared = Arc::new(Shared::default());
        let app = Router::new()
            .fallback(serve_file)
            .with_state(shared.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, shared }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn put(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.shared
            .files
            .lock()
            .unwrap()
            .insert(path.to_string(), body.into());
    }

    pub fn put_streamed(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.shared
            .streamed
            .lock()
            .unwrap()
            .insert(path.to_string(), body.into());
    }

    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.shared.files.lock().unwrap().remove(path)
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.shared
            .request_counts
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

async fn serve_file(State(shared): State<Arc<Shared>>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    *shared
        .request_counts
        .lock()
        .unwrap()
        .entry(path.clone())
        .or_insert(0) += 1;

    if let Some(body) = shared.streamed.lock().unwrap().get(&path).cloned() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> =
            body.chunks(8 * 1024).map(|chunk| Ok(chunk.to_vec())).collect();
        return Response::new(Body::from_stream(futures_util::stream::iter(chunks)));
    }

    let body = shared.files.lock().unwrap().get(&path).cloned();
    match body {
        Some(body) => (StatusCode::OK, body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn zip_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in members {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub const MANIFEST_PATH: &str = "/mc/game/version_manifest_v2.json";
pub const CLIENT_PATH: &str = "/v1/objects/client/X.jar";
pub const LIB_PATH: &str = "/libraries/com/example/core/1.0/core-1.0.jar";
pub const OSX_LIB_PATH: &str = "/libraries/com/example/osx-only/1.0/osx-only-1.0.jar";
pub const NATIVES_LINUX_PATH: &str =
    "/libraries/org/lwjgl/lwjgl-platform/2.9.4/lwjgl-platform-2.9.4-natives-linux.jar";
pub const ASSET_INDEX_PATH: &str = "/v1/packages/indexes/5.json";
pub const ASSET_OBJECT_HASH: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";

/// Publish release `X`: manifest, descriptor, client, two libraries (one
/// osx-only), a linux native archive and an asset index.
pub fn publish_release(server: &FixtureServer) -> String {
    server.put(CLIENT_PATH, b"client-jar".to_vec());
    server.put(LIB_PATH, b"core-lib".to_vec());
    server.put(OSX_LIB_PATH, b"osx-lib".to_vec());
    let natives = zip_bytes(&[
        ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"),
        ("liblwjgl64.so", b"ELF-lwjgl"),
        ("org/lwjgl/Sys.class", b"cafebabe"),
    ]);
    server.put(NATIVES_LINUX_PATH, natives.clone());

    let asset_index = serde_json::json!({
        "objects": { "minecraft/lang/en_us.json": { "hash": ASSET_OBJECT_HASH, "size": 3 } }
    })
    .to_string();
    server.put(ASSET_INDEX_PATH, asset_index.clone());
    server.put(
        &format!("/objects/{}/{}", &ASSET_OBJECT_HASH[..2], ASSET_OBJECT_HASH),
        b"abc".to_vec(),
    );

    let descriptor = serde_json::json!({
        "id": "X",
        "type": "release",
        "mainClass": "net.minecraft.client.main.Main",
        "assetIndex": {
            "id": "5",
            "url": server.url(ASSET_INDEX_PATH),
            "sha1": sha1_hex(asset_index.as_bytes())
        },
        "downloads": {
            "client": { "url": server.url(CLIENT_PATH), "sha1": sha1_hex(b"client-jar"), "size": 10 }
        },
        "libraries": [
            {
                "name": "com.example:core:1.0",
                "downloads": { "artifact": {
                    "path": "com/example/core/1.0/core-1.0.jar",
                    "url": server.url(LIB_PATH),
                    "sha1": sha1_hex(b"core-lib")
                } }
            },
            {
                "name": "com.example:osx-only:1.0",
                "rules": [{ "action": "allow", "os": { "name": "osx" } }],
                "downloads": { "artifact": {
                    "path": "com/example/osx-only/1.0/osx-only-1.0.jar",
                    "url": server.url(OSX_LIB_PATH),
                    "sha1": sha1_hex(b"osx-lib")
                } }
            },
            {
                "name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.4",
                "natives": { "linux": "natives-linux", "windows": "natives-windows-${arch}" },
                "downloads": { "classifiers": {
                    "natives-linux": {
                        "path": "org/lwjgl/lwjgl-platform/2.9.4/lwjgl-platform-2.9.4-natives-linux.jar",
                        "url": server.url(NATIVES_LINUX_PATH),
                        "sha1": sha1_hex(&natives)
                    }
                } }
            }
        ]
    })
    .to_string();
    server.put("/v1/packages/X.json", descriptor.clone());

    let manifest = serde_json::json!({
        "latest": { "release": "X", "snapshot": "X" },
        "versions": [
            {
                "id": "X",
                "type": "release",
                "url": server.url("/v1/packages/X.json"),
                "sha1": sha1_hex(descriptor.as_bytes())
            },
            { "id": "Y-broken", "type": "snapshot", "url": server.url("/v1/packages/broken.json") }
        ]
    })
    .to_string();
    server.put(MANIFEST_PATH, manifest);
    server.put("/v1/packages/broken.json", b"{ \"id\": \"Y-broken\", ".to_vec());

    server.url(MANIFEST_PATH)
}

/// Records every callback for later assertions.
#[derive(Default)]
pub struct Recorder {
    pub statuses: Mutex<Vec<String>>,
    pub progress: Mutex<Vec<f32>>,
}

impl InstallObserver for Recorder {
    fn on_status(&self, message: &str) {
        self.statuses.lock().unwrap().push(message.to_string());
    }

    fn on_progress(&self, fraction: f32) {
        self.progress.lock().unwrap().push(fraction);
    }
}
