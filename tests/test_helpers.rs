use edit_session::*;
use std::result::Result;
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(CreateSessionRequest),
    Attach { session: String, urls: Vec<String> },
    Generate { session: String, num_images: u32 },
    Share(String),
}

/// What the generate call answers with.
#[derive(Debug, Clone)]
pub enum GenerateReply {
    Images(Vec<GeneratedImage>),
    Status(u16),
    Panic,
}

/// In-memory [`EditBackend`] that answers from a script and records calls.
#[derive(Debug)]
pub struct ScriptedBackend {
    pub create_status: Option<u16>,
    pub attach_status: Option<u16>,
    pub generate: GenerateReply,
    pub share_status: Option<u16>,
    calls: Mutex<Vec<Call>>,
}

pub const REMOTE_SESSION: &str = "srv-session-1";

impl ScriptedBackend {
    /// Every call succeeds; generate returns one image `img-1`.
    pub fn healthy() -> Self {
        Self {
            create_status: None,
            attach_status: None,
            generate: GenerateReply::Images(vec![GeneratedImage {
                id: "img-1".into(),
                url: "https://cdn.example/img-1.png".into(),
            }]),
            share_status: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_create(status: u16) -> Self {
        Self {
            create_status: Some(status),
            ..Self::healthy()
        }
    }

    pub fn failing_attach(status: u16) -> Self {
        Self {
            attach_status: Some(status),
            ..Self::healthy()
        }
    }

    pub fn with_generate(reply: GenerateReply) -> Self {
        Self {
            generate: reply,
            ..Self::healthy()
        }
    }

    pub fn rejecting_share(status: u16) -> Self {
        Self {
            share_status: Some(status),
            ..Self::healthy()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn http_error(status: u16) -> RemoteProtocolError {
    RemoteProtocolError::Http {
        status,
        body: "scripted failure".into(),
    }
}

impl EditBackend for ScriptedBackend {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<String, RemoteProtocolError> {
        self.record(Call::Create(request.clone()));
        match self.create_status {
            Some(status) => Err(http_error(status)),
            None => Ok(REMOTE_SESSION.to_string()),
        }
    }

    async fn attach_source_images(
        &self,
        session_id: &str,
        urls: &[String],
    ) -> Result<(), RemoteProtocolError> {
        self.record(Call::Attach {
            session: session_id.to_string(),
            urls: urls.to_vec(),
        });
        match self.attach_status {
            Some(status) => Err(http_error(status)),
            None => Ok(()),
        }
    }

    async fn generate_images(
        &self,
        session_id: &str,
        num_images: u32,
    ) -> Result<Vec<GeneratedImage>, RemoteProtocolError> {
        self.record(Call::Generate {
            session: session_id.to_string(),
            num_images,
        });
        match &self.generate {
            GenerateReply::Images(images) => Ok(images.clone()),
            GenerateReply::Status(status) => Err(http_error(*status)),
            GenerateReply::Panic => panic!("scripted generate panic"),
        }
    }

    async fn share_image(&self, image_id: &str) -> Result<(), ShareError> {
        self.record(Call::Share(image_id.to_string()));
        match self.share_status {
            Some(status) => Err(ShareError::PublishRejected {
                status,
                body: "scripted rejection".into(),
            }),
            None => Ok(()),
        }
    }
}

/// The configuration used across the suite: `a cat` on SD 1.5 with a blob image.
pub fn cat_session() -> SessionConfig {
    SessionConfig::new()
        .with_prompt("a cat")
        .with_model(ModelName::StableDiffusionV15)
        .with_input_image("blob:abc")
}

/// Start a local HTTP server that answers every request with the same
/// status, content type and body. Returns its base url.
pub async fn serve_fixed_response(
    status_line: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    content_type,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{}", addr)
}

/// Consume request headers and a `Content-Length` body.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let Ok(n) = socket.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + body_len {
            return;
        }
    }
}
