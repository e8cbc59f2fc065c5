//! Demo server
//!
//! Builds a small router tree, compiles it and serves it over HTTP/1.
//! Run with: cargo run -p oxide-subrouter --example serve -- --verbose
//!
//! ```text
//! curl localhost:3000/
//! curl localhost:3000/api/v1/users/7 -H 'Authorization: Bearer demo'
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_subrouter::{middleware_fn, Method, Next, Request, Response, Router, ServeMux};

/// Serve a demo router tree.
#[derive(Parser)]
#[command(name = "serve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, env = "OXIDE_SUBROUTER_ADDR", default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Enable verbose output (logs every route registration).
    #[arg(short, long)]
    verbose: bool,
}

async fn log_requests(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method;
    let path = req.path.clone();
    let res = next.run(req).await;
    info!(
        %method,
        %path,
        status = res.status,
        elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
        "Request served"
    );
    res
}

async fn require_token(req: Request, next: Next) -> Response {
    let authorized = req
        .get_header("Authorization")
        .is_some_and(|value| value.starts_with("Bearer "));
    if !authorized {
        return Response::unauthorized();
    }
    next.run(req).await
}

async fn index(_req: Request) -> Response {
    Response::text("oxide-subrouter demo\n")
}

async fn health(_req: Request) -> Response {
    Response::json(&serde_json::json!({ "status": "ok" }))
}

async fn list_users(_req: Request) -> Response {
    Response::json(&serde_json::json!([{ "id": 1 }, { "id": 2 }]))
}

async fn get_user(req: Request) -> Response {
    match req.params.parse::<u64>("id") {
        Some(id) => Response::json(&serde_json::json!({ "id": id })),
        None => Response::not_found(),
    }
}

fn build_router() -> Router {
    let mut root = Router::new();
    root.use_middleware(middleware_fn(log_requests));
    root.get("/", index);
    root.get("/health", health);

    let api = root.nest("/api");
    api.use_middleware(middleware_fn(require_token));

    let v1 = api.nest("/v1");
    v1.get("/users", list_users);
    v1.get("/users/{id}", get_user);

    root
}

async fn handle_request(
    req: HyperRequest<hyper::body::Incoming>,
    mux: Arc<ServeMux>,
) -> Result<HyperResponse<Full<Bytes>>, Infallible> {
    let Some(method) = Method::parse(req.method().as_str()) else {
        return Ok(to_hyper(Response::method_not_allowed()));
    };
    let mut oxide_req = Request::new(method, req.uri().path());

    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            oxide_req.headers.insert(key.to_string(), v.to_string());
        }
    }

    oxide_req.body = req
        .collect()
        .await
        .map(|b| b.to_bytes().to_vec())
        .unwrap_or_default();

    Ok(to_hyper(mux.handle(oxide_req).await))
}

fn to_hyper(res: Response) -> HyperResponse<Full<Bytes>> {
    let mut hyper_res = HyperResponse::new(Full::new(Bytes::from(res.body)));
    *hyper_res.status_mut() =
        StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    for (key, value) in &res.headers {
        if let (Ok(name), Ok(value)) = (
            hyper::header::HeaderName::from_bytes(key.as_bytes()),
            hyper::header::HeaderValue::from_str(value),
        ) {
            hyper_res.headers_mut().insert(name, value);
        }
    }

    hyper_res
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mux = Arc::new(build_router().compile()?);

    let listener = TcpListener::bind(cli.addr).await?;
    info!(addr = %cli.addr, "Listening");

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let mux = Arc::clone(&mux);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| handle_request(req, Arc::clone(&mux)));

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!(error = %err, "Error serving connection");
            }
        });
    }
}
