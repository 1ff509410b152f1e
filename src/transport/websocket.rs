//! WebSocket transport
//!
//! Accepts TCP connections, performs the WebSocket upgrade on the configured
//! endpoint and runs each connection on its own task:
//! - the connection handler reads frames and routes them through the router
//! - a writer drains the connection's outbound queue into the socket
//!
//! A request for another path is refused with `404` during the handshake.
//! Any other upgrade failure gets a plain `500` and the stream is dropped.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::Sink;
use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_tungstenite::accept_hdr_async;
use tracing::{debug, info, warn};
use tungstenite::Error as WsError;
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Message as WsMessage;

use crate::broker::Router;
use crate::client::Connection;
use crate::config::ServerSettings;
use crate::transport::handler::handle_connection;
use crate::utils::{PubSubError, Result};

const UPGRADE_FAILURE_RESPONSE: &[u8] = b"HTTP/1.1 500 Internal Server Error\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
Content-Length: 14\r\n\
Connection: close\r\n\
\r\n\
internal error";

/// Binds the configured address and serves connections until the process
/// stops. Only a bind failure is returned.
pub async fn start_websocket_server<R>(settings: &ServerSettings, router: Arc<R>) -> Result<()>
where
    R: Router + ?Sized + 'static,
{
    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| PubSubError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!("WebSocket server listening on ws://{addr}{}", settings.endpoint);

    serve(listener, router, settings.endpoint.clone()).await;
    Ok(())
}

/// Accept loop over an already bound listener.
pub async fn serve<R>(listener: TcpListener, router: Arc<R>, endpoint: String)
where
    R: Router + ?Sized + 'static,
{
    let endpoint: Arc<str> = endpoint.into();

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("failed to accept connection: {e}");
                continue;
            }
        };

        let router = router.clone();
        let endpoint = endpoint.clone();
        tokio::spawn(async move {
            serve_connection(stream, peer, router, endpoint).await;
        });
    }
}

async fn serve_connection<R>(
    mut stream: TcpStream,
    peer: SocketAddr,
    router: Arc<R>,
    endpoint: Arc<str>,
) where
    R: Router + ?Sized,
{
    let check_path = |request: &Request, response: Response| {
        if request.uri().path() == &*endpoint {
            Ok(response)
        } else {
            Err(not_found())
        }
    };

    let failure = match accept_hdr_async(&mut stream, check_path).await {
        Ok(ws_stream) => {
            let (ws_sender, ws_receiver) = ws_stream.split();
            let (conn, outbound) = Connection::channel();

            // The handler drops its handle on exit and removes the client
            // from every topic, which closes the queue and ends the writer.
            let (client_id, ()) = tokio::join!(
                handle_connection(ws_receiver, conn, router.as_ref()),
                forward_outbound(ws_sender, outbound, peer),
            );
            info!(client_id = %client_id, %peer, "connection closed");
            return;
        }
        Err(e) => e,
    };

    match failure {
        // the handshake already answered with the rejection
        WsError::Http(response) => {
            debug!(%peer, status = %response.status(), "refused websocket upgrade");
        }
        e => {
            warn!(%peer, "WebSocket handshake error: {e}");
            if let Err(e) = reject_upgrade(&mut stream).await {
                debug!(%peer, "failed to send upgrade failure response: {e}");
            }
        }
    }
}

fn not_found() -> ErrorResponse {
    let mut rejection = ErrorResponse::new(Some("not found".to_string()));
    *rejection.status_mut() = StatusCode::NOT_FOUND;
    rejection
}

async fn reject_upgrade(stream: &mut TcpStream) -> std::io::Result<()> {
    stream.write_all(UPGRADE_FAILURE_RESPONSE).await?;
    stream.shutdown().await
}

/// Drains queued frames into the socket. Returns on the first write error,
/// dropping the queue so the handler sees the connection as closed.
async fn forward_outbound<S>(
    mut sink: S,
    mut outbound: UnboundedReceiver<WsMessage>,
    peer: SocketAddr,
) where
    S: Sink<WsMessage, Error = WsError> + Unpin,
{
    while let Some(msg) = outbound.recv().await {
        if let Err(e) = sink.send(msg).await {
            warn!(%peer, "Failed to send message: {e}");
            break;
        }
    }

    drop(outbound);
    let _ = sink.close().await;
    debug!(%peer, "send loop closed");
}
