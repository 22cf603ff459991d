//! Write half of the gateway socket

use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use mutiny_common::WireFormat;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::{GatewayError, GatewayResult};
use crate::protocol::{encoding, ClientCommand};

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;

/// Serializes writes from the heartbeat and outbound command calls
pub(crate) struct Outbound {
    format: WireFormat,
    sink: Mutex<Option<WsSink>>,
}

impl Outbound {
    pub(crate) fn new(format: WireFormat) -> Self {
        Self {
            format,
            sink: Mutex::new(None),
        }
    }

    pub(crate) async fn attach(&self, sink: WsSink) {
        *self.sink.lock().await = Some(sink);
    }

    pub(crate) async fn detach(&self) -> Option<WsSink> {
        self.sink.lock().await.take()
    }

    /// Encode and send a command
    pub(crate) async fn send(&self, command: &ClientCommand) -> GatewayResult<()> {
        let frame = encoding::encode(self.format, command)?;
        self.send_frame(frame).await
    }

    pub(crate) async fn send_frame(&self, frame: Message) -> GatewayResult<()> {
        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or(GatewayError::NotConnected)?;
        sink.send(frame).await?;
        Ok(())
    }
}
