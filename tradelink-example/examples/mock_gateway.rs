//! Mock Gateway Example
//!
//! Accepts client sessions, answers every Logon with an accepting
//! LogonReply and every NewOrder with an ExecutionReport of type New, and
//! echoes heartbeats. Useful for running `trading_client` locally.

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;
use tracing::{error, info, warn};

use tradelink::prelude::*;

mod common;
use common::{ExampleConfig, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::from_env();
    info!("Starting mock gateway on {}", cfg.addr());

    let listener = TcpListener::bind(&cfg.addr()).await?;
    loop {
        let (socket, addr) = listener.accept().await?;
        info!("Connection from {}", addr);
        tokio::spawn(async move {
            if let Err(e) = handle(socket).await {
                error!("Session error: {}", e);
            }
            info!("Connection from {} closed", addr);
        });
    }
}

async fn handle(socket: TcpStream) -> anyhow::Result<()> {
    socket.set_nodelay(true)?;
    let mut framed = Framed::new(socket, FrameCodec::new());

    while let Some(frame) = framed.next().await {
        let frame = frame?;

        let message = match frame.decode_envelope().and_then(Envelope::into_message) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping undecodable frame: {}", e);
                continue;
            }
        };

        let reply = match message {
            Message::Logon(logon) => {
                info!("Logon from {}", logon.user_name);
                Some(Message::LogonReply(LogonReply::accepted()))
            }
            Message::NewOrder(order) => {
                info!(
                    "New order {}: {} {}@{} on {}",
                    order.client_order_id,
                    order.side,
                    order.order_quantity,
                    order.limit_price,
                    order.instrument_id
                );
                Some(Message::ExecutionReport(ExecutionReport {
                    client_order_id: order.client_order_id,
                    instrument_id: order.instrument_id,
                    exec_type: ExecType::New,
                    last_quantity: 0,
                    last_price: 0.0,
                    leaves_quantity: order.order_quantity,
                }))
            }
            Message::Heartbeat(_) => {
                info!("Heartbeat");
                Some(Message::Heartbeat(Heartbeat))
            }
            Message::Logout(_) => {
                info!("Logout");
                None
            }
            other => {
                warn!("Unexpected {} from client", other.msg_type());
                None
            }
        };

        if let Some(reply) = reply {
            framed.send(reply).await?;
        }
    }
    Ok(())
}
