//! Trading Client Example
//!
//! Connects to a gateway, logs on, sends a buy and a sell order, waits for
//! their execution reports, then logs out.
//!
//! Run `mock_gateway` first, or point `TRADELINK_HOST`/`TRADELINK_PORT` at a
//! real gateway.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{error, info, warn};

use tradelink::prelude::*;

mod common;
use common::{ExampleConfig, init_logging};

/// Logs every session event and forwards execution reports.
struct LoggingApplication {
    reports: mpsc::UnboundedSender<ExecutionReport>,
}

impl Application for LoggingApplication {
    fn on_logon_reply(&mut self, reply: &LogonReply) -> std::result::Result<(), HandlerError> {
        if reply.is_accepted() {
            info!("Logon accepted");
        } else {
            warn!(reject_code = reply.reject_code, "Logon rejected");
        }
        Ok(())
    }

    fn on_logout(&mut self) -> std::result::Result<(), HandlerError> {
        info!("Logged out by gateway");
        Ok(())
    }

    fn on_heartbeat(&mut self) -> std::result::Result<(), HandlerError> {
        info!("Heartbeat");
        Ok(())
    }

    fn on_execution_report(
        &mut self,
        report: &ExecutionReport,
    ) -> std::result::Result<(), HandlerError> {
        info!(
            "Execution report: order {} {} last {}@{} leaves {}",
            report.client_order_id,
            report.exec_type,
            report.last_quantity,
            report.last_price,
            report.leaves_quantity
        );
        let _ = self.reports.send(*report);
        Ok(())
    }

    fn on_connection_closed(&mut self, reason: &CloseReason) {
        info!("Connection closed: {}", reason);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::from_env();
    info!("Connecting to {}", cfg.addr());

    let (report_tx, mut report_rx) = mpsc::unbounded_channel();
    let (handle, task) = ClientBuilder::new()
        .with_application(LoggingApplication { reports: report_tx })
        .with_address(cfg.addr())
        .with_config(cfg.session_config()?)
        .spawn()?;

    if let Err(e) = handle.wait_for_logon().await {
        error!("Logon failed: {}", e);
        task.await??;
        return Ok(());
    }

    let instrument = InstrumentId::new(1);
    let buy = handle
        .send_new_order(100.25, 10, Side::Buy, instrument)
        .await?;
    let sell = handle
        .send_new_order(100.75, 5, Side::Sell, instrument)
        .await?;
    info!("Sent orders {} and {}", buy, sell);

    for _ in 0..2 {
        match timeout(Duration::from_secs(10), report_rx.recv()).await {
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(_) => {
                warn!("Timed out waiting for execution reports");
                break;
            }
        }
    }

    if let Err(e) = handle.logout().await {
        warn!("Logout failed: {}", e);
    }
    handle.close().await;
    task.await??;
    info!("Done");
    Ok(())
}
