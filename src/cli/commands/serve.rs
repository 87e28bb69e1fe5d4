//! Web server command.

use std::sync::Arc;

use console::style;

use crate::config::Config;
use crate::services::AnalysisService;

const DEFAULT_PORT: u16 = 3030;

/// Start the web server.
pub async fn cmd_serve(config: &Config, bind: Option<&str>) -> anyhow::Result<()> {
    let addr = parse_bind_address(bind.unwrap_or(&config.server.bind));

    let service = AnalysisService::from_config(config)?;
    eprintln!("{} Checking annotator backends...", style("→").cyan());
    if let Err(e) = service.ensure_available().await {
        eprintln!("  {} {}", style("✗").red(), e);
        return Err(e.into());
    }
    eprintln!("  {} Pipeline ready", style("✓").green());

    eprintln!(
        "{} Starting textnerl server at http://{}",
        style("→").cyan(),
        addr
    );
    eprintln!("  Press Ctrl+C to stop");

    crate::server::serve(Arc::new(service), &addr).await
}

/// Normalize a bind address that can be:
/// - Just a port: "3030" -> 127.0.0.1:3030
/// - Just a host: "0.0.0.0" -> 0.0.0.0:3030
/// - Host and port: "0.0.0.0:3030" -> 0.0.0.0:3030
fn parse_bind_address(bind: &str) -> String {
    if let Ok(port) = bind.parse::<u16>() {
        return format!("127.0.0.1:{}", port);
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if port_str.parse::<u16>().is_ok() {
            return format!("{}:{}", host, port_str);
        }
    }

    format!("{}:{}", bind, DEFAULT_PORT)
}
