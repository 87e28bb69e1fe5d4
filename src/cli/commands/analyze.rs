//! One-shot analysis command.

use std::path::PathBuf;

use tokio::io::AsyncReadExt;

use crate::config::Config;
use crate::services::AnalysisService;

/// Analyze text from an argument, a file or stdin and print the envelope.
pub async fn cmd_analyze(
    config: &Config,
    text: Option<String>,
    file: Option<PathBuf>,
    pretty: bool,
) -> anyhow::Result<()> {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
        (None, None) => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let service = AnalysisService::from_config(config)?;
    service.ensure_available().await?;

    let response = service.respond(Some(&text)).await;
    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", json);

    if !response.is_ok() {
        anyhow::bail!("Analysis failed ({}): {}", response.code, response.message);
    }
    Ok(())
}
