use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use tokio::fs;
use tracing::info;

use crate::config::HandlerConfig;
use crate::event::HandlerRequest;
use crate::resource;

#[derive(Debug, Clone, Args)]
pub struct InvokeCommand {
    #[arg(help = "Path to a JSON handler request")]
    pub file: PathBuf,

    #[arg(long, help = "Pretty-print the resulting progress event")]
    pub pretty: bool,
}

impl InvokeCommand {
    pub async fn execute(self, config: HandlerConfig) -> Result<()> {
        let request = load_request(&self.file).await?;
        info!(
            "Invoking {} for {} from {}",
            request.action,
            request.type_name,
            self.file.display()
        );

        let event = resource::invoke(&config, request).await;

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&event)
        } else {
            serde_json::to_string(&event)
        }
        .context("Failed to serialize progress event")?;
        println!("{rendered}");

        if !event.is_success() {
            bail!(
                "{}: {}",
                event.message,
                event.error_message.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(())
    }
}

async fn load_request(path: &Path) -> Result<HandlerRequest> {
    let contents = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read request file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse handler request: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Action;
    use std::env;

    #[tokio::test]
    async fn test_load_request_from_file() {
        let path = env::temp_dir().join(format!("idp-resources-request-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{
                "typeName": "Community::IAM::SAMLProvider",
                "action": "DELETE",
                "desiredResourceState": { "Name": "corp-idp" }
            }"#,
        )
        .await
        .unwrap();

        let request = load_request(&path).await.unwrap();
        fs::remove_file(&path).await.ok();

        assert_eq!(request.action, Action::Delete);
        assert_eq!(request.type_name, "Community::IAM::SAMLProvider");
        assert!(request.previous_resource_state.is_none());
    }

    #[tokio::test]
    async fn test_load_request_missing_file() {
        let err = load_request(Path::new("/nonexistent/request.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read request file"));
    }
}
