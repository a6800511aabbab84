use anyhow::{Result, anyhow};
use clap::Args;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use tracing::info;

use crate::config::HandlerConfig;
use crate::event::HandlerRequest;
use crate::resource;

#[derive(Debug, Clone, Args)]
pub struct ServeCommand {}

impl ServeCommand {
    pub async fn execute(self, config: HandlerConfig) -> Result<()> {
        info!("Starting Lambda runtime");
        let config = &config;

        lambda_runtime::run(service_fn(
            move |event: LambdaEvent<HandlerRequest>| async move {
                info!("Received request {}", event.context.request_id);
                Ok::<_, Error>(resource::invoke(config, event.payload).await)
            },
        ))
        .await
        .map_err(|e| anyhow!("Lambda runtime failed: {e}"))
    }
}
