use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{CompletionsCommand, InvokeCommand, ServeCommand};
use crate::config::HandlerConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "idp-resources", version, about = "CloudFormation handlers for IAM OIDC and SAML identity providers", long_about = None)]
pub struct Cli {
    #[arg(
        short = 'p',
        long,
        global = true,
        help = "AWS profile name (defaults to AWS_PROFILE)"
    )]
    pub profile: Option<String>,

    #[arg(
        long,
        global = true,
        help = "AWS region for IAM and STS calls"
    )]
    pub region: Option<String>,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Run as an AWS Lambda function handling resource requests")]
    Serve(ServeCommand),
    #[command(about = "Run a single handler request from a JSON file")]
    Invoke(InvokeCommand),
    #[command(about = "Generate shell completion scripts for idp-resources")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = HandlerConfig::from_env().with_overrides(self.profile, self.region);

        // The Lambda bootstrap runs without arguments
        let command = self.command.unwrap_or(Commands::Serve(ServeCommand {}));

        match command {
            Commands::Serve(cmd) => cmd.execute(config).await,
            Commands::Invoke(cmd) => cmd.execute(config).await,
            Commands::Completions(cmd) => cmd.execute(),
        }
    }
}
