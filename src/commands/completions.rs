use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory};
use clap_complete::Shell;

use crate::cli::Cli;

#[derive(Debug, Clone, Args)]
pub struct CompletionsCommand {
    #[arg(value_enum, help = "Target shell for completion script")]
    pub shell: Shell,

    #[arg(short, long, help = "Write the script to a file instead of stdout")]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    pub fn execute(self) -> Result<()> {
        match &self.output {
            Some(path) => {
                let mut file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                self.write_to(&mut file)
            }
            None => self.write_to(&mut io::stdout()),
        }
    }

    fn write_to(&self, out: &mut dyn Write) -> Result<()> {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        clap_complete::generate(self.shell, &mut cmd, bin_name, out);
        out.flush().context("Failed to write completion script")
    }
}
