use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{ArgAction, Parser};

use crate::format::CommandFormatter;
use crate::pipeline::{PipelineConfig, WaitPolicy};
use crate::queue::ConsumerOptions;

/// Label, sign-off and format checks for newly opened pull requests, fed from NSQ.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, disable_version_flag = true)]
pub(crate) struct Cli {
    /// Print version and exit
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    _version: Option<bool>,
    /// Run in debug mode
    #[arg(short, long)]
    pub(crate) debug: bool,
    /// nsqlookupd address
    #[arg(long, env = "NSQ_LOOKUPD_ADDR", default_value = "nsqlookupd:4161")]
    pub(crate) lookupd_addr: String,
    /// NSQ topic carrying GitHub webhooks
    #[arg(long, default_value = "hooks-docker")]
    pub(crate) topic: String,
    /// NSQ channel
    #[arg(long, default_value = "patch-parser")]
    pub(crate) channel: String,
    /// GitHub access token (default: systemd credential `gh_token`)
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub(crate) gh_token: Option<String>,
    /// Seconds to wait before labelling a new PR, so the project board does not strip the label
    #[arg(long, default_value_t = 30)]
    pub(crate) label_delay_secs: u64,
    /// Messages processed concurrently
    #[arg(long, default_value = "1")]
    pub(crate) workers: NonZeroUsize,
    /// Stop requeueing a failing message after this many attempts (0: never)
    #[arg(long, default_value_t = 5)]
    pub(crate) max_attempts: u16,
    /// Directory for temporary checkouts
    #[arg(long)]
    pub(crate) work_dir: Option<PathBuf>,
    /// Formatter reading source on stdin and writing the formatted source to stdout
    #[arg(long, default_value = "gofmt -s")]
    pub(crate) format_command: String,
    /// Command suggested to contributors for fixing formatting
    /// (default: `--format-command` with `-w` when that is gofmt)
    #[arg(long)]
    pub(crate) fix_command: Option<String>,
    /// File extensions checked by the formatter
    #[arg(long, value_delimiter = ',', default_value = "go")]
    pub(crate) format_ext: Vec<String>,
}

impl Cli {
    pub(crate) fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            label_delay: WaitPolicy::fixed(Duration::from_secs(self.label_delay_secs)),
            work_dir: self.work_dir.clone(),
        }
    }

    pub(crate) fn consumer_options(&self) -> ConsumerOptions {
        ConsumerOptions {
            workers: self.workers,
            max_attempts: self.max_attempts,
        }
    }

    pub(crate) fn formatter(&self) -> Result<CommandFormatter> {
        let mut words = self.format_command.split_whitespace().map(str::to_owned);
        let Some(program) = words.next() else {
            bail!("--format-command must not be empty");
        };
        let fix_command = match &self.fix_command {
            Some(cmd) => cmd.clone(),
            None if program == "gofmt" => format!("{} -w", self.format_command.trim()),
            None => bail!("--fix-command is required for a formatter other than gofmt"),
        };
        Ok(CommandFormatter {
            program,
            args: words.collect(),
            extensions: self.format_ext.clone(),
            fix_command,
        })
    }
}
