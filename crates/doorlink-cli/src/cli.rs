//! clap definitions: global options plus one subcommand per appliance
//! action, standing in for the original status page's buttons.

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "doorlink",
    about = "Control and monitor a doorlink alarm appliance",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Appliance base URL, e.g. http://alarm.local:8080
    #[arg(long, short = 'a', env = "DOORLINK_APPLIANCE", global = true)]
    pub appliance: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Arm the alarm
    Arm,

    /// Disarm the alarm
    Disarm,

    /// Follow live armed/door state from the push channel
    Watch,

    /// Shut down the appliance
    Shutdown,

    /// Reboot the appliance
    Reboot,

    /// Ask the appliance to check for software updates
    CheckUpdates,
}
