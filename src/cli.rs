use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Flags, Settings};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "osc",
    version,
    about = "A terminal cockpit to navigate, observe and manage Kubernetes clusters."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    /// Refresh interval in seconds, 0 keeps the configured rate
    #[arg(short, long, default_value_t = 0)]
    pub refresh: i32,

    /// Hide the header with cluster info and key hints
    #[arg(long)]
    pub headless: bool,

    /// Hide the breadcrumbs
    #[arg(long)]
    pub crumbsless: bool,

    /// Disable all commands that modify the cluster
    #[arg(long)]
    pub readonly: bool,

    /// Allow modifying commands, overrides a read-only config
    #[arg(long)]
    pub write: bool,

    /// Command to run at startup, e.g. `dp` or `pol s default/builder`
    #[arg(short = 'c', long = "command")]
    pub startup_command: Option<String>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(short = 'l', long, default_value = "info")]
    pub log_level: String,

    /// Path to the kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Kubeconfig cluster to use
    #[arg(long)]
    pub cluster: Option<String>,

    /// Start in a specific namespace
    #[arg(short, long)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Print the config, log and screen dump locations
    Info,
}

impl CliArgs {
    pub fn flags(&self) -> Flags {
        Flags {
            context: self.context.clone(),
            cluster: self.cluster.clone(),
            namespace: self.namespace.clone(),
        }
    }

    /// Manual overrides, applied after the config file is loaded.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        settings.override_refresh_rate(self.refresh);
        settings.override_headless(self.headless);
        settings.override_crumbsless(self.crumbsless);
        settings.override_read_only(self.readonly);
        settings.override_write(self.write);
        if let Some(command) = &self.startup_command {
            settings.override_command(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CliArgs, CliCommand};
    use crate::config::Settings;
    use clap::Parser;

    #[test]
    fn overrides_follow_flags() {
        let args = CliArgs::try_parse_from([
            "osc", "-r", "5", "--headless", "--readonly", "--write", "-c", "dp", "-n", "fred",
        ])
        .unwrap();
        let mut settings = Settings::new();
        args.apply_overrides(&mut settings);

        assert_eq!(settings.refresh_rate(), 5);
        assert!(settings.is_headless());
        assert!(!settings.is_crumbsless());
        assert!(!settings.is_read_only());
        assert_eq!(settings.command_override(), Some("dp"));
        assert_eq!(args.flags().namespace.as_deref(), Some("fred"));
    }

    #[test]
    fn info_subcommand() {
        let args = CliArgs::try_parse_from(["osc", "info"]).unwrap();
        assert!(matches!(args.command, Some(CliCommand::Info)));
        assert_eq!(args.log_level, "info");
        assert_eq!(args.refresh, 0);
    }
}
