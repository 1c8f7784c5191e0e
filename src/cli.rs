use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::constants::{DEFAULT_CONFIG_PATH, DEFAULT_EXTRACTOR_PROGRAM, DEFAULT_UPLOAD_THREADS};

/// Command-line arguments for sim2sumo.
///
/// The configuration file decides what is extracted; the flags here select
/// where results go and allow overriding the datafile or datatype for a
/// single run.
#[derive(Parser, Debug)]
#[clap(
    name = "sim2sumo",
    version,
    about = "Extract reservoir simulator results and upload them to Sumo"
)]
pub struct Args {
    /// Path to the global variables file holding the sim2sumo section
    #[clap(long = "config_path", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: PathBuf,

    /// Sumo environment to upload to
    #[clap(long, value_enum, default_value_t = Environment::Prod)]
    pub env: Environment,

    /// Override the configured datatypes with this one (or 'all')
    #[clap(long)]
    pub datatype: Option<String>,

    /// Override the configured datafiles with this path, stub or directory
    #[clap(long)]
    pub datafile: Option<String>,

    /// Print help for a datatype and exit
    #[clap(long = "help_on")]
    pub help_on: Option<String>,

    /// Realization runpath that relative datafile entries are resolved against
    #[clap(long, default_value = ".")]
    pub runpath: PathBuf,

    /// Print the execution plan without extracting or uploading anything
    #[clap(long = "dry_run")]
    pub dry_run: bool,

    /// Number of units extracted and uploaded concurrently
    #[clap(long, default_value_t = DEFAULT_UPLOAD_THREADS)]
    pub threads: usize,

    /// Program used to extract tables from simulator output
    #[clap(long, default_value = DEFAULT_EXTRACTOR_PROGRAM)]
    pub extractor: String,

    /// S3 bucket to upload to
    #[clap(short, long)]
    pub bucket: Option<String>,

    /// AWS region for S3 uploads
    #[clap(long)]
    pub region: Option<String>,

    /// AWS profile to use for S3 uploads
    #[clap(long)]
    pub profile: Option<String>,

    /// Export to this local directory instead of uploading
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Write a JSON summary of the run to this file
    #[clap(long)]
    pub summary: Option<PathBuf>,

    /// Debug logging
    #[clap(short, long)]
    pub debug: bool,
}

impl Args {
    /// The global variables file, with a relative `--config_path` taken
    /// from the runpath
    pub fn resolved_config_path(&self) -> PathBuf {
        if self.config_path.is_absolute() {
            self.config_path.clone()
        } else {
            self.runpath.join(&self.config_path)
        }
    }
}

/// Sumo environment an upload is tagged with.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum Environment {
    Prod,
    Preview,
    Dev,
    Test,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Prod => write!(f, "prod"),
            Environment::Preview => write!(f, "preview"),
            Environment::Dev => write!(f, "dev"),
            Environment::Test => write!(f, "test"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(&["sim2sumo"]);

        assert_eq!(args.config_path, PathBuf::from("fmuconfig/output/global_variables.yml"));
        assert_eq!(args.env, Environment::Prod);
        assert_eq!(args.runpath, PathBuf::from("."));
        assert_eq!(args.threads, 5);
        assert_eq!(args.extractor, "res2csv");
        assert!(!args.dry_run);
        assert!(!args.debug);
        assert!(args.datatype.is_none());
        assert!(args.datafile.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from(&[
            "sim2sumo",
            "--config_path", "../fmuconfig/output/global_variables.yml",
            "--env", "dev",
            "--datatype", "vfp",
            "--datafile", "eclipse/model/DROGON-0.DATA",
            "--dry_run",
        ]);

        assert_eq!(args.env, Environment::Dev);
        assert_eq!(args.datatype, Some("vfp".to_string()));
        assert_eq!(args.datafile, Some("eclipse/model/DROGON-0.DATA".to_string()));
        assert!(args.dry_run);
    }

    #[test]
    fn test_upload_targets() {
        let args = Args::parse_from(&[
            "sim2sumo",
            "--bucket", "sumo-tables",
            "--region", "eu-north-1",
            "--profile", "fmu",
            "--threads", "8",
            "-d",
        ]);

        assert_eq!(args.bucket, Some("sumo-tables".to_string()));
        assert_eq!(args.region, Some("eu-north-1".to_string()));
        assert_eq!(args.profile, Some("fmu".to_string()));
        assert_eq!(args.threads, 8);
        assert!(args.debug);
    }

    #[test]
    fn test_help_on_and_output() {
        let args = Args::parse_from(&[
            "sim2sumo",
            "--help_on", "summary",
            "--output", "/tmp/export",
            "--summary", "/tmp/summary.json",
        ]);

        assert_eq!(args.help_on, Some("summary".to_string()));
        assert_eq!(args.output, Some(PathBuf::from("/tmp/export")));
        assert_eq!(args.summary, Some(PathBuf::from("/tmp/summary.json")));
    }

    #[test]
    fn test_config_path_follows_runpath() {
        let args = Args::parse_from(&["sim2sumo", "--runpath", "/scratch/drogon/realization-0/iter-0"]);
        assert_eq!(
            args.resolved_config_path(),
            PathBuf::from("/scratch/drogon/realization-0/iter-0/fmuconfig/output/global_variables.yml")
        );

        let args = Args::parse_from(&[
            "sim2sumo",
            "--runpath", "/scratch/drogon/realization-0/iter-0",
            "--config_path", "/project/fmuconfig/output/global_variables.yml",
        ]);
        assert_eq!(
            args.resolved_config_path(),
            PathBuf::from("/project/fmuconfig/output/global_variables.yml")
        );
    }

    #[test]
    fn test_config_loaded_from_runpath() {
        let run = tempfile::TempDir::new().unwrap();
        let config = run.path().join(DEFAULT_CONFIG_PATH);
        std::fs::create_dir_all(config.parent().unwrap()).unwrap();
        std::fs::write(&config, "sim2sumo:\n  datatypes: [vfp]\n").unwrap();

        let runpath = run.path().display().to_string();
        let args = Args::parse_from(&["sim2sumo", "--runpath", runpath.as_str()]);
        let global = crate::config::load_global_config(&args.resolved_config_path()).unwrap();
        assert!(global.section().is_some());
    }

    #[test]
    fn test_invalid_env_rejected() {
        assert!(Args::try_parse_from(&["sim2sumo", "--env", "staging"]).is_err());
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(format!("{}", Environment::Prod), "prod");
        assert_eq!(format!("{}", Environment::Preview), "preview");
        assert_eq!(format!("{}", Environment::Dev), "dev");
        assert_eq!(format!("{}", Environment::Test), "test");
    }
}
