//! Main CLI application structure

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{deps_cmd, plugin_cmd};
use crate::domain::{plan, AssetKind, Intent, PipelinePlan, Restrictions, ScaffoldRequest, StagePlan};
use crate::pipeline::StageRunner;
use crate::plugin::PluginRegistry;
use crate::stages::{self, StageTools};
use crate::storage::{Project, Settings};

#[derive(Parser)]
#[command(name = "kiln")]
#[command(author, version, about = "Build orchestrator for front-end JavaScript projects")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory projects are deployed into
    #[arg(long, global = true, env = "KILN_DEPLOY_PATH", value_name = "DIR")]
    pub deploy_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub stages: StageArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project in a folder named after it
    New {
        /// Project name
        name: String,

        /// Project type, selects the plugin ("default" for none)
        #[arg(value_name = "TYPE")]
        project_type: String,
    },

    /// Remove every build output
    Clean,

    /// Show the require graph of a JavaScript entry file
    Deps {
        /// Resolve like the test build (test/javascript first)
        #[arg(long)]
        test: bool,

        /// Entry file (defaults to src/javascript/main.js, or test/test.js with --test)
        entry: Option<PathBuf>,
    },

    /// Manage plugins
    #[command(subcommand)]
    Plugin(plugin_cmd::PluginCommands),
}

/// Pipeline stage selection
#[derive(Args, Debug, Default)]
pub struct StageArgs {
    /// Build the project into build/<name>/
    #[arg(long)]
    pub build: bool,

    /// Generate the JSDoc documentation
    #[arg(long)]
    pub doc: bool,

    /// Include src/lib in the documentation
    #[arg(long)]
    pub with_libs: bool,

    /// Build the tests, or only the named sub-test (--test=NAME)
    #[arg(
        long,
        value_name = "NAME",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ""
    )]
    pub test: Option<String>,

    /// Copy the build output to the deploy path
    #[arg(long)]
    pub deploy: bool,

    /// Pack the build output into build/<name>-<version>.zip
    #[arg(long, visible_alias = "archive")]
    pub zip: bool,

    /// Build, document, test, deploy and zip
    #[arg(long)]
    pub all: bool,

    /// Restrict the build to HTML pages
    #[arg(long)]
    pub html: bool,

    /// Restrict the build to the JavaScript bundle
    #[arg(long)]
    pub js: bool,

    /// Restrict the build to stylesheets
    #[arg(long)]
    pub css: bool,

    /// Restrict the build to assets
    #[arg(long)]
    pub img: bool,

    /// Restrict the build to third-party libraries
    #[arg(long)]
    pub lib: bool,
}

impl StageArgs {
    /// Converts the flags into a planner intent
    pub fn intent(&self) -> Intent {
        let mut restrictions = Restrictions::none();
        for (flag, kind) in [
            (self.html, AssetKind::Html),
            (self.js, AssetKind::Js),
            (self.css, AssetKind::Css),
            (self.img, AssetKind::Img),
            (self.lib, AssetKind::Lib),
        ] {
            if flag {
                restrictions.insert(kind);
            }
        }

        Intent {
            build: self.build,
            document: self.doc,
            with_libs: self.with_libs,
            test: self.test.clone().map(Some),
            deploy: self.deploy,
            archive: self.zip,
            all: self.all,
            restrictions,
            ..Default::default()
        }
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("kiln starting");

    let cwd = std::env::current_dir().context("Failed to read the current directory")?;

    let intent = match cli.command {
        Some(Commands::New { name, project_type }) => Intent {
            scaffold: Some(ScaffoldRequest { name, project_type }),
            ..Default::default()
        },
        Some(Commands::Clean) => Intent {
            clean: true,
            ..Default::default()
        },
        Some(Commands::Deps { test, entry }) => return deps_cmd::run(&cwd, test, entry, &output),
        Some(Commands::Plugin(cmd)) => return plugin_cmd::run(cmd, &cwd, &output),
        None => cli.stages.intent(),
    };

    match plan(&intent)? {
        StagePlan::Scaffold(request) => {
            output.verbose_ctx(
                "new",
                &format!("Scaffolding '{}' of type '{}'", request.name, request.project_type),
            );
            let project = Project::scaffold(&cwd, &request)?;
            output.verbose_ctx("new", &format!("Created {}", project.root().display()));
            output.success(&format!("Created the project with name {}.", request.name));
        }

        StagePlan::Clean => {
            let project = Project::open(&cwd);
            if project.clean()? {
                output.verbose_ctx("clean", &format!("Removed {}", project.build_dir().display()));
            }
            output.success("Successfully cleaned the project.");
        }

        StagePlan::Pipeline(pipeline) => run_pipeline(&cwd, &pipeline, cli.deploy_path, &output)?,
    }

    Ok(())
}

fn run_pipeline(
    cwd: &Path,
    pipeline: &PipelinePlan,
    deploy_path: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let stages: Vec<String> = pipeline
        .stages()
        .iter()
        .map(|planned| {
            if planned.implicit {
                format!("{} (implicit)", planned.stage)
            } else {
                planned.stage.to_string()
            }
        })
        .collect();
    output.verbose_ctx("plan", &stages.join(" -> "));

    let project = Project::open(cwd);
    let config = project.config_store().load(pipeline)?;
    output.verbose_ctx(
        "config",
        &format!(
            "Loaded {} {} (type '{}')",
            config.name, config.version, config.project_type
        ),
    );

    let settings = Settings::load()?;
    if let Some(path) = Settings::settings_path() {
        output.verbose_ctx("config", &format!("Settings file: {}", path.display()));
    }

    let mut registry = PluginRegistry::new(plugin_cmd::loader_for(&project, &settings));
    let mut plugin = registry.resolve(&config.project_type)?;
    if let Some(plugin) = plugin.as_mut() {
        output.verbose_ctx("plugin", &format!("Using plugin '{}'", plugin.name()));
        plugin.pass_config(&config)?;
    }

    let tools = StageTools::from_settings(&settings, deploy_path);
    if let Some(root) = &tools.deploy_root {
        output.verbose_ctx("deploy", &format!("Deploy root: {}", root.display()));
    }

    let mut collaborators = stages::collaborators(&config, tools);
    let report = StageRunner::new(&config, &mut collaborators, plugin).run(pipeline);

    for outcome in &report.completed {
        output.stage(outcome);
    }

    match report.failure {
        Some(failure) => Err(failure.into()),
        None => Ok(()),
    }
}
