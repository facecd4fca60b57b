use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use ctlauncher::core::config::{default_install_root, LauncherSettings};
use ctlauncher::core::downloader::InstallObserver;
use ctlauncher::core::http::build_http_client;
use ctlauncher::core::install::Installer;
use ctlauncher::core::java::resolve_java;
use ctlauncher::core::launch::command::format_command_for_logs;
use ctlauncher::core::launch::{run_game, LaunchCommandBuilder, OfflineIdentity};
use ctlauncher::core::resolver::ArtifactResolver;
use ctlauncher::core::tasks::{ChannelObserver, LauncherEvent, TaskQueue};
use ctlauncher::{LauncherError, LauncherResult};

#[derive(Debug, Parser)]
#[command(name = "ctlauncher", version, about = "Install and launch vanilla releases")]
struct Cli {
    /// Install root (defaults to the platform game directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Java executable to launch with
    #[arg(long, global = true)]
    java: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List versions from the manifest
    Versions {
        /// Include snapshots (old alpha and beta entries are never listed)
        #[arg(long)]
        snapshots: bool,
    },
    /// Download everything a release needs
    Install {
        version: String,
        /// Also fetch asset objects
        #[arg(long)]
        assets: bool,
    },
    /// Install if needed, then start the game
    Launch {
        version: String,
        #[arg(long)]
        username: Option<String>,
        /// Maximum heap in GB
        #[arg(long)]
        memory: Option<u32>,
        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Show or persist settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    Show,
    /// Save the current settings, including --java
    Save,
}

#[tokio::main]
async fn main() -> ExitCode {
    ctlauncher::init_tracing();
    let cli = Cli::parse();

    let root = cli.root.clone().unwrap_or_else(default_install_root);
    let mut settings = LauncherSettings::load(&root);
    if let Some(java) = cli.java.clone() {
        settings.java_path = Some(java);
    }

    match run(cli.command, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, mut settings: LauncherSettings) -> LauncherResult<()> {
    match command {
        Command::Versions { snapshots } => {
            let client = build_http_client(settings.http_timeout_secs)?;
            let resolver =
                ArtifactResolver::new(client, settings.manifest_url.clone(), settings.layout());
            let manifest = resolver.fetch_manifest().await?;
            let entries = if snapshots {
                manifest.releases_and_snapshots()
            } else {
                manifest.releases()
            };
            for entry in entries {
                println!("{}", entry.id);
            }
            Ok(())
        }
        Command::Install { version, assets } => {
            if assets {
                settings.download_asset_objects = true;
            }
            let mut queue = TaskQueue::new();
            let task_settings = settings.clone();
            let task = queue.spawn("install", move |observer| async move {
                let installed = installer(&task_settings)?
                    .install(&version, &observer)
                    .await?;
                Ok(format!(
                    "{} installed ({} downloaded, {} already present)",
                    installed.descriptor.id,
                    installed.summary.downloaded,
                    installed.summary.cached
                ))
            });
            pump(&mut queue, task).await
        }
        Command::Launch {
            version,
            username,
            memory,
            dry_run,
        } => {
            let username = username
                .or_else(|| settings.last_username.clone())
                .unwrap_or_default();
            let identity = OfflineIdentity::new(&username)?;
            if let Some(memory) = memory {
                settings.memory_gb = memory;
            }

            settings.last_username = Some(identity.username.clone());
            settings.last_version = Some(version.clone());
            if let Err(e) = settings.save() {
                warn!("Could not save settings: {}", e);
            }

            let mut queue = TaskQueue::new();
            let task = queue.spawn("launch", move |observer| async move {
                launch(settings, version, identity, dry_run, observer).await
            });
            pump(&mut queue, task).await
        }
        Command::Settings { action } => match action {
            SettingsAction::Show => {
                println!("{}", serde_json::to_string_pretty(&settings)?);
                Ok(())
            }
            SettingsAction::Save => {
                settings.save()?;
                println!("Saved to {:?}", settings.install_root);
                Ok(())
            }
        },
    }
}

fn installer(settings: &LauncherSettings) -> LauncherResult<Installer> {
    let client = build_http_client(settings.http_timeout_secs)?;
    Ok(
        Installer::new(client, settings.manifest_url.clone(), settings.layout())
            .with_asset_objects(settings.download_asset_objects, settings.resources_url.clone()),
    )
}

async fn launch(
    settings: LauncherSettings,
    version: String,
    identity: OfflineIdentity,
    dry_run: bool,
    observer: ChannelObserver,
) -> LauncherResult<String> {
    let installed = installer(&settings)?.install(&version, &observer).await?;

    let builder = LaunchCommandBuilder::new(&settings.layout())?
        .client_jar_position(settings.client_jar_position)
        .min_memory(settings.min_memory.clone());
    let args = builder.build(&installed.descriptor, &identity, settings.memory_gb())?;
    let java = resolve_java(settings.java_path.as_deref())?;

    if dry_run {
        return Ok(format_command_for_logs(&java.to_string_lossy(), &args));
    }

    observer.on_status(&format!("Launching {} as {}", version, identity.username));
    run_game(
        &java,
        &args,
        builder.layout().root(),
        &builder.natives_dir(&version),
        &observer,
    )
    .await?;
    Ok("Game closed".to_string())
}

/// Foreground loop: render events for `task` until it ends.
async fn pump(queue: &mut TaskQueue, task: u64) -> LauncherResult<()> {
    let mut stderr = std::io::stderr();
    while let Some(event) = queue.next_event().await {
        if event.task() != task {
            continue;
        }
        match event {
            LauncherEvent::Status { message, .. } => {
                let _ = writeln!(stderr, "\r{message}");
            }
            LauncherEvent::Progress { fraction, .. } => {
                let _ = write!(stderr, "\r{:>3.0}%", fraction * 100.0);
                let _ = stderr.flush();
            }
            LauncherEvent::Log { line, .. } => println!("{line}"),
            LauncherEvent::Finished { message, .. } => {
                info!("Task #{} finished", task);
                println!("{message}");
                return Ok(());
            }
            LauncherEvent::Failed { error, .. } => return Err(LauncherError::Task(error)),
        }
    }
    Err(LauncherError::Task("event channel closed".to_string()))
}
