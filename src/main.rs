use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use log::{error, info, warn};

use unity_project_gen::assembly_catalog::AssemblyCatalog;
use unity_project_gen::config_store::{ConfigStore, JsonConfigStore, MemoryConfigStore};
use unity_project_gen::editor_settings::EditorSettings;
use unity_project_gen::error::{IoContext, Result};
use unity_project_gen::generation::generate;
use unity_project_gen::logging;
use unity_project_gen::snapshot_watcher::SnapshotWatcher;
use unity_project_gen::unity_host::UnityProjectHost;
use unity_project_gen::visibility::ProjectVisibilityPolicy;

const OUTPUT_RELATIVE_PATH: &str = "Library/UnityCode/project_parts.json";
const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        // Use eprintln for usage info since logger isn't initialized yet
        eprintln!("Usage: {} <project_path> [--watch]", args[0]);
        eprintln!("  <project_path>: Unity project to generate project parts for");
        eprintln!("  --watch: keep running and regenerate when the editor exports a new compilation snapshot");
        eprintln!("Example: {} F:\\projects\\unity\\MyProject --watch", args[0]);
        process::exit(1);
    }

    if let Err(e) = logging::init_logger() {
        eprintln!("Failed to initialize logger: {}", e);
        process::exit(1);
    }

    info!("Unity project generation starting");
    info!("Command line arguments: {:?}", args);

    let project_root = PathBuf::from(&args[1]);
    let watch = args[2..].iter().any(|arg| arg == "--watch");

    let mut catalog = create_catalog(&project_root);

    if let Err(e) = run_pass(&mut catalog, &project_root).await {
        error!("Generation failed: {}", e);
        if !watch {
            eprintln!("Generation failed: {}", e);
            process::exit(1);
        }
    }

    if watch {
        watch_project(&mut catalog, &project_root).await;
    }

    info!("Unity project generation shutting down");
}

fn create_catalog(project_root: &Path) -> AssemblyCatalog<UnityProjectHost> {
    let store: Box<dyn ConfigStore> = match JsonConfigStore::open_default() {
        Ok(store) => {
            info!("Using preferences at {}", store.path().display());
            Box::new(store)
        }
        Err(e) => {
            warn!("Preferences unavailable, changes will not persist: {}", e);
            Box::new(MemoryConfigStore::new())
        }
    };

    let policy = ProjectVisibilityPolicy::load(store);
    info!("Project generation flags: {}", policy.flags());

    AssemblyCatalog::new(
        UnityProjectHost::new(project_root.to_path_buf()),
        policy,
        load_settings(project_root),
    )
}

fn load_settings(project_root: &Path) -> EditorSettings {
    EditorSettings::load(project_root).unwrap_or_else(|e| {
        warn!("Failed to read editor settings, using defaults: {}", e);
        EditorSettings::default()
    })
}

async fn run_pass(catalog: &mut AssemblyCatalog<UnityProjectHost>, project_root: &Path) -> Result<()> {
    let output = generate(catalog, project_root)?;
    let json = serde_json::to_string_pretty(&output)?;

    let output_path = project_root.join(OUTPUT_RELATIVE_PATH);
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_io_context(&format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(&output_path, json)
        .await
        .with_io_context(&format!("Failed to write {}", output_path.display()))?;

    info!("Wrote {} projects to {}", output.projects.len(), output_path.display());
    Ok(())
}

async fn watch_project(catalog: &mut AssemblyCatalog<UnityProjectHost>, project_root: &Path) {
    let directories = vec![project_root.join("Library/UnityCode"), project_root.join("Packages")];
    let mut watcher = SnapshotWatcher::new(&directories).unwrap_or_else(|e| {
        error!("Failed to watch project, regeneration disabled: {}", e);
        SnapshotWatcher::new_without_watcher()
    });
    if !watcher.is_watching() {
        return;
    }

    let mut last_pass = watcher.now();
    loop {
        tokio::time::sleep(POLL_INTERVAL).await;

        let changes = watcher.changes_since(last_pass);
        if !changes.any() {
            continue;
        }
        last_pass = watcher.now();

        info!("Snapshot changed ({:?}), regenerating", changes);
        catalog.reset_cache();
        catalog.reset_package_info_cache();
        catalog.set_settings(load_settings(project_root));

        if let Err(e) = run_pass(catalog, project_root).await {
            error!("Generation failed: {}", e);
        }
    }
}
