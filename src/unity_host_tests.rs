use super::*;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
  "editor_assemblies": [
    {
      "name": "Game",
      "output_path": "Library/ScriptAssemblies/",
      "source_files": ["Assets/Game/Player.cs", "Assets/Game/Enemy.cs"],
      "defines": ["UNITY_EDITOR", "DEBUG", "UNITY_EDITOR"],
      "assembly_references": ["Engine", "Removed.Assembly"],
      "compiled_assembly_references": ["/unity/Managed/UnityEngine.dll"],
      "flags": 3,
      "compiler_options": {
        "allow_unsafe_code": true,
        "api_compatibility_level": "NET_Unity_4_8",
        "response_files": ["Assets/csc.rsp"]
      },
      "root_namespace": "Studio.Game"
    },
    {
      "name": "Engine",
      "source_files": ["Assets/Engine/Core.cs"],
      "defines": ["UNITY_EDITOR"]
    }
  ],
  "player_assemblies": [
    {
      "name": "Game",
      "source_files": ["Assets/Game/Player.cs"],
      "defines": ["DEBUG"]
    }
  ],
  "system_assembly_directories": {
    "NET_Unity_4_8": ["/unity/MonoBleedingEdge/lib/mono/4.7.1-api"]
  },
  "script_assemblies": {
    "Assets/Game/Player.cs": "Game.dll"
  },
  "roslyn_analyzers": ["Assets/Analyzers/Custom.Analyzers.dll"]
}"#;

const PACKAGES_LOCK: &str = r#"{
  "dependencies": {
    "com.unity.ugui": { "version": "2.0.0", "depth": 0, "source": "builtin", "dependencies": {} },
    "com.company.Tools": { "version": "file:com.company.tools", "depth": 0, "source": "embedded" },
    "com.unity.mathematics": { "version": "1.3.2", "depth": 1, "source": "registry", "url": "https://packages.unity.com" }
  }
}"#;

fn create_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::create_dir_all(root.join("Library/UnityCode")).unwrap();
    fs::write(root.join(SNAPSHOT_RELATIVE_PATH), SNAPSHOT).unwrap();

    fs::create_dir_all(root.join("Packages/com.company.Tools/Editor")).unwrap();
    fs::write(root.join("Packages/packages-lock.json"), PACKAGES_LOCK).unwrap();
    fs::write(root.join("Packages/com.company.Tools/Editor/Tool.cs"), "").unwrap();
    fs::write(root.join("Packages/com.company.Tools/Editor/Tool.cs.meta"), "").unwrap();

    fs::create_dir_all(root.join("Assets/Game")).unwrap();
    fs::write(root.join("Assets/Game/Player.cs"), "").unwrap();
    fs::write(root.join("Assets/Game/Player.cs.meta"), "").unwrap();
    fs::write(root.join("Assets/csc.rsp"), "-define:FROM_RSP\n").unwrap();

    temp_dir
}

#[test]
fn test_editor_units_from_snapshot() {
    let project = create_project();
    let host = UnityProjectHost::new(project.path().to_path_buf());

    let units = host.get_assemblies(AssembliesType::Editor).unwrap();
    assert_eq!(units.len(), 2);

    let game = &units[0];
    assert_eq!(game.name, "Game");
    assert_eq!(game.root_namespace, "Studio.Game");
    assert_eq!(game.flags.bits(), 3);
    assert!(game.compiler_options.allow_unsafe_code);
    assert_eq!(game.compiler_options.api_compatibility_level, ApiCompatibilityLevel::NetUnity48);
    // Duplicate defines collapse, order kept
    let defines: Vec<&str> = game.defines.iter().map(|d| d.as_str()).collect();
    assert_eq!(defines, vec!["UNITY_EDITOR", "DEBUG"]);
    // Unknown references are skipped, known ones are shared handles
    assert_eq!(game.assembly_references.len(), 1);
    assert!(Arc::ptr_eq(&game.assembly_references[0], &units[1]));
}

#[test]
fn test_player_units_from_snapshot() {
    let project = create_project();
    let host = UnityProjectHost::new(project.path().to_path_buf());

    let units = host.get_assemblies(AssembliesType::Player).unwrap();
    assert_eq!(units.len(), 1);
    assert!(!units[0].has_define("UNITY_EDITOR"));
}

#[test]
fn test_missing_snapshot_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let host = UnityProjectHost::new(temp_dir.path().to_path_buf());

    let result = host.get_assemblies(AssembliesType::Editor);
    assert!(matches!(result, Err(ProjectGenError::Snapshot { .. })));
    // Lookups that are not enumerations degrade quietly
    assert!(host.roslyn_analyzer_paths().is_empty());
    assert_eq!(host.assembly_name_from_script_path("Assets/Game/Player.cs"), None);
}

#[test]
fn test_reference_cycle_is_error() {
    let records = vec![
        UnitRecord {
            name: "A".to_string(),
            assembly_references: vec!["B".to_string()],
            ..Default::default()
        },
        UnitRecord {
            name: "B".to_string(),
            assembly_references: vec!["A".to_string()],
            ..Default::default()
        },
    ];

    let result = build_unit_graph(&records);
    assert!(matches!(result, Err(ProjectGenError::ReferenceCycle { .. })));
}

#[test]
fn test_find_package_from_lock_file() {
    let project = create_project();
    let host = UnityProjectHost::new(project.path().to_path_buf());

    let ugui = host.find_package("packages/com.unity.ugui").unwrap();
    assert_eq!(ugui.source, PackageSource::BuiltIn);
    assert_eq!(ugui.version, "2.0.0");

    // Lock file names keep their case, roots are lower-cased
    let tools = host.find_package("packages/com.company.tools").unwrap();
    assert_eq!(tools.name, "com.company.Tools");
    assert_eq!(tools.source, PackageSource::Embedded);
    assert_eq!(tools.asset_path, "Packages/com.company.Tools");

    assert!(host.find_package("packages/com.not.installed").is_none());
}

#[test]
fn test_find_package_without_lock_file() {
    let temp_dir = TempDir::new().unwrap();
    let host = UnityProjectHost::new(temp_dir.path().to_path_buf());
    assert!(host.find_package("packages/com.unity.ugui").is_none());
}

#[test]
fn test_all_asset_paths_skip_meta_files() {
    let project = create_project();
    let host = UnityProjectHost::new(project.path().to_path_buf());

    let paths = host.all_asset_paths().unwrap();
    assert_eq!(
        paths,
        vec![
            "Assets/Game/Player.cs",
            "Assets/csc.rsp",
            "Packages/com.company.Tools/Editor/Tool.cs",
            "Packages/packages-lock.json",
        ]
    );
}

#[test]
fn test_snapshot_lookups() {
    let project = create_project();
    let host = UnityProjectHost::new(project.path().to_path_buf());

    assert_eq!(
        host.system_assembly_directories(ApiCompatibilityLevel::NetUnity48),
        vec![PathBuf::from("/unity/MonoBleedingEdge/lib/mono/4.7.1-api")]
    );
    assert!(host.system_assembly_directories(ApiCompatibilityLevel::Net20).is_empty());
    assert_eq!(
        host.assembly_name_from_script_path("Assets/Game/Player.cs"),
        Some("Game.dll".to_string())
    );
    assert_eq!(host.roslyn_analyzer_paths(), vec!["Assets/Analyzers/Custom.Analyzers.dll"]);
}

#[test]
fn test_parse_response_file_from_disk() {
    let project = create_project();
    let host = UnityProjectHost::new(project.path().to_path_buf());

    let data = host.parse_response_file("Assets/csc.rsp", project.path(), &[]);
    assert_eq!(data.defines, vec!["FROM_RSP"]);
    assert!(!data.has_errors());
}

#[test]
fn test_lookups_share_the_enumerated_snapshot() {
    let project = create_project();
    let host = UnityProjectHost::new(project.path().to_path_buf());

    assert_eq!(host.get_assemblies(AssembliesType::Editor).unwrap().len(), 2);

    // A re-export mid-pass must not leak into the current pass
    fs::write(project.path().join(SNAPSHOT_RELATIVE_PATH), r#"{ "roslyn_analyzers": [] }"#).unwrap();

    assert_eq!(
        host.assembly_name_from_script_path("Assets/Game/Player.cs"),
        Some("Game.dll".to_string())
    );
    assert_eq!(host.roslyn_analyzer_paths(), vec!["Assets/Analyzers/Custom.Analyzers.dll"]);
    assert_eq!(host.get_assemblies(AssembliesType::Player).unwrap().len(), 1);

    host.reset_snapshot();
    assert_eq!(host.assembly_name_from_script_path("Assets/Game/Player.cs"), None);
    assert!(host.roslyn_analyzer_paths().is_empty());
    assert!(host.get_assemblies(AssembliesType::Editor).unwrap().is_empty());
}

#[test]
fn test_failed_snapshot_read_is_retried() {
    let temp_dir = TempDir::new().unwrap();
    let host = UnityProjectHost::new(temp_dir.path().to_path_buf());
    assert!(host.get_assemblies(AssembliesType::Editor).is_err());

    fs::create_dir_all(temp_dir.path().join("Library/UnityCode")).unwrap();
    fs::write(temp_dir.path().join(SNAPSHOT_RELATIVE_PATH), SNAPSHOT).unwrap();

    assert_eq!(host.get_assemblies(AssembliesType::Editor).unwrap().len(), 2);
}
