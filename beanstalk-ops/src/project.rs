use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, Error, ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Directory that marks the project root.
pub const PROJECT_DIR: &str = ".elasticbeanstalk";
pub const CONFIG_FILE: &str = "config.yml";
/// Branch section used when the project is not under git
/// or the branch has no section of its own.
pub const DEFAULT_BRANCH: &str = "default";

/// Whether the workspace deploys applications or builds custom platforms.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Copy)]
pub enum WorkspaceType {
    Application,
    Platform,
}

impl Default for WorkspaceType {
    fn default() -> Self {
        WorkspaceType::Application
    }
}

/// Per-branch settings under "branch-defaults".
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct BranchDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct Global {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
    /// Platform string as entered or picked at init.
    /// e.g., "Python 3.11 running on 64bit Amazon Linux 2023"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default)]
    pub workspace_type: WorkspaceType,

    /// Only used by custom platform workspaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ec2_keyname: Option<String>,
}

/// Represents ".elasticbeanstalk/config.yml".
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
pub struct Config {
    #[serde(
        rename = "branch-defaults",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub branch_defaults: BTreeMap<String, BranchDefaults>,
    #[serde(default)]
    pub global: Global,
}

impl Config {
    pub fn new(application_name: &str, region: &str) -> Self {
        Self {
            branch_defaults: BTreeMap::new(),
            global: Global {
                application_name: Some(String::from(application_name)),
                default_region: Some(String::from(region)),
                ..Default::default()
            },
        }
    }

    pub fn encode_yaml(&self) -> io::Result<String> {
        match serde_yaml::to_string(&self) {
            Ok(s) => Ok(s),
            Err(e) => Err(Error::new(
                ErrorKind::Other,
                format!("failed to serialize Config to YAML {}", e),
            )),
        }
    }

    /// Saves the current config to disk
    /// and overwrites the file.
    pub fn sync(&self, file_path: &str) -> io::Result<()> {
        log::info!("syncing Config to '{}'", file_path);

        let path = Path::new(file_path);
        if let Some(parent_dir) = path.parent() {
            log::info!("creating parent dir '{}'", parent_dir.display());
            fs::create_dir_all(parent_dir)?;
        }

        let d = self.encode_yaml()?;
        let mut f = File::create(file_path)?;
        f.write_all(d.as_bytes())
    }

    pub fn load(file_path: &str) -> io::Result<Self> {
        log::info!("loading Config from {}", file_path);

        if !Path::new(file_path).exists() {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("file {} does not exists", file_path),
            ));
        }

        let f = File::open(file_path).map_err(|e| {
            Error::new(
                ErrorKind::Other,
                format!("failed to open {} ({})", file_path, e),
            )
        })?;
        serde_yaml::from_reader(f)
            .map_err(|e| Error::new(ErrorKind::InvalidInput, format!("invalid YAML: {}", e)))
    }

    /// Looks up a setting in the branch section first,
    /// falling back to the "global" section.
    pub fn get_setting_from_branch_or_default(&self, branch: &str, key: &str) -> Option<String> {
        let from_branch = self.branch_defaults.get(branch).and_then(|b| match key {
            "environment" => b.environment.clone(),
            _ => None,
        });
        if from_branch.is_some() {
            return from_branch;
        }

        let g = &self.global;
        match key {
            "application_name" => g.application_name.clone(),
            "default_platform" => g.default_platform.clone(),
            "default_region" => g.default_region.clone(),
            "profile" => g.profile.clone(),
            "platform_name" => g.platform_name.clone(),
            "platform_version" => g.platform_version.clone(),
            "instance_profile" => g.instance_profile.clone(),
            "default_ec2_keyname" => g.default_ec2_keyname.clone(),
            _ => None,
        }
    }

    pub fn set_environment_for_branch(&mut self, branch: &str, environment: &str) {
        self.branch_defaults
            .entry(String::from(branch))
            .or_default()
            .environment = Some(String::from(environment));
    }

    /// Drops the environment from every branch that points at it.
    pub fn clear_environment(&mut self, environment: &str) {
        for b in self.branch_defaults.values_mut() {
            if b.environment.as_deref() == Some(environment) {
                b.environment = None;
            }
        }
        self.branch_defaults.retain(|_, b| b.environment.is_some());
    }

    pub fn update_platform_name(&mut self, platform_name: &str) {
        self.global.platform_name = Some(String::from(platform_name));
    }

    pub fn update_platform_version(&mut self, platform_version: Option<&str>) {
        self.global.platform_version = platform_version.map(String::from);
    }
}

/// A project directory with its loaded config.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Walks up from the directory to the first one that has
    /// ".elasticbeanstalk/config.yml".
    pub fn find_root(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(PROJECT_DIR).join(CONFIG_FILE).is_file())
            .map(Path::to_path_buf)
    }

    pub fn config_path(root: &Path) -> PathBuf {
        root.join(PROJECT_DIR).join(CONFIG_FILE)
    }

    pub fn load_from_root(root: &Path) -> io::Result<Self> {
        let p = Self::config_path(root);
        let config = Config::load(&p.display().to_string())?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    /// Loads the project enclosing the directory.
    pub fn discover(start: &Path) -> io::Result<Self> {
        let root = Self::find_root(start).ok_or_else(|| {
            Error::new(
                ErrorKind::NotFound,
                format!(
                    "no '{}/{}' found in '{}' or its parents (run 'init' first)",
                    PROJECT_DIR,
                    CONFIG_FILE,
                    start.display()
                ),
            )
        })?;
        Self::load_from_root(&root)
    }

    pub fn save(&self) -> io::Result<()> {
        self.config
            .sync(&Self::config_path(&self.root).display().to_string())
    }

    /// Reads the checked out branch from ".git/HEAD".
    /// Detached heads and non-git projects map to "default".
    pub fn current_branch(&self) -> String {
        let head = match fs::read_to_string(self.root.join(".git").join("HEAD")) {
            Ok(s) => s,
            Err(_) => return String::from(DEFAULT_BRANCH),
        };
        match head.trim().strip_prefix("ref: refs/heads/") {
            Some(b) if !b.is_empty() => String::from(b),
            _ => String::from(DEFAULT_BRANCH),
        }
    }

    /// Environment of the current branch, or of the "default" branch.
    pub fn environment_name(&self) -> Option<String> {
        self.config
            .get_setting_from_branch_or_default(&self.current_branch(), "environment")
            .or_else(|| {
                self.config
                    .get_setting_from_branch_or_default(DEFAULT_BRANCH, "environment")
            })
    }

    pub fn application_name(&self) -> Option<String> {
        self.config.global.application_name.clone()
    }
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- project::test_config --exact --show-output
#[test]
fn test_config() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    let contents = r#"
branch-defaults:
  main:
    environment: my-app-prod
  default:
    environment: my-app-dev
global:
  application_name: my-app
  default_platform: Python 3.11 running on 64bit Amazon Linux 2023
  default_region: us-west-2
  profile: eb-cli
  workspace_type: Application
"#;
    let mut f = tempfile::NamedTempFile::new().unwrap();
    let ret = f.write_all(contents.as_bytes());
    assert!(ret.is_ok());
    let config_path = f.path().to_str().unwrap();

    let cfg = Config::load(config_path).unwrap();
    assert_eq!(cfg.global.application_name.as_deref(), Some("my-app"));
    assert_eq!(cfg.global.workspace_type, WorkspaceType::Application);
    assert_eq!(
        cfg.get_setting_from_branch_or_default("main", "environment"),
        Some(String::from("my-app-prod"))
    );
    assert_eq!(
        cfg.get_setting_from_branch_or_default("feature", "profile"),
        Some(String::from("eb-cli"))
    );
    assert_eq!(cfg.get_setting_from_branch_or_default("feature", "environment"), None);

    let mut cfg = cfg;
    cfg.set_environment_for_branch("feature", "my-app-feature");
    cfg.update_platform_name("custom-platform");
    cfg.update_platform_version(Some("1.0.0"));
    cfg.clear_environment("my-app-dev");
    assert!(!cfg.branch_defaults.contains_key("default"));

    let tmp_dir = tempfile::tempdir().unwrap();
    let p = tmp_dir.path().join(PROJECT_DIR).join(CONFIG_FILE);
    cfg.sync(p.to_str().unwrap()).unwrap();
    let loaded = Config::load(p.to_str().unwrap()).unwrap();
    assert_eq!(cfg, loaded);
    assert_eq!(loaded.global.platform_name.as_deref(), Some("custom-platform"));

    assert!(Config::load("/no/such/config.yml").is_err());
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- project::test_project --exact --show-output
#[test]
fn test_project() {
    let _ = env_logger::builder().is_test(true).try_init();

    let tmp_dir = tempfile::tempdir().unwrap();
    let root = tmp_dir.path();
    let nested = root.join("src").join("app");
    fs::create_dir_all(&nested).unwrap();
    assert!(Project::find_root(&nested).is_none());
    assert!(Project::discover(&nested).is_err());

    let mut project = Project {
        root: root.to_path_buf(),
        config: Config::new("my-app", "us-east-1"),
    };
    project.config.set_environment_for_branch(DEFAULT_BRANCH, "my-app-dev");
    project.save().unwrap();

    assert_eq!(Project::find_root(&nested).unwrap(), root.to_path_buf());
    let loaded = Project::discover(&nested).unwrap();
    assert_eq!(loaded.application_name().as_deref(), Some("my-app"));
    assert_eq!(loaded.current_branch(), DEFAULT_BRANCH);
    assert_eq!(loaded.environment_name().as_deref(), Some("my-app-dev"));

    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join(".git").join("HEAD"), "ref: refs/heads/main\n").unwrap();
    assert_eq!(loaded.current_branch(), "main");
    // falls back to the default branch section
    assert_eq!(loaded.environment_name().as_deref(), Some("my-app-dev"));

    fs::write(
        root.join(".git").join("HEAD"),
        "4b825dc642cb6eb9a060e54bf8d69288fbee4904\n",
    )
    .unwrap();
    assert_eq!(loaded.current_branch(), DEFAULT_BRANCH);
}
