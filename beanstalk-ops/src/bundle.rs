use std::{
    env,
    fs::{self, File},
    io::{self, Error, ErrorKind, Read, Write},
    path::{Path, PathBuf},
    process::Command,
};

use path_clean::PathClean;
use walkdir::{DirEntry, WalkDir};
use zip::{write::FileOptions, ZipArchive, ZipWriter};

/// Directories never shipped in a source bundle.
const ALWAYS_IGNORED: &[&str] = &[".elasticbeanstalk", ".git"];

pub const EBIGNORE_FILE: &str = ".ebignore";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    /// "*.log"
    Extension(String),
    /// "node_modules/" or "build/cache/"
    Directory(String),
    /// "secrets.env" or "config/local.yml"
    Exact(String),
}

/// Patterns read from ".ebignore".
/// Supports exact names, directory prefixes ending in "/",
/// and "*.ext" globs. Blank lines and "#" comments are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreRules {
    rules: Vec<Rule>,
}

impl IgnoreRules {
    pub fn parse(contents: &str) -> Self {
        let mut rules = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.trim_start_matches('/');
            if let Some(ext) = line.strip_prefix("*.") {
                rules.push(Rule::Extension(format!(".{}", ext)));
            } else if let Some(dir) = line.strip_suffix('/') {
                rules.push(Rule::Directory(dir.to_string()));
            } else {
                rules.push(Rule::Exact(line.to_string()));
            }
        }
        Self { rules }
    }

    /// Loads ".ebignore" from the project root, if any.
    pub fn load(root: &Path) -> io::Result<Self> {
        let p = root.join(EBIGNORE_FILE);
        if !p.exists() {
            return Ok(Self::default());
        }
        log::info!("loading ignore rules from '{}'", p.display());
        Ok(Self::parse(&fs::read_to_string(p)?))
    }

    /// Checks a "/"-separated path relative to the bundle root.
    /// Rules without a "/" match any path component.
    pub fn is_ignored(&self, rel_path: &str, is_dir: bool) -> bool {
        let components: Vec<&str> = rel_path.split('/').collect();
        if components.iter().any(|c| ALWAYS_IGNORED.contains(c)) {
            return true;
        }
        let file_name = components.last().copied().unwrap_or_default();

        self.rules.iter().any(|rule| match rule {
            Rule::Extension(ext) => !is_dir && file_name.ends_with(ext.as_str()),
            Rule::Directory(dir) => {
                if dir.contains('/') {
                    rel_path == dir.as_str() || rel_path.starts_with(&format!("{}/", dir))
                } else {
                    let parents = if is_dir {
                        &components[..]
                    } else {
                        &components[..components.len() - 1]
                    };
                    parents.iter().any(|c| *c == dir.as_str())
                }
            }
            Rule::Exact(name) => {
                if name.contains('/') {
                    rel_path == name.as_str() || rel_path.starts_with(&format!("{}/", name))
                } else {
                    components.iter().any(|c| *c == name.as_str())
                }
            }
        })
    }
}

/// Returns an application version label made of the prefix
/// and the current time.
pub fn version_label(prefix: &str) -> String {
    id_manager::time::with_prefix(prefix)
}

/// How the project is packed into a source bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleMethod {
    /// Committed "HEAD" via "git archive".
    GitArchive,
    /// Directory walk honoring ".ebignore".
    Directory,
}

/// ".ebignore" wins over git, so uncommitted files can be shipped on purpose.
pub fn bundle_method(root: &Path) -> BundleMethod {
    if root.join(EBIGNORE_FILE).exists() {
        return BundleMethod::Directory;
    }
    if root.join(".git").exists() {
        return BundleMethod::GitArchive;
    }
    BundleMethod::Directory
}

/// Archives the committed "HEAD" of the repository at "root".
/// Returns the number of entries in the archive.
pub fn git_archive(root: &Path, dst_path: &str) -> io::Result<usize> {
    let dst_full_path = absolute_path(dst_path)?;
    log::info!(
        "creating zip using git archive HEAD in '{}' to '{}'",
        root.display(),
        dst_full_path.display()
    );

    let output = Command::new("git")
        .arg("archive")
        .arg("-v")
        .arg("--format=zip")
        .arg("-o")
        .arg(&dst_full_path)
        .arg("HEAD")
        .current_dir(root)
        .output()
        .map_err(|e| Error::new(ErrorKind::NotFound, format!("failed to run git ({})", e)))?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        return Err(Error::new(
            ErrorKind::Other,
            format!("git archive failed ({})", stderr.trim()),
        ));
    }
    log::debug!("git archive output: {}", stderr);

    let archive = ZipArchive::new(File::open(&dst_full_path)?)
        .map_err(|e| Error::new(ErrorKind::InvalidData, format!("invalid git archive ({})", e)))?;
    Ok(archive.len())
}

/// Packs the project the way "bundle_method" picks.
pub fn pack_project(root: &Path, dst_path: &str) -> io::Result<usize> {
    match bundle_method(root) {
        BundleMethod::GitArchive => git_archive(root, dst_path),
        BundleMethod::Directory => {
            let ignore = IgnoreRules::load(root)?;
            pack_source_bundle(&root.display().to_string(), dst_path, &ignore)
        }
    }
}

/// Archives the project directory into a zip file for deployment.
/// Returns the number of files added.
pub fn pack_source_bundle(
    src_dir_path: &str,
    dst_path: &str,
    ignore: &IgnoreRules,
) -> io::Result<usize> {
    log::info!("packing source bundle '{}' to '{}'", src_dir_path, dst_path);

    let src_dir = Path::new(src_dir_path);
    if !src_dir.is_dir() {
        return Err(Error::new(
            ErrorKind::NotFound,
            format!("source directory '{}' does not exist", src_dir_path),
        ));
    }
    let src_dir_full_path = absolute_path(src_dir)?;
    let dst_full_path = absolute_path(dst_path)?;

    let archive_file = File::create(&dst_full_path)?;
    let mut zip = ZipWriter::new(archive_file);
    let options = FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o755);

    let mut buffer = Vec::new();
    let mut files = 0_usize;
    let walker = WalkDir::new(&src_dir_full_path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| match relative(entry, &src_dir_full_path) {
            Some(rel) => rel.is_empty() || !ignore.is_ignored(&rel, is_dir(entry)),
            None => false,
        });
    for entry in walker {
        let entry = match entry {
            Ok(v) => v,
            Err(e) => {
                return Err(Error::new(
                    ErrorKind::Other,
                    format!("failed walk dir {} ({})", src_dir_path, e),
                ));
            }
        };

        // the bundle may be written inside the project directory
        if entry.path() == dst_full_path.as_path() {
            continue;
        }

        let rel_path = relative(&entry, &src_dir_full_path).ok_or_else(|| {
            Error::new(
                ErrorKind::Other,
                format!("failed strip_prefix on {:?}", entry.path()),
            )
        })?;
        if rel_path.is_empty() {
            continue;
        }

        if is_dir(&entry) {
            log::debug!("adding directory {}", rel_path);
            zip.add_directory(rel_path.as_str(), options)?;
            continue;
        }

        log::debug!("adding file {}", rel_path);
        zip.start_file(rel_path.as_str(), options)?;
        let mut f = File::open(entry.path())?;
        f.read_to_end(&mut buffer)?;
        zip.write_all(&buffer)?;
        buffer.clear();
        files += 1;
    }
    zip.finish()?;

    log::info!("packed {} files into '{}'", files, dst_path);
    Ok(files)
}

fn is_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
}

/// "/"-separated path of the entry relative to the source directory.
/// e.g., "static/css/site.css" for "/tmp/app/static/css/site.css"
fn relative(entry: &DirEntry, src_dir_full_path: &Path) -> Option<String> {
    let rel = entry.path().strip_prefix(src_dir_full_path).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(parts.join("/"))
}

fn absolute_path(path: impl AsRef<Path>) -> io::Result<PathBuf> {
    let p = path.as_ref();

    let ap = if p.is_absolute() {
        p.to_path_buf()
    } else {
        env::current_dir()?.join(p)
    }
    .clean();

    Ok(ap)
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- bundle::test_ignore_rules --exact --show-output
#[test]
fn test_ignore_rules() {
    let rules = IgnoreRules::parse(
        r#"
# local only
*.log
node_modules/
build/cache/
secrets.env
/config/local.yml
"#,
    );

    assert!(rules.is_ignored(".elasticbeanstalk/config.yml", false));
    assert!(rules.is_ignored(".git", true));
    assert!(rules.is_ignored("app.log", false));
    assert!(rules.is_ignored("logs/2023/app.log", false));
    assert!(!rules.is_ignored("app.log.d", true));
    assert!(rules.is_ignored("node_modules", true));
    assert!(rules.is_ignored("web/node_modules/x/index.js", false));
    assert!(!rules.is_ignored("node_modules", false));
    assert!(rules.is_ignored("build/cache/a.o", false));
    assert!(!rules.is_ignored("build/out/a.o", false));
    assert!(rules.is_ignored("secrets.env", false));
    assert!(rules.is_ignored("deploy/secrets.env", false));
    assert!(rules.is_ignored("config/local.yml", false));
    assert!(!rules.is_ignored("config/prod.yml", false));
    assert!(!rules.is_ignored("application.py", false));

    assert!(!IgnoreRules::default().is_ignored("application.py", false));
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- bundle::test_pack_source_bundle --exact --show-output
#[test]
fn test_pack_source_bundle() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    let tmp_dir = tempfile::tempdir().unwrap();
    let root = tmp_dir.path();
    fs::create_dir_all(root.join(".elasticbeanstalk")).unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::create_dir_all(root.join("static").join("css")).unwrap();
    fs::write(root.join(".elasticbeanstalk").join("config.yml"), "global: {}").unwrap();
    fs::write(root.join(".git").join("HEAD"), "ref: refs/heads/main").unwrap();
    fs::write(root.join("application.py"), "print('hello')").unwrap();
    fs::write(root.join("debug.log"), "noise").unwrap();
    fs::write(root.join("static").join("css").join("site.css"), "body {}").unwrap();
    fs::write(root.join(EBIGNORE_FILE), "*.log\n").unwrap();

    let rules = IgnoreRules::load(root).unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let dst = out_dir.path().join("bundle.zip");
    let files = pack_source_bundle(
        root.to_str().unwrap(),
        dst.to_str().unwrap(),
        &rules,
    )
    .unwrap();
    assert_eq!(files, 3);

    let f = File::open(&dst).unwrap();
    let archive = zip::ZipArchive::new(f).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort();
    assert_eq!(
        names,
        vec![".ebignore", "application.py", "static/", "static/css/", "static/css/site.css"]
    );

    assert!(pack_source_bundle("/no/such/dir", dst.to_str().unwrap(), &rules).is_err());

    let label = version_label("app");
    assert!(label.starts_with("app"));
    assert!(label.len() > "app".len());
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- bundle::test_bundle_method --exact --show-output
#[test]
fn test_bundle_method() {
    let _ = env_logger::builder().is_test(true).try_init();

    let tmp_dir = tempfile::tempdir().unwrap();
    let root = tmp_dir.path();
    fs::write(root.join("application.py"), "print('hello')").unwrap();
    assert_eq!(bundle_method(root), BundleMethod::Directory);

    fs::create_dir_all(root.join(".git")).unwrap();
    assert_eq!(bundle_method(root), BundleMethod::GitArchive);

    fs::write(root.join(EBIGNORE_FILE), "*.log\n").unwrap();
    assert_eq!(bundle_method(root), BundleMethod::Directory);

    // an ".ebignore" project is packed from the directory even inside a repository
    let dst = root.join("bundle.zip").display().to_string();
    assert_eq!(pack_project(root, &dst).unwrap(), 2);

    // not a repository (or no git at all), so archiving fails without a partial bundle
    let plain = tempfile::tempdir().unwrap();
    let dst = plain.path().join("bundle.zip").display().to_string();
    assert!(git_archive(plain.path(), &dst).is_err());
}
