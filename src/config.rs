use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs, io};

use serde::Deserialize;

use crate::view::RenderMode;

pub const CFG_FILE_NAME: &str = "postboard.toml";
const APP_DIR_NAME: &str = "Postboard";

pub const DEFAULT_DOCUMENT_KEY: &str = "blogData";
// Same order of magnitude as a browser's local storage
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

#[derive(Deserialize)]
pub struct Site {
    pub title: String,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Local,
    Remote,
}

#[derive(Deserialize)]
pub struct Store {
    pub mode: StoreMode,
    /// Collection endpoint, required in remote mode
    pub endpoint: Option<String>,
    /// Directory holding the persisted document, local mode
    pub document_dir: Option<PathBuf>,
    pub document_key: Option<String>,
    pub quota_bytes: Option<u64>,
}

#[derive(Deserialize)]
pub struct Defaults {
    pub categories: Vec<String>,
    #[serde(default)]
    pub render_mode: RenderMode,
}

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: Option<PathBuf>,
    pub public_dir: PathBuf,
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
    pub max_upload_bytes: Option<usize>,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub site: Site,
    pub store: Store,
    pub defaults: Defaults,
    pub paths: Paths,
    pub server: Server,
    pub log: Option<Log>,
}

impl Store {
    pub fn document_key(&self) -> &str {
        self.document_key.as_deref().unwrap_or(DEFAULT_DOCUMENT_KEY)
    }

    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes.unwrap_or(DEFAULT_QUOTA_BYTES)
    }
}

impl Server {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if !path.starts_with("${exe_dir}") {
        return Ok(path);
    }

    let cur_exe = env::current_exe()?;
    let exe_dir = cur_exe.parent()
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Executable has no parent directory"))?;
    let rest = path.strip_prefix("${exe_dir}")
        .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e.to_string()))?;
    Ok(exe_dir.join(rest))
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    if cfg.store.mode == StoreMode::Remote && cfg.store.endpoint.is_none() {
        return Err(io::Error::new(
            ErrorKind::InvalidData, "Remote store mode requires store.endpoint"));
    }

    if cfg.defaults.categories.is_empty() {
        return Err(io::Error::new(
            ErrorKind::InvalidData, "At least one default category is required"));
    }

    cfg.paths.public_dir = parse_path(cfg.paths.public_dir)?;
    cfg.paths.template_dir = cfg.paths.template_dir.map(parse_path).transpose()?;
    cfg.store.document_dir = cfg.store.document_dir.map(parse_path).transpose()?;

    Ok(cfg)
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}

/// Looks for the configuration next to the executable, then in the current
/// directory, then in the user configuration directory
pub fn find_config_file() -> Option<PathBuf> {
    let mut candidates = vec![];
    if let Some(exe_dir) = env::current_exe().ok().and_then(|exe| exe.parent().map(PathBuf::from)) {
        candidates.push(exe_dir.join(CFG_FILE_NAME));
    }
    if let Ok(cur_dir) = env::current_dir() {
        candidates.push(cur_dir.join(CFG_FILE_NAME));
    }
    if let Some(cfg_dir) = dirs::config_dir() {
        candidates.push(cfg_dir.join(CFG_FILE_NAME));
    }

    candidates.into_iter().find(|path| path.exists())
}

fn app_dir(base: Option<PathBuf>) -> io::Result<PathBuf> {
    base.map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Could not find the user directories"))
}

/// Fills locations left out of the file with per-user defaults
pub fn fill_defaults(cfg: &mut Config) -> io::Result<()> {
    if cfg.store.mode == StoreMode::Local && cfg.store.document_dir.is_none() {
        cfg.store.document_dir = Some(app_dir(dirs::data_dir())?);
    }

    if let Some(ref mut log) = cfg.log {
        if log.location.is_none() {
            log.location = Some(app_dir(dirs::cache_dir())?.join("log").join("server.log"));
        }
    }

    Ok(())
}

pub fn open_config(cfg_path: Option<PathBuf>) -> io::Result<Config> {
    let cfg_path = match cfg_path.or_else(find_config_file) {
        Some(path) => path,
        None => return Err(io::Error::new(
            ErrorKind::NotFound, format!("Could not find {}", CFG_FILE_NAME))),
    };

    let mut cfg = read_config(&cfg_path)?;
    fill_defaults(&mut cfg)?;
    Ok(cfg)
}
