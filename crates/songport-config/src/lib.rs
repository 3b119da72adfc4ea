mod config;

use std::env;
use std::fs;
use std::path::PathBuf;

use songport_core::{SongportError, SongportResult};

pub use config::{ApiConfig, DefaultConfig, ServerConfig, SongportConfig};

pub fn config_path() -> SongportResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SongportError::Config("home directory not found".to_string()))?;
    Ok(home.join(".songport").join("config.toml"))
}

pub fn load_config() -> SongportResult<SongportConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(SongportConfig::default());
    }
    let content = fs::read_to_string(&path)
        .map_err(|err| SongportError::Config(format!("failed to read config: {err}")))?;
    let config = toml::from_str(&content)
        .map_err(|err| SongportError::Config(format!("failed to parse config: {err}")))?;
    Ok(config)
}

fn env_nonempty(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

pub fn resolve_spotify_credentials(config: &SongportConfig) -> Option<(String, String)> {
    let id = env_nonempty("SPOTIFY_CLIENT_ID").or_else(|| config.api.spotify_client_id.clone())?;
    let secret =
        env_nonempty("SPOTIFY_CLIENT_SECRET").or_else(|| config.api.spotify_client_secret.clone())?;
    Some((id, secret))
}

pub fn resolve_port(config: &SongportConfig) -> Option<u16> {
    if let Some(value) = env_nonempty("PORT")
        && let Ok(port) = value.trim().parse()
    {
        return Some(port);
    }
    config.server.port
}

pub fn resolve_default_country(config: &SongportConfig) -> Option<String> {
    env_nonempty("SONGPORT_DEFAULT_COUNTRY").or_else(|| config.default.country.clone())
}
