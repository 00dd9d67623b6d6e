use crate::error::{ConfigError, ConfigResult};
use crate::policy::SessionPolicy;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const CONFIG_PATH_VAR: &str = "SESSION_LIMITABLE_CONFIG";
pub const ON_UNIQUE_ID_VAR: &str = "SESSION_LIMITABLE_ON_UNIQUE_ID";
pub const ON_IP_VAR: &str = "SESSION_LIMITABLE_ON_IP";
pub const ON_USER_AGENT_VAR: &str = "SESSION_LIMITABLE_ON_USER_AGENT";

/// File names looked up by [`load_policy_with_fallback`], in order
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["session_limitable.yaml", "session_limitable.yml"];

/// Top-level layout of the configuration file
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    session_limitable: SessionPolicy,
}

/// Parse a policy from a YAML document
pub fn parse_policy(contents: &str) -> ConfigResult<SessionPolicy> {
    // An empty document deserializes to unit, not to an empty map
    if contents.trim().is_empty() {
        return Ok(SessionPolicy::default());
    }
    let file: ConfigFile = serde_yaml::from_str(contents)?;
    Ok(file.session_limitable)
}

/// Load the session policy from a YAML file, then apply environment overrides
pub fn load_policy<P: AsRef<Path>>(path: P) -> ConfigResult<SessionPolicy> {
    load_policy_from(path, process_env)
}

/// Load the session policy from a YAML file, reading overrides through `lookup`
pub fn load_policy_from<P, F>(path: P, lookup: F) -> ConfigResult<SessionPolicy>
where
    P: AsRef<Path>,
    F: Fn(&str) -> Option<String>,
{
    let path = path.as_ref();
    info!("Loading session policy from: {}", path.display());

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let policy = parse_policy(&contents)?;
    let policy = apply_overrides(policy, lookup)?;

    log_policy(&policy);
    Ok(policy)
}

/// Load the session policy with fallback options
///
/// Tries `SESSION_LIMITABLE_CONFIG`, then well-known file names in the
/// working directory, and finally the built-in defaults. Environment
/// overrides apply in every case.
pub fn load_policy_with_fallback() -> ConfigResult<SessionPolicy> {
    resolve_policy(Path::new("."), process_env)
}

/// Resolve the session policy the way [`load_policy_with_fallback`] does,
/// looking for well-known file names in `base_dir` and reading variables
/// through `lookup`
pub fn resolve_policy<F>(base_dir: &Path, lookup: F) -> ConfigResult<SessionPolicy>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(config_path) = lookup(CONFIG_PATH_VAR) {
        match load_policy_from(&config_path, &lookup) {
            Ok(policy) => return Ok(policy),
            Err(e) => warn!(
                "Failed to load session policy from {} ({}): {}",
                CONFIG_PATH_VAR, config_path, e
            ),
        }
    }

    for name in DEFAULT_CONFIG_FILES {
        let path = base_dir.join(name);
        if path.exists() {
            match load_policy_from(&path, &lookup) {
                Ok(policy) => return Ok(policy),
                Err(e) => warn!(
                    "Failed to load session policy from '{}': {}",
                    path.display(),
                    e
                ),
            }
        }
    }

    info!("No session policy file found, using defaults");
    let policy = apply_overrides(SessionPolicy::default(), &lookup)?;
    log_policy(&policy);
    Ok(policy)
}

fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Apply per-flag overrides read through `lookup`
pub fn apply_overrides<F>(mut policy: SessionPolicy, lookup: F) -> ConfigResult<SessionPolicy>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = read_flag(&lookup, ON_UNIQUE_ID_VAR)? {
        policy.on_unique_id = value;
    }
    if let Some(value) = read_flag(&lookup, ON_IP_VAR)? {
        policy.on_ip = value;
    }
    if let Some(value) = read_flag(&lookup, ON_USER_AGENT_VAR)? {
        policy.on_user_agent = value;
    }
    Ok(policy)
}

fn read_flag<F>(lookup: &F, var: &str) -> ConfigResult<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidEnv {
            var: var.to_string(),
            value: raw,
        }),
    }
}

fn log_policy(policy: &SessionPolicy) {
    info!(
        "Session policy: unique_id={} ip={} user_agent={}",
        policy.on_unique_id, policy.on_ip, policy.on_user_agent
    );
}
