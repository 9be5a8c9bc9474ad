use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_NAME: &str = ".topidsrc";
const APP_DIR: &str = "topids";
const MAX_ALIAS_DEPTH: usize = 10;

/// Settings read from `.topidsrc` / `config.ini`
///
/// ```ini
/// defaults = --on-discard summary
///
/// [aliases]
/// ranked = --sorted -F records
/// ```
#[derive(Debug, Default, PartialEq)]
pub struct ConfigFile {
    pub defaults: Option<String>,
    pub aliases: IndexMap<String, String>,
}

impl ConfigFile {
    /// Walk up from `start` looking for a project `.topidsrc`
    pub fn find_project_config_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_CONFIG_NAME))
            .find(|candidate| candidate.is_file())
    }

    pub fn find_project_config() -> Option<PathBuf> {
        let cwd = env::current_dir().ok()?;
        Self::find_project_config_from(&cwd)
    }

    /// User config file locations in order of preference
    pub fn get_user_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if cfg!(windows) {
            if let Ok(appdata) = env::var("APPDATA") {
                paths.push(PathBuf::from(appdata).join(APP_DIR).join("config.ini"));
            }
            if let Ok(userprofile) = env::var("USERPROFILE") {
                paths.push(PathBuf::from(userprofile).join(PROJECT_CONFIG_NAME));
            }
        } else {
            let xdg_config = env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    env::var("HOME")
                        .map(|h| PathBuf::from(h).join(".config"))
                        .unwrap_or_else(|_| PathBuf::from(".config"))
                });
            paths.push(xdg_config.join(APP_DIR).join("config.ini"));

            if let Ok(home) = env::var("HOME") {
                paths.push(PathBuf::from(home).join(PROJECT_CONFIG_NAME));
            }
        }

        paths
    }

    /// Merge the first existing user config with the project config (project wins)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_path) = Self::get_user_config_paths().into_iter().find(|p| p.is_file()) {
            config = config.merged_with(Self::load_from_path(&user_path)?);
        }

        if let Some(project_path) = Self::find_project_config() {
            config = config.merged_with(Self::load_from_path(&project_path)?);
        }

        Ok(config)
    }

    /// An explicit `--config-file` replaces the search entirely
    pub fn load_with_custom_path(custom_path: Option<&str>) -> Result<Self> {
        match custom_path {
            Some(path) => Self::load_from_path(Path::new(path)),
            None => Self::load(),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Ok(Self::parse_ini_content(&content))
    }

    /// Minimal INI: root `defaults = ...` plus an `[aliases]` section.
    /// Unknown keys and sections are ignored.
    fn parse_ini_content(content: &str) -> Self {
        let mut config = Self::default();
        let mut section = String::new();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = name.trim().to_string();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match section.as_str() {
                "" if key == "defaults" => config.defaults = Some(value.to_string()),
                "aliases" => {
                    config.aliases.insert(key.to_string(), value.to_string());
                }
                _ => {}
            }
        }

        config
    }

    /// `overlay` takes precedence for defaults and for alias names both define
    fn merged_with(self, overlay: Self) -> Self {
        let mut aliases = self.aliases;
        aliases.extend(overlay.aliases);
        Self {
            defaults: overlay.defaults.or(self.defaults),
            aliases,
        }
    }

    pub fn show_config() {
        println!("Configuration precedence: CLI > project {PROJECT_CONFIG_NAME} > user config > defaults\n");

        let project_path = Self::find_project_config();
        let user_paths = Self::get_user_config_paths();
        let user_path = user_paths.iter().find(|p| p.is_file());

        match Self::load() {
            Ok(merged) => {
                let mut loaded_from = Vec::new();
                if let Some(path) = &project_path {
                    loaded_from.push(format!("Project: {}", path.display()));
                }
                if let Some(path) = user_path {
                    loaded_from.push(format!("User: {}", path.display()));
                }

                if loaded_from.is_empty() {
                    println!("No configuration files found. Using defaults.");
                } else {
                    println!("Configuration loaded from:");
                    for source in loaded_from {
                        println!("  {}", source);
                    }
                }

                if let Some(defaults) = &merged.defaults {
                    println!("\nActive defaults:");
                    println!("  defaults = {}", defaults);
                }

                if !merged.aliases.is_empty() {
                    println!("\nActive aliases:");
                    let mut sorted: Vec<_> = merged.aliases.iter().collect();
                    sorted.sort_by_key(|(name, _)| name.as_str());
                    for (name, value) in sorted {
                        println!("  {} = {}", name, value);
                    }
                }
            }
            Err(e) => eprintln!("Error loading configuration: {:#}", e),
        }

        println!("\nConfiguration search locations (in precedence order):");
        match &project_path {
            Some(path) => println!("  1. Project: {} (found)", path.display()),
            None => println!(
                "  1. Project: {} (searched up directory tree, not found)",
                PROJECT_CONFIG_NAME
            ),
        }
        for (i, path) in user_paths.iter().enumerate() {
            let status = if path.is_file() { "(found)" } else { "(not found)" };
            println!("  {}. User: {} {}", i + 2, path.display(), status);
        }

        if project_path.is_none() && user_path.is_none() {
            println!("\nExample configuration file ({}):", PROJECT_CONFIG_NAME);
            println!();
            println!("# Arguments applied to every topids command");
            println!("defaults = --on-discard summary");
            println!();
            println!("[aliases]");
            println!("ranked = --sorted -F records");
            println!("report = --sorted -F json --stats --stats-format json");
        }
    }

    /// Expand `name`, following nested `-a`/`--alias` references
    pub fn resolve_alias(&self, name: &str, seen: &mut HashSet<String>, depth: usize) -> Result<Vec<String>> {
        if depth > MAX_ALIAS_DEPTH {
            return Err(anyhow!("Alias chain too deep: {} levels", depth));
        }
        if !seen.insert(name.to_string()) {
            return Err(anyhow!("Circular dependency detected in alias: {}", name));
        }

        let value = self
            .aliases
            .get(name)
            .ok_or_else(|| anyhow!("Unknown alias: {}", name))?;
        let args = shell_words::split(value)
            .with_context(|| format!("Invalid alias '{}': failed to parse arguments", name))?;

        let expanded = self.expand_aliases(args, seen, depth + 1)?;
        seen.remove(name);
        Ok(expanded)
    }

    fn expand_aliases(&self, args: Vec<String>, seen: &mut HashSet<String>, depth: usize) -> Result<Vec<String>> {
        let mut result = Vec::with_capacity(args.len());
        let mut iter = args.into_iter().peekable();

        while let Some(arg) = iter.next() {
            let is_alias_flag = arg == "-a" || arg == "--alias";
            match (is_alias_flag, iter.peek()) {
                (true, Some(_)) => {
                    if let Some(name) = iter.next() {
                        result.extend(self.resolve_alias(&name, seen, depth)?);
                    }
                }
                _ => result.push(arg),
            }
        }

        Ok(result)
    }

    /// Insert `defaults` after the program name, then expand aliases
    pub fn process_args(&self, args: Vec<String>) -> Result<Vec<String>> {
        let mut with_defaults = Vec::with_capacity(args.len());
        let mut args = args.into_iter();

        if let Some(program) = args.next() {
            with_defaults.push(program);
        }
        if let Some(defaults) = &self.defaults {
            let default_args = shell_words::split(defaults)
                .context("Invalid defaults: failed to parse arguments")?;
            with_defaults.extend(default_args);
        }
        with_defaults.extend(args);

        self.expand_aliases(with_defaults, &mut HashSet::new(), 0)
    }
}
