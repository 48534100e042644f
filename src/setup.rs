//! Client registration (`ring-mcp setup`)
//!
//! Adds a `ring` entry under `mcpServers` in the user's client configuration
//! file so the client launches `ring-mcp serve` over stdio.

use crate::error::{Result, RingError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key of the server entry under `mcpServers`
pub const SERVER_KEY: &str = "ring";

/// ANSI color codes for setup output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BRIGHT: &str = "\x1b[1m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
}

/// MCP server launch entry as stored in the client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServerEntry {
    /// Transport type (always "stdio")
    #[serde(rename = "type")]
    pub transport: String,

    /// Command to run the MCP server
    pub command: String,

    /// Arguments for the command
    pub args: Vec<String>,

    /// Environment variables
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl McpServerEntry {
    /// Entry launching `<binary> serve`
    pub fn for_binary(binary: &Path) -> Self {
        Self {
            transport: "stdio".to_string(),
            // Forward slashes on every platform
            command: binary.to_string_lossy().replace('\\', "/"),
            args: vec!["serve".to_string()],
            env: HashMap::new(),
        }
    }
}

/// What setup did to the client configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Entry written (file created or updated)
    Registered,
    /// An existing entry was kept at the user's request
    KeptExisting,
}

/// `~/.claude.json`
pub fn default_client_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".claude.json"))
}

/// Registers the server in a client configuration file
#[derive(Debug, Clone)]
pub struct Setup {
    /// Client configuration file to edit
    pub config_path: PathBuf,

    /// Server executable recorded in the entry
    pub server_binary: PathBuf,

    /// Overwrite an existing entry without asking
    pub force: bool,
}

impl Setup {
    /// Run setup, prompting on `input` and reporting on `output`
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<SetupOutcome> {
        let out = &mut output;

        say(out, "\n🔔 Ring MCP Setup", &[colors::BRIGHT, colors::CYAN])?;
        say(out, &"═".repeat(40), &[colors::CYAN])?;
        say(
            out,
            &format!("\n📁 Server binary: {}", self.server_binary.display()),
            &[colors::BLUE],
        )?;
        say(
            out,
            &format!("📁 Config location: {}", self.config_path.display()),
            &[colors::BLUE],
        )?;

        let mut config = self.load_client_config(out)?;

        let servers = config
            .entry("mcpServers")
            .or_insert_with(|| Value::Object(Map::new()));
        if !servers.is_object() {
            *servers = Value::Object(Map::new());
        }
        let Value::Object(servers) = servers else {
            return Err(RingError::Setup("mcpServers is not an object".to_string()));
        };

        if let Some(existing) = servers.get(SERVER_KEY) {
            say(out, "\n⚠️  Ring MCP is already configured!", &[colors::YELLOW])?;
            let current = existing
                .get("command")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            say(out, &format!("   Current command: {}", current), &[])?;

            if !self.force && !confirm(&mut input, out, "\n   Overwrite existing configuration? (y/N): ")? {
                say(out, "\n   Keeping existing configuration.", &[colors::BLUE])?;
                return Ok(SetupOutcome::KeptExisting);
            }
        }

        let entry = McpServerEntry::for_binary(&self.server_binary);
        servers.insert(SERVER_KEY.to_string(), serde_json::to_value(&entry)?);

        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(&Value::Object(config))?;
        std::fs::write(&self.config_path, contents)
            .map_err(|e| RingError::Setup(format!("Failed to write config: {}", e)))?;
        debug!("Wrote {}", self.config_path.display());

        say(out, "\n✅ Ring MCP configured successfully!", &[colors::GREEN])?;
        say(out, &format!("\n{}", "═".repeat(40)), &[colors::CYAN])?;
        say(out, "\nNext steps:", &[colors::BRIGHT])?;
        say(out, "  1. Restart your MCP client", &[])?;
        say(out, "  2. The 'ring' tool will be available automatically", &[])?;
        say(out, "\nUsage:", &[colors::BRIGHT])?;
        say(
            out,
            "  ring({ title: \"Done!\", message: \"Task completed\" })",
            &[colors::CYAN],
        )?;

        Ok(SetupOutcome::Registered)
    }

    /// Existing configuration as a JSON object; unparseable files are backed up
    fn load_client_config<W: Write>(&self, out: &mut W) -> Result<Map<String, Value>> {
        if !self.config_path.exists() {
            say(out, "\n📝 Creating new client config...", &[colors::YELLOW])?;
            return Ok(Map::new());
        }

        let raw = std::fs::read(&self.config_path)?;
        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(map)) => {
                say(out, "\n✓ Found existing client config", &[colors::GREEN])?;
                Ok(map)
            }
            _ => {
                let backup = backup_path(&self.config_path);
                say(
                    out,
                    &format!(
                        "\n⚠️  Could not parse existing config, backing up to {}",
                        backup.display()
                    ),
                    &[colors::YELLOW],
                )?;
                std::fs::write(&backup, &raw)?;
                Ok(Map::new())
            }
        }
    }
}

/// `<file>.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
}

fn say<W: Write>(out: &mut W, message: &str, styles: &[&str]) -> Result<()> {
    if styles.is_empty() {
        writeln!(out, "{}", message)?;
    } else {
        writeln!(out, "{}{}{}", styles.concat(), message, colors::RESET)?;
    }
    Ok(())
}

fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<bool> {
    write!(out, "{}", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_shape() {
        let entry = McpServerEntry::for_binary(Path::new("/usr/local/bin/ring-mcp"));
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["type"], "stdio");
        assert_eq!(value["command"], "/usr/local/bin/ring-mcp");
        assert_eq!(value["args"], serde_json::json!(["serve"]));
        assert_eq!(value["env"], serde_json::json!({}));
    }

    #[test]
    fn test_entry_uses_forward_slashes() {
        let entry = McpServerEntry::for_binary(Path::new(r"C:\Tools\ring-mcp.exe"));
        assert_eq!(entry.command, "C:/Tools/ring-mcp.exe");
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("/home/u/.claude.json")),
            PathBuf::from("/home/u/.claude.json.backup")
        );
    }
}
