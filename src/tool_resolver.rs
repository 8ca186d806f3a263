//! # Tool Path Resolver
//!
//! This module handles finding the external WebP encoders:
//! - A bundled tools directory (`WEBP_TOOLS_DIR`)
//! - System-installed tools on `PATH`

use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Static-image encoder from libwebp
pub const CWEBP: &str = "cwebp";
/// Animated GIF transcoder from libwebp
pub const GIF2WEBP: &str = "gif2webp";

/// Tool path resolver for bundled and system-installed encoders
pub struct ToolPathResolver {
    /// Directory where tools are bundled, checked before `PATH`
    tools_dir: Option<PathBuf>,
}

impl ToolPathResolver {
    /// Create a resolver honoring the `WEBP_TOOLS_DIR` environment variable
    pub fn new() -> Self {
        let tools_dir = env::var_os("WEBP_TOOLS_DIR")
            .map(PathBuf::from)
            .filter(|dir| {
                let exists = dir.is_dir();
                if !exists {
                    warn!("WEBP_TOOLS_DIR does not exist: {}", dir.display());
                }
                exists
            });

        Self::with_tools_dir(tools_dir)
    }

    /// Create a resolver with an explicit bundled tools directory
    pub fn with_tools_dir(tools_dir: Option<PathBuf>) -> Self {
        Self { tools_dir }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        debug!("Resolving tool: {}", tool_name);

        if let Some(ref tools_dir) = self.tools_dir {
            let bundled_path = tools_dir.join(Self::executable_name(tool_name));
            if bundled_path.is_file() {
                debug!("Using bundled tool: {} -> {:?}", tool_name, bundled_path);
                return Some(bundled_path);
            }
            debug!("Bundled path does not exist: {:?}", bundled_path);
        }

        if let Some(system_path) = Self::find_in_system_path(tool_name) {
            debug!("Using system tool: {} -> {:?}", tool_name, system_path);
            return Some(system_path);
        }

        warn!("Tool not found: {}", tool_name);
        None
    }

    fn executable_name(tool_name: &str) -> String {
        if cfg!(windows) {
            format!("{}.exe", tool_name)
        } else {
            tool_name.to_string()
        }
    }

    /// Find tool in system PATH
    fn find_in_system_path(tool_name: &str) -> Option<PathBuf> {
        let executable = Self::executable_name(tool_name);
        env::split_paths(&env::var_os("PATH")?)
            .map(|dir| dir.join(&executable))
            .find(|path| path.is_file())
    }

    /// Get installation instructions for a tool
    fn install_instructions(tool_name: &str) -> String {
        match tool_name {
            CWEBP | GIF2WEBP => {
                if cfg!(target_os = "macos") {
                    "brew install webp".to_string()
                } else {
                    "sudo apt-get install webp".to_string()
                }
            }
            _ => format!("install {} and make sure it is on PATH", tool_name),
        }
    }

    /// Check if a tool is available and provide installation instructions if not
    pub fn check_tool_with_instructions(&self, tool_name: &str) -> Result<PathBuf, String> {
        self.resolve_tool(tool_name).ok_or_else(|| {
            format!(
                "Tool '{}' not found in WEBP_TOOLS_DIR or PATH.\nTo install, run:\n  {}",
                tool_name,
                Self::install_instructions(tool_name)
            )
        })
    }

    /// Get a report of tool availability
    pub fn get_tools_report(&self) -> String {
        let mut report = String::from("WebP tool availability\n");
        match self.tools_dir {
            Some(ref dir) => report.push_str(&format!("Bundled tools dir: {}\n", dir.display())),
            None => report.push_str("Bundled tools dir: (none, using PATH)\n"),
        }

        let tools = [
            (CWEBP, "static images (png, jpeg, tiff, bmp, webp, avif, single-frame gif)"),
            (GIF2WEBP, "animated gif"),
        ];
        for (tool, purpose) in tools {
            match self.resolve_tool(tool) {
                Some(path) => report.push_str(&format!("  ✅ {} -> {} [{}]\n", tool, path.display(), purpose)),
                None => report.push_str(&format!(
                    "  ❌ {} (install with: {}) [{}]\n",
                    tool,
                    Self::install_instructions(tool),
                    purpose
                )),
            }
        }

        report
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}
