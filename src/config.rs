//! Interpreter construction parameters and the layered settings the `bf`
//! binary resolves them from.
//!
//! Settings are resolved in priority order (highest first):
//! 1. Command-line flags (applied by the caller)
//! 2. Environment variables (`BF_EOF`, `BF_TAPE_SIZE`, ...)
//! 3. User config file (`$XDG_CONFIG_HOME/bf.toml`)
//! 4. Built-in defaults
//!
//! # Config File Format
//!
//! ```toml
//! # bf.toml
//! tape_size = 300000
//! tape_limit = 1000000
//! tape_growth = 1000
//! cell_bits = 8
//! wrap_around = true
//! eof = "unchanged"        # zero | max | unchanged
//! newline_as_eof = false
//! max_steps = 10000000
//! timeout_ms = 5000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use cross_xdg::BaseDirs;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::io_policy::{EofMode, IoPolicy};

pub const DEFAULT_TAPE_SIZE: usize = 300_000;
pub const DEFAULT_TAPE_GROWTH: usize = 1_000;
pub const DEFAULT_VALUE_SPACE: u128 = 256;

const CONFIG_FILE_NAME: &str = "bf.toml";

/// Storage width of a single tape cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellWidth {
    #[default]
    Bits8,
    Bits16,
    Bits32,
    Bits64,
}

impl CellWidth {
    pub fn from_bits(bits: u32) -> Result<Self, ConfigError> {
        match bits {
            8 => Ok(CellWidth::Bits8),
            16 => Ok(CellWidth::Bits16),
            32 => Ok(CellWidth::Bits32),
            64 => Ok(CellWidth::Bits64),
            other => Err(ConfigError::UnsupportedWidth(other)),
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            CellWidth::Bits8 => 8,
            CellWidth::Bits16 => 16,
            CellWidth::Bits32 => 32,
            CellWidth::Bits64 => 64,
        }
    }

    /// Number of distinct values a cell of this width holds (2^bits).
    pub fn value_space(self) -> u128 {
        1u128 << self.bits()
    }

    /// Largest storable value (2^bits - 1).
    pub fn max_value(self) -> u64 {
        u64::MAX >> (64 - self.bits())
    }
}

/// Everything an [`Interpreter`](crate::Interpreter) needs to know at
/// construction. Immutable once the interpreter is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Cells allocated up front.
    pub initial_size: usize,
    /// Hard upper bound on the tape length. `None` grows without bound.
    pub size_limit: Option<usize>,
    /// Cells added each time the pointer reaches the end of the tape.
    pub growth: usize,
    pub cell_width: CellWidth,
    /// Declared value space of a cell; must agree with `cell_width`.
    pub value_space: u128,
    pub wrap_around: bool,
    pub eof_mode: EofMode,
    pub newline_as_eof: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_TAPE_SIZE,
            size_limit: None,
            growth: DEFAULT_TAPE_GROWTH,
            cell_width: CellWidth::Bits8,
            value_space: DEFAULT_VALUE_SPACE,
            wrap_around: true,
            eof_mode: EofMode::Unchanged,
            newline_as_eof: false,
        }
    }
}

impl InterpreterConfig {
    pub fn with_tape(mut self, initial_size: usize, size_limit: Option<usize>, growth: usize) -> Self {
        self.initial_size = initial_size;
        self.size_limit = size_limit;
        self.growth = growth;
        self
    }

    /// Set the storage width and the matching value space together.
    pub fn with_cell_width(mut self, width: CellWidth) -> Self {
        self.cell_width = width;
        self.value_space = width.value_space();
        self
    }

    pub fn with_wrap_around(mut self, wrap_around: bool) -> Self {
        self.wrap_around = wrap_around;
        self
    }

    pub fn with_eof(mut self, eof_mode: EofMode, newline_as_eof: bool) -> Self {
        self.eof_mode = eof_mode;
        self.newline_as_eof = newline_as_eof;
        self
    }

    pub fn io_policy(&self) -> IoPolicy {
        IoPolicy::new(self.eof_mode, self.newline_as_eof)
    }

    /// Reject parameter combinations the interpreter cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_size == 0 {
            return Err(ConfigError::EmptyTape);
        }
        if self.growth == 0 {
            return Err(ConfigError::ZeroGrowth);
        }
        if let Some(limit) = self.size_limit {
            if limit < self.initial_size {
                return Err(ConfigError::LimitBelowInitial { limit, initial: self.initial_size });
            }
        }
        if !self.value_space.is_power_of_two() {
            return Err(ConfigError::ValueSpaceNotPowerOfTwo(self.value_space));
        }
        let actual = self.cell_width.value_space();
        if self.value_space != actual {
            return Err(ConfigError::WidthMismatch {
                declared: self.value_space,
                bits: self.cell_width.bits(),
                actual,
            });
        }
        Ok(())
    }
}

/// Raw shape of `bf.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    tape_size: Option<usize>,
    tape_limit: Option<usize>,
    tape_growth: Option<usize>,
    cell_bits: Option<u32>,
    value_space: Option<u64>,
    wrap_around: Option<bool>,
    eof: Option<EofMode>,
    newline_as_eof: Option<bool>,
    max_steps: Option<u64>,
    timeout_ms: Option<u64>,
}

/// Resolved settings for the `bf` binary: interpreter parameters plus run
/// limits that live outside the interpreter itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub interpreter: InterpreterConfig,
    pub max_steps: Option<u64>,
    pub timeout_ms: Option<u64>,
}

impl Settings {
    /// Load from the user config file and the process environment.
    pub fn load() -> Self {
        let path = Self::user_config_path();
        Self::load_from(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load from an explicit file (if any) and an environment lookup.
    pub fn load_from<F>(path: Option<&Path>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(file) = path.and_then(load_file) {
            settings.merge_file(file);
        }
        settings.apply_env(env);
        log::debug!("Resolved settings: {:?}", settings);
        settings
    }

    /// `$XDG_CONFIG_HOME/bf.toml`, or the platform equivalent.
    pub fn user_config_path() -> Option<PathBuf> {
        let base_dirs = BaseDirs::new().ok()?;
        let mut path = PathBuf::from(base_dirs.config_home());
        path.push(CONFIG_FILE_NAME);
        Some(path)
    }

    fn merge_file(&mut self, file: FileSettings) {
        let cfg = &mut self.interpreter;
        if let Some(v) = file.tape_size { cfg.initial_size = v; }
        if file.tape_limit.is_some() { cfg.size_limit = file.tape_limit; }
        if let Some(v) = file.tape_growth { cfg.growth = v; }
        if let Some(bits) = file.cell_bits {
            match CellWidth::from_bits(bits) {
                Ok(width) => {
                    cfg.cell_width = width;
                    cfg.value_space = width.value_space();
                }
                Err(e) => log::warn!("Ignoring cell_bits from config file: {}", e),
            }
        }
        if let Some(v) = file.value_space { cfg.value_space = u128::from(v); }
        if let Some(v) = file.wrap_around { cfg.wrap_around = v; }
        if let Some(v) = file.eof { cfg.eof_mode = v; }
        if let Some(v) = file.newline_as_eof { cfg.newline_as_eof = v; }
        if file.max_steps.is_some() { self.max_steps = file.max_steps; }
        if file.timeout_ms.is_some() { self.timeout_ms = file.timeout_ms; }
    }

    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let cfg = &mut self.interpreter;
        if let Some(v) = env_parsed::<usize>(&env, "BF_TAPE_SIZE") { cfg.initial_size = v; }
        if let Some(v) = env_parsed::<usize>(&env, "BF_TAPE_LIMIT") { cfg.size_limit = Some(v); }
        if let Some(v) = env_parsed::<usize>(&env, "BF_TAPE_GROWTH") { cfg.growth = v; }
        if let Some(bits) = env_parsed::<u32>(&env, "BF_CELL_BITS") {
            match CellWidth::from_bits(bits) {
                Ok(width) => {
                    cfg.cell_width = width;
                    cfg.value_space = width.value_space();
                }
                Err(e) => log::warn!("Ignoring BF_CELL_BITS: {}", e),
            }
        }
        if let Some(v) = env_flag(&env, "BF_WRAP") { cfg.wrap_around = v; }
        if let Some(v) = env_parsed::<EofMode>(&env, "BF_EOF") { cfg.eof_mode = v; }
        if let Some(v) = env_flag(&env, "BF_NEWLINE_AS_EOF") { cfg.newline_as_eof = v; }
        if let Some(v) = env_parsed::<u64>(&env, "BF_MAX_STEPS") { self.max_steps = Some(v); }
        if let Some(v) = env_parsed::<u64>(&env, "BF_TIMEOUT_MS") { self.timeout_ms = Some(v); }
    }

    /// Render the settings in config file syntax.
    pub fn to_toml(&self) -> String {
        let cfg = &self.interpreter;
        let mut out = String::new();
        out.push_str(&format!("tape_size = {}\n", cfg.initial_size));
        match cfg.size_limit {
            Some(limit) => out.push_str(&format!("tape_limit = {}\n", limit)),
            None => out.push_str("# tape_limit = (unbounded)\n"),
        }
        out.push_str(&format!("tape_growth = {}\n", cfg.growth));
        out.push_str(&format!("cell_bits = {}\n", cfg.cell_width.bits()));
        out.push_str(&format!("wrap_around = {}\n", cfg.wrap_around));
        out.push_str(&format!("eof = \"{}\"\n", cfg.eof_mode.as_str()));
        out.push_str(&format!("newline_as_eof = {}\n", cfg.newline_as_eof));
        match self.max_steps {
            Some(n) => out.push_str(&format!("max_steps = {}\n", n)),
            None => out.push_str("# max_steps = (unlimited)\n"),
        }
        match self.timeout_ms {
            Some(ms) => out.push_str(&format!("timeout_ms = {}\n", ms)),
            None => out.push_str("# timeout_ms = (none)\n"),
        }
        out
    }

    /// Sample file content for `bf config --sample`.
    pub fn sample_config() -> &'static str {
        r#"# bf configuration
# Place this file at $XDG_CONFIG_HOME/bf.toml (usually ~/.config/bf.toml)

# Cells allocated up front, and how many more to add when the pointer
# reaches the end of the tape.
tape_size = 300000
tape_growth = 1000

# Hard cap on the tape length (omit for unbounded growth)
# tape_limit = 1000000

# Cell width in bits: 8, 16, 32 or 64
cell_bits = 8

# Wrap cell values modulo 2^cell_bits (false saturates instead)
wrap_around = true

# What ',' stores on end of input: "zero", "max" or "unchanged"
eof = "unchanged"

# Treat a newline on input as end of input
newline_as_eof = false

# Abort after this many executed instructions / milliseconds
# max_steps = 10000000
# timeout_ms = 5000
"#
    }
}

fn load_file(path: &Path) -> Option<FileSettings> {
    if !path.exists() {
        return None;
    }

    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(file) => {
                log::info!("Loaded config from {}", path.display());
                Some(file)
            }
            Err(e) => {
                log::warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        },
        Err(e) => {
            log::warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

fn env_parsed<T>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => {
            log::info!("Using {} from environment: {}", key, raw);
            Some(v)
        }
        Err(e) => {
            log::warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

fn env_flag(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = env(key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            log::warn!("Ignoring {}={:?}: expected a boolean", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = InterpreterConfig::default();
        assert_eq!(cfg.initial_size, 300_000);
        assert_eq!(cfg.size_limit, None);
        assert_eq!(cfg.growth, 1_000);
        assert_eq!(cfg.value_space, 256);
        assert!(cfg.wrap_around);
        assert_eq!(cfg.eof_mode, EofMode::Unchanged);
        assert!(!cfg.newline_as_eof);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn limit_below_initial_size_is_rejected() {
        let cfg = InterpreterConfig::default().with_tape(100, Some(99), 10);
        assert_eq!(cfg.validate(), Err(ConfigError::LimitBelowInitial { limit: 99, initial: 100 }));
        let cfg = InterpreterConfig::default().with_tape(100, Some(100), 10);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn value_space_must_be_power_of_two_and_match_width() {
        let mut cfg = InterpreterConfig::default();
        cfg.value_space = 300;
        assert_eq!(cfg.validate(), Err(ConfigError::ValueSpaceNotPowerOfTwo(300)));

        cfg.value_space = 65_536;
        assert!(matches!(cfg.validate(), Err(ConfigError::WidthMismatch { bits: 8, .. })));

        let cfg = InterpreterConfig::default().with_cell_width(CellWidth::Bits16);
        assert_eq!(cfg.value_space, 65_536);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn zero_growth_and_empty_tape_are_rejected() {
        let cfg = InterpreterConfig::default().with_tape(10, None, 0);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroGrowth));
        let cfg = InterpreterConfig::default().with_tape(0, None, 10);
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyTape));
    }

    #[test]
    fn cell_width_bounds() {
        assert_eq!(CellWidth::Bits8.max_value(), 255);
        assert_eq!(CellWidth::Bits64.max_value(), u64::MAX);
        assert_eq!(CellWidth::Bits64.value_space(), 1u128 << 64);
        assert!(matches!(CellWidth::from_bits(12), Err(ConfigError::UnsupportedWidth(12))));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
        write!(tf, "tape_size = 500\ncell_bits = 16\neof = \"zero\"\nmax_steps = 9\n").unwrap();

        let env = env_from(&[("BF_EOF", "max"), ("BF_NEWLINE_AS_EOF", "1"), ("BF_TIMEOUT_MS", "250")]);
        let settings = Settings::load_from(Some(tf.path()), env);

        assert_eq!(settings.interpreter.initial_size, 500);
        assert_eq!(settings.interpreter.cell_width, CellWidth::Bits16);
        assert_eq!(settings.interpreter.eof_mode, EofMode::Max);
        assert!(settings.interpreter.newline_as_eof);
        assert_eq!(settings.max_steps, Some(9));
        assert_eq!(settings.timeout_ms, Some(250));
    }

    #[test]
    fn malformed_env_and_file_values_are_ignored() {
        let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
        write!(tf, "this is not toml =").unwrap();

        let env = env_from(&[("BF_TAPE_SIZE", "lots"), ("BF_WRAP", "maybe"), ("BF_CELL_BITS", "12")]);
        let settings = Settings::load_from(Some(tf.path()), env);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = Settings::load_from(Some(Path::new("/nonexistent/bf.toml")), |_| None);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn rendered_settings_parse_back() {
        let mut settings = Settings::default();
        settings.interpreter = settings.interpreter.with_eof(EofMode::Zero, true);
        settings.max_steps = Some(42);
        let parsed: FileSettings = toml::from_str(&settings.to_toml()).expect("valid toml");
        assert_eq!(parsed.eof, Some(EofMode::Zero));
        assert_eq!(parsed.newline_as_eof, Some(true));
        assert_eq!(parsed.max_steps, Some(42));
        assert_eq!(parsed.tape_limit, None);

        let sample: FileSettings = toml::from_str(Settings::sample_config()).expect("valid sample");
        assert_eq!(sample.tape_size, Some(300_000));
    }
}
