//! Options that influence a checking run

use pyrite_config::{Config, OutputFormat, DEFAULT_PYTHON_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckerOptions {
    /// Target language major version (2 or 3)
    pub python_version: u32,
    pub output_format: OutputFormat,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            python_version: DEFAULT_PYTHON_VERSION,
            output_format: OutputFormat::default(),
        }
    }
}

impl CheckerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            python_version: config.python_version(),
            output_format: config.output_format(),
        }
    }

    pub fn with_python_version(mut self, version: u32) -> Self {
        self.python_version = version;
        self
    }

    /// Iterator protocol method for the target version
    pub fn next_method_name(&self) -> &'static str {
        if self.python_version >= 3 {
            "__next__"
        } else {
            "next"
        }
    }
}
