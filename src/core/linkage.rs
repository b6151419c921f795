//! Library linkage styles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which library variant a configuration prefers to link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkageStyle {
    /// Static archives (`libfoo.a`)
    #[default]
    Static,
    /// Shared objects (`libfoo.so`, `libfoo.dylib`)
    Shared,
    /// Debug builds, which are shared with a `d` suffix where available
    Debug,
}

impl LinkageStyle {
    /// All styles, in default preference order.
    pub const ALL: [LinkageStyle; 3] = [
        LinkageStyle::Static,
        LinkageStyle::Shared,
        LinkageStyle::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkageStyle::Static => "static",
            LinkageStyle::Shared => "shared",
            LinkageStyle::Debug => "debug",
        }
    }

    /// Candidate library file names for a link name, most preferred first.
    pub fn library_file_names(&self, stem: &str) -> Vec<String> {
        let static_names = [format!("lib{stem}.a"), format!("{stem}.lib")];
        let shared_names = [
            format!("lib{stem}.so"),
            format!("lib{stem}.dylib"),
            format!("{stem}.dll"),
        ];

        let mut names = Vec::new();
        match self {
            LinkageStyle::Static => {
                names.extend(static_names);
                names.extend(shared_names);
            }
            LinkageStyle::Shared => {
                names.extend(shared_names);
                names.extend(static_names);
            }
            LinkageStyle::Debug => {
                names.push(format!("lib{stem}d.so"));
                names.push(format!("lib{stem}d.dylib"));
                names.push(format!("lib{stem}d.a"));
                names.push(format!("{stem}_d.lib"));
                names.push(format!("{stem}d.lib"));
                names.extend(shared_names);
                names.extend(static_names);
            }
        }
        names
    }

    /// File name of the library this style produces when exporting.
    pub fn artifact_file_name(&self, stem: &str) -> String {
        match self {
            LinkageStyle::Static => format!("lib{stem}.a"),
            LinkageStyle::Shared => format!("lib{stem}.so"),
            LinkageStyle::Debug => format!("lib{stem}d.so"),
        }
    }
}

impl fmt::Display for LinkageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkageStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(LinkageStyle::Static),
            "shared" | "dynamic" => Ok(LinkageStyle::Shared),
            "debug" => Ok(LinkageStyle::Debug),
            _ => Err(format!(
                "invalid linkage '{}'; expected 'static', 'shared', or 'debug'",
                s
            )),
        }
    }
}
