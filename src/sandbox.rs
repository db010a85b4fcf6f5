//! Maps request paths onto the content root and refuses anything that
//! would land outside it.
//!
//! Resolution is lexical: the query string is dropped, `/` becomes the index
//! document, the remainder is joined onto the canonical root, and `.` / `..`
//! segments are collapsed. The collapsed path must still start with the root.
//!
//! ```text
//! /                      → <root>/index.html
//! /css/site.css?v=3      → <root>/css/site.css
//! /a/../b.txt            → <root>/b.txt
//! /../etc/passwd         → Forbidden
//! //etc/passwd           → Forbidden   (absolute override)
//! ```

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// The request path escaped the content root.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Forbidden;

impl fmt::Display for Forbidden {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("path escapes the content root")
    }
}

impl std::error::Error for Forbidden {}

/// A content root plus the name of the document served for `/`.
#[derive(Clone, Debug)]
pub struct Sandbox {
    root: PathBuf,
    index: String,
}

impl Sandbox {
    /// Canonicalizes `root`, which must already exist.
    pub fn new(root: impl AsRef<Path>, index: impl Into<String>) -> io::Result<Self> {
        Ok(Self { root: root.as_ref().canonicalize()?, index: index.into() })
    }

    /// The canonical content root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a raw request path to a location under the root.
    ///
    /// Does not touch the filesystem; the result may not exist.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, Forbidden> {
        let path = raw.split('?').next().unwrap_or_default();
        let path = if path == "/" { self.index.as_str() } else { path.strip_prefix('/').unwrap_or(path) };

        let joined = self.root.join(path);
        let mut normalized = PathBuf::new();
        for component in joined.components() {
            match component {
                Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                    normalized.push(component.as_os_str());
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    normalized.pop();
                }
            }
        }

        if self.contains(&normalized) { Ok(normalized) } else { Err(Forbidden) }
    }

    /// Whether `path` lies under the root. `path` should already be
    /// normalized or canonical.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }
}
