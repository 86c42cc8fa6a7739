use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::WizardError;

const OSRELEASE: &str = "/proc/sys/kernel/osrelease";

// ── Data types ────────────────────────────────────────────────────────────────

/// One installed kernel module tree under the module root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelRecord {
    pub full_version: String, // 6.17.0-3-generic
    pub version: String,      // 6.17
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub headers_installed: bool,
    pub headers_path: PathBuf,
    pub is_current: bool,
    pub supported: bool,
}

impl KernelRecord {
    pub fn is_eligible(&self) -> bool {
        self.supported && self.headers_installed
    }

    /// One-line label shown in the arrow-key selector.
    pub fn display(&self) -> String {
        if self.is_current {
            format!("★ {} (current)", self.full_version)
        } else {
            format!("  {}", self.full_version)
        }
    }
}

/// Kernel series the downstream module build knows how to patch.
///
/// An explicit allow-list, not a range: a newer minor is unsupported
/// until it is added here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportMatrix {
    pub major: u32,
    pub minors: Vec<u32>,
}

impl Default for SupportMatrix {
    fn default() -> Self {
        SupportMatrix {
            major: 6,
            minors: vec![16, 17, 18],
        }
    }
}

impl SupportMatrix {
    pub fn supports(&self, major: u32, minor: u32) -> bool {
        major == self.major && self.minors.contains(&minor)
    }

    /// `6.16.x, 6.17.x or 6.18.x`
    pub fn describe(&self) -> String {
        let series: Vec<String> = self
            .minors
            .iter()
            .map(|m| format!("{}.{}.x", self.major, m))
            .collect();
        match series.split_last() {
            None => "none".to_string(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        }
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parses the numeric prefix of a module directory name.
///
/// `6.17.0-3-generic` → `(6, 17, 0)`, `6.16-rc1` → `(6, 16, 0)`.
/// Any non-numeric component in the first three fields rejects the name.
pub fn parse_release(name: &str) -> Option<(u32, u32, u32)> {
    let head = name.split('-').next()?;
    let mut parts = head.split('.');

    let major = parts.next()?.parse().ok()?;
    let minor = match parts.next() {
        Some(p) => p.parse().ok()?,
        None => 0,
    };
    let patch = match parts.next() {
        Some(p) => p.parse().ok()?,
        None => 0,
    };

    Some((major, minor, patch))
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Release string of the running kernel, or empty if it cannot be read.
pub fn running_release() -> String {
    fs::read_to_string(OSRELEASE)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Enumerates every parseable kernel directory under `root`, in name order.
/// A missing root yields an empty inventory.
pub fn scan(
    root: &Path,
    running: &str,
    matrix: &SupportMatrix,
) -> Result<Vec<KernelRecord>, WizardError> {
    let entries = match fs::read_dir(root) {
        Ok(rd) => rd,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(root = %root.display(), "module root does not exist");
            return Ok(vec![]);
        }
        Err(e) => return Err(e.into()),
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    let kernels = dirs
        .into_iter()
        .filter_map(|dir| {
            let full_version = dir.file_name()?.to_string_lossy().into_owned();
            let Some((major, minor, patch)) = parse_release(&full_version) else {
                debug!(entry = %full_version, "skipping unparsable module directory");
                return None;
            };

            let headers_path = dir.join("build");
            Some(KernelRecord {
                version: format!("{}.{}", major, minor),
                major,
                minor,
                patch,
                headers_installed: headers_path.is_dir(),
                headers_path,
                is_current: full_version == running,
                supported: matrix.supports(major, minor),
                full_version,
            })
        })
        .collect();

    Ok(kernels)
}

/// Kernels that are both supported and have headers, in inventory order.
pub fn eligible(kernels: &[KernelRecord]) -> Vec<KernelRecord> {
    kernels.iter().filter(|k| k.is_eligible()).cloned().collect()
}

/// Like [`eligible`], but an empty result is a terminal error that tells
/// "nothing installed" apart from "nothing usable".
pub fn eligible_or_err(
    kernels: &[KernelRecord],
    matrix: &SupportMatrix,
) -> Result<Vec<KernelRecord>, WizardError> {
    if kernels.is_empty() {
        return Err(WizardError::NoKernels);
    }
    let usable = eligible(kernels);
    if usable.is_empty() {
        return Err(WizardError::NoEligibleKernels {
            supported: matrix.describe(),
        });
    }
    Ok(usable)
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// What the operator picked in the kernel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelChoice {
    Single(usize),
    All,
}

impl KernelChoice {
    /// Maps a selector index onto a choice; the entry after the last
    /// kernel is the "all" option.
    pub fn from_index(idx: usize, eligible_len: usize) -> Self {
        if idx >= eligible_len {
            KernelChoice::All
        } else {
            KernelChoice::Single(idx)
        }
    }

    pub fn resolve(self, eligible: &[KernelRecord]) -> Vec<KernelRecord> {
        match self {
            KernelChoice::All => eligible.to_vec(),
            KernelChoice::Single(i) => eligible.get(i).cloned().into_iter().collect(),
        }
    }
}

/// Cursor position: the running kernel if it is eligible, else the first entry.
pub fn default_index(eligible: &[KernelRecord]) -> usize {
    eligible.iter().position(|k| k.is_current).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn module_root(entries: &[(&str, bool)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for (name, headers) in entries {
            let dir = temp.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            if *headers {
                fs::create_dir(dir.join("build")).unwrap();
            }
        }
        temp
    }

    #[test]
    fn parses_common_release_shapes() {
        assert_eq!(parse_release("6.17.0-3-generic"), Some((6, 17, 0)));
        assert_eq!(parse_release("6.16.12"), Some((6, 16, 12)));
        assert_eq!(parse_release("6.18-rc2"), Some((6, 18, 0)));
        assert_eq!(parse_release("7"), Some((7, 0, 0)));
    }

    #[test]
    fn rejects_non_numeric_components() {
        assert_eq!(parse_release("extramodules"), None);
        assert_eq!(parse_release("6.x.1"), None);
        assert_eq!(parse_release("6.17.rc1"), None);
        assert_eq!(parse_release(""), None);
        assert_eq!(parse_release("-generic"), None);
    }

    #[test]
    fn support_is_an_allow_list() {
        let matrix = SupportMatrix::default();
        assert!(matrix.supports(6, 16));
        assert!(matrix.supports(6, 18));
        assert!(!matrix.supports(6, 19));
        assert!(!matrix.supports(6, 15));
        assert!(!matrix.supports(5, 17));
    }

    #[test]
    fn describes_supported_series() {
        assert_eq!(
            SupportMatrix::default().describe(),
            "6.16.x, 6.17.x or 6.18.x"
        );
        let single = SupportMatrix {
            major: 6,
            minors: vec![17],
        };
        assert_eq!(single.describe(), "6.17.x");
    }

    #[test]
    fn scan_builds_records_in_name_order() {
        let root = module_root(&[
            ("6.18.1-1-generic", false),
            ("6.16.0-5-generic", true),
            ("6.19.0-2-generic", true),
        ]);

        let kernels = scan(root.path(), "6.16.0-5-generic", &SupportMatrix::default()).unwrap();
        let names: Vec<&str> = kernels.iter().map(|k| k.full_version.as_str()).collect();
        assert_eq!(
            names,
            ["6.16.0-5-generic", "6.18.1-1-generic", "6.19.0-2-generic"]
        );

        let first = &kernels[0];
        assert_eq!(first.version, "6.16");
        assert_eq!((first.major, first.minor, first.patch), (6, 16, 0));
        assert!(first.headers_installed);
        assert!(first.is_current);
        assert!(first.supported);

        assert!(!kernels[1].headers_installed);
        assert!(!kernels[2].supported);
    }

    #[test]
    fn scan_skips_files_and_unparsable_names() {
        let root = module_root(&[("6.17.0-1-generic", true), ("extramodules", true)]);
        fs::write(root.path().join("6.16.0-1-generic"), "not a dir").unwrap();

        let kernels = scan(root.path(), "", &SupportMatrix::default()).unwrap();
        assert_eq!(kernels.len(), 1);
        assert_eq!(kernels[0].full_version, "6.17.0-1-generic");
    }

    #[test]
    fn build_file_is_not_headers() {
        let root = module_root(&[("6.17.0-1-generic", false)]);
        fs::write(root.path().join("6.17.0-1-generic/build"), "").unwrap();

        let kernels = scan(root.path(), "", &SupportMatrix::default()).unwrap();
        assert!(!kernels[0].headers_installed);
    }

    #[test]
    fn only_the_running_release_is_current() {
        let root = module_root(&[
            ("6.17.0-1-generic", true),
            ("6.17.0-10-generic", true),
            ("6.17.0-1-lowlatency", true),
        ]);

        let kernels = scan(root.path(), "6.17.0-1-generic", &SupportMatrix::default()).unwrap();
        let current: Vec<_> = kernels.iter().filter(|k| k.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].full_version, "6.17.0-1-generic");
    }

    #[test]
    fn missing_root_is_an_empty_inventory() {
        let temp = TempDir::new().unwrap();
        let kernels = scan(&temp.path().join("nope"), "", &SupportMatrix::default()).unwrap();
        assert!(kernels.is_empty());
    }

    #[test]
    fn eligibility_keeps_inventory_order() {
        let root = module_root(&[
            ("6.16.3-1-generic", true),
            ("6.17.0-1-generic", false),
            ("6.18.0-1-generic", true),
            ("6.19.0-1-generic", true),
        ]);
        let kernels = scan(root.path(), "", &SupportMatrix::default()).unwrap();

        let usable: Vec<String> = eligible(&kernels)
            .into_iter()
            .map(|k| k.full_version)
            .collect();
        assert_eq!(usable, ["6.16.3-1-generic", "6.18.0-1-generic"]);
    }

    #[test]
    fn empty_inventory_and_no_headers_are_different_failures() {
        let matrix = SupportMatrix::default();
        assert!(matches!(
            eligible_or_err(&[], &matrix),
            Err(WizardError::NoKernels)
        ));

        let root = module_root(&[("6.17.0-1-generic", false), ("6.19.0-1-generic", true)]);
        let kernels = scan(root.path(), "", &matrix).unwrap();
        assert!(matches!(
            eligible_or_err(&kernels, &matrix),
            Err(WizardError::NoEligibleKernels { .. })
        ));
    }

    #[test]
    fn choice_resolution() {
        let root = module_root(&[("6.16.0-1-generic", true), ("6.17.0-1-generic", true)]);
        let usable = eligible(&scan(root.path(), "6.17.0-1-generic", &SupportMatrix::default()).unwrap());

        assert_eq!(default_index(&usable), 1);
        assert_eq!(KernelChoice::from_index(2, usable.len()), KernelChoice::All);
        assert_eq!(KernelChoice::All.resolve(&usable), usable);

        let single = KernelChoice::from_index(0, usable.len()).resolve(&usable);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].full_version, "6.16.0-1-generic");
    }

    #[test]
    fn cursor_falls_back_to_first_entry() {
        let root = module_root(&[("6.16.0-1-generic", true), ("6.17.0-1-generic", true)]);
        // running kernel is not among the eligible set
        let usable = eligible(&scan(root.path(), "6.19.0-1-generic", &SupportMatrix::default()).unwrap());
        assert_eq!(default_index(&usable), 0);
    }
}
