//! Static validation of generated scripts before execution.
//!
//! Validation is a fixed checklist of required constructs, checked as
//! substrings. That is deliberately shallow: the goal is not to parse Python
//! but to catch the common failure modes (missing import, ignored output
//! directory) before paying for a subprocess, and to hand the retry prompt an
//! itemized list of what was missing.

/// A construct the generated script must contain before it is worth running.
pub struct RequiredConstruct {
    /// Human-readable name, used verbatim in failure messages fed back to the
    /// model.
    pub name: &'static str,
    /// Substring whose presence satisfies the check.
    pub marker: &'static str,
}

/// The checklist every generated floor-plan script must pass.
pub const REQUIRED_CONSTRUCTS: &[RequiredConstruct] = &[
    RequiredConstruct {
        name: "import ezdxf",
        marker: "import ezdxf",
    },
    RequiredConstruct {
        name: "import os",
        marker: "import os",
    },
    RequiredConstruct {
        name: "os.environ.get('OUTPUT_DIR')",
        marker: "os.environ.get('OUTPUT_DIR')",
    },
    RequiredConstruct {
        name: "doc.saveas",
        marker: "doc.saveas",
    },
];

/// Check `code` against the checklist, returning the names of every missing
/// construct. Ordering and surrounding content are irrelevant.
pub fn validate_script(code: &str) -> Result<(), Vec<&'static str>> {
    let missing: Vec<&'static str> = REQUIRED_CONSTRUCTS
        .iter()
        .filter(|construct| !code.contains(construct.marker))
        .map(|construct| construct.name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}
