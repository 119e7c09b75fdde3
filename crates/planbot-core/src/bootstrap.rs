//! Runtime preparation for the drafting toolchain.
//!
//! Generated scripts assume the `ezdxf` library is importable. This step
//! installs it through the same executor the loop uses, once at startup.
//! Failure is logged but not fatal: without the library, the first generation
//! attempt fails with a concrete import error, and that error is exactly the
//! kind of feedback the retry loop knows how to forward.

use crate::executors::CodeExecutor;

const INSTALL_DRAFTING_LIBRARY: &str =
    "import sys, subprocess\nsubprocess.check_call([sys.executable, \"-m\", \"pip\", \"install\", \"ezdxf\"])\n";

/// Install the drafting library into the interpreter environment.
/// Returns whether the install succeeded.
pub async fn ensure_drafting_runtime(executor: &dyn CodeExecutor) -> bool {
    log::info!("preparing drafting runtime (pip install ezdxf)");
    let result = executor.execute(INSTALL_DRAFTING_LIBRARY).await;

    if result.succeeded {
        log::info!("drafting runtime ready");
    } else {
        log::warn!(
            "drafting runtime preparation failed: {}",
            result
                .failure_reason
                .as_deref()
                .unwrap_or("unknown error")
        );
    }

    result.succeeded
}
