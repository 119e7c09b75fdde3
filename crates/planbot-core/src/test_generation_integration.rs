//! End-to-end loop tests against the real subprocess executor.
//!
//! The scripted gateway returns "python" blocks that are actually shell
//! scripts: validation only checks for marker substrings, so the required
//! constructs ride along in comments while `sh` does the real work. That
//! keeps these tests runnable on hosts without a Python toolchain.

use std::sync::Arc;
use std::time::Duration;

use crate::errors::PlanBotError;
use crate::executors::ScriptExecutor;
use crate::generation::{FloorPlanGenerator, GeneratorConfig};
use crate::test_utils::MockGateway;

fn fenced(body: &str) -> String {
    format!("```python\n{}\n```", body)
}

// Satisfies every required construct in comments, then writes the drawing.
fn script_writing(file_name: &str) -> String {
    format!(
        r#"# import ezdxf
# import os
# output_dir = os.environ.get('OUTPUT_DIR')
# doc.saveas
printf 'drawing-bytes' > "$OUTPUT_DIR/{file_name}"
"#
    )
}

fn sh_generator(gateway: Arc<MockGateway>) -> FloorPlanGenerator {
    let executor = Arc::new(ScriptExecutor::new("sh", "sh", Duration::from_secs(10)));
    FloorPlanGenerator::new(gateway, executor, GeneratorConfig::default())
}

#[tokio::test]
async fn test_end_to_end_single_attempt() {
    let gateway = Arc::new(MockGateway::new(vec![Ok(fenced(&script_writing(
        "floorplan.dxf",
    )))]));

    let generation = sh_generator(gateway.clone())
        .generate("studio apartment garage conversion")
        .await
        .unwrap();

    assert_eq!(generation.attempts, 1);
    assert!(generation.result.succeeded);
    assert_eq!(generation.result.artifacts.len(), 1);
    assert_eq!(generation.result.artifacts[0].file_name, "floorplan.dxf");
}

#[tokio::test]
async fn test_end_to_end_wrong_output_then_corrected() {
    // First script runs clean but writes only notes.txt; the loop retries
    // with qualification guidance and the second script produces the drawing.
    let gateway = Arc::new(MockGateway::new(vec![
        Ok(fenced(&script_writing("notes.txt"))),
        Ok(fenced(&script_writing("floorplan.dxf"))),
    ]));

    let generation = sh_generator(gateway.clone())
        .generate("two bedroom cottage")
        .await
        .unwrap();

    assert_eq!(generation.attempts, 2);
    assert!(generation.result.has_artifact_with_extension(".dxf"));

    let prompts = gateway.prompts();
    assert!(prompts[1].contains("no .dxf file was generated"));
    assert!(prompts[1].contains("two bedroom cottage"));
}

#[tokio::test]
async fn test_end_to_end_crash_feeds_stderr_back() {
    let crashing = r#"# import ezdxf
# import os
# output_dir = os.environ.get('OUTPUT_DIR')
# doc.saveas
echo 'Traceback: something broke' >&2
exit 1
"#;
    let gateway = Arc::new(MockGateway::new(vec![
        Ok(fenced(crashing)),
        Ok(fenced(&script_writing("floorplan.dxf"))),
    ]));

    let generation = sh_generator(gateway.clone())
        .generate("loft with mezzanine")
        .await
        .unwrap();

    assert_eq!(generation.attempts, 2);
    assert!(gateway.prompts()[1].contains("Traceback: something broke"));
}

#[tokio::test]
async fn test_end_to_end_exhaustion() {
    let hopeless = r#"# import ezdxf
# import os
# output_dir = os.environ.get('OUTPUT_DIR')
# doc.saveas
exit 2
"#;
    let gateway = Arc::new(MockGateway::new(vec![
        Ok(fenced(hopeless)),
        Ok(fenced(hopeless)),
        Ok(fenced(hopeless)),
    ]));

    let error = sh_generator(gateway.clone())
        .generate("impossible request")
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        PlanBotError::GenerationExhausted { attempts: 3, .. }
    ));
    assert_eq!(gateway.prompts().len(), 3);
}
