//! Prompt construction for the code-generation loop.
//!
//! The prompts are deterministic in structure. The first attempt states the
//! positive contract: required imports, the environment-variable-driven
//! output path, the construction steps, and a skeleton to complete. A retry
//! leads with the previous attempt's concrete failure text and re-enumerates
//! the same checklist, so the model gets a consistent error-correction signal
//! instead of an open-ended "try again".

/// Prompt for the first attempt, before any failure exists.
pub fn initial_prompt(context: &str) -> String {
    format!(
        r#"Based on these requirements:
{context}

Generate Python code that creates a DXF file following these exact steps:
1. Import required libraries:
   - import ezdxf
   - import os

2. Get the output directory from environment variable:
   output_dir = os.environ.get('OUTPUT_DIR')
   if not output_dir:
       raise ValueError('OUTPUT_DIR environment variable is required')

3. Create a new DXF document:
   doc = ezdxf.new()
   msp = doc.modelspace()

4. Add entities to modelspace (walls, doors, windows, furniture)

5. Save the file to the temporary directory:
   output_path = os.path.join(output_dir, 'floorplan.dxf')
   doc.saveas(output_path)

Here's the required code structure:
```python
import ezdxf
import os

# Get output directory from environment variable
output_dir = os.environ.get('OUTPUT_DIR')
if not output_dir:
    raise ValueError('OUTPUT_DIR environment variable is required')

# Create new DXF document
doc = ezdxf.new()

# Get modelspace
msp = doc.modelspace()

# Add entities to modelspace
# [Your implementation here]

# Save the file to the temporary directory
output_path = os.path.join(output_dir, 'floorplan.dxf')
doc.saveas(output_path)
```

Generate the complete code implementing the floor plan based on the requirements. Include all the code between the above template. Make sure to save the file in the provided OUTPUT_DIR directory."#
    )
}

/// Prompt for a retry, carrying the previous failure verbatim.
pub fn retry_prompt(context: &str, previous_error: &str) -> String {
    format!(
        r#"The previous code generated resulted in the following error:
{previous_error}

Please fix the code to address this error. Make sure to include all these required elements:
1. Import ezdxf and os modules
2. Get OUTPUT_DIR from environment variables with error checking
3. Create new DXF document with ezdxf.new()
4. Get modelspace with doc.modelspace()
5. Add walls, doors, windows, and furniture
6. Save the file using doc.saveas(os.path.join(output_dir, 'floorplan.dxf'))

Original requirements:
{context}

Generate the corrected Python code. The file must be saved to the OUTPUT_DIR directory."#
    )
}
