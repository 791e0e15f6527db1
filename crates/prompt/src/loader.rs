//! Prompt loader for YAML prompt definitions.
//!
//! The two pipeline prompts ship compiled into the binary; a workspace can
//! override either one by placing a file with the same id under
//! `.finstep/prompts/`.

use crate::types::PromptDefinition;
use finstep_core::{AppError, AppResult};
use std::path::Path;

/// Prompt id for the Librarian drafting stage.
pub const LIBRARIAN_PROMPT_ID: &str = "pipeline.librarian";

/// Prompt id for the Guardian review stage.
pub const GUARDIAN_PROMPT_ID: &str = "pipeline.guardian";

const LIBRARIAN_SOURCE: &str = include_str!("../templates/librarian.yml");
const GUARDIAN_SOURCE: &str = include_str!("../templates/guardian.yml");

/// Load a prompt definition by ID.
///
/// Resolution order:
/// 1. Workspace override at `.finstep/prompts/<id>.yml`
/// 2. Compiled-in default (librarian and guardian prompts)
///
/// # Arguments
/// * `workspace_path` - Root workspace directory containing `.finstep/`
/// * `prompt_id` - Prompt identifier (e.g., "pipeline.librarian")
///
/// # Returns
/// A parsed `PromptDefinition` or an error if not found/invalid.
///
/// # Example
/// ```no_run
/// use finstep_prompt::{load_prompt, LIBRARIAN_PROMPT_ID};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let workspace = Path::new(".");
/// let prompt = load_prompt(workspace, LIBRARIAN_PROMPT_ID)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".finstep/prompts")
        .join(format!("{}.yml", prompt_id));

    if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        let definition = parse_prompt(&contents, prompt_id)?;
        tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);
        return Ok(definition);
    }

    let source = builtin_source(prompt_id).ok_or_else(|| {
        AppError::Prompt(format!(
            "Unknown prompt id: {} (no override file and no built-in)",
            prompt_id
        ))
    })?;

    let definition = parse_prompt(source, prompt_id)?;
    tracing::debug!("Loaded built-in prompt: {}", definition.id);
    Ok(definition)
}

/// Look up the compiled-in YAML source for a prompt id.
fn builtin_source(prompt_id: &str) -> Option<&'static str> {
    match prompt_id {
        LIBRARIAN_PROMPT_ID => Some(LIBRARIAN_SOURCE),
        GUARDIAN_PROMPT_ID => Some(GUARDIAN_SOURCE),
        _ => None,
    }
}

/// Parse and validate a prompt definition from YAML source.
fn parse_prompt(source: &str, prompt_id: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(source)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt '{}': {}", prompt_id, e)))?;

    validate_prompt(&definition)?;

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt id mismatch: requested '{}' but definition declares '{}'",
            prompt_id, definition.id
        )));
    }

    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.api_version.is_empty() {
        return Err(AppError::Prompt(
            "Prompt apiVersion cannot be empty".to_string(),
        ));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    // Validate API version format (simple check)
    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    // Every declared variable must appear in the template
    for variable in &def.variables {
        let placeholder = format!("{{{{{}}}}}", variable);
        if !def.template.contains(&placeholder) {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' declares variable '{}' but the template never uses it",
                def.id, variable
            )));
        }
    }

    Ok(())
}
