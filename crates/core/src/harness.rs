//! Safety harness: the try/except envelope around generated scripts.
//!
//! The host runs script text as-is, so every leaf script is wrapped once
//! so that a host-side failure prints a message instead of aborting.

/// First line of every wrapped script.
pub const HEADER: &str = "# ForgeCore AI Generated Code";

/// Wrap `code` in the harness, indenting every line by four spaces.
pub fn wrap(code: &str) -> String {
    let body = code
        .split('\n')
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n");

    [
        HEADER,
        "try:",
        &body,
        "    print('ForgeCore AI: Code executed successfully')",
        "except Exception as e:",
        "    print(f'ForgeCore AI: Error executing code: {e}')",
    ]
    .join("\n")
}

/// Diagnostic script returned in place of a result when handling faults.
pub fn diagnostic(message: &str) -> String {
    format!("# Error processing prompt: {message}\nprint('ForgeCore AI: Error occurred')")
}

/// Whether `text` already carries the harness.
pub fn is_wrapped(text: &str) -> bool {
    text.starts_with(HEADER)
}
