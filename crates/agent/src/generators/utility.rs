//! Catch-all for instructions no other group claims.

use super::{first_match, lines};

const ACTIONS: &[(&str, &[&str])] = &[
    (
        "clear",
        &[
            "bpy.ops.object.select_all(action='SELECT')",
            "bpy.ops.object.delete()",
        ],
    ),
    ("deselect", &["bpy.ops.object.select_all(action='DESELECT')"]),
    ("select", &["bpy.ops.object.select_all(action='SELECT')"]),
    ("undo", &["bpy.ops.ed.undo()"]),
];

pub fn generate(prompt: &str) -> String {
    let mut out = lines(&[
        "# Utility operation",
        "print('ForgeCore AI: Processing utility request')",
    ]);
    if let Some(action) = first_match(prompt, ACTIONS) {
        out.extend(lines(action));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_request_only_prints() {
        let s = generate("hello");
        assert_eq!(
            s,
            "# Utility operation\nprint('ForgeCore AI: Processing utility request')"
        );
    }

    #[test]
    fn deselect_is_not_select() {
        let s = generate("deselect everything");
        assert!(s.contains("action='DESELECT'"));
        assert!(!s.contains("action='SELECT'"));
    }

    #[test]
    fn clear_and_undo() {
        assert!(generate("clear the scene").contains("bpy.ops.object.delete()"));
        assert!(generate("undo").ends_with("bpy.ops.ed.undo()"));
    }
}
