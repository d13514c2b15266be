//! Camera placement: reuse the scene camera or add one.

use super::{first_match, lines};

const PLACEMENTS: &[(&str, &[&str])] = &[
    (
        "close",
        &[
            "camera.location = (2, -2, 1.5)",
            "camera.rotation_euler = (1.1, 0, 0.785)",
        ],
    ),
    (
        "far",
        &[
            "camera.location = (10, -10, 5)",
            "camera.rotation_euler = (1.1, 0, 0.785)",
        ],
    ),
    (
        "top",
        &[
            "camera.location = (0, 0, 10)",
            "camera.rotation_euler = (0, 0, 0)",
        ],
    ),
];

const DEFAULT_PLACEMENT: &[&str] = &[
    "camera.location = (5, -5, 3)",
    "camera.rotation_euler = (1.1, 0, 0.785)",
];

const LENSES: &[(&str, &str)] = &[
    ("wide", "camera.data.lens = 24"),
    ("telephoto", "camera.data.lens = 85"),
];

pub fn generate(prompt: &str) -> String {
    let mut out = lines(&[
        "camera = bpy.context.scene.camera",
        "if camera is None:",
        "    bpy.ops.object.camera_add()",
        "    camera = bpy.context.active_object",
        "    bpy.context.scene.camera = camera",
    ]);

    let placement = first_match(prompt, PLACEMENTS)
        .copied()
        .unwrap_or(DEFAULT_PLACEMENT);
    out.extend(lines(placement));

    if let Some(lens) = first_match(prompt, LENSES) {
        out.push(lens.to_string());
    }

    out.join("\n")
}
