//! Keyframed motion over frames 1..=120 for the selected meshes.

use super::{first_match, lines};

const MOTIONS: &[(&str, &[&str])] = &[
    (
        "rotate",
        &[
            "        obj.keyframe_insert(data_path='rotation_euler', frame=1)",
            "        obj.rotation_euler.z += 6.283185",
            "        obj.keyframe_insert(data_path='rotation_euler', frame=120)",
        ],
    ),
    (
        "scale",
        &[
            "        base = obj.scale.copy()",
            "        obj.keyframe_insert(data_path='scale', frame=1)",
            "        obj.scale = base * 1.5",
            "        obj.keyframe_insert(data_path='scale', frame=60)",
            "        obj.scale = base",
            "        obj.keyframe_insert(data_path='scale', frame=120)",
        ],
    ),
];

const BOUNCE: &[&str] = &[
    "        obj.keyframe_insert(data_path='location', frame=1)",
    "        obj.location.z += 2",
    "        obj.keyframe_insert(data_path='location', frame=60)",
    "        obj.location.z -= 2",
    "        obj.keyframe_insert(data_path='location', frame=120)",
];

pub fn generate(prompt: &str) -> String {
    let mut out = lines(&[
        "bpy.context.scene.frame_start = 1",
        "bpy.context.scene.frame_end = 120",
        "for obj in bpy.context.selected_objects:",
        "    if obj.type == 'MESH':",
    ]);
    out.extend(lines(first_match(prompt, MOTIONS).copied().unwrap_or(BOUNCE)));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounce_is_default() {
        let s = generate("animate it");
        assert!(s.contains("frame_end = 120"));
        assert!(s.contains("obj.location.z += 2"));
    }

    #[test]
    fn rotate_and_scale() {
        assert!(generate("rotate animation").contains("rotation_euler.z += 6.283185"));
        assert!(generate("scale keyframe").contains("obj.scale = base * 1.5"));
    }
}
