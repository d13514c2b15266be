//! Scene layout: a collection, a default camera and sun, and an
//! arrangement of the existing meshes.

use super::{first_match, lines};

const ARRANGEMENTS: &[(&str, &[&str])] = &[
    (
        "circle",
        &[
            "import math",
            "objects = [obj for obj in bpy.context.scene.objects if obj.type == 'MESH']",
            "for i, obj in enumerate(objects):",
            "    angle = 2 * math.pi * i / max(len(objects), 1)",
            "    obj.location = (math.cos(angle) * 5, math.sin(angle) * 5, 0)",
        ],
    ),
    (
        "line",
        &[
            "objects = [obj for obj in bpy.context.scene.objects if obj.type == 'MESH']",
            "for i, obj in enumerate(objects):",
            "    obj.location = (i * 3, 0, 0)",
        ],
    ),
];

const GRID: &[&str] = &[
    "objects = [obj for obj in bpy.context.scene.objects if obj.type == 'MESH']",
    "for i, obj in enumerate(objects):",
    "    row = i // 3",
    "    col = i % 3",
    "    obj.location = (col * 3, row * 3, 0)",
];

pub fn generate(prompt: &str) -> String {
    let mut out = lines(&[
        "layout_collection = bpy.data.collections.new('Layout_Collection')",
        "bpy.context.scene.collection.children.link(layout_collection)",
        "if not bpy.data.cameras:",
        "    bpy.ops.object.camera_add(location=(5, -5, 3))",
        "    camera = bpy.context.active_object",
        "    camera.rotation_euler = (1.1, 0, 0.785)",
        "    bpy.context.scene.camera = camera",
        "if not bpy.data.lights:",
        "    bpy.ops.object.light_add(type='SUN', location=(5, 5, 10))",
        "    sun = bpy.context.active_object",
        "    sun.data.energy = 5.0",
    ]);

    let arrangement = first_match(prompt, ARRANGEMENTS).copied().unwrap_or(GRID);
    out.extend(lines(arrangement));

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_default() {
        let s = generate("organize the layout");
        assert!(s.contains("row = i // 3"));
        assert!(s.contains("Layout_Collection"));
        assert!(s.contains("light_add(type='SUN'"));
    }

    #[test]
    fn circle_arrangement() {
        let s = generate("arrange in a circle");
        assert!(s.starts_with("layout_collection"));
        assert!(s.contains("math.cos(angle) * 5"));
        assert!(!s.contains("row = i // 3"));
    }

    #[test]
    fn line_arrangement() {
        assert!(generate("position them in a line").contains("obj.location = (i * 3, 0, 0)"));
    }
}
