//! Lighting rigs. Existing lights are removed first.

use super::{first_match, lines};

const RIGS: &[(&str, &[&str])] = &[
    (
        "studio",
        &[
            "bpy.ops.object.light_add(type='AREA', location=(3, 0, 2))",
            "key_light = bpy.context.active_object",
            "key_light.data.energy = 1000",
            "key_light.data.size = 2",
            "bpy.ops.object.light_add(type='AREA', location=(-3, 0, 2))",
            "fill_light = bpy.context.active_object",
            "fill_light.data.energy = 500",
            "fill_light.data.size = 2",
            "bpy.ops.object.light_add(type='AREA', location=(0, 3, 3))",
            "rim_light = bpy.context.active_object",
            "rim_light.data.energy = 750",
            "rim_light.data.size = 1",
        ],
    ),
    (
        "dramatic",
        &[
            "bpy.ops.object.light_add(type='SPOT', location=(0, 0, 5))",
            "spot = bpy.context.active_object",
            "spot.data.energy = 2000",
            "spot.data.spot_size = 0.5",
        ],
    ),
    (
        "sunset",
        &[
            "bpy.ops.object.light_add(type='SUN', location=(5, 5, 2))",
            "sun = bpy.context.active_object",
            "sun.data.energy = 3.0",
            "sun.data.color = (1.0, 0.5, 0.2)",
            "sun.rotation_euler = (1.4, 0, 0.8)",
        ],
    ),
    (
        "night",
        &[
            "bpy.ops.object.light_add(type='POINT', location=(0, 0, 4))",
            "moon = bpy.context.active_object",
            "moon.data.energy = 100",
            "moon.data.color = (0.4, 0.5, 1.0)",
        ],
    ),
];

const SUN: &[&str] = &[
    "bpy.ops.object.light_add(type='SUN', location=(5, 5, 10))",
    "sun = bpy.context.active_object",
    "sun.data.energy = 5.0",
];

pub fn generate(prompt: &str) -> String {
    let mut out = lines(&[
        "for obj in bpy.context.scene.objects:",
        "    if obj.type == 'LIGHT':",
        "        bpy.data.objects.remove(obj, do_unlink=True)",
    ]);
    out.extend(lines(first_match(prompt, RIGS).copied().unwrap_or(SUN)));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clears_lights_first() {
        assert!(generate("light it").starts_with("for obj in bpy.context.scene.objects:"));
    }

    #[test]
    fn studio_has_three_lights() {
        let s = generate("studio lighting");
        assert_eq!(s.matches("light_add(type='AREA'").count(), 3);
    }

    #[test]
    fn default_is_sun() {
        let s = generate("add some light");
        assert!(s.contains("light_add(type='SUN', location=(5, 5, 10))"));
    }

    #[test]
    fn moods() {
        assert!(generate("dramatic light").contains("type='SPOT'"));
        assert!(generate("sunset light").contains("(1.0, 0.5, 0.2)"));
        assert!(generate("night lighting").contains("type='POINT'"));
    }
}
