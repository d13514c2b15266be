//! Mesh primitives with optional modifiers and a flat color.

use super::{first_match, lines, named_color};

struct Primitive {
    add: &'static str,
    name: &'static str,
}

const PRIMITIVES: &[(&str, Primitive)] = &[
    (
        "cube",
        Primitive {
            add: "bpy.ops.mesh.primitive_cube_add(size=2, location=(0, 0, 0))",
            name: "Generated_Cube",
        },
    ),
    (
        "sphere",
        Primitive {
            add: "bpy.ops.mesh.primitive_uv_sphere_add(radius=1, location=(0, 0, 0), segments=32, ring_count=16)",
            name: "Generated_Sphere",
        },
    ),
    (
        "cylinder",
        Primitive {
            add: "bpy.ops.mesh.primitive_cylinder_add(radius=1, depth=2, location=(0, 0, 0))",
            name: "Generated_Cylinder",
        },
    ),
    (
        "cone",
        Primitive {
            add: "bpy.ops.mesh.primitive_cone_add(radius1=1, radius2=0, depth=2, location=(0, 0, 0))",
            name: "Generated_Cone",
        },
    ),
    (
        "plane",
        Primitive {
            add: "bpy.ops.mesh.primitive_plane_add(size=2, location=(0, 0, 0))",
            name: "Generated_Plane",
        },
    ),
    (
        "torus",
        Primitive {
            add: "bpy.ops.mesh.primitive_torus_add(major_radius=1, minor_radius=0.25, location=(0, 0, 0))",
            name: "Generated_Torus",
        },
    ),
    (
        "monkey",
        Primitive {
            add: "bpy.ops.mesh.primitive_monkey_add(size=2, location=(0, 0, 0))",
            name: "Generated_Monkey",
        },
    ),
];

const DEFAULT: Primitive = Primitive {
    add: "bpy.ops.mesh.primitive_cube_add(size=2, location=(0, 0, 0))",
    name: "Generated_Object",
};

/// Modifier statements, appended in this order.
const MODIFIERS: &[(&str, &[&str])] = &[
    (
        "smooth",
        &[
            "modifier = obj.modifiers.new(name='Smooth', type='SUBSURF')",
            "modifier.levels = 2",
        ],
    ),
    (
        "bevel",
        &[
            "bevel = obj.modifiers.new(name='Bevel', type='BEVEL')",
            "bevel.width = 0.1",
        ],
    ),
    (
        "wireframe",
        &[
            "wireframe = obj.modifiers.new(name='Wireframe', type='WIREFRAME')",
            "wireframe.thickness = 0.02",
        ],
    ),
    (
        "array",
        &[
            "array = obj.modifiers.new(name='Array', type='ARRAY')",
            "array.count = 3",
            "array.relative_offset_displace = (1.1, 0, 0)",
        ],
    ),
];

pub fn generate(prompt: &str) -> String {
    let primitive = first_match(prompt, PRIMITIVES).unwrap_or(&DEFAULT);

    let mut out = vec![
        primitive.add.to_string(),
        "obj = bpy.context.active_object".to_string(),
        format!("obj.name = '{}'", primitive.name),
    ];

    for (keyword, statements) in MODIFIERS {
        if prompt.contains(keyword) {
            out.extend(lines(statements));
        }
    }

    if let Some((color_name, rgba)) = named_color(prompt) {
        out.push(format!(
            "mat = bpy.data.materials.new(name='Generated_{}')",
            capitalize(color_name)
        ));
        out.push(format!("mat.diffuse_color = {rgba}"));
        out.push("obj.data.materials.append(mat)".to_string());
    }

    out.join("\n")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
