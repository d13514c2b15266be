//! Export into an `exports` folder beside the saved .blend file.
//!
//! FBX exports take an engine parameter table: "unreal" bakes the space
//! transform at centimeter scale, "unity" keeps meters.

use super::first_match;

enum Format {
    Fbx,
    Obj,
    Gltf,
}

const FORMATS: &[(&str, Format)] = &[("gltf", Format::Gltf), ("obj", Format::Obj), ("fbx", Format::Fbx)];

const ENGINES: &[(&str, (&str, &str))] = &[
    (
        "unreal",
        (
            "scene_unreal.fbx",
            "global_scale=100.0, apply_unit_scale=True, apply_scale_options='FBX_SCALE_ALL', bake_space_transform=True, use_mesh_modifiers=True, add_leaf_bones=False",
        ),
    ),
    (
        "unity",
        (
            "scene_unity.fbx",
            "global_scale=1.0, apply_unit_scale=True, apply_scale_options='FBX_SCALE_ALL', bake_space_transform=False, use_mesh_modifiers=True, add_leaf_bones=False",
        ),
    ),
];

pub fn generate(prompt: &str) -> String {
    let export = match first_match(prompt, FORMATS).unwrap_or(&Format::Fbx) {
        Format::Gltf => [
            "    out_path = os.path.join(export_dir, 'scene.glb')".to_string(),
            "    bpy.ops.export_scene.gltf(filepath=out_path, export_format='GLB')".to_string(),
        ],
        Format::Obj => [
            "    out_path = os.path.join(export_dir, 'scene.obj')".to_string(),
            "    bpy.ops.wm.obj_export(filepath=out_path)".to_string(),
        ],
        Format::Fbx => match first_match(prompt, ENGINES) {
            Some((file, params)) => [
                format!("    out_path = os.path.join(export_dir, '{file}')"),
                format!("    bpy.ops.export_scene.fbx(filepath=out_path, {params})"),
            ],
            None => [
                "    out_path = os.path.join(export_dir, 'scene.fbx')".to_string(),
                "    bpy.ops.export_scene.fbx(filepath=out_path)".to_string(),
            ],
        },
    };

    let mut out: Vec<String> = [
        "import os",
        "blend_path = bpy.data.filepath",
        "if blend_path:",
        "    export_dir = os.path.join(os.path.dirname(blend_path), 'exports')",
        "    os.makedirs(export_dir, exist_ok=True)",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    out.extend(export);
    out.push("    print(f'ForgeCore AI: Exported to {out_path}')".to_string());
    out.push("else:".to_string());
    out.push("    print('ForgeCore AI: Save the .blend file before exporting')".to_string());

    out.join("\n")
}
