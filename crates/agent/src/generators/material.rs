//! Principled BSDF materials assigned to the selected meshes.

use super::{first_match, lines, named_color};

/// Surface kinds; the first match wins.
const KINDS: &[(&str, &[&str])] = &[
    (
        "metal",
        &[
            "principled.inputs['Metallic'].default_value = 1.0",
            "principled.inputs['Roughness'].default_value = 0.1",
        ],
    ),
    (
        "plastic",
        &[
            "principled.inputs['Metallic'].default_value = 0.0",
            "principled.inputs['Roughness'].default_value = 0.3",
        ],
    ),
    (
        "glass",
        &[
            "principled.inputs['Transmission'].default_value = 1.0",
            "principled.inputs['IOR'].default_value = 1.45",
        ],
    ),
    (
        "wood",
        &[
            "principled.inputs['Base Color'].default_value = (0.4, 0.25, 0.1, 1)",
            "principled.inputs['Roughness'].default_value = 0.7",
        ],
    ),
    (
        "emission",
        &["principled.inputs['Emission Strength'].default_value = 5.0"],
    ),
];

pub fn generate(prompt: &str) -> String {
    let mut out = lines(&[
        "material = bpy.data.materials.new(name='Generated_Material')",
        "material.use_nodes = True",
        "nodes = material.node_tree.nodes",
        "links = material.node_tree.links",
        "nodes.clear()",
        "principled = nodes.new(type='ShaderNodeBsdfPrincipled')",
        "output = nodes.new(type='ShaderNodeOutputMaterial')",
        "links.new(principled.outputs['BSDF'], output.inputs['Surface'])",
    ]);

    if let Some(statements) = first_match(prompt, KINDS) {
        out.extend(lines(statements));
    }

    if let Some((_, rgba)) = named_color(prompt) {
        out.push(format!("principled.inputs['Base Color'].default_value = {rgba}"));
    }

    out.extend(lines(&[
        "for obj in bpy.context.selected_objects:",
        "    if obj.type == 'MESH':",
        "        if obj.data.materials:",
        "            obj.data.materials[0] = material",
        "        else:",
        "            obj.data.materials.append(material)",
    ]));

    out.join("\n")
}
