//! Procedural scene generation. Scripts seed `random` themselves so a
//! given prompt always builds the same scene.

use super::{first_match, lines};

const CITY: &[&str] = &[
    "import random",
    "random.seed(42)",
    "for x in range(-5, 6):",
    "    for y in range(-5, 6):",
    "        if random.random() < 0.7:",
    "            height = random.uniform(1, 8)",
    "            bpy.ops.mesh.primitive_cube_add(location=(x * 3, y * 3, height / 2))",
    "            building = bpy.context.active_object",
    "            building.scale = (1, 1, height / 2)",
    "            building.name = f'Building_{x}_{y}'",
];

const FOREST: &[&str] = &[
    "import random",
    "random.seed(7)",
    "for i in range(30):",
    "    x = random.uniform(-20, 20)",
    "    y = random.uniform(-20, 20)",
    "    bpy.ops.mesh.primitive_cylinder_add(radius=0.2, depth=2, location=(x, y, 1))",
    "    bpy.context.active_object.name = f'Trunk_{i}'",
    "    bpy.ops.mesh.primitive_cone_add(radius1=1.2, depth=3, location=(x, y, 3.5))",
    "    bpy.context.active_object.name = f'Canopy_{i}'",
];

const SCATTER: &[&str] = &[
    "import random",
    "random.seed(1)",
    "for i in range(50):",
    "    loc = (random.uniform(-10, 10), random.uniform(-10, 10), 0)",
    "    bpy.ops.mesh.primitive_ico_sphere_add(radius=random.uniform(0.2, 0.8), location=loc)",
    "    bpy.context.active_object.name = f'Scatter_{i}'",
];

const TERRAIN: &[&str] = &[
    "bpy.ops.mesh.primitive_plane_add(size=50)",
    "terrain = bpy.context.active_object",
    "terrain.name = 'Terrain'",
    "bpy.ops.object.mode_set(mode='EDIT')",
    "bpy.ops.mesh.subdivide(number_cuts=50)",
    "bpy.ops.object.mode_set(mode='OBJECT')",
    "tex = bpy.data.textures.new('TerrainNoise', type='CLOUDS')",
    "tex.noise_scale = 2.0",
    "displace = terrain.modifiers.new(name='Displace', type='DISPLACE')",
    "displace.texture = tex",
    "displace.strength = 3.0",
];

const KINDS: &[(&str, &[&str])] = &[("city", CITY), ("forest", FOREST), ("scatter", SCATTER)];

pub fn generate(prompt: &str) -> String {
    lines(first_match(prompt, KINDS).copied().unwrap_or(TERRAIN)).join("\n")
}
