//! Scene statistics, printed from inside Blender.

pub fn generate(_prompt: &str) -> String {
    [
        "objects = bpy.context.scene.objects",
        "meshes = [o for o in objects if o.type == 'MESH']",
        "lights = [o for o in objects if o.type == 'LIGHT']",
        "cameras = [o for o in objects if o.type == 'CAMERA']",
        "print(f'Objects: {len(objects)}, Meshes: {len(meshes)}, Lights: {len(lights)}, Cameras: {len(cameras)}')",
    ]
    .join("\n")
}
