/// WGSL shader shared by the sphere and the sprite: textured, optionally
/// lit by one directional light.
pub const OBJECT_SHADER: &str = r#"
struct TransformationMatrix {
    wvp: mat4x4<f32>,
    world: mat4x4<f32>,
};

struct Material {
    color: vec4<f32>,
    enable_lighting: u32,
};

struct DirectionalLight {
    color: vec4<f32>,
    direction: vec3<f32>,
    intensity: f32,
};

@group(0) @binding(0)
var<uniform> transform: TransformationMatrix;
@group(0) @binding(1)
var<uniform> material: Material;
@group(0) @binding(2)
var<uniform> light: DirectionalLight;
@group(0) @binding(3)
var object_texture: texture_2d<f32>;
@group(0) @binding(4)
var object_sampler: sampler;

struct VertexInput {
    @location(0) position: vec4<f32>,
    @location(1) texcoord: vec2<f32>,
    @location(2) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) texcoord: vec2<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = transform.wvp * vertex.position;
    out.texcoord = vertex.texcoord;
    out.normal = normalize((transform.world * vec4<f32>(vertex.normal, 0.0)).xyz);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(object_texture, object_sampler, in.texcoord);
    if (material.enable_lighting == 0u) {
        return material.color * texel;
    }
    let n_dot_l = saturate(dot(normalize(in.normal), -light.direction));
    let rgb = material.color.rgb * texel.rgb * light.color.rgb * n_dot_l * light.intensity;
    return vec4<f32>(rgb, material.color.a * texel.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_points_present() {
        assert!(OBJECT_SHADER.contains("fn vs_main"));
        assert!(OBJECT_SHADER.contains("fn fs_main"));
    }

    #[test]
    fn bindings_are_dense() {
        for binding in 0..5 {
            assert!(OBJECT_SHADER.contains(&format!("@binding({binding})")));
        }
    }
}
