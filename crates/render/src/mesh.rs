use std::f32::consts::{PI, TAU};

/// Vertex shared by the sphere and the sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 4],
    pub texcoord: [f32; 2],
    pub normal: [f32; 3],
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Unit UV sphere with `subdivision` latitude rings and longitude segments.
///
/// Triangles are clockwise seen from outside (left-handed, +Z into the screen).
pub fn sphere_mesh(subdivision: u32) -> Mesh {
    let sub = subdivision.max(3);
    let lon_every = TAU / sub as f32;
    let lat_every = PI / sub as f32;
    let stride = sub + 1;

    let mut vertices = Vec::with_capacity((stride * stride) as usize);
    for lat_index in 0..=sub {
        let lat = -PI / 2.0 + lat_every * lat_index as f32;
        for lon_index in 0..=sub {
            let lon = lon_every * lon_index as f32;
            let p = [lat.cos() * lon.cos(), lat.sin(), lat.cos() * lon.sin()];
            vertices.push(Vertex {
                position: [p[0], p[1], p[2], 1.0],
                texcoord: [
                    lon_index as f32 / sub as f32,
                    1.0 - lat_index as f32 / sub as f32,
                ],
                normal: p,
            });
        }
    }

    let mut indices = Vec::with_capacity((sub * sub * 6) as usize);
    for lat_index in 0..sub {
        for lon_index in 0..sub {
            let a = lat_index * stride + lon_index;
            let b = a + stride;
            let c = a + 1;
            let d = b + 1;
            indices.extend_from_slice(&[a, b, c, c, b, d]);
        }
    }

    tracing::debug!(
        subdivision = sub,
        vertices = vertices.len(),
        indices = indices.len(),
        "generated sphere mesh"
    );
    Mesh { vertices, indices }
}

/// Screen-space quad with its top-left corner at the origin, y pointing down.
pub fn sprite_mesh(width: f32, height: f32) -> Mesh {
    let normal = [0.0, 0.0, -1.0];
    #[rustfmt::skip]
    let vertices = vec![
        Vertex { position: [0.0,   height, 0.0, 1.0], texcoord: [0.0, 1.0], normal }, // bottom-left
        Vertex { position: [0.0,   0.0,    0.0, 1.0], texcoord: [0.0, 0.0], normal }, // top-left
        Vertex { position: [width, height, 0.0, 1.0], texcoord: [1.0, 1.0], normal }, // bottom-right
        Vertex { position: [width, 0.0,    0.0, 1.0], texcoord: [1.0, 0.0], normal }, // top-right
    ];
    Mesh {
        vertices,
        indices: vec![0, 1, 2, 1, 3, 2],
    }
}
