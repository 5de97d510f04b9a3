//! Proxy geometry generators.

use std::f32::consts::{PI, TAU};

use glamx::Vec3;

use super::MeshData;

/// Sphere used as the per-point proxy of instanced point clouds.
///
/// `detail` follows the usual "segments" notion of scene libraries: 1 is the coarsest
/// usable sphere. Each pole is a single vertex and there is no uv seam, proxies are
/// never textured.
pub fn point_proxy_sphere(diameter: f32, detail: u32) -> MeshData {
    let bands = detail.max(1) + 1;
    let around = bands * 2;
    let radius = diameter * 0.5;

    let mut directions = Vec::with_capacity((2 + (bands - 1) * around) as usize);
    directions.push(Vec3::Y);
    for band in 1..bands {
        let (sin_lat, cos_lat) = (band as f32 * PI / bands as f32).sin_cos();
        directions.extend((0..around).map(|step| {
            let (sin_lon, cos_lon) = (step as f32 * TAU / around as f32).sin_cos();
            Vec3::new(sin_lat * cos_lon, cos_lat, sin_lat * sin_lon)
        }));
    }
    directions.push(Vec3::NEG_Y);

    let north = 0;
    let south = directions.len() as u32 - 1;
    // first vertex of latitude ring `ring`, counted from 0 below the north pole
    let ring_start = |ring: u32| 1 + ring * around;

    let mut indices = Vec::with_capacity((around * (bands - 1) * 6) as usize);
    for step in 0..around {
        let next = (step + 1) % around;

        indices.extend_from_slice(&[north, ring_start(0) + step, ring_start(0) + next]);

        for ring in 0..bands - 2 {
            let (upper, lower) = (ring_start(ring), ring_start(ring + 1));
            indices.extend_from_slice(&[upper + step, lower + step, upper + next]);
            indices.extend_from_slice(&[upper + next, lower + step, lower + next]);
        }

        let last = ring_start(bands - 2);
        indices.extend_from_slice(&[last + step, south, last + next]);
    }

    let normals = directions.iter().flat_map(|d| d.to_array()).collect();
    let positions = directions
        .iter()
        .flat_map(|d| (*d * radius).to_array())
        .collect();

    MeshData::from_parts_unchecked(positions, normals, indices, None)
}
