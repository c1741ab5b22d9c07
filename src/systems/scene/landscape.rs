use bevy::prelude::*;
use bevy::sprite::AlphaMode2d;

use super::mesh_gen;
use super::*;
use crate::generation::{Scene, TreeKind, compose_scene};

// entity hierarchy components
#[derive(Component)]
pub struct SceneRoot {
    pub seed: u64,
    pub style: SceneStyle,
}

// one entity per layer, back to front
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub enum Layer {
    Sky,
    Stars,
    Sun,
    Terrain,
    Tree { index: usize, kind: TreeKind },
}

impl Layer {
    pub fn z(&self) -> f32 {
        match self {
            Layer::Sky => SKY_Z,
            Layer::Stars => STARS_Z,
            Layer::Sun => SUN_Z,
            Layer::Terrain => TERRAIN_Z,
            Layer::Tree { index, .. } => TREES_Z + *index as f32 * TREE_Z_STEP,
        }
    }
}

// turns a composed scene into meshes under a single root entity
pub fn spawn_scene(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<ColorMaterial>>,
    scene: &Scene,
) -> usize {
    // every layer blends, so triangles paint in index order within a mesh
    let material = materials.add(ColorMaterial {
        alpha_mode: AlphaMode2d::Blend,
        ..default()
    });

    let root = commands
        .spawn((
            SceneRoot {
                seed: scene.seed,
                style: scene.style,
            },
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    let mut layers = vec![(Layer::Sky, mesh_gen::sky_mesh(scene.sky, scene.width, scene.height))];
    if !scene.stars.is_empty() {
        layers.push((Layer::Stars, mesh_gen::stars_mesh(&scene.stars)));
    }
    if let Some(sun) = &scene.sun {
        layers.push((Layer::Sun, mesh_gen::sun_mesh(sun)));
    }
    layers.push((Layer::Terrain, mesh_gen::terrain_mesh(&scene.terrain, scene.terrain_colour)));

    let mut triangles = 0;
    for (index, tree) in scene.trees.iter().enumerate() {
        let buffers = mesh_gen::tree_buffers(&tree.drawing);
        triangles += buffers.triangle_count();
        layers.push((Layer::Tree { index, kind: tree.kind }, buffers.into_mesh()));
    }

    for (layer, mesh) in layers {
        let child = commands
            .spawn((
                layer,
                Mesh2d(meshes.add(mesh)),
                MeshMaterial2d(material.clone()),
                Transform::from_xyz(0.0, 0.0, layer.z()),
            ))
            .id();
        commands.entity(root).add_children(&[child]);
    }

    triangles
}

pub fn generate_scene(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<ColorMaterial>>,
    seed: u64,
    settings: &SceneSettings,
    stats: &mut SceneStats,
) -> bool {
    match compose_scene(&settings.0, seed) {
        Ok(scene) => {
            let triangles = spawn_scene(commands, meshes, materials, &scene);
            info!(
                "generated {} scene with seed {}: {} trees, {} triangles",
                scene.style.name(),
                seed,
                scene.trees.len(),
                triangles
            );
            *stats = SceneStats {
                sky: scene.sky.name,
                trees: scene.trees.len(),
                commands: scene.command_count(),
                triangles,
                last_error: None,
            };
            true
        }
        Err(e) => {
            error!("scene generation failed for seed {}: {}", seed, e);
            stats.last_error = Some(e.to_string());
            false
        }
    }
}

pub fn generate_initial(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    seed: Res<Seed>,
    settings: Res<SceneSettings>,
    mut stats: ResMut<SceneStats>,
) {
    generate_scene(&mut commands, &mut meshes, &mut materials, seed.0, &settings, &mut stats);
}

pub fn handle_regeneration(
    mut commands: Commands,
    mut events: EventReader<RegenerateEvent>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut seed: ResMut<Seed>,
    settings: Res<SceneSettings>,
    mut stats: ResMut<SceneStats>,
    query: Query<Entity, With<SceneRoot>>,
) {
    // several slider changes in one frame only need one rebuild
    let Some(event) = events.read().last() else {
        return;
    };

    // the old scene stays up if the new one cannot be built
    let previous: Vec<Entity> = query.iter().collect();
    if generate_scene(&mut commands, &mut meshes, &mut materials, event.seed, &settings, &mut stats) {
        for entity in previous {
            commands.entity(entity).try_despawn();
        }
        seed.0 = event.seed;
    }
}
