use bevy::math::Vec2;
use brunch::{Bench, benches};
use joshua_gen::generation::{RandomStream, SceneStyle, TreePreset, compose_scene, generate_terrain, generate_tree};

fn main() {
    let type_one = TreePreset::TypeI.config().unwrap();
    let pair = SceneStyle::JoshuaPair.params(1600.0, 900.0);
    let grove = SceneStyle::Grove.params(1600.0, 900.0);

    benches!(
        inline:

        Bench::new("terrain_8_iterations")
            .run(|| generate_terrain(
                Vec2::new(0.0, 150.0),
                Vec2::new(1600.0, 170.0),
                1.1,
                Some(100.0),
                8,
                &mut RandomStream::from_seed(41),
            )),

        Bench::new("type_one_tree")
            .run(|| generate_tree(Vec2::ZERO, &type_one, &mut RandomStream::from_seed(41))),

        Bench::new("joshua_pair_scene")
            .run(|| compose_scene(&pair, 41)),

        Bench::new("grove_scene")
            .run(|| compose_scene(&grove, 41)),
    );
}
