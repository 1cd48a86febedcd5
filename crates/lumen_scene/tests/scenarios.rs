//! End-to-end behaviour of the scene registry

use approx::assert_relative_eq;
use lumen_gpu::{GpuCommand, HeadlessDevice};
use lumen_render::{Camera, DrawBatcher, DrawStats, LightData, MaterialTextures, ModelShader, ShaderCache, ShadowConfig};
use lumen_scene::prelude::*;
use lumen_shader::ShaderConfig;
use lumen_shapes::{GeometryConfig, GeometryLibrary};

fn scene() -> Scene {
    Scene::new(PhysicsConfig::default()).unwrap()
}

fn assert_mat4_eq(actual: Mat4, expected: Mat4) {
    for (a, e) in actual.to_cols_array().iter().zip(expected.to_cols_array()) {
        assert_relative_eq!(*a, e, epsilon = 1e-5);
    }
}

#[test]
fn static_unit_cube_at_origin_has_identity_transform() {
    let mut scene = scene();
    let body = scene
        .add_cube(Placement::default().with_euler(Vec3::ZERO), Vec3::ONE, Material::default(), true)
        .unwrap();
    scene.step();

    let shape = scene.shapes_of(body).unwrap()[0];
    assert_mat4_eq(scene.shape_transform(shape).unwrap(), Mat4::IDENTITY);
}

#[test]
fn compound_offset_is_applied_in_body_space() {
    let mut scene = scene();
    let spec = ShapeSpec::new(ShapeDefinition::cube(Vec3::ONE), Material::default()).with_local_position(Vec3::Y);
    let body = scene.add_compound(Placement::default(), true, &[spec]).unwrap();
    scene.step();

    let shape = scene.shapes_of(body).unwrap()[0];
    let translation = scene.shape_transform(shape).unwrap().w_axis.truncate();
    assert_relative_eq!(translation.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(translation.y, 1.0, epsilon = 1e-6);
    assert_relative_eq!(translation.z, 0.0, epsilon = 1e-6);
}

#[test]
fn raycast_hits_front_of_sphere() {
    let mut scene = scene();
    let body = scene.add_sphere(Placement::default(), 1.0, Material::default(), true).unwrap();
    let shape = scene.shapes_of(body).unwrap()[0];

    let hits = scene.raycast(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].shape, shape);
    assert_relative_eq!(hits[0].point.x, 0.0, epsilon = 1e-4);
    assert_relative_eq!(hits[0].point.y, 0.0, epsilon = 1e-4);
    assert_relative_eq!(hits[0].point.z, 1.0, epsilon = 1e-4);
    assert_relative_eq!(hits[0].distance, 4.0, epsilon = 1e-4);
}

#[test]
fn empty_raycast_is_not_an_error() {
    let mut scene = scene();
    scene.add_sphere(Placement::default(), 1.0, Material::default(), true).unwrap();
    assert!(scene.raycast(Vec3::new(5.0, 0.0, 5.0), Vec3::NEG_Z).is_empty());
}

#[test]
fn compound_scale_matches_composed_matrix() {
    let mut scene = scene();
    let local_position = Vec3::new(0.5, -0.25, 1.0);
    let local_rotation = Quat::from_rotation_x(0.4);
    let spec = ShapeSpec::new(ShapeDefinition::cylinder(0.3, 2.0), Material::default())
        .with_local_position(local_position)
        .with_local_rotation(local_rotation);
    let placement = Placement::new(Vec3::new(2.0, 3.0, -1.0), Quat::from_rotation_y(1.1));
    let body = scene.add_compound(placement, true, &[spec]).unwrap();
    scene.step();

    let shape = scene.shapes_of(body).unwrap()[0];
    let world = Mat4::from_rotation_translation(placement.rotation, placement.position);
    let expected = world
        * Mat4::from_translation(local_position)
        * Mat4::from_quat(local_rotation)
        * Mat4::from_scale(Vec3::new(0.3, 2.0, 0.3));
    assert_mat4_eq(scene.shape_transform(shape).unwrap(), expected);
}

#[test]
fn handles_survive_unrelated_changes() {
    let mut scene = scene();
    let red = Material::colored(Vec3::X);
    let keep = scene.add_cube(Placement::at(Vec3::new(1.0, 2.0, 3.0)), Vec3::ONE, red, true).unwrap();
    let keep_shape = scene.shapes_of(keep).unwrap()[0];
    let before = scene.shape_transform(keep_shape).unwrap();

    let mut others = Vec::new();
    for i in 0..20 {
        others.push(
            scene
                .add_sphere(Placement::at(Vec3::new(i as f32 * 3.0, 10.0, 0.0)), 0.5, Material::default(), true)
                .unwrap(),
        );
    }
    for key in others.iter().step_by(2) {
        scene.remove_body(*key).unwrap();
    }
    scene.add_cone(Placement::at(Vec3::NEG_X * 5.0), 0.5, 1.0, Material::default(), true).unwrap();
    scene.step();

    let body = scene.body(keep).unwrap();
    assert_eq!(body.position(), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(body.rotation(), Quat::IDENTITY);
    assert_eq!(*scene.shape(keep_shape).unwrap().material(), red);
    assert_mat4_eq(scene.shape_transform(keep_shape).unwrap(), before);

    // Odd survivors still resolve, removed ones do not
    for (i, key) in others.iter().enumerate() {
        assert_eq!(scene.body(*key).is_some(), i % 2 == 1);
    }
}

#[test]
fn removing_compound_body_clears_every_shape() {
    let mut scene = scene();
    let specs = [
        ShapeSpec::new(ShapeDefinition::cube(Vec3::ONE), Material::default()),
        ShapeSpec::new(ShapeDefinition::sphere(0.5), Material::default()).with_local_position(Vec3::Y * 2.0),
        ShapeSpec::new(ShapeDefinition::cone(0.5, 1.0), Material::default()).with_local_position(Vec3::Y * 4.0),
    ];
    let body = scene.add_compound(Placement::default(), true, &specs).unwrap();
    let shapes = scene.shapes_of(body).unwrap().to_vec();
    assert_eq!(scene.raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y).len(), 3);

    scene.remove_body(body).unwrap();

    assert_eq!(scene.body_count(), 0);
    assert_eq!(scene.shape_count(), 0);
    assert_eq!(scene.physics().body_count(), 0);
    assert_eq!(scene.physics().collider_count(), 0);
    for kind in GeometryKind::ALL {
        assert!(scene.shapes_of_kind(kind).is_empty());
    }
    for shape in &shapes {
        assert!(scene.shape(*shape).is_none());
        assert!(scene.body_of(*shape).is_none());
    }
    assert!(scene.raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y).is_empty());
}

#[test]
fn dynamic_compound_splits_unit_mass() {
    let mut scene = scene();
    let specs = [
        ShapeSpec::new(ShapeDefinition::cube(Vec3::ONE), Material::default()),
        ShapeSpec::new(ShapeDefinition::cube(Vec3::ONE), Material::default()).with_local_position(Vec3::X * 2.0),
    ];
    let body = scene.add_compound(Placement::at(Vec3::Y * 10.0), false, &specs).unwrap();
    scene.step();

    let handle = scene.body(body).unwrap().physics_handle();
    assert_relative_eq!(scene.physics().body_mass(handle).unwrap(), 1.0, epsilon = 1e-4);
}

#[test]
fn lit_pass_binds_each_geometry_once() {
    let mut device = HeadlessDevice::new();
    let library = GeometryLibrary::new(&mut device, &GeometryConfig::coarse()).unwrap();
    let mut cache = ShaderCache::new();
    let mut shader = ModelShader::new(
        &mut device,
        &mut cache,
        ShaderConfig::new(),
        &MaterialTextures::new(),
        ShadowConfig::default(),
    )
    .unwrap();

    let mut scene = scene();
    for i in 0..5 {
        let x = i as f32 * 3.0;
        scene.add_cube(Placement::at(Vec3::new(x, 0.0, 0.0)), Vec3::ONE, Material::default(), true).unwrap();
        scene.add_sphere(Placement::at(Vec3::new(x, 3.0, 0.0)), 0.5, Material::default(), true).unwrap();
        scene.add_cylinder(Placement::at(Vec3::new(x, 6.0, 0.0)), 0.5, 1.0, Material::default(), true).unwrap();
    }
    scene.step();
    device.clear_commands();

    let mut batcher = DrawBatcher::new();
    batcher.begin_frame();
    let stats = scene.draw(
        &mut device,
        &library,
        &mut shader,
        &mut batcher,
        &Camera::default().frame(),
        &LightData::new(),
    );

    assert_eq!(stats, DrawStats { geometry_binds: 3, draw_calls: 15 });
    assert_eq!(batcher.frame_stats(), stats);
    assert_eq!(device.count(|c| matches!(c, GpuCommand::BindIndexBuffer(_))), 3);
    assert_eq!(device.count(|c| matches!(c, GpuCommand::DrawIndexed(_))), 15);
}
