//! End-to-end exercise of the replication graph against a realistic class
//! hierarchy: configuration parsing, classification, parameter derivation,
//! routing and per-viewer gathering in one scenario.

use kestrel_replication::{
    EntityInfo, ReplicationGraphBuilder, RoutingPolicy, ViewerInfo,
};
use kestrel_reflect::{
    RelevanceFlags, ReplicationDefaults, TypeDescriptor, TypeId, TypeRegistry,
};
use kestrel_shared::{EntityId, Vec2, Vec3};

const TICK_RATE: f32 = 30.0;

struct Classes {
    registry: TypeRegistry,
    game_info: TypeId,
    pawn: TypeId,
    hero_pawn: TypeId,
    projectile: TypeId,
    debug_actor: TypeId,
    skeleton: TypeId,
}

/// A miniature game class hierarchy:
///
/// ```text
/// Actor (not replicated)
/// ├── GameInfo      always-relevant, 5 Hz
/// ├── Pawn          spatialized, 10 Hz
/// │   └── HeroPawn  identical flags to Pawn
/// ├── Projectile    spatialized, 30 Hz
/// └── DebugActor    spatialized defaults, forced off by config
/// SKEL_Pawn         hot-reload artifact, spatialized defaults
/// ```
fn build_classes() -> Classes {
    let mut registry = TypeRegistry::new();

    let actor = registry.register(TypeDescriptor::new("Actor").with_defaults(
        ReplicationDefaults::new(RelevanceFlags::default(), 0.0, 0.0),
    ));

    let spatial = |freq: f32| ReplicationDefaults::new(RelevanceFlags::replicated(), 2.25e9, freq);

    let game_info = registry.register(
        TypeDescriptor::new("GameInfo")
            .with_parent(actor)
            .with_defaults(ReplicationDefaults::new(
                RelevanceFlags::always_relevant(),
                0.0,
                5.0,
            )),
    );
    let pawn = registry.register(
        TypeDescriptor::new("Pawn")
            .with_parent(actor)
            .with_defaults(spatial(10.0)),
    );
    let hero_pawn = registry.register(
        TypeDescriptor::new("HeroPawn")
            .with_parent(pawn)
            .with_defaults(spatial(10.0)),
    );
    let projectile = registry.register(
        TypeDescriptor::new("Projectile")
            .with_parent(actor)
            .with_defaults(spatial(30.0)),
    );
    let debug_actor = registry.register(
        TypeDescriptor::new("DebugActor")
            .with_parent(actor)
            .with_defaults(spatial(10.0)),
    );
    let skeleton = registry.register(TypeDescriptor::new("SKEL_Pawn").with_defaults(spatial(10.0)));

    Classes {
        registry,
        game_info,
        pawn,
        hero_pawn,
        projectile,
        debug_actor,
        skeleton,
    }
}

const CONFIG: &str = r#"
grid_cell_size = 10000.0
spatial_bias_x = -150000.0
spatial_bias_y = -200000.0
disable_spatial_rebuilding = true

[[policy_overrides]]
class = "DebugActor"
policy = "NotRouted"

[[parameter_overrides]]
class = "Pawn"
cull_distance_squared = 90000000000.0
"#;

#[test]
fn test_classification_matches_class_intent() {
    let classes = build_classes();
    let graph = ReplicationGraphBuilder::from_toml_str(CONFIG)
        .expect("config should parse")
        .build(&classes.registry, TICK_RATE);

    let registry = &classes.registry;
    assert_eq!(
        graph.policy_for(registry, classes.game_info),
        RoutingPolicy::RelevantAllConnections
    );
    assert_eq!(
        graph.policy_for(registry, classes.pawn),
        RoutingPolicy::SpatializeDynamic
    );
    // HeroPawn carries identical flags to Pawn: no entry of its own, but it
    // resolves through the ancestor chain.
    assert_eq!(graph.policy_map().entry(classes.hero_pawn), None);
    assert_eq!(
        graph.policy_for(registry, classes.hero_pawn),
        RoutingPolicy::SpatializeDynamic
    );
    // The config turned DebugActor off despite spatialized defaults.
    assert_eq!(
        graph.policy_for(registry, classes.debug_actor),
        RoutingPolicy::NotRouted
    );
    // Hot-reload artifacts never classify.
    assert_eq!(graph.policy_map().entry(classes.skeleton), None);
}

#[test]
fn test_parameter_derivation_and_override() {
    let classes = build_classes();
    let graph = ReplicationGraphBuilder::from_toml_str(CONFIG)
        .expect("config should parse")
        .build(&classes.registry, TICK_RATE);

    let registry = &classes.registry;

    // Explicit Pawn override: tuned cull distance, period defaults to one
    // tick, and it covers HeroPawn through the hierarchy.
    let pawn_params = graph.parameters_for(registry, classes.pawn);
    assert!((pawn_params.cull_distance_squared - 9.0e10).abs() < 1.0);
    assert_eq!(pawn_params.replication_period_ticks, 1);
    assert_eq!(
        graph.parameters_for(registry, classes.hero_pawn),
        pawn_params
    );

    // Projectile derives: 30 Hz at a 30-tick rate is every tick.
    let projectile_params = graph.parameters_for(registry, classes.projectile);
    assert_eq!(projectile_params.replication_period_ticks, 1);
    assert!((projectile_params.cull_distance_squared - 2.25e9).abs() < 1.0);

    // GameInfo derives a 6-tick period and no cull distance (not
    // spatialized).
    let info_params = graph.parameters_for(registry, classes.game_info);
    assert_eq!(info_params.replication_period_ticks, 6);
    assert!(info_params.cull_distance_squared.abs() < f32::EPSILON);
}

#[test]
fn test_spawn_move_despawn_and_gather() {
    let classes = build_classes();
    let mut graph = ReplicationGraphBuilder::from_toml_str(CONFIG)
        .expect("config should parse")
        .build(&classes.registry, TICK_RATE);
    let registry = &classes.registry;

    let hero = EntityInfo {
        entity: EntityId::new(1),
        type_id: classes.hero_pawn,
        position: Vec3::new(1_000.0, 1_000.0, 0.0),
    };
    let far_projectile = EntityInfo {
        entity: EntityId::new(2),
        type_id: classes.projectile,
        position: Vec3::new(120_000.0, 120_000.0, 0.0),
    };
    let match_state = EntityInfo {
        entity: EntityId::new(3),
        type_id: classes.game_info,
        position: Vec3::ZERO,
    };
    let debug_probe = EntityInfo {
        entity: EntityId::new(4),
        type_id: classes.debug_actor,
        position: Vec3::new(1_000.0, 1_000.0, 0.0),
    };

    graph.on_entity_added(registry, &hero);
    graph.on_entity_added(registry, &far_projectile);
    graph.on_entity_added(registry, &match_state);
    graph.on_entity_added(registry, &debug_probe);

    // GameInfo is globally relevant through the dedicated node, not the
    // grid; the lifecycle system registers it explicitly.
    graph.always_relevant_node_mut().add(match_state.entity);
    assert_eq!(graph.grid_node().membership_count(), 2);

    let viewer = ViewerInfo {
        position: Vec3::new(0.0, 0.0, 0.0),
        view_radius: 15_000.0,
    };
    let mut gathered = graph.gather_relevant(&viewer);
    gathered.sort_unstable();
    assert_eq!(gathered, vec![hero.entity, match_state.entity]);
    graph.recycle(gathered);

    // The projectile flies into view.
    graph
        .grid_node_mut()
        .update_position(far_projectile.entity, Vec2::new(5_000.0, 5_000.0));
    let mut gathered = graph.gather_relevant(&viewer);
    gathered.sort_unstable();
    assert_eq!(
        gathered,
        vec![hero.entity, far_projectile.entity, match_state.entity]
    );
    graph.recycle(gathered);

    // Despawn drops grid membership; the global node is managed by its
    // registrar.
    graph.on_entity_removed(registry, &hero);
    graph.on_entity_removed(registry, &far_projectile);
    graph.always_relevant_node_mut().remove(match_state.entity);

    let gathered = graph.gather_relevant(&viewer);
    assert!(gathered.is_empty());
    graph.recycle(gathered);
}

#[test]
fn test_static_and_dormancy_policies_route_through_dispatcher() {
    let classes = build_classes();
    let config = r#"
[[policy_overrides]]
class = "Projectile"
policy = "SpatializeStatic"

[[policy_overrides]]
class = "Pawn"
policy = "SpatializeDormancy"
"#;
    let mut graph = ReplicationGraphBuilder::from_toml_str(config)
        .expect("config should parse")
        .build(&classes.registry, TICK_RATE);
    let registry = &classes.registry;

    assert_eq!(
        graph.policy_for(registry, classes.projectile),
        RoutingPolicy::SpatializeStatic
    );
    assert_eq!(
        graph.policy_for(registry, classes.pawn),
        RoutingPolicy::SpatializeDormancy
    );

    let turret_shell = EntityInfo {
        entity: EntityId::new(10),
        type_id: classes.projectile,
        position: Vec3::new(500.0, 500.0, 0.0),
    };
    let sentry = EntityInfo {
        entity: EntityId::new(11),
        type_id: classes.pawn,
        position: Vec3::new(600.0, 600.0, 0.0),
    };
    let before = graph.grid_node().membership_count();

    graph.on_entity_added(registry, &turret_shell);
    graph.on_entity_added(registry, &sentry);
    assert_eq!(graph.grid_node().membership_count(), before + 2);
    assert!(graph.grid_node().contains(turret_shell.entity));
    assert!(graph.grid_node().contains(sentry.entity));

    // The static entity keeps its insertion cell even when moved.
    graph
        .grid_node_mut()
        .update_position(turret_shell.entity, Vec2::new(50_000.0, 50_000.0));
    let viewer = ViewerInfo {
        position: Vec3::new(0.0, 0.0, 0.0),
        view_radius: 15_000.0,
    };
    let mut gathered = graph.gather_relevant(&viewer);
    gathered.sort_unstable();
    assert_eq!(gathered, vec![turret_shell.entity, sentry.entity]);
    graph.recycle(gathered);

    graph.on_entity_removed(registry, &turret_shell);
    graph.on_entity_removed(registry, &sentry);
    assert_eq!(graph.grid_node().membership_count(), before);
}

#[test]
fn test_partial_parameter_override_keeps_class_cull_distance() {
    let classes = build_classes();
    let config = r#"
[[parameter_overrides]]
class = "Projectile"
update_frequency = 10.0
"#;
    let graph = ReplicationGraphBuilder::from_toml_str(config)
        .expect("config should parse")
        .build(&classes.registry, TICK_RATE);

    // The frequency override rederives the period through the same
    // computation as automatic derivation; the omitted cull distance
    // stays the class's own default instead of zeroing out of view.
    let params = graph.parameters_for(&classes.registry, classes.projectile);
    assert_eq!(params.replication_period_ticks, 3);
    assert!((params.cull_distance_squared - 2.25e9).abs() < 1.0);
}

#[test]
fn test_diagnostics_report_the_pass() {
    let classes = build_classes();
    let graph = ReplicationGraphBuilder::from_toml_str(CONFIG)
        .expect("config should parse")
        .build(&classes.registry, TICK_RATE);

    let diagnostics = graph.diagnostics();
    // GameInfo, Pawn, HeroPawn, Projectile, DebugActor replicate; the
    // artifact and the silent Actor root do not.
    assert_eq!(diagnostics.replicated.len(), 5);
    assert!(diagnostics.replicated.contains(&classes.debug_actor));
    assert!(!diagnostics.replicated.contains(&classes.skeleton));
    // Pawn and Projectile switch spatialization on relative to Actor.
    assert!(diagnostics.newly_spatialized.contains(&classes.pawn));
    assert!(diagnostics.newly_spatialized.contains(&classes.projectile));
    assert!(!diagnostics.newly_spatialized.contains(&classes.hero_pawn));
}
