use std::fs;

use fields::FieldManager;
use geometry::{Geometry, Material, Mesh, Solid};
use particle::{Neutron, Particle, RunSettings, SimRng, StopId};
use rand::SeedableRng;
use simulation::{MonteCarlo, SimulationContext};

fn temp_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("ucntrack-{tag}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_ensemble_writes_one_end_row_per_particle() {
    let out_dir = temp_dir("ensemble");
    let context = SimulationContext::new(7, &out_dir, 123);
    let settings = RunSettings {
        t_max: 0.5,
        log_end: true,
        ..RunSettings::default()
    };

    let chamber = Solid::new(
        2,
        "chamber",
        Material::default(),
        Mesh::cuboid([0.0; 3], [1.0; 3]),
    );
    let geometry = Geometry::new(Solid::vacuum(), vec![chamber]).unwrap();
    let fields = FieldManager::default();

    let mut rng = SimRng::seed_from_u64(1);
    let particles: Vec<Particle> = (0..8u64)
        .map(|i| {
            let mut p = Particle::new(
                i + 1,
                Box::new(Neutron),
                0.0,
                [0.5, 0.5, 0.5, 1.0 + i as f64 * 0.1, 0.4, 0.2],
                1,
                &mut rng,
            );
            // Pin the lifetime so no drawn τ can end a trajectory early.
            p.tau = f64::INFINITY;
            p
        })
        .collect();

    let mut monte_carlo = MonteCarlo::new(context, settings, particles);
    monte_carlo.run(&geometry, &fields).unwrap();

    // Mirror walls keep every neutron alive to t_max.
    for p in &monte_carlo.particles {
        assert_eq!(p.stop_id, StopId::NotFinished);
        assert!(p.hits > 0);
    }

    let end_file = out_dir.join("00000007_neutron_end.out");
    let content = fs::read_to_string(&end_file).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert!(lines[0].starts_with("jobnumber particle tstart"));
    assert_eq!(lines.len(), 1 + 8);
    // Every row carries the job number and a stop code of −1.
    for row in &lines[1..] {
        let cols: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(cols[0], "7");
        assert_eq!(cols[22], "-1");
    }

    fs::remove_dir_all(&out_dir).unwrap();
}

#[test]
fn test_hit_log_is_time_ordered_per_particle() {
    let out_dir = temp_dir("hits");
    let context = SimulationContext::new(3, &out_dir, 99);
    let settings = RunSettings {
        t_max: 2.0,
        log_end: true,
        log_hits: true,
        ..RunSettings::default()
    };

    let chamber = Solid::new(
        2,
        "chamber",
        Material::default(),
        Mesh::cuboid([0.0; 3], [1.0; 3]),
    );
    let geometry = Geometry::new(Solid::vacuum(), vec![chamber]).unwrap();
    let fields = FieldManager::default();

    let mut rng = SimRng::seed_from_u64(2);
    let mut neutron = Particle::new(
        1,
        Box::new(Neutron),
        0.0,
        [0.5, 0.5, 0.5, 2.0, 0.0, 0.0],
        1,
        &mut rng,
    );
    neutron.tau = f64::INFINITY;
    let particles = vec![neutron];

    let mut monte_carlo = MonteCarlo::new(context, settings, particles);
    monte_carlo.run(&geometry, &fields).unwrap();

    let hit_file = out_dir.join("00000003_neutron_hit.out");
    let content = fs::read_to_string(&hit_file).unwrap();
    let mut previous = f64::NEG_INFINITY;
    for row in content.lines().skip(1) {
        let t: f64 = row.split_whitespace().nth(2).unwrap().parse().unwrap();
        assert!(t >= previous);
        previous = t;
    }
    assert!(monte_carlo.particles[0].hits >= 4);

    fs::remove_dir_all(&out_dir).unwrap();
}
