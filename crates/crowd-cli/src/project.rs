//! Project manifests: which graphs to load, scene objects, and run settings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crowd_core::{MemoryScene, Transform, Vec3};
use crowd_graph::{Graph, GraphDocument};
use crowd_sim::{SimConfig, Simulation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectManifest {
    #[serde(default)]
    pub sim: SimConfig,

    /// Brain graph files, relative to the manifest
    #[serde(default)]
    pub brains: Vec<PathBuf>,

    /// Generation graph file, relative to the manifest
    pub generation: PathBuf,

    /// Scene objects available to ObjectInput nodes
    #[serde(default)]
    pub objects: BTreeMap<String, ObjectSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectSpec {
    #[serde(default)]
    pub position: [f32; 3],

    /// XYZ Euler, degrees
    #[serde(default)]
    pub rotation: [f32; 3],
}

impl ObjectSpec {
    fn transform(&self) -> Transform {
        let [x, y, z] = self.position;
        let [rx, ry, rz] = self.rotation;
        Transform {
            position: Vec3::new(x, y, z),
            rotation: Vec3::new(rx, ry, rz),
            ..Transform::default()
        }
    }
}

/// A manifest with every graph file loaded.
pub struct Project {
    pub manifest: ProjectManifest,
    pub brains: Vec<Graph>,
    pub generation: Graph,
}

impl Project {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project from {}", path.display()))?;
        let manifest: ProjectManifest = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse project from {}", path.display()))?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));

        let brains = manifest
            .brains
            .iter()
            .map(|p| load_graph(&root.join(p)))
            .collect::<Result<Vec<_>>>()?;
        let generation = load_graph(&root.join(&manifest.generation))?;

        Ok(Self {
            manifest,
            brains,
            generation,
        })
    }

    pub fn scene(&self) -> MemoryScene {
        let mut scene = MemoryScene::new();
        for (name, spec) in &self.manifest.objects {
            scene.insert_object(name.clone(), spec.transform());
        }
        scene
    }

    pub fn into_simulation(self) -> Simulation<MemoryScene> {
        let scene = self.scene();
        let mut sim = Simulation::new(self.manifest.sim, scene);
        for brain in self.brains {
            sim.add_brain(brain);
        }
        sim.set_generation(self.generation);
        sim
    }
}

pub fn load_graph(path: &Path) -> Result<Graph> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph from {}", path.display()))?;
    let graph = GraphDocument::from_json(&content)
        .and_then(GraphDocument::into_graph)
        .with_context(|| format!("Failed to load graph from {}", path.display()))?;
    Ok(graph)
}
