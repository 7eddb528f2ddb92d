//! Particle family graph of one event.
//!
//! Nodes live in an arena indexed by track id. Construction takes two
//! passes: every node is created first, then parent links are resolved, so a
//! daughter may appear before its mother in the input.

use std::collections::HashMap;

use super::record::Particle;
use crate::track::TrackRecord;
use crate::util::{DVec3, Error, FourMomentum, Result, Vertex};

/// One particle in the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleNode {
    pub id: u32,
    pub parent_id: u32,
    pub pdg_code: i32,
    pub name: String,
    pub primary: bool,
    pub creator_process: String,
    pub production_vertex: Vertex,
    pub decay_vertex: Option<Vertex>,
    pub initial_momentum: FourMomentum,
    pub decay_momentum: Option<DVec3>,
    pub track_length: f64,
    pub initial_volume: String,
    pub decay_volume: Option<String>,
    pub mother: Option<u32>,
    pub daughters: Vec<u32>,
    /// Indices of the ionization tracks bound to this particle.
    pub tracks: Vec<usize>,
}

impl ParticleNode {
    fn from_record(rec: &TrackRecord) -> Self {
        let decay = rec.decay.as_ref();
        Self {
            id: rec.track_id,
            parent_id: rec.parent_id,
            pdg_code: rec.particle.pdg_code,
            name: rec.particle.name.clone(),
            primary: false,
            creator_process: rec.creator_process.clone(),
            production_vertex: rec.production,
            decay_vertex: decay.map(|d| d.vertex),
            initial_momentum: rec.initial_four_momentum(),
            decay_momentum: decay.map(|d| d.momentum),
            track_length: rec.track_length,
            initial_volume: rec.initial_volume.clone(),
            decay_volume: decay.map(|d| d.volume.clone()),
            mother: None,
            daughters: Vec::new(),
            tracks: Vec::new(),
        }
    }

    fn to_particle(&self) -> Particle {
        Particle {
            id: self.id,
            pdg_code: self.pdg_code,
            name: self.name.clone(),
            primary: self.primary,
            creator_process: self.creator_process.clone(),
            production_vertex: self.production_vertex,
            decay_vertex: self.decay_vertex,
            initial_momentum: self.initial_momentum,
            decay_momentum: self.decay_momentum,
            track_length: self.track_length,
            initial_volume: self.initial_volume.clone(),
            decay_volume: self.decay_volume.clone(),
            mother_id: self.mother,
            daughter_ids: self.daughters.clone(),
            track_indices: self.tracks.clone(),
        }
    }
}

/// Forest of particles for a single event.
#[derive(Clone, Debug, Default)]
pub struct ParticleGraph {
    event_id: i64,
    nodes: Vec<ParticleNode>,
    index: HashMap<u32, usize>,
}

impl ParticleGraph {
    /// Build the graph from the event's finalized records.
    ///
    /// Node order follows `records`. Fails with [`Error::DuplicateTrack`],
    /// [`Error::DanglingParent`] when a parent id has no node (e.g. its
    /// species was never recorded), or [`Error::ParentCycle`].
    #[tracing::instrument(skip_all, fields(event = event_id, records = records.len()))]
    pub fn build(event_id: i64, records: &[TrackRecord]) -> Result<Self> {
        let mut graph = Self {
            event_id,
            nodes: Vec::with_capacity(records.len()),
            index: HashMap::with_capacity(records.len()),
        };

        // Pass 1: one node per record.
        for rec in records {
            if graph.index.insert(rec.track_id, graph.nodes.len()).is_some() {
                return Err(Error::DuplicateTrack {
                    event: event_id,
                    track: rec.track_id,
                });
            }
            graph.nodes.push(ParticleNode::from_record(rec));
        }

        // Pass 2: family links.
        for i in 0..graph.nodes.len() {
            let (id, parent_id) = (graph.nodes[i].id, graph.nodes[i].parent_id);
            if parent_id == 0 {
                graph.nodes[i].primary = true;
                continue;
            }
            let mother = *graph.index.get(&parent_id).ok_or(Error::DanglingParent {
                event: event_id,
                track: id,
                parent: parent_id,
            })?;
            graph.nodes[i].mother = Some(parent_id);
            graph.nodes[mother].daughters.push(id);
        }

        graph.check_acyclic()?;
        tracing::debug!(nodes = graph.nodes.len(), "particle graph built");
        Ok(graph)
    }

    /// Every mother chain must reach a primary within `len` steps.
    fn check_acyclic(&self) -> Result<()> {
        let limit = self.nodes.len();
        for node in &self.nodes {
            let mut current = node;
            let mut steps = 0;
            while let Some(mother) = current.mother {
                steps += 1;
                if steps > limit {
                    return Err(Error::ParentCycle {
                        event: self.event_id,
                        track: node.id,
                    });
                }
                current = &self.nodes[self.index[&mother]];
            }
        }
        Ok(())
    }

    pub fn event_id(&self) -> i64 {
        self.event_id
    }

    pub fn node(&self, id: u32) -> Option<&ParticleNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: u32) -> Option<&mut ParticleNode> {
        self.index.get(&id).map(|&i| &mut self.nodes[i])
    }

    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    /// Nodes in construction order.
    pub fn nodes(&self) -> &[ParticleNode] {
        &self.nodes
    }

    pub fn primaries(&self) -> impl Iterator<Item = &ParticleNode> {
        self.nodes.iter().filter(|n| n.primary)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serializable particles in construction order.
    pub fn to_particles(&self) -> Vec<Particle> {
        self.nodes.iter().map(ParticleNode::to_particle).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{ParticleDefinition, TrackFinish, TrackStart, TrackingAction};

    fn records(links: &[(u32, u32)]) -> Vec<TrackRecord> {
        links
            .iter()
            .map(|&(id, parent)| {
                let start = if parent == 0 {
                    TrackStart::primary(id, ParticleDefinition::electron(), Vertex::default(), 1.0, DVec3::Z, "ACTIVE")
                } else {
                    TrackStart::secondary(id, parent, "eIoni", ParticleDefinition::electron(), Vertex::default(), 0.1, DVec3::Z, "ACTIVE")
                };
                TrackRecord::start(&start)
            })
            .collect()
    }

    #[test]
    fn test_daughter_before_mother() {
        let graph = ParticleGraph::build(0, &records(&[(3, 2), (2, 1), (1, 0)])).unwrap();

        assert_eq!(graph.len(), 3);
        assert!(graph.node(1).unwrap().primary);
        assert_eq!(graph.node(1).unwrap().daughters, vec![2]);
        assert_eq!(graph.node(2).unwrap().daughters, vec![3]);
        assert_eq!(graph.node(3).unwrap().mother, Some(2));
        assert_eq!(graph.nodes().iter().map(|n| n.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn test_missing_mother() {
        let err = ParticleGraph::build(5, &records(&[(1, 0), (4, 3)])).unwrap_err();
        assert!(matches!(err, Error::DanglingParent { event: 5, track: 4, parent: 3 }));
    }

    #[test]
    fn test_duplicate_ids() {
        let err = ParticleGraph::build(0, &records(&[(1, 0), (1, 0)])).unwrap_err();
        assert!(matches!(err, Error::DuplicateTrack { track: 1, .. }));
    }

    #[test]
    fn test_cycle_rejected() {
        let err = ParticleGraph::build(0, &records(&[(1, 2), (2, 1)])).unwrap_err();
        assert!(matches!(err, Error::ParentCycle { .. }));
    }

    #[test]
    fn test_nodes_copy_finished_kinematics() {
        let mut action = TrackingAction::new();
        action.begin_event(9);
        action
            .on_track_start(&TrackStart::primary(1, ParticleDefinition::gamma(), Vertex::default(), 2.0, DVec3::Y, "GAS"))
            .unwrap();
        let end = Vertex::new(DVec3::new(0.0, 10.0, 0.0), 0.03);
        action
            .on_track_finish(&TrackFinish::new(1, end, DVec3::ZERO, 10.0, "ANODE"))
            .unwrap();

        let graph = ParticleGraph::build(9, &action.end_event()).unwrap();
        let node = graph.node(1).unwrap();
        assert_eq!(node.decay_vertex, Some(end));
        assert_eq!(node.decay_volume.as_deref(), Some("ANODE"));
        assert!((node.initial_momentum.momentum.y - 2.0).abs() < 1e-12);
        assert!((node.initial_momentum.energy - 2.0).abs() < 1e-12);
        assert_eq!(node.track_length, 10.0);
    }
}
