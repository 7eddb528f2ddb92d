//! Raw hit collections and their aggregation into serializable groups.

use std::collections::{BTreeMap, HashMap};

use super::graph::ParticleGraph;
use super::record::{SensorHit, Track, TrackSample, WaveformSample};
use crate::util::{DVec3, Error, Result};

/// Kind tag of ionization hit collections.
pub const IONIZATION_KIND: &str = "IonizationHitsCollection";
/// Kind tag of photosensor hit collections.
pub const PMT_KIND: &str = "PmtHitsCollection";

/// Energy deposit left by a track during one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IonizationHit {
    pub track_id: u32,
    pub position: DVec3,
    pub time: f64,
    pub energy_deposit: f64,
}

impl IonizationHit {
    pub fn new(track_id: u32, position: DVec3, time: f64, energy_deposit: f64) -> Self {
        Self { track_id, position, time, energy_deposit }
    }
}

/// Photon arrival histogram of one photosensor.
#[derive(Clone, Debug, PartialEq)]
pub struct PmtHit {
    pub sensor_id: i32,
    pub position: DVec3,
    pub bin_width: f64,
    /// Bin index -> count; bin `i` starts at `i * bin_width`.
    histogram: BTreeMap<i64, u32>,
}

impl PmtHit {
    pub fn new(sensor_id: i32, position: DVec3, bin_width: f64) -> Result<Self> {
        if !bin_width.is_finite() || bin_width <= 0.0 {
            return Err(Error::invalid(format!(
                "sensor {}: bin width must be finite and > 0",
                sensor_id
            )));
        }
        Ok(Self {
            sensor_id,
            position,
            bin_width,
            histogram: BTreeMap::new(),
        })
    }

    /// Count one photon arriving at `time`.
    pub fn fill(&mut self, time: f64) {
        self.fill_n(time, 1);
    }

    /// Count `n` photons arriving at `time`.
    pub fn fill_n(&mut self, time: f64, n: u32) {
        let bin = (time / self.bin_width).floor() as i64;
        let count = self.histogram.entry(bin).or_insert(0);
        *count = count.saturating_add(n);
    }

    /// Waveform samples in time order.
    pub fn samples(&self) -> Vec<WaveformSample> {
        self.histogram
            .iter()
            .map(|(&bin, &count)| WaveformSample {
                bin: bin as f64 * self.bin_width,
                count,
            })
            .collect()
    }

    /// Sum of all bin counts.
    pub fn amplitude(&self) -> u64 {
        self.histogram.values().map(|&c| u64::from(c)).sum()
    }
}

/// Hit payload, tagged by collection kind.
#[derive(Clone, Debug, PartialEq)]
pub enum HitData {
    Ionization(Vec<IonizationHit>),
    Pmt(Vec<PmtHit>),
    /// A kind this crate does not know how to store.
    Unrecognized { kind: String },
}

impl HitData {
    pub fn kind(&self) -> &str {
        match self {
            Self::Ionization(_) => IONIZATION_KIND,
            Self::Pmt(_) => PMT_KIND,
            Self::Unrecognized { kind } => kind,
        }
    }
}

/// Hits recorded by one sensitive detector during an event.
#[derive(Clone, Debug, PartialEq)]
pub struct HitCollection {
    /// Sensitive detector name.
    pub sd_name: String,
    /// Collection name.
    pub name: String,
    pub data: HitData,
}

impl HitCollection {
    pub fn ionization(sd_name: &str, hits: Vec<IonizationHit>) -> Self {
        Self {
            sd_name: sd_name.to_string(),
            name: IONIZATION_KIND.to_string(),
            data: HitData::Ionization(hits),
        }
    }

    pub fn pmt(sd_name: &str, hits: Vec<PmtHit>) -> Self {
        Self {
            sd_name: sd_name.to_string(),
            name: PMT_KIND.to_string(),
            data: HitData::Pmt(hits),
        }
    }

    pub fn unrecognized(sd_name: &str, name: &str, kind: &str) -> Self {
        Self {
            sd_name: sd_name.to_string(),
            name: name.to_string(),
            data: HitData::Unrecognized { kind: kind.to_string() },
        }
    }

    /// `sd_name/name`, as used in diagnostics.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.sd_name, self.name)
    }
}

/// Hit groups produced for one event.
#[derive(Debug, Default)]
pub struct AggregatedHits {
    pub tracks: Vec<Track>,
    pub sensor_hits: Vec<SensorHit>,
    /// Set when an unrecognized collection stopped aggregation early.
    pub abandoned: Option<Error>,
}

/// Groups raw hits by owning track or sensor.
#[derive(Clone, Copy, Debug)]
pub struct HitAggregator {
    event_id: i64,
    store_ionization: bool,
    store_pmt: bool,
}

impl HitAggregator {
    pub fn new(event_id: i64) -> Self {
        Self {
            event_id,
            store_ionization: true,
            store_pmt: true,
        }
    }

    /// Enable or disable the two known collection kinds.
    pub fn with_kinds(mut self, ionization: bool, pmt: bool) -> Self {
        self.store_ionization = ionization;
        self.store_pmt = pmt;
        self
    }

    /// Aggregate `collections` in order, binding ionization groups to nodes of `graph`.
    ///
    /// Disabled kinds are skipped. The first unrecognized collection logs a
    /// warning and ends aggregation: later collections are not visited and
    /// the groups built so far are returned with `abandoned` set. A hit whose
    /// track has no node fails with [`Error::UnknownTrack`].
    #[tracing::instrument(skip_all, fields(event = self.event_id, collections = collections.len()))]
    pub fn aggregate(&self, graph: &mut ParticleGraph, collections: &[HitCollection]) -> Result<AggregatedHits> {
        let mut out = AggregatedHits::default();

        for collection in collections {
            match &collection.data {
                HitData::Ionization(hits) => {
                    if self.store_ionization {
                        self.aggregate_ionization(graph, &collection.sd_name, hits, &mut out.tracks)?;
                    }
                }
                HitData::Pmt(hits) => {
                    if self.store_pmt {
                        self.aggregate_pmt(&collection.sd_name, hits, &mut out.sensor_hits);
                    }
                }
                HitData::Unrecognized { kind } => {
                    tracing::warn!(
                        "Collection of hits '{}' is of an unknown type and will not be stored.",
                        collection.full_name()
                    );
                    out.abandoned = Some(Error::UnknownHitKind {
                        event: self.event_id,
                        collection: collection.full_name(),
                        kind: kind.clone(),
                    });
                    return Ok(out);
                }
            }
        }
        Ok(out)
    }

    /// Groups are keyed per collection: a track seen in two collections owns two groups.
    fn aggregate_ionization(&self, graph: &mut ParticleGraph, sd_name: &str, hits: &[IonizationHit], tracks: &mut Vec<Track>) -> Result<()> {
        let mut groups: HashMap<u32, usize> = HashMap::new();

        for hit in hits {
            let slot = match groups.get(&hit.track_id) {
                Some(&slot) => slot,
                None => {
                    let node = graph.node_mut(hit.track_id).ok_or(Error::UnknownTrack {
                        event: self.event_id,
                        track: hit.track_id,
                    })?;
                    let slot = tracks.len();
                    node.tracks.push(slot);
                    tracks.push(Track {
                        owner_particle_id: hit.track_id,
                        sensor_name: sd_name.to_string(),
                        samples: Vec::new(),
                    });
                    groups.insert(hit.track_id, slot);
                    slot
                }
            };
            tracks[slot].samples.push(TrackSample {
                x: hit.position.x,
                y: hit.position.y,
                z: hit.position.z,
                t: hit.time,
                edep: hit.energy_deposit,
            });
        }
        Ok(())
    }

    fn aggregate_pmt(&self, sd_name: &str, hits: &[PmtHit], sensor_hits: &mut Vec<SensorHit>) {
        sensor_hits.extend(hits.iter().map(|hit| SensorHit {
            sensor_id: hit.sensor_id,
            sensor_name: sd_name.to_string(),
            position: hit.position,
            bin_width: hit.bin_width,
            samples: hit.samples(),
            amplitude: hit.amplitude(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{ParticleDefinition, TrackRecord, TrackStart};
    use crate::util::Vertex;

    fn graph(ids: &[u32]) -> ParticleGraph {
        let records: Vec<TrackRecord> = ids
            .iter()
            .map(|&id| {
                TrackRecord::start(&TrackStart::primary(id, ParticleDefinition::electron(), Vertex::default(), 1.0, DVec3::Z, "ACTIVE"))
            })
            .collect();
        ParticleGraph::build(1, &records).unwrap()
    }

    fn hit(track: u32, edep: f64) -> IonizationHit {
        IonizationHit::new(track, DVec3::new(1.0, 2.0, 3.0), 0.5, edep)
    }

    #[test]
    fn test_ionization_grouped_by_track() {
        let mut g = graph(&[1, 2]);
        let hc = HitCollection::ionization("ACTIVE", vec![hit(1, 0.1), hit(2, 0.2), hit(1, 0.3)]);

        let out = HitAggregator::new(1).aggregate(&mut g, &[hc]).unwrap();
        assert_eq!(out.tracks.len(), 2);
        assert_eq!(out.tracks[0].owner_particle_id, 1);
        assert_eq!(out.tracks[0].samples.len(), 2);
        assert_eq!(out.tracks[1].samples.len(), 1);
        assert_eq!(out.tracks[0].sensor_name, "ACTIVE");
        assert_eq!(g.node(1).unwrap().tracks, vec![0]);
        assert_eq!(g.node(2).unwrap().tracks, vec![1]);
        assert!(out.abandoned.is_none());
    }

    #[test]
    fn test_groups_are_per_collection() {
        let mut g = graph(&[1]);
        let a = HitCollection::ionization("ACTIVE", vec![hit(1, 0.1)]);
        let b = HitCollection::ionization("BUFFER", vec![hit(1, 0.2)]);

        let out = HitAggregator::new(1).aggregate(&mut g, &[a, b]).unwrap();
        assert_eq!(out.tracks.len(), 2);
        assert_eq!(out.tracks[1].sensor_name, "BUFFER");
        assert_eq!(g.node(1).unwrap().tracks, vec![0, 1]);
    }

    #[test]
    fn test_unknown_track() {
        let mut g = graph(&[1]);
        let hc = HitCollection::ionization("ACTIVE", vec![hit(1, 0.1), hit(8, 0.1)]);
        let err = HitAggregator::new(3).aggregate(&mut g, &[hc]).unwrap_err();
        assert!(matches!(err, Error::UnknownTrack { event: 3, track: 8 }));
    }

    #[test]
    fn test_sensor_amplitude_is_sum_of_counts() {
        let mut pmt = PmtHit::new(1005, DVec3::new(0.0, 0.0, -500.0), 1.0).unwrap();
        pmt.fill_n(0.2, 3);
        pmt.fill_n(1.7, 5);
        pmt.fill_n(2.0, 2);

        let mut g = graph(&[]);
        let out = HitAggregator::new(1)
            .aggregate(&mut g, &[HitCollection::pmt("PMT", vec![pmt])])
            .unwrap();

        let sh = &out.sensor_hits[0];
        assert_eq!(sh.sensor_id, 1005);
        assert_eq!(sh.amplitude, 10);
        assert_eq!(
            sh.samples,
            vec![
                WaveformSample { bin: 0.0, count: 3 },
                WaveformSample { bin: 1.0, count: 5 },
                WaveformSample { bin: 2.0, count: 2 },
            ]
        );
    }

    #[test]
    fn test_each_pmt_record_is_its_own_group() {
        let mut a = PmtHit::new(7, DVec3::ZERO, 25.0).unwrap();
        a.fill(10.0);
        let mut b = PmtHit::new(7, DVec3::ZERO, 25.0).unwrap();
        b.fill(60.0);

        let mut g = graph(&[]);
        let out = HitAggregator::new(1)
            .aggregate(&mut g, &[HitCollection::pmt("PMT", vec![a, b])])
            .unwrap();
        assert_eq!(out.sensor_hits.len(), 2);
        assert_eq!(out.sensor_hits[1].samples[0].bin, 50.0);
    }

    #[test]
    fn test_unrecognized_kind_abandons_remaining() {
        let mut g = graph(&[1]);
        let collections = vec![
            HitCollection::ionization("ACTIVE", vec![hit(1, 0.1)]),
            HitCollection::unrecognized("CALO", "CaloHits", "CaloHitsCollection"),
            HitCollection::ionization("BUFFER", vec![hit(1, 0.2)]),
        ];

        let out = HitAggregator::new(4).aggregate(&mut g, &collections).unwrap();
        assert_eq!(out.tracks.len(), 1);
        assert!(matches!(
            out.abandoned,
            Some(Error::UnknownHitKind { event: 4, ref collection, .. }) if collection == "CALO/CaloHits"
        ));
    }

    #[test]
    fn test_disabled_kind_is_skipped() {
        let mut g = graph(&[1]);
        let mut pmt = PmtHit::new(1, DVec3::ZERO, 1.0).unwrap();
        pmt.fill(0.5);
        let collections = vec![
            HitCollection::ionization("ACTIVE", vec![hit(1, 0.1)]),
            HitCollection::pmt("PMT", vec![pmt]),
        ];

        let out = HitAggregator::new(1)
            .with_kinds(false, true)
            .aggregate(&mut g, &collections)
            .unwrap();
        assert!(out.tracks.is_empty());
        assert_eq!(out.sensor_hits.len(), 1);
        assert!(out.abandoned.is_none());
    }

    #[test]
    fn test_rejects_bad_bin_width() {
        assert!(PmtHit::new(1, DVec3::ZERO, 0.0).is_err());
    }
}
