//! Derivations producing [`GenericValues`] records.

use super::Derivation;
use crate::error::DerivationError;
use crate::record::AnyRecord;
use crate::record::ext::GenericValues;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::path::Path;

pub const FIXED_GROUPING: &str = "generic_values.fixed_grouping";

const DEFAULT_NUM_GROUPS: u32 = 10;

/// Parameters accepted by [`FIXED_GROUPING`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixedGroupingParameters {
    /// Number of groups; values below 1 mean 10.
    pub num_groups: u32,
    /// Groups assigned to every item; values below 1 mean 1.
    pub per_group: u32,
    /// Shuffle the group order on every pass over the groups.
    pub random: bool,
    /// Seed for the shuffle; drawn from the OS when absent.
    pub seed: Option<u64>,
}

/// Spreads items over a fixed number of numbered groups.
///
/// Groups are handed out round-robin, so group sizes never differ by more
/// than one. With `random` set, each pass over the groups uses a fresh
/// permutation. The item path does not influence the result.
#[derive(Debug)]
pub struct FixedGrouping {
    groups: Vec<u32>,
    position: usize,
    per_group: usize,
    rng: Option<StdRng>,
}

impl FixedGrouping {
    pub fn new(parameters: FixedGroupingParameters) -> Self {
        let num_groups = match parameters.num_groups {
            0 => DEFAULT_NUM_GROUPS,
            n => n,
        };
        let groups: Vec<u32> = (0..num_groups).collect();
        let rng = parameters.random.then(|| match parameters.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        });

        Self {
            // Start at the end so the first call begins (and shuffles) a pass.
            position: groups.len(),
            groups,
            per_group: parameters.per_group.max(1) as usize,
            rng,
        }
    }

    fn next_group(&mut self) -> u32 {
        if self.position == self.groups.len() {
            self.position = 0;
            if let Some(rng) = self.rng.as_mut() {
                self.groups.shuffle(rng);
            }
        }
        let group = self.groups[self.position];
        self.position += 1;
        group
    }

    /// Assigns the next `per_group` groups.
    pub fn values(&mut self) -> GenericValues {
        GenericValues {
            numbers: (0..self.per_group).map(|_| self.next_group()).collect(),
            ..GenericValues::default()
        }
    }
}

impl Derivation for FixedGrouping {
    fn derive(&mut self, _path: &Path) -> Result<AnyRecord, DerivationError> {
        Ok(AnyRecord::pack(&self.values())?)
    }
}
