use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use crate::board::{BoardTopology, HexId, NodeId};
use crate::types::Resource;

use super::resources::ResourceBundle;

const MAX_DICE: usize = 12;

/// One hex paying one resource on one dice number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Touch {
    pub number: u8,
    pub resource: Resource,
    pub hex: HexId,
}

/// Multiset of dice numbers and resources a player's buildings touch, kept as three
/// views over the same triples. A city counts every adjacent hex twice; a gold hex
/// pays every resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTouch {
    by_number: [Vec<(Resource, HexId)>; MAX_DICE + 1],
    by_resource: BTreeMap<Resource, Vec<(u8, HexId)>>,
    by_hex: BTreeMap<HexId, Vec<(u8, Resource)>>,
}

impl Default for ResourceTouch {
    fn default() -> Self {
        Self {
            by_number: std::array::from_fn(|_| Vec::new()),
            by_resource: BTreeMap::new(),
            by_hex: BTreeMap::new(),
        }
    }
}

impl ResourceTouch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one copy of every triple the hexes around `node` produce. Settlements call
    /// this once, and a city upgrade once more.
    pub fn add_node(&mut self, topology: &impl BoardTopology, node: NodeId) {
        for touch in touches_of_node(topology, node) {
            self.add(touch);
        }
    }

    /// Removes one copy of every triple `add_node` added for `node`.
    pub fn remove_node(&mut self, topology: &impl BoardTopology, node: NodeId) {
        for touch in touches_of_node(topology, node).into_iter().rev() {
            self.remove(touch);
        }
    }

    /// Adds one copy of `touch`. Returns false, adding nothing, for a number no dice roll makes.
    pub fn add(&mut self, touch: Touch) -> bool {
        let Touch {
            number,
            resource,
            hex,
        } = touch;
        let Some(slot) = self.by_number.get_mut(number as usize) else {
            warn!("hex {hex} has number {number}, which no roll makes; {resource} dropped");
            return false;
        };
        slot.push((resource, hex));
        self.by_resource
            .entry(resource)
            .or_default()
            .push((number, hex));
        self.by_hex.entry(hex).or_default().push((number, resource));
        true
    }

    /// Removes a single matching triple, leaving any other copies in place.
    pub fn remove(&mut self, touch: Touch) -> bool {
        let Touch {
            number,
            resource,
            hex,
        } = touch;
        let Some(slot) = self.by_number.get_mut(number as usize) else {
            return false;
        };
        if !remove_last(slot, &(resource, hex)) {
            return false;
        }
        if let Some(list) = self.by_resource.get_mut(&resource) {
            remove_last(list, &(number, hex));
            if list.is_empty() {
                self.by_resource.remove(&resource);
            }
        }
        if let Some(list) = self.by_hex.get_mut(&hex) {
            remove_last(list, &(number, resource));
            if list.is_empty() {
                self.by_hex.remove(&hex);
            }
        }
        true
    }

    /// Resources paid out on `number`, skipping hex `excluded` (e.g. under the robber).
    pub fn resources_for_number(&self, number: u8, excluded: Option<HexId>) -> ResourceBundle {
        let mut bundle = ResourceBundle::zero();
        if let Some(slot) = self.by_number.get(number as usize) {
            for (resource, hex) in slot {
                if Some(*hex) != excluded {
                    bundle.add(*resource, 1);
                }
            }
        }
        bundle
    }

    /// Dice numbers on which `resource` is paid, skipping hex `excluded`.
    pub fn numbers_for_resource(&self, resource: Resource, excluded: Option<HexId>) -> BTreeSet<u8> {
        self.by_resource
            .get(&resource)
            .into_iter()
            .flatten()
            .filter(|(_, hex)| Some(*hex) != excluded)
            .map(|(number, _)| *number)
            .collect()
    }

    pub fn pairs_for_hex(&self, hex: HexId) -> &[(u8, Resource)] {
        self.by_hex.get(&hex).map(|pairs| pairs.as_slice()).unwrap_or(&[])
    }

    pub fn has_number(&self, number: u8) -> bool {
        self.by_number
            .get(number as usize)
            .is_some_and(|slot| !slot.is_empty())
    }

    pub fn len(&self) -> usize {
        self.by_number.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn touches_of_node(topology: &impl BoardTopology, node: NodeId) -> Vec<Touch> {
    let mut touches = Vec::new();
    for &hex in topology.hexes_of_node(node) {
        let Some((kind, Some(number))) = topology.hex_kind_and_number(hex) else {
            continue;
        };
        for resource in kind.yields() {
            touches.push(Touch {
                number,
                resource,
                hex,
            });
        }
    }
    touches
}

fn remove_last<T: PartialEq>(list: &mut Vec<T>, item: &T) -> bool {
    match list.iter().rposition(|candidate| candidate == item) {
        Some(idx) => {
            list.remove(idx);
            true
        }
        None => false,
    }
}
