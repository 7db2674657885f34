//! The in-memory store behind the API.

use std::collections::BTreeMap;

use alimapa_core::model::{
    Agent, AgentSeed, House, HousePatch, HouseSeed, School, SchoolPatch, SchoolSeed,
};
use tracing::info;

use crate::StoreError;

/// Working copy of all three record families.
///
/// Ids are assigned sequentially from 1 in seed order and nothing is ever
/// deleted, so ascending id order *is* insertion order. Every read hands out
/// clones: results never alias the store, which keeps the locking story in
/// the server trivial. At a few hundred records the copies are noise.
#[derive(Debug)]
pub struct MemStore {
    schools: BTreeMap<u32, School>,
    houses: BTreeMap<u32, House>,
    agents: BTreeMap<u32, Agent>,
    next_school_id: u32,
    next_house_id: u32,
    next_agent_id: u32,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            schools: BTreeMap::new(),
            houses: BTreeMap::new(),
            agents: BTreeMap::new(),
            next_school_id: 1,
            next_house_id: 1,
            next_agent_id: 1,
        }
    }

    // ── Seeding ──

    /// Bulk-load schools in input order. Visit state always starts clean:
    /// flags false and comments empty, whatever the seed file says. Visit
    /// data lives in this store, not in the dataset.
    pub fn seed_schools(&mut self, seeds: Vec<SchoolSeed>) {
        for seed in seeds {
            let id = self.next_school_id;
            self.next_school_id += 1;
            self.schools.insert(
                id,
                School {
                    id,
                    name: seed.name,
                    address: seed.address,
                    phone: seed.phone,
                    email: seed.email,
                    is_visited: false,
                    has_quota: false,
                    comments: String::new(),
                    lat: seed.lat,
                    lng: seed.lng,
                },
            );
        }
        info!(count = self.schools.len(), "seeded schools");
    }

    /// Bulk-load houses in input order. House flags and comments are part of
    /// the dataset and are kept as-is.
    pub fn seed_houses(&mut self, seeds: Vec<HouseSeed>) {
        for seed in seeds {
            let id = self.next_house_id;
            self.next_house_id += 1;
            self.houses.insert(
                id,
                House {
                    id,
                    address: seed.address,
                    lat: seed.lat,
                    lng: seed.lng,
                    price: seed.price,
                    warranty_months: seed.warranty_months,
                    require_insurance: seed.require_insurance,
                    comments: seed.comments,
                    agent_id: seed.agent_id,
                    is_visited: seed.is_visited,
                    is_not_available: seed.is_not_available,
                    priority: seed.priority,
                },
            );
        }
        info!(count = self.houses.len(), "seeded houses");
    }

    /// Bulk-load agents in input order. A house's `agentId` refers to this
    /// 1-based order; nothing checks that the reference resolves.
    pub fn seed_agents(&mut self, seeds: Vec<AgentSeed>) {
        for seed in seeds {
            let id = self.next_agent_id;
            self.next_agent_id += 1;
            self.agents.insert(
                id,
                Agent {
                    id,
                    name: seed.name,
                    agency: seed.agency,
                    address: seed.address,
                    phone: seed.phone,
                    email: seed.email,
                    web: seed.web,
                },
            );
        }
        info!(count = self.agents.len(), "seeded agents");
    }

    // ── Listings ──

    /// All schools, in insertion order.
    pub fn schools(&self) -> Vec<School> {
        self.schools.values().cloned().collect()
    }

    /// All houses, in insertion order.
    pub fn houses(&self) -> Vec<House> {
        self.houses.values().cloned().collect()
    }

    /// All agents, in insertion order.
    pub fn agents(&self) -> Vec<Agent> {
        self.agents.values().cloned().collect()
    }

    // ── Counts ──

    pub fn school_count(&self) -> usize {
        self.schools.len()
    }

    pub fn house_count(&self) -> usize {
        self.houses.len()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    // ── Point lookups ──

    pub fn school(&self, id: u32) -> Option<School> {
        self.schools.get(&id).cloned()
    }

    pub fn house(&self, id: u32) -> Option<House> {
        self.houses.get(&id).cloned()
    }

    /// The agent a house's `agentId` points at, if it resolves.
    pub fn agent(&self, id: u32) -> Option<Agent> {
        self.agents.get(&id).cloned()
    }

    // ── Partial updates ──

    /// Merge the present fields of `patch` onto school `id` and return the
    /// updated record. An unknown id fails before anything is written.
    pub fn update_school(&mut self, id: u32, patch: SchoolPatch) -> Result<School, StoreError> {
        let school = self.schools.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(v) = patch.is_visited {
            school.is_visited = v;
        }
        if let Some(v) = patch.has_quota {
            school.has_quota = v;
        }
        if let Some(v) = patch.comments {
            school.comments = v;
        }
        Ok(school.clone())
    }

    /// Merge the present fields of `patch` onto house `id` and return the
    /// updated record.
    pub fn update_house(&mut self, id: u32, patch: HousePatch) -> Result<House, StoreError> {
        let house = self.houses.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(v) = patch.is_visited {
            house.is_visited = v;
        }
        if let Some(v) = patch.is_not_available {
            house.is_not_available = v;
        }
        if let Some(v) = patch.priority {
            house.priority = v;
        }
        if let Some(v) = patch.comments {
            house.comments = v;
        }
        Ok(house.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alimapa_core::model::Priority;

    fn school_seed(name: &str) -> SchoolSeed {
        SchoolSeed {
            name: name.into(),
            ..Default::default()
        }
    }

    fn house_seed(address: &str, agent_id: u32) -> HouseSeed {
        HouseSeed {
            address: address.into(),
            lat: 38.34,
            lng: -0.48,
            price: 800.0,
            warranty_months: 2,
            require_insurance: false,
            comments: String::new(),
            agent_id,
            is_visited: false,
            is_not_available: false,
            priority: Priority::Low,
        }
    }

    fn seeded() -> MemStore {
        let mut store = MemStore::new();
        store.seed_schools(vec![school_seed("A"), school_seed("B"), school_seed("C")]);
        store.seed_agents(vec![AgentSeed {
            name: "Inmo Levante".into(),
            ..Default::default()
        }]);
        store.seed_houses(vec![house_seed("Calle Uno 1", 1), house_seed("Calle Dos 2", 9)]);
        store
    }

    #[test]
    fn seeding_assigns_sequential_ids_in_input_order() {
        let store = seeded();
        let ids: Vec<u32> = store.schools().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let names: Vec<String> = store.schools().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn school_seeds_enter_with_clean_visit_state() {
        let mut store = MemStore::new();
        store.seed_schools(vec![SchoolSeed {
            name: "A".into(),
            is_visited: true,
            has_quota: true,
            comments: "stale".into(),
            ..Default::default()
        }]);
        let school = store.school(1).unwrap();
        assert!(!school.is_visited);
        assert!(!school.has_quota);
        assert_eq!(school.comments, "");
    }

    #[test]
    fn house_seeds_keep_their_dataset_flags() {
        let mut store = MemStore::new();
        store.seed_houses(vec![HouseSeed {
            is_visited: true,
            is_not_available: true,
            priority: Priority::High,
            ..house_seed("Calle Tres 3", 1)
        }]);
        let house = store.house(1).unwrap();
        assert!(house.is_visited);
        assert!(house.is_not_available);
        assert_eq!(house.priority, Priority::High);
    }

    #[test]
    fn later_seed_batches_continue_the_id_sequence() {
        let mut store = MemStore::new();
        store.seed_schools(vec![school_seed("A")]);
        store.seed_schools(vec![school_seed("B")]);
        let ids: Vec<u32> = store.schools().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn lookup_of_unknown_id_is_none() {
        let store = seeded();
        assert!(store.school(99).is_none());
        assert!(store.house(99).is_none());
    }

    #[test]
    fn dangling_agent_reference_resolves_to_none() {
        let store = seeded();
        let house = store.house(2).unwrap();
        assert_eq!(house.agent_id, 9);
        assert!(store.agent(house.agent_id).is_none());
        assert!(store.agent(1).is_some());
    }

    #[test]
    fn update_merges_only_present_fields() {
        let mut store = seeded();
        store
            .update_school(
                2,
                SchoolPatch {
                    is_visited: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        let updated = store
            .update_school(
                2,
                SchoolPatch {
                    comments: Some("rang twice, no answer".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        // The earlier flag survives a comments-only patch.
        assert!(updated.is_visited);
        assert!(!updated.has_quota);
        assert_eq!(updated.comments, "rang twice, no answer");
    }

    #[test]
    fn update_is_visible_to_subsequent_reads() {
        let mut store = seeded();
        store
            .update_school(
                1,
                SchoolPatch {
                    has_quota: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(store.school(1).unwrap().has_quota);
        assert!(store.schools()[0].has_quota);
    }

    #[test]
    fn update_of_unknown_id_leaves_the_store_untouched() {
        let mut store = seeded();
        let before = store.schools();
        let result = store.update_school(
            42,
            SchoolPatch {
                is_visited: Some(true),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StoreError::NotFound(42))));
        assert_eq!(store.schools(), before);
    }

    #[test]
    fn update_house_merges_availability_and_priority() {
        let mut store = seeded();
        let updated = store
            .update_house(
                1,
                HousePatch {
                    is_not_available: Some(true),
                    priority: Some(Priority::High),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.is_not_available);
        assert_eq!(updated.priority, Priority::High);
        assert!(!updated.is_visited);
        assert!(matches!(
            store.update_house(7, HousePatch::default()),
            Err(StoreError::NotFound(7))
        ));
    }

    #[test]
    fn reads_are_copies_not_views() {
        let store = seeded();
        let mut listed = store.schools();
        listed[0].name = "scribbled over".into();
        listed.remove(1);
        assert_eq!(store.school(1).unwrap().name, "A");
        assert_eq!(store.school_count(), 3);
    }
}
