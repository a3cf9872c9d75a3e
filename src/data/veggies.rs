use crate::shared::*;

/// Populate the registry with every veggie the farm can grow.
///
/// Order is the order the veggie list is shown and unlocked in. Saves never
/// rely on it: records are matched back by name (full) or id (lean).
pub fn populate_veggies(registry: &mut SchemaRegistry) {
    let veggies: Vec<VeggieDef> = vec![
        // ── Starter ─────────────────────────────────────────────────────────

        VeggieDef {
            id: "beets".into(),
            name: "Beets".into(),
            growth_rate: 6.0,
            seed_cost: 0.0,
            sale_price: 1.0,
            experience_to_unlock: 0.0,
        },

        VeggieDef {
            id: "carrots".into(),
            name: "Carrots".into(),
            growth_rate: 5.0,
            seed_cost: 2.0,
            sale_price: 2.0,
            experience_to_unlock: 50.0,
        },

        // ── Mid game ────────────────────────────────────────────────────────

        VeggieDef {
            id: "garlic".into(),
            name: "Garlic".into(),
            growth_rate: 4.0,
            seed_cost: 4.0,
            sale_price: 4.0,
            experience_to_unlock: 200.0,
        },

        VeggieDef {
            id: "radishes".into(),
            name: "Radishes".into(),
            growth_rate: 4.5,
            seed_cost: 6.0,
            sale_price: 6.0,
            experience_to_unlock: 500.0,
        },

        VeggieDef {
            id: "cucumbers".into(),
            name: "Cucumbers".into(),
            growth_rate: 3.5,
            seed_cost: 10.0,
            sale_price: 10.0,
            experience_to_unlock: 1_200.0,
        },

        VeggieDef {
            id: "tomatoes".into(),
            name: "Tomatoes".into(),
            growth_rate: 3.0,
            seed_cost: 16.0,
            sale_price: 16.0,
            experience_to_unlock: 2_500.0,
        },

        // ── Late game ───────────────────────────────────────────────────────

        VeggieDef {
            id: "bell_peppers".into(),
            name: "Bell Peppers".into(),
            growth_rate: 2.5,
            seed_cost: 25.0,
            sale_price: 25.0,
            experience_to_unlock: 5_000.0,
        },

        VeggieDef {
            id: "onions".into(),
            name: "Onions".into(),
            growth_rate: 2.0,
            seed_cost: 40.0,
            sale_price: 40.0,
            experience_to_unlock: 9_000.0,
        },
    ];

    registry.veggies = veggies;
}
