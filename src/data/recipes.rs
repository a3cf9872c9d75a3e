use crate::shared::*;

fn ingredient(veggie_name: &str, quantity: u32) -> IngredientDef {
    IngredientDef {
        veggie_name: veggie_name.into(),
        quantity,
    }
}

/// Populate the registry with every canning recipe.
///
/// The first entry is the bootstrap recipe: it unlocks from overall farm
/// experience so a new player can discover canning before earning any
/// canning experience. Every later entry unlocks from canning experience.
pub fn populate_recipes(registry: &mut SchemaRegistry) {
    let recipes: Vec<RecipeDef> = vec![
        RecipeDef {
            id: "pickled_beets".into(),
            name: "Pickled Beets".into(),
            ingredients: vec![ingredient("Beets", 5)],
            processing_time: 30,
            sale_price: 50.0,
            experience_required: 5_000.0,
            category: RecipeCategory::Pickles,
        },

        RecipeDef {
            id: "carrot_relish".into(),
            name: "Carrot Relish".into(),
            ingredients: vec![ingredient("Carrots", 6), ingredient("Garlic", 1)],
            processing_time: 45,
            sale_price: 90.0,
            experience_required: 100.0,
            category: RecipeCategory::Sauces,
        },

        RecipeDef {
            id: "garlic_pickles".into(),
            name: "Garlic Pickles".into(),
            ingredients: vec![ingredient("Cucumbers", 4), ingredient("Garlic", 2)],
            processing_time: 60,
            sale_price: 140.0,
            experience_required: 500.0,
            category: RecipeCategory::Pickles,
        },

        RecipeDef {
            id: "radish_kimchi".into(),
            name: "Radish Kimchi".into(),
            ingredients: vec![ingredient("Radishes", 6), ingredient("Garlic", 2)],
            processing_time: 90,
            sale_price: 220.0,
            experience_required: 1_500.0,
            category: RecipeCategory::Preserves,
        },

        RecipeDef {
            id: "garden_salsa".into(),
            name: "Garden Salsa".into(),
            ingredients: vec![
                ingredient("Tomatoes", 4),
                ingredient("Bell Peppers", 2),
                ingredient("Onions", 1),
            ],
            processing_time: 120,
            sale_price: 400.0,
            experience_required: 4_000.0,
            category: RecipeCategory::Sauces,
        },

        RecipeDef {
            id: "harvest_medley".into(),
            name: "Harvest Medley".into(),
            ingredients: vec![
                ingredient("Beets", 3),
                ingredient("Carrots", 3),
                ingredient("Tomatoes", 3),
                ingredient("Onions", 2),
            ],
            processing_time: 240,
            sale_price: 900.0,
            experience_required: 10_000.0,
            category: RecipeCategory::Gourmet,
        },
    ];

    registry.recipes = recipes;
}
