// Listing fragment renderer
//
// Exercises the full facade surface the demo apps use: variant ids,
// classes and texts, decoy wrapping per card, and seeded list order.

use anyhow::Result;
use mirage_core::application::DynamicSystem;
use mirage_core::domain::{
    ClassKey, ComponentKey, Element, EntityFamily, IdKey, ListKey, TextKey,
};
use mirage_infra_bundle::VariantTables;

pub fn listing_page(
    system: &DynamicSystem,
    tables: &VariantTables,
    family: EntityFamily,
) -> Result<String> {
    let variants = system.variants();
    let structure = system.structure();

    let search_panel = Element::new("form")
        .id(variants.get_variant(IdKey::FilterForm, &tables.ids, None))
        .child(
            Element::new("input")
                .id(variants.get_variant(IdKey::SearchInput, &tables.ids, None))
                .attr(
                    "placeholder",
                    variants.get_variant(TextKey::SearchPlaceholder, &tables.texts, None),
                ),
        )
        .child(
            Element::new("button")
                .id(variants.get_variant(IdKey::SearchButton, &tables.ids, None))
                .class(variants.get_variant(ClassKey::SubmitButton, &tables.classes, None))
                .text("Search"),
        );
    let search_panel = structure.add_wrap_decoy(ComponentKey::SearchPanel, search_panel, None);

    let entities = system.entities(family);
    let order = structure.change_order(ListKey::JobResults, entities.len())?;

    let mut results =
        Element::new("section").id(variants.get_variant(IdKey::ResultsList, &tables.ids, None));

    if entities.is_empty() {
        results = results.child(
            Element::new("p")
                .class(variants.get_variant(ClassKey::EmptyState, &tables.classes, None))
                .text(variants.get_variant(TextKey::EmptyResults, &tables.texts, None)),
        );
    }

    for (slot, index) in order.iter().enumerate() {
        let entity = &entities[*index];
        let title = entity.data.str_field("title").unwrap_or(&entity.id);
        let company = entity.data.str_field("company").unwrap_or("");
        let location = entity.data.str_field("location").unwrap_or("");

        let card = Element::new("article")
            .class(system.variants().get_variant(ClassKey::Card, &tables.classes, None))
            .attr("data-entity", entity.id.clone())
            .child(
                Element::new("h3")
                    .class(variants.get_variant(ClassKey::CardTitle, &tables.classes, None))
                    .text(title),
            )
            .child(
                Element::new("p")
                    .class(variants.get_variant(ClassKey::CardMeta, &tables.classes, None))
                    .text(format!("{} · {}", company, location)),
            )
            .child(
                Element::new("a")
                    .class(variants.get_variant(ClassKey::SubmitButton, &tables.classes, None))
                    .text(variants.get_variant(TextKey::ApplyCta, &tables.texts, None)),
            );

        let wrapped = structure.add_wrap_decoy(
            ComponentKey::JobCard,
            card,
            Some(&format!("card-slot-{}", slot)),
        );
        results = results.child(wrapped);
    }
    let results = structure.add_wrap_decoy(ComponentKey::ResultsSection, results, None);

    let page = Element::new("main")
        .attr("data-seed", system.seed().to_string())
        .child(search_panel)
        .child(results);

    Ok(page.render())
}
