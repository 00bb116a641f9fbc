//! One Mermaid class diagram per unit

use serde::Serialize;

use super::{templates, AssemblyContext, RenderRequest};
use crate::classify::{classify_relationships, ClassCard, ClassCards, RelationshipBuckets};
use crate::error::Result;

#[derive(Debug, Serialize)]
struct ClassDiagram {
    main_class: ClassCard,
    classes: Vec<ClassCard>,
    #[serde(flatten)]
    relationships: RelationshipBuckets,
}

/// `<label>-<id>.mmd`; path separators in the label are replaced
pub fn diagram_file_name(label: &str, id: &str) -> String {
    format!("{}-{}.mmd", label.replace(['/', '\\'], "-"), id)
}

pub fn assemble(ctx: &AssemblyContext<'_>) -> Result<Vec<RenderRequest>> {
    let catalog = ctx.catalog;
    let cards = ClassCards::new(catalog, ctx.resolver());

    catalog
        .units
        .iter()
        .map(|unit| {
            let relationships = catalog.children(&catalog.relationships, &catalog.units, unit.id());
            let diagram = ClassDiagram {
                main_class: cards.card(unit.id()),
                classes: cards.related(relationships.iter().copied()),
                relationships: classify_relationships(relationships.iter().copied()),
            };
            RenderRequest::new(
                templates::CLASS_DIAGRAM,
                &diagram,
                diagram_file_name(&catalog.units.label_of(unit), unit.id()),
            )
        })
        .collect()
}
