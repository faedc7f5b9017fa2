use comfy_table::Cell;

use crate::catalog::RelationLayout;
use crate::error::QuillQueryResult;
use crate::execution::physical_plan::PhysicalPlan;
use crate::storage::tuple::Tuple;

pub fn pretty_format_tuples(
    layout: &RelationLayout,
    tuples: &[Tuple],
) -> QuillQueryResult<comfy_table::Table> {
    let mut table = comfy_table::Table::new();
    table.load_preset("||--+-++|    ++++++");

    let mut header = Vec::new();
    for attr in layout.attributes.iter() {
        header.push(Cell::new(format!("{} {}", attr.name, attr.data_type)));
    }
    table.set_header(header);

    for tuple in tuples {
        let mut cells = Vec::new();
        for value in tuple.render(layout.attributes.iter().map(|a| a.as_ref()))? {
            cells.push(Cell::new(value));
        }
        table.add_row(cells);
    }

    Ok(table)
}

pub fn pretty_format_physical_plan(plans: &[PhysicalPlan]) -> String {
    plans
        .iter()
        .enumerate()
        .map(|(i, plan)| format!("{:>3}  {}", i + 1, plan))
        .collect::<Vec<_>>()
        .join("\n")
}
